use crate::{error::Error, parser::Stmt};
use hack_arch::{Comp, Dest, Inst, Jump, MAX_CONSTANT};

/// Machine instruction for a resolved statement. Labels and blank lines
/// produce nothing; a symbol that was never resolved is an error.
pub fn encode(stmt: &Stmt) -> Result<Option<Inst>, Error> {
    match stmt {
        Stmt::LoadConstant(value) => encode_a(*value).map(Some),
        Stmt::Compute { dest, comp, jump } => {
            encode_c(dest.as_deref(), comp, jump.as_deref()).map(Some)
        }
        Stmt::LoadSymbol(name) => Err(Error::Unresolved(name.clone())),
        Stmt::Label(_) | Stmt::NoOp => Ok(None),
    }
}

pub fn encode_a(value: u32) -> Result<Inst, Error> {
    match u16::try_from(value) {
        Ok(value) if value <= MAX_CONSTANT => Ok(Inst::A(value)),
        _ => Err(Error::Range(value.to_string())),
    }
}

pub fn encode_c(dest: Option<&str>, comp: &str, jump: Option<&str>) -> Result<Inst, Error> {
    let comp = Comp::parse(comp).map_err(Error::UnresolvedOperand)?;
    let dest = dest
        .map(Dest::parse)
        .transpose()
        .map_err(Error::UnresolvedOperand)?
        .unwrap_or_default();
    let jump = jump
        .map(Jump::parse)
        .transpose()
        .map_err(Error::UnresolvedOperand)?;
    Ok(Inst::C { dest, comp, jump })
}
