use crate::error::Error;

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `@symbol`
    LoadSymbol(String),
    /// `@123`
    LoadConstant(u32),
    /// `(symbol)`
    Label(String),
    /// `dest=comp;jump`, mnemonics are checked when encoding.
    Compute {
        dest: Option<String>,
        comp: String,
        jump: Option<String>,
    },
    /// Blank or comment-only line.
    NoOp,
}

impl Stmt {
    pub fn parse(raw: &str) -> Result<Stmt, Error> {
        let code = strip(raw);

        let stmt = match code.chars().next() {
            None => Some(Stmt::NoOp),
            Some('@') => parse_load(&code)?,
            Some('(') => parse_label(&code),
            Some(_) => parse_compute(&code),
        };

        stmt.ok_or_else(|| Error::Parse(raw.trim().to_string()))
    }

    /// Occupies an instruction address.
    pub fn is_inst(&self) -> bool {
        matches!(
            self,
            Stmt::LoadSymbol(_) | Stmt::LoadConstant(_) | Stmt::Compute { .. }
        )
    }
}

// ----------------------------------------------------------------------------
// Record

/// A classified line with its position in the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub stmt: Stmt,
    /// Address of this instruction, or of the next one for labels.
    pub pc: u16,
    /// Zero-based source line.
    pub line: usize,
}

// ----------------------------------------------------------------------------
// Shapes

/// Drop all whitespace, then everything from `//` on.
fn strip(raw: &str) -> String {
    let code: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    match code.find("//") {
        Some(idx) => code[..idx].to_string(),
        None => code,
    }
}

/// `[a-zA-Z$.:][\w$.:]*`
pub fn is_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(head) if head.is_ascii_alphabetic() || matches!(head, '$' | '.' | ':') => chars
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | ':')),
        _ => false,
    }
}

fn parse_load(code: &str) -> Result<Option<Stmt>, Error> {
    let Some(operand) = code.strip_prefix('@') else {
        return Ok(None);
    };
    if is_symbol(operand) {
        return Ok(Some(Stmt::LoadSymbol(operand.to_string())));
    }
    if !operand.is_empty() && operand.chars().all(|c| c.is_ascii_digit()) {
        // Digits only, so the parse can fail by overflow alone.
        return match operand.parse::<u32>() {
            Ok(value) => Ok(Some(Stmt::LoadConstant(value))),
            Err(_) => Err(Error::Range(operand.to_string())),
        };
    }
    Ok(None)
}

fn parse_label(code: &str) -> Option<Stmt> {
    let name = code.strip_prefix('(')?.strip_suffix(')')?;
    is_symbol(name).then(|| Stmt::Label(name.to_string()))
}

fn parse_compute(code: &str) -> Option<Stmt> {
    let (dest, rest) = match code.split_once('=') {
        Some((dest, rest)) => (Some(dest), rest),
        None => (None, code),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, Some(jump)),
        None => (rest, None),
    };

    if let Some(dest) = dest {
        if dest.is_empty() || !dest.chars().all(|c| matches!(c, 'A' | 'M' | 'D')) {
            return None;
        }
    }
    if comp.is_empty() || !comp.chars().all(|c| "01-+ADM&|!".contains(c)) {
        return None;
    }
    if let Some(jump) = jump {
        if jump.len() != 3 || !jump.chars().all(|c| "JMLGNETPQ".contains(c)) {
            return None;
        }
    }

    Some(Stmt::Compute {
        dest: dest.map(str::to_string),
        comp: comp.to_string(),
        jump: jump.map(str::to_string),
    })
}
