use crate::{comp::Comp, dest::Dest, jump::Jump};

use color_print::cformat;
use std::fmt;

/// Largest value an A-instruction can carry.
pub const MAX_CONSTANT: u16 = 0x7FFF;

const A_PREFIX: u16 = 0b1 << 15;
const C_PREFIX: u16 = 0b111 << 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    /// `@value`, 15 bits meaningful.
    A(u16),
    /// `dest=comp;jump`
    C {
        dest: Dest,
        comp: Comp,
        jump: Option<Jump>,
    },
}

impl Inst {
    /// Constants wider than 15 bits are rejected before they get here,
    /// the extra bits are masked off.
    pub fn to_bin(&self) -> u16 {
        match self {
            Inst::A(value) => A_PREFIX | (value & MAX_CONSTANT),
            Inst::C { dest, comp, jump } => {
                C_PREFIX
                    | (u8::from(*comp) as u16) << 6
                    | (dest.bits() as u16) << 3
                    | Jump::bits(*jump) as u16
            }
        }
    }

    /// Sixteen `0`/`1` characters, most significant bit first.
    pub fn to_bin_string(&self) -> String {
        format!("{:016b}", self.to_bin())
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::A(value) => write!(f, "@{value}"),
            Inst::C { dest, comp, jump } => {
                if !dest.is_empty() {
                    write!(f, "{dest}=")?;
                }
                write!(f, "{comp}")?;
                if let Some(jump) = jump {
                    write!(f, ";{jump}")?;
                }
                Ok(())
            }
        }
    }
}

impl Inst {
    pub fn cformat(&self) -> String {
        match self {
            Inst::A(value) => cformat!("<r>@</><y>0x{:0>4X}</>", value),
            Inst::C { dest, comp, jump } => {
                let dest = match dest.is_empty() {
                    true => String::new(),
                    false => format!("{dest}="),
                };
                let jump = match jump {
                    Some(jump) => format!(";{jump}"),
                    None => String::new(),
                };
                cformat!("<b>{}</><r>{}</><b>{}</>", dest, comp, jump)
            }
        }
    }
}
