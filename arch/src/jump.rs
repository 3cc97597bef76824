use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumIter, EnumString};

/// Jump condition of a C-instruction, compared against the ALU output.
/// "No jump" is the absence of a condition (`000`), so it has no variant here.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[repr(u8)]
pub enum Jump {
    JGT = 0b001,
    JEQ = 0b010,
    JGE = 0b011,
    JLT = 0b100,
    JNE = 0b101,
    JLE = 0b110,
    JMP = 0b111,
}

impl Jump {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(j) => Ok(j),
            Err(_) => Err(format!("Unknown jump: {s}")),
        }
    }

    /// Three-bit field value, `000` when there is no jump.
    pub fn bits(jump: Option<Jump>) -> u8 {
        jump.map(u8::from).unwrap_or(0)
    }
}
