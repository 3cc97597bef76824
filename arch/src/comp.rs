use num_enum::IntoPrimitive;
use strum::{Display, EnumIter, EnumString};

/// ALU computation field of a C-instruction.
/// The discriminant is the 7-bit `a c1 c2 c3 c4 c5 c6` code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[repr(u8)]
pub enum Comp {
    // a=0
    #[strum(serialize = "0")]
    ZERO = 0b0101010,
    #[strum(serialize = "1")]
    ONE = 0b0111111,
    #[strum(serialize = "-1")]
    NEG1 = 0b0111010,
    #[strum(serialize = "D")]
    D = 0b0001100,
    #[strum(serialize = "A")]
    A = 0b0110000,
    #[strum(serialize = "!D")]
    NOTD = 0b0001101,
    #[strum(serialize = "!A")]
    NOTA = 0b0110001,
    #[strum(serialize = "-D")]
    NEGD = 0b0001111,
    #[strum(serialize = "-A")]
    NEGA = 0b0110011,
    #[strum(serialize = "D+1")]
    INCD = 0b0011111,
    #[strum(serialize = "A+1")]
    INCA = 0b0110111,
    #[strum(serialize = "D-1")]
    DECD = 0b0001110,
    #[strum(serialize = "A-1")]
    DECA = 0b0110010,
    #[strum(serialize = "D+A")]
    ADD = 0b0000010,
    #[strum(serialize = "D-A")]
    SUBDA = 0b0010011,
    #[strum(serialize = "A-D")]
    SUBAD = 0b0000111,
    #[strum(serialize = "D&A")]
    AND = 0b0000000,
    #[strum(serialize = "D|A")]
    OR = 0b0010101,

    // a=1
    #[strum(serialize = "M")]
    M = 0b1110000,
    #[strum(serialize = "!M")]
    NOTM = 0b1110001,
    #[strum(serialize = "-M")]
    NEGM = 0b1110011,
    #[strum(serialize = "M+1")]
    INCM = 0b1110111,
    #[strum(serialize = "M-1")]
    DECM = 0b1110010,
    #[strum(serialize = "D+M")]
    ADDM = 0b1000010,
    #[strum(serialize = "D-M")]
    SUBDM = 0b1010011,
    #[strum(serialize = "M-D")]
    SUBMD = 0b1000111,
    #[strum(serialize = "D&M")]
    ANDM = 0b1000000,
    #[strum(serialize = "D|M")]
    ORM = 0b1010101,
}

impl Comp {
    /// Mnemonics are case sensitive: `d+a` is not `D+A`.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(c) => Ok(c),
            Err(_) => Err(format!("Unknown computation: {s}")),
        }
    }
}
