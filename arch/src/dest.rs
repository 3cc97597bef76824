use std::{fmt, str::FromStr};

/// Destination field of a C-instruction: any subset of `{A, M, D}`.
/// Stored as the 3-bit `d1 d2 d3` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dest(u8);

impl Dest {
    pub const NULL: Dest = Dest(0b000);
    pub const M: Dest = Dest(0b001);
    pub const D: Dest = Dest(0b010);
    pub const A: Dest = Dest(0b100);

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: Dest) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: Dest) -> Dest {
        Dest(self.0 | other.0)
    }

    /// Register letters are order independent (`MD` == `DM`), but each may
    /// appear only once and the set must not be empty.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("Empty destination".to_string());
        }
        let mut dest = Dest::NULL;
        for c in s.chars() {
            let reg = match c {
                'A' => Dest::A,
                'M' => Dest::M,
                'D' => Dest::D,
                _ => return Err(format!("Unknown destination: {s}")),
            };
            if dest.contains(reg) {
                return Err(format!("Repeated register in destination: {s}"));
            }
            dest = dest.union(reg);
        }
        Ok(dest)
    }
}

impl FromStr for Dest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dest::parse(s)
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (reg, c) in [(Dest::A, 'A'), (Dest::M, 'M'), (Dest::D, 'D')] {
            if self.contains(reg) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}
