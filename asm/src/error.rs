use color_print::ceprintln;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Syntax Error: Cannot parse `{0}`")]
    Parse(String),

    #[error("Re-defined symbol: `{name}` = {attempted}, already {existing}")]
    DuplicateSymbol {
        name: String,
        existing: u16,
        attempted: u16,
    },

    #[error("Unresolved operand: {0}")]
    UnresolvedOperand(String),

    #[error("Out of range: `{0}` does not fit in 15 bits")]
    Range(String),

    #[error("Program too long: no address after 0x{0:04X}")]
    ProgramSize(u16),

    #[error("Symbol `{0}` was never resolved")]
    Unresolved(String),

    #[error("Resolution unit failed")]
    Unit(#[from] tokio::task::JoinError),

    #[error("line {}: {source}", .line + 1)]
    Line {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read line")]
    FileRead(#[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

impl Error {
    /// Attach the zero-based source line this error came from.
    pub fn at(self, line: usize) -> Error {
        match self {
            Error::Line { .. } => self,
            _ => Error::Line {
                line,
                source: Box::new(self),
            },
        }
    }

    /// The error with any line location stripped.
    pub fn kind(&self) -> &Error {
        match self {
            Error::Line { source, .. } => source.kind(),
            _ => self,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Line { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Print error with diagnostic information showing file location and line content
    pub fn print_diag(&self, file: &str, lines: &[String]) {
        ceprintln!("<red,bold>error</>: {}", self.kind());

        let Some(line_idx) = self.line() else {
            return;
        };

        // line_idx is 0-based, display as 1-based
        let line_num = line_idx + 1;
        ceprintln!("     <blue>--></> <underline>{}:{}</>", file, line_num);
        ceprintln!("      <blue>|</>");

        let line_content = lines.get(line_idx).map(|s| s.as_str()).unwrap_or("");

        ceprintln!(" <blue>{:>4} |</> {}", line_num, line_content);
        ceprintln!("      <blue>|</>");
    }
}
