pub mod coordinator;
pub mod encoder;
pub mod error;
pub mod parser;
pub mod symbols;
pub mod util;

pub use coordinator::{assemble, Assembled, Coordinator, Word};
pub use error::Error;
pub use parser::{Record, Stmt};
pub use symbols::{Handle, SymbolTable};
