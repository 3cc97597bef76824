pub mod comp;
pub mod dest;
pub mod inst;
pub mod jump;

pub use comp::Comp;
pub use dest::Dest;
pub use inst::{Inst, MAX_CONSTANT};
pub use jump::Jump;
