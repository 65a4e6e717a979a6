mod callback;
mod command;
mod delivery;

pub use callback::*;
pub use command::*;
pub use delivery::*;
