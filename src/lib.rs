mod commands;
mod config;
mod error;
mod handlers;
mod keyboard;
pub mod messages;
mod providers;
mod schedule;
mod state;
mod streak;
mod translate;
mod types;

pub use commands::*;
pub use config::*;
pub use error::*;
pub use handlers::*;
pub use keyboard::*;
pub use providers::*;
pub use schedule::*;
pub use state::*;
pub use streak::*;
pub use translate::*;
pub use types::*;
