pub mod config;
pub mod sync;

pub use config::*;
pub use sync::*;
