pub mod input;
pub mod prediction;
pub mod types;
pub mod weather;

pub use input::*;
pub use prediction::*;
pub use types::*;
pub use weather::*;
