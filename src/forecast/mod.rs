pub mod aggregation;
pub mod consumption;
pub mod engine;
pub mod error;
pub mod external;
pub mod features;
pub mod random;
pub mod weather;

pub use aggregation::*;
pub use consumption::*;
pub use engine::*;
pub use error::*;
pub use external::*;
pub use features::*;
pub use random::*;
pub use weather::*;
