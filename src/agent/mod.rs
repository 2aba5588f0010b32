pub mod error;
pub mod responses;
pub mod runner;
pub mod types;

pub use error::*;
pub use responses::*;
pub use runner::*;
pub use types::*;
