pub mod error;
pub mod handle;

pub use error::ApiError;
pub use handle::{ApiContext, ApiHandle, HandleState};
