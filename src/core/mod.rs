pub mod constants;
pub mod engine;
pub mod format;
pub mod transport;
pub mod trigger;

pub use crate::domain::model::{ApiRequest, ApiResponse, Parameters, Record};
pub use crate::domain::ports::{ApiTransport, CredentialsProvider, Storage};
pub use crate::utils::error::Result;
