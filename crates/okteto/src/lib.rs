pub mod client;
pub mod context;
pub mod error;
pub mod traits;
pub mod types;

pub use client::OktetoClient;
pub use context::OktetoContext;
pub use error::{OktetoError, Result};
pub use traits::PreviewApi;
