//! Response types for HTTP handlers.

mod authentications;
mod error_response;

pub use authentications::{AuthResponse, UserResponse};
pub use error_response::ErrorResponse;
