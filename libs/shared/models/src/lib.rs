pub mod auth;
pub mod error;

pub use auth::{JwtClaims, Role, User};
pub use error::AppError;
