pub mod auth;
pub mod response;

pub use auth::authenticate;
pub use response::ApiResponse;
