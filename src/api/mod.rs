pub mod body;
pub mod validation;

pub use body::JsonBody;
pub use validation::{CharField, Payload};
