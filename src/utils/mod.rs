pub mod password;
pub mod url_validator;
pub mod validators;

pub use password::{hash_password, verify_password};
pub use url_validator::{UrlValidationError, validate_url};
