//! Result type alias for linting operations

use crate::error::CurlyError;

pub type Result<T> = std::result::Result<T, CurlyError>;
