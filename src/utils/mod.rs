pub mod error;
pub mod format;
pub mod i18n;

pub use error::{ApiError, ApiResult};
pub use format::{format_ms, format_none, format_short};
pub use i18n::t;
