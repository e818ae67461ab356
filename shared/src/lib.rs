pub mod date_format;
pub mod environment;
pub mod error;
pub mod timezone;

// Re-export commonly used items
pub use date_format::{
    format_canonical, format_long, format_short, DateInput, FieldStyle, FormatOptions, INVALID_DATE,
};
pub use environment::{Deployment, Environment};
pub use error::{Result, SharedError};
pub use timezone::SEOUL;
