//! Renderers turning a [`LogRecord`](crate::core::LogRecord) into output text

pub mod json;
pub mod pretty;

pub use json::JsonRenderer;
pub use pretty::PrettyRenderer;
