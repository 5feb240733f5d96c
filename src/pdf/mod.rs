pub mod annotation;
pub mod reader;
