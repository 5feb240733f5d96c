pub mod config;
pub mod detect;
pub mod error;
pub mod geometry;
pub mod group;
pub mod loader;
pub mod pdf;
pub mod pipeline;
pub mod render;
pub mod summary;
