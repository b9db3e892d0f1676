pub mod common;
pub mod completions;
pub mod deps;
pub mod dot;
pub mod fetches;
pub mod summary;
pub mod text;
