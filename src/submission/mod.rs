pub mod parser;
pub mod pipeline;

pub use pipeline::{Pipeline, Report};
