pub mod formatter;

pub use formatter::{OutputOptions, ResponseFormatter};
