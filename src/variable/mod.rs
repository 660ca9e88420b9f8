pub mod capture;
pub mod stack;
pub mod template;

pub use capture::{CaptureOutcome, VariableCapture, apply_captures};
pub use stack::{UUID_KEY, VariableStack};
pub use template::{TemplateError, render};
