pub mod executor;
pub mod reporter;
pub mod types;
pub mod validator;

pub use executor::ScriptExecutor;
pub use reporter::Reporter;
pub use types::{RunReport, StepResult};
pub use validator::{ValidationErrors, ValidationIssue, validate};
