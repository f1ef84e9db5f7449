pub mod error;
pub mod traits;
pub mod types;

pub use error::SnapError;
pub use traits::{LlmProvider, LlmRequest, LlmResponse};
pub use types::{Problem, ProblemStatus, Solution};
