pub mod problem_store;

pub use problem_store::{ProblemStore, SqliteProblemStore};
