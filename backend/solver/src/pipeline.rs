//! The two-step solve pipeline: recognize the equation, solve it, persist.
//!
//! Both steps are fully delegated to a hosted chat-completions provider; the
//! pipeline itself is a linear call sequence with a flat catch-and-report
//! error model. No retries, no partial recovery.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use uuid::Uuid;

use snapsolve_core::{LlmProvider, LlmRequest, SnapError};
use snapsolve_store::ProblemStore;

use crate::prompts;
use crate::solution::extract_solution;

/// Model selection for the two delegated calls.
#[derive(Debug, Clone)]
pub struct SolveModels {
    pub vision: String,
    pub solver: String,
}

impl Default for SolveModels {
    fn default() -> Self {
        Self {
            vision: "google/gemini-2.5-flash".to_string(),
            solver: "google/gemini-2.5-flash".to_string(),
        }
    }
}

pub struct SolvePipeline {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn ProblemStore>,
    models: SolveModels,
}

impl SolvePipeline {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn ProblemStore>,
        models: SolveModels,
    ) -> Self {
        Self {
            provider,
            store,
            models,
        }
    }

    /// Run the pipeline for a submitted problem.
    ///
    /// Never returns an error: any failure is logged and recorded on the
    /// problem record on a best-effort basis.
    pub async fn run(&self, problem_id: Uuid, image_ref: &str) {
        info!(problem_id = %problem_id, "Processing problem");
        if let Err(e) = self.solve(problem_id, image_ref).await {
            error!(problem_id = %problem_id, error = %e, "Solve pipeline failed");
            match self.store.mark_error(problem_id, &e.to_string()).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(problem_id = %problem_id, "Problem already terminal, error not recorded")
                }
                Err(store_err) => {
                    warn!(problem_id = %problem_id, error = %store_err, "Failed to record error status")
                }
            }
        }
    }

    async fn solve(&self, problem_id: Uuid, image_ref: &str) -> Result<()> {
        let recognized = self.recognize(image_ref).await?;
        info!(problem_id = %problem_id, equation = %recognized, "Recognized equation");

        let raw = self.request_solution(&recognized).await?;
        let solution = extract_solution(&raw, &recognized);

        let transitioned = self
            .store
            .mark_solved(problem_id, &recognized, &solution)
            .await
            .context("Failed to persist solution")?;
        if transitioned {
            info!(problem_id = %problem_id, "Problem solved");
        } else {
            warn!(problem_id = %problem_id, "Problem already terminal, solution dropped");
        }
        Ok(())
    }

    /// Recognition step: image to plain-text equation.
    async fn recognize(&self, image_ref: &str) -> Result<String> {
        let request = LlmRequest::new(
            &self.models.vision,
            prompts::RECOGNITION_SYSTEM_PROMPT,
            prompts::RECOGNITION_USER_PROMPT,
        )
        .with_image_url(image_ref);

        let response = self
            .provider
            .complete(&request)
            .await
            .context("AI recognition failed")?;
        let equation = response.content.trim().to_string();
        if equation.is_empty() {
            return Err(SnapError::EmptyRecognition.into());
        }
        Ok(equation)
    }

    /// Solving step: equation text to free-form solution text.
    async fn request_solution(&self, equation: &str) -> Result<String> {
        let request = LlmRequest::new(
            &self.models.solver,
            prompts::SOLVER_SYSTEM_PROMPT,
            prompts::solver_user_prompt(equation),
        );
        let response = self
            .provider
            .complete(&request)
            .await
            .context("AI solving failed")?;
        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapsolve_core::{Problem, ProblemStatus};
    use snapsolve_store::SqliteProblemStore;

    use crate::providers::MockProvider;

    async fn run_with(provider: MockProvider) -> Problem {
        let store = Arc::new(SqliteProblemStore::in_memory().unwrap());
        let problem = Problem::new(None, "/media/eq.png");
        store.insert(&problem).await.unwrap();

        let pipeline = SolvePipeline::new(
            Arc::new(provider),
            Arc::clone(&store) as Arc<dyn ProblemStore>,
            SolveModels::default(),
        );
        pipeline.run(problem.id, "/media/eq.png").await;

        store.get(problem.id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_successful_pipeline_reaches_solved() {
        let provider = MockProvider::new("mock")
            .with_response("x^2 + 5x + 6 = 0")
            .with_response(
                r#"{"latex": "x^2 + 5x + 6 = 0", "steps": {"1": "Factor into (x+2)(x+3)"}, "answer": "x = -2 or x = -3"}"#,
            );

        let problem = run_with(provider).await;
        assert_eq!(problem.status, ProblemStatus::Solved);
        assert_eq!(problem.recognized_eq.as_deref(), Some("x^2 + 5x + 6 = 0"));
        assert_eq!(problem.final_answer.as_deref(), Some("x = -2 or x = -3"));
        assert_eq!(problem.steps.len(), 1);
        assert!(problem.error_message.is_none());
    }

    #[tokio::test]
    async fn test_recognition_failure_reaches_error() {
        let provider = MockProvider::new("mock").with_failure("gateway returned 500");

        let problem = run_with(provider).await;
        assert_eq!(problem.status, ProblemStatus::Error);
        assert_eq!(problem.error_message.as_deref(), Some("AI recognition failed"));
        assert!(problem.final_answer.is_none());
    }

    #[tokio::test]
    async fn test_empty_recognition_reaches_error() {
        let provider = MockProvider::new("mock").with_response("   ");

        let problem = run_with(provider).await;
        assert_eq!(problem.status, ProblemStatus::Error);
        assert_eq!(
            problem.error_message.as_deref(),
            Some("failed to recognize equation from image")
        );
    }

    #[tokio::test]
    async fn test_solving_failure_reaches_error() {
        let provider = MockProvider::new("mock")
            .with_response("2x = 4")
            .with_failure("gateway timeout");

        let problem = run_with(provider).await;
        assert_eq!(problem.status, ProblemStatus::Error);
        assert_eq!(problem.error_message.as_deref(), Some("AI solving failed"));
    }

    #[tokio::test]
    async fn test_prose_solution_falls_back_to_single_step() {
        let provider = MockProvider::new("mock")
            .with_response("2x = 4")
            .with_response("Divide both sides by 2 to get x = 2.");

        let problem = run_with(provider).await;
        assert_eq!(problem.status, ProblemStatus::Solved);
        assert_eq!(problem.latex_form.as_deref(), Some("2x = 4"));
        assert_eq!(
            problem.steps.get("1").map(String::as_str),
            Some("Divide both sides by 2 to get x = 2.")
        );
        assert_eq!(problem.final_answer.as_deref(), Some("See steps for solution"));
    }
}
