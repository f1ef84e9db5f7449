//! Prompt text for the two delegated calls.

pub const RECOGNITION_SYSTEM_PROMPT: &str = "You are an expert at recognizing handwritten mathematical equations. Analyze the image and extract the mathematical equation. Return ONLY the equation in plain text format, using standard mathematical notation (e.g., x^2 + 5x + 6 = 0).";

pub const RECOGNITION_USER_PROMPT: &str = "Please recognize this handwritten mathematical equation and return it in plain text format.";

pub const SOLVER_SYSTEM_PROMPT: &str = r#"You are a mathematical solver. Given an equation, provide:
1. The equation in LaTeX format
2. Step-by-step solution as a JSON object with numbered steps
3. The final answer

Format your response as JSON with these exact keys:
{
  "latex": "LaTeX format of equation",
  "steps": {
    "1": "First step explanation",
    "2": "Second step explanation",
    ...
  },
  "answer": "Final answer"
}"#;

pub fn solver_user_prompt(equation: &str) -> String {
    format!("Solve this equation: {equation}")
}
