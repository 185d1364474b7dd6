use crate::model::Ingredient;

/// The instruction block describing the step-ingredient matching task
/// and the expected JSON reply shape.
///
/// Loaded from `prompt.txt` at compile time using the `include_str!`
/// macro, making it easy to edit without dealing with Rust string
/// syntax.
pub const STEP_MATCHER_PROMPT: &str = include_str!("prompt.txt");

/// Build the full prompt: task description, ingredient list, and the
/// instruction list numbered from 1 for display.
pub fn build_prompt(ingredients: &[Ingredient], instructions: &[String]) -> String {
    let ingredient_lines = ingredients
        .iter()
        .map(|ingredient| format!("- {}", ingredient.display_line()))
        .collect::<Vec<String>>()
        .join("\n");

    let instruction_lines = instructions
        .iter()
        .enumerate()
        .map(|(index, step)| format!("{}. {}", index + 1, step))
        .collect::<Vec<String>>()
        .join("\n");

    format!(
        "{}\nIngredients:\n{}\n\nSteps:\n{}",
        STEP_MATCHER_PROMPT, ingredient_lines, instruction_lines
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(!STEP_MATCHER_PROMPT.is_empty());
        assert!(STEP_MATCHER_PROMPT.contains("zero-based"));
        assert!(STEP_MATCHER_PROMPT.contains("JSON object"));
        assert!(STEP_MATCHER_PROMPT.contains("empty array"));
    }

    #[test]
    fn test_build_prompt_numbers_steps_from_one() {
        let ingredients = vec![
            Ingredient::from_line("2 cups flour"),
            Ingredient::from_line("salt"),
        ];
        let instructions = vec!["Mix the flour".to_string(), "Season".to_string()];

        let prompt = build_prompt(&ingredients, &instructions);
        assert!(prompt.contains("- 2 cups flour"));
        assert!(prompt.contains("- salt"));
        assert!(prompt.contains("1. Mix the flour"));
        assert!(prompt.contains("2. Season"));
    }
}
