//! The optional enrichment stage: ask a hosted model which ingredients
//! each instruction step uses. Every failure path degrades to an empty
//! mapping; this stage can never fail a request.

mod gemini;
mod prompt;

pub use gemini::GeminiClient;
pub use prompt::{build_prompt, STEP_MATCHER_PROMPT};

use crate::error::EnrichError;
use crate::model::Ingredient;
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// A completion backend for step-ingredient matching.
#[async_trait]
pub trait StepMatcher: Send + Sync {
    /// Name of the backend, for logs
    fn matcher_name(&self) -> &str;

    /// Send a prompt and return the model's raw text reply
    async fn complete(&self, prompt: &str) -> Result<String, EnrichError>;
}

/// Ask the matcher which ingredients belong to which step.
///
/// Never fails: transport errors, empty replies, and malformed JSON all
/// log and return an empty mapping so the request still succeeds.
pub async fn enrich(
    matcher: &dyn StepMatcher,
    ingredients: &[Ingredient],
    instructions: &[String],
) -> BTreeMap<usize, Vec<String>> {
    if ingredients.is_empty() || instructions.is_empty() {
        debug!("Nothing to enrich: no ingredients or no instructions");
        return BTreeMap::new();
    }

    let prompt = build_prompt(ingredients, instructions);
    let reply = match matcher.complete(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("{} step matching failed: {}", matcher.matcher_name(), e);
            return BTreeMap::new();
        }
    };

    match parse_step_mapping(&reply, instructions.len()) {
        Ok(mapping) => mapping,
        Err(e) => {
            warn!(
                "{} reply was not a usable step mapping: {}; raw reply: {}",
                matcher.matcher_name(),
                e,
                reply
            );
            BTreeMap::new()
        }
    }
}

/// Parse a model reply into a step-index-to-ingredients mapping.
///
/// The reply must be a JSON object whose keys are zero-based step
/// indices as decimal strings and whose values are arrays of strings.
/// Keys past the last instruction index are dropped with a warning.
pub fn parse_step_mapping(
    reply: &str,
    instruction_count: usize,
) -> Result<BTreeMap<usize, Vec<String>>, EnrichError> {
    let cleaned = strip_code_fences(reply);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| EnrichError::BadReply(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| EnrichError::BadReply("reply is not a JSON object".to_string()))?;

    let mut mapping = BTreeMap::new();
    for (key, entry) in object {
        let index: usize = key
            .parse()
            .map_err(|_| EnrichError::BadReply(format!("step key {:?} is not an integer", key)))?;

        let items = entry
            .as_array()
            .ok_or_else(|| EnrichError::BadReply(format!("value for step {} is not an array", key)))?
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    EnrichError::BadReply(format!("non-string ingredient in step {}", key))
                })
            })
            .collect::<Result<Vec<String>, EnrichError>>()?;

        if index >= instruction_count {
            warn!(
                "Dropping step key {} outside the {} instruction(s)",
                index, instruction_count
            );
            continue;
        }
        mapping.insert(index, items);
    }

    Ok(mapping)
}

/// Strip Markdown code-fence delimiters from a model reply.
///
/// Models often wrap JSON in a ``` fence, optionally tagged `json`.
/// Leading and trailing fences are removed independently, so partially
/// fenced input is tolerated; unfenced input passes through untouched.
pub fn strip_code_fences(reply: &str) -> &str {
    let mut text = reply.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // the opening fence may carry a language tag on the same line
        text = match rest.split_once('\n') {
            Some((_tag, body)) => body,
            None => rest.trim_start_matches("json"),
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedMatcher {
        reply: Result<String, ()>,
    }

    #[async_trait]
    impl StepMatcher for CannedMatcher {
        fn matcher_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, EnrichError> {
            self.reply
                .clone()
                .map_err(|_| EnrichError::EmptyReply)
        }
    }

    fn ingredients() -> Vec<Ingredient> {
        vec![
            Ingredient::from_line("2 cups flour"),
            Ingredient::from_line("salt"),
        ]
    }

    fn instructions() -> Vec<String> {
        vec!["Mix the flour".to_string(), "Season".to_string()]
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("{\"0\":[]}"), "{\"0\":[]}");
        assert_eq!(strip_code_fences("```json\n{\"0\":[]}\n```"), "{\"0\":[]}");
        assert_eq!(strip_code_fences("```\n{\"0\":[]}\n```"), "{\"0\":[]}");
        // partially fenced
        assert_eq!(strip_code_fences("```json\n{\"0\":[]}"), "{\"0\":[]}");
        assert_eq!(strip_code_fences("{\"0\":[]}\n```"), "{\"0\":[]}");
    }

    #[test]
    fn test_fenced_and_unfenced_parse_identically() {
        let fenced = "```json\n{\"0\":[]}\n```";
        let bare = "{\"0\":[]}";
        assert_eq!(
            parse_step_mapping(fenced, 1).unwrap(),
            parse_step_mapping(bare, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_step_mapping_reparse_is_stable() {
        let reply = r#"{"0": ["2 cups flour"], "1": ["salt"]}"#;
        let first = parse_step_mapping(reply, 2).unwrap();
        let second = parse_step_mapping(reply, 2).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.get(&0).unwrap(), &vec!["2 cups flour".to_string()]);
    }

    #[test]
    fn test_parse_step_mapping_rejects_non_integer_key() {
        let reply = r#"{"first": ["salt"]}"#;
        assert!(parse_step_mapping(reply, 2).is_err());
    }

    #[test]
    fn test_parse_step_mapping_rejects_non_array_value() {
        let reply = r#"{"0": "salt"}"#;
        assert!(parse_step_mapping(reply, 2).is_err());
    }

    #[test]
    fn test_parse_step_mapping_drops_out_of_range_keys() {
        let reply = r#"{"0": ["salt"], "7": ["flour"]}"#;
        let mapping = parse_step_mapping(reply, 2).unwrap();
        assert_eq!(mapping.len(), 1);
        assert!(mapping.contains_key(&0));
        assert!(!mapping.contains_key(&7));
    }

    #[tokio::test]
    async fn test_enrich_happy_path() {
        let matcher = CannedMatcher {
            reply: Ok("```json\n{\"0\": [\"2 cups flour\"], \"1\": [\"salt\"]}\n```".to_string()),
        };

        let mapping = enrich(&matcher, &ingredients(), &instructions()).await;
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(&1).unwrap(), &vec!["salt".to_string()]);
    }

    #[tokio::test]
    async fn test_enrich_malformed_reply_degrades_to_empty() {
        let matcher = CannedMatcher {
            reply: Ok("I think the flour goes in step one.".to_string()),
        };

        let mapping = enrich(&matcher, &ingredients(), &instructions()).await;
        assert!(mapping.is_empty());
    }

    #[tokio::test]
    async fn test_enrich_transport_failure_degrades_to_empty() {
        let matcher = CannedMatcher { reply: Err(()) };

        let mapping = enrich(&matcher, &ingredients(), &instructions()).await;
        assert!(mapping.is_empty());
    }

    #[tokio::test]
    async fn test_enrich_short_circuits_on_empty_input() {
        let matcher = CannedMatcher {
            reply: Ok(r#"{"0": []}"#.to_string()),
        };

        assert!(enrich(&matcher, &[], &instructions()).await.is_empty());
        assert!(enrich(&matcher, &ingredients(), &[]).await.is_empty());
    }
}
