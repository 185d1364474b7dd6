use serde::Serialize;
use std::collections::BTreeMap;

/// A single ingredient line, optionally split into a leading
/// quantity token and the remainder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub item: String,
    pub quantity: Option<String>,
}

impl Ingredient {
    /// Split a raw ingredient line into quantity and item.
    ///
    /// The first whitespace-delimited token becomes the quantity when the
    /// line has more than one token; a single-token line is all item.
    pub fn from_line(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some((quantity, rest)) => Ingredient {
                item: rest.trim_start().to_string(),
                quantity: Some(quantity.to_string()),
            },
            None => Ingredient {
                item: trimmed.to_string(),
                quantity: None,
            },
        }
    }

    /// The line as the source site printed it, for prompts and display.
    pub fn display_line(&self) -> String {
        match &self.quantity {
            Some(quantity) => format!("{} {}", quantity, self.item),
            None => self.item.clone(),
        }
    }
}

/// The normalized recipe returned to callers.
///
/// Field names follow the established wire format: camelCase for the
/// scalar fields, `step_ingredients` for the enrichment map.
#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub title: String,
    pub image: Option<String>,
    #[serde(rename = "totalTime")]
    pub total_time: u64,
    pub yields: String,
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    /// Zero-based instruction index to the ingredients used in that step.
    /// Always present; empty when enrichment is disabled or failed.
    pub step_ingredients: BTreeMap<usize, Vec<String>>,
}
