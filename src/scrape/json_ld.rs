use html_escape::decode_html_entities;
use log::{debug, warn};
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

/// Placeholder title when the page does not name the recipe
pub const DEFAULT_TITLE: &str = "Untitled recipe";
/// Placeholder yield when the page does not state one
pub const DEFAULT_YIELDS: &str = "N/A";

/// Raw recipe fields as read off the page, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedRecipe {
    pub title: String,
    pub image: Option<String>,
    pub total_time: u64,
    pub yields: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageType {
    String(String),
    Object(ImageObject),
    // potentially multiple images as objects
    MultipleStrings(Vec<String>),
    MultipleObjects(Vec<ImageObject>),
}

#[derive(Debug, Deserialize)]
struct InstructionObject {
    text: Option<String>,
    description: Option<String>,
    #[serde(rename = "itemListElement")]
    item_list_element: Option<Vec<InstructionObject>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeInstructions {
    String(String),
    Multiple(Vec<String>),
    // HowToStep and HowToSection nodes, possibly mixed
    Objects(Vec<InstructionObject>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeYield {
    String(String),
    Number(u64),
    Multiple(Vec<Value>),
}

fn decode_html_symbols(text: &str) -> String {
    // for some reason need to decode twice to get the correct string
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

/// Extract the first schema.org Recipe from a parsed HTML document.
///
/// Every field is read independently: a missing or malformed field gets
/// its documented default rather than failing the whole extraction.
pub fn extract_recipe_node(document: &Html) -> Option<ScrapedRecipe> {
    let selector = Selector::parse("script[type='application/ld+json']")
        .expect("static selector is valid");

    for script in document.select(&selector) {
        let cleaned_json = sanitize_json(&script.inner_html());
        let Ok(json_ld) = serde_json::from_str::<Value>(&cleaned_json) else {
            debug!("Skipping ld+json block that is not valid JSON");
            continue;
        };

        if let Some(node) = find_recipe_node(&json_ld) {
            debug!("Found recipe node: {:#?}", node);
            return Some(read_recipe_fields(node));
        }
    }

    None
}

/// Locate a Recipe node in a JSON-LD document: a top-level object, an
/// entry of a top-level array, or a member of an `@graph` container.
fn find_recipe_node(json_ld: &Value) -> Option<&Value> {
    if is_recipe_node(json_ld) {
        return Some(json_ld);
    }
    if let Some(items) = json_ld.as_array() {
        return items.iter().find(|item| is_recipe_node(item));
    }
    if let Some(graph) = json_ld.get("@graph").and_then(Value::as_array) {
        return graph.iter().find(|item| is_recipe_node(item));
    }
    None
}

fn is_recipe_node(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(ty)) => ty.eq_ignore_ascii_case("recipe"),
        // some sites declare multiple types, e.g. ["Recipe", "NewsArticle"]
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|ty| ty.eq_ignore_ascii_case("recipe")),
        _ => node.get("recipeIngredient").is_some() && node.get("recipeInstructions").is_some(),
    }
}

/// Read each recipe field with its own fallback. A field the site omits
/// or encodes in an unexpected shape degrades to a default; it never
/// aborts the extraction.
fn read_recipe_fields(node: &Value) -> ScrapedRecipe {
    let title = node
        .get("name")
        .and_then(Value::as_str)
        .map(decode_html_symbols)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let image = node
        .get("image")
        .cloned()
        .and_then(|value| serde_json::from_value::<ImageType>(value).ok())
        .and_then(first_image);

    let total_time = node
        .get("totalTime")
        .and_then(duration_minutes)
        .unwrap_or(0);

    let yields = node
        .get("recipeYield")
        .cloned()
        .and_then(|value| serde_json::from_value::<RecipeYield>(value).ok())
        .and_then(yield_text)
        .unwrap_or_else(|| DEFAULT_YIELDS.to_string());

    let ingredients = node
        .get("recipeIngredient")
        .and_then(Value::as_array)
        .map(|lines| {
            lines
                .iter()
                .filter_map(Value::as_str)
                .map(decode_html_symbols)
                .filter(|line| !line.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let instructions = node
        .get("recipeInstructions")
        .cloned()
        .and_then(|value| {
            serde_json::from_value::<RecipeInstructions>(value)
                .map_err(|e| warn!("Unreadable recipeInstructions shape: {}", e))
                .ok()
        })
        .map(instruction_lines)
        .unwrap_or_default();

    ScrapedRecipe {
        title,
        image,
        total_time,
        yields,
        ingredients,
        instructions,
    }
}

fn first_image(image: ImageType) -> Option<String> {
    match image {
        ImageType::String(url) => Some(url),
        ImageType::Object(img) => Some(img.url),
        ImageType::MultipleStrings(urls) => urls.into_iter().next(),
        ImageType::MultipleObjects(imgs) => imgs.into_iter().next().map(|img| img.url),
    }
    .filter(|url| !url.is_empty())
}

fn yield_text(recipe_yield: RecipeYield) -> Option<String> {
    match recipe_yield {
        RecipeYield::String(text) => Some(decode_html_symbols(&text)),
        RecipeYield::Number(servings) => Some(servings.to_string()),
        RecipeYield::Multiple(values) => values.into_iter().next().and_then(|value| match value {
            Value::String(text) => Some(decode_html_symbols(&text)),
            Value::Number(servings) => Some(servings.to_string()),
            _ => None,
        }),
    }
    .filter(|text| !text.is_empty())
}

fn instruction_lines(instructions: RecipeInstructions) -> Vec<String> {
    match instructions {
        RecipeInstructions::String(text) => decode_html_symbols(&text)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        RecipeInstructions::Multiple(steps) => steps
            .iter()
            .map(|step| decode_html_symbols(step))
            .filter(|step| !step.is_empty())
            .collect(),
        RecipeInstructions::Objects(objects) => {
            let mut steps = Vec::new();
            for object in objects {
                collect_instruction_object(object, &mut steps);
            }
            steps
        }
    }
}

fn collect_instruction_object(object: InstructionObject, steps: &mut Vec<String>) {
    if let Some(text) = object.text.or(object.description) {
        let decoded = decode_html_symbols(&text);
        if !decoded.is_empty() {
            steps.push(decoded);
        }
    }
    // HowToSection: recurse into the grouped steps
    if let Some(children) = object.item_list_element {
        for child in children {
            collect_instruction_object(child, steps);
        }
    }
}

/// Parse a schema.org duration into whole minutes.
///
/// Accepts ISO-8601 durations (`PT1H30M`, `P0DT45M`, `PT90S`) and bare
/// numbers, which some sites emit and which mean minutes.
fn duration_minutes(value: &Value) -> Option<u64> {
    if let Some(minutes) = value.as_u64() {
        return Some(minutes);
    }
    let text = value.as_str()?.trim().to_ascii_uppercase();
    let rest = text.strip_prefix('P')?;

    let mut minutes: u64 = 0;
    let mut number = String::new();
    let mut in_time = false;
    for ch in rest.chars() {
        match ch {
            'T' => in_time = true,
            '0'..='9' => number.push(ch),
            '.' | ',' => number.push('.'),
            'D' | 'H' | 'M' | 'S' | 'W' | 'Y' => {
                let amount: f64 = number.parse().ok()?;
                number.clear();
                let factor = match (ch, in_time) {
                    ('W', _) => 7.0 * 24.0 * 60.0,
                    ('D', _) => 24.0 * 60.0,
                    ('H', _) => 60.0,
                    ('M', true) => 1.0,
                    // calendar months are ambiguous; no recipe uses them
                    ('M', false) => return None,
                    ('S', _) => 1.0 / 60.0,
                    ('Y', _) => return None,
                    _ => unreachable!(),
                };
                minutes += (amount * factor) as u64;
            }
            _ => return None,
        }
    }
    if number.is_empty() {
        Some(minutes)
    } else {
        None
    }
}

// Clean common site quirks out of ld+json blocks before parsing
fn sanitize_json(json_str: &str) -> String {
    let mut cleaned = json_str.trim().to_string();

    if !cleaned.starts_with('{') && !cleaned.starts_with('[') {
        if let Some(start) = cleaned.find('{') {
            cleaned = cleaned[start..].to_string();
        }
    }

    // Trailing commas and stray HTML comments show up in the wild
    cleaned = cleaned.replace(",]", "]").replace(",}", "}");
    cleaned = cleaned.replace("<!--", "").replace("-->", "");

    cleaned
}
