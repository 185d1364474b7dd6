pub mod config;
pub mod enrich;
pub mod error;
pub mod model;
pub mod scrape;
pub mod server;

pub use config::AppConfig;
pub use error::{EnrichError, ExtractError};
pub use model::{Ingredient, Recipe};

use log::{debug, info};
use reqwest::Client;
use std::time::Instant;

/// Fetch a recipe page and normalize it into a [`Recipe`].
///
/// The `step_ingredients` map is left empty here; the enrichment stage
/// fills it in when a model credential is configured.
pub async fn extract_recipe(client: &Client, url: &str) -> Result<Recipe, ExtractError> {
    let started = Instant::now();
    let scraped = scrape::scrape(client, url).await?;
    debug!(
        "Scraped {} ingredient(s) and {} instruction(s) in {:?}",
        scraped.ingredients.len(),
        scraped.instructions.len(),
        started.elapsed()
    );

    let ingredients = scraped
        .ingredients
        .iter()
        .map(|line| Ingredient::from_line(line))
        .collect();

    Ok(Recipe {
        title: scraped.title,
        image: scraped.image,
        total_time: scraped.total_time,
        yields: scraped.yields,
        source_url: url.to_string(),
        ingredients,
        instructions: scraped.instructions,
        step_ingredients: Default::default(),
    })
}

/// Run the whole pipeline for one URL: extraction plus, when a Gemini
/// key is configured, step-ingredient enrichment.
pub async fn extract_and_enrich(
    client: &Client,
    config: &AppConfig,
    url: &str,
) -> Result<Recipe, ExtractError> {
    let mut recipe = extract_recipe(client, url).await?;

    if let Some(matcher) = enrich::GeminiClient::from_config(&config.gemini) {
        let started = Instant::now();
        recipe.step_ingredients =
            enrich::enrich(&matcher, &recipe.ingredients, &recipe.instructions).await;
        info!(
            "Matched ingredients for {} of {} step(s) in {:?}",
            recipe.step_ingredients.len(),
            recipe.instructions.len(),
            started.elapsed()
        );
    } else {
        debug!("No Gemini API key configured, skipping step-ingredient matching");
    }

    Ok(recipe)
}
