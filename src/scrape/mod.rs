//! The scraping stage: fetch a recipe page and read its schema.org
//! Recipe data, with per-field defaults for anything the site omits.

mod json_ld;

pub use json_ld::{ScrapedRecipe, DEFAULT_TITLE, DEFAULT_YIELDS};

use crate::config::AppConfig;
use crate::error::ExtractError;
use log::debug;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;

/// Build the HTTP client used for page fetches.
///
/// A browser-like User-Agent reduces the chance the source site blocks
/// the request.
pub fn build_client(config: &AppConfig) -> Result<Client, ExtractError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .user_agent(&config.user_agent)
        .build()?;
    Ok(client)
}

/// Fetch `url` and extract the first recipe found on the page.
pub async fn scrape(client: &Client, url: &str) -> Result<ScrapedRecipe, ExtractError> {
    debug!("Fetching recipe page: {}", url);
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::Http(status.as_u16()));
    }

    let body = response.text().await?;
    let document = Html::parse_document(&body);

    json_ld::extract_recipe_node(&document).ok_or(ExtractError::NoRecipeFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn test_config() -> AppConfig {
        AppConfig {
            api_key: None,
            gemini: Default::default(),
            bind_addr: "127.0.0.1:0".to_string(),
            timeout: 5,
            user_agent: "test-agent".to_string(),
        }
    }

    #[tokio::test]
    async fn test_scrape_finds_json_ld_recipe() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/recipe")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(
                r#"
                <html><head>
                <script type="application/ld+json">
                {
                    "@type": "Recipe",
                    "name": "Toast",
                    "recipeIngredient": ["1 slice bread"],
                    "recipeInstructions": ["Toast the bread"]
                }
                </script>
                </head><body></body></html>
                "#,
            )
            .create_async()
            .await;

        let client = build_client(&test_config()).unwrap();
        let url = format!("{}/recipe", server.url());
        let recipe = scrape(&client, &url).await.unwrap();

        assert_eq!(recipe.title, "Toast");
        assert_eq!(recipe.ingredients.len(), 1);
        assert_eq!(recipe.instructions.len(), 1);
    }

    #[tokio::test]
    async fn test_scrape_surfaces_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = build_client(&test_config()).unwrap();
        let url = format!("{}/missing", server.url());
        let err = scrape(&client, &url).await.unwrap_err();

        assert!(matches!(err, ExtractError::Http(404)));
    }

    #[tokio::test]
    async fn test_scrape_without_recipe_is_no_recipe_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/plain")
            .with_status(200)
            .with_body("<html><body><p>Just a blog post</p></body></html>")
            .create_async()
            .await;

        let client = build_client(&test_config()).unwrap();
        let url = format!("{}/plain", server.url());
        let err = scrape(&client, &url).await.unwrap_err();

        assert!(matches!(err, ExtractError::NoRecipeFound));
    }
}
