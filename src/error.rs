use thiserror::Error;

/// Errors that can occur while extracting a recipe from a URL
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Failed to fetch the page
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The page responded with a non-success status
    #[error("Page returned HTTP {0}")]
    Http(u16),

    /// The page carried no usable schema.org Recipe data
    #[error("No recipe found on this page")]
    NoRecipeFound,

    /// Recipe data was present but could not be read
    #[error("Failed to parse recipe: {0}")]
    Parse(String),

    /// Error parsing HTTP headers
    #[error("Header parse error: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Errors internal to the step-ingredient enrichment stage.
///
/// These never surface to the caller: the enricher degrades to an
/// empty mapping and logs the failure instead.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model reply carried no text content")]
    EmptyReply,

    #[error("Model reply was not valid JSON: {0}")]
    BadReply(String),
}
