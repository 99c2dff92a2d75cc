use anyhow::Context;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest_middleware::ClientWithMiddleware;
use tracing::instrument;

use super::search_result::SearchResult;

/// Public beta key published with the Giphy API samples.
pub const PUBLIC_BETA_API_KEY: &str = "dc6zaTOxFJmzC";

pub const SEARCH_PATH: &str = "/v1/gifs/search";

pub struct GiphyApi {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl GiphyApi {
    pub fn new(base_url: String, api_key: String, client: ClientWithMiddleware) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchResult, anyhow::Error> {
        // For an example, see: http://api.giphy.com/v1/gifs/search?q=cats&api_key=dc6zaTOxFJmzC
        // Errors are stripped of the request url so the api key never ends up
        // in a message shown to the user.
        let response = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .query(&[("q", query), ("api_key", self.api_key.as_str())])
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(without_url)
            .context("Failed to make request")?
            .error_for_status()
            .map_err(reqwest::Error::without_url)
            .context("Giphy API returned an error status")?
            .json::<SearchResult>()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Invalid response returned")?;

        tracing::debug!(items = response.len(), "Decoded search result");
        Ok(response)
    }
}

fn without_url(error: reqwest_middleware::Error) -> anyhow::Error {
    match error {
        reqwest_middleware::Error::Reqwest(error) => error.without_url().into(),
        reqwest_middleware::Error::Middleware(error) => error,
    }
}
