pub mod configuration;
pub mod data_sources;
pub mod pipeline;
pub mod presenter;
pub mod telemetry;
pub mod terminal_view;

pub use configuration::Configuration;
pub use data_sources::giphy_api::GiphyApi;
pub use data_sources::search_result::SearchResult;
pub use pipeline::{
    event_loop, Dispatcher, EventLoop, PipelineHandle, PipelineState, RequestPipeline,
    SearchCallback,
};
pub use presenter::{EntryPresenter, GifView, PresenterState, ViewCallback};
pub use telemetry::initialise_tracing;
pub use terminal_view::TerminalView;

use anyhow::Context;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

/// HTTP client shared by every data source: plain reqwest with a tracing
/// span around each outgoing request.
pub fn build_http_client() -> Result<ClientWithMiddleware, anyhow::Error> {
    let client = ClientBuilder::new(
        reqwest::ClientBuilder::new()
            .build()
            .context("Failed to build http client")?,
    )
    .with(TracingMiddleware::default())
    .build();
    Ok(client)
}
