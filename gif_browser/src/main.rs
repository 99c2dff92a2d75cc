use std::sync::Arc;

use anyhow::Context;
use gif_browser::data_sources::giphy_api::PUBLIC_BETA_API_KEY;
use gif_browser::{
    build_http_client, event_loop, initialise_tracing, Configuration, EntryPresenter, GiphyApi,
    RequestPipeline, TerminalView,
};
use std::io::BufRead;
use std::thread;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

fn load_config() -> Result<Configuration, anyhow::Error> {
    Ok(Configuration {
        giphy_api_base_url: "http://api.giphy.com".into(),
        giphy_api_key: PUBLIC_BETA_API_KEY.into(),
        query: "barcelona".into(),
    })
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    initialise_tracing("gif_browser=info,warn")?;
    let config = load_config().context("Failed to load configuration")?;

    let client = build_http_client()?;
    let api = GiphyApi::new(config.giphy_api_base_url, config.giphy_api_key, client);
    let (dispatcher, mut event_loop) = event_loop();
    let pipeline = RequestPipeline::new(api, Handle::current(), dispatcher);

    let view = Arc::new(TerminalView::stdout());
    let mut presenter = EntryPresenter::new(pipeline, config.query);
    presenter.bind(&view);
    presenter.activate();

    // The surface stays visible until Ctrl-C, or until stdin closes and the
    // search has been delivered. Typing a row number taps that image.
    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = event_loop.turn() => {}
            line = lines.recv(), if stdin_open => match line {
                Some(line) => match line.trim().parse::<usize>() {
                    Ok(row) => {
                        if view.tap_row(row).is_none() {
                            tracing::info!(row, "No image at that row");
                        }
                    }
                    Err(_) => tracing::info!("Type a row number to see the image details"),
                },
                None => stdin_open = false,
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
        }

        let searching = presenter.handle().is_some_and(|handle| handle.is_pending());
        if !stdin_open && !searching {
            break;
        }
    }

    presenter.deactivate();
    drop(view);
    event_loop.run_pending();
    Ok(())
}

/// Reads stdin on a detached thread so a pending read never holds up shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (sender, receiver) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "Failed to read from stdin");
                    break;
                }
            }
        }
    });
    receiver
}
