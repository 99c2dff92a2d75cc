use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use crate::data_sources::search_result::SearchResult;
use crate::presenter::GifView;

/// Renders the surface as plain text: status lines prefixed with `>`, results
/// as a numbered list. Rows are picked by number.
pub struct TerminalView<W: Write + Send + 'static> {
    out: Mutex<W>,
    results: Mutex<Option<Arc<SearchResult>>>,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + 'static> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            results: Mutex::new(None),
        }
    }

    /// Taps the row numbered `row` (1-based, as rendered). Returns the URL
    /// tapped, or `None` when no results are shown or the row doesn't exist.
    pub fn tap_row(&self, row: usize) -> Option<String> {
        let results = self
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        if row == 0 || row > results.len() {
            return None;
        }
        let url = results.url_at(row - 1).to_owned();
        self.on_item_tapped(&url);
        Some(url)
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lines(&self, lines: impl IntoIterator<Item = String>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        for line in lines {
            if let Err(error) = writeln!(out, "{}", line) {
                tracing::warn!(%error, "Failed to write to terminal");
                return;
            }
        }
        if let Err(error) = out.flush() {
            tracing::warn!(%error, "Failed to flush terminal");
        }
    }
}

impl<W: Write + Send + 'static> GifView for TerminalView<W> {
    fn display_message(&self, text: &str) {
        self.write_lines([format!("> {}", text)]);
    }

    fn update_results(&self, data: Arc<SearchResult>) {
        let lines: Vec<String> = data
            .urls()
            .enumerate()
            .map(|(index, url)| format!("{:>3}. {}", index + 1, url))
            .collect();
        *self.results.lock().unwrap_or_else(PoisonError::into_inner) = Some(data);
        self.write_lines(lines);
    }
}
