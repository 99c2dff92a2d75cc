use std::sync::{Arc, Weak};

use crate::data_sources::search_result::SearchResult;
use crate::pipeline::{PipelineHandle, RequestPipeline, SearchCallback};

pub const INITIAL_TEXT: &str = "Presenter initialized!";
pub const END_REQUEST_TEXT: &str = "Request finished";

/// The surface the presenter drives.
///
/// Implementations are called from the delivery context only, and must handle
/// their own interior mutability.
pub trait GifView: Send + Sync + 'static {
    fn display_message(&self, text: &str);

    fn update_results(&self, data: Arc<SearchResult>);

    /// Raised by the surface when the user picks an image.
    fn on_item_tapped(&self, url: &str) {
        self.display_message(url);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterState {
    Idle,
    Active,
}

/// Forwards pipeline outcomes to a view it does not own. Once the view has
/// been dropped every callback turns into a no-op.
pub struct ViewCallback<V: GifView> {
    view: Weak<V>,
}

impl<V: GifView> ViewCallback<V> {
    pub fn new(view: Weak<V>) -> Self {
        Self { view }
    }

    fn with_view(&self, f: impl FnOnce(&V)) {
        match self.view.upgrade() {
            Some(view) => f(&view),
            None => tracing::debug!("View released before delivery, dropping callback"),
        }
    }
}

impl<V: GifView> SearchCallback for ViewCallback<V> {
    fn on_success(&mut self, result: SearchResult) {
        self.with_view(|view| view.update_results(Arc::new(result)));
    }

    fn on_error(&mut self, cause: anyhow::Error) {
        self.with_view(|view| view.display_message(&format!("{:#}", cause)));
    }

    fn on_finished(&mut self) {
        self.with_view(|view| view.display_message(END_REQUEST_TEXT));
    }
}

/// Drives one search per activation of the surface it is bound to.
pub struct EntryPresenter<V: GifView> {
    pipeline: RequestPipeline,
    query: String,
    view: Option<Weak<V>>,
    state: PresenterState,
    handle: Option<PipelineHandle>,
}

impl<V: GifView> EntryPresenter<V> {
    pub fn new(pipeline: RequestPipeline, query: String) -> Self {
        Self {
            pipeline,
            query,
            view: None,
            state: PresenterState::Idle,
            handle: None,
        }
    }

    /// Remembers `view` without taking ownership of it. Does not start any work.
    pub fn bind(&mut self, view: &Arc<V>) {
        self.view = Some(Arc::downgrade(view));
    }

    /// Called when the surface becomes visible.
    ///
    /// A request still outstanding from an earlier activation is cancelled and
    /// replaced by a fresh one.
    pub fn activate(&mut self) {
        let Some(view) = self.view.clone() else {
            tracing::warn!("Activated without a bound view, ignoring");
            return;
        };
        let Some(live) = view.upgrade() else {
            tracing::warn!("Activated after the view was released, ignoring");
            self.deactivate();
            return;
        };

        if let Some(previous) = self.handle.take() {
            let state = previous.cancel();
            tracing::info!(?state, "Superseding previous search");
        }

        live.display_message(INITIAL_TEXT);
        drop(live);

        let handle = self.pipeline.submit(&self.query, ViewCallback::new(view));
        self.handle = Some(handle);
        self.state = PresenterState::Active;
        tracing::info!(query = %self.query, "Presenter activated");
    }

    /// Called when the surface is hidden. Never waits for the network call.
    pub fn deactivate(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
        if self.state == PresenterState::Active {
            tracing::info!("Presenter deactivated");
        }
        self.state = PresenterState::Idle;
    }

    pub fn state(&self) -> PresenterState {
        self.state
    }

    /// Handle of the search started by the current activation, if any.
    pub fn handle(&self) -> Option<&PipelineHandle> {
        self.handle.as_ref()
    }
}

impl<V: GifView> Drop for EntryPresenter<V> {
    fn drop(&mut self) {
        self.deactivate();
    }
}
