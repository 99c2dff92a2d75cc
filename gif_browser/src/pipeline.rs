//! Asynchronous, cancellable search requests.
//!
//! A submission runs the Giphy call on a background runtime and then posts its
//! outcome to a [`Dispatcher`]. The matching [`EventLoop`] is the foreground
//! context: it runs delivered jobs one at a time, in the order they arrive, so
//! no two callbacks ever overlap.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{instrument, Instrument};

use crate::data_sources::giphy_api::GiphyApi;
use crate::data_sources::search_result::SearchResult;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Sending half of the delivery context. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    sender: mpsc::UnboundedSender<Job>,
}

/// Receiving half of the delivery context. Owned by whatever plays the role
/// of the foreground thread.
pub struct EventLoop {
    receiver: mpsc::UnboundedReceiver<Job>,
}

pub fn event_loop() -> (Dispatcher, EventLoop) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Dispatcher { sender }, EventLoop { receiver })
}

impl Dispatcher {
    /// Queues `job` for the event loop. Returns `false` if the loop is gone.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) -> bool {
        self.sender.send(Box::new(job)).is_ok()
    }
}

impl EventLoop {
    /// Waits for the next job and runs it. Returns `false` once every
    /// dispatcher has been dropped and the queue is drained.
    pub async fn turn(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Number of jobs waiting to run.
    pub fn queued(&self) -> usize {
        self.receiver.len()
    }

    /// Runs every job already queued without waiting for more.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }
}

/// Receives the outcome of one submission on the delivery context.
///
/// Exactly one of `on_success` / `on_error` is called, followed by
/// `on_finished`, unless the submission was cancelled first.
pub trait SearchCallback: Send + 'static {
    fn on_success(&mut self, result: SearchResult);
    fn on_error(&mut self, cause: anyhow::Error);
    fn on_finished(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Completed,
    Cancelled,
}

const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const CANCELLED: u8 = 2;

/// One outstanding request.
///
/// Cancelling only suppresses delivery: the HTTP call already in flight is
/// left to finish and its outcome is discarded.
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    state: Arc<AtomicU8>,
}

impl PipelineHandle {
    fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
        }
    }

    /// Suppresses every callback that has not started yet. Has no effect once
    /// delivery has begun, and calling it again is a no-op.
    pub fn cancel(&self) -> PipelineState {
        match self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => PipelineState::Cancelled,
            Err(current) => decode_state(current),
        }
    }

    pub fn state(&self) -> PipelineState {
        decode_state(self.state.load(Ordering::Acquire))
    }

    pub fn is_pending(&self) -> bool {
        self.state() == PipelineState::Pending
    }

    /// Claims the right to deliver. Loses against an earlier `cancel`.
    fn begin_delivery(&self) -> bool {
        self.state
            .compare_exchange(PENDING, COMPLETED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

fn decode_state(raw: u8) -> PipelineState {
    match raw {
        PENDING => PipelineState::Pending,
        COMPLETED => PipelineState::Completed,
        _ => PipelineState::Cancelled,
    }
}

pub struct RequestPipeline {
    api: Arc<GiphyApi>,
    background: Handle,
    delivery: Dispatcher,
}

impl RequestPipeline {
    pub fn new(api: GiphyApi, background: Handle, delivery: Dispatcher) -> Self {
        Self {
            api: Arc::new(api),
            background,
            delivery,
        }
    }

    /// Starts a search for `query`; `callback` hears about it on the
    /// delivery context.
    #[instrument(skip(self, callback))]
    pub fn submit<C: SearchCallback>(&self, query: &str, mut callback: C) -> PipelineHandle {
        let handle = PipelineHandle::new();
        let api = Arc::clone(&self.api);
        let delivery = self.delivery.clone();
        let task_handle = handle.clone();
        let query = query.to_owned();

        tracing::debug!("Submitting search");
        self.background.spawn(async move {
            let outcome = api.search(&query).await;
            if !task_handle.is_pending() {
                tracing::debug!("Search cancelled before it resolved");
                return;
            }

            let posted = delivery.post(move || {
                if !task_handle.begin_delivery() {
                    tracing::debug!("Delivery suppressed by cancellation");
                    return;
                }
                match outcome {
                    Ok(result) => {
                        tracing::debug!(items = result.len(), "Delivering search result");
                        callback.on_success(result);
                    }
                    Err(cause) => {
                        tracing::debug!(error = %format!("{:#}", cause), "Delivering search error");
                        callback.on_error(cause);
                    }
                }
                callback.on_finished();
            });
            if !posted {
                tracing::debug!("Event loop closed, dropping search outcome");
            }
        }
        .in_current_span());

        handle
    }
}
