
use self::mocks::MockGiphyApi;
use self::recording::RecordingView;
use gif_browser::data_sources::giphy_api::PUBLIC_BETA_API_KEY;
use gif_browser::{
    build_http_client, event_loop, initialise_tracing, Configuration, Dispatcher, EntryPresenter,
    EventLoop, GiphyApi, PipelineHandle, RequestPipeline,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::OnceCell;

static TRACING_INIT: OnceCell<()> = OnceCell::const_new();

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

pub const QUERY: &str = "cats";

/// Installs the global subscriber once for the whole test binary. Set
/// `RUST_LOG` to see the pipeline's logs.
async fn initialise_telemetry() {
    TRACING_INIT
        .get_or_init(|| async {
            initialise_tracing("warn").expect("Failed to initialise tracing");
        })
        .await;
}

pub struct TestHarness {
    /// The configuration the presenter and pipelines were built from.
    pub config: Configuration,

    /// The mock Giphy API every request is sent to.
    pub mock_giphy_api: MockGiphyApi,

    /// The view bound to `presenter`. The presenter only holds a weak
    /// reference, so dropping this releases the surface.
    pub view: Arc<RecordingView>,

    pub presenter: EntryPresenter<RecordingView>,

    /// The delivery context. Nothing reaches a callback until a test turns it.
    pub event_loop: EventLoop,

    dispatcher: Dispatcher,
}

impl TestHarness {
    /// Starts a mock Giphy API and a presenter searching it for [`QUERY`],
    /// bound to a fresh [`RecordingView`].
    pub async fn start() -> TestHarness {
        initialise_telemetry().await;
        let mock_giphy_api = MockGiphyApi::new().await;

        let config = Configuration {
            giphy_api_base_url: mock_giphy_api.base_url(),
            giphy_api_key: PUBLIC_BETA_API_KEY.into(),
            query: QUERY.into(),
        };

        let (dispatcher, event_loop) = event_loop();
        let pipeline = build_pipeline(&config, dispatcher.clone());
        let view = Arc::new(RecordingView::default());
        let mut presenter = EntryPresenter::new(pipeline, config.query.clone());
        presenter.bind(&view);

        TestHarness {
            config,
            mock_giphy_api,
            view,
            presenter,
            event_loop,
            dispatcher,
        }
    }

    /// Another pipeline against the same mock API, delivering on the same
    /// event loop.
    pub fn pipeline(&self) -> RequestPipeline {
        self.pipeline_against(self.config.giphy_api_base_url.clone())
    }

    /// A pipeline against `base_url`, delivering on the harness event loop.
    pub fn pipeline_against(&self, base_url: String) -> RequestPipeline {
        let config = Configuration {
            giphy_api_base_url: base_url,
            ..self.config.clone()
        };
        build_pipeline(&config, self.dispatcher.clone())
    }

    /// Turns the event loop until `handle` is no longer pending.
    pub async fn settle(&mut self, handle: &PipelineHandle) {
        let event_loop = &mut self.event_loop;
        tokio::time::timeout(DELIVERY_TIMEOUT, async {
            while handle.is_pending() {
                event_loop.turn().await;
            }
        })
        .await
        .expect("Search was not delivered in time");
    }

    /// Turns the event loop until the presenter's current search has been
    /// delivered.
    pub async fn settle_presenter(&mut self) {
        let handle = self
            .presenter
            .handle()
            .cloned()
            .expect("Presenter has no search in flight");
        self.settle(&handle).await;
    }

    /// Waits, without turning the event loop, until a delivery is queued.
    pub async fn wait_for_queued_delivery(&self) {
        tokio::time::timeout(DELIVERY_TIMEOUT, async {
            while self.event_loop.queued() == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("No delivery was queued in time");
    }

    /// Turns the event loop for `period`, running whatever arrives.
    pub async fn pump_for(&mut self, period: Duration) {
        let event_loop = &mut self.event_loop;
        let _ = tokio::time::timeout(period, async {
            while event_loop.turn().await {}
        })
        .await;
    }
}

fn build_pipeline(config: &Configuration, dispatcher: Dispatcher) -> RequestPipeline {
    let client = build_http_client().expect("Failed to build http client");
    let api = GiphyApi::new(
        config.giphy_api_base_url.clone(),
        config.giphy_api_key.clone(),
        client,
    );
    RequestPipeline::new(api, Handle::current(), dispatcher)
}
