//! Startup sequence: credential, then dataset, then map view.
//!
//! Any failure stops the sequence where it happened, is logged with its
//! full cause, and is shown on the [`FailureSurface`] in place of the
//! visualization. Nothing is retried. In particular the map view is never
//! constructed without a credential.

use std::time::Duration;

use globe_dataset::{DatasetError, DatasetSource};
use globe_playback::{PlaybackConfig, SceneRenderer, Session, ViewOptions};

use crate::config::AppConfig;
use crate::credentials::{
    CredentialError, CredentialProvider, EnvCredentialProvider, HttpCredentialProvider,
};

/// Heading of the failure message.
pub const FAILURE_TITLE: &str = "Failed to load visualization";

/// Footnote of the failure message.
pub const FAILURE_HINT: &str = "Please check console for details";

/// Coarse class of a startup failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing credential or unusable settings.
    Configuration,
    /// The credential or dataset could not be transferred.
    Network,
    /// The dataset was received but is malformed or empty.
    Data,
}

/// The rendering engine refused to create a view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ViewError {
    /// Reason reported by the engine.
    pub message: String,
}

/// Errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The credential could not be obtained.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The dataset could not be loaded.
    #[error("failed to load dataset: {0}")]
    Dataset(#[from] DatasetError),

    /// The map view could not be created.
    #[error("failed to create map view: {0}")]
    View(#[from] ViewError),
}

impl BootstrapError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Credential(e) if e.is_configuration() => FailureKind::Configuration,
            Self::Credential(_) => FailureKind::Network,
            Self::Dataset(e) if e.is_transport() => FailureKind::Network,
            Self::Dataset(_) => FailureKind::Data,
            Self::View(_) => FailureKind::Configuration,
        }
    }
}

/// Text displayed in place of the visualization after a startup failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureMessage {
    /// Heading.
    pub title: &'static str,
    /// The error, as displayed to the user.
    pub detail: String,
    /// Footnote.
    pub hint: &'static str,
}

impl From<&BootstrapError> for FailureMessage {
    fn from(e: &BootstrapError) -> Self {
        Self {
            title: FAILURE_TITLE,
            detail: e.to_string(),
            hint: FAILURE_HINT,
        }
    }
}

/// Where startup failures are shown.
pub trait FailureSurface {
    /// Replaces the visualization area with `failure`.
    fn show_failure(&mut self, failure: &FailureMessage);
}

/// Creates map views from a credential.
///
/// The returned renderer must have finished loading its style, so the
/// session can apply fog and register the ring layer right away.
pub trait ViewFactory {
    /// Renderer backing the created view.
    type Renderer: SceneRenderer;

    /// Creates a view authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if the engine cannot create the view.
    fn create_view(
        &mut self,
        token: &str,
        options: &ViewOptions,
    ) -> Result<Self::Renderer, ViewError>;
}

/// Everything needed to bring a visualization up.
pub struct Bootstrap {
    credentials: Box<dyn CredentialProvider>,
    dataset: DatasetSource,
    client: reqwest::Client,
    fetch_timeout: Duration,
    view: ViewOptions,
    playback: PlaybackConfig,
}

impl Bootstrap {
    /// Uses `credentials` and the rest of `config`.
    #[must_use]
    pub fn new(
        credentials: Box<dyn CredentialProvider>,
        config: &AppConfig,
        client: reqwest::Client,
    ) -> Self {
        Self {
            credentials,
            dataset: config.dataset_source(),
            fetch_timeout: config.fetch_timeout(),
            view: config.view.clone(),
            playback: config.playback.clone(),
            client,
        }
    }

    /// Picks the credential provider from `config`: the token endpoint
    /// when `sources.token_url` is set, the environment otherwise.
    #[must_use]
    pub fn from_config(config: &AppConfig, client: reqwest::Client) -> Self {
        let credentials: Box<dyn CredentialProvider> = match &config.sources.token_url {
            Some(url) => Box::new(HttpCredentialProvider::new(
                client.clone(),
                url.clone(),
                config.fetch_timeout(),
            )),
            None => Box::new(EnvCredentialProvider::new(config.sources.token_env.clone())),
        };
        Self::new(credentials, config, client)
    }

    /// Runs the startup sequence and returns a stopped session on a loaded
    /// view with rotation enabled.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] after showing it on `surface`.
    #[allow(clippy::future_not_send)]
    pub async fn initialize<F: ViewFactory>(
        &self,
        factory: &mut F,
        surface: &mut dyn FailureSurface,
    ) -> Result<Session<F::Renderer>, BootstrapError> {
        match self.try_initialize(factory).await {
            Ok(session) => Ok(session),
            Err(e) => {
                log::error!("Error initializing visualization ({:?}): {e}", e.kind());
                surface.show_failure(&FailureMessage::from(&e));
                Err(e)
            }
        }
    }

    #[allow(clippy::future_not_send)]
    async fn try_initialize<F: ViewFactory>(
        &self,
        factory: &mut F,
    ) -> Result<Session<F::Renderer>, BootstrapError> {
        let token = self.credentials.token().await?;
        let dataset = self.dataset.load(&self.client, self.fetch_timeout).await?;
        let scene = factory.create_view(&token, &self.view)?;

        let mut session = Session::new(dataset, scene, self.playback.clone());
        session.on_style_loaded(&self.view.fog);
        session.on_map_loaded();
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use actix_web::{App, HttpResponse, HttpServer, web};
    use globe_playback::PlaybackStatus;

    use super::*;
    use crate::credentials::tests::start_token_server;
    use crate::headless::LogScene;

    const DATASET: &str = r#"[
        {"month": "2021-01", "date": "2021-01-01", "total_reports": 5, "total_locations": 2,
         "locations": [
            {"lat": 1.0, "lon": 2.0, "count": 2, "is_covid": true},
            {"lat": 3.0, "lon": 4.0, "count": 3, "dtype_name": "Flood"}
         ]},
        {"month": "2021-02", "date": "2021-02-01", "total_reports": 1, "total_locations": 1,
         "locations": [{"lat": 5.0, "lon": 6.0, "count": 1, "event_name": "Ukraine: Conflict"}]}
    ]"#;

    struct StaticToken(&'static str);

    #[async_trait::async_trait]
    impl CredentialProvider for StaticToken {
        async fn token(&self) -> Result<String, CredentialError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        created: usize,
        tokens: Vec<String>,
    }

    impl ViewFactory for CountingFactory {
        type Renderer = LogScene;

        fn create_view(
            &mut self,
            token: &str,
            options: &ViewOptions,
        ) -> Result<LogScene, ViewError> {
            self.created += 1;
            self.tokens.push(token.to_string());
            Ok(LogScene::new(options.center))
        }
    }

    #[derive(Default)]
    struct CapturedSurface {
        shown: Vec<FailureMessage>,
    }

    impl FailureSurface for CapturedSurface {
        fn show_failure(&mut self, failure: &FailureMessage) {
            self.shown.push(failure.clone());
        }
    }

    fn write_dataset(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Serves the token endpoint plus `DATASET` at `/reports.json`.
    fn start_dataset_server() -> (SocketAddr, actix_web::dev::ServerHandle) {
        let state = web::Data::new(globe_server::AppState {
            token: Some("pk.served".to_string()),
        });
        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .configure(globe_server::configure)
                .route(
                    "/reports.json",
                    web::get().to(|| async {
                        HttpResponse::Ok()
                            .content_type("application/json")
                            .body(DATASET)
                    }),
                )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        (addr, handle)
    }

    fn url_config(addr: SocketAddr, dataset_path: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.sources.dataset = format!("http://{addr}{dataset_path}");
        config.sources.token_url = Some(format!("http://{addr}/api/get-token"));
        config.sources.fetch_timeout_secs = 5;
        config
    }

    fn config_for(path: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.sources.dataset = path.display().to_string();
        config.sources.fetch_timeout_secs = 5;
        config
    }

    #[actix_web::test]
    async fn unconfigured_token_shows_failure_and_skips_view() {
        let (addr, handle) = start_token_server(None);
        let path = write_dataset("globe_bootstrap_unconfigured.json", DATASET);

        let mut config = config_for(&path);
        config.sources.token_url = Some(format!("http://{addr}/api/get-token"));
        let bootstrap = Bootstrap::from_config(&config, reqwest::Client::new());

        let mut factory = CountingFactory::default();
        let mut surface = CapturedSurface::default();
        let err = bootstrap
            .initialize(&mut factory, &mut surface)
            .await
            .err()
            .unwrap();

        assert_eq!(err.kind(), FailureKind::Configuration);
        assert_eq!(factory.created, 0);
        assert_eq!(surface.shown.len(), 1);
        assert_eq!(surface.shown[0].title, FAILURE_TITLE);
        assert_eq!(surface.shown[0].hint, FAILURE_HINT);
        assert!(surface.shown[0].detail.contains("Token not configured"));

        handle.stop(true).await;
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn empty_dataset_is_a_data_failure() {
        let path = write_dataset("globe_bootstrap_empty.json", "[]");
        let bootstrap = Bootstrap::new(
            Box::new(StaticToken("pk.test")),
            &config_for(&path),
            reqwest::Client::new(),
        );

        let mut factory = CountingFactory::default();
        let mut surface = CapturedSurface::default();
        let err = bootstrap
            .initialize(&mut factory, &mut surface)
            .await
            .err()
            .unwrap();

        assert_eq!(err.kind(), FailureKind::Data);
        assert_eq!(factory.created, 0);
        assert_eq!(surface.shown.len(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_dataset_is_a_network_failure() {
        let bootstrap = Bootstrap::new(
            Box::new(StaticToken("pk.test")),
            &config_for(std::path::Path::new("/nonexistent/globe/reports.json")),
            reqwest::Client::new(),
        );

        let mut factory = CountingFactory::default();
        let mut surface = CapturedSurface::default();
        let err = bootstrap
            .initialize(&mut factory, &mut surface)
            .await
            .err()
            .unwrap();

        assert_eq!(err.kind(), FailureKind::Network);
        assert_eq!(factory.created, 0);
    }

    #[tokio::test]
    async fn success_returns_stopped_session_on_loaded_view() {
        let path = write_dataset("globe_bootstrap_success.json", DATASET);
        let bootstrap = Bootstrap::new(
            Box::new(StaticToken("pk.test")),
            &config_for(&path),
            reqwest::Client::new(),
        );

        let mut factory = CountingFactory::default();
        let mut surface = CapturedSurface::default();
        let session = bootstrap
            .initialize(&mut factory, &mut surface)
            .await
            .unwrap();

        assert_eq!(factory.tokens, vec!["pk.test".to_string()]);
        assert!(surface.shown.is_empty());
        assert_eq!(session.state().status, PlaybackStatus::Stopped);
        assert_eq!(session.dataset().len(), 2);
        assert_eq!(session.readout().timeline_label, "2021-01 - 2021-02");
        assert!(session.scene().has_ring_source());
        assert!(session.scene().fog().is_some());
        // Rotation timer.
        assert_eq!(session.pending_tasks(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[actix_web::test]
    async fn loads_token_and_dataset_over_http() {
        let (addr, handle) = start_dataset_server();
        let bootstrap =
            Bootstrap::from_config(&url_config(addr, "/reports.json"), reqwest::Client::new());

        let mut factory = CountingFactory::default();
        let mut surface = CapturedSurface::default();
        let session = bootstrap
            .initialize(&mut factory, &mut surface)
            .await
            .unwrap();

        assert_eq!(factory.tokens, vec!["pk.served".to_string()]);
        assert!(surface.shown.is_empty());
        assert_eq!(session.dataset().len(), 2);
        assert_eq!(session.dataset().total_reports(), 6);

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn dataset_not_found_is_a_network_failure() {
        let (addr, handle) = start_dataset_server();
        let bootstrap =
            Bootstrap::from_config(&url_config(addr, "/missing.json"), reqwest::Client::new());

        let mut factory = CountingFactory::default();
        let mut surface = CapturedSurface::default();
        let err = bootstrap
            .initialize(&mut factory, &mut surface)
            .await
            .err()
            .unwrap();

        assert!(
            matches!(&err, BootstrapError::Dataset(DatasetError::Status { status, .. }) if status.as_u16() == 404),
            "{err:?}"
        );
        assert_eq!(err.kind(), FailureKind::Network);
        assert_eq!(factory.created, 0);
        assert_eq!(surface.shown.len(), 1);

        handle.stop(true).await;
    }

    #[tokio::test]
    async fn silent_dataset_server_is_a_network_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = AppConfig::default();
        config.sources.dataset = format!("http://{}/reports.json", listener.local_addr().unwrap());
        config.sources.fetch_timeout_secs = 1;
        let bootstrap = Bootstrap::new(
            Box::new(StaticToken("pk.test")),
            &config,
            reqwest::Client::new(),
        );

        let mut factory = CountingFactory::default();
        let mut surface = CapturedSurface::default();
        let err = bootstrap
            .initialize(&mut factory, &mut surface)
            .await
            .err()
            .unwrap();

        assert!(
            matches!(&err, BootstrapError::Dataset(DatasetError::Timeout { .. })),
            "{err:?}"
        );
        assert_eq!(err.kind(), FailureKind::Network);
        assert_eq!(factory.created, 0);
        drop(listener);
    }
}
