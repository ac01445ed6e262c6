//! Map rendering credential retrieval.
//!
//! The token is never compiled into the client. It is either fetched from
//! the server's `/api/get-token` endpoint or, for local runs, read from an
//! environment variable.

use std::time::Duration;

use globe_server_models::{ApiError, ApiToken, TOKEN_NOT_CONFIGURED};

/// Errors that can occur while obtaining the credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The server (or environment) has no credential configured.
    #[error("map token is not configured: {message}")]
    NotConfigured {
        /// Reason reported by the server.
        message: String,
    },

    /// HTTP request failed.
    #[error("failed to fetch map token: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete in time.
    #[error("token request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The endpoint answered with an unexpected status.
    #[error("failed to fetch map token: {url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code returned.
        status: reqwest::StatusCode,
    },

    /// The endpoint answered successfully but without a token.
    #[error("no token returned from API")]
    MissingToken,
}

impl CredentialError {
    /// `true` when retrying later could not help without a configuration
    /// change.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured { .. } | Self::MissingToken)
    }
}

/// Source of the map rendering credential.
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the access token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if no token can be obtained.
    async fn token(&self) -> Result<String, CredentialError>;
}

/// Fetches the token from a `GET /api/get-token` style endpoint.
pub struct HttpCredentialProvider {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpCredentialProvider {
    /// Creates a provider for `url`. Each request is bounded by `timeout`.
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    fn classify(&self, e: reqwest::Error) -> CredentialError {
        if e.is_timeout() {
            CredentialError::Timeout {
                url: self.url.clone(),
                timeout: self.timeout,
            }
        } else {
            CredentialError::Http(e)
        }
    }
}

#[async_trait::async_trait]
impl CredentialProvider for HttpCredentialProvider {
    async fn token(&self) -> Result<String, CredentialError> {
        log::debug!("Fetching map token from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
                && let Ok(ApiError { error }) = serde_json::from_str::<ApiError>(&body)
            {
                return Err(CredentialError::NotConfigured { message: error });
            }
            return Err(CredentialError::Status {
                url: self.url.clone(),
                status,
            });
        }

        match serde_json::from_str::<ApiToken>(&body) {
            Ok(ApiToken { token }) if !token.is_empty() => Ok(token),
            _ => Err(CredentialError::MissingToken),
        }
    }
}

/// Reads the token from an environment variable.
pub struct EnvCredentialProvider {
    var: String,
}

impl EnvCredentialProvider {
    /// Creates a provider reading `var`.
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait::async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn token(&self) -> Result<String, CredentialError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(CredentialError::NotConfigured {
                message: format!("{TOKEN_NOT_CONFIGURED} (set {})", self.var),
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::net::SocketAddr;

    use actix_web::{App, HttpResponse, HttpServer, web};

    use super::*;

    /// Starts the real globe server on an ephemeral port and returns its
    /// address plus a handle to stop it.
    pub(crate) fn start_token_server(
        token: Option<&str>,
    ) -> (SocketAddr, actix_web::dev::ServerHandle) {
        let state = web::Data::new(globe_server::AppState {
            token: token.map(str::to_string),
        });
        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .configure(globe_server::configure)
                .route(
                    "/teapot",
                    web::get().to(|| async { HttpResponse::ImATeapot().finish() }),
                )
                .route(
                    "/empty",
                    web::get().to(|| async {
                        HttpResponse::Ok().json(ApiToken {
                            token: String::new(),
                        })
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

    fn provider(addr: SocketAddr, path: &str) -> HttpCredentialProvider {
        HttpCredentialProvider::new(
            reqwest::Client::new(),
            format!("http://{addr}{path}"),
            Duration::from_secs(5),
        )
    }

    #[actix_web::test]
    async fn fetches_configured_token() {
        let (addr, handle) = start_token_server(Some("pk.live"));
        let token = provider(addr, "/api/get-token").token().await.unwrap();
        assert_eq!(token, "pk.live");
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn server_without_token_is_not_configured() {
        let (addr, handle) = start_token_server(None);
        let err = provider(addr, "/api/get-token").token().await.unwrap_err();
        assert!(
            matches!(&err, CredentialError::NotConfigured { message } if message == TOKEN_NOT_CONFIGURED),
            "{err:?}"
        );
        assert!(err.is_configuration());
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn unexpected_status_and_empty_token() {
        let (addr, handle) = start_token_server(Some("pk.live"));

        let err = provider(addr, "/teapot").token().await.unwrap_err();
        assert!(
            matches!(err, CredentialError::Status { status, .. } if status.as_u16() == 418)
        );
        assert!(!err.is_configuration());

        let err = provider(addr, "/empty").token().await.unwrap_err();
        assert!(matches!(err, CredentialError::MissingToken));

        handle.stop(true).await;
    }

    #[tokio::test]
    async fn env_provider_requires_non_empty_value() {
        let err = EnvCredentialProvider::new("GLOBE_TEST_TOKEN_THAT_IS_NEVER_SET")
            .token()
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::NotConfigured { .. }));
    }

    #[tokio::test]
    async fn silent_endpoint_times_out_as_network_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let provider = HttpCredentialProvider::new(
            reqwest::Client::new(),
            format!("http://{}/api/get-token", listener.local_addr().unwrap()),
            Duration::from_millis(200),
        );

        let err = provider.token().await.unwrap_err();
        assert!(
            matches!(&err, CredentialError::Timeout { timeout, .. } if *timeout == Duration::from_millis(200)),
            "{err:?}"
        );
        assert!(!err.is_configuration());
        assert_eq!(
            crate::bootstrap::BootstrapError::from(err).kind(),
            crate::bootstrap::FailureKind::Network
        );
        drop(listener);
    }
}
