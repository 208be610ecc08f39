use crate::core::config::LogLevel;
use crate::core::errors::{ApiError, DecodeError, ExchangeError};
use crate::core::kernel::context::{Interrupted, RequestContext};
use crate::core::kernel::metrics::{MetricsRecorder, NoopMetrics};
use crate::core::kernel::params::{strip_query_params, QueryParams};
use crate::core::kernel::security::{classify, SecurityLevel};
use crate::core::kernel::signer::{get_timestamp, Signer, API_KEY_HEADER};
use crate::core::kernel::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, trace};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Successful (status < 300) response.
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RestResponse {
    /// Deserialize the body as plain JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ExchangeError> {
        serde_json::from_slice(&self.body).map_err(|e| ExchangeError::Decode(DecodeError::Json(e)))
    }
}

/// REST client trait for making HTTP requests
///
/// `execute` is the whole pipeline: security classification, API key
/// header, signing, dispatch, metrics and response classification. The
/// verb helpers only fix the method.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Send one request.
    ///
    /// # Arguments
    /// * `ctx` - Cancellation and deadline for this call
    /// * `method` - HTTP method
    /// * `path` - Request path, e.g. `/api/v3/order`; may carry a `?query`,
    ///   which is decoded and re-encoded in canonical form, not sent as-is
    /// * `params` - Query parameters, appended after any already in `path`
    /// * `body` - Raw request body, form-encoded when not empty
    async fn execute(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        params: &QueryParams,
        body: &[u8],
    ) -> Result<RestResponse, ExchangeError>;

    async fn get(
        &self,
        ctx: &RequestContext,
        path: &str,
        params: &QueryParams,
    ) -> Result<RestResponse, ExchangeError> {
        self.execute(ctx, Method::GET, path, params, &[]).await
    }

    async fn post(
        &self,
        ctx: &RequestContext,
        path: &str,
        params: &QueryParams,
        body: &[u8],
    ) -> Result<RestResponse, ExchangeError> {
        self.execute(ctx, Method::POST, path, params, body).await
    }

    async fn put(
        &self,
        ctx: &RequestContext,
        path: &str,
        params: &QueryParams,
        body: &[u8],
    ) -> Result<RestResponse, ExchangeError> {
        self.execute(ctx, Method::PUT, path, params, body).await
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        path: &str,
        params: &QueryParams,
        body: &[u8],
    ) -> Result<RestResponse, ExchangeError> {
        self.execute(ctx, Method::DELETE, path, params, body).await
    }
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API, without a trailing slash
    pub base_url: String,
    /// Request timeout in seconds, applied by the default transport
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
    pub log_level: LogLevel,
}

impl RestClientConfig {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            timeout_seconds: 30,
            user_agent: concat!("binance-spot-rest/", env!("CARGO_PKG_VERSION")).to_string(),
            log_level: LogLevel::None,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
    api_key: Option<String>,
    signer: Option<Arc<dyn Signer>>,
    transport: Option<Arc<dyn HttpTransport>>,
    metrics: Option<Arc<dyn MetricsRecorder>>,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            api_key: None,
            signer: None,
            transport: None,
            metrics: None,
        }
    }

    /// Send `api_key` on every request that needs the key header. Enough
    /// for `UserStream` and `MarketData` endpoints without a signer.
    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the signer for signed requests. Without one, calls to `Trade` and
    /// `UserData` endpoints fail with `MissingCredentials`. The signer's key
    /// is used for the header unless `with_api_key` set one.
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Replace the default reqwest transport.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the REST client
    pub fn build(self) -> Result<RestPipeline, ExchangeError> {
        let base_url = self.config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ExchangeError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(
                    Duration::from_secs(self.config.timeout_seconds),
                    &self.config.user_agent,
                )
                .map_err(|e| ExchangeError::Other(format!("Failed to build HTTP client: {}", e)))?,
            ),
        };

        let api_key = self
            .api_key
            .or_else(|| self.signer.as_ref().map(|signer| signer.api_key().to_string()))
            .filter(|key| !key.is_empty());

        Ok(RestPipeline {
            config: RestClientConfig {
                base_url,
                ..self.config
            },
            api_key,
            signer: self.signer,
            transport,
            metrics: self
                .metrics
                .unwrap_or_else(|| Arc::new(NoopMetrics) as Arc<dyn MetricsRecorder>),
        })
    }
}

/// [`RestClient`] over an injected [`HttpTransport`].
///
/// Holds only immutable configuration, so one instance can serve any number
/// of concurrent calls.
#[derive(Clone)]
pub struct RestPipeline {
    config: RestClientConfig,
    api_key: Option<String>,
    signer: Option<Arc<dyn Signer>>,
    transport: Arc<dyn HttpTransport>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl std::fmt::Debug for RestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestPipeline")
            .field("config", &self.config)
            .field("has_api_key", &self.api_key.is_some())
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl RestPipeline {
    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Join the base URL and `path` and attach `query` verbatim.
    fn build_url(&self, path: &str, query: &str) -> Result<Url, ExchangeError> {
        let raw = format!("{}{}", self.config.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| ExchangeError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })?;
        url.set_query((!query.is_empty()).then_some(query));
        Ok(url)
    }

    /// Apply the API key header and signature required by `level`, returning
    /// the final encoded query string.
    fn authenticate(
        &self,
        method: &Method,
        path: &str,
        level: SecurityLevel,
        params: &QueryParams,
        body: &[u8],
        headers: &mut HeaderMap,
    ) -> Result<String, ExchangeError> {
        if !level.requires_auth() {
            return params.encode();
        }

        let missing = || ExchangeError::MissingCredentials {
            method: method.to_string(),
            path: path.to_string(),
            level,
        };

        let api_key = self.api_key.as_deref().ok_or_else(missing)?;
        let api_key = HeaderValue::from_str(api_key)
            .map_err(|e| ExchangeError::AuthError(format!("Invalid API key header: {}", e)))?;
        headers.insert(API_KEY_HEADER, api_key);

        if !level.requires_signing() {
            return params.encode();
        }

        let signer = self.signer.as_ref().ok_or_else(missing)?;

        // Taken as late as possible to keep clock skew small.
        let timestamp = get_timestamp()?;
        Ok(signer.sign_request(params, body, timestamp)?.query)
    }

    async fn dispatch(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        params: &QueryParams,
        body: &[u8],
    ) -> Result<RestResponse, ExchangeError> {
        // An embedded query is re-encoded together with `params`.
        let bare_path = strip_query_params(path);
        let mut query = match path.get(bare_path.len() + 1..) {
            Some(existing) => QueryParams::parse(existing)?,
            None => QueryParams::new(),
        };
        query.extend(params);
        let path = bare_path;

        let level = classify(path, &method);
        let mut headers = HeaderMap::new();
        let query = self.authenticate(&method, path, level, &query, body, &mut headers)?;
        if !body.is_empty() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }

        let request = HttpRequest {
            method: method.clone(),
            url: self.build_url(path, &query)?,
            headers,
            body: body.to_vec(),
        };

        let started = Instant::now();
        let outcome = ctx
            .run(self.transport.send(request))
            .await
            .map_err(|reason| match reason {
                Interrupted::Cancelled => ExchangeError::Cancelled {
                    method: method.to_string(),
                    path: path.to_string(),
                },
                Interrupted::DeadlineExceeded => ExchangeError::DeadlineExceeded {
                    method: method.to_string(),
                    path: path.to_string(),
                },
            })?;
        let latency = started.elapsed();
        self.metrics.observe_request_latency(path, latency);

        let response = outcome.map_err(|source| ExchangeError::Transport {
            method: method.to_string(),
            path: path.to_string(),
            source,
        })?;
        self.metrics.increment_response_code(path, response.status);

        if self.config.log_level >= LogLevel::Info {
            debug!(
                status = response.status,
                latency_ms = latency.as_millis() as u64,
                security_level = ?level,
                "HTTPS client request"
            );
            trace!("Response body: {}", String::from_utf8_lossy(&response.body));
        }

        handle_response(response)
    }
}

/// Turn a raw response into the body or a structured error.
///
/// Below 300 is success. Otherwise an empty body yields
/// `UnsuccessfulResponse`, a `{"code","msg"}` body yields `Api` and
/// anything else yields `MalformedErrorBody`.
pub fn handle_response(response: HttpResponse) -> Result<RestResponse, ExchangeError> {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;

    if status < 300 {
        return Ok(RestResponse {
            status,
            headers,
            body,
        });
    }

    if body.is_empty() {
        return Err(ExchangeError::UnsuccessfulResponse { status });
    }

    match serde_json::from_slice::<ApiError>(&body) {
        Ok(api_error) => Err(ExchangeError::Api(api_error)),
        Err(source) => Err(ExchangeError::MalformedErrorBody { status, source }),
    }
}

#[async_trait]
impl RestClient for RestPipeline {
    #[instrument(skip(self, ctx, params, body), fields(method = %method, path = %path, param_count = params.len()))]
    async fn execute(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        params: &QueryParams,
        body: &[u8],
    ) -> Result<RestResponse, ExchangeError> {
        let result = self.dispatch(ctx, method, path, params, body).await;
        if let Err(err) = &result {
            if self.config.log_level >= LogLevel::Error {
                error!(error = %err, "REST request failed");
            }
        }
        result
    }
}
