//! REST kernel - the exchange-agnostic request pipeline
//!
//! Every endpoint call goes through the same steps:
//!
//! 1. `security::classify` decides which credentials the `(path, method)`
//!    pair needs.
//! 2. `Signer` adds the `X-MBX-APIKEY` header and, for signed levels,
//!    `recvWindow`, `timestamp` and `signature` to the query string.
//! 3. `HttpTransport` sends the request; `RequestContext` can cut it short.
//! 4. `MetricsRecorder` observes latency and status code by query-free path.
//! 5. The response is classified into a body or a structured error.
//!
//! Parameters travel as [`QueryParams`], whose single encoding is both
//! signed and transmitted.
//!
//! ```rust,ignore
//! use binance_spot_rest::core::kernel::*;
//! use std::sync::Arc;
//!
//! let signer = Arc::new(HmacSigner::new(api_key, secret_key));
//! let rest = RestClientBuilder::new(RestClientConfig::new("https://api.binance.com".into()))
//!     .with_signer(signer)
//!     .build()?;
//!
//! let params = QueryParams::new().with("symbol", "BTCUSDT").with("limit", 5);
//! let response = rest
//!     .get(&RequestContext::background(), "/api/v3/depth", &params)
//!     .await?;
//! ```
pub mod context;
pub mod metrics;
pub mod params;
pub mod rest;
pub mod security;
pub mod signer;
pub mod transport;

// Re-export key types for convenience
pub use context::{Interrupted, RequestContext};
#[cfg(feature = "prometheus")]
pub use metrics::PrometheusMetrics;
pub use metrics::{MetricsRecorder, NoopMetrics};
pub use params::{strip_query_params, QueryParams};
pub use rest::{RestClient, RestClientBuilder, RestClientConfig, RestPipeline, RestResponse};
pub use security::{classify, SecurityLevel};
pub use signer::{HmacSigner, SignedQuery, Signer, API_KEY_HEADER};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
