pub mod converters;
pub mod rest;
pub mod types;

use crate::core::config::{ClientConfig, ConfigError};
use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    HmacSigner, HttpTransport, MetricsRecorder, RestClientBuilder, RestClientConfig, RestPipeline,
};
use std::sync::Arc;

// Re-export main types for easier importing
pub use converters::{decode, FromWire, KLINE_SCHEMA};
pub use rest::{BinanceRestClient, NewOrderRequest};

fn rest_builder(config: &ClientConfig) -> Result<RestClientBuilder, ExchangeError> {
    if config.api_key().is_empty() && !config.secret_key().is_empty() {
        return Err(ConfigError::InvalidConfiguration(
            "secret key configured without an API key".to_string(),
        )
        .into());
    }

    let rest_config =
        RestClientConfig::new(config.resolved_base_url()).with_log_level(config.log_level);
    let mut rest_builder = RestClientBuilder::new(rest_config);

    // The key alone unlocks market data and user stream endpoints
    if !config.api_key().is_empty() {
        rest_builder = rest_builder.with_api_key(config.api_key().to_string());
    }

    if config.has_credentials() {
        let signer = HmacSigner::new(
            config.api_key().to_string(),
            config.secret_key().to_string(),
        )
        .with_recv_window(config.recv_window);
        rest_builder = rest_builder.with_signer(Arc::new(signer));
    }

    Ok(rest_builder)
}

/// Create a Binance client over the default reqwest transport
pub fn create_binance_client(
    config: ClientConfig,
) -> Result<BinanceRestClient<RestPipeline>, ExchangeError> {
    let rest = rest_builder(&config)?.build()?;
    Ok(BinanceRestClient::new(rest))
}

/// Create a Binance client with an injected transport and metrics sink
pub fn create_binance_client_with(
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    metrics: Arc<dyn MetricsRecorder>,
) -> Result<BinanceRestClient<RestPipeline>, ExchangeError> {
    let rest = rest_builder(&config)?
        .with_transport(transport)
        .with_metrics(metrics)
        .build()?;
    Ok(BinanceRestClient::new(rest))
}
