pub mod core;
pub mod exchanges;

pub use crate::core::{
    config::{ClientConfig, LogLevel},
    errors::{ApiError, DecodeError, ErrorCode, ExchangeError},
    types::*,
};
pub use exchanges::binance::{create_binance_client, BinanceRestClient};
