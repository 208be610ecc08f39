use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TypesError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("Invalid kline interval: {0}")]
    InvalidInterval(String),
}

/// Asset a market is priced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteAsset {
    Btc,
    Eth,
    Usdt,
}

impl QuoteAsset {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Btc => "BTC",
            Self::Eth => "ETH",
            Self::Usdt => "USDT",
        }
    }
}

impl fmt::Display for QuoteAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trading market supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Symbol {
    EthBtc,
    LtcBtc,
    BnbBtc,
    NeoBtc,
    BccBtc,
    GasBtc,
    HsdBtc,
    McoBtc,
    WtcBtc,
    LrcBtc,
    QtumBtc,
    YoyoBtc,
    OmgBtc,
    ZrxBtc,
    StratBtc,

    QtumEth,
    EosEth,
    SntEth,
    BntEth,
    BnbEth,
    OaxEth,
    DntEth,
    McoEth,
    IcnEth,
    WtcEth,
    LrcEth,
    OmgEth,
    ZrxEth,
    StratEth,

    BtcUsdt,
    EthUsdt,
}

impl Symbol {
    pub const ALL: [Self; 31] = [
        Self::EthBtc,
        Self::LtcBtc,
        Self::BnbBtc,
        Self::NeoBtc,
        Self::BccBtc,
        Self::GasBtc,
        Self::HsdBtc,
        Self::McoBtc,
        Self::WtcBtc,
        Self::LrcBtc,
        Self::QtumBtc,
        Self::YoyoBtc,
        Self::OmgBtc,
        Self::ZrxBtc,
        Self::StratBtc,
        Self::QtumEth,
        Self::EosEth,
        Self::SntEth,
        Self::BntEth,
        Self::BnbEth,
        Self::OaxEth,
        Self::DntEth,
        Self::McoEth,
        Self::IcnEth,
        Self::WtcEth,
        Self::LrcEth,
        Self::OmgEth,
        Self::ZrxEth,
        Self::StratEth,
        Self::BtcUsdt,
        Self::EthUsdt,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EthBtc => "ETHBTC",
            Self::LtcBtc => "LTCBTC",
            Self::BnbBtc => "BNBBTC",
            Self::NeoBtc => "NEOBTC",
            Self::BccBtc => "BCCBTC",
            Self::GasBtc => "GASBTC",
            Self::HsdBtc => "HSDBTC",
            Self::McoBtc => "MCOBTC",
            Self::WtcBtc => "WTCBTC",
            Self::LrcBtc => "LRCBTC",
            Self::QtumBtc => "QTUMBTC",
            Self::YoyoBtc => "YOYOBTC",
            Self::OmgBtc => "OMGBTC",
            Self::ZrxBtc => "ZRXBTC",
            Self::StratBtc => "STRATBTC",
            Self::QtumEth => "QTUMETH",
            Self::EosEth => "EOSETH",
            Self::SntEth => "SNTETH",
            Self::BntEth => "BNTETH",
            Self::BnbEth => "BNBETH",
            Self::OaxEth => "OAXETH",
            Self::DntEth => "DNTETH",
            Self::McoEth => "MCOETH",
            Self::IcnEth => "ICNETH",
            Self::WtcEth => "WTCETH",
            Self::LrcEth => "LRCETH",
            Self::OmgEth => "OMGETH",
            Self::ZrxEth => "ZRXETH",
            Self::StratEth => "STRATETH",
            Self::BtcUsdt => "BTCUSDT",
            Self::EthUsdt => "ETHUSDT",
        }
    }

    pub const fn quote_asset(self) -> QuoteAsset {
        match self {
            Self::EthBtc
            | Self::LtcBtc
            | Self::BnbBtc
            | Self::NeoBtc
            | Self::BccBtc
            | Self::GasBtc
            | Self::HsdBtc
            | Self::McoBtc
            | Self::WtcBtc
            | Self::LrcBtc
            | Self::QtumBtc
            | Self::YoyoBtc
            | Self::OmgBtc
            | Self::ZrxBtc
            | Self::StratBtc => QuoteAsset::Btc,
            Self::QtumEth
            | Self::EosEth
            | Self::SntEth
            | Self::BntEth
            | Self::BnbEth
            | Self::OaxEth
            | Self::DntEth
            | Self::McoEth
            | Self::IcnEth
            | Self::WtcEth
            | Self::LrcEth
            | Self::OmgEth
            | Self::ZrxEth
            | Self::StratEth => QuoteAsset::Eth,
            Self::BtcUsdt | Self::EthUsdt => QuoteAsset::Usdt,
        }
    }

    pub fn base_asset(self) -> &'static str {
        let symbol = self.as_str();
        &symbol[..symbol.len() - self.quote_asset().as_str().len()]
    }

    /// Case-insensitive comparison against a raw market name.
    pub fn is(self, other: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(other)
    }

    pub fn is_any(self, others: &[&str]) -> bool {
        others.iter().any(|other| self.is(other))
    }
}

impl FromStr for Symbol {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|symbol| symbol.is(s))
            .ok_or_else(|| TypesError::InvalidSymbol(s.to_string()))
    }
}

impl TryFrom<String> for Symbol {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.as_str().to_string()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
    /// Rejected if it would immediately match and trade as a taker.
    LimitMaker,
}

impl OrderType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Limit => "LIMIT",
            Self::Market => "MARKET",
            Self::StopLoss => "STOP_LOSS",
            Self::StopLossLimit => "STOP_LOSS_LIMIT",
            Self::TakeProfit => "TAKE_PROFIT",
            Self::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
            Self::LimitMaker => "LIMIT_MAKER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    GTC, // Good Till Canceled
    IOC, // Immediate or Cancel
    FOK, // Fill or Kill
}

impl TimeInForce {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GTC => "GTC",
            Self::IOC => "IOC",
            Self::FOK => "FOK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    #[serde(alias = "CANCELLED")]
    Canceled,
    PendingCancel,
    Rejected,
    Expired,
}

/// Amount of detail the exchange returns after placing an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderResponseType {
    Ack,
    Result,
    Full,
}

impl OrderResponseType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ack => "ACK",
            Self::Result => "RESULT",
            Self::Full => "FULL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KlineInterval {
    Minutes1,
    Minutes3,
    Minutes5,
    Minutes15,
    Minutes30,
    Hours1,
    Hours2,
    Hours4,
    Hours6,
    Hours8,
    Hours12,
    Days1,
    Days3,
    Weeks1,
    Months1,
}

impl KlineInterval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minutes1 => "1m",
            Self::Minutes3 => "3m",
            Self::Minutes5 => "5m",
            Self::Minutes15 => "15m",
            Self::Minutes30 => "30m",
            Self::Hours1 => "1h",
            Self::Hours2 => "2h",
            Self::Hours4 => "4h",
            Self::Hours6 => "6h",
            Self::Hours8 => "8h",
            Self::Hours12 => "12h",
            Self::Days1 => "1d",
            Self::Days3 => "3d",
            Self::Weeks1 => "1w",
            Self::Months1 => "1M",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KlineInterval {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "1m" and "1M" differ only by case, so compare exactly.
        [
            Self::Minutes1,
            Self::Minutes3,
            Self::Minutes5,
            Self::Minutes15,
            Self::Minutes30,
            Self::Hours1,
            Self::Hours2,
            Self::Hours4,
            Self::Hours6,
            Self::Hours8,
            Self::Hours12,
            Self::Days1,
            Self::Days3,
            Self::Weeks1,
            Self::Months1,
        ]
        .into_iter()
        .find(|interval| interval.as_str() == s)
        .ok_or_else(|| TypesError::InvalidInterval(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerTime {
    pub server_time: DateTime<Utc>,
}

/// Candlestick aggregated over one [`KlineInterval`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kline {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: DateTime<Utc>,
    pub quote_volume: f64,
    pub trade_count: i64,
    /// Only present in the extended 12-slot layout.
    pub taker_buy_base_volume: Option<f64>,
    pub taker_buy_quote_volume: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub price: f64,
    pub volume: f64,
    pub quote_volume: f64,
    pub timestamp: DateTime<Utc>,
    pub is_buyer_maker: bool,
    pub is_best_match: bool,
}

/// Trades that filled at the same time, from the same order, at the same price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateTrade {
    pub id: i64,
    pub price: f64,
    pub volume: f64,
    pub first_trade_id: i64,
    pub last_trade_id: i64,
    pub timestamp: DateTime<Utc>,
    pub is_buyer_maker: bool,
    pub is_best_match: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragePrice {
    pub minutes: i64,
    pub price: f64,
}

/// Price change statistics over a rolling 24 hour window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerStats {
    pub symbol: String,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub weighted_avg_price: f64,
    pub prev_close_price: f64,
    pub last_price: f64,
    pub last_volume: f64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub volume: f64,
    pub quote_volume: f64,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub first_id: i64,
    pub last_id: i64,
    pub trade_count: i64,
}

/// Aggregated open orders at one price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookEntry {
    pub price: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub last_update_id: i64,
    pub bids: Vec<OrderBookEntry>,
    pub asks: Vec<OrderBookEntry>,
}

/// Best bid and ask for a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookTicker {
    pub symbol: String,
    pub bid_price: f64,
    pub bid_volume: f64,
    pub ask_price: f64,
    pub ask_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTicker {
    pub symbol: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: f64,
    pub locked: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub maker_commission: i64,
    pub taker_commission: i64,
    pub buyer_commission: i64,
    pub seller_commission: i64,
    pub can_trade: bool,
    pub can_withdraw: bool,
    pub can_deposit: bool,
    pub update_time: DateTime<Utc>,
    pub account_type: String,
    pub balances: Vec<Balance>,
}

/// Acknowledgement of a newly placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub symbol: String,
    pub order_id: i64,
    pub order_list_id: i64,
    pub client_order_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelledOrder {
    pub symbol: String,
    pub order_id: i64,
    pub order_list_id: i64,
    pub client_order_id: String,
    pub price: f64,
    pub original_volume: f64,
    pub executed_volume: f64,
    pub cumulative_quote_volume: f64,
    pub status: OrderStatus,
    pub time_in_force: TimeInForce,
    pub order_type: OrderType,
    pub side: OrderSide,
}

/// Strict conversions from the exchange's string and millisecond encodings.
pub mod conversion {
    use crate::core::errors::DecodeError;
    use chrono::{DateTime, TimeZone, Utc};

    /// Parse a decimal string such as `"0.01634790"`. Anything that is not a
    /// finite number is an error, never zero.
    pub fn parse_decimal(field: &'static str, value: &str) -> Result<f64, DecodeError> {
        let parsed = value
            .parse::<f64>()
            .map_err(|_| DecodeError::InvalidDecimal {
                field,
                value: value.to_string(),
            })?;

        if parsed.is_finite() {
            Ok(parsed)
        } else {
            Err(DecodeError::NonFiniteDecimal {
                field,
                value: value.to_string(),
            })
        }
    }

    /// Interpret a millisecond epoch integer as an absolute point in time.
    pub fn millis_to_datetime(field: &'static str, millis: i64) -> Result<DateTime<Utc>, DecodeError> {
        millis
            .checked_mul(1_000_000)
            .map(|nanos| Utc.timestamp_nanos(nanos))
            .ok_or(DecodeError::TimestampOutOfRange { field, millis })
    }

    #[inline]
    pub fn datetime_to_millis(time: &DateTime<Utc>) -> i64 {
        time.timestamp_millis()
    }
}
