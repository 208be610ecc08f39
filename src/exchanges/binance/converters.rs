use super::types as binance_types;
use crate::core::errors::DecodeError;
use crate::core::types::conversion::{datetime_to_millis, millis_to_datetime, parse_decimal};
use crate::core::types::{
    AccountInfo, AggregateTrade, AveragePrice, Balance, CancelledOrder, Kline, OrderAck,
    OrderBook, OrderBookEntry, OrderBookTicker, PriceTicker, ServerTime, TickerStats, Trade,
};
use serde::de::DeserializeOwned;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A decoded type together with the raw shape it is parsed from.
pub trait FromWire: Sized {
    type Wire: DeserializeOwned;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError>;
}

/// Decode a response body into `T`, or into `Vec<T>` for list endpoints.
pub fn decode<T: FromWire>(bytes: &[u8]) -> Result<T, DecodeError> {
    let wire: T::Wire = serde_json::from_slice(bytes)?;
    T::from_wire(wire)
}

impl<T: FromWire> FromWire for Vec<T> {
    type Wire = Vec<T::Wire>;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        wire.into_iter()
            .enumerate()
            .map(|(index, item)| {
                T::from_wire(item).map_err(|e| DecodeError::Element {
                    index,
                    source: Box::new(e),
                })
            })
            .collect()
    }
}

impl FromWire for ServerTime {
    type Wire = binance_types::BinanceServerTime;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            server_time: millis_to_datetime("serverTime", wire.server_time)?,
        })
    }
}

// Kline ----------------------------------------------------------------------

/// Expected JSON type of one positional kline slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Millisecond timestamp or count, sent as a JSON integer.
    Integer,
    /// Price or volume, sent as a decimal string.
    Decimal,
    /// Present on the wire but not decoded.
    Ignored,
}

impl SlotKind {
    const fn describe(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal string",
            Self::Ignored => "any",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KlineSlot {
    pub name: &'static str,
    pub kind: SlotKind,
}

const fn slot(name: &'static str, kind: SlotKind) -> KlineSlot {
    KlineSlot { name, kind }
}

/// Positional layout of a kline array. The first nine slots are always
/// present; the exchange's extended layout appends the last three.
pub static KLINE_SCHEMA: [KlineSlot; 12] = [
    slot("openTime", SlotKind::Integer),
    slot("open", SlotKind::Decimal),
    slot("high", SlotKind::Decimal),
    slot("low", SlotKind::Decimal),
    slot("close", SlotKind::Decimal),
    slot("volume", SlotKind::Decimal),
    slot("closeTime", SlotKind::Integer),
    slot("quoteAssetVolume", SlotKind::Decimal),
    slot("tradeCount", SlotKind::Integer),
    slot("takerBuyBaseVolume", SlotKind::Decimal),
    slot("takerBuyQuoteVolume", SlotKind::Decimal),
    slot("ignore", SlotKind::Ignored),
];

pub const KLINE_BASE_SLOTS: usize = 9;
pub const KLINE_EXTENDED_SLOTS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
enum SlotValue {
    Integer(i64),
    Decimal(f64),
    Ignored,
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(_) => "non-integer number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn read_slot(index: usize, schema: KlineSlot, value: &Value) -> Result<SlotValue, DecodeError> {
    let mismatch = || DecodeError::SlotType {
        index,
        field: schema.name,
        expected: schema.kind.describe(),
        found: json_type_name(value),
    };

    match (schema.kind, value) {
        (SlotKind::Integer, Value::Number(n)) => n.as_i64().map(SlotValue::Integer).ok_or_else(mismatch),
        (SlotKind::Decimal, Value::String(s)) => parse_decimal(schema.name, s).map(SlotValue::Decimal),
        (SlotKind::Ignored, _) => Ok(SlotValue::Ignored),
        _ => Err(mismatch()),
    }
}

/// Validate every slot against [`KLINE_SCHEMA`] in one pass.
fn read_kline_slots(values: &[Value]) -> Result<Vec<SlotValue>, DecodeError> {
    if values.len() != KLINE_BASE_SLOTS && values.len() != KLINE_EXTENDED_SLOTS {
        return Err(DecodeError::ArrayLength {
            expected: format!("{} or {}", KLINE_BASE_SLOTS, KLINE_EXTENDED_SLOTS),
            actual: values.len(),
        });
    }

    values
        .iter()
        .zip(KLINE_SCHEMA.iter())
        .enumerate()
        .map(|(index, (value, schema))| read_slot(index, *schema, value))
        .collect()
}

struct KlineSlots(Vec<SlotValue>);

impl KlineSlots {
    fn unexpected(index: usize, found: &'static str) -> DecodeError {
        let schema = KLINE_SCHEMA[index];
        DecodeError::SlotType {
            index,
            field: schema.name,
            expected: schema.kind.describe(),
            found,
        }
    }

    fn integer(&self, index: usize) -> Result<i64, DecodeError> {
        match self.0.get(index) {
            Some(SlotValue::Integer(value)) => Ok(*value),
            Some(_) => Err(Self::unexpected(index, "other slot kind")),
            None => Err(Self::unexpected(index, "nothing")),
        }
    }

    fn decimal(&self, index: usize) -> Result<f64, DecodeError> {
        match self.0.get(index) {
            Some(SlotValue::Decimal(value)) => Ok(*value),
            Some(_) => Err(Self::unexpected(index, "other slot kind")),
            None => Err(Self::unexpected(index, "nothing")),
        }
    }

    fn optional_decimal(&self, index: usize) -> Result<Option<f64>, DecodeError> {
        if index < self.0.len() {
            self.decimal(index).map(Some)
        } else {
            Ok(None)
        }
    }

    fn timestamp(&self, index: usize) -> Result<chrono::DateTime<chrono::Utc>, DecodeError> {
        millis_to_datetime(KLINE_SCHEMA[index].name, self.integer(index)?)
    }
}

impl FromWire for Kline {
    type Wire = binance_types::BinanceRestKline;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        let slots = KlineSlots(read_kline_slots(&wire.0)?);

        Ok(Self {
            open_time: slots.timestamp(0)?,
            open: slots.decimal(1)?,
            high: slots.decimal(2)?,
            low: slots.decimal(3)?,
            close: slots.decimal(4)?,
            volume: slots.decimal(5)?,
            close_time: slots.timestamp(6)?,
            quote_volume: slots.decimal(7)?,
            trade_count: slots.integer(8)?,
            taker_buy_base_volume: slots.optional_decimal(9)?,
            taker_buy_quote_volume: slots.optional_decimal(10)?,
        })
    }
}

/// Format a decoded number the way the exchange sends it.
pub fn format_decimal(value: f64) -> String {
    format!("{:.8}", value)
}

/// Serializes back to the positional wire array, 9 or 12 slots depending on
/// whether the taker-buy volumes are known.
impl Serialize for Kline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extended = self.taker_buy_base_volume.is_some() && self.taker_buy_quote_volume.is_some();
        let len = if extended {
            KLINE_EXTENDED_SLOTS
        } else {
            KLINE_BASE_SLOTS
        };

        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&datetime_to_millis(&self.open_time))?;
        seq.serialize_element(&format_decimal(self.open))?;
        seq.serialize_element(&format_decimal(self.high))?;
        seq.serialize_element(&format_decimal(self.low))?;
        seq.serialize_element(&format_decimal(self.close))?;
        seq.serialize_element(&format_decimal(self.volume))?;
        seq.serialize_element(&datetime_to_millis(&self.close_time))?;
        seq.serialize_element(&format_decimal(self.quote_volume))?;
        seq.serialize_element(&self.trade_count)?;
        if let (Some(base), Some(quote)) = (self.taker_buy_base_volume, self.taker_buy_quote_volume) {
            seq.serialize_element(&format_decimal(base))?;
            seq.serialize_element(&format_decimal(quote))?;
            seq.serialize_element("0")?;
        }
        seq.end()
    }
}

// Trades ---------------------------------------------------------------------

impl FromWire for Trade {
    type Wire = binance_types::BinanceTrade;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            id: wire.id,
            price: parse_decimal("price", &wire.price)?,
            volume: parse_decimal("qty", &wire.qty)?,
            quote_volume: parse_decimal("quoteQty", &wire.quote_qty)?,
            timestamp: millis_to_datetime("time", wire.time)?,
            is_buyer_maker: wire.is_buyer_maker,
            is_best_match: wire.is_best_match,
        })
    }
}

impl FromWire for AggregateTrade {
    type Wire = binance_types::BinanceAggregateTrade;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            id: wire.id,
            price: parse_decimal("p", &wire.price)?,
            volume: parse_decimal("q", &wire.qty)?,
            first_trade_id: wire.first_trade_id,
            last_trade_id: wire.last_trade_id,
            timestamp: millis_to_datetime("T", wire.timestamp)?,
            is_buyer_maker: wire.is_buyer_maker,
            is_best_match: wire.is_best_match,
        })
    }
}

// Tickers --------------------------------------------------------------------

impl FromWire for AveragePrice {
    type Wire = binance_types::BinanceAveragePrice;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            minutes: wire.mins,
            price: parse_decimal("price", &wire.price)?,
        })
    }
}

impl FromWire for TickerStats {
    type Wire = binance_types::BinanceTickerStats;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            price_change: parse_decimal("priceChange", &wire.price_change)?,
            price_change_percent: parse_decimal("priceChangePercent", &wire.price_change_percent)?,
            weighted_avg_price: parse_decimal("weightedAvgPrice", &wire.weighted_avg_price)?,
            prev_close_price: parse_decimal("prevClosePrice", &wire.prev_close_price)?,
            last_price: parse_decimal("lastPrice", &wire.last_price)?,
            last_volume: parse_decimal("lastQty", &wire.last_qty)?,
            bid_price: parse_decimal("bidPrice", &wire.bid_price)?,
            ask_price: parse_decimal("askPrice", &wire.ask_price)?,
            open_price: parse_decimal("openPrice", &wire.open_price)?,
            high_price: parse_decimal("highPrice", &wire.high_price)?,
            low_price: parse_decimal("lowPrice", &wire.low_price)?,
            volume: parse_decimal("volume", &wire.volume)?,
            quote_volume: parse_decimal("quoteVolume", &wire.quote_volume)?,
            open_time: millis_to_datetime("openTime", wire.open_time)?,
            close_time: millis_to_datetime("closeTime", wire.close_time)?,
            first_id: wire.first_id,
            last_id: wire.last_id,
            trade_count: wire.count,
            symbol: wire.symbol,
        })
    }
}

impl FromWire for OrderBookTicker {
    type Wire = binance_types::BinanceBookTicker;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            bid_price: parse_decimal("bidPrice", &wire.bid_price)?,
            bid_volume: parse_decimal("bidQty", &wire.bid_qty)?,
            ask_price: parse_decimal("askPrice", &wire.ask_price)?,
            ask_volume: parse_decimal("askQty", &wire.ask_qty)?,
            symbol: wire.symbol,
        })
    }
}

impl FromWire for PriceTicker {
    type Wire = binance_types::BinancePriceTicker;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            price: parse_decimal("price", &wire.price)?,
            symbol: wire.symbol,
        })
    }
}

// Order book -----------------------------------------------------------------

fn convert_level((price, volume): binance_types::BinanceDepthLevel) -> Result<OrderBookEntry, DecodeError> {
    Ok(OrderBookEntry {
        price: parse_decimal("price", &price)?,
        volume: parse_decimal("quantity", &volume)?,
    })
}

fn convert_levels(levels: Vec<binance_types::BinanceDepthLevel>) -> Result<Vec<OrderBookEntry>, DecodeError> {
    levels
        .into_iter()
        .enumerate()
        .map(|(index, level)| {
            convert_level(level).map_err(|e| DecodeError::Element {
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

impl FromWire for OrderBook {
    type Wire = binance_types::BinanceOrderBook;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            last_update_id: wire.last_update_id,
            bids: convert_levels(wire.bids)?,
            asks: convert_levels(wire.asks)?,
        })
    }
}

// Account and orders ---------------------------------------------------------

impl FromWire for Balance {
    type Wire = binance_types::BinanceBalance;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            free: parse_decimal("free", &wire.free)?,
            locked: parse_decimal("locked", &wire.locked)?,
            asset: wire.asset,
        })
    }
}

impl FromWire for AccountInfo {
    type Wire = binance_types::BinanceAccountInfo;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            maker_commission: wire.maker_commission,
            taker_commission: wire.taker_commission,
            buyer_commission: wire.buyer_commission,
            seller_commission: wire.seller_commission,
            can_trade: wire.can_trade,
            can_withdraw: wire.can_withdraw,
            can_deposit: wire.can_deposit,
            update_time: millis_to_datetime("updateTime", wire.update_time)?,
            account_type: wire.account_type,
            balances: Vec::<Balance>::from_wire(wire.balances)?,
        })
    }
}

impl FromWire for OrderAck {
    type Wire = binance_types::BinanceOrderAck;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            symbol: wire.symbol,
            order_id: wire.order_id,
            order_list_id: wire.order_list_id,
            client_order_id: wire.client_order_id,
            timestamp: millis_to_datetime("transactTime", wire.transact_time)?,
        })
    }
}

impl FromWire for CancelledOrder {
    type Wire = binance_types::BinanceCancelledOrder;

    fn from_wire(wire: Self::Wire) -> Result<Self, DecodeError> {
        Ok(Self {
            price: parse_decimal("price", &wire.price)?,
            original_volume: parse_decimal("origQty", &wire.orig_qty)?,
            executed_volume: parse_decimal("executedQty", &wire.executed_qty)?,
            cumulative_quote_volume: parse_decimal("cummulativeQuoteQty", &wire.cumulative_quote_qty)?,
            symbol: wire.symbol,
            order_id: wire.order_id,
            order_list_id: wire.order_list_id,
            client_order_id: wire.client_order_id,
            status: wire.status,
            time_in_force: wire.time_in_force,
            order_type: wire.order_type,
            side: wire.side,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{OrderSide, OrderStatus, OrderType, TimeInForce};

    const KLINE: &str = r#"[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308]"#;

    #[test]
    fn test_decode_kline() {
        let kline: Kline = decode(KLINE.as_bytes()).unwrap();

        assert_eq!(datetime_to_millis(&kline.open_time), 1_499_040_000_000);
        assert!((kline.open - 0.016_347_9).abs() < 1e-12);
        assert!((kline.high - 0.8).abs() < 1e-12);
        assert!((kline.low - 0.015_758).abs() < 1e-12);
        assert!((kline.close - 0.015_771).abs() < 1e-12);
        assert!((kline.volume - 148_976.114_278_15).abs() < 1e-6);
        assert_eq!(datetime_to_millis(&kline.close_time), 1_499_644_799_999);
        assert!((kline.quote_volume - 2434.190_553_34).abs() < 1e-6);
        assert_eq!(kline.trade_count, 308);
        assert_eq!(kline.taker_buy_base_volume, None);
    }

    #[test]
    fn test_kline_serializes_to_wire_array() {
        let kline: Kline = decode(KLINE.as_bytes()).unwrap();
        assert_eq!(serde_json::to_string(&kline).unwrap(), KLINE);

        let again: Kline = decode(serde_json::to_vec(&kline).unwrap().as_slice()).unwrap();
        assert_eq!(again, kline);
    }

    #[test]
    fn test_decode_extended_kline() {
        let raw = r#"[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1756.87402397","28.46694368","0"]"#;
        let kline: Kline = decode(raw.as_bytes()).unwrap();
        assert_eq!(kline.trade_count, 308);
        assert!((kline.taker_buy_base_volume.unwrap() - 1756.874_023_97).abs() < 1e-6);
        assert!((kline.taker_buy_quote_volume.unwrap() - 28.466_943_68).abs() < 1e-9);
        assert_eq!(serde_json::to_string(&kline).unwrap(), raw);
    }

    #[test]
    fn test_kline_wrong_length() {
        for raw in [
            "[]",
            r#"[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334"]"#,
            r#"[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1"]"#,
        ] {
            let err = decode::<Kline>(raw.as_bytes()).unwrap_err();
            assert!(
                matches!(err, DecodeError::ArrayLength { .. }),
                "{}: {}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_kline_slot_type_names_index() {
        let raw = r#"[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815","1499644799999","2434.19055334",308]"#;
        let err = decode::<Kline>(raw.as_bytes()).unwrap_err();
        match err {
            DecodeError::SlotType {
                index,
                field,
                expected,
                found,
            } => {
                assert_eq!(index, 6);
                assert_eq!(field, "closeTime");
                assert_eq!(expected, "integer");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {}", other),
        }

        let raw = r#"[1499040000000,0.0163479,"0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308]"#;
        let err = decode::<Kline>(raw.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "index 1 (`open`): expected decimal string, found non-integer number"
        );
    }

    #[test]
    fn test_kline_bad_decimal_is_an_error() {
        let raw = r#"[1499040000000,"abc","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308]"#;
        let err = decode::<Kline>(raw.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidDecimal { field: "open", ref value } if value == "abc"
        ));
    }

    #[test]
    fn test_kline_list_reports_element_index() {
        let raw = format!(r#"[{},[1,"1"]]"#, KLINE);
        let err = decode::<Vec<Kline>>(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Element { index: 1, .. }));
    }

    #[test]
    fn test_not_an_array() {
        let err = decode::<Kline>(br#"{"openTime":1}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_decode_trades() {
        let raw = br#"[{"id":28457,"price":"4.00000100","qty":"12.00000000","quoteQty":"48.000012","time":1499865549590,"isBuyerMaker":true,"isBestMatch":true}]"#;
        let trades: Vec<Trade> = decode(raw).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].id, 28457);
        assert!((trades[0].price - 4.000_001).abs() < 1e-12);
        assert!((trades[0].volume - 12.0).abs() < 1e-12);
        assert_eq!(datetime_to_millis(&trades[0].timestamp), 1_499_865_549_590);
        assert!(trades[0].is_buyer_maker);
    }

    #[test]
    fn test_decode_aggregate_trade() {
        let raw = br#"{"a":26129,"p":"0.01633102","q":"4.70443515","f":27781,"l":27781,"T":1498793709153,"m":true,"M":true}"#;
        let trade: AggregateTrade = decode(raw).unwrap();
        assert_eq!(trade.id, 26129);
        assert_eq!(trade.first_trade_id, 27781);
        assert_eq!(datetime_to_millis(&trade.timestamp), 1_498_793_709_153);
        assert!((trade.volume - 4.704_435_15).abs() < 1e-12);
    }

    #[test]
    fn test_decode_ticker_stats() {
        let raw = br#"{"symbol":"BNBBTC","priceChange":"-94.99999800","priceChangePercent":"-95.960","weightedAvgPrice":"0.29628482","prevClosePrice":"0.10002000","lastPrice":"4.00000200","lastQty":"200.00000000","bidPrice":"4.00000000","bidQty":"100.00000000","askPrice":"4.00000200","askQty":"100.00000000","openPrice":"99.00000000","highPrice":"100.00000000","lowPrice":"0.10000000","volume":"8913.30000000","quoteVolume":"15.30000000","openTime":1499783499040,"closeTime":1499869899040,"firstId":28385,"lastId":28460,"count":76}"#;
        let stats: TickerStats = decode(raw).unwrap();
        assert_eq!(stats.symbol, "BNBBTC");
        assert!((stats.price_change + 94.999_998).abs() < 1e-9);
        assert_eq!(stats.first_id, 28385);
        assert_eq!(stats.trade_count, 76);
        assert_eq!(datetime_to_millis(&stats.close_time), 1_499_869_899_040);
    }

    #[test]
    fn test_decode_order_book() {
        let raw = br#"{"lastUpdateId":1027024,"bids":[["4.00000000","431.00000000"]],"asks":[["4.00000200","12.00000000"],["5.1","1"]]}"#;
        let book: OrderBook = decode(raw).unwrap();
        assert_eq!(book.last_update_id, 1_027_024);
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.asks.len(), 2);
        assert!((book.bids[0].volume - 431.0).abs() < 1e-12);

        let raw = br#"{"lastUpdateId":1,"bids":[],"asks":[["4.0","1"],["x","1"]]}"#;
        let err = decode::<OrderBook>(raw).unwrap_err();
        assert!(matches!(err, DecodeError::Element { index: 1, .. }));
    }

    #[test]
    fn test_decode_tickers() {
        let book: OrderBookTicker = decode(
            br#"{"symbol":"LTCBTC","bidPrice":"4.00000000","bidQty":"431.00000000","askPrice":"4.00000200","askQty":"9.00000000"}"#,
        )
        .unwrap();
        assert!((book.ask_volume - 9.0).abs() < 1e-12);

        let prices: Vec<PriceTicker> =
            decode(br#"[{"symbol":"LTCBTC","price":"4.00000200"},{"symbol":"ETHBTC","price":"0.07946600"}]"#)
                .unwrap();
        assert_eq!(prices[1].symbol, "ETHBTC");

        let avg: AveragePrice = decode(br#"{"mins":5,"price":"9.35751834"}"#).unwrap();
        assert_eq!(avg.minutes, 5);
    }

    #[test]
    fn test_price_never_defaults_to_zero() {
        for price in ["", "abc", "1,5"] {
            let raw = format!(r#"{{"symbol":"LTCBTC","price":"{}"}}"#, price);
            assert!(decode::<PriceTicker>(raw.as_bytes()).is_err(), "{:?}", price);
        }
        let err = decode::<PriceTicker>(br#"{"symbol":"LTCBTC","price":"NaN"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::NonFiniteDecimal { .. }));
    }

    #[test]
    fn test_decode_account_info() {
        let raw = br#"{"makerCommission":15,"takerCommission":15,"buyerCommission":0,"sellerCommission":0,"canTrade":true,"canWithdraw":true,"canDeposit":true,"updateTime":123456789,"accountType":"SPOT","balances":[{"asset":"BTC","free":"4723846.89208129","locked":"0.00000000"},{"asset":"LTC","free":"4763368.68006011","locked":"0.00000000"}]}"#;
        let account: AccountInfo = decode(raw).unwrap();
        assert_eq!(account.maker_commission, 15);
        assert_eq!(account.account_type, "SPOT");
        assert_eq!(account.balances.len(), 2);
        assert_eq!(account.balances[1].asset, "LTC");
        assert_eq!(datetime_to_millis(&account.update_time), 123_456_789);
    }

    #[test]
    fn test_decode_order_responses() {
        let ack: OrderAck = decode(
            br#"{"symbol":"BTCUSDT","orderId":28,"orderListId":-1,"clientOrderId":"6gCrw2kRUAF9CvJDGP16IP","transactTime":1507725176595}"#,
        )
        .unwrap();
        assert_eq!(ack.order_id, 28);
        assert_eq!(ack.order_list_id, -1);
        assert_eq!(datetime_to_millis(&ack.timestamp), 1_507_725_176_595);

        let cancelled: CancelledOrder = decode(
            br#"{"symbol":"LTCBTC","origClientOrderId":"myOrder1","orderId":4,"orderListId":-1,"clientOrderId":"cancelMyOrder1","price":"2.00000000","origQty":"1.00000000","executedQty":"0.00000000","cummulativeQuoteQty":"0.00000000","status":"CANCELED","timeInForce":"GTC","type":"LIMIT","side":"BUY"}"#,
        )
        .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Canceled);
        assert_eq!(cancelled.time_in_force, TimeInForce::GTC);
        assert_eq!(cancelled.order_type, OrderType::Limit);
        assert_eq!(cancelled.side, OrderSide::Buy);
        assert!((cancelled.original_volume - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_decode_server_time() {
        let time: ServerTime = decode(br#"{"serverTime":1499827319559}"#).unwrap();
        assert_eq!(datetime_to_millis(&time.server_time), 1_499_827_319_559);

        let err = decode::<ServerTime>(br#"{"serverTime":9223372036854775807}"#).unwrap_err();
        assert!(matches!(err, DecodeError::TimestampOutOfRange { .. }));
    }
}
