use crate::core::errors::ExchangeError;
use crate::core::kernel::{QueryParams, RequestContext, RestClient};
use crate::core::types::conversion::datetime_to_millis;
use crate::core::types::{
    AccountInfo, AggregateTrade, AveragePrice, CancelledOrder, Kline, KlineInterval, OrderAck,
    OrderBook, OrderBookTicker, OrderResponseType, OrderSide, OrderType, PriceTicker, ServerTime,
    Symbol, TickerStats, TimeInForce, Trade,
};
use crate::exchanges::binance::converters::{decode, FromWire};
use crate::exchanges::binance::types::BinanceOrderRequest;
use chrono::{DateTime, Utc};
use reqwest::Method;
use tracing::instrument;

/// A new order. Optional fields are left out of the request when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderRequest {
    pub symbol: Symbol,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    pub quantity: Option<f64>,
    pub quote_order_qty: Option<f64>,
    pub price: Option<f64>,
    pub client_order_id: Option<String>,
    pub stop_price: Option<f64>,
    pub iceberg_qty: Option<f64>,
    pub response_type: Option<OrderResponseType>,
}

impl NewOrderRequest {
    /// Good-till-cancelled limit order.
    pub fn limit(symbol: Symbol, side: OrderSide, quantity: f64, price: f64) -> Self {
        Self {
            time_in_force: Some(TimeInForce::GTC),
            quantity: Some(quantity),
            price: Some(price),
            ..Self::new(symbol, side, OrderType::Limit)
        }
    }

    pub fn market(symbol: Symbol, side: OrderSide, quantity: f64) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::new(symbol, side, OrderType::Market)
        }
    }

    pub fn new(symbol: Symbol, side: OrderSide, order_type: OrderType) -> Self {
        Self {
            symbol,
            side,
            order_type,
            time_in_force: None,
            quantity: None,
            quote_order_qty: None,
            price: None,
            client_order_id: None,
            stop_price: None,
            iceberg_qty: None,
            response_type: None,
        }
    }

    #[must_use]
    pub fn with_client_order_id(mut self, client_order_id: impl Into<String>) -> Self {
        self.client_order_id = Some(client_order_id.into());
        self
    }

    #[must_use]
    pub fn with_response_type(mut self, response_type: OrderResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Form-encoded request body.
    pub fn to_form(&self) -> Result<String, ExchangeError> {
        serde_urlencoded::to_string(BinanceOrderRequest::from(self))
            .map_err(|e| ExchangeError::InvalidParameters(format!("Failed to encode order: {}", e)))
    }
}

impl From<&NewOrderRequest> for BinanceOrderRequest {
    fn from(order: &NewOrderRequest) -> Self {
        Self {
            symbol: order.symbol.as_str().to_string(),
            side: order.side.as_str().to_string(),
            order_type: order.order_type.as_str().to_string(),
            time_in_force: order.time_in_force.map(|tif| tif.as_str().to_string()),
            quantity: order.quantity.map(|v| v.to_string()),
            quote_order_qty: order.quote_order_qty.map(|v| v.to_string()),
            price: order.price.map(|v| v.to_string()),
            new_client_order_id: order.client_order_id.clone(),
            stop_price: order.stop_price.map(|v| v.to_string()),
            iceberg_qty: order.iceberg_qty.map(|v| v.to_string()),
            new_order_resp_type: order.response_type.map(|rt| rt.as_str().to_string()),
        }
    }
}

/// Thin typed wrapper around `RestClient` for Binance API
#[derive(Debug)]
pub struct BinanceRestClient<R: RestClient> {
    client: R,
}

impl<R: RestClient> BinanceRestClient<R> {
    pub fn new(client: R) -> Self {
        Self { client }
    }

    pub fn rest(&self) -> &R {
        &self.client
    }

    async fn fetch<T: FromWire>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        params: &QueryParams,
        body: &[u8],
    ) -> Result<T, ExchangeError> {
        let response = self.client.execute(ctx, method, path, params, body).await?;
        Ok(decode(&response.body)?)
    }

    /// Test connectivity.
    pub async fn ping(&self, ctx: &RequestContext) -> Result<(), ExchangeError> {
        self.client
            .get(ctx, "/api/v3/ping", &QueryParams::new())
            .await
            .map(|_| ())
    }

    pub async fn server_time(&self, ctx: &RequestContext) -> Result<ServerTime, ExchangeError> {
        self.fetch(ctx, Method::GET, "/api/v3/time", &QueryParams::new(), &[])
            .await
    }

    /// Get klines/candlestick data
    #[instrument(skip(self, ctx), fields(exchange = "binance", symbol = %symbol, interval = %interval))]
    pub async fn klines(
        &self,
        ctx: &RequestContext,
        symbol: Symbol,
        interval: KlineInterval,
        limit: Option<u32>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<Kline>, ExchangeError> {
        let params = QueryParams::new()
            .with("symbol", symbol)
            .with("interval", interval)
            .with_optional("limit", limit)
            .with_optional("startTime", start_time.as_ref().map(datetime_to_millis))
            .with_optional("endTime", end_time.as_ref().map(datetime_to_millis));

        self.fetch(ctx, Method::GET, "/api/v3/klines", &params, &[])
            .await
    }

    /// Get order book depth for a symbol
    #[instrument(skip(self, ctx), fields(exchange = "binance", symbol = %symbol))]
    pub async fn order_book(
        &self,
        ctx: &RequestContext,
        symbol: Symbol,
        limit: Option<u32>,
    ) -> Result<OrderBook, ExchangeError> {
        let params = QueryParams::new()
            .with("symbol", symbol)
            .with_optional("limit", limit);
        self.fetch(ctx, Method::GET, "/api/v3/depth", &params, &[])
            .await
    }

    #[instrument(skip(self, ctx), fields(exchange = "binance", symbol = %symbol))]
    pub async fn recent_trades(
        &self,
        ctx: &RequestContext,
        symbol: Symbol,
        limit: Option<u32>,
    ) -> Result<Vec<Trade>, ExchangeError> {
        let params = QueryParams::new()
            .with("symbol", symbol)
            .with_optional("limit", limit);
        self.fetch(ctx, Method::GET, "/api/v3/trades", &params, &[])
            .await
    }

    /// Older trades. Needs an API key.
    #[instrument(skip(self, ctx), fields(exchange = "binance", symbol = %symbol))]
    pub async fn historical_trades(
        &self,
        ctx: &RequestContext,
        symbol: Symbol,
        limit: Option<u32>,
        from_id: Option<i64>,
    ) -> Result<Vec<Trade>, ExchangeError> {
        let params = QueryParams::new()
            .with("symbol", symbol)
            .with_optional("limit", limit)
            .with_optional("fromId", from_id);
        self.fetch(ctx, Method::GET, "/api/v3/historicalTrades", &params, &[])
            .await
    }

    #[instrument(skip(self, ctx), fields(exchange = "binance", symbol = %symbol))]
    pub async fn aggregate_trades(
        &self,
        ctx: &RequestContext,
        symbol: Symbol,
        limit: Option<u32>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<AggregateTrade>, ExchangeError> {
        let params = QueryParams::new()
            .with("symbol", symbol)
            .with_optional("limit", limit)
            .with_optional("startTime", start_time.as_ref().map(datetime_to_millis))
            .with_optional("endTime", end_time.as_ref().map(datetime_to_millis));
        self.fetch(ctx, Method::GET, "/api/v3/aggTrades", &params, &[])
            .await
    }

    pub async fn average_price(
        &self,
        ctx: &RequestContext,
        symbol: Symbol,
    ) -> Result<AveragePrice, ExchangeError> {
        let params = QueryParams::new().with("symbol", symbol);
        self.fetch(ctx, Method::GET, "/api/v3/avgPrice", &params, &[])
            .await
    }

    /// 24 hour rolling window statistics.
    pub async fn ticker_stats(
        &self,
        ctx: &RequestContext,
        symbol: Symbol,
    ) -> Result<TickerStats, ExchangeError> {
        let params = QueryParams::new().with("symbol", symbol);
        self.fetch(ctx, Method::GET, "/api/v3/ticker/24hr", &params, &[])
            .await
    }

    pub async fn price_ticker(
        &self,
        ctx: &RequestContext,
        symbol: Symbol,
    ) -> Result<PriceTicker, ExchangeError> {
        let params = QueryParams::new().with("symbol", symbol);
        self.fetch(ctx, Method::GET, "/api/v3/ticker/price", &params, &[])
            .await
    }

    /// Latest price of every market.
    pub async fn all_price_tickers(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<PriceTicker>, ExchangeError> {
        self.fetch(ctx, Method::GET, "/api/v3/ticker/price", &QueryParams::new(), &[])
            .await
    }

    pub async fn book_ticker(
        &self,
        ctx: &RequestContext,
        symbol: Symbol,
    ) -> Result<OrderBookTicker, ExchangeError> {
        let params = QueryParams::new().with("symbol", symbol);
        self.fetch(ctx, Method::GET, "/api/v3/ticker/bookTicker", &params, &[])
            .await
    }

    pub async fn all_book_tickers(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<OrderBookTicker>, ExchangeError> {
        self.fetch(ctx, Method::GET, "/api/v3/ticker/bookTicker", &QueryParams::new(), &[])
            .await
    }

    /// Get account information
    #[instrument(skip(self, ctx), fields(exchange = "binance"))]
    pub async fn account_info(&self, ctx: &RequestContext) -> Result<AccountInfo, ExchangeError> {
        self.fetch(ctx, Method::GET, "/api/v3/account", &QueryParams::new(), &[])
            .await
    }

    /// Place an order
    #[instrument(skip(self, ctx, order), fields(exchange = "binance", symbol = %order.symbol, side = ?order.side))]
    pub async fn place_order(
        &self,
        ctx: &RequestContext,
        order: &NewOrderRequest,
    ) -> Result<OrderAck, ExchangeError> {
        let body = order.to_form()?;
        self.fetch(ctx, Method::POST, "/api/v3/order", &QueryParams::new(), body.as_bytes())
            .await
    }

    /// Validate an order without sending it to the matching engine.
    #[instrument(skip(self, ctx, order), fields(exchange = "binance", symbol = %order.symbol))]
    pub async fn test_order(
        &self,
        ctx: &RequestContext,
        order: &NewOrderRequest,
    ) -> Result<(), ExchangeError> {
        let body = order.to_form()?;
        self.client
            .post(ctx, "/api/v3/order/test", &QueryParams::new(), body.as_bytes())
            .await
            .map(|_| ())
    }

    /// Cancel an order by exchange id or by the client id it was placed with.
    #[instrument(skip(self, ctx), fields(exchange = "binance", symbol = %symbol))]
    pub async fn cancel_order(
        &self,
        ctx: &RequestContext,
        symbol: Symbol,
        order_id: Option<i64>,
        orig_client_order_id: Option<&str>,
    ) -> Result<CancelledOrder, ExchangeError> {
        if order_id.is_none() && orig_client_order_id.is_none() {
            return Err(ExchangeError::InvalidParameters(
                "either order_id or orig_client_order_id is required".to_string(),
            ));
        }

        let params = QueryParams::new()
            .with("symbol", symbol)
            .with_optional("orderId", order_id)
            .with_optional("origClientOrderId", orig_client_order_id);
        self.fetch(ctx, Method::DELETE, "/api/v3/order", &params, &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_order_form_matches_documented_order() {
        let order = NewOrderRequest::limit(Symbol::LtcBtc, OrderSide::Buy, 1.0, 0.1);
        assert_eq!(
            order.to_form().unwrap(),
            "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1"
        );
    }

    #[test]
    fn test_market_order_form_skips_unset_fields() {
        let order = NewOrderRequest::market(Symbol::BtcUsdt, OrderSide::Sell, 0.5)
            .with_client_order_id("my order")
            .with_response_type(OrderResponseType::Ack);
        assert_eq!(
            order.to_form().unwrap(),
            "symbol=BTCUSDT&side=SELL&type=MARKET&quantity=0.5&newClientOrderId=my+order&newOrderRespType=ACK"
        );
    }
}
