use crate::core::errors::ExchangeError;
use crate::core::kernel::params::QueryParams;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// A query string that has been timestamped and signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedQuery {
    /// Encoded query including `timestamp`, `recvWindow` and `signature`.
    pub query: String,
    pub signature: String,
    pub timestamp: u64,
}

/// Request authentication.
///
/// Implementations own the credentials; the pipeline only asks for the key
/// header value and for signatures.
pub trait Signer: Send + Sync {
    /// Value of the [`API_KEY_HEADER`] header.
    fn api_key(&self) -> &str;

    /// Add `recvWindow` (unless already present) and `timestamp` to `params`
    /// and sign the encoded result followed by `body`.
    fn sign_request(
        &self,
        params: &QueryParams,
        body: &[u8],
        timestamp: u64,
    ) -> Result<SignedQuery, ExchangeError>;
}

/// HMAC-SHA256 signer.
pub struct HmacSigner {
    api_key: String,
    secret_key: Secret<String>,
    recv_window: Duration,
}

impl HmacSigner {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key: Secret::new(secret_key),
            recv_window: crate::core::config::DEFAULT_RECV_WINDOW,
        }
    }

    #[must_use]
    pub fn with_recv_window(mut self, recv_window: Duration) -> Self {
        self.recv_window = recv_window;
        self
    }

    pub fn recv_window(&self) -> Duration {
        self.recv_window
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner")
            .field("api_key", &self.api_key)
            .field("recv_window", &self.recv_window)
            .finish_non_exhaustive()
    }
}

impl Signer for HmacSigner {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn sign_request(
        &self,
        params: &QueryParams,
        body: &[u8],
        timestamp: u64,
    ) -> Result<SignedQuery, ExchangeError> {
        let mut params = params.clone();
        if !params.contains("recvWindow") {
            params.push("recvWindow", self.recv_window.as_millis());
        }
        params.set("timestamp", timestamp);

        let payload = params.encode()?;
        let signature = generate_signature(self.secret_key.expose_secret(), &payload, body)?;

        let query = format!("{}&signature={}", payload, signature);
        Ok(SignedQuery {
            query,
            signature,
            timestamp,
        })
    }
}

/// Lowercase hex HMAC-SHA256 of `query` immediately followed by `body`.
pub fn generate_signature(secret: &str, query: &str, body: &[u8]) -> Result<String, ExchangeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::AuthError(format!("Failed to create HMAC: {}", e)))?;
    mac.update(query.as_bytes());
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Current time in milliseconds since the Unix epoch.
pub fn get_timestamp() -> Result<u64, ExchangeError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .map_err(|e| ExchangeError::Other(format!("System time error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const API_KEY: &str = "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A";
    const SECRET_KEY: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

    fn order_params() -> QueryParams {
        QueryParams::new()
            .with("symbol", "LTCBTC")
            .with("side", "BUY")
            .with("type", "LIMIT")
            .with("timeInForce", "GTC")
            .with("quantity", "1")
            .with("price", "0.1")
    }

    #[test]
    fn test_reference_vector_query_string() {
        let signature = generate_signature(
            SECRET_KEY,
            "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559",
            b"",
        )
        .unwrap();
        assert_eq!(
            signature,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn test_reference_vector_request_body() {
        let signature = generate_signature(
            SECRET_KEY,
            "",
            b"symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559",
        )
        .unwrap();
        assert_eq!(
            signature,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_reference_vector_mixed_query_and_body() {
        let signature = generate_signature(
            SECRET_KEY,
            "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC",
            b"quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559",
        )
        .unwrap();
        assert_eq!(
            signature,
            "0fd168b8ddb4876a0358a8d14d0c9f3da0e9b20c5d52b2a00fcf7d1c602f9a77"
        );
    }

    #[test]
    fn test_sign_request_appends_window_timestamp_and_signature() {
        let signer = HmacSigner::new(API_KEY.to_string(), SECRET_KEY.to_string());
        let signed = signer
            .sign_request(&order_params(), b"", 1_499_827_319_559)
            .unwrap();

        assert_eq!(
            signed.signature,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
        assert_eq!(
            signed.query,
            "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1\
             &recvWindow=5000&timestamp=1499827319559\
             &signature=c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
        assert_eq!(signer.api_key(), API_KEY);
    }

    #[test]
    fn test_sign_request_keeps_caller_recv_window() {
        let signer = HmacSigner::new(API_KEY.to_string(), SECRET_KEY.to_string())
            .with_recv_window(Duration::from_millis(60_000));
        let params = order_params().with("recvWindow", 5000);

        let signed = signer.sign_request(&params, b"", 1_499_827_319_559).unwrap();
        assert!(signed.query.contains("recvWindow=5000&timestamp="));
        assert!(!signed.query.contains("60000"));
        assert_eq!(
            signed.signature,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_custom_recv_window() {
        let signer = HmacSigner::new(API_KEY.to_string(), SECRET_KEY.to_string())
            .with_recv_window(Duration::from_millis(10_000));
        let signed = signer.sign_request(&QueryParams::new(), b"", 1).unwrap();
        assert!(signed.query.starts_with("recvWindow=10000&timestamp=1&signature="));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let signer = HmacSigner::new(API_KEY.to_string(), SECRET_KEY.to_string());
        let first = signer.sign_request(&order_params(), b"a=1", 42).unwrap();
        let second = signer.sign_request(&order_params(), b"a=1", 42).unwrap();
        assert_eq!(first, second);

        let later = signer.sign_request(&order_params(), b"a=1", 43).unwrap();
        assert_ne!(first.signature, later.signature);
    }

    #[test]
    fn test_body_is_part_of_signed_material() {
        let signer = HmacSigner::new(API_KEY.to_string(), SECRET_KEY.to_string());
        let without_body = signer.sign_request(&order_params(), b"", 42).unwrap();
        let with_body = signer.sign_request(&order_params(), b"x=1", 42).unwrap();
        assert_ne!(without_body.signature, with_body.signature);
    }

    #[test]
    fn test_empty_secret_signs_deterministically() {
        let signature = generate_signature("", "timestamp=1", b"").unwrap();
        assert_eq!(
            signature,
            "e8ef26a86cdb81c478e65cee82715c04bbc90569a997e9e4fa97cea27eeee067"
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let signer = HmacSigner::new(API_KEY.to_string(), SECRET_KEY.to_string());
        assert!(!format!("{:?}", signer).contains(SECRET_KEY));
    }
}
