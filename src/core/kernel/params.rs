use crate::core::errors::ExchangeError;

/// Ordered query parameters.
///
/// Parameters keep the order they were added in. The same encoding is fed to
/// the signer and written to the request URL, so the signed bytes and the
/// transmitted bytes never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`QueryParams::push`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    /// Builder-style push that skips `None`.
    #[must_use]
    pub fn with_optional<T: ToString>(mut self, key: impl Into<String>, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Append a parameter, even if the key is already present.
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// Replace the first value of `key` in place, or append it.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn extend(&mut self, other: &Self) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Percent-encode as `k1=v1&k2=v2`, in insertion order.
    pub fn encode(&self) -> Result<String, ExchangeError> {
        serde_urlencoded::to_string(&self.0).map_err(|e| {
            ExchangeError::InvalidParameters(format!("Failed to encode query string: {}", e))
        })
    }

    /// Parse an encoded query string (without the leading `?`).
    pub fn parse(query: &str) -> Result<Self, ExchangeError> {
        serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .map(Self)
            .map_err(|e| {
                ExchangeError::InvalidParameters(format!("Failed to parse query {:?}: {}", query, e))
            })
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

impl From<&[(&str, &str)]> for QueryParams {
    fn from(params: &[(&str, &str)]) -> Self {
        params.iter().copied().collect()
    }
}

/// Remove the query string from a URL or path. Used to keep metric label
/// cardinality bounded.
///
/// The query starts at the first `?`; later ones belong to it.
pub fn strip_query_params(path: &str) -> &str {
    path.split_once('?').map_or(path, |(bare, _)| bare)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_preserves_insertion_order() {
        let params = QueryParams::new()
            .with("symbol", "LTCBTC")
            .with("side", "BUY")
            .with("type", "LIMIT")
            .with("quantity", 1)
            .with("price", 0.1);
        assert_eq!(
            params.encode().unwrap(),
            "symbol=LTCBTC&side=BUY&type=LIMIT&quantity=1&price=0.1"
        );
    }

    #[test]
    fn test_encode_percent_encodes_values() {
        let params = QueryParams::new().with("newClientOrderId", "a b&c=d");
        assert_eq!(params.encode().unwrap(), "newClientOrderId=a+b%26c%3Dd");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = QueryParams::new().with("a", 1).with("b", 2);
        params.set("a", 3);
        params.set("c", 4);
        assert_eq!(params.encode().unwrap(), "a=3&b=2&c=4");
        assert_eq!(params.get("a"), Some("3"));
        assert!(!params.contains("d"));
    }

    #[test]
    fn test_with_optional_skips_none() {
        let params = QueryParams::new()
            .with_optional("limit", Some(10))
            .with_optional::<u32>("fromId", None);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("limit"), Some("10"));
    }

    #[test]
    fn test_parse_round_trip() {
        let params = QueryParams::parse("symbol=BTC&limit=10&note=a+b").unwrap();
        assert_eq!(params.get("note"), Some("a b"));
        assert_eq!(params.encode().unwrap(), "symbol=BTC&limit=10&note=a+b");
        assert!(QueryParams::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_strip_query_params() {
        assert_eq!(
            strip_query_params("/api/v3/depth?symbol=BTC&limit=10"),
            "/api/v3/depth"
        );
        assert_eq!(
            strip_query_params("https://api.binance.com/api/v3/depth?symbol=BTC"),
            "https://api.binance.com/api/v3/depth"
        );
        assert_eq!(strip_query_params("/api/v3/depth"), "/api/v3/depth");
        assert_eq!(strip_query_params("/api/v3/depth?"), "/api/v3/depth");
    }

    #[test]
    fn test_strip_query_params_cuts_at_first_question_mark() {
        assert_eq!(
            strip_query_params("/api/v3/depth?symbol=BTC&note=why?"),
            "/api/v3/depth"
        );
    }
}
