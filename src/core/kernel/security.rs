use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Authentication a request has to carry, ordered from least to most
/// demanding.
///
/// Everything from [`SecurityLevel::UserStream`] upwards needs the API key
/// header; everything from [`SecurityLevel::Trade`] upwards is also signed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SecurityLevel {
    #[default]
    None = 0,
    UserStream = 1,
    MarketData = 2,
    Trade = 3,
    UserData = 4,
}

impl SecurityLevel {
    pub fn requires_auth(self) -> bool {
        self >= Self::UserStream
    }

    pub fn requires_signing(self) -> bool {
        self >= Self::Trade
    }
}

/// Security group of every authenticated endpoint, keyed by the full request
/// path and HTTP method. Paths missing from this table are public.
static SECURITY_GROUPS: &[(&str, &str, SecurityLevel)] = &[
    ("/api/v3/account", "GET", SecurityLevel::UserData),
    ("/api/v3/allOrderList", "GET", SecurityLevel::UserData),
    ("/api/v3/allOrders", "GET", SecurityLevel::UserData),
    ("/api/v3/historicalTrades", "GET", SecurityLevel::MarketData),
    ("/api/v3/myTrades", "GET", SecurityLevel::UserData),
    ("/api/v3/openOrderList", "GET", SecurityLevel::UserData),
    ("/api/v3/openOrders", "GET", SecurityLevel::UserData),
    ("/api/v3/openOrders", "DELETE", SecurityLevel::Trade),
    ("/api/v3/order", "GET", SecurityLevel::UserData),
    ("/api/v3/order", "POST", SecurityLevel::Trade),
    ("/api/v3/order", "DELETE", SecurityLevel::Trade),
    ("/api/v3/order/test", "POST", SecurityLevel::Trade),
    ("/api/v3/order/oco", "POST", SecurityLevel::Trade),
    ("/api/v3/orderList", "GET", SecurityLevel::UserData),
    ("/api/v3/orderList", "DELETE", SecurityLevel::Trade),
    ("/api/v3/userDataStream", "POST", SecurityLevel::UserStream),
    ("/api/v3/userDataStream", "PUT", SecurityLevel::UserStream),
    ("/api/v3/userDataStream", "DELETE", SecurityLevel::UserStream),
];

/// Look up the security level of `method` on `path`.
///
/// `path` must be the exact request path without a query string. Unknown
/// pairs resolve to [`SecurityLevel::None`], which means "not configured",
/// not "known to be public".
pub fn classify(path: &str, method: &Method) -> SecurityLevel {
    SECURITY_GROUPS
        .iter()
        .find(|(group_path, group_method, _)| {
            *group_path == path && *group_method == method.as_str()
        })
        .map_or(SecurityLevel::None, |(_, _, level)| *level)
}

/// Every configured `(path, method, level)` entry.
pub fn security_groups() -> impl Iterator<Item = (&'static str, &'static str, SecurityLevel)> {
    SECURITY_GROUPS.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_levels() {
        let cases = [
            ("/api/v3/trades", Method::GET, SecurityLevel::None),
            ("/api/v3/order", Method::GET, SecurityLevel::UserData),
            ("/api/v3/order", Method::POST, SecurityLevel::Trade),
            ("/api/v3/order", Method::PUT, SecurityLevel::None),
            ("/api/v3/historicalTrades", Method::GET, SecurityLevel::MarketData),
            ("/api/v3/order/test", Method::POST, SecurityLevel::Trade),
            ("/api/v3/userDataStream", Method::PUT, SecurityLevel::UserStream),
        ];

        for (path, method, expected) in cases {
            assert_eq!(classify(path, &method), expected, "{} {}", method, path);
        }
    }

    #[test]
    fn test_paths_without_api_prefix_are_not_matched() {
        assert_eq!(classify("/account", &Method::GET), SecurityLevel::None);
        assert_eq!(classify("/order", &Method::POST), SecurityLevel::None);
    }

    #[test]
    fn test_signing_implies_auth() {
        let levels = [
            SecurityLevel::None,
            SecurityLevel::UserStream,
            SecurityLevel::MarketData,
            SecurityLevel::Trade,
            SecurityLevel::UserData,
        ];
        for level in levels {
            if level.requires_signing() {
                assert!(level.requires_auth(), "{:?}", level);
            }
        }
        for (path, method, level) in security_groups() {
            assert!(level.requires_auth(), "{} {} is public", method, path);
            if level.requires_signing() {
                assert!(level.requires_auth());
            }
        }
    }

    #[test]
    fn test_thresholds() {
        assert!(!SecurityLevel::None.requires_auth());
        assert!(SecurityLevel::UserStream.requires_auth());
        assert!(!SecurityLevel::MarketData.requires_signing());
        assert!(SecurityLevel::Trade.requires_signing());
        assert!(SecurityLevel::UserData.requires_signing());
    }

    #[test]
    fn test_table_has_no_duplicate_entries() {
        let entries: Vec<_> = security_groups().collect();
        for (i, (path, method, _)) in entries.iter().enumerate() {
            assert!(
                !entries[i + 1..]
                    .iter()
                    .any(|(p, m, _)| p == path && m == method),
                "duplicate entry for {} {}",
                method,
                path
            );
        }
    }
}
