//! Helpers for pulling a price out of a JSON payload

use coin_ticker_common::{Result, TickerError};
use serde_json::Value;

/// Walk `path` through nested objects
pub fn lookup<'a, S: AsRef<str>>(
    payload: &'a Value,
    path: &[S],
) -> std::result::Result<&'a Value, String> {
    let mut current = payload;
    for (depth, key) in path.iter().enumerate() {
        let key = key.as_ref();
        let object = current.as_object().ok_or_else(|| {
            if depth == 0 {
                format!("expected a JSON object, found {}", kind(current))
            } else {
                format!("`{}` is not an object", dotted(&path[..depth]))
            }
        })?;
        current = object
            .get(key)
            .ok_or_else(|| format!("missing field `{}`", dotted(&path[..=depth])))?;
    }
    Ok(current)
}

/// Price from a JSON number or a numeric string. Anything else is an error,
/// never a zero.
pub fn parse_price(value: &Value) -> std::result::Result<f64, String> {
    let price = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("number {} is not representable as f64", n))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("{:?} is not a number: {}", s, e))?,
        other => return Err(format!("expected a number or numeric string, found {}", kind(other))),
    };

    if !price.is_finite() {
        return Err(format!("price {} is not finite", price));
    }
    Ok(price)
}

/// `lookup` + `parse_price`, failures reported as `BadData` for `provider`
pub fn price_at<S: AsRef<str>>(provider: &str, payload: &Value, path: &[S]) -> Result<f64> {
    lookup(payload, path)
        .and_then(parse_price)
        .map_err(|cause| TickerError::bad_data(provider, cause))
}

fn dotted<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(".")
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested() {
        let payload = json!({"data": {"quotes": {"USD": {"price": 1.5}}}});
        let value = lookup(&payload, &["data", "quotes", "USD", "price"]).unwrap();
        assert_eq!(value, &json!(1.5));
    }

    #[test]
    fn test_lookup_reports_missing_path() {
        let payload = json!({"data": {}});
        let err = lookup(&payload, &["data", "amount"]).unwrap_err();
        assert_eq!(err, "missing field `data.amount`");

        let payload = json!({"data": "oops"});
        let err = lookup(&payload, &["data", "amount"]).unwrap_err();
        assert_eq!(err, "`data` is not an object");

        let err = lookup(&json!([1, 2]), &["data"]).unwrap_err();
        assert_eq!(err, "expected a JSON object, found an array");
    }

    #[test]
    fn test_parse_price_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_price(&json!(42)).unwrap(), 42.0);
        assert_eq!(parse_price(&json!(50000.25)).unwrap(), 50000.25);
        assert_eq!(parse_price(&json!("50000.25")).unwrap(), 50000.25);
        assert_eq!(parse_price(&json!(" 1e3 ")).unwrap(), 1000.0);
    }

    #[test]
    fn test_parse_price_rejects_non_numeric() {
        assert!(parse_price(&json!("abc")).is_err());
        assert!(parse_price(&json!("")).is_err());
        assert!(parse_price(&json!("NaN")).is_err());
        assert!(parse_price(&json!("inf")).is_err());
        assert!(parse_price(&json!(null)).is_err());
        assert!(parse_price(&json!(true)).is_err());
        assert!(parse_price(&json!({"amount": "1"})).is_err());
    }

    #[test]
    fn test_price_at_wraps_bad_data() {
        let err = price_at("CoinCap", &json!({"data": {}}), &["data", "rateUsd"]).unwrap_err();
        assert!(matches!(
            err,
            TickerError::BadData { ref provider, ref cause }
                if provider == "CoinCap" && cause == "missing field `data.rateUsd`"
        ));
    }
}
