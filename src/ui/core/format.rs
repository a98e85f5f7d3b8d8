use serde_json::Value;
use std::collections::BTreeMap;

/// How one payload field is turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fmt {
    /// `$1234.50`
    Currency,
    /// `-1.25%`
    Percent,
    /// Coin or token amount with the given number of decimals.
    Quantity(usize),
    Text,
    /// Confirmation flag shown as `Confirmed` / `Pending`.
    Flag,
    /// Date-time text cut to `YYYY-MM-DD HH:MM:SS`.
    Timestamp,
    /// List of `{token, type, usd_value}` transactions summarized per token.
    FlowSummary,
}

pub const SUMMARY_TOKENS: [&str; 3] = ["BTC", "ETH", "USDC"];

pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn currency(v: f64) -> String {
    if v < 0.0 {
        format!("-${:.2}", v.abs())
    } else {
        format!("${:.2}", v)
    }
}

pub fn percent(v: f64) -> String {
    format!("{:.2}%", v)
}

pub fn quantity(v: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, v)
}

impl Fmt {
    /// Formats a present field. `None` means the value cannot be shown with
    /// this format, and callers treat it like a missing field.
    pub fn apply(&self, value: &Value) -> Option<String> {
        match self {
            Fmt::Currency => number(value).map(currency),
            Fmt::Percent => number(value).map(percent),
            Fmt::Quantity(decimals) => number(value).map(|v| quantity(v, *decimals)),
            Fmt::Text => Some(text(value)),
            Fmt::Flag => value
                .as_bool()
                .map(|confirmed| if confirmed { "Confirmed" } else { "Pending" }.to_string()),
            Fmt::Timestamp => Some(timestamp(value)),
            Fmt::FlowSummary => value.as_array().map(|txs| flow_summary(txs)),
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn timestamp(value: &Value) -> String {
    match value {
        Value::String(s) => {
            let normalized = s.replacen('T', " ", 1);
            normalized.chars().take(19).collect()
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| n.to_string()),
        other => text(other),
    }
}

fn flow_summary(txs: &[Value]) -> String {
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for tx in txs {
        let token = tx.get("token").and_then(Value::as_str).unwrap_or_default();
        let usd = tx.get("usd_value").and_then(number).unwrap_or(0.0);
        let entry = totals.entry(token).or_default();
        match tx.get("type").and_then(Value::as_str) {
            Some("buy") => entry.0 += usd,
            Some("sell") => entry.1 += usd,
            _ => {}
        }
    }

    SUMMARY_TOKENS
        .iter()
        .map(|token| {
            let (buy, sell) = totals.get(token).copied().unwrap_or_default();
            format!("{}: {} (buy), {} (sell)", token, currency(buy), currency(sell))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn precision_is_per_format() {
        assert_eq!(Fmt::Currency.apply(&json!(64000.457)), Some("$64000.46".into()));
        assert_eq!(Fmt::Currency.apply(&json!(-12.5)), Some("-$12.50".into()));
        assert_eq!(Fmt::Percent.apply(&json!(-1.234)), Some("-1.23%".into()));
        assert_eq!(Fmt::Quantity(2).apply(&json!(3)), Some("3.00".into()));
        assert_eq!(
            Fmt::Quantity(8).apply(&json!(0.123456789)),
            Some("0.12345679".into())
        );
    }

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(Fmt::Currency.apply(&json!("10")), Some("$10.00".into()));
        assert_eq!(Fmt::Percent.apply(&json!("n/a")), None);
        assert_eq!(Fmt::Currency.apply(&json!({"price": 1})), None);
    }

    #[test]
    fn flags_and_timestamps() {
        assert_eq!(Fmt::Flag.apply(&json!(true)), Some("Confirmed".into()));
        assert_eq!(Fmt::Flag.apply(&json!(false)), Some("Pending".into()));
        assert_eq!(
            Fmt::Timestamp.apply(&json!("2024-03-01T10:20:30.123456")),
            Some("2024-03-01 10:20:30".into())
        );
        assert_eq!(
            Fmt::Timestamp.apply(&json!(0)),
            Some("1970-01-01 00:00:00".into())
        );
    }

    #[test]
    fn flow_summary_totals_buys_and_sells() {
        let txs = json!([
            {"token": "BTC", "type": "buy", "usd_value": 100.0},
            {"token": "BTC", "type": "buy", "usd_value": 50.5},
            {"token": "ETH", "type": "sell", "usd_value": 20.0}
        ]);
        assert_eq!(
            Fmt::FlowSummary.apply(&txs).unwrap(),
            "BTC: $150.50 (buy), $0.00 (sell); ETH: $0.00 (buy), $20.00 (sell); USDC: $0.00 (buy), $0.00 (sell)"
        );
    }
}
