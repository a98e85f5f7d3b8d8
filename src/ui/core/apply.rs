//! Turns payload fields into widget contents, with the fallback each
//! binding declares for missing data.

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeSet;

use super::charts::{CandleData, ChartSeries, LineSeries, ShareSlice};
use super::dates::{leading_date, DateRange};
use super::format::{number, SUMMARY_TOKENS};
use super::registry::{
    Column, SeriesSource, TableBinding, TableSource, TextBinding, NO_DATA_ROW,
};
use super::widgets::TableRow;
use crate::api::bridge::{lookup, Payload};

/// Flattens a record container: a list, or an object of lists keyed by
/// token.
pub fn records(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .collect(),
        _ => Vec::new(),
    }
}

fn record_row(record: &Value, columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            record
                .get(column.key)
                .filter(|v| !v.is_null())
                .and_then(|v| column.fmt.apply(v))
                .unwrap_or_else(|| "-".to_string())
        })
        .collect()
}

pub fn table_rows(binding: &TableBinding, payload: &Payload) -> Vec<TableRow> {
    let span = binding.columns.len();
    let no_data = || vec![TableRow::spanning(NO_DATA_ROW, span)];

    let rows: Vec<TableRow> = match &binding.source {
        TableSource::Metrics { container, metrics } => {
            let Some(object) = payload.lookup(container) else {
                return no_data();
            };
            metrics
                .iter()
                .filter_map(|metric| {
                    let value = lookup(object, metric.key)?;
                    let text = metric.fmt.apply(value)?;
                    Some(TableRow::cells([metric.label.to_string(), text]))
                })
                .collect()
        }
        TableSource::Records { container, columns } => {
            let Some(list) = payload.lookup(container) else {
                return no_data();
            };
            records(list)
                .into_iter()
                .map(|record| TableRow::Cells(record_row(record, columns)))
                .collect()
        }
        TableSource::Keyed { container, rows } => {
            let Some(object) = payload.lookup(container) else {
                return no_data();
            };
            rows.iter()
                .filter_map(|row| {
                    let entry = object.get(row.key).filter(|v| !v.is_null())?;
                    let mut cells = vec![row.key.to_string()];
                    cells.extend(record_row(entry, row.columns));
                    Some(TableRow::Cells(cells))
                })
                .collect()
        }
    };

    if rows.is_empty() {
        no_data()
    } else {
        rows
    }
}

pub fn text_value(binding: &TextBinding, payload: &Payload) -> String {
    payload
        .lookup(binding.path)
        .and_then(|value| binding.fmt.apply(value))
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| binding.fallback.to_string())
}

/// Extracts the plotted series, filtered to `range`. `None` when nothing is
/// left to draw.
pub fn chart_series(source: &SeriesSource, payload: &Payload, range: &DateRange) -> Option<ChartSeries> {
    match source {
        SeriesSource::Candles { container } => {
            candles(payload.lookup(container)?, range).map(ChartSeries::Candles)
        }
        SeriesSource::Line { container, x, y, label } => {
            let series = payload.lookup(container)?;
            let dates = series.get(*x)?.as_array()?;
            let values = series.get(*y)?.as_array()?;
            let points: Vec<(NaiveDate, f64)> = dates
                .iter()
                .zip(values)
                .filter_map(|(date, value)| {
                    let date = date.as_str().and_then(leading_date)?;
                    Some((date, number(value)?))
                })
                .filter(|(date, _)| range.contains(*date))
                .collect();
            if points.is_empty() {
                return None;
            }
            Some(ChartSeries::Lines(vec![LineSeries {
                label: label.to_string(),
                points,
            }]))
        }
        SeriesSource::DailyFlows { container } => {
            daily_flows(payload.lookup(container)?, range).map(ChartSeries::Lines)
        }
        SeriesSource::Shares { container, label, volume, delta } => {
            shares(payload.lookup(container)?, label, volume, delta).map(ChartSeries::Shares)
        }
    }
}

fn candles(history: &Value, range: &DateRange) -> Option<Vec<CandleData>> {
    let column = |key: &str| history.get(key).and_then(Value::as_array);
    let dates = column("dates")?;
    let (open, high, low, close) = (column("open")?, column("high")?, column("low")?, column("close")?);

    let candles: Vec<CandleData> = dates
        .iter()
        .enumerate()
        .filter_map(|(i, date)| {
            Some(CandleData {
                date: date.as_str().and_then(leading_date)?,
                open: open.get(i).and_then(number)?,
                high: high.get(i).and_then(number)?,
                low: low.get(i).and_then(number)?,
                close: close.get(i).and_then(number)?,
            })
        })
        .filter(|candle| range.contains(candle.date))
        .collect();

    (!candles.is_empty()).then_some(candles)
}

fn daily_flows(transactions: &Value, range: &DateRange) -> Option<Vec<LineSeries>> {
    let txs: Vec<(NaiveDate, &str, &str, f64)> = records(transactions)
        .into_iter()
        .filter_map(|tx| {
            let date = tx.get("timestamp")?.as_str().and_then(leading_date)?;
            let token = tx.get("token")?.as_str()?;
            let side = tx.get("type")?.as_str()?;
            let usd = tx.get("usd_value").and_then(number).unwrap_or(0.0);
            Some((date, token, side, usd))
        })
        .filter(|(date, ..)| range.contains(*date))
        .collect();

    let days: BTreeSet<NaiveDate> = txs.iter().map(|(date, ..)| *date).collect();

    let mut lines = Vec::new();
    for token in SUMMARY_TOKENS {
        for (side, label) in [("buy", "Buys"), ("sell", "Sells")] {
            let points: Vec<(NaiveDate, f64)> = days
                .iter()
                .map(|day| {
                    let total: f64 = txs
                        .iter()
                        .filter(|(date, t, s, _)| date == day && *t == token && *s == side)
                        .map(|(.., usd)| usd)
                        .sum();
                    (*day, total)
                })
                .collect();
            if points.iter().any(|(_, v)| *v > 0.0) {
                lines.push(LineSeries {
                    label: format!("{} {} (USD)", token, label),
                    points,
                });
            }
        }
    }

    (!lines.is_empty()).then_some(lines)
}

fn shares(list: &Value, label: &str, volume: &str, delta: &str) -> Option<Vec<ShareSlice>> {
    let weighted: Vec<(String, f64, f64)> = records(list)
        .into_iter()
        .filter_map(|record| {
            let name = record.get(label)?.as_str()?.to_string();
            let vol = record.get(volume).and_then(number).unwrap_or(0.0);
            let dlt = record.get(delta).and_then(number).unwrap_or(0.0);
            Some((name, vol, vol * dlt))
        })
        .collect();

    let total: f64 = weighted.iter().map(|(_, _, area)| area).sum();
    if weighted.is_empty() || total <= 0.0 {
        return None;
    }

    Some(
        weighted
            .into_iter()
            .map(|(label, backing, area)| ShareSlice {
                label,
                share: area / total * 100.0,
                backing,
            })
            .collect(),
    )
}

/// Rows of a placeholder-bearing table while its section is loading.
pub fn placeholder_rows(binding: &TableBinding) -> Option<Vec<TableRow>> {
    binding
        .placeholder
        .map(|text| vec![TableRow::spanning(text, binding.columns.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::core::registry::{bindings_for, ChartBinding};
    use crate::ui::core::section::Section;
    use serde_json::json;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange {
            start: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
        }
    }

    fn table(section: Section, id: &str) -> &'static TableBinding {
        bindings_for(section).tables.iter().find(|t| t.id == id).unwrap()
    }

    fn chart(section: Section, id: &str) -> &'static ChartBinding {
        bindings_for(section).charts.iter().find(|c| c.id == id).unwrap()
    }

    #[test]
    fn absent_metrics_are_omitted() {
        let payload = Payload::new(json!({"markets": {"price": 64000.5, "volume_24h": 1.0}}));
        let rows = table_rows(table(Section::Bitcoin, "marketStatsTableBody"), &payload);
        assert_eq!(
            rows,
            vec![
                TableRow::cells(["Price (USD)", "$64000.50"]),
                TableRow::cells(["24h Volume (USD)", "$1.00"]),
            ]
        );
    }

    #[test]
    fn absent_container_renders_spanning_notice() {
        let payload = Payload::new(json!({"analysis": "x"}));
        let rows = table_rows(table(Section::Bitcoin, "topFlowsTableBody"), &payload);
        assert_eq!(rows, vec![TableRow::spanning(NO_DATA_ROW, 4)]);

        let rows = table_rows(table(Section::Bitcoin, "flowsTableBody"), &payload);
        assert_eq!(rows, vec![TableRow::spanning(NO_DATA_ROW, 2)]);
    }

    #[test]
    fn root_metrics_render_when_any_present() {
        let payload = Payload::new(json!({"net_flow": -3.456}));
        let rows = table_rows(table(Section::Bitcoin, "flowsTableBody"), &payload);
        assert_eq!(rows, vec![TableRow::cells(["Net Flow (BTC)", "-3.46"])]);
    }

    #[test]
    fn keyed_balances_keep_per_token_precision() {
        let payload = Payload::new(json!({"balances": {
            "BTC": {"balance": 1.123456789, "balance_usd": 70000.0},
            "USDC": {"balance": 10.5, "balance_usd": 10.5}
        }}));
        let rows = table_rows(table(Section::Blackrock, "blackrock-balancesTableBody"), &payload);
        assert_eq!(
            rows,
            vec![
                TableRow::cells(["BTC", "1.12345679", "$70000.00"]),
                TableRow::cells(["USDC", "10.50", "$10.50"]),
            ]
        );
    }

    #[test]
    fn empty_record_list_renders_notice() {
        let payload = Payload::new(json!({"fed_news_correlation": []}));
        let binding = table(Section::Blackrock, "blackrock-fedCorrelationTableBody");
        assert_eq!(table_rows(binding, &payload), vec![TableRow::spanning(NO_DATA_ROW, 5)]);
    }

    #[test]
    fn missing_text_uses_fallback() {
        let slot = bindings_for(Section::Bitcoin)
            .text_slots
            .iter()
            .find(|t| t.id == "marketAnalysis")
            .unwrap();
        assert_eq!(text_value(slot, &Payload::new(json!({}))), "No analysis available");
        assert_eq!(text_value(slot, &Payload::new(json!({"analysis": ""}))), "No analysis available");
        assert_eq!(text_value(slot, &Payload::new(json!({"analysis": "Up"}))), "Up");
    }

    #[test]
    fn candles_are_filtered_to_range() {
        let payload = Payload::new(json!({"price_history": {
            "dates": ["2023-12-31", "2024-01-01", "2024-01-31", "2024-02-01"],
            "open": [1, 2, 3, 4], "high": [1, 2, 3, 4], "low": [1, 2, 3, 4], "close": [1, 2, 3, 4]
        }}));
        let series = chart_series(
            &chart(Section::Bitcoin, "priceTrendChart").source,
            &payload,
            &range("2024-01-01", "2024-01-31"),
        )
        .unwrap();
        assert_eq!(series.point_count(), 2);
    }

    #[test]
    fn line_outside_range_is_no_data() {
        let payload = Payload::new(json!({"fees": {"dates": ["2023-01-01"], "values": [1.5]}}));
        let source = &chart(Section::Bitcoin, "feesChart").source;
        assert!(chart_series(source, &payload, &range("2024-01-01", "2024-01-31")).is_none());
        assert!(chart_series(source, &Payload::new(json!({})), &range("2024-01-01", "2024-01-31")).is_none());
    }

    #[test]
    fn daily_flows_aggregate_by_token_and_side() {
        let payload = Payload::new(json!({"transactions": [
            {"timestamp": "2024-01-02 10:00:00", "token": "BTC", "type": "buy", "usd_value": 10.0},
            {"timestamp": "2024-01-02 12:00:00", "token": "BTC", "type": "buy", "usd_value": 5.0},
            {"timestamp": "2024-01-03 09:00:00", "token": "ETH", "type": "sell", "usd_value": 7.0}
        ]}));
        let series = chart_series(
            &chart(Section::Blackrock, "blackrock-transactionsChart").source,
            &payload,
            &range("2024-01-01", "2024-01-31"),
        )
        .unwrap();
        let ChartSeries::Lines(lines) = series else { panic!("expected lines") };
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].label, "BTC Buys (USD)");
        assert_eq!(lines[0].points[0].1, 15.0);
        assert_eq!(lines[0].points[1].1, 0.0);
        assert_eq!(lines[1].label, "ETH Sells (USD)");
    }

    #[test]
    fn shares_normalize_to_total() {
        let payload = Payload::new(json!([
            {"symbol": "BTC/USDT", "cum_vol": 300.0, "cum_delta": 1.0},
            {"symbol": "ETH/USDT", "cum_vol": 100.0, "cum_delta": 1.0}
        ]));
        let source = &chart(Section::BinancePolar, "binance_polar-chart").source;
        let ChartSeries::Shares(slices) =
            chart_series(source, &payload, &range("2024-01-01", "2024-01-31")).unwrap()
        else {
            panic!("expected shares")
        };
        assert_eq!(slices[0].share, 75.0);
        assert_eq!(slices[0].backing, 300.0);
        assert_eq!(slices[1].share, 25.0);

        let zero = Payload::new(json!([{"symbol": "BTC/USDT", "cum_vol": 0, "cum_delta": 0}]));
        assert!(chart_series(source, &zero, &range("2024-01-01", "2024-01-31")).is_none());
    }
}
