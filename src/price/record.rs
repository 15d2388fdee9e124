use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use serde_with::{DisplayFromStr, serde_as, skip_serializing_none};

use crate::prelude::*;

/// Wire timestamp format: UTC with seconds precision and a literal `Z`.
pub const PERIOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// GST component embedded in the quoted prices.
const TAX_GST_OFFSET: f64 = 0.1;

/// One logical field of a price entry, resolvable under either naming scheme.
///
/// The API uses `current…` key names for the present interval and bare names
/// for forecast entries. The `current` name wins when both are present.
struct Field {
    current: &'static str,
    forecast: &'static str,
}

impl Field {
    const COLOR: Self = Self { current: "currentPriceColor", forecast: "color" };
    const PERIOD: Self = Self { current: "currentPricePeriod", forecast: "period" };
    const PRICE_KWH: Self = Self { current: "currentPriceKWH", forecast: "priceKWH" };
    const RENEWABLE: Self = Self { current: "currentRenewableInGrid", forecast: "renewableInGrid" };

    fn resolve<'p>(&self, payload: &'p Map<String, Value>) -> Option<&'p Value> {
        payload.get(self.current).or_else(|| payload.get(self.forecast))
    }
}

/// One normalized price entry. Every field is independently optional: a record
/// with nothing but the shrug is still a valid «no data» record.
#[must_use]
#[serde_as]
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct PriceRecord {
    /// Unix timestamp of [`PriceRecord::period`].
    pub ts: Option<i64>,

    #[serde(serialize_with = "serialize_period")]
    pub period: Option<DateTime<Utc>>,

    /// Tax-exclusive price in dollars per kilowatt-hour.
    #[serde(rename = "kwh")]
    pub price_per_kwh: Option<f64>,

    /// Renewable share of the grid, with the same tax division applied.
    #[serde(rename = "renewable")]
    pub renewable_fraction: Option<f64>,

    pub color: Option<String>,

    #[serde(rename = "emoji")]
    #[serde_as(as = "DisplayFromStr")]
    pub symbol: Symbol,
}

impl PriceRecord {
    /// Normalize one raw price entry.
    ///
    /// A missing key degrades to `None`. A present but invalid value (malformed
    /// period, non-numeric price) is logged and degrades to `None` as well, so
    /// building a record never fails.
    pub fn new(payload: &Map<String, Value>) -> Self {
        let price_per_kwh = Field::PRICE_KWH
            .resolve(payload)
            .map(coerce_f64)
            .transpose()
            .unwrap_or_else(|error| {
                warn!("discarded the price: {error:#}");
                None
            })
            .map(|cents| round_to(cents / 100.0 / (1.0 + TAX_GST_OFFSET), 4));
        let renewable_fraction = Field::RENEWABLE
            .resolve(payload)
            .map(coerce_f64)
            .transpose()
            .unwrap_or_else(|error| {
                warn!("discarded the renewable share: {error:#}");
                None
            })
            .map(|percent| round_to(percent / 100.0 / (1.0 + TAX_GST_OFFSET), 2));
        let period = Field::PERIOD
            .resolve(payload)
            .map(parse_period)
            .transpose()
            .unwrap_or_else(|error| {
                warn!("discarded the period: {error:#}");
                None
            });
        let color = Field::COLOR
            .resolve(payload)
            .and_then(Value::as_str)
            .map(str::to_lowercase);
        Self {
            ts: period.map(|period| period.timestamp()),
            period,
            price_per_kwh,
            renewable_fraction,
            symbol: Symbol::from_color(color.as_deref()),
            color,
        }
    }
}

impl Display for PriceRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?)
    }
}

/// Price color rendered as an emoji.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Symbol {
    #[display("🔴")]
    Red,

    #[display("🟡")]
    Yellow,

    #[display("🟢")]
    Green,

    #[display("🤷")]
    Unknown,
}

impl Symbol {
    /// Total mapping: anything but the three known colors, absence included,
    /// shrugs.
    pub fn from_color(color: Option<&str>) -> Self {
        match color {
            Some("red") => Self::Red,
            Some("yellow") => Self::Yellow,
            Some("green") => Self::Green,
            _ => Self::Unknown,
        }
    }
}

/// The API is not consistent about numbers: they arrive as JSON numbers or as
/// numeric strings, so coerce both.
fn coerce_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Number(number) => {
            number.as_f64().with_context(|| format!("`{number}` is not representable as `f64`"))
        }
        Value::String(string) => {
            string.trim().parse().with_context(|| format!("`{string}` is not a number"))
        }
        _ => bail!("expected a number, got `{value}`"),
    }
}

fn parse_period(value: &Value) -> Result<DateTime<Utc>> {
    let string = value.as_str().with_context(|| format!("expected a string, got `{value}`"))?;
    let period = NaiveDateTime::parse_from_str(string, PERIOD_FORMAT)
        .with_context(|| format!("malformed period `{string}`"))?;
    Ok(period.and_utc())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10.0_f64.powi(decimals);
    (value * factor).round() / factor
}

#[allow(clippy::ref_option)]
fn serialize_period<S: Serializer>(
    period: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match period {
        Some(period) => serializer.collect_str(&period.format(PERIOD_FORMAT)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn payload(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn current_name_takes_precedence() {
        // language=json
        let record = PriceRecord::new(&payload(r#"{"currentPriceKWH": 25.0, "priceKWH": 40.0}"#));
        assert_abs_diff_eq!(record.price_per_kwh.unwrap(), 0.2273);
    }

    #[test]
    fn forecast_name_is_the_fallback() {
        // language=json
        let record = PriceRecord::new(&payload(r#"{"priceKWH": 40.0}"#));
        assert_abs_diff_eq!(record.price_per_kwh.unwrap(), 0.3636);
    }

    #[test]
    fn missing_keys_degrade_to_none() {
        let record = PriceRecord::new(&Map::new());
        assert!(record.ts.is_none());
        assert!(record.period.is_none());
        assert!(record.price_per_kwh.is_none());
        assert!(record.renewable_fraction.is_none());
        assert!(record.color.is_none());
        assert_eq!(record.symbol, Symbol::Unknown);
    }

    #[test]
    fn price_is_converted_to_tax_exclusive_dollars() {
        // language=json
        let record = PriceRecord::new(&payload(r#"{"currentPriceKWH": 25.0}"#));
        assert_abs_diff_eq!(record.price_per_kwh.unwrap(), 0.2273);
    }

    #[test]
    fn renewable_share_gets_the_same_division() {
        // language=json
        let record = PriceRecord::new(&payload(r#"{"currentRenewableInGrid": 55.0}"#));
        assert_abs_diff_eq!(record.renewable_fraction.unwrap(), 0.5);
    }

    #[test]
    fn numeric_string_is_coerced() {
        // language=json
        let record = PriceRecord::new(&payload(r#"{"priceKWH": "40"}"#));
        assert_abs_diff_eq!(record.price_per_kwh.unwrap(), 0.3636);
    }

    #[test]
    fn non_numeric_price_is_discarded() {
        // language=json
        let record = PriceRecord::new(&payload(r#"{"currentPriceKWH": "soon"}"#));
        assert!(record.price_per_kwh.is_none());
    }

    #[test]
    fn color_is_lower_cased() {
        // language=json
        let record = PriceRecord::new(&payload(r#"{"currentPriceColor": "Green"}"#));
        assert_eq!(record.color.as_deref(), Some("green"));
        assert_eq!(record.symbol, Symbol::Green);
    }

    #[test]
    fn symbol_mapping_is_total() {
        assert_eq!(Symbol::from_color(Some("red")), Symbol::Red);
        assert_eq!(Symbol::from_color(Some("yellow")), Symbol::Yellow);
        assert_eq!(Symbol::from_color(Some("green")), Symbol::Green);
        assert_eq!(Symbol::from_color(Some("purple")), Symbol::Unknown);
        assert_eq!(Symbol::from_color(None), Symbol::Unknown);
        assert_eq!(Symbol::Red.to_string(), "🔴");
        assert_eq!(Symbol::Unknown.to_string(), "🤷");
    }

    #[test]
    fn period_is_parsed_as_utc() {
        // language=json
        let record = PriceRecord::new(&payload(r#"{"currentPricePeriod": "2024-06-01T12:00:00Z"}"#));
        assert_eq!(record.ts, Some(1_717_243_200));
        assert_eq!(record.period.unwrap().format(PERIOD_FORMAT).to_string(), "2024-06-01T12:00:00Z");
    }

    #[test]
    fn malformed_period_is_discarded() {
        // language=json
        let record = PriceRecord::new(&payload(r#"{"period": "first of June, noon"}"#));
        assert!(record.period.is_none());
        assert!(record.ts.is_none());
    }

    #[test]
    fn dump_omits_absent_fields() -> Result {
        // language=json
        let record = PriceRecord::new(&payload(r#"{"priceKWH": 40.0, "color": "red"}"#));
        let dump: Value = serde_json::from_str(&record.to_string())?;
        assert_eq!(dump, serde_json::json!({"kwh": 0.3636, "color": "red", "emoji": "🔴"}));
        Ok(())
    }
}
