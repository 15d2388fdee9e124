use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{prelude::*, price::record::PriceRecord};

/// Key carrying the forecast entries inside a price payload.
const FORECAST_PRICES_KEY: &str = "forecastPrices";

/// Upcoming price records, deduplicated and keyed by their Unix timestamp.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct ForecastPrices(BTreeMap<i64, PriceRecord>);

impl ForecastPrices {
    /// Collect the forecast entries of a price payload.
    ///
    /// An entry without a resolvable period carries no information and is
    /// dropped. When two entries share a timestamp, the later one wins.
    pub fn new(payload: &Map<String, Value>) -> Self {
        let mut prices = BTreeMap::new();
        if let Some(entries) = payload.get(FORECAST_PRICES_KEY) {
            let Some(entries) = entries.as_array() else {
                warn!("`{FORECAST_PRICES_KEY}` is not an array, ignoring it");
                return Self(prices);
            };
            for entry in entries {
                let Some(entry) = entry.as_object() else {
                    warn!("discarded a non-mapping forecast entry");
                    continue;
                };
                let record = PriceRecord::new(entry);
                if let Some(ts) = record.ts {
                    prices.insert(ts, record);
                }
            }
        }
        Self(prices)
    }

    /// Records in ascending timestamp order.
    pub fn list(&self) -> impl Iterator<Item = &PriceRecord> {
        self.0.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ForecastPrices {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.values())
    }
}

impl Display for ForecastPrices {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?)
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
    fn missing_key_means_empty() {
        let forecast = ForecastPrices::new(&Map::new());
        assert!(forecast.is_empty());
        assert_eq!(forecast.list().count(), 0);
    }

    #[test]
    fn later_entry_wins_on_colliding_timestamp() {
        // language=json
        let forecast = ForecastPrices::new(&payload(
            r#"{
                "forecastPrices": [
                    {"priceKWH": 25.0, "period": "2024-01-01T00:00:00Z"},
                    {"priceKWH": 40.0, "period": "2024-01-01T00:00:00Z"}
                ]
            }"#,
        ));
        assert_eq!(forecast.len(), 1);
        assert_abs_diff_eq!(forecast.list().next().unwrap().price_per_kwh.unwrap(), 0.3636);
    }

    #[test]
    fn records_come_out_in_ascending_order() {
        // language=json
        let forecast = ForecastPrices::new(&payload(
            r#"{
                "forecastPrices": [
                    {"period": "2024-01-01T01:00:00Z"},
                    {"period": "2024-01-01T00:00:00Z"}
                ]
            }"#,
        ));
        let timestamps: Vec<i64> = forecast.list().map(|record| record.ts.unwrap()).collect();
        assert_eq!(timestamps, vec![1_704_067_200, 1_704_070_800]);
    }

    #[test]
    fn entries_without_a_resolvable_period_are_dropped() {
        // language=json
        let forecast = ForecastPrices::new(&payload(
            r#"{
                "forecastPrices": [
                    {"priceKWH": 25.0},
                    {"priceKWH": 30.0, "period": "tomorrow-ish"},
                    {"priceKWH": 40.0, "period": "2024-01-01T00:00:00Z"}
                ]
            }"#,
        ));
        assert_eq!(forecast.len(), 1);
    }
}
