use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    api::protocol::PriceProtocol,
    prelude::*,
    price::{forecast::ForecastPrices, record::PriceRecord},
};

const PRICE_LIST_PATH: &str = "Price/GetPriceList";

/// Snapshot of the price list: the current price and the forecast, refreshed
/// together by [`PriceSnapshot::update`].
pub struct PriceSnapshot<P> {
    protocol: P,
    state: Option<State>,
}

/// Both fields always come from the same response, so they live and get
/// replaced together.
#[derive(Serialize)]
struct State {
    current: PriceRecord,
    forecast: ForecastPrices,
}

/// Result of one [`PriceSnapshot::update`] round-trip.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UpdateOutcome {
    /// The current price and the forecast were both replaced.
    Updated,

    /// The service returned nothing usable; the previous state is kept.
    NoData,
}

impl<P> PriceSnapshot<P> {
    pub const fn new(protocol: P) -> Self {
        Self { protocol, state: None }
    }

    /// Current price record, or `None` until the first successful update.
    #[must_use]
    pub fn current(&self) -> Option<&PriceRecord> {
        self.state.as_ref().map(|state| &state.current)
    }

    /// Forecast prices, or `None` until the first successful update.
    #[must_use]
    pub fn forecast(&self) -> Option<&ForecastPrices> {
        self.state.as_ref().map(|state| &state.forecast)
    }
}

impl<P: PriceProtocol> PriceSnapshot<P> {
    /// Fetch a fresh price list and replace the held state.
    ///
    /// On [`UpdateOutcome::NoData`] the previously held state is left
    /// untouched.
    #[instrument(skip_all)]
    pub async fn update(&mut self) -> Result<UpdateOutcome> {
        // The service expects the Angular HTTP client's headers structure
        // as the request body and ignores its contents.
        let body = json!({"headers": {"normalizedNames": {}, "lazyUpdate": null, "headers": {}}});
        let Some(response) = self.protocol.api_post(PRICE_LIST_PATH, &body).await? else {
            warn!("no response from the price service");
            return Ok(UpdateOutcome::NoData);
        };
        let Some(data) = response.get("data").and_then(Value::as_object) else {
            warn!("the response carries no usable `data` mapping");
            return Ok(UpdateOutcome::NoData);
        };
        let state =
            State { current: PriceRecord::new(data), forecast: ForecastPrices::new(data) };
        info!(n_forecast_prices = state.forecast.len(), "updated");
        self.state = Some(state);
        Ok(UpdateOutcome::Updated)
    }
}

impl<P> Display for PriceSnapshot<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&serde_json::to_string_pretty(&self.state).map_err(|_| fmt::Error)?)
    }
}
