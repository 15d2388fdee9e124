mod forecast;
mod record;
mod snapshot;

pub use self::{
    forecast::ForecastPrices,
    record::{PriceRecord, Symbol},
    snapshot::{PriceSnapshot, UpdateOutcome},
};
