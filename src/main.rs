#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod prelude;
mod price;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
    price::{PriceSnapshot, UpdateOutcome},
    tables::build_forecast_table,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let mut snapshot = PriceSnapshot::new(args.amber_api.try_new_api()?);
    if snapshot.update().await? == UpdateOutcome::NoData {
        bail!("the price service returned no data");
    }

    match args.command {
        Command::Current => {
            let current = snapshot.current().context("there is no current price")?;
            info!(
                kwh = ?current.price_per_kwh,
                renewable = ?current.renewable_fraction,
                symbol = %current.symbol,
                "gotcha",
            );
            println!("{current}");
        }
        Command::Forecast => {
            let forecast = snapshot.forecast().context("there is no forecast")?;
            info!(n_prices = forecast.len(), "gotcha");
            println!("{}", build_forecast_table(forecast));
        }
        Command::Dump => {
            println!("{snapshot}");
        }
    }

    info!("done!");
    Ok(())
}
