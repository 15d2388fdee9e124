use clap::{Parser, Subcommand};
use reqwest::Url;

use crate::{api::amber, prelude::*};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[clap(flatten)]
    pub amber_api: AmberApiArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser)]
pub struct AmberApiArgs {
    /// Pricing service base URL.
    #[clap(
        long = "api-base-url",
        env = "AMBER_API_BASE_URL",
        default_value = "https://api-bff.amberelectric.com.au/api/v1.0/"
    )]
    pub base_url: Url,

    /// Bearer token for the pricing service.
    #[clap(long = "auth-token", env = "AMBER_AUTH_TOKEN")]
    pub auth_token: Option<String>,
}

impl AmberApiArgs {
    pub fn try_new_api(&self) -> Result<amber::Api> {
        amber::Api::builder()
            .base_url(self.base_url.clone())
            .maybe_auth_token(self.auth_token.as_deref())
            .build()
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the price list and show the current price.
    Current,

    /// Fetch the price list and show the upcoming prices as a table.
    Forecast,

    /// Fetch the price list and dump the whole snapshot as JSON.
    Dump,
}
