use std::{path::PathBuf, time::Duration};

use chrono_tz::Tz;
use clap::Args;

use crate::error::{Result, TrenoError};

pub const DEFAULT_BASE_URL: &str =
    "http://www.viaggiatreno.it/infomobilita/resteasy/viaggiatreno";

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// ViaggiaTreno REST root
    #[arg(long, env = "TRENO_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timezone used for upstream local times and for display
    #[arg(long, env = "TRENO_TZ", default_value = "Europe/Rome")]
    pub timezone: String,

    /// HTTP timeout in seconds
    #[arg(long, env = "TRENO_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,

    /// CSV station list (name,code[,region]) used to resolve station names
    #[arg(long, env = "TRENO_STATIONS")]
    pub stations: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub tz: Tz,
    pub timeout: Duration,
    pub stations: Option<PathBuf>,
}

impl TryFrom<ConfigArgs> for Config {
    type Error = TrenoError;

    fn try_from(args: ConfigArgs) -> Result<Self> {
        let tz = args
            .timezone
            .parse::<Tz>()
            .map_err(|_| TrenoError::Timezone(args.timezone.clone()))?;

        Ok(Self {
            base_url: args.base_url.trim_end_matches('/').to_owned(),
            tz,
            timeout: Duration::from_secs(args.timeout_secs),
            stations: args.stations,
        })
    }
}
