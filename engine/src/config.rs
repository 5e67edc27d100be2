use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Company timezone; attendance wall-clock times are in this zone.
    pub time_zone: Tz,
    /// JSON document read by the month-end close job.
    pub month_end_input: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let time_zone_name = env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let month_end_input = env::var("MONTH_END_INPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./month_end_input.json"));

        Ok(Config {
            time_zone,
            month_end_input,
        })
    }
}
