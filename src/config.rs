use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::entities::FareConfig;
use crate::error::{config_error, Error};

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub fares: FareConfig,
    pub simulation: SimulationConfig,
}

/// Fixed delays standing in for backend round trips.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub otp_delay: Duration,
    pub otp_ttl: Duration,
    pub payment_delay: Duration,
    pub matching_delay: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            otp_delay: Duration::from_millis(2000),
            otp_ttl: Duration::from_secs(300),
            payment_delay: Duration::from_millis(3000),
            matching_delay: Duration::from_millis(4000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            fares: FareConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Config {
    /// Reads `RICKSHAW_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Self::from_vars(|name| env::var(name))
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let defaults = Config::default();
        let fares = defaults.fares;
        let simulation = defaults.simulation;

        Ok(Self {
            addr: var_or(&lookup, "RICKSHAW_ADDR", defaults.addr)?,
            fares: FareConfig {
                distance_km: var_or(&lookup, "RICKSHAW_FARE_DISTANCE_KM", fares.distance_km)?,
                duration_minutes: var_or(
                    &lookup,
                    "RICKSHAW_FARE_DURATION_MINUTES",
                    fares.duration_minutes,
                )?,
                rate_per_km: var_or(&lookup, "RICKSHAW_FARE_RATE_PER_KM", fares.rate_per_km)?,
                rate_per_minute: var_or(
                    &lookup,
                    "RICKSHAW_FARE_RATE_PER_MINUTE",
                    fares.rate_per_minute,
                )?,
                surge: var_or(&lookup, "RICKSHAW_FARE_SURGE", fares.surge)?,
                tax_rate: var_or(&lookup, "RICKSHAW_FARE_TAX_RATE", fares.tax_rate)?,
                advance_rate: var_or(&lookup, "RICKSHAW_FARE_ADVANCE_RATE", fares.advance_rate)?,
            },
            simulation: SimulationConfig {
                otp_delay: millis_or(&lookup, "RICKSHAW_OTP_DELAY_MS", simulation.otp_delay)?,
                otp_ttl: millis_or(&lookup, "RICKSHAW_OTP_TTL_MS", simulation.otp_ttl)?,
                payment_delay: millis_or(
                    &lookup,
                    "RICKSHAW_PAYMENT_DELAY_MS",
                    simulation.payment_delay,
                )?,
                matching_delay: millis_or(
                    &lookup,
                    "RICKSHAW_MATCHING_DELAY_MS",
                    simulation.matching_delay,
                )?,
            },
        })
    }
}

fn var_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: FromStr,
{
    match lookup(name) {
        Ok(value) => value.trim().parse().map_err(|_| config_error(name)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err.into()),
    }
}

fn millis_or<F>(lookup: &F, name: &str, default: Duration) -> Result<Duration, Error>
where
    F: Fn(&str) -> Result<String, env::VarError>,
{
    let millis = var_or(lookup, name, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}
