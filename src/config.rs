use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::models::vehicle::VehicleClass;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub command_queue_size: usize,
    pub event_buffer_size: usize,
    pub matching_delay: Duration,
    pub provider_timeout: Duration,
    pub fares: FareConfig,
    pub synthetic_distance_km: (f64, f64),
    pub driver_eta_minutes: (u32, u32),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            command_queue_size: 64,
            event_buffer_size: 1024,
            matching_delay: Duration::from_millis(2500),
            provider_timeout: Duration::from_millis(5000),
            fares: FareConfig::default(),
            synthetic_distance_km: (1.0, 25.0),
            driver_eta_minutes: (3, 7),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let defaults = Config::default();
        let base = defaults.fares.base_rates;
        let multipliers = defaults.fares.multipliers;
        let fares = FareConfig {
            per_km_rate: parse_or_default("FARE_PER_KM", defaults.fares.per_km_rate)?,
            base_rates: ClassTable {
                standard: parse_or_default("FARE_BASE_STANDARD", base.standard)?,
                suv: parse_or_default("FARE_BASE_SUV", base.suv)?,
                premium: parse_or_default("FARE_BASE_PREMIUM", base.premium)?,
            },
            multipliers: ClassTable {
                standard: parse_or_default("FARE_MULTIPLIER_STANDARD", multipliers.standard)?,
                suv: parse_or_default("FARE_MULTIPLIER_SUV", multipliers.suv)?,
                premium: parse_or_default("FARE_MULTIPLIER_PREMIUM", multipliers.premium)?,
            },
        };

        let (min_km, max_km) = defaults.synthetic_distance_km;
        let config = Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            command_queue_size: parse_or_default(
                "COMMAND_QUEUE_SIZE",
                defaults.command_queue_size,
            )?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
            matching_delay: parse_millis_or("MATCHING_DELAY_MS", defaults.matching_delay)?,
            provider_timeout: parse_millis_or("PROVIDER_TIMEOUT_MS", defaults.provider_timeout)?,
            fares,
            synthetic_distance_km: (
                parse_or_default("SYNTHETIC_DISTANCE_MIN_KM", min_km)?,
                parse_or_default("SYNTHETIC_DISTANCE_MAX_KM", max_km)?,
            ),
            driver_eta_minutes: (
                parse_or_default("DRIVER_ETA_MIN", defaults.driver_eta_minutes.0)?,
                parse_or_default("DRIVER_ETA_MAX", defaults.driver_eta_minutes.1)?,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.fares.validate()?;

        if self.command_queue_size == 0 || self.event_buffer_size == 0 {
            return Err(AppError::Config(
                "queue and buffer sizes must be > 0".to_string(),
            ));
        }

        let (min_km, max_km) = self.synthetic_distance_km;
        if !(min_km.is_finite() && max_km.is_finite() && min_km > 0.0 && min_km <= max_km) {
            return Err(AppError::Config(format!(
                "synthetic distance range {min_km}..{max_km} must be positive and ordered"
            )));
        }

        let (min_eta, max_eta) = self.driver_eta_minutes;
        if min_eta == 0 || min_eta > max_eta {
            return Err(AppError::Config(format!(
                "driver eta range {min_eta}..{max_eta} must be positive and ordered"
            )));
        }

        Ok(())
    }
}

/// One value per vehicle class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassTable<T> {
    pub standard: T,
    pub suv: T,
    pub premium: T,
}

impl<T: Copy> ClassTable<T> {
    pub fn get(&self, class: VehicleClass) -> T {
        match class {
            VehicleClass::Standard => self.standard,
            VehicleClass::Suv => self.suv,
            VehicleClass::Premium => self.premium,
        }
    }
}

/// Pricing tables. Rates are in currency minor units.
#[derive(Debug, Clone, PartialEq)]
pub struct FareConfig {
    pub base_rates: ClassTable<u64>,
    pub multipliers: ClassTable<f64>,
    pub per_km_rate: u64,
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            base_rates: ClassTable {
                standard: 1000,
                suv: 1500,
                premium: 2000,
            },
            multipliers: ClassTable {
                standard: 1.0,
                suv: 1.5,
                premium: 2.0,
            },
            per_km_rate: 200,
        }
    }
}

impl FareConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        for class in VehicleClass::ALL {
            let multiplier = self.multipliers.get(class);
            if !multiplier.is_finite() || multiplier <= 0.0 {
                return Err(AppError::Config(format!(
                    "multiplier for {class} must be a positive number, got {multiplier}"
                )));
            }
        }
        Ok(())
    }
}

fn parse_millis_or(key: &str, default: Duration) -> Result<Duration, AppError> {
    let millis: u64 = parse_or_default(key, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Config(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
