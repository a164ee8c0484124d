use std::{env, fmt, str::FromStr, time::Duration};

use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "http://postgrest-service.foodchain-db.svc.cluster.local:3000";
pub const DEFAULT_JWT_SECRET: &str = "super-secret-jwt-key-conform-plan-van-aanpak";
pub const DEFAULT_TRUCK_VIN: &str = "FC-TRUCK-2026-X99";
pub const DEFAULT_TRUCK_ID: i64 = 42;
pub const DEFAULT_SENSOR_COUNT: usize = 30;
pub const DEFAULT_STARTUP_MINUTES: u64 = 10;
pub const DEFAULT_SEND_INTERVAL_SECS: u64 = 60;

pub const TEMPERATURE_TABLE: &str = "currenttemperature";

/// Process-wide settings. Built once in `main` and handed to each component.
#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub endpoint_url: String,
    pub jwt_secret: String,
    pub truck_vin: String,
    pub truck_id: i64,
    pub sensor_count: usize,
    pub startup_minutes: u64,
    pub send_interval: Duration,
    pub insecure_skip_verify: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unparsable values fall
    /// back to their default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("POSTGREST_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.into());
        let truck_vin = lookup("TRUCK_VIN").unwrap_or_else(|| DEFAULT_TRUCK_VIN.into());

        let truck_id = parse_or(&lookup, "TRUCK_ID", DEFAULT_TRUCK_ID);
        let mut sensor_count = parse_or(&lookup, "SENSOR_COUNT", DEFAULT_SENSOR_COUNT);
        if sensor_count == 0 {
            warn!(
                "SENSOR_COUNT must be positive, using default {}",
                DEFAULT_SENSOR_COUNT
            );
            sensor_count = DEFAULT_SENSOR_COUNT;
        }
        let startup_minutes = parse_or(&lookup, "TRY_MINUTES_UNTIL_PANIC", DEFAULT_STARTUP_MINUTES);
        let interval_secs = match parse_or(&lookup, "SEND_INTERVAL_SECS", DEFAULT_SEND_INTERVAL_SECS) {
            0 => {
                warn!(
                    "SEND_INTERVAL_SECS must be positive, using default {}",
                    DEFAULT_SEND_INTERVAL_SECS
                );
                DEFAULT_SEND_INTERVAL_SECS
            }
            secs => secs,
        };
        let insecure_skip_verify = parse_or(&lookup, "TLS_INSECURE_SKIP_VERIFY", false);

        let endpoint_url = endpoint_for(&base_url);

        Config {
            base_url,
            endpoint_url,
            jwt_secret,
            truck_vin,
            truck_id,
            sensor_count,
            startup_minutes,
            send_interval: Duration::from_secs(interval_secs),
            insecure_skip_verify,
        }
    }

    /// Identifier the aggregate row is stored under.
    pub fn aggregate_sensor_id(&self) -> String {
        format!("AGGR-{}", self.truck_vin)
    }

    pub fn startup_budget(&self) -> Duration {
        Duration::from_secs(self.startup_minutes.saturating_mul(60))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("endpoint_url", &self.endpoint_url)
            .field("jwt_secret", &"<redacted>")
            .field("truck_vin", &self.truck_vin)
            .field("truck_id", &self.truck_id)
            .field("sensor_count", &self.sensor_count)
            .field("startup_minutes", &self.startup_minutes)
            .field("send_interval", &self.send_interval)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .finish()
    }
}

pub fn endpoint_for(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), TEMPERATURE_TABLE)
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(e) => {
            warn!("Invalid {key} ({raw:?}), using default {default}. Error: {e}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            config.endpoint_url,
            format!("{DEFAULT_BASE_URL}/currenttemperature")
        );
        assert_eq!(config.truck_id, 42);
        assert_eq!(config.sensor_count, 30);
        assert_eq!(config.startup_minutes, 10);
        assert_eq!(config.send_interval, Duration::from_secs(60));
        assert!(!config.insecure_skip_verify);
        assert_eq!(config.aggregate_sensor_id(), "AGGR-FC-TRUCK-2026-X99");
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("POSTGREST_BASE_URL", "https://store.local:3000/"),
            ("TRUCK_VIN", "VIN-1"),
            ("TRUCK_ID", "7"),
            ("SENSOR_COUNT", "15"),
            ("TRY_MINUTES_UNTIL_PANIC", "3"),
            ("SEND_INTERVAL_SECS", "5"),
            ("TLS_INSECURE_SKIP_VERIFY", "true"),
        ]));

        assert_eq!(config.endpoint_url, "https://store.local:3000/currenttemperature");
        assert_eq!(config.aggregate_sensor_id(), "AGGR-VIN-1");
        assert_eq!(config.truck_id, 7);
        assert_eq!(config.sensor_count, 15);
        assert_eq!(config.startup_budget(), Duration::from_secs(180));
        assert_eq!(config.send_interval, Duration::from_secs(5));
        assert!(config.insecure_skip_verify);
    }

    #[test]
    fn bad_numbers_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("TRUCK_ID", "forty-two"),
            ("SENSOR_COUNT", "-3"),
            ("TRY_MINUTES_UNTIL_PANIC", ""),
            ("TLS_INSECURE_SKIP_VERIFY", "maybe"),
        ]));

        assert_eq!(config.truck_id, DEFAULT_TRUCK_ID);
        assert_eq!(config.sensor_count, DEFAULT_SENSOR_COUNT);
        assert_eq!(config.startup_minutes, DEFAULT_STARTUP_MINUTES);
        assert!(!config.insecure_skip_verify);
    }

    #[test]
    fn huge_startup_budget_saturates() {
        let config = Config::from_lookup(lookup_from(&[(
            "TRY_MINUTES_UNTIL_PANIC",
            "18446744073709551615",
        )]));
        assert_eq!(config.startup_minutes, u64::MAX);
        assert_eq!(config.startup_budget(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn zero_sensor_count_is_rejected() {
        let config = Config::from_lookup(lookup_from(&[("SENSOR_COUNT", "0")]));
        assert_eq!(config.sensor_count, DEFAULT_SENSOR_COUNT);
    }

    #[test]
    fn debug_hides_secret() {
        let config = Config::default();
        let printed = format!("{config:?}");
        assert!(!printed.contains(DEFAULT_JWT_SECRET));
        assert!(printed.contains("<redacted>"));
    }
}
