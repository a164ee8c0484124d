use std::fmt;

use serde::{Deserialize, Serialize};

pub const UNITS_CELSIUS: &str = "Celsius";

/// Physical location of a sensor inside the cargo hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Front,
    Middle,
    Back,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Front => "Front",
            Zone::Middle => "Middle",
            Zone::Back => "Back",
        };
        f.write_str(name)
    }
}

/// One simulated sensor value. Created per tick and dropped after aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub id: String,
    pub zone: Zone,
    pub value: f64,
}

/// Row written to the `currenttemperature` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePayload {
    pub sensor_id: String,
    pub temperature_avg: f64,
    pub units: String,
    pub truck_id: i64,
}

impl TemperaturePayload {
    pub fn new(sensor_id: impl Into<String>, temperature_avg: f64, truck_id: i64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            temperature_avg,
            units: UNITS_CELSIUS.into(),
            truck_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

/// Claims carried by the bearer token. Times are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}
