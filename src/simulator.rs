//! Synthetic readings for the refrigerated cargo hold.
//!
//! Sensors are numbered from 1. The first ten sit in the front of the hold,
//! the next ten in the middle and every sensor after that in the back. Each
//! zone has its own base temperature and a uniform spread on top of it.

use rand::Rng;

use crate::types::{Reading, Zone};

pub const FRONT_SENSORS: usize = 10;
pub const MIDDLE_SENSORS: usize = 10;

/// Base temperature and spread (°C) of a zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub base: f64,
    pub spread: f64,
}

impl Band {
    /// Half-open range `[base, base + spread)` a reading falls in.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.base && value < self.base + self.spread
    }
}

impl Zone {
    pub fn for_position(position: usize) -> Zone {
        if position <= FRONT_SENSORS {
            Zone::Front
        } else if position <= FRONT_SENSORS + MIDDLE_SENSORS {
            Zone::Middle
        } else {
            Zone::Back
        }
    }

    pub fn band(self) -> Band {
        match self {
            Zone::Front => Band { base: -18.5, spread: 0.5 },
            Zone::Middle => Band { base: -18.0, spread: 0.4 },
            Zone::Back => Band { base: -17.8, spread: 0.8 },
        }
    }
}

pub fn sensor_id(position: usize) -> String {
    format!("S-{position:03}")
}

pub fn simulate_zone_sensors(count: usize) -> Vec<Reading> {
    simulate_with_rng(count, &mut rand::thread_rng())
}

pub fn simulate_with_rng<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Reading> {
    (1..=count)
        .map(|position| {
            let zone = Zone::for_position(position);
            let band = zone.band();
            Reading {
                id: sensor_id(position),
                zone,
                value: band.base + rng.gen::<f64>() * band.spread,
            }
        })
        .collect()
}
