use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::{
    aggregate::average,
    config::Config,
    error::Result,
    simulator::simulate_zone_sensors,
    types::TemperaturePayload,
    upload::{UploadOutcome, Uploader},
};

pub struct Agent {
    config: Config,
    uploader: Uploader,
}

impl Agent {
    pub fn new(config: Config) -> Result<Self> {
        let uploader = Uploader::new(&config)?;
        Ok(Self { config, uploader })
    }

    /// Simulate, aggregate and upload once.
    ///
    /// Returns `None` when nothing was sent: an empty batch, or a payload or
    /// token that could not be built.
    pub async fn tick(&self) -> Option<UploadOutcome> {
        let readings = simulate_zone_sensors(self.config.sensor_count);
        let avg = average(&readings);
        if avg.is_nan() {
            warn!("No sensor readings this tick, skipping upload");
            return None;
        }
        debug!("{} readings, average {:.3}°C", readings.len(), avg);

        let payload =
            TemperaturePayload::new(self.config.aggregate_sensor_id(), avg, self.config.truck_id);

        match self.uploader.send(&payload, readings.len()).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Upload abandoned: {}", e);
                None
            }
        }
    }

    /// Sends immediately, then once per interval. Never returns.
    pub async fn run(&self) {
        info!(
            "Sending to {} every {}s",
            self.uploader.endpoint_url(),
            self.config.send_interval.as_secs()
        );

        let mut ticker = time::interval(self.config.send_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}
