use crate::types::Reading;

/// Arithmetic mean of all reading values.
///
/// An empty batch yields `NaN` (0/0); callers skip the tick in that case.
pub fn average(readings: &[Reading]) -> f64 {
    let total: f64 = readings.iter().map(|r| r.value).sum();
    total / readings.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Zone;

    fn readings(values: &[f64]) -> Vec<Reading> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Reading {
                id: format!("S-{:03}", i + 1),
                zone: Zone::Front,
                value,
            })
            .collect()
    }

    #[test]
    fn mean_of_values() {
        assert_eq!(average(&readings(&[10.0, 20.0, 30.0])), 20.0);
        assert_eq!(average(&readings(&[-10.0, -20.0])), -15.0);
        assert_eq!(average(&readings(&[-18.5])), -18.5);
    }

    #[test]
    fn empty_is_nan() {
        assert!(average(&[]).is_nan());
    }
}
