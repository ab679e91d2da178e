//! Volume statistics.

/// Simple average of the last `period` volumes.
///
/// Uses every available value when the slice is shorter than `period`.
/// Returns 0 for an empty slice.
pub fn average_volume(volumes: &[f64], period: usize) -> f64 {
    let start = volumes.len().saturating_sub(period);
    let tail = &volumes[start..];
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().sum::<f64>() / tail.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_volume_tail() {
        let volumes = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(average_volume(&volumes, 2), 35.0);
        assert_eq!(average_volume(&volumes, 10), 25.0);
        assert_eq!(average_volume(&[], 20), 0.0);
    }
}
