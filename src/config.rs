use std::time::Duration;

/// Scheduling configuration for a [`Soundscape`](crate::Soundscape).
///
/// The trigger timer re-arms after every fired event with a random interval
/// drawn uniformly from `tick_interval * [1 - interval_jitter, 1 + interval_jitter]`.
/// With `interval_jitter` of 0 the scheduler fires on a fixed period.
#[derive(Debug, Clone)]
pub struct SoundscapeDesc {
    /// Mean time between triggered sounds.
    pub tick_interval: Duration,
    /// Fractional spread around `tick_interval`, clamped to `[0, 1]` when used.
    pub interval_jitter: f32,
}

impl Default for SoundscapeDesc {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(300),
            interval_jitter: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_desc_has_positive_interval() {
        let desc = SoundscapeDesc::default();
        assert!(desc.tick_interval > Duration::ZERO);
        assert!(desc.interval_jitter >= 0.0 && desc.interval_jitter <= 1.0);
    }
}
