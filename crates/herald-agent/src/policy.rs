// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Humanized delivery timing.
//!
//! A reply waits through three stages: the response delay (the account's
//! base delay times a jitter factor, plus any cooldown penalty), the typing
//! indicator (proportional to the reply length), and a fixed send pacing.

use std::time::Duration;

use herald_config::ResponderConfig;
use rand::Rng;

/// Timing constants for the delivery pipeline, built from
/// [`ResponderConfig`].
#[derive(Debug, Clone)]
pub struct DelayPolicy {
    pub poll_interval: Duration,
    pub delay_jitter: (f64, f64),
    pub cooldown_window: Duration,
    pub cooldown_penalty_secs: (f64, f64),
    pub typing_chars_per_sec: f64,
    pub typing_max_secs: f64,
    pub typing_jitter: (f64, f64),
    pub send_pacing: Duration,
    pub error_backoff: Duration,
    pub activation_spread: (f64, f64),
    pub activation_stagger: Duration,
}

impl DelayPolicy {
    pub fn from_config(config: &ResponderConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            delay_jitter: (config.delay_jitter_min, config.delay_jitter_max),
            cooldown_window: secs(config.cooldown_window_secs),
            cooldown_penalty_secs: (
                config.cooldown_penalty_min_secs,
                config.cooldown_penalty_max_secs,
            ),
            typing_chars_per_sec: config.typing_chars_per_sec,
            typing_max_secs: config.typing_max_secs,
            typing_jitter: (config.typing_jitter_min, config.typing_jitter_max),
            send_pacing: config.send_pacing(),
            error_backoff: config.error_backoff(),
            activation_spread: (config.activation_spread_min, config.activation_spread_max),
            activation_stagger: config.activation_stagger(),
        }
    }

    /// Extra delay for a reply that follows the previous one too closely.
    pub fn cooldown_penalty<R: Rng + ?Sized>(&self, since_last: Duration, rng: &mut R) -> Duration {
        if since_last < self.cooldown_window {
            secs(uniform(rng, self.cooldown_penalty_secs))
        } else {
            Duration::ZERO
        }
    }

    /// `base * uniform(jitter) + extra`.
    pub fn response_delay<R: Rng + ?Sized>(
        &self,
        base: Duration,
        extra: Duration,
        rng: &mut R,
    ) -> Duration {
        secs(base.as_secs_f64() * uniform(rng, self.delay_jitter)).saturating_add(extra)
    }

    /// `min(chars / rate, max) * uniform(typing_jitter)`.
    pub fn typing_duration<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Duration {
        let chars = text.chars().count() as f64;
        let raw = if self.typing_chars_per_sec > 0.0 {
            (chars / self.typing_chars_per_sec).min(self.typing_max_secs)
        } else {
            self.typing_max_secs
        };
        secs(raw * uniform(rng, self.typing_jitter))
    }

    /// Per-account base delay when `total` is shared by `count` accounts.
    pub fn spread_base_delay<R: Rng + ?Sized>(
        &self,
        total: Duration,
        count: usize,
        rng: &mut R,
    ) -> Duration {
        if count == 0 {
            return Duration::ZERO;
        }
        secs(total.as_secs_f64() / count as f64 * uniform(rng, self.activation_spread))
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::from_config(&ResponderConfig::default())
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    if max > min { rng.gen_range(min..=max) } else { min }
}

/// Non-positive and NaN values become zero; anything past `Duration::MAX` saturates.
fn secs(value: f64) -> Duration {
    if value > 0.0 {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn no_penalty_outside_cooldown_window() {
        let policy = DelayPolicy::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            policy.cooldown_penalty(Duration::from_secs(30), &mut rng),
            Duration::ZERO
        );
        assert_eq!(
            policy.cooldown_penalty(Duration::from_secs(600), &mut rng),
            Duration::ZERO
        );
    }

    #[test]
    fn penalty_inside_cooldown_window_is_in_range() {
        let policy = DelayPolicy::default();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let p = policy.cooldown_penalty(Duration::from_secs(5), &mut rng);
            assert!(p >= Duration::from_secs(10) && p <= Duration::from_secs(40), "{p:?}");
        }
    }

    #[test]
    fn one_second_base_delay_stays_within_jitter() {
        let policy = DelayPolicy::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let d = policy.response_delay(Duration::from_secs(1), Duration::ZERO, &mut rng);
            assert!(
                d >= Duration::from_millis(500) && d <= Duration::from_millis(1500),
                "{d:?}"
            );
        }
    }

    #[test]
    fn extra_delay_is_added() {
        let policy = DelayPolicy::default();
        let mut rng = StdRng::seed_from_u64(4);
        let d = policy.response_delay(Duration::ZERO, Duration::from_secs(12), &mut rng);
        assert_eq!(d, Duration::from_secs(12));
    }

    #[test]
    fn typing_scales_with_length_and_caps() {
        let policy = DelayPolicy::default();
        let mut rng = StdRng::seed_from_u64(5);
        // 20 chars at 5/s = 4s, jittered by 0.8..=1.2.
        let short = policy.typing_duration(&"x".repeat(20), &mut rng);
        assert!(short >= Duration::from_secs_f64(3.2) && short <= Duration::from_secs_f64(4.8));
        // Capped at 10s before jitter.
        let long = policy.typing_duration(&"x".repeat(500), &mut rng);
        assert!(long >= Duration::from_secs(8) && long <= Duration::from_secs(12));
    }

    #[test]
    fn typing_counts_characters_not_bytes() {
        let mut policy = DelayPolicy::default();
        policy.typing_jitter = (1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(
            policy.typing_duration("héllo", &mut rng),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn spread_divides_total_window() {
        let policy = DelayPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);
        let d = policy.spread_base_delay(Duration::from_secs(600), 10, &mut rng);
        assert!(d >= Duration::from_secs(48) && d <= Duration::from_secs(72), "{d:?}");
        assert_eq!(
            policy.spread_base_delay(Duration::from_secs(600), 0, &mut rng),
            Duration::ZERO
        );
    }

    #[test]
    fn huge_window_saturates_instead_of_panicking() {
        let mut policy = DelayPolicy::default();
        policy.activation_spread = (1.5, 1.5);
        let mut rng = StdRng::seed_from_u64(8);
        assert_eq!(policy.spread_base_delay(Duration::MAX, 1, &mut rng), Duration::MAX);
        assert_eq!(
            policy.response_delay(Duration::MAX, Duration::MAX, &mut rng),
            Duration::MAX
        );
        assert_eq!(secs(f64::INFINITY), Duration::MAX);
        assert_eq!(secs(f64::NAN), Duration::ZERO);
    }
}
