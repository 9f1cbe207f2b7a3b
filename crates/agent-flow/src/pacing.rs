//! Human-like pacing.
//!
//! Randomized delays between actions and keystrokes reduce automation
//! fingerprinting. Behavioral realism only; nothing downstream depends
//! on these durations.

use std::ops::Range;
use std::time::Duration;

use rand::Rng;

const ACTION_DELAY_MS: Range<u64> = 300..1500;
const KEYSTROKE_DELAY_MS: Range<u64> = 50..150;

#[derive(Debug, Clone)]
pub struct HumanPacing {
    action_delay_ms: Range<u64>,
    keystroke_delay_ms: Range<u64>,
}

impl Default for HumanPacing {
    fn default() -> Self {
        Self {
            action_delay_ms: ACTION_DELAY_MS,
            keystroke_delay_ms: KEYSTROKE_DELAY_MS,
        }
    }
}

impl HumanPacing {
    pub fn new(action_delay_ms: Range<u64>, keystroke_delay_ms: Range<u64>) -> Self {
        Self {
            action_delay_ms,
            keystroke_delay_ms,
        }
    }

    /// Zero delays, for tests and batch runs.
    pub fn disabled() -> Self {
        Self {
            action_delay_ms: 0..1,
            keystroke_delay_ms: 0..1,
        }
    }

    /// Pause before the next page action.
    pub async fn pause_between_actions(&self) {
        let delay = self.sample(&self.action_delay_ms);
        tokio::time::sleep(delay).await;
    }

    /// Pause covering the typing of `chars` keystrokes. The page
    /// driver types the whole string at once, so the per-keystroke
    /// jitter is accumulated into one sleep up front.
    pub async fn typing_pause(&self, chars: usize) {
        let total: u64 = (0..chars)
            .map(|_| self.sample(&self.keystroke_delay_ms).as_millis() as u64)
            .sum();
        tokio::time::sleep(Duration::from_millis(total)).await;
    }

    fn sample(&self, range: &Range<u64>) -> Duration {
        // rand handles are not Send; sample before any await.
        let ms = rand::thread_rng().gen_range(range.clone());
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_range() {
        let pacing = HumanPacing::default();
        for _ in 0..100 {
            let d = pacing.sample(&(300..1500)).as_millis() as u64;
            assert!((300..1500).contains(&d));
        }
    }

    #[tokio::test]
    async fn disabled_pacing_is_effectively_instant() {
        let pacing = HumanPacing::disabled();
        let start = std::time::Instant::now();
        pacing.pause_between_actions().await;
        pacing.typing_pause(50).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
