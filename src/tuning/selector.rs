use hal::clock::Millis;
use hal::receiver::PulseWidth;

const HIGH: PulseWidth = 1700;
const LOW: PulseWidth = 1300;
/// Shorter presses are treated as glitches
const DEBOUNCE_MS: u32 = 200;
/// Releasing before this advances to the next parameter
const NEXT_PARAMETER_MS: u32 = 2000;
/// Releasing before this re-centers, holding past it commits
const COMMIT_MS: u32 = 5000;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Gesture {
    NextParameter,
    ReCenter,
    Commit,
}

/// Two position switch with a hysteresis band between the thresholds
#[derive(Copy, Clone, Debug, Default)]
pub struct Selector {
    high_since: Option<u32>,
    committed: bool,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// `pending` tells whether there are uncommitted changes a long hold would save
    pub fn update(&mut self, pulse: PulseWidth, now: Millis, pending: bool) -> Option<Gesture> {
        let now = now.ticks();
        if pulse >= HIGH {
            let since = *self.high_since.get_or_insert(now);
            if pending && !self.committed && now.wrapping_sub(since) > COMMIT_MS {
                self.committed = true;
                return Some(Gesture::Commit);
            }
            return None;
        }
        if pulse > LOW {
            return None;
        }
        let since = self.high_since.take()?;
        if core::mem::take(&mut self.committed) {
            return None;
        }
        let held = now.wrapping_sub(since);
        if held < DEBOUNCE_MS {
            None
        } else if held < NEXT_PARAMETER_MS {
            Some(Gesture::NextParameter)
        } else if held <= COMMIT_MS {
            Some(Gesture::ReCenter)
        } else {
            None
        }
    }
}

/// Position of a three position switch, split in thirds of the 1000-2000 µs range
pub fn third(pulse: PulseWidth) -> usize {
    match pulse {
        0..=1333 => 0,
        1334..=1666 => 1,
        _ => 2,
    }
}

mod test {
    #[test]
    fn test_gestures() {
        use hal::clock::Millis;

        use super::{Gesture, Selector};

        let mut selector = Selector::new();
        let ms = Millis::millis;
        assert_eq!(selector.update(1000, ms(0), false), None);
        assert_eq!(selector.update(1900, ms(100), false), None);
        // hysteresis band keeps the switch high
        assert_eq!(selector.update(1500, ms(600), false), None);
        assert_eq!(selector.update(1100, ms(700), false), Some(Gesture::NextParameter));
        assert_eq!(selector.update(1100, ms(800), false), None);

        selector.update(1900, ms(1000), false);
        assert_eq!(selector.update(1100, ms(4000), false), Some(Gesture::ReCenter));

        selector.update(1900, ms(5000), false);
        assert_eq!(selector.update(1100, ms(11000), false), None);
    }

    #[test]
    fn test_commit_on_hold() {
        use hal::clock::Millis;

        use super::{Gesture, Selector};

        let mut selector = Selector::new();
        let ms = Millis::millis;
        selector.update(1900, ms(0), true);
        assert_eq!(selector.update(1900, ms(5000), true), None);
        assert_eq!(selector.update(1900, ms(5100), true), Some(Gesture::Commit));
        assert_eq!(selector.update(1900, ms(9000), true), None);
        // releasing after a commit is not a gesture
        assert_eq!(selector.update(1100, ms(9100), false), None);
        assert_eq!(selector.update(1900, ms(9200), false), None);
        assert_eq!(selector.update(1100, ms(9500), false), Some(Gesture::NextParameter));
    }

    #[test]
    fn test_short_spike_ignored() {
        use hal::clock::Millis;

        use super::{Gesture, Selector};

        let mut selector = Selector::new();
        let ms = Millis::millis;
        assert_eq!(selector.update(1000, ms(0), false), None);
        assert_eq!(selector.update(1750, ms(100), false), None);
        assert_eq!(selector.update(1000, ms(120), false), None);
        assert_eq!(selector.update(1000, ms(200), false), None);

        // the spike leaves no state behind
        assert_eq!(selector.update(1750, ms(300), false), None);
        assert_eq!(selector.update(1750, ms(400), false), None);
        assert_eq!(selector.update(1000, ms(500), false), Some(Gesture::NextParameter));
    }

    #[test]
    fn test_third() {
        use super::third;

        assert_eq!(third(982), 0);
        assert_eq!(third(1500), 1);
        assert_eq!(third(2006), 2);
    }
}
