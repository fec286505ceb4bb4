use rand::seq::IndexedRandom;
use rand::Rng;
use std::time::{Duration, Instant};

/// Rings already counted before one that earns an insult.
pub const INSULT_AFTER_RINGS: u32 = 2;

pub const INSULTS: [&str; 5] = [
    "Stop ringing, you maniac!",
    "Are you training for the Doorbell Olympics?",
    "The doorbell needs a break from you!",
    "We get it, you like pressing buttons!",
    "Please stop. The doorbell is tired.",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingOutcome {
    pub count: u32,
    pub insult: Option<&'static str>,
}

/// Counts rings within a cooldown window and heckles repeat ringers.
#[derive(Clone, Debug)]
pub struct RingTracker {
    cooldown: Duration,
    count: u32,
    last_ring: Option<Instant>,
}

impl RingTracker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            count: 0,
            last_ring: None,
        }
    }

    /// Count as seen at `now`, after any cooldown reset.
    pub fn count_at(&self, now: Instant) -> u32 {
        match self.last_ring {
            Some(last) if now.saturating_duration_since(last) < self.cooldown => self.count,
            _ => 0,
        }
    }

    pub fn ring<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> RingOutcome {
        let previous = self.count_at(now);
        self.count = previous.saturating_add(1);
        self.last_ring = Some(now);

        let insult = if previous >= INSULT_AFTER_RINGS {
            INSULTS.choose(rng).copied()
        } else {
            None
        };

        RingOutcome {
            count: self.count,
            insult,
        }
    }
}
