use crate::config::HistoryCapacity;
use crate::mood::MoodLabel;
use crate::util::RingBuffer;
use serde::Serialize;
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct MoodHistoryEntry {
    pub label: MoodLabel,
    pub observed_at: SystemTime,
}

/// Recent moods, newest first, capped at a fixed length.
#[derive(Clone, Debug)]
pub struct MoodHistory {
    entries: RingBuffer<MoodHistoryEntry>,
}

impl MoodHistory {
    pub fn new(capacity: HistoryCapacity) -> Self {
        Self {
            entries: RingBuffer::new(capacity.get()),
        }
    }

    pub fn record(&mut self, label: MoodLabel, observed_at: SystemTime) {
        self.entries.push(MoodHistoryEntry { label, observed_at });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&MoodHistoryEntry> {
        self.entries.newest()
    }

    pub fn entries(&self) -> Vec<MoodHistoryEntry> {
        self.entries.iter_newest_first().copied().collect()
    }

    pub fn stats(&self) -> MoodStats {
        let total = self.entries.len();
        let shares = MoodLabel::ALL
            .iter()
            .map(|&label| {
                let count = self.entries.iter().filter(|e| e.label == label).count();
                let share = if total == 0 {
                    0.0
                } else {
                    count as f32 / total as f32
                };
                MoodShare { label, count, share }
            })
            .collect();
        MoodStats { total, shares }
    }
}

impl Default for MoodHistory {
    fn default() -> Self {
        Self::new(HistoryCapacity::default())
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct MoodShare {
    pub label: MoodLabel,
    pub count: usize,
    pub share: f32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MoodStats {
    pub total: usize,
    pub shares: Vec<MoodShare>,
}

impl MoodStats {
    pub fn count(&self, label: MoodLabel) -> usize {
        self.shares
            .iter()
            .find(|s| s.label == label)
            .map_or(0, |s| s.count)
    }

    pub fn share(&self, label: MoodLabel) -> f32 {
        self.shares
            .iter()
            .find(|s| s.label == label)
            .map_or(0.0, |s| s.share)
    }
}
