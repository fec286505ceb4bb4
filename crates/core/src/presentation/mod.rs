//! Presentation data for resolved moods: the reaction table, the bounded
//! history, and the repeat-ringer counter. Nothing here renders or plays.

mod history;
mod reaction;
mod rings;

pub use history::{MoodHistory, MoodHistoryEntry, MoodShare, MoodStats};
pub use reaction::{format_confidence, headline, reaction_for, Gradient, Reaction, REACTIONS};
pub use rings::{RingOutcome, RingTracker, INSULTS, INSULT_AFTER_RINGS};
