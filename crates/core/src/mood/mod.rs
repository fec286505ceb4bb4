mod resolver;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub use resolver::{resolve, resolve_validated, ResolveError};

/// The closed set of moods a doorbell ring can resolve to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Angry,
    Happy,
    Sad,
    Neutral,
}

impl MoodLabel {
    pub const ALL: [MoodLabel; 4] = [
        MoodLabel::Angry,
        MoodLabel::Happy,
        MoodLabel::Sad,
        MoodLabel::Neutral,
    ];

    /// Maps a classifier category name onto a mood. Unknown names are neutral.
    pub fn from_category(category: &str) -> Self {
        match category {
            "angry" => MoodLabel::Angry,
            "happy" => MoodLabel::Happy,
            "sad" | "fearful" | "disgusted" => MoodLabel::Sad,
            _ => MoodLabel::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::Angry => "angry",
            MoodLabel::Happy => "happy",
            MoodLabel::Sad => "sad",
            MoodLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Raw per-category scores from a classifier, kept in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionScores {
    entries: Vec<(String, f32)>,
}

impl ExpressionScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Sets the score for `category`. A repeated category keeps its
    /// original position and takes the new score.
    pub fn insert<S: Into<String>>(&mut self, category: S, score: f32) {
        let category = category.into();
        match self.entries.iter_mut().find(|(name, _)| *name == category) {
            Some(entry) => entry.1 = score,
            None => self.entries.push((category, score)),
        }
    }

    pub fn with<S: Into<String>>(mut self, category: S, score: f32) -> Self {
        self.insert(category, score);
        self
    }

    pub fn get(&self, category: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, score)| *score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries
            .iter()
            .map(|(name, score)| (name.as_str(), *score))
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for ExpressionScores {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        let mut scores = ExpressionScores::new();
        for (category, score) in iter {
            scores.insert(category, score);
        }
        scores
    }
}

impl Serialize for ExpressionScores {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for ExpressionScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoresVisitor;

        impl<'de> Visitor<'de> for ScoresVisitor {
            type Value = ExpressionScores;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of expression categories to scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut scores = ExpressionScores::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((category, score)) = map.next_entry::<String, f32>()? {
                    scores.insert(category, score);
                }
                Ok(scores)
            }
        }

        deserializer.deserialize_map(ScoresVisitor)
    }
}

/// Outcome of resolving one set of expression scores.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct MoodResult {
    pub label: MoodLabel,
    pub confidence: f32,
    pub signal_present: bool,
}

impl MoodResult {
    pub fn no_signal() -> Self {
        Self {
            label: MoodLabel::Neutral,
            confidence: 0.0,
            signal_present: false,
        }
    }

    pub fn detected(label: MoodLabel, confidence: f32) -> Self {
        Self {
            label,
            confidence,
            signal_present: true,
        }
    }
}

impl Default for MoodResult {
    fn default() -> Self {
        Self::no_signal()
    }
}
