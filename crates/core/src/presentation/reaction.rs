use crate::mood::MoodLabel;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Gradient {
    pub from: &'static str,
    pub to: &'static str,
}

/// Everything the front end needs to react to one mood.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Reaction {
    pub label: MoodLabel,
    pub emoji: &'static str,
    pub sound_name: &'static str,
    pub sound_asset: &'static str,
    pub gradient: Gradient,
    pub caption: &'static str,
}

pub static REACTIONS: [Reaction; 4] = [
    Reaction {
        label: MoodLabel::Angry,
        emoji: "😠",
        sound_name: "Heavy Metal",
        sound_asset: "/angry-metal.mp3",
        gradient: Gradient {
            from: "#f87171",
            to: "#fb923c",
        },
        caption: "Someone's grumpy! Let's rock out.",
    },
    Reaction {
        label: MoodLabel::Happy,
        emoji: "😊",
        sound_name: "Kazoo 'Happy Birthday'",
        sound_asset: "/happy-kazoo.mp3",
        gradient: Gradient {
            from: "#facc15",
            to: "#fbbf24",
        },
        caption: "Wow, someone's cheerful! Kazoo time!",
    },
    Reaction {
        label: MoodLabel::Sad,
        emoji: "😢",
        sound_name: "Sad Trombone",
        sound_asset: "/sad-trombone.mp3",
        gradient: Gradient {
            from: "#60a5fa",
            to: "#818cf8",
        },
        caption: "Aww, cheer up! Here's a sad trombone.",
    },
    Reaction {
        label: MoodLabel::Neutral,
        emoji: "😐",
        sound_name: "Standard Doorbell",
        sound_asset: "/doorbell-ring.mp3",
        gradient: Gradient {
            from: "#94a3b8",
            to: "#9ca3af",
        },
        caption: "Ring the doorbell to detect a mood!",
    },
];

pub fn reaction_for(label: MoodLabel) -> &'static Reaction {
    match label {
        MoodLabel::Angry => &REACTIONS[0],
        MoodLabel::Happy => &REACTIONS[1],
        MoodLabel::Sad => &REACTIONS[2],
        MoodLabel::Neutral => &REACTIONS[3],
    }
}

pub fn headline(label: MoodLabel) -> &'static str {
    match label {
        MoodLabel::Angry => "Mood: Angry",
        MoodLabel::Happy => "Mood: Happy",
        MoodLabel::Sad => "Mood: Sad",
        MoodLabel::Neutral => "No Mood Detected",
    }
}

/// `0.876` becomes `"88%"`.
pub fn format_confidence(confidence: f32) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}
