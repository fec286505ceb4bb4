mod file;
mod memory;

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use file::FileCapture;
pub use memory::MemoryCapture;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Image,
    Audio,
}

impl PayloadKind {
    /// Path of the classifier endpoint that accepts this kind of payload.
    pub fn endpoint(&self) -> &'static str {
        match self {
            PayloadKind::Image => "detect-mood",
            PayloadKind::Audio => "detect-voice-mood",
        }
    }

    pub fn default_file_name(&self) -> &'static str {
        match self {
            PayloadKind::Image => "capture.jpg",
            PayloadKind::Audio => "recording.wav",
        }
    }
}

/// Guesses payload kind and media type from a file extension.
pub fn media_type_for_extension(extension: &str) -> Option<(PayloadKind, &'static str)> {
    let media = match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => (PayloadKind::Image, "image/jpeg"),
        "png" => (PayloadKind::Image, "image/png"),
        "webp" => (PayloadKind::Image, "image/webp"),
        "wav" => (PayloadKind::Audio, "audio/wav"),
        "webm" => (PayloadKind::Audio, "audio/webm"),
        "ogg" => (PayloadKind::Audio, "audio/ogg"),
        "mp3" => (PayloadKind::Audio, "audio/mpeg"),
        _ => return None,
    };
    Some(media)
}

/// A captured still image or voice clip, ready for classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    pub kind: PayloadKind,
    pub bytes: Bytes,
    pub file_name: String,
    pub media_type: String,
}

impl Payload {
    pub fn image(bytes: impl Into<Bytes>) -> Self {
        Self::new(PayloadKind::Image, bytes, "image/jpeg")
    }

    pub fn audio(bytes: impl Into<Bytes>) -> Self {
        Self::new(PayloadKind::Audio, bytes, "audio/wav")
    }

    fn new(kind: PayloadKind, bytes: impl Into<Bytes>, media_type: &str) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
            file_name: kind.default_file_name().to_owned(),
            media_type: media_type.to_owned(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("unsupported capture format: {0}")]
    UnsupportedFormat(String),

    #[error("capture produced no data")]
    Empty,

    #[error("capture i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait CaptureSource: Send + Sync {
    fn capture(&self) -> BoxFuture<'_, Result<Payload, CaptureError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_map_to_kinds() {
        assert_eq!(
            media_type_for_extension("JPG"),
            Some((PayloadKind::Image, "image/jpeg"))
        );
        assert_eq!(
            media_type_for_extension("webm"),
            Some((PayloadKind::Audio, "audio/webm"))
        );
        assert_eq!(media_type_for_extension("gif"), None);
    }

    #[test]
    fn kinds_pick_their_endpoints() {
        assert_eq!(PayloadKind::Image.endpoint(), "detect-mood");
        assert_eq!(PayloadKind::Audio.endpoint(), "detect-voice-mood");

        let payload = Payload::audio(vec![1u8, 2, 3]);
        assert_eq!(payload.file_name, "recording.wav");
        assert_eq!(payload.media_type, "audio/wav");
    }
}
