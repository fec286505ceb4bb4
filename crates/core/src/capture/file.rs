use crate::capture::{media_type_for_extension, CaptureError, CaptureSource, Payload, PayloadKind};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "capture::file";

/// Reads a fresh capture from disk on every call.
#[derive(Clone, Debug)]
pub struct FileCapture {
    path: PathBuf,
    kind: PayloadKind,
    media_type: &'static str,
}

impl FileCapture {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let path = path.as_ref().to_path_buf();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let (kind, media_type) = media_type_for_extension(extension)
            .ok_or_else(|| CaptureError::UnsupportedFormat(path.display().to_string()))?;

        Ok(Self {
            path,
            kind,
            media_type,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> PayloadKind {
        self.kind
    }
}

impl CaptureSource for FileCapture {
    fn capture(&self) -> BoxFuture<'_, Result<Payload, CaptureError>> {
        async move {
            let data = tokio::fs::read(&self.path).await?;
            if data.is_empty() {
                return Err(CaptureError::Empty);
            }

            let file_name = self
                .path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_owned)
                .unwrap_or_else(|| self.kind.default_file_name().to_owned());

            tracing::debug!(
                target: LOG_TARGET,
                path = %self.path.display(),
                bytes = data.len(),
                "captured file"
            );

            Ok(Payload {
                kind: self.kind,
                bytes: Bytes::from(data),
                file_name,
                media_type: self.media_type.to_owned(),
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_image_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .expect("temp file");
        file.write_all(b"\x89PNG fake").expect("write");

        let capture = FileCapture::open(file.path()).expect("png is supported");
        assert_eq!(capture.kind(), PayloadKind::Image);

        let payload = capture.capture().await.expect("captured");
        assert_eq!(payload.kind, PayloadKind::Image);
        assert_eq!(payload.media_type, "image/png");
        assert_eq!(&payload.bytes[..], b"\x89PNG fake");
        assert!(payload.file_name.ends_with(".png"));
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let file = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .expect("temp file");

        let capture = FileCapture::open(file.path()).expect("wav is supported");
        assert!(matches!(capture.capture().await, Err(CaptureError::Empty)));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let capture = FileCapture::open(dir.path().join("gone.jpg")).expect("jpg is supported");
        assert!(matches!(capture.capture().await, Err(CaptureError::Io(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            FileCapture::open("notes.txt"),
            Err(CaptureError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            FileCapture::open("no_extension"),
            Err(CaptureError::UnsupportedFormat(_))
        ));
    }
}
