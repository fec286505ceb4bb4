use crate::capture::{CaptureError, CaptureSource, Payload};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Hands out the same payload on every capture.
#[derive(Clone, Debug)]
pub struct MemoryCapture {
    payload: Payload,
}

impl MemoryCapture {
    pub fn new(payload: Payload) -> Self {
        Self { payload }
    }
}

impl CaptureSource for MemoryCapture {
    fn capture(&self) -> BoxFuture<'_, Result<Payload, CaptureError>> {
        async move {
            if self.payload.bytes.is_empty() {
                return Err(CaptureError::Empty);
            }
            Ok(self.payload.clone())
        }
        .boxed()
    }
}
