//! Recording download and live-stream operations.
//!
//! Both hold one open HTTP connection for their duration. The live stream
//! is pull-driven: the consumer controls backpressure by polling chunks,
//! and dropping [`RecordingStream`] releases the connection.

use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt, TryStreamExt};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::client::Arlo;
use crate::envelope::{NotifyAction, NotifyEnvelope};
use crate::error::ArloError;

/// A live byte stream from a camera.
///
/// Finite per connection: yields `Ok(Bytes)` chunks until the server
/// closes the stream, then `None`. A transport error is terminal. Not
/// restartable; call [`Arlo::stream_recording`] again for a new stream.
pub struct RecordingStream {
    inner: BoxStream<'static, Result<Bytes, ArloError>>,
}

impl std::fmt::Debug for RecordingStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingStream").finish_non_exhaustive()
    }
}

impl Stream for RecordingStream {
    type Item = Result<Bytes, ArloError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl Arlo {
    /// Download a recording to a file.
    ///
    /// `url` is the recording's `presignedContentUrl` (or
    /// `presignedThumbnailUrl`) from [`Arlo::get_library`]. The URL is
    /// fetched without the session header, since presigned URLs carry
    /// their own auth. Creates or overwrites the file at `path`.
    pub async fn get_recording(
        &self,
        url: &str,
        path: impl AsRef<Path>,
    ) -> Result<(), ArloError> {
        self.http.session().await?;

        let response = self.http.get_streamed(url).await?;
        let mut stream = response.bytes_stream();

        let mut file = tokio::fs::File::create(path.as_ref()).await?;
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        debug!(path = %path.as_ref().display(), "recording saved");
        Ok(())
    }

    /// Start a position stream on a camera and return its byte stream.
    ///
    /// Issues one start-stream POST, then one GET against the `data.url`
    /// the server answers with.
    pub async fn stream_recording(&self, device_id: &str) -> Result<RecordingStream, ArloError> {
        let session = self.http.session().await?;

        let envelope = NotifyEnvelope::new(
            &session.user_id,
            device_id,
            NotifyAction::Set,
            format!("cameras/{device_id}"),
        )
        .with_properties(json!({"activityState": "startPositionStream"}));

        let body = self.http.post("users/devices/startStream", &envelope).await?;
        let url = body["data"]["url"]
            .as_str()
            .ok_or(ArloError::UnexpectedResponse(
                "start-stream response missing data.url",
            ))?;

        let response = self.http.get_streamed(url).await?;
        Ok(RecordingStream {
            inner: response.bytes_stream().map_err(ArloError::from).boxed(),
        })
    }
}
