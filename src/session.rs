// src/session.rs
//! State behind one cutting session: the selected file, its decoded
//! buffer and the start/end selection.
//!
//! Decodes run off the caller's task and may finish out of order. Every
//! file selection takes a fresh token and only the outcome carrying the
//! newest token is applied, so the last selection always wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::audio::decoder::{extension_hint, AudioDecoder};
use crate::audio::{encode_wav, trim_audio, SampleBuffer, TrimRange};
use crate::error::{AudioError, Result};

/// A pending decode handed out by [`CutterSession::select_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRequest {
    pub token: u64,
    pub name: String,
    pub hint: Option<String>,
}

/// The result of running a [`DecodeRequest`]
#[derive(Debug)]
pub struct DecodeOutcome {
    pub token: u64,
    pub result: Result<SampleBuffer>,
}

/// What [`CutterSession::apply_decoded`] did with an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The buffer is now loaded and the range covers all of it
    Applied,
    /// A newer selection exists; the outcome was dropped
    Stale,
}

#[derive(Debug, Default)]
pub struct CutterSession {
    file_name: Option<String>,
    buffer: Option<SampleBuffer>,
    start: f64,
    end: f64,
    latest_token: u64,
    pending: bool,
}

impl CutterSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new file selection and get the request to decode it
    ///
    /// Any loaded buffer is dropped right away, so an export can't pick up
    /// the previous file while the new one decodes.
    pub fn select_file(&mut self, name: impl Into<String>) -> DecodeRequest {
        let name = name.into();
        self.latest_token += 1;

        self.file_name = Some(name.clone());
        self.buffer = None;
        self.start = 0.0;
        self.end = 0.0;
        self.pending = true;

        let hint = extension_hint(Path::new(&name)).map(str::to_string);
        debug!(token = self.latest_token, %name, "file selected");

        DecodeRequest {
            token: self.latest_token,
            name,
            hint,
        }
    }

    /// Apply a finished decode if it belongs to the latest selection
    ///
    /// Stale outcomes are dropped whether they succeeded or not. A current
    /// failure leaves the session without a buffer and is returned.
    pub fn apply_decoded(&mut self, outcome: DecodeOutcome) -> Result<LoadOutcome> {
        if outcome.token != self.latest_token {
            warn!(
                token = outcome.token,
                latest = self.latest_token,
                "discarding stale decode result"
            );
            return Ok(LoadOutcome::Stale);
        }

        self.pending = false;
        let buffer = outcome.result?;

        info!(
            file = self.file_name.as_deref().unwrap_or_default(),
            duration = buffer.duration_seconds(),
            sample_rate = buffer.sample_rate(),
            channels = buffer.channel_count(),
            "audio loaded"
        );

        self.start = 0.0;
        self.end = buffer.duration_seconds();
        self.buffer = Some(buffer);

        Ok(LoadOutcome::Applied)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn buffer(&self) -> Option<&SampleBuffer> {
        self.buffer.as_ref()
    }

    /// True while the latest selection has not been decoded yet
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn range(&self) -> TrimRange {
        TrimRange::new(self.start, self.end)
    }

    fn duration(&self) -> Option<f64> {
        self.buffer.as_ref().map(SampleBuffer::duration_seconds)
    }

    /// Move the start of the selection, clamped into [0, end]
    ///
    /// Returns the value actually stored, or None when nothing is loaded.
    pub fn set_start(&mut self, seconds: f64) -> Option<f64> {
        self.duration()?;
        let seconds = if seconds.is_finite() { seconds } else { 0.0 };
        self.start = seconds.clamp(0.0, self.end);
        Some(self.start)
    }

    /// Move the end of the selection, clamped into [start, duration]
    pub fn set_end(&mut self, seconds: f64) -> Option<f64> {
        let duration = self.duration()?;
        let seconds = if seconds.is_finite() { seconds } else { duration };
        self.end = seconds.clamp(self.start, duration);
        Some(self.end)
    }

    /// Replace both ends at once
    ///
    /// End is clamped into [0, duration] first, then start into [0, end].
    pub fn set_range(&mut self, start: f64, end: f64) -> Option<TrimRange> {
        let duration = self.duration()?;
        let end = if end.is_finite() { end } else { duration };
        let start = if start.is_finite() { start } else { 0.0 };

        self.end = end.clamp(0.0, duration);
        self.start = start.clamp(0.0, self.end);
        Some(self.range())
    }

    /// Trim the loaded buffer to the selection and encode it
    ///
    /// Returns None, doing nothing, when no buffer is loaded or the
    /// selection is empty.
    pub fn export(&self) -> Result<Option<Vec<u8>>> {
        let buffer = match &self.buffer {
            Some(buffer) => buffer,
            None => {
                debug!("export skipped: no audio loaded");
                return Ok(None);
            }
        };

        let range = self.range();
        if range.is_degenerate() {
            debug!(start = range.start, end = range.end, "export skipped: empty selection");
            return Ok(None);
        }

        let trimmed = trim_audio(buffer, &range)?;
        encode_wav(&trimmed).map(Some)
    }

    /// Export and write the clip to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<Option<PathBuf>> {
        let path = path.as_ref();
        let Some(bytes) = self.export()? else {
            return Ok(None);
        };

        std::fs::write(path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "clip saved");

        Ok(Some(path.to_path_buf()))
    }
}

/// Decode `bytes` for `request` on the blocking thread pool
pub async fn run_decode(
    decoder: Arc<dyn AudioDecoder>,
    request: DecodeRequest,
    bytes: Vec<u8>,
) -> DecodeOutcome {
    let token = request.token;

    let result = tokio::task::spawn_blocking(move || {
        decoder.decode(&bytes, request.hint.as_deref())
    })
    .await
    .map_err(|e| AudioError::Task(e.to_string()))
    .and_then(|result| result);

    DecodeOutcome { token, result }
}
