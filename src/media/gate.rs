use std::{fmt, sync::Arc};

use tracing::debug;

use super::{
    file::MediaFile,
    probe::{MediaProbe, ProbeError},
};

pub const MAX_DURATION_SECS: f64 = 60.0;
pub const MAX_SIZE_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaDurationResult {
    pub duration_seconds: f64,
    pub accepted: bool,
}

impl MediaDurationResult {
    pub fn rounded_seconds(&self) -> i64 {
        self.duration_seconds.round() as i64
    }
}

/// Why a media file cannot be submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaRejection {
    Missing,
    WrongType { mime_type: Option<String> },
    TooLarge { size_bytes: u64, limit_bytes: u64 },
    TooLong { duration_seconds: f64, limit_seconds: f64 },
    Unreadable { reason: String },
}

impl fmt::Display for MediaRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaRejection::Missing => write!(f, "Please upload a video."),
            MediaRejection::WrongType { .. } => write!(f, "Please upload a valid video file."),
            MediaRejection::TooLarge { limit_bytes, .. } => write!(
                f,
                "Video file size must be less than {}MB.",
                limit_bytes / (1024 * 1024)
            ),
            MediaRejection::TooLong {
                duration_seconds,
                limit_seconds,
            } => {
                let limit = limit_seconds.round() as i64;
                write!(
                    f,
                    "Video is {} seconds. It must be exactly {} ({limit} seconds).",
                    duration_seconds.round() as i64,
                    minutes_phrase(limit)
                )
            }
            MediaRejection::Unreadable { .. } => {
                write!(f, "We could not read this video. Please choose another file.")
            }
        }
    }
}

fn minutes_phrase(seconds: i64) -> String {
    match seconds {
        60 => "1 minute".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{s} seconds"),
    }
}

/// Size, type and duration checks for an uploaded media file.
#[derive(Clone)]
pub struct MediaGate {
    probe: Arc<dyn MediaProbe>,
    max_duration_secs: f64,
    max_size_bytes: u64,
}

impl fmt::Debug for MediaGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaGate")
            .field("max_duration_secs", &self.max_duration_secs)
            .field("max_size_bytes", &self.max_size_bytes)
            .finish_non_exhaustive()
    }
}

impl MediaGate {
    pub fn new(probe: Arc<dyn MediaProbe>) -> Self {
        Self {
            probe,
            max_duration_secs: MAX_DURATION_SECS,
            max_size_bytes: MAX_SIZE_BYTES,
        }
    }

    pub fn with_max_duration(mut self, seconds: f64) -> Self {
        self.max_duration_secs = seconds;
        self
    }

    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    pub fn probe(&self) -> Arc<dyn MediaProbe> {
        Arc::clone(&self.probe)
    }

    pub fn max_duration_secs(&self) -> f64 {
        self.max_duration_secs
    }

    /// Synchronous preconditions checked before any probing.
    pub fn precheck(&self, file: &MediaFile, accept: &str) -> Result<(), MediaRejection> {
        let measurable = file
            .mime_type
            .as_deref()
            .is_some_and(|mime| self.probe.supports(mime));
        if !file.matches_type(accept) || !measurable {
            return Err(MediaRejection::WrongType {
                mime_type: file.mime_type.clone(),
            });
        }
        if file.size_bytes > self.max_size_bytes {
            return Err(MediaRejection::TooLarge {
                size_bytes: file.size_bytes,
                limit_bytes: self.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Measure the file and classify it against the duration ceiling.
    pub fn measure(&self, file: &MediaFile) -> Result<MediaDurationResult, ProbeError> {
        let duration_seconds = self.probe.duration_seconds(file)?;
        let result = classify(duration_seconds, self.max_duration_secs);
        debug!(
            file = %file.file_name,
            duration_seconds,
            accepted = result.accepted,
            "probed media duration"
        );
        Ok(result)
    }

    /// The blocking check of record used at submit time.
    pub fn authorize(
        &self,
        file: Option<&MediaFile>,
        accept: &str,
    ) -> Result<MediaDurationResult, MediaRejection> {
        let file = file.ok_or(MediaRejection::Missing)?;
        self.precheck(file, accept)?;
        let result = self
            .measure(file)
            .map_err(|err| MediaRejection::Unreadable {
                reason: err.to_string(),
            })?;
        if !result.accepted {
            return Err(MediaRejection::TooLong {
                duration_seconds: result.duration_seconds,
                limit_seconds: self.max_duration_secs,
            });
        }
        Ok(result)
    }
}

pub fn classify(duration_seconds: f64, max_duration_secs: f64) -> MediaDurationResult {
    MediaDurationResult {
        duration_seconds,
        accepted: duration_seconds.is_finite() && duration_seconds <= max_duration_secs,
    }
}
