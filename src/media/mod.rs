mod file;
mod gate;
mod matroska;
mod probe;

pub use file::{MediaFile, mime_from_path};
pub use gate::{
    MAX_DURATION_SECS, MAX_SIZE_BYTES, MediaDurationResult, MediaGate, MediaRejection, classify,
};
pub use matroska::read_matroska_duration;
pub use probe::{
    MatroskaProbe, MediaProbe, Mp4Probe, ProbeError, VideoProbe, read_movie_duration,
};

#[cfg(test)]
pub(crate) use matroska::fixtures as webm_fixtures;
#[cfg(test)]
pub(crate) use probe::fixtures;
