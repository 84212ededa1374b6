use std::{
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
};

use thiserror::Error;

use super::{file::MediaFile, matroska::read_matroska_duration};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read media file: {0}")]
    Io(#[from] io::Error),

    #[error("media file has no readable duration metadata")]
    NoMetadata,

    #[error("malformed media container: {0}")]
    Malformed(String),

    #[error("no duration reader for `{0}` files")]
    Unsupported(String),
}

/// Reads the play duration of a media file.
///
/// Implementations may block; callers that need feedback without blocking
/// run them off the UI thread.
pub trait MediaProbe: Send + Sync {
    fn duration_seconds(&self, file: &MediaFile) -> Result<f64, ProbeError>;

    /// Whether files of this MIME type can be measured at all.
    fn supports(&self, _mime_type: &str) -> bool {
        true
    }
}

const ISO_BMFF_TYPES: &[&str] = &["video/mp4", "video/quicktime", "video/3gpp"];
const MATROSKA_TYPES: &[&str] = &["video/webm", "video/x-matroska"];

fn open_sized(file: &MediaFile) -> Result<(BufReader<File>, u64), ProbeError> {
    let handle = File::open(&file.path)?;
    let len = handle.metadata()?.len();
    Ok((BufReader::new(handle), len))
}

/// Duration probe for ISO base media files (mp4, m4v, mov, 3gp).
#[derive(Debug, Default, Clone, Copy)]
pub struct Mp4Probe;

impl MediaProbe for Mp4Probe {
    fn duration_seconds(&self, file: &MediaFile) -> Result<f64, ProbeError> {
        let (mut reader, len) = open_sized(file)?;
        read_movie_duration(&mut reader, len)
    }

    fn supports(&self, mime_type: &str) -> bool {
        ISO_BMFF_TYPES.contains(&mime_type)
    }
}

/// Duration probe for Matroska and WebM files.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatroskaProbe;

impl MediaProbe for MatroskaProbe {
    fn duration_seconds(&self, file: &MediaFile) -> Result<f64, ProbeError> {
        let (mut reader, len) = open_sized(file)?;
        read_matroska_duration(&mut reader, len)
    }

    fn supports(&self, mime_type: &str) -> bool {
        MATROSKA_TYPES.contains(&mime_type)
    }
}

/// Picks the container reader from the file's MIME type.
#[derive(Debug, Default, Clone, Copy)]
pub struct VideoProbe;

impl MediaProbe for VideoProbe {
    fn duration_seconds(&self, file: &MediaFile) -> Result<f64, ProbeError> {
        match file.mime_type.as_deref() {
            Some(mime) if MatroskaProbe.supports(mime) => MatroskaProbe.duration_seconds(file),
            Some(mime) if Mp4Probe.supports(mime) => Mp4Probe.duration_seconds(file),
            other => Err(ProbeError::Unsupported(
                other.unwrap_or("unknown").to_string(),
            )),
        }
    }

    fn supports(&self, mime_type: &str) -> bool {
        Mp4Probe.supports(mime_type) || MatroskaProbe.supports(mime_type)
    }
}

struct BoxHeader {
    kind: [u8; 4],
    body_len: u64,
}

/// Walk top-level boxes until `moov`, then find `mvhd` inside it.
pub fn read_movie_duration<R: Read + Seek>(reader: &mut R, len: u64) -> Result<f64, ProbeError> {
    let mut offset = 0u64;
    while offset < len {
        let Some((header, header_len)) = read_box_header(reader, len - offset)? else {
            break;
        };
        offset += header_len;
        if &header.kind == b"moov" {
            return find_mvhd(reader, header.body_len);
        }
        reader.seek(SeekFrom::Current(seek_delta(header.body_len)?))?;
        offset += header.body_len;
    }
    Err(ProbeError::NoMetadata)
}

fn find_mvhd<R: Read + Seek>(reader: &mut R, moov_len: u64) -> Result<f64, ProbeError> {
    let mut consumed = 0u64;
    while consumed < moov_len {
        let Some((header, header_len)) = read_box_header(reader, moov_len - consumed)? else {
            break;
        };
        consumed += header_len;
        if &header.kind == b"mvhd" {
            return parse_mvhd(reader);
        }
        reader.seek(SeekFrom::Current(seek_delta(header.body_len)?))?;
        consumed += header.body_len;
    }
    Err(ProbeError::NoMetadata)
}

fn parse_mvhd<R: Read>(reader: &mut R) -> Result<f64, ProbeError> {
    let mut version_flags = [0u8; 4];
    reader.read_exact(&mut version_flags)?;
    let (timescale, duration) = match version_flags[0] {
        0 => {
            let mut body = [0u8; 16];
            reader.read_exact(&mut body)?;
            let timescale = u32::from_be_bytes([body[8], body[9], body[10], body[11]]);
            let duration = u32::from_be_bytes([body[12], body[13], body[14], body[15]]);
            (timescale, u64::from(duration))
        }
        1 => {
            let mut body = [0u8; 28];
            reader.read_exact(&mut body)?;
            let timescale = u32::from_be_bytes([body[16], body[17], body[18], body[19]]);
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&body[20..28]);
            (timescale, u64::from_be_bytes(raw))
        }
        other => {
            return Err(ProbeError::Malformed(format!(
                "unsupported mvhd version {other}"
            )));
        }
    };
    if timescale == 0 {
        return Err(ProbeError::Malformed("mvhd timescale is zero".to_string()));
    }
    Ok(duration as f64 / f64::from(timescale))
}

fn read_box_header<R: Read>(
    reader: &mut R,
    remaining: u64,
) -> Result<Option<(BoxHeader, u64)>, ProbeError> {
    if remaining < 8 {
        return Ok(None);
    }
    let mut head = [0u8; 8];
    match reader.read_exact(&mut head) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    }
    let size = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);
    let kind = [head[4], head[5], head[6], head[7]];
    let (total, header_len) = match size {
        0 => (remaining, 8),
        1 => {
            let mut large = [0u8; 8];
            reader.read_exact(&mut large)?;
            (u64::from_be_bytes(large), 16)
        }
        n => (u64::from(n), 8),
    };
    if total < header_len || total > remaining {
        return Err(ProbeError::Malformed(format!(
            "box `{}` declares {total} bytes with {remaining} available",
            String::from_utf8_lossy(&kind)
        )));
    }
    Ok(Some((
        BoxHeader {
            kind,
            body_len: total - header_len,
        },
        header_len,
    )))
}

pub(super) fn seek_delta(len: u64) -> Result<i64, ProbeError> {
    i64::try_from(len).map_err(|_| ProbeError::Malformed("box too large".to_string()))
}
