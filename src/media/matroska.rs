use std::io::{self, Read, Seek, SeekFrom};

use super::probe::{ProbeError, seek_delta};

const EBML_HEADER: u32 = 0x1A45_DFA3;
const SEGMENT: u32 = 0x1853_8067;
const INFO: u32 = 0x1549_A966;
const TIMECODE_SCALE: u32 = 0x2A_D7B1;
const DURATION: u32 = 0x4489;

/// Nanoseconds per tick when `Info` carries no `TimecodeScale`.
const DEFAULT_TIMECODE_SCALE: u64 = 1_000_000;

struct Element {
    id: u32,
    header_len: u64,
    /// `None` for elements written with the reserved "unknown size".
    body_len: Option<u64>,
}

/// Read `Segment/Info/Duration` from a Matroska or WebM stream.
pub fn read_matroska_duration<R: Read + Seek>(reader: &mut R, len: u64) -> Result<f64, ProbeError> {
    let header = read_element(reader, len)?.ok_or(ProbeError::NoMetadata)?;
    if header.id != EBML_HEADER {
        return Err(ProbeError::Malformed("missing EBML header".to_string()));
    }
    let mut offset = header.header_len;
    let header_body = body_len(&header, len - offset)?;
    skip(reader, header_body)?;
    offset += header_body;

    while offset < len {
        let Some(element) = read_element(reader, len - offset)? else {
            break;
        };
        offset += element.header_len;
        let remaining = len - offset;
        if element.id == SEGMENT {
            // Live recordings leave the segment size unknown; it then runs to the end.
            let segment_len = match element.body_len {
                Some(n) if n > remaining => return Err(oversized(element.id, n, remaining)),
                Some(n) => n,
                None => remaining,
            };
            return read_segment(reader, segment_len);
        }
        let body = body_len(&element, remaining)?;
        skip(reader, body)?;
        offset += body;
    }
    Err(ProbeError::NoMetadata)
}

fn read_segment<R: Read + Seek>(reader: &mut R, segment_len: u64) -> Result<f64, ProbeError> {
    let mut consumed = 0u64;
    while consumed < segment_len {
        let Some(element) = read_element(reader, segment_len - consumed)? else {
            break;
        };
        consumed += element.header_len;
        let body = body_len(&element, segment_len - consumed)?;
        if element.id == INFO {
            return read_info(reader, body);
        }
        skip(reader, body)?;
        consumed += body;
    }
    Err(ProbeError::NoMetadata)
}

fn read_info<R: Read + Seek>(reader: &mut R, info_len: u64) -> Result<f64, ProbeError> {
    let mut scale = DEFAULT_TIMECODE_SCALE;
    let mut duration = None;
    let mut consumed = 0u64;
    while consumed < info_len {
        let Some(element) = read_element(reader, info_len - consumed)? else {
            break;
        };
        consumed += element.header_len;
        let body = body_len(&element, info_len - consumed)?;
        match element.id {
            TIMECODE_SCALE => scale = read_uint(reader, body)?,
            DURATION => duration = Some(read_float(reader, body)?),
            _ => skip(reader, body)?,
        }
        consumed += body;
    }
    let ticks = duration.ok_or(ProbeError::NoMetadata)?;
    if scale == 0 {
        return Err(ProbeError::Malformed("timecode scale is zero".to_string()));
    }
    Ok(ticks * scale as f64 / 1_000_000_000.0)
}

fn read_element<R: Read>(reader: &mut R, remaining: u64) -> Result<Option<Element>, ProbeError> {
    if remaining == 0 {
        return Ok(None);
    }
    let mut first = [0u8; 1];
    match reader.read_exact(&mut first) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    }
    let id_len = vint_len(first[0], 4, "element id")?;
    let mut id = u32::from(first[0]);
    for byte in read_bytes(reader, id_len - 1)? {
        id = (id << 8) | u32::from(byte);
    }

    reader.read_exact(&mut first)?;
    let size_len = vint_len(first[0], 8, "element size")?;
    let mut size = u64::from(first[0]) & ((1u64 << (8 - size_len)) - 1);
    for byte in read_bytes(reader, size_len - 1)? {
        size = (size << 8) | u64::from(byte);
    }
    let unknown = size == (1u64 << (7 * size_len)) - 1;

    let header_len = (id_len + size_len) as u64;
    if header_len > remaining {
        return Err(ProbeError::Malformed(format!(
            "element {id:#x} header overruns its parent"
        )));
    }
    Ok(Some(Element {
        id,
        header_len,
        body_len: (!unknown).then_some(size),
    }))
}

fn vint_len(first: u8, max: usize, what: &str) -> Result<usize, ProbeError> {
    let len = first.leading_zeros() as usize + 1;
    if len > max {
        return Err(ProbeError::Malformed(format!("invalid {what} marker {first:#04x}")));
    }
    Ok(len)
}

fn read_bytes<R: Read>(reader: &mut R, count: usize) -> Result<Vec<u8>, ProbeError> {
    let mut buf = vec![0u8; count];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn body_len(element: &Element, remaining: u64) -> Result<u64, ProbeError> {
    match element.body_len {
        None => Err(ProbeError::NoMetadata),
        Some(n) if n > remaining => Err(oversized(element.id, n, remaining)),
        Some(n) => Ok(n),
    }
}

fn oversized(id: u32, declared: u64, remaining: u64) -> ProbeError {
    ProbeError::Malformed(format!(
        "element {id:#x} declares {declared} bytes with {remaining} available"
    ))
}

fn read_uint<R: Read>(reader: &mut R, len: u64) -> Result<u64, ProbeError> {
    if len > 8 {
        return Err(ProbeError::Malformed(format!("{len}-byte unsigned integer")));
    }
    Ok(read_bytes(reader, len as usize)?
        .into_iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(byte)))
}

fn read_float<R: Read>(reader: &mut R, len: u64) -> Result<f64, ProbeError> {
    if len > 8 {
        return Err(ProbeError::Malformed(format!("{len}-byte float")));
    }
    let bytes = read_bytes(reader, len as usize)?;
    match bytes.len() {
        0 => Ok(0.0),
        4 => Ok(f64::from(f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))),
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes);
            Ok(f64::from_be_bytes(raw))
        }
        other => Err(ProbeError::Malformed(format!("{other}-byte float"))),
    }
}

fn skip<R: Seek>(reader: &mut R, len: u64) -> Result<(), ProbeError> {
    reader.seek(SeekFrom::Current(seek_delta(len)?))?;
    Ok(())
}
