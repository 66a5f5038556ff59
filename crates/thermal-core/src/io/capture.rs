use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;

use crate::error::{Result, ThermalError};
use crate::frame::RawFrame;
use crate::header::{encode_header, FrameHeader};

pub const CAPTURE_MAGIC: &[u8; 8] = b"TIRCAP01";

/// Magic (8 bytes) + header length (4 bytes) + frame length (4 bytes).
pub const CAPTURE_PREAMBLE_SIZE: usize = 16;

/// Borrowed header and frame sections of a capture file.
#[derive(Clone, Copy, Debug)]
pub struct CaptureParts<'a> {
    pub header: &'a [u8],
    /// Image plane followed by temperature plane.
    pub frame: &'a [u8],
}

/// Locate the header and frame sections inside a capture buffer.
pub fn split_capture(bytes: &[u8]) -> Result<CaptureParts<'_>> {
    if bytes.len() < CAPTURE_PREAMBLE_SIZE {
        return Err(ThermalError::InvalidCapture(
            "File too small for capture preamble".into(),
        ));
    }
    if &bytes[0..8] != CAPTURE_MAGIC {
        return Err(ThermalError::InvalidCapture("Missing TIRCAP01 magic".into()));
    }

    let mut cur = Cursor::new(&bytes[8..CAPTURE_PREAMBLE_SIZE]);
    let header_len = cur.read_u32::<LittleEndian>()? as usize;
    let frame_len = cur.read_u32::<LittleEndian>()? as usize;

    let expected = CAPTURE_PREAMBLE_SIZE + header_len + frame_len;
    if bytes.len() < expected {
        return Err(ThermalError::InvalidCapture(format!(
            "File truncated: expected at least {expected} bytes, got {}",
            bytes.len()
        )));
    }
    let header_end = CAPTURE_PREAMBLE_SIZE + header_len;
    Ok(CaptureParts {
        header: &bytes[CAPTURE_PREAMBLE_SIZE..header_end],
        frame: &bytes[header_end..header_end + frame_len],
    })
}

/// Serialize a header and frame into the capture container.
pub fn encode_capture(header: &FrameHeader, frame: &RawFrame) -> Vec<u8> {
    let header_bytes = encode_header(header);
    let frame_bytes = frame.to_bytes();
    let mut buf =
        Vec::with_capacity(CAPTURE_PREAMBLE_SIZE + header_bytes.len() + frame_bytes.len());
    buf.extend_from_slice(CAPTURE_MAGIC);
    buf.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(frame_bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(&header_bytes);
    buf.extend_from_slice(&frame_bytes);
    buf
}

pub fn write_capture(path: &Path, header: &FrameHeader, frame: &RawFrame) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(&encode_capture(header, frame))?;
    file.flush()?;
    Ok(())
}

/// Memory-mapped capture file.
pub struct CaptureReader {
    mmap: Mmap,
}

impl CaptureReader {
    /// Open a capture file and check its preamble.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        split_capture(&mmap)?;
        Ok(Self { mmap })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    pub fn parts(&self) -> Result<CaptureParts<'_>> {
        split_capture(&self.mmap)
    }
}
