use byteorder::{ByteOrder, LittleEndian};
use tracing::warn;

use super::{
    AlarmConfig, ColorStop, CustomPseudo, FrameHeader, GainStatus, MarkType, RotationMode,
    WatermarkConfig,
};
use crate::error::{CodecError, ThermalError};

/// Size of a complete, current-version header.
pub const HEADER_SIZE: usize = 256;

const NAME_OFFSET: usize = 0;
const NAME_LEN: usize = 32;
const WIDTH_OFFSET: usize = 32;
const HEIGHT_OFFSET: usize = 34;
const ROTATE_OFFSET: usize = 36;
const INIT_ROTATE_OFFSET: usize = 37;
const CORRECT_ROTATE_OFFSET: usize = 38;
const PSEUDO_MODE_OFFSET: usize = 39;

const CUSTOM_OFFSET: usize = 40;
const CUSTOM_BLOCK_LEN: usize = 76;
const CUSTOM_STOPS_OFFSET: usize = 12;
const STOP_LEN: usize = 8;

const ALARM_OFFSET: usize = 116;
const ALARM_BLOCK_LEN: usize = 20;

const WATERMARK_OFFSET: usize = 136;
const WATERMARK_BLOCK_LEN: usize = 100;
const TITLE_LEN: usize = 32;
const ADDRESS_LEN: usize = 64;

const GAIN_OFFSET: usize = 236;
const TEXT_COLOR_OFFSET: usize = 237;
const TEXT_SIZE_OFFSET: usize = 241;
const ENVIRONMENT_OFFSET: usize = 243;
const DISTANCE_OFFSET: usize = 247;
const RADIATION_OFFSET: usize = 251;
const SHOW_BAR_OFFSET: usize = 255;

/// Result of decoding a header that may predate the current layout.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedHeader {
    pub header: FrameHeader,
    /// At least one field was missing from the input and took its default.
    pub truncated: bool,
}

/// Serialize a header into its fixed 256-byte layout.
pub fn encode_header(header: &FrameHeader) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE);

    // Name (32 bytes)
    write_fixed_string(&mut buf, &header.name, NAME_LEN);
    // Width, height (2 bytes each)
    buf.extend_from_slice(&header.width.to_le_bytes());
    buf.extend_from_slice(&header.height.to_le_bytes());
    // Rotations (1 byte each, quarter turns)
    buf.push(header.rotate.quarter_turns());
    buf.push(header.init_rotate.quarter_turns());
    buf.push(header.correct_rotate.quarter_turns());
    // Palette id
    buf.push(header.pseudo_mode);
    // Custom gradient (76 bytes)
    write_custom_block(&mut buf, header.custom_pseudo.as_ref());
    // Alarm (20 bytes)
    write_alarm_block(&mut buf, &header.alarm);
    // Watermark (100 bytes)
    write_fixed_string(&mut buf, &header.watermark.title, TITLE_LEN);
    write_fixed_string(&mut buf, &header.watermark.address, ADDRESS_LEN);
    buf.push(header.watermark.is_open as u8);
    buf.push(header.watermark.is_add_time as u8);
    buf.extend_from_slice(&[0u8; 2]);
    // Gain status (1 byte)
    buf.push(header.gain_status.to_byte());
    // Text color (4 bytes), text size (2 bytes)
    buf.extend_from_slice(&header.text_color.to_le_bytes());
    buf.extend_from_slice(&header.text_size.to_le_bytes());
    // Environment, distance, radiation (4 bytes each)
    buf.extend_from_slice(&header.environment.to_le_bytes());
    buf.extend_from_slice(&header.distance.to_le_bytes());
    buf.extend_from_slice(&header.radiation.to_le_bytes());
    // Pseudo bar flag (1 byte)
    buf.push(header.is_show_pseudo_bar as u8);

    debug_assert_eq!(buf.len(), HEADER_SIZE);
    buf
}

/// Decode a header, failing on values that cannot be interpreted.
///
/// Input shorter than [`HEADER_SIZE`] is not an error: missing fields keep
/// their defaults and `truncated` is set.
pub fn decode_header(bytes: &[u8]) -> Result<DecodedHeader, CodecError> {
    decode_with(bytes, true)
}

/// Decode a header, replacing malformed fields with defaults.
pub fn decode_header_or_default(bytes: &[u8]) -> DecodedHeader {
    decode_with(bytes, false).unwrap_or_else(|err| {
        warn!(%err, "header decode failed, using defaults");
        DecodedHeader {
            header: FrameHeader::default(),
            truncated: bytes.len() < HEADER_SIZE,
        }
    })
}

fn decode_with(bytes: &[u8], strict: bool) -> Result<DecodedHeader, CodecError> {
    let mut r = FieldReader {
        bytes,
        truncated: false,
        strict,
    };
    let mut h = FrameHeader::default();

    if let Some(b) = r.block(NAME_OFFSET, NAME_LEN) {
        h.name = read_fixed_string(b);
    }
    if let Some(v) = r.u16_at(WIDTH_OFFSET) {
        h.width = v;
    }
    if let Some(v) = r.u16_at(HEIGHT_OFFSET) {
        h.height = v;
    }
    if let Some(v) = r.rotation(ROTATE_OFFSET)? {
        h.rotate = v;
    }
    if let Some(v) = r.rotation(INIT_ROTATE_OFFSET)? {
        h.init_rotate = v;
    }
    if let Some(v) = r.rotation(CORRECT_ROTATE_OFFSET)? {
        h.correct_rotate = v;
    }
    if let Some(v) = r.u8_at(PSEUDO_MODE_OFFSET) {
        h.pseudo_mode = v;
    }
    h.custom_pseudo = r.custom_block()?;
    if let Some(alarm) = r.alarm_block()? {
        h.alarm = alarm;
    }
    if let Some(b) = r.block(WATERMARK_OFFSET, WATERMARK_BLOCK_LEN) {
        h.watermark = WatermarkConfig {
            title: read_fixed_string(&b[..TITLE_LEN]),
            address: read_fixed_string(&b[TITLE_LEN..TITLE_LEN + ADDRESS_LEN]),
            is_open: b[TITLE_LEN + ADDRESS_LEN] != 0,
            is_add_time: b[TITLE_LEN + ADDRESS_LEN + 1] != 0,
        };
    }
    if let Some(b) = r.u8_at(GAIN_OFFSET) {
        match GainStatus::from_byte(b) {
            Some(g) => h.gain_status = g,
            None => r.recover(CodecError::InvalidGainStatus(b), ())?,
        }
    }
    if let Some(v) = r.u32_at(TEXT_COLOR_OFFSET) {
        h.text_color = v;
    }
    if let Some(v) = r.u16_at(TEXT_SIZE_OFFSET) {
        h.text_size = v;
    }
    if let Some(v) = r.f32_at(ENVIRONMENT_OFFSET) {
        h.environment = v;
    }
    if let Some(v) = r.f32_at(DISTANCE_OFFSET) {
        h.distance = v;
    }
    if let Some(v) = r.f32_at(RADIATION_OFFSET) {
        h.radiation = v;
    }
    if let Some(v) = r.u8_at(SHOW_BAR_OFFSET) {
        h.is_show_pseudo_bar = v != 0;
    }

    Ok(DecodedHeader {
        header: h,
        truncated: r.truncated,
    })
}

/// Bounds-checked field access over a possibly short header.
struct FieldReader<'a> {
    bytes: &'a [u8],
    truncated: bool,
    strict: bool,
}

impl<'a> FieldReader<'a> {
    /// The whole block, or `None` (and mark truncated) if any byte is missing.
    fn block(&mut self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let bytes = self.bytes;
        match bytes.get(offset..offset + len) {
            Some(b) => Some(b),
            None => {
                self.truncated = true;
                None
            }
        }
    }

    fn u8_at(&mut self, offset: usize) -> Option<u8> {
        self.block(offset, 1).map(|b| b[0])
    }

    fn u16_at(&mut self, offset: usize) -> Option<u16> {
        self.block(offset, 2).map(LittleEndian::read_u16)
    }

    fn u32_at(&mut self, offset: usize) -> Option<u32> {
        self.block(offset, 4).map(LittleEndian::read_u32)
    }

    fn f32_at(&mut self, offset: usize) -> Option<f32> {
        self.block(offset, 4).map(LittleEndian::read_f32)
    }

    /// Strict mode propagates `err`; lenient mode logs it and yields `fallback`.
    fn recover<T>(&self, err: CodecError, fallback: T) -> Result<T, CodecError> {
        if self.strict {
            Err(err)
        } else {
            warn!(%err, "malformed header field, using default");
            Ok(fallback)
        }
    }

    fn rotation(&mut self, offset: usize) -> Result<Option<RotationMode>, CodecError> {
        let Some(value) = self.u8_at(offset) else {
            return Ok(None);
        };
        match RotationMode::from_quarter_turns(value) {
            Some(r) => Ok(Some(r)),
            None => self.recover(CodecError::InvalidRotation { value, offset }, None),
        }
    }

    fn custom_block(&mut self) -> Result<Option<CustomPseudo>, CodecError> {
        let Some(b) = self.block(CUSTOM_OFFSET, CUSTOM_BLOCK_LEN) else {
            return Ok(None);
        };
        if b[0] == 0 {
            return Ok(None);
        }
        let use_gray = b[1] != 0;
        let count = b[2];
        let max_stops = (CUSTOM_BLOCK_LEN - CUSTOM_STOPS_OFFSET) / STOP_LEN;
        if count < 2 || count as usize > max_stops {
            return self.recover(CodecError::InvalidStopCount(count), None);
        }
        let max_temp = LittleEndian::read_f32(&b[4..8]);
        let min_temp = LittleEndian::read_f32(&b[8..12]);
        let stops = (0..count as usize)
            .map(|i| {
                let off = CUSTOM_STOPS_OFFSET + i * STOP_LEN;
                ColorStop::new(
                    LittleEndian::read_f32(&b[off..off + 4]),
                    LittleEndian::read_u32(&b[off + 4..off + 8]),
                )
            })
            .collect();

        match CustomPseudo::new(stops, min_temp, max_temp, use_gray) {
            Ok(c) => Ok(Some(c)),
            Err(ThermalError::InvalidGradient(msg)) => {
                self.recover(CodecError::InvalidGradient(msg), None)
            }
            Err(other) => self.recover(CodecError::InvalidGradient(other.to_string()), None),
        }
    }

    fn alarm_block(&mut self) -> Result<Option<AlarmConfig>, CodecError> {
        let Some(b) = self.block(ALARM_OFFSET, ALARM_BLOCK_LEN) else {
            return Ok(None);
        };
        let mark_type = match MarkType::from_byte(b[16]) {
            Some(m) => m,
            None => self.recover(CodecError::InvalidMarkType(b[16]), MarkType::default())?,
        };
        Ok(Some(AlarmConfig {
            high_temp: LittleEndian::read_f32(&b[0..4]),
            low_temp: LittleEndian::read_f32(&b[4..8]),
            high_color: LittleEndian::read_u32(&b[8..12]),
            low_color: LittleEndian::read_u32(&b[12..16]),
            mark_type,
            is_mark_open: b[17] != 0,
        }))
    }
}

fn write_custom_block(buf: &mut Vec<u8>, custom: Option<&CustomPseudo>) {
    let start = buf.len();
    if let Some(c) = custom {
        buf.push(1);
        buf.push(c.use_gray as u8);
        buf.push(c.stops().len() as u8);
        buf.push(0);
        buf.extend_from_slice(&c.max_temp.to_le_bytes());
        buf.extend_from_slice(&c.min_temp.to_le_bytes());
        for stop in c.stops() {
            buf.extend_from_slice(&stop.position.to_le_bytes());
            buf.extend_from_slice(&stop.rgb.to_le_bytes());
        }
    }
    buf.resize(start + CUSTOM_BLOCK_LEN, 0);
}

fn write_alarm_block(buf: &mut Vec<u8>, alarm: &AlarmConfig) {
    buf.extend_from_slice(&alarm.high_temp.to_le_bytes());
    buf.extend_from_slice(&alarm.low_temp.to_le_bytes());
    buf.extend_from_slice(&alarm.high_color.to_le_bytes());
    buf.extend_from_slice(&alarm.low_color.to_le_bytes());
    buf.push(alarm.mark_type.to_byte());
    buf.push(alarm.is_mark_open as u8);
    buf.extend_from_slice(&[0u8; 2]);
}

/// Write `s` into a zero-padded slot, cutting at a UTF-8 boundary if needed.
fn write_fixed_string(buf: &mut Vec<u8>, s: &str, len: usize) {
    let mut end = s.len().min(len);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    buf.extend_from_slice(&s.as_bytes()[..end]);
    buf.resize(buf.len() + (len - end), 0);
}

fn read_fixed_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
