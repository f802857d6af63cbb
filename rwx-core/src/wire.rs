use crate::envelope::Envelope;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameFormat {
    /// 4-byte big-endian length, then the JSON envelope
    LengthPrefixed,
    /// One JSON envelope per line
    #[default]
    NewlineDelimited,
}

pub fn encode_envelope(envelope: &Envelope) -> Result<Bytes, WireError> {
    let json = serde_json::to_vec(envelope)?;
    Ok(Bytes::from(json))
}

pub fn decode_envelope(data: &[u8]) -> Result<Envelope, WireError> {
    let envelope = serde_json::from_slice(data)?;
    Ok(envelope)
}

pub fn encode_frame(envelope: &Envelope, format: FrameFormat) -> Result<Bytes, WireError> {
    let json = serde_json::to_vec(envelope)?;

    match format {
        FrameFormat::LengthPrefixed => {
            let len = u32::try_from(json.len()).map_err(|_| WireError::FrameTooLarge(json.len()))?;
            let mut buf = BytesMut::with_capacity(4 + json.len());
            buf.put_u32(len);
            buf.put_slice(&json);
            Ok(buf.freeze())
        }
        FrameFormat::NewlineDelimited => {
            let mut buf = BytesMut::with_capacity(json.len() + 1);
            buf.put_slice(&json);
            buf.put_u8(b'\n');
            Ok(buf.freeze())
        }
    }
}

/// Decode one frame from the front of `data`, returning the envelope and the
/// number of bytes consumed. `Ok(None)` means the frame is still incomplete.
pub fn decode_frame(data: &[u8], format: FrameFormat) -> Result<Option<(Envelope, usize)>, WireError> {
    match format {
        FrameFormat::LengthPrefixed => {
            if data.len() < 4 {
                return Ok(None);
            }

            let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
            let total_len = 4 + len;

            if data.len() < total_len {
                return Ok(None);
            }

            let envelope = decode_envelope(&data[4..total_len])?;
            Ok(Some((envelope, total_len)))
        }
        FrameFormat::NewlineDelimited => match data.iter().position(|&b| b == b'\n') {
            Some(newline_pos) => {
                let envelope = decode_envelope(&data[..newline_pos])?;
                Ok(Some((envelope, newline_pos + 1)))
            }
            None => Ok(None),
        },
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame too large: {0} bytes")]
    FrameTooLarge(usize),
}
