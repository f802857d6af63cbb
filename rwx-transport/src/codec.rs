use bytes::{Buf, BufMut, BytesMut};
use rwx_core::{decode_envelope, encode_envelope, Envelope, FrameFormat, WireError};
use tokio_util::codec::{Decoder, Encoder};

const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Frames envelopes on a byte stream
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    format: FrameFormat,
    /// Maximum frame size to prevent unbounded buffering
    max_frame_size: usize,
}

impl EnvelopeCodec {
    pub fn new(format: FrameFormat) -> Self {
        Self {
            format,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    pub fn with_max_frame_size(format: FrameFormat, max_frame_size: usize) -> Self {
        Self {
            format,
            max_frame_size,
        }
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::new(FrameFormat::default())
    }
}

impl Decoder for EnvelopeCodec {
    type Item = Envelope;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.format {
            FrameFormat::LengthPrefixed => {
                if src.len() < 4 {
                    return Ok(None);
                }

                let mut length_bytes = [0u8; 4];
                length_bytes.copy_from_slice(&src[..4]);
                let frame_len = u32::from_be_bytes(length_bytes) as usize;

                if frame_len > self.max_frame_size {
                    return Err(CodecError::FrameTooLarge(frame_len));
                }

                if src.len() < 4 + frame_len {
                    src.reserve(4 + frame_len - src.len());
                    return Ok(None);
                }

                src.advance(4);
                let frame = src.split_to(frame_len);
                Ok(Some(decode_envelope(&frame)?))
            }
            FrameFormat::NewlineDelimited => {
                let Some(pos) = src.iter().position(|&b| b == b'\n') else {
                    if src.len() > self.max_frame_size {
                        return Err(CodecError::FrameTooLarge(src.len()));
                    }
                    return Ok(None);
                };

                if pos > self.max_frame_size {
                    return Err(CodecError::FrameTooLarge(pos));
                }

                let line = src.split_to(pos);
                src.advance(1);

                // Tolerate blank keep-alive lines
                if line.iter().all(u8::is_ascii_whitespace) {
                    return self.decode(src);
                }
                Ok(Some(decode_envelope(&line)?))
            }
        }
    }
}

impl Encoder<Envelope> for EnvelopeCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Envelope, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = encode_envelope(&item)?;

        if json.len() > self.max_frame_size {
            return Err(CodecError::FrameTooLarge(json.len()));
        }

        match self.format {
            FrameFormat::LengthPrefixed => {
                dst.reserve(4 + json.len());
                dst.put_u32(json.len() as u32);
                dst.put_slice(&json);
            }
            FrameFormat::NewlineDelimited => {
                dst.reserve(json.len() + 1);
                dst.put_slice(&json);
                dst.put_u8(b'\n');
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Frame too large: {0} bytes")]
    FrameTooLarge(usize),

    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
