//! Line-based codec for tokio.
//!
//! Decodes newline-terminated wire lines into `String`s with the line
//! ending stripped, and encodes outbound lines with CRLF appended. Lines
//! are limited to 512 bytes by default (the IRC standard).

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;

/// Default maximum line length in bytes, line ending included.
pub const MAX_LINE_LEN: usize = 512;

/// Newline-delimited codec used by the client transport.
pub struct LineCodec {
    /// Index of the next byte to check for a newline.
    next_index: usize,
    /// Maximum line length in bytes.
    max_len: usize,
}

impl LineCodec {
    /// Creates a codec with the standard 512-byte limit.
    pub fn new() -> LineCodec {
        LineCodec {
            next_index: 0,
            max_len: MAX_LINE_LEN,
        }
    }

    /// Creates a codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> LineCodec {
        LineCodec {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        // Look for a newline starting from where we left off.
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let line = String::from_utf8(line.to_vec()).map_err(|err| {
                ProtocolError::InvalidUtf8 {
                    byte_pos: err.utf8_error().valid_up_to(),
                    details: err.utf8_error().to_string(),
                }
            })?;

            Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
        } else {
            // No complete line yet; remember where we stopped.
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(ProtocolError::MessageTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        // A stray line ending inside the payload would smuggle a second
        // command onto the wire.
        let line = match line.find(['\r', '\n']) {
            Some(pos) => &line[..pos],
            None => line.as_str(),
        };
        if let Some(nul) = line.chars().find(|&c| c == '\0') {
            return Err(ProtocolError::IllegalControlChar(nul));
        }

        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
