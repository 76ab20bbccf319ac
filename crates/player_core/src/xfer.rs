//! The ordered, typed save/load stream contract.
//!
//! A single [`Xfer`] value drives both directions: save mode appends each
//! field to an internal buffer, load mode reads the same fields back in the
//! same order. State objects implement one snapshot routine that calls the
//! typed primitives in a fixed sequence; that call sequence *is* the wire
//! and file schema, with a version tag decoded first gating which fields
//! follow.
//!
//! All multi-byte values are little-endian. Fixed-point values travel as
//! their raw 64-bit representation so save/load round-trips are bit-exact
//! on every platform.

use thiserror::Error;

use crate::math::Fixed;

/// Direction of an [`Xfer`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XferMode {
    /// Appending fields to the stream.
    Save,
    /// Reading fields back from the stream.
    Load,
}

/// Stream-level serialization errors.
#[derive(Debug, Error)]
pub enum XferError {
    /// The stream ended before a field could be read in full.
    #[error("Unexpected end of stream: needed {needed} bytes, {remaining} remain")]
    EndOfStream {
        /// Bytes the current field required.
        needed: usize,
        /// Bytes left in the stream.
        remaining: usize,
    },

    /// A version tag newer than this build understands.
    #[error("Stream version {found} is newer than supported version {current}")]
    VersionTooNew {
        /// Version decoded from the stream.
        found: u8,
        /// Highest version this build can decode.
        current: u8,
    },

    /// A boolean field held something other than 0 or 1.
    #[error("Invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// An 8-bit-char string field was not valid UTF-8.
    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8,

    /// A 16-bit-char string field held an unpaired surrogate.
    #[error("Invalid UTF-16 in string field")]
    InvalidUtf16,

    /// A string longer than the u16 length prefix can express.
    #[error("String of {0} units exceeds the 16-bit length prefix")]
    StringTooLong(usize),

    /// A sequence longer than its u16 count prefix can express.
    #[error("Sequence of {0} elements exceeds the 16-bit count prefix")]
    CountTooLarge(usize),
}

/// Ordered save/load stream.
///
/// Construct with [`Xfer::saver`] or [`Xfer::loader`], drive the same
/// snapshot routine in either mode, and in save mode recover the bytes with
/// [`Xfer::into_bytes`].
#[derive(Debug)]
pub struct Xfer {
    mode: XferMode,
    buf: Vec<u8>,
    pos: usize,
}

impl Xfer {
    /// Create a stream in save mode with an empty buffer.
    #[must_use]
    pub fn saver() -> Self {
        Self {
            mode: XferMode::Save,
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// Create a stream in load mode over previously saved bytes.
    #[must_use]
    pub fn loader(bytes: Vec<u8>) -> Self {
        Self {
            mode: XferMode::Load,
            buf: bytes,
            pos: 0,
        }
    }

    /// Which direction this stream runs in.
    #[must_use]
    pub const fn mode(&self) -> XferMode {
        self.mode
    }

    /// Consume the stream and return the saved bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Bytes not yet consumed in load mode.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, needed: usize) -> Result<&[u8], XferError> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(XferError::EndOfStream { needed, remaining });
        }
        let slice = &self.buf[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    /// Transfer a version tag.
    ///
    /// Save mode writes `*version` (callers set it to the current schema
    /// version first). Load mode replaces `*version` with the decoded tag
    /// and fails if the stream is newer than `current`.
    pub fn xfer_version(&mut self, version: &mut u8, current: u8) -> Result<(), XferError> {
        match self.mode {
            XferMode::Save => {
                self.buf.push(*version);
                Ok(())
            }
            XferMode::Load => {
                let found = self.take(1)?[0];
                if found > current {
                    return Err(XferError::VersionTooNew { found, current });
                }
                *version = found;
                Ok(())
            }
        }
    }

    /// Transfer a boolean as a single byte.
    pub fn xfer_bool(&mut self, value: &mut bool) -> Result<(), XferError> {
        match self.mode {
            XferMode::Save => {
                self.buf.push(u8::from(*value));
                Ok(())
            }
            XferMode::Load => {
                let byte = self.take(1)?[0];
                *value = match byte {
                    0 => false,
                    1 => true,
                    other => return Err(XferError::InvalidBool(other)),
                };
                Ok(())
            }
        }
    }

    /// Transfer a single byte.
    pub fn xfer_u8(&mut self, value: &mut u8) -> Result<(), XferError> {
        match self.mode {
            XferMode::Save => {
                self.buf.push(*value);
                Ok(())
            }
            XferMode::Load => {
                *value = self.take(1)?[0];
                Ok(())
            }
        }
    }

    /// Transfer an unsigned 16-bit integer.
    pub fn xfer_u16(&mut self, value: &mut u16) -> Result<(), XferError> {
        match self.mode {
            XferMode::Save => {
                self.buf.extend_from_slice(&value.to_le_bytes());
                Ok(())
            }
            XferMode::Load => {
                let bytes = self.take(2)?;
                *value = u16::from_le_bytes([bytes[0], bytes[1]]);
                Ok(())
            }
        }
    }

    /// Transfer a signed 32-bit integer.
    pub fn xfer_i32(&mut self, value: &mut i32) -> Result<(), XferError> {
        match self.mode {
            XferMode::Save => {
                self.buf.extend_from_slice(&value.to_le_bytes());
                Ok(())
            }
            XferMode::Load => {
                let bytes = self.take(4)?;
                *value = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                Ok(())
            }
        }
    }

    /// Transfer an unsigned 32-bit integer.
    pub fn xfer_u32(&mut self, value: &mut u32) -> Result<(), XferError> {
        match self.mode {
            XferMode::Save => {
                self.buf.extend_from_slice(&value.to_le_bytes());
                Ok(())
            }
            XferMode::Load => {
                let bytes = self.take(4)?;
                *value = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                Ok(())
            }
        }
    }

    /// Transfer an unsigned 64-bit integer.
    pub fn xfer_u64(&mut self, value: &mut u64) -> Result<(), XferError> {
        match self.mode {
            XferMode::Save => {
                self.buf.extend_from_slice(&value.to_le_bytes());
                Ok(())
            }
            XferMode::Load => {
                let bytes = self.take(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                *value = u64::from_le_bytes(raw);
                Ok(())
            }
        }
    }

    /// Transfer a fixed-point value as its raw 64-bit representation.
    pub fn xfer_real(&mut self, value: &mut Fixed) -> Result<(), XferError> {
        let mut bits = value.to_bits() as u64;
        self.xfer_u64(&mut bits)?;
        if self.mode == XferMode::Load {
            *value = Fixed::from_bits(bits as i64);
        }
        Ok(())
    }

    /// Transfer an opaque fixed-size byte blob.
    pub fn xfer_bytes(&mut self, value: &mut [u8]) -> Result<(), XferError> {
        match self.mode {
            XferMode::Save => {
                self.buf.extend_from_slice(value);
                Ok(())
            }
            XferMode::Load => {
                let bytes = self.take(value.len())?;
                value.copy_from_slice(bytes);
                Ok(())
            }
        }
    }

    /// Transfer an 8-bit-char string: u16 byte count, then UTF-8 bytes.
    pub fn xfer_ascii_string(&mut self, value: &mut String) -> Result<(), XferError> {
        match self.mode {
            XferMode::Save => {
                let len = value.len();
                let count =
                    u16::try_from(len).map_err(|_| XferError::StringTooLong(len))?;
                self.buf.extend_from_slice(&count.to_le_bytes());
                self.buf.extend_from_slice(value.as_bytes());
                Ok(())
            }
            XferMode::Load => {
                let mut count = 0u16;
                self.xfer_u16(&mut count)?;
                let bytes = self.take(usize::from(count))?.to_vec();
                *value = String::from_utf8(bytes).map_err(|_| XferError::InvalidUtf8)?;
                Ok(())
            }
        }
    }

    /// Transfer a 16-bit-char string: u16 unit count, then UTF-16 units.
    pub fn xfer_unicode_string(&mut self, value: &mut String) -> Result<(), XferError> {
        match self.mode {
            XferMode::Save => {
                let units: Vec<u16> = value.encode_utf16().collect();
                let count =
                    u16::try_from(units.len()).map_err(|_| XferError::StringTooLong(units.len()))?;
                self.buf.extend_from_slice(&count.to_le_bytes());
                for unit in units {
                    self.buf.extend_from_slice(&unit.to_le_bytes());
                }
                Ok(())
            }
            XferMode::Load => {
                let mut count = 0u16;
                self.xfer_u16(&mut count)?;
                let mut units = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    let mut unit = 0u16;
                    self.xfer_u16(&mut unit)?;
                    units.push(unit);
                }
                *value = String::from_utf16(&units).map_err(|_| XferError::InvalidUtf16)?;
                Ok(())
            }
        }
    }

    /// Transfer a u16 element count for a sequence.
    ///
    /// Save mode writes `actual` and returns it; load mode reads the
    /// persisted count. Callers then loop exactly that many times in both
    /// modes, which keeps the two directions structurally identical.
    pub fn xfer_count(&mut self, actual: usize) -> Result<u16, XferError> {
        let mut count = match self.mode {
            XferMode::Save => {
                u16::try_from(actual).map_err(|_| XferError::CountTooLarge(actual))?
            }
            XferMode::Load => 0,
        };
        self.xfer_u16(&mut count)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_roundtrip() {
        let mut save = Xfer::saver();
        let mut flag = true;
        let mut small = 0x1234u16;
        let mut signed = -42i32;
        let mut wide = 0xDEAD_BEEF_u32;
        let mut real = Fixed::from_num(1.5);
        save.xfer_bool(&mut flag).unwrap();
        save.xfer_u16(&mut small).unwrap();
        save.xfer_i32(&mut signed).unwrap();
        save.xfer_u32(&mut wide).unwrap();
        save.xfer_real(&mut real).unwrap();

        let mut load = Xfer::loader(save.into_bytes());
        let mut flag2 = false;
        let mut small2 = 0u16;
        let mut signed2 = 0i32;
        let mut wide2 = 0u32;
        let mut real2 = Fixed::ZERO;
        load.xfer_bool(&mut flag2).unwrap();
        load.xfer_u16(&mut small2).unwrap();
        load.xfer_i32(&mut signed2).unwrap();
        load.xfer_u32(&mut wide2).unwrap();
        load.xfer_real(&mut real2).unwrap();

        assert!(flag2);
        assert_eq!(small2, 0x1234);
        assert_eq!(signed2, -42);
        assert_eq!(wide2, 0xDEAD_BEEF);
        assert_eq!(real2, Fixed::from_num(1.5));
        assert_eq!(load.remaining(), 0);
    }

    #[test]
    fn test_string_roundtrip() {
        let mut save = Xfer::saver();
        let mut ascii = String::from("UpgradeNationalism");
        let mut unicode = String::from("General \u{4e2d}");
        save.xfer_ascii_string(&mut ascii).unwrap();
        save.xfer_unicode_string(&mut unicode).unwrap();

        let mut load = Xfer::loader(save.into_bytes());
        let mut ascii2 = String::new();
        let mut unicode2 = String::new();
        load.xfer_ascii_string(&mut ascii2).unwrap();
        load.xfer_unicode_string(&mut unicode2).unwrap();

        assert_eq!(ascii2, "UpgradeNationalism");
        assert_eq!(unicode2, "General \u{4e2d}");
    }

    #[test]
    fn test_version_too_new_rejected() {
        let mut save = Xfer::saver();
        let mut version = 9u8;
        save.xfer_version(&mut version, 9).unwrap();

        let mut load = Xfer::loader(save.into_bytes());
        let mut decoded = 8u8;
        let err = load.xfer_version(&mut decoded, 8).unwrap_err();
        assert!(matches!(
            err,
            XferError::VersionTooNew {
                found: 9,
                current: 8
            }
        ));
    }

    #[test]
    fn test_truncated_stream_is_error() {
        let mut load = Xfer::loader(vec![0x01, 0x02]);
        let mut value = 0i32;
        let err = load.xfer_i32(&mut value).unwrap_err();
        assert!(matches!(err, XferError::EndOfStream { needed: 4, .. }));
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let mut load = Xfer::loader(vec![0x07]);
        let mut value = false;
        assert!(matches!(
            load.xfer_bool(&mut value),
            Err(XferError::InvalidBool(0x07))
        ));
    }

    #[test]
    fn test_real_roundtrip_is_bit_exact() {
        let original = Fixed::from_num(0.1) * Fixed::from_num(1.2);
        let mut save = Xfer::saver();
        let mut value = original;
        save.xfer_real(&mut value).unwrap();

        let mut load = Xfer::loader(save.into_bytes());
        let mut decoded = Fixed::ZERO;
        load.xfer_real(&mut decoded).unwrap();
        assert_eq!(decoded.to_bits(), original.to_bits());
    }
}
