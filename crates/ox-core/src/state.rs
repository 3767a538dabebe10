//! Save state buffers and section cursors
//!
//! The layout of a save state belongs to the core. These helpers give cores
//! a little-endian cursor that reports failures in the contract's error
//! taxonomy, and give frontends a buffer that is allocated once per game.

use crate::error::SerializeError;

/// Frontend-owned save state storage
///
/// Sized from the first `serialize_size` query after load. Because that size
/// never grows while the game stays loaded, one allocation serves every
/// later save.
#[derive(Debug, Clone, Default)]
pub struct SaveStateBuffer {
    data: Vec<u8>,
}

impl SaveStateBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Writes a save state into a caller-provided buffer
pub struct StateWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> StateWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SerializeError> {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(SerializeError::ShortBuffer {
                needed: end,
                got: self.buf.len(),
            });
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// Magic tag followed by a format version
    pub fn header(&mut self, magic: [u8; 4], version: u32) -> Result<(), SerializeError> {
        self.write_bytes(&magic)?;
        self.write_u32(version)
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), SerializeError> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), SerializeError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), SerializeError> {
        self.write_bytes(&value.to_le_bytes())
    }
}

/// Reads a save state written by [`StateWriter`]
///
/// Running out of bytes means the state is malformed, so it is reported as
/// [`SerializeError::Unknown`]; the host has already checked the length
/// precondition by the time a core starts reading.
pub struct StateReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> StateReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], SerializeError> {
        let buf: &'a [u8] = self.buf;
        let pos = self.pos;
        let bytes = buf
            .get(pos..pos + len)
            .ok_or_else(|| SerializeError::Unknown(format!("state truncated at offset {}", pos)))?;
        let end = pos + len;
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_into(&mut self, out: &mut [u8]) -> Result<(), SerializeError> {
        out.copy_from_slice(self.read_bytes(out.len())?);
        Ok(())
    }

    /// Check the magic tag and version
    pub fn expect_header(&mut self, magic: [u8; 4], version: u32) -> Result<(), SerializeError> {
        let found = self.read_bytes(4)?;
        if found != magic {
            return Err(SerializeError::Unknown(format!(
                "bad state magic {:02x?}",
                found
            )));
        }
        let found = self.read_u32()?;
        if found != version {
            return Err(SerializeError::Unknown(format!(
                "unsupported state version {} (expected {})",
                found, version
            )));
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, SerializeError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, SerializeError> {
        let mut buf = [0u8; 2];
        self.read_into(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32(&mut self) -> Result<u32, SerializeError> {
        let mut buf = [0u8; 4];
        self.read_into(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGIC: [u8; 4] = *b"TEST";

    #[test]
    fn test_writer_reports_short_buffer() {
        let mut buf = [0u8; 10];
        let mut writer = StateWriter::new(&mut buf);
        writer.header(MAGIC, 1).unwrap();
        assert_eq!(
            writer.write_u32(7),
            Err(SerializeError::ShortBuffer { needed: 12, got: 10 })
        );
        assert_eq!(writer.position(), 8);
    }

    #[test]
    fn test_reader_parses_writer_output() {
        let mut buf = [0u8; 32];
        let mut writer = StateWriter::new(&mut buf);
        writer.header(MAGIC, 2).unwrap();
        writer.write_u16(0xBEEF).unwrap();
        writer.write_u32(42).unwrap();
        writer.write_u8(1).unwrap();

        let mut reader = StateReader::new(&buf);
        reader.expect_header(MAGIC, 2).unwrap();
        assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
        assert_eq!(reader.read_u32().unwrap(), 42);
        assert_eq!(reader.read_u8().unwrap(), 1);
    }

    #[test]
    fn test_reader_rejects_bad_header() {
        let buf = [0u8; 16];
        let mut reader = StateReader::new(&buf);
        assert!(matches!(
            reader.expect_header(MAGIC, 1),
            Err(SerializeError::Unknown(_))
        ));
    }

    #[test]
    fn test_reader_truncation_is_unknown() {
        let buf = [1u8; 3];
        let mut reader = StateReader::new(&buf);
        assert!(matches!(reader.read_u32(), Err(SerializeError::Unknown(_))));
    }
}
