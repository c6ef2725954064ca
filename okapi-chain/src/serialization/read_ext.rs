use std::io;

use byteorder::{LittleEndian, ReadBytesExt};

use super::SerializationError;

/// Extends [`io::Read`] with methods for reading canonical Okapi types.
///
/// Unlike plain reads, the compact-integer readers validate canonicity: an
/// integer written in a longer layout than necessary is a parse error, not
/// an alternative spelling.
pub trait ReadLedgerExt: io::Read {
    /// Read an unsigned integer in canonical compact form.
    #[inline]
    fn read_compact_u64(&mut self) -> Result<u64, SerializationError> {
        let n = match self.read_u8()? {
            flag @ 0x00..=0xfc => flag as u64,
            0xfd => {
                let n = self.read_u16::<LittleEndian>()? as u64;
                if n < 0xfd {
                    return Err(SerializationError::Parse(
                        "non-canonical compact integer",
                    ));
                }
                n
            }
            0xfe => {
                let n = self.read_u32::<LittleEndian>()? as u64;
                if n < 0x1_0000 {
                    return Err(SerializationError::Parse(
                        "non-canonical compact integer",
                    ));
                }
                n
            }
            0xff => {
                let n = self.read_u64::<LittleEndian>()?;
                if n < 0x1_0000_0000 {
                    return Err(SerializationError::Parse(
                        "non-canonical compact integer",
                    ));
                }
                n
            }
        };
        Ok(n)
    }

    /// Read a signed integer from the compact form of its zigzag encoding.
    #[inline]
    fn read_compact_i64(&mut self) -> Result<i64, SerializationError> {
        let n = self.read_compact_u64()?;
        Ok(((n >> 1) as i64) ^ -((n & 1) as i64))
    }

    /// Convenience method to read a `[u8; 28]`.
    #[inline]
    fn read_28_bytes(&mut self) -> io::Result<[u8; 28]> {
        let mut bytes = [0; 28];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Convenience method to read a `[u8; 32]`.
    #[inline]
    fn read_32_bytes(&mut self) -> io::Result<[u8; 32]> {
        let mut bytes = [0; 32];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Convenience method to read a `[u8; 64]`.
    #[inline]
    fn read_64_bytes(&mut self) -> io::Result<[u8; 64]> {
        let mut bytes = [0; 64];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

/// Mark all types implementing `Read` as implementing the extension.
impl<R: io::Read + ?Sized> ReadLedgerExt for R {}
