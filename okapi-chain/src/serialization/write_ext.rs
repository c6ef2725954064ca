use std::io;

use byteorder::{LittleEndian, WriteBytesExt};

/// Extends [`io::Write`] with methods for writing canonical Okapi types.
pub trait WriteLedgerExt: io::Write {
    /// Write an unsigned integer in canonical compact form.
    ///
    /// The compact form is the shortest of four layouts: a single byte below
    /// `0xfd`, or a `0xfd`/`0xfe`/`0xff` marker followed by a little-endian
    /// `u16`/`u32`/`u64`. Because the writer always picks the shortest
    /// layout, every integer has exactly one encoding.
    #[inline]
    fn write_compact_u64(&mut self, n: u64) -> io::Result<()> {
        match n {
            0x0000_0000_0000_0000..=0x0000_0000_0000_00fc => self.write_u8(n as u8),
            0x0000_0000_0000_00fd..=0x0000_0000_0000_ffff => {
                self.write_u8(0xfd)?;
                self.write_u16::<LittleEndian>(n as u16)
            }
            0x0000_0000_0001_0000..=0x0000_0000_ffff_ffff => {
                self.write_u8(0xfe)?;
                self.write_u32::<LittleEndian>(n as u32)
            }
            _ => {
                self.write_u8(0xff)?;
                self.write_u64::<LittleEndian>(n)
            }
        }
    }

    /// Write a signed integer as the compact form of its zigzag encoding.
    ///
    /// Zigzag maps small magnitudes of either sign onto small unsigned
    /// integers, so the compact form stays short for the common cases.
    #[inline]
    fn write_compact_i64(&mut self, n: i64) -> io::Result<()> {
        self.write_compact_u64(((n as u64) << 1) ^ ((n >> 63) as u64))
    }

    /// Convenience method to write a `[u8; 28]`.
    #[inline]
    fn write_28_bytes(&mut self, bytes: &[u8; 28]) -> io::Result<()> {
        self.write_all(bytes)
    }

    /// Convenience method to write a `[u8; 32]`.
    #[inline]
    fn write_32_bytes(&mut self, bytes: &[u8; 32]) -> io::Result<()> {
        self.write_all(bytes)
    }

    /// Convenience method to write a `[u8; 64]`.
    #[inline]
    fn write_64_bytes(&mut self, bytes: &[u8; 64]) -> io::Result<()> {
        self.write_all(bytes)
    }
}

/// Mark all types implementing `Write` as implementing the extension.
impl<W: io::Write + ?Sized> WriteLedgerExt for W {}
