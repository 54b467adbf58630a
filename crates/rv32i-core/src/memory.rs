//! Byte-addressable simulated memory.
//!
//! Multi-byte accesses are little-endian and composed from the byte-level
//! accessors, so every width shares one bounds check and one warning path.
//! Out-of-range addresses never stop the simulation: reads produce 0 and
//! writes are dropped, each with a warning on stdout.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use crate::hex::{to_hex0x32, to_hex32, to_hex8};

/// Fill byte for freshly constructed memory, chosen to make uninitialized
/// reads visually distinct from zero.
pub const FILL_BYTE: u8 = 0xa5;

/// Failure while loading a program image into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image file could not be read.
    #[error("Can't open file '{path}' for reading.")]
    FileUnreadable {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The image has more bytes than the configured memory.
    #[error("Program too big.")]
    ProgramTooBig {
        /// Length of the rejected image in bytes.
        image: usize,
        /// Addressable bytes available.
        capacity: usize,
    },
}

/// Flat byte-addressable store with little-endian multi-width access.
///
/// The requested size is rounded up to the next multiple of 16 at
/// construction and never changes afterwards; every byte starts as
/// [`FILL_BYTE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    mem: Vec<u8>,
}

impl Memory {
    /// Creates a memory of `size` bytes, rounded up to a multiple of 16.
    #[must_use]
    pub fn new(size: u32) -> Self {
        let rounded = size.wrapping_add(15) & 0xffff_fff0;
        Self {
            mem: vec![FILL_BYTE; rounded as usize],
        }
    }

    /// Number of addressable bytes; always a multiple of 16.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn size(&self) -> u32 {
        self.mem.len() as u32
    }

    /// Warns on stdout and reports `true` when `addr` is outside memory.
    fn check_illegal(&self, addr: u32) -> bool {
        let illegal = addr as usize >= self.mem.len();
        if illegal {
            println!("WARNING: Address out of range: {}", to_hex0x32(addr));
        }
        illegal
    }

    /// Reads one byte; out-of-range reads warn and return 0.
    #[must_use]
    pub fn get8(&self, addr: u32) -> u8 {
        if self.check_illegal(addr) {
            0
        } else {
            self.mem[addr as usize]
        }
    }

    /// Reads a little-endian halfword composed of two byte reads.
    #[must_use]
    pub fn get16(&self, addr: u32) -> u16 {
        u16::from(self.get8(addr)) | (u16::from(self.get8(addr.wrapping_add(1))) << 8)
    }

    /// Reads a little-endian word composed of two halfword reads.
    #[must_use]
    pub fn get32(&self, addr: u32) -> u32 {
        u32::from(self.get16(addr)) | (u32::from(self.get16(addr.wrapping_add(2))) << 16)
    }

    /// Reads one byte sign-extended to 32 bits.
    #[must_use]
    pub fn get8_sx(&self, addr: u32) -> i32 {
        (i32::from(self.get8(addr)) << 24) >> 24
    }

    /// Reads a halfword sign-extended to 32 bits.
    #[must_use]
    pub fn get16_sx(&self, addr: u32) -> i32 {
        (i32::from(self.get16(addr)) << 16) >> 16
    }

    /// Reads a word reinterpreted as signed.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn get32_sx(&self, addr: u32) -> i32 {
        self.get32(addr) as i32
    }

    /// Writes one byte; out-of-range writes warn and are dropped.
    pub fn set8(&mut self, addr: u32, val: u8) {
        if !self.check_illegal(addr) {
            self.mem[addr as usize] = val;
        }
    }

    /// Writes a halfword as two little-endian byte writes.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set16(&mut self, addr: u32, val: u16) {
        self.set8(addr, (val & 0xff) as u8);
        self.set8(addr.wrapping_add(1), (val >> 8) as u8);
    }

    /// Writes a word as two little-endian halfword writes.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set32(&mut self, addr: u32, val: u32) {
        self.set16(addr, (val & 0xffff) as u16);
        self.set16(addr.wrapping_add(2), (val >> 16) as u16);
    }

    /// Copies `image` into memory starting at address 0.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ProgramTooBig`] without writing anything when
    /// the image does not fit.
    pub fn load(&mut self, image: &[u8]) -> Result<(), LoadError> {
        if image.len() > self.mem.len() {
            return Err(LoadError::ProgramTooBig {
                image: image.len(),
                capacity: self.mem.len(),
            });
        }
        self.mem[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Reads `path` and loads its bytes at address 0.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::FileUnreadable`] when the file cannot be read
    /// and [`LoadError::ProgramTooBig`] when its contents do not fit.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        let image = fs::read(path).map_err(|source| LoadError::FileUnreadable {
            path: path.display().to_string(),
            source,
        })?;
        self.load(&image)
    }

    /// Writes the canonical memory dump: 16 bytes per line with the address
    /// up front, an extra space after the eighth byte, and a printable-ASCII
    /// gutter between `*` delimiters.
    ///
    /// # Errors
    ///
    /// Propagates failures from the sink.
    #[allow(clippy::cast_possible_truncation)]
    pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        for (line, chunk) in self.mem.chunks(16).enumerate() {
            write!(out, "{}: ", to_hex32(line as u32 * 16))?;
            for (i, byte) in chunk.iter().enumerate() {
                write!(out, "{} ", to_hex8(*byte))?;
                if i == 7 {
                    write!(out, " ")?;
                }
            }
            write!(out, "*")?;
            for byte in chunk {
                let ch = if byte.is_ascii_graphic() || *byte == b' ' {
                    *byte as char
                } else {
                    '.'
                };
                write!(out, "{ch}")?;
            }
            writeln!(out, "*")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadError, Memory, FILL_BYTE};

    #[test]
    fn size_rounds_up_to_multiple_of_16() {
        assert_eq!(Memory::new(0x100).size(), 0x100);
        assert_eq!(Memory::new(0x101).size(), 0x110);
        assert_eq!(Memory::new(1).size(), 16);
        assert_eq!(Memory::new(0).size(), 0);
    }

    #[test]
    fn fresh_memory_is_filled_with_sentinel() {
        let mem = Memory::new(32);
        for addr in 0..32 {
            assert_eq!(mem.get8(addr), FILL_BYTE);
        }
    }

    #[test]
    fn byte_round_trip() {
        let mut mem = Memory::new(16);
        mem.set8(3, 0x7b);
        assert_eq!(mem.get8(3), 0x7b);
    }

    #[test]
    fn multi_width_accesses_are_little_endian() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0xdead_beef);
        assert_eq!(mem.get8(0), 0xef);
        assert_eq!(mem.get8(1), 0xbe);
        assert_eq!(mem.get8(2), 0xad);
        assert_eq!(mem.get8(3), 0xde);
        assert_eq!(mem.get16(0), 0xbeef);
        assert_eq!(mem.get16(2), 0xdead);
        assert_eq!(mem.get32(0), 0xdead_beef);
    }

    #[test]
    fn sign_extension_reads() {
        let mut mem = Memory::new(16);
        mem.set8(0, 0x80);
        assert_eq!(mem.get8_sx(0), -128);
        mem.set8(1, 0x7f);
        assert_eq!(mem.get8_sx(1), 127);
        mem.set16(2, 0x8000);
        assert_eq!(mem.get16_sx(2), -32_768);
        mem.set32(4, 0xffff_ffff);
        assert_eq!(mem.get32_sx(4), -1);
    }

    #[test]
    fn out_of_range_reads_return_zero() {
        let mem = Memory::new(16);
        assert_eq!(mem.get8(16), 0);
        assert_eq!(mem.get8(0xffff_ffff), 0);
        assert_eq!(mem.get16(16), 0);
        assert_eq!(mem.get32(0x1_0000), 0);
    }

    #[test]
    fn out_of_range_writes_are_dropped() {
        let mut mem = Memory::new(16);
        let before = mem.clone();
        mem.set8(16, 0x42);
        mem.set16(0x100, 0x4242);
        mem.set32(0xffff_fffc, 0x4242_4242);
        assert_eq!(mem, before);
    }

    #[test]
    fn straddling_write_keeps_in_range_bytes() {
        // The last in-range byte takes its half of the halfword; the rest
        // falls outside and is dropped.
        let mut mem = Memory::new(16);
        mem.set16(15, 0xbbaa);
        assert_eq!(mem.get8(15), 0xaa);
        assert_eq!(mem.get8(16), 0);
    }

    #[test]
    fn load_copies_image_from_zero() {
        let mut mem = Memory::new(16);
        mem.load(&[1, 2, 3]).unwrap();
        assert_eq!(mem.get8(0), 1);
        assert_eq!(mem.get8(1), 2);
        assert_eq!(mem.get8(2), 3);
        assert_eq!(mem.get8(3), FILL_BYTE);
    }

    #[test]
    fn oversized_image_is_rejected_untouched() {
        let mut mem = Memory::new(16);
        let image = vec![0u8; 17];
        match mem.load(&image) {
            Err(LoadError::ProgramTooBig { image: 17, capacity: 16 }) => {}
            other => panic!("expected ProgramTooBig, got {other:?}"),
        }
        assert_eq!(mem.get8(0), FILL_BYTE);
    }

    #[test]
    fn load_file_reports_missing_path() {
        let mut mem = Memory::new(16);
        let err = mem
            .load_file("/nonexistent/definitely-missing.bin")
            .unwrap_err();
        assert!(err.to_string().starts_with("Can't open file '"));
    }

    #[test]
    fn dump_renders_sixteen_bytes_per_line() {
        let mut mem = Memory::new(32);
        mem.load(b"hello").unwrap();
        let mut out = Vec::new();
        mem.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "00000000: 68 65 6c 6c 6f a5 a5 a5  a5 a5 a5 a5 a5 a5 a5 a5 *hello...........*"
        );
        assert_eq!(
            lines[1],
            "00000010: a5 a5 a5 a5 a5 a5 a5 a5  a5 a5 a5 a5 a5 a5 a5 a5 *................*"
        );
    }
}
