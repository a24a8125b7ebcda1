//! Canonical binary encoding used by the chain (BCS): little-endian fixed
//! width integers, single-byte booleans, ULEB128 lengths, no padding.

use crate::errors::{AppError, Result};

/// Cursor over a byte slice. Every read checks the remaining length.
pub struct BcsReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BcsReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(AppError::Decode(format!(
                "{what}: need {n} bytes at offset {}, {} left",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1, "u8")?[0])
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array("u64")?))
    }

    pub fn read_u128(&mut self) -> Result<u128> {
        Ok(u128::from_le_bytes(self.array("u128")?))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.take(1, "bool")?[0] {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(AppError::Decode(format!(
                "invalid bool byte {b:#04x} at offset {}",
                self.pos - 1
            ))),
        }
    }

    pub fn read_address(&mut self) -> Result<[u8; 32]> {
        self.array("address")
    }

    /// ULEB128 length prefix, bounded to `u32` as the chain requires.
    pub fn read_uleb128(&mut self) -> Result<usize> {
        let mut value: u64 = 0;
        for shift in (0..35).step_by(7) {
            let byte = self.take(1, "uleb128")?[0];
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                if value > u64::from(u32::MAX) {
                    break;
                }
                return Ok(value as usize);
            }
        }
        Err(AppError::Decode(format!(
            "uleb128 length overflows u32 at offset {}",
            self.pos
        )))
    }

    /// Read a vector length and check `len` elements of at least
    /// `min_element_size` bytes can fit in what is left.
    pub fn read_len(&mut self, min_element_size: usize) -> Result<usize> {
        let len = self.read_uleb128()?;
        let needed = len.saturating_mul(min_element_size);
        if needed > self.remaining() {
            return Err(AppError::Decode(format!(
                "vector of {len} elements needs {needed} bytes, {} left",
                self.remaining()
            )));
        }
        Ok(len)
    }

    /// Fail if any bytes were left unread.
    pub fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(AppError::Decode(format!("{n} trailing bytes"))),
        }
    }
}

/// Append-only encoder mirroring [`BcsReader`].
#[derive(Default)]
pub struct BcsWriter {
    buf: Vec<u8>,
}

impl BcsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn write_u16(&mut self, v: u16) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn write_u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn write_u128(&mut self, v: u128) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn write_bool(&mut self, v: bool) -> &mut Self {
        self.buf.push(u8::from(v));
        self
    }

    pub fn write_address(&mut self, v: &[u8; 32]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    pub fn write_uleb128(&mut self, mut v: usize) -> &mut Self {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                self.buf.push(byte);
                return self;
            }
            self.buf.push(byte | 0x80);
        }
    }

    /// Length-prefixed byte vector.
    pub fn write_bytes(&mut self, v: &[u8]) -> &mut Self {
        self.write_uleb128(v.len());
        self.buf.extend_from_slice(v);
        self
    }

    pub fn write_str(&mut self, v: &str) -> &mut Self {
        self.write_bytes(v.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uleb128_multi_byte() {
        let mut w = BcsWriter::new();
        w.write_uleb128(300).write_uleb128(0).write_uleb128(127);
        let bytes = w.into_bytes();
        assert_eq!(bytes, vec![0xac, 0x02, 0x00, 0x7f]);

        let mut r = BcsReader::new(&bytes);
        assert_eq!(r.read_uleb128().unwrap(), 300);
        assert_eq!(r.read_uleb128().unwrap(), 0);
        assert_eq!(r.read_uleb128().unwrap(), 127);
        r.finish().unwrap();
    }

    #[test]
    fn uleb128_overflow_rejected() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0x7f];
        assert!(BcsReader::new(&bytes).read_uleb128().is_err());
        let endless = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert!(BcsReader::new(&endless).read_uleb128().is_err());
    }

    #[test]
    fn integers_are_little_endian() {
        let bytes = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02];
        assert_eq!(BcsReader::new(&bytes).read_u64().unwrap(), 0x0200_0000_0000_0001);
    }

    #[test]
    fn short_buffer_and_bad_bool_fail() {
        assert!(matches!(BcsReader::new(&[1, 2, 3]).read_u64(), Err(AppError::Decode(_))));
        assert!(matches!(BcsReader::new(&[2]).read_bool(), Err(AppError::Decode(_))));
    }

    #[test]
    fn trailing_bytes_detected() {
        let mut r = BcsReader::new(&[1, 0]);
        assert!(r.read_bool().unwrap());
        assert!(r.finish().is_err());
    }
}
