// lzw.rs
//
// Copyright (c) 2020-2025  Douglas Lau
//
//! Lempel-Ziv-Welch compression for GIF image data
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Code type
type Code = u16;

/// Maximum code bits allowed for GIF
const MAX_CODE_BITS: u8 = 12;

/// Maximum number of dictionary entries
const MAX_ENTRIES: usize = 1 << MAX_CODE_BITS;

/// Variable-width code packer (least significant bit first)
#[derive(Debug, Default)]
struct BitPacker {
    /// Pending bits
    bits: u32,
    /// Number of pending bits
    n_bits: u8,
}

impl BitPacker {
    /// Pack one code into a buffer
    fn pack(&mut self, code: Code, width: u8, buffer: &mut Vec<u8>) {
        self.bits |= u32::from(code) << self.n_bits;
        self.n_bits += width;
        while self.n_bits >= 8 {
            buffer.push(self.bits as u8);
            self.bits >>= 8;
            self.n_bits -= 8;
        }
    }

    /// Flush a partial byte
    fn flush(&mut self, buffer: &mut Vec<u8>) {
        if self.n_bits > 0 {
            buffer.push(self.bits as u8);
        }
        self.bits = 0;
        self.n_bits = 0;
    }
}

/// LZW data compressor
pub struct Compressor {
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code width
    code_bits: u8,
    /// Dictionary of (prefix, byte) strings
    dict: HashMap<(Code, u8), Code>,
    /// Next available code
    next_code: Code,
    /// Bit packer
    packer: BitPacker,
}

impl Compressor {
    /// Create a new compressor
    pub fn new(min_code_bits: u8) -> Self {
        let min_code_bits = min_code_bits.clamp(2, 8);
        let mut compressor = Compressor {
            min_code_bits,
            code_bits: min_code_bits + 1,
            dict: HashMap::new(),
            next_code: 0,
            packer: BitPacker::default(),
        };
        compressor.reset();
        compressor
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Reset the dictionary
    fn reset(&mut self) {
        self.dict.clear();
        self.next_code = self.end_code() + 1;
        self.code_bits = self.min_code_bits + 1;
    }

    /// Emit one code
    fn emit(&mut self, code: Code, buffer: &mut Vec<u8>) {
        self.packer.pack(code, self.code_bits, buffer);
    }

    /// Compress a byte buffer, including clear and end codes
    pub fn compress(&mut self, bytes: &[u8], buffer: &mut Vec<u8>) {
        self.emit(self.clear_code(), buffer);
        let mut prefix: Option<Code> = None;
        for &byte in bytes {
            let code = match prefix {
                None => Code::from(byte),
                Some(p) => match self.dict.get(&(p, byte)) {
                    Some(&code) => code,
                    None => {
                        self.emit(p, buffer);
                        self.insert(p, byte, buffer);
                        Code::from(byte)
                    }
                },
            };
            prefix = Some(code);
        }
        if let Some(p) = prefix {
            self.emit(p, buffer);
        }
        self.emit(self.end_code(), buffer);
        self.packer.flush(buffer);
    }

    /// Insert a string into the dictionary (or clear a full dictionary)
    fn insert(&mut self, prefix: Code, byte: u8, buffer: &mut Vec<u8>) {
        if usize::from(self.next_code) < MAX_ENTRIES {
            self.dict.insert((prefix, byte), self.next_code);
            self.next_code += 1;
            if self.next_code > 1 << self.code_bits
                && self.code_bits < MAX_CODE_BITS
            {
                self.code_bits += 1;
            }
        } else {
            self.emit(self.clear_code(), buffer);
            self.reset();
        }
    }
}

/// Dictionary entry for decompression
#[derive(Clone, Copy, Debug)]
struct Entry {
    /// Prefix code
    prefix: Option<Code>,
    /// Last byte of string
    byte: u8,
}

/// LZW data decompressor
#[derive(Debug)]
pub struct Decompressor {
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code width
    code_bits: u8,
    /// Dictionary entries
    table: Vec<Entry>,
    /// Previous code
    last: Option<Code>,
    /// Pending bits
    bits: u32,
    /// Number of pending bits
    n_bits: u8,
    /// End code received
    done: bool,
}

impl Decompressor {
    /// Create a new decompressor
    pub fn new(min_code_bits: u8) -> Self {
        let min_code_bits = min_code_bits.clamp(2, 8);
        let mut decompressor = Decompressor {
            min_code_bits,
            code_bits: min_code_bits + 1,
            table: Vec::with_capacity(MAX_ENTRIES),
            last: None,
            bits: 0,
            n_bits: 0,
            done: false,
        };
        decompressor.reset();
        decompressor
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Reset the dictionary
    fn reset(&mut self) {
        self.table.clear();
        for byte in 0..self.clear_code() {
            self.table.push(Entry {
                prefix: None,
                byte: byte as u8,
            });
        }
        // clear and end codes
        self.table.push(Entry { prefix: None, byte: 0 });
        self.table.push(Entry { prefix: None, byte: 0 });
        self.code_bits = self.min_code_bits + 1;
        self.last = None;
    }

    /// Check whether the end code has been received
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Decompress a byte buffer
    pub fn decompress(
        &mut self,
        bytes: &[u8],
        buffer: &mut Vec<u8>,
    ) -> Result<()> {
        for &byte in bytes {
            if self.done {
                break;
            }
            self.bits |= u32::from(byte) << self.n_bits;
            self.n_bits += 8;
            while self.n_bits >= self.code_bits && !self.done {
                let mask = (1 << self.code_bits) - 1;
                let code = (self.bits & mask) as Code;
                self.bits >>= self.code_bits;
                self.n_bits -= self.code_bits;
                self.decompress_code(code, buffer)?;
            }
        }
        Ok(())
    }

    /// Decompress one code
    fn decompress_code(
        &mut self,
        code: Code,
        buffer: &mut Vec<u8>,
    ) -> Result<()> {
        if code == self.clear_code() {
            self.reset();
            return Ok(());
        }
        if code == self.end_code() {
            self.done = true;
            return Ok(());
        }
        let next_code = self.table.len();
        let start = buffer.len();
        match self.last {
            None => {
                if code >= self.clear_code() {
                    return Err(Error::InvalidLzwData);
                }
                buffer.push(code as u8);
            }
            Some(last) => {
                let code_idx = usize::from(code);
                if code_idx < next_code {
                    self.push_string(code, buffer);
                    let first = buffer[start];
                    self.add_entry(last, first);
                } else if code_idx == next_code {
                    self.push_string(last, buffer);
                    let first = buffer[start];
                    buffer.push(first);
                    self.add_entry(last, first);
                } else {
                    return Err(Error::InvalidLzwData);
                }
            }
        }
        self.last = Some(code);
        Ok(())
    }

    /// Push the string for a code into a buffer
    fn push_string(&self, code: Code, buffer: &mut Vec<u8>) {
        let start = buffer.len();
        let mut entry = self.table[usize::from(code)];
        while let Some(prefix) = entry.prefix {
            buffer.push(entry.byte);
            entry = self.table[usize::from(prefix)];
        }
        buffer.push(entry.byte);
        buffer[start..].reverse();
    }

    /// Add a dictionary entry
    fn add_entry(&mut self, prefix: Code, byte: u8) {
        if self.table.len() < MAX_ENTRIES {
            self.table.push(Entry {
                prefix: Some(prefix),
                byte,
            });
            if self.table.len() == 1 << self.code_bits
                && self.code_bits < MAX_CODE_BITS
            {
                self.code_bits += 1;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip(min_code_bits: u8, data: &[u8]) {
        let mut compressed = vec![];
        Compressor::new(min_code_bits).compress(data, &mut compressed);
        let mut dec = Decompressor::new(min_code_bits);
        let mut out = vec![];
        dec.decompress(&compressed, &mut out).unwrap();
        assert!(dec.is_done());
        assert_eq!(&out[..], data);
    }

    #[test]
    fn small() {
        round_trip(2, &[0, 1, 2, 3, 3, 3, 3, 3, 0, 1, 2, 3]);
        round_trip(2, &[1]);
        round_trip(2, &[]);
    }

    #[test]
    fn repeating() {
        round_trip(2, &[2; 1000]);
        round_trip(8, &[0x55; 70_000]);
    }

    #[test]
    fn dictionary_reset() {
        let data: Vec<u8> = (0..100_000u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
            .collect();
        round_trip(8, &data);
        let data: Vec<u8> = data.iter().map(|b| b & 0x0F).collect();
        round_trip(4, &data);
    }

    #[test]
    fn known_stream() {
        // 10x10 image from the GIF89a sample
        let compressed = [
            0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02,
            0x75, 0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91,
            0x4C, 0x01,
        ];
        let mut dec = Decompressor::new(2);
        let mut out = vec![];
        dec.decompress(&compressed, &mut out).unwrap();
        assert!(dec.is_done());
        assert_eq!(out.len(), 100);
        assert_eq!(&out[..10], &[1, 1, 1, 1, 1, 2, 2, 2, 2, 2]);
        assert_eq!(&out[30..40], &[1, 1, 1, 0, 0, 0, 0, 2, 2, 2]);
    }

    #[test]
    fn invalid_code() {
        // clear code followed by a code past the end of the table
        let mut dec = Decompressor::new(2);
        let mut out = vec![];
        assert!(dec.decompress(&[0x3C], &mut out).is_err());
    }
}
