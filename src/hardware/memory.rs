use crate::errors::LoadImageError;
use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::io;
use std::io::Read;
use std::ops::{Index, IndexMut};
use std::path::Path;

pub const PROGRAM_SECTION_START: u16 = 0x3000;
pub const MEMORY_SIZE: usize = 1 << 16;

/// Memory regions mapped to IO functionality.
#[repr(u16)]
#[derive(enumn::N, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryMappedIOLocations {
    /// Keyboard Status Register
    Kbsr = 0xFE00,
    /// Keyboard Data Register
    Kbdr = 0xFE02,
}

impl MemoryMappedIOLocations {
    #[must_use]
    pub const fn address(self) -> u16 {
        self as u16
    }
}

/// Outcome of placing an image into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Address the first word was written to.
    pub origin: u16,
    pub words_loaded: usize,
    /// Words of the payload not fitting between `origin` and the end of memory.
    pub words_truncated: usize,
}

impl LoadReport {
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.words_truncated > 0
    }
}

/// The flat LC-3 address space of 65536 words.
///
/// Indexing gives raw access without memory mapped side effects,
/// [`Memory::read`] is what executing instructions use.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    /// Index equals memory address
    data: Box<[u16]>,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|w| **w != 0).count();
        write!(f, "Memory {{ non-zero words: {used} }}")
    }
}

impl Index<u16> for Memory {
    type Output = u16;
    fn index(&self, index: u16) -> &Self::Output {
        &self.data[usize::from(index)]
    }
}
impl IndexMut<u16> for Memory {
    fn index_mut(&mut self, index: u16) -> &mut Self::Output {
        &mut self.data[usize::from(index)]
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE].into_boxed_slice(),
        }
    }
    /// Zeroes every word.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Reads a word the way instructions do.
    ///
    /// The keyboard status register is one-shot: its value is returned and it is reset to 0.
    /// The keyboard data register reads like plain memory.
    pub fn read(&mut self, address: u16) -> u16 {
        match MemoryMappedIOLocations::n(address) {
            Some(MemoryMappedIOLocations::Kbsr) => std::mem::take(&mut self[address]),
            Some(MemoryMappedIOLocations::Kbdr) | None => self[address],
        }
    }
    /// Reads a word without memory mapped side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u16 {
        self[address]
    }
    pub fn write(&mut self, address: u16, value: u16) {
        self[address] = value;
    }

    /// Places `words` contiguously from `origin` on.
    /// Words that would run past the end of memory are dropped and counted.
    pub fn load_words(&mut self, origin: u16, words: &[u16]) -> LoadReport {
        let start = usize::from(origin);
        let room = MEMORY_SIZE - start;
        let words_loaded = words.len().min(room);
        self.data[start..start + words_loaded].copy_from_slice(&words[..words_loaded]);
        LoadReport {
            origin,
            words_loaded,
            words_truncated: words.len() - words_loaded,
        }
    }

    /// Loads an image: a big-endian origin followed by big-endian words.
    /// A trailing odd byte is ignored, words past the end of memory are only counted.
    ///
    /// # Errors
    /// - Image is shorter than the 2 byte origin
    pub fn load_image_bytes(&mut self, image: &[u8]) -> Result<LoadReport, LoadImageError> {
        let (header, payload) = image
            .split_first_chunk::<2>()
            .ok_or(LoadImageError::MissingOrigin {
                length: image.len(),
            })?;
        let origin = u16::from_be_bytes(*header);
        let room = MEMORY_SIZE - usize::from(origin);
        let words = decode_words(payload, room);
        let mut report = self.load_words(origin, &words);
        report.words_truncated = payload.len() / 2 - report.words_loaded;
        Ok(report)
    }

    /// Loads the image file at `path`, see [`Memory::load_image_bytes`] for the format.
    ///
    /// At most one address space worth of payload is read, so endless streams load too.
    /// Memory is only touched once the payload has been read.
    /// Truncated words are counted from the file length, for streams that are not regular
    /// files the count stops at [`TRUNCATION_SCAN_LIMIT`] bytes.
    ///
    /// # Errors
    /// - File cannot be opened or read
    /// - Image is shorter than the 2 byte origin
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, LoadImageError> {
        let path = path.as_ref();
        let read_error = |source| LoadImageError::Read {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::open(path).map_err(|source| LoadImageError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut header = Vec::with_capacity(2);
        file.by_ref()
            .take(2)
            .read_to_end(&mut header)
            .map_err(read_error)?;
        let header: [u8; 2] = header
            .as_slice()
            .try_into()
            .map_err(|_| LoadImageError::MissingOrigin {
                length: header.len(),
            })?;
        let origin = u16::from_be_bytes(header);

        let room = MEMORY_SIZE - usize::from(origin);
        let room_bytes = 2 * room;
        let mut payload = Vec::with_capacity(room_bytes);
        file.by_ref()
            .take(u64::try_from(room_bytes).unwrap_or(u64::MAX))
            .read_to_end(&mut payload)
            .map_err(read_error)?;
        let words_truncated = if payload.len() < room_bytes {
            0
        } else {
            remaining_words(&mut file, 2 + payload.len()).map_err(read_error)?
        };

        let words = decode_words(&payload, room);
        let mut report = self.load_words(origin, &words);
        report.words_truncated = words_truncated;
        Ok(report)
    }
}

/// Bytes scanned past the end of memory to count truncated words of a stream.
pub const TRUNCATION_SCAN_LIMIT: u64 = 2 * MEMORY_SIZE as u64;

fn decode_words(payload: &[u8], room: usize) -> Vec<u16> {
    payload
        .chunks_exact(2)
        .take(room)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// Whole words left in `file` after `consumed` bytes.
fn remaining_words(file: &mut File, consumed: usize) -> io::Result<usize> {
    let metadata = file.metadata()?;
    let remaining_bytes = if metadata.is_file() {
        metadata
            .len()
            .saturating_sub(u64::try_from(consumed).unwrap_or(u64::MAX))
    } else {
        io::copy(&mut file.by_ref().take(TRUNCATION_SCAN_LIMIT), &mut io::sink())?
    };
    Ok(usize::try_from(remaining_bytes / 2).unwrap_or(usize::MAX))
}
