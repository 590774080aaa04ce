use std::fmt;

/// A single `;`-delimited data record of a PTP file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub addr: u16,
    pub data: Vec<u8>,
}

impl Record {
    pub fn len(&self) -> u8 {
        self.data.len() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn wraps(&self) -> bool {
        self.addr as u32 + self.data.len() as u32 > 0x1_0000
    }
}

/// The address range `[start, start + len)` kept in the output image.
/// The end is computed in 32 bits, so a window never wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: u16,
    len: u16,
}

impl Window {
    pub fn new(start: u16, len: u16) -> Self {
        Window { start, len }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn len(&self) -> u16 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> u32 {
        self.start as u32 + self.len as u32
    }

    pub fn contains(&self, addr: u16) -> bool {
        self.offset_of(addr).is_some()
    }

    pub fn offset_of(&self, addr: u16) -> Option<usize> {
        let addr = addr as u32;
        if addr >= self.start as u32 && addr < self.end() {
            Some((addr - self.start as u32) as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "start=0x{:04X} length=0x{:04X}", self.start, self.len)
    }
}
