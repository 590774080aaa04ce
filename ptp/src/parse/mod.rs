use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use bytes::Buf;
use tracing::debug;

use crate::common::Record;
use crate::hex::{self, InvalidHexDigit};

const DELIMITER: u8 = b';';

/// Reads every data record of a PTP file, stopping at the terminator record.
pub fn parse_ptp_file<P>(path: P) -> Result<Vec<Record>>
where
    P: AsRef<Path>,
{
    let file = File::open(path).map_err(Error::ReadInput)?;
    RecordReader::new(BufReader::new(file)).collect()
}

/// Pulls PTP records out of a byte stream one at a time.
///
/// Input is consumed a byte at a time, so nothing past the terminator record
/// is ever read from the underlying stream.
pub struct RecordReader<R> {
    input: R,
    record_idx: usize,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(input: R) -> Self {
        RecordReader {
            input,
            record_idx: 0,
            done: false,
        }
    }

    /// Index of the record that will be parsed next.
    pub fn record_idx(&self) -> usize {
        self.record_idx
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    /// Parses the next record. Returns `None` once the terminator is reached.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        if self.done {
            return Ok(None);
        }
        let result = self.parse_record();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    fn parse_record(&mut self) -> Result<Option<Record>> {
        self.skip_to_delimiter()?;

        let byte_count = self.parse_byte_count()?;
        if byte_count == 0 {
            debug!(record_idx = self.record_idx, "reached terminator record");
            return Ok(None);
        }

        let addr = self.parse_address()?;
        let data = self.parse_data(byte_count)?;
        debug!(
            record_idx = self.record_idx,
            "record addr=0x{addr:04X} len=0x{byte_count:02X}"
        );

        self.record_idx += 1;
        Ok(Some(Record { addr, data }))
    }

    fn parse_byte_count(&mut self) -> Result<u8> {
        let field_bytes = self.parse_field(Field::Length, 2)?;
        Ok(field_bytes.as_slice().get_u8())
    }

    fn parse_address(&mut self) -> Result<u16> {
        let field_bytes = self.parse_field(Field::Address, 4)?;
        Ok(field_bytes.as_slice().get_u16())
    }

    fn parse_data(&mut self, byte_count: u8) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(byte_count as usize);
        for _ in 0..byte_count {
            let field_bytes = self.parse_field(Field::Data, 2)?;
            data.push(field_bytes.as_slice().get_u8());
        }
        Ok(data)
    }

    fn parse_field(&mut self, field: Field, num_digits: usize) -> Result<Vec<u8>> {
        self.skip_whitespace()?;
        let mut digits = Vec::with_capacity(num_digits);
        while digits.len() < num_digits {
            match self.next_byte()? {
                Some(digit) => digits.push(digit),
                None if digits.is_empty() => {
                    return Err(field_error(self.record_idx, field, ParseFieldError::Missing))
                }
                None => {
                    return Err(field_error(self.record_idx, field, ParseFieldError::Incomplete))
                }
            }
        }
        hex::hex_string_to_bytes(&digits).map_err(|e| {
            field_error(self.record_idx, field, ParseFieldError::InvalidHex(e))
        })
    }

    fn skip_to_delimiter(&mut self) -> Result<()> {
        loop {
            match self.next_byte()? {
                Some(DELIMITER) => return Ok(()),
                Some(_) => continue,
                None => {
                    return Err(Error::ParseRecord {
                        record_idx: self.record_idx,
                        kind: ParseRecordError::EndOfInput,
                    })
                }
            }
        }
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(byte) = self.peek_byte()? {
            if !byte.is_ascii_whitespace() {
                break;
            }
            self.input.consume(1);
        }
        Ok(())
    }

    fn peek_byte(&mut self) -> Result<Option<u8>> {
        loop {
            match self.input.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::ReadInput(e)),
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        let byte = self.peek_byte()?;
        if byte.is_some() {
            self.input.consume(1);
        }
        Ok(byte)
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn field_error(record_idx: usize, field: Field, kind: ParseFieldError) -> Error {
    Error::ParseRecord {
        record_idx,
        kind: ParseRecordError::ParseField { field, kind },
    }
}

#[derive(Debug)]
pub enum Error {
    ReadInput(io::Error),
    WriteOutput(io::Error),
    ParseRecord {
        record_idx: usize,
        kind: ParseRecordError,
    },
}

#[derive(Debug)]
pub enum ParseRecordError {
    /// The input ended while looking for the next `;`.
    EndOfInput,
    ParseField {
        field: Field,
        kind: ParseFieldError,
    },
}

#[derive(Debug)]
pub enum ParseFieldError {
    Missing,
    Incomplete,
    InvalidHex(InvalidHexDigit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Length,
    Address,
    Data,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Field::*;
        match self {
            Length => write!(f, "Length"),
            Address => write!(f, "Address"),
            Data => write!(f, "Data"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;
        match self {
            ReadInput(io_error) => write!(f, "error reading the input: {io_error}"),
            WriteOutput(io_error) => write!(f, "error writing the output: {io_error}"),
            ParseRecord { record_idx, kind } => {
                write!(f, "failed to parse record at index {record_idx}: ")?;
                use ParseRecordError::*;
                match kind {
                    EndOfInput => write!(
                        f,
                        "input ended before the next '{}' delimiter",
                        DELIMITER as char
                    ),
                    ParseField { field, kind } => {
                        write!(f, "failed to parse {field} field: ")?;
                        use ParseFieldError::*;
                        match kind {
                            Missing => write!(f, "field missing"),
                            Incomplete => write!(f, "field incomplete"),
                            InvalidHex(error) => write!(f, "{error}"),
                        }
                    }
                }
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadInput(e) | Error::WriteOutput(e) => Some(e),
            Error::ParseRecord { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
