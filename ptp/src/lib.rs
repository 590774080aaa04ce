//! Reader for the PTP tape format produced by the ITS CROSS assembler.
//!
//! A PTP file is a sequence of `;`-delimited records, each an ASCII-hex
//! length byte, a 16-bit load address and that many data bytes. A record
//! with a length of zero ends the tape. Records need be neither contiguous
//! nor in address order.

mod common;
mod hex;
mod image;
mod parse;

pub use common::{Record, Window};
pub use hex::InvalidHexDigit;
pub use image::{convert, translate, Image, Translation};
pub use parse::{
    parse_ptp_file, Error, Field, ParseFieldError, ParseRecordError, RecordReader, Result,
};
