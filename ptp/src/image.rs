use std::io::{BufRead, Write};

use tracing::{debug, info, trace, warn};

use crate::common::{Record, Window};
use crate::parse::{Error, RecordReader, Result};

/// Flat memory image of a [`Window`]. Bytes no record touches stay zero.
pub struct Image {
    window: Window,
    data: Vec<u8>,
}

impl Image {
    pub fn new(window: Window) -> Self {
        Image {
            window,
            data: vec![0; window.len() as usize],
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Addresses wrap at 16 bits: a record loaded at FFFF continues at 0000.
    pub fn apply(&mut self, record: &Record) -> usize {
        if record.wraps() {
            warn!(
                "record at 0x{:04X} with 0x{:02X} bytes wraps past 0xFFFF",
                record.addr,
                record.len()
            );
        }

        let mut written = 0;
        for (idx, &byte) in record.data.iter().enumerate() {
            let addr = record.addr.wrapping_add(idx as u16);
            if let Some(offset) = self.window.offset_of(addr) {
                self.data[offset] = byte;
                written += 1;
            }
        }

        if written < record.data.len() {
            trace!(
                "dropped 0x{:02X} of 0x{:02X} bytes at 0x{:04X} outside {}",
                record.data.len() - written,
                record.len(),
                record.addr,
                self.window
            );
        }
        written
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.data).map_err(Error::WriteOutput)?;
        writer.flush().map_err(Error::WriteOutput)
    }
}

pub struct Translation {
    pub image: Image,
    // Declared lengths of all data records, in window or not.
    pub total: u64,
    pub records: usize,
    pub written: u64,
}

/// Applies every record of `input` to a fresh image of `window`, stopping at
/// the terminator record. Any malformed record aborts the whole translation.
pub fn translate<R: BufRead>(input: R, window: Window) -> Result<Translation> {
    let mut image = Image::new(window);
    let mut reader = RecordReader::new(input);
    let mut total: u64 = 0;
    let mut written: u64 = 0;

    while let Some(record) = reader.next_record()? {
        total += record.data.len() as u64;
        written += image.apply(&record) as u64;
    }

    let records = reader.record_idx();
    debug!("{records} records, 0x{total:X} bytes scanned, 0x{written:X} bytes kept");
    Ok(Translation {
        image,
        total,
        records,
        written,
    })
}

/// Nothing is written unless the whole input parses.
pub fn convert<R, W>(input: R, output: W, window: Window) -> Result<Translation>
where
    R: BufRead,
    W: Write,
{
    let translation = translate(input, window)?;
    translation.image.write_to(output)?;
    info!(
        "wrote 0x{:X} byte image for {}",
        translation.image.len(),
        window
    );
    Ok(translation)
}

#[cfg(test)]
mod test {
    use std::io;

    use super::*;
    use crate::common::test::test_file_path;

    fn translate_str(input: &str, start: u16, len: u16) -> Translation {
        translate(input.as_bytes(), Window::new(start, len)).expect("translate failed")
    }

    #[test]
    fn places_record_at_window_offset() {
        let output = translate_str(";02010AAABB\n;00\n", 0x0100, 0x0010);
        let mut expected = vec![0u8; 0x10];
        expected[0x0a] = 0xaa;
        expected[0x0b] = 0xbb;
        assert_eq!(output.image.data(), expected.as_slice());
        assert_eq!(output.total, 2);
        assert_eq!(output.written, 2);
        assert_eq!(output.records, 1);
    }

    #[test]
    fn byte_below_window_is_dropped_but_counted() {
        let output = translate_str(";0100FF11;00", 0x0100, 0x0010);
        assert_eq!(output.image.data(), &[0; 0x10]);
        assert_eq!(output.total, 1);
        assert_eq!(output.written, 0);
    }

    #[test]
    fn straddling_records_are_clipped() {
        let output = translate_str(";0400FE01020304;04010E05060708;00", 0x0100, 0x0010);
        let data = output.image.data();
        assert_eq!(&data[..2], &[0x03, 0x04]);
        assert_eq!(&data[2..0x0e], &[0; 0x0c]);
        assert_eq!(&data[0x0e..], &[0x05, 0x06]);
        assert_eq!(output.total, 8);
        assert_eq!(output.written, 4);
    }

    #[test]
    fn later_records_overwrite_earlier_ones() {
        let output = translate_str(";03000011 11 11;020001 2222;00", 0x0000, 0x0004);
        assert_eq!(output.image.data(), &[0x11, 0x22, 0x22, 0x00]);
    }

    #[test]
    fn out_of_order_records() {
        let output = translate_str(";020802CCDD;020800AABB;00", 0x0800, 0x0004);
        assert_eq!(output.image.data(), &[0xaa, 0xbb, 0xcc, 0xdd]);
    }

    #[test]
    fn output_is_always_window_sized() {
        let output = translate_str(";00", 0x2000, 0x0100);
        assert_eq!(output.image.len(), 0x100);
        assert!(output.image.data().iter().all(|&b| b == 0));
        assert_eq!(output.total, 0);
        assert_eq!(output.records, 0);
    }

    #[test]
    fn empty_window() {
        let output = translate_str(";02010AAABB;00", 0x0100, 0);
        assert!(output.image.is_empty());
        assert_eq!(output.total, 2);
        assert_eq!(output.written, 0);
    }

    #[test]
    fn addresses_wrap_at_sixteen_bits() {
        let output = translate_str(";03FFFF010203;00", 0x0000, 0x0002);
        assert_eq!(output.image.data(), &[0x02, 0x03]);

        let output = translate_str(";03FFFF010203;00", 0xffff, 0x0002);
        assert_eq!(output.image.data(), &[0x01, 0x00]);
    }

    #[test]
    fn malformed_record_aborts() {
        let result = translate(";020100AA".as_bytes(), Window::new(0x0100, 0x10));
        assert!(matches!(result, Err(Error::ParseRecord { record_idx: 0, .. })));
    }

    #[test]
    fn convert_writes_whole_image() {
        let path = test_file_path("single_data_record.ptp");
        let input = io::BufReader::new(std::fs::File::open(path).unwrap());
        let mut output = Vec::new();
        let translation = convert(input, &mut output, Window::new(0x0100, 0x0010)).unwrap();
        assert_eq!(output.len(), 0x10);
        assert_eq!(output.as_slice(), translation.image.data());
        assert_eq!(output[0x0a], 0xaa);
    }

    #[test]
    fn convert_writes_nothing_on_parse_error() {
        let mut output = Vec::new();
        let result = convert(";0201".as_bytes(), &mut output, Window::new(0x0100, 0x10));
        assert!(result.is_err());
        assert!(output.is_empty());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_reported() {
        let result = convert(";00".as_bytes(), FailingWriter, Window::new(0, 4));
        assert!(matches!(result, Err(Error::WriteOutput(_))));
    }
}
