use std::path::PathBuf;

use clap::Parser;
use ptp::Window;

const AFTER_HELP: &str = "\
Convert a PTP file into a binary file suitable for transfer to an Apple II disk image.
Since a PTP file may not be contiguous and may patch system software, this utility
requires a 'start' and 'length', expressed in hex, of the desired converted binary.
Data in the PTP file outside this range is discarded, and the binary is zero padded
where no record supplies data. Successful use requires knowledge of the original
program's memory layout.";

/// Convert an ITS CROSS assembler PTP file to a flat binary image.
#[derive(Parser, Debug)]
#[command(version, about, after_long_help = AFTER_HELP)]
pub struct Cli {
    /// Load address of the binary, in hex
    #[arg(value_name = "START", value_parser = parse_hex_u16)]
    pub start: u16,

    /// Length of the binary, in hex
    #[arg(value_name = "LENGTH", value_parser = parse_hex_u16)]
    pub length: u16,

    /// Input file in the PTP format of the ITS CROSS assembler
    #[arg(value_name = "FILENAME.PTP")]
    pub input: PathBuf,

    /// Output file to contain the PTP input converted to binary
    #[arg(value_name = "OUTFILE")]
    pub output: PathBuf,
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub window: Window,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            window: Window::new(cli.start, cli.length),
            input_path: cli.input,
            output_path: cli.output,
        }
    }
}

/// Accepts `800`, `0800`, `0x0800` or `$0800`.
fn parse_hex_u16(arg: &str) -> Result<u16, String> {
    let digits = arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .or_else(|| arg.strip_prefix('$'))
        .unwrap_or(arg);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("'{arg}' is not a hexadecimal number"));
    }
    u16::from_str_radix(digits, 16).map_err(|_| format!("'{arg}' does not fit in 16 bits"))
}
