use anyhow::Context;

use ptp::parse_ptp_file;

/*
Usage:
  dump_records program.ptp

  Lists every data record of the tape, to help pick the window for ptp2bin.
 */

fn main() {
    if let Err(e) = try_main() {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let input_path = std::env::args().nth(1).context("Missing input file")?;
    let records = parse_ptp_file(&input_path)
        .with_context(|| format!("Failed to read records from {input_path}"))?;

    let mut total: u64 = 0;
    for record in &records {
        let data_str = record
            .data
            .iter()
            .map(|byte| format!("{byte:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:04X}: {data_str}", record.addr);
        total += record.data.len() as u64;
    }

    if let (Some(low), Some(high)) = (
        records.iter().map(|r| r.addr as u32).min(),
        records.iter().map(|r| r.addr as u32 + r.data.len() as u32).max(),
    ) {
        println!("Address range 0x{low:04X}..0x{high:04X}");
    }
    println!("{} records, {total:X} bytes.", records.len());
    Ok(())
}
