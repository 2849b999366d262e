//! Delimited and JSON export of summary tables.

use std::io::Write;

use csv::{Terminator, WriterBuilder};
use serde::Serialize;

use dpv_model::SummaryTable;

use crate::error::Result;
use crate::format::format_number;

/// Column header of delimited exports.
pub const EXPORT_HEADER: [&str; 9] = [
    "parameter", "n", "mean", "sd", "min", "p25", "median", "p75", "max",
];

/// Writes one header row and one row per parameter.
///
/// Missing statistics are written as empty cells.
pub fn write_delimited<W: Write>(summary: &SummaryTable, writer: W, delimiter: u8) -> Result<()> {
    let mut out = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    out.write_record(EXPORT_HEADER)?;
    for parameter in &summary.parameters {
        let mut record = vec![parameter.parameter.clone(), parameter.count.to_string()];
        match &parameter.stats {
            Some(stats) => {
                record.push(format_number(stats.mean));
                record.push(stats.std_dev.map(format_number).unwrap_or_default());
                for value in [stats.min, stats.p25, stats.median, stats.p75, stats.max] {
                    record.push(format_number(value));
                }
            }
            None => record.extend(std::iter::repeat_n(String::new(), EXPORT_HEADER.len() - 2)),
        }
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Renders a summary with an arbitrary single-byte delimiter.
pub fn to_delimited(summary: &SummaryTable, delimiter: u8) -> Result<String> {
    let mut buffer = Vec::new();
    write_delimited(summary, &mut buffer, delimiter)?;
    Ok(String::from_utf8(buffer)?)
}

/// Renders a summary as tab-separated text.
pub fn to_tsv(summary: &SummaryTable) -> Result<String> {
    to_delimited(summary, b'\t')
}

/// Serializes any summary value as pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
