//! Summary rendering and export.
//!
//! Tables are rendered with `comfy-table` for terminals; exports use the
//! tab-delimited layout that spreadsheets accept on paste.

pub mod error;
pub mod export;
pub mod format;
pub mod table;

pub use error::{ReportError, Result};
pub use export::{EXPORT_HEADER, to_delimited, to_json, to_tsv, write_delimited};
pub use format::format_number;
pub use table::{
    apply_table_style, render_cohort_summary, render_patient_summary, summary_table,
};
