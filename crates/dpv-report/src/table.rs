//! Terminal tables for patient and cohort summaries.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dpv_model::{
    CohortSummary, ParameterSummary, PatientSummary, SummaryScope, SummaryTable,
    format_region_labels,
};

use crate::format::format_number;

const HEADERS: [&str; 9] = [
    "Parameter", "N", "Mean", "SD", "Min", "P25", "Median", "P75", "Max",
];

/// Builds a styled table with one row per parameter.
pub fn summary_table(summary: &SummaryTable) -> Table {
    let mut table = Table::new();
    table.set_header(HEADERS.iter().map(|label| header_cell(label)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for index in 1..HEADERS.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for parameter in &summary.parameters {
        table.add_row(parameter_row(parameter));
    }
    table
}

/// Renders a patient summary with its title line.
pub fn render_patient_summary(summary: &PatientSummary) -> String {
    let scope = match &summary.scope {
        SummaryScope::AllRegions => "all regions".to_string(),
        SummaryScope::Selected(regions) => format!("regions {}", format_region_labels(regions)),
    };
    format!(
        "Patient: {} ({scope}, {} voxels)\n{}",
        summary.patient_id,
        summary.table.voxel_count,
        summary_table(&summary.table)
    )
}

/// Renders the combined cohort summary with the contributing selections.
pub fn render_cohort_summary(summary: &CohortSummary) -> String {
    let mut out = String::from("Combined Patient Summary\n");
    if summary.selection.is_empty() {
        out.push_str("No patients combined\n");
    } else {
        let members: Vec<String> = summary
            .selection
            .iter()
            .map(|(id, regions)| format!("{id} [{}]", format_region_labels(regions)))
            .collect();
        out.push_str(&format!(
            "Patients: {} ({} voxels)\n",
            members.join(", "),
            summary.table.voxel_count
        ));
    }
    out.push_str(&summary_table(&summary.table).to_string());
    out
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn parameter_row(parameter: &ParameterSummary) -> Vec<Cell> {
    let name = Cell::new(&parameter.parameter)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold);
    match &parameter.stats {
        Some(stats) => vec![
            name,
            Cell::new(parameter.count),
            number_cell(stats.mean),
            stats.std_dev.map_or_else(|| dim_cell("-"), number_cell),
            number_cell(stats.min),
            number_cell(stats.p25),
            number_cell(stats.median),
            number_cell(stats.p75),
            number_cell(stats.max),
        ],
        None => {
            let mut row = vec![name, dim_cell(parameter.count)];
            row.extend((2..HEADERS.len()).map(|_| dim_cell("-")));
            row
        }
    }
}

fn number_cell(value: f64) -> Cell {
    Cell::new(format_number(value))
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
