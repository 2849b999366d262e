//! Line-oriented session over a [`Workbench`].
//!
//! Each input line is one command. Every mutation prints the touched
//! patient's summary followed by the recomputed combined summary. A failed
//! command prints an error and the session keeps going with unchanged state.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use comfy_table::{Cell, CellAlignment, Table};
use thiserror::Error;
use tracing::{debug, info, warn};

use dpv_core::{DatasetLoader, EngineError, Update, Workbench, WorkbenchError};
use dpv_ingest::{DiffusionDataset, PatientDataLoader};
use dpv_model::{ModelError, Region, RegionSet, format_region_labels, parse_region_labels};
use dpv_report::{
    ReportError, apply_table_style, render_cohort_summary, render_patient_summary, to_json,
    to_tsv,
};

use crate::logging::redact_value;

pub const HELP: &str = "\
Commands:
  add <DIR>...                 load patient folders (quote names with spaces)
  remove <ID>                  unload a patient
  regions <ID> <LABELS>        select regions, e.g. 1,3,5-7 | all | none
  toggle <ID> <REGION>         flip one region of a patient
  combine <ID> [on|off]        add to or drop from the combined summary
  show [ID] [all]              combined summary, or one patient (all: every voxel)
  export <ID|combined> [tsv|json] [FILE]
  list                         loaded patients
  help                         this text
  quit                         end the session";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("unbalanced quotes")]
    Quoting,

    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("{command}: unexpected argument '{argument}'")]
    UnexpectedArgument {
        command: &'static str,
        argument: String,
    },

    #[error("{command}: invalid {argument} '{value}'")]
    InvalidArgument {
        command: &'static str,
        argument: &'static str,
        value: String,
    },

    #[error(transparent)]
    Region(#[from] ModelError),

    #[error(transparent)]
    Workbench(#[from] WorkbenchError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    /// Stable name of the failure, free of identifiers and paths.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCommand(_) => "unknown_command",
            Self::Quoting => "unbalanced_quotes",
            Self::MissingArgument { .. } => "missing_argument",
            Self::UnexpectedArgument { .. } => "unexpected_argument",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Region(_) => "invalid_region",
            Self::Workbench(error) => error.kind(),
            Self::Report(_) => "report_failed",
            Self::Write { .. } => "write_failed",
        }
    }
}

impl From<EngineError> for SessionError {
    fn from(error: EngineError) -> Self {
        Self::Workbench(error.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    Combined,
    Patient(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Tsv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Add(Vec<PathBuf>),
    Remove(String),
    Regions { patient: String, regions: RegionSet },
    Toggle { patient: String, region: Region },
    Combine { patient: String, member: bool },
    Show { patient: Option<String>, overview: bool },
    Export {
        target: ExportTarget,
        format: ExportFormat,
        path: Option<PathBuf>,
    },
    List,
    Help,
    Quit,
}

/// Parses one input line. Blank lines and `#` comments yield `None`.
///
/// Arguments are split with shell quoting rules, so folder names containing
/// spaces are written as `add "/data/Patient A"`.
pub fn parse_command(line: &str, region_count: u32) -> Result<Option<SessionCommand>, SessionError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let tokens = shlex::split(line).ok_or(SessionError::Quoting)?;
    let Some((name, rest)) = tokens.split_first() else {
        return Ok(None);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    let command = match name.to_ascii_lowercase().as_str() {
        "add" => {
            if args.is_empty() {
                return Err(missing("add", "patient folder"));
            }
            SessionCommand::Add(args.iter().map(PathBuf::from).collect())
        }
        "remove" => {
            let [patient] = exact::<1>("remove", &args, "patient id")?;
            SessionCommand::Remove(patient.to_string())
        }
        "regions" => {
            let Some((patient, labels)) = args.split_first() else {
                return Err(missing("regions", "patient id"));
            };
            if labels.is_empty() {
                return Err(missing("regions", "region labels"));
            }
            SessionCommand::Regions {
                patient: (*patient).to_string(),
                regions: parse_region_labels(&labels.join(","), region_count)?,
            }
        }
        "toggle" => {
            let [patient, label] = exact::<2>("toggle", &args, "patient id and region")?;
            let regions = parse_region_labels(label, region_count)?;
            let region = match (regions.len(), regions.first()) {
                (1, Some(region)) => *region,
                _ => {
                    return Err(SessionError::InvalidArgument {
                        command: "toggle",
                        argument: "region",
                        value: label.to_string(),
                    });
                }
            };
            SessionCommand::Toggle {
                patient: patient.to_string(),
                region,
            }
        }
        "combine" => {
            let (patient, member) = match args.as_slice() {
                [] => return Err(missing("combine", "patient id")),
                [patient] => (*patient, true),
                [patient, flag] => (*patient, parse_switch(flag)?),
                [_, _, extra, ..] => return Err(unexpected("combine", extra)),
            };
            SessionCommand::Combine {
                patient: patient.to_string(),
                member,
            }
        }
        "show" => match args.as_slice() {
            [] => SessionCommand::Show {
                patient: None,
                overview: false,
            },
            [patient] => SessionCommand::Show {
                patient: Some((*patient).to_string()),
                overview: false,
            },
            [patient, scope] if scope.eq_ignore_ascii_case("all") => SessionCommand::Show {
                patient: Some((*patient).to_string()),
                overview: true,
            },
            [_, extra, ..] => return Err(unexpected("show", extra)),
        },
        "export" => parse_export(&args)?,
        "list" | "ls" => no_args("list", &args, SessionCommand::List)?,
        "help" | "?" => no_args("help", &args, SessionCommand::Help)?,
        "quit" | "exit" => no_args("quit", &args, SessionCommand::Quit)?,
        other => return Err(SessionError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_export(args: &[&str]) -> Result<SessionCommand, SessionError> {
    let Some((target, rest)) = args.split_first() else {
        return Err(missing("export", "target"));
    };
    let target = if target.eq_ignore_ascii_case("combined") {
        ExportTarget::Combined
    } else {
        ExportTarget::Patient((*target).to_string())
    };
    let mut format = ExportFormat::default();
    let mut rest = rest;
    if let Some((first, tail)) = rest.split_first() {
        let parsed = match first.to_ascii_lowercase().as_str() {
            "tsv" => Some(ExportFormat::Tsv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        };
        if let Some(parsed) = parsed {
            format = parsed;
            rest = tail;
        }
    }
    let path = match rest {
        [] => None,
        [path] => Some(PathBuf::from(path)),
        [_, extra, ..] => return Err(unexpected("export", extra)),
    };
    Ok(SessionCommand::Export {
        target,
        format,
        path,
    })
}

fn parse_switch(flag: &str) -> Result<bool, SessionError> {
    match flag.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        _ => Err(SessionError::InvalidArgument {
            command: "combine",
            argument: "switch",
            value: flag.to_string(),
        }),
    }
}

fn exact<'a, const N: usize>(
    command: &'static str,
    args: &[&'a str],
    argument: &'static str,
) -> Result<[&'a str; N], SessionError> {
    if args.len() > N {
        return Err(unexpected(command, args[N]));
    }
    <[&str; N]>::try_from(args).map_err(|_| missing(command, argument))
}

fn no_args(
    command: &'static str,
    args: &[&str],
    parsed: SessionCommand,
) -> Result<SessionCommand, SessionError> {
    match args.first() {
        Some(extra) => Err(unexpected(command, extra)),
        None => Ok(parsed),
    }
}

fn missing(command: &'static str, argument: &'static str) -> SessionError {
    SessionError::MissingArgument { command, argument }
}

fn unexpected(command: &'static str, argument: &str) -> SessionError {
    SessionError::UnexpectedArgument {
        command,
        argument: argument.to_string(),
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Text produced by one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub text: String,
    /// Failures that did not abort the command (e.g. one folder of an `add`).
    pub errors: Vec<String>,
    pub quit: bool,
}

impl Outcome {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub commands: usize,
    pub errors: usize,
}

pub struct Session<L = PatientDataLoader>
where
    L: DatasetLoader<Handle = DiffusionDataset>,
{
    workbench: Workbench<L>,
}

impl<L> Session<L>
where
    L: DatasetLoader<Handle = DiffusionDataset> + Sync,
{
    pub fn new(workbench: Workbench<L>) -> Self {
        Self { workbench }
    }

    pub fn workbench(&self) -> &Workbench<L> {
        &self.workbench
    }

    /// Parses and executes one line.
    pub fn execute_line(&mut self, line: &str) -> Result<Outcome, SessionError> {
        match parse_command(line, self.workbench.options().region_count)? {
            Some(command) => self.execute(command),
            None => Ok(Outcome::default()),
        }
    }

    pub fn execute(&mut self, command: SessionCommand) -> Result<Outcome, SessionError> {
        match command {
            SessionCommand::Add(paths) => Ok(self.add(&paths)),
            SessionCommand::Remove(patient) => {
                let update = self.workbench.remove_patient(&patient)?;
                info!(patient = redact_value(&patient), "removed");
                Ok(Outcome::text(format!(
                    "Removed {patient}\n{}",
                    render_update(&update)
                )))
            }
            SessionCommand::Regions { patient, regions } => {
                let update = self.workbench.set_regions(&patient, regions)?;
                Ok(Outcome::text(render_update(&update)))
            }
            SessionCommand::Toggle { patient, region } => {
                let update = self.workbench.toggle_region(&patient, region)?;
                Ok(Outcome::text(render_update(&update)))
            }
            SessionCommand::Combine { patient, member } => {
                let update = self.workbench.set_combined(&patient, member)?;
                debug!(patient = redact_value(&patient), member, "combine");
                Ok(Outcome::text(render_update(&update)))
            }
            SessionCommand::Show { patient, overview } => self.show(patient.as_deref(), overview),
            SessionCommand::Export {
                target,
                format,
                path,
            } => self.export(&target, format, path),
            SessionCommand::List => Ok(Outcome::text(self.list())),
            SessionCommand::Help => Ok(Outcome::text(HELP)),
            SessionCommand::Quit => Ok(Outcome {
                quit: true,
                ..Outcome::default()
            }),
        }
    }

    /// Reads commands until end of input or `quit`.
    ///
    /// Command errors are written to `output` and counted. Only I/O failures
    /// on `input` or `output` end the session early.
    pub fn run<R, W>(&mut self, input: R, mut output: W) -> io::Result<SessionStats>
    where
        R: BufRead,
        W: Write,
    {
        let mut stats = SessionStats::default();
        for line in input.lines() {
            let line = line?;
            match self.execute_line(&line) {
                Ok(outcome) => {
                    if !outcome.text.is_empty() || !outcome.errors.is_empty() {
                        stats.commands += 1;
                    }
                    for error in &outcome.errors {
                        writeln!(output, "error: {error}")?;
                    }
                    stats.errors += outcome.errors.len();
                    if !outcome.text.is_empty() {
                        writeln!(output, "{}", outcome.text.trim_end())?;
                    }
                    if outcome.quit {
                        stats.commands += 1;
                        break;
                    }
                }
                Err(error) => {
                    stats.commands += 1;
                    stats.errors += 1;
                    let detail = error.to_string();
                    warn!(
                        kind = error.kind(),
                        detail = redact_value(&detail),
                        "session command rejected"
                    );
                    writeln!(output, "error: {error}")?;
                }
            }
        }
        output.flush()?;
        Ok(stats)
    }

    fn add(&mut self, paths: &[PathBuf]) -> Outcome {
        let mut outcome = Outcome::default();
        let mut last = None;
        for (path, result) in paths.iter().zip(self.workbench.load_all(paths)) {
            match result {
                Ok(update) => {
                    if let Some(patient) = &update.patient {
                        outcome.text.push_str(&render_patient_summary(patient));
                        outcome.text.push('\n');
                    }
                    last = Some(update);
                }
                Err(error) => {
                    let detail = format!("{}: {error}", path.display());
                    warn!(
                        kind = error.kind(),
                        detail = redact_value(&detail),
                        "patient folder not added"
                    );
                    outcome.errors.push(detail);
                }
            }
        }
        if let Some(update) = last {
            outcome.text.push_str(&render_cohort_summary(&update.combined));
        }
        outcome
    }

    fn show(&self, patient: Option<&str>, overview: bool) -> Result<Outcome, SessionError> {
        let Some(patient) = patient else {
            return Ok(Outcome::text(render_cohort_summary(
                &self.workbench.combined_summary(),
            )));
        };
        let summary = if overview {
            self.workbench.overview(patient)
        } else {
            self.workbench.patient_summary(patient)
        };
        match summary {
            Some(summary) => Ok(Outcome::text(render_patient_summary(&summary))),
            None => Err(EngineError::UnknownIdentifier(patient.to_string()).into()),
        }
    }

    fn export(
        &self,
        target: &ExportTarget,
        format: ExportFormat,
        path: Option<PathBuf>,
    ) -> Result<Outcome, SessionError> {
        let text = match target {
            ExportTarget::Combined => {
                let summary = self.workbench.combined_summary();
                match format {
                    ExportFormat::Tsv => to_tsv(&summary.table)?,
                    ExportFormat::Json => to_json(&summary)?,
                }
            }
            ExportTarget::Patient(id) => {
                let summary = self
                    .workbench
                    .patient_summary(id)
                    .ok_or_else(|| EngineError::UnknownIdentifier(id.clone()))?;
                match format {
                    ExportFormat::Tsv => to_tsv(&summary.table)?,
                    ExportFormat::Json => to_json(&summary)?,
                }
            }
        };
        match path {
            Some(path) => {
                fs::write(&path, &text).map_err(|source| SessionError::Write {
                    path: path.clone(),
                    source,
                })?;
                Ok(Outcome::text(format!("Exported to {}", path.display())))
            }
            None => Ok(Outcome::text(text)),
        }
    }

    fn list(&self) -> String {
        let ids = self.workbench.patient_ids();
        if ids.is_empty() {
            return "No patients loaded".to_string();
        }
        let mut table = Table::new();
        table.set_header(vec!["Patient", "Voxels", "Regions", "Combined"]);
        apply_table_style(&mut table);
        if let Some(column) = table.column_mut(1) {
            column.set_cell_alignment(CellAlignment::Right);
        }
        for id in &ids {
            let voxels = self
                .workbench
                .engine()
                .store()
                .handle(id.as_str())
                .map_or(0, DiffusionDataset::voxel_count);
            let combined = if self.workbench.is_combined(id.as_str()) {
                "yes"
            } else {
                "no"
            };
            table.add_row(vec![
                Cell::new(id),
                Cell::new(voxels),
                Cell::new(format_region_labels(&self.workbench.regions(id.as_str()))),
                Cell::new(combined),
            ]);
        }
        format!("{} patient(s) loaded\n{table}", ids.len())
    }
}

fn render_update(update: &Update) -> String {
    match &update.patient {
        Some(patient) => format!(
            "{}\n{}",
            render_patient_summary(patient),
            render_cohort_summary(&update.combined)
        ),
        None => render_cohort_summary(&update.combined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> SessionCommand {
        parse_command(line, 12).unwrap().unwrap()
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_command("   ", 12).unwrap(), None);
        assert_eq!(parse_command("# note", 12).unwrap(), None);
    }

    #[test]
    fn region_labels_map_to_indices() {
        assert_eq!(
            parse("regions P1 1,3 5-6"),
            SessionCommand::Regions {
                patient: "P1".to_string(),
                regions: RegionSet::from([0, 2, 4, 5]),
            }
        );
        assert_eq!(
            parse("toggle P1 12"),
            SessionCommand::Toggle {
                patient: "P1".to_string(),
                region: 11,
            }
        );
    }

    #[test]
    fn combine_defaults_to_on() {
        assert_eq!(
            parse("combine P2"),
            SessionCommand::Combine {
                patient: "P2".to_string(),
                member: true,
            }
        );
        assert_eq!(
            parse("COMBINE P2 off"),
            SessionCommand::Combine {
                patient: "P2".to_string(),
                member: false,
            }
        );
    }

    #[test]
    fn export_format_and_path_are_optional() {
        assert_eq!(
            parse("export combined"),
            SessionCommand::Export {
                target: ExportTarget::Combined,
                format: ExportFormat::Tsv,
                path: None,
            }
        );
        assert_eq!(
            parse("export P1 json out.json"),
            SessionCommand::Export {
                target: ExportTarget::Patient("P1".to_string()),
                format: ExportFormat::Json,
                path: Some(PathBuf::from("out.json")),
            }
        );
    }

    #[test]
    fn quoted_arguments_keep_spaces() {
        assert_eq!(
            parse(r#"add "/data/Patient A" /data/P2"#),
            SessionCommand::Add(vec![
                PathBuf::from("/data/Patient A"),
                PathBuf::from("/data/P2"),
            ])
        );
        assert_eq!(
            parse("combine 'Patient A' off"),
            SessionCommand::Combine {
                patient: "Patient A".to_string(),
                member: false,
            }
        );
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(matches!(
            parse_command(r#"add "/data/Patient A"#, 12),
            Err(SessionError::Quoting)
        ));
        assert!(matches!(
            parse_command("frobnicate", 12),
            Err(SessionError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse_command("remove", 12),
            Err(SessionError::MissingArgument { .. })
        ));
        assert!(matches!(
            parse_command("remove P1 P2", 12),
            Err(SessionError::UnexpectedArgument { .. })
        ));
        assert!(matches!(
            parse_command("toggle P1 13", 12),
            Err(SessionError::Region(_))
        ));
        assert!(matches!(
            parse_command("toggle P1 1-2", 12),
            Err(SessionError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_command("combine P1 maybe", 12),
            Err(SessionError::InvalidArgument { .. })
        ));
    }
}
