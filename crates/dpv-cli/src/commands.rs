//! Command handlers invoked by `main`.

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};

use anyhow::{Context, Result};
use tracing::info;

use dpv_cli::session::{HELP, Session, SessionStats};
use dpv_cli::summarize::{OutputFormat, SummarizeOutcome, SummarizeRequest, summarize};
use dpv_core::{Workbench, WorkbenchOptions};
use dpv_ingest::{PatientDataLoader, discover_patient_dirs};
use dpv_model::{LoaderOptions, RegionBase, parse_region_labels};

use crate::cli::{LoaderArgs, OutputFormatArg, ScanArgs, SessionArgs, SummarizeArgs};

pub fn run_summarize(args: &SummarizeArgs) -> Result<SummarizeOutcome> {
    let regions = args
        .regions
        .as_deref()
        .map(|labels| parse_region_labels(labels, args.loader.region_count))
        .transpose()
        .context("invalid --regions")?;
    let request = SummarizeRequest {
        patient_dirs: args.patient_dirs.clone(),
        regions,
        combine: args.combine,
        format: match args.format {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Tsv => OutputFormat::Tsv,
            OutputFormatArg::Json => OutputFormat::Json,
        },
    };
    let mut workbench = build_workbench(&args.loader, args.jobs);
    summarize(&mut workbench, &request)
}

pub fn run_session(args: &SessionArgs) -> Result<SessionStats> {
    let mut session = Session::new(build_workbench(&args.loader, args.jobs));
    let stats = match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            session.run(BufReader::new(file), io::stdout().lock())?
        }
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                eprintln!("{HELP}");
            }
            session.run(stdin.lock(), io::stdout().lock())?
        }
    };
    info!(
        commands = stats.commands,
        errors = stats.errors,
        "session finished"
    );
    Ok(stats)
}

pub fn run_scan(args: &ScanArgs) -> Result<()> {
    let options = loader_options(&args.loader);
    let dirs = discover_patient_dirs(&args.root, &options)
        .with_context(|| format!("failed to scan {}", args.root.display()))?;
    if dirs.is_empty() {
        println!("No patient folders found under {}", args.root.display());
    }
    for dir in dirs {
        println!("{}", dir.display());
    }
    Ok(())
}

fn build_workbench(args: &LoaderArgs, jobs: usize) -> Workbench {
    let options = WorkbenchOptions::default()
        .with_region_count(args.region_count)
        .with_max_parallel_loads(jobs);
    Workbench::new(PatientDataLoader::new(loader_options(args))).with_options(options)
}

fn loader_options(args: &LoaderArgs) -> LoaderOptions {
    let mut options = LoaderOptions::new().with_region_count(args.region_count);
    if let Some(data_file) = &args.data_file {
        options = options.with_data_file(data_file);
    }
    if let Some(column) = &args.region_column {
        options = options.with_region_column(column);
    }
    if args.one_based_regions {
        options = options.with_region_base(RegionBase::One);
    }
    options
}
