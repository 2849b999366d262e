//! Patient folder names stay out of the log unless `--log-data` is set.
//!
//! The global subscriber can only be installed once per process, so this file
//! holds a single test.

use std::fs;
use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use dpv_cli::logging::{LogConfig, LogFormat, init_logging_with_writer};
use dpv_cli::session::Session;
use dpv_cli::summarize::{OutputFormat, SummarizeRequest, summarize};
use dpv_core::Workbench;
use dpv_model::LoaderOptions;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn folder_names_are_redacted_at_info() {
    let capture = Capture::default();
    let config = LogConfig {
        level_filter: LevelFilter::INFO,
        use_env_filter: false,
        with_ansi: false,
        format: LogFormat::Compact,
        log_data: false,
        ..LogConfig::default()
    };
    init_logging_with_writer(&config, capture.clone());

    let root = tempfile::tempdir().unwrap();
    let good = root.path().join("SECRET_GOOD");
    let table = good.join(LoaderOptions::default().data_file);
    fs::create_dir_all(table.parent().unwrap()).unwrap();
    fs::write(&table, "region,ADC\n0,1.0\n1,2.0\n").unwrap();
    let bad = root.path().join("SECRET_BAD");

    let request = SummarizeRequest {
        patient_dirs: vec![good.clone(), bad.clone()],
        regions: None,
        combine: true,
        format: OutputFormat::Table,
    };
    let outcome = summarize(&mut Workbench::default(), &request).unwrap();
    assert_eq!(outcome.loaded, 1);
    assert_eq!(outcome.failures.len(), 1);

    let mut session = Session::new(Workbench::default());
    let script = format!(
        "add {}\nadd {}\nremove SECRET_GOOD\nremove SECRET_GONE\n",
        good.display(),
        bad.display()
    );
    let stats = session
        .run(Cursor::new(script), &mut Vec::new())
        .unwrap();
    assert_eq!(stats.errors, 2);

    let logs = capture.contents();
    assert!(logs.contains("patient added"), "{logs}");
    assert!(logs.contains("skipping patient folder"), "{logs}");
    assert!(logs.contains("load_failed"), "{logs}");
    assert!(logs.contains("unknown_identifier"), "{logs}");
    assert!(logs.contains("[REDACTED]"), "{logs}");
    assert!(!logs.contains("SECRET"), "{logs}");
}
