//! Report formatting and writing modules

pub mod formats;

use std::fs::File;
use std::io::{self, Write};

use crate::batch::BatchReport;
use crate::config::{OutputConfig, ReportFormat};

pub use formats::{format_json, format_snippet, format_text};

/// Report writer that handles console and file destinations
pub struct ReportWriter {
    config: OutputConfig,
    file: Option<File>,
}

impl ReportWriter {
    /// Create a new report writer
    pub fn new(config: OutputConfig) -> io::Result<Self> {
        let file = if let Some(ref path) = config.path {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Some(File::create(path)?)
        } else {
            None
        };

        Ok(Self { config, file })
    }

    /// Render and write a batch report
    pub fn write(&mut self, report: &BatchReport) -> io::Result<()> {
        if report.is_empty() {
            return Ok(());
        }

        let formatted = self.render(report);

        if self.config.enable_console {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", formatted)?;
            stdout.flush()?;
        }

        if let Some(ref mut file) = self.file {
            write!(file, "{}", formatted)?;
            file.flush()?;
        }

        Ok(())
    }

    fn render(&self, report: &BatchReport) -> String {
        match self.config.format {
            ReportFormat::Text => format_text(report),
            ReportFormat::Json => format_json(report),
            ReportFormat::Snippet => format_snippet(&report.items),
        }
    }
}
