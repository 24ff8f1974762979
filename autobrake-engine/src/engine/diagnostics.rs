use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::error;

/// Writes bug reports to disk and remembers where they went.
#[derive(Debug)]
pub struct DiagnosticsCollector {
    report_dir: PathBuf,
    bug_reports: Vec<PathBuf>,
}

impl Default for DiagnosticsCollector {
    fn default() -> Self {
        Self::new(".")
    }
}

impl DiagnosticsCollector {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
            bug_reports: Vec::new(),
        }
    }

    /// Writes `report` to `bug_report_<unix_secs>.yaml`, adding a numeric
    /// suffix when a report from the same second already exists.
    pub fn record_bug_report(&mut self, report: &str) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(&self.report_dir)?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let mut path = self.report_dir.join(format!("bug_report_{timestamp}.yaml"));
        let mut suffix = 1;
        while path.exists() {
            path = self
                .report_dir
                .join(format!("bug_report_{timestamp}_{suffix}.yaml"));
            suffix += 1;
        }

        fs::write(&path, report).inspect_err(|e| {
            error!("Failed to write bug report {}: {e}", path.display());
        })?;

        self.bug_reports.push(path.clone());
        Ok(path)
    }

    pub fn bug_reports(&self) -> &[PathBuf] {
        &self.bug_reports
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_reports_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut diagnostics = DiagnosticsCollector::new(dir.path().join("reports"));

        let first = diagnostics.record_bug_report("expected: a\n").unwrap();
        let second = diagnostics.record_bug_report("expected: b\n").unwrap();

        assert_ne!(first, second);
        assert_eq!(diagnostics.bug_reports(), &[first.clone(), second.clone()]);
        assert_eq!(fs::read_to_string(&first).unwrap(), "expected: a\n");
        assert!(first
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("bug_report_"));
    }

    #[test]
    fn unwritable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let mut diagnostics = DiagnosticsCollector::new(blocker.join("reports"));
        assert!(diagnostics.record_bug_report("x").is_err());
        assert!(diagnostics.bug_reports().is_empty());
    }
}
