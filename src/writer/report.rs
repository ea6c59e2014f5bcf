use std::fmt;
use std::time::Duration;

use crate::error::LoadError;

/// Result of refreshing one table
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub table: &'static str,
    /// Rows written, or the reported error message
    pub result: Result<u64, String>,
}

impl StepOutcome {
    pub fn loaded(table: &'static str, rows: u64) -> Self {
        Self {
            table,
            result: Ok(rows),
        }
    }

    pub fn failed(table: &'static str, err: &LoadError) -> Self {
        Self {
            table,
            result: Err(err.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn rows(&self) -> Option<u64> {
        self.result.as_ref().ok().copied()
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(rows) => write!(f, "{}: {} rows", self.table, rows),
            Err(message) => write!(f, "{}: FAILED ({})", self.table, message),
        }
    }
}

/// Everything a load run did, in execution order
#[derive(Debug, Clone)]
pub struct RunReport {
    pub master: StepOutcome,
    pub regions: Vec<StepOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn steps(&self) -> impl Iterator<Item = &StepOutcome> {
        std::iter::once(&self.master).chain(self.regions.iter())
    }

    pub fn failures(&self) -> Vec<&StepOutcome> {
        self.steps().filter(|s| !s.is_ok()).collect()
    }

    pub fn region(&self, table: &str) -> Option<&StepOutcome> {
        self.regions.iter().find(|s| s.table == table)
    }

    pub fn summary(&self) -> String {
        let total = self.regions.len() + 1;
        let failed = self.failures().len();
        format!(
            "Refreshed {}/{} tables ({} master rows, {} failed) in {:.1}s",
            total - failed,
            total,
            self.master
                .rows()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "no".to_string()),
            failed,
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_failures() {
        let err = LoadError::storage("Europe_Meteorites")(rusqlite::Error::InvalidQuery);
        let report = RunReport {
            master: StepOutcome::loaded("Meteorite_Data", 10),
            regions: vec![
                StepOutcome::loaded("Australia_Meteorites", 2),
                StepOutcome::failed("Europe_Meteorites", &err),
            ],
            elapsed: Duration::from_millis(1500),
        };

        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.summary(), "Refreshed 2/3 tables (10 master rows, 1 failed) in 1.5s");
        assert!(report.region("Europe_Meteorites").unwrap().to_string().contains("FAILED"));
    }
}
