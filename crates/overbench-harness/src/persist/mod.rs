pub mod console;
pub mod csv;

use crate::results::RunResult;
use overbench_core::{Result, TestConfig};
use std::path::Path;

pub use console::TextPersister;
pub use csv::CsvPersister;

/// Renders one configuration pass worth of results (one per distro variant).
///
/// Implementations must present metrics in the same fixed order on every
/// invocation so repeated runs line up column-for-column.
pub trait ResultsPersister {
    fn write(&mut self, results: &[RunResult]) -> Result<()>;
}

/// The standard report: console table plus an appendable CSV named after the
/// test config, both under the results directory.
pub struct ReportPersister {
    config: TestConfig,
    csv: CsvPersister,
}

impl ReportPersister {
    pub fn new(config: TestConfig, results_dir: &Path) -> Self {
        let csv = CsvPersister::new(results_dir.join(format!("{}.csv", config.name)));
        Self { config, csv }
    }
}

impl ResultsPersister for ReportPersister {
    fn write(&mut self, results: &[RunResult]) -> Result<()> {
        TextPersister::new(std::io::stdout(), self.config.clone()).write(results)?;
        self.csv.write(results)
    }
}
