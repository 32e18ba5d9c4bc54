pub mod collector;
pub mod cores;
pub mod driver;
pub mod persist;
pub mod results;

pub use collector::ResultsCollector;
pub use driver::TestDriver;
pub use persist::{CsvPersister, ReportPersister, ResultsPersister, TextPersister};
pub use results::{DoubleSummary, LongSummary, RunResult};
