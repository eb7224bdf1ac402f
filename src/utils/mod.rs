pub mod data;
pub mod logging;
pub mod report;
pub mod screenshot;

pub use data::DataHandler;
pub use report::{ReportGenerator, TestRecord, TestStatus};
pub use screenshot::ScreenshotManager;
