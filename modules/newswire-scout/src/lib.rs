pub mod digest;
pub mod report;

pub use digest::render_digest;
pub use report::{MarkdownReportWriter, ReportOutcome, ReportWriter};
