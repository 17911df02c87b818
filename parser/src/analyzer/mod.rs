#[allow(clippy::module_inception)]
pub mod analyzer;
pub mod playtime;
pub mod report;
pub mod session;

pub use analyzer::Analyzer;
