mod database;
mod error;
mod logging;
mod profiler;
mod report;
mod screener;
mod sequence;
mod types;

pub use database::*;
pub use error::*;
pub use logging::*;
pub use profiler::*;
pub use report::*;
pub use screener::*;
pub use sequence::*;
pub use types::*;
