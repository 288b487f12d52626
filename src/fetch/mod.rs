pub mod aggregator;
pub mod pager;
pub mod types;
pub mod worker;

pub use aggregator::{Aggregator, FetchSettings};
pub use pager::{FetchError, LogPager};
pub use types::{FetchRequest, LogEntry, Page, SourceDescriptor};
