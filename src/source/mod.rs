pub mod filter;
pub mod line;

pub use filter::LineFilter;
pub use line::{parse_line, parse_timestamp, LineError, ParsedLine};
