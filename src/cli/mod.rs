pub mod run;

pub use run::{run_fetch, run_serve, FetchArgs, RunError};
