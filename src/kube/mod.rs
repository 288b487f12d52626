pub mod client;
pub mod selector;
pub mod traits;

pub use client::{KubeClient, KubeClientError};
pub use selector::SourceSelector;
pub use traits::{DirectoryError, LineStream, LogStreamer, SourceDirectory, StreamError};
