//! Source-to-graph transform pipeline
//!
//! The dispatcher, the stage cache it consults, and the post-processor it
//! runs on emitted tables.

mod cache;
mod dispatcher;
mod postprocess;

pub use cache::StageCacheGuard;
pub use dispatcher::{
    RunOptions, RunReport, SourceFailure, SourceReport, TransformDispatcher, TransformError,
};
pub use postprocess::{deduplicate, DedupReport, PostProcessError};
