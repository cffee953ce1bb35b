// Pagination: TOC projection and page partitioning.
// Pure, synchronous and deterministic. Nothing in here touches I/O or the renderer.

pub mod handlers;
pub mod labels;
pub mod overrides;
pub mod partition;
pub mod toc;

use thiserror::Error;

// Re-export the public API consumed by the export pipeline and handlers.
pub use overrides::CosmeticOverrides;
pub use partition::{
    partition, CoverPage, PageBlock, PageKind, PagePayload, RunningFooter, RunningHeader,
};
pub use toc::{project, TocEntry};

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// TOC/footer numbering disagreement. Indicates a defect, never bad input.
    #[error("partition invariant violated: {0}")]
    InvariantViolation(String),
}
