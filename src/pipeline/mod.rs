// Pipeline orchestration: the per-title keyword pipeline and the
// file-level stages that chain it into the three aggregation jobs.

pub mod stages;
pub mod title;
