// Hotwords: keyword analytics for the Weibo hot-search list
//
// This is the library root. Each module corresponds to a major subsystem
// of the pipeline: fetch the list, segment titles into keywords, aggregate
// them with map/reduce jobs, then report.

pub mod aggregate;
pub mod config;
pub mod fetch;
pub mod mapreduce;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod text;
