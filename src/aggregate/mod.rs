// The three aggregators: weighted keyword frequency, pairwise
// co-occurrence and hourly distribution. Each is a `Job` for the
// map/reduce plumbing plus the consumer that turns its output into a view.

pub mod cooccurrence;
pub mod frequency;
pub mod time_bucket;
