/// Report layer: aggregates, chart descriptors, and the per-selection
/// recompute that ties them to the data layer.

pub mod aggregate;
pub mod chart;
pub mod dashboard;
