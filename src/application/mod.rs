//! Application layer: the source registry and the scatter-gather
//! orchestrator that fans lookup batches out across registered sources and
//! routes payments to the source owning a citation.

pub mod orchestrator;
pub mod registry;
