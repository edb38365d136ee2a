// Reconciliation services: catalog refresh, the per-account fetch
// pipeline, and key import.
pub mod catalog;
pub mod import;
pub mod pipeline;

pub use catalog::ChainCatalog;
pub use import::KeyImportFlow;
pub use pipeline::FetchPipeline;
