//! Persistent jobs: model and store.
//!
//! Jobs are persisted to `<data_dir>/jobs.json`. The store owns the
//! in-memory map, persists every mutation, and broadcasts [`JobEvent`]s
//! for the SSE feed.

pub mod model;
pub mod store;

pub use model::{HttpMethod, Job, JobEvent, JobStatus, JobView, RunStatus};
pub use store::JobStore;
