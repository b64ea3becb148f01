//! CronForge gateway: schedule builder, job store, scheduler loop, and
//! the JSON API that fronts them.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
