//! Core runtime: schedule building, cron evaluation, job storage, and
//! the delivery loop that ties them together.
//!
//! The flow: the API stores [`jobs::Job`]s whose cron expressions come
//! out of [`schedule::ScheduleForm::build`]; every scheduler tick the
//! [`runner::JobRunner`] fires due jobs through the
//! [`executor::Executor`] and records the outcome in the
//! [`run_log::RunLogStore`].

pub mod executor;
pub mod jobs;
pub mod run_log;
pub mod runner;
pub mod schedule;
