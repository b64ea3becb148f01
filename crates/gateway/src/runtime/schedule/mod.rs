//! Schedule building and cron evaluation.
//!
//! Split into submodules:
//! - [`builder`]: the three-mode form builder (preset / simple / custom)
//! - [`cron`]: timezone-aware 6-field cron evaluation
//! - [`validation`]: acceptance checks for cron, URLs, and timezones

pub mod builder;
pub mod cron;
pub mod validation;

pub use builder::{preset_by_id, BuildError, BuiltSchedule, IntervalUnit, Preset, ScheduleForm, PRESETS};
pub use cron::{cron_matches, cron_next, cron_next_n, cron_next_n_tz, cron_next_tz, parse_tz};
pub use validation::{validate_cron, validate_timezone, validate_url};
