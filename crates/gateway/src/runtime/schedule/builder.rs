//! Schedule expression builder: a snapshot of schedule-form state in, a
//! 6-field cron expression plus a human-readable description out.
//!
//! This is the same three-mode builder the job form exposes. `Preset`
//! passes a catalog entry through untouched, `Simple` composes an
//! every-N expression from an interval and unit, and `Custom` accepts
//! free-text cron. Building is pure and synchronous; nothing here
//! touches the stores.

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Form state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Interval unit for the simple builder.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Minutes,
    Hours,
    Days,
}

/// One schedule-form snapshot, tagged by mode.
///
/// `interval` and `time` carry the raw text of their form fields; they
/// are parsed and range-checked exactly once, in [`ScheduleForm::build`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScheduleForm {
    /// A pre-enumerated catalog entry. Expression and label are used
    /// verbatim; the catalog itself lives in [`PRESETS`].
    Preset { expression: String, label: String },
    /// Every N minutes/hours/days, with a time of day when daily.
    Simple {
        interval: String,
        unit: IntervalUnit,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<String>,
    },
    /// Free-text cron expression.
    Custom { expression: String },
}

/// The built result: what gets written into the job.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuiltSchedule {
    pub expression: String,
    pub description: String,
}

/// Why a form snapshot failed to build. Every variant maps to a field
/// the caller can point at.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("interval is required")]
    IntervalMissing,
    #[error("interval must be a whole number, got {0:?}")]
    IntervalNotNumeric(String),
    #[error("interval must be at least 1")]
    IntervalNotPositive,
    #[error("a time of day is required for daily schedules")]
    TimeMissing,
    #[error("time of day must be HH:MM, got {0:?}")]
    TimeInvalid(String),
    #[error("custom cron expression is empty")]
    CustomEmpty,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Building
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl ScheduleForm {
    /// Build the cron expression and description for this snapshot.
    ///
    /// All validation happens here, before any output exists:
    /// - the interval must parse to a positive integer;
    /// - daily schedules need a `H:MM` time with hour 0-23, minute 0-59;
    /// - custom expressions must be non-empty.
    ///
    /// Custom text is otherwise passed through verbatim. Whether it is
    /// well-formed cron is the job-acceptance boundary's concern
    /// (`validate_cron`), so legacy expressions can still round-trip
    /// through an edit form unchanged.
    pub fn build(&self) -> Result<BuiltSchedule, BuildError> {
        match self {
            ScheduleForm::Preset { expression, label } => Ok(BuiltSchedule {
                expression: expression.clone(),
                description: label.clone(),
            }),
            ScheduleForm::Simple {
                interval,
                unit,
                time,
            } => {
                let n = parse_interval(interval)?;
                match unit {
                    IntervalUnit::Minutes => Ok(BuiltSchedule {
                        expression: format!("0 */{n} * * * *"),
                        // The short unit word is fixed; it never pluralizes.
                        description: format!("Every {n} min"),
                    }),
                    IntervalUnit::Hours => Ok(BuiltSchedule {
                        expression: format!("0 0 */{n} * * *"),
                        description: format!("Every {n} hour{}", plural(n)),
                    }),
                    IntervalUnit::Days => {
                        let raw = time.as_deref().map(str::trim).unwrap_or("");
                        if raw.is_empty() {
                            return Err(BuildError::TimeMissing);
                        }
                        let (hour, minute) = split_time(raw)?;
                        // The hour/minute substrings go into the
                        // expression as typed: "9:05" keeps its "05".
                        Ok(BuiltSchedule {
                            expression: format!("0 {minute} {hour} */{n} * *"),
                            description: format!("Every {n} day{} at {raw}", plural(n)),
                        })
                    }
                }
            }
            ScheduleForm::Custom { expression } => {
                if expression.trim().is_empty() {
                    return Err(BuildError::CustomEmpty);
                }
                Ok(BuiltSchedule {
                    expression: expression.clone(),
                    description: "Custom".into(),
                })
            }
        }
    }

    /// The form snapshot an edit view starts from.
    ///
    /// A job opened for editing already carries a stored expression, so
    /// the form comes up in custom mode seeded with it; building again
    /// without touching anything yields the stored expression verbatim.
    pub fn seed_for_edit(expression: &str) -> Self {
        ScheduleForm::Custom {
            expression: expression.to_string(),
        }
    }
}

fn parse_interval(raw: &str) -> Result<u32, BuildError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BuildError::IntervalMissing);
    }
    let n: u32 = trimmed
        .parse()
        .map_err(|_| BuildError::IntervalNotNumeric(trimmed.to_string()))?;
    if n == 0 {
        return Err(BuildError::IntervalNotPositive);
    }
    Ok(n)
}

/// Split `H:MM` into its raw halves, range-checking both.
fn split_time(raw: &str) -> Result<(&str, &str), BuildError> {
    let invalid = || BuildError::TimeInvalid(raw.to_string());
    let (hour, minute) = raw.split_once(':').ok_or_else(invalid)?;
    let h: u32 = hour.trim().parse().map_err(|_| invalid())?;
    let m: u32 = minute.trim().parse().map_err(|_| invalid())?;
    if h > 23 || m > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

fn plural(n: u32) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Preset catalog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One entry of the fixed preset catalog.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub expression: &'static str,
    pub label: &'static str,
}

/// The catalog the preset selector offers. Served read-only over the
/// API; the builder never checks membership, it trusts the pair the
/// form hands back.
pub const PRESETS: &[Preset] = &[
    Preset {
        id: "every_minute",
        expression: "0 * * * * *",
        label: "Every minute",
    },
    Preset {
        id: "every_5_minutes",
        expression: "0 */5 * * * *",
        label: "Every 5 minutes",
    },
    Preset {
        id: "every_15_minutes",
        expression: "0 */15 * * * *",
        label: "Every 15 minutes",
    },
    Preset {
        id: "every_30_minutes",
        expression: "0 */30 * * * *",
        label: "Every 30 minutes",
    },
    Preset {
        id: "hourly",
        expression: "0 0 * * * *",
        label: "Every hour",
    },
    Preset {
        id: "daily_midnight",
        expression: "0 0 0 * * *",
        label: "Every day at midnight",
    },
    Preset {
        id: "weekly_sunday",
        expression: "0 0 0 * * 0",
        label: "Every Sunday at midnight",
    },
    Preset {
        id: "monthly_first",
        expression: "0 0 0 1 * *",
        label: "Monthly on the 1st at midnight",
    },
];

/// Look up a catalog entry by id.
pub fn preset_by_id(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id == id)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(interval: &str, unit: IntervalUnit, time: Option<&str>) -> ScheduleForm {
        ScheduleForm::Simple {
            interval: interval.into(),
            unit,
            time: time.map(String::from),
        }
    }

    #[test]
    fn minutes_interval_formats_expression_and_description() {
        let built = simple("5", IntervalUnit::Minutes, None).build().unwrap();
        assert_eq!(built.expression, "0 */5 * * * *");
        assert_eq!(built.description, "Every 5 min");
    }

    #[test]
    fn minutes_unit_word_never_pluralizes() {
        let one = simple("1", IntervalUnit::Minutes, None).build().unwrap();
        let many = simple("10", IntervalUnit::Minutes, None).build().unwrap();
        assert_eq!(one.description, "Every 1 min");
        assert_eq!(many.description, "Every 10 min");
    }

    #[test]
    fn hours_interval_singular_at_one() {
        let built = simple("1", IntervalUnit::Hours, None).build().unwrap();
        assert_eq!(built.expression, "0 0 */1 * * *");
        assert_eq!(built.description, "Every 1 hour");
    }

    #[test]
    fn hours_interval_plural_above_one() {
        let built = simple("2", IntervalUnit::Hours, None).build().unwrap();
        assert_eq!(built.expression, "0 0 */2 * * *");
        assert_eq!(built.description, "Every 2 hours");
    }

    #[test]
    fn days_interval_includes_literal_time() {
        let built = simple("3", IntervalUnit::Days, Some("14:30"))
            .build()
            .unwrap();
        assert_eq!(built.expression, "0 30 14 */3 * *");
        assert_eq!(built.description, "Every 3 days at 14:30");
    }

    #[test]
    fn days_interval_singular_at_one() {
        let built = simple("1", IntervalUnit::Days, Some("08:00"))
            .build()
            .unwrap();
        assert_eq!(built.expression, "0 00 08 */1 * *");
        assert_eq!(built.description, "Every 1 day at 08:00");
    }

    #[test]
    fn time_substrings_are_not_reformatted() {
        // A single-digit hour stays single-digit; the minute keeps its
        // leading zero. No zero-padding is invented either way.
        let built = simple("2", IntervalUnit::Days, Some("9:05"))
            .build()
            .unwrap();
        assert_eq!(built.expression, "0 05 9 */2 * *");
        assert_eq!(built.description, "Every 2 days at 9:05");
    }

    #[test]
    fn interval_parses_to_a_typed_integer_once() {
        // "05" is parsed, so the expression carries the integer form.
        let built = simple("05", IntervalUnit::Minutes, None).build().unwrap();
        assert_eq!(built.expression, "0 */5 * * * *");
        assert_eq!(built.description, "Every 5 min");
    }

    #[test]
    fn blank_interval_is_rejected() {
        let err = simple("", IntervalUnit::Minutes, None).build().unwrap_err();
        assert_eq!(err, BuildError::IntervalMissing);
        let err = simple("   ", IntervalUnit::Hours, None).build().unwrap_err();
        assert_eq!(err, BuildError::IntervalMissing);
    }

    #[test]
    fn non_numeric_interval_is_rejected() {
        let err = simple("abc", IntervalUnit::Minutes, None)
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::IntervalNotNumeric("abc".into()));
        let err = simple("2.5", IntervalUnit::Hours, None).build().unwrap_err();
        assert_eq!(err, BuildError::IntervalNotNumeric("2.5".into()));
        let err = simple("-3", IntervalUnit::Days, Some("10:00"))
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::IntervalNotNumeric("-3".into()));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = simple("0", IntervalUnit::Minutes, None).build().unwrap_err();
        assert_eq!(err, BuildError::IntervalNotPositive);
    }

    #[test]
    fn days_without_time_is_rejected() {
        let err = simple("3", IntervalUnit::Days, None).build().unwrap_err();
        assert_eq!(err, BuildError::TimeMissing);
        let err = simple("3", IntervalUnit::Days, Some("")).build().unwrap_err();
        assert_eq!(err, BuildError::TimeMissing);
    }

    #[test]
    fn malformed_time_is_rejected() {
        for bad in ["14", "25:00", "14:60", "aa:bb", "14:30:00"] {
            let err = simple("1", IntervalUnit::Days, Some(bad))
                .build()
                .unwrap_err();
            assert_eq!(
                err,
                BuildError::TimeInvalid(bad.into()),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn custom_passes_text_through_verbatim() {
        let form = ScheduleForm::Custom {
            expression: "*/10 * * * * *".into(),
        };
        let built = form.build().unwrap();
        assert_eq!(built.expression, "*/10 * * * * *");
        assert_eq!(built.description, "Custom");
    }

    #[test]
    fn custom_description_ignores_content() {
        // Even text that is nowhere near valid cron builds; the
        // acceptance boundary decides whether to store it.
        let form = ScheduleForm::Custom {
            expression: "whenever you like".into(),
        };
        assert_eq!(form.build().unwrap().description, "Custom");
    }

    #[test]
    fn empty_custom_is_rejected() {
        for empty in ["", "   ", "\t"] {
            let form = ScheduleForm::Custom {
                expression: empty.into(),
            };
            assert_eq!(form.build().unwrap_err(), BuildError::CustomEmpty);
        }
    }

    #[test]
    fn preset_is_identity() {
        let form = ScheduleForm::Preset {
            expression: "0 0 * * * *".into(),
            label: "Every hour".into(),
        };
        let built = form.build().unwrap();
        assert_eq!(built.expression, "0 0 * * * *");
        assert_eq!(built.description, "Every hour");
    }

    #[test]
    fn seeding_from_existing_expression_forces_custom() {
        // Legacy 5-field expressions round-trip untouched through an
        // edit: the form opens in custom mode and rebuilding yields the
        // stored text.
        let form = ScheduleForm::seed_for_edit("5 4 * * *");
        assert!(matches!(form, ScheduleForm::Custom { .. }));
        let built = form.build().unwrap();
        assert_eq!(built.expression, "5 4 * * *");
        assert_eq!(built.description, "Custom");
    }

    #[test]
    fn form_deserializes_from_tagged_json() {
        let form: ScheduleForm = serde_json::from_str(
            r#"{"mode":"simple","interval":"15","unit":"minutes"}"#,
        )
        .unwrap();
        let built = form.build().unwrap();
        assert_eq!(built.expression, "0 */15 * * * *");

        let form: ScheduleForm =
            serde_json::from_str(r#"{"mode":"custom","expression":"0 0 9 * * 1-5"}"#).unwrap();
        assert_eq!(
            form.build().unwrap(),
            BuiltSchedule {
                expression: "0 0 9 * * 1-5".into(),
                description: "Custom".into(),
            }
        );
    }

    #[test]
    fn preset_catalog_lookup_by_id() {
        let hourly = preset_by_id("hourly").unwrap();
        assert_eq!(hourly.expression, "0 0 * * * *");
        assert!(preset_by_id("no_such_preset").is_none());
    }
}
