//! Pay period aggregation functionality.
//!
//! This module groups one employee's time entries into a pay period and
//! splits the worked time of each calendar week into regular and overtime
//! hours.
//!
//! ## Weekly Overtime
//!
//! A pay period is decomposed into Monday-to-Sunday weeks clipped to the
//! period. Within each week the first `threshold` hours are regular and the
//! rest are overtime. Splitting happens in whole minutes so no rounding
//! enters until hours are reported.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, PayPeriod, TimeEntry};

/// Number of decimal places hours are reported with.
pub const HOURS_DECIMAL_PLACES: u32 = 4;

/// Converts whole minutes to hours rounded to [`HOURS_DECIMAL_PLACES`].
///
/// # Example
///
/// ```
/// use bookkeeping_engine::calculation::minutes_to_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(minutes_to_hours(90), Decimal::new(15, 1));
/// assert_eq!(minutes_to_hours(20), Decimal::new(3333, 4));
/// ```
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    (Decimal::from(minutes) / Decimal::from(60))
        .round_dp_with_strategy(HOURS_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Worked time for one calendar week of a pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    /// The Monday starting the calendar week.
    pub week_start: NaiveDate,
    /// First day of the week inside the pay period.
    pub start_date: NaiveDate,
    /// Last day of the week inside the pay period.
    pub end_date: NaiveDate,
    /// Total worked minutes in the week.
    pub worked_minutes: i64,
    /// Minutes up to the weekly threshold.
    pub regular_minutes: i64,
    /// Minutes beyond the weekly threshold.
    pub overtime_minutes: i64,
    /// Regular minutes as hours.
    pub regular_hours: Decimal,
    /// Overtime minutes as hours.
    pub overtime_hours: Decimal,
    /// Entries worked in the week, in start order.
    pub entry_ids: Vec<String>,
}

/// Hours worked by one employee over one pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedHours {
    /// The employee the hours belong to.
    pub employee_id: String,
    /// The period aggregated.
    pub pay_period: PayPeriod,
    /// Entries counted into the period, in start order.
    pub entry_ids: Vec<String>,
    /// Sum of regular minutes across all weeks.
    pub regular_minutes: i64,
    /// Sum of overtime minutes across all weeks.
    pub overtime_minutes: i64,
    /// Total worked hours.
    pub total_hours: Decimal,
    /// Hours paid at the regular rate.
    pub regular_hours: Decimal,
    /// Hours paid at the overtime rate.
    pub overtime_hours: Decimal,
    /// Per-week breakdown, oldest first.
    pub weeks: Vec<WeeklyHours>,
    /// Audit steps recording the aggregation.
    pub audit_steps: Vec<AuditStep>,
}

/// Aggregates an employee's time entries into regular and overtime hours.
///
/// Entries dated outside the period are ignored. Every submitted entry must
/// still belong to `employee_id` and end after it starts, and no two entries
/// inside the period may overlap.
///
/// # Errors
///
/// - `InvalidPayPeriod` if the period ends before it starts
/// - `InvalidTimeEntry` if an entry is malformed or belongs to another employee
/// - `OverlappingTimeEntries` if two entries share any instant
///
/// # Example
///
/// ```
/// use bookkeeping_engine::calculation::aggregate_pay_period;
/// use bookkeeping_engine::config::PayrollConfig;
/// use bookkeeping_engine::models::{PayPeriod, TimeEntry};
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 1, 11).unwrap(),
/// )
/// .unwrap();
/// let entries: Vec<TimeEntry> = (5..=9)
///     .map(|day| TimeEntry {
///         id: format!("te_{}", day),
///         employee_id: "emp_001".to_string(),
///         date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
///         start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
///         end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///         notes: None,
///     })
///     .collect();
///
/// let hours = aggregate_pay_period("emp_001", &period, &entries, &PayrollConfig::default()).unwrap();
/// assert_eq!(hours.regular_hours, Decimal::from(40));
/// assert_eq!(hours.overtime_hours, Decimal::from(5));
/// ```
pub fn aggregate_pay_period(
    employee_id: &str,
    pay_period: &PayPeriod,
    entries: &[TimeEntry],
    config: &PayrollConfig,
) -> EngineResult<AggregatedHours> {
    pay_period.validate()?;

    for entry in entries {
        entry.validate()?;
        if entry.employee_id != employee_id {
            return Err(EngineError::InvalidTimeEntry {
                entry_id: entry.id.clone(),
                message: format!(
                    "entry belongs to employee '{}', not '{}'",
                    entry.employee_id, employee_id
                ),
            });
        }
    }

    let mut in_period: Vec<&TimeEntry> = entries
        .iter()
        .filter(|e| pay_period.contains_date(e.date))
        .collect();
    in_period.sort_by(|a, b| a.starts_at().cmp(&b.starts_at()).then(a.id.cmp(&b.id)));
    check_no_overlaps(&in_period)?;

    let mut audit_steps = Vec::new();
    let mut step_number = 1;

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "pay_period_entries".to_string(),
        rule_name: "Pay Period Entry Selection".to_string(),
        input: serde_json::json!({
            "employee_id": employee_id,
            "period_start": pay_period.start_date.to_string(),
            "period_end": pay_period.end_date.to_string(),
            "submitted_entries": entries.len(),
        }),
        output: serde_json::json!({
            "counted_entries": in_period.len(),
            "entry_ids": in_period.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
        }),
        reasoning: format!(
            "{} of {} submitted entries fall within {} to {}",
            in_period.len(),
            entries.len(),
            pay_period.start_date,
            pay_period.end_date
        ),
    });
    step_number += 1;

    let threshold_minutes = config.weekly_threshold_minutes();
    let mut weeks = Vec::new();

    for span in pay_period.weeks()? {
        let week_entries: Vec<&TimeEntry> = in_period
            .iter()
            .copied()
            .filter(|e| span.contains_date(e.date))
            .collect();
        let worked_minutes: i64 = week_entries.iter().map(|e| e.worked_minutes()).sum();
        let regular_minutes = worked_minutes.min(threshold_minutes);
        let overtime_minutes = (worked_minutes - threshold_minutes).max(0);

        let regular_hours = minutes_to_hours(regular_minutes);
        let overtime_hours = minutes_to_hours(overtime_minutes);
        let worked_hours = minutes_to_hours(worked_minutes);

        let reasoning = if overtime_minutes > 0 {
            format!(
                "Week of {}: {} hours worked exceeds {} hour threshold by {} hours",
                span.week_start,
                worked_hours.normalize(),
                config.weekly_overtime_threshold_hours,
                overtime_hours.normalize()
            )
        } else {
            format!(
                "Week of {}: {} hours worked is within {} hour threshold, no overtime",
                span.week_start,
                worked_hours.normalize(),
                config.weekly_overtime_threshold_hours
            )
        };

        audit_steps.push(AuditStep {
            step_number,
            rule_id: "weekly_overtime_split".to_string(),
            rule_name: "Weekly Overtime Split".to_string(),
            input: serde_json::json!({
                "week_start": span.week_start.to_string(),
                "start_date": span.start_date.to_string(),
                "end_date": span.end_date.to_string(),
                "worked_hours": worked_hours.normalize().to_string(),
                "threshold_hours": config.weekly_overtime_threshold_hours,
            }),
            output: serde_json::json!({
                "regular_hours": regular_hours.normalize().to_string(),
                "overtime_hours": overtime_hours.normalize().to_string(),
            }),
            reasoning,
        });
        step_number += 1;

        weeks.push(WeeklyHours {
            week_start: span.week_start,
            start_date: span.start_date,
            end_date: span.end_date,
            worked_minutes,
            regular_minutes,
            overtime_minutes,
            regular_hours,
            overtime_hours,
            entry_ids: week_entries.iter().map(|e| e.id.clone()).collect(),
        });
    }

    let regular_minutes: i64 = weeks.iter().map(|w| w.regular_minutes).sum();
    let overtime_minutes: i64 = weeks.iter().map(|w| w.overtime_minutes).sum();

    Ok(AggregatedHours {
        employee_id: employee_id.to_string(),
        pay_period: *pay_period,
        entry_ids: in_period.iter().map(|e| e.id.clone()).collect(),
        regular_minutes,
        overtime_minutes,
        total_hours: minutes_to_hours(regular_minutes + overtime_minutes),
        regular_hours: minutes_to_hours(regular_minutes),
        overtime_hours: minutes_to_hours(overtime_minutes),
        weeks,
        audit_steps,
    })
}

/// Fails on the first pair of entries sharing an instant.
///
/// Expects entries sorted by start; an entry overlaps an earlier one iff it
/// starts before the latest end seen so far.
fn check_no_overlaps(sorted: &[&TimeEntry]) -> EngineResult<()> {
    let mut latest: Option<&TimeEntry> = None;
    for entry in sorted {
        if let Some(previous) = latest {
            if entry.starts_at() < previous.ends_at() {
                return Err(EngineError::OverlappingTimeEntries {
                    first_id: previous.id.clone(),
                    second_id: entry.id.clone(),
                });
            }
        }
        if latest.is_none_or(|previous| entry.ends_at() > previous.ends_at()) {
            latest = Some(entry);
        }
    }
    Ok(())
}
