use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

use crate::error::{Result, ScheduleError};
use crate::types::{Compiled, CronExpr, FieldSet, Macro, NextRun, ScheduleSpec};

/// How far ahead `next_run` looks before giving up: four years plus a day,
/// enough to reach the next Feb 29.
pub const SEARCH_HORIZON_DAYS: u32 = 4 * 366 + 1;

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    /// Three-letter aliases; index 0 maps to `min`.
    names: &'static [&'static str],
}

const MINUTE: FieldSpec = FieldSpec { name: "minute", min: 0, max: 59, names: &[] };
const HOUR: FieldSpec = FieldSpec { name: "hour", min: 0, max: 23, names: &[] };
const DAY_OF_MONTH: FieldSpec = FieldSpec { name: "day-of-month", min: 1, max: 31, names: &[] };
const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    names: &["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"],
};
// 7 is accepted as a second spelling of Sunday.
const DAY_OF_WEEK: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 0,
    max: 7,
    names: &["sun", "mon", "tue", "wed", "thu", "fri", "sat"],
};

/// Parse a schedule expression: five cron fields or a macro token.
///
/// Fields accept `*`, a number, `a-b`, a comma-separated list of those, and
/// a `/n` step on any of them. Month and weekday fields also accept
/// three-letter names.
///
/// # Errors
///
/// `InvalidSchedule` when the expression is empty, does not have exactly
/// five fields, contains a malformed or out-of-range field, or names an
/// unknown macro.
pub fn parse(expr: &str) -> Result<ScheduleSpec> {
    let fields: Vec<&str> = expr.split_whitespace().collect();

    match fields.as_slice() {
        [] => Err(ScheduleError::InvalidSchedule("empty schedule".to_string())),
        [token] if token.starts_with('@') => {
            let macro_kind: Macro = token.parse()?;
            let compiled = match macro_kind.expansion() {
                None => Compiled::Reboot,
                Some(expansion) => {
                    let parts: Vec<&str> = expansion.split_whitespace().collect();
                    Compiled::Times(compile(&parts)?)
                }
            };
            Ok(ScheduleSpec {
                text: token.to_string(),
                macro_kind: Some(macro_kind),
                compiled,
            })
        }
        parts if parts.len() == 5 => Ok(ScheduleSpec {
            text: parts.join(" "),
            macro_kind: None,
            compiled: Compiled::Times(compile(parts)?),
        }),
        parts => Err(ScheduleError::InvalidSchedule(format!(
            "expected 5 fields or a macro, got {} field(s): {expr}",
            parts.len()
        ))),
    }
}

/// Compute the next occurrence of `spec` strictly after `now`.
///
/// `@reboot` always yields [`NextRun::Reboot`].
///
/// # Errors
///
/// `NoNextOccurrence` when nothing matches within [`SEARCH_HORIZON_DAYS`].
pub fn next_run(spec: &ScheduleSpec, now: DateTime<Utc>) -> Result<NextRun> {
    match &spec.compiled {
        Compiled::Reboot => Ok(NextRun::Reboot),
        Compiled::Times(expr) => {
            expr.next_after(now)
                .map(NextRun::At)
                .ok_or_else(|| ScheduleError::NoNextOccurrence {
                    schedule: spec.text.clone(),
                })
        }
    }
}

impl ScheduleSpec {
    /// Shorthand for [`next_run`].
    pub fn next_run(&self, now: DateTime<Utc>) -> Result<NextRun> {
        next_run(self, now)
    }
}

fn compile(parts: &[&str]) -> Result<CronExpr> {
    let mut day_of_week = parse_field(parts[4], &DAY_OF_WEEK)?;
    if day_of_week.contains(7) {
        day_of_week.remove(7);
        day_of_week.insert(0);
    }

    Ok(CronExpr {
        minute: parse_field(parts[0], &MINUTE)?,
        hour: parse_field(parts[1], &HOUR)?,
        day_of_month: parse_field(parts[2], &DAY_OF_MONTH)?,
        month: parse_field(parts[3], &MONTH)?,
        day_of_week,
        dom_star: parts[2].starts_with('*'),
        dow_star: parts[4].starts_with('*'),
    })
}

fn parse_field(raw: &str, spec: &FieldSpec) -> Result<FieldSet> {
    let invalid = |detail: String| {
        ScheduleError::InvalidSchedule(format!("{} field '{raw}': {detail}", spec.name))
    };

    let mut set = FieldSet::EMPTY;
    for item in raw.split(',') {
        if item.is_empty() {
            return Err(invalid("empty list element".to_string()));
        }

        let (range, step) = match item.split_once('/') {
            Some((range, step)) => {
                let step = parse_number(step).ok_or_else(|| invalid(format!("bad step '{step}'")))?;
                if step == 0 || step > spec.max {
                    return Err(invalid(format!("step must be within 1-{}", spec.max)));
                }
                (range, Some(step))
            }
            None => (item, None),
        };

        let (lo, hi) = if range == "*" {
            (spec.min, spec.max)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_value(a, spec).map_err(&invalid)?, parse_value(b, spec).map_err(&invalid)?)
        } else {
            let v = parse_value(range, spec).map_err(&invalid)?;
            // `5/15` means "from 5 through the end in steps of 15".
            if step.is_some() {
                (v, spec.max)
            } else {
                (v, v)
            }
        };

        if lo > hi {
            return Err(invalid(format!("range {lo}-{hi} is reversed")));
        }

        let step = step.unwrap_or(1);
        let mut v = lo;
        while v <= hi {
            set.insert(v);
            match v.checked_add(step) {
                Some(next) => v = next,
                None => break,
            }
        }
    }

    Ok(set)
}

fn parse_value(token: &str, spec: &FieldSpec) -> std::result::Result<u32, String> {
    if let Some(n) = parse_number(token) {
        if n < spec.min || n > spec.max {
            return Err(format!("{n} is outside {}-{}", spec.min, spec.max));
        }
        return Ok(n);
    }
    spec.names
        .iter()
        .position(|name| name.eq_ignore_ascii_case(token))
        .map(|idx| spec.min + idx as u32)
        .ok_or_else(|| format!("unrecognised value '{token}'"))
}

fn parse_number(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl CronExpr {
    /// Check if the expression matches the given minute.
    pub fn matches(&self, time: &DateTime<Utc>) -> bool {
        self.minute.contains(time.minute())
            && self.hour.contains(time.hour())
            && self.month.contains(time.month())
            && self.day_matches(time.date_naive())
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.day_of_month.contains(date.day());
        let dow = self.day_of_week.contains(date.weekday().num_days_from_sunday());
        if self.dom_star || self.dow_star {
            dom && dow
        } else {
            dom || dow
        }
    }

    /// Earliest whole minute strictly after `after` that matches, scanning
    /// day by day up to [`SEARCH_HORIZON_DAYS`].
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let ts = after.timestamp();
        let start = DateTime::<Utc>::from_timestamp(ts - ts.rem_euclid(60) + 60, 0)?;
        let start_minute_of_day = start.hour() * 60 + start.minute();

        let mut date = start.date_naive();
        for day in 0..SEARCH_HORIZON_DAYS {
            if self.month.contains(date.month()) && self.day_matches(date) {
                let from = if day == 0 { start_minute_of_day } else { 0 };
                if let Some((hour, minute)) = self.first_time_from(from) {
                    return date.and_hms_opt(hour, minute, 0).map(|dt| dt.and_utc());
                }
            }
            date = date.succ_opt()?;
        }
        None
    }

    /// First (hour, minute) at or after `from` (minutes since midnight).
    fn first_time_from(&self, from: u32) -> Option<(u32, u32)> {
        let (h0, m0) = (from / 60, from % 60);
        for hour in h0..24 {
            if !self.hour.contains(hour) {
                continue;
            }
            let first_minute = if hour == h0 { m0 } else { 0 };
            if let Some(minute) = (first_minute..60).find(|m| self.minute.contains(*m)) {
                return Some((hour, minute));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn next(expr: &str, from: DateTime<Utc>) -> DateTime<Utc> {
        parse(expr).unwrap().next_run(from).unwrap().at().unwrap()
    }

    #[test]
    fn daily_at_five_rolls_to_next_day() {
        assert_eq!(
            next("0 5 * * *", utc(2024, 1, 1, 6, 0, 0)),
            utc(2024, 1, 2, 5, 0, 0)
        );
    }

    #[test]
    fn daily_at_five_same_day_when_before() {
        assert_eq!(
            next("0 5 * * *", utc(2024, 1, 1, 4, 59, 59)),
            utc(2024, 1, 1, 5, 0, 0)
        );
    }

    #[test]
    fn next_is_strictly_after_now() {
        assert_eq!(
            next("0 5 * * *", utc(2024, 1, 1, 5, 0, 0)),
            utc(2024, 1, 2, 5, 0, 0)
        );
        assert_eq!(
            next("* * * * *", utc(2024, 1, 1, 5, 0, 30)),
            utc(2024, 1, 1, 5, 1, 0)
        );
    }

    #[test]
    fn every_fifteen_minutes() {
        assert_eq!(
            next("*/15 * * * *", utc(2026, 1, 19, 10, 32, 0)),
            utc(2026, 1, 19, 10, 45, 0)
        );
    }

    #[test]
    fn stepped_range_and_list() {
        // minutes 10,30,50 and 5 past -> 10:50 is next after 10:32
        assert_eq!(
            next("5,10-50/20 * * * *", utc(2026, 1, 19, 10, 32, 0)),
            utc(2026, 1, 19, 10, 50, 0)
        );
    }

    #[test]
    fn reboot_yields_sentinel() {
        let spec = parse("@reboot").unwrap();
        assert!(spec.is_reboot());
        assert_eq!(spec.next_run(utc(2024, 1, 1, 0, 0, 0)).unwrap(), NextRun::Reboot);
        assert_eq!(NextRun::Reboot.to_string(), "reboot");
    }

    #[test]
    fn interval_macros_expand() {
        let from = utc(2024, 1, 1, 10, 32, 0); // a Monday
        assert_eq!(next("@hourly", from), utc(2024, 1, 1, 11, 0, 0));
        assert_eq!(next("@daily", from), utc(2024, 1, 2, 0, 0, 0));
        assert_eq!(next("@midnight", from), utc(2024, 1, 2, 0, 0, 0));
        assert_eq!(next("@weekly", from), utc(2024, 1, 7, 0, 0, 0));
        assert_eq!(next("@monthly", from), utc(2024, 2, 1, 0, 0, 0));
        assert_eq!(next("@yearly", from), utc(2025, 1, 1, 0, 0, 0));
        assert_eq!(next("@annually", from), utc(2025, 1, 1, 0, 0, 0));
    }

    #[test]
    fn macro_text_is_kept_as_written() {
        let spec = parse("@Daily").unwrap();
        assert_eq!(spec.as_str(), "@Daily");
        assert_eq!(spec.macro_kind(), Some(Macro::Daily));
    }

    #[test]
    fn day_fields_are_ored_when_both_restricted() {
        // 13th of the month OR any Friday: 2024-01-05 is the first Friday.
        assert_eq!(
            next("0 0 13 * 5", utc(2024, 1, 1, 0, 0, 0)),
            utc(2024, 1, 5, 0, 0, 0)
        );
    }

    #[test]
    fn starred_day_of_month_requires_weekday() {
        // 2024-01-01 is a Monday; 06:00 has passed so the next Monday wins.
        assert_eq!(
            next("0 5 * * 1", utc(2024, 1, 1, 6, 0, 0)),
            utc(2024, 1, 8, 5, 0, 0)
        );
    }

    #[test]
    fn seven_means_sunday() {
        assert_eq!(
            next("0 0 * * 7", utc(2024, 1, 1, 0, 0, 0)),
            utc(2024, 1, 7, 0, 0, 0)
        );
    }

    #[test]
    fn names_are_accepted() {
        assert_eq!(
            next("30 9 * Jul mon-fri", utc(2024, 1, 1, 0, 0, 0)),
            utc(2024, 7, 1, 9, 30, 0)
        );
    }

    #[test]
    fn leap_day_found_within_horizon() {
        assert_eq!(
            next("0 0 29 2 *", utc(2024, 3, 1, 0, 0, 0)),
            utc(2028, 2, 29, 0, 0, 0)
        );
    }

    #[test]
    fn impossible_date_fails_instead_of_looping() {
        let spec = parse("0 0 30 2 *").unwrap();
        let err = spec.next_run(utc(2024, 1, 1, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, ScheduleError::NoNextOccurrence { .. }));
    }

    #[test]
    fn whitespace_is_normalised() {
        let spec = parse("  0\t5  *  * *  ").unwrap();
        assert_eq!(spec.as_str(), "0 5 * * *");
    }

    #[test]
    fn wrong_field_count_rejected() {
        assert!(matches!(parse("* * *"), Err(ScheduleError::InvalidSchedule(_))));
        assert!(matches!(parse("* * * *"), Err(ScheduleError::InvalidSchedule(_))));
        assert!(matches!(parse("* * * * * *"), Err(ScheduleError::InvalidSchedule(_))));
        assert!(matches!(parse(""), Err(ScheduleError::InvalidSchedule(_))));
        assert!(matches!(parse("   "), Err(ScheduleError::InvalidSchedule(_))));
    }

    #[test]
    fn malformed_fields_rejected() {
        for expr in [
            "60 * * * *",
            "* 24 * * *",
            "* * 0 * *",
            "* * * 13 *",
            "* * * * 8",
            "*/0 * * * *",
            "5-1 * * * *",
            "1,,2 * * * *",
            "a * * * *",
            "-1 * * * *",
            "* * * foo *",
            "1/4294967295 * * * *",
            "*/99999999999 * * * *",
            "0 */25 * * *",
        ] {
            assert!(parse(expr).is_err(), "{expr} should be rejected");
        }
    }

    #[test]
    fn unknown_macro_rejected() {
        assert!(parse("@fortnightly").is_err());
        assert!(parse("@daily extra").is_err());
    }

    #[test]
    fn serde_goes_through_parse() {
        let spec: ScheduleSpec = serde_json::from_str(r#""0  5 * * *""#).unwrap();
        assert_eq!(serde_json::to_string(&spec).unwrap(), r#""0 5 * * *""#);
        assert!(serde_json::from_str::<ScheduleSpec>(r#""* * *""#).is_err());
    }

    #[test]
    fn next_run_serializes_as_iso_utc() {
        let run = NextRun::At(utc(2024, 1, 2, 5, 0, 0));
        assert_eq!(serde_json::to_string(&run).unwrap(), r#""2024-01-02T05:00:00.000Z""#);
    }
}
