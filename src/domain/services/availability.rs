use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use std::collections::HashSet;
use crate::domain::models::availability::AvailabilityOverride;
use crate::domain::models::schedule::{DaySchedule, WeeklySchedule};

/// Width of a bookable slot and the grid step.
pub const SLOT_STEP_MINUTES: i64 = 30;

pub const DEFAULT_OPEN: &str = "09:00";
pub const DEFAULT_CLOSE: &str = "17:00";

const TIME_FORMAT: &str = "%H:%M";

pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    // chrono accepts "9:00"; the wire format is strictly zero-padded.
    if value.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Every time from `start` to `end` inclusive at `step_min`.
/// Stops at midnight instead of wrapping into the next day.
pub fn generate_grid(start: NaiveTime, end: NaiveTime, step_min: i64) -> Vec<NaiveTime> {
    let mut grid = Vec::new();
    if step_min <= 0 || end < start {
        return grid;
    }

    let step = Duration::minutes(step_min);
    let mut cursor = start;
    while cursor <= end {
        grid.push(cursor);
        let (next, wrapped) = cursor.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        cursor = next;
    }
    grid
}

fn default_window() -> (NaiveTime, NaiveTime) {
    (
        NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
        NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
    )
}

/// Schedule reported for professionals who never saved one.
pub fn default_weekly_schedule() -> WeeklySchedule {
    let day = || Some(DaySchedule { is_open: true, start: DEFAULT_OPEN.into(), end: DEFAULT_CLOSE.into() });
    WeeklySchedule {
        monday: day(),
        tuesday: day(),
        wednesday: day(),
        thursday: day(),
        friday: day(),
        saturday: day(),
        sunday: day(),
    }
}

/// Checks that every open day has a valid `HH:MM` window with `end > start`.
pub fn validate_weekly_schedule(schedule: &WeeklySchedule) -> Result<(), String> {
    for (weekday, day) in schedule.days() {
        let Some(day) = day.filter(|d| d.is_open) else { continue };
        let (Some(start), Some(end)) = (parse_hhmm(&day.start), parse_hhmm(&day.end)) else {
            return Err(format!("{}: times must be HH:MM", weekday));
        };
        if end <= start {
            return Err(format!("{}: end must be after start", weekday));
        }
    }
    Ok(())
}

/// Open window for a weekday, or `None` when the day is closed.
/// Missing or unreadable schedule data falls back to the default window.
pub fn day_window(schedule: Option<&WeeklySchedule>, weekday: Weekday) -> Option<(NaiveTime, NaiveTime)> {
    let Some(day) = schedule.and_then(|s| s.day(weekday)) else {
        return Some(default_window());
    };

    if !day.is_open {
        return None;
    }

    match (parse_hhmm(&day.start), parse_hhmm(&day.end)) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => Some(default_window()),
    }
}

/// Bookable slot start times for one professional on one date, as `HH:MM`.
///
/// The grid comes from the weekday window, then slots in `taken` and
/// slots the override marks unavailable are removed. Override entries
/// that are not on the grid are ignored. A slot must also end on the
/// same day, so a window reaching 23:30 or later stops at 23:00.
/// Output is chronological.
pub fn compute_bookable_slots(
    schedule: Option<&WeeklySchedule>,
    date: NaiveDate,
    override_rule: Option<&AvailabilityOverride>,
    taken: &[String],
) -> Vec<String> {
    if override_rule.is_some_and(|o| o.is_closed) {
        return Vec::new();
    }

    let Some((start, end)) = day_window(schedule, date.weekday()) else {
        return Vec::new();
    };

    let taken: HashSet<NaiveTime> = taken.iter().filter_map(|t| parse_hhmm(t)).collect();

    let blocked: HashSet<NaiveTime> = override_rule
        .map(|o| o.slots())
        .unwrap_or_default()
        .into_iter()
        .filter(|s| !s.available)
        .filter_map(|s| parse_hhmm(&s.time))
        .collect();

    generate_grid(start, end, SLOT_STEP_MINUTES)
        .into_iter()
        .filter(|slot| ends_same_day(*slot))
        .filter(|slot| !taken.contains(slot) && !blocked.contains(slot))
        .map(format_hhmm)
        .collect()
}

/// Drops slots that start at or before `now` (used for "today").
pub fn drop_elapsed(slots: Vec<String>, now: NaiveTime) -> Vec<String> {
    slots
        .into_iter()
        .filter(|s| parse_hhmm(s).is_some_and(|t| t > now))
        .collect()
}

fn ends_same_day(start: NaiveTime) -> bool {
    start.overflowing_add_signed(Duration::minutes(SLOT_STEP_MINUTES)).1 == 0
}

/// End of the slot starting at `start`. Bookable slots never cross midnight,
/// so for them this is always later than `start`.
pub fn slot_end(start: NaiveTime) -> NaiveTime {
    start.overflowing_add_signed(Duration::minutes(SLOT_STEP_MINUTES)).0
}
