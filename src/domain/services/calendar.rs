use crate::domain::models::{appointment::Appointment, user::User};
use crate::domain::services::availability::parse_hhmm;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// Resolves a local date and `HH:MM` in the business timezone to UTC.
/// `None` for malformed times or local times skipped by a DST change.
pub fn local_to_utc(tz: Tz, date: NaiveDate, hhmm: &str) -> Option<DateTime<Utc>> {
    let time = parse_hhmm(hhmm)?;
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Generates an iCalendar (.ics) string for a confirmed appointment
pub fn generate_ics(appointment: &Appointment, professional: &User, service_name: Option<&str>, tz: Tz) -> Option<String> {
    let start = local_to_utc(tz, appointment.date, &appointment.start_time)?;
    let end = local_to_utc(tz, appointment.date, &appointment.end_time)
        .filter(|end| *end > start)
        .unwrap_or(start + chrono::Duration::minutes(crate::domain::services::availability::SLOT_STEP_MINUTES));

    let summary = match service_name {
        Some(name) => format!("{} with {}", name, professional.name),
        None => format!("Appointment with {}", professional.name),
    };

    let mut calendar = Calendar::new();

    let ical_event = IcalEvent::new()
        .summary(&summary)
        .description(appointment.notes.as_deref().unwrap_or(""))
        .starts(start)
        .ends(end)
        .uid(&appointment.id)
        .done();

    calendar.push(ical_event);
    Some(calendar.to_string())
}
