use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use crate::domain::models::appointment::Appointment;
use crate::domain::models::job::{Job, JOB_APPOINTMENT_CREATED, JOB_APPOINTMENT_STATUS, JOB_REMINDER, JOB_VERIFY_EMAIL};
use crate::domain::services::calendar::local_to_utc;

pub const REMINDER_LEAD_HOURS: i64 = 24;

pub const TEMPLATE_VERIFY_EMAIL: &str = "verify_email.html";
pub const TEMPLATE_APPOINTMENT_CREATED: &str = "appointment_created.html";
pub const TEMPLATE_APPOINTMENT_STATUS: &str = "appointment_status.html";
pub const TEMPLATE_REMINDER: &str = "reminder.html";

/// Template name and subject line for a job type.
pub fn template_for(job_type: &str) -> Option<(&'static str, &'static str)> {
    match job_type {
        JOB_VERIFY_EMAIL => Some((TEMPLATE_VERIFY_EMAIL, "Verify your Booked account")),
        JOB_APPOINTMENT_CREATED => Some((TEMPLATE_APPOINTMENT_CREATED, "New appointment request")),
        JOB_APPOINTMENT_STATUS => Some((TEMPLATE_APPOINTMENT_STATUS, "Your appointment was updated")),
        JOB_REMINDER => Some((TEMPLATE_REMINDER, "Reminder: upcoming appointment")),
        _ => None,
    }
}

/// Reminder job 24h before the appointment, if that moment is still ahead.
pub fn reminder_job(appointment: &Appointment, tz: Tz, now: DateTime<Utc>) -> Option<Job> {
    let starts_at = local_to_utc(tz, appointment.date, &appointment.start_time)?;
    let remind_at = starts_at - Duration::hours(REMINDER_LEAD_HOURS);
    (remind_at > now).then(|| Job::new(JOB_REMINDER, appointment.id.clone(), remind_at))
}

/// Jobs queued together with a new appointment.
pub fn jobs_for_new_appointment(appointment: &Appointment, tz: Tz, now: DateTime<Utc>) -> Vec<Job> {
    let mut jobs = vec![Job::new(JOB_APPOINTMENT_CREATED, appointment.id.clone(), now)];
    jobs.extend(reminder_job(appointment, tz, now));
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::appointment::NewAppointmentParams;
    use chrono::NaiveDate;

    fn appointment_on(date: NaiveDate, start: &str) -> Appointment {
        Appointment::new(NewAppointmentParams {
            client_id: "c".into(),
            professional_id: "p".into(),
            service_id: None,
            date,
            start_time: start.into(),
            end_time: "23:59".into(),
            notes: None,
        })
    }

    #[test]
    fn test_reminder_scheduled_a_day_ahead() {
        let now = DateTime::parse_from_rfc3339("2030-01-01T08:00:00Z").unwrap().with_timezone(&Utc);
        let appt = appointment_on(NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(), "10:00");
        let job = reminder_job(&appt, chrono_tz::UTC, now).unwrap();
        assert_eq!(job.job_type, JOB_REMINDER);
        assert_eq!(job.execute_at.to_rfc3339(), "2030-01-06T10:00:00+00:00");
        assert_eq!(job.payload.subject_id, appt.id);
    }

    #[test]
    fn test_no_reminder_when_too_close() {
        let now = DateTime::parse_from_rfc3339("2030-01-07T08:00:00Z").unwrap().with_timezone(&Utc);
        let appt = appointment_on(NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(), "10:00");
        assert!(reminder_job(&appt, chrono_tz::UTC, now).is_none());

        let jobs = jobs_for_new_appointment(&appt, chrono_tz::UTC, now);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_type, JOB_APPOINTMENT_CREATED);
    }

    #[test]
    fn test_every_job_type_has_a_template() {
        for job_type in [JOB_VERIFY_EMAIL, JOB_APPOINTMENT_CREATED, JOB_APPOINTMENT_STATUS, JOB_REMINDER] {
            assert!(template_for(job_type).is_some(), "{} has no template", job_type);
        }
        assert!(template_for("CAMPAIGN").is_none());
    }
}
