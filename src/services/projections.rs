//! Read-only views over the appointment list, as shown on the admin
//! dashboard, the calendar and the customer page.
//!
//! All functions take the studio's local wall clock as `now`.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::models::{Appointment, AppointmentStatus};

pub const OVERVIEW_UPCOMING_LIMIT: usize = 10;

pub fn upcoming(appointments: &[Appointment], now: NaiveDateTime) -> Vec<&Appointment> {
    let mut out: Vec<_> = appointments.iter().filter(|a| a.starts_at() >= now).collect();
    out.sort_by_key(|a| a.starts_at());
    out
}

pub fn past(appointments: &[Appointment], now: NaiveDateTime) -> Vec<&Appointment> {
    let mut out: Vec<_> = appointments.iter().filter(|a| a.starts_at() < now).collect();
    out.sort_by_key(|a| std::cmp::Reverse(a.starts_at()));
    out
}

pub fn today(appointments: &[Appointment], now: NaiveDateTime) -> Vec<&Appointment> {
    confirmed_between(appointments, now.date(), now.date())
}

/// Confirmed appointments from today through Sunday of the current ISO week.
pub fn this_week(appointments: &[Appointment], now: NaiveDateTime) -> Vec<&Appointment> {
    let start = now.date();
    confirmed_between(appointments, start, end_of_week(start))
}

pub fn pending(appointments: &[Appointment]) -> Vec<&Appointment> {
    let mut out: Vec<_> = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Pending)
        .collect();
    out.sort_by_key(|a| a.starts_at());
    out
}

/// Requests created after the admin's previous login that nobody has looked at yet.
pub fn new_since(appointments: &[Appointment], last_login: DateTime<Utc>) -> Vec<&Appointment> {
    let mut out: Vec<_> = appointments
        .iter()
        .filter(|a| a.created_at > last_login && !a.seen_by_admin)
        .collect();
    out.sort_by_key(|a| a.created_at);
    out
}

fn confirmed_between(
    appointments: &[Appointment],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<&Appointment> {
    let mut out: Vec<_> = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Confirmed && a.date >= from && a.date <= to)
        .collect();
    out.sort_by_key(|a| a.starts_at());
    out
}

fn end_of_week(day: NaiveDate) -> NaiveDate {
    let remaining = 6 - u64::from(day.weekday().num_days_from_monday());
    day.checked_add_days(Days::new(remaining)).unwrap_or(day)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview<'a> {
    pub today: Vec<&'a Appointment>,
    pub this_week: Vec<&'a Appointment>,
    pub pending: Vec<&'a Appointment>,
    pub new_since_login: Vec<&'a Appointment>,
    pub upcoming: Vec<&'a Appointment>,
}

/// Dashboard summary. Without a previous login nothing counts as new.
pub fn overview(
    appointments: &[Appointment],
    now: NaiveDateTime,
    last_login: Option<DateTime<Utc>>,
) -> AdminOverview<'_> {
    let mut next = upcoming(appointments, now);
    next.truncate(OVERVIEW_UPCOMING_LIMIT);

    AdminOverview {
        today: today(appointments, now),
        this_week: this_week(appointments, now),
        pending: pending(appointments),
        new_since_login: last_login
            .map(|since| new_since(appointments, since))
            .unwrap_or_default(),
        upcoming: next,
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerView<'a> {
    pub upcoming: Vec<&'a Appointment>,
    pub past: Vec<&'a Appointment>,
    pub pending: Vec<&'a Appointment>,
}

/// The customer page: upcoming appointments, past appointments newest first,
/// and requests still waiting for the studio.
pub fn for_customer<'a>(
    appointments: &'a [Appointment],
    name: &str,
    now: NaiveDateTime,
) -> CustomerView<'a> {
    let mine: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.customer_name == name)
        .collect();

    let mut upcoming: Vec<_> = mine.iter().copied().filter(|a| a.starts_at() >= now).collect();
    upcoming.sort_by_key(|a| a.starts_at());
    let mut past: Vec<_> = mine.iter().copied().filter(|a| a.starts_at() < now).collect();
    past.sort_by_key(|a| std::cmp::Reverse(a.starts_at()));
    let mut pending: Vec<_> = mine
        .iter()
        .copied()
        .filter(|a| a.status == AppointmentStatus::Pending)
        .collect();
    pending.sort_by_key(|a| a.starts_at());

    CustomerView {
        upcoming,
        past,
        pending,
    }
}

/// Upcoming appointments keyed by day, each day in time order.
pub fn calendar(
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> BTreeMap<NaiveDate, Vec<&Appointment>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Appointment>> = BTreeMap::new();
    for appointment in upcoming(appointments, now) {
        days.entry(appointment.date).or_default().push(appointment);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotTime;

    fn appt(id: &str, date: &str, time: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.to_string(),
            customer_id: "c1".to_string(),
            customer_name: "Anna".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: SlotTime::parse(time).unwrap(),
            comment: String::new(),
            image_url: None,
            status,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            seen_by_admin: false,
            confirmed_by_customer: false,
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn ids(list: &[&Appointment]) -> Vec<String> {
        list.iter().map(|a| a.id.clone()).collect()
    }

    use crate::models::AppointmentStatus::*;

    // 2025-06-11 is a Wednesday; that ISO week ends Sunday 2025-06-15.
    fn week() -> Vec<Appointment> {
        vec![
            appt("past", "2025-06-09", "10:00", Confirmed),
            appt("today-late", "2025-06-11", "16:00", Confirmed),
            appt("today-early", "2025-06-11", "09:00", Confirmed),
            appt("today-pending", "2025-06-11", "11:00", Pending),
            appt("fri", "2025-06-13", "12:00", Confirmed),
            appt("sat-cancelled", "2025-06-14", "12:00", Cancelled),
            appt("sun", "2025-06-15", "17:30", Confirmed),
            appt("next-mon", "2025-06-16", "09:00", Confirmed),
        ]
    }

    #[test]
    fn test_upcoming_and_past_ordering() {
        let all = week();
        let now = at("2025-06-11 12:00");

        assert_eq!(
            ids(&upcoming(&all, now)),
            vec!["today-late", "fri", "sat-cancelled", "sun", "next-mon"]
        );
        assert_eq!(
            ids(&past(&all, now)),
            vec!["today-pending", "today-early", "past"]
        );
    }

    #[test]
    fn test_upcoming_includes_slot_starting_now() {
        let all = vec![appt("a", "2025-06-11", "12:00", Pending)];
        assert_eq!(upcoming(&all, at("2025-06-11 12:00")).len(), 1);
        assert!(past(&all, at("2025-06-11 12:00")).is_empty());
    }

    #[test]
    fn test_today_is_confirmed_only() {
        let all = week();
        assert_eq!(
            ids(&today(&all, at("2025-06-11 12:00"))),
            vec!["today-early", "today-late"]
        );
    }

    #[test]
    fn test_this_week_runs_to_sunday_confirmed_only() {
        let all = week();
        assert_eq!(
            ids(&this_week(&all, at("2025-06-11 08:00"))),
            vec!["today-early", "today-late", "fri", "sun"]
        );
    }

    #[test]
    fn test_this_week_on_sunday_is_just_today() {
        let all = week();
        assert_eq!(ids(&this_week(&all, at("2025-06-15 08:00"))), vec!["sun"]);
    }

    #[test]
    fn test_pending_any_date() {
        let mut all = week();
        all.push(appt("old-pending", "2025-01-02", "10:00", Pending));
        assert_eq!(ids(&pending(&all)), vec!["old-pending", "today-pending"]);
    }

    #[test]
    fn test_new_since_excludes_seen() {
        let login = DateTime::parse_from_rfc3339("2025-06-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut fresh = appt("fresh", "2025-06-20", "10:00", Pending);
        fresh.created_at = login + chrono::Duration::hours(1);
        let mut seen = appt("seen", "2025-06-20", "11:00", Pending);
        seen.created_at = login + chrono::Duration::hours(2);
        seen.seen_by_admin = true;
        let mut older = appt("older", "2025-06-20", "12:00", Pending);
        older.created_at = login - chrono::Duration::hours(1);

        let all = vec![fresh, seen, older];
        assert_eq!(ids(&new_since(&all, login)), vec!["fresh"]);
    }

    #[test]
    fn test_overview_caps_upcoming() {
        let all: Vec<Appointment> = (0..12)
            .map(|i| appt(&format!("a{i:02}"), "2025-07-01", &format!("{:02}:00", 9 + i % 9), Pending))
            .collect();
        let view = overview(&all, at("2025-06-11 12:00"), None);

        assert_eq!(view.upcoming.len(), OVERVIEW_UPCOMING_LIMIT);
        assert!(view.new_since_login.is_empty());
        assert_eq!(view.pending.len(), 12);
    }

    #[test]
    fn test_for_customer_partitions() {
        let mut all = week();
        all.push(Appointment {
            customer_name: "Bea".to_string(),
            ..appt("bea", "2025-06-20", "10:00", Pending)
        });
        let view = for_customer(&all, "Anna", at("2025-06-11 12:00"));

        assert_eq!(view.upcoming.len(), 5);
        assert_eq!(ids(&view.past), vec!["today-pending", "today-early", "past"]);
        assert_eq!(ids(&view.pending), vec!["today-pending"]);
        assert!(view.upcoming.iter().all(|a| a.customer_name == "Anna"));
    }

    #[test]
    fn test_calendar_groups_by_day() {
        let all = week();
        let days = calendar(&all, at("2025-06-11 08:00"));

        let wednesday = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        assert_eq!(
            ids(&days[&wednesday]),
            vec!["today-early", "today-pending", "today-late"]
        );
        assert_eq!(days.len(), 5);
        assert!(days.keys().zip(days.keys().skip(1)).all(|(a, b)| a < b));
    }
}
