use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::AppointmentStatus;

const FIRST_SLOT_HOUR: u32 = 9;
const LAST_SLOT_HOUR: u32 = 17;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub date: NaiveDate,
    pub time: SlotTime,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub seen_by_admin: bool,
    #[serde(default)]
    pub confirmed_by_customer: bool,
}

impl Appointment {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time.as_naive())
    }
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<SlotTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen_by_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_by_customer: Option<bool>,
}

impl AppointmentPatch {
    pub fn status(status: AppointmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn apply(&self, appointment: &mut Appointment) {
        if let Some(date) = self.date {
            appointment.date = date;
        }
        if let Some(time) = self.time {
            appointment.time = time;
        }
        if let Some(comment) = &self.comment {
            appointment.comment = comment.clone();
        }
        if let Some(image_url) = &self.image_url {
            appointment.image_url = Some(image_url.clone());
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
        if let Some(seen) = self.seen_by_admin {
            appointment.seen_by_admin = seen;
        }
        if let Some(confirmed) = self.confirmed_by_customer {
            appointment.confirmed_by_customer = confirmed;
        }
    }
}

/// Booking request as sent by the booking page. Everything is optional on the
/// wire so missing fields surface as validation errors rather than decode errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub comment: Option<String>,
    pub image_url: Option<String>,
}

/// A bookable start time on a half-hour boundary, written as "HH:MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    pub fn parse(s: &str) -> Result<Self, String> {
        let time = NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map_err(|_| format!("invalid time '{s}', expected HH:MM"))?;
        Self::from_naive(time).ok_or_else(|| format!("time '{s}' is not on a half-hour slot"))
    }

    pub fn from_naive(time: NaiveTime) -> Option<Self> {
        if time.second() == 0 && time.nanosecond() == 0 && time.minute() % 30 == 0 {
            Some(Self(time))
        } else {
            None
        }
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    /// The studio's bookable day: 09:00 through 17:30.
    pub fn bookable_day() -> Vec<SlotTime> {
        (FIRST_SLOT_HOUR..=LAST_SLOT_HOUR)
            .flat_map(|h| [0, 30].map(move |m| (h, m)))
            .filter_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
            .map(SlotTime)
            .collect()
    }
}

impl std::fmt::Display for SlotTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SlotTime::parse(&s).map_err(serde::de::Error::custom)
    }
}
