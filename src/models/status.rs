use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rejected,
    Completed,
    Cancelled,
}

/// How a status is shown to people: badge text, emoji and CSS classes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusPresentation {
    pub status: AppointmentStatus,
    pub label: &'static str,
    pub emoji: &'static str,
    pub badge: &'static str,
}

const PRESENTATION: [StatusPresentation; 5] = [
    StatusPresentation {
        status: AppointmentStatus::Pending,
        label: "Pending",
        emoji: "⏳",
        badge: "bg-yellow-100 text-yellow-800",
    },
    StatusPresentation {
        status: AppointmentStatus::Confirmed,
        label: "Confirmed",
        emoji: "✅",
        badge: "bg-green-100 text-green-800",
    },
    StatusPresentation {
        status: AppointmentStatus::Rejected,
        label: "Not possible",
        emoji: "❌",
        badge: "bg-red-100 text-red-800",
    },
    StatusPresentation {
        status: AppointmentStatus::Completed,
        label: "Completed",
        emoji: "✓",
        badge: "bg-gray-100 text-gray-800",
    },
    StatusPresentation {
        status: AppointmentStatus::Cancelled,
        label: "Cancelled",
        emoji: "🚫",
        badge: "bg-amber-100 text-amber-800",
    },
];

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Rejected,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "rejected" => Some(AppointmentStatus::Rejected),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }

    /// Statuses reachable in one step. Terminal statuses have none.
    pub fn successors(&self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Pending => &[
                AppointmentStatus::Confirmed,
                AppointmentStatus::Rejected,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Confirmed => {
                &[AppointmentStatus::Cancelled, AppointmentStatus::Completed]
            }
            AppointmentStatus::Rejected
            | AppointmentStatus::Completed
            | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    /// Whether entering this status sends the customer an email.
    pub fn notifies_customer(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Confirmed
                | AppointmentStatus::Rejected
                | AppointmentStatus::Cancelled
        )
    }

    pub fn presentation(&self) -> &'static StatusPresentation {
        let idx = match self {
            AppointmentStatus::Pending => 0,
            AppointmentStatus::Confirmed => 1,
            AppointmentStatus::Rejected => 2,
            AppointmentStatus::Completed => 3,
            AppointmentStatus::Cancelled => 4,
        };
        &PRESENTATION[idx]
    }

    pub fn presentation_table() -> &'static [StatusPresentation] {
        &PRESENTATION
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
