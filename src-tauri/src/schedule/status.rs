//! Appointment lifecycle state machine.
//!
//! `BOOKED → CONFIRMED → VISITED`, with `NO_SHOW` reachable while the visit
//! is still pending, `CANCELLED` reachable from every non-terminal state
//! (mandatory remark, handled by the cancel flow), and `CLOSED` as the
//! administrative terminal. Transitions are user-driven from the detail view;
//! the conflict detector never gates them.

use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Booked,
    Confirmed,
    Visited,
    NoShow,
    Cancelled,
    Closed,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 6] = [
        Self::Booked,
        Self::Confirmed,
        Self::Visited,
        Self::NoShow,
        Self::Cancelled,
        Self::Closed,
    ];

    /// Wire representation (matches the backend's status column).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "BOOKED",
            Self::Confirmed => "CONFIRMED",
            Self::Visited => "VISITED",
            Self::NoShow => "NO_SHOW",
            Self::Cancelled => "CANCELLED",
            Self::Closed => "CLOSED",
        }
    }

    /// Parse the wire representation.
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        match s {
            "BOOKED" => Ok(Self::Booked),
            "CONFIRMED" => Ok(Self::Confirmed),
            "VISITED" => Ok(Self::Visited),
            "NO_SHOW" => Ok(Self::NoShow),
            "CANCELLED" => Ok(Self::Cancelled),
            "CLOSED" => Ok(Self::Closed),
            other => Err(ScheduleError::UnknownStatus(other.to_string())),
        }
    }

    /// Human label for the detail view.
    pub fn label(self) -> &'static str {
        match self {
            Self::Booked => "Booked",
            Self::Confirmed => "Confirmed",
            Self::Visited => "Visited",
            Self::NoShow => "No show",
            Self::Cancelled => "Cancelled",
            Self::Closed => "Closed",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Closed)
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_become(self, next: AppointmentStatus) -> bool {
        if self.is_terminal() || self == next {
            return false;
        }
        match next {
            Self::Confirmed => self == Self::Booked,
            Self::Visited => self == Self::Confirmed,
            Self::NoShow => matches!(self, Self::Booked | Self::Confirmed),
            // Any live record can be cancelled or administratively closed.
            Self::Cancelled | Self::Closed => true,
            Self::Booked => false,
        }
    }

    /// States reachable via a plain status change (cancellation is its own
    /// flow because it carries a mandatory remark).
    pub fn change_targets(self) -> Vec<AppointmentStatus> {
        Self::ALL
            .into_iter()
            .filter(|next| *next != Self::Cancelled && self.can_become(*next))
            .collect()
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
