//! Typed mirrors of the CRM custom objects the dashboard reads and writes.
//!
//! These are plain data: no cross-entity invariant (room vs guest status,
//! alert transition order) is enforced. Field names serialise in camelCase
//! for the dashboard.

mod mapping;
mod picklist;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub(crate) use mapping::{CrmEntity, CrmWritable, map_records};
pub use mapping::{MappingError, parse_crm_datetime};
pub use picklist::{
    AlertStatus, AlertType, GuestStatus, LinenStatus, MatchType, Picklist, RoomStatus, StaffRole,
    UnknownPicklistValue,
};

/// Static sentiment tag attached to every audio log.
pub const AUDIO_SENTIMENT_PLACEHOLDER: &str = "neutral";

/// The seven record collections held by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    /// Hotel guests.
    Guests,
    /// Staff roster.
    Staff,
    /// Rooms.
    Rooms,
    /// Face-detection events.
    FaceLogs,
    /// Security alerts.
    Alerts,
    /// Audio recordings.
    AudioLogs,
    /// Linen stock items.
    Linen,
}

impl Collection {
    /// Every collection, in refresh order.
    pub const ALL: [Self; 7] = [
        Self::Guests,
        Self::Staff,
        Self::Rooms,
        Self::FaceLogs,
        Self::Alerts,
        Self::AudioLogs,
        Self::Linen,
    ];

    /// Name used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guests => "guests",
            Self::Staff => "staff",
            Self::Rooms => "rooms",
            Self::FaceLogs => "faceLogs",
            Self::Alerts => "alerts",
            Self::AudioLogs => "audioLogs",
            Self::Linen => "linen",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hotel guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
    pub name: String,
    pub room_number: Option<String>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: GuestStatus,
}

impl Guest {
    /// Status implied by the stored flag and the check-in/out timestamps.
    ///
    /// VIP and blacklisted flags win; otherwise a check-out timestamp means
    /// checked out and a check-in timestamp means checked in.
    pub fn derive_status(
        stored: Option<GuestStatus>,
        check_in: Option<DateTime<Utc>>,
        check_out: Option<DateTime<Utc>>,
    ) -> GuestStatus {
        match stored {
            Some(flag @ (GuestStatus::Vip | GuestStatus::Blacklisted)) => flag,
            _ if check_out.is_some() => GuestStatus::CheckedOut,
            _ if check_in.is_some() => GuestStatus::CheckedIn,
            _ => GuestStatus::NotArrived,
        }
    }

    /// Apply a status change, stamping the matching timestamp with `now`.
    pub fn set_status(&mut self, status: GuestStatus, now: DateTime<Utc>) {
        match status {
            GuestStatus::CheckedIn => {
                self.check_in.get_or_insert(now);
                self.check_out = None;
            }
            GuestStatus::CheckedOut => {
                self.check_out = Some(now);
            }
            GuestStatus::NotArrived => {
                self.check_in = None;
                self.check_out = None;
            }
            GuestStatus::Vip | GuestStatus::Blacklisted => {}
        }
        self.status = status;
    }
}

/// A staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: String,
    pub name: String,
    pub role: StaffRole,
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
}

/// A room on the status map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub room_number: String,
    pub status: RoomStatus,
    pub guest_id: Option<String>,
}

/// A face-detection event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub room_id: Option<String>,
    pub match_type: MatchType,
    /// CRM number passed through unchanged (0–100).
    pub confidence: f64,
    pub image_url: Option<String>,
}

/// A security alert under triage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub status: AlertStatus,
    pub assigned_to: Option<String>,
    pub comments: Option<String>,
    pub room_id: Option<String>,
    pub raised_at: Option<DateTime<Utc>>,
}

/// An audio recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioLog {
    pub id: String,
    pub recording_url: Option<String>,
    pub duration_seconds: Option<f64>,
    pub room_id: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
    /// Always [`AUDIO_SENTIMENT_PLACEHOLDER`]; nothing analyses the audio.
    pub sentiment: String,
    /// Always empty.
    pub flags: Vec<String>,
}

/// A linen item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinenStock {
    pub id: String,
    pub linen_type: String,
    pub room_id: Option<String>,
    pub status: LinenStatus,
    pub issued_on: Option<NaiveDate>,
    pub returned_on: Option<NaiveDate>,
}

/// Input for a guest check-in form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub name: String,
    pub room_number: Option<String>,
    pub status: Option<GuestStatus>,
}

/// Partial guest update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestPatch {
    pub name: Option<String>,
    pub room_number: Option<String>,
    pub status: Option<GuestStatus>,
}

/// Input for raising an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlert {
    pub alert_type: AlertType,
    pub room_id: Option<String>,
    pub assigned_to: Option<String>,
    pub comments: Option<String>,
}

/// Partial alert update; any status may follow any other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertPatch {
    pub status: Option<AlertStatus>,
    pub assigned_to: Option<String>,
    pub comments: Option<String>,
}

/// Partial room update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomPatch {
    pub status: Option<RoomStatus>,
    pub guest_id: Option<String>,
}

/// Input for issuing a linen item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLinen {
    pub linen_type: String,
    pub room_id: Option<String>,
    pub status: Option<LinenStatus>,
    pub issued_on: Option<NaiveDate>,
}

/// Partial linen update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinenPatch {
    pub status: Option<LinenStatus>,
    pub room_id: Option<String>,
    pub returned_on: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::start_of_shift;
    use rstest::rstest;

    #[rstest]
    #[case(None, false, false, GuestStatus::NotArrived)]
    #[case(None, true, false, GuestStatus::CheckedIn)]
    #[case(None, true, true, GuestStatus::CheckedOut)]
    #[case(Some(GuestStatus::CheckedIn), false, false, GuestStatus::NotArrived)]
    #[case(Some(GuestStatus::Vip), true, true, GuestStatus::Vip)]
    #[case(Some(GuestStatus::Blacklisted), false, false, GuestStatus::Blacklisted)]
    fn status_follows_timestamps_unless_flagged(
        #[case] stored: Option<GuestStatus>,
        #[case] checked_in: bool,
        #[case] checked_out: bool,
        #[case] expected: GuestStatus,
    ) {
        let now = start_of_shift();
        let status = Guest::derive_status(
            stored,
            checked_in.then_some(now),
            checked_out.then_some(now),
        );
        assert_eq!(status, expected);
    }

    #[test]
    fn checking_in_stamps_the_arrival_once() {
        let earlier = start_of_shift();
        let mut guest = Guest {
            id: "G1".to_owned(),
            name: "Ada".to_owned(),
            room_number: Some("101".to_owned()),
            check_in: Some(earlier),
            check_out: None,
            status: GuestStatus::CheckedIn,
        };

        guest.set_status(GuestStatus::CheckedIn, earlier + chrono::TimeDelta::hours(1));

        assert_eq!(guest.check_in, Some(earlier));
    }

    #[test]
    fn resetting_to_not_arrived_clears_timestamps() {
        let now = start_of_shift();
        let mut guest = Guest {
            id: "G1".to_owned(),
            name: "Ada".to_owned(),
            room_number: None,
            check_in: Some(now),
            check_out: Some(now),
            status: GuestStatus::CheckedOut,
        };

        guest.set_status(GuestStatus::NotArrived, now);

        assert_eq!(guest.check_in, None);
        assert_eq!(guest.check_out, None);
        assert_eq!(guest.status, GuestStatus::NotArrived);
    }
}
