//! Owner-overview counters computed from a snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use super::DashboardSnapshot;
use crate::domain::records::{AlertStatus, GuestStatus, LinenStatus, MatchType, RoomStatus};

/// Window, in hours, for counting unknown face detections.
const UNKNOWN_FACE_WINDOW_HOURS: i64 = 24;

/// Counters shown on the owner overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub guests_by_status: BTreeMap<&'static str, usize>,
    pub rooms_by_status: BTreeMap<&'static str, usize>,
    pub open_alerts: usize,
    pub escalated_alerts: usize,
    pub unknown_faces_last_24h: usize,
    pub linen_by_status: BTreeMap<&'static str, usize>,
    pub connected: bool,
}

fn zeroed<T: Copy>(values: &[T], label: impl Fn(T) -> &'static str) -> BTreeMap<&'static str, usize> {
    values.iter().map(|value| (label(*value), 0)).collect()
}

fn bump(counts: &mut BTreeMap<&'static str, usize>, key: &'static str) {
    *counts.entry(key).or_default() += 1;
}

impl DashboardSummary {
    pub(super) fn compute(snapshot: &DashboardSnapshot, now: DateTime<Utc>) -> Self {
        let mut guests_by_status = zeroed(GuestStatus::ALL, GuestStatus::as_str);
        for guest in &snapshot.guests {
            bump(&mut guests_by_status, guest.status.as_str());
        }

        let mut rooms_by_status = zeroed(RoomStatus::ALL, RoomStatus::as_str);
        for room in &snapshot.rooms {
            bump(&mut rooms_by_status, room.status.as_str());
        }

        let mut linen_by_status = zeroed(LinenStatus::ALL, LinenStatus::as_str);
        for item in &snapshot.linen {
            bump(&mut linen_by_status, item.status.as_str());
        }

        let count_alerts = |status: AlertStatus| {
            snapshot
                .alerts
                .iter()
                .filter(|alert| alert.status == status)
                .count()
        };

        let window_start = now - TimeDelta::hours(UNKNOWN_FACE_WINDOW_HOURS);
        let unknown_faces_last_24h = snapshot
            .face_logs
            .iter()
            .filter(|log| log.match_type == MatchType::Unknown && log.timestamp >= window_start)
            .count();

        Self {
            guests_by_status,
            rooms_by_status,
            open_alerts: count_alerts(AlertStatus::Open),
            escalated_alerts: count_alerts(AlertStatus::Escalated),
            unknown_faces_last_24h,
            linen_by_status,
            connected: snapshot.connection.connected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::{AlertType, FaceLog, Room, SecurityAlert};
    use crate::test_support::start_of_shift;

    fn face(id: &str, match_type: MatchType, hours_ago: i64) -> FaceLog {
        FaceLog {
            id: id.to_owned(),
            timestamp: start_of_shift() - TimeDelta::hours(hours_ago),
            room_id: None,
            match_type,
            confidence: 50.0,
            image_url: None,
        }
    }

    fn alert(id: &str, status: AlertStatus) -> SecurityAlert {
        SecurityAlert {
            id: id.to_owned(),
            alert_type: AlertType::Intruder,
            status,
            assigned_to: None,
            comments: None,
            room_id: None,
            raised_at: None,
        }
    }

    #[test]
    fn counts_recent_unknown_faces_and_alert_states() {
        let snapshot = DashboardSnapshot {
            face_logs: vec![
                face("f1", MatchType::Unknown, 1),
                face("f2", MatchType::Unknown, 30),
                face("f3", MatchType::Guest, 1),
            ],
            alerts: vec![
                alert("a1", AlertStatus::Open),
                alert("a2", AlertStatus::Open),
                alert("a3", AlertStatus::Escalated),
                alert("a4", AlertStatus::Resolved),
            ],
            ..DashboardSnapshot::default()
        };

        let summary = DashboardSummary::compute(&snapshot, start_of_shift());

        assert_eq!(summary.unknown_faces_last_24h, 1);
        assert_eq!(summary.open_alerts, 2);
        assert_eq!(summary.escalated_alerts, 1);
        assert!(!summary.connected);
    }

    #[test]
    fn every_status_has_a_counter() {
        let snapshot = DashboardSnapshot {
            rooms: vec![Room {
                id: "r1".to_owned(),
                room_number: "101".to_owned(),
                status: RoomStatus::Alerted,
                guest_id: None,
            }],
            ..DashboardSnapshot::default()
        };

        let summary = DashboardSummary::compute(&snapshot, start_of_shift());

        assert_eq!(summary.rooms_by_status.get("Alerted"), Some(&1));
        assert_eq!(summary.rooms_by_status.get("Vacant"), Some(&0));
        assert_eq!(summary.guests_by_status.len(), GuestStatus::ALL.len());
        assert_eq!(summary.linen_by_status.get("Damaged"), Some(&0));
    }
}
