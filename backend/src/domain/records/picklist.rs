//! Picklist enums shared by the record types.
//!
//! Each variant has a wire spelling (what the dashboard API speaks) and a
//! CRM spelling (what the picklist stores). Parsing accepts either, ignoring
//! ASCII case.

use thiserror::Error;

/// A string did not match any value of a picklist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {picklist}")]
pub struct UnknownPicklistValue {
    /// Picklist type name.
    pub picklist: &'static str,
    /// Rejected input.
    pub value: String,
}

/// Common surface of the picklist enums, for generic parsing at the edge.
pub trait Picklist: Copy + std::str::FromStr<Err = UnknownPicklistValue> + 'static {
    /// Every value in declaration order.
    fn values() -> &'static [Self];

    /// Spelling used by the dashboard API.
    fn wire(self) -> &'static str;

    /// Wire spellings of every value.
    fn allowed() -> Vec<&'static str> {
        Self::values().iter().map(|value| value.wire()).collect()
    }
}

macro_rules! define_picklist {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal / $crm:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every value in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Spelling used by the dashboard API.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Spelling stored in the CRM picklist.
            pub fn crm_value(self) -> &'static str {
                match self {
                    $(Self::$variant => $crm,)+
                }
            }
        }

        impl $crate::domain::records::Picklist for $name {
            fn values() -> &'static [Self] {
                Self::ALL
            }

            fn wire(self) -> &'static str {
                self.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::records::UnknownPicklistValue;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| {
                        value.as_str().eq_ignore_ascii_case(trimmed)
                            || value.crm_value().eq_ignore_ascii_case(trimmed)
                    })
                    .ok_or_else(|| $crate::domain::records::UnknownPicklistValue {
                        picklist: stringify!($name),
                        value: raw.to_owned(),
                    })
            }
        }
    };
}

define_picklist! {
    /// Guest lifecycle status.
    pub enum GuestStatus {
        /// Booked but not yet checked in.
        NotArrived => "not-arrived" / "Not Arrived",
        /// Currently in house.
        CheckedIn => "checked-in" / "Checked In",
        /// Departed.
        CheckedOut => "checked-out" / "Checked Out",
        /// Flagged as a VIP.
        Vip => "vip" / "VIP",
        /// Denied service.
        Blacklisted => "blacklisted" / "Blacklisted",
    }
}

define_picklist! {
    /// Staff role.
    pub enum StaffRole {
        /// Property owner.
        Owner => "owner" / "Owner",
        /// Front desk.
        Receptionist => "receptionist" / "Receptionist",
        /// Security officer.
        Security => "security" / "Security",
        /// Housekeeping.
        Housekeeping => "housekeeping" / "Housekeeping",
        /// Maintenance.
        Maintenance => "maintenance" / "Maintenance",
    }
}

define_picklist! {
    /// Room occupancy status shown on the room map.
    pub enum RoomStatus {
        /// Nobody assigned.
        Vacant => "Vacant" / "Vacant",
        /// A guest is assigned.
        Occupied => "Occupied" / "Occupied",
        /// An alert is open for the room.
        Alerted => "Alerted" / "Alerted",
    }
}

define_picklist! {
    /// Who a face detection matched.
    pub enum MatchType {
        /// A registered guest.
        Guest => "Guest" / "Guest",
        /// A staff member.
        Staff => "Staff" / "Staff",
        /// Nobody known.
        Unknown => "Unknown" / "Unknown",
    }
}

define_picklist! {
    /// Security alert category.
    pub enum AlertType {
        /// Unknown person in a restricted area.
        Intruder => "Intruder" / "Intruder",
        /// Detected face does not match the room's guest.
        Mismatch => "Mismatch" / "Mismatch",
        /// Someone followed an authorised person through a door.
        Tailgating => "Tailgating" / "Tailgating",
    }
}

define_picklist! {
    /// Alert triage status. Transitions are not validated.
    pub enum AlertStatus {
        /// Raised, nobody responded yet.
        Open => "Open" / "Open",
        /// Someone is on it.
        Responded => "Responded" / "Responded",
        /// Closed.
        Resolved => "Resolved" / "Resolved",
        /// Handed to the owner or authorities.
        Escalated => "Escalated" / "Escalated",
    }
}

define_picklist! {
    /// Linen item status.
    pub enum LinenStatus {
        /// Out in a room.
        Issued => "Issued" / "Issued",
        /// Back in stock.
        Returned => "Returned" / "Returned",
        /// Written off.
        Damaged => "Damaged" / "Damaged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("checked-in", GuestStatus::CheckedIn)]
    #[case("Checked In", GuestStatus::CheckedIn)]
    #[case("VIP", GuestStatus::Vip)]
    #[case(" vip ", GuestStatus::Vip)]
    fn guest_status_accepts_wire_and_crm_spellings(
        #[case] raw: &str,
        #[case] expected: GuestStatus,
    ) {
        assert_eq!(raw.parse::<GuestStatus>(), Ok(expected));
    }

    #[test]
    fn unknown_values_name_the_picklist() {
        let err = "Lost".parse::<AlertStatus>().expect_err("unknown");
        assert_eq!(err.to_string(), "'Lost' is not a valid AlertStatus");
    }

    #[test]
    fn serde_uses_wire_spelling() {
        let json = serde_json::to_string(&GuestStatus::NotArrived).expect("serialise");
        assert_eq!(json, "\"not-arrived\"");
        assert_eq!(GuestStatus::NotArrived.crm_value(), "Not Arrived");
    }
}
