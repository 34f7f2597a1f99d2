//! Translation between CRM records and the typed dashboard entities.
//!
//! Reading is lenient per record: a record that cannot be mapped is skipped
//! with a warning so one bad row never empties a whole collection.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    AUDIO_SENTIMENT_PLACEHOLDER, AlertStatus, AlertType, AudioLog, FaceLog, Guest, GuestStatus,
    LinenStatus, LinenStock, MatchType, Room, RoomStatus, SecurityAlert, Staff, StaffRole,
    UnknownPicklistValue,
};
use crate::domain::ports::CrmRecord;

/// A CRM record could not be turned into an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A required field was absent or null.
    #[error("field {field} is missing")]
    MissingField { field: &'static str },
    /// A field held a value of the wrong shape.
    #[error("field {field} is invalid: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
    /// A picklist field held an unknown value.
    #[error("field {field}: {source}")]
    Picklist {
        field: &'static str,
        #[source]
        source: UnknownPicklistValue,
    },
}

/// Parse a CRM datetime.
///
/// Accepts RFC 3339 as well as the `+0000` offset form the REST API emits.
///
/// # Examples
/// ```
/// use nightdesk::domain::records::parse_crm_datetime;
///
/// let a = parse_crm_datetime("2024-01-15T10:30:00.000+0000").expect("crm form");
/// let b = parse_crm_datetime("2024-01-15T10:30:00Z").expect("rfc 3339");
/// assert_eq!(a, b);
/// ```
pub fn parse_crm_datetime(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// An entity read from one CRM object.
pub(crate) trait CrmEntity: Sized {
    /// CRM object API name.
    const OBJECT: &'static str;
    /// Fields selected by [`CrmEntity::soql`].
    const FIELDS: &'static [&'static str];
    /// `ORDER BY` clause, including any `LIMIT`.
    const ORDER_BY: &'static str;

    /// Map one record.
    fn from_record(record: &CrmRecord) -> Result<Self, MappingError>;

    /// Query selecting every mapped field.
    fn soql() -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            Self::FIELDS.join(", "),
            Self::OBJECT,
            Self::ORDER_BY
        )
    }
}

/// An entity the dashboard writes back to the CRM.
pub(crate) trait CrmWritable: CrmEntity {
    /// Writable fields; `None` values are sent as `null`.
    fn to_fields(&self) -> CrmRecord;
}

/// Map a page of records, skipping the ones that fail.
pub(crate) fn map_records<T: CrmEntity>(records: &[CrmRecord]) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match T::from_record(record) {
            Ok(entity) => Some(entity),
            Err(error) => {
                let id = record.get("Id").and_then(Value::as_str).unwrap_or("<none>");
                warn!(object = T::OBJECT, id, %error, "skipping unmappable CRM record");
                None
            }
        })
        .collect()
}

fn text(record: &CrmRecord, field: &'static str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn required_text(record: &CrmRecord, field: &'static str) -> Result<String, MappingError> {
    text(record, field).ok_or(MappingError::MissingField { field })
}

fn number(record: &CrmRecord, field: &'static str) -> Result<Option<f64>, MappingError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(value)) => Ok(value.as_f64()),
        Some(other) => Err(MappingError::InvalidValue {
            field,
            message: format!("expected a number, got {other}"),
        }),
    }
}

fn datetime(record: &CrmRecord, field: &'static str) -> Result<Option<DateTime<Utc>>, MappingError> {
    text(record, field)
        .map(|raw| {
            parse_crm_datetime(&raw).map_err(|err| MappingError::InvalidValue {
                field,
                message: err.to_string(),
            })
        })
        .transpose()
}

fn date(record: &CrmRecord, field: &'static str) -> Result<Option<NaiveDate>, MappingError> {
    text(record, field)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|err| MappingError::InvalidValue {
                field,
                message: err.to_string(),
            })
        })
        .transpose()
}

fn picklist<T>(record: &CrmRecord, field: &'static str) -> Result<Option<T>, MappingError>
where
    T: std::str::FromStr<Err = UnknownPicklistValue>,
{
    text(record, field)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|source| MappingError::Picklist { field, source })
        })
        .transpose()
}

fn opt_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |value| Value::String(value.to_owned()))
}

fn opt_datetime(value: Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, |value| {
        Value::String(value.to_rfc3339_opts(SecondsFormat::Millis, true))
    })
}

fn opt_date(value: Option<NaiveDate>) -> Value {
    value.map_or(Value::Null, |value| {
        Value::String(value.format("%Y-%m-%d").to_string())
    })
}

impl CrmEntity for Guest {
    const OBJECT: &'static str = "Guest__c";
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "Room_Number__c",
        "Check_In_Time__c",
        "Check_Out_Time__c",
        "Status__c",
    ];
    const ORDER_BY: &'static str = "Name";

    fn from_record(record: &CrmRecord) -> Result<Self, MappingError> {
        let check_in = datetime(record, "Check_In_Time__c")?;
        let check_out = datetime(record, "Check_Out_Time__c")?;
        // Only VIP and Blacklisted override the timestamps, so a label we do
        // not know is ignored rather than dropping the guest.
        let stored = picklist::<GuestStatus>(record, "Status__c").unwrap_or_else(|error| {
            debug!(%error, "ignoring stored guest status");
            None
        });
        Ok(Self {
            id: required_text(record, "Id")?,
            name: required_text(record, "Name")?,
            room_number: text(record, "Room_Number__c"),
            check_in,
            check_out,
            status: Self::derive_status(stored, check_in, check_out),
        })
    }
}

impl CrmWritable for Guest {
    fn to_fields(&self) -> CrmRecord {
        let mut fields = CrmRecord::new();
        fields.insert("Name".into(), Value::String(self.name.clone()));
        fields.insert("Room_Number__c".into(), opt_text(self.room_number.as_deref()));
        fields.insert("Check_In_Time__c".into(), opt_datetime(self.check_in));
        fields.insert("Check_Out_Time__c".into(), opt_datetime(self.check_out));
        fields.insert(
            "Status__c".into(),
            Value::String(self.status.crm_value().to_owned()),
        );
        fields
    }
}

impl CrmEntity for Staff {
    const OBJECT: &'static str = "Staff__c";
    const FIELDS: &'static [&'static str] =
        &["Id", "Name", "Role__c", "Shift_Start__c", "Shift_End__c"];
    const ORDER_BY: &'static str = "Name";

    fn from_record(record: &CrmRecord) -> Result<Self, MappingError> {
        Ok(Self {
            id: required_text(record, "Id")?,
            name: required_text(record, "Name")?,
            role: picklist::<StaffRole>(record, "Role__c")?
                .ok_or(MappingError::MissingField { field: "Role__c" })?,
            shift_start: text(record, "Shift_Start__c"),
            shift_end: text(record, "Shift_End__c"),
        })
    }
}

impl CrmEntity for Room {
    const OBJECT: &'static str = "Room__c";
    const FIELDS: &'static [&'static str] = &["Id", "Name", "Status__c", "Guest__c"];
    const ORDER_BY: &'static str = "Name";

    fn from_record(record: &CrmRecord) -> Result<Self, MappingError> {
        Ok(Self {
            id: required_text(record, "Id")?,
            room_number: required_text(record, "Name")?,
            status: picklist(record, "Status__c")?.unwrap_or(RoomStatus::Vacant),
            guest_id: text(record, "Guest__c"),
        })
    }
}

impl CrmWritable for Room {
    fn to_fields(&self) -> CrmRecord {
        let mut fields = CrmRecord::new();
        fields.insert(
            "Status__c".into(),
            Value::String(self.status.crm_value().to_owned()),
        );
        fields.insert("Guest__c".into(), opt_text(self.guest_id.as_deref()));
        fields
    }
}

impl CrmEntity for FaceLog {
    const OBJECT: &'static str = "Face_Log__c";
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Detected_At__c",
        "CreatedDate",
        "Room__c",
        "Match_Type__c",
        "Confidence__c",
        "Image_URL__c",
    ];
    const ORDER_BY: &'static str = "CreatedDate DESC LIMIT 200";

    fn from_record(record: &CrmRecord) -> Result<Self, MappingError> {
        let timestamp = match datetime(record, "Detected_At__c")? {
            Some(detected) => detected,
            None => datetime(record, "CreatedDate")?.ok_or(MappingError::MissingField {
                field: "Detected_At__c",
            })?,
        };
        Ok(Self {
            id: required_text(record, "Id")?,
            timestamp,
            room_id: text(record, "Room__c"),
            match_type: picklist(record, "Match_Type__c")?.unwrap_or(MatchType::Unknown),
            confidence: number(record, "Confidence__c")?.unwrap_or(0.0),
            image_url: text(record, "Image_URL__c"),
        })
    }
}

impl CrmEntity for SecurityAlert {
    const OBJECT: &'static str = "Security_Alert__c";
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Alert_Type__c",
        "Status__c",
        "Assigned_To__c",
        "Comments__c",
        "Room__c",
        "CreatedDate",
    ];
    const ORDER_BY: &'static str = "CreatedDate DESC";

    fn from_record(record: &CrmRecord) -> Result<Self, MappingError> {
        Ok(Self {
            id: required_text(record, "Id")?,
            alert_type: picklist::<AlertType>(record, "Alert_Type__c")?.ok_or(
                MappingError::MissingField {
                    field: "Alert_Type__c",
                },
            )?,
            status: picklist(record, "Status__c")?.unwrap_or(AlertStatus::Open),
            assigned_to: text(record, "Assigned_To__c"),
            comments: text(record, "Comments__c"),
            room_id: text(record, "Room__c"),
            raised_at: datetime(record, "CreatedDate")?,
        })
    }
}

impl CrmWritable for SecurityAlert {
    fn to_fields(&self) -> CrmRecord {
        let mut fields = CrmRecord::new();
        fields.insert(
            "Alert_Type__c".into(),
            Value::String(self.alert_type.crm_value().to_owned()),
        );
        fields.insert(
            "Status__c".into(),
            Value::String(self.status.crm_value().to_owned()),
        );
        fields.insert("Assigned_To__c".into(), opt_text(self.assigned_to.as_deref()));
        fields.insert("Comments__c".into(), opt_text(self.comments.as_deref()));
        fields.insert("Room__c".into(), opt_text(self.room_id.as_deref()));
        fields
    }
}

impl CrmEntity for AudioLog {
    const OBJECT: &'static str = "Audio_Log__c";
    const FIELDS: &'static [&'static str] =
        &["Id", "Recording_URL__c", "Duration__c", "Room__c", "CreatedDate"];
    const ORDER_BY: &'static str = "CreatedDate DESC LIMIT 200";

    fn from_record(record: &CrmRecord) -> Result<Self, MappingError> {
        Ok(Self {
            id: required_text(record, "Id")?,
            recording_url: text(record, "Recording_URL__c"),
            duration_seconds: number(record, "Duration__c")?,
            room_id: text(record, "Room__c"),
            recorded_at: datetime(record, "CreatedDate")?,
            sentiment: AUDIO_SENTIMENT_PLACEHOLDER.to_owned(),
            flags: Vec::new(),
        })
    }
}

impl CrmEntity for LinenStock {
    const OBJECT: &'static str = "Linen_Stock__c";
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Linen_Type__c",
        "Room__c",
        "Status__c",
        "Issued_Date__c",
        "Returned_Date__c",
    ];
    const ORDER_BY: &'static str = "Issued_Date__c DESC NULLS LAST";

    fn from_record(record: &CrmRecord) -> Result<Self, MappingError> {
        Ok(Self {
            id: required_text(record, "Id")?,
            linen_type: required_text(record, "Linen_Type__c")?,
            room_id: text(record, "Room__c"),
            status: picklist(record, "Status__c")?.unwrap_or(LinenStatus::Issued),
            issued_on: date(record, "Issued_Date__c")?,
            returned_on: date(record, "Returned_Date__c")?,
        })
    }
}

impl CrmWritable for LinenStock {
    fn to_fields(&self) -> CrmRecord {
        let mut fields = CrmRecord::new();
        fields.insert("Linen_Type__c".into(), Value::String(self.linen_type.clone()));
        fields.insert("Room__c".into(), opt_text(self.room_id.as_deref()));
        fields.insert(
            "Status__c".into(),
            Value::String(self.status.crm_value().to_owned()),
        );
        fields.insert("Issued_Date__c".into(), opt_date(self.issued_on));
        fields.insert("Returned_Date__c".into(), opt_date(self.returned_on));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::start_of_shift;
    use rstest::rstest;
    use serde_json::json;

    fn record(value: Value) -> CrmRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn guest_status_is_derived_from_timestamps() {
        let guest = Guest::from_record(&record(json!({
            "Id": "a005g000001AbCdAAK",
            "Name": "Ada Lovelace",
            "Room_Number__c": "101",
            "Check_In_Time__c": "2026-03-14T21:00:00.000+0000",
            "Check_Out_Time__c": null,
            "Status__c": "Not Arrived"
        })))
        .expect("mappable guest");

        assert_eq!(guest.status, GuestStatus::CheckedIn);
        assert_eq!(guest.room_number.as_deref(), Some("101"));
    }

    #[rstest]
    #[case("Reserved")]
    #[case("checked_in")]
    fn unknown_stored_guest_status_falls_back_to_timestamps(#[case] stored: &str) {
        let rows = vec![record(json!({
            "Id": "a005g000001AbCdAAK",
            "Name": "Ada",
            "Check_In_Time__c": "2026-03-14T21:00:00.000+0000",
            "Status__c": stored
        }))];

        let guests: Vec<Guest> = map_records(&rows);

        assert_eq!(guests.len(), 1);
        assert_eq!(guests[0].status, GuestStatus::CheckedIn);
    }

    #[test]
    fn stored_vip_status_overrides_timestamps() {
        let guest = Guest::from_record(&record(json!({
            "Id": "a005g000001AbCdAAL",
            "Name": "Grace",
            "Check_In_Time__c": "2026-03-14T21:00:00.000+0000",
            "Status__c": "VIP"
        })))
        .expect("mappable guest");

        assert_eq!(guest.status, GuestStatus::Vip);
    }

    #[test]
    fn face_log_falls_back_to_created_date() {
        let log = FaceLog::from_record(&record(json!({
            "Id": "a015g000001AbCdAAK",
            "CreatedDate": "2026-03-14T22:00:00.000+0000",
            "Confidence__c": 87.5,
            "Match_Type__c": "Unknown"
        })))
        .expect("mappable face log");

        assert_eq!(log.timestamp, start_of_shift());
        assert!((log.confidence - 87.5).abs() < f64::EPSILON);
        assert_eq!(log.match_type, MatchType::Unknown);
    }

    #[rstest]
    #[case(json!({"Name": "No id", "Role__c": "Security"}))]
    #[case(json!({"Id": "a025g000001AbCdAAK", "Name": "Bob", "Role__c": "Chef"}))]
    #[case(json!({"Id": "a025g000001AbCdAAK", "Name": "Bob"}))]
    fn unmappable_staff_is_rejected(#[case] raw: Value) {
        assert!(Staff::from_record(&record(raw)).is_err());
    }

    #[test]
    fn map_records_skips_bad_rows() {
        let rows = vec![
            record(json!({"Id": "r1", "Name": "101", "Status__c": "Occupied"})),
            record(json!({"Id": "r2", "Name": "102", "Status__c": "Flooded"})),
            record(json!({"Id": "r3", "Name": "103"})),
        ];

        let rooms: Vec<Room> = map_records(&rows);

        let ids: Vec<&str> = rooms.iter().map(|room| room.id.as_str()).collect();
        assert_eq!(ids, ["r1", "r3"]);
        assert_eq!(rooms[1].status, RoomStatus::Vacant);
    }

    #[test]
    fn soql_selects_every_mapped_field() {
        assert_eq!(
            Room::soql(),
            "SELECT Id, Name, Status__c, Guest__c FROM Room__c ORDER BY Name"
        );
    }

    #[test]
    fn guest_fields_use_crm_spellings() {
        let guest = Guest {
            id: "G1".to_owned(),
            name: "Ada".to_owned(),
            room_number: None,
            check_in: Some(start_of_shift()),
            check_out: None,
            status: GuestStatus::CheckedIn,
        };

        let fields = guest.to_fields();

        assert_eq!(fields.get("Status__c"), Some(&json!("Checked In")));
        assert_eq!(
            fields.get("Check_In_Time__c"),
            Some(&json!("2026-03-14T22:00:00.000Z"))
        );
        assert_eq!(fields.get("Room_Number__c"), Some(&Value::Null));
        assert!(!fields.contains_key("Id"));
    }

    #[test]
    fn linen_dates_round_trip_as_iso_dates() {
        let linen = LinenStock::from_record(&record(json!({
            "Id": "a035g000001AbCdAAK",
            "Linen_Type__c": "Towel",
            "Status__c": "Returned",
            "Issued_Date__c": "2026-03-10",
            "Returned_Date__c": "2026-03-12"
        })))
        .expect("mappable linen");

        assert_eq!(linen.to_fields().get("Returned_Date__c"), Some(&json!("2026-03-12")));
    }

    #[test]
    fn audio_logs_carry_placeholder_analysis() {
        let log = AudioLog::from_record(&record(json!({
            "Id": "a045g000001AbCdAAK",
            "Duration__c": 42
        })))
        .expect("mappable audio log");

        assert_eq!(log.sentiment, "neutral");
        assert!(log.flags.is_empty());
        assert_eq!(log.duration_seconds, Some(42.0));
    }
}
