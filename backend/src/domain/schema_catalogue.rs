//! Static description of the custom objects the dashboard depends on.
//!
//! Used by [`crate::domain::SchemaProvisioner`] to detect missing schema and
//! to build Tooling API `CustomObject` / `CustomField` payloads.

use std::sync::LazyLock;

use serde_json::{Value, json};

use super::records::{AlertStatus, AlertType, GuestStatus, LinenStatus, MatchType, RoomStatus, StaffRole};

/// How the record name field is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameField {
    /// Free text entered by the user.
    Text { label: &'static str },
    /// Generated sequence such as `FL-0001`.
    AutoNumber {
        label: &'static str,
        display_format: &'static str,
    },
}

/// Data type of a custom field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text { length: u32 },
    LongText { length: u32 },
    Number { precision: u32, scale: u32 },
    DateTime,
    Date,
    Url,
    Picklist { values: Vec<&'static str> },
    Lookup {
        reference_to: &'static str,
        relationship_name: &'static str,
    },
}

/// One custom field of a catalogue object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldSpec {
    pub api_name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

/// One custom object and its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomObjectSpec {
    pub api_name: &'static str,
    pub label: &'static str,
    pub plural_label: &'static str,
    pub name_field: NameField,
    pub fields: Vec<CustomFieldSpec>,
}

impl CustomFieldSpec {
    fn new(api_name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            api_name,
            label,
            kind,
        }
    }

    /// `Object__c.Field__c`.
    pub fn full_name(&self, object: &str) -> String {
        format!("{object}.{}", self.api_name)
    }

    /// Tooling API `CustomField` create body.
    pub fn tooling_body(&self, object: &str) -> Value {
        let mut metadata = json!({ "label": self.label });
        let extra = match &self.kind {
            FieldKind::Text { length } => json!({ "type": "Text", "length": length }),
            FieldKind::LongText { length } => {
                json!({ "type": "LongTextArea", "length": length, "visibleLines": 4 })
            }
            FieldKind::Number { precision, scale } => {
                json!({ "type": "Number", "precision": precision, "scale": scale })
            }
            FieldKind::DateTime => json!({ "type": "DateTime" }),
            FieldKind::Date => json!({ "type": "Date" }),
            FieldKind::Url => json!({ "type": "Url" }),
            FieldKind::Picklist { values } => {
                let values: Vec<Value> = values
                    .iter()
                    .map(|value| json!({ "fullName": value, "label": value, "default": false }))
                    .collect();
                json!({
                    "type": "Picklist",
                    "valueSet": { "valueSetDefinition": { "value": values } }
                })
            }
            FieldKind::Lookup {
                reference_to,
                relationship_name,
            } => json!({
                "type": "Lookup",
                "referenceTo": reference_to,
                "relationshipName": relationship_name,
                "deleteConstraint": "SetNull"
            }),
        };
        if let (Value::Object(target), Value::Object(source)) = (&mut metadata, extra) {
            target.extend(source);
        }
        json!({ "FullName": self.full_name(object), "Metadata": metadata })
    }
}

impl CustomObjectSpec {
    /// Tooling API `CustomObject` create body.
    pub fn tooling_body(&self) -> Value {
        let name_field = match self.name_field {
            NameField::Text { label } => json!({ "type": "Text", "label": label }),
            NameField::AutoNumber {
                label,
                display_format,
            } => json!({
                "type": "AutoNumber",
                "label": label,
                "displayFormat": display_format
            }),
        };
        json!({
            "FullName": self.api_name,
            "Metadata": {
                "label": self.label,
                "pluralLabel": self.plural_label,
                "nameField": name_field,
                "deploymentStatus": "Deployed",
                "sharingModel": "ReadWrite"
            }
        })
    }
}

fn picklist<T: Copy>(all: &[T], crm_value: fn(T) -> &'static str) -> FieldKind {
    FieldKind::Picklist {
        values: all.iter().copied().map(crm_value).collect(),
    }
}

fn room_lookup(relationship_name: &'static str) -> CustomFieldSpec {
    CustomFieldSpec::new(
        "Room__c",
        "Room",
        FieldKind::Lookup {
            reference_to: "Room__c",
            relationship_name,
        },
    )
}

static CATALOGUE: LazyLock<Vec<CustomObjectSpec>> = LazyLock::new(|| {
    vec![
        CustomObjectSpec {
            api_name: "Guest__c",
            label: "Guest",
            plural_label: "Guests",
            name_field: NameField::Text {
                label: "Guest Name",
            },
            fields: vec![
                CustomFieldSpec::new("Room_Number__c", "Room Number", FieldKind::Text { length: 10 }),
                CustomFieldSpec::new("Check_In_Time__c", "Check In Time", FieldKind::DateTime),
                CustomFieldSpec::new("Check_Out_Time__c", "Check Out Time", FieldKind::DateTime),
                CustomFieldSpec::new(
                    "Status__c",
                    "Status",
                    picklist(GuestStatus::ALL, GuestStatus::crm_value),
                ),
            ],
        },
        CustomObjectSpec {
            api_name: "Staff__c",
            label: "Staff",
            plural_label: "Staff",
            name_field: NameField::Text {
                label: "Staff Name",
            },
            fields: vec![
                CustomFieldSpec::new("Role__c", "Role", picklist(StaffRole::ALL, StaffRole::crm_value)),
                CustomFieldSpec::new("Shift_Start__c", "Shift Start", FieldKind::Text { length: 10 }),
                CustomFieldSpec::new("Shift_End__c", "Shift End", FieldKind::Text { length: 10 }),
            ],
        },
        CustomObjectSpec {
            api_name: "Room__c",
            label: "Room",
            plural_label: "Rooms",
            name_field: NameField::Text {
                label: "Room Number",
            },
            fields: vec![
                CustomFieldSpec::new(
                    "Status__c",
                    "Status",
                    picklist(RoomStatus::ALL, RoomStatus::crm_value),
                ),
                CustomFieldSpec::new(
                    "Guest__c",
                    "Guest",
                    FieldKind::Lookup {
                        reference_to: "Guest__c",
                        relationship_name: "Rooms",
                    },
                ),
            ],
        },
        CustomObjectSpec {
            api_name: "Face_Log__c",
            label: "Face Log",
            plural_label: "Face Logs",
            name_field: NameField::AutoNumber {
                label: "Face Log Number",
                display_format: "FL-{0000}",
            },
            fields: vec![
                CustomFieldSpec::new("Detected_At__c", "Detected At", FieldKind::DateTime),
                room_lookup("Face_Logs"),
                CustomFieldSpec::new(
                    "Match_Type__c",
                    "Match Type",
                    picklist(MatchType::ALL, MatchType::crm_value),
                ),
                CustomFieldSpec::new(
                    "Confidence__c",
                    "Confidence",
                    FieldKind::Number {
                        precision: 5,
                        scale: 2,
                    },
                ),
                CustomFieldSpec::new("Image_URL__c", "Image URL", FieldKind::Url),
            ],
        },
        CustomObjectSpec {
            api_name: "Security_Alert__c",
            label: "Security Alert",
            plural_label: "Security Alerts",
            name_field: NameField::AutoNumber {
                label: "Alert Number",
                display_format: "SA-{0000}",
            },
            fields: vec![
                CustomFieldSpec::new(
                    "Alert_Type__c",
                    "Alert Type",
                    picklist(AlertType::ALL, AlertType::crm_value),
                ),
                CustomFieldSpec::new(
                    "Status__c",
                    "Status",
                    picklist(AlertStatus::ALL, AlertStatus::crm_value),
                ),
                CustomFieldSpec::new("Assigned_To__c", "Assigned To", FieldKind::Text { length: 80 }),
                CustomFieldSpec::new("Comments__c", "Comments", FieldKind::LongText { length: 32_768 }),
                room_lookup("Security_Alerts"),
            ],
        },
        CustomObjectSpec {
            api_name: "Audio_Log__c",
            label: "Audio Log",
            plural_label: "Audio Logs",
            name_field: NameField::AutoNumber {
                label: "Audio Log Number",
                display_format: "AL-{0000}",
            },
            fields: vec![
                CustomFieldSpec::new("Recording_URL__c", "Recording URL", FieldKind::Url),
                CustomFieldSpec::new(
                    "Duration__c",
                    "Duration (seconds)",
                    FieldKind::Number {
                        precision: 8,
                        scale: 0,
                    },
                ),
                room_lookup("Audio_Logs"),
            ],
        },
        CustomObjectSpec {
            api_name: "Linen_Stock__c",
            label: "Linen Stock",
            plural_label: "Linen Stock",
            name_field: NameField::AutoNumber {
                label: "Linen Number",
                display_format: "LN-{0000}",
            },
            fields: vec![
                CustomFieldSpec::new("Linen_Type__c", "Linen Type", FieldKind::Text { length: 40 }),
                room_lookup("Linen_Stock"),
                CustomFieldSpec::new(
                    "Status__c",
                    "Status",
                    picklist(LinenStatus::ALL, LinenStatus::crm_value),
                ),
                CustomFieldSpec::new("Issued_Date__c", "Issued Date", FieldKind::Date),
                CustomFieldSpec::new("Returned_Date__c", "Returned Date", FieldKind::Date),
            ],
        },
    ]
});

/// The seven custom objects, in creation order.
pub fn catalogue() -> &'static [CustomObjectSpec] {
    CATALOGUE.as_slice()
}
