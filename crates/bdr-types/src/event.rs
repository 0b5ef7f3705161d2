//! Normalized CRM webhook events.
//!
//! A HubSpot delivery carries one or more sub-events. Each sub-event is turned
//! into a [`NormalizedEvent`] before routing; the raw JSON is discarded after
//! that point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::MalformedEventError;

/// Kind of CRM record an event is about.
///
/// Unknown HubSpot object types are preserved in `Other` so rule tables can
/// still target them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectType {
    Contact,
    Deal,
    Company,
    Ticket,
    Other(String),
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Contact => "contact",
            ObjectType::Deal => "deal",
            ObjectType::Company => "company",
            ObjectType::Ticket => "ticket",
            ObjectType::Other(name) => name,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "contact" => ObjectType::Contact,
            "deal" => ObjectType::Deal,
            "company" => ObjectType::Company,
            "ticket" => ObjectType::Ticket,
            other => ObjectType::Other(other.to_string()),
        })
    }
}

impl From<String> for ObjectType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<ObjectType> for String {
    fn from(t: ObjectType) -> Self {
        t.as_str().to_string()
    }
}

/// What happened to the record.
///
/// Names follow HubSpot's `subscriptionType` suffixes (`creation`,
/// `propertyChange`, `deletion`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Creation,
    PropertyChange,
    Deletion,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Creation => "creation",
            EventType::PropertyChange => "propertyChange",
            EventType::Deletion => "deletion",
            EventType::Other(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "creation" => EventType::Creation,
            "propertyChange" => EventType::PropertyChange,
            "deletion" => EventType::Deletion,
            other => EventType::Other(other.to_string()),
        })
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.as_str().to_string()
    }
}

/// The property that changed and its new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub name: String,
    pub value: String,
}

/// Canonical unit the router and dispatcher operate on.
///
/// Immutable once built. The changed property is present exactly when
/// `event_type` is [`EventType::PropertyChange`]. Deserialization goes
/// through [`NormalizedEvent::new`], so the same checks apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EventRecord")]
pub struct NormalizedEvent {
    object_type: ObjectType,
    event_type: EventType,
    change: Option<PropertyChange>,
    object_id: String,
    occurred_at: DateTime<Utc>,
    event_id: Option<String>,
}

/// Unchecked wire shape of a [`NormalizedEvent`].
#[derive(Deserialize)]
struct EventRecord {
    object_type: ObjectType,
    event_type: EventType,
    change: Option<PropertyChange>,
    object_id: String,
    occurred_at: DateTime<Utc>,
    #[serde(default)]
    event_id: Option<String>,
}

impl TryFrom<EventRecord> for NormalizedEvent {
    type Error = MalformedEventError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let event = Self::new(
            record.object_type,
            record.event_type,
            record.change,
            record.object_id,
            record.occurred_at,
        )?;
        Ok(match record.event_id {
            Some(id) => event.with_event_id(id),
            None => event,
        })
    }
}

impl NormalizedEvent {
    /// Build an event, rejecting combinations that break the
    /// property-change invariant.
    pub fn new(
        object_type: ObjectType,
        event_type: EventType,
        change: Option<PropertyChange>,
        object_id: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, MalformedEventError> {
        let object_id = object_id.into();
        if object_id.is_empty() {
            return Err(MalformedEventError::MissingField("objectId"));
        }

        match (&event_type, &change) {
            (EventType::PropertyChange, None) => {
                return Err(MalformedEventError::MissingField("propertyName"));
            }
            (EventType::PropertyChange, Some(_)) | (_, None) => {}
            (other, Some(_)) => {
                return Err(MalformedEventError::UnexpectedProperty(other.to_string()));
            }
        }

        Ok(Self {
            object_type,
            event_type,
            change,
            object_id,
            occurred_at,
            event_id: None,
        })
    }

    /// Shorthand for a creation event.
    pub fn creation(
        object_type: ObjectType,
        object_id: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, MalformedEventError> {
        Self::new(object_type, EventType::Creation, None, object_id, occurred_at)
    }

    /// Shorthand for a property-change event.
    pub fn property_change(
        object_type: ObjectType,
        object_id: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, MalformedEventError> {
        let change = PropertyChange {
            name: property.into(),
            value: value.into(),
        };
        Self::new(
            object_type,
            EventType::PropertyChange,
            Some(change),
            object_id,
            occurred_at,
        )
    }

    /// Attach the HubSpot event id used for log correlation.
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn change(&self) -> Option<&PropertyChange> {
        self.change.as_ref()
    }

    pub fn changed_property(&self) -> Option<&str> {
        self.change.as_ref().map(|c| c.name.as_str())
    }

    pub fn property_value(&self) -> Option<&str> {
        self.change.as_ref().map(|c| c.value.as_str())
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    /// `"<objectType>.<eventType>"`, the HubSpot subscription type.
    pub fn subscription_type(&self) -> String {
        format!("{}.{}", self.object_type, self.event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_roundtrip_known_and_other() {
        assert_eq!("contact".parse::<ObjectType>().unwrap(), ObjectType::Contact);
        assert_eq!("deal".parse::<ObjectType>().unwrap(), ObjectType::Deal);
        let other: ObjectType = "line_item".parse().unwrap();
        assert_eq!(other, ObjectType::Other("line_item".to_string()));
        assert_eq!(other.to_string(), "line_item");
    }

    #[test]
    fn test_event_type_is_case_sensitive() {
        assert_eq!(
            "propertyChange".parse::<EventType>().unwrap(),
            EventType::PropertyChange
        );
        assert_eq!(
            "propertychange".parse::<EventType>().unwrap(),
            EventType::Other("propertychange".to_string())
        );
    }

    #[test]
    fn test_types_serialize_as_plain_strings() {
        let json = serde_json::to_string(&EventType::PropertyChange).unwrap();
        assert_eq!(json, "\"propertyChange\"");
        let parsed: ObjectType = serde_json::from_str("\"company\"").unwrap();
        assert_eq!(parsed, ObjectType::Company);
    }

    #[test]
    fn test_property_change_requires_change() {
        let err = NormalizedEvent::new(
            ObjectType::Contact,
            EventType::PropertyChange,
            None,
            "42",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, MalformedEventError::MissingField("propertyName")));
    }

    #[test]
    fn test_creation_rejects_change() {
        let change = PropertyChange {
            name: "email".to_string(),
            value: "a@b.c".to_string(),
        };
        let err = NormalizedEvent::new(
            ObjectType::Contact,
            EventType::Creation,
            Some(change),
            "42",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, MalformedEventError::UnexpectedProperty(_)));
    }

    #[test]
    fn test_empty_object_id_rejected() {
        let err = NormalizedEvent::creation(ObjectType::Contact, "", Utc::now()).unwrap_err();
        assert!(matches!(err, MalformedEventError::MissingField("objectId")));
    }

    #[test]
    fn test_deserialize_enforces_invariants() {
        let cases = [
            r#"{"object_type":"contact","event_type":"propertyChange","change":null,
                "object_id":"1","occurred_at":"2024-01-01T00:00:00Z"}"#,
            r#"{"object_type":"contact","event_type":"creation","change":null,
                "object_id":"","occurred_at":"2024-01-01T00:00:00Z"}"#,
            r#"{"object_type":"deal","event_type":"creation",
                "change":{"name":"dealstage","value":"closedwon"},
                "object_id":"1","occurred_at":"2024-01-01T00:00:00Z"}"#,
        ];
        for json in cases {
            assert!(
                serde_json::from_str::<NormalizedEvent>(json).is_err(),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_serialized_event_reads_back() {
        let event = NormalizedEvent::property_change(
            ObjectType::Contact,
            "12",
            "hs_lead_status",
            "OPEN",
            Utc::now(),
        )
        .unwrap()
        .with_event_id("evt-9");

        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(serde_json::from_str::<NormalizedEvent>(&json).unwrap(), event);
    }

    #[test]
    fn test_accessors() {
        let event = NormalizedEvent::property_change(
            ObjectType::Deal,
            "901",
            "dealstage",
            "closedwon",
            Utc::now(),
        )
        .unwrap()
        .with_event_id("evt-1");

        assert_eq!(event.changed_property(), Some("dealstage"));
        assert_eq!(event.property_value(), Some("closedwon"));
        assert_eq!(event.object_id(), "901");
        assert_eq!(event.event_id(), Some("evt-1"));
        assert_eq!(event.subscription_type(), "deal.propertyChange");
    }
}
