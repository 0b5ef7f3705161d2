//! HubSpot delivery parsing and sub-event normalization.
//!
//! Provides:
//! - `parse_delivery()` -- split a webhook body into [`RawEvent`]s
//! - `normalize()` -- turn one raw sub-event into a [`NormalizedEvent`]
//! - `normalize_delivery()` -- normalize a whole delivery, collecting rejects
//!
//! Everything here is pure: no I/O, no shared state.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use bdr_types::error::{DeliveryError, MalformedEventError};
use bdr_types::event::{EventType, NormalizedEvent, ObjectType, PropertyChange};

// ---------------------------------------------------------------------------
// RawEvent
// ---------------------------------------------------------------------------

/// One sub-event exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent(Value);

impl RawEvent {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The `subscriptionType` field, if it is a string. Used for logging only.
    pub fn subscription_type(&self) -> Option<&str> {
        self.0.get("subscriptionType").and_then(Value::as_str)
    }
}

/// Split a webhook body into sub-events.
///
/// HubSpot sends a JSON array; a single JSON object is accepted as a
/// one-element delivery.
pub fn parse_delivery(body: &[u8]) -> Result<Vec<RawEvent>, DeliveryError> {
    let value: Value = serde_json::from_slice(body)?;
    match value {
        Value::Array(items) => Ok(items.into_iter().map(RawEvent::new).collect()),
        Value::Object(_) => Ok(vec![RawEvent::new(value)]),
        Value::Null => Err(DeliveryError::UnexpectedShape("null")),
        Value::Bool(_) => Err(DeliveryError::UnexpectedShape("boolean")),
        Value::Number(_) => Err(DeliveryError::UnexpectedShape("number")),
        Value::String(_) => Err(DeliveryError::UnexpectedShape("string")),
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize one sub-event.
///
/// Fails when the object type, event type or object id is missing or
/// mis-shaped, or when a `propertyChange` event has no `propertyName`.
pub fn normalize(raw: &RawEvent) -> Result<NormalizedEvent, MalformedEventError> {
    let fields = raw.as_value().as_object().ok_or(MalformedEventError::NotAnObject)?;

    let (object_type, event_type) = classify(fields)?;
    let object_id = object_id(fields)?;
    let occurred_at = occurred_at(fields)?;

    let change = if event_type == EventType::PropertyChange {
        Some(property_change(fields)?)
    } else {
        None
    };

    let event = NormalizedEvent::new(object_type, event_type, change, object_id, occurred_at)?;

    Ok(match event_id(fields) {
        Some(id) => event.with_event_id(id),
        None => event,
    })
}

/// Result of normalizing a whole delivery.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    /// Events ready for routing, in delivery order.
    pub events: Vec<NormalizedEvent>,
    /// Rejected sub-events: (position in the delivery, reason).
    pub rejected: Vec<(usize, MalformedEventError)>,
}

/// Normalize every sub-event of a delivery. A malformed sub-event is logged
/// and rejected without affecting the others.
pub fn normalize_delivery(raw_events: &[RawEvent]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for (index, raw) in raw_events.iter().enumerate() {
        match normalize(raw) {
            Ok(event) => batch.events.push(event),
            Err(e) => {
                tracing::warn!(
                    index,
                    subscription_type = raw.subscription_type().unwrap_or("<none>"),
                    error = %e,
                    "rejected malformed sub-event"
                );
                batch.rejected.push((index, e));
            }
        }
    }

    batch
}

// ---------------------------------------------------------------------------
// Field extraction helpers
// ---------------------------------------------------------------------------

/// Object and event type, from `subscriptionType` ("contact.creation") or
/// from explicit `objectType` / `eventType` fields.
fn classify(fields: &Map<String, Value>) -> Result<(ObjectType, EventType), MalformedEventError> {
    match fields.get("subscriptionType") {
        Some(Value::String(subscription)) => {
            let (object, event) = subscription
                .split_once('.')
                .filter(|(o, e)| !o.is_empty() && !e.is_empty())
                .ok_or_else(|| MalformedEventError::InvalidField {
                    field: "subscriptionType",
                    reason: format!("expected '<objectType>.<eventType>', got '{subscription}'"),
                })?;
            Ok((object.to_string().into(), event.to_string().into()))
        }
        Some(Value::Null) | None => {
            let object = required_str(fields, "objectType")?;
            let event = required_str(fields, "eventType")?;
            Ok((object.to_string().into(), event.to_string().into()))
        }
        Some(other) => Err(MalformedEventError::InvalidField {
            field: "subscriptionType",
            reason: format!("expected a string, got {}", json_kind(other)),
        }),
    }
}

fn required_str<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, MalformedEventError> {
    match fields.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) => Err(MalformedEventError::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        }),
        Some(Value::Null) | None => Err(MalformedEventError::MissingField(field)),
        Some(other) => Err(MalformedEventError::InvalidField {
            field,
            reason: format!("expected a string, got {}", json_kind(other)),
        }),
    }
}

/// HubSpot record ids are unsigned integers, sent as numbers or digit strings.
///
/// The id ends up in CRM API paths, so anything else is rejected here.
fn object_id(fields: &Map<String, Value>) -> Result<String, MalformedEventError> {
    match fields.get("objectId") {
        Some(Value::Number(n)) if n.is_u64() => Ok(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            Ok(s.clone())
        }
        Some(Value::Null) | None => Err(MalformedEventError::MissingField("objectId")),
        Some(Value::String(s)) if s.is_empty() => Err(MalformedEventError::MissingField("objectId")),
        Some(Value::String(_)) => Err(MalformedEventError::InvalidField {
            field: "objectId",
            reason: "expected a numeric record id".to_string(),
        }),
        Some(other) => Err(MalformedEventError::InvalidField {
            field: "objectId",
            reason: format!("expected an unsigned integer, got {}", json_kind(other)),
        }),
    }
}

/// `occurredAt` in epoch milliseconds (or RFC 3339). Defaults to now.
fn occurred_at(fields: &Map<String, Value>) -> Result<DateTime<Utc>, MalformedEventError> {
    let invalid = |reason: String| MalformedEventError::InvalidField {
        field: "occurredAt",
        reason,
    };

    match fields.get("occurredAt") {
        Some(Value::Null) | None => Ok(Utc::now()),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| invalid(format!("{n} is not a valid epoch-millisecond timestamp"))),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| invalid(e.to_string())),
        Some(other) => Err(invalid(format!("expected a timestamp, got {}", json_kind(other)))),
    }
}

/// A cleared property arrives with a null or missing value; it normalizes
/// to the empty string.
fn property_change(fields: &Map<String, Value>) -> Result<PropertyChange, MalformedEventError> {
    let name = required_str(fields, "propertyName")?.to_string();
    let value = match fields.get("propertyValue") {
        Some(Value::Null) | None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        Some(other) => {
            return Err(MalformedEventError::InvalidField {
                field: "propertyValue",
                reason: format!("expected a scalar, got {}", json_kind(other)),
            });
        }
    };
    Ok(PropertyChange { name, value })
}

fn event_id(fields: &Map<String, Value>) -> Option<String> {
    match fields.get("eventId") {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
