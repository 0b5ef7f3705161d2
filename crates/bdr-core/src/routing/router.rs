//! First-match-wins evaluation of the routing rule table.

use std::sync::Arc;

use bdr_types::event::NormalizedEvent;
use bdr_types::rule::{RoutingRule, RuleTable};
use bdr_types::workflow::WorkflowId;

/// Resolves events to workflows against a read-only rule table.
///
/// Cloning is cheap; all clones share the same table.
#[derive(Debug, Clone)]
pub struct Router {
    rules: Arc<RuleTable>,
}

impl Router {
    pub fn new(rules: Arc<RuleTable>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// The workflow of the first matching rule, or `None` if nothing matches.
    pub fn resolve(&self, event: &NormalizedEvent) -> Option<WorkflowId> {
        resolve(event, &self.rules)
    }
}

/// Scan `table` in declaration order and return the first match.
pub fn resolve(event: &NormalizedEvent, table: &RuleTable) -> Option<WorkflowId> {
    table
        .rules()
        .iter()
        .find(|rule| matches(rule, event))
        .map(|rule| rule.workflow.clone())
}

fn matches(rule: &RoutingRule, event: &NormalizedEvent) -> bool {
    if rule.object_type != *event.object_type() || rule.event_type != *event.event_type() {
        return false;
    }

    if let Some(names) = &rule.property_names {
        match event.changed_property() {
            Some(name) if names.contains(name) => {}
            _ => return false,
        }

        if let Some(values) = &rule.property_values {
            match event.property_value() {
                Some(value) if values.contains(value) => {}
                _ => return false,
            }
        }
    }

    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bdr_types::event::{EventType, ObjectType};
    use chrono::Utc;

    fn default_router() -> Router {
        Router::new(Arc::new(RuleTable::default()))
    }

    fn contact_change(property: &str, value: &str) -> NormalizedEvent {
        NormalizedEvent::property_change(ObjectType::Contact, "101", property, value, Utc::now())
            .unwrap()
    }

    #[test]
    fn test_contact_creation_routes_to_enrich() {
        let event = NormalizedEvent::creation(ObjectType::Contact, "1", Utc::now()).unwrap();
        assert_eq!(default_router().resolve(&event), Some(WorkflowId::enrich()));
    }

    #[test]
    fn test_lifecycle_properties_route_to_draft() {
        let router = default_router();
        for property in ["lifecyclestage", "lead_status", "hs_lead_status"] {
            assert_eq!(
                router.resolve(&contact_change(property, "salesqualifiedlead")),
                Some(WorkflowId::draft()),
                "property {property}"
            );
        }
    }

    #[test]
    fn test_engagement_properties_route_to_followup() {
        let router = default_router();
        for property in [
            "email_opened",
            "email_clicked",
            "notes_last_updated",
            "engagement_last_updated",
        ] {
            assert_eq!(
                router.resolve(&contact_change(property, "true")),
                Some(WorkflowId::followup()),
                "property {property}"
            );
        }
    }

    #[test]
    fn test_dealstage_routes_to_prep() {
        let event = NormalizedEvent::property_change(
            ObjectType::Deal,
            "900",
            "dealstage",
            "appointmentscheduled",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(default_router().resolve(&event), Some(WorkflowId::prep()));
    }

    #[test]
    fn test_unmatched_events() {
        let router = default_router();

        assert_eq!(router.resolve(&contact_change("firstname", "Ada")), None);

        let other_deal = NormalizedEvent::property_change(
            ObjectType::Deal,
            "900",
            "amount",
            "100",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(router.resolve(&other_deal), None);

        let deal_creation = NormalizedEvent::creation(ObjectType::Deal, "900", Utc::now()).unwrap();
        assert_eq!(router.resolve(&deal_creation), None);

        let deletion = NormalizedEvent::new(
            ObjectType::Contact,
            EventType::Deletion,
            None,
            "5",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(router.resolve(&deletion), None);
    }

    #[test]
    fn test_first_match_wins() {
        let table = RuleTable::new(vec![
            RoutingRule::new(ObjectType::Contact, EventType::PropertyChange, "specific".into())
                .with_property_names(["lifecyclestage"])
                .with_property_values(["customer"]),
            RoutingRule::new(ObjectType::Contact, EventType::PropertyChange, "general".into())
                .with_property_names(["lifecyclestage"]),
            RoutingRule::new(ObjectType::Contact, EventType::PropertyChange, "fallback".into()),
        ])
        .unwrap();

        assert_eq!(
            resolve(&contact_change("lifecyclestage", "customer"), &table),
            Some(WorkflowId::new("specific"))
        );
        assert_eq!(
            resolve(&contact_change("lifecyclestage", "lead"), &table),
            Some(WorkflowId::new("general"))
        );
        assert_eq!(
            resolve(&contact_change("phone", "555"), &table),
            Some(WorkflowId::new("fallback"))
        );
    }

    #[test]
    fn test_name_filter_never_matches_creation() {
        let table = RuleTable::new(vec![
            RoutingRule::new(ObjectType::Contact, EventType::Creation, "named".into())
                .with_property_names(["email"]),
        ])
        .unwrap();
        let event = NormalizedEvent::creation(ObjectType::Contact, "1", Utc::now()).unwrap();
        assert_eq!(resolve(&event, &table), None);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let router = default_router();
        let event = contact_change("lead_status", "OPEN");
        let first = router.resolve(&event);
        let second = router.resolve(&event);
        assert_eq!(first, second);
        assert_eq!(first, Some(WorkflowId::draft()));
    }

    #[test]
    fn test_empty_table_matches_nothing() {
        let table = RuleTable::new(Vec::new()).unwrap();
        let event = NormalizedEvent::creation(ObjectType::Contact, "1", Utc::now()).unwrap();
        assert_eq!(resolve(&event, &table), None);
    }
}
