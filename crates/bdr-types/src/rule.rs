//! Declarative routing rules.
//!
//! A [`RuleTable`] is loaded once at startup (from the `[[rules]]` array of the
//! config file, or [`RuleTable::default`]) and is read-only afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::event::{EventType, ObjectType};
use crate::workflow::WorkflowId;

/// One routing rule: (object type, event type, property filter) -> workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub object_type: ObjectType,
    pub event_type: EventType,
    /// The rule applies only when the changed property is one of these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_names: Option<BTreeSet<String>>,
    /// The rule applies only when the new property value is one of these.
    /// Only meaningful together with `property_names`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_values: Option<BTreeSet<String>>,
    pub workflow: WorkflowId,
}

impl RoutingRule {
    pub fn new(object_type: ObjectType, event_type: EventType, workflow: WorkflowId) -> Self {
        Self {
            object_type,
            event_type,
            property_names: None,
            property_values: None,
            workflow,
        }
    }

    pub fn with_property_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_property_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.workflow.as_str().is_empty() {
            return Err(ConfigError::InvalidRule {
                index,
                reason: "workflow must not be empty".to_string(),
            });
        }
        if matches!(&self.property_names, Some(names) if names.is_empty()) {
            return Err(ConfigError::InvalidRule {
                index,
                reason: "property_names must not be empty when set".to_string(),
            });
        }
        if self.property_values.is_some() && self.property_names.is_none() {
            return Err(ConfigError::InvalidRule {
                index,
                reason: "property_values requires property_names".to_string(),
            });
        }
        Ok(())
    }
}

/// Ordered rule list. Evaluation order is declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RoutingRule>", into = "Vec<RoutingRule>")]
pub struct RuleTable {
    rules: Vec<RoutingRule>,
}

impl RuleTable {
    /// Build a table, validating every rule.
    pub fn new(rules: Vec<RoutingRule>) -> Result<Self, ConfigError> {
        for (index, rule) in rules.iter().enumerate() {
            rule.validate(index)?;
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every distinct workflow targeted by the table, sorted.
    pub fn workflows(&self) -> BTreeSet<&WorkflowId> {
        self.rules.iter().map(|r| &r.workflow).collect()
    }
}

impl TryFrom<Vec<RoutingRule>> for RuleTable {
    type Error = ConfigError;

    fn try_from(rules: Vec<RoutingRule>) -> Result<Self, Self::Error> {
        Self::new(rules)
    }
}

impl From<RuleTable> for Vec<RoutingRule> {
    fn from(table: RuleTable) -> Self {
        table.rules
    }
}

/// The standard BDR routing table.
///
/// Lifecycle changes and engagement changes are both contact property
/// changes, separated by disjoint property-name sets.
impl Default for RuleTable {
    fn default() -> Self {
        Self {
            rules: vec![
                RoutingRule::new(ObjectType::Contact, EventType::Creation, WorkflowId::enrich()),
                RoutingRule::new(
                    ObjectType::Contact,
                    EventType::PropertyChange,
                    WorkflowId::draft(),
                )
                .with_property_names(["lifecyclestage", "lead_status", "hs_lead_status"]),
                RoutingRule::new(
                    ObjectType::Contact,
                    EventType::PropertyChange,
                    WorkflowId::followup(),
                )
                .with_property_names([
                    "notes_last_updated",
                    "engagement_last_updated",
                    "email_opened",
                    "email_clicked",
                ]),
                RoutingRule::new(ObjectType::Deal, EventType::PropertyChange, WorkflowId::prep())
                    .with_property_names(["dealstage"]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_targets_all_four_workflows() {
        let table = RuleTable::default();
        assert_eq!(table.len(), 4);
        let workflows: Vec<&str> = table.workflows().iter().map(|w| w.as_str()).collect();
        assert_eq!(workflows, vec!["draft", "enrich", "followup", "prep"]);
    }

    #[test]
    fn test_default_table_is_valid() {
        let table = RuleTable::default();
        assert!(RuleTable::new(table.rules().to_vec()).is_ok());
    }

    #[test]
    fn test_values_without_names_rejected() {
        let rule = RoutingRule::new(ObjectType::Deal, EventType::PropertyChange, WorkflowId::prep())
            .with_property_values(["closedwon"]);
        let err = RuleTable::new(vec![rule]).unwrap_err();
        assert!(err.to_string().contains("property_values requires property_names"));
    }

    #[test]
    fn test_empty_name_set_rejected() {
        let rule = RoutingRule::new(ObjectType::Deal, EventType::PropertyChange, WorkflowId::prep())
            .with_property_names(Vec::<String>::new());
        assert!(RuleTable::new(vec![rule]).is_err());
    }

    #[test]
    fn test_invalid_rule_rejected_at_deserialization() {
        let result: Result<RuleTable, _> = serde_json::from_str(
            r#"[{"object_type":"deal","event_type":"propertyChange","property_values":["x"],"workflow":"prep"}]"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rule_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            rules: RuleTable,
        }

        let doc: Doc = toml::from_str(
            r#"
[[rules]]
object_type = "deal"
event_type = "propertyChange"
property_names = ["dealstage"]
property_values = ["closedwon", "contractsent"]
workflow = "prep"
"#,
        )
        .unwrap();

        let rule = &doc.rules.rules()[0];
        assert_eq!(rule.object_type, ObjectType::Deal);
        assert_eq!(rule.event_type, EventType::PropertyChange);
        assert!(rule.property_values.as_ref().unwrap().contains("contractsent"));
        assert_eq!(rule.workflow, WorkflowId::prep());
    }
}
