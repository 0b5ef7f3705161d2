//! HubSpot CRM object shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Contact properties requested from HubSpot.
pub const CONTACT_PROPERTIES: &[&str] = &[
    "firstname",
    "lastname",
    "email",
    "company",
    "jobtitle",
    "industry",
    "lifecyclestage",
    "hs_lead_status",
    "notes_last_updated",
];

/// Deal properties requested from HubSpot.
pub const DEAL_PROPERTIES: &[&str] = &[
    "dealname",
    "dealstage",
    "amount",
    "closedate",
    "pipeline",
    "hs_next_step",
];

/// A CRM object as returned by `GET /crm/v3/objects/{type}/{id}`.
///
/// HubSpot returns every requested property, with `null` for unset ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrmRecord {
    pub id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Option<String>>,
}

impl CrmRecord {
    /// A property's value, `None` when unset or blank.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// "First Last" for contacts, `dealname` for deals, otherwise the id.
    pub fn display_name(&self) -> String {
        let full_name = [self.property("firstname"), self.property("lastname")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        if !full_name.is_empty() {
            full_name
        } else if let Some(name) = self.property("dealname") {
            name.to_string()
        } else {
            format!("#{}", self.id)
        }
    }

    /// `name: value` lines for the given fields that are set, for prompts.
    pub fn describe(&self, fields: &[&str]) -> String {
        fields
            .iter()
            .filter_map(|field| self.property(field).map(|value| format!("{field}: {value}")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Body for `PATCH /crm/v3/objects/{type}/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct PropertyUpdate<'a> {
    pub properties: &'a BTreeMap<String, String>,
}
