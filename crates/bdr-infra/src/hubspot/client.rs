//! HubSpotClient -- read and update contacts and deals through the CRM v3 API.
//!
//! Authenticates with a private app token sent as a bearer token. The token
//! is a [`SecretString`] and never appears in logs or `Debug` output.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};

use bdr_types::config::HubSpotConfig;

use super::types::{CONTACT_PROPERTIES, CrmRecord, DEAL_PROPERTIES, PropertyUpdate};
use crate::error::{ClientError, ensure_success, http_client};

const SERVICE: &str = "hubspot";

/// HubSpot CRM client.
pub struct HubSpotClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: Url,
    portal_id: Option<String>,
}

impl HubSpotClient {
    pub fn new(api_key: SecretString, config: &HubSpotConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            ClientError::InvalidUrl {
                service: SERVICE,
                message: format!("{}: {e}", config.base_url),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                service: SERVICE,
                message: format!("{} cannot be a base URL", config.base_url),
            });
        }

        Ok(Self {
            client: http_client(SERVICE, Duration::from_secs(30))?,
            api_key,
            base_url,
            portal_id: config.portal_id.clone(),
        })
    }

    /// Fetch a contact. `Ok(None)` when HubSpot has no such contact.
    pub async fn get_contact(&self, contact_id: &str) -> Result<Option<CrmRecord>, ClientError> {
        self.get_object("contacts", contact_id, CONTACT_PROPERTIES).await
    }

    /// Fetch a deal. `Ok(None)` when HubSpot has no such deal.
    pub async fn get_deal(&self, deal_id: &str) -> Result<Option<CrmRecord>, ClientError> {
        self.get_object("deals", deal_id, DEAL_PROPERTIES).await
    }

    /// Overwrite the given contact properties.
    pub async fn update_contact(
        &self,
        contact_id: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<(), ClientError> {
        let url = self.object_url("contacts", contact_id)?;
        tracing::debug!(contact_id, fields = properties.len(), "updating hubspot contact");

        let response = self
            .client
            .patch(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&PropertyUpdate { properties })
            .send()
            .await
            .map_err(transport)?;

        ensure_success(SERVICE, response).await?;
        Ok(())
    }

    /// Link to a record in the HubSpot UI, when the portal id is configured.
    pub fn record_url(&self, object: &str, object_id: &str) -> Option<String> {
        self.portal_id
            .as_deref()
            .map(|portal| record_url(portal, object, object_id))
    }

    async fn get_object(
        &self,
        object: &str,
        object_id: &str,
        properties: &[&str],
    ) -> Result<Option<CrmRecord>, ClientError> {
        let url = self.object_url(object, object_id)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(self.api_key.expose_secret())
            .query(&[("properties", properties.join(","))])
            .send()
            .await
            .map_err(transport)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(object, object_id, "hubspot object not found");
            return Ok(None);
        }

        let response = ensure_success(SERVICE, response).await?;
        let record = response
            .json::<CrmRecord>()
            .await
            .map_err(|e| ClientError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(Some(record))
    }

    /// `{base}/crm/v3/objects/{object}/{id}` with every segment percent-encoded,
    /// so an id can never add path segments or a query.
    fn object_url(&self, object: &str, object_id: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                service: SERVICE,
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(["crm", "v3", "objects", object, object_id]);
        Ok(url)
    }
}

fn transport(e: reqwest::Error) -> ClientError {
    ClientError::Transport {
        service: SERVICE,
        message: e.to_string(),
    }
}

/// `https://app.hubspot.com/contacts/{portal}/{contact|deal}/{id}`.
fn record_url(portal: &str, object: &str, object_id: &str) -> String {
    let kind = object.trim_end_matches('s');
    format!("https://app.hubspot.com/contacts/{portal}/{kind}/{object_id}")
}

impl std::fmt::Debug for HubSpotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubSpotClient")
            .field("base_url", &self.base_url)
            .field("portal_id", &self.portal_id)
            .finish_non_exhaustive()
    }
}
