//! HubSpot CRM v3 client.

pub mod client;
pub mod types;

pub use client::HubSpotClient;
pub use types::CrmRecord;
