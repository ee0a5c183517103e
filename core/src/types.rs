//! Account-level payloads returned by the CreateSend API.
//!
//! Field names follow the API's PascalCase JSON; unknown fields are ignored
//! so additions on the provider side do not break decoding.

use serde::{Deserialize, Serialize};

/// Response of `/apikey.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiKeyResponse {
    pub api_key: String,
}

/// One entry of `/clients.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    #[serde(rename = "ClientID")]
    pub client_id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillingDetails {
    pub credits: i64,
}

/// Current date in the account's timezone, formatted by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemDate {
    pub system_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Administrator {
    pub email_address: String,
    pub name: String,
    /// e.g. "Active", "Waiting to Accept the Invitation".
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrimaryContact {
    pub email_address: String,
}
