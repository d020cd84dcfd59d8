// Domain models for groups, contacts, and caller identity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact group owned by a single account.
///
/// The owner is assigned at creation time and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A contact belonging to exactly one group.
///
/// Contacts are managed elsewhere; this service only reads them filtered
/// by group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A group together with its member contacts.
///
/// Serializes as the group's fields at the top level plus a `contacts`
/// array.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub contacts: Vec<Contact>,
}

/// Validated payload for group creation.
///
/// Unknown fields in the raw request body are dropped during
/// deserialization, so an owner-like field supplied by the client is
/// never honored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The authenticated caller, resolved per request by the auth middleware.
///
/// Never persisted by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallerIdentity {
    pub account_id: i64,
}
