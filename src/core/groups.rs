// Group resource logic: creation, owner-scoped listing, and the
// ownership-gated detail fetch

use std::sync::Arc;

use crate::api::{ContactStore, GroupStore};
use crate::core::errors::ServiceError;
use crate::core::models::{CallerIdentity, Group, GroupDetail, NewGroup};

/// The group resource operations.
///
/// Stores are injected explicitly so tests can substitute doubles.
#[derive(Clone)]
pub struct GroupResource {
    group_store: Arc<dyn GroupStore + Send + Sync>,
    contact_store: Arc<dyn ContactStore + Send + Sync>,
}

impl GroupResource {
    pub fn new(
        group_store: Arc<dyn GroupStore + Send + Sync>,
        contact_store: Arc<dyn ContactStore + Send + Sync>,
    ) -> Self {
        Self {
            group_store,
            contact_store,
        }
    }

    /// Create a new group owned by the caller.
    ///
    /// The owner always comes from the authenticated identity, never from
    /// the payload.
    pub async fn create(
        &self,
        payload: NewGroup,
        caller: CallerIdentity,
    ) -> Result<Group, ServiceError> {
        self.group_store.insert(payload, caller.account_id).await
    }

    /// List every group owned by the caller. Empty list if none.
    pub async fn list_owned(&self, caller: CallerIdentity) -> Result<Vec<Group>, ServiceError> {
        self.group_store.list_by_owner(caller.account_id).await
    }

    /// Fetch one group with its contacts, gated on ownership.
    ///
    /// An absent group is reported as not-found before ownership is read.
    /// A non-owner gets an ownership violation and no contact lookup is
    /// performed, so nothing about the group's contents can leak.
    pub async fn get_with_contacts(
        &self,
        group_id: i64,
        caller: CallerIdentity,
    ) -> Result<GroupDetail, ServiceError> {
        let group = self
            .group_store
            .get_by_id(group_id)
            .await?
            .ok_or(ServiceError::NotFound("group"))?;

        if group.owner_id != caller.account_id {
            return Err(ServiceError::OwnershipViolation);
        }

        let contacts = self.contact_store.list_by_group(group_id).await?;

        Ok(GroupDetail { group, contacts })
    }
}
