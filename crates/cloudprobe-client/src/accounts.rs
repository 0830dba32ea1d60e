//! Cloud account service

use cloudprobe_core::{AccountType, random_suffix, unique_name};
use tracing::info;

use crate::client::{PlatformClient, Service};
use crate::error::Result;
use crate::models::{CloudAccount, CreatedId, NewCloudAccount};

impl NewCloudAccount {
    /// Account with a unique name and random tenant/object ids
    pub fn random(owner: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            name: unique_name("cloudprobe-account"),
            owner: owner.into(),
            tid: random_suffix(12),
            oid: random_suffix(12),
            account_type,
        }
    }
}

impl PlatformClient {
    /// Create a cloud account, returning its id
    pub async fn create_cloud_account(&self, account: &NewCloudAccount) -> Result<String> {
        let created: CreatedId = self
            .post(Service::Global, "/v1/cloudaccounts", account)
            .await?;
        info!(id = %created.id, name = %account.name, "created cloud account");
        Ok(created.id)
    }

    pub async fn get_cloud_account(&self, id: &str) -> Result<CloudAccount> {
        self.get(Service::Global, &format!("/v1/cloudaccounts/id/{id}"))
            .await
    }

    pub async fn get_cloud_account_by_name(&self, name: &str) -> Result<CloudAccount> {
        self.get(Service::Global, &format!("/v1/cloudaccounts/name/{name}"))
            .await
    }

    pub async fn delete_cloud_account(&self, id: &str) -> Result<()> {
        self.delete(Service::Global, &format!("/v1/cloudaccounts/id/{id}"))
            .await?;
        info!(id, "deleted cloud account");
        Ok(())
    }
}
