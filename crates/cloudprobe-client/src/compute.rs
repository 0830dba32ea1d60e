//! Regional compute service: SSH keys, VNets and instances

use tracing::info;

use crate::client::{PlatformClient, Service};
use crate::error::Result;
use crate::models::{
    Instance, NewInstance, NewResourceMetadata, NewSshKey, NewVnet, SshKey, SshKeySpec, Vnet,
    VnetSpec,
};

fn account_path(account: &str, collection: &str) -> String {
    format!("/v1/cloudaccounts/{account}/{collection}")
}

impl PlatformClient {
    // ============ SSH keys ============

    pub async fn create_ssh_key(
        &self,
        account: &str,
        name: &str,
        public_key: &str,
    ) -> Result<SshKey> {
        let body = NewSshKey {
            metadata: NewResourceMetadata::named(name),
            spec: SshKeySpec {
                ssh_public_key: public_key.to_string(),
            },
        };
        let key: SshKey = self
            .post(Service::Regional, &account_path(account, "sshpublickeys"), &body)
            .await?;
        info!(account, name, "created SSH public key");
        Ok(key)
    }

    pub async fn get_ssh_key(&self, account: &str, name: &str) -> Result<SshKey> {
        let path = format!("{}/name/{name}", account_path(account, "sshpublickeys"));
        self.get(Service::Regional, &path).await
    }

    pub async fn delete_ssh_key(&self, account: &str, name: &str) -> Result<()> {
        let path = format!("{}/name/{name}", account_path(account, "sshpublickeys"));
        self.delete(Service::Regional, &path).await
    }

    // ============ VNets ============

    /// Create or update a VNet (the platform upserts on PUT)
    pub async fn create_vnet(&self, account: &str, name: &str, spec: VnetSpec) -> Result<Vnet> {
        let body = NewVnet {
            metadata: NewResourceMetadata::named(name),
            spec,
        };
        let vnet: Vnet = self
            .put(Service::Regional, &account_path(account, "vnets"), &body)
            .await?;
        info!(account, name, "created VNet");
        Ok(vnet)
    }

    pub async fn delete_vnet(&self, account: &str, name: &str) -> Result<()> {
        let path = format!("{}/name/{name}", account_path(account, "vnets"));
        self.delete(Service::Regional, &path).await
    }

    // ============ Instances ============

    pub async fn create_instance(&self, account: &str, request: &NewInstance) -> Result<Instance> {
        let instance: Instance = self
            .post(Service::Regional, &account_path(account, "instances"), request)
            .await?;
        info!(
            account,
            id = %instance.metadata.resource_id,
            name = %instance.metadata.name,
            "created instance"
        );
        Ok(instance)
    }

    pub async fn get_instance(&self, account: &str, id: &str) -> Result<Instance> {
        let path = format!("{}/id/{id}", account_path(account, "instances"));
        self.get(Service::Regional, &path).await
    }

    pub async fn get_instance_by_name(&self, account: &str, name: &str) -> Result<Instance> {
        let path = format!("{}/name/{name}", account_path(account, "instances"));
        self.get(Service::Regional, &path).await
    }

    /// Request deletion; the instance lingers in `Terminating` until gone
    pub async fn delete_instance(&self, account: &str, id: &str) -> Result<()> {
        let path = format!("{}/id/{id}", account_path(account, "instances"));
        self.delete(Service::Regional, &path).await?;
        info!(account, id, "requested instance deletion");
        Ok(())
    }
}
