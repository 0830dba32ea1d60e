//! BareMetalHost provisioning state
//!
//! Bare-metal instances are backed by metal3 `BareMetalHost` objects. The
//! platform API does not expose their provisioning state, so waits read it
//! from the cluster directly.

use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::core::GroupVersionKind;
use kube::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

pub const BMH_GROUP: &str = "metal3.io";
pub const BMH_VERSION: &str = "v1alpha1";
pub const BMH_KIND: &str = "BareMetalHost";

/// Where BareMetalHost state comes from
#[async_trait]
pub trait BmhStateSource: Send + Sync {
    /// `status.provisioning.state` of a host, `None` if the host does not exist
    async fn provisioning_state(&self, namespace: &str, name: &str) -> Result<Option<String>>;

    /// Name of the host whose `spec.consumerRef.name` is `consumer`
    async fn find_by_consumer(&self, namespace: &str, consumer: &str) -> Result<Option<String>>;
}

/// Reads BareMetalHosts through the Kubernetes API
#[derive(Clone)]
pub struct KubeBmhSource {
    client: Client,
    resource: ApiResource,
}

impl KubeBmhSource {
    pub fn new(client: Client) -> Self {
        let gvk = GroupVersionKind::gvk(BMH_GROUP, BMH_VERSION, BMH_KIND);
        Self {
            client,
            resource: ApiResource::from_gvk(&gvk),
        }
    }

    /// Connect using the local kubeconfig or in-cluster configuration
    pub async fn try_default() -> Result<Self> {
        Ok(Self::new(Client::try_default().await?))
    }

    fn api(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &self.resource)
    }
}

#[async_trait]
impl BmhStateSource for KubeBmhSource {
    async fn provisioning_state(&self, namespace: &str, name: &str) -> Result<Option<String>> {
        let Some(host) = self.api(namespace).get_opt(name).await? else {
            debug!(namespace, name, "BareMetalHost not found");
            return Ok(None);
        };
        // A host that was just enrolled has no provisioning status yet
        let state = provisioning_state(&host).unwrap_or_default().to_string();
        debug!(namespace, name, state = %state, "read BareMetalHost");
        Ok(Some(state))
    }

    async fn find_by_consumer(&self, namespace: &str, consumer: &str) -> Result<Option<String>> {
        let hosts = self.api(namespace).list(&ListParams::default()).await?;
        Ok(hosts
            .items
            .iter()
            .find(|host| consumer_name(host) == Some(consumer))
            .and_then(|host| host.metadata.name.clone()))
    }
}

/// `status.provisioning.state` of a host object
pub fn provisioning_state(host: &DynamicObject) -> Option<&str> {
    host.data
        .pointer("/status/provisioning/state")
        .and_then(Value::as_str)
}

/// `spec.consumerRef.name` of a host object
pub fn consumer_name(host: &DynamicObject) -> Option<&str> {
    host.data
        .pointer("/spec/consumerRef/name")
        .and_then(Value::as_str)
}
