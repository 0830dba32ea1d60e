//! Cleanup of resources created during a test run

use std::fmt;

use cloudprobe_core::WaitConfig;
use tracing::{info, warn};

use crate::client::PlatformClient;
use crate::error::{ClientError, Result};
use crate::waiters::wait_for_instance_deleted;

/// A resource a test created and must remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fixture {
    CloudAccount { id: String },
    SshKey { account: String, name: String },
    Vnet { account: String, name: String },
    Instance { account: String, id: String },
    Coupon { code: String },
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fixture::CloudAccount { id } => write!(f, "cloud account {id}"),
            Fixture::SshKey { account, name } => write!(f, "ssh key {account}/{name}"),
            Fixture::Vnet { account, name } => write!(f, "vnet {account}/{name}"),
            Fixture::Instance { account, id } => write!(f, "instance {account}/{id}"),
            Fixture::Coupon { code } => write!(f, "coupon {code}"),
        }
    }
}

/// What teardown achieved
#[derive(Debug, Default)]
pub struct TeardownReport {
    /// Removed, or already gone
    pub removed: Vec<Fixture>,
    pub failed: Vec<(Fixture, ClientError)>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Records created fixtures and removes them newest first
#[derive(Debug, Default)]
pub struct FixtureLedger {
    fixtures: Vec<Fixture>,
}

impl FixtureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fixture: Fixture) {
        self.fixtures.push(fixture);
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    /// Remove every recorded fixture in reverse creation order
    ///
    /// Instances are awaited until the API no longer returns them, so VNets
    /// and keys they reference can be deleted next. Coupons cannot be deleted
    /// and are disabled instead. A failure is recorded and teardown moves on.
    pub async fn teardown(&mut self, client: &PlatformClient, waits: &WaitConfig) -> TeardownReport {
        let mut report = TeardownReport::default();

        while let Some(fixture) = self.fixtures.pop() {
            match remove(client, waits, &fixture).await {
                Ok(()) => {
                    info!(%fixture, "removed fixture");
                    report.removed.push(fixture);
                }
                Err(e) if e.is_not_found() => {
                    info!(%fixture, "fixture already gone");
                    report.removed.push(fixture);
                }
                Err(e) => {
                    warn!(%fixture, error = %e, "failed to remove fixture");
                    report.failed.push((fixture, e));
                }
            }
        }

        report
    }
}

async fn remove(client: &PlatformClient, waits: &WaitConfig, fixture: &Fixture) -> Result<()> {
    match fixture {
        Fixture::CloudAccount { id } => client.delete_cloud_account(id).await,
        Fixture::SshKey { account, name } => client.delete_ssh_key(account, name).await,
        Fixture::Vnet { account, name } => client.delete_vnet(account, name).await,
        Fixture::Instance { account, id } => {
            client.delete_instance(account, id).await?;
            let poller = waits.instance_deleted.poller()?;
            wait_for_instance_deleted(client, &poller, account, id).await
        }
        Fixture::Coupon { code } => client.disable_coupon(code).await,
    }
}
