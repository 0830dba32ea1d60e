//! Platform client for cloudprobe
//!
//! - **Client** (`client`): authenticated JSON over HTTPS to the global and
//!   regional services
//! - **APIs** (`accounts`, `compute`, `billing`, `catalog`): one typed method
//!   per endpoint, bodies in `models`
//! - **Waits** (`waiters`): instance, SSH key and BareMetalHost waits on top
//!   of [`cloudprobe_core::Poller`]
//! - **Fixtures** (`fixtures`): newest-first cleanup of what a test created
//! - **BareMetalHost** (`bmh`): provisioning state read from the cluster

mod accounts;
pub mod bmh;
mod billing;
mod catalog;
pub mod client;
mod compute;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod waiters;

pub use bmh::{BmhStateSource, KubeBmhSource};
pub use client::{PlatformClient, Service};
pub use error::{ClientError, Result};
pub use fixtures::{Fixture, FixtureLedger, TeardownReport};
pub use models::{
    CloudAccount, Coupon, Credit, CreditSummary, Instance, InstancePhase, InstanceSpec,
    NewCloudAccount, NewCoupon, NewCredit, NewInstance, NewResourceMetadata, Product,
    ProductFilter, Rate, SshKey, UnappliedCredits, Vnet, VnetSpec,
};
pub use waiters::{
    FAILED_RECOVERY_WINDOW, wait_for_bmh_state, wait_for_instance_deleted,
    wait_for_instance_phase, wait_for_instance_ready, wait_for_ssh_key_deleted,
};
