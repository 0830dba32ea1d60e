//! Request and response bodies of the platform APIs
//!
//! Field names follow the platform's camelCase JSON. Fields the suite never
//! reads are left out; unknown fields are ignored when decoding.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use cloudprobe_core::{AccountType, ComputeDefaults};
use serde::{Deserialize, Serialize};

// ============ Cloud accounts ============

/// A cloud account as returned by the cloud account service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAccount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub tid: String,
    #[serde(default)]
    pub oid: String,
    #[serde(rename = "type", default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub enrolled: bool,
    #[serde(default)]
    pub low_credits: bool,
    #[serde(default)]
    pub paid_services_allowed: bool,
}

/// Body of `POST /v1/cloudaccounts`
#[derive(Debug, Clone, Serialize)]
pub struct NewCloudAccount {
    pub name: String,
    pub owner: String,
    pub tid: String,
    pub oid: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedId {
    pub id: String,
}

// ============ Compute ============

/// Metadata shared by regional resources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(default)]
    pub cloud_account_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Metadata sent when creating a resource
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResourceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl NewResourceMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            labels: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SshKeySpec {
    pub ssh_public_key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SshKey {
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub spec: SshKeySpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSshKey {
    pub metadata: NewResourceMetadata,
    pub spec: SshKeySpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VnetSpec {
    pub region: String,
    pub availability_zone: String,
    pub prefix_length: u8,
}

impl VnetSpec {
    pub fn from_defaults(defaults: &ComputeDefaults) -> Self {
        Self {
            region: defaults.region.clone(),
            availability_zone: defaults.availability_zone.clone(),
            prefix_length: defaults.vnet_prefix_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vnet {
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub spec: VnetSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewVnet {
    pub metadata: NewResourceMetadata,
    pub spec: VnetSpec,
}

/// Lifecycle phase of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InstancePhase {
    #[default]
    Provisioning,
    Ready,
    Stopping,
    Stopped,
    Terminating,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for InstancePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstancePhase::Provisioning => "Provisioning",
            InstancePhase::Ready => "Ready",
            InstancePhase::Stopping => "Stopping",
            InstancePhase::Stopped => "Stopped",
            InstancePhase::Terminating => "Terminating",
            InstancePhase::Failed => "Failed",
            InstancePhase::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceSpec {
    #[serde(rename = "vNet")]
    pub vnet: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceSpec {
    pub availability_zone: String,
    pub instance_type: String,
    pub machine_image: String,
    pub run_strategy: String,
    pub ssh_public_key_names: Vec<String>,
    pub interfaces: Vec<NetworkInterfaceSpec>,
}

impl InstanceSpec {
    /// Spec for a new instance from the configured compute defaults
    pub fn from_defaults(
        defaults: &ComputeDefaults,
        ssh_public_key_names: Vec<String>,
        vnet: impl Into<String>,
    ) -> Self {
        Self {
            availability_zone: defaults.availability_zone.clone(),
            instance_type: defaults.instance_type.clone(),
            machine_image: defaults.machine_image.clone(),
            run_strategy: defaults.run_strategy.clone(),
            ssh_public_key_names,
            interfaces: vec![NetworkInterfaceSpec { vnet: vnet.into() }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "vNet")]
    pub vnet: String,
    #[serde(default)]
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshProxy {
    #[serde(default)]
    pub proxy_user: String,
    #[serde(default)]
    pub proxy_address: String,
    #[serde(default)]
    pub proxy_port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    #[serde(default)]
    pub phase: InstancePhase,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceStatus>,
    #[serde(default)]
    pub ssh_proxy: Option<SshProxy>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Instance {
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub spec: InstanceSpec,
    #[serde(default)]
    pub status: InstanceStatus,
}

impl Instance {
    /// First address of the first interface, once assigned
    pub fn primary_address(&self) -> Option<&str> {
        self.status
            .interfaces
            .first()
            .and_then(|i| i.addresses.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewInstance {
    pub metadata: NewResourceMetadata,
    pub spec: InstanceSpec,
}

// ============ Billing ============

/// A coupon as stored by the cloud credits service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub amount: f64,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub disabled: Option<DateTime<Utc>>,
    #[serde(default)]
    pub num_uses: u32,
    #[serde(default)]
    pub num_redeemed: u32,
    #[serde(default)]
    pub is_standard: bool,
}

impl Coupon {
    pub fn is_disabled(&self) -> bool {
        self.disabled.is_some()
    }
}

/// Body of `POST /v1/cloudcredits/coupons`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    pub amount: f64,
    pub creator: String,
    pub start: DateTime<Utc>,
    pub expires: DateTime<Utc>,
    pub num_uses: u32,
    pub is_standard: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CouponList {
    #[serde(default)]
    pub coupons: Vec<Coupon>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RedeemCoupon<'a> {
    pub code: &'a str,
    pub cloud_account_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DisableCoupon<'a> {
    pub code: &'a str,
}

/// A credit applied to a cloud account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    #[serde(default)]
    pub cloud_account_id: String,
    #[serde(default)]
    pub coupon_code: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub original_amount: f64,
    #[serde(default)]
    pub remaining_amount: f64,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

/// Body of `POST /v1/cloudcredits/credit`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCredit {
    pub cloud_account_id: String,
    pub original_amount: f64,
    pub reason: String,
    pub expiration: DateTime<Utc>,
}

/// Credits of one cloud account with totals
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSummary {
    #[serde(default)]
    pub credits: Vec<Credit>,
    #[serde(default)]
    pub total_remaining_amount: f64,
    #[serde(default)]
    pub total_used_amount: f64,
    #[serde(default)]
    pub total_un_applied_amount: f64,
}

/// Credits not yet applied to usage
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnappliedCredits {
    #[serde(default)]
    pub remaining_amount: f64,
}

// ============ Catalog ============

/// Price of a product for one account type
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub account_type: AccountType,
    #[serde(default)]
    pub unit: String,
    /// Decimal as sent by the catalog
    pub rate: String,
    #[serde(default)]
    pub usage_expr: String,
}

impl Rate {
    pub fn amount(&self) -> Option<f64> {
        self.rate.trim().parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub family_id: String,
    #[serde(default)]
    pub vendor_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub rates: Vec<Rate>,
}

impl Product {
    /// Rate charged to `account_type`, if the product is offered to it
    pub fn rate_for(&self, account_type: AccountType) -> Option<&Rate> {
        self.rates.iter().find(|r| r.account_type == account_type)
    }

    /// Catalog metadata value, e.g. `instanceType` or `region`
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Product search criteria
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloudaccount_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProductList {
    #[serde(default)]
    pub products: Vec<Product>,
}
