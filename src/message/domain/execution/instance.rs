//! Content of INSTANCE and CONFIDENTIAL messages: long-running virtual
//! machines booted from a root filesystem.

use super::{
    ConfidentialEnvironment, ConfidentialPayment, HostRequirements, InstanceEnvironment,
    MachineResources, MachineVolume, Payment, RootfsVolume,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Content of an INSTANCE message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceContent {
    /// Address of the author.
    pub address: String,
    /// Creation time in float seconds.
    pub time: f64,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Whether amendments may replace this instance.
    pub allow_amend: bool,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
    /// SSH public keys allowed to log in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_keys: Option<Vec<String>>,
    /// Execution environment.
    pub environment: InstanceEnvironment,
    /// Reserved resources.
    pub resources: MachineResources,
    /// Payment terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    /// Host requirements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<HostRequirements>,
    /// Extra volumes.
    #[serde(default)]
    pub volumes: Vec<MachineVolume>,
    /// Earlier version replaced by this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
    /// Root filesystem booted by the kernel.
    pub rootfs: RootfsVolume,
}

/// Content of a CONFIDENTIAL message.
///
/// Payment and trusted execution settings are mandatory, and the payment is
/// pinned to the node running the enclave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfidentialContent {
    /// Address of the author.
    pub address: String,
    /// Creation time in float seconds.
    pub time: f64,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Whether amendments may replace this instance.
    pub allow_amend: bool,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
    /// SSH public keys allowed to log in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_keys: Option<Vec<String>>,
    /// Execution environment.
    pub environment: ConfidentialEnvironment,
    /// Reserved resources.
    pub resources: MachineResources,
    /// Payment terms, pinned to a node.
    pub payment: ConfidentialPayment,
    /// Host requirements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<HostRequirements>,
    /// Extra volumes.
    #[serde(default)]
    pub volumes: Vec<MachineVolume>,
    /// Earlier version replaced by this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
    /// Root filesystem booted by the kernel.
    pub rootfs: RootfsVolume,
}
