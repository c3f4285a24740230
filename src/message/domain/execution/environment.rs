//! Execution environments, resources, triggers and host requirements.

use crate::message::domain::ItemHash;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

/// Hypervisor that boots the virtual machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HypervisorType {
    /// Firecracker micro-VMs.
    #[default]
    Firecracker,
    /// QEMU, required for GPUs and trusted execution.
    Qemu,
}

impl HypervisorType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Firecracker => "firecracker",
            Self::Qemu => "qemu",
        }
    }
}

impl fmt::Display for HypervisorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_policy() -> u32 {
    1
}

/// Trusted execution settings of a confidential virtual machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrustedExecutionEnvironment {
    /// Firmware image booted inside the enclave.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<ItemHash>,
    /// Guest policy bit field.
    #[serde(default = "default_policy")]
    pub policy: u32,
}

/// Environment of a function-style program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionEnvironment {
    /// Whether executions must be reproducible.
    #[serde(default)]
    pub reproducible: bool,
    /// Whether the VM may reach the internet.
    #[serde(default)]
    pub internet: bool,
    /// Whether the VM may call the network's API.
    #[serde(default)]
    pub aleph_api: bool,
    /// Whether the VM uses the shared cache.
    #[serde(default)]
    pub shared_cache: bool,
}

/// Environment of a long-running instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceEnvironment {
    /// Whether executions must be reproducible.
    #[serde(default)]
    pub reproducible: bool,
    /// Whether the VM may reach the internet.
    #[serde(default)]
    pub internet: bool,
    /// Whether the VM may call the network's API.
    #[serde(default)]
    pub aleph_api: bool,
    /// Whether the VM uses the shared cache.
    #[serde(default)]
    pub shared_cache: bool,
    /// Requested hypervisor. Firecracker when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypervisor: Option<HypervisorType>,
    /// Trusted execution settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_execution: Option<TrustedExecutionEnvironment>,
}

/// Environment of a confidential instance. Trusted execution is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfidentialEnvironment {
    /// Whether executions must be reproducible.
    #[serde(default)]
    pub reproducible: bool,
    /// Whether the VM may reach the internet.
    #[serde(default)]
    pub internet: bool,
    /// Whether the VM may call the network's API.
    #[serde(default)]
    pub aleph_api: bool,
    /// Whether the VM uses the shared cache.
    #[serde(default)]
    pub shared_cache: bool,
    /// Requested hypervisor. QEMU when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypervisor: Option<HypervisorType>,
    /// Trusted execution settings.
    pub trusted_execution: TrustedExecutionEnvironment,
}

const fn default_vcpus() -> u32 {
    1
}

const fn default_memory() -> u64 {
    128
}

const fn default_seconds() -> u64 {
    1
}

/// System resources reserved for an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineResources {
    /// Virtual CPUs.
    #[serde(default = "default_vcpus")]
    pub vcpus: u32,
    /// Memory in MiB.
    #[serde(default = "default_memory")]
    pub memory: u64,
    /// Execution time limit in seconds.
    #[serde(default = "default_seconds")]
    pub seconds: u64,
}

impl Default for MachineResources {
    fn default() -> Self {
        Self {
            vcpus: default_vcpus(),
            memory: default_memory(),
            seconds: default_seconds(),
        }
    }
}

/// Signals that start a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionTriggers {
    /// Start on HTTP requests.
    pub http: bool,
    /// Start on messages matching these open-ended subscriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Vec<BTreeMap<String, Value>>>,
    /// Keep the program running between triggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
}

/// CPU properties a host must provide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CpuProperties {
    /// CPU architecture, such as `x86_64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    /// CPU vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Required CPU features.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// A GPU device a host must provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpuProperties {
    /// Device vendor.
    pub vendor: String,
    /// Marketing name of the device.
    pub device_name: String,
    /// PCI device class.
    pub device_class: String,
    /// PCI vendor and device identifier.
    pub device_id: String,
}

/// Node targeting of an execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeRequirements {
    /// Address of the node operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Pattern the node address must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_regex: Option<String>,
    /// Hash pinning the execution to one node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_hash: Option<ItemHash>,
    /// Terms and conditions accepted for the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_and_conditions: Option<ItemHash>,
}

/// Properties a host must provide to run an execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostRequirements {
    /// CPU properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuProperties>,
    /// Node targeting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeRequirements>,
    /// GPU devices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<Vec<GpuProperties>>,
}

impl HostRequirements {
    /// Returns `true` if at least one GPU is requested.
    #[must_use]
    pub fn requests_gpu(&self) -> bool {
        self.gpu.as_ref().is_some_and(|gpus| !gpus.is_empty())
    }

    /// Returns the pinned node hash, if any.
    #[must_use]
    pub fn node_hash(&self) -> Option<&ItemHash> {
        self.node.as_ref().and_then(|node| node.node_hash.as_ref())
    }

    /// Returns the terms and conditions reference, if any.
    #[must_use]
    pub fn terms_and_conditions(&self) -> Option<&ItemHash> {
        self.node
            .as_ref()
            .and_then(|node| node.terms_and_conditions.as_ref())
    }
}
