//! Content of PROGRAM messages: functions started on demand.

use super::{
    Encoding, FunctionEnvironment, FunctionTriggers, HostRequirements, MachineResources,
    MachineType, MachineVolume, Payment,
};
use crate::message::domain::ItemHash;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const fn default_use_latest() -> bool {
    true
}

/// Code run by a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeContent {
    /// Packaging of the code.
    pub encoding: Encoding,
    /// Entry point inside the package.
    pub entrypoint: String,
    /// Content holding the code.
    #[serde(rename = "ref")]
    pub reference: ItemHash,
    /// Follow amendments of the code.
    #[serde(default)]
    pub use_latest: bool,
}

/// Data mounted for a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataContent {
    /// Packaging of the data.
    pub encoding: Encoding,
    /// Mount point inside the VM.
    pub mount: String,
    /// Content holding the data.
    #[serde(rename = "ref")]
    pub reference: ItemHash,
    /// Follow amendments of the data.
    #[serde(default)]
    pub use_latest: bool,
}

/// Data exported after a program ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Export {
    /// Packaging of the export.
    pub encoding: Encoding,
    /// Directory exported.
    pub mount: String,
}

/// Root filesystem carrying the program's interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionRuntime {
    /// Content holding the runtime.
    #[serde(rename = "ref")]
    pub reference: ItemHash,
    /// Follow amendments of the runtime.
    #[serde(default = "default_use_latest")]
    pub use_latest: bool,
    /// Free-form description.
    pub comment: String,
}

/// Content of a PROGRAM message.
///
/// Programs always run under Firecracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramContent {
    /// Address of the author.
    pub address: String,
    /// Creation time in float seconds.
    pub time: f64,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Kind of machine, `vm-function` for programs.
    #[serde(rename = "type")]
    pub machine_type: MachineType,
    /// Whether amendments may replace this program.
    pub allow_amend: bool,
    /// Code to run.
    pub code: CodeContent,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
    /// Data to mount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataContent>,
    /// Data to export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
    /// Start triggers.
    pub on: FunctionTriggers,
    /// Execution environment.
    pub environment: FunctionEnvironment,
    /// Reserved resources.
    pub resources: MachineResources,
    /// Payment terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    /// Host requirements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<HostRequirements>,
    /// Interpreter root filesystem.
    pub runtime: FunctionRuntime,
    /// Extra volumes.
    #[serde(default)]
    pub volumes: Vec<MachineVolume>,
    /// Earlier version replaced by this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
}
