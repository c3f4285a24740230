//! Encodings, machine kinds and payment terms shared by execution content.

use crate::message::domain::{Chain, ItemHash};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Packaging of code and data volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Plain files.
    Plain,
    /// Zip archive.
    Zip,
    /// Squashfs partition.
    Squashfs,
}

/// Kind of virtual machine requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineType {
    /// Long-running virtual private server.
    #[serde(rename = "vm-instance")]
    Instance,
    /// Function started on demand.
    #[serde(rename = "vm-function")]
    Function,
}

/// How an execution is paid for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    /// Tokens held by the sender for the lifetime of the execution.
    #[default]
    Hold,
    /// Tokens streamed continuously to the executing node.
    Superfluid,
    /// Prepaid credit balance.
    Credit,
}

impl PaymentType {
    /// Returns `true` for payment streamed while the execution runs.
    #[must_use]
    pub const fn is_stream(self) -> bool {
        matches!(self, Self::Superfluid)
    }

    /// Returns `true` when the payment must target a specific node.
    #[must_use]
    pub const fn requires_node(self) -> bool {
        matches!(self, Self::Superfluid | Self::Credit)
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Superfluid => "superfluid",
            Self::Credit => "credit",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment terms of an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Payment {
    /// Chain checked for funds.
    pub chain: Chain,
    /// Alternative address receiving the tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_address: Option<String>,
    /// Payment method.
    pub payment_type: PaymentType,
}

impl Payment {
    /// Returns `true` for streamed payment.
    #[must_use]
    pub const fn is_stream(&self) -> bool {
        self.payment_type.is_stream()
    }
}

/// Payment terms of a confidential execution, pinned to the executing node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfidentialPayment {
    /// Chain checked for funds.
    pub chain: Chain,
    /// Alternative address receiving the tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_address: Option<String>,
    /// Payment method.
    pub payment_type: PaymentType,
    /// Node that runs the execution.
    pub node_hash: ItemHash,
}

impl ConfidentialPayment {
    /// Returns the payment terms without the node pin.
    #[must_use]
    pub fn as_payment(&self) -> Payment {
        Payment {
            chain: self.chain,
            receiver_address: self.receiver_address.clone(),
            payment_type: self.payment_type,
        }
    }
}
