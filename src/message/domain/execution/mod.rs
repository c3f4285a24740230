//! Execution content: virtual machine specifications carried by PROGRAM,
//! INSTANCE and CONFIDENTIAL messages.
//!
//! The three content variants differ in shape, but the execution constraint
//! engine only needs a handful of cross-cutting facts about them. Those are
//! exposed through [`ExecutableContent`].

mod base;
mod environment;
mod instance;
mod program;
mod volume;

pub use base::{ConfidentialPayment, Encoding, MachineType, Payment, PaymentType};
pub use environment::{
    ConfidentialEnvironment, CpuProperties, FunctionEnvironment, FunctionTriggers,
    GpuProperties, HostRequirements, HypervisorType, InstanceEnvironment, MachineResources,
    NodeRequirements, TrustedExecutionEnvironment,
};
pub use instance::{ConfidentialContent, InstanceContent};
pub use program::{CodeContent, DataContent, Export, FunctionRuntime, ProgramContent};
pub use volume::{
    EphemeralMarker, EphemeralVolume, ImmutableVolume, MachineVolume, ParentVolume,
    PersistentVolume, RootfsVolume, VolumePersistence,
};

use super::ItemHash;

/// Read-only view of execution content used by the constraint engine.
pub trait ExecutableContent {
    /// Hypervisor the VM runs under, after defaults are applied.
    fn hypervisor(&self) -> HypervisorType;

    /// Trusted execution settings, if declared.
    fn trusted_execution(&self) -> Option<&TrustedExecutionEnvironment>;

    /// Payment method, if payment terms are declared.
    fn payment_type(&self) -> Option<PaymentType>;

    /// Host requirements, if declared.
    fn requirements(&self) -> Option<&HostRequirements>;

    /// Extra volumes.
    fn volumes(&self) -> &[MachineVolume];

    /// Root filesystem, for instances.
    fn rootfs(&self) -> Option<&RootfsVolume>;

    /// Node the execution is pinned to.
    fn pinned_node_hash(&self) -> Option<&ItemHash> {
        self.requirements().and_then(HostRequirements::node_hash)
    }

    /// Returns `true` if at least one GPU is requested.
    fn requests_gpu(&self) -> bool {
        self.requirements().is_some_and(HostRequirements::requests_gpu)
    }

    /// Terms and conditions reference on the target node.
    fn terms_and_conditions(&self) -> Option<&ItemHash> {
        self.requirements()
            .and_then(HostRequirements::terms_and_conditions)
    }
}

impl ExecutableContent for ProgramContent {
    fn hypervisor(&self) -> HypervisorType {
        HypervisorType::Firecracker
    }

    fn trusted_execution(&self) -> Option<&TrustedExecutionEnvironment> {
        None
    }

    fn payment_type(&self) -> Option<PaymentType> {
        self.payment.as_ref().map(|payment| payment.payment_type)
    }

    fn requirements(&self) -> Option<&HostRequirements> {
        self.requirements.as_ref()
    }

    fn volumes(&self) -> &[MachineVolume] {
        &self.volumes
    }

    fn rootfs(&self) -> Option<&RootfsVolume> {
        None
    }
}

impl ExecutableContent for InstanceContent {
    fn hypervisor(&self) -> HypervisorType {
        self.environment.hypervisor.unwrap_or_default()
    }

    fn trusted_execution(&self) -> Option<&TrustedExecutionEnvironment> {
        self.environment.trusted_execution.as_ref()
    }

    fn payment_type(&self) -> Option<PaymentType> {
        self.payment.as_ref().map(|payment| payment.payment_type)
    }

    fn requirements(&self) -> Option<&HostRequirements> {
        self.requirements.as_ref()
    }

    fn volumes(&self) -> &[MachineVolume] {
        &self.volumes
    }

    fn rootfs(&self) -> Option<&RootfsVolume> {
        Some(&self.rootfs)
    }
}

impl ExecutableContent for ConfidentialContent {
    fn hypervisor(&self) -> HypervisorType {
        self.environment.hypervisor.unwrap_or(HypervisorType::Qemu)
    }

    fn trusted_execution(&self) -> Option<&TrustedExecutionEnvironment> {
        Some(&self.environment.trusted_execution)
    }

    fn payment_type(&self) -> Option<PaymentType> {
        Some(self.payment.payment_type)
    }

    fn requirements(&self) -> Option<&HostRequirements> {
        self.requirements.as_ref()
    }

    fn volumes(&self) -> &[MachineVolume] {
        &self.volumes
    }

    fn rootfs(&self) -> Option<&RootfsVolume> {
        Some(&self.rootfs)
    }

    fn pinned_node_hash(&self) -> Option<&ItemHash> {
        self.requirements
            .as_ref()
            .and_then(HostRequirements::node_hash)
            .or(Some(&self.payment.node_hash))
    }
}
