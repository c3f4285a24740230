//! Execution constraint engine.
//!
//! Cross-field rules for virtual machine content, evaluated after the
//! content schema has been decoded. The rules are an explicit, ordered list
//! of named checks; each returns zero or more errors.

use crate::message::{
    domain::{ExecutableContent, HypervisorType, MachineVolume},
    error::ValidationError,
};

/// A named cross-field rule over execution content.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionConstraint {
    /// Rule name, used in trace events.
    pub name: &'static str,
    /// The check itself.
    pub check: fn(&dyn ExecutableContent) -> Vec<ValidationError>,
}

/// Every execution rule, in evaluation order.
pub const EXECUTION_CONSTRAINTS: [ExecutionConstraint; 7] = [
    ExecutionConstraint {
        name: "volume_size_bounds",
        check: check_volume_size_bounds,
    },
    ExecutionConstraint {
        name: "gpu_requires_node_pinning",
        check: check_gpu_requires_node_pinning,
    },
    ExecutionConstraint {
        name: "gpu_requires_qemu",
        check: check_gpu_requires_qemu,
    },
    ExecutionConstraint {
        name: "streamed_payment_requires_node_pinning",
        check: check_streamed_payment_requires_node_pinning,
    },
    ExecutionConstraint {
        name: "terms_require_node_pinning",
        check: check_terms_require_node_pinning,
    },
    ExecutionConstraint {
        name: "terms_require_stream_or_confidential",
        check: check_terms_require_stream_or_confidential,
    },
    ExecutionConstraint {
        name: "trusted_execution_requires_qemu",
        check: check_trusted_execution_requires_qemu,
    },
];

/// Evaluates the execution rules in order.
///
/// With `collect_all` unset, evaluation stops after the first rule that
/// reports an error.
///
/// # Errors
///
/// Returns every reported error, combined with `ValidationError::multiple`.
///
/// # Examples
///
/// ```
/// use corbel::message::domain::InstanceContent;
/// use corbel::message::error::ValidationError;
/// use corbel::message::validation::execution::evaluate_constraints;
/// use serde_json::json;
///
/// let instance: InstanceContent = serde_json::from_value(json!({
///     "address": "0xabc",
///     "time": 1.0,
///     "allow_amend": false,
///     "environment": {},
///     "resources": {},
///     "rootfs": {
///         "parent": {"ref": "b236db23bf5ad005ad7f5d82eed08a68a925020f0755b2a59c03f784499198eb"},
///         "persistence": "host",
///         "size_mib": 20_480
///     },
///     "requirements": {
///         "gpu": [{
///             "vendor": "NVIDIA",
///             "device_name": "RTX 4090",
///             "device_class": "0300",
///             "device_id": "10de:2684"
///         }]
///     }
/// }))
/// .expect("valid instance shape");
///
/// let error = evaluate_constraints(&instance, true).expect_err("GPU needs a pinned node");
/// assert_eq!(error.iter_flat().count(), 2);
/// assert!(matches!(
///     error.iter_flat().next(),
///     Some(ValidationError::GpuRequiresNodePinning)
/// ));
/// ```
pub fn evaluate_constraints(
    content: &dyn ExecutableContent,
    collect_all: bool,
) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    for constraint in &EXECUTION_CONSTRAINTS {
        let violations = (constraint.check)(content);
        tracing::trace!(
            constraint = constraint.name,
            violations = violations.len(),
            "evaluated execution constraint"
        );
        errors.extend(violations);
        if !collect_all && !errors.is_empty() {
            break;
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::multiple(errors))
    }
}

fn check_volume_size_bounds(content: &dyn ExecutableContent) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(rootfs) = content.rootfs()
        && let Err(error) = rootfs.size()
    {
        errors.push(ValidationError::size_out_of_bounds(
            "content.rootfs.size_mib",
            error,
        ));
    }

    for (index, volume) in content.volumes().iter().enumerate() {
        let result = match volume {
            MachineVolume::Ephemeral(ephemeral) => ephemeral.size().map(|_| ()),
            MachineVolume::Persistent(persistent) => persistent.size().map(|_| ()),
            MachineVolume::Immutable(_) => Ok(()),
        };
        if let Err(error) = result {
            errors.push(ValidationError::size_out_of_bounds(
                format!("content.volumes[{index}].size_mib"),
                error,
            ));
        }
    }

    errors
}

fn check_gpu_requires_node_pinning(content: &dyn ExecutableContent) -> Vec<ValidationError> {
    if content.requests_gpu() && content.pinned_node_hash().is_none() {
        return vec![ValidationError::GpuRequiresNodePinning];
    }
    Vec::new()
}

fn check_gpu_requires_qemu(content: &dyn ExecutableContent) -> Vec<ValidationError> {
    let hypervisor = content.hypervisor();
    if content.requests_gpu() && hypervisor != HypervisorType::Qemu {
        return vec![ValidationError::GpuRequiresQemu { hypervisor }];
    }
    Vec::new()
}

fn check_streamed_payment_requires_node_pinning(
    content: &dyn ExecutableContent,
) -> Vec<ValidationError> {
    let Some(payment_type) = content.payment_type() else {
        return Vec::new();
    };
    if payment_type.requires_node()
        && content.requirements().is_some()
        && content.pinned_node_hash().is_none()
    {
        return vec![ValidationError::StreamedPaymentRequiresNodePinning { payment_type }];
    }
    Vec::new()
}

fn check_terms_require_node_pinning(content: &dyn ExecutableContent) -> Vec<ValidationError> {
    if content.terms_and_conditions().is_some() && content.pinned_node_hash().is_none() {
        return vec![ValidationError::TermsRequireNodePinning];
    }
    Vec::new()
}

fn check_terms_require_stream_or_confidential(
    content: &dyn ExecutableContent,
) -> Vec<ValidationError> {
    if content.terms_and_conditions().is_none() {
        return Vec::new();
    }
    let streamed = content
        .payment_type()
        .is_some_and(|payment_type| payment_type.is_stream());
    if !streamed && content.trusted_execution().is_none() {
        return vec![ValidationError::TermsRequireStreamOrConfidential];
    }
    Vec::new()
}

fn check_trusted_execution_requires_qemu(
    content: &dyn ExecutableContent,
) -> Vec<ValidationError> {
    let hypervisor = content.hypervisor();
    if content.trusted_execution().is_some() && hypervisor != HypervisorType::Qemu {
        return vec![ValidationError::TrustedExecutionRequiresQemu { hypervisor }];
    }
    Vec::new()
}
