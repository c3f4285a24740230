//! Domain types for the message subsystem.
//!
//! This module contains pure value types with no infrastructure dependencies.
//! All types are immutable after construction and serialisable via serde.

mod confirmation;
mod content;
mod execution;
mod item_hash;
mod kinds;
mod message;
mod size;

pub use confirmation::{ConfirmationHash, ConfirmationHashBinary, MessageConfirmation, MongodbId};
pub use content::{
    AMEND_POST_TYPE, AggregateContent, AggregateKey, AggregateKeyName, ChainRef, ForgetContent,
    PostContent, PostRef, StoreContent,
};
pub use execution::{
    CodeContent, ConfidentialContent, ConfidentialEnvironment, ConfidentialPayment, CpuProperties,
    DataContent, Encoding, EphemeralMarker, EphemeralVolume, ExecutableContent, Export,
    FunctionEnvironment, FunctionRuntime, FunctionTriggers, GpuProperties, HostRequirements,
    HypervisorType, ImmutableVolume, InstanceContent, InstanceEnvironment, MachineResources,
    MachineType, MachineVolume, NodeRequirements, ParentVolume, Payment, PaymentType,
    PersistentVolume, ProgramContent, RootfsVolume, TrustedExecutionEnvironment,
    VolumePersistence,
};
pub use item_hash::{HashClassifier, ItemHash, ItemType, classify_hash};
pub use kinds::{Chain, HashType, MessageType};
pub use message::{Message, MessageContent, MessageEnvelope};
pub use size::{
    BoundedMebibytes, DeclaredSize, EPHEMERAL_VOLUME_MAX_MIB, EphemeralVolumeSize, Gigabytes,
    Mebibytes, PERSISTENT_VOLUME_MAX_MIB, PersistentVolumeSize, gigabyte_to_mebibyte,
};
