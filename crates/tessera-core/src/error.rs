//! Error types for value access, connections, and graph evaluation.
//!
//! Every error here is detected synchronously at the offending call and
//! returned to the direct caller. None of them are transient: retrying the
//! same call with the same inputs reproduces the same error.
//!
//! A missing flow-data channel is not represented here. Asking
//! [`FlowData`](crate::FlowData) for a channel it does not have is a
//! programming error and panics.

use thiserror::Error;

use crate::node::NodeId;
use crate::pin::{Direction, PinRef};
use crate::value::ValueType;

/// A typed read or write did not match the stored variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("type mismatch: expected {expected}, found {found}")]
pub struct TypeMismatch {
    /// The type the caller asked for (or tried to write).
    pub expected: ValueType,
    /// The type actually stored.
    pub found: ValueType,
}

impl TypeMismatch {
    /// Create a mismatch error.
    pub const fn new(expected: ValueType, found: ValueType) -> Self {
        Self { expected, found }
    }
}

/// Reasons a connection between two pins is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The output index is past the end of the source node's outputs.
    #[error("output index {index} out of range on node {node} ({count} outputs)")]
    OutputOutOfRange {
        /// Source node.
        node: NodeId,
        /// Requested output index.
        index: usize,
        /// Number of outputs the node has.
        count: usize,
    },

    /// The input index is past the end of the target node's inputs.
    #[error("input index {index} out of range on node {node} ({count} inputs)")]
    InputOutOfRange {
        /// Target node.
        node: NodeId,
        /// Requested input index.
        index: usize,
        /// Number of inputs the node has.
        count: usize,
    },

    /// A pin name did not match any pin on the node.
    #[error("node {node} has no {direction} pin named '{name}'")]
    UnknownPin {
        /// Node searched.
        node: NodeId,
        /// Direction searched.
        direction: Direction,
        /// Requested name.
        name: String,
    },

    /// Source and target are the same node.
    #[error("node {0} cannot connect to itself")]
    SelfConnection(NodeId),

    /// The target input is already fed by another output.
    #[error("input {input} already has source {existing}")]
    InputAlreadyConnected {
        /// The input pin.
        input: PinRef,
        /// Its current source.
        existing: PinRef,
    },

    /// Output and input carry different value types.
    #[error("cannot connect {output} output to {input} input")]
    TypeMismatch {
        /// Output pin type.
        output: ValueType,
        /// Input pin type.
        input: ValueType,
    },

    /// No input was given and the output is scalar, so none can be generated.
    #[error("scalar output {0} needs an explicit input pin")]
    InputRequired(PinRef),
}

/// Errors raised by graph construction and evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A value accessor was used with the wrong type.
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    /// A connection request was rejected.
    #[error("invalid connection: {0}")]
    InvalidConnection(#[from] ConnectionError),

    /// The node id is not owned by this graph.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The pin reference does not resolve to a pin in this graph.
    #[error("pin {0} not found")]
    PinNotFound(PinRef),

    /// The flow/control dependency walk re-entered a node still being evaluated.
    #[error("dependency cycle through node {0}")]
    CycleDetected(NodeId),
}

/// Errors raised while loading or validating a [`GraphConfig`](crate::GraphConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML.
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML.
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A field holds a value the engine cannot run with.
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}
