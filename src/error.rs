//! Error type shared by the control and processing sides.

use crate::node::NodeId;

/// Everything that can go wrong while building, editing, loading or
/// evaluating a patch.
///
/// Control-path operations on [`Patcher`](crate::Patcher) return these
/// directly and leave the patch unchanged. On the processing path they are
/// never returned; they arrive as [`Event::Fault`](crate::Event::Fault).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    /// No descriptor is registered under this type name.
    #[error("unknown object type `{0}`")]
    UnknownType(String),

    /// A descriptor with this type name is already registered.
    #[error("object type `{0}` is already registered")]
    DuplicateType(String),

    /// The descriptor itself is unusable (bad default, misplaced list parameter).
    #[error("invalid descriptor for `{kind}`: {reason}")]
    InvalidDescriptor { kind: String, reason: String },

    /// The argument text does not satisfy the parameter schema.
    #[error("cannot parse arguments for `{kind}`: {reason}")]
    ArgumentParse { kind: String, reason: String },

    /// A link endpoint names a missing node or an out-of-range port.
    #[error("invalid endpoint {from}:{outlet} -> {to}:{inlet}")]
    InvalidEndpoint {
        from: NodeId,
        outlet: usize,
        to: NodeId,
        inlet: usize,
    },

    /// The node id does not refer to a live node.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    /// Another live node already carries this label.
    #[error("name `{0}` is already in use")]
    NameInUse(String),

    /// A serialized patch could not be read.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A single stimulus recursed deeper than the configured ceiling.
    #[error("recursion limit of {limit} exceeded at node {node}")]
    RecursionLimitExceeded { node: NodeId, limit: usize },

    /// Every node id has been handed out.
    #[error("no node ids left")]
    IdsExhausted,

    /// The command ring to the processing side is full.
    #[error("command queue is full")]
    QueueFull,
}

impl From<serde_json::Error> for PatchError {
    fn from(err: serde_json::Error) -> Self {
        PatchError::MalformedDocument(err.to_string())
    }
}
