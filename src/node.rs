//! Core object trait and the types that describe a node.

use core::fmt;

use crate::message::{KindSet, Message};
use crate::params::Params;

/// Information available during a processing tick.
///
/// Passed to every [`Object::tick`] call. Mirrors the block the host's audio
/// callback is running at.
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    /// Sample rate of the host in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of samples per tick
    pub block_size: usize,
}

/// Unique identifier for a node within a patch.
///
/// Ids are handed out sequentially, survive a dump/parse round trip and are
/// never reused while the [`Patcher`](crate::Patcher) lives.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Never handed out; the id counter stops here.
    pub const MAX: NodeId = NodeId(u32::MAX);

    /// Rebuilds an id from its raw value, e.g. one read back from a saved patch.
    #[inline]
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inlet and outlet counts of a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Shape {
    pub inlets: usize,
    pub outlets: usize,
}

impl Shape {
    pub const fn new(inlets: usize, outlets: usize) -> Self {
        Self { inlets, outlets }
    }
}

/// What a handler hands back to the dispatcher.
///
/// Outlet messages are delivered in the order they were pushed, each one
/// depth-first, once the handler has returned.
#[derive(Default, Debug)]
pub struct Outbox {
    pub(crate) sent: Vec<(usize, Message)>,
    pub(crate) requests: Vec<Request>,
}

/// Something a handler wants the host to see.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Request {
    /// Replace this node's arguments with new text.
    Args(String),
    /// Surface a message to the host under a label.
    Report(String, Message),
}

impl Outbox {
    pub fn send(&mut self, outlet: usize, msg: Message) {
        self.sent.push((outlet, msg));
    }

    pub fn bang(&mut self, outlet: usize) {
        self.send(outlet, Message::Bang);
    }

    pub fn int(&mut self, outlet: usize, value: i32) {
        self.send(outlet, Message::Int(value));
    }

    pub fn float(&mut self, outlet: usize, value: f32) {
        self.send(outlet, Message::Float(value));
    }

    pub fn list(&mut self, outlet: usize, text: impl Into<String>) {
        self.send(outlet, Message::List(text.into()));
    }

    /// Asks the control side to reparse this node with `args`.
    ///
    /// The new arguments take effect once the host calls
    /// [`Patcher::poll`](crate::Patcher::poll).
    pub fn request_args(&mut self, args: impl Into<String>) {
        self.requests.push(Request::Args(args.into()));
    }

    /// Forwards `msg` to the host as an [`Event::Print`](crate::Event::Print).
    pub fn report(&mut self, label: impl Into<String>, msg: Message) {
        self.requests.push(Request::Report(label.into(), msg));
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty() && self.requests.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.sent.clear();
        self.requests.clear();
    }
}

/// The core trait for patch objects.
///
/// An object declares, per inlet, which [`MessageKind`](crate::MessageKind)s
/// it handles and reacts to them in [`receive`](Self::receive). Anything an
/// inlet does not accept is silently dropped, so `receive` only ever sees
/// messages it asked for.
///
/// Instances are built by a descriptor's factory on the control thread and
/// then moved to the processing thread, hence `Send`.
///
/// ```
/// use patchbay::{KindSet, Message, Object, Outbox};
///
/// /// Doubles every number it gets.
/// struct Double;
///
/// impl Object for Double {
///     fn accepts(&self, inlet: usize) -> KindSet {
///         if inlet == 0 { KindSet::NUMBER } else { KindSet::NONE }
///     }
///
///     fn receive(&mut self, _inlet: usize, msg: &Message, out: &mut Outbox) {
///         match msg {
///             Message::Int(v) => out.int(0, v * 2),
///             Message::Float(v) => out.float(0, v * 2.0),
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait Object: Send + 'static {
    /// Message kinds handled by `inlet`.
    fn accepts(&self, inlet: usize) -> KindSet;

    /// Handle one message. Must not block.
    fn receive(&mut self, inlet: usize, msg: &Message, out: &mut Outbox);

    /// Called once per processing tick, after pending commands are applied.
    fn tick(&mut self, _ctx: &ProcessContext, _out: &mut Outbox) {}
}

/// Structural description of a live node: everything except its state.
///
/// This is what hosts get back from
/// [`Patcher::handle`](crate::Patcher::handle).
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectInfo {
    pub(crate) id: NodeId,
    pub(crate) kind: String,
    pub(crate) params: Params,
    pub(crate) name: Option<String>,
    pub(crate) shape: Shape,
}

impl ObjectInfo {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Registered type name.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Canonical argument text of the current parameters.
    pub fn args(&self) -> String {
        self.params.to_args()
    }

    /// Host-assigned label used by the injection gateway.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn inlets(&self) -> usize {
        self.shape.inlets
    }

    pub fn outlets(&self) -> usize {
        self.shape.outlets
    }
}
