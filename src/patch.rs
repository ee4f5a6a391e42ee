//! The live patch owned by the processing side, and the commands that edit it.

use crate::dispatch::{Dispatcher, LiveTopology};
use crate::error::PatchError;
use crate::graph::Link;
use crate::message::Message;
use crate::node::{NodeId, Object, ObjectInfo, ProcessContext, Shape};
use crate::params::Params;
use crate::processor::Event;

/// A structural edit, already validated against the control-side mirror.
pub(crate) enum Command {
    Insert { info: ObjectInfo, object: Box<dyn Object> },
    Remove(NodeId),
    Connect(Link),
    Disconnect(Link),
    Reshape {
        id: NodeId,
        params: Params,
        shape: Shape,
        object: Box<dyn Object>,
    },
    Rename { id: NodeId, name: Option<String> },
    Clear,
    /// Replace the whole patch with a freshly parsed one
    Load(Box<LiveTopology>),
    /// External stimulus on an inlet
    Inject { id: NodeId, inlet: usize, message: Message },
}

impl Command {
    /// Whether applying this swaps out the whole live patch.
    pub fn replaces_patch(&self) -> bool {
        matches!(self, Command::Clear | Command::Load(_))
    }
}

/// Things the processing side no longer needs. They are sent back so their
/// destructors run on the control thread.
pub(crate) enum Retired {
    Object(#[allow(dead_code)] Box<dyn Object>),
    Patch(#[allow(dead_code)] Box<LiveTopology>),
}

/// Live nodes and links plus the dispatcher that evaluates them.
pub(crate) struct Patch {
    graph: LiveTopology,
    dispatcher: Dispatcher,
}

impl Patch {
    pub fn new(max_depth: usize) -> Self {
        Self {
            graph: LiveTopology::new(),
            dispatcher: Dispatcher::new(max_depth),
        }
    }

    pub fn graph(&self) -> &LiveTopology {
        &self.graph
    }

    /// Applies one command. Whatever it displaced is handed back for disposal.
    pub fn apply(&mut self, command: Command) -> Result<Option<Retired>, PatchError> {
        match command {
            Command::Insert { info, object } => {
                self.graph.insert(info, object)?;
                Ok(None)
            }
            Command::Remove(id) => Ok(self.graph.remove(id).map(Retired::Object)),
            Command::Connect(link) => {
                self.graph.connect(link)?;
                Ok(None)
            }
            Command::Disconnect(link) => {
                self.graph.disconnect(&link);
                Ok(None)
            }
            Command::Reshape { id, params, shape, object } => {
                let (old, _pruned) = self.graph.reshape(id, params, shape, object)?;
                Ok(Some(Retired::Object(old)))
            }
            Command::Rename { id, name } => {
                self.graph.rename(id, name)?;
                Ok(None)
            }
            Command::Clear => {
                let mut fresh = LiveTopology::new();
                fresh.reserve_ids(self.graph.next_id());
                let old = core::mem::replace(&mut self.graph, fresh);
                Ok(Some(Retired::Patch(Box::new(old))))
            }
            Command::Load(graph) => {
                let old = core::mem::replace(&mut self.graph, *graph);
                Ok(Some(Retired::Patch(Box::new(old))))
            }
            Command::Inject { id, inlet, message } => {
                self.deliver(id, inlet, &message)?;
                Ok(None)
            }
        }
    }

    pub fn deliver(&mut self, id: NodeId, inlet: usize, msg: &Message) -> Result<(), PatchError> {
        self.dispatcher.deliver(&mut self.graph, id, inlet, msg)
    }

    pub fn tick(&mut self, ctx: &ProcessContext) -> Vec<PatchError> {
        self.dispatcher.tick(&mut self.graph, ctx)
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.dispatcher.drain_events()
    }
}
