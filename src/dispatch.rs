//! Message dispatcher - runs handlers and carries their output along links.
//!
//! Delivery is synchronous and depth-first: a handler runs to completion,
//! then each message it emitted is delivered to every link on that outlet in
//! link insertion order, and so on downstream. Cycles are allowed in the
//! patch, so every stimulus carries a depth budget; running out of it
//! abandons the rest of that stimulus.
//!
//! The walk keeps its own frame stack instead of recursing, so the ceiling
//! costs the same on an audio thread with a small native stack.

use crate::error::PatchError;
use crate::graph::Topology;
use crate::message::Message;
use crate::node::{NodeId, Object, Outbox, ProcessContext, Request};
use crate::processor::Event;

/// Default recursion ceiling for one stimulus.
pub const DEFAULT_MAX_DEPTH: usize = 512;

pub(crate) type LiveTopology = Topology<Box<dyn Object>>;

/// A handler whose output is still being delivered.
///
/// Frame `n` walks `scratch[n]`: `msg` indexes the sent messages, `target`
/// the destinations of that message's outlet.
#[derive(Debug)]
struct Frame {
    node: NodeId,
    outlets: usize,
    msg: usize,
    target: usize,
}

impl Frame {
    fn new(graph: &LiveTopology, node: NodeId) -> Self {
        let outlets = graph.info(node).map(|info| info.outlets()).unwrap_or(0);
        Self { node, outlets, msg: 0, target: 0 }
    }

    fn next_message(&mut self) {
        self.msg += 1;
        self.target = 0;
    }
}

pub(crate) struct Dispatcher {
    max_depth: usize,
    /// One outbox per depth level, reused across stimuli
    scratch: Vec<Outbox>,
    frames: Vec<Frame>,
    events: Vec<Event>,
}

impl Dispatcher {
    pub fn new(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            max_depth,
            scratch: Vec::new(),
            frames: Vec::with_capacity(max_depth.min(DEFAULT_MAX_DEPTH)),
            events: Vec::new(),
        }
    }

    /// Host-facing events produced since the last drain.
    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain(..)
    }

    /// Delivers `msg` to `inlet` of `id` and everything downstream of it.
    ///
    /// Missing nodes, out-of-range inlets and kinds the inlet does not accept
    /// are dropped without error.
    pub fn deliver(&mut self, graph: &mut LiveTopology, id: NodeId, inlet: usize, msg: &Message) -> Result<(), PatchError> {
        self.reserve(0);
        if receive(graph, &mut self.events, id, inlet, msg, &mut self.scratch[0]) {
            self.frames.push(Frame::new(graph, id));
        }
        self.walk(graph)
    }

    /// Runs every object's tick hook in creation order.
    ///
    /// A recursion overflow only abandons the stimulus of the object that
    /// caused it; the remaining objects still tick.
    pub fn tick(&mut self, graph: &mut LiveTopology, ctx: &ProcessContext) -> Vec<PatchError> {
        let mut faults = Vec::new();
        for pos in 0..graph.len() {
            let Some(id) = graph.id_at(pos) else { break };
            self.reserve(0);
            let outbox = &mut self.scratch[0];
            if let Some(object) = graph.body_mut(id) {
                object.tick(ctx, outbox);
            }
            if outbox.is_empty() {
                continue;
            }
            collect_requests(&mut self.events, graph, id, outbox);
            self.frames.push(Frame::new(graph, id));
            if let Err(err) = self.walk(graph) {
                faults.push(err);
            }
        }
        faults
    }

    // Drains the frame stack, innermost frame first
    fn walk(&mut self, graph: &mut LiveTopology) -> Result<(), PatchError> {
        while let Some(depth) = self.frames.len().checked_sub(1) {
            let frame = &mut self.frames[depth];
            let Some(&(outlet, _)) = self.scratch[depth].sent.get(frame.msg) else {
                self.frames.pop();
                self.scratch[depth].clear();
                continue;
            };
            if outlet >= frame.outlets {
                tracing::trace!("dispatch: node {} has no outlet {}", frame.node, outlet);
                frame.next_message();
                continue;
            }
            let Some(&(to, inlet)) = graph.targets(frame.node, outlet).get(frame.target) else {
                frame.next_message();
                continue;
            };
            frame.target += 1;
            let index = frame.msg;

            let child = depth + 1;
            if child >= self.max_depth {
                self.abandon();
                return Err(PatchError::RecursionLimitExceeded { node: to, limit: self.max_depth });
            }

            self.reserve(child);
            let (outer, inner) = self.scratch.split_at_mut(child);
            let msg = &outer[depth].sent[index].1;
            if receive(graph, &mut self.events, to, inlet, msg, &mut inner[0]) {
                self.frames.push(Frame::new(graph, to));
            }
        }
        Ok(())
    }

    // Drops everything still pending for the current stimulus
    fn abandon(&mut self) {
        for depth in 0..self.frames.len() {
            self.scratch[depth].clear();
        }
        self.frames.clear();
    }

    fn reserve(&mut self, depth: usize) {
        if self.scratch.len() <= depth {
            self.scratch.resize_with(depth + 1, Outbox::default);
        }
    }
}

/// Runs the handler of `id` for one message. Returns `false` when there is
/// no such node or inlet, in which case `outbox` is left alone.
fn receive(
    graph: &mut LiveTopology,
    events: &mut Vec<Event>,
    id: NodeId,
    inlet: usize,
    msg: &Message,
    outbox: &mut Outbox,
) -> bool {
    match graph.info(id) {
        Some(info) if inlet < info.inlets() => {}
        Some(_) => {
            tracing::trace!("dispatch: node {} has no inlet {}", id, inlet);
            return false;
        }
        None => return false,
    }

    if let Some(object) = graph.body_mut(id) {
        if object.accepts(inlet).contains(msg.kind()) {
            object.receive(inlet, msg, outbox);
        } else {
            tracing::trace!("dispatch: node {} inlet {} ignores {:?}", id, inlet, msg.kind());
        }
    }
    collect_requests(events, graph, id, outbox);
    true
}

fn collect_requests(events: &mut Vec<Event>, graph: &LiveTopology, id: NodeId, outbox: &mut Outbox) {
    for request in outbox.requests.drain(..) {
        match request {
            Request::Args(args) => events.push(Event::ArgsRequested { node: id, args }),
            Request::Report(label, message) => events.push(Event::Print {
                node: id,
                name: graph.info(id).and_then(|info| info.name().map(str::to_string)),
                label,
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Link;
    use crate::registry::Registry;
    use crate::node::ObjectInfo;

    fn add(graph: &mut LiveTopology, registry: &Registry, kind: &str, args: &str) -> NodeId {
        let instance = registry.instantiate(kind, args).unwrap();
        let id = graph.allocate_id();
        let info = ObjectInfo {
            id,
            kind: kind.to_string(),
            params: instance.params,
            name: None,
            shape: instance.shape,
        };
        graph.insert(info, instance.object).unwrap();
        id
    }

    fn printed(dispatcher: &mut Dispatcher) -> Vec<(String, Message)> {
        dispatcher
            .drain_events()
            .filter_map(|e| match e {
                Event::Print { label, message, .. } => Some((label, message)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fan_out_follows_link_order() {
        let registry = Registry::new();
        let mut graph = LiveTopology::new();
        let src = add(&mut graph, &registry, "bang", "");
        let b = add(&mut graph, &registry, "print", "b");
        let a = add(&mut graph, &registry, "print", "a");
        let c = add(&mut graph, &registry, "print", "c");
        graph.connect(Link::new(src, 0, c, 0)).unwrap();
        graph.connect(Link::new(src, 0, a, 0)).unwrap();
        graph.connect(Link::new(src, 0, b, 0)).unwrap();

        let mut dispatcher = Dispatcher::new(DEFAULT_MAX_DEPTH);
        dispatcher.deliver(&mut graph, src, 0, &Message::Int(1)).unwrap();
        let labels: Vec<String> = printed(&mut dispatcher).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["c", "a", "b"]);
    }

    #[test]
    fn depth_first_through_trigger() {
        let registry = Registry::new();
        let mut graph = LiveTopology::new();
        let t = add(&mut graph, &registry, "trigger", "b a");
        let left = add(&mut graph, &registry, "print", "left");
        let right = add(&mut graph, &registry, "print", "right");
        graph.connect(Link::new(t, 0, left, 0)).unwrap();
        graph.connect(Link::new(t, 1, right, 0)).unwrap();

        let mut dispatcher = Dispatcher::new(DEFAULT_MAX_DEPTH);
        dispatcher.deliver(&mut graph, t, 0, &Message::Float(2.0)).unwrap();
        assert_eq!(
            printed(&mut dispatcher),
            vec![("right".to_string(), Message::Float(2.0)), ("left".to_string(), Message::Bang)]
        );
    }

    #[test]
    fn nested_fan_out_finishes_each_branch_first() {
        let registry = Registry::new();
        let mut graph = LiveTopology::new();
        let outer = add(&mut graph, &registry, "trigger", "a a");
        let inner = add(&mut graph, &registry, "trigger", "a a");
        let x = add(&mut graph, &registry, "print", "x");
        let y = add(&mut graph, &registry, "print", "y");
        let z = add(&mut graph, &registry, "print", "z");
        graph.connect(Link::new(outer, 1, inner, 0)).unwrap();
        graph.connect(Link::new(outer, 0, z, 0)).unwrap();
        graph.connect(Link::new(inner, 0, x, 0)).unwrap();
        graph.connect(Link::new(inner, 1, y, 0)).unwrap();
        graph.connect(Link::new(inner, 1, z, 0)).unwrap();

        let mut dispatcher = Dispatcher::new(DEFAULT_MAX_DEPTH);
        dispatcher.deliver(&mut graph, outer, 0, &Message::Bang).unwrap();
        let labels: Vec<String> = printed(&mut dispatcher).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["y", "z", "x", "z"]);
        assert!(dispatcher.frames.is_empty());
    }

    #[test]
    fn unaccepted_kinds_and_missing_nodes_are_dropped() {
        let registry = Registry::new();
        let mut graph = LiveTopology::new();
        let gate = add(&mut graph, &registry, "gate", "1");
        let p = add(&mut graph, &registry, "print", "");
        graph.connect(Link::new(gate, 0, p, 0)).unwrap();

        let mut dispatcher = Dispatcher::new(DEFAULT_MAX_DEPTH);
        // the control inlet takes numbers only
        dispatcher.deliver(&mut graph, gate, 0, &"open".into()).unwrap();
        dispatcher.deliver(&mut graph, gate, 1, &Message::Bang).unwrap();
        dispatcher.deliver(&mut graph, gate, 7, &Message::Bang).unwrap();
        dispatcher.deliver(&mut graph, NodeId(1000), 0, &Message::Bang).unwrap();
        assert!(printed(&mut dispatcher).is_empty());
    }

    #[test]
    fn self_feedback_hits_the_ceiling() {
        let registry = Registry::new();
        let mut graph = LiveTopology::new();
        let add_one = add(&mut graph, &registry, "+", "1");
        let p = add(&mut graph, &registry, "print", "");
        graph.connect(Link::new(add_one, 0, add_one, 0)).unwrap();
        graph.connect(Link::new(add_one, 0, p, 0)).unwrap();

        let mut dispatcher = Dispatcher::new(16);
        let err = dispatcher.deliver(&mut graph, add_one, 0, &Message::Int(0)).unwrap_err();
        assert_eq!(err, PatchError::RecursionLimitExceeded { node: add_one, limit: 16 });
        assert!(dispatcher.frames.is_empty());
        assert!(dispatcher.scratch.iter().all(Outbox::is_empty));
        // the loop is taken before the print on every level, so nothing reached it
        assert!(printed(&mut dispatcher).is_empty());
        assert_eq!(graph.link_count(), 2);

        // the dispatcher is still usable afterwards
        graph.disconnect(&Link::new(add_one, 0, add_one, 0));
        dispatcher.deliver(&mut graph, add_one, 0, &Message::Int(0)).unwrap();
        assert_eq!(printed(&mut dispatcher), vec![("print".to_string(), Message::Float(1.0))]);
    }
}
