//! High-level patch editing API

use rtrb::{Consumer, Producer, RingBuffer};

use crate::document::PatchDocument;
use crate::error::PatchError;
use crate::graph::{Link, Topology};
use crate::message::Message;
use crate::node::{NodeId, ObjectInfo};
use crate::patch::{Command, Retired};
use crate::processor::{Event, PatchProcessor, Stamped};
use crate::registry::Registry;
use crate::settings::PatchSettings;

/// The control side of a patch - creates, wires, edits, saves and feeds it.
///
/// `Patcher` never touches live objects. It keeps a structural mirror of the
/// patch, validates every edit against it synchronously and forwards accepted
/// edits to its [`PatchProcessor`], which applies them between ticks. Errors
/// therefore come back immediately, and a rejected edit changes nothing.
///
/// # Creating an Instance
///
/// ```
/// use patchbay::{Patcher, PatchSettings};
///
/// let settings = PatchSettings::default().with_block_size(128);
/// let (patcher, processor) = Patcher::new(settings);
/// assert_eq!(processor.context().block_size, 128);
/// assert_eq!(patcher.object_count(), 0);
/// ```
///
/// # Building a Patch
///
/// 1. Create objects with [`create_object`](Self::create_object) - returns a [`NodeId`]
/// 2. Wire outlets to inlets with [`connect`](Self::connect)
/// 3. Label the objects a host wants to address with [`set_name`](Self::set_name)
///
/// ```
/// # use patchbay::{Event, Message, Patcher, PatchSettings};
/// # let (mut patcher, mut processor) = Patcher::new(PatchSettings::default());
/// let route = patcher.create_object("route", "foo bar").unwrap();
/// let print = patcher.create_object("print", "other").unwrap();
/// patcher.connect(route, 2, print, 0).unwrap();
/// patcher.set_name(route, Some("sel")).unwrap();
///
/// assert!(patcher.pass_data("baz 1 2", "sel"));
/// processor.process();
///
/// let events = patcher.poll();
/// assert!(matches!(
///     &events[0],
///     Event::Print { label, message: Message::List(text), .. } if label == "other" && text == "baz 1 2"
/// ));
/// ```
///
/// # Saving and Restoring
///
/// [`dump`](Self::dump) writes a JSON document, [`parse`](Self::parse) replaces
/// the whole patch with one. Node ids survive the trip.
pub struct Patcher {
    registry: Registry,
    settings: PatchSettings,
    /// Structure of the patch as it will be once pending commands land
    mirror: Topology<()>,

    commands: Producer<Command>,
    events: Consumer<Stamped>,
    retired: Consumer<Retired>,
    /// Bumped by every clear and load, matched against event stamps
    generation: u64,
}

impl Patcher {
    /// Creates a patcher with all built-in objects and its processing half.
    pub fn new(settings: PatchSettings) -> (Self, PatchProcessor) {
        Self::with_registry(settings, Registry::new())
    }

    /// Creates a patcher that instantiates objects from `registry`.
    pub fn with_registry(settings: PatchSettings, registry: Registry) -> (Self, PatchProcessor) {
        let (command_tx, command_rx) = RingBuffer::new(settings.command_capacity.max(1));
        let (event_tx, event_rx) = RingBuffer::new(settings.event_capacity.max(1));
        // every command retires at most one thing
        let (retired_tx, retired_rx) = RingBuffer::new(settings.command_capacity.max(1));

        let processor = PatchProcessor::new(settings.max_depth, settings.context(), command_rx, event_tx, retired_tx);
        let patcher = Self {
            registry,
            settings,
            mirror: Topology::new(),
            commands: command_tx,
            events: event_rx,
            retired: retired_rx,
            generation: 0,
        };
        (patcher, processor)
    }

    pub fn settings(&self) -> &PatchSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access, e.g. to register custom object types.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    fn send(&mut self, command: Command) -> Result<(), PatchError> {
        self.commands.push(command).map_err(|_| {
            tracing::warn!("command queue full, is the processor running?");
            PatchError::QueueFull
        })
    }

    /// Creates an object from its type name and argument text.
    ///
    /// On error the patch is unchanged and no id is consumed.
    pub fn create_object(&mut self, kind: &str, args: &str) -> Result<NodeId, PatchError> {
        let next = self.mirror.next_id();
        if next == NodeId::MAX.0 {
            return Err(PatchError::IdsExhausted);
        }
        let instance = self.registry.instantiate(kind, args)?;
        let info = ObjectInfo {
            id: NodeId(next),
            kind: kind.to_string(),
            params: instance.params,
            name: None,
            shape: instance.shape,
        };
        let id = info.id;

        self.send(Command::Insert {
            info: info.clone(),
            object: instance.object,
        })?;
        self.mirror.insert(info, ())?;

        tracing::debug!("patch_create: {} `{}` [{}] -> {}", kind, args, instance.shape.outlets, id);
        Ok(id)
    }

    /// Deletes an object and every link touching it. Unknown ids are ignored.
    pub fn delete_object(&mut self, id: NodeId) -> Result<(), PatchError> {
        if !self.mirror.contains(id) {
            return Ok(());
        }
        self.send(Command::Remove(id))?;
        self.mirror.remove(id);

        tracing::debug!("patch_delete: {}", id);
        Ok(())
    }

    /// Removes every object and link. Ids handed out before stay unused.
    pub fn clear(&mut self) -> Result<(), PatchError> {
        self.send(Command::Clear)?;
        self.mirror.clear();
        self.generation += 1;

        tracing::debug!("patch_clear");
        Ok(())
    }

    /// Links `outlet` of `from` to `inlet` of `to`.
    ///
    /// Connecting an existing link again is a no-op. Cycles are allowed.
    pub fn connect(&mut self, from: NodeId, outlet: usize, to: NodeId, inlet: usize) -> Result<(), PatchError> {
        let link = Link::new(from, outlet, to, inlet);
        self.mirror.can_connect(&link)?;
        if self.mirror.has_link(&link) {
            return Ok(());
        }
        self.send(Command::Connect(link))?;
        self.mirror.connect(link)?;

        tracing::debug!("patch_connect: {}:{} -> {}:{}", from, outlet, to, inlet);
        Ok(())
    }

    /// Removes a link. A link that does not exist is ignored.
    pub fn disconnect(&mut self, from: NodeId, outlet: usize, to: NodeId, inlet: usize) -> Result<(), PatchError> {
        let link = Link::new(from, outlet, to, inlet);
        if !self.mirror.has_link(&link) {
            return Ok(());
        }
        self.send(Command::Disconnect(link))?;
        self.mirror.disconnect(&link);

        tracing::debug!("patch_disconnect: {}:{} -> {}:{}", from, outlet, to, inlet);
        Ok(())
    }

    /// Reparses an object's arguments.
    ///
    /// The object is rebuilt from the new parameters, so its state resets.
    /// When the new parameters shrink the inlet or outlet count, links beyond
    /// the new range disappear in the same step.
    pub fn set_args(&mut self, id: NodeId, args: &str) -> Result<(), PatchError> {
        let kind = self.mirror.info(id).ok_or(PatchError::UnknownNode(id))?.kind().to_string();
        let instance = self.registry.instantiate(&kind, args)?;

        self.send(Command::Reshape {
            id,
            params: instance.params.clone(),
            shape: instance.shape,
            object: instance.object,
        })?;
        let (_, pruned) = self.mirror.reshape(id, instance.params, instance.shape, ())?;

        tracing::debug!("patch_set_args: {} `{}`, {} link(s) pruned", id, args, pruned.len());
        Ok(())
    }

    /// Sets or clears the label used by [`pass_bang`](Self::pass_bang) and
    /// [`pass_data`](Self::pass_data).
    pub fn set_name(&mut self, id: NodeId, name: Option<&str>) -> Result<(), PatchError> {
        if !self.mirror.contains(id) {
            return Err(PatchError::UnknownNode(id));
        }
        if let Some(name) = name {
            match self.mirror.find(name) {
                Some(owner) if owner != id => return Err(PatchError::NameInUse(name.to_string())),
                _ => {}
            }
        }

        let name = name.map(str::to_string);
        self.send(Command::Rename { id, name: name.clone() })?;
        self.mirror.rename(id, name)?;

        tracing::debug!("patch_set_name: {}", id);
        Ok(())
    }

    /// Number of objects in the patch.
    pub fn object_count(&self) -> usize {
        self.mirror.len()
    }

    /// Object at `pos` in creation order.
    pub fn handle_at(&self, pos: usize) -> Option<&ObjectInfo> {
        self.mirror.at(pos)
    }

    pub fn handle(&self, id: NodeId) -> Option<&ObjectInfo> {
        self.mirror.info(id)
    }

    /// Resolves a label to a live object.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.mirror.find(name)
    }

    /// Every link, in insertion order.
    pub fn links(&self) -> Vec<Link> {
        self.mirror.links()
    }

    /// The structural view of the patch.
    pub fn topology(&self) -> &Topology<()> {
        &self.mirror
    }

    /// Serializes the whole patch.
    pub fn dump(&self) -> Result<String, PatchError> {
        PatchDocument::capture(&self.mirror).to_json()
    }

    /// Replaces the whole patch with the one described by `text`.
    ///
    /// The document is built completely before anything is swapped, so on
    /// error the current patch is untouched.
    pub fn parse(&mut self, text: &str) -> Result<(), PatchError> {
        let document = PatchDocument::from_json(text)?;
        self.load(&document)
    }

    /// Replaces the whole patch with `document`.
    pub fn load(&mut self, document: &PatchDocument) -> Result<(), PatchError> {
        let mut live = document.build(&self.registry)?;
        // keep ids issued before the load unused
        let next_id = live.next_id().max(self.mirror.next_id());
        live.reserve_ids(next_id);

        let mirror = live.map(|_, _| ());
        self.send(Command::Load(Box::new(live)))?;
        self.mirror = mirror;
        self.generation += 1;

        tracing::debug!(
            "patch_load: {} object(s), {} link(s)",
            self.mirror.len(),
            self.mirror.link_count()
        );
        Ok(())
    }

    /// Delivers `msg` to `inlet` of `id` at the next processing tick.
    pub fn inject(&mut self, id: NodeId, inlet: usize, msg: impl Into<Message>) -> Result<(), PatchError> {
        if !self.mirror.contains(id) {
            return Err(PatchError::UnknownNode(id));
        }
        self.send(Command::Inject {
            id,
            inlet,
            message: msg.into(),
        })
    }

    /// Sends a bang to inlet 0 of the object labelled `target`.
    ///
    /// Returns `false`, doing nothing, when no live object has that label.
    pub fn pass_bang(&mut self, target: &str) -> bool {
        self.pass_data(Message::Bang, target)
    }

    /// Sends a value to inlet 0 of the object labelled `target`.
    ///
    /// `i32` goes out as an int, `f32` as a float and text as a token list.
    /// Returns `false`, doing nothing, when no live object has that label.
    pub fn pass_data(&mut self, value: impl Into<Message>, target: &str) -> bool {
        let Some(id) = self.mirror.find(target) else {
            tracing::trace!("pass: no object named `{}`", target);
            return false;
        };
        self.inject(id, 0, value).is_ok()
    }

    /// Collects what the processing side has reported since the last call.
    ///
    /// Also disposes of retired objects and applies argument changes objects
    /// asked for. Requests raised before a [`clear`](Self::clear) or
    /// [`load`](Self::load) are still returned but no longer applied, since
    /// their id may name a different object by now. Call it regularly from
    /// the control thread.
    pub fn poll(&mut self) -> Vec<Event> {
        while let Ok(retired) = self.retired.pop() {
            drop(retired);
        }

        let mut events = Vec::new();
        while let Ok((generation, event)) = self.events.pop() {
            if let Event::ArgsRequested { node, args } = &event {
                if generation != self.generation {
                    tracing::debug!("argument request from {} predates the current patch, skipped", node);
                } else if let Err(err) = self.set_args(*node, args) {
                    tracing::warn!("cannot apply arguments requested by {}: {}", node, err);
                }
            }
            events.push(event);
        }
        events
    }
}
