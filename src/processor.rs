//! Processing-side half of a patch

use rtrb::{Consumer, Producer};

use crate::error::PatchError;
use crate::message::Message;
use crate::node::{NodeId, ProcessContext};
use crate::patch::{Command, Patch, Retired};

/// Something the processing side wants the host to know.
///
/// Drained on the control side with [`Patcher::poll`](crate::Patcher::poll).
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A `print` object (or any object calling [`Outbox::report`](crate::Outbox::report))
    /// received a message.
    Print {
        node: NodeId,
        name: Option<String>,
        label: String,
        message: Message,
    },
    /// An object asked for its arguments to be replaced.
    ArgsRequested { node: NodeId, args: String },
    /// A stimulus or command failed on the processing side.
    Fault(PatchError),
}

/// An event tagged with the patch generation it was raised in.
///
/// The generation goes up each time a clear or load replaces the live patch.
pub(crate) type Stamped = (u64, Event);

/// Owns the live patch and evaluates it.
///
/// Created together with its [`Patcher`](crate::Patcher). Move it to whatever
/// thread drives processing and call [`process`](Self::process) once per
/// block. Nothing in here locks or waits on the control side.
///
/// ```
/// use patchbay::{Patcher, PatchSettings};
///
/// let (mut patcher, mut processor) = Patcher::new(PatchSettings::default());
/// let metro = patcher.create_object("metro", "10").unwrap();
/// let print = patcher.create_object("print", "tick").unwrap();
/// patcher.connect(metro, 0, print, 0).unwrap();
///
/// std::thread::spawn(move || {
///     for _ in 0..16 {
///         processor.process();
///     }
/// })
/// .join()
/// .unwrap();
/// ```
pub struct PatchProcessor {
    patch: Patch,
    commands: Consumer<Command>,
    events: Producer<Stamped>,
    retired: Producer<Retired>,
    ctx: ProcessContext,
    generation: u64,
}

impl PatchProcessor {
    pub(crate) fn new(
        max_depth: usize,
        ctx: ProcessContext,
        commands: Consumer<Command>,
        events: Producer<Stamped>,
        retired: Producer<Retired>,
    ) -> Self {
        Self {
            patch: Patch::new(max_depth),
            commands,
            events,
            retired,
            ctx,
            generation: 0,
        }
    }

    /// Block size and sample rate handed to every tick hook.
    pub fn context(&self) -> ProcessContext {
        self.ctx
    }

    /// Number of live objects as seen by the processing side.
    pub fn object_count(&self) -> usize {
        self.patch.graph().len()
    }

    /// Runs one processing tick.
    ///
    /// 1. Applies every pending command from the control side
    /// 2. Runs each object's tick hook, in creation order
    /// 3. Publishes events for the host
    pub fn process(&mut self) {
        self.apply_commands();

        let ctx = self.ctx;
        for fault in self.patch.tick(&ctx) {
            self.fault(fault);
        }

        self.publish_events();
    }

    /// Delivers `msg` to `inlet` of `id` right away, on this thread.
    ///
    /// Meant for block-boundary stimuli from the processing side itself.
    /// Failures are reported as [`Event::Fault`].
    pub fn deliver(&mut self, id: NodeId, inlet: usize, msg: &Message) {
        if let Err(err) = self.patch.deliver(id, inlet, msg) {
            self.fault(err);
        }
        self.publish_events();
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            if command.replaces_patch() {
                // everything raised so far belongs to the outgoing patch
                self.publish_events();
                self.generation += 1;
            }
            match self.patch.apply(command) {
                Ok(Some(retired)) => {
                    if self.retired.push(retired).is_err() {
                        // dropped here instead; only happens when the host never polls
                        tracing::warn!("retire queue full, dropping on the processing thread");
                    }
                }
                Ok(None) => {}
                Err(err) => self.fault(err),
            }
        }
    }

    fn fault(&mut self, err: PatchError) {
        // keep events in the order they happened
        self.publish_events();
        tracing::warn!("patch fault: {}", err);
        if self.events.push((self.generation, Event::Fault(err))).is_err() {
            tracing::warn!("event queue full, fault dropped");
        }
    }

    fn publish_events(&mut self) {
        let Self { patch, events, generation, .. } = self;
        for event in patch.drain_events() {
            if events.push((*generation, event)).is_err() {
                tracing::trace!("event queue full, event dropped");
            }
        }
    }
}
