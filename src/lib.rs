//! patchbay - live-patchable message dataflow graph for audio engines
//!
//! Design principles:
//! - A patch is objects plus links between indexed outlets and inlets
//! - Objects come from a descriptor table; their port counts are a pure
//!   function of their parameters
//! - The control side validates edits synchronously and ships them through a
//!   lock-free ring; the processing side applies them between ticks
//! - No Arc, no locks on the processing thread
//! - Cycles are allowed, runaway recursion is bounded per stimulus
//!
//! ```
//! use patchbay::{Event, Message, Patcher, PatchSettings};
//!
//! let (mut patcher, mut processor) = Patcher::new(PatchSettings::default());
//!
//! let add = patcher.create_object("+", "10").unwrap();
//! let print = patcher.create_object("print", "sum").unwrap();
//! patcher.connect(add, 0, print, 0).unwrap();
//! patcher.set_name(add, Some("in")).unwrap();
//!
//! patcher.pass_data(5i32, "in");
//! processor.process();
//!
//! assert_eq!(
//!     patcher.poll(),
//!     vec![Event::Print { node: print, name: None, label: "sum".into(), message: Message::Float(15.0) }]
//! );
//! ```

mod dispatch;
mod document;
mod error;
mod graph;
mod message;
mod node;
mod params;
mod patch;
mod patcher;
mod processor;
mod registry;
mod settings;
pub mod nodes;

pub use dispatch::DEFAULT_MAX_DEPTH;
pub use document::{LinkEntry, ObjectEntry, PatchDocument, DOCUMENT_VERSION};
pub use error::PatchError;
pub use graph::{Link, Topology};
pub use message::{format_float, format_int, KindSet, Message, MessageKind};
pub use node::{NodeId, Object, ObjectInfo, Outbox, ProcessContext, Shape};
pub use params::{parse_args, ParamKind, ParamSpec, ParamValue, Params};
pub use patcher::Patcher;
pub use processor::{Event, PatchProcessor};
pub use registry::{is_valid_object, Factory, Instance, ObjectDescriptor, Registry, ShapeFn};
pub use settings::PatchSettings;
