//! Built-in patch objects.
//!
//! Objects are organized into four categories:
//!
//! ## Sources ([`source`])
//!
//! Originate messages:
//! - [`Bang`] (`bang`) - Turn any input into a bang
//! - [`MessageBox`] (`message`) - Send stored content, `set` replaces it
//! - [`Metro`] (`metro`) - Bang at an interval from the processing tick
//!
//! ## Flow ([`flow`])
//!
//! Steer messages between outlets:
//! - [`Route`] (`route`) - Select an outlet by matching tokens
//! - [`Trigger`] (`trigger`) - Fan out right to left with conversions
//! - [`Gate`] (`gate`) - Pass through one selectable outlet
//! - [`Pack`] (`pack`) - Combine inlets into one list
//!
//! ## Math ([`math`])
//!
//! - [`Value`] (`int`, `float`) - Hot/cold number storage
//! - [`Arith`] (`+`, `-`, `*`, `/`) - Float arithmetic
//!
//! ## Sinks ([`sink`])
//!
//! - [`Print`] (`print`) - Report messages to the host

pub mod source;
pub mod flow;
pub mod math;
pub mod sink;

// Re-export common types at the top level for convenience
pub use source::{Bang, MessageBox, Metro};
pub use flow::{Conversion, Gate, Pack, Route, Trigger};
pub use math::{Arith, Op, Value};
pub use sink::Print;

use crate::registry::ObjectDescriptor;

/// Every built-in object type, in registration order.
pub(crate) static BUILTINS: &[ObjectDescriptor] = &[
    source::BANG,
    source::MESSAGE,
    source::METRO,
    flow::ROUTE,
    flow::TRIGGER,
    flow::GATE,
    flow::PACK,
    math::INT,
    math::FLOAT,
    math::ADD,
    math::SUB,
    math::MUL,
    math::DIV,
    sink::PRINT,
];
