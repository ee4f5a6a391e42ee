//! Combine several inlets into one token list

use itertools::Itertools;

use crate::message::{first_token, KindSet, Message};
use crate::node::{Object, Outbox, Shape};
use crate::params::{ParamKind, ParamSpec};
use crate::registry::ObjectDescriptor;

const PARAMS: &[ParamSpec] = &[ParamSpec::optional("values", ParamKind::List, "0 0")];

pub(crate) const DESCRIPTOR: ObjectDescriptor = ObjectDescriptor {
    name: "pack",
    description: "One inlet per initial value; the left inlet outputs all stored values as a list",
    params: PARAMS,
    shape: |p| Shape::new(p.list("values").len().max(1), 1),
    factory: |p| Box::new(Pack::new(p.list("values"))),
};

/// Stores one token per inlet. The left inlet is hot.
pub struct Pack {
    slots: Vec<String>,
}

impl Pack {
    pub fn new(values: &[String]) -> Self {
        let mut slots = values.to_vec();
        if slots.is_empty() {
            slots.push("0".to_string());
        }
        Self { slots }
    }

    fn output(&self, out: &mut Outbox) {
        out.list(0, self.slots.iter().join(" "));
    }
}

impl Object for Pack {
    fn accepts(&self, inlet: usize) -> KindSet {
        match inlet {
            0 => KindSet::ANY,
            i if i < self.slots.len() => KindSet::NUMBER.with(KindSet::LIST),
            _ => KindSet::NONE,
        }
    }

    fn receive(&mut self, inlet: usize, msg: &Message, out: &mut Outbox) {
        if let Some(slot) = self.slots.get_mut(inlet) {
            match msg {
                Message::Bang => {}
                Message::Int(v) => *slot = v.to_string(),
                Message::Float(v) => *slot = v.to_string(),
                Message::List(text) => *slot = first_token(text).to_string(),
            }
        }
        if inlet == 0 {
            self.output(out);
        }
    }
}
