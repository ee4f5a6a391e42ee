use itertools::Itertools;

use crate::message::{KindSet, Message};
use crate::node::{Object, Outbox, Shape};
use crate::params::{ParamKind, ParamSpec};
use crate::registry::ObjectDescriptor;

const PARAMS: &[ParamSpec] = &[ParamSpec::optional("label", ParamKind::List, "print")];

pub(crate) const DESCRIPTOR: ObjectDescriptor = ObjectDescriptor {
    name: "print",
    description: "Report every incoming message to the host under a label",
    params: PARAMS,
    shape: |_| Shape::new(1, 0),
    factory: |p| Box::new(Print::new(p.list("label").iter().join(" "))),
};

/// Forwards messages to the host as [`Event::Print`](crate::Event::Print)
/// and logs them.
pub struct Print {
    label: String,
}

impl Print {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl Object for Print {
    fn accepts(&self, inlet: usize) -> KindSet {
        if inlet == 0 {
            KindSet::ANY
        } else {
            KindSet::NONE
        }
    }

    fn receive(&mut self, _inlet: usize, msg: &Message, out: &mut Outbox) {
        tracing::info!("{}: {}", self.label, msg);
        out.report(self.label.clone(), msg.clone());
    }
}
