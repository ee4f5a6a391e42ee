//! Pass messages through to one selectable outlet

use crate::message::{KindSet, Message};
use crate::node::{Object, Outbox, Shape};
use crate::params::{ParamKind, ParamSpec};
use crate::registry::ObjectDescriptor;

const PARAMS: &[ParamSpec] = &[ParamSpec::optional("outlets", ParamKind::Int, "1")];

fn outlet_count(n: Option<i32>) -> usize {
    n.unwrap_or(1).max(1) as usize
}

pub(crate) const DESCRIPTOR: ObjectDescriptor = ObjectDescriptor {
    name: "gate",
    description: "Left inlet picks the open outlet (0 closes), right inlet passes messages through",
    params: PARAMS,
    shape: |p| Shape::new(2, outlet_count(p.int("outlets"))),
    factory: |p| Box::new(Gate::new(outlet_count(p.int("outlets")))),
};

/// A gate with `n` outlets. Starts closed.
pub struct Gate {
    outlets: usize,
    /// 0 = closed, otherwise the 1-based open outlet
    open: usize,
}

impl Gate {
    pub fn new(outlets: usize) -> Self {
        Self { outlets, open: 0 }
    }
}

impl Object for Gate {
    fn accepts(&self, inlet: usize) -> KindSet {
        match inlet {
            0 => KindSet::NUMBER,
            1 => KindSet::ANY,
            _ => KindSet::NONE,
        }
    }

    fn receive(&mut self, inlet: usize, msg: &Message, out: &mut Outbox) {
        if inlet == 0 {
            let selected = msg.as_f32().unwrap_or(0.0).max(0.0) as usize;
            self.open = selected.min(self.outlets);
        } else if self.open > 0 {
            out.send(self.open - 1, msg.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_open_outlet_passes() {
        let mut gate = Gate::new(2);
        let mut out = Outbox::default();

        gate.receive(1, &Message::Int(1), &mut out);
        assert!(out.sent.is_empty());

        gate.receive(0, &Message::Int(2), &mut out);
        gate.receive(1, &Message::Bang, &mut out);
        assert_eq!(out.sent, vec![(1, Message::Bang)]);

        out.clear();
        gate.receive(0, &Message::Int(9), &mut out);
        gate.receive(1, &"hi".into(), &mut out);
        assert_eq!(out.sent, vec![(1, Message::List("hi".into()))]);
    }
}
