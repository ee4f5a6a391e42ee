//! Number storage boxes: `int` and `float`

use crate::message::{KindSet, Message};
use crate::node::{Object, Outbox, Shape};
use crate::params::{ParamKind, ParamSpec};
use crate::registry::ObjectDescriptor;

const INT_PARAMS: &[ParamSpec] = &[ParamSpec::optional("value", ParamKind::Int, "0")];
const FLOAT_PARAMS: &[ParamSpec] = &[ParamSpec::optional("value", ParamKind::Float, "0")];

pub(crate) const INT: ObjectDescriptor = ObjectDescriptor {
    name: "int",
    description: "Store an integer; left inlet sets and outputs, bang outputs, right inlet only sets",
    params: INT_PARAMS,
    shape: |_| Shape::new(2, 1),
    factory: |p| Box::new(Value::int(p.int("value").unwrap_or(0))),
};

pub(crate) const FLOAT: ObjectDescriptor = ObjectDescriptor {
    name: "float",
    description: "Store a float; left inlet sets and outputs, bang outputs, right inlet only sets",
    params: FLOAT_PARAMS,
    shape: |_| Shape::new(2, 1),
    factory: |p| Box::new(Value::float(p.float("value").unwrap_or(0.0))),
};

/// A stored number with a hot left and a cold right inlet.
pub struct Value {
    stored: Stored,
}

// ints stay exact; an f32 only holds 24 bits of them
enum Stored {
    Int(i32),
    Float(f32),
}

impl Value {
    pub fn int(value: i32) -> Self {
        Self { stored: Stored::Int(value) }
    }

    pub fn float(value: f32) -> Self {
        Self { stored: Stored::Float(value) }
    }

    fn output(&self, out: &mut Outbox) {
        match self.stored {
            Stored::Int(v) => out.int(0, v),
            Stored::Float(v) => out.float(0, v),
        }
    }

    fn store(&mut self, msg: &Message) {
        match &mut self.stored {
            Stored::Int(v) => {
                if let Some(n) = msg.as_i32() {
                    *v = n;
                }
            }
            Stored::Float(v) => {
                if let Some(n) = msg.as_f32() {
                    *v = n;
                }
            }
        }
    }
}

impl Object for Value {
    fn accepts(&self, inlet: usize) -> KindSet {
        match inlet {
            0 => KindSet::BANG.with(KindSet::NUMBER).with(KindSet::LIST),
            1 => KindSet::NUMBER,
            _ => KindSet::NONE,
        }
    }

    fn receive(&mut self, inlet: usize, msg: &Message, out: &mut Outbox) {
        self.store(msg);
        if inlet == 0 {
            self.output(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_truncates_and_right_inlet_is_cold() {
        let mut v = Value::int(0);
        let mut out = Outbox::default();

        v.receive(1, &Message::Float(3.9), &mut out);
        assert!(out.sent.is_empty());

        v.receive(0, &Message::Bang, &mut out);
        assert_eq!(out.sent, vec![(0, Message::Int(3))]);
    }

    #[test]
    fn int_is_exact_past_float_precision() {
        let mut v = Value::int(16_777_217);
        let mut out = Outbox::default();
        v.receive(0, &Message::Bang, &mut out);
        v.receive(0, &Message::Int(i32::MAX), &mut out);
        v.receive(0, &"-16777219 x".into(), &mut out);
        assert_eq!(
            out.sent,
            vec![(0, Message::Int(16_777_217)), (0, Message::Int(i32::MAX)), (0, Message::Int(-16_777_219))]
        );
    }

    #[test]
    fn float_keeps_fraction() {
        let mut v = Value::float(0.0);
        let mut out = Outbox::default();
        v.receive(0, &Message::Int(2), &mut out);
        v.receive(0, &"0.25 x".into(), &mut out);
        assert_eq!(out.sent, vec![(0, Message::Float(2.0)), (0, Message::Float(0.25))]);
    }
}
