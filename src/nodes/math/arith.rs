//! Binary arithmetic: `+`, `-`, `*`, `/`

use crate::message::{KindSet, Message};
use crate::node::{Object, Outbox, Shape};
use crate::params::{ParamKind, ParamSpec};
use crate::registry::ObjectDescriptor;

const PARAMS: &[ParamSpec] = &[ParamSpec::optional("operand", ParamKind::Float, "0")];

macro_rules! arith_descriptor {
    ($name:literal, $op:expr, $description:literal) => {
        ObjectDescriptor {
            name: $name,
            description: $description,
            params: PARAMS,
            shape: |_| Shape::new(2, 1),
            factory: |p| Box::new(Arith::new($op, p.float("operand").unwrap_or(0.0))),
        }
    };
}

pub(crate) const ADD: ObjectDescriptor = arith_descriptor!("+", Op::Add, "Add the right operand to the left");
pub(crate) const SUB: ObjectDescriptor = arith_descriptor!("-", Op::Sub, "Subtract the right operand from the left");
pub(crate) const MUL: ObjectDescriptor = arith_descriptor!("*", Op::Mul, "Multiply left by right");
pub(crate) const DIV: ObjectDescriptor = arith_descriptor!("/", Op::Div, "Divide left by right, 0 on division by zero");

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn apply(self, left: f32, right: f32) -> f32 {
        match self {
            Op::Add => left + right,
            Op::Sub => left - right,
            Op::Mul => left * right,
            Op::Div if right == 0.0 => 0.0,
            Op::Div => left / right,
        }
    }
}

/// Float arithmetic with a hot left and a cold right operand.
pub struct Arith {
    op: Op,
    left: f32,
    right: f32,
}

impl Arith {
    pub fn new(op: Op, right: f32) -> Self {
        Self { op, left: 0.0, right }
    }
}

impl Object for Arith {
    fn accepts(&self, inlet: usize) -> KindSet {
        match inlet {
            0 => KindSet::BANG.with(KindSet::NUMBER),
            1 => KindSet::NUMBER,
            _ => KindSet::NONE,
        }
    }

    fn receive(&mut self, inlet: usize, msg: &Message, out: &mut Outbox) {
        match (inlet, msg.as_f32()) {
            (0, Some(v)) => self.left = v,
            (1, Some(v)) => {
                self.right = v;
                return;
            }
            _ => {}
        }
        out.float(0, self.op.apply(self.left, self.right));
    }
}
