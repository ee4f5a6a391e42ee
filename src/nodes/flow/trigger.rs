//! Fan a message out to several outlets, right to left, converting as it goes

use crate::message::{KindSet, Message};
use crate::node::{Object, Outbox, Shape};
use crate::params::{ParamKind, ParamSpec};
use crate::registry::ObjectDescriptor;

const PARAMS: &[ParamSpec] = &[ParamSpec::optional("kinds", ParamKind::List, "a a")];

pub(crate) const DESCRIPTOR: ObjectDescriptor = ObjectDescriptor {
    name: "trigger",
    description: "Output the input on every outlet, right to left, converted per outlet (b i f l a)",
    params: PARAMS,
    shape: |p| Shape::new(1, p.list("kinds").len().max(1)),
    factory: |p| Box::new(Trigger::new(p.list("kinds"))),
};

/// Conversion applied on one trigger outlet.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Conversion {
    Bang,
    Int,
    Float,
    List,
    /// Pass through unchanged
    Anything,
}

impl Conversion {
    fn from_token(token: &str) -> Self {
        match token {
            "b" | "bang" => Conversion::Bang,
            "i" | "int" => Conversion::Int,
            "f" | "float" => Conversion::Float,
            "l" | "list" => Conversion::List,
            "a" | "anything" => Conversion::Anything,
            other => {
                tracing::warn!("trigger: unknown conversion `{}`, passing through", other);
                Conversion::Anything
            }
        }
    }

    fn apply(self, msg: &Message) -> Message {
        match self {
            Conversion::Bang => Message::Bang,
            Conversion::Int => Message::Int(msg.as_i32().unwrap_or(0)),
            Conversion::Float => Message::Float(msg.as_f32().unwrap_or(0.0)),
            Conversion::List => match msg {
                Message::List(text) => Message::List(text.clone()),
                Message::Bang => Message::List(String::new()),
                other => Message::List(other.to_string()),
            },
            Conversion::Anything => msg.clone(),
        }
    }
}

/// Sends its input to every outlet, last outlet first.
pub struct Trigger {
    conversions: Vec<Conversion>,
}

impl Trigger {
    pub fn new(kinds: &[String]) -> Self {
        let mut conversions: Vec<Conversion> = kinds.iter().map(|k| Conversion::from_token(k)).collect();
        if conversions.is_empty() {
            conversions.push(Conversion::Anything);
        }
        Self { conversions }
    }
}

impl Object for Trigger {
    fn accepts(&self, inlet: usize) -> KindSet {
        if inlet == 0 {
            KindSet::ANY
        } else {
            KindSet::NONE
        }
    }

    fn receive(&mut self, _inlet: usize, msg: &Message, out: &mut Outbox) {
        for (outlet, conversion) in self.conversions.iter().enumerate().rev() {
            out.send(outlet, conversion.apply(msg));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_right_to_left() {
        let kinds: Vec<String> = ["b", "f", "a"].iter().map(|s| s.to_string()).collect();
        let mut t = Trigger::new(&kinds);
        let mut out = Outbox::default();
        t.receive(0, &Message::Int(3), &mut out);
        assert_eq!(
            out.sent,
            vec![(2, Message::Int(3)), (1, Message::Float(3.0)), (0, Message::Bang)]
        );
    }

    #[test]
    fn int_conversion_reads_first_list_token() {
        assert_eq!(Conversion::Int.apply(&Message::List("12 a".into())), Message::Int(12));
        assert_eq!(Conversion::Int.apply(&Message::List("x".into())), Message::Int(0));
        assert_eq!(Conversion::List.apply(&Message::Float(0.5)), Message::List("0.5".into()));
    }

    #[test]
    fn int_conversion_keeps_large_ints() {
        assert_eq!(Conversion::Int.apply(&Message::Int(16_777_217)), Message::Int(16_777_217));
        assert_eq!(Conversion::Int.apply(&Message::List("16777217 x".into())), Message::Int(16_777_217));
        assert_eq!(Conversion::Int.apply(&Message::Float(-2.7)), Message::Int(-2));
    }
}
