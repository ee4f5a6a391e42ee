//! Message box - stores a token list and sends it when triggered

use itertools::Itertools;

use crate::message::{first_token, KindSet, Message};
use crate::node::{Object, Outbox, Shape};
use crate::params::{ParamKind, ParamSpec};
use crate::registry::ObjectDescriptor;

const PARAMS: &[ParamSpec] = &[ParamSpec::optional("content", ParamKind::List, "")];

pub(crate) const DESCRIPTOR: ObjectDescriptor = ObjectDescriptor {
    name: "message",
    description: "Output the stored content on any input; `set ...` replaces the content",
    params: PARAMS,
    shape: |_| Shape::new(1, 1),
    factory: |p| Box::new(MessageBox::new(p.list("content"))),
};

/// Sends its content, typed as narrowly as possible.
///
/// A single `bang`, integer or float token goes out as that kind; anything
/// else goes out as a list. An incoming list starting with `set` replaces the
/// content instead and asks the host to persist the new arguments.
pub struct MessageBox {
    content: Vec<String>,
}

impl MessageBox {
    pub fn new(content: &[String]) -> Self {
        Self { content: content.to_vec() }
    }

    fn payload(&self) -> Message {
        match self.content.as_slice() {
            [] => Message::Bang,
            [single] => Message::from_token(single),
            tokens => Message::List(tokens.iter().join(" ")),
        }
    }
}

impl Object for MessageBox {
    fn accepts(&self, inlet: usize) -> KindSet {
        if inlet == 0 {
            KindSet::ANY
        } else {
            KindSet::NONE
        }
    }

    fn receive(&mut self, _inlet: usize, msg: &Message, out: &mut Outbox) {
        if let Message::List(text) = msg {
            if first_token(text) == "set" {
                self.content = text.split_whitespace().skip(1).map(str::to_string).collect();
                out.request_args(self.content.iter().join(" "));
                return;
            }
        }
        out.send(0, self.payload());
    }
}
