//! Selector that forwards a message to the outlet of the first matching token

use crate::message::{first_token, format_float, format_int, KindSet, Message};
use crate::node::{Object, Outbox, Shape};
use crate::params::{ParamKind, ParamSpec};
use crate::registry::ObjectDescriptor;

const PARAMS: &[ParamSpec] = &[ParamSpec::optional("tokens", ParamKind::List, "")];

pub(crate) const DESCRIPTOR: ObjectDescriptor = ObjectDescriptor {
    name: "route",
    description: "Send a message to the outlet of its first matching token, else to the last outlet",
    params: PARAMS,
    shape: |p| Shape::new(1, p.list("tokens").len() + 1),
    factory: |p| Box::new(Route::new(p.list("tokens").to_vec())),
};

/// Routes messages by exact token match.
///
/// Has one outlet per token plus a catch-all outlet at the end. Matching is
/// a case-sensitive, first-match linear scan:
/// - bang matches the literal token `bang`
/// - ints and floats match their canonical text (see
///   [`format_int`] and [`format_float`]), so a float `1.0` only matches
///   `1.000000`
/// - lists match on their first token and are forwarded whole
pub struct Route {
    tokens: Vec<String>,
}

impl Route {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    fn outlet_for(&self, key: &str) -> usize {
        self.tokens
            .iter()
            .position(|t| t == key)
            .unwrap_or(self.tokens.len())
    }
}

impl Object for Route {
    fn accepts(&self, inlet: usize) -> KindSet {
        if inlet == 0 {
            KindSet::ANY
        } else {
            KindSet::NONE
        }
    }

    fn receive(&mut self, _inlet: usize, msg: &Message, out: &mut Outbox) {
        let outlet = match msg {
            Message::Bang => self.outlet_for("bang"),
            Message::Int(v) => self.outlet_for(&format_int(*v)),
            Message::Float(v) => self.outlet_for(&format_float(*v)),
            Message::List(text) => self.outlet_for(first_token(text)),
        };
        out.send(outlet, msg.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(tokens: &[&str]) -> Route {
        Route::new(tokens.iter().map(|t| t.to_string()).collect())
    }

    fn emit(r: &mut Route, msg: Message) -> Vec<(usize, Message)> {
        let mut out = Outbox::default();
        r.receive(0, &msg, &mut out);
        out.sent
    }

    #[test]
    fn list_matches_first_token() {
        let mut r = route(&["foo", "bar"]);
        assert_eq!(emit(&mut r, "foo 1 2".into()), vec![(0, Message::List("foo 1 2".into()))]);
        assert_eq!(emit(&mut r, "bar".into()), vec![(1, Message::List("bar".into()))]);
        assert_eq!(emit(&mut r, "baz foo".into()), vec![(2, Message::List("baz foo".into()))]);
    }

    #[test]
    fn numbers_match_canonical_text() {
        let mut r = route(&["7", "1", "1.000000"]);
        assert_eq!(emit(&mut r, Message::Int(7)), vec![(0, Message::Int(7))]);
        assert_eq!(emit(&mut r, Message::Float(1.0)), vec![(2, Message::Float(1.0))]);
        assert_eq!(emit(&mut r, Message::Int(8)), vec![(3, Message::Int(8))]);
    }

    #[test]
    fn bang_matches_literal_token() {
        let mut r = route(&["foo", "bang", "bang"]);
        assert_eq!(emit(&mut r, Message::Bang), vec![(1, Message::Bang)]);

        let mut r = route(&["foo", "bar"]);
        assert_eq!(emit(&mut r, Message::Bang), vec![(2, Message::Bang)]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let mut r = route(&["Foo"]);
        assert_eq!(emit(&mut r, "foo".into()), vec![(1, Message::List("foo".into()))]);
    }

    #[test]
    fn shape_follows_tokens() {
        let p = crate::params::parse_args("route", PARAMS, "a b c").unwrap();
        assert_eq!((DESCRIPTOR.shape)(&p), Shape::new(1, 4));
        let p = crate::params::parse_args("route", PARAMS, "").unwrap();
        assert_eq!((DESCRIPTOR.shape)(&p), Shape::new(1, 1));
    }
}
