//! Discrete messages that travel along links.

use core::fmt;

/// The four payload kinds a link can carry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MessageKind {
    Bang,
    Int,
    Float,
    List,
}

impl MessageKind {
    const fn bit(self) -> u8 {
        match self {
            MessageKind::Bang => 1,
            MessageKind::Int => 1 << 1,
            MessageKind::Float => 1 << 2,
            MessageKind::List => 1 << 3,
        }
    }
}

/// Set of message kinds an inlet handles.
///
/// Returned by [`Object::accepts`](crate::Object::accepts). Anything outside
/// the set is dropped before the object sees it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct KindSet(u8);

impl KindSet {
    pub const NONE: KindSet = KindSet(0);
    pub const BANG: KindSet = KindSet(MessageKind::Bang.bit());
    pub const INT: KindSet = KindSet(MessageKind::Int.bit());
    pub const FLOAT: KindSet = KindSet(MessageKind::Float.bit());
    pub const LIST: KindSet = KindSet(MessageKind::List.bit());
    /// Int or float.
    pub const NUMBER: KindSet = KindSet(MessageKind::Int.bit() | MessageKind::Float.bit());
    pub const ANY: KindSet = KindSet(0b1111);

    /// Union of two sets.
    pub const fn with(self, other: KindSet) -> KindSet {
        KindSet(self.0 | other.0)
    }

    pub const fn contains(self, kind: MessageKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// A message payload.
///
/// Token lists are kept as their space-separated text, which is also how
/// hosts inject them.
#[derive(Clone, PartialEq, Debug)]
pub enum Message {
    Bang,
    Int(i32),
    Float(f32),
    List(String),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Bang => MessageKind::Bang,
            Message::Int(_) => MessageKind::Int,
            Message::Float(_) => MessageKind::Float,
            Message::List(_) => MessageKind::List,
        }
    }

    /// Numeric view of the payload, if it has one.
    ///
    /// Lists yield their first token when it parses as a number.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Message::Bang => None,
            Message::Int(v) => Some(*v as f32),
            Message::Float(v) => Some(*v),
            Message::List(text) => first_token(text).parse().ok(),
        }
    }

    /// Integer view of the payload, if it has one.
    ///
    /// Ints pass through exactly; floats and float tokens are truncated
    /// toward zero, saturating at the `i32` range.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Message::Bang => None,
            Message::Int(v) => Some(*v),
            Message::Float(v) => Some(*v as i32),
            Message::List(text) => {
                let token = first_token(text);
                token.parse::<i32>().ok().or_else(|| token.parse::<f32>().ok().map(|v| v as i32))
            }
        }
    }

    /// Builds the most specific message for a single token.
    ///
    /// `"bang"` becomes [`Message::Bang`], integers and floats become numbers,
    /// anything else stays a one-token list.
    pub fn from_token(token: &str) -> Message {
        if token == "bang" {
            Message::Bang
        } else if let Ok(v) = token.parse::<i32>() {
            Message::Int(v)
        } else if let Ok(v) = token.parse::<f32>() {
            Message::Float(v)
        } else {
            Message::List(token.to_string())
        }
    }
}

/// Text up to the first space, or the whole string when there is none.
pub fn first_token(text: &str) -> &str {
    match text.find(' ') {
        Some(pos) => &text[..pos],
        None => text,
    }
}

/// Canonical decimal text of an integer payload, used for token matching.
pub fn format_int(value: i32) -> String {
    value.to_string()
}

/// Canonical decimal text of a float payload, used for token matching.
///
/// Always six fixed decimals, so `1.0` is `"1.000000"` and never matches
/// the token `"1"`.
pub fn format_float(value: f32) -> String {
    format!("{:.6}", value)
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Bang => write!(f, "bang"),
            Message::Int(v) => write!(f, "{}", v),
            Message::Float(v) => write!(f, "{}", v),
            Message::List(text) => write!(f, "{}", text),
        }
    }
}

impl From<i32> for Message {
    fn from(v: i32) -> Self {
        Message::Int(v)
    }
}

impl From<f32> for Message {
    fn from(v: f32) -> Self {
        Message::Float(v)
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::List(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::List(text)
    }
}
