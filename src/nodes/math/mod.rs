mod arith;
mod value;

pub use arith::{Arith, Op};
pub use value::Value;

pub(crate) use arith::{ADD, DIV, MUL, SUB};
pub(crate) use value::{FLOAT, INT};
