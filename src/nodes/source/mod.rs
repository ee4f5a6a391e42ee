mod bang;
mod message;
mod metro;

pub use bang::Bang;
pub use message::MessageBox;
pub use metro::Metro;

pub(crate) use bang::DESCRIPTOR as BANG;
pub(crate) use message::DESCRIPTOR as MESSAGE;
pub(crate) use metro::DESCRIPTOR as METRO;
