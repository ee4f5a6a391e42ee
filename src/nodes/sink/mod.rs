mod print;

pub use print::Print;

pub(crate) use print::DESCRIPTOR as PRINT;
