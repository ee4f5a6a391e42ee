mod gate;
mod pack;
mod route;
mod trigger;

pub use gate::Gate;
pub use pack::Pack;
pub use route::Route;
pub use trigger::{Conversion, Trigger};

pub(crate) use gate::DESCRIPTOR as GATE;
pub(crate) use pack::DESCRIPTOR as PACK;
pub(crate) use route::DESCRIPTOR as ROUTE;
pub(crate) use trigger::DESCRIPTOR as TRIGGER;
