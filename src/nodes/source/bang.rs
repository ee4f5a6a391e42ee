use crate::message::{KindSet, Message};
use crate::node::{Object, Outbox, Shape};
use crate::registry::ObjectDescriptor;

pub(crate) const DESCRIPTOR: ObjectDescriptor = ObjectDescriptor {
    name: "bang",
    description: "Output a bang for any input",
    params: &[],
    shape: |_| Shape::new(1, 1),
    factory: |_| Box::new(Bang),
};

/// Turns anything into a bang.
pub struct Bang;

impl Object for Bang {
    fn accepts(&self, inlet: usize) -> KindSet {
        if inlet == 0 {
            KindSet::ANY
        } else {
            KindSet::NONE
        }
    }

    fn receive(&mut self, _inlet: usize, _msg: &Message, out: &mut Outbox) {
        out.bang(0);
    }
}
