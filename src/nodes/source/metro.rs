//! Metronome - bangs at a fixed interval, at block resolution

use crate::message::{first_token, KindSet, Message};
use crate::node::{Object, Outbox, ProcessContext, Shape};
use crate::params::{ParamKind, ParamSpec};
use crate::registry::ObjectDescriptor;

const PARAMS: &[ParamSpec] = &[ParamSpec::optional("interval", ParamKind::Float, "1000")];

pub(crate) const DESCRIPTOR: ObjectDescriptor = ObjectDescriptor {
    name: "metro",
    description: "Bang every `interval` milliseconds while running; left inlet starts/stops, right inlet sets the interval",
    params: PARAMS,
    shape: |_| Shape::new(2, 1),
    factory: |p| Box::new(Metro::new(p.float("interval").unwrap_or(1000.0))),
};

/// Emits bangs from [`Object::tick`].
///
/// Bang or any nonzero number on the left inlet starts it (and bangs
/// immediately); zero or `stop` stops it.
pub struct Metro {
    interval_ms: f32,
    running: bool,
    /// Samples elapsed since the last bang
    elapsed: f64,
}

impl Metro {
    pub fn new(interval_ms: f32) -> Self {
        Self {
            interval_ms,
            running: false,
            elapsed: 0.0,
        }
    }

    fn start(&mut self, out: &mut Outbox) {
        self.running = true;
        self.elapsed = 0.0;
        out.bang(0);
    }
}

impl Object for Metro {
    fn accepts(&self, inlet: usize) -> KindSet {
        match inlet {
            0 => KindSet::ANY,
            1 => KindSet::NUMBER,
            _ => KindSet::NONE,
        }
    }

    fn receive(&mut self, inlet: usize, msg: &Message, out: &mut Outbox) {
        if inlet == 1 {
            if let Some(v) = msg.as_f32() {
                self.interval_ms = v;
            }
            return;
        }
        match msg {
            Message::Bang => self.start(out),
            Message::List(text) if first_token(text) == "stop" => self.running = false,
            other => match other.as_f32() {
                Some(v) if v != 0.0 => self.start(out),
                _ => self.running = false,
            },
        }
    }

    fn tick(&mut self, ctx: &ProcessContext, out: &mut Outbox) {
        if !self.running {
            return;
        }
        // never faster than once per block
        let period = (self.interval_ms as f64 * ctx.sample_rate as f64 / 1000.0).max(ctx.block_size as f64);
        self.elapsed += ctx.block_size as f64;
        if self.elapsed >= period {
            self.elapsed -= period;
            out.bang(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: ProcessContext = ProcessContext {
        sample_rate: 1000,
        block_size: 10,
    };

    fn run(metro: &mut Metro, ticks: usize) -> usize {
        let mut out = Outbox::default();
        for _ in 0..ticks {
            metro.tick(&CTX, &mut out);
        }
        out.sent.len()
    }

    #[test]
    fn bangs_on_interval_once_started() {
        let mut metro = Metro::new(50.0);
        assert_eq!(run(&mut metro, 20), 0);

        let mut out = Outbox::default();
        metro.receive(0, &Message::Int(1), &mut out);
        assert_eq!(out.sent, vec![(0, Message::Bang)]);

        // 50ms at 1kHz is 5 blocks of 10 samples
        assert_eq!(run(&mut metro, 20), 4);

        metro.receive(0, &"stop".into(), &mut out);
        assert_eq!(run(&mut metro, 20), 0);
    }

    #[test]
    fn interval_is_clamped_to_one_block() {
        let mut metro = Metro::new(0.0);
        let mut out = Outbox::default();
        metro.receive(0, &Message::Bang, &mut out);
        assert_eq!(run(&mut metro, 7), 7);
    }
}
