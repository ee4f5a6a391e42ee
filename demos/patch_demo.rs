//! Live patching while a processing thread runs
//!
//! Run with: cargo run --example patch_demo
//! More detail: RUST_LOG=patchbay=debug cargo run --example patch_demo

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{sleep, spawn};
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use patchbay::{Event, PatchSettings, Patcher};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = PatchSettings::default();
    let rate = settings.sample_rate as f64;
    let block = settings.block_size as f64;
    let (mut patcher, mut processor) = Patcher::new(settings);

    // metro -> counter -> route; the counter is a float fed back through `+ 1`
    let metro = patcher.create_object("metro", "250")?;
    let counter = patcher.create_object("float", "0")?;
    let step = patcher.create_object("+", "1")?;
    let route = patcher.create_object("route", "4.000000 8.000000")?;
    let four = patcher.create_object("print", "four")?;
    let eight = patcher.create_object("print", "eight")?;
    let count = patcher.create_object("print", "count")?;

    patcher.connect(metro, 0, counter, 0)?;
    patcher.connect(counter, 0, step, 0)?;
    patcher.connect(step, 0, counter, 1)?;
    patcher.connect(counter, 0, route, 0)?;
    patcher.connect(route, 0, four, 0)?;
    patcher.connect(route, 1, eight, 0)?;
    patcher.connect(route, 2, count, 0)?;
    patcher.set_name(metro, Some("clock"))?;

    // processing thread, paced like an audio callback
    let running = Arc::new(AtomicBool::new(true));
    let worker = {
        let running = running.clone();
        spawn(move || {
            let start = Instant::now();
            let mut blocks = 0u64;
            while running.load(Ordering::Relaxed) {
                let target = (start.elapsed().as_secs_f64() * rate / block) as u64 + 4;
                while blocks < target {
                    processor.process();
                    blocks += 1;
                }
                sleep(Duration::from_micros(500));
            }
        })
    };

    patcher.pass_bang("clock");
    let start = Instant::now();
    let mut rewired = false;
    while start.elapsed() < Duration::from_secs(3) {
        for event in patcher.poll() {
            match event {
                Event::Print { label, message, .. } => println!("{:>6}: {}", label, message),
                Event::Fault(err) => eprintln!("fault: {}", err),
                Event::ArgsRequested { .. } => {}
            }
        }

        // halfway through, speed the clock up without stopping anything
        if !rewired && start.elapsed() > Duration::from_millis(1500) {
            patcher.set_args(metro, "100")?;
            patcher.pass_bang("clock");
            rewired = true;
        }
        sleep(Duration::from_millis(10));
    }

    running.store(false, Ordering::Relaxed);
    worker.join().map_err(|_| "processing thread panicked")?;

    println!("saved patch:\n{}", patcher.dump()?);
    Ok(())
}
