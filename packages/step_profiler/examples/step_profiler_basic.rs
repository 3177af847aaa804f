//! Times a simulated request handler with a few branches, then prints both reports.
//!
//! Run with: `cargo run --example step_profiler_basic`.

use std::hint::black_box;
use std::thread;
use std::time::Duration;

use step_profiler::Profiler;

fn handle_request(profiler: &Profiler, request: u64) {
    let mut unit = profiler.begin("HandleRequest");

    thread::sleep(Duration::from_micros(request % 7));
    unit.step("parse");

    if request % 2 == 0 {
        thread::sleep(Duration::from_micros(request % 13));
        unit.step("cache hit");
    } else {
        thread::sleep(Duration::from_micros(50 + request % 31));
        unit.step("cache miss");
    }

    if request % 10 == 0 {
        unit.memo(&format!("request={request}, slow path"));
    }

    black_box(request);
    unit.end();
}

fn main() {
    let profiler = Profiler::new();

    println!("=== Raw log lines ===");
    for request in 0..5 {
        handle_request(&profiler, request);
    }
    profiler.dump();

    println!();
    println!("=== Statistics ===");
    for request in 0..100 {
        handle_request(&profiler, request);
    }
    profiler.analyze();
}
