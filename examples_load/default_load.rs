use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use ecs_trace_log::ecs::ecs_handler;
use ecs_trace_log::record::attr;
use ecs_trace_log::trace::TraceHandler;
use ecs_trace_log::Logger;

fn main() {
    let logger = Arc::new(Logger::new(TraceHandler::new(ecs_handler(io::sink()))));

    let threads: u64 = 4;
    let n: u64 = 100_000;
    let start = Instant::now();

    let workers: Vec<_> = (0..threads)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..n {
                    if let Err(e) = logger.info(None, "default load test", [attr("thread", t), attr("iteration", i)]) {
                        eprintln!("log call failed: {}", e);
                    }
                }
            })
        })
        .collect();
    for w in workers {
        let _ = w.join();
    }

    let total = threads * n;
    let elapsed = start.elapsed();
    println!("default config: encoded {} records in {:?} (~{:.0} rec/s)",
        total,
        elapsed,
        total as f64 / elapsed.as_secs_f64()
    );
}
