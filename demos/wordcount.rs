//! Runs the map phase of a word count over the files given on the command line.
//!
//!     RUST_LOG=mrpartition=debug cargo run --example wordcount -- [--config job.toml] FILE...
//!
//! Intermediate files end up in the configured directory (default: current directory).

use std::env;
use std::process;

use mrpartition::{ClosureMapper, MEmitter, MRController, MRParameters, TransformError};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn word_count(e: &mut MEmitter, _: &str, content: &str) -> Result<(), TransformError> {
    for w in content.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        e.emit(w.to_lowercase(), "1");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let params = if args.first().map(|a| a == "--config").unwrap_or(false) && args.len() >= 2 {
        let file = args.remove(1);
        args.remove(0);
        match MRParameters::from_file(&file) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "bad configuration");
                process::exit(2);
            }
        }
    } else {
        MRParameters::new().set_job_name("wc")
    };

    if args.is_empty() {
        eprintln!("usage: wordcount [--config job.toml] FILE...");
        process::exit(2);
    }

    let ctl = match MRController::new(ClosureMapper::new(word_count), params) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "cannot start map phase");
            process::exit(2);
        }
    };

    let mut failed = false;
    for (i, r) in ctl.run_map_phase(&args).into_iter().enumerate() {
        match r {
            Ok(st) => println!("map task {}: {} records, {} bytes, {} empty shards, took {}",
                               i,
                               st.total_records(),
                               st.total_bytes(),
                               st.empty_shards().len(),
                               st.elapsed),
            Err(e) => {
                failed = true;
                println!("map task {} failed in {} stage: {}", i, e.stage(), e);
            }
        }
    }
    if failed {
        process::exit(1);
    }
}
