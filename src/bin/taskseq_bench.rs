//! taskseq-bench - sequential vs partitioned offload latency demo.
//!
//! Usage: `taskseq-bench [COUNT]` where COUNT is a positive element count
//! (default 16384).

use std::env;
use std::process;

use taskseq::harness::{self, BenchConfig};
use taskseq::Error;

fn main() {
    let config = match BenchConfig::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ERROR: {err}");
            process::exit(1);
        }
    };

    match harness::run(&config) {
        Ok(report) => {
            // Validation failures are reported in the output, not in the
            // exit status.
            print!("{report}");
        }
        Err(err @ Error::DeviceFault { .. }) => {
            eprintln!("Caught a device fault:\n{err}");
            process::abort();
        }
        Err(err) => {
            eprintln!("ERROR: {err}");
            process::exit(1);
        }
    }
}
