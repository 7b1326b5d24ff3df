//! BLS12-381 Vanity Public Key Search CLI
//!
//! Usage:
//!   bls-vanity 01dead01          # Full (96-byte) key starting with 01dead01
//!   bls-vanity -f compressed a0  # Compressed (48-byte) key starting with a0
//!   bls-vanity -w 4 -m 10000 00  # 4 workers, give up after 10000 keys each

use std::process;

use clap::Parser;
use tracing::warn;

use bls_vanity::worker::format_number;
use bls_vanity::{Config, ConfigError, SearchOutcome, SearchReport, WorkerPool};

fn main() {
    bls_vanity::log::init_log();

    let config = Config::parse();

    // Validate configuration
    let params = match config.validate() {
        Ok(params) => params,
        Err(e) => {
            report_config_error(&e);
            process::exit(1);
        }
    };

    // Print startup info
    println!("BLS12-381 Vanity Key Search");
    println!("===========================");
    println!("Prefix:     {} ({})", params.prefix.to_hex(), params.prefix.format());
    println!("Difficulty: {}", params.prefix.difficulty_description());
    println!("Workers:    {}", params.workers);
    if let Some(max) = params.max_attempts {
        println!("Limit:      {} keys per worker", format_number(max));
    }
    println!();

    let pool = WorkerPool::new(params);

    // Set up ctrl-c handler
    let cancel = pool.cancel_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        cancel.cancel();
    }) {
        warn!("could not install Ctrl-C handler: {}", e);
    }

    println!("Searching... (Press Ctrl+C to stop)\n");

    let report = match pool.run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Search failed: {}", e);
            process::exit(2);
        }
    };

    let code = match &report.outcome {
        SearchOutcome::Found(result) => {
            println!("secret key {}", result.secret_key);
            println!("public key {}", result.public_key);
            0
        }
        SearchOutcome::NotFound => {
            println!("No matching key within the attempt limit.");
            3
        }
        SearchOutcome::Interrupted => {
            println!("\nStopped by user.");
            130
        }
    };

    print_stats(&report);
    process::exit(code);
}

fn report_config_error(err: &ConfigError) {
    eprintln!("Configuration error: {}", err);
    if let ConfigError::InvalidFirstByte { allowed, .. } = err {
        println!("Valid first bytes:");
        for byte in allowed {
            println!("0x{:02x}", byte);
        }
    }
}

fn print_stats(report: &SearchReport) {
    println!("\n--- Final Statistics ---");
    println!("Workers:              {}", report.workers);
    println!("Total keys tried:     {}", format_number(report.attempts));
    println!("Time elapsed:         {:.2}s", report.elapsed.as_secs_f64());
    println!(
        "Average speed:        {}/s",
        format_number(report.keys_per_second() as u64)
    );
}
