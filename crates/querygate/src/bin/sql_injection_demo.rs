//! Runs the SQL injection demo against an in-memory users table.

use clap::Parser;
use querygate::logging::{LogConfig, LogFormat};
use querygate::{Demo, DemoConfig};
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "sql-injection-demo", version, about)]
struct Cli {
    /// Seed for the injection RNG (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of tautology-injected queries to try
    #[arg(long, default_value_t = querygate::config::DEFAULT_INJECTION_ROUNDS)]
    rounds: usize,

    /// Log level filter; RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also write logs to this file, rotated daily
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log format: pretty or compact
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,
}

impl Cli {
    fn into_config(self) -> DemoConfig {
        let mut log = LogConfig::default()
            .with_level(self.log_level)
            .with_format(self.log_format);
        if let Some(path) = self.log_file {
            log = log.with_both(path);
        }

        let mut config = DemoConfig::default()
            .with_injection_rounds(self.rounds)
            .with_log(log);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn run() -> i32 {
    let config = Cli::parse().into_config();

    let _guard = match config.log.clone().init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return -1;
        }
    };

    let stdout = io::stdout();
    let mut demo = Demo::new(config, stdout.lock());
    match demo.run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Failed to write output: {}", e);
            -1
        }
    }
}

fn main() {
    let code = run();
    process::exit(code);
}
