//  Copyright 2026 EBEE Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! The trace-replay benchmark CLI `spec.md` §6 describes: partitions a
//! trace file round-robin across `-n` worker threads, replays it against
//! an in-process cache driven by `ebee-core`, and writes one CSV per
//! worker. See `DESIGN.md` for why `-H`/`-p` are accepted but never used
//! to open a socket.

mod trace;
mod worker;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ebee_common::config::EbeeConfig;
use ebee_hostcache::HostCache;

/// Trace-replay benchmark for the embedding-based eviction engine.
#[derive(Parser, Debug)]
#[command(name = "ebee-bench", version, about)]
struct Cli {
    /// Cache host. Accepted for compatibility with the documented flag
    /// surface and with traces generated for the original networked tool;
    /// no socket is opened, since the host cache is run in-process.
    #[arg(short = 'H', long = "host")]
    host: String,

    /// Cache port. Same compatibility note as `--host`.
    #[arg(short = 'p', long = "port")]
    port: u16,

    /// Number of worker threads to partition the trace across.
    #[arg(short = 'n', long = "num-workers")]
    num_workers: usize,

    /// Whitespace-separated `timestamp key size latency` trace file.
    #[arg(short = 't', long = "trace-file")]
    trace_file: PathBuf,

    /// Experiment name, used as the CSV filename prefix.
    #[arg(short = 'N', long = "name", default_value = "exp")]
    name: String,

    /// Folder to write `<name>_<worker-id>.csv` files into. No CSV is
    /// written if omitted.
    #[arg(short = 'l', long = "log-folder")]
    log_folder: Option<PathBuf>,

    /// Value size used for the SET issued on a miss, matching the
    /// original trace client's fixed-size SET regardless of the trace's
    /// own size column.
    #[arg(long, default_value = "4KiB")]
    value_size: bytesize::ByteSize,

    /// Sample pool / embedding map capacity (EBEE's `pool_capacity`, and
    /// the underlying store's item capacity).
    #[arg(long, default_value_t = EbeeConfig::default().pool_capacity)]
    capacity: usize,

    /// Lock-shard count (EBEE's `S`).
    #[arg(long, default_value_t = EbeeConfig::default().lock_shards)]
    shards: usize,

    /// Candidates sampled per eviction attempt (EBEE's `K`).
    #[arg(long, default_value_t = EbeeConfig::default().sample_count)]
    sample_count: usize,

    /// Optional TOML file overriding the rest of `EbeeConfig`'s tunables
    /// (ring length, alpha, additive-vs-convex update). CLI flags above
    /// take precedence over anything this file sets.
    #[arg(long)]
    config_file: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<EbeeConfig> {
    let mut config = match &cli.config_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => EbeeConfig::default(),
    };
    config.pool_capacity = cli.capacity;
    config.lock_shards = cli.shards;
    config.sample_count = cli.sample_count;
    Ok(config)
}

/// Mirrors the original trace client's own argument sanity check
/// (`host.empty() || port <= 0 || num_workers <= 0 || trace_file.empty()`),
/// since clap's required-ness alone doesn't rule out an empty `-H ""` or
/// a `-n 0`.
fn validate(cli: &Cli) -> Result<()> {
    if cli.host.trim().is_empty() {
        anyhow::bail!("--host must not be empty");
    }
    if cli.port == 0 {
        anyhow::bail!("--port must be nonzero");
    }
    if cli.num_workers == 0 {
        anyhow::bail!("--num-workers must be nonzero");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    validate(&cli)?;
    tracing::info!(
        target: "ebee::bench",
        host = %cli.host,
        port = cli.port,
        workers = cli.num_workers,
        trace_file = %cli.trace_file.display(),
        "ebee-bench starting in-process; -H/-p recorded for compatibility, no socket opened"
    );

    let config = load_config(&cli)?;
    let workloads = trace::load(&cli.trace_file, cli.num_workers)?;
    let cache = Arc::new(HostCache::new(cli.shards, cli.capacity, config));
    let io = Arc::new(Mutex::new(()));
    let start = Instant::now();
    let value_size = cli.value_size.as_u64() as usize;

    let mut handles = Vec::with_capacity(workloads.len());
    for (worker_id, workload) in workloads.into_iter().enumerate() {
        let cache = cache.clone();
        let io = io.clone();
        let name = cli.name.clone();
        let log_folder = cli.log_folder.clone();
        handles.push(std::thread::spawn(move || -> Result<()> {
            let logs = worker::run_worker(cache, worker_id, workload, start, value_size, io);
            if let Some(folder) = log_folder {
                worker::write_csv(&folder, &name, worker_id, &logs)?;
            }
            Ok(())
        }));
    }

    for handle in handles {
        handle
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;
    }
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run(cli) {
        eprintln!("ebee-bench: {err:#}");
        std::process::exit(1);
    }
}
