// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Warden runtime: hosts the AFK service against a simulated server.
//!
//! Reads one JSON object per line from stdin, for example:
//!
//! ```text
//! {"op":"join","actor":{"id":"1","name":"Alpha","secondaryId":"eos-1"}}
//! {"op":"wait","ms":5000}
//! {"op":"setGroup","actorId":"1","group":"2"}
//! ```

mod sim;

use anyhow::{Context, Result};
use clap::Parser;
use sim::{FeedLine, SimulatedServer};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use warden_control::{AfkConfig, AfkService};

#[derive(Parser, Debug)]
#[command(name = "warden-runtime", version, about)]
struct Args {
    /// JSON configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long to keep the service running after the feed ends, in milliseconds.
    #[arg(long, default_value_t = 0)]
    linger: u64,
}

fn load_config(path: Option<&PathBuf>) -> Result<AfkConfig> {
    let Some(path) = path else {
        return Ok(AfkConfig::default());
    };
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    AfkConfig::from_json(&document)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    log::info!("Warden runtime starting with {:?}", config);

    let server = Arc::new(SimulatedServer::new());
    let mut service = AfkService::new(config, server.clone(), server.clone())
        .context("Failed to create the AFK service")?;
    service.start();
    let events = service.event_sender();

    for (number, line) in std::io::stdin().lock().lines().enumerate() {
        let line = line.context("Failed to read the feed")?;
        if line.trim().is_empty() {
            continue;
        }

        let feed: FeedLine = match serde_json::from_str(&line) {
            Ok(feed) => feed,
            Err(e) => {
                log::warn!("Skipping feed line {}: {e}", number + 1);
                continue;
            }
        };

        if let Some(pause) = feed.pause() {
            thread::sleep(pause);
        } else if let Some(event) = server.apply(feed) {
            events
                .send(event)
                .context("AFK service stopped accepting events")?;
        }
    }

    thread::sleep(Duration::from_millis(args.linger));
    service.stop();
    log::info!(
        "Warden runtime stopped ({} connected, {} tracked)",
        server.population(),
        service.tracked_ids().len()
    );
    Ok(())
}
