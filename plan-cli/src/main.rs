// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI for compiling and inspecting the federation deployment plan

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use federation_planner::{FederationStack, StackConfig};
use slog::debug;

/// Compile the SAML federation deployment plan
#[derive(Debug, Parser)]
struct FederationPlanApp {
    /// Path to a TOML stack configuration; PoC defaults are used if omitted
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Log at info level instead of warn
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: FederationPlanCommands,
}

#[derive(Debug, Subcommand)]
enum FederationPlanCommands {
    /// Render the full plan as JSON
    Synth {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<Utf8PathBuf>,
    },
    /// Print the named outputs (the authorize URLs)
    Outputs,
    /// Print the provisioning order, one logical id per line
    Order,
}

fn main() -> Result<(), anyhow::Error> {
    let args = FederationPlanApp::parse();

    let level = if args.verbose {
        dropshot::ConfigLoggingLevel::Info
    } else {
        dropshot::ConfigLoggingLevel::Warn
    };
    let log = dropshot::ConfigLogging::StderrTerminal { level }
        .to_logger("federation-plan")
        .context("failed to create logger")?;

    let config = match &args.config {
        Some(path) => StackConfig::from_file(path)
            .with_context(|| format!("loading stack config from {path:?}"))?,
        None => StackConfig::default(),
    };
    debug!(log, "loaded stack config"; "providers" => config.providers.len());

    let plan = FederationStack::plan(&log, &config)?;

    match args.command {
        FederationPlanCommands::Synth { output } => {
            let rendered = serde_json::to_string_pretty(&plan)
                .context("serializing plan")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered).with_context(|| {
                        format!("writing plan to {path:?}")
                    })?;
                }
                None => println!("{rendered}"),
            }
        }
        FederationPlanCommands::Outputs => {
            for (name, value) in &plan.outputs {
                println!("{name}: {value}");
            }
        }
        FederationPlanCommands::Order => {
            for id in &plan.provisioning_order {
                println!("{id}");
            }
        }
    }

    Ok(())
}
