// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Turn an Intel DCAP quote into a zero-knowledge proof

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::{fs, path::PathBuf};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};
use zkdcap::{
    log::{setup_logging, LogLevelParser},
    prover::config::ZkProofConfig,
    Collateral, QuoteParser, ZkProofClient, ZkType,
};

#[derive(Parser, Debug)]
#[command(author = "Matter Labs", version, about = "DCAP quote to zk proof", long_about = None)]
struct Arguments {
    /// Log level for the log output.
    /// Valid values are: `off`, `error`, `warn`, `info`, `debug`, `trace`
    #[arg(long, default_value_t = LevelFilter::WARN, value_parser = LogLevelParser)]
    log_level: LevelFilter,
    #[clap(subcommand)]
    command: SubCommands,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Quote file, raw or hex encoded
    #[arg(long)]
    quote: PathBuf,
}

#[derive(Args, Debug)]
struct ProveArgs {
    /// Quote file, raw or hex encoded
    #[arg(long)]
    quote: PathBuf,
    /// Collateral JSON with hex encoded fields
    #[arg(long)]
    collateral: PathBuf,
    /// Proof system: `risc0` or `succinct`
    #[arg(long, env = "ZKDCAP_ZK_TYPE")]
    zk_type: ZkType,
    /// Backend configuration file, overridden by `ZKDCAP__*` variables
    #[arg(long, env = "ZKDCAP_CONFIG")]
    config: Option<PathBuf>,
    /// Write the proof JSON here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum SubCommands {
    /// Print the layout and collateral lookup keys of a quote
    Parse(ParseArgs),
    /// Prove a quote with its collateral
    Prove(ProveArgs),
}

/// Accept raw quotes as well as hex text with an optional `0x` prefix
fn read_quote(path: &PathBuf) -> Result<Vec<u8>> {
    let data =
        fs::read(path).with_context(|| format!("Failed to read quote {}", path.display()))?;
    let text = match std::str::from_utf8(&data) {
        Ok(text) => text.trim(),
        Err(_) => return Ok(data),
    };
    let text = text.strip_prefix("0x").unwrap_or(text);
    match hex::decode(text) {
        Ok(quote) => Ok(quote),
        Err(_) => Ok(data),
    }
}

fn parse(args: &ParseArgs) -> Result<()> {
    let quote = read_quote(&args.quote)?;
    let parser = QuoteParser::new(&quote).map_err(zkdcap::Error::from)?;
    let keys = parser.collateral_keys().map_err(zkdcap::Error::from)?;
    let spec = parser.spec();

    let summary = json!({
        "version": spec.version(),
        "tee_type": format!("{:#x}", spec.tee_type()),
        "layout": spec.to_string(),
        "cert_data_offset": parser.cert_data_offset(),
        "fmspc": keys.fmspc,
        "pck_ca": keys.pck_ca,
        "pck_ca_code": keys.pck_ca.code(),
        "tcb_type": keys.tcb_type.code(),
        "tcb_version": keys.tcb_version,
        "enclave_id_type": keys.enclave_id_type.code(),
        "enclave_id_version": keys.enclave_id_version,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn prove(args: &ProveArgs, token: CancellationToken) -> Result<()> {
    let quote = read_quote(&args.quote)?;
    QuoteParser::new(&quote).map_err(zkdcap::Error::from)?;

    let collateral: Collateral = serde_json::from_slice(
        &fs::read(&args.collateral)
            .with_context(|| format!("Failed to read {}", args.collateral.display()))?,
    )
    .context("Failed to parse collateral")?;

    let config = ZkProofConfig::load(args.config.as_deref()).context("Failed to load config")?;
    let client = ZkProofClient::new(&config).map_err(zkdcap::Error::from)?;

    let proof = client
        .prove_quote(&token, args.zk_type, &quote, &collateral)
        .await
        .map_err(zkdcap::Error::from)?;
    info!(zk_type = %proof.zk_type, output_len = proof.output.len(), "proof generated");

    let out = serde_json::to_string_pretty(&proof)?;
    match &args.output {
        Some(path) => fs::write(path, out)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{out}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();
    setup_logging(env!("CARGO_CRATE_NAME"), args.log_level)?;

    let result = match &args.command {
        SubCommands::Parse(parse_args) => parse(parse_args),
        SubCommands::Prove(prove_args) => {
            let token = CancellationToken::new();
            let canceller = token.clone();
            tokio::spawn(async move {
                if signal::ctrl_c().await.is_ok() {
                    info!("Stop signal received, cancelling");
                    canceller.cancel();
                }
            });
            prove(prove_args, token).await
        }
    };

    if let Err(err) = &result {
        match err.downcast_ref::<zkdcap::Error>() {
            Some(e) => error!(stage = e.stage(), "{e}"),
            None => error!("{err:#}"),
        }
    }
    result
}
