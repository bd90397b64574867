//! ChainSig CLI: resolve calldata and event logs against signature catalogs.
//!
//! # Commands
//! ```text
//! chainsig selector     <SIGNATURE> [--event]
//! chainsig decode-call  --calldata <HEX> [--json]
//! chainsig decode-log   --topics <HEX>... [--data <HEX>] [--json]
//! chainsig decode-batch --file <PATH> [--event] [--json]
//! chainsig catalog      [--collisions] [--json]
//! chainsig encode       --signature <SIG> --args <JSON-ARRAY>
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chainsig_abi::{encode_call, DecodeOptions};
use chainsig_core::{DecodedValue, SignatureKind, SignatureRecord};
use chainsig_observability::{init_tracing, ResolveMetrics};
use chainsig_registry::{builtin, source, Catalog, SignatureRegistry};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, warn};

mod cmd_catalog;
mod config;

use config::Config;

#[derive(Parser)]
#[command(
    name = "chainsig",
    about = "Selector-based ABI decoder with collision reporting",
    long_about = "
ChainSig matches the selector of calldata or an event log against a catalog of
known signatures and decodes the payload against every candidate. Selector
collisions are reported as ambiguous instead of guessed.

ENVIRONMENT VARIABLES:
  RUST_LOG    Overrides the configured log filter
",
    version
)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra function signature files (text or JSON)
    #[arg(long = "functions", global = true)]
    functions: Vec<PathBuf>,

    /// Extra event signature files (text or JSON)
    #[arg(long = "events", global = true)]
    events: Vec<PathBuf>,

    /// Do not load the bundled signature table
    #[arg(long, global = true)]
    no_builtin: bool,

    /// Accept payload bytes past the end of the decoded layout
    #[arg(long, global = true)]
    allow_trailing: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the selector of a signature
    Selector {
        /// Human-readable signature, e.g. "transfer(address,uint256)"
        signature: String,
        /// Treat the signature as an event (32-byte topic)
        #[arg(long)]
        event: bool,
    },

    /// Resolve transaction calldata
    #[command(name = "decode-call")]
    DecodeCall {
        /// Calldata (0x-prefixed hex)
        #[arg(long)]
        calldata: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve an event log from its topics and data
    #[command(name = "decode-log")]
    DecodeLog {
        /// topics[0] = event selector, topics[1..] = indexed params
        #[arg(long, num_args = 1.., required = true)]
        topics: Vec<String>,
        /// Non-indexed params (hex, 0x-prefixed)
        #[arg(long, default_value = "0x")]
        data: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a file of hex inputs, one per line, in parallel
    #[command(name = "decode-batch")]
    DecodeBatch {
        /// File with one hex input per line
        #[arg(long)]
        file: PathBuf,
        /// Inputs are event logs in `topic0 ‖ data` form
        #[arg(long)]
        event: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the loaded catalog
    Catalog {
        /// Only show selectors shared by more than one signature
        #[arg(long)]
        collisions: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode a function call to calldata
    Encode {
        /// Function signature, e.g. "transfer(address,uint256)"
        #[arg(long)]
        signature: String,
        /// JSON array of arguments, e.g. '["0xabc...", "1000000"]'
        #[arg(long)]
        args: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.add_files(SignatureKind::Function, &cli.functions);
    config.add_files(SignatureKind::Event, &cli.events);
    if cli.no_builtin {
        config.builtin = false;
    }
    if cli.allow_trailing {
        config.allow_trailing_bytes = true;
    }
    match cli.verbose {
        0 => {}
        1 => config.log.level = "info".into(),
        2 => config.log.level = "debug".into(),
        _ => config.log.level = "trace".into(),
    }
    // a subscriber installed by an embedding process wins
    let _ = init_tracing(&config.log);

    let meter = opentelemetry::global::meter("chainsig");
    let metrics = ResolveMetrics::new(&meter);

    match cli.command {
        Commands::Selector { signature, event } => cmd_selector(&signature, event),

        Commands::DecodeCall { calldata, json } => {
            let registry = build_registry(&config, &metrics)?;
            let bytes = parse_hex(&calldata).context("invalid calldata hex")?;
            let outcome = registry.resolve_call(&bytes);
            metrics.record_outcome(SignatureKind::Function, &outcome);
            print_outcome(&outcome, json)
        }

        Commands::DecodeLog { topics, data, json } => {
            let registry = build_registry(&config, &metrics)?;
            let topics = topics
                .iter()
                .map(|t| parse_topic(t))
                .collect::<Result<Vec<_>>>()?;
            let data = parse_hex(&data).context("invalid data hex")?;
            let outcome = registry.resolve_log(&topics, &data);
            metrics.record_outcome(SignatureKind::Event, &outcome);
            print_outcome(&outcome, json)
        }

        Commands::DecodeBatch { file, event, json } => {
            let registry = build_registry(&config, &metrics)?;
            cmd_decode_batch(&registry, &metrics, &file, event, json)
        }

        Commands::Catalog { collisions, json } => {
            let registry = build_registry(&config, &metrics)?;
            cmd_catalog::run(&registry.snapshot(), collisions, json)
        }

        Commands::Encode { signature, args } => cmd_encode(&signature, &args),
    }
}

// ─── Registry construction ───────────────────────────────────────────────────

fn build_registry(config: &Config, metrics: &ResolveMetrics) -> Result<SignatureRegistry> {
    let mut catalog = if config.builtin {
        builtin::catalog()
    } else {
        Catalog::new()
    };

    for src in &config.sources {
        let report = source::ingest_file(&mut catalog, src.kind, &src.path, src.name.as_deref())
            .with_context(|| format!("load {} signatures", src.kind))?;
        if !report.is_clean() {
            warn!(
                path = %src.path.display(),
                rejected = report.rejected.len(),
                "some signatures were rejected"
            );
        }
    }

    if catalog.is_empty() {
        bail!("no signatures loaded: enable the builtin table or pass --functions/--events");
    }
    info!(records = catalog.len(), "catalog ready");
    metrics.record_publish(catalog.len());

    let options = DecodeOptions {
        allow_trailing_bytes: config.allow_trailing_bytes,
        ..DecodeOptions::default()
    };
    Ok(SignatureRegistry::with_options(catalog, options))
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_selector(signature: &str, event: bool) -> Result<()> {
    let kind = if event {
        SignatureKind::Event
    } else {
        SignatureKind::Function
    };
    let record = SignatureRecord::parse(kind, signature)?;
    println!("{}  {}", record.selector(), record.human_signature());
    Ok(())
}

fn cmd_decode_batch(
    registry: &SignatureRegistry,
    metrics: &ResolveMetrics,
    file: &Path,
    event: bool,
    as_json: bool,
) -> Result<()> {
    let kind = if event {
        SignatureKind::Event
    } else {
        SignatureKind::Function
    };
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("read input file '{}'", file.display()))?;
    let inputs = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
        .map(|(n, l)| parse_hex(l).with_context(|| format!("line {n}: invalid hex")))
        .collect::<Result<Vec<_>>>()?;

    let outcomes = registry.resolve_batch(kind, &inputs);
    metrics.record_batch(kind, &outcomes);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for (i, outcome) in outcomes.iter().enumerate() {
            println!("#{i} {}", outcome.kind_str());
            print!("{outcome}");
        }
    }
    Ok(())
}

fn cmd_encode(signature: &str, args_json: &str) -> Result<()> {
    let record = SignatureRecord::parse(SignatureKind::Function, signature)?;
    let args: Vec<serde_json::Value> =
        serde_json::from_str(args_json).context("args must be a JSON array")?;
    if args.len() != record.params().len() {
        bail!(
            "{} expects {} arguments, got {}",
            record.human_signature(),
            record.params().len(),
            args.len()
        );
    }

    let values = record
        .params()
        .iter()
        .zip(&args)
        .enumerate()
        .map(|(i, (param, arg))| {
            DecodedValue::from_json(&param.ty, arg)
                .with_context(|| format!("argument {}", record.param_name(i)))
        })
        .collect::<Result<Vec<_>>>()?;

    let calldata = encode_call(&record, &values)?;
    println!("0x{}", hex::encode(&calldata));
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn print_outcome(outcome: &chainsig_registry::DecodeOutcome, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        print!("{outcome}");
    }
    Ok(())
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    Ok(hex::decode(s.strip_prefix("0x").unwrap_or(s))?)
}

fn parse_topic(s: &str) -> Result<[u8; 32]> {
    let bytes = parse_hex(s).with_context(|| format!("invalid topic hex '{s}'"))?;
    let len = bytes.len();
    <[u8; 32]>::try_from(bytes)
        .map_err(|_| anyhow::anyhow!("topic '{s}' is {len} bytes, expected 32"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "chainsig",
            "decode-call",
            "--calldata",
            "0xa9059cbb",
            "--no-builtin",
            "--functions",
            "a.txt",
            "-vv",
        ])
        .unwrap();
        assert!(cli.no_builtin);
        assert_eq!(cli.functions, vec![PathBuf::from("a.txt")]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn topics_must_be_32_bytes() {
        assert!(parse_topic("0x1234").is_err());
        assert!(parse_topic(&format!("0x{}", "00".repeat(32))).is_ok());
    }

    #[test]
    fn builtin_registry_resolves_transfer() {
        let meter = opentelemetry::global::meter("chainsig-cli-test");
        let metrics = ResolveMetrics::new(&meter);
        let registry = build_registry(&Config::default(), &metrics).unwrap();
        let calldata = parse_hex(
            "0xa9059cbb\
             0000000000000000000000000000000000000000000000000000000000000001\
             00000000000000000000000000000000000000000000000000000000000003e8",
        )
        .unwrap();
        let outcome = registry.resolve_call(&calldata);
        assert!(outcome.is_unique(), "{outcome}");
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let meter = opentelemetry::global::meter("chainsig-cli-test");
        let metrics = ResolveMetrics::new(&meter);
        let config = Config {
            builtin: false,
            ..Config::default()
        };
        assert!(build_registry(&config, &metrics).is_err());
    }
}
