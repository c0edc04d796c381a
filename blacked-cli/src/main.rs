//! Blacked - Shodan query CLI
//!
//! Searches Shodan by keyword, looks up a single IP, or resolves a URL and
//! looks up its address; results are saved to `sendata.json` (and optionally
//! `sendata.csv`) and printed as a table.

use blacked_core::{
    args::BlackedArgs,
    console::{Reporter, TerminalReporter},
    credentials::{resolve_api_key, CredentialStore, TerminalPrompt},
    output::export,
    pipeline::Pipeline,
    shodan::{HostIntel, ShodanClient},
};
use clap::error::ErrorKind;
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match BlackedArgs::from_iter_safe(env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(1),
            }
        }
    };

    init_tracing(args.verbose);
    let mut reporter = TerminalReporter::new(!args.no_color);

    match run(&args, &mut reporter).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            reporter.error(&format!("Error: {:#}", e));
            process::exit(1);
        }
    }
}

/// Main application logic; returns the process exit code
async fn run(args: &BlackedArgs, reporter: &mut TerminalReporter) -> anyhow::Result<i32> {
    // Mode is checked before anything touches the key file or the network.
    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            reporter.warn(&e.to_string());
            return Ok(1);
        }
    };

    let store = CredentialStore::new(&args.key_file);
    let api_key = match resolve_api_key(args.api_key.as_deref(), &store, &mut TerminalPrompt) {
        Ok(key) => key,
        Err(e) => {
            reporter.error(&e.to_string());
            return Ok(1);
        }
    };

    let client = ShodanClient::new(api_key)?;
    match client.check_account().await {
        Ok(info) => tracing::debug!(
            plan = ?info.plan,
            query_credits = ?info.query_credits,
            scan_credits = ?info.scan_credits,
            "API key accepted"
        ),
        Err(e) => {
            tracing::debug!(error = %e, "account check failed");
            reporter.error(&format!(
                "Invalid API key. Please check your {} ({})",
                store.path().display(),
                e
            ));
            return Ok(1);
        }
    }

    let mut pipeline = Pipeline::new(client, args.pipeline_options());
    let batch = pipeline.run(&mode, reporter).await;

    export(&batch, &args.export_options(), reporter)?;
    Ok(0)
}

/// Logs go to stderr; `RUST_LOG` overrides the level picked by `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "blacked_core=debug,blacked=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
