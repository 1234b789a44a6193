//! arachne - command-line client for the Arachne scenario-management server.
//!
//! Lists and manages simulation cases (create, clone, import, export, lock,
//! unlock, advance), requests comparisons between two cases, and renders
//! the causal chain behind any compared output variable.

use arachne::{Client, Config, output, poll};
use arachne_core::{Chain, OutputIndex, SIG_LEVELS};
use clap::{Parser, Subcommand};
use eyre::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Command-line client for the Arachne scenario server.
#[derive(Debug, Parser)]
#[command(name = "arachne", version, about)]
struct Cli {
    /// Path to the config file (default: .config/arachne/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server base URL (overrides the config file)
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show server version and uptime
    Status,

    /// List the loaded cases
    Cases,

    /// List the scenario files on the server
    Files,

    /// List the computed comparisons
    Comps,

    /// Show one case's metadata and history variables
    Case {
        case_id: String,
    },

    /// Show one history variable's time series
    History {
        case_id: String,
        varname: String,
        /// Key-column selection, e.g. --key n=N1 (repeatable)
        #[arg(long = "key", value_name = "KEY=VALUE", value_parser = parse_key)]
        keys: Vec<(String, String)>,
        /// First week of the range
        #[arg(long, default_value_t = 0)]
        t1: u64,
        /// Last week of the range (default: the case's current week)
        #[arg(long)]
        t2: Option<u64>,
    },

    /// Create a brand new scenario
    New {
        /// Case to replace instead of allocating a new ID
        #[arg(long)]
        replace: Option<String>,
        /// Long name for the new case
        #[arg(long)]
        longname: Option<String>,
    },

    /// Clone an existing case
    Clone {
        source: String,
        #[arg(long)]
        replace: Option<String>,
        #[arg(long)]
        longname: Option<String>,
    },

    /// Import a scenario file into a case
    Import {
        filename: String,
        #[arg(long)]
        replace: Option<String>,
        #[arg(long)]
        longname: Option<String>,
    },

    /// Export a case to a scenario file
    Export {
        case_id: String,
        filename: String,
    },

    /// Remove a case from the server
    Remove {
        case_id: String,
    },

    /// Lock a case's scenario for simulation
    Lock {
        case_id: String,
        /// Return immediately instead of following the case until it settles
        #[arg(long)]
        no_wait: bool,
    },

    /// Unlock a case's scenario for editing
    Unlock {
        case_id: String,
        #[arg(long)]
        no_wait: bool,
    },

    /// Advance a locked case's simulation time
    Advance {
        case_id: String,
        /// Weeks to advance
        #[arg(long, default_value_t = 1)]
        weeks: u64,
        #[arg(long)]
        no_wait: bool,
    },

    /// Show a case's model parameters
    Parms {
        case_id: String,
        /// Only parameters changed from their defaults
        #[arg(long)]
        changed: bool,
    },

    /// Set one model parameter
    SetParm {
        case_id: String,
        parm: String,
        value: String,
    },

    /// Reset all model parameters to their defaults
    ResetParms {
        case_id: String,
    },

    /// Request a comparison of two cases
    Compare {
        case1: String,
        case2: Option<String>,
    },

    /// Show a comparison's significant outputs by category
    Outputs {
        comp_id: String,
    },

    /// Show the causal chain behind one compared output variable
    Chain {
        comp_id: String,
        varname: String,
        /// Significance level for filtering (<n> from 100, 95, ... 5, 0)
        #[arg(long)]
        sig_level: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ARACHNE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    let client = Client::new(&config.server_url);
    let interval = Duration::from_millis(config.poll_interval_ms);

    match cli.command {
        Command::Status => {
            let meta = client.meta().await?;
            println!(
                "{} {} (started {})",
                "Arachne server".bold(),
                meta.version.cyan(),
                meta.start_time
            );
        }

        Command::Cases => {
            print!("{}", output::render_cases(&client.cases().await?));
        }

        Command::Files => {
            print!("{}", output::render_files(&client.files().await?));
        }

        Command::Comps => {
            print!("{}", output::render_comps(&client.comps().await?));
        }

        Command::Case { case_id } => {
            let meta = client.case_meta(&case_id).await?;
            print!("{}", output::render_cases(std::slice::from_ref(&meta)));

            let history = client.history_meta(&case_id).await?;
            if !history.is_empty() {
                println!("\n{}", "History variables:".bold());
                for var in &history {
                    let keys: Vec<&str> = var.keys.iter().map(|k| k.key.as_str()).collect();
                    println!("  {:20} {}", var.name, keys.join(", ").dimmed());
                }
            }
        }

        Command::History {
            case_id,
            varname,
            keys,
            t1,
            t2,
        } => {
            let t2 = match t2 {
                Some(t2) => t2,
                None => client.case_meta(&case_id).await?.tick,
            };
            let keys: Vec<(&str, &str)> = keys
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();
            let rows = client.history(&case_id, &varname, &keys, t1, t2).await?;
            print!("{}", output::render_history(&rows));
        }

        Command::New { replace, longname } => {
            let envelope = client
                .new_case(replace.as_deref(), longname.as_deref())
                .await?;
            finish(&envelope);
        }

        Command::Clone {
            source,
            replace,
            longname,
        } => {
            let envelope = client
                .clone_case(&source, replace.as_deref(), longname.as_deref())
                .await?;
            finish(&envelope);
        }

        Command::Import {
            filename,
            replace,
            longname,
        } => {
            let envelope = client
                .import_case(&filename, replace.as_deref(), longname.as_deref())
                .await?;
            finish(&envelope);
        }

        Command::Export { case_id, filename } => {
            let envelope = client.export_case(&case_id, &filename).await?;
            finish(&envelope);
        }

        Command::Remove { case_id } => {
            let envelope = client.remove_case(&case_id).await?;
            finish(&envelope);
        }

        Command::Lock { case_id, no_wait } => {
            let envelope = client.lock(&case_id).await?;
            finish(&envelope);
            follow(&client, &case_id, interval, no_wait).await?;
        }

        Command::Unlock { case_id, no_wait } => {
            let envelope = client.unlock(&case_id).await?;
            finish(&envelope);
            follow(&client, &case_id, interval, no_wait).await?;
        }

        Command::Advance {
            case_id,
            weeks,
            no_wait,
        } => {
            let envelope = client.advance(&case_id, weeks).await?;
            finish(&envelope);
            follow(&client, &case_id, interval, no_wait).await?;
        }

        Command::Parms { case_id, changed } => {
            let parms = client.parmdb(&case_id).await?;
            print!("{}", output::render_parms(&parms, changed));
        }

        Command::SetParm {
            case_id,
            parm,
            value,
        } => {
            let envelope = client.set_parm(&case_id, &parm, &value).await?;
            finish(&envelope);
        }

        Command::ResetParms { case_id } => {
            let envelope = client.reset_parms(&case_id).await?;
            finish(&envelope);
        }

        Command::Compare { case1, case2 } => {
            println!(
                "Requesting comparison {}...",
                arachne::client::comp_id(&case1, case2.as_deref()).cyan()
            );
            let comp = client
                .request_comparison(&case1, case2.as_deref())
                .await?;
            println!(
                "Comparison {} ready with {} significant outputs.",
                comp.id.cyan().bold(),
                comp.outputs.len()
            );
            print!("{}", output::render_outputs(&OutputIndex::new(&comp.outputs)));
        }

        Command::Outputs { comp_id } => {
            let outputs = client.outputs(&comp_id).await?;
            print!("{}", output::render_outputs(&OutputIndex::new(&outputs)));
        }

        Command::Chain {
            comp_id,
            varname,
            sig_level,
        } => {
            let sig_level = match sig_level {
                Some(level) if !SIG_LEVELS.contains(&level) => {
                    eyre::bail!(
                        "Significance level {level} is not on the ladder (100, 95, ... 5, 0)"
                    );
                }
                Some(level) => level,
                None => config.sig_level,
            };

            let records = client.chain_data(&comp_id, &varname).await?;
            let chain = Chain::build(&records, &varname)?;
            print!("{}", output::render_chain(&chain, sig_level));
        }
    }

    Ok(())
}

/// Parse a `--key` selection of the form `column=value`.
fn parse_key(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}

/// Print an operation's outcome; anything but OK is a failed run.
fn finish(envelope: &arachne_api::Envelope) {
    print!("{}", output::render_envelope(envelope));
    if !envelope.is_ok() {
        std::process::exit(1);
    }
}

/// Follow a mutated case until it settles, then report its state.
async fn follow(client: &Client, case: &str, interval: Duration, no_wait: bool) -> Result<()> {
    if no_wait {
        return Ok(());
    }

    if let Some(meta) = poll::wait_while_busy(client, case, interval, None).await? {
        println!("{} is now {} at week {}.", meta.id.cyan(), meta.state, meta.tick);
    }
    Ok(())
}
