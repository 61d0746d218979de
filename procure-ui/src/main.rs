//! procure-ui - terminal client for the ProcureAI CPV classifier
//!
//! Without a subcommand, runs an interactive shell over the three views
//! (predictor, docs, status). Subcommands run one operation and exit.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use procure_common::config::{CliOverrides, ClientSettings, TomlConfig};
use procure_ui::client::{dictionary_source, HttpModelApi};
use procure_ui::render;
use procure_ui::shell::{ShellCommand, HELP};
use procure_ui::workflow::PredictionError;
use procure_ui::{
    FormEdit, HealthStatus, Lang, MemoryHistory, Resources, SubmitOutcome, View, Workspace,
    WorkspaceOptions,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "procure-ui", version, about = "ProcureAI CPV prediction workspace")]
struct Args {
    /// Model service base URL (overrides PROCUREAI_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// CPV dictionary location, URL or file path
    #[arg(long, global = true)]
    cpv_source: Option<String>,

    /// Configuration file (default: <config dir>/procureai/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Interface language: pl, en or ua
    #[arg(long, global = true)]
    lang: Option<String>,

    /// Initial location: /, /docs or /status
    #[arg(long, default_value = "/")]
    path: String,

    /// Health polling interval in milliseconds
    #[arg(long, global = true)]
    health_interval_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit one prediction and print the result
    Predict {
        /// Start from a ready scenario (1-3)
        #[arg(long)]
        preset: Option<u8>,
        #[arg(long)]
        value: Option<f64>,
        #[arg(long)]
        cae: Option<String>,
        #[arg(long)]
        nuts: Option<String>,
        #[arg(long)]
        contract_type: Option<String>,
    },
    /// Check the model service once and print the status view
    Status,
    /// Print descriptions of CPV codes
    Describe {
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

type Session = Workspace<MemoryHistory>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file = TomlConfig::discover(args.config.as_deref()).context("Failed to load configuration")?;
    let overrides = CliOverrides {
        api_base: args.api_base.clone(),
        cpv_source: args.cpv_source.clone(),
        language: args.lang.clone(),
        health_interval_ms: args.health_interval_ms,
    };
    let settings = ClientSettings::resolve(&overrides, file.as_ref()).context("Invalid configuration")?;

    // RUST_LOG wins over the configured level; logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "procure_ui={level},procure_common={level}",
            level = settings.log_level
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting ProcureAI workspace (procure-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Model service: {}", settings.api_base);
    info!("CPV dictionary: {}", settings.cpv_source);

    let lang = Lang::from_code(&settings.language).unwrap_or_else(|| {
        warn!("Unsupported language '{}', using {}", settings.language, Lang::default());
        Lang::default()
    });

    let api = Arc::new(
        HttpModelApi::new(settings.api_base.clone(), settings.request_timeout)
            .context("Failed to build HTTP client")?,
    );
    let dictionary = dictionary_source(&settings.cpv_source, settings.request_timeout)
        .context("Failed to build dictionary source")?;
    let resources = Arc::new(Resources::builtin());
    let options = WorkspaceOptions {
        lang,
        api_base: settings.api_base.clone(),
        health_interval: settings.health_interval,
    };

    let initial_path = match &args.command {
        Some(Command::Status) => View::Status.path().to_string(),
        Some(_) => View::Predictor.path().to_string(),
        None => args.path.clone(),
    };
    let mut workspace = Workspace::new(
        api,
        dictionary,
        MemoryHistory::new(initial_path),
        resources,
        options,
    );

    match args.command {
        None => run_shell(&mut workspace).await,
        Some(Command::Status) => run_status(&workspace).await,
        Some(Command::Describe { codes }) => run_describe(&mut workspace, &codes).await,
        Some(Command::Predict {
            preset,
            value,
            cae,
            nuts,
            contract_type,
        }) => {
            let mut edits = Vec::new();
            if let Some(value) = value {
                edits.push(FormEdit::ValueEuro(value));
            }
            if let Some(cae) = cae {
                edits.push(FormEdit::CaeName(cae));
            }
            if let Some(nuts) = nuts {
                edits.push(FormEdit::Nuts(nuts));
            }
            if let Some(kind) = contract_type {
                edits.push(FormEdit::TypeOfContract(kind));
            }
            run_predict(&mut workspace, preset, edits).await
        }
    }
}

async fn run_predict(workspace: &mut Session, preset: Option<u8>, edits: Vec<FormEdit>) -> Result<()> {
    workspace.start();
    workspace.wait_for_startup().await;

    if let Some(id) = preset {
        workspace.apply_preset(id).await?;
    }
    for edit in edits {
        workspace.edit(edit).await?;
    }

    let outcome = workspace.submit().await;
    println!("{}", workspace.render().await);
    workspace.shutdown().await;

    match outcome {
        SubmitOutcome::Failed(error) => bail!("Prediction failed: {}", error.detail),
        _ => Ok(()),
    }
}

async fn run_status(workspace: &Session) -> Result<()> {
    let status = workspace.load_and_check().await;
    let snapshot = workspace.snapshot().await;
    println!("{}", render::render_status(&snapshot, workspace.resources()));

    if status != HealthStatus::Healthy {
        bail!("Model service is unavailable");
    }
    Ok(())
}

async fn run_describe(workspace: &mut Session, codes: &[String]) -> Result<()> {
    workspace.start();
    workspace.wait_for_startup().await;
    for code in codes {
        println!("{}  {}", code, workspace.describe(code).await);
    }
    workspace.shutdown().await;
    Ok(())
}

async fn run_shell(workspace: &mut Session) -> Result<()> {
    workspace.start();
    println!("{}", workspace.render().await);
    println!("\nType 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(workspace.view())?;
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let command = match line.parse::<ShellCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Show => println!("{}", workspace.render().await),
            ShellCommand::Go(view) => {
                workspace.navigate(view);
                println!("{}", workspace.render().await);
            }
            ShellCommand::Back => {
                if workspace.back() {
                    println!("{}", workspace.render().await);
                }
            }
            ShellCommand::Forward => {
                if workspace.forward() {
                    println!("{}", workspace.render().await);
                }
            }
            ShellCommand::Lang(lang) => {
                workspace.set_lang(lang);
                println!("{}", workspace.render().await);
            }
            ShellCommand::Set(edit) => match workspace.edit(edit).await {
                Ok(()) => println!("{}", workspace.render().await),
                Err(e) => println!("{}", e),
            },
            ShellCommand::Preset(id) => match workspace.apply_preset(id).await {
                Ok(()) => println!("{}", workspace.render().await),
                Err(e) => println!("{}", e),
            },
            ShellCommand::Submit => {
                let task = workspace.submit_in_background();
                tokio::spawn(async move {
                    match task.await {
                        Ok(SubmitOutcome::Ignored) => println!("\nPrediction already in progress"),
                        Ok(SubmitOutcome::Failed(error)) => {
                            println!("\n{}, type 'show' for details", submit_failure_notice(&error))
                        }
                        Ok(SubmitOutcome::Succeeded(_)) => {
                            println!("\nPrediction finished, type 'show' to see it")
                        }
                        Err(e) => warn!("Prediction task ended abnormally: {}", e),
                    }
                });
            }
            ShellCommand::Describe(code) => {
                println!("{}  {}", code, workspace.describe(&code).await)
            }
            ShellCommand::Quit => break,
        }
    }

    workspace.shutdown().await;
    Ok(())
}

/// One-line notice for a background submit that failed
fn submit_failure_notice(error: &PredictionError) -> String {
    format!("Prediction failed: {}", error.message(&error.detail))
}

fn prompt(view: View) -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}> ", view)?;
    stdout.flush()?;
    Ok(())
}
