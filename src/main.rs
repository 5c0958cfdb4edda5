//! wabulk - WhatsApp Business template bulk sender
//!
//! Fetch approved templates, pick recipients from a CSV and send.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};
use wabulk::config::{config_path, Config};
use wabulk::contacts::Selection;
use wabulk::graph::GraphClient;
use wabulk::report;
use wabulk::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// API access token (or WABULK_API_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Phone Number ID messages are sent from
    #[arg(long)]
    phone_number_id: Option<String>,

    /// WhatsApp Business Account ID
    #[arg(long)]
    waba_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List approved message templates
    Templates,

    /// Show the columns of a contact CSV
    Columns {
        csv: PathBuf,
    },

    /// Send a template to the selected contacts
    Send {
        /// Contact list
        csv: PathBuf,

        /// Column holding phone numbers
        #[arg(long)]
        phone_column: String,

        /// Approved template name
        #[arg(long)]
        template: String,

        /// Body variable, repeat in placeholder order
        #[arg(long = "var")]
        vars: Vec<String>,

        /// File with one variable per line ("-" for stdin)
        #[arg(long)]
        variables_file: Option<PathBuf>,

        /// Rows to include: all, none or e.g. 1,3-5
        #[arg(long, default_value = "all")]
        select: String,

        /// Rows to leave out after --select
        #[arg(long)]
        exclude: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Write a default config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging before the config so its load warnings are shown
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let (filter, filter_handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("📱 wabulk v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Command::InitConfig = args.command {
        let path = args.config.clone().unwrap_or_else(config_path);
        if Config::init_file(&path)? {
            println!("Config written to {}", path.display());
        } else {
            println!("Config already exists at {}, left unchanged", path.display());
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if !args.verbose && std::env::var_os("RUST_LOG").is_none() {
        match EnvFilter::try_new(config.log_level.to_lowercase()) {
            Ok(level) => {
                let _ = filter_handle.reload(level);
            }
            Err(e) => tracing::warn!("⚠️ Invalid log_level '{}': {}", config.log_level, e),
        }
    }

    if let Some(token) = args.token {
        config.api_token = token;
    }
    if let Some(id) = args.phone_number_id {
        config.phone_number_id = id;
    }
    if let Some(id) = args.waba_id {
        config.waba_id = id;
    }

    match args.command {
        Command::InitConfig => Ok(()),
        Command::Columns { csv } => {
            let sheet = wabulk::contacts::ContactSheet::from_path(&csv)
                .with_context(|| format!("Error reading CSV file {}", csv.display()))?;
            println!("{} rows", sheet.len());
            for column in sheet.columns() {
                println!("  {}", column);
            }
            Ok(())
        }
        Command::Templates => {
            let client = GraphClient::new(&config);
            let mut session = Session::new(config);
            let names = session
                .fetch_templates(&client)
                .await
                .context("Error fetching templates")?;
            if names.is_empty() {
                println!("No approved templates found.");
            }
            for name in names {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Send {
            csv,
            phone_column,
            template,
            vars,
            variables_file,
            select,
            exclude,
            yes,
        } => {
            let client = GraphClient::new(&config);
            let mut session = Session::new(config);

            session
                .fetch_templates(&client)
                .await
                .context("Error fetching templates")?;
            session.select_template(&template)?;

            let file = std::fs::File::open(&csv)
                .with_context(|| format!("Error reading CSV file {}", csv.display()))?;
            session.load_contacts(&csv.to_string_lossy(), file)?;
            session.choose_phone_column(&phone_column)?;

            if let Some(sheet) = session.sheet_mut() {
                sheet.apply_selection(&select.parse::<Selection>()?)?;
                if let Some(exclude) = exclude {
                    sheet.exclude(&exclude.parse::<Selection>()?)?;
                }
            }

            session.set_variables(&read_variables(&vars, variables_file.as_deref())?);

            let recipients = session.recipients()?;
            println!(
                "Preparing to send '{}' to {} recipient(s) with {} variable(s)",
                template,
                recipients.len(),
                session.variables().len()
            );

            if !yes && !recipients.is_empty() && !confirm()? {
                println!("Aborted, nothing sent.");
                return Ok(());
            }

            let report = match session
                .send(&client, |p| println!("{}", report::progress_line(p)))
                .await
            {
                Ok(report) => report,
                Err(e) => {
                    error!("Message not sent: {}", e);
                    bail!("Message not sent: {}", e);
                }
            };

            print!("{}", report::render(&report));
            if report.failure_count() > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Collect variable text from flags and an optional file or stdin
fn read_variables(vars: &[String], file: Option<&Path>) -> Result<String> {
    let mut text = vars.join("\n");
    if let Some(path) = file {
        let content = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Error reading variables file {}", path.display()))?
        };
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&content);
    }
    Ok(text)
}

fn confirm() -> Result<bool> {
    print!("Send now? [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
