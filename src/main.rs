use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use hf_inference_kit::{
    app::{self, App, format},
    client::Envelope,
    config::{self, Config},
};
use std::path::PathBuf;
use tokio::sync::oneshot;
use tracing::info;

#[derive(Parser)]
#[command(name = "hfkit", version)]
#[command(about = "Run hosted Hugging Face models on text or image input")]
struct Cli {
    /// YAML configuration file (defaults to $CONFIG_PATH or config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a model on text, a text file or an image
    Run(RunArgs),
    /// List the available models
    Models,
    /// Save a Hugging Face API key to the local credential file
    SetKey { key: String },
    /// Show usage instructions
    Docs,
}

#[derive(Args)]
struct RunArgs {
    /// Model name or id (see `hfkit models`)
    #[arg(short, long, default_value = "Sentiment Analysis")]
    model: String,

    #[command(flatten)]
    input: InputArgs,

    /// Answer with a fixed mock result, without network access
    #[arg(long)]
    mock: bool,

    /// Also write the result to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the raw envelope as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Input text
    #[arg(long)]
    text: Option<String>,

    /// Read input text from a file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Image file to classify
    #[arg(long)]
    image: Option<PathBuf>,
}

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    // Environment variable overrides config
    let log_level = match std::env::var("RUST_LOG") {
        Ok(directives) => directives,
        Err(_) => {
            validate_log_level(&config.logs.level)?;
            config.logs.level.clone()
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_new(&log_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logs.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration first (before logging setup)
    let loaded = match &cli.config {
        Some(path) => config::load_from(path).await,
        None => config::load().await,
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    match cli.command {
        Command::Run(args) => {
            config.client.mock_mode |= args.mock;
            let succeeded = run(config, args).await?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Command::Models => {
            for entry in &config.models {
                println!("{}\n", format::model_info_text(entry));
            }
        }
        Command::SetKey { key } => {
            let key = key.trim();
            if key.is_empty() {
                eprintln!("Invalid Input: Please enter an API key.");
                std::process::exit(1);
            }
            let path = config::credentials_path();
            config::save_api_key(&path, key).await?;
            println!("API key saved to {}", path.display());
        }
        Command::Docs => {
            println!("{}\n\n{}", format::about_text(), format::usage_text());
        }
    }

    Ok(())
}

async fn run(config: Config, args: RunArgs) -> Result<bool> {
    let api_key = config::resolve_api_key(
        std::env::var(config::API_KEY_ENV).ok(),
        &config.client,
        config::credentials_path(),
    )
    .await?;
    if api_key.is_none() && !config.client.mock_mode {
        eprintln!(
            "No API key configured. Set {} or run `hfkit set-key <key>`.",
            config::API_KEY_ENV
        );
    }

    let app = App::new(&config, api_key)?;
    let label = match app.entry(&args.model) {
        Ok(entry) => entry.name.clone(),
        Err(e) => {
            eprintln!("{}", e);
            return Ok(false);
        }
    };

    let input = match (args.input.text, args.input.file, args.input.image) {
        (Some(text), _, _) => text,
        (_, Some(path), _) => app::read_input_file(&path).await?,
        (_, _, Some(path)) => path.to_string_lossy().into_owned(),
        (None, None, None) => String::new(),
    };

    info!("Running {} on {} bytes of input", label, input.len());

    let (tx, rx) = oneshot::channel();
    let handle = app.run_in_background(&label, input, move |envelope| {
        let _ = tx.send(envelope);
    })?;
    let envelope = rx.await?;
    handle.wait().await?;

    let rendered = if args.json {
        serde_json::to_string_pretty(&envelope)?
    } else {
        format::format_output(&envelope, &label)
    };
    println!("{}", rendered);

    if let Envelope::Error(failure) = &envelope {
        if matches!(
            failure.error.as_deref(),
            Some("Invalid input") | Some("File not found")
        ) {
            eprintln!("Invalid Input: {}", failure.message);
        }
    }

    if let Some(path) = &args.output {
        app::save_output(path, &rendered).await?;
    }

    Ok(envelope.is_success())
}
