use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use news_reel::{config::Config, job::GenerateRequest, pipeline::Pipeline, server};

#[derive(Parser)]
#[command(
    name = "news-reel",
    version,
    about = "Turn news text into narrated MP4 clips",
    long_about = "News-Reel narrates caller-supplied text or the current top headline with text-to-speech, puts a still image or looping background video behind it, and encodes an MP4."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// NewsAPI key for headline requests
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true, global = true)]
    newsapi_key: Option<String>,

    /// ElevenLabs key for speech synthesis
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true, global = true)]
    elevenlabs_api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Generate one video and print the result as JSON
    Generate {
        /// Title of the clip
        #[arg(short, long)]
        title: Option<String>,

        /// Narration text
        #[arg(long)]
        content: Option<String>,

        /// Background image URL
        #[arg(short, long)]
        image_url: Option<String>,

        /// Narrate the current top headline instead of the given text
        #[arg(long, conflicts_with_all = ["title", "content", "image_url"])]
        headline: bool,

        /// With --headline, narrate the headline only
        #[arg(short, long, requires = "headline")]
        short: bool,

        /// Directory for the finished video (overrides the config file)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Write the default configuration to a TOML file
    InitConfig {
        /// Destination path
        #[arg(default_value = "news-reel.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting News-Reel v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    let mut config = config.with_api_keys(cli.newsapi_key, cli.elevenlabs_api_key);

    match cli.command {
        Command::InitConfig { path } => {
            Config::default().save_to_file(&path)?;
            info!("Wrote default configuration to {:?}", path);
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let bind = config.server.bind.clone();
            let pipeline = Pipeline::from_config(config)?;
            server::serve(Arc::new(pipeline), &bind)
                .await
                .with_context(|| format!("Server on {} stopped with an error", bind))?;
        }
        Command::Generate {
            title,
            content,
            image_url,
            headline,
            short,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            let pipeline = Pipeline::from_config(config)?;

            let result = if headline {
                pipeline.generate_from_headline(short).await?
            } else {
                pipeline.generate(GenerateRequest { title, content, image_url }).await?
            };

            info!("Video saved to: {}", result.video_file_path);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
