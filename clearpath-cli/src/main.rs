use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod config;
mod guide_cmd;
mod speech;
mod state;
mod tasks_cmd;
mod tools_cmd;

use app::App;
use guide_cmd::GuideCommand;
use tasks_cmd::TasksCommand;

const BUILD_SHA: &str = env!("CLEARPATH_BUILD_SHA");

#[derive(Parser, Debug)]
#[command(
    name = "clearpath",
    version,
    long_version = long_version(),
    about = "Accessibility assistant: step-by-step task guides, image recoloring and speech-to-image"
)]
struct Cli {
    /// Log filter (e.g. "debug", "clearpath_gemini=debug")
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse, add, favorite and delete tasks
    Tasks {
        #[command(subcommand)]
        command: TasksCommand,
    },

    /// Step-by-step guide for a task
    Guide {
        #[command(subcommand)]
        command: GuideCommand,
    },

    /// Total points earned across all tasks
    Score,

    /// Recolor an image for a color-vision deficiency
    Recolor {
        /// Image to adjust
        #[arg(long, required_unless_present = "list")]
        image: Option<PathBuf>,

        /// Deficiency name or label, e.g. "deuteranopia" or "Green-Blind"
        #[arg(long, required_unless_present = "list")]
        deficiency: Option<String>,

        /// Where to write the adjusted image
        #[arg(long, required_unless_present = "list")]
        out: Option<PathBuf>,

        /// List the supported deficiency types and exit
        #[arg(long)]
        list: bool,
    },

    /// Turn a typed or spoken description into an image
    Imagine {
        /// Description of the image
        #[arg(long)]
        prompt: Option<String>,

        /// Dictate (more of) the description by voice first
        #[arg(long)]
        listen: bool,

        /// Style appended to the prompt (default: photorealistic)
        #[arg(long)]
        style: Option<String>,

        /// Where to write the image
        #[arg(long)]
        out: PathBuf,
    },

    /// Manage ~/.clearpath/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config (no-op when it already exists)
    Init,

    /// Print the effective config
    Show,
}

fn long_version() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (", env!("CLEARPATH_BUILD_SHA"), ")")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&cli.log))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    tracing::debug!(build = BUILD_SHA, "clearpath starting");

    // The AI credential is required before anything else runs.
    let api_key = app::credential()?;
    let cfg = config::load_config()?;

    if let Command::Config { command } = &cli.command {
        return match command {
            ConfigCommand::Init => config::init_config(),
            ConfigCommand::Show => config::show_config(),
        };
    }

    let app = App::start(&cfg, api_key)?;

    match cli.command {
        Command::Tasks { command } => tasks_cmd::run(&app, command).await?,

        Command::Guide { command } => guide_cmd::run(&app, command).await?,

        Command::Score => tools_cmd::score(&app)?,

        Command::Recolor {
            image,
            deficiency,
            out,
            list,
        } => {
            if list {
                tools_cmd::list_deficiencies();
            } else if let (Some(image), Some(deficiency), Some(out)) = (image, deficiency, out) {
                tools_cmd::recolor(&app, &image, &deficiency, &out).await?;
            }
        }

        Command::Imagine {
            prompt,
            listen,
            style,
            out,
        } => tools_cmd::imagine(&app, prompt, listen, style, &out).await?,

        Command::Config { .. } => {}
    }

    Ok(())
}
