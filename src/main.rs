use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stepdeck::config::Config;
use stepdeck::logging;
use stepdeck::render::{HtmlPageRenderer, Page, TemplateEngine};
use stepdeck::repository::{split_resource_name, FsStepRepository, StepRepository};
use stepdeck::{Presenter, StepError};

#[derive(Parser)]
#[command(name = "stepdeck")]
#[command(about = "Walk through late-loaded wizard steps and render them to HTML")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Install root containing the steps directory
    #[arg(short, long)]
    root: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed steps in wizard order
    List,

    /// Show a step's descriptor and resolved resources
    Show {
        /// Step name
        step: String,
    },

    /// Render one step into a page
    Render {
        /// Step to render (default: first step)
        #[arg(short, long)]
        step: Option<String>,

        /// Render context as inline JSON, or @FILE to read it from a file
        #[arg(long)]
        context: Option<String>,

        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render every step in order, one page per step
    Walk {
        /// Render context as inline JSON, or @FILE to read it from a file
        #[arg(long)]
        context: Option<String>,

        /// Output directory (default: ./pages)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config.paths.root = Some(root);
    }

    let logging_handle = logging::init_logging(&config, cli.debug)?;

    let result = match cli.command {
        Commands::List => cmd_list(&config).await,
        Commands::Show { step } => cmd_show(&config, &step).await,
        Commands::Render {
            step,
            context,
            output,
        } => cmd_render(&config, step, context, output).await,
        Commands::Walk {
            context,
            output_dir,
        } => cmd_walk(&config, context, output_dir).await,
        Commands::Config => cmd_config(&config),
    };

    if let Some(log_path) = logging_handle.log_file_path {
        if log_path.metadata().map(|m| m.len() > 0).unwrap_or(false) {
            eprintln!("Session log: {}", log_path.display());
        }
    }

    result
}

/// Build the presenter and keep a handle on its page renderer
fn build_presenter(config: &Config) -> Result<(Presenter, Arc<HtmlPageRenderer>)> {
    let repository = Arc::new(config.step_repository()?);
    tracing::debug!(steps = %repository.steps_root().display(), "using steps directory");

    let renderer = Arc::new(
        HtmlPageRenderer::new(Page::new(config.render.title.clone()))
            .with_engine(TemplateEngine::new().with_strict(config.render.strict_templates)),
    );

    let presenter = Presenter::new(repository, renderer.clone())
        .with_destination(config.render.destination.clone());
    Ok((presenter, renderer))
}

/// Parse `--context`: inline JSON, `@FILE`, or an empty object when absent
fn parse_context(arg: Option<&str>) -> Result<serde_json::Value> {
    let Some(arg) = arg else {
        return Ok(serde_json::json!({}));
    };

    let raw = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read context file: {}", path))?,
        None => arg.to_string(),
    };

    serde_json::from_str(&raw).context("Context is not valid JSON")
}

async fn cmd_list(config: &Config) -> Result<()> {
    let (presenter, _) = build_presenter(config)?;
    let sequencer = presenter.sequencer().await?.lock().await;

    println!("Steps ({})", sequencer.len());
    println!("{}", "─".repeat(60));
    for (i, name) in sequencer.steps().iter().enumerate() {
        println!("{:>3}. {}", i + 1, name);
    }
    println!();
    println!("{}", sequencer.format_progress());

    Ok(())
}

async fn cmd_show(config: &Config, step: &str) -> Result<()> {
    let repository: FsStepRepository = config.step_repository()?;
    let Some(descriptor) = repository.get_step_descriptor(step).await? else {
        println!("Step '{}' has an empty descriptor", step);
        return Ok(());
    };

    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    println!();
    println!("Resources:");
    for entry in descriptor.resources() {
        let (owner, resource) = split_resource_name(&descriptor.name, entry);
        match repository.resolve_resource_uri(owner, resource) {
            Some(uri) => println!("  ✓ {} → {}", entry, uri),
            None => println!("  ✗ {} (not found)", entry),
        }
    }

    Ok(())
}

async fn cmd_render(
    config: &Config,
    step: Option<String>,
    context: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let context = parse_context(context.as_deref())?;
    let (presenter, renderer) = build_presenter(config)?;

    match step {
        Some(name) => presenter.render_named(&name, &context).await?,
        None => presenter.render_current(&context).await?,
    };

    let html = renderer.page_html().await;
    match output {
        Some(path) => {
            write_page(&path, &html)?;
            println!("Rendered {} → {}", presenter.current_step_name().await?, path.display());
        }
        None => print!("{}", html),
    }

    Ok(())
}

async fn cmd_walk(
    config: &Config,
    context: Option<String>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let context = parse_context(context.as_deref())?;
    let (presenter, renderer) = build_presenter(config)?;
    let output_dir = match output_dir {
        Some(dir) => dir,
        None => std::env::current_dir().unwrap_or_default().join("pages"),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    presenter.render_current(&context).await?;
    let mut index = 1;
    loop {
        let name = presenter.current_step_name().await?;
        let path = output_dir.join(format!("{:02}-{}.html", index, name));
        write_page(&path, &renderer.page_html().await)?;
        println!("  ✓ {} → {}", presenter.format_progress().await?, path.display());

        match presenter.render_next(&context).await {
            Ok(_) => index += 1,
            Err(StepError::NoMoreSteps) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("\nRendered {} steps.", index);
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("Failed to write page: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_context_default_empty() {
        assert_eq!(parse_context(None).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_parse_context_inline() {
        let value = parse_context(Some(r#"{"user": "sam"}"#)).unwrap();
        assert_eq!(value["user"], "sam");
    }

    #[test]
    fn test_parse_context_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("ctx.json");
        std::fs::write(&path, r#"{"n": 3}"#).unwrap();

        let value = parse_context(Some(&format!("@{}", path.display()))).unwrap();
        assert_eq!(value["n"], 3);
    }

    #[test]
    fn test_parse_context_invalid() {
        assert!(parse_context(Some("{not json")).is_err());
    }

    #[test]
    fn test_cli_parses_walk() {
        let cli = Cli::parse_from(["stepdeck", "--root", "/opt/wizard", "walk", "-o", "out"]);
        assert_eq!(cli.root.as_deref(), Some("/opt/wizard"));
        assert!(matches!(cli.command, Commands::Walk { .. }));
    }
}
