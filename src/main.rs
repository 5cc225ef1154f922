use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use runtime_image::logging::init_logging;
use runtime_image::{
    amend_with_runtime_image, render_dockerfile, AnyBuildStrategy, BuildSpecification,
    HasBuildSteps, RuntimeImageConfig, RuntimeSteps,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "runtime-image",
    version,
    about = "Render runtime Dockerfiles and amend build strategies with runtime-image steps"
)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Workspace directory shared by the pipeline steps [env: RUNTIME_IMAGE_WORKSPACE_DIR]
    #[arg(long, global = true)]
    workspace_dir: Option<String>,

    /// Image running the build-and-push step [env: RUNTIME_IMAGE_BUILD_TOOL_IMAGE]
    #[arg(long, global = true)]
    build_tool_image: Option<String>,

    /// Registry credentials directory for the build tool [env: RUNTIME_IMAGE_DOCKER_CONFIG_DIR]
    #[arg(long, global = true)]
    docker_config_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the runtime Dockerfile for a build
    Dockerfile {
        /// Build specification (YAML or JSON)
        #[arg(short, long)]
        build: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the Dockerfile-write and build-and-push steps for a build
    Steps {
        #[arg(short, long)]
        build: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },

    /// Append the runtime-image steps to a BuildStrategy or ClusterBuildStrategy
    Amend {
        #[arg(short, long)]
        build: PathBuf,

        /// Strategy document, its `kind` selects the scope
        #[arg(short, long)]
        strategy: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
        format: Format,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl Cli {
    fn config(&self) -> RuntimeImageConfig {
        let mut config = RuntimeImageConfig::from_env();
        if let Some(dir) = &self.workspace_dir {
            config = config.with_workspace_dir(dir);
        }
        if let Some(image) = &self.build_tool_image {
            config = config.with_build_tool_image(image);
        }
        if let Some(dir) = &self.docker_config_dir {
            config = config.with_docker_config_dir(dir);
        }
        config
    }
}

/// YAML is a superset of JSON, so one parser covers both input formats.
fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn encode<T: Serialize>(value: &T, format: Format) -> Result<String> {
    Ok(match format {
        Format::Yaml => serde_yaml::to_string(value)?,
        Format::Json => serde_json::to_string_pretty(value)? + "\n",
    })
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = text.len(), "Output written");
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs).map_err(anyhow::Error::msg)?;
    let config = cli.config();

    match &cli.command {
        Command::Dockerfile { build, output } => {
            let spec: BuildSpecification = load(build)?;
            let dockerfile = render_dockerfile(&spec)?;
            emit(dockerfile.as_str(), output.as_deref())?;
        }
        Command::Steps { build, format } => {
            let spec: BuildSpecification = load(build)?;
            let steps = RuntimeSteps::build(&spec, &config)?;
            emit(&encode(&steps.into_steps(), *format)?, None)?;
        }
        Command::Amend {
            build,
            strategy,
            format,
            output,
        } => {
            let spec: BuildSpecification = load(build)?;
            let mut doc: AnyBuildStrategy = load(strategy)?;
            let before = doc.build_steps().len();

            amend_with_runtime_image(&mut doc, &spec, &config).with_context(|| {
                format!("Failed to amend {} '{}'", doc.kind(), doc.name())
            })?;

            tracing::info!(
                kind = doc.kind(),
                name = doc.name(),
                added = doc.build_steps().len() - before,
                "Strategy amended"
            );
            emit(&encode(&doc, *format)?, output.as_deref())?;
        }
    }

    Ok(())
}
