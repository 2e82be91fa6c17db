mod script;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use scene::config::SceneConfig;
use scene::document::SceneDocument;
use scene::{Scene, SceneError};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use crate::script::{ScriptError, parse_script};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("line {line}: {source}")]
    Command { line: usize, source: SceneError },
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "scene", about = "Inspect and edit Z-ordered scene documents")]
struct Cli {
    /// Snapshots kept in each of the undo and redo histories. Overrides
    /// `SCENE_UNDO_DEPTH`.
    #[arg(long)]
    undo_depth: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarise a document: element count and layers, front first.
    Info {
        document: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run an editing script against a document.
    Run {
        document: PathBuf,
        #[arg(help = "Script file path, or - for stdin")]
        script: String,
        /// Where to write the edited document; stdout when absent.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = SceneConfig::from_env()?;
    if let Some(depth) = cli.undo_depth {
        config.undo_depth = depth;
    }

    match cli.command {
        Command::Info { document, json } => run_info(&document, config, json),
        Command::Run { document, script, output } => run_script(&document, &script, output.as_deref(), config),
    }
}

fn load(path: &Path, config: SceneConfig) -> Result<Scene, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })?;
    let scene = Scene::from_document(SceneDocument::from_json(&text)?, config)?;
    tracing::debug!(path = %path.display(), elements = scene.element_count(), "document loaded");
    Ok(scene)
}

fn run_info(path: &Path, config: SceneConfig, as_json: bool) -> Result<(), CliError> {
    let scene = load(path, config)?;
    let layers: Vec<Value> = scene
        .store()
        .iter()
        .enumerate()
        .map(|(layer, e)| {
            json!({
                "layer": layer,
                "id": e.id,
                "type": e.kind.type_name(),
                "x": e.x,
                "y": e.y,
                "width": e.width,
                "height": e.height,
                "rotation": e.rotation,
            })
        })
        .collect();

    if as_json {
        let summary = json!({ "elements": scene.element_count(), "layers": layers });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} element(s)", scene.element_count());
    for (layer, e) in scene.store().iter().enumerate() {
        println!(
            "{layer:>4}  {}  {:<12} x={} y={} w={} h={} rot={}",
            e.id,
            e.kind.type_name(),
            e.x,
            e.y,
            e.width,
            e.height,
            e.rotation
        );
    }
    Ok(())
}

fn read_script(script: &str) -> Result<String, CliError> {
    if script == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| CliError::Read { path: PathBuf::from("<stdin>"), source })?;
        Ok(text)
    } else {
        fs::read_to_string(script).map_err(|source| CliError::Read { path: PathBuf::from(script), source })
    }
}

fn run_script(path: &Path, script: &str, output: Option<&Path>, config: SceneConfig) -> Result<(), CliError> {
    let commands = parse_script(&read_script(script)?)?;
    let mut scene = load(path, config)?;

    for step in &commands {
        let report = step.command.apply(&mut scene).map_err(|source| CliError::Command { line: step.line, source })?;
        tracing::info!(line = step.line, "{report}");
        for event in scene.take_events() {
            tracing::debug!(line = step.line, ?event, "scene event");
        }
    }

    let text = scene.to_document().to_json()?;
    match output {
        Some(out) => {
            fs::write(out, text).map_err(|source| CliError::Write { path: out.to_owned(), source })?;
            tracing::info!(path = %out.display(), commands = commands.len(), "document written");
        }
        None => println!("{text}"),
    }
    Ok(())
}
