use std::path::PathBuf;
use std::{fs, process};

use anyhow::{bail, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use planes::{
    config::Settings,
    engine::level::{self, LevelDefinition},
    renderer::{HeadlessRenderer, TerminalRenderer},
    session::{self, NoInput, NoopPacer, RealPacer, Session, TerminalInput},
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "planes play [level-name]";
const LOAD_USAGE: &str = "planes load <level.json>";
const SCRIPT_USAGE: &str = "planes script <level-name> <script-file> [--headless]";
const LEVELS_USAGE: &str = "planes levels";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let name = args.next().unwrap_or_else(|| level::DEFAULT_LEVEL.to_string());
            let _guard = setup_logging()?;
            play(&name)
        }
        Some("load") => {
            let path = args.next().context(LOAD_USAGE)?;
            let _guard = setup_logging()?;
            load(&path)
        }
        Some("script") => {
            let name = args.next().context(SCRIPT_USAGE)?;
            let path = args.next().context(SCRIPT_USAGE)?;
            let headless = match args.next().as_deref() {
                None => false,
                Some("--headless") => true,
                Some(other) => bail!("unexpected argument {other:?}\n\nUsage:\n  {SCRIPT_USAGE}"),
            };
            let _guard = setup_logging()?;
            script(&name, &path, headless)
        }
        Some("levels") => {
            for definition in level::builtin_levels() {
                println!("{}", definition.name);
            }
            Ok(())
        }
        _ => bail!(
            "Planes {} — tile maze walker\n\nUsage:\n  {PLAY_USAGE}\n  {LOAD_USAGE}\n  {SCRIPT_USAGE}\n  {LEVELS_USAGE}",
            session::VERSION
        ),
    }
}

fn play(name: &str) -> Result<()> {
    let settings = Settings::load();
    let input = TerminalInput::new(settings.key_bindings.clone());
    let renderer = TerminalRenderer::new()?;
    let mut session = Session::new(settings, renderer, input, RealPacer::new());

    if !session.load_level(name)? {
        tracing::warn!("no level named {name:?}, playing {}", level::DEFAULT_LEVEL);
    }
    session.operate()?;
    Ok(())
}

fn load(path: &str) -> Result<()> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let definition =
        LevelDefinition::from_json(&json).with_context(|| format!("Failed to parse {path}"))?;

    let settings = Settings::load();
    let input = TerminalInput::new(settings.key_bindings.clone());
    let renderer = TerminalRenderer::new()?;
    let mut session = Session::new(settings, renderer, input, RealPacer::new());

    session.load_custom_level(&definition)?;
    session.operate()?;
    Ok(())
}

fn script(name: &str, path: &str, headless: bool) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let instructions = session::parse_script(&text);
    let settings = Settings::load();

    let report = if headless {
        let mut session = Session::new(settings, HeadlessRenderer::new(), NoInput, NoopPacer);
        if !session.load_level(name)? {
            eprintln!("No level named {name:?}, using {}", level::DEFAULT_LEVEL);
        }
        let report = session.run_script(&instructions)?;
        tracing::info!(frames = session.renderer().frames(), "script finished");
        report
    } else {
        let input = TerminalInput::new(settings.key_bindings.clone());
        let renderer = TerminalRenderer::new()?;
        let mut session = Session::new(settings, renderer, input, RealPacer::new());
        session.load_level(name)?;
        let report = session.run_script(&instructions)?;
        session.wait()?;
        report
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Log to a file; the terminal belongs to the renderer. Buffered lines are
/// flushed when the returned guard drops.
fn setup_logging() -> Result<WorkerGuard> {
    let log_dir = log_directory();
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "planes.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!(
        "Planes {} started, logging to {}",
        session::VERSION,
        log_dir.display()
    );
    Ok(guard)
}

fn log_directory() -> PathBuf {
    if let Some(dir) = std::env::var_os("PLANES_LOG_DIR") {
        return PathBuf::from(dir);
    }
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".cache").join("planes").join("logs"),
        None => std::env::temp_dir().join("planes").join("logs"),
    }
}
