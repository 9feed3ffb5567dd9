//! quill entrypoint: a small REPL demonstrating the line reader.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use core_config::{ConfigContext, load_from};
use core_events::input_channel;
use core_reader::{ReadOptions, ReaderSession};
use core_state::ReaderSettings;
use core_terminal::{CrosstermBackend, CrosstermRenderer, Renderer, TerminalBackend};

mod listener;

const COMMANDS: &[&str] = &["help", "history", "password", "exit"];

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "Interactive line reader demo")]
struct Args {
    /// Prompt text.
    #[arg(long, default_value = "quill> ")]
    prompt: String,
    /// Render the input as a single horizontally-scrolling line.
    #[arg(long)]
    one_line: bool,
    /// Optional configuration file path (overrides discovery of `quill.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let file_appender = tracing_appender::rolling::never(log_dir, "quill.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; drop the guard so the
        // writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(target: "runtime.panic", ?info, "panic");
        default_panic(info);
    }));
}

fn build_settings(args: &Args) -> Result<ReaderSettings> {
    let mut config = load_from(args.config.clone())?;
    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    let (left, right) = config.apply_context(ConfigContext::new(width, height));
    let reader = &config.file.reader;
    Ok(ReaderSettings {
        left_margin: left,
        right_margin: right,
        mask_char: reader.mask_scalar(),
        tab_width: reader.tab_width,
        suggestions: Some(Arc::new(|text: &str, pos: usize, delims: &[char]| {
            // Complete the word under the cursor against the command set.
            let upto: String = text.chars().take(pos).collect();
            let word = upto
                .rsplit(|c: char| delims.contains(&c))
                .next()
                .unwrap_or_default();
            COMMANDS
                .iter()
                .filter(|c| c.starts_with(word))
                .map(|c| c.to_string())
                .collect()
        })),
        suggestion_delims: vec![' '],
        history_dedup: reader.history_dedup,
    })
}

fn repl(args: &Args, session: &mut ReaderSession) -> Result<()> {
    let mut backend = CrosstermBackend::new();
    backend.set_title("quill")?;
    let _guard = backend.enter_guard()?;

    let (tx, mut input) = input_channel();
    let stop = Arc::new(AtomicBool::new(false));
    let listener = listener::spawn(tx, stop.clone());

    let mut renderer = CrosstermRenderer::new();
    let opts = ReadOptions {
        one_line_wrap: args.one_line,
        ..ReadOptions::default()
    };

    loop {
        let line = session.read_with(&args.prompt, &mut renderer, &mut input, opts)?;
        match line.as_str() {
            "" => continue,
            "exit" => break,
            "help" => {
                renderer.write_raw("commands: help, history, password, exit\r\n")?;
            }
            "history" => {
                let entries: Vec<String> = session
                    .history()
                    .iter()
                    .enumerate()
                    .map(|(i, e)| format!("{:>3}  {e}\r\n", i + 1))
                    .collect();
                renderer.write_raw(&entries.concat())?;
            }
            "password" => {
                let secret = session.read_password("secret: ", &mut renderer, &mut input)?;
                renderer.write_raw(&format!("read {} scalars\r\n", secret.chars().count()))?;
            }
            other => {
                renderer.write_raw(&format!("unknown command: {other}\r\n"))?;
            }
        }
    }

    stop.store(true, Ordering::Relaxed);
    let _ = listener.join();
    Ok(())
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    let args = Args::parse();
    info!(target: "runtime", one_line = args.one_line, "startup");

    let settings = build_settings(&args)?;
    let mut session = ReaderSession::new(settings)?;
    repl(&args, &mut session)?;

    info!(target: "runtime", "shutdown");
    Ok(())
}
