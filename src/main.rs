use anyhow::Result;
use clap::{Parser, Subcommand};
use codex_monitor::config::{Config, FileConfigSource};
use codex_monitor::host::{JsonLinesHost, JsonLinesSource};
use codex_monitor::monitor::Monitor;
use codex_monitor::output::{DiagnosticChannel, OutputChannel};
use codex_monitor::sound::{SoundFallbackChain, SystemCommandRunner};
use codex_monitor::tone::CpalTone;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "codex-monitor")]
#[command(about = "Alert on suspiciously large single-shot text insertions", long_about = None)]
struct Cli {
    /// Settings file (defaults to ~/.codex-monitor/settings.yaml)
    #[arg(long, global = true, env = "CODEX_MONITOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read host messages as JSON lines on stdin and answer UI requests on stdout
    Watch,
    /// Run the sound fallback chain once and report which mechanism worked
    TestSound,
    /// Print the settings path and the effective settings
    ShowConfig,
}

fn main() -> Result<()> {
    // stdout carries the host protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch_command(config_path),
        Commands::TestSound => test_sound_command(config_path),
        Commands::ShowConfig => show_config_command(config_path),
    }
}

fn build_chain(config: &Config, output: Arc<dyn OutputChannel>) -> SoundFallbackChain {
    let chain = SoundFallbackChain::new(Arc::new(SystemCommandRunner), output);
    if config.codex_monitor.in_process_tone {
        chain.with_tone(Arc::new(CpalTone::default()))
    } else {
        chain
    }
}

fn watch_command(config_path: PathBuf) -> Result<()> {
    let config = Config::load_or_create(&config_path)?;
    let log_path = config.log_path()?;

    tracing::info!("codex-monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Settings: {}", config_path.display());
    tracing::info!("Diagnostic log: {}", log_path.display());

    let output: Arc<dyn OutputChannel> = Arc::new(DiagnosticChannel::new(log_path));
    let chain = Arc::new(build_chain(&config, Arc::clone(&output)));
    let host = Arc::new(JsonLinesHost::new(io::stdout()));
    let source_config = Arc::new(FileConfigSource::new(&config_path));

    let monitor = Monitor::new(source_config, output, host, chain);

    let stdin = io::stdin();
    let mut source = JsonLinesSource::new(stdin.lock());
    let result = monitor.run(&mut source);

    // Sound threads still running are not joined: their outcome lines are
    // dropped by the disposed channel and they die with the process.
    monitor.deactivate();
    tracing::info!("codex-monitor stopped");
    result
}

fn test_sound_command(config_path: PathBuf) -> Result<()> {
    let config = Config::load_or_create(&config_path)?;
    let output: Arc<dyn OutputChannel> = Arc::new(DiagnosticChannel::new(config.log_path()?));
    let chain = build_chain(&config, Arc::clone(&output));

    println!("Environment: {:?}", chain.environment());
    let candidates = chain.candidates();
    for candidate in &candidates {
        println!("  candidate: {} -> {}", candidate.label, candidate.command_line());
    }

    let outcome = chain.try_play_candidates(&candidates);
    output.dispose();

    if outcome.succeeded {
        println!(
            "✓ Sound played via {}",
            outcome.method.as_deref().unwrap_or("unknown")
        );
        Ok(())
    } else {
        anyhow::bail!(
            "No sound mechanism worked: {}",
            outcome.diagnostic.as_deref().unwrap_or("unknown")
        )
    }
}

fn show_config_command(config_path: PathBuf) -> Result<()> {
    let config = Config::load_or_create(&config_path)?;
    println!("# {}", config_path.display());
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
