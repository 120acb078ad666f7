use std::io::{stdin, stdout};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use tracing::{info, warn};

use perfcheck::config::{Config, load_config};
use perfcheck::logging;
use perfcheck::prompt::{self, Selection};
use perfcheck::sampler::{cancel_on_ctrl_c, cancel_pair};
use perfcheck::session;
use perfcheck::system::Collector;
use perfcheck::ui::Presenter;
use perfcheck::ui::theme::resolve_output_mode;

#[derive(Parser)]
#[command(
    name = "perfcheck",
    about = "Sample a process's memory, CPU time and paging counters and highlight changes"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Monitor this pid directly, skipping the prompts
    #[arg(long, conflicts_with = "name")]
    pid: Option<u32>,

    /// Look up instances of this process name, skipping the menu
    #[arg(long)]
    name: Option<String>,

    /// Number of samples to take, 0 runs until Ctrl+C
    #[arg(long)]
    iterations: Option<usize>,

    /// Delay between samples in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after this many seconds regardless of the sample count
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Output: auto, color, plain, json
    #[arg(long)]
    output: Option<String>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Write JSON logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let (mut config, config_warning) = load_config(cli.config.as_deref());
    apply_cli_overrides(&mut config, &cli);

    logging::init_logging(&config.logging)?;
    if let Some(warning) = config_warning {
        warn!("{warning}");
    }

    let mode = resolve_output_mode(&config.display.output);
    let mut ui = Presenter::new(stdout().lock(), mode);
    let mut input = stdin().lock();
    let mut collector = Collector::new();

    let selection = match (cli.pid, cli.name.as_deref()) {
        (Some(pid), _) => prompt::select_by_pid(&mut collector, pid),
        (None, Some(name)) => {
            prompt::intro(&mut ui)?;
            prompt::select_by_name(&mut collector, name, &mut input, &mut ui)?
        }
        (None, None) => prompt::run_menu(&mut collector, &mut input, &mut ui)?,
    };

    match selection {
        Selection::Chosen(target) => {
            let (canceller, signal) = cancel_pair();
            let ctrl_c = cancel_on_ctrl_c(canceller);
            let mut options = config.sampler.options();
            options.stop = options.stop.with_cancel(signal);

            let lines = session::monitor(collector, &target, options, &mut ui).await?;
            ctrl_c.abort();
            info!(pid = target.pid, lines, "performance check completed");
        }
        Selection::Invalid(err) => {
            info!(%err, "invalid selection");
            ui.error_line("Incorrect instance selection.")?;
        }
        Selection::NoInstances | Selection::Exit => {}
    }

    if mode.is_human() {
        prompt::completion(&mut ui)?;
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(iterations) = cli.iterations {
        config.sampler.iterations = iterations;
    }
    if let Some(interval) = cli.interval_ms {
        config.sampler.interval_ms = interval;
    }
    if let Some(duration) = cli.duration_secs {
        config.sampler.max_duration_secs = duration;
    }
    if let Some(ref output) = cli.output {
        config.display.output = output.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.logging.file = file.to_string_lossy().to_string();
    }
}
