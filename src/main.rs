use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fleetwatch::report::{export_to_file, health_changes};
use fleetwatch::{logging, FileSource, Ingestor, Settings};
use fleetwatch_core::{AlarmHealth, FailingHosts, NamespaceHealth, StatusFilter, StatusStore};
use fleetwatch_render::{RenderOptions, Renderer};
use fleetwatch_types::current_timestamp_ms;
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "fleetwatch")]
#[command(about = "Query the health of a fleet status tree")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Status tree JSON file (overrides source.path)
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Health of every namespace
    Namespaces {
        /// Only namespaces at or below this one
        #[arg(long, default_value = "")]
        ns: String,
    },
    /// Health of every alarm
    Alarms {
        #[arg(long, default_value = "")]
        ns: String,
    },
    /// Hosts with an unhealthy tag
    FailingHosts {
        #[arg(long, default_value = "")]
        ns: String,
    },
    /// Statuses matching a filter, one JSON object per line
    List {
        #[arg(long, default_value = "")]
        alarm: String,
        #[arg(long, default_value = "")]
        host: String,
        #[arg(long, default_value = "")]
        level: String,
    },
    /// Print the subtree at or below a namespace
    Lookup {
        #[arg(default_value = "")]
        query: String,
    },
    /// Write a JSON report of every query
    Export { path: PathBuf },
    /// Render a chart image
    Render {
        #[arg(long)]
        id: String,
        #[arg(long)]
        ns: String,
        #[arg(long)]
        measurement: String,
        /// End of the chart window in unix milliseconds (default: now)
        #[arg(long)]
        time: Option<u64>,
        #[arg(long, default_value = "")]
        func: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Poll the source and log namespace health changes
    Watch {
        /// Poll interval in milliseconds (default: source.refresh_ms)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(file) = args.file {
        settings.source.path = file;
    }
    logging::init(&settings.log.filter);

    match args.command {
        Command::Namespaces { ns } => {
            let store = load_store(&settings.source.path)?;
            print_json(&store.with_subtree(&ns, NamespaceHealth::from_tree))
        }
        Command::Alarms { ns } => {
            let store = load_store(&settings.source.path)?;
            print_json(&store.with_subtree(&ns, AlarmHealth::from_tree))
        }
        Command::FailingHosts { ns } => {
            let store = load_store(&settings.source.path)?;
            print_json(&store.with_subtree(&ns, FailingHosts::from_tree))
        }
        Command::List { alarm, host, level } => {
            let store = load_store(&settings.source.path)?;
            let filter = StatusFilter::from_args(&alarm, &host, &level);
            for entry in store.status_entries(&filter) {
                println!("{}", serde_json::to_string(&entry)?);
            }
            Ok(())
        }
        Command::Lookup { query } => {
            let store = load_store(&settings.source.path)?;
            print_json(&store.lookup(&query))
        }
        Command::Export { path } => {
            let store = load_store(&settings.source.path)?;
            export_to_file(&store, &path, current_timestamp_ms())?;
            println!("Exported status report to: {}", path.display());
            Ok(())
        }
        Command::Render {
            id,
            ns,
            measurement,
            time,
            func,
            title,
            filter,
        } => {
            let time = time.unwrap_or_else(current_timestamp_ms);
            let opts = RenderOptions::new(id, ns, measurement, time)
                .func(func)
                .title(title)
                .filter(filter);
            run_render(&settings, &opts)
        }
        Command::Watch { interval } => {
            let interval_ms = interval.unwrap_or(settings.source.refresh_ms).max(1);
            run_watch(&settings.source.path, Duration::from_millis(interval_ms))
        }
    }
}

fn load_store(path: &Path) -> Result<StatusStore> {
    let tree = FileSource::new(path)
        .load()
        .with_context(|| format!("Failed to load status tree from {}", path.display()))?;
    Ok(StatusStore::from_tree(tree))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render one chart with the configured renderer
fn run_render(settings: &Settings, opts: &RenderOptions) -> Result<()> {
    let renderer = Renderer::from_settings(&settings.render);
    let rt = tokio::runtime::Runtime::new()?;

    match rt.block_on(renderer.render_to_png(opts)) {
        Ok(path) => {
            println!("{}", path.display());
            Ok(())
        }
        Err(err) => {
            if err.is_retryable() {
                warn!("Render failed, a retry may succeed");
            }
            Err(err.into())
        }
    }
}

/// Poll the source file until interrupted
fn run_watch(path: &Path, interval: Duration) -> Result<()> {
    let store = Arc::new(StatusStore::new());
    let ingestor = Ingestor::new(Box::new(FileSource::new(path)), Arc::clone(&store));
    info!(source = %path.display(), interval_ms = interval.as_millis() as u64, "Watching");

    let mut last = NamespaceHealth::default();
    let on_update = move |store: &StatusStore| {
        let health = store.namespace_health();
        for change in health_changes(&last, &health) {
            match change.now {
                Some(true) => info!(namespace = %change.namespace, was = ?change.was, "healthy"),
                Some(false) => warn!(namespace = %change.namespace, was = ?change.was, "unhealthy"),
                None => info!(namespace = %change.namespace, "removed"),
            }
        }
        last = health;
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        tokio::select! {
            _ = ingestor.run(interval, on_update) => Ok(()),
            res = tokio::signal::ctrl_c() => {
                if let Err(err) = &res {
                    error!("Failed to listen for ctrl-c: {}", err);
                }
                info!("Stopped");
                res.map_err(anyhow::Error::from)
            }
        }
    })
}
