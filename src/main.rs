use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

use solterm::api::DEFAULT_API_BASE;
use solterm::app::{self, Launch};
use solterm::catalog::{Catalog, SOL_SYSTEM};
use solterm::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};

#[derive(Parser, Debug, Clone)]
#[command(name = "solterm")]
#[command(about = "Animated star systems in the terminal")]
struct Cli {
    /// Star system to open first (file stem in the systems directory)
    #[arg(long, default_value = SOL_SYSTEM)]
    system: String,

    /// Directory holding star system JSON files
    #[arg(long)]
    systems_dir: Option<PathBuf>,

    /// Fetch Solar System bodies from the REST API instead of the built-in table
    #[arg(long, default_value_t = false)]
    remote: bool,

    /// Base URL of the bodies API
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Simulated days per real second
    #[arg(long)]
    warp: Option<f64>,

    /// Terminal cell height/width ratio
    #[arg(long)]
    aspect: Option<f64>,

    /// Force monochrome (no colors)
    #[arg(long, default_value_t = false)]
    mono: bool,

    /// Print one frame as plain text and exit
    #[arg(long, default_value_t = false)]
    snapshot: bool,

    /// Snapshot width in cells
    #[arg(long, default_value_t = 80)]
    width: usize,

    /// Snapshot height in cells
    #[arg(long, default_value_t = 24)]
    height: usize,
}

impl Cli {
    fn apply(&self, mut s: Settings) -> Settings {
        if let Some(dir) = &self.systems_dir {
            s.systems_dir = dir.clone();
        }
        if let Some(w) = self.warp {
            s.warp_days_per_sec = w;
        }
        if let Some(a) = self.aspect {
            s.aspect_ratio = a;
        }
        if self.mono {
            s.enable_color = false;
        }
        s
    }
}

fn init_logging(settings: &Settings, paths: &Paths, to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("SOLTERM_LOG").unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&paths.log_path)
            .with_context(|| format!("open log {}", paths.log_path.display()))?;
        builder.with_writer(Mutex::new(file)).with_ansi(false).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = project_paths()?;
    let persisted = load_settings(&paths.settings_path);
    let settings = cli.apply(persisted.clone());
    init_logging(&settings, &paths, cli.snapshot)?;
    info!(?settings, system = %cli.system, remote = cli.remote, "starting");

    let launch = Launch {
        system: cli.system.clone(),
        remote: cli.remote,
        api_base: cli.api_base.clone(),
    };

    if cli.snapshot {
        let mut catalog = Catalog::scan(&settings.systems_dir).context("scan systems directory")?;
        let (system, status) = app::load_initial(&mut catalog, &launch).await?;
        if let Some(msg) = status {
            eprintln!("{msg}");
        }
        println!("{}", app::snapshot(&system, &settings, cli.width, cli.height));
        return Ok(());
    }

    app::run(&settings, launch).await?;
    save_settings_atomic(&paths.settings_path, &persisted)?;
    Ok(())
}
