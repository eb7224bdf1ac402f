use clap::{Parser, Subcommand, ValueEnum};
use pageforge::utils::{logging, ScreenshotManager};
use pageforge::{
    BrowserPresets, DriverKind, DriverManager, EnvironmentManager, Page, Settings, WaitOptions,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pageforge", version, about = "Test runner for pageforge suites")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Test markers, mapped to test-name prefixes in the suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Marker {
    Smoke,
    Regression,
    Slow,
    Integration,
    Unit,
}

impl Marker {
    fn prefix(self) -> &'static str {
        match self {
            Marker::Smoke => "smoke_",
            Marker::Regression => "regression_",
            Marker::Slow => "slow_",
            Marker::Integration => "integration_",
            Marker::Unit => "unit_",
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the test suite, optionally restricted to markers
    Run {
        /// Markers to include (repeatable); tests are matched by name prefix
        #[arg(long, value_enum)]
        marker: Vec<Marker>,
        /// Run tests on multiple threads instead of serially
        #[arg(long)]
        parallel: bool,
        /// Extra substring filter on test names
        #[arg(long)]
        filter: Option<String>,
    },
    /// Verify the local environment can run browser tests
    Check,
    /// Run the built-in usage example against a live browser
    Demo {
        #[arg(long, default_value = "https://example.com")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("failed to load settings, using defaults: {e}");
        Settings::default()
    });
    logging::init(&settings.log_level);

    match cli.command {
        Command::Run {
            marker,
            parallel,
            filter,
        } => {
            let code = run_suite(&marker, parallel, filter.as_deref())?;
            std::process::exit(code);
        }
        Command::Check => {
            let ok = check_environment(&settings);
            std::process::exit(if ok { 0 } else { 1 });
        }
        Command::Demo { url } => {
            run_demo(&settings, &url).await?;
        }
    }
    Ok(())
}

/// Shell out to `cargo test` once per marker (or once overall) and fold the
/// exit codes together.
fn run_suite(markers: &[Marker], parallel: bool, filter: Option<&str>) -> std::io::Result<i32> {
    let name_filters: Vec<String> = if markers.is_empty() {
        vec![filter.unwrap_or("").to_string()]
    } else {
        markers
            .iter()
            .map(|m| format!("{}{}", m.prefix(), filter.unwrap_or("")))
            .collect()
    };

    let mut worst = 0;
    for name_filter in name_filters {
        let mut cmd = std::process::Command::new("cargo");
        cmd.arg("test");
        if !name_filter.is_empty() {
            cmd.arg(&name_filter);
        }
        cmd.arg("--");
        if !parallel {
            cmd.arg("--test-threads=1");
        }

        info!(filter = %name_filter, parallel, "running test subset");
        let status = cmd.status()?;
        let code = status.code().unwrap_or(1);
        if code != 0 {
            worst = code;
        }
    }
    Ok(worst)
}

fn check_environment(settings: &Settings) -> bool {
    let mut ok = true;

    match settings.ensure_dirs() {
        Ok(()) => info!("output directories present"),
        Err(e) => {
            error!(error = %e, "cannot create output directories");
            ok = false;
        }
    }

    match headless_chrome::browser::default_executable() {
        Ok(path) => info!(chrome = %path.display(), "browser binary found"),
        Err(e) => {
            error!(error = %e, "no usable Chrome/Chromium binary");
            ok = false;
        }
    }

    let environments = EnvironmentManager::with_defaults();
    if environments.get(&settings.environment).is_some() {
        info!(environment = %settings.environment, "default environment known");
    } else {
        error!(environment = %settings.environment, "default environment is not defined");
        ok = false;
    }

    if ok {
        info!("environment check passed");
    } else {
        error!("environment check failed");
    }
    ok
}

/// The framework end to end: scoped driver, page handle, wait, screenshot.
async fn run_demo(settings: &Settings, url: &str) -> pageforge::Result<()> {
    settings.ensure_dirs()?;

    let config = BrowserPresets::by_name(&settings.default_preset)
        .unwrap_or_else(BrowserPresets::default_preset)
        .headless(settings.headless);

    let manager = DriverManager::new();
    let scoped = manager.scoped(DriverKind::Browser, config).await?;

    let page = Page::new(scoped.driver()).with_url(url);
    page.open().await?;

    let opts = WaitOptions::from_settings(settings);
    page.waits
        .wait_for("demo page has a title", opts, || {
            let driver = scoped.driver();
            async move {
                driver
                    .title()
                    .await
                    .map(|t| !t.trim().is_empty())
                    .unwrap_or(false)
            }
        })
        .await?;

    let title = page.title().await?;
    let current = page.current_url().await?;
    info!(%title, %current, "page loaded");

    let shot =
        ScreenshotManager::save_timestamped(&*scoped.driver(), &settings.screenshots_dir, "demo")
            .await?;
    info!(path = %shot.display(), "demo screenshot saved");

    Ok(())
}
