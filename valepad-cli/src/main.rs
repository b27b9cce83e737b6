use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use valepad_common::traits::RobotTransport;
use valepad_core::input::GilrsInput;
use valepad_core::tasks::battery_poll::spawn_battery_poll_task;
use valepad_core::{CommandDispatcher, ControlConfig, ControlSession, ReqwestTransport, SessionExit};
use valepad_tui::spawn_status_display_task;

#[derive(Parser, Debug, Clone)]
#[command(name = "valepad")]
#[command(author, version, about = "Drive a Valetudo vacuum robot with a gamepad")]
struct Args {
    /// JSON config file (default: <config dir>/valepad/config.json if present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Robot base URL, e.g. http://192.168.178.43 (overrides config and VALETUDO_URL)
    #[arg(long)]
    url: Option<String>,

    /// Stick deadzone in (0, 1)
    #[arg(long)]
    deadzone: Option<f64>,

    /// Control loop rate in ticks per second
    #[arg(long)]
    tick_hz: Option<u32>,

    /// Run without the status display (logs only)
    #[arg(long, default_value = "false")]
    headless: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("valepad=info"));
    let sub = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

fn load_config(args: &Args) -> anyhow::Result<ControlConfig> {
    let mut config = ControlConfig::load(args.config.as_deref())?;
    if let Some(url) = &args.url {
        config.valetudo_url = url.clone();
    }
    if let Some(deadzone) = args.deadzone {
        config.deadzone = deadzone;
    }
    if let Some(tick_hz) = args.tick_hz {
        config.tick_hz = tick_hz;
    }
    config.validate()?;
    Ok(config)
}

/// Installs the SIGINT and SIGTERM handlers right away and returns a future
/// that resolves on the first of them. Once installed, neither signal kills
/// the process, so the session always gets to stop the robot.
#[cfg(unix)]
fn interrupt_signal() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("SIGINT received."),
            _ = terminate.recv() => info!("SIGTERM received."),
        }
    })
}

#[cfg(windows)]
fn interrupt_signal() -> std::io::Result<impl Future<Output = ()>> {
    let mut ctrl_c = tokio::signal::windows::ctrl_c()?;
    Ok(async move {
        ctrl_c.recv().await;
        info!("Ctrl-C received.");
    })
}

async fn join_quietly(name: &str, handle: JoinHandle<()>) {
    match tokio::time::timeout(Duration::from_secs(1), handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("{} task failed: {}", name, e),
        Err(_) => warn!("{} task did not stop in time", name),
    }
}

async fn run(args: Args) -> anyhow::Result<SessionExit> {
    let config = load_config(&args)?;
    // Handlers go in before anything can enable manual control on the robot.
    let interrupt = interrupt_signal()?;

    // The controller is opened before anything touches the network.
    let input = GilrsInput::open()?;

    let transport: Arc<dyn RobotTransport> = Arc::new(ReqwestTransport::new(
        config.base_url()?,
        config.request_timeout(),
    )?);
    info!("Driving robot at {}", config.valetudo_url);

    let dispatcher = Arc::new(CommandDispatcher::from_config(transport.clone(), &config));
    let session = ControlSession::new(config.clone(), input, dispatcher)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (battery_handle, battery_rx) = spawn_battery_poll_task(
        transport,
        config.battery_poll_period(),
        config.request_timeout(),
        shutdown_rx.clone(),
    );
    let display_handle = if args.headless {
        None
    } else {
        Some(spawn_status_display_task(
            session.subscribe(),
            battery_rx,
            config.display_refresh_period(),
            shutdown_rx,
        ))
    };

    let outcome = session.run(interrupt).await;

    let _ = shutdown_tx.send(true);
    join_quietly("Battery poller", battery_handle).await;
    if let Some(handle) = display_handle {
        join_quietly("Status display", handle).await;
    }

    Ok(outcome?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    init_tracing();
    let args = Args::parse();
    info!("valepad starting. headless={}", args.headless);
    if dotenv_loaded {
        info!("Loaded environment from .env");
    }

    match run(args).await {
        Ok(exit) => {
            info!("Session ended: {:?}. Goodbye!", exit);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}
