use std::io::{self, Write};
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use futures_util::StreamExt;
use tracing::{error, info, warn};
use zbus::{Connection, MessageStream};

use mpris_mock_player::player::MockPlayer;
use mpris_mock_player::{lifetime, session_bus_available, Args};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logging();

    if !session_bus_available() {
        // No session bus on this machine: the surrounding harness treats
        // that as "feature unavailable" and skips, so exit clean.
        println!("D-Bus session bus not available, exiting");
        process::exit(0);
    }

    // Install the graceful-shutdown handlers before touching the bus, so a
    // signal during startup already takes the graceful path.
    let mut shutdown = match lifetime::ShutdownListener::install() {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = ?e, "failed to install signal handlers");
            println!("Mock player failed: {e}");
            let _ = io::stdout().flush();
            process::exit(1);
        }
    };
    lifetime::arm_watchdog(Duration::from_secs(args.timeout_secs));

    if let Err(e) = run(&args, &mut shutdown).await {
        error!(error = ?e, "mock player failed");
        println!("Mock player failed: {e:#}");
        let _ = io::stdout().flush();
        process::exit(1);
    }
}

async fn run(args: &Args, shutdown: &mut lifetime::ShutdownListener) -> Result<()> {
    let connection = Connection::session()
        .await
        .context("failed to connect to the session bus")?;
    // Subscribe before claiming the name so no early call can slip past.
    let mut stream = MessageStream::from(&connection);

    let player = MockPlayer::new();
    player
        .register(&connection, &args.bus_name)
        .await
        .with_context(|| format!("failed to acquire bus name {}", args.bus_name))?;

    // Readiness protocol: the harness waits for these two exact lines.
    println!("Mock player registered: {}", args.bus_name);
    println!("PlaybackStatus: Playing");
    io::stdout().flush()?;
    info!(bus_name = %args.bus_name, "mock player ready");

    loop {
        tokio::select! {
            sig = shutdown.recv() => {
                println!("Received {sig}, exiting gracefully");
                io::stdout().flush()?;
                info!(signal = %sig, "shutting down");
                return Ok(());
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(msg)) => {
                        if let Err(e) = player.serve_call(&connection, &msg).await {
                            warn!(error = ?e, "failed to answer method call");
                        }
                    }
                    Some(Err(e)) => warn!(error = ?e, "bad message on the bus"),
                    None => {
                        info!("bus connection closed, exiting");
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the readiness protocol, so diagnostics go to stderr.
    let fmt_layer = fmt::layer().with_target(true).with_writer(io::stderr);
    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
