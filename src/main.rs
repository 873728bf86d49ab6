mod command;
mod config;
mod reply;
mod server;
mod store;
mod transport;

use config::HostConfig;
use server::{ControlListener, Supervisor};

use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const STARTUP_WAIT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = HostConfig::default();

    info!("Package host starting");
    info!("  Commands:  {}", config.bind_addr);
    info!("  Control:   {}", config.control_addr);
    info!("  Peer:      {} (data {}, messages {})", config.peer.ip, config.peer.data_port, config.peer.message_port);
    info!("  Store:     {}", config.store_dir.display());
    info!("  Launcher:  {} {}", config.launcher.program, config.launcher.args.join(" "));

    let mut supervisor = Supervisor::start(config.clone());
    report_startup(&supervisor).await;

    let listener = match ControlListener::bind(&config).await {
        Ok(listener) => {
            match listener.local_addr() {
                Ok(addr) => info!("Restart control on {}", addr),
                Err(e) => warn!("Restart control address unknown: {:#}", e),
            }
            Some(listener)
        }
        Err(e) => {
            warn!("Restart control unavailable: {:#}", e);
            None
        }
    };

    tokio::select! {
        _ = serve_control(listener, &mut supervisor) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to wait for Ctrl-C: {}", e);
            }
            info!("Shutting down");
        }
    }

    supervisor.shutdown().await;
    Ok(())
}

/// Log where the first instance ended up listening
async fn report_startup(supervisor: &Supervisor) {
    let Some(instance) = supervisor.current() else {
        return;
    };

    match tokio::time::timeout(STARTUP_WAIT, instance.listening_addr()).await {
        Ok(Ok(addr)) => info!("Host ready on {}", addr),
        Ok(Err(e)) => error!("Host failed to start: {:#}", e),
        Err(_) => warn!(
            "Host not listening after {:?} (state {:?}); still retrying",
            STARTUP_WAIT,
            instance.state()
        ),
    }
}

/// Handle restart signals; never returns
async fn serve_control(listener: Option<ControlListener>, supervisor: &mut Supervisor) {
    if let Some(listener) = listener {
        if let Err(e) = listener.run(supervisor).await {
            error!("Control listener stopped: {:#}", e);
        }
    }

    // Without restart control the current instance keeps serving on its own
    std::future::pending::<()>().await
}
