//! Runnable demo: wires configuration, the point registry, the simulator
//! task, and the TCP accept loop together.

use clap::Parser;
use iec101_slave::config::Config;
use iec101_slave::driver::ConnectionDriver;
use iec101_slave::grinder::Grinder;
use iec101_slave::registry::PointRegistry;
use iec101_slave::server::ServerBuilder;
use iec101_slave::sim::Generator;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "iec101-server", about = "Demo IEC 60870-5-101 slave")]
struct Cli {
    /// Path to a TOML config file; falls back to built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => Config::load(&path).unwrap_or_else(|err| {
            eprintln!("config error: {err}, falling back to defaults");
            Config::default()
        }),
        None => Config::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.clone()),
    )
    .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run(config))
}

async fn run(config: Config) -> std::io::Result<()> {
    let registry = PointRegistry::new();
    let mut generator = Generator::new(&config.points, &registry);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    log::info!(
        "listening on {}:{}",
        config.server.host,
        config.server.port
    );

    let active_connections = Rc::new(Cell::new(0usize));
    let max_connections = config.server.max_connections;

    let mut tick = tokio::time::interval(std::time::Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = tick.tick() => {
                generator.tick();
            }
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                if active_connections.get() >= max_connections {
                    log::warn!("rejecting connection from {peer}: at capacity");
                    drop(stream);
                    continue;
                }
                active_connections.set(active_connections.get() + 1);
                log::info!("accepted connection from {peer}");

                let server = ServerBuilder::new()
                    .asdu_addr(config.server.asdu_addr)
                    .link_address(config.server.link_address)
                    .common_address_width(config.server.common_address_width)
                    .background(config.server.background_scan)
                    .grinder(Grinder::new(config.grinder.enabled, config.grinder.probability))
                    .build();
                let server_id = server.id;
                let attached = registry.attach_all(server_id);

                let mut server = server;
                server.points = attached.clone();
                registry.register_server(server_id, server.event_queue_handle());

                let registry = registry.clone();
                let active_connections = active_connections.clone();
                tokio::task::spawn_local(async move {
                    let driver = ConnectionDriver::new(stream, server);
                    if let Err(err) = driver.run().await {
                        log::warn!("connection {peer} ended: {err}");
                    }
                    registry.detach_all(server_id, &attached);
                    registry.unregister_server(server_id);
                    active_connections.set(active_connections.get() - 1);
                    log::info!("connection {peer} closed");
                });
            }
        }
    }
}
