//! Minimal single-connection demo: accept one master, attach two points,
//! and drive the protocol loop. Run with `cargo run --example server`.

use iec101_slave::driver::ConnectionDriver;
use iec101_slave::registry::PointRegistry;
use iec101_slave::server::ServerBuilder;
use tokio::net::TcpListener;

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let registry = PointRegistry::new();
    registry.add(iec101_slave::Point::new_single(1, true));
    registry.add(iec101_slave::Point::new_measured(1001, 0.0));

    let listener = TcpListener::bind(("127.0.0.1", 4001)).await?;
    println!("iec101 demo server listening on 127.0.0.1:4001");

    let (stream, peer) = listener.accept().await?;
    println!("accepted connection from {peer}");

    let mut server = ServerBuilder::new()
        .asdu_addr(1)
        .link_address(1)
        .background(true)
        .build();
    let attached = registry.attach_all(server.id);
    server.points = attached;

    let driver = ConnectionDriver::new(stream, server);
    driver.run().await
}
