use std::sync::Arc;

use statica::config::Config;
use statica::logger;
use statica::server::{connection, listener, Server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = listener::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let access_log = cfg.logging.access_log;
    let server = Arc::new(Server::new(cfg));

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                if access_log {
                    logger::log_connection_accepted(&peer_addr);
                }
                connection::handle_connection(stream, peer_addr, Arc::clone(&server));
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
