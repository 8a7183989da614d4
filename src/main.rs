use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::responses::error_to_response;
use crate::router::handle;
use astra::{Request, Server};
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod dataset;
mod domain;
mod economics;
mod engine;
mod errors;
mod resolver;
mod responses;
mod router;

#[cfg(test)]
mod tests;

fn main() {
    // 1️⃣ Environment and logging
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,str_economics=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    // 2️⃣ Configuration and engine
    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuration error: {e}");
            std::process::exit(1);
        }
    };
    let addr = config.bind_addr;

    let engine = match Engine::from_config(config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("❌ Engine initialization failed: {e}");
            std::process::exit(1);
        }
    };

    // 3️⃣ Start the server
    info!("Starting server at http://{addr}");
    let server = Server::bind(&addr).max_workers(8);

    // 4️⃣ Serve requests, passing the engine into the closure
    let result = server.serve(move |req: Request, _info| {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let resp = match handle(req, &engine) {
            Ok(resp) => resp,
            Err(err) => error_to_response(err),
        };

        info!(
            %method,
            path = %path,
            status = resp.status().as_u16(),
            ms = started.elapsed().as_millis() as u64,
            "request"
        );
        resp
    });

    if let Err(e) = result {
        error!("Server ended with error: {e}");
    }

    info!("Server shut down cleanly.");
}
