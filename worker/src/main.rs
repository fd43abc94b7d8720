//! Process bootstrap: load configuration, connect every adapter, start
//! the bus consumer, and wait for a shutdown signal.

use std::process::ExitCode;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use addr_indexer_adapters::{JsonRpcRawTxSource, MongoHistoryStore, RedisSnapshotCache, RedisStateGate};
use addr_indexer_bus::BusServer;
use addr_indexer_core::engine::Engine;
use addr_indexer_core::ports::StateGate;

mod config;
mod dispatch;
mod error;

use config::Config;
use error::Error;

fn run() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    log::info!("configuration loaded");

    let history = MongoHistoryStore::connect(&config.mongo_uri(), &config.history.database)?;
    log::info!("connected to history store at {}", config.history.host);

    let cache = RedisSnapshotCache::connect(&config.redis_uri())?;
    let gate: Arc<dyn StateGate> = Arc::new(RedisStateGate::connect(&config.redis_uri())?);
    log::info!("connected to cache at {}", config.cache.host);

    let raw_tx = JsonRpcRawTxSource::new(
        &config.upstream_url(),
        config.upstream.user.clone(),
        config.upstream.pass.clone(),
        config.upstream.timeout,
    );
    log::info!("upstream raw-tx source configured at {}", config.upstream.host);

    let engine = Arc::new(Engine::new(
        Arc::new(history),
        Arc::new(cache),
        Arc::new(raw_tx),
        gate.clone(),
    ));

    let amqp_uri = config.amqp_uri();
    let conn = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Config(format!("failed to start amqp runtime: {e}")))?
        .block_on(lapin::Connection::connect(
            &amqp_uri,
            lapin::ConnectionProperties::default(),
        ))?;
    log::info!("connected to message bus at {}", config.bus.host);

    let bus_config = addr_indexer_bus::Config::builder()
        .with_num_threads(config.num_threads)
        .build();

    let mut bus = BusServer::new(conn, bus_config, move |payload: &[u8]| {
        dispatch::handle_delivery(&engine, gate.as_ref(), payload)
    })?;
    log::info!(
        "worker started with {} consumer threads",
        bus.config().num_threads
    );

    let (tx, rx) = mpsc::channel();
    let set_handler_result = ctrlc::try_set_handler(move || {
        let _ = tx.send(());
    });

    if set_handler_result.is_ok() {
        loop {
            if rx.recv_timeout(Duration::from_millis(100)).is_ok() {
                break;
            }
            if !bus.is_running() {
                break;
            }
        }
    }

    log::info!("shutdown signal received, draining in-flight requests");
    bus.stop();
    bus.join_threads();
    log::info!("graceful drain complete");

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
