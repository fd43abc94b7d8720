#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! A thread-pool AMQP consumer, generalizing this codebase's earlier
//! thread-pool HTTP server to a message-bus front door: a fixed number
//! of threads, each owning its own channel, each polling with a short
//! timeout so a shutdown request is noticed promptly rather than
//! blocking forever on the next delivery.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Connection, ExchangeKind};

pub use config::Config;
pub use error::Error;
use error::InnerError;

pub mod config;
pub mod error;

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// A thread-pool AMQP consumer that dispatches each delivery's payload
/// to `func` and publishes whatever bytes it returns to the response
/// fanout exchange.
///
/// `func` is handed the raw request payload and decides the raw
/// response payload; it never sees the AMQP plumbing. The bus has no
/// opinion on the envelope's shape — that's the caller's concern.
pub struct BusServer {
    handles: Vec<JoinHandle<Result<(), Error>>>,
    running: Arc<AtomicBool>,
    config: Config,
}

impl BusServer {
    /// Start consuming `config.request_queue` on `conn` with
    /// `config.num_threads` threads, calling `func` for every delivery.
    pub fn new<F>(conn: Connection, config: Config, func: F) -> Result<Self, Error>
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, Error> + Clone + Send + Sync + 'static,
    {
        Self::run(conn, config, func)
    }

    /// Returns a reference to the [`Config`] used when creating the bus server.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn run<F>(conn: Connection, config: Config, func: F) -> Result<Self, Error>
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, Error> + Clone + Send + Sync + 'static,
    {
        let conn = Arc::new(conn);
        let running = Arc::new(AtomicBool::new(true));
        let mut handles = Vec::with_capacity(config.num_threads.get() as usize);

        for _ in 0..config.num_threads.get() {
            let conn = conn.clone();
            let func = func.clone();
            let running = running.clone();
            let config = config.clone();

            let handle = thread::spawn(move || -> Result<(), Error> {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .map_err(InnerError::Io)?;
                rt.block_on(consume_loop(conn, config, func, running))
            });
            handles.push(handle);
        }

        Ok(Self {
            handles,
            running,
            config,
        })
    }

    /// Requests a graceful stop; in-flight deliveries still get their
    /// response published and acknowledged before each thread exits.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Returns true unless the server has been stopped.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Waits for the consumer threads to finish by joining each handle.
    pub fn join_threads(&mut self) {
        while let Some(handle) = self.handles.pop() {
            let _ = handle.join();
        }
    }
}

async fn consume_loop<F>(
    conn: Arc<Connection>,
    config: Config,
    func: F,
    running: Arc<AtomicBool>,
) -> Result<(), Error>
where
    F: Fn(&[u8]) -> Result<Vec<u8>, Error>,
{
    let channel = conn.create_channel().await.map_err(InnerError::Amqp)?;
    channel
        .queue_declare(
            &config.request_queue,
            QueueDeclareOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(InnerError::Amqp)?;
    channel
        .exchange_declare(
            &config.response_exchange,
            ExchangeKind::Fanout,
            ExchangeDeclareOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(InnerError::Amqp)?;

    let mut consumer = channel
        .basic_consume(
            &config.request_queue,
            "addr-indexer-worker",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(InnerError::Amqp)?;

    loop {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let next = tokio::time::timeout(POLL_TIMEOUT, consumer.next()).await;
        let delivery = match next {
            Ok(Some(Ok(delivery))) => delivery,
            Ok(Some(Err(e))) => {
                log::error!("consumer error: {e}");
                continue;
            }
            Ok(None) => break, // the channel or connection closed
            Err(_timeout) => continue,
        };

        match func(&delivery.data) {
            Ok(payload) => {
                if let Err(e) = channel
                    .basic_publish(
                        &config.response_exchange,
                        "",
                        BasicPublishOptions::default(),
                        &payload,
                        BasicProperties::default(),
                    )
                    .await
                {
                    log::error!("publish error: {e}");
                }
                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                    log::error!("ack error: {e}");
                }
            }
            Err(Error::BadEnvelope(msg)) => {
                log::warn!("dropping unparseable delivery: {msg}");
                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                    log::error!("ack error: {e}");
                }
            }
            Err(Error::Stop) => {
                running.store(false, Ordering::SeqCst);
                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                    log::error!("ack error: {e}");
                }
                break;
            }
            Err(Error::Inner(e)) => {
                log::error!("handler error, message will be redelivered: {e}");
                // leave unacked: a connection drop or requeue will
                // redeliver it for another attempt.
            }
        }
    }

    Ok(())
}
