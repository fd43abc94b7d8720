use std::num::NonZeroU8;

#[derive(Debug, Clone)]
pub struct Config {
    /// Number of consumer threads, each holding its own AMQP channel.
    pub num_threads: NonZeroU8,
    /// Queue to consume requests from.
    pub request_queue: String,
    /// Fanout exchange to publish responses to.
    pub response_exchange: String,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: NonZeroU8::new(8).expect("non-zero"),
            request_queue: "account_req".to_string(),
            response_exchange: "account_ret".to_string(),
        }
    }
}

pub struct ConfigBuilder {
    num_threads: NonZeroU8,
    request_queue: String,
    response_exchange: String,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_threads(mut self, num: NonZeroU8) -> Self {
        self.num_threads = num;
        self
    }

    pub fn with_request_queue(mut self, queue: impl Into<String>) -> Self {
        self.request_queue = queue.into();
        self
    }

    pub fn with_response_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.response_exchange = exchange.into();
        self
    }

    pub fn build(self) -> Config {
        Config {
            num_threads: self.num_threads,
            request_queue: self.request_queue,
            response_exchange: self.response_exchange,
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        let d = Config::default();
        Self {
            num_threads: d.num_threads,
            request_queue: d.request_queue,
            response_exchange: d.response_exchange,
        }
    }
}
