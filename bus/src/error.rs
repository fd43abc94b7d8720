use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Inner(#[from] InnerError),

    /// The delivery's payload was not a well-formed request envelope.
    /// The caller acknowledges and drops it rather than requeuing,
    /// since there is no useful retry for an unparseable message.
    #[error("malformed request envelope: {0}")]
    BadEnvelope(String),

    #[error("received stop command")]
    Stop,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum InnerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serde JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),
}
