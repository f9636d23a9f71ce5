use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- generic errors --------------------------------------------
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    // --------------------------------- configuration errors --------------------------------------
    #[error("read config file {0}: {1}")]
    ConfigRead(PathBuf, std::io::Error),
    #[error("config file parsing error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("invalid config value: {0}")]
    ConfigValue(String),

    // --------------------------------- protocol errors -------------------------------------------
    #[error("malformed protocol message: {0}")]
    MalformedMessage(String),
    #[error("missing Content-Length header")]
    MissingContentLength,
    #[error("invalid Content-Length header: {0}")]
    InvalidContentLength(String),
    #[error("invalid memory locator: {0}")]
    InvalidLocator(String),

    // --------------------------------- host errors -----------------------------------------------
    #[error("workbench error: {0:#}")]
    Workbench(anyhow::Error),
    #[error("channel of view {0} is closed")]
    ChannelClosed(crate::editor::ViewId),
}

impl Error {
    /// Return true if the error should stop the replay of a protocol stream.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Json(_) => false,
            Error::ConfigRead(_, _) => false,
            Error::MalformedMessage(_) => false,
            Error::InvalidLocator(_) => false,
            Error::Workbench(_) => false,
            Error::ChannelClosed(_) => false,

            // stream or config is broken, nothing after this point can be trusted
            Error::IO(_) => true,
            Error::ConfigParse(_) => true,
            Error::ConfigValue(_) => true,
            Error::MissingContentLength => true,
            Error::InvalidContentLength(_) => true,
        }
    }
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "bridge", "{:#}", e);
                None
            }
        }
    };
    ($log_fn: path, $res: expr, $msg: tt) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "bridge", concat!($msg, " {:#}"), e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::warn, $res, $msg)
    };
}

/// Transforms `Result` into `Option` and put error into debug logs if it occurs.
#[macro_export]
macro_rules! muted_error {
    ($res: expr) => {
        $crate::_error!(log::debug, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::debug, $res, $msg)
    };
}
