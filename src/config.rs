use crate::error::Error;
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

/// Bridge tunables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Largest distance from the view base address that is still
    /// handled by moving the cursor instead of opening a new memory view.
    pub page_size: u64,
    /// Delay between opening a memory view and focusing the requested byte in it.
    pub focus_delay_ms: u64,
    /// View type of memory inspection views.
    pub memory_view_type: String,
    /// Scheme of memory view resource locators.
    pub memory_scheme: String,
    /// Responses that may change debuggee memory.
    pub refresh_commands: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            page_size: 4096,
            focus_delay_ms: 500,
            memory_view_type: "hexEditor.hexedit".to_string(),
            memory_scheme: "vscode-debug-memory".to_string(),
            refresh_commands: vec![
                "setVariable".to_string(),
                "setExpression".to_string(),
                "writeMemory".to_string(),
            ],
        }
    }
}

impl BridgeConfig {
    const DEFAULT_PATH: &'static str = ".config/membridge/config.toml";
    const MAX_FOCUS_DELAY_MS: u64 = 60_000;

    /// Load config from `path`, or from the default location if `path` is [`None`].
    ///
    /// The default file is optional: if it is missing defaults are used.
    pub fn from_file(path: Option<&Path>) -> Result<Self, Error> {
        let data = match path {
            Some(path) => {
                read_to_string(path).map_err(|e| Error::ConfigRead(path.to_path_buf(), e))?
            }
            None => {
                let Some(home) = home::home_dir() else {
                    return Ok(Self::default());
                };
                let path = home.join(Self::DEFAULT_PATH);
                match read_to_string(&path) {
                    Ok(data) => data,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        return Ok(Self::default())
                    }
                    Err(e) => return Err(Error::ConfigRead(path, e)),
                }
            }
        };

        Self::from_toml(&data)
    }

    pub fn from_toml(data: &str) -> Result<Self, Error> {
        let config: Self = toml::de::from_str(data)?;
        if config.focus_delay_ms > Self::MAX_FOCUS_DELAY_MS {
            return Err(Error::ConfigValue(format!(
                "focus_delay_ms must not exceed {}, got {}",
                Self::MAX_FOCUS_DELAY_MS,
                config.focus_delay_ms
            )));
        }
        Ok(config)
    }

    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }
}
