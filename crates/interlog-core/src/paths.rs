//! Standard paths used by interlog

use std::path::PathBuf;

/// Standard interlog paths
pub struct Paths {
    /// Data directory (~/.local/share/interlog)
    pub data: PathBuf,
    /// Config directory (~/.config/interlog)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("interlog");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("interlog");

        Self { data, config }
    }

    /// Path of the persisted session collection
    pub fn sessions_file(&self) -> PathBuf {
        self.data.join("sessions.json")
    }

    /// Path of the TUI log file
    pub fn log_file(&self) -> PathBuf {
        self.data.join("interlog.log")
    }

    /// Path of the user configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    /// Replace the data directory (from `--data-dir` or the config file)
    pub fn with_data_dir(mut self, data: PathBuf) -> Self {
        self.data = data;
        self
    }
}
