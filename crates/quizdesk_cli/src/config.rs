//! Process-wide options shared by every subcommand.
//!
//! Each option can also come from the environment, so scripted runs do not
//! need to repeat them.

use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Snapshot file holding the store
    #[arg(
        long,
        global = true,
        env = "QUIZDESK_DATA_PATH",
        default_value = "./data/state.json"
    )]
    pub data_path: PathBuf,

    /// Log level: trace|debug|info|warn|error (default depends on build mode)
    #[arg(long, global = true, env = "QUIZDESK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files (default: stderr)
    #[arg(long, global = true, env = "QUIZDESK_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl GlobalOpts {
    /// Requested log level, or the build-mode default.
    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or_else(|| quizdesk_core::default_log_level())
    }

    pub fn init_logging(&self) -> Result<()> {
        quizdesk_core::init_logging(self.log_level(), self.log_dir.as_deref())
            .map_err(|message| anyhow!("logging setup failed: {message}"))
    }
}
