use std::path::Path;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};

const LOG_FILE_BASENAME: &str = "guantask";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

/// File-only rotating logs; the terminal stays reserved for the ui module.
/// The returned handle must stay alive for the duration of the process.
pub fn init_logging(log_dir: &Path) -> Result<LoggerHandle, String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| format!("cannot create log directory '{}': {e}", log_dir.display()))?;

    Logger::try_with_env_or_str("info")
        .map_err(|e| e.to_string())?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .start()
        .map_err(|e| e.to_string())
}
