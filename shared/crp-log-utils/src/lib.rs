//! ログユーティリティ
//!
//! ファイルには全レベル（既定 `info`）を ANSI なしで、stderr には
//! 警告以上だけを出す。進捗などの利用者向け表示は StatusSink 側が担う。

use std::fs;
use std::io;
use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// ログファイル名の接頭辞（実ファイルは `crp.log.YYYY-MM-DD`）
pub const LOG_FILE_PREFIX: &str = "crp.log";
/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info";

/// `RUST_LOG` があればそれを、無ければ既定値（不正値も既定値）
pub fn env_filter_or_default(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// ログディレクトリを作成し、グローバル subscriber を登録する。
///
/// 返り値のガードはプロセス終了まで保持すること（drop 時にフラッシュ）。
/// 既に subscriber が登録済みなら登録は黙って諦める。
pub fn init_logging(log_dir: &Path, verbose: bool) -> io::Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false)
                .with_filter(env_filter_or_default(DEFAULT_FILTER)),
        )
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time()
                .with_filter(stderr_level),
        )
        .try_init();

    tracing::info!(log_dir = %log_dir.display(), "logging initialized");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_log_dir_and_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let guard = init_logging(&log_dir, false).unwrap();
        tracing::warn!("probe line");
        drop(guard);

        assert!(log_dir.is_dir());
        let names: Vec<String> = fs::read_dir(&log_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|n| n.starts_with(LOG_FILE_PREFIX)));
    }
}
