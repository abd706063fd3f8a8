//! 로깅 모듈
//!
//! tracing-subscriber 기반 로깅을 초기화합니다.
//! stderr 레이어는 `-v`/`--quiet`로 레벨이 정해지고, 로그 파일을 지정하면
//! ANSI 색상 없는 파일 레이어가 debug 레벨로 추가됩니다.
//! `RUST_LOG` 환경 변수가 있으면 그 값을 우선합니다.

use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{ConvertError, Result};

/// 로깅 설정
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// stderr 로그 레벨
    pub level: Level,
    /// 로그 파일 경로
    pub log_file: Option<PathBuf>,
    /// stderr에 ANSI 색상 사용
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            log_file: None,
            ansi: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 상세 수준(-v 개수)과 quiet 옵션으로 레벨 설정
    pub fn with_verbosity(mut self, verbose: u8, quiet: bool) -> Self {
        self.level = level_for(verbose, quiet);
        self
    }

    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }
}

/// 상세 수준을 로그 레벨로 변환
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// 로깅 초기화
///
/// 반환된 가드는 프로그램 종료 시까지 유지해야 로그 파일이 끝까지 기록됩니다.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("heic2jpg={}", config.level)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_target(false)
        .with_filter(stderr_filter);

    let (file_layer, guard) = match config.log_file {
        Some(ref path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true)
                .with_filter(EnvFilter::new("heic2jpg=debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConvertError::InvalidConfig {
            reason: format!("로깅 초기화 실패: {}", e),
        })?;

    tracing::debug!(level = ?config.level, log_file = ?config.log_file, "로깅 초기화 완료");

    Ok(guard)
}

/// 로그 파일 열기 (추가 모드, 상위 폴더 생성)
fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConvertError::filesystem(parent, e))?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ConvertError::filesystem(path, e))
}
