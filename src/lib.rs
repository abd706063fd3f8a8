//! heic2jpg - HEIC TO JPEG CONVERTER
//!
//! HEIC/HEIF 이미지를 JPEG로 일괄 변환하는 고성능 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🚀 **병렬 처리**: 고정 크기 스레드 풀로 대량 파일 고속 변환
//! - 🧭 **결정적 결과**: 완료 순서와 무관하게 입력 순서로 정렬된 리포트
//! - 🛡️ **원자적 쓰기**: 임시 파일에 쓴 뒤 이름 변경으로 교체
//! - ⏭️ **기존 파일 건너뛰기**: `--force` 없이는 기존 JPEG를 건드리지 않음
//! - 🧪 **드라이런 모드**: 실제 변환 없이 변환 계획 미리 확인
//! - 📈 **상세 통계**: 변환/건너뜀/실패 수, 입출력 용량, JSON 리포트
//! - 🎨 **컬러 출력**: 가독성 높은 컬러 터미널 출력과 진행률 바
//!
//! # 흐름
//!
//! 경로 해석(`resolver`) → 변환 계획(`plan`) → 스케줄러(`scheduler`)
//! → 워커(`worker`) × N → 리포트(`report`) → 보고자(`reporter`)
//!
//! # 예제
//!
//! ```bash
//! # 현재 폴더의 HEIC 파일 변환
//! heic2jpg
//!
//! # 하위 폴더 포함, 8개 동시 작업
//! heic2jpg ./photos -r -j 8 --progress
//!
//! # 계획만 확인
//! heic2jpg ./photos --dry-run
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod plan;
pub mod report;
pub mod reporter;
pub mod resolver;
pub mod scheduler;
pub mod worker;

// Re-exports for convenient access
pub use cli::{Args, ColorMode};
pub use codec::{Codec, HeifJpegCodec};
pub use config::Config;
pub use error::{ConvertError, ErrorKind, Result};
pub use plan::{plan, Action, PlannedUnit};
pub use report::{format_bytes, BatchReport, Outcome, OutcomeStatus, SkipReason};
pub use reporter::{ConsoleReporter, NullReporter, Reporter};
pub use resolver::{resolve, CandidateFile, PathResolver};
pub use scheduler::BatchScheduler;

/// 설정 검증부터 배치 실행까지 전체 변환 수행
///
/// 경로/설정 에러는 작업을 시작하기 전에 반환되며 이 경우 리포트는 만들어지지 않습니다.
/// 파일별 실패는 리포트에만 기록됩니다.
pub fn run(config: &Config, codec: &dyn Codec, reporter: &dyn Reporter) -> Result<BatchReport> {
    let units = prepare(config)?;
    BatchScheduler::new(codec, reporter).run(units, config.effective_jobs(), config.dry_run)
}

/// 설정 검증, 경로 해석, 계획 생성
pub fn prepare(config: &Config) -> Result<Vec<PlannedUnit>> {
    config.validate()?;

    let candidates = PathResolver::new(config.recursive)
        .with_pattern(config.pattern.as_deref())?
        .resolve(&config.paths)?;

    tracing::info!(candidates = candidates.len(), "후보 파일 탐색 완료");

    plan(candidates, config)
}
