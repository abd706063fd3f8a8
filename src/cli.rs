//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{ArgAction, Parser, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::config::{Config, DEFAULT_QUALITY};
use crate::logging::LogConfig;
use crate::reporter::ConsoleOptions;

/// 컬러 출력 모드
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum ColorMode {
    /// 터미널이면 컬러 사용
    #[default]
    Auto,
    /// 항상 컬러 사용
    Always,
    /// 컬러 사용 안 함
    Never,
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorMode::Auto => write!(f, "auto"),
            ColorMode::Always => write!(f, "always"),
            ColorMode::Never => write!(f, "never"),
        }
    }
}

impl ColorMode {
    /// 컬러 사용 여부 결정
    pub fn enabled(&self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }
}

/// heic2jpg CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "heic2jpg",
    author = "YourName <your@email.com>",
    version,
    about = "HEIC TO JPEG CONVERTER - HEIC/HEIF 이미지를 JPEG로 일괄 변환하는 고성능 CLI 도구",
    long_about = r#"
HEIC TO JPEG CONVERTER
======================

지정된 파일과 폴더에서 HEIC/HEIF 이미지를 찾아
JPEG 파일로 변환합니다.

특징:
  • 병렬 처리로 대량 파일 고속 변환
  • 원자적 쓰기로 중간에 중단되어도 깨진 파일 없음
  • 기존 파일 건너뛰기 / 덮어쓰기
  • 드라이런으로 변환 계획 미리 확인
  • 실패한 파일이 있으면 0이 아닌 종료 코드

종료 코드:
  0  모든 파일 성공
  1  하나 이상의 파일 변환 실패
  2  잘못된 인자, 경로 또는 설정

예제:
  heic2jpg
  heic2jpg ./photos -r -j 8 --progress
  heic2jpg IMG_0001.HEIC -q 85 -o ./out --suffix _web
  heic2jpg ./photos --dry-run
  heic2jpg ./photos --delete-original --log-file convert.log
"#
)]
pub struct Args {
    /// 변환할 파일 또는 폴더 (기본값: 현재 폴더)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// 출력 폴더 (기본값: 원본과 같은 폴더)
    #[arg(short, long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// 출력 파일 이름 접미사 (예: "_converted")
    #[arg(short, long)]
    pub suffix: Option<String>,

    /// JPEG 품질 (1-100)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub quality: u8,

    /// 기존 JPEG 파일 덮어쓰기
    #[arg(short, long)]
    pub force: bool,

    /// 하위 폴더까지 재귀 탐색
    #[arg(short, long)]
    pub recursive: bool,

    /// 변환 성공 후 원본 HEIC 파일 삭제
    #[arg(long)]
    pub delete_original: bool,

    /// 동시 변환 작업 수
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// 실제 변환 없이 처리 계획만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 상세 출력 (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// 요약과 오류 외 출력 억제
    #[arg(long)]
    pub quiet: bool,

    /// 진행률 바 표시
    #[arg(long)]
    pub progress: bool,

    /// 컬러 출력 모드
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// 로그 파일 경로
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "IMG_*")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// JSON 리포트 저장 경로
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl Args {
    /// 변환 설정 생성
    pub fn to_config(&self) -> Config {
        Config::new(self.paths.clone())
            .with_output_dir(self.output_dir.clone())
            .with_suffix(self.suffix.clone())
            .with_quality(self.quality)
            .with_force_overwrite(self.force)
            .with_recursive(self.recursive)
            .with_delete_original(self.delete_original)
            .with_jobs(self.jobs)
            .with_dry_run(self.dry_run)
            .with_pattern(self.pattern.clone())
    }

    /// 로깅 설정 생성
    pub fn log_config(&self) -> LogConfig {
        LogConfig::new()
            .with_verbosity(self.verbose, self.quiet)
            .with_log_file(self.log_file.clone())
            .with_ansi(self.color.enabled())
    }

    /// 콘솔 출력 설정 생성
    pub fn console_options(&self) -> ConsoleOptions {
        ConsoleOptions {
            verbose: self.verbose > 0,
            quiet: self.quiet,
            progress: self.progress,
        }
    }
}
