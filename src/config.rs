//! 변환 설정 모듈
//!
//! CLI 옵션을 하나의 불변 설정 구조체로 모으고, 작업 시작 전에 한 번만 검증합니다.

use std::path::PathBuf;

use crate::error::{ConvertError, Result};

/// 기본 JPEG 품질
pub const DEFAULT_QUALITY: u8 = 95;

/// 변환 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 입력 경로 목록 (파일 또는 폴더)
    pub paths: Vec<PathBuf>,
    /// 출력 폴더 (None이면 원본과 같은 폴더)
    pub output_dir: Option<PathBuf>,
    /// 출력 파일 이름 접미사
    pub suffix: Option<String>,
    /// JPEG 품질 (1-100)
    pub quality: u8,
    /// 기존 출력 파일 덮어쓰기
    pub force_overwrite: bool,
    /// 하위 폴더 재귀 탐색
    pub recursive: bool,
    /// 변환 성공 후 원본 삭제
    pub delete_original: bool,
    /// 동시 작업 수
    pub jobs: usize,
    /// 실제 변환 없이 계획만 보고
    pub dry_run: bool,
    /// 파일 이름 glob 패턴
    pub pattern: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(".")],
            output_dir: None,
            suffix: None,
            quality: DEFAULT_QUALITY,
            force_overwrite: false,
            recursive: false,
            delete_original: false,
            jobs: 1,
            dry_run: false,
            pattern: None,
        }
    }
}

impl Config {
    /// 입력 경로로 기본 설정 생성 (비어 있으면 현재 폴더)
    pub fn new(paths: Vec<PathBuf>) -> Self {
        let paths = if paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            paths
        };
        Self {
            paths,
            ..Default::default()
        }
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_suffix(mut self, suffix: Option<String>) -> Self {
        self.suffix = suffix;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_delete_original(mut self, delete_original: bool) -> Self {
        self.delete_original = delete_original;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    /// 실제 동시 작업 수 (최소 1)
    pub fn effective_jobs(&self) -> usize {
        self.jobs.max(1)
    }

    /// 설정 유효성 검사
    ///
    /// 품질 범위, 접미사 형식, 출력 폴더 경로를 확인합니다.
    /// 파일 시스템은 읽기만 합니다.
    pub fn validate(&self) -> Result<()> {
        validate_quality(self.quality)?;

        if let Some(ref suffix) = self.suffix {
            if suffix.contains('/') || suffix.contains('\\') {
                return Err(ConvertError::InvalidConfig {
                    reason: format!("접미사에 경로 구분자를 사용할 수 없습니다: {:?}", suffix),
                });
            }
        }

        if let Some(ref dir) = self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(ConvertError::InvalidConfig {
                    reason: format!("출력 경로가 폴더가 아닙니다: {:?}", dir),
                });
            }
        }

        Ok(())
    }
}

/// JPEG 품질 범위 검사 (1-100)
pub fn validate_quality(quality: u8) -> Result<u8> {
    if (1..=100).contains(&quality) {
        Ok(quality)
    } else {
        Err(ConvertError::InvalidConfig {
            reason: format!("JPEG 품질은 1-100 범위여야 합니다: {}", quality),
        })
    }
}
