//! 파일 필터 모듈
//!
//! HEIC/HEIF 확장자 검사와 glob 패턴을 사용한 파일 이름 필터링을 담당합니다.

use glob::Pattern;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// 변환 대상 확장자
pub const HEIC_EXTENSIONS: &[&str] = &["heic", "heif"];

/// 경로의 확장자가 HEIC/HEIF인지 확인 (대소문자 무시)
///
/// # Examples
/// ```
/// use heic2jpg::filter::is_heic_path;
/// use std::path::Path;
///
/// assert!(is_heic_path(Path::new("IMG_0001.HEIC")));
/// assert!(!is_heic_path(Path::new("IMG_0001.jpg")));
/// ```
pub fn is_heic_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| HEIC_EXTENSIONS.iter().any(|h| ext.eq_ignore_ascii_case(h)))
        .unwrap_or(false)
}

/// 확장자 + 선택적 이름 패턴 필터
#[derive(Default)]
pub struct FileFilter {
    pattern: Option<Pattern>,
}

impl FileFilter {
    /// 새 필터 생성
    ///
    /// # Arguments
    /// * `pattern` - 글로브 패턴 문자열 (None이면 확장자만 검사)
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let compiled = match pattern {
            Some(p) => Some(Pattern::new(p).map_err(|_| ConvertError::InvalidPattern {
                pattern: p.to_string(),
            })?),
            None => None,
        };

        Ok(Self { pattern: compiled })
    }

    /// 경로가 변환 대상인지 확인
    pub fn matches(&self, path: &Path) -> bool {
        if !is_heic_path(path) {
            return false;
        }

        match &self.pattern {
            Some(p) => path
                .file_name()
                .and_then(|s| s.to_str())
                .map(|name| p.matches(name))
                .unwrap_or(false),
            None => true,
        }
    }

    /// 패턴이 설정되어 있는지 확인
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }
}
