//! 입력 경로 해석 모듈
//!
//! 사용자가 지정한 파일/폴더 경로를 중복 없이 정렬된 변환 후보 목록으로 확장합니다.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ConvertError, Result};
use crate::filter::FileFilter;

/// 변환 후보 파일
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// 절대 경로 (심볼릭 링크는 풀지 않음)
    pub path: PathBuf,
    /// 소문자 확장자 ("heic" 또는 "heif")
    pub extension: String,
}

impl CandidateFile {
    fn new(path: PathBuf) -> Self {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();
        Self { path, extension }
    }
}

/// 경로 해석기
#[derive(Default)]
pub struct PathResolver {
    recursive: bool,
    filter: FileFilter,
}

impl PathResolver {
    /// 새 해석기 생성
    pub fn new(recursive: bool) -> Self {
        Self {
            recursive,
            filter: FileFilter::default(),
        }
    }

    /// 파일 이름 패턴 설정
    pub fn with_pattern(mut self, pattern: Option<&str>) -> Result<Self> {
        self.filter = FileFilter::new(pattern)?;
        Ok(self)
    }

    /// 입력 경로들을 후보 목록으로 확장
    ///
    /// 존재하지 않는 경로가 하나라도 있으면 `InvalidPath`로 실패합니다.
    /// 후보 경로는 사용자가 지정한 이름 그대로의 절대 경로이며, 같은 파일을
    /// 가리키는 경로(심볼릭 링크 포함)는 정규화 경로 기준으로 하나만 남깁니다.
    /// 결과는 경로 사전순으로 정렬됩니다.
    pub fn resolve(&self, paths: &[PathBuf]) -> Result<Vec<CandidateFile>> {
        let mut found: Vec<PathBuf> = Vec::new();

        for input in paths {
            if !input.exists() {
                return Err(ConvertError::InvalidPath {
                    path: input.clone(),
                });
            }

            if input.is_dir() {
                self.collect_dir(input, &mut found);
            } else if self.filter.matches(input) {
                found.push(input.clone());
            } else {
                debug!(path = ?input, "HEIC/HEIF가 아닌 입력 파일 제외");
            }
        }

        let mut absolute_paths = found
            .iter()
            .map(|p| absolute(p))
            .collect::<Result<Vec<_>>>()?;
        absolute_paths.sort();
        absolute_paths.dedup();

        // 정렬된 순서에서 같은 파일의 첫 경로만 유지
        let mut seen: HashSet<PathBuf> = HashSet::with_capacity(absolute_paths.len());
        let mut candidates = Vec::with_capacity(absolute_paths.len());
        for path in absolute_paths {
            let canonical = path
                .canonicalize()
                .map_err(|e| ConvertError::filesystem(&path, e))?;
            if seen.insert(canonical) {
                candidates.push(CandidateFile::new(path));
            } else {
                debug!(path = ?path, "같은 파일을 가리키는 중복 경로 제외");
            }
        }

        Ok(candidates)
    }

    /// 폴더 내 후보 수집
    fn collect_dir(&self, dir: &Path, found: &mut Vec<PathBuf>) {
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(path = ?e.path(), error = %e, "탐색할 수 없는 항목 건너뜀");
                    None
                }
            });

        found.extend(
            entries
                .filter(|e| e.path().is_file())
                .filter(|e| self.filter.matches(e.path()))
                .map(|e| e.into_path()),
        );
    }
}

/// 확장자 필터만 적용한 경로 해석
pub fn resolve(paths: &[PathBuf], recursive: bool) -> Result<Vec<CandidateFile>> {
    PathResolver::new(recursive).resolve(paths)
}

/// 심볼릭 링크를 풀지 않고 절대 경로로 변환 (`.` 구성 요소 제거)
fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| ConvertError::filesystem(".", e))?
            .join(path)
    };

    Ok(joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}
