//! 변환 계획 모듈
//!
//! 후보 파일마다 출력 경로와 수행할 작업을 계산합니다.
//! 존재 여부 확인 외의 파일 시스템 작업은 하지 않으므로 드라이런에서도 그대로 사용됩니다.

use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::{validate_quality, Config};
use crate::error::{ConvertError, Result};
use crate::resolver::CandidateFile;

/// 출력 확장자
pub const OUTPUT_EXTENSION: &str = "jpg";

/// 계획된 작업 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// 변환 수행
    Convert,
    /// 출력 파일이 이미 있어 건너뜀
    SkipExisting,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Convert => write!(f, "Convert"),
            Action::SkipExisting => write!(f, "SkipExisting"),
        }
    }
}

/// 하나의 변환 작업 단위
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedUnit {
    /// 후보 목록 내 순서
    pub index: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub quality: u8,
    pub delete_original: bool,
    pub force_overwrite: bool,
    pub action: Action,
}

/// 원본 경로와 설정으로 출력 경로 계산
///
/// `{output_dir 또는 원본 폴더}/{원본 이름}{접미사}.jpg`
pub fn destination_for(source: &Path, output_dir: Option<&Path>, suffix: Option<&str>) -> PathBuf {
    // UTF-8이 아닌 이름도 원본 바이트 그대로 유지
    let mut file_name = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(OsString::new);
    if let Some(suffix) = suffix {
        file_name.push(suffix);
    }
    file_name.push(".");
    file_name.push(OUTPUT_EXTENSION);

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    dir.join(file_name)
}

/// 후보 목록에 대한 변환 계획 생성
///
/// 품질이 범위를 벗어나거나, 두 원본이 같은 출력 경로를 가리키거나,
/// 출력 경로가 원본 자신(심볼릭 링크 포함)이면 작업을 시작하기 전에 실패합니다.
pub fn plan(candidates: Vec<CandidateFile>, config: &Config) -> Result<Vec<PlannedUnit>> {
    let quality = validate_quality(config.quality)?;
    let output_dir = match config.output_dir {
        Some(ref dir) => Some(absolute(dir)?),
        None => None,
    };

    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(candidates.len());
    let mut units = Vec::with_capacity(candidates.len());

    for (index, candidate) in candidates.into_iter().enumerate() {
        let destination = destination_for(
            &candidate.path,
            output_dir.as_deref(),
            config.suffix.as_deref(),
        );

        if is_same_file(&candidate.path, &destination) {
            return Err(ConvertError::SameFile {
                file: candidate.path,
                destination,
            });
        }

        if let Some(first) = claimed.get(&destination) {
            return Err(ConvertError::DestinationConflict {
                destination,
                first: first.clone(),
                second: candidate.path,
            });
        }
        claimed.insert(destination.clone(), candidate.path.clone());

        let action = if destination.exists() && !config.force_overwrite {
            Action::SkipExisting
        } else {
            Action::Convert
        };

        units.push(PlannedUnit {
            index,
            source: candidate.path,
            destination,
            quality,
            delete_original: config.delete_original,
            force_overwrite: config.force_overwrite,
            action,
        });
    }

    Ok(units)
}

/// 출력 경로가 원본과 같은 파일인지 확인 (존재 여부 확인만 수행)
fn is_same_file(source: &Path, destination: &Path) -> bool {
    if source == destination {
        return true;
    }
    match (source.canonicalize(), destination.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| ConvertError::filesystem(".", e))?;
    Ok(cwd.join(path))
}
