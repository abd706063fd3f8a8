//! 에러 타입 정의 모듈
//!
//! heic2jpg에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! 경로/설정 에러는 작업 시작 전에 전체 실행을 중단시키고,
//! 코덱/파일 시스템 에러는 해당 파일의 결과(`Outcome`)에만 기록됩니다.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// heic2jpg에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 입력 경로가 존재하지 않음
    #[error("입력 경로를 찾을 수 없습니다: {path}")]
    InvalidPath { path: PathBuf },

    /// 잘못된 설정 값 (품질 범위, 충돌하는 옵션 등)
    #[error("잘못된 설정: {reason}")]
    InvalidConfig { reason: String },

    /// 유효하지 않은 파일 이름 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 서로 다른 두 원본이 같은 출력 경로를 가리킴
    #[error("출력 경로 충돌 ({destination}): {first} 와 {second}")]
    DestinationConflict {
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// 출력 경로가 원본 파일 자신을 가리킴
    #[error("출력 경로가 원본과 같은 파일입니다: {file} → {destination}")]
    SameFile { file: PathBuf, destination: PathBuf },

    /// HEIC 디코딩 실패
    #[error("디코딩 실패: {reason}")]
    Decode { reason: String },

    /// JPEG 인코딩 실패
    #[error("인코딩 실패: {reason}")]
    Encode { reason: String },

    /// 파일 읽기/쓰기/이름 변경/삭제 실패
    #[error("파일 시스템 오류 ({path}): {reason}")]
    Filesystem { path: PathBuf, reason: String },

    /// 스레드 풀 초기화 실패
    #[error("스레드 풀 초기화 실패: {reason}")]
    ThreadPool { reason: String },
}

/// 에러 분류 (리포트 및 종료 코드 결정용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidPath,
    InvalidConfig,
    Decode,
    Encode,
    Filesystem,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidPath => write!(f, "InvalidPath"),
            ErrorKind::InvalidConfig => write!(f, "InvalidConfig"),
            ErrorKind::Decode => write!(f, "Decode"),
            ErrorKind::Encode => write!(f, "Encode"),
            ErrorKind::Filesystem => write!(f, "Filesystem"),
            ErrorKind::Internal => write!(f, "Internal"),
        }
    }
}

impl ConvertError {
    /// 에러 분류 반환
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::InvalidPath { .. } => ErrorKind::InvalidPath,
            ConvertError::InvalidConfig { .. }
            | ConvertError::InvalidPattern { .. }
            | ConvertError::DestinationConflict { .. }
            | ConvertError::SameFile { .. } => ErrorKind::InvalidConfig,
            ConvertError::Decode { .. } => ErrorKind::Decode,
            ConvertError::Encode { .. } => ErrorKind::Encode,
            ConvertError::Filesystem { .. } => ErrorKind::Filesystem,
            ConvertError::ThreadPool { .. } => ErrorKind::Internal,
        }
    }

    /// 작업 시작 전에 전체 실행을 중단해야 하는 에러인지 여부
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Decode | ErrorKind::Encode | ErrorKind::Filesystem
        )
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        ConvertError::Filesystem {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// heic2jpg 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = ConvertError::DestinationConflict {
            destination: PathBuf::from("a.jpg"),
            first: PathBuf::from("a.heic"),
            second: PathBuf::from("a.heif"),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.is_fatal());

        let err = ConvertError::Decode {
            reason: "bad box".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_same_file_is_fatal() {
        let err = ConvertError::SameFile {
            file: PathBuf::from("/p/cover.heic"),
            destination: PathBuf::from("/p/cover.jpg"),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.is_fatal());
        assert!(err.to_string().contains("cover.heic"));
    }

    #[test]
    fn test_thread_pool_error_is_fatal() {
        let err = ConvertError::ThreadPool {
            reason: "no threads".to_string(),
        };
        assert!(err.is_fatal());
        assert_eq!(err.kind().to_string(), "Internal");
    }
}
