//! 변환 작업 모듈
//!
//! 하나의 작업 단위를 실행하여 읽기, 디코딩, 인코딩, 원자적 쓰기, 원본 삭제를 수행합니다.
//! 모든 에러는 이 경계에서 잡혀 해당 파일의 `Outcome`으로 기록됩니다.

use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::ops::Deref;
use std::path::Path;
use std::time::Instant;
use tempfile::Builder;
use tracing::{debug, warn};

use crate::codec::Codec;
use crate::error::{ConvertError, Result};
use crate::plan::{Action, PlannedUnit};
use crate::report::{Outcome, SkipReason};

/// 이 크기 이상의 원본은 메모리 매핑으로 읽음
pub const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// 읽어 들인 원본 바이트
enum SourceBytes {
    Buffered(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for SourceBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            SourceBytes::Buffered(bytes) => bytes,
            SourceBytes::Mapped(mmap) => mmap,
        }
    }
}

/// 작업 단위 하나 실행
///
/// # Arguments
/// * `unit` - 실행할 작업 단위
/// * `codec` - 디코딩/인코딩에 사용할 코덱
///
/// # Returns
/// 처리 결과를 담은 `Outcome` (실패도 `Outcome`으로 반환)
pub fn execute(unit: &PlannedUnit, codec: &dyn Codec) -> Outcome {
    if unit.action == Action::SkipExisting {
        debug!(source = ?unit.source, "출력 파일이 이미 있어 건너뜀");
        return Outcome::skipped(unit.clone(), SkipReason::Existing);
    }

    let started = Instant::now();

    let (bytes_read, bytes_written) = match convert(unit, codec) {
        Ok(sizes) => sizes,
        Err(e) => {
            warn!(source = ?unit.source, error = %e, "변환 실패");
            return Outcome::failed(unit.clone(), &e, started.elapsed());
        }
    };

    if unit.delete_original {
        if let Err(e) = fs::remove_file(&unit.source) {
            let err = ConvertError::Filesystem {
                path: unit.source.clone(),
                reason: format!("JPEG는 저장되었으나 원본 삭제 실패: {}", e),
            };
            warn!(source = ?unit.source, error = %err, "원본 삭제 실패");
            return Outcome::failed(unit.clone(), &err, started.elapsed())
                .with_bytes(bytes_read, bytes_written);
        }
        debug!(source = ?unit.source, "원본 삭제");
    }

    debug!(
        source = ?unit.source,
        destination = ?unit.destination,
        bytes_read,
        bytes_written,
        "변환 완료"
    );
    Outcome::converted(unit.clone(), started.elapsed(), bytes_read, bytes_written)
}

/// 내부 변환 로직
///
/// 성공 시 (읽은 바이트, 쓴 바이트)를 반환합니다.
fn convert(unit: &PlannedUnit, codec: &dyn Codec) -> Result<(u64, u64)> {
    let source = read_source(&unit.source)?;
    let image = codec.decode(&source)?;
    let jpeg = codec.encode(&image, unit.quality)?;

    write_atomic(&unit.destination, &jpeg, unit.force_overwrite)?;

    Ok((source.len() as u64, jpeg.len() as u64))
}

/// 원본 파일 읽기 (대용량 파일은 메모리 매핑)
fn read_source(path: &Path) -> Result<SourceBytes> {
    let mut file = File::open(path).map_err(|e| ConvertError::filesystem(path, e))?;
    let size = file
        .metadata()
        .map(|m| m.len())
        .map_err(|e| ConvertError::filesystem(path, e))?;

    if size >= MMAP_THRESHOLD {
        let mmap = unsafe {
            Mmap::map(&file).map_err(|e| ConvertError::Filesystem {
                path: path.to_path_buf(),
                reason: format!("메모리 매핑 실패: {}", e),
            })?
        };
        return Ok(SourceBytes::Mapped(mmap));
    }

    let mut bytes = Vec::with_capacity(size as usize);
    file.read_to_end(&mut bytes)
        .map_err(|e| ConvertError::filesystem(path, e))?;
    Ok(SourceBytes::Buffered(bytes))
}

/// 같은 폴더의 임시 파일에 쓴 뒤 이름 변경으로 교체
///
/// `overwrite`가 false이면 그 사이 생긴 파일을 덮어쓰지 않고 실패합니다.
fn write_atomic(destination: &Path, bytes: &[u8], overwrite: bool) -> Result<()> {
    let dir = match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| ConvertError::filesystem(dir, e))?;

    let mut temp = Builder::new()
        .prefix(".heic2jpg-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| ConvertError::filesystem(dir, e))?;

    temp.write_all(bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| ConvertError::filesystem(temp.path(), e))?;

    let persisted = if overwrite {
        temp.persist(destination)
    } else {
        temp.persist_noclobber(destination)
    };
    persisted.map_err(|e| ConvertError::filesystem(destination, e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::report::OutcomeStatus;
    use image::{DynamicImage, RgbImage};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// 바이트 내용과 무관하게 4x3 이미지를 돌려주는 코덱
    #[derive(Default)]
    struct StubCodec {
        calls: AtomicUsize,
        fail_encode: bool,
        /// 인코딩 중 다른 프로세스가 원본을 지운 상황 재현
        remove_during_encode: Option<PathBuf>,
    }

    impl Codec for StubCodec {
        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if bytes.starts_with(b"BAD") {
                return Err(ConvertError::Decode {
                    reason: "stub".to_string(),
                });
            }
            Ok(DynamicImage::ImageRgb8(RgbImage::new(4, 3)))
        }

        fn encode(&self, _image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
            if let Some(ref path) = self.remove_during_encode {
                fs::remove_file(path).unwrap();
            }
            if self.fail_encode {
                return Err(ConvertError::Encode {
                    reason: "stub".to_string(),
                });
            }
            Ok(vec![0xFF, 0xD8, quality])
        }
    }

    fn unit_in(dir: &Path, name: &str, content: &[u8]) -> PlannedUnit {
        let source = dir.join(format!("{}.heic", name));
        fs::write(&source, content).unwrap();
        PlannedUnit {
            index: 0,
            destination: dir.join(format!("{}.jpg", name)),
            source,
            quality: 80,
            delete_original: false,
            force_overwrite: false,
            action: Action::Convert,
        }
    }

    #[test]
    fn test_execute_converts() {
        let temp_dir = TempDir::new().unwrap();
        let unit = unit_in(temp_dir.path(), "a", b"HEIC");
        let codec = StubCodec::default();

        let outcome = execute(&unit, &codec);

        assert_eq!(outcome.status, OutcomeStatus::Converted);
        assert!(outcome.error.is_none());
        assert_eq!(fs::read(&unit.destination).unwrap(), vec![0xFF, 0xD8, 80]);
        assert_eq!(outcome.bytes_read, 4);
        assert_eq!(outcome.bytes_written, 3);
        assert!(unit.source.exists());
    }

    #[test]
    fn test_execute_skip_existing_never_decodes() {
        let temp_dir = TempDir::new().unwrap();
        let mut unit = unit_in(temp_dir.path(), "a", b"HEIC");
        unit.action = Action::SkipExisting;
        let codec = StubCodec::default();

        let outcome = execute(&unit, &codec);

        assert_eq!(outcome.status, OutcomeStatus::Skipped(SkipReason::Existing));
        assert_eq!(codec.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_execute_decode_failure_leaves_no_output() {
        let temp_dir = TempDir::new().unwrap();
        let mut unit = unit_in(temp_dir.path(), "a", b"BAD");
        unit.delete_original = true;
        let codec = StubCodec::default();

        let outcome = execute(&unit, &codec);

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.error.unwrap().kind, ErrorKind::Decode);
        assert!(!unit.destination.exists());
        assert!(unit.source.exists());
    }

    #[test]
    fn test_execute_encode_failure() {
        let temp_dir = TempDir::new().unwrap();
        let unit = unit_in(temp_dir.path(), "a", b"HEIC");
        let codec = StubCodec {
            fail_encode: true,
            ..Default::default()
        };

        let outcome = execute(&unit, &codec);
        assert_eq!(outcome.error.unwrap().kind, ErrorKind::Encode);
    }

    #[test]
    fn test_execute_missing_source() {
        let unit = PlannedUnit {
            index: 0,
            source: PathBuf::from("/nonexistent/heic2jpg/a.heic"),
            destination: PathBuf::from("/nonexistent/heic2jpg/a.jpg"),
            quality: 90,
            delete_original: false,
            force_overwrite: false,
            action: Action::Convert,
        };

        let outcome = execute(&unit, &StubCodec::default());
        assert_eq!(outcome.error.unwrap().kind, ErrorKind::Filesystem);
    }

    #[test]
    fn test_delete_original_after_success() {
        let temp_dir = TempDir::new().unwrap();
        let mut unit = unit_in(temp_dir.path(), "a", b"HEIC");
        unit.delete_original = true;

        let outcome = execute(&unit, &StubCodec::default());

        assert_eq!(outcome.status, OutcomeStatus::Converted);
        assert!(!unit.source.exists());
        assert!(unit.destination.exists());
    }

    #[test]
    fn test_delete_original_failure_keeps_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let mut unit = unit_in(temp_dir.path(), "a", b"HEIC");
        unit.delete_original = true;
        let codec = StubCodec {
            remove_during_encode: Some(unit.source.clone()),
            ..Default::default()
        };

        let outcome = execute(&unit, &codec);

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        let error = outcome.error.as_ref().unwrap();
        assert_eq!(error.kind, ErrorKind::Filesystem);
        assert!(error.message.contains("JPEG는 저장되었으나"));
        assert_eq!(fs::read(&unit.destination).unwrap(), vec![0xFF, 0xD8, 80]);
        assert_eq!(outcome.bytes_read, 4);
        assert_eq!(outcome.bytes_written, 3);
    }

    #[test]
    fn test_noclobber_when_destination_appears() {
        let temp_dir = TempDir::new().unwrap();
        let unit = unit_in(temp_dir.path(), "a", b"HEIC");
        fs::write(&unit.destination, b"late").unwrap();

        let outcome = execute(&unit, &StubCodec::default());

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(fs::read(&unit.destination).unwrap(), b"late");
    }

    #[test]
    fn test_output_dir_created_and_no_temp_left() {
        let temp_dir = TempDir::new().unwrap();
        let mut unit = unit_in(temp_dir.path(), "a", b"HEIC");
        unit.destination = temp_dir.path().join("out").join("nested").join("a.jpg");

        let outcome = execute(&unit, &StubCodec::default());

        assert_eq!(outcome.status, OutcomeStatus::Converted);
        let leftovers: Vec<_> = fs::read_dir(unit.destination.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
