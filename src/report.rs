//! 결과 및 통계 모듈
//!
//! 파일별 변환 결과(`Outcome`)와 전체 배치 리포트, 요약 출력을 담당합니다.

use colored::Colorize;
use serde::{Serialize, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::{ConvertError, ErrorKind, Result};
use crate::plan::{Action, PlannedUnit};

/// 건너뛴 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 출력 파일이 이미 존재
    Existing,
    /// 드라이런 (실행했다면 수행했을 작업)
    DryRun(Action),
}

/// 파일별 최종 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Converted,
    Skipped(SkipReason),
    Failed,
}

impl OutcomeStatus {
    /// 사람이 읽을 수 있는 상태 이름
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeStatus::Converted => "변환 완료",
            OutcomeStatus::Skipped(SkipReason::Existing) => "건너뜀 (출력 파일 존재)",
            OutcomeStatus::Skipped(SkipReason::DryRun(Action::Convert)) => "드라이런: 변환 예정",
            OutcomeStatus::Skipped(SkipReason::DryRun(Action::SkipExisting)) => {
                "드라이런: 건너뛸 예정"
            }
            OutcomeStatus::Failed => "실패",
        }
    }
}

/// 실패 상세
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ConvertError> for UnitError {
    fn from(err: &ConvertError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// 한 작업 단위의 결과
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub unit: PlannedUnit,
    pub status: OutcomeStatus,
    /// 실패 시에만 존재
    pub error: Option<UnitError>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl Outcome {
    /// 변환 성공 결과 생성
    pub fn converted(unit: PlannedUnit, elapsed: Duration, bytes_read: u64, bytes_written: u64) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Converted,
            error: None,
            elapsed,
            bytes_read,
            bytes_written,
        }
    }

    /// 건너뜀 결과 생성
    pub fn skipped(unit: PlannedUnit, reason: SkipReason) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Skipped(reason),
            error: None,
            elapsed: Duration::ZERO,
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    /// 실패 결과 생성
    pub fn failed(unit: PlannedUnit, error: &ConvertError, elapsed: Duration) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Failed,
            error: Some(UnitError::from(error)),
            elapsed,
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    /// 실패 결과에 처리 바이트 수 기록 (변환 후 원본 삭제 실패 등)
    pub fn with_bytes(mut self, bytes_read: u64, bytes_written: u64) -> Self {
        self.bytes_read = bytes_read;
        self.bytes_written = bytes_written;
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status == OutcomeStatus::Failed
    }
}

/// 배치 전체 리포트
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// 전체 후보 수
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 드라이런: 변환 예정 수
    pub would_convert: usize,
    /// 드라이런: 건너뛸 예정 수
    pub would_skip: usize,
    pub dry_run: bool,
    /// 후보 순서로 정렬된 결과
    pub outcomes: Vec<Outcome>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl BatchReport {
    /// 결과 목록으로 리포트 생성
    ///
    /// 결과는 작업 단위의 후보 순서(`index`)로 다시 정렬됩니다.
    pub fn from_outcomes(mut outcomes: Vec<Outcome>, dry_run: bool, elapsed: Duration) -> Self {
        outcomes.sort_by_key(|o| o.unit.index);

        let mut report = Self {
            total: outcomes.len(),
            dry_run,
            elapsed,
            ..Default::default()
        };

        for outcome in &outcomes {
            match outcome.status {
                OutcomeStatus::Converted => report.converted += 1,
                OutcomeStatus::Failed => report.failed += 1,
                OutcomeStatus::Skipped(SkipReason::Existing) => report.skipped += 1,
                OutcomeStatus::Skipped(SkipReason::DryRun(action)) => {
                    report.skipped += 1;
                    match action {
                        Action::Convert => report.would_convert += 1,
                        Action::SkipExisting => report.would_skip += 1,
                    }
                }
            }
            report.bytes_read += outcome.bytes_read;
            report.bytes_written += outcome.bytes_written;
        }

        report.outcomes = outcomes;
        report
    }

    /// 실패가 하나도 없으면 성공
    pub fn overall_success(&self) -> bool {
        self.failed == 0
    }

    /// 실패한 결과만 반환
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    /// JSON 리포트 파일 작성
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| ConvertError::filesystem(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| ConvertError::filesystem(path, e))?;
        writer
            .flush()
            .map_err(|e| ConvertError::filesystem(path, e))?;
        Ok(())
    }

    /// 처리 통계 요약 출력
    pub fn print_summary(&self) {
        println!("\n{}", "═".repeat(50).bright_blue());
        if self.dry_run {
            println!("{}", " 📊 드라이런 결과".bright_white().bold());
        } else {
            println!("{}", " 📊 처리 통계".bright_white().bold());
        }
        println!("{}", "═".repeat(50).bright_blue());

        println!("  {} 전체 파일:    {}", "📁".bright_cyan(), self.total);

        if self.dry_run {
            println!(
                "  {} 변환 예정:    {}",
                "🔄".bright_green(),
                self.would_convert.to_string().green()
            );
            println!(
                "  {} 건너뛸 예정:  {}",
                "⏭️".bright_yellow(),
                self.would_skip.to_string().yellow()
            );
        } else {
            println!(
                "  {} 변환:         {}",
                "✅".bright_green(),
                self.converted.to_string().green()
            );
            println!(
                "  {} 건너뜀:       {}",
                "⏭️".bright_yellow(),
                self.skipped.to_string().yellow()
            );

            if self.failed > 0 {
                println!(
                    "  {} 실패:         {}",
                    "❌".bright_red(),
                    self.failed.to_string().red()
                );
            } else {
                println!("  {} 실패:         {}", "✅".bright_green(), "0".green());
            }

            println!(
                "  {} 입력 용량:    {}",
                "📥".bright_yellow(),
                format_bytes(self.bytes_read)
            );
            println!(
                "  {} 출력 용량:    {}",
                "📤".bright_magenta(),
                format_bytes(self.bytes_written)
            );
        }

        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed)
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// 파일 크기 표시 (1024 단위, 소수점 한 자리)
///
/// # Examples
/// ```
/// use heic2jpg::report::format_bytes;
///
/// assert_eq!(format_bytes(812), "812 B");
/// assert_eq!(format_bytes(2_621_440), "2.5 MiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for &next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}

/// 경과 시간 표시
///
/// 1초 미만은 밀리초, 1분 미만은 초(소수점 한 자리), 그 이상은 분과 초로 표시합니다.
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms < 1000 {
        return format!("{}ms", total_ms);
    }

    let secs = duration.as_secs();
    if secs < 60 {
        return format!("{:.1}초", duration.as_secs_f64());
    }

    format!("{}분 {:02}초", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unit(index: usize, action: Action) -> PlannedUnit {
        PlannedUnit {
            index,
            source: PathBuf::from(format!("/p/{}.heic", index)),
            destination: PathBuf::from(format!("/p/{}.jpg", index)),
            quality: 95,
            delete_original: false,
            force_overwrite: false,
            action,
        }
    }

    #[test]
    fn test_format_bytes_photo_sizes() {
        // 작은 썸네일, 일반 JPEG, 대형 HEIC, 배치 전체 합계
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(48_128), "47.0 KiB");
        assert_eq!(format_bytes(3_460_300), "3.3 MiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GiB");
        assert_eq!(format_bytes(3 * 1024_u64.pow(4)), "3.0 TiB");
    }

    #[test]
    fn test_format_duration_batch_lengths() {
        assert_eq!(format_duration(Duration::from_millis(87)), "87ms");
        assert_eq!(format_duration(Duration::from_millis(2_430)), "2.4초");
        assert_eq!(format_duration(Duration::from_secs(754)), "12분 34초");
        assert_eq!(format_duration(Duration::from_secs(7_205)), "120분 05초");
    }

    #[test]
    fn test_report_counts_and_order() {
        let err = ConvertError::Decode {
            reason: "boom".to_string(),
        };
        let outcomes = vec![
            Outcome::failed(unit(2, Action::Convert), &err, Duration::ZERO),
            Outcome::converted(unit(0, Action::Convert), Duration::ZERO, 100, 40),
            Outcome::skipped(unit(1, Action::SkipExisting), SkipReason::Existing),
        ];

        let report = BatchReport::from_outcomes(outcomes, false, Duration::ZERO);

        assert_eq!(report.total, 3);
        assert_eq!(report.converted, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.bytes_read, 100);
        assert!(!report.overall_success());
        let order: Vec<usize> = report.outcomes.iter().map(|o| o.unit.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_dry_run_counts() {
        let outcomes = vec![
            Outcome::skipped(unit(0, Action::Convert), SkipReason::DryRun(Action::Convert)),
            Outcome::skipped(
                unit(1, Action::SkipExisting),
                SkipReason::DryRun(Action::SkipExisting),
            ),
        ];

        let report = BatchReport::from_outcomes(outcomes, true, Duration::ZERO);
        assert_eq!(report.would_convert, 1);
        assert_eq!(report.would_skip, 1);
        assert_eq!(report.converted, 0);
        assert!(report.overall_success());
    }

    #[test]
    fn test_status_labels_distinct() {
        let existing = OutcomeStatus::Skipped(SkipReason::Existing).label();
        let dry = OutcomeStatus::Skipped(SkipReason::DryRun(Action::SkipExisting)).label();
        assert_ne!(existing, dry);
    }

    #[test]
    fn test_report_json() {
        let report = BatchReport::from_outcomes(
            vec![Outcome::converted(
                unit(0, Action::Convert),
                Duration::from_millis(12),
                10,
                5,
            )],
            false,
            Duration::from_millis(20),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["converted"], 1);
        assert_eq!(json["elapsed_ms"], 20);
        assert_eq!(json["outcomes"][0]["status"], "converted");
        assert_eq!(json["outcomes"][0]["unit"]["action"], "convert");
    }
}
