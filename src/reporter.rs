//! 진행 상황 보고 모듈
//!
//! 스케줄러가 작업 시작, 작업 완료, 배치 완료 시점에 이벤트를 전달합니다.
//! 보고자는 결과를 바꿀 수 없으며 스케줄러는 보고자를 기다리지 않습니다.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};

use crate::plan::PlannedUnit;
use crate::report::{BatchReport, Outcome, OutcomeStatus};

/// 배치 이벤트 수신자
pub trait Reporter: Sync {
    /// 작업 단위 실행 직전
    fn unit_started(&self, _unit: &PlannedUnit) {}

    /// 작업 단위 완료
    fn unit_completed(&self, _outcome: &Outcome) {}

    /// 배치 전체 완료
    fn batch_completed(&self, _report: &BatchReport) {}
}

/// 아무것도 하지 않는 보고자
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// 콘솔 출력 설정
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOptions {
    /// 파일별 결과 출력
    pub verbose: bool,
    /// 요약과 실패 목록 외 출력 억제
    pub quiet: bool,
    /// 진행률 바 표시
    pub progress: bool,
}

/// 컬러 터미널 보고자
pub struct ConsoleReporter {
    options: ConsoleOptions,
    pb: Option<ProgressBar>,
}

impl ConsoleReporter {
    /// 새 콘솔 보고자 생성
    ///
    /// # Arguments
    /// * `total` - 진행률 바 전체 길이
    /// * `options` - 출력 설정
    pub fn new(total: usize, options: ConsoleOptions) -> Self {
        let pb = (options.progress && !options.quiet).then(|| create_progress_bar(total));
        Self { options, pb }
    }

    /// 진행률 바를 깨뜨리지 않고 한 줄 출력
    fn line(&self, msg: String) {
        match self.pb {
            Some(ref pb) => pb.println(msg),
            None => {
                // 닫힌 파이프 등 출력 실패는 변환 결과에 영향 없음
                let _ = writeln!(io::stdout().lock(), "{}", msg);
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn unit_started(&self, unit: &PlannedUnit) {
        if let Some(ref pb) = self.pb {
            pb.set_message(display_name(&unit.source));
        }
    }

    fn unit_completed(&self, outcome: &Outcome) {
        if let Some(ref pb) = self.pb {
            pb.inc(1);
        }

        let name = display_name(&outcome.unit.source);
        match outcome.status {
            OutcomeStatus::Converted if self.options.verbose => {
                self.line(format!(
                    "  {} {} → {}",
                    "✓".green(),
                    name,
                    display_name(&outcome.unit.destination)
                ));
            }
            OutcomeStatus::Skipped(_) if self.options.verbose => {
                self.line(format!(
                    "  {} {} ({})",
                    "•".yellow(),
                    name,
                    outcome.status.label().dimmed()
                ));
            }
            OutcomeStatus::Failed if !self.options.quiet => {
                self.line(format!("  {} {}", "✗".red(), name));
            }
            _ => {}
        }
    }

    fn batch_completed(&self, report: &BatchReport) {
        if let Some(ref pb) = self.pb {
            pb.finish_with_message("완료!");
        }

        if report.dry_run && !self.options.quiet {
            print_plan(report);
        }

        print_failures(report, self.options.verbose);
        report.print_summary();

        if report.dry_run {
            println!(
                "\n{} 드라이런 모드: 파일이 변경되지 않았습니다.\n",
                "ℹ️".bright_blue()
            );
        } else if report.overall_success() {
            println!("\n{} 모든 변환이 완료되었습니다!\n", "✅".bright_green());
        } else {
            println!(
                "\n{} {} 개의 파일 변환에 실패했습니다.\n",
                "⚠️".bright_yellow(),
                report.failed.to_string().red()
            );
        }
    }
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb
}

/// 드라이런 계획 출력
fn print_plan(report: &BatchReport) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, outcome) in report.outcomes.iter().enumerate() {
        println!(
            "  {}. {} → {} [{}]",
            i + 1,
            display_name(&outcome.unit.source),
            outcome.unit.destination.display(),
            outcome.status.label()
        );
    }
}

/// 실패 목록 출력
fn print_failures(report: &BatchReport, detailed: bool) {
    if report.overall_success() {
        return;
    }

    println!("\n{}", "❌ 오류 발생 파일:".bright_red());
    for outcome in report.failures() {
        println!("  {} {}", "•".red(), outcome.unit.source.display());
        if let Some(ref error) = outcome.error {
            if detailed {
                println!("    [{}] {}", error.kind, error.message.dimmed());
            } else {
                println!("    {}", error.message.dimmed());
            }
        }
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
