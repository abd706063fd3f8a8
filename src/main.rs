//! heic2jpg - HEIC TO JPEG CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

use heic2jpg::{
    cli::Args,
    codec::HeifJpegCodec,
    error::ConvertError,
    logging::init_logging,
    plan::{Action, PlannedUnit},
    prepare,
    reporter::ConsoleReporter,
    scheduler::BatchScheduler,
    Config,
};

/// 하나 이상의 파일 변환 실패
const EXIT_FAILED: u8 = 1;
/// 잘못된 인자, 경로 또는 설정
const EXIT_INVALID: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    // 컬러 설정
    colored::control::set_override(args.color.enabled());

    match try_main(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_FAILED),
        Err(e) => {
            eprintln!("{} {:#}", "❌".bright_red(), e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// 전체 실행, 모든 파일이 성공하면 true
fn try_main(args: &Args) -> Result<bool> {
    // 로그 파일 기록을 위해 가드를 끝까지 유지
    let _guard = init_logging(&args.log_config())?;

    let config = args.to_config();

    if !args.quiet {
        print_header(&config);
    }

    let units = prepare(&config)?;

    if units.is_empty() {
        if !args.quiet {
            println!("{}", "⚠️ 변환할 HEIC/HEIF 파일이 없습니다.".yellow());
        }
        return Ok(true);
    }

    if !args.quiet {
        println!(
            "  {} 발견된 파일 수: {}",
            "📋".bright_white(),
            units.len().to_string().bright_green()
        );
        // 드라이런은 리포터가 계획 목록을 따로 출력
        if args.verbose > 0 && !config.dry_run {
            for line in found_file_lines(&units) {
                println!("    {} {}", "•".bright_white(), line);
            }
        }
        if !config.dry_run {
            println!("\n{}", "⚡ 변환 중...".bright_cyan());
        }
    }

    let codec = HeifJpegCodec::new();
    let reporter = ConsoleReporter::new(units.len(), args.console_options());

    let report = BatchScheduler::new(&codec, &reporter).run(
        units,
        config.effective_jobs(),
        config.dry_run,
    )?;

    // JSON 리포트 작성
    if let Some(ref path) = args.report {
        report
            .write_json(path)
            .with_context(|| format!("리포트 저장 실패: {:?}", path))?;
        if !args.quiet {
            println!("{} 리포트 저장: {:?}", "📝".bright_cyan(), path);
        }
    }

    Ok(report.overall_success())
}

/// 에러 종류에 따른 종료 코드
fn exit_code_for(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<ConvertError>() {
        Some(e) if e.is_fatal() => EXIT_INVALID,
        _ => EXIT_FAILED,
    }
}

/// 발견된 파일 목록 (`-v`), 원본과 출력 경로 및 건너뛸 파일 표시
fn found_file_lines(units: &[PlannedUnit]) -> Vec<String> {
    units
        .iter()
        .map(|unit| {
            let line = format!(
                "{} → {}",
                unit.source.display(),
                unit.destination.display()
            );
            match unit.action {
                Action::Convert => line,
                Action::SkipExisting => format!("{} (이미 존재, 건너뜀)", line),
            }
        })
        .collect()
}

/// 헤더 출력
fn print_header(config: &Config) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🚀 HEIC TO JPEG CONVERTER".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());

    for path in &config.paths {
        println!("  {} 입력: {:?}", "📂".bright_cyan(), path);
    }

    match config.output_dir {
        Some(ref dir) => println!("  {} 출력 폴더: {:?}", "📄".bright_green(), dir),
        None => println!("  {} 출력 폴더: 원본과 같은 폴더", "📄".bright_green()),
    }

    println!(
        "  {} 품질: {}  동시 작업: {}",
        "⚙️".bright_yellow(),
        config.quality,
        config.effective_jobs()
    );

    if let Some(ref suffix) = config.suffix {
        println!("  {} 접미사: {}", "✏️".bright_magenta(), suffix);
    }

    if let Some(ref pattern) = config.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if config.recursive {
        println!("  {} 하위 폴더 포함", "📏".bright_white());
    }

    if config.force_overwrite {
        println!("  {} {}", "♻️".bright_yellow(), "기존 파일 덮어쓰기".yellow());
    }

    if config.delete_original {
        println!("  {} {}", "🗑️".bright_red(), "변환 후 원본 삭제".red());
    }

    if config.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "📁 파일 검색 중...".bright_cyan());
}
