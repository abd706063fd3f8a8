//! 배치 스케줄러 모듈
//!
//! 작업 단위를 고정 크기 스레드 풀에 분배하고 결과를 모아 리포트를 만듭니다.

use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::codec::Codec;
use crate::error::{ConvertError, Result};
use crate::plan::PlannedUnit;
use crate::report::{BatchReport, Outcome, SkipReason};
use crate::reporter::Reporter;
use crate::worker;

/// 워커들이 결과를 넣는 동기화된 수집기
#[derive(Default)]
pub struct OutcomeCollector {
    outcomes: Mutex<Vec<Outcome>>,
}

impl OutcomeCollector {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// 결과 추가
    pub fn push(&self, outcome: Outcome) {
        // 다른 워커가 패닉해도 이미 모은 결과는 유지
        let mut outcomes = self
            .outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        outcomes.push(outcome);
    }

    /// 수집 종료 후 결과 목록 반환 (완료 순서)
    pub fn into_inner(self) -> Vec<Outcome> {
        self.outcomes
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 배치 스케줄러
pub struct BatchScheduler<'a> {
    codec: &'a dyn Codec,
    reporter: &'a dyn Reporter,
}

impl<'a> BatchScheduler<'a> {
    /// 새 스케줄러 생성
    pub fn new(codec: &'a dyn Codec, reporter: &'a dyn Reporter) -> Self {
        Self { codec, reporter }
    }

    /// 작업 단위 목록 실행
    ///
    /// # Arguments
    /// * `units` - 계획된 작업 단위 (후보 순서)
    /// * `concurrency` - 동시 작업 수 (0이면 1)
    /// * `dry_run` - true이면 워커와 코덱을 호출하지 않고 계획만 보고
    ///
    /// # Returns
    /// 후보 순서로 정렬된 `BatchReport`. 실패한 파일이 있어도 나머지는 모두 실행됩니다.
    pub fn run(
        &self,
        units: Vec<PlannedUnit>,
        concurrency: usize,
        dry_run: bool,
    ) -> Result<BatchReport> {
        let started = Instant::now();

        let outcomes = if dry_run {
            self.run_dry(units)
        } else {
            self.run_parallel(units, concurrency.max(1))?
        };

        let report = BatchReport::from_outcomes(outcomes, dry_run, started.elapsed());

        info!(
            total = report.total,
            converted = report.converted,
            skipped = report.skipped,
            failed = report.failed,
            dry_run,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "배치 완료"
        );

        self.notify("batch_completed", |r| r.batch_completed(&report));
        Ok(report)
    }

    /// 보고자 호출 (보고자 패닉은 기록만 하고 배치는 계속)
    ///
    /// 예: 파이프가 닫힌 stdout에 `println!`하면 패닉이 발생합니다.
    fn notify(&self, event: &'static str, f: impl FnOnce(&dyn Reporter)) {
        let reporter = self.reporter;
        if panic::catch_unwind(AssertUnwindSafe(|| f(reporter))).is_err() {
            warn!(event, "보고자 처리 중 패닉 발생, 무시하고 계속");
        }
    }

    /// 드라이런: 계획된 작업을 건너뜀 결과로 기록
    fn run_dry(&self, units: Vec<PlannedUnit>) -> Vec<Outcome> {
        units
            .into_iter()
            .map(|unit| {
                let action = unit.action;
                let outcome = Outcome::skipped(unit, SkipReason::DryRun(action));
                self.notify("unit_completed", |r| r.unit_completed(&outcome));
                outcome
            })
            .collect()
    }

    /// 전용 스레드 풀에서 병렬 실행
    fn run_parallel(&self, units: Vec<PlannedUnit>, threads: usize) -> Result<Vec<Outcome>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("heic2jpg-worker-{}", i))
            .build()
            .map_err(|e| ConvertError::ThreadPool {
                reason: e.to_string(),
            })?;

        info!(units = units.len(), threads, "배치 시작");

        let collector = OutcomeCollector::with_capacity(units.len());

        // 작은 배치에서도 모든 스레드가 하나씩 가져가도록 분할 크기 1
        pool.install(|| {
            units.par_iter().with_max_len(1).for_each(|unit| {
                debug!(index = unit.index, source = ?unit.source, "작업 시작");
                self.notify("unit_started", |r| r.unit_started(unit));

                let outcome = worker::execute(unit, self.codec);

                self.notify("unit_completed", |r| r.unit_completed(&outcome));
                collector.push(outcome);
            });
        });

        Ok(collector.into_inner())
    }
}
