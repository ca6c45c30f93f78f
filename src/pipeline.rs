//! 탐색기와 진행률 표시기를 묶는 파이프라인
//!
//! ```text
//! Walker Thread:   순회 → 변환 → 기록 → send(CompletionSignal)
//!                                          │  bounded(3)
//! Progress Thread: recv → 카운트 갱신 ──────┘  (채널이 닫히면 총계 출력)
//! ```
//!
//! 채널이 가득 차면 탐색기가 멈추고, 진행률 표시기는 채널이 닫힐 때 종료합니다.
//! `run`은 두 스레드가 모두 끝난 뒤에 반환합니다.

use crossbeam_channel::bounded;
use std::sync::Arc;
use std::thread;

use crate::error::{HanwrapError, Result};
use crate::progress::ProgressReporter;
use crate::stats::Statistics;
use crate::walker::{TreeWalker, WalkSummary};

/// 완료 신호 채널 용량
pub const SIGNAL_CAPACITY: usize = 3;

/// 파이프라인 실행 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// 탐색기 결과
    pub walk: WalkSummary,
    /// 진행률 표시기가 센 완료 신호 수
    pub reported: u64,
}

/// 탐색기(생산자)와 진행률 표시기(소비자)를 동시에 실행하는 조정자
pub struct Pipeline {
    walker: TreeWalker,
    reporter: ProgressReporter,
    capacity: usize,
}

impl Pipeline {
    pub fn new(walker: TreeWalker, reporter: ProgressReporter) -> Self {
        Self {
            walker,
            reporter,
            capacity: SIGNAL_CAPACITY,
        }
    }

    /// 채널 용량 설정 (최소 1)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// 두 스레드를 시작하고 둘 다 끝날 때까지 대기
    pub fn run(self, stats: Arc<Statistics>) -> Result<RunSummary> {
        let (signal_tx, signal_rx) = bounded(self.capacity);

        let reporter = self.reporter;
        let reporter_handle = thread::Builder::new()
            .name("hanwrap-progress".into())
            .spawn(move || reporter.report(signal_rx))
            .map_err(|e| HanwrapError::ThreadSpawn {
                name: "progress",
                reason: e.to_string(),
            })?;

        let walker = self.walker;
        let walker_handle = match thread::Builder::new()
            .name("hanwrap-walker".into())
            .spawn(move || walker.walk(signal_tx, &stats))
        {
            Ok(handle) => handle,
            Err(e) => {
                // 실패한 클로저와 함께 송신자가 해제되었으므로 표시기는 곧 끝난다
                let _ = reporter_handle.join();
                return Err(HanwrapError::ThreadSpawn {
                    name: "walker",
                    reason: e.to_string(),
                });
            }
        };

        let walk = walker_handle
            .join()
            .map_err(|_| HanwrapError::ThreadPanicked { name: "walker" });
        let reported = reporter_handle
            .join()
            .map_err(|_| HanwrapError::ThreadPanicked { name: "progress" });

        Ok(RunSummary {
            walk: walk?,
            reported: reported?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ExclusionSet;
    use crate::walker::WalkOptions;
    use std::fs;
    use tempfile::TempDir;

    fn setup(files: usize) -> (TempDir, TreeWalker) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        for i in 0..files {
            fs::write(src.join(format!("f{i}.txt")), format!("파일 {i}")).unwrap();
        }

        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();

        let walker =
            TreeWalker::new(&src, &out, ExclusionSet::default(), &WalkOptions::new()).unwrap();
        (temp, walker)
    }

    #[test]
    fn test_reported_equals_written() {
        let (temp, walker) = setup(25);
        let stats = Arc::new(Statistics::new());

        let summary = Pipeline::new(walker, ProgressReporter::hidden())
            .run(Arc::clone(&stats))
            .unwrap();

        assert!(summary.walk.completed());
        assert_eq!(summary.reported, 25);
        assert_eq!(summary.walk.written, 25);
        assert_eq!(stats.get_written(), 25);
        assert_eq!(fs::read_dir(temp.path().join("out")).unwrap().count(), 25);
    }

    #[test]
    fn test_capacity_one() {
        let (_temp, walker) = setup(5);

        let summary = Pipeline::new(walker, ProgressReporter::hidden())
            .with_capacity(0)
            .run(Arc::new(Statistics::new()))
            .unwrap();

        assert_eq!(summary.reported, 5);
    }

    #[test]
    fn test_empty_tree() {
        let (_temp, walker) = setup(0);

        let summary = Pipeline::new(walker, ProgressReporter::hidden())
            .run(Arc::new(Statistics::new()))
            .unwrap();

        assert_eq!(summary.reported, 0);
        assert!(summary.walk.failures.is_empty());
    }
}
