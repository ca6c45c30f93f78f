//! 진행률 표시 모듈
//!
//! 완료 신호를 받을 때마다 완료 파일 수를 한 줄에서 갱신하고, 채널이 닫히면 총계를 출력합니다.

use crossbeam_channel::Receiver;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::walker::CompletionSignal;

/// 완료 신호를 세어 화면에 표시하는 진행률 표시기
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// 터미널에 그리는 진행률 표시기 생성
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// 아무것도 그리지 않는 진행률 표시기 (테스트, 리다이렉트용)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// 채널이 닫힐 때까지 신호를 세고 총계를 반환
    pub fn report(self, signals: Receiver<CompletionSignal>) -> u64 {
        let mut total = 0u64;

        for _ in signals.iter() {
            total += 1;
            self.bar.set_message(progress_message(total));
        }

        self.bar.finish_with_message(final_message(total));
        total
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// 진행 중 메시지
pub fn progress_message(count: u64) -> String {
    format!("현재 {}번째 파일 작업을 완료했습니다.", count)
}

/// 최종 메시지
pub fn final_message(total: u64) -> String {
    format!("총 {}개의 파일을 작업 완료했습니다.", total)
}
