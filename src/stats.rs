//! 통계 및 리포트 모듈
//!
//! 처리 통계 수집, 요약 출력, JSON 실행 리포트를 담당합니다.

use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// 처리 통계 구조체
///
/// 탐색기 스레드가 갱신하고 메인 스레드가 읽습니다.
#[derive(Debug, Default)]
pub struct Statistics {
    /// 변환 후 기록한 파일 수
    pub written: AtomicUsize,
    /// 제외 확장자 또는 패턴으로 건너뛴 파일 수
    pub skipped: AtomicUsize,
    /// 읽기/쓰기 실패로 건너뛴 파일 수
    pub failed: AtomicUsize,
    /// 읽은 총 바이트
    pub total_bytes_read: AtomicU64,
    /// 쓴 총 바이트
    pub total_bytes_written: AtomicU64,
    /// 새로 감싼 한글 구간 수
    pub spans_wrapped: AtomicUsize,
    /// 보존한 기존 마커 구간 수
    pub spans_preserved: AtomicUsize,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn increment_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_read(&self, bytes: u64) {
        self.total_bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_bytes_written(&self, bytes: u64) {
        self.total_bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// 한 파일의 구간 통계 추가
    pub fn add_spans(&self, wrapped: usize, preserved: usize) {
        self.spans_wrapped.fetch_add(wrapped, Ordering::Relaxed);
        self.spans_preserved.fetch_add(preserved, Ordering::Relaxed);
    }

    pub fn get_written(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }

    pub fn get_skipped(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn get_failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 현재 값의 스냅샷
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            written: self.get_written(),
            skipped: self.get_skipped(),
            failed: self.get_failed(),
            bytes_read: self.total_bytes_read.load(Ordering::Relaxed),
            bytes_written: self.total_bytes_written.load(Ordering::Relaxed),
            spans_wrapped: self.spans_wrapped.load(Ordering::Relaxed),
            spans_preserved: self.spans_preserved.load(Ordering::Relaxed),
            elapsed_ms: self.elapsed().as_millis() as u64,
        }
    }

    /// 처리 통계 요약 출력
    pub fn print_summary(&self) {
        let s = self.snapshot();

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 처리 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 변환 완료:    {}",
            "✅".bright_green(),
            s.written.to_string().green()
        );
        println!("  {} 건너뜀:       {}", "⏭️".bright_cyan(), s.skipped);

        if s.failed > 0 {
            println!(
                "  {} 실패:         {}",
                "❌".bright_red(),
                s.failed.to_string().red()
            );
        } else {
            println!("  {} 실패:         {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} 감싼 한글:    {}",
            "🔤".bright_magenta(),
            s.spans_wrapped
        );
        println!(
            "  {} 기존 마커:    {}",
            "🔒".bright_white(),
            s.spans_preserved
        );
        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(s.bytes_read)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(s.bytes_written)
        );
        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 직렬화 가능한 통계 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub spans_wrapped: usize,
    pub spans_preserved: usize,
    pub elapsed_ms: u64,
}

/// 파일 단위 실패 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// 실패한 입력 파일 경로
    pub path: PathBuf,
    /// 실패 이유
    pub reason: String,
}

/// `--report`로 기록하는 JSON 실행 리포트
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub marker: String,
    pub excluded_extensions: Vec<String>,
    /// 진행률 표시기가 센 완료 신호 수
    pub reported: u64,
    /// 순회가 끝까지 진행되었는지 여부
    pub completed: bool,
    /// 순회 중단 사유
    pub aborted: Option<String>,
    pub stats: StatsSnapshot,
    pub failures: Vec<FileFailure>,
}

impl RunReport {
    /// JSON 문자열로 직렬화
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use hanwrap::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        format!("{}시간 {}분", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}분 {}초", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
