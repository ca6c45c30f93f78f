//! hanwrap - 한글 추출 및 변환기
//!
//! 소스 트리의 모든 텍스트 파일에서 한글 구간을 찾아 번역 마커 함수 호출로 감싸고,
//! 결과를 같은 구조의 출력 트리에 기록하는 CLI 도구입니다. 원본 트리는 수정하지 않습니다.
//!
//! # 주요 기능
//!
//! - 🔤 **멱등 변환**: 이미 `__()`로 감싸진 구간은 다시 감싸지 않음
//! - 📂 **트리 미러링**: 입력 트리와 같은 상대 경로로 출력
//! - 🚫 **확장자 제외**: 지정한 확장자는 변환하지 않음
//! - 🔍 **패턴 필터링**: glob 형식의 파일 이름 필터
//! - 📊 **진행률 표시**: 탐색 스레드와 표시 스레드를 채널로 연결
//! - 🧪 **드라이런 모드**: 실제 기록 없이 처리될 파일 목록 확인
//!
//! # 예제
//!
//! ```bash
//! # 대화형 실행
//! hanwrap
//!
//! # 인자로 실행
//! hanwrap -i ./src -o ./src_i18n -e .png,.jpg
//! ```

pub mod cli;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod stats;
pub mod transform;
pub mod walker;

// Re-exports for convenient access
pub use cli::Args;
pub use error::{HanwrapError, Result};
pub use filter::{ExclusionSet, FileFilter};
pub use pipeline::{Pipeline, RunSummary};
pub use progress::ProgressReporter;
pub use stats::{format_bytes, RunReport, Statistics};
pub use transform::Transformer;
pub use walker::{CompletionSignal, FileTask, TreeWalker, WalkOptions, WalkSummary};
