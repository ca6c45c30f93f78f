//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.
//! 입력/출력 경로를 생략하면 실행 중에 대화형으로 묻습니다.

use clap::Parser;
use std::path::PathBuf;

use crate::filter::ExclusionSet;
use crate::transform::DEFAULT_MARKER;
use crate::walker::WalkOptions;

/// hanwrap CLI 인자 구조체
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hanwrap",
    author = "YourName <your@email.com>",
    version,
    about = "한글 추출 및 변환기 - 소스 트리의 한글 문자열을 번역 마커 함수로 감싸는 CLI 도구",
    long_about = r#"
한글 추출 및 변환기
==================

입력 폴더를 재귀적으로 탐색하여 각 파일의 한글 구간을
번역 마커 함수 호출(__('한글'))로 감싼 뒤, 같은 구조의 출력 폴더에 기록합니다.
원본 폴더는 수정하지 않습니다.

특징:
  • 이미 __() 로 감싸진 구간은 다시 감싸지 않음 (여러 번 실행해도 결과 동일)
  • 제외 확장자 및 파일 이름 패턴 필터
  • 진행률 표시 및 상세 통계
  • 경로를 생략하면 대화형으로 입력

예제:
  hanwrap
  hanwrap -i ./src -o ./src_i18n -e .png,.jpg,.exe
  hanwrap -i ./src -o ./out --pattern "*.js" --marker _t
  hanwrap -i ./src -o ./out --dry-run
"#
)]
pub struct Args {
    /// 읽을 입력 폴더 경로 (생략 시 대화형 입력)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// 출력 폴더 경로, 아직 존재하지 않아야 함 (생략 시 대화형 입력)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 변환하지 않을 확장자 (쉼표로 구분, .포함, 예: ".png,.exe")
    #[arg(short, long)]
    pub exclude: Option<String>,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "*.js")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 마커 함수 이름
    #[arg(short, long, default_value = DEFAULT_MARKER)]
    pub marker: String,

    /// 최대 폴더 탐색 깊이
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// 실제 변환 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// JSON 실행 리포트 파일 경로
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Args {
    /// 입력이나 출력 경로를 대화형으로 물어야 하는지 확인
    pub fn is_interactive(&self) -> bool {
        self.input.is_none() || self.output.is_none()
    }

    /// 명령줄로 받은 제외 확장자 집합
    pub fn exclusions(&self) -> Option<ExclusionSet> {
        self.exclude.as_deref().map(ExclusionSet::parse)
    }

    /// 탐색 옵션 생성
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions::new()
            .with_marker(self.marker.clone())
            .with_pattern(self.pattern.clone())
            .with_max_depth(self.max_depth)
    }
}
