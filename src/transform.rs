//! 텍스트 변환 모듈
//!
//! 파일 내용에서 한글 구간을 찾아 번역 마커 함수 호출(`__('한글')`)로 감쌉니다.
//!
//! 변환은 세 단계로 나뉘며 각 단계는 따로 호출할 수 있습니다.
//!
//! 1. **보호(shield)**: 이미 마커로 감싸진 구간을 플레이스홀더로 치환하고 원문을 큐에 보관
//! 2. **감싸기(wrap)**: 남은 텍스트의 한글 구간을 마커 호출로 감싸기
//! 3. **복원(unshield)**: 플레이스홀더를 큐에 보관한 원문으로 순서대로 되돌리기
//!
//! 보호 단계 덕분에 변환은 멱등입니다. 두 번 적용해도 한 번 적용한 결과와 같습니다.
//!
//! 내용은 바이트 단위로 처리하므로 매칭되지 않은 바이트는 UTF-8이 아니어도 그대로 보존됩니다.
//!
//! 마커 이름이 영문자나 숫자로 시작하면(`t` 등) 영숫자 바로 뒤에 오는 마커는 마커로 보지 않습니다.
//! `alert('안녕')`의 `t(`는 식별자의 일부입니다. 같은 이유로 한글 구간 앞에 붙은 영숫자는
//! 구간과 함께 감쌉니다(`ok가` → `t('ok가')`).

use regex::bytes::{Captures, Regex};
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::LazyLock;

use crate::error::{HanwrapError, Result};

/// 기본 마커 함수 이름
pub const DEFAULT_MARKER: &str = "__";

/// 한글 음절 구간 (가 ~ 힣)
static KOREAN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[가-힣]+").expect("Invalid Korean run regex"));

/// 앞에 붙은 영숫자까지 포함한 한글 구간
static KOREAN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9A-Za-z]*[가-힣]+").expect("Invalid Korean word regex"));

/// 플레이스홀더 앞뒤를 감싸는 사용자 정의 영역 문자
const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// 한글 구간을 마커 호출로 감싸는 변환기
#[derive(Debug, Clone)]
pub struct Transformer {
    marker: String,
    marked_span: Regex,
    /// 영숫자 뒤에 붙은 마커를 무시할지 여부
    word_bound: bool,
}

/// 보호 단계의 결과
///
/// 플레이스홀더로 치환된 텍스트와, 치환된 원문을 등장 순서대로 담은 큐를 가집니다.
#[derive(Debug)]
pub struct Shielded {
    text: Vec<u8>,
    placeholder: String,
    spans: VecDeque<Vec<u8>>,
}

/// 변환 결과와 구간 통계
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// 변환된 내용
    pub content: Vec<u8>,
    /// 새로 감싼 한글 구간 수
    pub wrapped: usize,
    /// 그대로 보존한 기존 마커 구간 수
    pub preserved: usize,
}

impl Transformer {
    /// 주어진 마커 이름으로 변환기 생성
    ///
    /// 마커 이름은 비어 있으면 안 되고 공백, 괄호, 따옴표, 한글 음절을 포함할 수 없습니다.
    ///
    /// # Examples
    /// ```
    /// use hanwrap::transform::Transformer;
    ///
    /// let t = Transformer::new("_t").unwrap();
    /// assert_eq!(t.transform("안녕".as_bytes()), "_t('안녕')".as_bytes());
    /// ```
    pub fn new(marker: &str) -> Result<Self> {
        if !is_valid_marker(marker) {
            return Err(HanwrapError::InvalidMarker {
                marker: marker.to_string(),
            });
        }

        let pattern = format!(r"{}\(.+?\)", regex::escape(marker));
        let marked_span = Regex::new(&pattern).map_err(|_| HanwrapError::InvalidMarker {
            marker: marker.to_string(),
        })?;

        Ok(Self {
            marker: marker.to_string(),
            marked_span,
            word_bound: marker.starts_with(|c: char| c.is_ascii_alphanumeric()),
        })
    }

    /// 마커 함수 이름 반환
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// 내용 전체를 변환
    ///
    /// # Examples
    /// ```
    /// use hanwrap::transform::Transformer;
    ///
    /// let t = Transformer::default();
    /// let out = t.transform("안녕 hello 세상".as_bytes());
    /// assert_eq!(out, "__('안녕') hello __('세상')".as_bytes());
    /// ```
    pub fn transform(&self, content: &[u8]) -> Vec<u8> {
        self.rewrite(content).content
    }

    /// 내용 전체를 변환하고 구간 통계를 함께 반환
    pub fn rewrite(&self, content: &[u8]) -> Rewrite {
        // 한글이 없으면 감쌀 것도 없다
        if !KOREAN_RUN.is_match(content) {
            return Rewrite {
                content: content.to_vec(),
                wrapped: 0,
                preserved: self.marked_ranges(content).len(),
            };
        }

        let shielded = self.shield(content);
        let preserved = shielded.len();
        let (text, wrapped) = self.wrap(shielded.text());
        let content = shielded.unshield(&text);

        Rewrite {
            content,
            wrapped,
            preserved,
        }
    }

    /// 보호 단계: 기존 마커 구간을 플레이스홀더로 치환
    pub fn shield(&self, content: &[u8]) -> Shielded {
        let placeholder = unused_placeholder(content);
        let mut spans = VecDeque::new();
        let mut text = Vec::with_capacity(content.len());
        let mut last = 0;

        for range in self.marked_ranges(content) {
            text.extend_from_slice(&content[last..range.start]);
            text.extend_from_slice(placeholder.as_bytes());
            spans.push_back(content[range.clone()].to_vec());
            last = range.end;
        }
        text.extend_from_slice(&content[last..]);

        Shielded {
            text,
            placeholder,
            spans,
        }
    }

    /// 감싸기 단계: 한글 구간을 마커 호출로 감싸고 감싼 구간 수를 함께 반환
    ///
    /// 구간 안의 따옴표는 이스케이프하지 않습니다.
    pub fn wrap(&self, text: &[u8]) -> (Vec<u8>, usize) {
        let mut wrapped = 0;
        let runs: &Regex = if self.word_bound {
            &KOREAN_WORD
        } else {
            &KOREAN_RUN
        };

        let out = runs
            .replace_all(text, |caps: &Captures| {
                wrapped += 1;
                let run = &caps[0];
                let mut call = Vec::with_capacity(self.marker.len() + run.len() + 4);
                call.extend_from_slice(self.marker.as_bytes());
                call.extend_from_slice(b"('");
                call.extend_from_slice(run);
                call.extend_from_slice(b"')");
                call
            })
            .into_owned();

        (out, wrapped)
    }

    /// 보호할 마커 구간의 위치를 왼쪽부터 수집
    fn marked_ranges(&self, content: &[u8]) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut at = 0;

        while let Some(m) = self.marked_span.find_at(content, at) {
            if self.word_bound && m.start() > 0 && content[m.start() - 1].is_ascii_alphanumeric() {
                at = m.start() + 1;
                continue;
            }
            ranges.push(m.range());
            at = m.end();
        }

        ranges
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER).expect("Default marker must be valid")
    }
}

impl Shielded {
    /// 플레이스홀더로 치환된 텍스트
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// 이번 호출에서 사용한 플레이스홀더
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// 보호된 구간 수
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// 보호된 구간이 없는지 확인
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// 복원 단계: 플레이스홀더를 보관한 원문으로 등장 순서대로 되돌림
    ///
    /// # Panics
    /// `text`의 플레이스홀더 개수가 보관한 구간 수와 다르면 패닉합니다.
    /// 변환 단계 사이에서 플레이스홀더가 생기거나 사라졌다는 뜻이므로 버그입니다.
    pub fn unshield(self, text: &[u8]) -> Vec<u8> {
        let Shielded {
            placeholder,
            mut spans,
            ..
        } = self;
        let token = placeholder.as_bytes();
        let positions = occurrences(text, token);

        assert_eq!(
            positions.len(),
            spans.len(),
            "placeholder count does not match shielded span count"
        );

        let restored_len: usize = spans.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(text.len() + restored_len);
        let mut last = 0;

        for at in positions {
            out.extend_from_slice(&text[last..at]);
            if let Some(span) = spans.pop_front() {
                out.extend_from_slice(&span);
            }
            last = at + token.len();
        }
        out.extend_from_slice(&text[last..]);

        out
    }
}

/// 마커 이름 유효성 검사
fn is_valid_marker(marker: &str) -> bool {
    !marker.is_empty()
        && !marker
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '"' | '가'..='힣'))
}

/// 내용에 등장하지 않는 플레이스홀더 선택
fn unused_placeholder(content: &[u8]) -> String {
    (0u64..)
        .map(|n| format!("{PLACEHOLDER_OPEN}{n}{PLACEHOLDER_CLOSE}"))
        .find(|candidate| !contains(content, candidate.as_bytes()))
        .unwrap_or_default()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// 겹치지 않는 `needle` 위치를 왼쪽부터 수집
fn occurrences(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    let mut found = Vec::new();
    let mut at = 0;

    while at + needle.len() <= haystack.len() {
        if haystack[at..].starts_with(needle) {
            found.push(at);
            at += needle.len();
        } else {
            at += 1;
        }
    }

    found
}
