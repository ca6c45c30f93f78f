//! 파일 필터 모듈
//!
//! 제외 확장자 집합과 glob 파일 이름 패턴으로 처리할 파일을 고릅니다.

use glob::Pattern;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{HanwrapError, Result};

/// 변환하지 않을 확장자 집합
///
/// 각 항목은 앞의 `.`을 포함합니다 (예: `.png`). 비교는 정확한 문자열 일치입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    extensions: HashSet<String>,
}

impl ExclusionSet {
    /// 쉼표로 구분된 확장자 목록 파싱
    ///
    /// 공백은 제거하지 않으므로 확장자의 일부로 취급됩니다. 빈 항목은 버립니다.
    ///
    /// # Examples
    /// ```
    /// use hanwrap::filter::ExclusionSet;
    ///
    /// let set = ExclusionSet::parse(".png,.exe");
    /// assert!(set.contains(".png"));
    /// assert!(!set.contains(".txt"));
    /// ```
    pub fn parse(list: &str) -> Self {
        list.split(',')
            .filter(|ext| !ext.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 확장자 포함 여부
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    /// 경로의 확장자가 제외 대상인지 확인
    pub fn excludes(&self, path: &Path) -> bool {
        let ext = dotted_extension(path);
        !ext.is_empty() && std::str::from_utf8(ext).is_ok_and(|ext| self.contains(ext))
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// 정렬된 확장자 목록
    pub fn sorted(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

impl FromIterator<String> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            extensions: iter.into_iter().collect(),
        }
    }
}

/// 파일 이름의 마지막 `.`부터 끝까지를 확장자로 반환
///
/// `archive.tar.gz`는 `.gz`, `.bashrc`는 `.bashrc`, `Makefile`은 빈 값입니다.
/// 파일 이름이 UTF-8이 아니어도 바이트 단위로 찾습니다.
pub fn dotted_extension(path: &Path) -> &[u8] {
    path.file_name()
        .map(|name| name.as_encoded_bytes())
        .and_then(|name| name.iter().rposition(|b| *b == b'.').map(|i| &name[i..]))
        .unwrap_or_default()
}

/// 파일을 건너뛰는 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 제외 확장자
    Excluded,
    /// 파일 이름 패턴 불일치
    PatternMismatch,
}

/// 제외 확장자와 파일 이름 패턴을 합친 필터
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    exclusions: ExclusionSet,
    pattern: Option<Pattern>,
}

impl FileFilter {
    /// 새 필터 생성
    ///
    /// # Arguments
    /// * `exclusions` - 제외 확장자 집합
    /// * `pattern` - 파일 이름 glob 패턴 (None이면 모든 파일 통과)
    pub fn new(exclusions: ExclusionSet, pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .map(|p| {
                Pattern::new(p).map_err(|_| HanwrapError::InvalidPattern {
                    pattern: p.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            exclusions,
            pattern,
        })
    }

    /// 경로를 검사하고 건너뛸 이유가 있으면 반환
    pub fn check(&self, path: &Path) -> Option<SkipReason> {
        if self.exclusions.excludes(path) {
            return Some(SkipReason::Excluded);
        }

        if let Some(pattern) = &self.pattern {
            let matched = path
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| pattern.matches(s))
                .unwrap_or(false);
            if !matched {
                return Some(SkipReason::PatternMismatch);
            }
        }

        None
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// 패턴이 설정되어 있는지 확인
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }
}
