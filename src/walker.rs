//! 디렉터리 트리 탐색 및 파일 변환 모듈
//!
//! 입력 루트를 재귀적으로 순회하면서 각 파일을 변환해 출력 트리의 같은 상대 경로에 기록하고,
//! 파일 하나를 마칠 때마다 완료 신호를 하나 보냅니다.
//!
//! 파일 단위 읽기/쓰기 실패는 기록만 하고 다음 파일로 넘어갑니다.
//! 디렉터리 순회 자체가 실패하면 나머지 순회를 중단합니다.

use crossbeam_channel::Sender;
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::error::{HanwrapError, Result};
use crate::filter::{ExclusionSet, FileFilter, SkipReason};
use crate::stats::{FileFailure, Statistics};
use crate::transform::{Transformer, DEFAULT_MARKER};

/// 파일 하나의 처리 완료 신호
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSignal;

/// 입력 파일과 출력 파일 경로 쌍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// 순회 중 만난 파일 하나에 대한 결정
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    /// 변환할 파일
    Task(FileTask),
    /// 건너뛸 파일
    Skipped { path: PathBuf, reason: SkipReason },
}

/// 탐색 옵션
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// 마커 함수 이름
    pub marker: String,
    /// 파일 이름 glob 패턴
    pub pattern: Option<String>,
    /// 최대 탐색 깊이
    pub max_depth: Option<usize>,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            pattern: None,
            max_depth: None,
            mmap_threshold: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl WalkOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 마커 이름 설정
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// 파일 이름 패턴 설정
    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    /// 최대 탐색 깊이 설정
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }
}

/// 순회 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// 기록을 마치고 완료 신호를 보낸 파일 수
    pub written: u64,
    /// 건너뛴 실패 파일 목록
    pub failures: Vec<FileFailure>,
    /// 순회 중단 사유 (끝까지 순회했으면 None)
    pub aborted: Option<String>,
}

impl WalkSummary {
    /// 순회가 끝까지 진행되었는지 확인
    pub fn completed(&self) -> bool {
        self.aborted.is_none()
    }
}

/// 입력 트리를 순회하며 변환 결과를 출력 트리에 기록하는 탐색기
#[derive(Debug, Clone)]
pub struct TreeWalker {
    source_root: PathBuf,
    output_root: PathBuf,
    filter: FileFilter,
    transformer: Transformer,
    max_depth: Option<usize>,
    mmap_threshold: u64,
}

impl TreeWalker {
    /// 새 탐색기 생성
    ///
    /// 마커 이름이나 파일 이름 패턴이 유효하지 않으면 에러를 반환합니다.
    pub fn new(
        source_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        exclusions: ExclusionSet,
        options: &WalkOptions,
    ) -> Result<Self> {
        Ok(Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
            filter: FileFilter::new(exclusions, options.pattern.as_deref())?,
            transformer: Transformer::new(&options.marker)?,
            max_depth: options.max_depth,
            mmap_threshold: options.mmap_threshold,
        })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// 입력 경로의 입력 루트 부분을 출력 루트로 바꾼 경로
    pub fn output_path(&self, input: &Path) -> Result<PathBuf> {
        let relative =
            input
                .strip_prefix(&self.source_root)
                .map_err(|_| HanwrapError::OutsideRoot {
                    file: input.to_path_buf(),
                })?;
        Ok(self.output_root.join(relative))
    }

    /// 파일 이름 순으로 정렬된 순회
    ///
    /// 디렉터리는 결과에 나오지 않고, 출력 루트가 입력 루트 안에 있으면 그 아래는 들어가지 않습니다.
    pub fn visits(&self) -> impl Iterator<Item = Result<Visit>> + '_ {
        let mut walker = WalkDir::new(&self.source_root).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let output_root = self.output_root.clone();
        walker
            .into_iter()
            .filter_entry(move |e| e.path() != output_root)
            .filter_map(move |entry| match entry {
                Err(e) => Some(Err(HanwrapError::Traversal {
                    reason: e.to_string(),
                })),
                Ok(entry) if entry.file_type().is_dir() => None,
                Ok(entry) => Some(self.visit(entry.path())),
            })
    }

    fn visit(&self, path: &Path) -> Result<Visit> {
        if let Some(reason) = self.filter.check(path) {
            return Ok(Visit::Skipped {
                path: path.to_path_buf(),
                reason,
            });
        }

        Ok(Visit::Task(FileTask {
            input: path.to_path_buf(),
            output: self.output_path(path)?,
        }))
    }

    /// 아무것도 쓰지 않고 변환할 파일 목록만 수집
    pub fn plan(&self) -> Result<Vec<FileTask>> {
        let mut tasks = Vec::new();
        for visit in self.visits() {
            if let Visit::Task(task) = visit? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// 트리 전체를 변환
    ///
    /// 기록한 파일마다 `signals`로 완료 신호를 하나씩 보냅니다. `signals`는 이 함수가
    /// 소유하므로 어떤 경로로 끝나든 반환 시점에 채널이 닫힙니다.
    pub fn walk(&self, signals: Sender<CompletionSignal>, stats: &Statistics) -> WalkSummary {
        info!(
            source = %self.source_root.display(),
            output = %self.output_root.display(),
            "walk started"
        );

        let mut summary = WalkSummary::default();

        for visit in self.visits() {
            let task = match visit {
                Ok(Visit::Task(task)) => task,
                Ok(Visit::Skipped { path, reason }) => {
                    debug!(path = %path.display(), ?reason, "skipped");
                    stats.increment_skipped();
                    continue;
                }
                Err(e) => {
                    error!("{}", e);
                    summary.aborted = Some(e.to_string());
                    break;
                }
            };

            match self.process(&task, stats) {
                Ok(()) => {
                    debug!(path = %task.output.display(), "written");
                    stats.increment_written();
                    summary.written += 1;

                    if signals.send(CompletionSignal).is_err() {
                        debug!("progress receiver is gone");
                    }
                }
                Err(e) => {
                    warn!("{}", e);
                    stats.increment_failed();
                    summary.failures.push(FileFailure {
                        path: task.input,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            written = summary.written,
            failed = summary.failures.len(),
            completed = summary.completed(),
            "walk finished"
        );

        summary
    }

    /// 파일 하나를 읽고 변환해서 기록
    fn process(&self, task: &FileTask, stats: &Statistics) -> Result<()> {
        let source = read_source(&task.input, self.mmap_threshold)?;
        stats.add_bytes_read(source.len() as u64);

        let rewrite = self.transformer.rewrite(&source);
        drop(source);

        if let Some(parent) = task.output.parent() {
            fs::create_dir_all(parent).map_err(|e| HanwrapError::CreateDirError {
                dir: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        write_output(&task.output, &rewrite.content)?;

        stats.add_bytes_written(rewrite.content.len() as u64);
        stats.add_spans(rewrite.wrapped, rewrite.preserved);
        Ok(())
    }
}

/// 읽어 들인 파일 내용
enum Source {
    Buffered(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for Source {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Source::Buffered(bytes) => bytes.as_slice(),
            Source::Mapped(mmap) => &mmap[..],
        }
    }
}

/// 파일 내용 읽기 (임계값 이상은 메모리 매핑)
fn read_source(path: &Path, mmap_threshold: u64) -> Result<Source> {
    let read_error = |e: std::io::Error| HanwrapError::ReadError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut file = File::open(path).map_err(read_error)?;
    let size = file.metadata().map_err(read_error)?.len();

    if size >= mmap_threshold && size > 0 {
        // 변환이 끝날 때까지만 매핑을 유지한다
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| HanwrapError::ReadError {
            file: path.to_path_buf(),
            reason: format!("메모리 매핑 실패: {}", e),
        })?;
        return Ok(Source::Mapped(mmap));
    }

    let mut bytes = Vec::with_capacity(size as usize);
    file.read_to_end(&mut bytes).map_err(read_error)?;
    Ok(Source::Buffered(bytes))
}

/// 출력 파일 생성(또는 잘라내기) 후 기록
///
/// 파일 핸들은 이 함수 안에서만 살아 있습니다.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let write_error = |e: std::io::Error| HanwrapError::WriteError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
    writer.write_all(content).map_err(write_error)?;
    writer.flush().map_err(write_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use tempfile::TempDir;

    fn walker(src: &Path, out: &Path, exclude: &str) -> TreeWalker {
        TreeWalker::new(src, out, ExclusionSet::parse(exclude), &WalkOptions::new()).unwrap()
    }

    #[test]
    fn test_output_path_mirrors_relative_path() {
        let w = walker(Path::new("/src/root"), Path::new("/out"), "");
        assert_eq!(
            w.output_path(Path::new("/src/root/a/b/c.txt")).unwrap(),
            PathBuf::from("/out/a/b/c.txt")
        );
        assert!(w.output_path(Path::new("/elsewhere/c.txt")).is_err());
    }

    #[test]
    fn test_output_path_only_replaces_prefix() {
        let w = walker(Path::new("/data"), Path::new("/out"), "");
        assert_eq!(
            w.output_path(Path::new("/data/nested/data/x.txt")).unwrap(),
            PathBuf::from("/out/nested/data/x.txt")
        );
    }

    #[test]
    fn test_plan_skips_excluded_and_dirs() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("a.txt"), "가").unwrap();
        fs::write(src.join("b.png"), [0u8, 1, 2]).unwrap();
        fs::write(src.join("sub/c.js"), "나").unwrap();

        let out = temp.path().join("out");
        let tasks = walker(&src, &out, ".png").plan().unwrap();

        let inputs: Vec<_> = tasks.iter().map(|t| t.input.clone()).collect();
        assert_eq!(inputs, vec![src.join("a.txt"), src.join("sub/c.js")]);
        assert_eq!(tasks[1].output, out.join("sub/c.js"));
        assert!(!out.exists());
    }

    #[test]
    fn test_walk_writes_and_signals() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("deep/er")).unwrap();
        fs::write(src.join("a.txt"), "안녕 hello 세상").unwrap();
        fs::write(src.join("deep/er/b.txt"), "").unwrap();
        fs::write(src.join("skip.exe"), "실행").unwrap();

        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();

        let (tx, rx) = unbounded();
        let stats = Statistics::new();
        let summary = walker(&src, &out, ".png,.exe").walk(tx, &stats);

        assert!(summary.completed());
        assert_eq!(summary.written, 2);
        assert_eq!(rx.iter().count(), 2);
        assert_eq!(
            fs::read_to_string(out.join("a.txt")).unwrap(),
            "__('안녕') hello __('세상')"
        );
        assert_eq!(fs::read(out.join("deep/er/b.txt")).unwrap(), b"");
        assert!(!out.join("skip.exe").exists());
        assert_eq!(stats.get_skipped(), 1);
        assert_eq!(stats.snapshot().spans_wrapped, 2);
    }

    #[test]
    fn test_walk_truncates_existing_output() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a.txt"), "짧음").unwrap();

        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("a.txt"), "a much longer leftover content").unwrap();

        let (tx, _rx) = unbounded();
        walker(&src, &out, "").walk(tx, &Statistics::new());

        assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "__('짧음')");
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_excludes_non_utf8_file_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        let name = OsStr::from_bytes(b"\xffimage.png");
        fs::write(src.join(name), "가").unwrap();
        fs::write(src.join("keep.txt"), "나").unwrap();

        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();

        let (tx, rx) = unbounded();
        let stats = Statistics::new();
        let summary = walker(&src, &out, ".png").walk(tx, &stats);

        assert_eq!(summary.written, 1);
        assert_eq!(rx.iter().count(), 1);
        assert_eq!(stats.get_skipped(), 1);
        assert!(!out.join(name).exists());
        assert!(out.join("keep.txt").exists());
    }

    #[test]
    fn test_walk_with_dropped_receiver_continues() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a.txt"), "가").unwrap();
        fs::write(src.join("b.txt"), "나").unwrap();

        let out = temp.path().join("out");
        let (tx, rx) = unbounded();
        drop(rx);

        let summary = walker(&src, &out, "").walk(tx, &Statistics::new());
        assert_eq!(summary.written, 2);
        assert!(out.join("b.txt").exists());
    }

    #[test]
    fn test_walk_skips_output_inside_source() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().to_path_buf();
        fs::write(src.join("a.txt"), "가").unwrap();

        let out = src.join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("old.txt"), "나").unwrap();

        let tasks = walker(&src, &out, "").plan().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].input, src.join("a.txt"));
    }

    #[test]
    fn test_mmap_read_path() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("big.txt"), "크다 big").unwrap();

        let out = temp.path().join("out");
        let options = WalkOptions::new().with_mmap_threshold(1);
        let w = TreeWalker::new(&src, &out, ExclusionSet::default(), &options).unwrap();

        let (tx, _rx) = unbounded();
        let summary = w.walk(tx, &Statistics::new());
        assert_eq!(summary.written, 1);
        assert_eq!(
            fs::read_to_string(out.join("big.txt")).unwrap(),
            "__('크다') big"
        );
    }

    #[test]
    fn test_max_depth() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("l1/l2")).unwrap();
        fs::write(src.join("root.txt"), "").unwrap();
        fs::write(src.join("l1/one.txt"), "").unwrap();
        fs::write(src.join("l1/l2/two.txt"), "").unwrap();

        let options = WalkOptions::new().with_max_depth(Some(2));
        let w = TreeWalker::new(&src, temp.path().join("out"), ExclusionSet::default(), &options)
            .unwrap();

        assert_eq!(w.plan().unwrap().len(), 2);
    }

    #[test]
    fn test_options_builder() {
        let options = WalkOptions::new()
            .with_marker("_t")
            .with_pattern(Some("*.js".to_string()))
            .with_max_depth(Some(3));

        assert_eq!(options.marker, "_t");
        assert_eq!(options.pattern.as_deref(), Some("*.js"));
        assert_eq!(options.max_depth, Some(3));
        assert_eq!(options.mmap_threshold, 10 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_marker_rejected() {
        let options = WalkOptions::new().with_marker("bad marker");
        let result = TreeWalker::new("/a", "/b", ExclusionSet::default(), &options);
        assert!(matches!(result, Err(HanwrapError::InvalidMarker { .. })));
    }
}
