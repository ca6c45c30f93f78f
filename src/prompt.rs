//! 대화형 입력 모듈
//!
//! 입력 루트, 출력 루트, 제외 확장자를 사용자에게 묻습니다.
//! 한 줄 입력은 [`LineSource`]를 통해 요청/응답 방식으로 주고받으므로
//! 표준 입력 대신 어떤 리더든 넘길 수 있습니다.

use std::fs;
use std::io::{self, BufRead, ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::{HanwrapError, Result};
use crate::filter::ExclusionSet;

/// 한 줄 입력을 요청하고 메시지를 보여주는 입출력 추상화
pub trait LineSource {
    /// `prompt`를 보여주고 한 줄을 읽습니다. 입력이 끝났으면 `None`.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// 사용자에게 메시지 한 줄 출력
    fn say(&mut self, message: &str) -> io::Result<()>;
}

/// 리더/라이터 쌍으로 만든 [`LineSource`]
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// 라이터 반환 (테스트에서 출력 확인용)
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> LineSource for Prompter<R, W> {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Some(trimmed.to_string()))
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", message)
    }
}

/// 입력 문자열을 `cwd` 기준 절대 경로로 변환
///
/// `.`과 `..`은 경로 문자열만 보고 정리합니다.
///
/// # Examples
/// ```
/// use hanwrap::prompt::resolve_path;
/// use std::path::{Path, PathBuf};
///
/// let p = resolve_path("a/../b", Path::new("/work")).unwrap();
/// assert_eq!(p, PathBuf::from("/work/b"));
/// ```
pub fn resolve_path(input: impl AsRef<Path>, cwd: &Path) -> Result<PathBuf> {
    let input = input.as_ref();
    if input.as_os_str().as_encoded_bytes().contains(&0) {
        return Err(HanwrapError::InvalidPath {
            input: input.display().to_string(),
            reason: "경로에 NUL 문자가 있습니다".to_string(),
        });
    }

    let joined = cwd.join(input);
    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }

    if !resolved.is_absolute() {
        return Err(HanwrapError::InvalidPath {
            input: input.display().to_string(),
            reason: "절대 경로로 변환할 수 없습니다".to_string(),
        });
    }

    Ok(resolved)
}

/// 입력 루트 검사: 존재하는 디렉터리여야 함
pub fn check_source_root(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(HanwrapError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(HanwrapError::InputNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(HanwrapError::StatError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// 출력 루트 검사: 아직 존재하지 않아야 함
pub fn check_output_root(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(_) => Err(HanwrapError::OutputExists {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(HanwrapError::StatError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// 출력 루트 검사 후 빈 디렉터리로 생성 (상위 디렉터리는 만들지 않음)
pub fn prepare_output_root(path: &Path) -> Result<()> {
    check_output_root(path)?;
    fs::create_dir(path).map_err(|e| HanwrapError::OutputCreateError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// 유효한 입력 루트를 받을 때까지 질문
pub fn ask_source_root(source: &mut impl LineSource, cwd: &Path) -> Result<PathBuf> {
    let prompt = format!(
        "읽을 경로를 입력하세요. 현재경로: {}\n경로: ",
        cwd.display()
    );

    loop {
        let line = source.ask(&prompt)?.ok_or(HanwrapError::InputClosed)?;
        let checked = resolve_path(&line, cwd).and_then(|path| {
            check_source_root(&path)?;
            Ok(path)
        });

        match checked {
            Ok(path) => return Ok(path),
            Err(e) => source.say(&e.to_string())?,
        }
    }
}

/// 사용 가능한 출력 루트를 받을 때까지 질문
///
/// `create`가 참이면 받은 경로에 빈 디렉터리를 만듭니다.
pub fn ask_output_root(source: &mut impl LineSource, cwd: &Path, create: bool) -> Result<PathBuf> {
    let prompt = format!(
        "출력 경로를 입력하세요. 현재경로: {}\n경로: ",
        cwd.display()
    );

    loop {
        let line = source.ask(&prompt)?.ok_or(HanwrapError::InputClosed)?;
        let checked = resolve_path(&line, cwd).and_then(|path| {
            if create {
                prepare_output_root(&path)?;
            } else {
                check_output_root(&path)?;
            }
            Ok(path)
        });

        match checked {
            Ok(path) => return Ok(path),
            Err(e) => source.say(&e.to_string())?,
        }
    }
}

/// 제외 확장자 목록 질문
pub fn ask_exclusions(source: &mut impl LineSource) -> Result<ExclusionSet> {
    source.say("변환하지 않을 파일 확장자를 ,로 구분해서 공백 없이 적어주세요")?;
    let line = source
        .ask("확장자(.를 포함해서 적어주세요): ")?
        .ok_or(HanwrapError::InputClosed)?;
    Ok(ExclusionSet::parse(&line))
}
