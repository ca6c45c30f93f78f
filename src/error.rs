//! 에러 타입 정의 모듈
//!
//! hanwrap에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// hanwrap에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum HanwrapError {
    /// 경로를 절대 경로로 변환할 수 없음
    #[error("경로를 해석할 수 없습니다 ({input}): {reason}")]
    InvalidPath { input: String, reason: String },

    /// 입력 폴더가 존재하지 않음
    #[error("{path} 경로는 존재하지 않습니다")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("{path} 경로는 디렉터리가 아닙니다")]
    NotADirectory { path: PathBuf },

    /// 입력 경로 상태 확인 실패
    #[error("경로를 확인할 수 없습니다 ({path}): {reason}")]
    StatError { path: PathBuf, reason: String },

    /// 출력 폴더가 이미 존재
    #[error("{path} 경로는 이미 존재하는 경로입니다. 다른 경로를 선택해주세요")]
    OutputExists { path: PathBuf },

    /// 출력 폴더 생성 실패
    #[error("출력 폴더를 만들 수 없습니다 ({path}): {reason}")]
    OutputCreateError { path: PathBuf, reason: String },

    /// 파일 읽기 실패
    #[error("파일을 읽을 수 없습니다 ({file}): {reason}")]
    ReadError { file: PathBuf, reason: String },

    /// 출력 디렉터리 생성 실패
    #[error("디렉터리를 만들 수 없습니다 ({dir}): {reason}")]
    CreateDirError { dir: PathBuf, reason: String },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({file}): {reason}")]
    WriteError { file: PathBuf, reason: String },

    /// 파일이 입력 루트 밖에 있음
    #[error("입력 루트 밖의 파일입니다: {file}")]
    OutsideRoot { file: PathBuf },

    /// 디렉터리 순회 중단
    #[error("디렉터리 순회가 중단되었습니다: {reason}")]
    Traversal { reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 사용할 수 없는 마커 이름
    #[error("사용할 수 없는 마커 이름입니다: {marker:?}")]
    InvalidMarker { marker: String },

    /// 입력이 더 이상 없음
    #[error("입력이 종료되었습니다")]
    InputClosed,

    /// 프롬프트 입출력 실패
    #[error("입력을 읽을 수 없습니다: {0}")]
    Prompt(#[from] std::io::Error),

    /// 작업 스레드 패닉
    #[error("{name} 스레드가 비정상 종료되었습니다")]
    ThreadPanicked { name: &'static str },

    /// 스레드 생성 실패
    #[error("{name} 스레드를 시작할 수 없습니다: {reason}")]
    ThreadSpawn { name: &'static str, reason: String },
}

/// hanwrap 결과 타입 별칭
pub type Result<T> = std::result::Result<T, HanwrapError>;
