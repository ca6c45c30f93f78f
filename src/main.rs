//! hanwrap - 한글 추출 및 변환기
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use hanwrap::{
    cli::Args,
    filter::{ExclusionSet, FileFilter},
    pipeline::Pipeline,
    progress::ProgressReporter,
    prompt::{self, LineSource, Prompter},
    stats::{FileFailure, RunReport, Statistics},
    transform::Transformer,
    walker::{FileTask, TreeWalker},
};

/// 실행에 필요한 사용자 입력
#[derive(Debug)]
struct RunInputs {
    source_root: PathBuf,
    output_root: PathBuf,
    exclusions: ExclusionSet,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n{} {:#}", "❌".bright_red(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("hanwrap=debug,warn")
        } else {
            EnvFilter::new("hanwrap=info,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<ExitCode> {
    // 출력 폴더를 만들기 전에 옵션부터 확인
    Transformer::new(&args.marker)?;
    FileFilter::new(ExclusionSet::default(), args.pattern.as_deref())?;

    print_header(args);

    let cwd = std::env::current_dir().context("현재 경로를 확인할 수 없습니다")?;
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let inputs = gather_inputs(args, &mut prompter, &cwd)?;

    let walker = TreeWalker::new(
        &inputs.source_root,
        &inputs.output_root,
        inputs.exclusions.clone(),
        &args.walk_options(),
    )?;

    if args.dry_run {
        let tasks = walker.plan()?;
        print_dry_run(&tasks, &inputs.source_root);
        return Ok(ExitCode::SUCCESS);
    }

    println!("\n{}", "⚡ 작업을 시작합니다.".bright_cyan());

    let stats = Arc::new(Statistics::new());
    let summary = Pipeline::new(walker, ProgressReporter::new()).run(Arc::clone(&stats))?;

    print_failures(&summary.walk.failures, args.verbose);

    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &summary.walk.failures)?;
    }

    if let Some(ref report_path) = args.report {
        let report = RunReport {
            source_root: inputs.source_root.clone(),
            output_root: inputs.output_root.clone(),
            marker: args.marker.clone(),
            excluded_extensions: inputs
                .exclusions
                .sorted()
                .into_iter()
                .map(str::to_string)
                .collect(),
            reported: summary.reported,
            completed: summary.walk.completed(),
            aborted: summary.walk.aborted.clone(),
            stats: stats.snapshot(),
            failures: summary.walk.failures.clone(),
        };
        write_report(report_path, &report)?;
    }

    stats.print_summary();

    if let Some(ref reason) = summary.walk.aborted {
        println!(
            "\n{} 순회가 중단되었습니다: {}\n   이미 기록된 파일은 {:?} 에 남아 있습니다.\n",
            "⚠️".bright_yellow(),
            reason.red(),
            inputs.output_root
        );
        return Ok(ExitCode::FAILURE);
    }

    println!(
        "\n{} 저장 완료: {:?}\n",
        "✅".bright_green(),
        inputs.output_root
    );

    Ok(ExitCode::SUCCESS)
}

/// 명령줄 인자와 대화형 입력으로 실행 입력 수집
///
/// 인자로 받은 값이 잘못되면 바로 에러이고, 대화형으로 받은 값은 올바를 때까지 다시 묻습니다.
fn gather_inputs(args: &Args, source: &mut impl LineSource, cwd: &Path) -> Result<RunInputs> {
    let create_output = !args.dry_run;

    let source_root = match &args.input {
        Some(path) => {
            let path = prompt::resolve_path(path, cwd)?;
            prompt::check_source_root(&path)?;
            path
        }
        None => prompt::ask_source_root(source, cwd)?,
    };

    let output_root = match &args.output {
        Some(path) => {
            let path = prompt::resolve_path(path, cwd)?;
            if create_output {
                prompt::prepare_output_root(&path)?;
            } else {
                prompt::check_output_root(&path)?;
            }
            path
        }
        None => prompt::ask_output_root(source, cwd, create_output)?,
    };

    let exclusions = match args.exclusions() {
        Some(set) => set,
        None if args.is_interactive() => prompt::ask_exclusions(source)?,
        None => ExclusionSet::default(),
    };

    Ok(RunInputs {
        source_root,
        output_root,
        exclusions,
    })
}

/// 헤더 출력
fn print_header(args: &Args) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🔤 한글 추출 및 변환기".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());

    match (&args.input, &args.output) {
        (Some(input), Some(output)) => {
            println!("  {} 입력 폴더: {}", "📂".bright_cyan(), input.display());
            println!("  {} 출력 폴더: {}", "📄".bright_green(), output.display());
        }
        _ => {
            println!("  1. 루트 디렉터리를 선택한다.");
            println!("  2. 출력 디렉터리를 선택한다.");
            println!("  3. 번역하지 않을 파일 확장자를 적는다.");
        }
    }

    println!("  {} 마커: {}('...')", "🔖".bright_yellow(), args.marker);

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if let Some(depth) = args.max_depth {
        println!("  {} 최대 깊이: {}", "📏".bright_white(), depth);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
}

/// 드라이런 출력
fn print_dry_run(tasks: &[FileTask], source_root: &Path) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, task) in tasks.iter().enumerate() {
        let relative = task.input.strip_prefix(source_root).unwrap_or(&task.input);
        println!("  {}. {}", i + 1, relative.display());
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        tasks.len().to_string().bright_green()
    );
}

/// 실패 목록 출력
fn print_failures(failures: &[FileFailure], verbose: bool) {
    if failures.is_empty() {
        return;
    }

    println!("\n{}", "❌ 오류 발생 파일:".bright_red());
    for failure in failures {
        println!("  {} {}", "•".red(), failure.path.display());
        if verbose {
            println!("    {}", failure.reason.dimmed());
        }
    }
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &Path, failures: &[FileFailure]) -> Result<()> {
    let mut log_file = File::create(log_path)
        .with_context(|| format!("에러 로그 파일을 만들 수 없습니다: {:?}", log_path))?;

    writeln!(log_file, "hanwrap 에러 로그")?;
    writeln!(log_file, "총 에러 수: {}", failures.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for failure in failures {
        writeln!(log_file, "\n파일: {:?}", failure.path)?;
        writeln!(log_file, "에러: {}", failure.reason)?;
    }

    println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// JSON 실행 리포트 작성
fn write_report(report_path: &Path, report: &RunReport) -> Result<()> {
    let json = report.to_json().context("리포트 직렬화 실패")?;
    std::fs::write(report_path, json)
        .with_context(|| format!("리포트 파일을 쓸 수 없습니다: {:?}", report_path))?;

    println!("{} 리포트 저장: {:?}", "📝".bright_cyan(), report_path);

    Ok(())
}
