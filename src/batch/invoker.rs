//! # 外部 OCR 调用器
//!
//! 对单个工作单元调用一次 ocrmypdf，捕获输出与退出码并分类。
//!
//! ## 功能
//! - 根据配置构建参数（语言、`--skip-text` / `--force-ocr`、优化级别、PDF/A、透传参数）
//! - 同步执行外部进程，同时读取 stdout/stderr 防止管道写满阻塞
//! - 可选超时：超时后终止整个进程组，结果为 `Failed`，原因 "timeout"
//! - 运行期间在 `ProcessGroups` 中登记进程组，供强制退出时统一终止
//! - 退出码分类见 `models/outcome.rs`
//!
//! 本模块从不直接读写文档内容，输出文件由外部进程写入。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 构造，在 `batch/runner.rs` 的工作线程中调用
//! - 使用 `models/` 的 `WorkUnit`, `ConversionOutcome`, `InvocationReport`
//! - 使用 `batch/process.rs` 登记和终止进程组

use crate::batch::process::{self, ProcessGroups};
use crate::config::OcrConfig;
use crate::models::outcome::{SPAWN_FAILURE, TIMEOUT_EXIT};
use crate::models::{ConversionOutcome, InvocationReport, WorkUnit};

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// 截断后保留的输出开头字符数
const SNIPPET_HEAD_CHARS: usize = 300;
/// 截断后保留的输出结尾字符数
const SNIPPET_TAIL_CHARS: usize = 900;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 外部 OCR 调用器
#[derive(Debug, Clone)]
pub struct OcrInvoker {
    /// 启动时解析好的可执行文件路径
    executable: PathBuf,
    lang: String,
    force: bool,
    optimize: u8,
    pdfa: bool,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
    /// 在途子进程组
    groups: ProcessGroups,
}

impl OcrInvoker {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            lang: "eng".to_string(),
            force: false,
            optimize: 3,
            pdfa: false,
            extra_args: Vec::new(),
            timeout: None,
            groups: ProcessGroups::new(),
        }
    }

    /// 由运行配置构造
    pub fn from_config(executable: impl Into<PathBuf>, config: &OcrConfig) -> Self {
        Self::new(executable)
            .with_lang(&config.lang)
            .force(config.force)
            .with_optimize(config.optimize)
            .pdfa(config.pdfa)
            .with_extra_args(config.extra_args.clone())
            .with_timeout(config.timeout)
    }

    pub fn with_lang(mut self, lang: &str) -> Self {
        self.lang = lang.to_string();
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_optimize(mut self, level: u8) -> Self {
        self.optimize = level;
        self
    }

    pub fn pdfa(mut self, pdfa: bool) -> Self {
        self.pdfa = pdfa;
        self
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 共享的进程组登记表
    pub fn with_process_groups(mut self, groups: ProcessGroups) -> Self {
        self.groups = groups;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// 构建参数列表（不含可执行文件本身）
    pub fn build_args(&self, unit: &WorkUnit) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();

        args.push("--language".into());
        args.push(self.lang.clone().into());
        let text_mode = if self.force { "--force-ocr" } else { "--skip-text" };
        args.push(text_mode.into());
        args.push("--optimize".into());
        args.push(self.optimize.to_string().into());
        if self.pdfa {
            args.push("--output-type".into());
            args.push("pdfa-2".into());
        }

        args.push(unit.input_path().as_os_str().to_owned());
        args.push(unit.output_path().as_os_str().to_owned());
        args
    }

    /// 用于显示的命令行
    pub fn command_line(&self, unit: &WorkUnit) -> String {
        std::iter::once(self.executable.as_os_str().to_owned())
            .chain(self.build_args(unit))
            .map(|a| a.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 执行一次转换（阻塞，直到进程退出或超时）
    pub fn invoke(&self, unit: &WorkUnit) -> InvocationReport {
        let start = Instant::now();

        if !unit.input_path().is_file() {
            return InvocationReport::new(ConversionOutcome::failed(
                SPAWN_FAILURE,
                "input not found or unreadable",
            ));
        }

        let mut cmd = Command::new(&self.executable);
        cmd.args(self.build_args(unit))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // 独立进程组：终端的 Ctrl-C 不会直接杀掉正在运行的转换
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return InvocationReport::new(ConversionOutcome::failed(
                    SPAWN_FAILURE,
                    "executable not found",
                ))
                .with_duration(start.elapsed());
            }
            Err(e) => {
                return InvocationReport::new(ConversionOutcome::failed(
                    SPAWN_FAILURE,
                    format!("failed to launch {}: {}", self.executable.display(), e),
                ))
                .with_duration(start.elapsed());
            }
        };

        // process_group(0) 下进程组 ID 即子进程 PID
        let pgid = child.id();
        self.groups.register(pgid);
        let waited = wait_with_timeout(child, self.timeout);
        self.groups.unregister(pgid);

        let report = match waited {
            Ok(Waited::Exited(status, log)) => {
                let outcome = match status.code() {
                    Some(code) => ConversionOutcome::from_exit_code(code, self.force),
                    None => ConversionOutcome::failed(SPAWN_FAILURE, "terminated by signal"),
                };
                InvocationReport::new(outcome).with_log(snippet(&log))
            }
            Ok(Waited::TimedOut(log)) => {
                InvocationReport::new(ConversionOutcome::failed(TIMEOUT_EXIT, "timeout"))
                    .with_log(snippet(&log))
            }
            Err(e) => InvocationReport::new(ConversionOutcome::failed(
                SPAWN_FAILURE,
                format!("failed waiting for process: {}", e),
            )),
        };

        report.with_duration(start.elapsed())
    }
}

/// 进程等待结果
enum Waited {
    Exited(ExitStatus, Vec<u8>),
    TimedOut(Vec<u8>),
}

/// 等待进程退出，期间持续读取 stdout/stderr
fn wait_with_timeout(mut child: Child, timeout: Option<Duration>) -> io::Result<Waited> {
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let status = match timeout {
        None => Some(child.wait()?),
        Some(limit) => poll_until(&mut child, limit)?,
    };

    match status {
        Some(status) => {
            let mut log = stdout.finish();
            log.extend(stderr.finish());
            Ok(Waited::Exited(status, log))
        }
        None => {
            // 孙进程可能仍持有管道，不等待读取线程
            let mut log = stdout.snapshot();
            log.extend(stderr.snapshot());
            Ok(Waited::TimedOut(log))
        }
    }
}

/// 轮询直到退出；超时则终止并返回 `None`
fn poll_until(child: &mut Child, limit: Duration) -> io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= limit {
            // 同时终止 ocrmypdf 派生的 tesseract / ghostscript
            process::kill_group(child.id());
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// 后台管道读取器
struct PipeReader {
    buffer: Arc<Mutex<Vec<u8>>>,
    handle: thread::JoinHandle<()>,
}

impl PipeReader {
    /// 等待读取结束并取回全部内容
    fn finish(self) -> Vec<u8> {
        let PipeReader { buffer, handle } = self;
        let _ = handle.join();
        let contents = buffer.lock().map(|b| b.clone()).unwrap_or_default();
        contents
    }

    /// 当前已读取的内容
    fn snapshot(&self) -> Vec<u8> {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> PipeReader {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buffer);

    let handle = thread::spawn(move || {
        let Some(mut pipe) = pipe else { return };
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend_from_slice(&chunk[..n]);
                    }
                }
            }
        }
    });

    PipeReader { buffer, handle }
}

/// 截取输出：过长时保留开头和结尾
pub fn snippet(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    let total = text.chars().count();

    if total <= SNIPPET_HEAD_CHARS + SNIPPET_TAIL_CHARS {
        return text.to_string();
    }

    let head: String = text.chars().take(SNIPPET_HEAD_CHARS).collect();
    let tail: String = text.chars().skip(total - SNIPPET_TAIL_CHARS).collect();
    format!("{} ... {}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn unit_in(dir: &Path) -> WorkUnit {
        let input = dir.join("a.pdf");
        fs::write(&input, b"%PDF-1.4").unwrap();
        WorkUnit::new(input, dir.join("a_ocr.pdf"))
    }

    /// 以 `sh <script>` 运行桩脚本
    fn stub(dir: &Path, body: &str) -> OcrInvoker {
        let script = dir.join("stub.sh");
        fs::write(&script, body).unwrap();
        OcrInvoker::new("/bin/sh").with_extra_args(vec![script.display().to_string()])
    }

    #[test]
    fn test_build_args_skip_text() {
        let unit = WorkUnit::new("in.pdf", "out.pdf");
        let args = OcrInvoker::new("ocrmypdf")
            .with_lang("deu+eng")
            .build_args(&unit);
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert_eq!(
            args,
            vec![
                "--language",
                "deu+eng",
                "--skip-text",
                "--optimize",
                "3",
                "in.pdf",
                "out.pdf"
            ]
        );
    }

    #[test]
    fn test_build_args_force_pdfa_and_extra() {
        let unit = WorkUnit::new("in.pdf", "out.pdf");
        let invoker = OcrInvoker::new("ocrmypdf")
            .force(true)
            .pdfa(true)
            .with_optimize(1)
            .with_extra_args(vec!["--rotate-pages".to_string()]);
        let line = invoker.command_line(&unit);

        assert!(line.starts_with("ocrmypdf --rotate-pages --language eng --force-ocr"));
        assert!(!line.contains("--skip-text"));
        assert!(line.contains("--optimize 1"));
        assert!(line.contains("--output-type pdfa-2"));
        assert!(line.ends_with("in.pdf out.pdf"));
    }

    #[test]
    fn test_snippet_keeps_short_output() {
        assert_eq!(snippet(b"  hello\n"), "hello");
    }

    #[test]
    fn test_snippet_truncates_long_output() {
        let raw = format!("{}{}", "a".repeat(2000), "z".repeat(2000));
        let s = snippet(raw.as_bytes());
        assert!(s.starts_with(&"a".repeat(SNIPPET_HEAD_CHARS)));
        assert!(s.ends_with(&"z".repeat(SNIPPET_TAIL_CHARS)));
        assert!(s.contains(" ... "));
        assert!(s.chars().count() < 1300);
    }

    #[test]
    fn test_missing_input_fails_without_spawn() {
        let unit = WorkUnit::new("/nonexistent/in.pdf", "/nonexistent/out.pdf");
        let report = OcrInvoker::new("/nonexistent/ocrmypdf").invoke(&unit);
        assert_eq!(
            report.outcome,
            ConversionOutcome::failed(SPAWN_FAILURE, "input not found or unreadable")
        );
    }

    #[test]
    fn test_missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        let report = OcrInvoker::new(dir.path().join("no-such-ocrmypdf")).invoke(&unit);
        assert_eq!(
            report.outcome,
            ConversionOutcome::failed(SPAWN_FAILURE, "executable not found")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_tool_fails_to_launch() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        let tool = dir.path().join("ocrmypdf");
        fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();

        let report = OcrInvoker::new(&tool).invoke(&unit);

        assert_eq!(report.outcome.return_code(), Some(SPAWN_FAILURE));
        match &report.outcome {
            ConversionOutcome::Failed { error_summary, .. } => {
                assert!(error_summary.starts_with("failed to launch"), "{}", error_summary);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_stub_success() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        let report = stub(dir.path(), "echo \"ocr $@\"\nexit 0\n").invoke(&unit);

        assert_eq!(report.outcome, ConversionOutcome::Success);
        assert!(report.log_snippet.contains("--skip-text"));
        assert!(report.log_snippet.contains("a_ocr.pdf"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stub_sentinel_without_force_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        let report = stub(dir.path(), "echo 'page already has text' >&2\nexit 6\n").invoke(&unit);

        assert!(matches!(
            report.outcome,
            ConversionOutcome::SkippedAlreadySearchable { .. }
        ));
        assert!(report.log_snippet.contains("already has text"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stub_sentinel_with_force_is_not_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        let report = stub(dir.path(), "exit 6\n").force(true).invoke(&unit);

        assert!(!report.outcome.is_skipped());
        assert_eq!(report.outcome.return_code(), Some(6));
    }

    #[cfg(unix)]
    #[test]
    fn test_stub_generic_failure_captures_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        let report = stub(dir.path(), "echo 'broken input' >&2\nexit 2\n").invoke(&unit);

        assert!(report.outcome.is_failed());
        assert_eq!(report.outcome.return_code(), Some(2));
        assert!(report.log_snippet.contains("broken input"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stub_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        let report = stub(dir.path(), "exec sleep 5\n")
            .with_timeout(Some(Duration::from_millis(200)))
            .invoke(&unit);

        assert_eq!(
            report.outcome,
            ConversionOutcome::failed(TIMEOUT_EXIT, "timeout")
        );
        assert!(report.duration < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_forked_workers() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        let marker = dir.path().join("worker-finished");
        let body = format!("(sleep 1; touch '{}') &\nwait\n", marker.display());

        let groups = ProcessGroups::new();
        let report = stub(dir.path(), &body)
            .with_process_groups(groups.clone())
            .with_timeout(Some(Duration::from_millis(200)))
            .invoke(&unit);

        assert_eq!(
            report.outcome,
            ConversionOutcome::failed(TIMEOUT_EXIT, "timeout")
        );
        assert_eq!(groups.len(), 0);

        thread::sleep(Duration::from_millis(1500));
        assert!(!marker.exists(), "forked worker survived the timeout");
    }

    #[cfg(unix)]
    #[test]
    fn test_live_group_can_be_killed_from_outside() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        let groups = ProcessGroups::new();
        let invoker = stub(dir.path(), "sleep 30 &\nwait\n").with_process_groups(groups.clone());

        let handle = thread::spawn(move || invoker.invoke(&unit));

        let deadline = Instant::now() + Duration::from_secs(5);
        while groups.len() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(groups.kill_all(), 1);

        let report = handle.join().unwrap();
        assert_eq!(
            report.outcome,
            ConversionOutcome::failed(SPAWN_FAILURE, "terminated by signal")
        );
        assert!(report.duration < Duration::from_secs(30));
    }
}
