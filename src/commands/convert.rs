//! # 批量 OCR 命令实现
//!
//! ## 功能
//! - 收集输入文档（文件 / 目录 / glob）
//! - 规划输出路径并决定跳过
//! - 在线程池中调用 ocrmypdf
//! - 打印汇总，可选追加 CSV 审计日志
//! - Ctrl-C：停止派发新文件，等待在途转换结束；再次 Ctrl-C 终止在途进程组后退出
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数，经 `config.rs` 校验
//! - 使用 `batch/`, `report/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`, `utils/tool.rs`

use super::{EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_OK};
use crate::batch::planner::find_output_collisions;
use crate::batch::{
    BatchReport, BatchRunner, InputCollector, OcrInvoker, OutputPlanner, ProcessGroups,
};
use crate::cli::convert::ConvertArgs;
use crate::config::OcrConfig;
use crate::error::Result;
use crate::models::WorkUnit;
use crate::report::{append_records, print_summary};
use crate::utils::{output, progress, tool};

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 执行批量 OCR，返回进程退出码
pub fn execute(args: ConvertArgs) -> Result<i32> {
    let config = OcrConfig::from_args(args)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let groups = ProcessGroups::new();
    install_interrupt_handler(Arc::clone(&cancel), groups.clone());

    let report = match run(&config, cancel, groups)? {
        Some(report) => report,
        None => return Ok(EXIT_OK),
    };

    Ok(exit_code(&report))
}

/// 运行完整流水线；无输入或 dry-run 时返回 `None`
pub fn run(
    config: &OcrConfig,
    cancel: Arc<AtomicBool>,
    groups: ProcessGroups,
) -> Result<Option<BatchReport>> {
    let quiet = config.verbosity.is_quiet();
    if !quiet {
        output::print_header("Batch OCR");
    }

    let executable = resolve_tool(&config.ocr_tool);

    // 收集输入
    let inputs = InputCollector::new(config.inputs.iter().cloned())
        .recursive(config.recursive)
        .collect();

    // 规划输出
    let planner = OutputPlanner::new(config.target.clone(), &config.suffix, config.overwrite);
    let inputs = planner.exclude_own_outputs(inputs);

    if inputs.is_empty() {
        if !quiet {
            output::print_info("No matching files.");
        }
        return Ok(None);
    }

    let units = planner.plan_all(&inputs);

    if !quiet {
        for (path, count) in find_output_collisions(&units) {
            output::print_warning(&format!(
                "{} inputs map to the same output '{}'; they will overwrite each other",
                count,
                path.display()
            ));
        }
    }

    let invoker = OcrInvoker::from_config(executable, config).with_process_groups(groups);
    if config.verbosity.is_verbose() {
        output::print_info(&format!("Using OCR tool: {}", invoker.executable().display()));
    }

    if config.dry_run {
        print_plan(&units, &invoker, config);
        return Ok(None);
    }

    prepare_output_dirs(&units, quiet);

    let pending = units.iter().filter(|u| !u.should_skip()).count();
    if !quiet {
        output::print_info(&format!(
            "Found {} file(s): {} to process, {} already done, {} worker(s)",
            units.len(),
            pending,
            units.len() - pending,
            config.jobs
        ));
    }

    let runner = BatchRunner::new(config.jobs)?
        .with_cancel_flag(cancel)
        .show_progress(config.show_progress && progress::is_interactive());

    let report = runner.run(units, |unit| invoker.invoke(unit))?;

    print_summary(&report, config.verbosity);

    if let Some(log_path) = &config.log_path {
        append_records(log_path, &report.records)?;
        if !quiet {
            output::print_info(&format!("Audit log written to '{}'", log_path.display()));
        }
    }

    Ok(Some(report))
}

/// 进程退出码：有失败为 1，被中断为 130，否则为 0
pub fn exit_code(report: &BatchReport) -> i32 {
    if report.summary.has_failures() {
        EXIT_FAILURE
    } else if report.cancelled {
        EXIT_INTERRUPTED
    } else {
        EXIT_OK
    }
}

/// 启动时解析一次外部工具；找不到时保留原名，每个文件将各自报告失败
fn resolve_tool(name: &str) -> PathBuf {
    match tool::resolve_executable(name) {
        Ok(path) => path,
        Err(e) => {
            output::print_error(&format!(
                "{}. Install ocrmypdf or pass --ocrmypdf <path>; every file will fail.",
                e
            ));
            PathBuf::from(name)
        }
    }
}

/// 第一次 Ctrl-C 停止派发，第二次终止在途转换并立即退出
fn install_interrupt_handler(cancel: Arc<AtomicBool>, groups: ProcessGroups) {
    let result = ctrlc::set_handler(move || {
        if cancel.swap(true, Ordering::SeqCst) {
            // 子进程不在终端的进程组中，收不到这次 SIGINT
            groups.kill_all();
            std::process::exit(EXIT_INTERRUPTED);
        }
        output::print_warning(
            "Interrupted: waiting for running conversions to finish (Ctrl-C again to abort)",
        );
    });

    if let Err(e) = result {
        output::print_warning(&format!("Could not install Ctrl-C handler: {}", e));
    }
}

/// 为待处理单元创建输出目录
fn prepare_output_dirs(units: &[WorkUnit], quiet: bool) {
    for unit in units.iter().filter(|u| !u.should_skip()) {
        let Some(parent) = unit.output_path().parent() else {
            continue;
        };
        if parent.as_os_str().is_empty() || parent.is_dir() {
            continue;
        }
        if let Err(e) = fs::create_dir_all(parent) {
            if !quiet {
                output::print_warning(&format!(
                    "Cannot create output directory '{}': {}",
                    parent.display(),
                    e
                ));
            }
        }
    }
}

/// dry-run：打印计划
fn print_plan(units: &[WorkUnit], invoker: &OcrInvoker, config: &OcrConfig) {
    if config.verbosity.is_quiet() {
        return;
    }

    output::print_info("Planned jobs:");
    for unit in units {
        if unit.should_skip() {
            output::print_skip(&format!(
                "{} ({})",
                unit.input_path().display(),
                unit.skip_reason().unwrap_or("skipped")
            ));
        } else if config.verbosity.is_verbose() {
            println!("    {}", invoker.command_line(unit));
        } else {
            output::print_conversion(
                &unit.input_path().display().to_string(),
                &unit.output_path().display().to_string(),
            );
        }
    }

    let skipped = units.iter().filter(|u| u.should_skip()).count();
    output::print_done(&format!(
        "{} planned, {} would be skipped (dry run, nothing was executed)",
        units.len() - skipped,
        skipped
    ));
}
