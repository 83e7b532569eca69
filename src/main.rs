//! # ocrc - 批量 OCR 工具
//!
//! 调用外部 `ocrmypdf` 对 PDF 和常见图片格式进行批量 OCR。
//!
//! ## 流程
//! 收集输入 -> 规划输出路径 -> 线程池并行调用 -> 汇总 -> 可选 CSV 审计日志
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── config.rs   (参数校验与运行配置)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/   (输入收集、输出规划、调用器、批量执行器)
//!   │     ├── models/  (数据模型)
//!   │     └── report/  (审计日志、控制台汇总)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod error;
mod models;
mod report;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    match commands::run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            utils::output::print_error(&format!("{}", e));
            std::process::exit(commands::EXIT_FAILURE);
        }
    }
}
