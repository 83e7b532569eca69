//! # 命令执行模块
//!
//! 实现命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `report/`, `utils/`
//! - 子模块: convert

pub mod convert;

use crate::cli::Cli;
use crate::error::Result;

/// 全部成功或合法跳过
pub const EXIT_OK: i32 = 0;
/// 有文件失败，或运行级错误
pub const EXIT_FAILURE: i32 = 1;
/// 被用户中断
pub const EXIT_INTERRUPTED: i32 = 130;

/// 执行命令，返回进程退出码
pub fn run(cli: Cli) -> Result<i32> {
    convert::execute(cli.convert)
}
