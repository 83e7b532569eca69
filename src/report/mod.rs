//! # 报告模块
//!
//! 消费批量运行的结果记录。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 子模块: audit (CSV 审计日志), summary (控制台汇总)

pub mod audit;
pub mod summary;

pub use audit::append_records;
pub use summary::print_summary;
