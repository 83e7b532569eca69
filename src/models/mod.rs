//! # 数据模型模块
//!
//! 定义批量 OCR 的核心数据结构。
//!
//! ## 依赖关系
//! - 被 `batch/`, `report/`, `commands/` 使用
//! - 子模块: unit, outcome, record

pub mod outcome;
pub mod record;
pub mod unit;

pub use outcome::ConversionOutcome;
pub use record::{BatchSummary, InvocationReport, ResultRecord};
pub use unit::WorkUnit;
