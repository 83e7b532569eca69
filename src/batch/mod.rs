//! # 批量处理模块
//!
//! 批量 OCR 的完整流水线。
//!
//! ## 数据流
//! ```text
//! collector (输入路径 -> DiscoveredInput)
//!   -> planner (DiscoveredInput -> WorkUnit)
//!   -> runner  (WorkUnit 派发到线程池)
//!        -> invoker (单次 ocrmypdf 调用，进程组登记在 process)
//!   -> BatchReport (记录 + 汇总)
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod invoker;
pub mod planner;
pub mod process;
pub mod runner;

pub use collector::InputCollector;
pub use invoker::OcrInvoker;
pub use planner::{OutputPlanner, OutputTarget};
pub use process::ProcessGroups;
pub use runner::{BatchReport, BatchRunner};
