//! # 批量执行器
//!
//! 在有界线程池中为每个工作单元调用一次转换，并汇总结果。
//!
//! ## 功能
//! - 规划阶段已跳过的单元直接生成 `SkippedPreexisting` 记录，不调用转换
//! - 其余单元经 rayon 线程池并行处理，并发数不超过 `jobs`
//! - 工作线程通过 channel 把记录交给唯一的汇总者（调用线程），
//!   汇总者按完成顺序追加记录并推进进度条
//! - 单个单元失败不影响其他单元，运行总会完整排空
//! - 取消：只在派发点检查取消标志；已在运行的调用自然结束，未派发的单元不产生记录
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行处理

use crate::error::{OcrcError, Result};
use crate::models::{BatchSummary, InvocationReport, ResultRecord, WorkUnit};
use crate::utils::progress;

use indicatif::ProgressBar;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

/// 一次批量运行的结果
#[derive(Debug)]
pub struct BatchReport {
    /// 按完成顺序排列的记录
    pub records: Vec<ResultRecord>,
    pub summary: BatchSummary,
    /// 是否因取消而提前停止派发
    pub cancelled: bool,
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
    /// 全局取消标志
    cancel: Arc<AtomicBool>,
    /// 是否显示进度条
    show_progress: bool,
}

impl BatchRunner {
    /// 创建新的批量执行器，`jobs` 为 0 视为配置错误
    pub fn new(jobs: usize) -> Result<Self> {
        if jobs == 0 {
            return Err(OcrcError::InvalidArgument(
                "number of jobs must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            jobs,
            cancel: Arc::new(AtomicBool::new(false)),
            show_progress: true,
        })
    }

    /// 使用外部提供的取消标志
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 取消标志的句柄
    #[cfg(test)]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// 并行处理工作单元
    pub fn run<F>(&self, units: Vec<WorkUnit>, invoke: F) -> Result<BatchReport>
    where
        F: Fn(&WorkUnit) -> InvocationReport + Sync + Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .thread_name(|i| format!("ocrc-worker-{}", i))
            .build()?;

        let pb = if self.show_progress {
            progress::create_progress_bar(units.len() as u64, "OCR")
        } else {
            ProgressBar::hidden()
        };

        let (pre_skipped, to_process): (Vec<WorkUnit>, Vec<WorkUnit>) =
            units.into_iter().partition(|u| u.should_skip());

        let mut records = Vec::with_capacity(pre_skipped.len() + to_process.len());
        for unit in &pre_skipped {
            records.push(ResultRecord::preexisting(unit));
            pb.inc(1);
        }

        let (tx, rx) = mpsc::channel::<ResultRecord>();
        let cancel = &self.cancel;
        let invoke = &invoke;

        std::thread::scope(|scope| {
            scope.spawn(move || {
                pool.install(|| {
                    to_process.par_iter().for_each_with(tx, |tx, unit| {
                        // 派发点：取消后不再开始新的调用
                        if cancel.load(Ordering::SeqCst) {
                            return;
                        }
                        let record = ResultRecord::from_invocation(unit, invoke(unit));
                        // 接收端在所有发送端释放前不会关闭
                        let _ = tx.send(record);
                    });
                });
            });

            // 唯一的汇总者：所有发送端释放后迭代结束，即排空
            for record in rx {
                if record.outcome.is_failed() {
                    pb.set_message(format!("{} failed", record.input_path.display()));
                }
                records.push(record);
                pb.inc(1);
            }
        });

        pb.finish_and_clear();

        let summary = BatchSummary::from_records(&records);
        Ok(BatchReport {
            records,
            summary,
            cancelled: self.cancel.load(Ordering::SeqCst),
        })
    }
}
