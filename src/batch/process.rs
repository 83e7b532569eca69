//! # 子进程组登记
//!
//! 每次转换都在独立进程组中运行（终端的 Ctrl-C 到不了它们），
//! 因此需要自己记住哪些进程组还活着，以便超时或强制退出时整组终止。
//!
//! ## 依赖关系
//! - 被 `batch/invoker.rs` 登记 / 注销
//! - 被 `commands/convert.rs` 的中断处理在强制退出前调用
//! - Unix 上使用 `libc::kill` 发送信号

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// 存活的子进程组（进程组 ID 等于组长进程的 PID）
#[derive(Debug, Clone, Default)]
pub struct ProcessGroups {
    live: Arc<Mutex<HashSet<u32>>>,
}

impl ProcessGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, pgid: u32) {
        if let Ok(mut live) = self.live.lock() {
            live.insert(pgid);
        }
    }

    pub fn unregister(&self, pgid: u32) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(&pgid);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    /// 终止所有登记的进程组并清空登记，返回发送信号的组数
    pub fn kill_all(&self) -> usize {
        let groups: Vec<u32> = match self.live.lock() {
            Ok(mut live) => live.drain().collect(),
            Err(_) => return 0,
        };
        for &pgid in &groups {
            kill_group(pgid);
        }
        groups.len()
    }
}

/// 向整个进程组发送 SIGKILL
#[cfg(unix)]
pub fn kill_group(pgid: u32) {
    // 0 会指向自己的进程组
    if pgid == 0 {
        return;
    }
    // 负 pid 表示进程组
    unsafe {
        libc::kill(-(pgid as libc::pid_t), libc::SIGKILL);
    }
}

#[cfg(not(unix))]
pub fn kill_group(_pgid: u32) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::CommandExt;
    use std::process::Command;

    #[test]
    fn test_register_and_unregister() {
        let groups = ProcessGroups::new();
        let shared = groups.clone();
        groups.register(4242);
        assert_eq!(shared.len(), 1);
        shared.unregister(4242);
        assert_eq!(groups.len(), 0);
    }

    #[test]
    fn test_kill_all_terminates_whole_group() {
        let mut child = Command::new("/bin/sh")
            .args(["-c", "sleep 30 & wait"])
            .process_group(0)
            .spawn()
            .unwrap();

        let groups = ProcessGroups::new();
        groups.register(child.id());
        assert_eq!(groups.kill_all(), 1);
        assert_eq!(groups.len(), 0);

        let status = child.wait().unwrap();
        assert_eq!(status.code(), None);
    }

    #[test]
    fn test_kill_group_ignores_zero() {
        // 不能误杀测试进程自身所在的组
        kill_group(0);
    }
}
