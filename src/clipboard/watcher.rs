//! 剪贴板变化监听器
//!
//! # 设计思路
//!
//! "上一次看到的剪贴板内容" 是监听器自己的字段，而不是进程级全局变量。
//! `wait_for_change` 阻塞到剪贴板内容与该字段不同为止，然后更新字段并返回新值。
//!
//! 应用自己把 SVG 写回剪贴板后，下一次等待会把它当作"新内容"再高亮一遍。
//! 监听器提供 `acknowledge`：回写后把写入的值记为已观察，这次变化就不会被返回。
//!
//! # 实现思路
//!
//! 先读取比较，没有变化才等待。等待器（事件模式下的后台通知线程）在读取初始值之前创建，
//! 因此流水线处理期间发生的复制在下一次 `wait_for_change` 时立刻可见。

use std::thread;
use std::time::Duration;

use super::listener::{self, WatchMode, Waiter};
use super::writer::{self, RetryPolicy};
use super::ClipboardBackend;
use crate::error::AppError;

pub struct ClipboardWatcher<C: ClipboardBackend> {
    clipboard: C,
    last_seen: String,
    waiter: Waiter,
    read_failures: u32,
}

impl<C: ClipboardBackend> ClipboardWatcher<C> {
    /// 创建监听器，并把当前剪贴板内容记为已观察
    pub fn new(mut clipboard: C, mode: WatchMode, poll_interval_ms: u64) -> Self {
        let poll_interval = Duration::from_millis(listener::normalize_poll_interval_ms(poll_interval_ms));
        let waiter = Waiter::new(mode, poll_interval);
        let last_seen = match clipboard.get_text() {
            Ok(text) => text,
            Err(err) => {
                log::warn!("📋 读取初始剪贴板内容失败，按空内容处理: {}", err);
                String::new()
            }
        };

        Self {
            clipboard,
            last_seen,
            waiter,
            read_failures: 0,
        }
    }

    pub fn last_seen(&self) -> &str {
        &self.last_seen
    }

    /// 阻塞直到剪贴板内容与上一次观察到的值不同
    ///
    /// 调用时内容已经变化则立即返回。没有超时；读取失败会记录日志并退避重试，不会返回错误。
    pub fn wait_for_change(&mut self) -> String {
        loop {
            match self.clipboard.get_text() {
                Ok(current) => {
                    self.read_failures = 0;
                    if current != self.last_seen {
                        self.last_seen.clone_from(&current);
                        return current;
                    }
                    log::trace!("📋 剪贴板内容未变化");
                    self.waiter.wait();
                }
                Err(err) => {
                    self.read_failures = self.read_failures.saturating_add(1);
                    let backoff_ms = listener::compute_read_backoff_ms(self.read_failures);
                    log::warn!(
                        "📋 读取剪贴板失败，{}ms 后重试（attempt={}）: {}",
                        backoff_ms,
                        self.read_failures,
                        err
                    );
                    thread::sleep(Duration::from_millis(backoff_ms));
                }
            }
        }
    }

    /// 把应用自己写入的内容记为已观察
    pub fn acknowledge(&mut self, text: &str) {
        log::debug!("⏭️  记录应用主动写入的剪贴板内容，下一次变化检测将忽略它");
        self.last_seen.clear();
        self.last_seen.push_str(text);
    }

    /// 写回剪贴板（带重试）；`remember` 为真时同时调用 `acknowledge`
    pub fn write_back(&mut self, text: &str, policy: &RetryPolicy, remember: bool) -> Result<(), AppError> {
        writer::write_text_with_retry(&mut self.clipboard, text, policy)?;
        if remember {
            self.acknowledge(text);
        }
        Ok(())
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }
}
