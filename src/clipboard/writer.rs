//! # 剪贴板回写模块
//!
//! 其他应用也在监听剪贴板时，写入偶尔会因为剪贴板被占用而失败。
//! 这里做有限次数的重试，退避时长指数增长并有上限。

use std::thread;
use std::time::Duration;

use super::ClipboardBackend;
use crate::error::AppError;

/// 回写重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（至少 1 次）。
    pub attempts: u32,
    /// 第一次重试前的等待（毫秒）。
    pub base_delay_ms: u64,
    /// 单次退避上限（毫秒）。
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 900,
        }
    }
}

fn compute_backoff_delay(base_delay_ms: u64, attempt: u32, max_delay_ms: u64) -> u64 {
    let exp = 1_u64 << attempt.saturating_sub(1).min(16);
    base_delay_ms.saturating_mul(exp).min(max_delay_ms)
}

pub(crate) fn write_text_with_retry<C: ClipboardBackend + ?Sized>(
    clipboard: &mut C,
    text: &str,
    policy: &RetryPolicy,
) -> Result<(), AppError> {
    let attempts = policy.attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        if attempt > 1 {
            let wait_ms = compute_backoff_delay(policy.base_delay_ms.max(1), attempt - 1, policy.max_delay_ms);
            log::debug!("🔄 第 {}/{} 次写入剪贴板，等待 {}ms", attempt, attempts, wait_ms);
            thread::sleep(Duration::from_millis(wait_ms));
        }

        match clipboard.set_text(text) {
            Ok(()) => {
                if attempt > 1 {
                    log::info!("✅ 第 {} 次尝试写入剪贴板成功", attempt);
                }
                return Ok(());
            }
            Err(err) => {
                log::warn!("❌ 尝试 {} 写入剪贴板失败: {}", attempt, err);
                last_error = Some(err);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AppError::Clipboard("写入剪贴板失败".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky {
        failures_left: u32,
        written: Option<String>,
    }

    impl ClipboardBackend for Flaky {
        fn get_text(&mut self) -> Result<String, AppError> {
            Ok(self.written.clone().unwrap_or_default())
        }

        fn set_text(&mut self, text: &str) -> Result<(), AppError> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(AppError::Clipboard("busy".into()));
            }
            self.written = Some(text.to_string());
            Ok(())
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 2,
        }
    }

    #[test]
    fn backoff_delay_grows_and_caps() {
        assert_eq!(compute_backoff_delay(100, 1, 900), 100);
        assert_eq!(compute_backoff_delay(100, 2, 900), 200);
        assert_eq!(compute_backoff_delay(100, 3, 900), 400);
        assert_eq!(compute_backoff_delay(100, 5, 900), 900);
    }

    #[test]
    fn write_succeeds_after_transient_failures() {
        let mut clipboard = Flaky { failures_left: 2, written: None };
        write_text_with_retry(&mut clipboard, "svg", &fast_policy()).expect("third attempt succeeds");
        assert_eq!(clipboard.written.as_deref(), Some("svg"));
    }

    #[test]
    fn write_gives_up_after_all_attempts() {
        let mut clipboard = Flaky { failures_left: 5, written: None };
        let err = write_text_with_retry(&mut clipboard, "svg", &fast_policy()).unwrap_err();
        assert!(matches!(err, AppError::Clipboard(_)));
        assert_eq!(clipboard.failures_left, 2);
    }
}
