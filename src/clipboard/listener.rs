use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use clipboard_master::{CallbackResult, ClipboardHandler, Master};
use serde::Deserialize;

pub const POLL_INTERVAL_DEFAULT_MS: u64 = 10;
const POLL_INTERVAL_MIN_MS: u64 = 1;
const POLL_INTERVAL_MAX_MS: u64 = 5_000;
const READ_RETRY_BASE_DELAY_MS: u64 = 100;
const READ_RETRY_MAX_DELAY_MS: u64 = 5_000;
/// 事件模式下即使没有通知也会重新读取的间隔
const EVENT_SAFETY_TIMEOUT: Duration = Duration::from_secs(1);

/// 等待剪贴板变化的策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WatchMode {
    /// 按固定间隔读取剪贴板并比较
    #[default]
    Poll,
    /// 后台常驻 `clipboard-master`，收到系统变化通知后再读取比较
    Event,
}

pub(crate) fn normalize_poll_interval_ms(value_ms: u64) -> u64 {
    value_ms.clamp(POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS)
}

/// 连续读取失败时的退避时长
pub(crate) fn compute_read_backoff_ms(failure_count: u32) -> u64 {
    let exp = 1_u64 << failure_count.saturating_sub(1).min(6);
    READ_RETRY_BASE_DELAY_MS
        .saturating_mul(exp)
        .min(READ_RETRY_MAX_DELAY_MS)
}

/// 把每一次系统变化通知转发到通道
struct ForwardChanges {
    tx: Sender<()>,
}

impl ClipboardHandler for ForwardChanges {
    fn on_clipboard_change(&mut self) -> CallbackResult {
        match self.tx.send(()) {
            Ok(()) => CallbackResult::Next,
            // 接收端（监听器）已释放
            Err(_) => CallbackResult::Stop,
        }
    }

    fn on_clipboard_error(&mut self, error: io::Error) -> CallbackResult {
        log::error!("剪贴板错误：{}", error);
        CallbackResult::Next
    }
}

/// 在后台线程常驻 `clipboard-master`，退出后按退避重启
///
/// 通知在通道里排队：处理上一条内容期间发生的变化不会丢失。
fn spawn_notifier() -> Receiver<()> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("clipboard-notifier".to_string())
        .spawn(move || {
            let mut restart_attempt: u32 = 0;
            loop {
                match Master::new(ForwardChanges { tx: tx.clone() }) {
                    Ok(mut master) => {
                        restart_attempt = 0;
                        log::info!("📋 剪贴板变化通知已启动");
                        let _ = master.run();
                    }
                    Err(err) => {
                        log::error!("📋 创建剪贴板变化通知失败: {}", err);
                    }
                }
                // 重启期间的变化收不到通知，先让监听器补读一次
                if tx.send(()).is_err() {
                    return;
                }

                restart_attempt = restart_attempt.saturating_add(1);
                let backoff_ms = compute_read_backoff_ms(restart_attempt);
                log::warn!("📋 剪贴板变化通知 {}ms 后重启（attempt={}）", backoff_ms, restart_attempt);
                thread::sleep(Duration::from_millis(backoff_ms));
            }
        });
    if let Err(err) = spawned {
        log::warn!("📋 无法启动剪贴板变化通知线程，退回轮询: {}", err);
    }
    rx
}

/// 两次读取之间的等待方式
pub(crate) enum Waiter {
    Poll(Duration),
    Event {
        notifications: Receiver<()>,
        poll_interval: Duration,
    },
}

impl Waiter {
    /// `Event` 模式会立刻启动后台通知线程，之后的变化都会被记下
    pub(crate) fn new(mode: WatchMode, poll_interval: Duration) -> Self {
        match mode {
            WatchMode::Poll => Waiter::Poll(poll_interval),
            WatchMode::Event => Waiter::Event {
                notifications: spawn_notifier(),
                poll_interval,
            },
        }
    }

    /// 阻塞到值得再读一次剪贴板
    ///
    /// `Event` 模式最多等待 `EVENT_SAFETY_TIMEOUT`，通知线程停止时永久退回轮询。
    pub(crate) fn wait(&mut self) {
        let fallback = match self {
            Waiter::Poll(interval) => {
                thread::sleep(*interval);
                return;
            }
            Waiter::Event {
                notifications,
                poll_interval,
            } => match notifications.recv_timeout(EVENT_SAFETY_TIMEOUT) {
                Ok(()) => {
                    // 合并排队中的重复通知，读一次就够
                    while notifications.try_recv().is_ok() {}
                    return;
                }
                Err(RecvTimeoutError::Timeout) => return,
                Err(RecvTimeoutError::Disconnected) => *poll_interval,
            },
        };

        log::warn!("📋 剪贴板变化通知不可用，退回轮询");
        *self = Waiter::Poll(fallback);
        thread::sleep(fallback);
    }
}
