//! 剪贴板访问模块
//!
//! # 设计思路
//!
//! 流水线只需要剪贴板的两个能力：读取当前文本、写入文本。
//! 这两个能力抽象为 `ClipboardBackend` trait：
//! - **系统剪贴板**：`ArboardClipboard`，委托 `arboard` 读写
//! - **测试替身**：测试中实现同一个 trait 的脚本化剪贴板
//!
//! # 实现思路
//!
//! - 监听归 `listener`（轮询 / 系统通知两种等待策略）与 `watcher`（记住上一次的值）。
//! - 回写归 `writer`（有限重试 + 指数退避）。
//! - 剪贴板里没有文本（例如复制了图片）时按空字符串处理，交给流水线作为"空内容"跳过。

pub mod listener;
pub mod watcher;
pub mod writer;

use crate::error::AppError;

pub use listener::WatchMode;
pub use watcher::ClipboardWatcher;
pub use writer::RetryPolicy;

/// 剪贴板后端
///
/// `get_text` 在剪贴板没有文本内容时返回空字符串，而不是错误。
pub trait ClipboardBackend {
    fn get_text(&mut self) -> Result<String, AppError>;

    fn set_text(&mut self, text: &str) -> Result<(), AppError>;
}

/// 基于 `arboard` 的系统剪贴板
pub struct ArboardClipboard {
    inner: arboard::Clipboard,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self, AppError> {
        let inner = arboard::Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl ClipboardBackend for ArboardClipboard {
    fn get_text(&mut self) -> Result<String, AppError> {
        match self.inner.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(AppError::Clipboard(e.to_string())),
        }
    }

    fn set_text(&mut self, text: &str) -> Result<(), AppError> {
        self.inner
            .set_text(text)
            .map_err(|e| AppError::Clipboard(e.to_string()))
    }
}
