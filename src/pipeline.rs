//! 剪贴板 → SVG 流水线
//!
//! # 设计思路
//!
//! 单线程、无限循环，唯一的阻塞点是等待剪贴板变化：
//!
//! ```text
//!   WAITING ──(剪贴板变化)──▶ PROCESSING ──(完成 / 已处理的失败)──▶ WAITING
//! ```
//!
//! 每次变化依次执行：高亮 → （可选）裁剪 → 落盘 → （可选）回写剪贴板。
//!
//! # 实现思路
//!
//! - 单次处理的所有失败都在 `process` 边界被记录并转为 `IterationOutcome::Failed`，
//!   进程继续等待下一次变化。
//! - 空内容（空串或纯空白）不是错误，记 warn 后跳过，不写文件、不写剪贴板。
//! - 选择"回写文件引用"模式时在任何导出之前报告未实现。

use crate::clipboard::{ClipboardBackend, ClipboardWatcher, RetryPolicy};
use crate::crop::{self, BoundingBox};
use crate::error::AppError;
use crate::highlight::{Highlighter, OutputFormat, RenderRequest, RenderedDocument};
use crate::settings::{ClipboardOutput, Settings};
use crate::storage::{ArtifactStore, ExportArtifact};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Waiting,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyClipboard,
}

/// 单次迭代的结果
#[derive(Debug)]
pub enum IterationOutcome {
    Skipped(SkipReason),
    Exported {
        artifact: ExportArtifact,
        bounding_box: Option<BoundingBox>,
        copied_to_clipboard: bool,
    },
    Failed(AppError),
}

/// 流水线在运行期间不变的选项
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub lexer: String,
    pub format: OutputFormat,
    pub line_numbers: bool,
    pub crop: bool,
    pub font_size: u32,
    pub clipboard_output: ClipboardOutput,
    pub ignore_own_output: bool,
    pub retry: RetryPolicy,
}

impl From<&Settings> for PipelineOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            lexer: settings.lexer.clone(),
            format: settings.formatter,
            line_numbers: settings.line_numbers,
            crop: settings.crop,
            font_size: settings.font_size,
            clipboard_output: settings.clipboard_output,
            ignore_own_output: settings.ignore_own_output,
            retry: RetryPolicy::default(),
        }
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

pub struct Pipeline<C: ClipboardBackend> {
    watcher: ClipboardWatcher<C>,
    highlighter: Highlighter,
    store: ArtifactStore,
    options: PipelineOptions,
    state: PipelineState,
}

impl<C: ClipboardBackend> Pipeline<C> {
    pub fn new(
        watcher: ClipboardWatcher<C>,
        highlighter: Highlighter,
        store: ArtifactStore,
        options: PipelineOptions,
    ) -> Self {
        Self {
            watcher,
            highlighter,
            store,
            options,
            state: PipelineState::Waiting,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn watcher(&self) -> &ClipboardWatcher<C> {
        &self.watcher
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// 等待一次剪贴板变化并处理
    pub fn step(&mut self) -> IterationOutcome {
        self.state = PipelineState::Waiting;
        log::info!("📋 等待新的剪贴板内容");
        let text = self.watcher.wait_for_change();
        self.process(&text)
    }

    /// 永远循环；只有进程终止才会退出
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// 处理一次剪贴板内容，所有失败都在这里被吞掉并记录
    pub fn process(&mut self, text: &str) -> IterationOutcome {
        self.state = PipelineState::Processing;

        let outcome = match self.export(text) {
            Ok(outcome) => outcome,
            Err(err) => IterationOutcome::Failed(err),
        };

        match &outcome {
            IterationOutcome::Skipped(SkipReason::EmptyClipboard) => {
                log::warn!("⚠️ 剪贴板内容为空，未生成代码片段");
            }
            IterationOutcome::Exported { artifact, copied_to_clipboard, .. } => {
                log::info!(
                    "✅ 代码片段已保存: {}（{} 字节{}）",
                    artifact.path.display(),
                    artifact.bytes_written,
                    if *copied_to_clipboard { "，已写回剪贴板" } else { "" }
                );
            }
            IterationOutcome::Failed(err) => {
                log::error!(
                    "❌ 处理剪贴板内容时出错，未生成代码片段（lexer={}）: {} [{:?}]",
                    self.options.lexer,
                    err,
                    err
                );
            }
        }

        self.state = PipelineState::Waiting;
        outcome
    }

    fn export(&mut self, text: &str) -> Result<IterationOutcome, AppError> {
        if is_blank(text) {
            return Ok(IterationOutcome::Skipped(SkipReason::EmptyClipboard));
        }

        log::info!("📋 剪贴板中复制了以下内容:\n{}", text);

        if self.options.clipboard_output == ClipboardOutput::File {
            return Err(AppError::Unimplemented("以文件引用的形式写回剪贴板"));
        }

        let request = RenderRequest {
            text,
            lexer: &self.options.lexer,
            format: self.options.format,
            line_numbers: self.options.line_numbers,
            font_size: self.options.font_size,
        };
        let document = self.highlighter.render(&request)?;
        self.deliver(document, text)
    }

    /// 裁剪（可选）、落盘、回写（可选）；裁剪失败时不写任何文件
    fn deliver(&mut self, mut document: RenderedDocument, source: &str) -> Result<IterationOutcome, AppError> {
        let mut bounding_box = None;
        if self.options.crop {
            let (cropped, bbox) = crop::crop(&document, source)?;
            document = cropped;
            bounding_box = Some(bbox);
        }

        let artifact = self.store.persist(&document)?;

        let copied_to_clipboard = match self.options.clipboard_output {
            // 文件已经落盘，回写失败只影响剪贴板
            ClipboardOutput::Text => match self.watcher.write_back(
                document.as_str(),
                &self.options.retry,
                self.options.ignore_own_output,
            ) {
                Ok(()) => true,
                Err(err) => {
                    log::error!("❌ 写回剪贴板失败: {}", err);
                    false
                }
            },
            ClipboardOutput::Off | ClipboardOutput::File => false,
        };

        Ok(IterationOutcome::Exported {
            artifact,
            bounding_box,
            copied_to_clipboard,
        })
    }
}
