//! # clipper — 剪贴板代码高亮导出工具
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  main.rs   env_logger 初始化 · clap 解析 · 启动失败退出   │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ Settings（默认值 < 设置文件 < 命令行）
//! ┌───────┴──────────────────────────────────────────────────┐
//! │  pipeline  WAITING ⇄ PROCESSING，单线程无限循环           │
//! │                                                          │
//! │  clipboard::watcher ── 等待变化（轮询 / 系统通知）        │
//! │       ↓ 新文本                                           │
//! │  highlight ────────── syntect 分词 + 固定配色 → SVG       │
//! │       ↓ RenderedDocument                                 │
//! │  crop（可选）──────── 估算包围盒，改写 <svg> 宽高          │
//! │       ↓                                                  │
//! │  storage ──────────── <unix毫秒>.svg，只追加不覆盖        │
//! │       ↓                                                  │
//! │  clipboard::writer（可选）── 回写 SVG 文本，带重试        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`cli`] | 命令行参数定义 |
//! | [`settings`] | 设置文件加载与命令行合并 |
//! | [`clipboard`] | 剪贴板后端抽象、变化监听、回写重试 |
//! | [`highlight`] | 语法查找、配色主题、SVG 输出 |
//! | [`crop`] | 包围盒估算与根元素改写 |
//! | [`storage`] | 输出目录与导出文件 |
//! | [`pipeline`] | 主循环与单次迭代的错误边界 |

pub mod cli;
pub mod clipboard;
pub mod crop;
pub mod error;
pub mod highlight;
pub mod pipeline;
pub mod settings;
pub mod storage;

use clipboard::{ArboardClipboard, ClipboardWatcher};
use error::AppError;
use highlight::Highlighter;
use pipeline::{Pipeline, PipelineOptions};
use settings::Settings;
use storage::ArtifactStore;

/// 启动流水线并永久运行
///
/// 只有启动阶段的错误（输出目录、剪贴板、主题）会返回。
pub fn run(settings: &Settings) -> Result<(), AppError> {
    let store = ArtifactStore::open(&settings.outdir)?;
    let info = store.info();
    log::info!(
        "📁 输出目录: {}（已有 {} 个文件，共 {} 字节）",
        info.path.display(),
        info.file_count,
        info.total_size
    );

    let highlighter = Highlighter::new()?;
    if let Err(err) = highlighter.find_lexer(&settings.lexer) {
        log::warn!("⚠️ {}，每次导出都会失败，可用 --list-lexers 查看可用语言", err);
    }

    let clipboard = ArboardClipboard::new()?;
    let watcher = ClipboardWatcher::new(clipboard, settings.watch_mode, settings.poll_interval_ms);
    log::info!(
        "📋 剪贴板监听已启动（mode={:?}, lexer={}, crop={}, output={:?}）",
        settings.watch_mode,
        settings.lexer,
        settings.crop,
        settings.clipboard_output
    );

    let mut pipeline = Pipeline::new(watcher, highlighter, store, PipelineOptions::from(settings));
    pipeline.run()
}
