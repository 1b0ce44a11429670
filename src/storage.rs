//! 导出文件存储模块
//!
//! # 设计思路
//!
//! 所有导出的 SVG 都写入同一个输出目录，目录在启动时创建（已存在不报错），
//! 之后只追加文件，从不覆盖、删除或回读。
//!
//! # 实现思路
//!
//! - 文件名为导出时刻的 Unix 毫秒时间戳：`<millis>.svg`。
//! - 使用 `create_new` 打开文件；同名文件已存在时把时间戳加 1 再试，
//!   保证同一进程内的导出永不互相覆盖。
//! - 写入失败时删除刚创建的文件，目录里不会留下截断的 SVG。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::AppError;
use crate::highlight::RenderedDocument;

pub const DEFAULT_OUTPUT_DIR: &str = "clipper_snippets";
pub const ARTIFACT_EXTENSION: &str = "svg";

const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// 输出目录信息
#[derive(Debug, Clone)]
pub struct StorageInfo {
    pub path: PathBuf,
    pub total_size: u64,
    pub file_count: u64,
}

/// 已写入磁盘的导出结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub bytes_written: usize,
}

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// 打开（必要时创建）输出目录
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::Storage(format!("创建输出目录 '{}' 失败: {}", dir.display(), e))
        })?;
        if !dir.is_dir() {
            return Err(AppError::Storage(format!("'{}' 不是目录", dir.display())));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 以当前时间命名写入一个新文件
    pub fn persist(&self, document: &RenderedDocument) -> Result<ExportArtifact, AppError> {
        self.persist_at(Utc::now().timestamp_millis(), document)
    }

    pub(crate) fn persist_at(&self, timestamp_millis: i64, document: &RenderedDocument) -> Result<ExportArtifact, AppError> {
        let content = document.as_str().as_bytes();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let stamp = timestamp_millis.saturating_add(attempt as i64);
            let path = self.dir.join(format!("{}.{}", stamp, ARTIFACT_EXTENSION));

            let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    log::debug!("📄 文件 {} 已存在，尝试下一个时间戳", path.display());
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            write_or_discard(file, &path, content)?;

            return Ok(ExportArtifact {
                path,
                bytes_written: content.len(),
            });
        }

        Err(AppError::Storage(format!(
            "在 '{}' 中找不到可用的文件名",
            self.dir.display()
        )))
    }

    /// 统计输出目录中的文件数与总大小
    pub fn info(&self) -> StorageInfo {
        let mut total_size: u64 = 0;
        let mut file_count: u64 = 0;

        if let Ok(entries) = fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    if metadata.is_file() {
                        total_size += metadata.len();
                        file_count += 1;
                    }
                }
            }
        }

        StorageInfo {
            path: self.dir.clone(),
            total_size,
            file_count,
        }
    }
}

/// 写入完整内容；失败时删除已创建的文件，目录里只留下完整的导出
fn write_or_discard<W: Write>(mut out: W, path: &Path, content: &[u8]) -> io::Result<()> {
    let written = out.write_all(content).and_then(|()| out.flush());
    drop(out);

    if let Err(err) = written {
        log::error!("📄 写入 {} 失败，删除不完整的文件: {}", path.display(), err);
        if let Err(remove_err) = fs::remove_file(path) {
            log::warn!("📄 删除不完整的文件 {} 失败: {}", path.display(), remove_err);
        }
        return Err(err);
    }
    Ok(())
}
