//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，流水线各阶段（监听、高亮、裁剪、落盘、回写剪贴板）
//! 都返回 `Result<T, AppError>`，由主循环在单次迭代的边界统一记录并吞掉，
//! 保证任何一次失败都不会让进程退出。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error` 提供 `From` 转换，文件操作可直接使用 `?`。
//! - "剪贴板为空" 不是错误，由 `pipeline::SkipReason` 表达。

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板读写操作失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 输出目录不可用
    #[error("输出目录不可用: {0}")]
    Storage(String),

    /// 配置文件或命令行参数无效
    #[error("配置无效: {0}")]
    Settings(String),

    /// 语法高亮器不认识请求的语言
    #[error("未知的语言/词法分析器: '{0}'")]
    UnknownLexer(String),

    /// 分词或渲染失败
    #[error("高亮渲染失败: {0}")]
    Highlight(String),

    /// 渲染结果中缺少裁剪所需的结构（文本元素、字号、根元素）
    #[error("渲染结果格式异常: {0}")]
    MalformedRender(String),

    /// 已声明但尚未实现的功能
    #[error("功能尚未实现: {0}")]
    Unimplemented(&'static str),
}
