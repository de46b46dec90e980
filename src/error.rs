//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载懒加载链路中所有可上报的失败，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 注意：重试地址改写失败与重试次数耗尽不是错误，而是哨兵值 `None`
//! （见 `reload` 模块）；图片加载失败是事件而非 `Err`。
//! 因此这里只剩两类真正的失败：参数校验与内部锁状态。

use serde::Serialize;

/// 懒加载统一错误类型。
///
/// 宿主框架对服务层的所有调用均返回 `Result<T, LazyError>`。
#[derive(Debug, thiserror::Error)]
pub enum LazyError {
    /// 配置或入参校验失败。
    #[error("参数错误：{0}")]
    InvalidParams(String),

    /// 内部锁已中毒等不可恢复的状态异常。
    #[error("状态错误：{0}")]
    State(String),
}

impl From<LazyError> for String {
    /// 兼容部分仍使用字符串错误的调用点。
    fn from(error: LazyError) -> Self {
        error.to_string()
    }
}

/// 宿主侧跨进程桥接（如 webview IPC）要求返回值可序列化。
/// 将错误序列化为人类可读的字符串。
impl Serialize for LazyError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
