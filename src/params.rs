//! # 指令参数模块
//!
//! ## 设计思路
//!
//! 宿主框架的绑定值有两种合法形态：纯字符串（即 `src`），或包含
//! `src` / `loading` / `reload` 三个字段的结构化值。解析永不失败：
//! 字段缺失或类型不符时落回默认值，与指令“宽进严出”的约定保持一致。

use serde::Serialize;
use serde_json::Value;

/// 单次指令调用解析出的不可变参数。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadParams {
    /// 目标资源地址，元素可见后才真正加载。
    pub src: String,
    /// 占位资源地址，等待期间显示；为空表示无占位阶段。
    pub loading: String,
    /// 加载失败后是否进入有限重试。
    pub reload: bool,
}

impl LoadParams {
    /// 从宿主绑定值解析参数。
    ///
    /// - 字符串 → 仅 `src`，其余取默认；
    /// - 对象 → 逐字段读取，缺失或类型不符取默认；
    /// - 其他类型 → 全部默认。
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::String(src) => Self {
                src: src.clone(),
                ..Self::default()
            },
            Value::Object(fields) => Self {
                src: fields
                    .get("src")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                loading: fields
                    .get("loading")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                reload: fields
                    .get("reload")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            _ => Self::default(),
        }
    }

    /// 是否配置了占位资源。
    pub fn has_loading(&self) -> bool {
        !self.loading.is_empty()
    }
}
