//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `LazyConfig`，保证运行时行为可观测、可调整、可测试。
//! 默认值即生产可用：2 秒重试间隔、10 次重试上限、`reloadv` 计数键、
//! 五档可见度阈值。
//!
//! ## 实现思路
//!
//! - `Default` 提供与线上行为一致的默认配置。
//! - `validate` 负责范围校验，运行时更新配置前必须通过。
//! - 阈值列表在观察器构建时生效，运行时修改只影响之后创建的观察器。

use serde::{Deserialize, Serialize};

use crate::error::LazyError;

/// 懒加载行为配置。
///
/// 字段覆盖重试节奏、重试上限、计数键名与可见度阈值四类策略。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LazyConfig {
    /// 加载失败后到下一次重试的等待时间（毫秒）。
    pub reload_interval_ms: u64,
    /// 重试次数上限，第 `max_reload_times + 1` 次尝试会被放弃。
    pub max_reload_times: u32,
    /// 编码在资源地址查询串中的重试计数键名。
    pub reload_query_name: String,
    /// 可见度阈值列表，供宿主环境的可见性原语按同样档位触发回调。
    pub thresholds: Vec<f64>,
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            reload_interval_ms: 2_000,
            max_reload_times: 10,
            reload_query_name: "reloadv".to_string(),
            thresholds: vec![0.0, 0.25, 0.5, 0.75, 1.0],
        }
    }
}

impl LazyConfig {
    /// 校验配置合法性。
    ///
    /// 运行时更新配置（`LazyLoadService::set_config`）前会先调用本方法，
    /// 非法配置直接拒绝，不会污染当前生效配置。
    pub fn validate(&self) -> Result<(), LazyError> {
        if !(100..=60_000).contains(&self.reload_interval_ms) {
            return Err(LazyError::InvalidParams(
                "reload_interval_ms 必须在 100~60000 毫秒之间".to_string(),
            ));
        }
        if !(1..=100).contains(&self.max_reload_times) {
            return Err(LazyError::InvalidParams(
                "max_reload_times 必须在 1~100 次之间".to_string(),
            ));
        }
        if self.reload_query_name.is_empty() {
            return Err(LazyError::InvalidParams(
                "reload_query_name 不能为空".to_string(),
            ));
        }
        if self
            .reload_query_name
            .chars()
            .any(|c| c.is_whitespace() || "?&=#/".contains(c))
        {
            return Err(LazyError::InvalidParams(format!(
                "reload_query_name 含有 URL 保留字符：{}",
                self.reload_query_name
            )));
        }
        if self.thresholds.is_empty() {
            return Err(LazyError::InvalidParams(
                "thresholds 不能为空".to_string(),
            ));
        }
        if self
            .thresholds
            .iter()
            .any(|t| !(0.0..=1.0).contains(t) || t.is_nan())
        {
            return Err(LazyError::InvalidParams(
                "thresholds 各档位必须在 0.0~1.0 之间".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_production_constants() {
        let config = LazyConfig::default();

        assert_eq!(config.reload_interval_ms, 2_000);
        assert_eq!(config.max_reload_times, 10);
        assert_eq!(config.reload_query_name, "reloadv");
        assert_eq!(config.thresholds, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn validate_rejects_out_of_range_interval() {
        let mut config = LazyConfig::default();
        config.reload_interval_ms = 50;

        assert!(matches!(
            config.validate(),
            Err(LazyError::InvalidParams(_))
        ));

        config.reload_interval_ms = 120_000;
        assert!(matches!(
            config.validate(),
            Err(LazyError::InvalidParams(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_reload_ceiling() {
        let mut config = LazyConfig::default();
        config.max_reload_times = 0;

        assert!(matches!(
            config.validate(),
            Err(LazyError::InvalidParams(_))
        ));
    }

    #[test]
    fn validate_rejects_reserved_characters_in_query_name() {
        for bad in ["", "re load", "a=b", "a&b", "a?b", "a#b", "a/b"] {
            let mut config = LazyConfig::default();
            config.reload_query_name = bad.to_string();

            assert!(
                matches!(config.validate(), Err(LazyError::InvalidParams(_))),
                "query name {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn validate_rejects_threshold_outside_unit_interval() {
        let mut config = LazyConfig::default();
        config.thresholds = vec![0.0, 1.5];

        assert!(matches!(
            config.validate(),
            Err(LazyError::InvalidParams(_))
        ));

        config.thresholds = vec![];
        assert!(matches!(
            config.validate(),
            Err(LazyError::InvalidParams(_))
        ));
    }

    #[test]
    fn validate_accepts_custom_in_range_values() {
        let config = LazyConfig {
            reload_interval_ms: 500,
            max_reload_times: 3,
            reload_query_name: "retry".to_string(),
            thresholds: vec![0.0, 0.5, 1.0],
        };

        config.validate().expect("in-range config should be valid");
    }

    #[test]
    fn config_serde_roundtrip() {
        let config = LazyConfig::default();
        let json = serde_json::to_string(&config).expect("serialize config failed");
        let back: LazyConfig = serde_json::from_str(&json).expect("deserialize config failed");

        assert_eq!(back, config);
    }
}
