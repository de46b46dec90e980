//! # 重试地址改写模块
//!
//! ## 设计思路
//!
//! 重试计数不单独落盘，而是编码在资源地址的查询串里随加载往返。
//! 每次重试把“上一次实际尝试的地址”交给本模块改写：读出计数、加一、
//! 超限即放弃。改写失败（地址不可解析）与超限在接口层同样表现为
//! `None`，调用方据此回退占位图或保持破损状态。
//!
//! ## 实现思路
//!
//! - `url::Url` 负责解析与查询串操作，改写保留其余查询参数。
//! - 解析失败只记日志，绝不向上层抛出。
//! - 日志中的地址统一脱敏为 scheme://host/path，查询串可能携带令牌。

use url::Url;

/// 基于当前资源地址推导下一次重试地址。
///
/// 返回 `None` 表示不应再重试：地址不可解析，或下一次计数将超过
/// `max_reload_times` 上限。两种情况在接口层不作区分。
pub fn next_reload_url(url: &str, query_name: &str, max_reload_times: u32) -> Option<String> {
    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::error!(
                "❌ 重试地址解析失败 - url={} err={}",
                redact_url_for_log(url),
                err
            );
            return None;
        }
    };

    // 已有计数按整数读取，缺失或不可解析视作 0。
    let current = parsed
        .query_pairs()
        .find(|(key, _)| key.as_ref() == query_name)
        .and_then(|(_, value)| value.parse::<u32>().ok())
        .unwrap_or(0);

    let next = current.saturating_add(1);
    if next > max_reload_times {
        log::warn!(
            "⛔ 重试次数已达上限（{} > {}）- url={}",
            next,
            max_reload_times,
            redact_url_for_log(url)
        );
        return None;
    }

    let retained: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key.as_ref() != query_name)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = parsed.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(retained);
        pairs.append_pair(query_name, &next.to_string());
    }

    log::info!(
        "🔄 已生成第 {} 次重试地址 - url={}",
        next,
        redact_url_for_log(parsed.as_str())
    );

    Some(parsed.into())
}

/// 地址脱敏：仅保留 scheme://host[:port]/path，用于日志输出。
pub(crate) fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();

    format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
}
