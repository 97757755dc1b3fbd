// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 默认的浏览器标识，源站会拦截非浏览器的User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_BASE_URL: &str = "https://www.soumu.go.jp/menu_news/s-news/";

pub const DEFAULT_START_YEAR: i32 = 2009;

/// 应用程序配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 源站配置
    pub source: SourceSettings,
    /// 抓取配置
    pub fetch: FetchSettings,
    /// 批处理配置
    pub harvest: HarvestSettings,
    /// 导出配置
    pub export: ExportSettings,
}

/// 源站配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    /// 月度索引页面所在目录，必须以 `/` 结尾
    pub base_url: String,
    /// 默认起始年份
    pub start_year: i32,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    pub user_agent: String,
    /// 未声明或被误报为Latin-1时使用的旧编码
    pub fallback_encoding: String,
    /// 未声明字符集时是否使用 chardetng 检测
    pub sniff_undeclared: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fallback_encoding: "shift_jis".to_string(),
            sniff_undeclared: false,
        }
    }
}

/// 批处理配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestSettings {
    /// 相邻请求之间的最小间隔（毫秒），所有工作协程共享
    pub delay_ms: u64,
    /// 同时进行的抓取数，1 表示严格顺序执行
    pub concurrency: usize,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            delay_ms: 100,
            concurrency: 1,
        }
    }
}

/// 导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    /// 输出目录
    pub output_dir: String,
    /// 额外导出的旧编码CSV
    #[serde(default = "default_legacy_encodings")]
    pub legacy_encodings: Vec<String>,
    /// 无法映射字符的处理方式：`skip` 或单个ASCII替换字符
    pub unmappable: String,
    /// 是否导出TSV文本
    pub write_tsv: bool,
    /// 是否写出JSON运行摘要
    pub write_summary: bool,
}

fn default_legacy_encodings() -> Vec<String> {
    vec!["shift_jis".to_string(), "euc-jp".to_string()]
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            legacy_encodings: default_legacy_encodings(),
            unmappable: "skip".to_string(),
            write_tsv: true,
            write_summary: true,
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 以及 `PRESS_HARVESTER__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("PRESS_HARVESTER").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅使用内置默认值的配置
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let fetch = FetchSettings::default();
        let harvest = HarvestSettings::default();
        let export = ExportSettings::default();

        Ok(Config::builder()
            // Source
            .set_default("source.base_url", DEFAULT_BASE_URL)?
            .set_default("source.start_year", DEFAULT_START_YEAR as i64)?
            // Fetch
            .set_default("fetch.timeout_secs", fetch.timeout_secs)?
            .set_default("fetch.user_agent", fetch.user_agent)?
            .set_default("fetch.fallback_encoding", fetch.fallback_encoding)?
            .set_default("fetch.sniff_undeclared", fetch.sniff_undeclared)?
            // Harvest
            .set_default("harvest.delay_ms", harvest.delay_ms)?
            .set_default("harvest.concurrency", harvest.concurrency as u64)?
            // Export
            .set_default("export.output_dir", export.output_dir)?
            .set_default("export.unmappable", export.unmappable)?
            .set_default("export.write_tsv", export.write_tsv)?
            .set_default("export.write_summary", export.write_summary)?)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
