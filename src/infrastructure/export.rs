// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 多编码导出
//!
//! 同一份记录按多个目标序列化：带BOM的UTF-8 CSV、若干旧编码CSV，
//! 以及一个UTF-8 TSV文本。每个目标由 {编码, 无法映射字符策略, 分隔格式}
//! 参数化，互相独立，一个目标失败不影响其他目标。

use crate::config::settings::ExportSettings;
use crate::domain::models::batch_report::BatchSummary;
use crate::domain::models::press_release::{PressRelease, COLUMN_HEADERS};
use crate::domain::repositories::storage_repository::{StorageError, StorageRepository};
use crate::utils::text_processing::{normalize_text, sanitize_field};
use encoding_rs::{EncoderResult, Encoding, UTF_8};
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 导出错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),
    #[error("Encoding {0} is not ASCII-compatible")]
    UnsupportedEncoding(&'static str),
    #[error("Invalid unmappable policy: {0}")]
    InvalidPolicy(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// 无法映射字符的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmappablePolicy {
    /// 丢弃
    Skip,
    /// 替换为指定的ASCII字节
    Substitute(u8),
}

impl FromStr for UnmappablePolicy {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("skip") {
            return Ok(UnmappablePolicy::Skip);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            // substitution happens after quoting, so delimiters and quotes would split columns
            (Some(c), None) if (c.is_ascii_graphic() || c == ' ') && !matches!(c, ',' | '"') => {
                Ok(UnmappablePolicy::Substitute(c as u8))
            }
            _ => Err(ExportError::InvalidPolicy(s.to_string())),
        }
    }
}

/// 分隔格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimitedFormat {
    /// 逗号分隔，必要时加引号
    Csv,
    /// 制表符分隔，不加引号，字段内的制表符替换为空格
    Tsv,
}

impl DelimitedFormat {
    pub fn delimiter(self) -> char {
        match self {
            DelimitedFormat::Csv => ',',
            DelimitedFormat::Tsv => '\t',
        }
    }

    fn quote_style(self) -> csv::QuoteStyle {
        match self {
            DelimitedFormat::Csv => csv::QuoteStyle::Necessary,
            DelimitedFormat::Tsv => csv::QuoteStyle::Never,
        }
    }
}

/// 导出目标
#[derive(Debug, Clone)]
pub struct ExportTarget {
    /// 文件名后缀，例如 `_shift_jis.csv`
    pub suffix: String,
    pub encoding: &'static Encoding,
    pub bom: bool,
    pub format: DelimitedFormat,
    pub policy: UnmappablePolicy,
}

impl ExportTarget {
    /// 带BOM的UTF-8 CSV
    pub fn utf8_bom_csv() -> Self {
        Self {
            suffix: ".csv".to_string(),
            encoding: UTF_8,
            bom: true,
            format: DelimitedFormat::Csv,
            policy: UnmappablePolicy::Skip,
        }
    }

    /// 旧编码CSV
    pub fn legacy_csv(label: &str, policy: UnmappablePolicy) -> Result<Self, ExportError> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| ExportError::UnknownEncoding(label.to_string()))?;
        if !encoding.is_ascii_compatible() || encoding.output_encoding() != encoding {
            return Err(ExportError::UnsupportedEncoding(encoding.name()));
        }
        let tag = encoding.name().to_ascii_lowercase().replace('-', "_");
        Ok(Self {
            suffix: format!("_{}.csv", tag),
            encoding,
            bom: false,
            format: DelimitedFormat::Csv,
            policy,
        })
    }

    /// 在任何文本查看器中都能读取的UTF-8 TSV
    pub fn tsv_text() -> Self {
        Self {
            suffix: "_text.txt".to_string(),
            encoding: UTF_8,
            bom: false,
            format: DelimitedFormat::Tsv,
            policy: UnmappablePolicy::Skip,
        }
    }

    pub fn file_name(&self, stem: &str) -> String {
        format!("{}{}", stem, self.suffix)
    }

    /// 把记录序列化为目标编码的字节
    pub fn serialize(&self, records: &[PressRelease]) -> Result<EncodedArtifact, ExportError> {
        let text = render_delimited(records, self.format)?;
        let (encoded, unmappable) = encode_lossy(&text, self.encoding, self.policy);
        let bytes = if self.bom {
            [UTF8_BOM, encoded.as_slice()].concat()
        } else {
            encoded
        };
        Ok(EncodedArtifact {
            bytes,
            rows: records.len(),
            unmappable,
        })
    }
}

/// 序列化结果
#[derive(Debug, Clone)]
pub struct EncodedArtifact {
    pub bytes: Vec<u8>,
    pub rows: usize,
    /// 被丢弃或替换的字符数
    pub unmappable: usize,
}

/// 单个目标的导出结果
#[derive(Debug)]
pub struct TargetOutcome {
    pub file_name: String,
    pub encoding: &'static str,
    pub result: Result<TargetStats, ExportError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetStats {
    pub bytes: usize,
    pub rows: usize,
    pub unmappable: usize,
}

/// 全部目标的导出结果
#[derive(Debug, Default)]
pub struct ExportReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl ExportReport {
    pub fn written(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn all_written(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// 多编码导出器
#[derive(Debug, Clone)]
pub struct Exporter {
    targets: Vec<ExportTarget>,
    write_summary: bool,
}

impl Exporter {
    pub fn new(targets: Vec<ExportTarget>) -> Self {
        Self {
            targets,
            write_summary: false,
        }
    }

    /// 根据导出配置构建目标列表
    ///
    /// UTF-8 BOM CSV 总是第一个目标。
    pub fn from_settings(settings: &ExportSettings) -> Result<Self, ExportError> {
        let policy: UnmappablePolicy = settings.unmappable.parse()?;
        let mut targets = vec![ExportTarget::utf8_bom_csv()];
        for label in &settings.legacy_encodings {
            let target = ExportTarget::legacy_csv(label, policy)?;
            if targets.iter().any(|t| t.encoding == target.encoding) {
                warn!(
                    label = %label,
                    encoding = target.encoding.name(),
                    "Duplicate export encoding ignored"
                );
                continue;
            }
            targets.push(target);
        }
        if settings.write_tsv {
            targets.push(ExportTarget::tsv_text());
        }
        Ok(Self {
            targets,
            write_summary: settings.write_summary,
        })
    }

    pub fn targets(&self) -> &[ExportTarget] {
        &self.targets
    }

    /// 把记录写入所有目标
    ///
    /// 每个目标独立处理，失败只记录在对应的结果中。
    pub async fn export(
        &self,
        records: &[PressRelease],
        storage: &dyn StorageRepository,
        stem: &str,
    ) -> ExportReport {
        let mut report = ExportReport::default();

        for target in &self.targets {
            let file_name = target.file_name(stem);
            let result = Self::write_target(target, records, storage, &file_name).await;

            match &result {
                Ok(stats) => {
                    if stats.unmappable > 0 {
                        warn!(
                            file = %file_name,
                            encoding = target.encoding.name(),
                            unmappable = stats.unmappable,
                            "Characters outside the target repertoire were dropped or replaced"
                        );
                    }
                    info!(
                        file = %file_name,
                        rows = stats.rows,
                        bytes = stats.bytes,
                        "Export written"
                    );
                }
                Err(e) => error!(file = %file_name, error = %e, "Export failed"),
            }

            report.outcomes.push(TargetOutcome {
                file_name,
                encoding: target.encoding.name(),
                result,
            });
        }

        report
    }

    async fn write_target(
        target: &ExportTarget,
        records: &[PressRelease],
        storage: &dyn StorageRepository,
        file_name: &str,
    ) -> Result<TargetStats, ExportError> {
        let artifact = target.serialize(records)?;
        storage.save(file_name, &artifact.bytes).await?;
        Ok(TargetStats {
            bytes: artifact.bytes.len(),
            rows: artifact.rows,
            unmappable: artifact.unmappable,
        })
    }

    /// 写出JSON运行摘要（如果启用）
    pub async fn export_summary(
        &self,
        summary: &BatchSummary,
        storage: &dyn StorageRepository,
        stem: &str,
    ) -> Option<Result<String, ExportError>> {
        if !self.write_summary {
            return None;
        }
        let file_name = format!("{}_summary.json", stem);
        let result = async {
            let json = serde_json::to_vec_pretty(summary)
                .map_err(|e| ExportError::Serialize(e.to_string()))?;
            storage.save(&file_name, &json).await?;
            Ok::<_, ExportError>(file_name)
        }
        .await;
        Some(result)
    }
}

/// 以指定分隔格式渲染表头与全部记录
pub fn render_delimited(
    records: &[PressRelease],
    format: DelimitedFormat,
) -> Result<String, ExportError> {
    let delimiter = format.delimiter();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .quote_style(format.quote_style())
        .from_writer(Vec::new());

    writer.write_record(COLUMN_HEADERS)?;
    for record in records {
        let row = record.fields().map(|field| match format {
            DelimitedFormat::Csv => normalize_text(field),
            DelimitedFormat::Tsv => sanitize_field(field, delimiter),
        });
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Serialize(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Serialize(e.to_string()))
}

/// 尽力编码：无法映射的字符按策略丢弃或替换，不会报错
///
/// 返回编码后的字节与无法映射的字符数。
pub fn encode_lossy(
    text: &str,
    encoding: &'static Encoding,
    policy: UnmappablePolicy,
) -> (Vec<u8>, usize) {
    let mut encoder = encoding.new_encoder();
    let mut out = Vec::with_capacity(text.len() + 16);
    let mut remaining = text;
    let mut unmappable = 0;

    loop {
        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(remaining, &mut out, true);
        remaining = &remaining[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => out.reserve(remaining.len() + 16),
            EncoderResult::Unmappable(_) => {
                unmappable += 1;
                if let UnmappablePolicy::Substitute(byte) = policy {
                    out.push(byte);
                }
            }
        }
    }

    (out, unmappable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryStorage;
    use encoding_rs::{EUC_JP, SHIFT_JIS};

    fn records() -> Vec<PressRelease> {
        vec![
            PressRelease::new(
                "2025年1月31日",
                "情報通信白書, 令和6年版",
                "情報流通行政局",
                "https://www.soumu.go.jp/menu_news/s-news/a.html",
                "2025年1月",
            ),
            PressRelease::new("2025年1月6日", "年頭所感🎍", "大臣官房", "", "2025年1月"),
        ]
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("skip".parse::<UnmappablePolicy>().unwrap(), UnmappablePolicy::Skip);
        assert_eq!(
            "?".parse::<UnmappablePolicy>().unwrap(),
            UnmappablePolicy::Substitute(b'?')
        );
        assert!("??".parse::<UnmappablePolicy>().is_err());
        assert!("〓".parse::<UnmappablePolicy>().is_err());
        assert!(",".parse::<UnmappablePolicy>().is_err());
        assert!("\"".parse::<UnmappablePolicy>().is_err());
        assert!("\t".parse::<UnmappablePolicy>().is_err());
    }

    #[test]
    fn test_substituted_legacy_csv_keeps_five_columns() {
        let policy: UnmappablePolicy = "?".parse().unwrap();
        let target = ExportTarget::legacy_csv("shift_jis", policy).unwrap();
        let artifact = target.serialize(&records()).unwrap();
        let (decoded, _, _) = SHIFT_JIS.decode(&artifact.bytes);

        let mut reader = csv::Reader::from_reader(decoded.as_bytes());
        assert_eq!(reader.headers().unwrap().len(), 5);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == 5));
        assert_eq!(&rows[1][1], "年頭所感?");
    }

    #[test]
    fn test_utf8_bom_csv() {
        let artifact = ExportTarget::utf8_bom_csv().serialize(&records()).unwrap();
        assert!(artifact.bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&artifact.bytes[3..]).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("発表日,内容,部局,リンクURL,対象期間"));
        assert_eq!(
            lines.next(),
            Some("2025年1月31日,\"情報通信白書, 令和6年版\",情報流通行政局,https://www.soumu.go.jp/menu_news/s-news/a.html,2025年1月")
        );
        assert_eq!(artifact.rows, 2);
        assert_eq!(artifact.unmappable, 0);
    }

    #[test]
    fn test_shift_jis_skips_unmappable() {
        let target = ExportTarget::legacy_csv("shift_jis", UnmappablePolicy::Skip).unwrap();
        assert_eq!(target.suffix, "_shift_jis.csv");

        let artifact = target.serialize(&records()).unwrap();
        assert_eq!(artifact.unmappable, 1);

        let (decoded, _, had_errors) = SHIFT_JIS.decode(&artifact.bytes);
        assert!(!had_errors);
        assert!(decoded.contains("年頭所感,大臣官房"));
        assert!(decoded.contains("情報通信白書"));
    }

    #[test]
    fn test_euc_jp_substitutes_unmappable() {
        let target =
            ExportTarget::legacy_csv("euc-jp", UnmappablePolicy::Substitute(b'?')).unwrap();
        assert_eq!(target.suffix, "_euc_jp.csv");

        let artifact = target.serialize(&records()).unwrap();
        let (decoded, _, _) = EUC_JP.decode(&artifact.bytes);
        assert!(decoded.contains("年頭所感?,大臣官房"));
    }

    #[test]
    fn test_legacy_suffix_uses_canonical_name() {
        for label in ["Shift_JIS", "shift-jis", "sjis", "x-sjis"] {
            let target = ExportTarget::legacy_csv(label, UnmappablePolicy::Skip).unwrap();
            assert_eq!(target.suffix, "_shift_jis.csv");
        }
    }

    #[test]
    fn test_from_settings_drops_duplicate_encodings() {
        let settings = ExportSettings {
            legacy_encodings: vec![
                "Shift_JIS".to_string(),
                "shift-jis".to_string(),
                "euc-jp".to_string(),
                "EUC-JP".to_string(),
            ],
            ..ExportSettings::default()
        };
        let exporter = Exporter::from_settings(&settings).unwrap();
        let names: Vec<_> = exporter.targets().iter().map(|t| t.file_name("out")).collect();
        assert_eq!(
            names,
            vec!["out.csv", "out_shift_jis.csv", "out_euc_jp.csv", "out_text.txt"]
        );
    }

    #[test]
    fn test_legacy_target_rejects_bad_labels() {
        assert!(matches!(
            ExportTarget::legacy_csv("klingon", UnmappablePolicy::Skip),
            Err(ExportError::UnknownEncoding(_))
        ));
        assert!(matches!(
            ExportTarget::legacy_csv("utf-16le", UnmappablePolicy::Skip),
            Err(ExportError::UnsupportedEncoding(_))
        ));
        assert!(matches!(
            ExportTarget::legacy_csv("iso-2022-jp", UnmappablePolicy::Skip),
            Err(ExportError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_tsv_round_trip_five_columns() {
        let mut rows = records();
        rows.push(PressRelease {
            date: "2025年1月1日".to_string(),
            title: "tab\tinside".to_string(),
            department: "部局".to_string(),
            link: String::new(),
            period: "2025年1月".to_string(),
        });

        let text = render_delimited(&rows, DelimitedFormat::Tsv).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), rows.len() + 1);

        for (line, record) in lines[1..].iter().zip(&rows) {
            let columns: Vec<&str> = line.split('\t').collect();
            assert_eq!(columns.len(), 5);
            let expected = record.fields().map(|f| sanitize_field(f, '\t'));
            assert_eq!(columns, expected);
        }
        assert_eq!(lines[3].split('\t').nth(1), Some("tab inside"));
    }

    #[test]
    fn test_tsv_does_not_quote() {
        let text = render_delimited(&records(), DelimitedFormat::Tsv).unwrap();
        assert!(text.contains("情報通信白書, 令和6年版\t"));
        assert!(!text.contains('"'));
    }

    #[test]
    fn test_encode_lossy_large_input() {
        let text = "総務省".repeat(10_000);
        let (bytes, unmappable) = encode_lossy(&text, SHIFT_JIS, UnmappablePolicy::Skip);
        assert_eq!(unmappable, 0);
        assert_eq!(bytes.len(), 60_000);
    }

    #[tokio::test]
    async fn test_from_settings_and_export() {
        let exporter = Exporter::from_settings(&ExportSettings::default()).unwrap();
        let names: Vec<_> = exporter.targets().iter().map(|t| t.file_name("out")).collect();
        assert_eq!(
            names,
            vec!["out.csv", "out_shift_jis.csv", "out_euc_jp.csv", "out_text.txt"]
        );

        let storage = InMemoryStorage::new();
        let report = exporter.export(&records(), &storage, "out").await;

        assert!(report.all_written());
        assert_eq!(storage.keys().await.len(), 4);
    }

    #[tokio::test]
    async fn test_failing_target_does_not_block_others() {
        let exporter = Exporter::from_settings(&ExportSettings::default()).unwrap();
        let storage = InMemoryStorage::failing_on(&["_shift_jis.csv"]);

        let report = exporter.export(&records(), &storage, "out").await;

        assert_eq!(report.failed().count(), 1);
        assert_eq!(report.written().count(), 3);
        assert!(storage.exists("out_text.txt").await.unwrap());
        assert!(storage.exists("out_euc_jp.csv").await.unwrap());
    }

    #[tokio::test]
    async fn test_summary_written_when_enabled() {
        let exporter = Exporter::from_settings(&ExportSettings::default()).unwrap();
        let storage = InMemoryStorage::new();
        let summary = BatchSummary {
            planned: 3,
            attempted: 3,
            succeeded: 2,
            failed: 1,
            records: 5,
            interrupted: false,
        };

        let written = exporter.export_summary(&summary, &storage, "out").await;

        assert_eq!(written.unwrap().unwrap(), "out_summary.json");
        let json = storage.get("out_summary.json").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["failed"], 1);
        assert_eq!(value["records"], 5);
    }
}
