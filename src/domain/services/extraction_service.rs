// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::press_release::PressRelease;
use crate::utils::url_utils::resolve_url;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("valid selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));

/// 一行表格的固定三列
struct RowCells<'a> {
    date: ElementRef<'a>,
    content: ElementRef<'a>,
    department: ElementRef<'a>,
}

impl<'a> RowCells<'a> {
    /// 单元格少于三个的行返回 `None`
    fn from_row(row: ElementRef<'a>) -> Option<Self> {
        let mut cells = row.select(&CELL);
        Some(Self {
            date: cells.next()?,
            content: cells.next()?,
            department: cells.next()?,
        })
    }
}

/// 表格提取服务
///
/// 负责从月度索引页面中提取报道资料记录
pub struct ExtractionService;

impl ExtractionService {
    /// 提取页面中第一个表格的数据行
    ///
    /// 跳过首行（表头）；单元格不足三个的行被忽略；没有表格时返回空列表。
    /// 输出顺序与文档中的行顺序一致。
    ///
    /// # 参数
    ///
    /// * `markup` - 已解码的HTML
    /// * `page_url` - 页面自身的URL，用于解析相对链接
    /// * `period` - 端点的期间标签
    pub fn extract(markup: &str, page_url: &Url, period: &str) -> Vec<PressRelease> {
        let document = Html::parse_document(markup);

        let Some(table) = document.select(&TABLE).next() else {
            debug!(url = %page_url, "No table found");
            return Vec::new();
        };

        let mut skipped = 0usize;
        let records: Vec<PressRelease> = table
            .select(&ROW)
            .skip(1)
            .filter_map(|row| {
                let cells = RowCells::from_row(row);
                if cells.is_none() {
                    skipped += 1;
                }
                cells
            })
            .map(|cells| Self::to_record(&cells, page_url, period))
            .collect();

        if skipped > 0 {
            debug!(url = %page_url, skipped, "Rows with fewer than three cells skipped");
        }
        records
    }

    fn to_record(cells: &RowCells<'_>, page_url: &Url, period: &str) -> PressRelease {
        let date = text_of(cells.date);
        let department = text_of(cells.department);

        let (title, link) = match cells.content.select(&ANCHOR).next() {
            Some(anchor) => {
                let link = anchor
                    .value()
                    .attr("href")
                    .map(|href| absolute_link(page_url, href))
                    .unwrap_or_default();
                (text_of(anchor), link)
            }
            None => (text_of(cells.content), String::new()),
        };

        PressRelease::new(&date, &title, &department, &link, period)
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn absolute_link(page_url: &Url, href: &str) -> String {
    if href.trim().is_empty() {
        return String::new();
    }
    match resolve_url(page_url, href) {
        Ok(url) => url.to_string(),
        Err(e) => {
            debug!(href, error = %e, "Unresolvable link kept as-is");
            href.trim().to_string()
        }
    }
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
