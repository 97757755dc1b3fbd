// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use encoding_rs::SHIFT_JIS;
use press_harvester::application::use_cases::harvest_use_case::HarvestUseCase;
use press_harvester::config::settings::Settings;
use press_harvester::engines::reqwest_engine::ReqwestEngine;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const INDEX_PATH: &str = "/menu_news/s-news/";

/// 指向模拟源站的配置，不做限速
pub fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::defaults().expect("default settings");
    settings.source.base_url = format!("{}{}", server.uri(), INDEX_PATH);
    settings.fetch.timeout_secs = 5;
    settings.harvest.delay_ms = 0;
    settings
}

pub fn use_case_for(server: &MockServer) -> HarvestUseCase<ReqwestEngine> {
    HarvestUseCase::from_settings(&settings_for(server)).expect("use case")
}

/// 生成与源站相同结构的索引表
pub fn index_table(rows: &[(&str, &str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(date, title, href, department)| {
            format!(
                "<tr>\n  <td>{}</td>\n  <td><a href=\"{}\">{}</a></td>\n  <td>{}</td>\n</tr>",
                date, href, title, department
            )
        })
        .collect();
    format!(
        "<html><body><table><tr><th>発表日</th><th>報道資料件名</th><th>部局名</th></tr>{}</table></body></html>",
        body
    )
}

/// 以Shift_JIS编码、但声明为ISO-8859-1的方式挂载页面
pub async fn mount_shift_jis_page(server: &MockServer, page: &str, markup: &str) {
    let (bytes, _, _) = SHIFT_JIS.encode(markup);
    Mock::given(method("GET"))
        .and(path(format!("{}{}", INDEX_PATH, page)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(bytes.into_owned(), "text/html; charset=ISO-8859-1"),
        )
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, page: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("{}{}", INDEX_PATH, page)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
