//! 运行时配置模块
//!
//! 所有字段都有默认值；外部 JSON 只需给出要覆盖的字段。
//! 前端从页面内嵌的 `<script type="application/json" id="site-config">` 读取，
//! 读取不到时使用默认值。

use kozlony_shared::{CatalogConfig, SITE_NAME};
use serde::{Deserialize, Serialize};

use crate::error::SiteResult;

// =========================================================
// 默认值
// =========================================================

const DEFAULT_BASE_URL: &str = "/";
const DEFAULT_ROOT_DOCUMENT: &str = "index.html";
const DEFAULT_DOCUMENT_EXTENSION: &str = ".html";
const DEFAULT_HEADER_REGION_ID: &str = "app-header-content";
const DEFAULT_CONTENT_REGION_ID: &str = "app-content";
const DEFAULT_PAGE_ATTRIBUTE: &str = "data-current-page";

/// 内嵌配置元素的 id
pub const CONFIG_ELEMENT_ID: &str = "site-config";

/// 站点配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    /// 静态文档的基础 URL
    pub base_url: String,
    /// `/` 对应的文档
    pub root_document: String,
    /// 其它路由对应文档的扩展名
    pub document_extension: String,
    /// 头部挂载点 id
    pub header_region_id: String,
    /// 主内容挂载点 id
    pub content_region_id: String,
    /// 写在 body 上的当前页面属性名
    pub page_attribute: String,
    /// 站点名称
    pub site_title: String,
    /// 列表页数据参数
    pub listing: CatalogConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            root_document: DEFAULT_ROOT_DOCUMENT.to_string(),
            document_extension: DEFAULT_DOCUMENT_EXTENSION.to_string(),
            header_region_id: DEFAULT_HEADER_REGION_ID.to_string(),
            content_region_id: DEFAULT_CONTENT_REGION_ID.to_string(),
            page_attribute: DEFAULT_PAGE_ATTRIBUTE.to_string(),
            site_title: SITE_NAME.to_string(),
            listing: CatalogConfig::default(),
        }
    }
}

impl SiteConfig {
    /// 从 JSON 解析，缺失字段使用默认值
    pub fn from_json(json: &str) -> SiteResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// 将文档路径拼接到基础 URL 上
    pub fn document_url(&self, document: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, document)
        } else {
            format!("{}/{}", self.base_url, document)
        }
    }
}
