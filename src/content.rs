//! 页面内容提供者
//!
//! 给定路由路径，先查已注册的模板（动态加载器），否则请求对应的静态文档，
//! 提取片段并缓存。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::cache::FragmentCache;
use crate::config::SiteConfig;
use crate::error::{SiteError, SiteResult};
use crate::extract::extract_content;
use crate::request::{HttpClient, HttpRequest};
use crate::route::{normalize_path, Params, RouteLoader};

/// 写入两个挂载点的内容
///
/// `None` 表示保持挂载点不变，`Some("")` 表示清空。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPayload {
    pub header_content: Option<String>,
    pub body_content: Option<String>,
}

impl ContentPayload {
    pub fn new(header: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            header_content: Some(header.into()),
            body_content: Some(body.into()),
        }
    }

    /// 只替换主体，头部保持不变
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            header_content: None,
            body_content: Some(body.into()),
        }
    }
}

pub struct PageContentProvider<C: HttpClient> {
    client: C,
    config: SiteConfig,
    cache: RefCell<FragmentCache>,
    templates: RefCell<HashMap<String, Rc<dyn RouteLoader>>>,
}

impl<C: HttpClient> PageContentProvider<C> {
    pub fn new(client: C, config: SiteConfig) -> Self {
        Self {
            client,
            config,
            cache: RefCell::new(FragmentCache::new()),
            templates: RefCell::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// 为路径注册模板，之后 `load_page` 不再请求文档
    pub fn register_template(&self, path: &str, loader: Rc<dyn RouteLoader>) {
        self.templates
            .borrow_mut()
            .insert(normalize_path(path), loader);
    }

    pub async fn load_page(&self, path: &str) -> SiteResult<ContentPayload> {
        let path = normalize_path(path);

        // 先取出再 await，不跨 await 持有借用
        let template = self.templates.borrow().get(&path).cloned();
        match template {
            Some(loader) => loader
                .load(&Params::new())
                .await
                .map_err(|e| e.in_op_with("content.template", path.as_str())),
            None => self.fetch_page_content(&path).await,
        }
    }

    /// 缓存命中时不发请求；否则请求文档、提取片段并写入缓存
    pub async fn fetch_page_content(&self, path: &str) -> SiteResult<ContentPayload> {
        let path = normalize_path(path);

        if let Some(cached) = self.cache.borrow().get(&path) {
            tracing::debug!(path = %path, "fragment cache hit");
            return Ok(cached);
        }

        let document = self.document_path(&path);
        let url = self.config.document_url(&document);
        tracing::debug!(path = %path, url = %url, "fetching page document");

        let resp = self
            .client
            .send(HttpRequest::get(&url).with_header("Accept", "text/html"))
            .await
            .map_err(|e| e.in_op_with("content.fetch", document.as_str()))?;

        if !resp.ok() {
            return Err(SiteError::fetch_failure(format!(
                "Failed to fetch {}: {} {}",
                document, resp.status, resp.status_text
            ))
            .in_op_with("content.fetch", document));
        }

        let payload = extract_content(&resp.body);
        self.cache.borrow_mut().set(&path, payload.clone());
        Ok(payload)
    }

    /// `/` → 根文档，`/slug` → `slug` + 扩展名
    pub fn document_path(&self, path: &str) -> String {
        let path = normalize_path(path);
        if path == "/" {
            return self.config.root_document.clone();
        }
        format!(
            "{}{}",
            path.trim_start_matches('/'),
            self.config.document_extension
        )
    }

    /// `document_path` 的逆运算
    pub fn route_path(&self, document: &str) -> String {
        let document = document.trim_start_matches("./").trim_start_matches('/');
        if document.is_empty() || document == self.config.root_document {
            return "/".to_string();
        }
        let slug = document
            .strip_suffix(self.config.document_extension.as_str())
            .unwrap_or(document);
        format!("/{}", slug)
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn clear_cache_for_path(&self, path: &str) {
        self.cache.borrow_mut().clear_path(path);
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.cache.borrow().contains(path)
    }
}

/// 静态页面路由的加载器：委托给内容提供者
pub struct DocumentLoader<C: HttpClient> {
    provider: Rc<PageContentProvider<C>>,
    path: String,
}

impl<C: HttpClient> DocumentLoader<C> {
    pub fn new(provider: Rc<PageContentProvider<C>>, path: &str) -> Self {
        Self {
            provider,
            path: normalize_path(path),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> RouteLoader for DocumentLoader<C> {
    async fn load(&self, _params: &Params) -> SiteResult<ContentPayload> {
        self.provider.load_page(&self.path).await
    }
}
