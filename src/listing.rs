//! 动态列表页的路由加载器（`/` 与 `/page/:page`）

use std::rc::Rc;

use kozlony_shared::{GazetteCatalog, PAGE_PARAM};

use crate::content::{ContentPayload, PageContentProvider};
use crate::error::SiteResult;
use crate::render::render_gazette_section;
use crate::request::HttpClient;
use crate::route::{Params, RouteLoader};

pub struct ListingLoader<C: HttpClient> {
    catalog: Rc<GazetteCatalog>,
    // 设置后从根文档取头部片段
    shell: Option<Rc<PageContentProvider<C>>>,
}

impl<C: HttpClient> ListingLoader<C> {
    pub fn new(catalog: Rc<GazetteCatalog>) -> Self {
        Self {
            catalog,
            shell: None,
        }
    }

    pub fn with_shell(mut self, provider: Rc<PageContentProvider<C>>) -> Self {
        self.shell = Some(provider);
        self
    }

    pub fn catalog(&self) -> &GazetteCatalog {
        &self.catalog
    }

    /// 解析 `page` 参数；缺失、非整数或小于 1 时为 1
    pub fn page_from_params(params: &Params) -> i64 {
        params
            .get(PAGE_PARAM)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1)
    }

    pub async fn render_page(&self, page: i64) -> ContentPayload {
        let listing = self.catalog.get_page(page);
        tracing::debug!(
            requested = page,
            page = listing.current_page,
            total = listing.total_pages,
            "rendering listing page"
        );

        let body = format!(
            r#"<section class="section body"><div class="container">{}</div></section>"#,
            render_gazette_section(&listing)
        );

        let header = match &self.shell {
            Some(provider) => match provider.fetch_page_content("/").await {
                Ok(root) => root.header_content,
                // 头部取不到不影响列表本身
                Err(err) => {
                    tracing::warn!(error = %err, "listing header unavailable");
                    None
                }
            },
            None => None,
        };

        ContentPayload {
            header_content: header,
            body_content: Some(body),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> RouteLoader for ListingLoader<C> {
    async fn load(&self, params: &Params) -> SiteResult<ContentPayload> {
        Ok(self.render_page(Self::page_from_params(params)).await)
    }
}
