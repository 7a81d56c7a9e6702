//! 站点页面表

use std::rc::Rc;

use crate::content::{DocumentLoader, PageContentProvider};
use crate::error::SiteResult;
use crate::listing::ListingLoader;
use crate::request::HttpClient;
use crate::route::{normalize_path, RouteConfig, RouteLoader};
use crate::router::{Browser, Router};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefinition {
    pub path: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    /// 服务端渲染的对应文档
    pub document: &'static str,
    /// 内容由列表加载器生成
    pub dynamic: bool,
}

pub const PAGES: &[PageDefinition] = &[
    PageDefinition {
        path: "/",
        name: "index",
        title: "Magyar Közlöny",
        document: "index.html",
        dynamic: true,
    },
    PageDefinition {
        path: "/page/:page",
        name: "index-paginated",
        title: "Magyar Közlöny",
        document: "index.html",
        dynamic: true,
    },
    PageDefinition {
        path: "/tanusitvanyok",
        name: "tanusitvanyok",
        title: "Tanúsítványok - Magyar Közlöny",
        document: "tanusitvanyok.html",
        dynamic: false,
    },
    PageDefinition {
        path: "/segitseg",
        name: "segitseg",
        title: "Segítség - Magyar Közlöny",
        document: "segitseg.html",
        dynamic: false,
    },
    PageDefinition {
        path: "/rss",
        name: "rss",
        title: "RSS - Magyar Közlöny",
        document: "rss.html",
        dynamic: false,
    },
    PageDefinition {
        path: "/impresszum",
        name: "impresszum",
        title: "Impresszum - Magyar Közlöny",
        document: "impresszum.html",
        dynamic: false,
    },
    PageDefinition {
        path: "/kapcsolat",
        name: "kapcsolat",
        title: "Kapcsolat - Magyar Közlöny",
        document: "kapcsolat.html",
        dynamic: false,
    },
    PageDefinition {
        path: "/jogszabalyi-hatter",
        name: "jogszabalyi-hatter",
        title: "Jogszabályi háttér - Magyar Közlöny",
        document: "jogszabalyi-hatter.html",
        dynamic: false,
    },
    PageDefinition {
        path: "/akadalymentesitesi-nyilatkozat",
        name: "akadalymentesitesi-nyilatkozat",
        title: "Akadálymentesítési nyilatkozat - Magyar Közlöny",
        document: "akadalymentesitesi-nyilatkozat.html",
        dynamic: false,
    },
];

pub fn page_by_path(path: &str) -> Option<&'static PageDefinition> {
    let path = normalize_path(path);
    PAGES.iter().find(|p| p.path == path)
}

pub fn page_by_name(name: &str) -> Option<&'static PageDefinition> {
    PAGES.iter().find(|p| p.name == name)
}

/// 把页面表注册到路由器：动态页面用列表加载器，其余走内容提供者
pub fn register_site_routes<B, C>(
    router: &Router<B>,
    provider: &Rc<PageContentProvider<C>>,
    listing: Rc<ListingLoader<C>>,
) -> SiteResult<()>
where
    B: Browser,
    C: HttpClient + 'static,
{
    for page in PAGES {
        let loader: Rc<dyn RouteLoader> = if page.dynamic {
            listing.clone()
        } else {
            Rc::new(DocumentLoader::new(provider.clone(), page.path))
        };

        let mut config = RouteConfig::new(page.name, page.title, loader);
        if page.dynamic {
            config = config.dynamic();
        }
        router.add_route(page.path, config)?;
    }

    tracing::debug!(count = PAGES.len(), "site routes registered");
    Ok(())
}
