//! 路由表与路径工具
//!
//! 路由按注册顺序保存；精确匹配优先于参数化匹配，与注册顺序无关。

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use regex::Regex;

use crate::content::ContentPayload;
use crate::error::{SiteError, SiteResult};

/// 路由参数：参数名 → 原始字符串值
pub type Params = HashMap<String, String>;

/// 路由内容加载器
#[async_trait::async_trait(?Send)]
pub trait RouteLoader {
    async fn load(&self, params: &Params) -> SiteResult<ContentPayload>;
}

/// 固定内容，直接返回预先给定的片段
#[async_trait::async_trait(?Send)]
impl RouteLoader for ContentPayload {
    async fn load(&self, _params: &Params) -> SiteResult<ContentPayload> {
        Ok(self.clone())
    }
}

// =========================================================
// 路由定义
// =========================================================

/// 注册路由时提供的元数据
#[derive(Clone)]
pub struct RouteConfig {
    pub name: String,
    pub title: String,
    /// 内容由代码生成而不是取自静态文档
    pub is_dynamic: bool,
    pub loader: Rc<dyn RouteLoader>,
}

impl RouteConfig {
    pub fn new(name: &str, title: &str, loader: Rc<dyn RouteLoader>) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            is_dynamic: false,
            loader,
        }
    }

    pub fn dynamic(mut self) -> Self {
        self.is_dynamic = true;
        self
    }
}

/// 编译后的参数化模式
#[derive(Debug, Clone)]
struct PatternMatcher {
    regex: Regex,
    names: Vec<String>,
}

impl PatternMatcher {
    /// 每个 `:name` 段编译为 `([^/]+)`，其余字面量转义
    fn compile(pattern: &str) -> SiteResult<Self> {
        let mut names = Vec::new();
        let segments: Vec<String> = pattern
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => {
                    names.push(name.to_string());
                    "([^/]+)".to_string()
                }
                None => regex::escape(segment),
            })
            .collect();

        let source = format!("^{}$", segments.join("/"));
        let regex = Regex::new(&source).map_err(|e| {
            SiteError::invalid_config(format!("Invalid route pattern: {}", pattern))
                .with_source(e)
                .in_op_with("route.compile", pattern)
        })?;

        Ok(Self { regex, names })
    }

    fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let params = self
            .names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| caps.get(i + 1).map(|m| (name.clone(), m.as_str().to_string())))
            .collect();
        Some(params)
    }
}

/// 已注册的路由
#[derive(Clone)]
pub struct Route {
    pub pattern: String,
    pub name: String,
    pub title: String,
    pub is_dynamic: bool,
    pub loader: Rc<dyn RouteLoader>,
    matcher: Option<PatternMatcher>,
}

impl Route {
    pub fn is_parametrized(&self) -> bool {
        self.matcher.is_some()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .field("title", &self.title)
            .field("is_dynamic", &self.is_dynamic)
            .field("is_parametrized", &self.is_parametrized())
            .finish_non_exhaustive()
    }
}

/// 匹配结果
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Route,
    pub params: Params,
}

// =========================================================
// 路由表
// =========================================================

#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    // pattern → routes 下标
    index: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册路由；同一模式重复注册时原位替换
    pub fn add_route(&mut self, pattern: &str, config: RouteConfig) -> SiteResult<()> {
        let pattern = normalize_path(pattern);
        let matcher = if pattern.split('/').any(|s| s.starts_with(':')) {
            Some(PatternMatcher::compile(&pattern)?)
        } else {
            None
        };

        let route = Route {
            pattern: pattern.clone(),
            name: config.name,
            title: config.title,
            is_dynamic: config.is_dynamic,
            loader: config.loader,
            matcher,
        };

        match self.index.get(&pattern) {
            Some(&i) => {
                tracing::debug!(pattern = %pattern, "replacing route");
                self.routes[i] = route;
            }
            None => {
                self.index.insert(pattern, self.routes.len());
                self.routes.push(route);
            }
        }
        Ok(())
    }

    pub fn add_routes<I>(&mut self, routes: I) -> SiteResult<()>
    where
        I: IntoIterator<Item = (String, RouteConfig)>,
    {
        for (pattern, config) in routes {
            self.add_route(&pattern, config)?;
        }
        Ok(())
    }

    pub fn match_route(&self, path: &str) -> Option<RouteMatch> {
        let path = normalize_path(path);

        if let Some(route) = self
            .index
            .get(&path)
            .map(|&i| &self.routes[i])
            .filter(|r| !r.is_parametrized())
        {
            return Some(RouteMatch {
                route: route.clone(),
                params: Params::new(),
            });
        }

        self.routes.iter().find_map(|route| {
            let params = route.matcher.as_ref()?.captures(&path)?;
            Some(RouteMatch {
                route: route.clone(),
                params,
            })
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn clear(&mut self) {
        self.routes.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// =========================================================
// 路径工具
// =========================================================

/// 把链接中的文档路径转换为路由路径：`./rss.html?x#y` → `/rss`
pub fn html_path_to_route_path(href: &str) -> String {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let path = path
        .strip_prefix("./")
        .or_else(|| path.strip_prefix('/'))
        .unwrap_or(path);

    if path.is_empty() || path == "index.html" {
        return "/".to_string();
    }

    let path = path.strip_suffix(".html").unwrap_or(path);
    format!("/{}", path)
}

/// 路由路径的规范形式：以 `/` 开头，除根路径外不以 `/` 结尾
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() || path == "index.html" || path == "/index.html" {
        return "/".to_string();
    }
    if path.contains(".html") {
        return html_path_to_route_path(path);
    }

    let mut normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// 页面标识，写入 `data-current-page`
pub fn page_identifier(path: &str) -> String {
    match path {
        "/" => "index".to_string(),
        _ => path.strip_prefix('/').unwrap_or(path).to_string(),
    }
}
