//! 片段提取
//!
//! 从服务端渲染的完整 HTML 文档中取出头部动态区与主体区，
//! 供路由写入两个挂载点。

use crate::content::ContentPayload;
use crate::html::{self, Document, Element, Node, Selector};

/// 主体区的候选容器，按优先级排列
fn main_selectors() -> [Selector; 5] {
    [
        Selector::class("main-content"),
        Selector::tag("main"),
        Selector::attr("role", "main"),
        Selector::id("main"),
        Selector::class("content-wrapper"),
    ]
}

/// 兜底提取时从 body 中移除的壳层元素
fn shell_selectors() -> [Selector; 7] {
    [
        Selector::tag("header"),
        Selector::tag("footer"),
        Selector::class("mobile-menu"),
        Selector::class("section").and_class("header"),
        Selector::class("section").and_class("footer"),
        Selector::tag("nav"),
        Selector::tag("script"),
    ]
}

/// 提取头部与主体片段
///
/// 两个字段总是 `Some`：找不到对应区域时为空字符串，写入时会清空挂载点。
pub fn extract_content(html: &str) -> ContentPayload {
    let doc = Document::parse(html);
    ContentPayload {
        header_content: Some(extract_header(&doc)),
        body_content: Some(extract_body(&doc)),
    }
}

/// `.secondary-nav` 之后、`img.justicia` 之前的兄弟元素
fn extract_header(doc: &Document) -> String {
    let header_section = Selector::tag("section").and_class("section").and_class("header");
    let Some(section) = doc.find(&header_section) else {
        return String::new();
    };
    let Some(container) = html::find(&section.children, &Selector::class("container")) else {
        return String::new();
    };
    let Some((siblings, index)) =
        html::find_with_siblings(&container.children, &Selector::class("secondary-nav"))
    else {
        return String::new();
    };

    let stop = Selector::tag("img").and_class("justicia");
    siblings[index + 1..]
        .iter()
        .filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
        .take_while(|el| !stop.matches(el))
        .map(Element::outer_html)
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_body(doc: &Document) -> String {
    let body_section = Selector::tag("section").and_class("section").and_class("body");
    if let Some(section) = doc.find(&body_section) {
        return section.outer_html();
    }

    let from_main = main_selectors()
        .iter()
        .find_map(|selector| doc.find(selector))
        .map(Element::inner_html)
        .unwrap_or_default();
    if !from_main.is_empty() {
        return from_main;
    }

    // 没有 <body> 时把整个文档视为 body
    let mut nodes = match doc.body() {
        Some(body) => body.children.clone(),
        None => doc.nodes.clone(),
    };
    html::remove_matching(&mut nodes, &shell_selectors());
    html::serialize(&nodes)
}
