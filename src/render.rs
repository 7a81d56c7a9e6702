//! 公报列表的 HTML 渲染
//!
//! 所有插入的文本与属性值都经过转义。

use kozlony_shared::{Gazette, ListingPage};

use crate::paginator::{page_href, PageItem, PaginatorState};

const MORE_GAZETTES: &str = "További Közlönyök";
const LATEST_GAZETTES: &str = "Legfrissebb Közlönyök";
const ABOUT_TEXT: &str = "A Magyar Közlöny Magyarország hivatalos lapja, amelyben a jogszabályokat és \
más fontos állami döntéseket és közleményeket hirdetnek ki. A Magyar Közlöny digitálisan aláírt és \
időbélyegzővel ellátott, ez garantálja tartalmának hitelességét és eredetiségét.";

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

pub fn render_card(gazette: &Gazette) -> String {
    let pdf = escape_html(&gazette.pdf_url);
    format!(
        concat!(
            r#"<div class="card"><div class="gazette-card-content">"#,
            r#"<div class="gazette-card-header">"#,
            r#"<a href="{pdf}" class="gazette-title-link">{title}</a>"#,
            r#"<p class="bodysmallregular">{date}</p>"#,
            r#"<a href="{pdf}" class="button-outline inline-block"><span class="button-label">PDF letöltése</span><div class="high-contrast-mode-border-2"></div></a>"#,
            r#"</div>"#,
            r#"<div class="gazette-card-actions">"#,
            r#"<a href="{reasons}" class="gazette-action-link"><span class="link-text-small">Indoklás(ok)</span><i class="ri-arrow-right-line action-icon"></i></a>"#,
            r#"<a href="{attachments}" class="gazette-action-link"><span class="link-text-small">Melléklet(ek)</span><i class="ri-arrow-right-line action-icon"></i></a>"#,
            r#"</div></div></div>"#,
        ),
        pdf = pdf,
        title = escape_html(&gazette.title),
        date = escape_html(&gazette.date_label),
        reasons = escape_html(&gazette.reasons_url),
        attachments = escape_html(&gazette.attachments_url),
    )
}

/// 精选区，仅第 1 页有
pub fn render_featured_section(featured: Option<&Gazette>) -> String {
    let Some(gazette) = featured else {
        return String::new();
    };
    format!(
        concat!(
            r#"<div class="flex-column listing">"#,
            r#"<h2 class="h2 inverse desktop-only">{latest}</h2>"#,
            r#"<h2 class="h2 inverse mobile-only">{more}</h2>"#,
            r#"<div class="new-gazettes-desktop flex-column list-items">{card}</div>"#,
            r#"</div>"#,
            r#"<h2 class="h2 desktop-only">{more}</h2>"#,
        ),
        latest = LATEST_GAZETTES,
        more = MORE_GAZETTES,
        card = render_card(gazette),
    )
}

pub fn render_list(gazettes: &[Gazette]) -> String {
    gazettes
        .iter()
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_paginator(state: &PaginatorState) -> String {
    let mut out = String::from(r#"<div class="paginator">"#);

    out.push_str(&nav_button(
        "prev",
        "Previous page",
        "ri-arrow-left-s-line",
        state.has_prev(),
        state.current_page.saturating_sub(1),
    ));

    for item in state.items() {
        match item {
            PageItem::Ellipsis => {
                out.push_str(r#"<span class="paginator-page ellipsis">...</span>"#);
            }
            PageItem::Page(page) if page == state.current_page => {
                out.push_str(&format!(
                    r#"<a href="{}" class="paginator-page active" aria-current="page" data-page="{}">{}</a>"#,
                    page_href(page),
                    page,
                    page
                ));
            }
            PageItem::Page(page) => {
                out.push_str(&format!(
                    r#"<a href="{}" class="paginator-page" data-page="{}">{}</a>"#,
                    page_href(page),
                    page,
                    page
                ));
            }
        }
    }

    out.push_str(&nav_button(
        "next",
        "Next page",
        "ri-arrow-right-s-line",
        state.has_next(),
        state.current_page + 1,
    ));

    out.push_str("</div>");
    out
}

fn nav_button(kind: &str, label: &str, icon: &str, enabled: bool, target: usize) -> String {
    let (class, disabled) = if enabled {
        ("enabled", "")
    } else {
        ("disabled", " disabled")
    };
    format!(
        r#"<button class="paginator-button {kind} {class}"{disabled} aria-label="{label}" data-page="{target}"><i class="{icon}"></i></button>"#,
    )
}

/// 完整的列表区：精选、列表、分页器与侧栏
pub fn render_gazette_section(page: &ListingPage) -> String {
    let heading = match &page.featured_item {
        Some(featured) => render_featured_section(Some(featured)),
        None => format!(r#"<h2 class="h2 inverse">{}</h2>"#, MORE_GAZETTES),
    };

    format!(
        concat!(
            r#"<div class="flex-column content">"#,
            r#"<div class="gasette-listing">{heading}"#,
            r#"<div class="flex-column listing">"#,
            r#"<div class="flex-column list-items">{list}</div>"#,
            r#"{paginator}"#,
            r#"</div></div>"#,
            r#"<div class="sidebar"><div class="callout blue">"#,
            r#"<i class="ri-information-fill callout-icon"></i>"#,
            r#"<div class="callout-content"><p class="callout-text">{about}</p>"#,
            r#"<a href="jogszabalyi-hatter.html" class="callout-action">További információk</a>"#,
            r#"</div></div></div>"#,
            r#"</div>"#,
        ),
        heading = heading,
        list = render_list(&page.items),
        paginator = render_paginator(&PaginatorState::from_listing(page)),
        about = ABOUT_TEXT,
    )
}
