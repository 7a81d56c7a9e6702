//! 导航菜单高亮的 DOM 绑定

use kozlony::widgets::{menu_item_state, MenuItemState, Widget, WidgetFactory, WidgetScope};
use wasm_bindgen::JsValue;
use web_sys::Element;

use crate::web::{dom, Listeners};

const MENU_ITEM_SELECTORS: &str = ".main-menu-items, .menu-item, .menu-item-mobile";

fn href_of(item: &Element) -> Option<String> {
    item.get_attribute("href")
        .or_else(|| dom::query_in(item, "a").and_then(|a| a.get_attribute("href")))
}

fn apply_state(item: &Element, state: MenuItemState) {
    let active = state == MenuItemState::Active;
    dom::toggle_class(item, "active", active);
    dom::toggle_class(item, "default", !active);
    dom::toggle_class(item, "hover", false);
    let _ = item.set_attribute("data-state", state.as_str());
}

struct NavHighlightWidget {
    listeners: Listeners,
}

impl Widget for NavHighlightWidget {
    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

pub struct NavHighlightFactory;

impl WidgetFactory for NavHighlightFactory {
    fn name(&self) -> &str {
        "navigation-state"
    }

    // 当前路径随导航变化，所以每次导航后重新计算
    fn scope(&self) -> WidgetScope {
        WidgetScope::Page
    }

    fn create(&self) -> Option<Box<dyn Widget>> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let items = dom::query_all(&document, MENU_ITEM_SELECTORS);
        if items.is_empty() {
            tracing::warn!("no menu items found");
            return None;
        }

        let current_path = window.location().pathname().unwrap_or_else(|_| "/".into());
        for item in &items {
            let state = href_of(item)
                .map(|href| menu_item_state(&href, &current_path))
                .unwrap_or(MenuItemState::Default);
            apply_state(item, state);
        }

        let mut listeners = Listeners::new();
        for item in &items {
            let hovered = item.clone();
            listeners.add(item, "mouseenter", move |_| {
                if !hovered.class_list().contains("active") {
                    dom::toggle_class(&hovered, "hover", true);
                }
            });

            let hovered = item.clone();
            listeners.add(item, "mouseleave", move |_| {
                dom::toggle_class(&hovered, "hover", false);
            });

            // 页内锚点：高亮并平滑滚动，其余链接交给路由器
            let Some(hash) = item.get_attribute("href").filter(|h| h.starts_with('#')) else {
                continue;
            };
            let all = items.clone();
            let clicked = item.clone();
            listeners.add(item, "click", move |e| {
                e.prevent_default();
                for other in &all {
                    apply_state(other, MenuItemState::Default);
                }
                apply_state(&clicked, MenuItemState::Active);

                if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
                    let _ = history.push_state_with_url(&JsValue::NULL, "", Some(&hash));
                }
                if let Some(section) = dom::document()
                    .and_then(|d| d.query_selector(&hash).ok().flatten())
                {
                    section.scroll_into_view();
                }
            });
        }

        tracing::debug!(count = items.len(), "navigation state applied");
        Some(Box::new(NavHighlightWidget { listeners }))
    }
}
