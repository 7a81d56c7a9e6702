//! 下拉选择框
//!
//! 键盘操作：
//! - 触发按钮：Enter / Space / 方向键打开，方向键同时聚焦第一项；Escape 关闭
//! - 选项：ArrowDown / ArrowUp 循环移动，Home / End 跳到首尾，
//!   Enter / Space 选中，Escape 关闭，Tab 关闭但不阻止默认行为

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownItem {
    pub value: String,
    pub label: String,
}

impl DropdownItem {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownKey {
    ArrowDown,
    ArrowUp,
    Home,
    End,
    Enter,
    Space,
    Escape,
    Tab,
    Other,
}

impl DropdownKey {
    /// 由 `KeyboardEvent.key` 转换
    pub fn from_key(key: &str) -> Self {
        match key {
            "ArrowDown" => DropdownKey::ArrowDown,
            "ArrowUp" => DropdownKey::ArrowUp,
            "Home" => DropdownKey::Home,
            "End" => DropdownKey::End,
            "Enter" => DropdownKey::Enter,
            " " | "Spacebar" => DropdownKey::Space,
            "Escape" | "Esc" => DropdownKey::Escape,
            "Tab" => DropdownKey::Tab,
            _ => DropdownKey::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dropdown {
    items: Vec<DropdownItem>,
    open: bool,
    focused: Option<usize>,
    selected: usize,
}

impl Dropdown {
    /// 初始选中与 `initial_value` 相同的选项，否则第一项
    pub fn new(items: Vec<DropdownItem>, initial_value: Option<&str>) -> Self {
        let selected = initial_value
            .and_then(|v| items.iter().position(|i| i.value == v))
            .unwrap_or(0);
        Self {
            items,
            open: false,
            focused: None,
            selected,
        }
    }

    pub fn items(&self) -> &[DropdownItem] {
        &self.items
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn value(&self) -> Option<&str> {
        self.items.get(self.selected).map(|i| i.value.as_str())
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.items.get(self.selected).map(|i| i.label.as_str())
    }

    /// 打开并聚焦已选项
    pub fn open(&mut self) {
        self.open = true;
        self.focused = (!self.items.is_empty()).then_some(self.selected);
    }

    /// 返回是否确实关闭了
    pub fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.focused = None;
        true
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn focus(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.focused = Some(index);
        true
    }

    /// 选中并关闭
    pub fn select(&mut self, index: usize) -> Option<&DropdownItem> {
        if index >= self.items.len() {
            return None;
        }
        self.selected = index;
        self.close();
        self.items.get(index)
    }

    /// 按值选中；没有该值时返回 `false`
    pub fn set_value(&mut self, value: &str) -> bool {
        match self.items.iter().position(|i| i.value == value) {
            Some(index) => {
                self.select(index);
                true
            }
            None => false,
        }
    }

    /// 触发按钮上的按键；返回是否应阻止默认行为
    pub fn handle_trigger_key(&mut self, key: DropdownKey) -> bool {
        match key {
            DropdownKey::Enter | DropdownKey::Space | DropdownKey::ArrowDown | DropdownKey::ArrowUp => {
                if !self.open {
                    self.open();
                }
                if matches!(key, DropdownKey::ArrowDown | DropdownKey::ArrowUp) {
                    self.focus(0);
                }
                true
            }
            DropdownKey::Escape => self.close(),
            _ => false,
        }
    }

    /// 选项上的按键；返回是否应阻止默认行为
    pub fn handle_item_key(&mut self, key: DropdownKey) -> bool {
        let len = self.items.len();
        if len == 0 {
            return false;
        }
        let current = self.focused.unwrap_or(self.selected);

        match key {
            DropdownKey::ArrowDown => {
                self.focus((current + 1) % len);
                true
            }
            DropdownKey::ArrowUp => {
                self.focus((current + len - 1) % len);
                true
            }
            DropdownKey::Home => {
                self.focus(0);
                true
            }
            DropdownKey::End => {
                self.focus(len - 1);
                true
            }
            DropdownKey::Enter | DropdownKey::Space => {
                self.select(current);
                true
            }
            DropdownKey::Escape => {
                self.close();
                true
            }
            DropdownKey::Tab => {
                self.close();
                false
            }
            DropdownKey::Other => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(initial: Option<&str>) -> Dropdown {
        Dropdown::new(
            vec![
                DropdownItem::new("all", "Összes"),
                DropdownItem::new("2025", "2025"),
                DropdownItem::new("2024", "2024"),
            ],
            initial,
        )
    }

    #[test]
    fn test_initial_selection() {
        assert_eq!(sample(None).value(), Some("all"));
        assert_eq!(sample(Some("2024")).selected_index(), 2);
        assert_eq!(sample(Some("1999")).selected_index(), 0);
        assert_eq!(Dropdown::new(Vec::new(), None).value(), None);
    }

    #[test]
    fn test_open_focuses_selected() {
        let mut dd = sample(Some("2025"));
        dd.open();
        assert!(dd.is_open());
        assert_eq!(dd.focused_index(), Some(1));

        assert!(dd.close());
        assert_eq!(dd.focused_index(), None);
        assert!(!dd.close());
    }

    #[test]
    fn test_arrow_keys_wrap() {
        let mut dd = sample(None);
        dd.open();

        assert!(dd.handle_item_key(DropdownKey::ArrowUp));
        assert_eq!(dd.focused_index(), Some(2));
        assert!(dd.handle_item_key(DropdownKey::ArrowDown));
        assert_eq!(dd.focused_index(), Some(0));
        dd.handle_item_key(DropdownKey::End);
        assert_eq!(dd.focused_index(), Some(2));
        dd.handle_item_key(DropdownKey::Home);
        assert_eq!(dd.focused_index(), Some(0));
    }

    #[test]
    fn test_enter_selects_and_closes() {
        let mut dd = sample(None);
        dd.open();
        dd.handle_item_key(DropdownKey::ArrowDown);

        assert!(dd.handle_item_key(DropdownKey::from_key("Enter")));
        assert_eq!(dd.value(), Some("2025"));
        assert_eq!(dd.selected_label(), Some("2025"));
        assert!(!dd.is_open());
    }

    #[test]
    fn test_tab_closes_without_preventing_default() {
        let mut dd = sample(None);
        dd.open();
        assert!(!dd.handle_item_key(DropdownKey::Tab));
        assert!(!dd.is_open());
    }

    #[test]
    fn test_trigger_keys() {
        let mut dd = sample(Some("2024"));

        assert!(dd.handle_trigger_key(DropdownKey::from_key(" ")));
        assert!(dd.is_open());
        assert_eq!(dd.focused_index(), Some(2));

        assert!(dd.handle_trigger_key(DropdownKey::Escape));
        assert!(!dd.is_open());
        assert!(!dd.handle_trigger_key(DropdownKey::Escape));

        dd.handle_trigger_key(DropdownKey::ArrowDown);
        assert_eq!(dd.focused_index(), Some(0));
        assert!(!dd.handle_trigger_key(DropdownKey::from_key("a")));
    }

    #[test]
    fn test_set_value() {
        let mut dd = sample(None);
        assert!(dd.set_value("2024"));
        assert_eq!(dd.value(), Some("2024"));
        assert!(!dd.set_value("nope"));
        assert_eq!(dd.value(), Some("2024"));
        assert!(dd.select(7).is_none());
    }
}
