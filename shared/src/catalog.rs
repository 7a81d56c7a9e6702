//! 公报目录模块
//!
//! 启动时按固定数量与每日一期的节奏生成公报记录，然后倒序排列（最新在前）。
//! 目录生成后不可变，分页查询只做切片。

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date::format_long;

// =========================================================
// 配置 (Configuration)
// =========================================================

/// 目录生成参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    /// 每页条数
    pub items_per_page: usize,
    /// 公报总数
    pub total_items: usize,
    /// 第一期的期号
    pub start_number: u32,
    /// 第一期的发布日期
    pub start_date: NaiveDate,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            items_per_page: 10,
            total_items: 150,
            start_number: 21,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
        }
    }
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 单期公报
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gazette {
    pub id: u32,
    pub title: String,
    pub date: NaiveDate,
    /// 匈牙利语长格式日期，直接用于展示与搜索
    pub date_label: String,
    pub year: i32,
    pub number: u32,
    pub pdf_url: String,
    pub reasons_url: String,
    pub attachments_url: String,
}

/// 一页列表数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    /// 本页常规条目（第 1 页不含精选条目）
    pub items: Vec<Gazette>,
    /// 精选条目，仅第 1 页存在
    pub featured_item: Option<Gazette>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

// =========================================================
// 目录 (Catalog)
// =========================================================

/// 公报目录
#[derive(Debug, Clone)]
pub struct GazetteCatalog {
    items_per_page: usize,
    gazettes: Vec<Gazette>,
}

impl GazetteCatalog {
    /// 按配置生成目录
    pub fn generate(config: &CatalogConfig) -> Self {
        let year = config.start_date.year();
        let mut gazettes: Vec<Gazette> = (0..config.total_items)
            .map(|i| {
                let number = config.start_number + i as u32;
                let date = config
                    .start_date
                    .checked_add_days(Days::new(i as u64))
                    .unwrap_or(config.start_date);

                Gazette {
                    id: i as u32 + 1,
                    title: format!("Magyar Közlöny {}. évi {}. szám", year, number),
                    date,
                    date_label: format_long(date),
                    year,
                    number,
                    pdf_url: format!("#gazette-{}", number),
                    reasons_url: format!("#reasons-{}", number),
                    attachments_url: format!("#attachments-{}", number),
                }
            })
            .collect();

        // 最新在前
        gazettes.reverse();

        tracing::debug!(count = gazettes.len(), "generated gazette catalog");

        Self {
            items_per_page: config.items_per_page.max(1),
            gazettes,
        }
    }

    pub fn len(&self) -> usize {
        self.gazettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gazettes.is_empty()
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// 总页数，至少为 1
    pub fn total_pages(&self) -> usize {
        self.gazettes.len().div_ceil(self.items_per_page).max(1)
    }

    /// 获取指定页，页码会被限制在 `[1, total_pages]` 内
    pub fn get_page(&self, page: i64) -> ListingPage {
        let total_pages = self.total_pages();
        let current_page = page.clamp(1, total_pages as i64) as usize;

        let start = (current_page - 1) * self.items_per_page;
        let end = (start + self.items_per_page).min(self.gazettes.len());
        let mut items = self
            .gazettes
            .get(start..end)
            .map(<[Gazette]>::to_vec)
            .unwrap_or_default();

        // 第 1 页的首条单独作为精选条目展示
        let featured_item = if current_page == 1 && !items.is_empty() {
            Some(items.remove(0))
        } else {
            None
        };

        ListingPage {
            items,
            featured_item,
            current_page,
            total_pages,
            total_items: self.gazettes.len(),
            items_per_page: self.items_per_page,
            has_next_page: current_page < total_pages,
            has_prev_page: current_page > 1,
        }
    }

    pub fn get_all(&self) -> &[Gazette] {
        &self.gazettes
    }

    pub fn get_by_id(&self, id: u32) -> Option<&Gazette> {
        self.gazettes.iter().find(|g| g.id == id)
    }

    pub fn get_by_number(&self, number: u32) -> Option<&Gazette> {
        self.gazettes.iter().find(|g| g.number == number)
    }

    /// 按标题或日期做不区分大小写的子串搜索
    pub fn search(&self, query: &str) -> Vec<&Gazette> {
        let query = query.to_lowercase();
        self.gazettes
            .iter()
            .filter(|g| {
                g.title.to_lowercase().contains(&query)
                    || g.date_label.to_lowercase().contains(&query)
            })
            .collect()
    }
}

impl Default for GazetteCatalog {
    fn default() -> Self {
        Self::generate(&CatalogConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_reverse_chronological() {
        let catalog = GazetteCatalog::default();
        let all = catalog.get_all();

        assert_eq!(all.len(), 150);
        assert_eq!(all[0].number, 170);
        assert_eq!(all[0].id, 150);
        assert_eq!(all[0].date_label, "2025. május 30.");
        assert_eq!(all[149].number, 21);
        assert_eq!(all[149].date_label, "2025. január 1.");
        assert!(all.windows(2).all(|w| w[0].date > w[1].date));
    }

    #[test]
    fn test_first_page_has_featured_item() {
        let catalog = GazetteCatalog::default();
        let page = catalog.get_page(1);

        assert_eq!(page.featured_item.as_ref(), Some(&catalog.get_all()[0]));
        assert_eq!(page.items.len(), 9);
        assert_eq!(page.items[0], catalog.get_all()[1]);
        assert_eq!(page.total_pages, 15);
        assert!(!page.has_prev_page);
        assert!(page.has_next_page);
    }

    #[test]
    fn test_last_page() {
        let catalog = GazetteCatalog::default();
        let page = catalog.get_page(15);

        assert!(page.featured_item.is_none());
        assert_eq!(page.items.as_slice(), &catalog.get_all()[140..150]);
        assert!(!page.has_next_page);
        assert!(page.has_prev_page);
    }

    #[test]
    fn test_page_number_is_clamped() {
        let catalog = GazetteCatalog::default();

        assert_eq!(catalog.get_page(0).current_page, 1);
        assert!(catalog.get_page(0).featured_item.is_some());
        assert_eq!(catalog.get_page(-3).current_page, 1);
        assert_eq!(catalog.get_page(16).current_page, 15);
    }

    #[test]
    fn test_middle_page_has_full_slice() {
        let catalog = GazetteCatalog::default();
        let page = catalog.get_page(2);

        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0], catalog.get_all()[10]);
        assert!(page.featured_item.is_none());
    }

    #[test]
    fn test_empty_catalog_has_one_page() {
        let config = CatalogConfig {
            total_items: 0,
            ..CatalogConfig::default()
        };
        let catalog = GazetteCatalog::generate(&config);
        let page = catalog.get_page(3);

        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert!(page.items.is_empty());
        assert!(page.featured_item.is_none());
    }

    #[test]
    fn test_lookup_and_search() {
        let catalog = GazetteCatalog::default();

        assert_eq!(catalog.get_by_number(21).map(|g| g.id), Some(1));
        assert_eq!(catalog.get_by_id(150).map(|g| g.number), Some(170));
        assert!(catalog.get_by_id(151).is_none());

        let hits = catalog.search("ÉVI 42.");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].number, 42);

        // 1 月份共 31 期
        assert_eq!(catalog.search("január").len(), 31);
    }
}
