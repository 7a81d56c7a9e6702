//! 日期工具模块
//!
//! 提供匈牙利语的日期格式化：
//! - `format_long`: 公报列表使用的长格式，如 `2025. január 1.`
//! - `format_iso`: 日期选择器写回输入框的 `YYYY-MM-DD` 格式

use chrono::{Datelike, NaiveDate};

/// 小写月份名（用于长格式日期）
pub const MONTHS: [&str; 12] = [
    "január",
    "február",
    "március",
    "április",
    "május",
    "június",
    "július",
    "augusztus",
    "szeptember",
    "október",
    "november",
    "december",
];

/// 首字母大写的月份名（用于日历标题）
pub const MONTH_TITLES: [&str; 12] = [
    "Január",
    "Február",
    "Március",
    "Április",
    "Május",
    "Június",
    "Július",
    "Augusztus",
    "Szeptember",
    "Október",
    "November",
    "December",
];

/// 星期缩写，周一在前
pub const WEEKDAYS: [&str; 7] = ["H", "K", "Sze", "Cs", "P", "Szo", "V"];

/// 获取月份名（`month` 从 1 开始），越界时返回空字符串
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTHS.get(i as usize))
        .copied()
        .unwrap_or("")
}

/// 获取日历标题用的月份名（`month` 从 1 开始）
pub fn month_title(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_TITLES.get(i as usize))
        .copied()
        .unwrap_or("")
}

/// 长格式：`2025. január 1.`
pub fn format_long(date: NaiveDate) -> String {
    format!(
        "{}. {} {}.",
        date.year(),
        month_name(date.month()),
        date.day()
    )
}

/// ISO 格式：`2025-01-01`
pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 指定月份的天数；非法的年月返回 0
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}
