//! 日期选择器

use chrono::{Datelike, NaiveDate};
use kozlony_shared::date::{days_in_month, format_iso, month_title, WEEKDAYS};

#[derive(Debug, Clone)]
pub struct DatePicker {
    year: i32,
    /// 1..=12
    month: u32,
    open: bool,
    selected: Option<NaiveDate>,
}

impl DatePicker {
    /// 以 `today` 所在月份为初始可见月份
    pub fn new(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
            open: false,
            selected: None,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// 日历标题，如 `Január 2025`
    pub fn title(&self) -> String {
        format!("{} {}", month_title(self.month), self.year)
    }

    pub fn weekday_labels(&self) -> [&'static str; 7] {
        WEEKDAYS
    }

    pub fn previous_month(&mut self) {
        if self.month == 1 {
            self.month = 12;
            self.year -= 1;
        } else {
            self.month -= 1;
        }
    }

    pub fn next_month(&mut self) {
        if self.month == 12 {
            self.month = 1;
            self.year += 1;
        } else {
            self.month += 1;
        }
    }

    /// 周一开头的月历格子，`None` 为首日之前的空格
    pub fn grid(&self) -> Vec<Option<u32>> {
        let Some(first) = NaiveDate::from_ymd_opt(self.year, self.month, 1) else {
            return Vec::new();
        };
        let leading = first.weekday().num_days_from_monday() as usize;

        std::iter::repeat_n(None, leading)
            .chain((1..=days_in_month(self.year, self.month)).map(Some))
            .collect()
    }

    pub fn is_today(&self, day: u32, today: NaiveDate) -> bool {
        today.year() == self.year && today.month() == self.month && today.day() == day
    }

    /// 选中可见月份中的某天并关闭，返回 `YYYY-MM-DD`
    pub fn select(&mut self, day: u32) -> Option<String> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, day)?;
        self.selected = Some(date);
        self.open = false;
        Some(format_iso(date))
    }
}
