use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// 後端週報的區間：週六 00:00 到週五 23:59:59.999
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WeekRange {
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// 與後端相同的報表 id，例如 `weekly-2025-02-15`
    pub fn report_id(&self) -> String {
        format!("weekly-{}", self.start.format("%Y-%m-%d"))
    }
}

/// 週五歸到隔天開始的那一週，週六為當週起點，其餘日期回推到上一個週六
pub fn week_range(date: NaiveDate) -> WeekRange {
    let day = date.weekday().num_days_from_sunday() as i64;
    let offset = match day {
        5 => 1,
        6 => 0,
        _ => -(day + 1),
    };

    let start_date = date + Duration::days(offset);
    let start = start_date.and_time(NaiveTime::MIN);
    let end = (start_date + Duration::days(6)).and_time(end_of_day());

    WeekRange { start, end }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}
