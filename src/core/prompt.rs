//! Generation prompt with recent diary history
//!
//! Past entries give the model continuity: it can describe what changed
//! since the previous photos instead of starting from scratch each time.

use std::fmt::Write as _;

use chrono::{DateTime, Months, Utc};

use crate::core::types::DiaryEntry;
use crate::utils::Timezone;

pub(crate) const BASE_PROMPT: &str = "この植物の写真を見て、成長の様子や変化を観察してください。親しみやすい口調で、200文字程度の観察日記を書いてください。";

const HISTORY_INTRO: &str = "参考までに、過去1ヶ月の観察記録を以下に示します：";
const HISTORY_OUTRO: &str = "これまでの観察記録を踏まえて、今回の写真から見られる成長の変化や特徴を記述してください。";
const HEADER_DATE_FORMAT: &str = "%Y年%m月%d日";

/// Most recent entries kept in a prompt; older ones are dropped.
pub(crate) const MAX_PAST_ENTRIES: usize = 30;

/// Build the prompt for a new image. `past` must be ascending by `created_at`.
pub(crate) fn build_prompt(past: &[DiaryEntry], timezone: Timezone) -> String {
    if past.is_empty() {
        return BASE_PROMPT.to_string();
    }

    let recent = &past[past.len().saturating_sub(MAX_PAST_ENTRIES)..];

    let mut prompt = String::with_capacity(BASE_PROMPT.len() + recent.len() * 256);
    prompt.push_str(BASE_PROMPT);
    prompt.push_str("\n\n");
    prompt.push_str(HISTORY_INTRO);
    prompt.push_str("\n\n");
    for entry in recent {
        let local = timezone.to_fixed_offset(entry.created_at);
        let _ = write!(
            prompt,
            "【{}】\n{}\n\n",
            local.format(HEADER_DATE_FORMAT),
            entry.content
        );
    }
    prompt.push_str(HISTORY_OUTRO);
    prompt
}

/// History range for an image captured at `captured_at`: the month before
/// the capture day, ending (exclusive) at that day's local midnight.
pub(crate) fn lookback_window(
    captured_at: DateTime<Utc>,
    timezone: Timezone,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = timezone.start_of_day(captured_at);
    let start = timezone
        .to_fixed_offset(end)
        .checked_sub_months(Months::new(1))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(id: i64, content: &str, created_at: DateTime<Utc>) -> DiaryEntry {
        DiaryEntry {
            id,
            image_path: format!("/path/{id}.jpg"),
            content: content.to_string(),
            created_at,
        }
    }

    #[test]
    fn empty_history_returns_base_prompt_verbatim() {
        assert_eq!(build_prompt(&[], Timezone::default()), BASE_PROMPT);
    }

    #[test]
    fn history_is_rendered_with_local_dates() {
        // 2026-01-20 11:10 UTC is 20:10 in UTC+9; 2026-01-31 16:00 UTC is already Feb 1
        let past = vec![
            entry(1, "新しい芽が出ました。", Utc.with_ymd_and_hms(2026, 1, 20, 11, 10, 0).unwrap()),
            entry(2, "葉が大きく成長しています。", Utc.with_ymd_and_hms(2026, 1, 31, 16, 0, 0).unwrap()),
        ];

        let prompt = build_prompt(&past, Timezone::default());

        assert!(prompt.starts_with(BASE_PROMPT));
        assert!(prompt.contains("過去1ヶ月の観察記録"));
        assert!(prompt.contains("【2026年01月20日】\n新しい芽が出ました。"));
        assert!(prompt.contains("【2026年02月01日】\n葉が大きく成長しています。"));
        assert!(prompt.ends_with(HISTORY_OUTRO));
        let first = prompt.find("新しい芽").unwrap();
        let second = prompt.find("葉が大きく").unwrap();
        assert!(first < second);
    }

    #[test]
    fn keeps_only_most_recent_thirty_in_order() {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let past: Vec<_> = (0..40)
            .map(|i| entry(i, &format!("diary-{i:02}"), base + Duration::hours(i)))
            .collect();

        let prompt = build_prompt(&past, Timezone::default());

        for i in 0..10 {
            assert!(!prompt.contains(&format!("diary-{i:02}")), "diary-{i:02} should be dropped");
        }
        let mut last = 0;
        for i in 10..40 {
            let pos = prompt
                .find(&format!("diary-{i:02}"))
                .unwrap_or_else(|| panic!("diary-{i:02} missing"));
            assert!(pos > last, "diary-{i:02} out of order");
            last = pos;
        }
    }

    #[test]
    fn exactly_thirty_entries_are_all_kept() {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let past: Vec<_> = (0..30)
            .map(|i| entry(i, &format!("diary-{i:02}"), base + Duration::hours(i)))
            .collect();

        let prompt = build_prompt(&past, Timezone::default());
        assert!(prompt.contains("diary-00"));
        assert!(prompt.contains("diary-29"));
    }

    #[test]
    fn lookback_window_ends_at_local_midnight() {
        // 2026-02-16 11:10 UTC is 20:10 on the 16th in UTC+9
        let captured = Utc.with_ymd_and_hms(2026, 2, 16, 11, 10, 0).unwrap();
        let (start, end) = lookback_window(captured, Timezone::default());

        assert_eq!(end, Utc.with_ymd_and_hms(2026, 2, 15, 15, 0, 0).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 15, 15, 0, 0).unwrap());
    }

    #[test]
    fn lookback_window_clamps_short_months() {
        // 2026-03-31 local day; one month earlier clamps to Feb 28
        let captured = Utc.with_ymd_and_hms(2026, 3, 31, 3, 0, 0).unwrap();
        let (start, end) = lookback_window(captured, Timezone::default());

        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 30, 15, 0, 0).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 2, 27, 15, 0, 0).unwrap());
    }
}
