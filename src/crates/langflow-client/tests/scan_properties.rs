//! Property tests for the free-text fallback scanner

use langflow_client::scan_text;
use proptest::prelude::*;

proptest! {
    #[test]
    fn day_counts_are_found(days in 0u32..100_000, unit in prop::sample::select(vec!["day", "days", "Days", "DAY"])) {
        let text = format!("Could I please book {} {} off?", days, unit);
        prop_assert_eq!(scan_text(&text).days_requested, Some(days));
    }

    #[test]
    fn date_pairs_are_start_and_end(
        y1 in 2000u32..2100, m1 in 1u32..13, d1 in 1u32..29,
        y2 in 2000u32..2100, m2 in 1u32..13, d2 in 1u32..29,
    ) {
        let start = format!("{:04}-{:02}-{:02}", y1, m1, d1);
        let end = format!("{:04}-{:02}-{:02}", y2, m2, d2);
        let data = scan_text(&format!("off from {} until {}, thanks", start, end));

        prop_assert_eq!(data.start_date, Some(start));
        prop_assert_eq!(data.end_date, Some(end));
    }

    #[test]
    fn dates_come_in_pairs(text in ".{0,200}") {
        let data = scan_text(&text);
        prop_assert_eq!(data.start_date.is_some(), data.end_date.is_some());
        prop_assert!(data.employee_name.is_none());
        prop_assert!(data.leave_balance.is_none());
    }

    #[test]
    fn leave_type_is_normalised(kind in prop::sample::select(vec!["Vacation", "SICK", "personal"])) {
        let data = scan_text(&format!("Requesting {} leave", kind));
        prop_assert_eq!(data.leave_type, Some(kind.to_lowercase()));
    }
}
