use chrono::{Datelike, Days, Local, NaiveDate};

const PAGE_PREFIX: &str = "street-closures-and-traffic-impacts";

/// Weekly closures page URL for the given publication date.
///
/// The slug follows the site's own convention, e.g. `october-31-2025` or
/// `november-7-2025`: full lowercase month name, unpadded day.
pub fn page_url(base: &str, date: NaiveDate) -> String {
    let month = date.format("%B").to_string().to_lowercase();
    format!(
        "{}/{}-{}-{}-{}/",
        base.trim_end_matches('/'),
        PAGE_PREFIX,
        month,
        date.day(),
        date.year()
    )
}

/// `horizon_weeks` page URLs, starting at `anchor` and stepping 7 days.
pub fn weekly_urls(base: &str, anchor: NaiveDate, horizon_weeks: u32) -> Vec<String> {
    (0..horizon_weeks)
        .map_while(|week| anchor.checked_add_days(Days::new(u64::from(week) * 7)))
        .map(|date| page_url(base, date))
        .collect()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "https://example.gov/closures";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_page_url_format() {
        assert_eq!(
            page_url(BASE, date(2025, 10, 31)),
            "https://example.gov/closures/street-closures-and-traffic-impacts-october-31-2025/"
        );
    }

    #[test]
    fn test_crosses_month_boundary_without_padding() {
        let urls = weekly_urls(BASE, date(2025, 10, 31), 2);
        assert_eq!(urls.len(), 2);
        assert!(urls[0].ends_with("-october-31-2025/"));
        assert!(urls[1].ends_with("-november-7-2025/"));
    }

    #[test]
    fn test_crosses_year_boundary() {
        let urls = weekly_urls(BASE, date(2025, 12, 29), 2);
        assert!(urls[1].ends_with("-january-5-2026/"));
    }

    #[test]
    fn test_zero_horizon() {
        assert!(weekly_urls(BASE, date(2025, 1, 1), 0).is_empty());
    }

    #[test]
    fn test_trailing_slash_on_base() {
        let url = page_url("https://example.gov/closures/", date(2025, 3, 2));
        assert_eq!(
            url,
            "https://example.gov/closures/street-closures-and-traffic-impacts-march-2-2025/"
        );
    }

    proptest! {
        #[test]
        fn test_weekly_urls_properties(
            days in 0u64..40_000,
            horizon in 0u32..60,
        ) {
            let anchor = date(1970, 1, 1) + Days::new(days);
            let urls = weekly_urls(BASE, anchor, horizon);
            prop_assert_eq!(urls.len(), horizon as usize);

            for (i, url) in urls.iter().enumerate() {
                let expected = anchor + Days::new(i as u64 * 7);
                prop_assert_eq!(url, &page_url(BASE, expected));

                let slug = url.trim_end_matches('/').rsplit('/').next().unwrap();
                let day = slug.rsplit('-').nth(1).unwrap();
                prop_assert!(!day.starts_with('0'));
            }
        }

        #[test]
        fn test_weekly_urls_deterministic(days in 0u64..40_000, horizon in 0u32..20) {
            let anchor = date(2000, 1, 1) + Days::new(days);
            prop_assert_eq!(
                weekly_urls(BASE, anchor, horizon),
                weekly_urls(BASE, anchor, horizon)
            );
        }
    }
}
