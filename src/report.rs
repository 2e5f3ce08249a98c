use crate::aggregate::HourlyTopK;

/// Renders one hour as `"<domain> <title> <views> \n"` lines.
///
/// Domains are sorted lexicographically. Within a domain the ascending drain
/// is reversed so entries appear in descending view order. The trailing space
/// before the newline is part of the report format.
pub fn render(hour: HourlyTopK) -> String {
    let mut out = String::new();

    for (domain, top) in hour.into_sorted_domains() {
        for entry in top.drain_ascending().into_iter().rev() {
            out.push_str(&format!("{} {} {} \n", domain, entry.title, entry.views));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PageViewRecord;

    fn hour_of(records: &[(&str, &str, u64)], capacity: usize) -> HourlyTopK {
        let mut hour = HourlyTopK::new(capacity);
        for (domain, title, views) in records {
            hour.offer(&PageViewRecord {
                domain: domain.to_string(),
                title: title.to_string(),
                views: *views,
            });
        }
        hour
    }

    #[test]
    fn empty_hour_renders_empty_report() {
        assert_eq!(render(HourlyTopK::new(25)), "");
    }

    #[test]
    fn renders_descending_views_with_trailing_space() {
        let hour = hour_of(
            &[
                ("en", "A", 5),
                ("de", "Hund", 3),
                ("en", "B", 10),
                ("en", "C", 7),
            ],
            2,
        );

        assert_eq!(render(hour), "de Hund 3 \nen B 10 \nen C 7 \n");
    }

    #[test]
    fn equal_views_render_by_title() {
        let hour = hour_of(&[("en", "b", 4), ("en", "c", 9), ("en", "a", 4)], 25);
        assert_eq!(render(hour), "en c 9 \nen a 4 \nen b 4 \n");
    }

    #[test]
    fn rendering_is_independent_of_arrival_order() {
        let forward = [("en", "x", 1), ("en", "y", 2), ("fr", "z", 3), ("en", "w", 2)];
        let mut backward = forward;
        backward.reverse();

        assert_eq!(render(hour_of(&forward, 25)), render(hour_of(&backward, 25)));
    }
}
