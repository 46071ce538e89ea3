//! Pure set-membership matchers shared by transitions, transition callbacks,
//! and event (failure) callbacks. An empty `include` list means "match any".

pub(crate) fn matches_from(from: &[String], except_from: &[String], state: &str) -> bool {
    filter_matches(from, except_from, state)
}

pub(crate) fn matches_to(to: &[String], except_to: &[String], state: &str) -> bool {
    filter_matches(to, except_to, state)
}

pub(crate) fn matches_event(on: &[String], except_on: &[String], event: &str) -> bool {
    filter_matches(on, except_on, event)
}

fn filter_matches(include: &[String], exclude: &[String], value: &str) -> bool {
    if exclude.iter().any(|s| s == value) {
        return false;
    }
    include.is_empty() || include.iter().any(|s| s == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_include_matches_anything() {
        assert!(matches_from(&[], &[], "open"));
        assert!(matches_from(&[], &[], "closed"));
    }

    #[test]
    fn non_empty_include_requires_membership() {
        let include = vec!["open".to_string(), "ajar".to_string()];
        assert!(matches_from(&include, &[], "open"));
        assert!(!matches_from(&include, &[], "closed"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let include: Vec<String> = vec![];
        let exclude = vec!["locked".to_string()];
        assert!(matches_from(&include, &exclude, "open"));
        assert!(!matches_from(&include, &exclude, "locked"));
    }

    #[test]
    fn exclude_wins_even_when_also_included() {
        let include = vec!["locked".to_string()];
        let exclude = vec!["locked".to_string()];
        assert!(!matches_from(&include, &exclude, "locked"));
    }

    #[test]
    fn matches_to_and_matches_event_share_the_same_semantics() {
        let include = vec!["done".to_string()];
        assert!(matches_to(&include, &[], "done"));
        assert!(matches_event(&include, &[], "done"));
        assert!(!matches_to(&include, &[], "pending"));
    }
}
