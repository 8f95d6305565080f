//! Rendering helpers for resolution diagnostics.

use crate::naming::short_type_name;

/// Renders the chain of types being constructed when an error occurred.
///
/// ```
/// use wiring_support::rendering::render_path;
///
/// let path = ["app::UserService", "app::UserRepo", "app::Database"];
/// assert_eq!(render_path(&path), "UserService → UserRepo → Database");
/// ```
pub fn render_path(path: &[impl AsRef<str>]) -> String {
    path.iter()
        .map(|name| short_type_name(name.as_ref()))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Picks registered names that look like the requested one.
///
/// Candidates are compared on their short names, case-insensitively.
/// Substring hits rank first, then a shared prefix of three or more
/// characters. At most `limit` names are returned, best first.
pub fn suggest_similar(requested: &str, available: &[&str], limit: usize) -> Vec<String> {
    let wanted = short_type_name(requested).to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .filter_map(|&candidate| {
            let short = short_type_name(candidate).to_lowercase();
            if short == wanted {
                return None;
            }
            if short.contains(&wanted) || wanted.contains(&short) {
                return Some((100, candidate));
            }
            let prefix = short
                .chars()
                .zip(wanted.chars())
                .take_while(|(a, b)| a == b)
                .count();
            (prefix >= 3).then_some((prefix * 10, candidate))
        })
        .collect();

    // stable: equal scores keep registration order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_single() {
        assert_eq!(render_path(&["app::Only"]), "Only");
    }

    #[test]
    fn render_empty() {
        let path: [&str; 0] = [];
        assert_eq!(render_path(&path), "");
    }

    #[test]
    fn suggests_by_substring() {
        let available = ["app::UserStore", "app::Mailer", "app::SqlUserStore"];
        let hits = suggest_similar("app::UserStor", &available, 5);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.contains("UserStore")));
    }

    #[test]
    fn suggests_by_prefix() {
        let available = ["app::Database", "app::Logger"];
        let hits = suggest_similar("app::Databse", &available, 3);
        assert_eq!(hits, vec!["app::Database".to_string()]);
    }

    #[test]
    fn excludes_exact_and_unrelated() {
        let available = ["app::Clock", "app::Mailer"];
        assert!(suggest_similar("app::Clock", &available, 3).is_empty());
        assert!(suggest_similar("app::Xyz", &available, 3).is_empty());
    }

    #[test]
    fn respects_limit() {
        let available = ["a::Repo1", "a::Repo2", "a::Repo3"];
        assert_eq!(suggest_similar("a::Repo", &available, 2).len(), 2);
    }
}
