//! Type name shortening.
//!
//! `std::any::type_name` returns fully qualified paths. Registration keys
//! and error messages read better with the module prefixes removed.

/// Strips module paths from every segment of a type name.
///
/// ```
/// use wiring_support::naming::short_type_name;
///
/// assert_eq!(short_type_name("app::users::MockUser"), "MockUser");
/// assert_eq!(
///     short_type_name("alloc::sync::Arc<dyn app::users::UserStore + core::marker::Send>"),
///     "Arc<dyn UserStore + Send>"
/// );
/// ```
pub fn short_type_name(full_name: &str) -> String {
    let mut out = String::with_capacity(full_name.len());
    let mut segment_start = 0;

    for (idx, ch) in full_name.char_indices() {
        match ch {
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' => {
                out.push_str(last_segment(&full_name[segment_start..idx]));
                out.push(ch);
                segment_start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }

    out.push_str(last_segment(&full_name[segment_start..]));
    out
}

/// Default registration key for a type: its short name.
///
/// Self-registration (`register_self_transient::<T>()`) keys entries
/// by this value.
pub fn default_key(full_name: &str) -> String {
    short_type_name(full_name)
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
