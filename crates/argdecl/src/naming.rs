/// Convert an identifier to kebab-case.
///
/// The first character is lowercased, every later ASCII uppercase letter
/// becomes `-` plus its lowercase form, and `_` becomes `-`.
pub fn kebabify(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return out;
    };
    out.extend(first.to_lowercase());
    for c in chars {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else if c == '_' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}

/// The bare name of `T`: last path segment, generic arguments dropped.
pub fn type_name<T: ?Sized>() -> &'static str {
    short_type_name(std::any::type_name::<T>())
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
