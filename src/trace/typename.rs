//! Human-readable type names.

/// Type name with module paths stripped, generic arguments preserved.
///
/// `alloc::vec::Vec<core::option::Option<u8>>` becomes `Vec<Option<u8>>`.
pub fn short_type_name<T: ?Sized>() -> String {
    shorten(std::any::type_name::<T>())
}

/// Short type name of a value.
pub fn short_type_name_of_val<T: ?Sized>(_value: &T) -> String {
    short_type_name::<T>()
}

fn shorten(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    for (index, ch) in full.char_indices() {
        // Path segments end at any punctuation that delimits a type; the
        // last `::` component of each segment is what we keep.
        if matches!(ch, '<' | '>' | ',' | '(' | ')' | '[' | ']' | ';' | '&' | ' ') {
            out.push_str(last_component(&full[segment_start..index]));
            out.push(ch);
            segment_start = index + ch.len_utf8();
        }
    }
    out.push_str(last_component(&full[segment_start..]));
    out
}

fn last_component(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
