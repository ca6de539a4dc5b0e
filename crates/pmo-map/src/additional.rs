//! Selection of unmatched columns to carry through under their own names.

use tracing::debug;

/// Unused fields accepted by `is_selected`, in unused order.
pub fn select_additional<F>(unused: &[String], mut is_selected: F) -> Vec<String>
where
    F: FnMut(&str) -> bool,
{
    unused
        .iter()
        .filter(|field| is_selected(field.as_str()))
        .cloned()
        .collect()
}

/// Unused fields named in `names`, in unused order.
///
/// Names that are not unused fields are ignored.
pub fn select_by_name<S: AsRef<str>>(unused: &[String], names: &[S]) -> Vec<String> {
    for name in names {
        let name = name.as_ref();
        if !unused.iter().any(|field| field == name) {
            debug!(field = name, "ignoring additional field that is not unused");
        }
    }
    select_additional(unused, |field| names.iter().any(|n| n.as_ref() == field))
}
