//! Built-in node kinds.

pub mod controls;
pub mod layout;
pub mod text;

use crate::kind::KindSpec;

/// Every built-in kind, containers first.
#[must_use]
pub fn builtin_kinds() -> Vec<KindSpec> {
    vec![
        layout::group(),
        layout::section(),
        text::text(),
        controls::button(),
        controls::text_field(),
        controls::toggle(),
        controls::slider(),
        controls::date_picker(),
    ]
}
