//! Event names and value adapters.
//!
//! Event payloads always cross the boundary as strings. Each value type knows how to
//! render itself into that string on the target and how to parse it back on the host.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::value::format_date;

/// Well-known event names.
pub mod names {
    /// The value of a control changed.
    pub const CHANGE: &str = "change";
    /// A control gained focus.
    pub const FOCUS: &str = "focus";
    /// A control lost focus.
    pub const BLUR: &str = "blur";
    /// A button was pressed.
    pub const PRESS: &str = "press";
    /// A presented view was dismissed.
    pub const DISMISS: &str = "dismiss";
    /// A text field submitted its content.
    pub const SUBMIT: &str = "submit";
}

/// A value that can travel inside an [`EventEnvelope`](crate::wire::EventEnvelope).
pub trait EventValue: Sized {
    /// Renders the value into its string form.
    fn to_event_value(&self) -> String;

    /// Parses the value back. Returns `None` if the string is not a valid encoding.
    fn from_event_value(value: &str) -> Option<Self>;
}

impl EventValue for String {
    fn to_event_value(&self) -> String {
        self.clone()
    }

    fn from_event_value(value: &str) -> Option<Self> {
        Some(value.to_owned())
    }
}

impl EventValue for bool {
    fn to_event_value(&self) -> String {
        self.to_string()
    }

    fn from_event_value(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl EventValue for f64 {
    fn to_event_value(&self) -> String {
        self.to_string()
    }

    fn from_event_value(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }
}

impl EventValue for i64 {
    fn to_event_value(&self) -> String {
        self.to_string()
    }

    fn from_event_value(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }
}

impl EventValue for OffsetDateTime {
    fn to_event_value(&self) -> String {
        format_date(*self)
    }

    fn from_event_value(value: &str) -> Option<Self> {
        Self::parse(value, &Rfc3339).ok()
    }
}
