//! Interactive kinds.
//!
//! Every control declares the event slots it exposes. Values travel back to the host
//! as strings produced by the [`EventValue`](waterbridge_core::EventValue) adapters.

use serde_json::{Map, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use waterbridge_core::{
    DecodeError,
    event::names::{BLUR, CHANGE, DISMISS, FOCUS, PRESS, SUBMIT},
    value::format_date,
};

use crate::{
    kind::{KindSpec, NodeFields, retain_valid},
    observable::ObservableProps,
    view::{NativeView, ViewRole},
};

/// A pressable button.
#[must_use]
pub fn button() -> KindSpec {
    KindSpec::new("Button")
        .events(&[PRESS])
        .decode(decode_button)
        .build(|node, _| NativeView::new(node, ViewRole::Button))
        .merge(merge_button)
}

/// Editable single-line text.
#[must_use]
pub fn text_field() -> KindSpec {
    KindSpec::new("TextField")
        .events(&[CHANGE, FOCUS, BLUR, SUBMIT])
        .decode(decode_text_field)
        .build(|node, _| NativeView::new(node, ViewRole::TextInput))
        .merge(merge_text_field)
}

/// An on/off switch.
#[must_use]
pub fn toggle() -> KindSpec {
    KindSpec::new("Toggle")
        .events(&[CHANGE])
        .decode(decode_toggle)
        .build(|node, _| NativeView::new(node, ViewRole::Toggle))
        .merge(merge_toggle)
}

/// A continuous value slider. `value` is required.
#[must_use]
pub fn slider() -> KindSpec {
    KindSpec::new("Slider")
        .events(&[CHANGE])
        .decode(decode_slider)
        .build(|node, _| NativeView::new(node, ViewRole::Slider))
        .merge(merge_slider)
}

/// A date selector.
#[must_use]
pub fn date_picker() -> KindSpec {
    KindSpec::new("DatePicker")
        .events(&[CHANGE, DISMISS])
        .decode(decode_date_picker)
        .build(|node, _| NativeView::new(node, ViewRole::DatePicker))
        .merge(merge_date_picker)
}

fn copy_str(fields: &NodeFields<'_>, props: &mut Map<String, Value>, field: &str) -> Result<(), DecodeError> {
    if let Some(value) = fields.optional_str(field)? {
        props.insert(field.into(), value.into());
    }
    Ok(())
}

fn decode_button(fields: &NodeFields<'_>) -> Result<Map<String, Value>, DecodeError> {
    let mut props = Map::new();
    copy_str(fields, &mut props, "label")?;
    props.insert(
        "disabled".into(),
        fields.optional_bool("disabled")?.unwrap_or(false).into(),
    );
    Ok(props)
}

fn merge_button(props: &ObservableProps, patch: &Map<String, Value>) -> usize {
    retain_valid(props, patch, |field, value| match field {
        "label" => value.is_string(),
        "disabled" => value.is_boolean(),
        _ => false,
    })
}

fn decode_text_field(fields: &NodeFields<'_>) -> Result<Map<String, Value>, DecodeError> {
    let mut props = Map::new();
    props.insert(
        "text".into(),
        fields.optional_str("text")?.unwrap_or_default().into(),
    );
    copy_str(fields, &mut props, "placeholder")?;
    props.insert(
        "secure".into(),
        fields.optional_bool("secure")?.unwrap_or(false).into(),
    );
    Ok(props)
}

fn merge_text_field(props: &ObservableProps, patch: &Map<String, Value>) -> usize {
    retain_valid(props, patch, |field, value| match field {
        "text" | "placeholder" => value.is_string(),
        "secure" => value.is_boolean(),
        _ => false,
    })
}

fn decode_toggle(fields: &NodeFields<'_>) -> Result<Map<String, Value>, DecodeError> {
    let mut props = Map::new();
    props.insert(
        "isOn".into(),
        fields.optional_bool("isOn")?.unwrap_or(false).into(),
    );
    copy_str(fields, &mut props, "label")?;
    Ok(props)
}

fn merge_toggle(props: &ObservableProps, patch: &Map<String, Value>) -> usize {
    retain_valid(props, patch, |field, value| match field {
        "isOn" => value.is_boolean(),
        "label" => value.is_string(),
        _ => false,
    })
}

fn decode_slider(fields: &NodeFields<'_>) -> Result<Map<String, Value>, DecodeError> {
    let value = fields.required_f64("value")?;
    let min = fields.optional_f64("min")?.unwrap_or(0.0);
    let max = fields.optional_f64("max")?.unwrap_or(1.0);
    if max < min {
        return Err(DecodeError::InvalidField {
            id: fields.id().to_owned(),
            field: "max".into(),
            expected: "a number not below `min`",
        });
    }

    let mut props = Map::new();
    props.insert("value".into(), value.into());
    props.insert("min".into(), min.into());
    props.insert("max".into(), max.into());
    if let Some(step) = fields.optional_f64("step")? {
        props.insert("step".into(), step.into());
    }
    copy_str(fields, &mut props, "label")?;
    Ok(props)
}

fn merge_slider(props: &ObservableProps, patch: &Map<String, Value>) -> usize {
    retain_valid(props, patch, |field, value| match field {
        "value" | "min" | "max" | "step" => value.is_number(),
        "label" => value.is_string(),
        _ => false,
    })
}

fn decode_date_picker(fields: &NodeFields<'_>) -> Result<Map<String, Value>, DecodeError> {
    let mut props = Map::new();
    if let Some(date) = fields.optional_date("date")? {
        props.insert("date".into(), format_date(date).into());
    }
    copy_str(fields, &mut props, "label")?;
    Ok(props)
}

fn merge_date_picker(props: &ObservableProps, patch: &Map<String, Value>) -> usize {
    retain_valid(props, patch, |field, value| match field {
        "date" => value
            .as_str()
            .is_some_and(|date| OffsetDateTime::parse(date, &Rfc3339).is_ok()),
        "label" => value.is_string(),
        _ => false,
    })
}
