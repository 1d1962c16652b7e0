//! How a setting lands on the page
//!
//! The page looks a key up by element id first, then by element name (radio
//! groups). What gets written depends on the kind of element found.

use crate::value::SettingValue;

/// Input types whose `value` property is written directly
const VALUE_INPUT_TYPES: [&str; 3] = ["text", "number", "button"];

/// Element found by id, reduced to what matters for binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Checkbox,
    /// A `DIV` whose id starts with "hide": visibility toggle
    HideBlock,
    ValueInput,
    Text,
}

impl ElementKind {
    /// Classify from the DOM `nodeName` and the `type` property (inputs only)
    pub fn classify(key: &str, node_name: &str, input_type: Option<&str>) -> Self {
        match input_type {
            Some("checkbox") => Self::Checkbox,
            _ if node_name.eq_ignore_ascii_case("div") && has_hide_prefix(key) => Self::HideBlock,
            Some(kind) if VALUE_INPUT_TYPES.contains(&kind) => Self::ValueInput,
            _ => Self::Text,
        }
    }
}

/// Where a key was found on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    ById(ElementKind),
    /// One or more elements share the key as `name`
    ByName,
    Missing,
}

/// What to write into the page for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Checked(bool),
    Hidden(bool),
    Value(String),
    Text(String),
    /// Check every named element whose value equals this, uncheck the rest
    CheckMatching(String),
    Missing,
}

/// Decide how `value` is applied to `target`
pub fn resolve(target: Target, value: &SettingValue) -> Binding {
    match target {
        Target::ById(ElementKind::Checkbox) => Binding::Checked(value.is_true()),
        Target::ById(ElementKind::HideBlock) => Binding::Hidden(value.is_true()),
        Target::ById(ElementKind::ValueInput) => Binding::Value(value.display()),
        Target::ById(ElementKind::Text) => Binding::Text(value.display()),
        Target::ByName => Binding::CheckMatching(value.to_string()),
        Target::Missing => Binding::Missing,
    }
}

fn has_hide_prefix(key: &str) -> bool {
    key.get(..4).is_some_and(|prefix| prefix.eq_ignore_ascii_case("hide"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(ElementKind::classify("traceDebug", "INPUT", Some("checkbox")), ElementKind::Checkbox);
        assert_eq!(ElementKind::classify("hideGsm", "DIV", None), ElementKind::HideBlock);
        assert_eq!(ElementKind::classify("HIDEbattery", "div", None), ElementKind::HideBlock);
        assert_eq!(ElementKind::classify("battery", "DIV", None), ElementKind::Text);
        assert_eq!(ElementKind::classify("hideGsm", "SPAN", None), ElementKind::Text);
        assert_eq!(ElementKind::classify("port", "INPUT", Some("number")), ElementKind::ValueInput);
        assert_eq!(ElementKind::classify("send", "INPUT", Some("button")), ElementKind::ValueInput);
        assert_eq!(ElementKind::classify("mode", "SELECT", Some("select-one")), ElementKind::Text);
    }

    #[test]
    fn test_checkbox_wins_over_hide_prefix() {
        assert_eq!(ElementKind::classify("hideAll", "INPUT", Some("checkbox")), ElementKind::Checkbox);
    }

    #[test]
    fn test_resolve() {
        let on = SettingValue::Text("True".into());
        assert_eq!(resolve(Target::ById(ElementKind::Checkbox), &on), Binding::Checked(true));
        assert_eq!(resolve(Target::ById(ElementKind::HideBlock), &on), Binding::Hidden(true));

        let voltage = SettingValue::Number(3.996);
        assert_eq!(resolve(Target::ById(ElementKind::ValueInput), &voltage), Binding::Value("4".into()));
        assert_eq!(resolve(Target::ById(ElementKind::Text), &SettingValue::Number(12.345)), Binding::Text("12.35".into()));

        // Radio groups compare against the unrounded value
        assert_eq!(resolve(Target::ByName, &SettingValue::Number(1.005)), Binding::CheckMatching("1.005".into()));
        assert_eq!(resolve(Target::Missing, &on), Binding::Missing);
    }
}
