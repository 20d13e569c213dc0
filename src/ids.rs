//! Element ids derived from the form's naming conventions.

use std::fmt;

/// Escapes an identifier for use after `#` or `.` in a selector.
///
/// Everything outside `[A-Za-z0-9_-]` and non-ASCII is backslash-escaped,
/// so `pet.owner` becomes `pet\.owner`.
pub fn escape_selector_ident(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || !ch.is_ascii()) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub(crate) fn id_selector(id: &str) -> String {
    format!("#{}", escape_selector_ident(id))
}

/// The four ids hanging off a yes/no radio group name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RadioGroupIds {
    group: String,
    yes: String,
    no: String,
    yes_content: String,
    no_content: String,
}

impl RadioGroupIds {
    pub fn new(group: &str) -> Self {
        Self {
            group: group.to_string(),
            yes: format!("{group}-yes"),
            no: format!("{group}-no"),
            yes_content: format!("{group}-yes-content"),
            no_content: format!("{group}-no-content"),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn yes(&self) -> &str {
        &self.yes
    }

    pub fn no(&self) -> &str {
        &self.no
    }

    pub fn yes_content(&self) -> &str {
        &self.yes_content
    }

    pub fn no_content(&self) -> &str {
        &self.no_content
    }

    pub fn yes_selector(&self) -> String {
        id_selector(&self.yes)
    }

    pub fn no_selector(&self) -> String {
        id_selector(&self.no)
    }

    pub fn yes_content_selector(&self) -> String {
        id_selector(&self.yes_content)
    }

    pub fn no_content_selector(&self) -> String {
        id_selector(&self.no_content)
    }
}

impl fmt::Display for RadioGroupIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "radio group {}", self.group)
    }
}

/// Id of the free-text pane revealed by an "other" checkbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OtherPaneId(String);

impl OtherPaneId {
    /// `pets_99` with suffix `_99` and prefix `other-` gives `other-pets`.
    /// An id without the suffix is used whole.
    pub fn for_checkbox(checkbox_id: &str, suffix: &str, prefix: &str) -> Self {
        let base = checkbox_id.strip_suffix(suffix).unwrap_or(checkbox_id);
        Self(format!("{prefix}{base}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn selector(&self) -> String {
        id_selector(&self.0)
    }
}

impl fmt::Display for OtherPaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dom;

    #[test]
    fn radio_ids_follow_the_yes_no_convention() {
        let ids = RadioGroupIds::new("alcoholSupplier");
        assert_eq!(ids.yes(), "alcoholSupplier-yes");
        assert_eq!(ids.no(), "alcoholSupplier-no");
        assert_eq!(ids.yes_content(), "alcoholSupplier-yes-content");
        assert_eq!(ids.no_content(), "alcoholSupplier-no-content");
    }

    #[test]
    fn every_period_is_escaped() {
        let ids = RadioGroupIds::new("a.b.c");
        assert_eq!(ids.yes_selector(), r"#a\.b\.c-yes");
    }

    #[test]
    fn escaped_selector_resolves_dotted_id() -> crate::Result<()> {
        let dom = Dom::parse(r#"<input type="radio" id="pet.owner-yes" name="pet.owner">"#)?;
        let ids = RadioGroupIds::new("pet.owner");
        assert!(dom.query_selector(&ids.yes_selector())?.is_some());
        Ok(())
    }

    #[test]
    fn other_pane_strips_only_a_trailing_suffix() {
        assert_eq!(OtherPaneId::for_checkbox("pets_99", "_99", "other-").as_str(), "other-pets");
        assert_eq!(
            OtherPaneId::for_checkbox("a_99_b_99", "_99", "other-").as_str(),
            "other-a_99_b"
        );
        assert_eq!(OtherPaneId::for_checkbox("pets", "_99", "other-").as_str(), "other-pets");
    }

    #[test]
    fn escape_leaves_plain_idents_alone() {
        assert_eq!(escape_selector_ident("plain-id_1"), "plain-id_1");
        assert_eq!(escape_selector_ident("a b:c"), r"a\ b\:c");
    }
}
