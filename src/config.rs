use unicode_normalization::UnicodeNormalization;

use crate::pattern::Regex;
use crate::{Error, Result};

/// Extra pane tied to a yes/no radio group: shown while `yes` is checked,
/// hidden otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedPane {
    pub group: String,
    pub target_id: String,
}

impl LinkedPane {
    pub fn new(group: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            target_id: target_id.into(),
        }
    }
}

/// How a label marks its checkbox as the select-all toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleLabel {
    Contains(String),
    Pattern(Regex),
}

impl Default for ToggleLabel {
    fn default() -> Self {
        Self::Contains("All".into())
    }
}

impl ToggleLabel {
    pub(crate) fn matches(&self, label_text: &str) -> Result<bool> {
        let text = normalize_label_text(label_text);
        match self {
            Self::Contains(needle) => Ok(text.contains(&normalize_label_text(needle))),
            Self::Pattern(re) => Ok(re.is_match(&text)?),
        }
    }
}

/// NFC-normalises and collapses whitespace runs to single spaces.
pub(crate) fn normalize_label_text(raw: &str) -> String {
    raw.nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    linked_panes: Vec<LinkedPane>,
    other_sentinel: String,
    other_id_suffix: String,
    other_pane_prefix: String,
    toggle_label: ToggleLabel,
    strict: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            linked_panes: vec![LinkedPane::new("alcoholSupplier", "supplier")],
            other_sentinel: "99".into(),
            other_id_suffix: "_99".into(),
            other_pane_prefix: "other-".into(),
            toggle_label: ToggleLabel::default(),
            strict: false,
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ties `target_id` to a yes/no group, replacing any pane already tied
    /// to that group.
    pub fn linked_pane(mut self, group: impl Into<String>, target_id: impl Into<String>) -> Self {
        let pane = LinkedPane::new(group, target_id);
        match self.linked_panes.iter_mut().find(|p| p.group == pane.group) {
            Some(existing) => *existing = pane,
            None => self.linked_panes.push(pane),
        }
        self
    }

    /// Drops every linked pane, including the default `alcoholSupplier` one.
    pub fn clear_linked_panes(mut self) -> Self {
        self.linked_panes.clear();
        self
    }

    pub fn other_sentinel(mut self, value: impl Into<String>) -> Self {
        self.other_sentinel = value.into();
        self
    }

    pub fn other_id_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.other_id_suffix = suffix.into();
        self
    }

    pub fn other_pane_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.other_pane_prefix = prefix.into();
        self
    }

    pub fn toggle_label(mut self, toggle_label: ToggleLabel) -> Self {
        self.toggle_label = toggle_label;
        self
    }

    pub fn toggle_label_pattern(self, pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern)?;
        Ok(self.toggle_label(ToggleLabel::Pattern(re)))
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.other_sentinel.is_empty() {
            return Err(Error::InvalidConfig("other sentinel must not be empty".into()));
        }
        if self.other_id_suffix.is_empty() {
            return Err(Error::InvalidConfig("other id suffix must not be empty".into()));
        }
        if self.other_pane_prefix.is_empty() {
            return Err(Error::InvalidConfig("other pane prefix must not be empty".into()));
        }
        if let ToggleLabel::Contains(needle) = &self.toggle_label {
            if normalize_label_text(needle).is_empty() {
                return Err(Error::InvalidConfig("toggle label text must not be blank".into()));
            }
        }

        if self
            .linked_panes
            .iter()
            .any(|pane| pane.group.is_empty() || pane.target_id.is_empty())
        {
            return Err(Error::InvalidConfig(
                "linked pane group and target must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn linked_panes(&self) -> &[LinkedPane] {
        &self.linked_panes
    }

    pub(crate) fn linked_pane_for(&self, group: &str) -> Option<&str> {
        self.linked_panes
            .iter()
            .find(|pane| pane.group == group)
            .map(|pane| pane.target_id.as_str())
    }

    pub fn sentinel(&self) -> &str {
        &self.other_sentinel
    }

    pub fn id_suffix(&self) -> &str {
        &self.other_id_suffix
    }

    pub fn pane_prefix(&self) -> &str {
        &self.other_pane_prefix
    }

    pub fn toggle(&self) -> &ToggleLabel {
        &self.toggle_label
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}
