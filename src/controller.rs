//! Visibility and select-all rules bound to a parsed form.
//!
//! The controller scans the document once, at [`FormVisibilityController::bind`],
//! and remembers what it found: yes/no radio groups, "other" checkboxes, and
//! named checkbox groups with their select-all toggles. Every rule is a pure
//! function of the current checked state, so running one twice is the same as
//! running it once. Lookups that find nothing are no-ops.

use std::collections::HashMap;
use std::fmt;

use crate::config::ControllerConfig;
use crate::dom::{Dom, NodeId, is_checkbox_input, is_input, is_radio_input, is_text_input};
use crate::ids::{OtherPaneId, RadioGroupIds, id_selector};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioAnswer {
    Yes,
    No,
    Both,
    Unanswered,
}

/// What a single rule run did, for the trace log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Radio { group: String, answer: RadioAnswer },
    Other { checkbox_id: String, shown: bool },
    GroupToMembers { group: String, checked: bool, members: usize },
    MembersToGroup { group: String, all_checked: bool },
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radio { group, answer } => {
                let answer = match answer {
                    RadioAnswer::Yes => "yes",
                    RadioAnswer::No => "no",
                    RadioAnswer::Both => "both",
                    RadioAnswer::Unanswered => "unanswered",
                };
                write!(f, "radio group={group} answer={answer}")
            }
            Self::Other { checkbox_id, shown } => {
                write!(f, "other checkbox=#{checkbox_id} pane_shown={shown}")
            }
            Self::GroupToMembers {
                group,
                checked,
                members,
            } => write!(f, "group->members group={group} checked={checked} members={members}"),
            Self::MembersToGroup { group, all_checked } => {
                write!(f, "members->group group={group} all_checked={all_checked}")
            }
        }
    }
}

/// Which rule a control's change event runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Binding {
    Radio(String),
    Other(String),
    GroupToggle(String),
    Member(String),
}

#[derive(Debug, Clone)]
struct OtherCheckbox {
    node: NodeId,
    id: String,
    pane: OtherPaneId,
}

#[derive(Debug, Clone, Default)]
struct CheckboxGroup {
    toggles: Vec<NodeId>,
    members: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct FormVisibilityController {
    config: ControllerConfig,
    radio_groups: Vec<RadioGroupIds>,
    radios: Vec<(NodeId, String)>,
    other_checkboxes: Vec<OtherCheckbox>,
    group_order: Vec<String>,
    checkbox_groups: HashMap<String, CheckboxGroup>,
    findings: Vec<String>,
}

impl FormVisibilityController {
    /// Scans `dom` for the controls the rules apply to.
    ///
    /// With a strict config, a convention-referenced element that is absent
    /// fails the bind with [`Error::MissingCounterpart`]. Otherwise the same
    /// problems are kept as [`findings`](Self::findings). Content panes are
    /// optional either way.
    pub fn bind(dom: &Dom, config: ControllerConfig) -> Result<Self> {
        config.validate()?;

        let mut controller = Self {
            config,
            radio_groups: Vec::new(),
            radios: Vec::new(),
            other_checkboxes: Vec::new(),
            group_order: Vec::new(),
            checkbox_groups: HashMap::new(),
            findings: Vec::new(),
        };
        controller.discover_radio_groups(dom);
        controller.discover_checkboxes(dom)?;
        controller.check_counterparts(dom)?;
        Ok(controller)
    }

    fn discover_radio_groups(&mut self, dom: &Dom) {
        for node in dom.all_element_nodes() {
            if !is_radio_input(dom, node) {
                continue;
            }
            let Some(name) = dom.attr(node, "name").filter(|name| !name.is_empty()) else {
                continue;
            };
            let name = name.to_string();
            if !self.radio_groups.iter().any(|ids| ids.group() == name) {
                self.radio_groups.push(RadioGroupIds::new(&name));
            }
            self.radios.push((node, name));
        }
    }

    fn discover_checkboxes(&mut self, dom: &Dom) -> Result<()> {
        for node in dom.all_element_nodes() {
            if !is_checkbox_input(dom, node) {
                continue;
            }

            if dom.attr(node, "value") == Some(self.config.sentinel()) {
                match dom.attr(node, "id").filter(|id| !id.is_empty()) {
                    Some(id) => self.other_checkboxes.push(OtherCheckbox {
                        node,
                        id: id.to_string(),
                        pane: OtherPaneId::for_checkbox(
                            id,
                            self.config.id_suffix(),
                            self.config.pane_prefix(),
                        ),
                    }),
                    None => self.findings.push(format!(
                        "other checkbox {} has no id",
                        dom.node_label(node)
                    )),
                }
                continue;
            }

            let Some(label) = associated_label(dom, node) else {
                continue;
            };
            let Some(name) = dom.attr(node, "name").filter(|name| !name.is_empty()) else {
                continue;
            };
            let name = name.to_string();
            let is_toggle = self.config.toggle().matches(&dom.text_content(label))?;

            if !self.checkbox_groups.contains_key(&name) {
                self.group_order.push(name.clone());
            }
            let group = self.checkbox_groups.entry(name).or_default();
            if is_toggle {
                group.toggles.push(node);
            } else {
                group.members.push(node);
            }
        }
        Ok(())
    }

    fn check_counterparts(&mut self, dom: &Dom) -> Result<()> {
        let mut missing = Vec::new();
        for ids in &self.radio_groups {
            // Either radio id marks a yes/no group; plain radio groups
            // reference nothing.
            match (dom.by_id(ids.yes()), dom.by_id(ids.no())) {
                (Some(_), None) => missing.push((ids.no().to_string(), ids.to_string())),
                (None, Some(_)) => missing.push((ids.yes().to_string(), ids.to_string())),
                _ => {}
            }
            if let Some(target) = self.config.linked_pane_for(ids.group()) {
                if dom.by_id(target).is_none() {
                    missing.push((target.to_string(), format!("linked pane of {ids}")));
                }
            }
        }
        for other in &self.other_checkboxes {
            if dom.by_id(other.pane.as_str()).is_none() {
                missing.push((
                    other.pane.as_str().to_string(),
                    format!("other checkbox #{}", other.id),
                ));
            }
        }

        if self.config.is_strict() {
            if let Some((id, referenced_by)) = missing.into_iter().next() {
                return Err(Error::MissingCounterpart { id, referenced_by });
            }
            return Ok(());
        }
        for (id, referenced_by) in missing {
            self.findings
                .push(format!("missing element #{id} referenced by {referenced_by}"));
        }
        Ok(())
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Problems found while binding in non-strict mode.
    pub fn findings(&self) -> &[String] {
        &self.findings
    }

    pub fn radio_groups(&self) -> impl Iterator<Item = &str> {
        self.radio_groups.iter().map(RadioGroupIds::group)
    }

    pub fn other_checkbox_ids(&self) -> impl Iterator<Item = &str> {
        self.other_checkboxes.iter().map(|other| other.id.as_str())
    }

    pub fn checkbox_groups(&self) -> impl Iterator<Item = &str> {
        self.group_order.iter().map(String::as_str)
    }

    /// Runs every rule once against the current state. Select-all toggles
    /// are recomputed from their members; members are never overwritten
    /// from a toggle here, so restored form state survives.
    pub fn initialize(&self, dom: &mut Dom) -> Result<Vec<RuleOutcome>> {
        let mut outcomes = Vec::new();
        for ids in &self.radio_groups {
            outcomes.push(self.apply_radio_visibility(dom, ids.group())?);
        }
        for other in &self.other_checkboxes {
            outcomes.push(self.apply_other_visibility(dom, &other.id)?);
        }
        for name in &self.group_order {
            outcomes.push(self.propagate_members_to_group(dom, name)?);
        }
        Ok(outcomes)
    }

    /// Shows the pane for the checked answer of a yes/no radio group and
    /// hides and clears the other one.
    pub fn apply_radio_visibility(&self, dom: &mut Dom, group_name: &str) -> Result<RuleOutcome> {
        let ids = RadioGroupIds::new(group_name);
        let yes_checked = lookup(dom, &ids.yes_selector())?.is_some_and(|node| dom.checked(node));
        let no_checked = lookup(dom, &ids.no_selector())?.is_some_and(|node| dom.checked(node));
        let yes_content = lookup(dom, &ids.yes_content_selector())?;
        let no_content = lookup(dom, &ids.no_content_selector())?;
        let linked = match self.config.linked_pane_for(group_name) {
            Some(target) => lookup(dom, &id_selector(target))?,
            None => None,
        };

        if !yes_checked && !no_checked {
            hide_if_present(dom, yes_content)?;
            hide_if_present(dom, no_content)?;
            hide_if_present(dom, linked)?;
        }

        // Both checked only happens when the two radios do not share a name;
        // the branches then run in order and the "no" side has the last word.
        if yes_checked {
            show_if_present(dom, yes_content)?;
            if let Some(pane) = no_content {
                dom.hide(pane)?;
                clear_radio_pane(dom, pane)?;
            }
            show_if_present(dom, linked)?;
        }
        if no_checked {
            show_if_present(dom, no_content)?;
            if let Some(pane) = yes_content {
                dom.hide(pane)?;
                clear_radio_pane(dom, pane)?;
            }
            hide_if_present(dom, linked)?;
        }

        let answer = match (yes_checked, no_checked) {
            (true, true) => RadioAnswer::Both,
            (true, false) => RadioAnswer::Yes,
            (false, true) => RadioAnswer::No,
            (false, false) => RadioAnswer::Unanswered,
        };
        Ok(RuleOutcome::Radio {
            group: group_name.to_string(),
            answer,
        })
    }

    /// Shows the free-text pane of an "other" checkbox while it is checked;
    /// hides it and empties its inputs otherwise.
    pub fn apply_other_visibility(&self, dom: &mut Dom, checkbox_id: &str) -> Result<RuleOutcome> {
        let checked = lookup(dom, &id_selector(checkbox_id))?.is_some_and(|node| dom.checked(node));
        let pane_id = OtherPaneId::for_checkbox(
            checkbox_id,
            self.config.id_suffix(),
            self.config.pane_prefix(),
        );

        if let Some(pane) = lookup(dom, &pane_id.selector())? {
            if checked {
                dom.show(pane)?;
            } else {
                dom.hide(pane)?;
                for node in dom.descendant_elements(pane) {
                    if is_input(dom, node) {
                        dom.set_value(node, "")?;
                    }
                }
            }
        }

        Ok(RuleOutcome::Other {
            checkbox_id: checkbox_id.to_string(),
            shown: checked,
        })
    }

    /// Copies the toggle's checked state onto every member of the group and
    /// onto any other toggle of the same group.
    pub fn propagate_group_to_members(
        &self,
        dom: &mut Dom,
        group_checkbox: NodeId,
        group_name: &str,
    ) -> Result<RuleOutcome> {
        let checked = dom.checked(group_checkbox);
        let Some(group) = self.checkbox_groups.get(group_name) else {
            return Ok(RuleOutcome::GroupToMembers {
                group: group_name.to_string(),
                checked,
                members: 0,
            });
        };
        for node in group.members.iter().chain(&group.toggles) {
            dom.set_checked(*node, checked)?;
        }
        Ok(RuleOutcome::GroupToMembers {
            group: group_name.to_string(),
            checked,
            members: group.members.len(),
        })
    }

    /// Checks the group's toggle iff every member is checked. A group with
    /// no members counts as all checked.
    pub fn propagate_members_to_group(&self, dom: &mut Dom, group_name: &str) -> Result<RuleOutcome> {
        let Some(group) = self.checkbox_groups.get(group_name) else {
            return Ok(RuleOutcome::MembersToGroup {
                group: group_name.to_string(),
                all_checked: true,
            });
        };
        let checked_count = group
            .members
            .iter()
            .filter(|member| dom.checked(**member))
            .count();
        let all_checked = checked_count == group.members.len();
        for toggle in &group.toggles {
            dom.set_checked(*toggle, all_checked)?;
        }
        Ok(RuleOutcome::MembersToGroup {
            group: group_name.to_string(),
            all_checked,
        })
    }

    /// Every control whose change event runs a rule, with that rule.
    pub(crate) fn bindings(&self) -> Vec<(NodeId, Binding)> {
        let mut out = Vec::new();
        for (node, name) in &self.radios {
            out.push((*node, Binding::Radio(name.clone())));
        }
        for other in &self.other_checkboxes {
            out.push((other.node, Binding::Other(other.id.clone())));
        }
        for name in &self.group_order {
            let Some(group) = self.checkbox_groups.get(name) else {
                continue;
            };
            for toggle in &group.toggles {
                out.push((*toggle, Binding::GroupToggle(name.clone())));
            }
            for member in &group.members {
                out.push((*member, Binding::Member(name.clone())));
            }
        }
        out
    }

    pub(crate) fn run_binding(
        &self,
        dom: &mut Dom,
        target: NodeId,
        binding: &Binding,
    ) -> Result<RuleOutcome> {
        match binding {
            Binding::Radio(name) => self.apply_radio_visibility(dom, name),
            Binding::Other(id) => self.apply_other_visibility(dom, id),
            Binding::GroupToggle(name) => self.propagate_group_to_members(dom, target, name),
            Binding::Member(name) => self.propagate_members_to_group(dom, name),
        }
    }
}

fn lookup(dom: &Dom, selector: &str) -> Result<Option<NodeId>> {
    dom.query_selector(selector)
}

fn show_if_present(dom: &mut Dom, node: Option<NodeId>) -> Result<()> {
    match node {
        Some(node) => dom.show(node),
        None => Ok(()),
    }
}

fn hide_if_present(dom: &mut Dom, node: Option<NodeId>) -> Result<()> {
    match node {
        Some(node) => dom.hide(node),
        None => Ok(()),
    }
}

/// Empties text inputs and unchecks radios and checkboxes under `pane`.
fn clear_radio_pane(dom: &mut Dom, pane: NodeId) -> Result<()> {
    for node in dom.descendant_elements(pane) {
        if is_text_input(dom, node) {
            dom.set_value(node, "")?;
        } else if is_radio_input(dom, node) || is_checkbox_input(dom, node) {
            dom.set_checked(node, false)?;
        }
    }
    Ok(())
}

/// The nearest enclosing `<label>`, else a `<label for=...>` naming the
/// control's id.
fn associated_label(dom: &Dom, node: NodeId) -> Option<NodeId> {
    if let Some(label) = dom.find_ancestor_by_tag(node, "label") {
        return Some(label);
    }
    let id = dom.attr(node, "id").filter(|id| !id.is_empty())?;
    dom.all_element_nodes().into_iter().find(|candidate| {
        dom.tag_name(*candidate)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("label"))
            && dom.attr(*candidate, "for") == Some(id)
    })
}
