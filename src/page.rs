use std::collections::{HashMap, VecDeque};

use crate::config::ControllerConfig;
use crate::controller::{Binding, FormVisibilityController, RuleOutcome};
use crate::dom::{Dom, NodeId, input_type, is_checkbox_input, is_radio_input};
use crate::{Error, Result, truncate_chars};

#[derive(Debug, Default, Clone)]
struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Binding>>>,
}

impl ListenerStore {
    fn add(&mut self, node_id: NodeId, event: &str, binding: Binding) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default()
            .push(binding);
    }

    fn get(&self, node_id: NodeId, event: &str) -> Vec<Binding> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
struct EventState {
    event_type: String,
    target: NodeId,
    current_target: NodeId,
}

impl EventState {
    fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
        }
    }
}

/// A parsed form with its visibility controller bound and initialised.
///
/// User actions go through the same change events a browser would fire, so
/// the rules run exactly when they would on a live page.
pub struct Page {
    dom: Dom,
    controller: FormVisibilityController,
    listeners: ListenerStore,
    trace: bool,
    trace_events: bool,
    trace_rules: bool,
    trace_logs: VecDeque<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::with_config(html, ControllerConfig::default())
    }

    pub fn with_config(html: &str, config: ControllerConfig) -> Result<Self> {
        Self::build(html, config, false)
    }

    /// Like [`Page::with_config`] but with tracing on from the start, so bind
    /// findings and the initial rule pass are captured. Nothing is echoed to
    /// stderr.
    pub fn traced(html: &str, config: ControllerConfig) -> Result<Self> {
        Self::build(html, config, true)
    }

    fn build(html: &str, config: ControllerConfig, trace: bool) -> Result<Self> {
        let dom = Dom::parse(html)?;
        let controller = FormVisibilityController::bind(&dom, config)?;

        let mut listeners = ListenerStore::default();
        for (node, binding) in controller.bindings() {
            listeners.add(node, "change", binding);
        }

        let mut page = Self {
            dom,
            controller,
            listeners,
            trace,
            trace_events: true,
            trace_rules: true,
            trace_logs: VecDeque::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: !trace,
        };

        let findings = page.controller.findings().to_vec();
        for finding in findings {
            page.trace_line(format!("[bind] {finding}"));
        }
        page.initialize()?;
        Ok(page)
    }

    /// Runs the initialisation pass again against the current state.
    pub fn initialize(&mut self) -> Result<()> {
        let outcomes = self.controller.initialize(&mut self.dom)?;
        for outcome in outcomes {
            self.trace_rule(&outcome);
        }
        Ok(())
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn controller(&self) -> &FormVisibilityController {
        &self.controller
    }

    pub fn findings(&self) -> &[String] {
        self.controller.findings()
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs).into()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_rules(&mut self, enabled: bool) {
        self.trace_rules = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        if self.trace_logs.len() > self.trace_log_limit {
            let excess = self.trace_logs.len() - self.trace_log_limit;
            self.trace_logs.drain(..excess);
        }
        Ok(())
    }

    pub fn apply_radio_visibility(&mut self, group_name: &str) -> Result<()> {
        let outcome = self
            .controller
            .apply_radio_visibility(&mut self.dom, group_name)?;
        self.trace_rule(&outcome);
        Ok(())
    }

    pub fn apply_other_visibility(&mut self, checkbox_id: &str) -> Result<()> {
        let outcome = self
            .controller
            .apply_other_visibility(&mut self.dom, checkbox_id)?;
        self.trace_rule(&outcome);
        Ok(())
    }

    pub fn propagate_group_to_members(&mut self, toggle_selector: &str, group_name: &str) -> Result<()> {
        let toggle = self.select_one(toggle_selector)?;
        let outcome = self
            .controller
            .propagate_group_to_members(&mut self.dom, toggle, group_name)?;
        self.trace_rule(&outcome);
        Ok(())
    }

    pub fn propagate_members_to_group(&mut self, group_name: &str) -> Result<()> {
        let outcome = self
            .controller
            .propagate_members_to_group(&mut self.dom, group_name)?;
        self.trace_rule(&outcome);
        Ok(())
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        let typeable = match tag.as_str() {
            "textarea" => true,
            "input" => !matches!(
                input_type(&self.dom, target).as_deref(),
                Some("checkbox" | "radio" | "submit" | "button" | "reset")
            ),
            _ => false,
        };
        if !typeable {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "text input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let is_checkbox = is_checkbox_input(&self.dom, target);
        let is_radio = is_radio_input(&self.dom, target);
        if !is_checkbox && !is_radio {
            let actual = match input_type(&self.dom, target) {
                Some(kind) => format!("input[type={kind}]"),
                None => self.dom.tag_name(target).unwrap_or_default().to_string(),
            };
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual,
            });
        }

        if self.dom.checked(target) != checked {
            if is_radio && checked {
                self.uncheck_other_radios_in_group(target)?;
            }
            self.dom.set_checked(target, checked)?;
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
        }
        Ok(())
    }

    /// Clicks an element. Checkboxes toggle, radios select, and a label
    /// forwards the click to its control.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    fn click_node(&mut self, target: NodeId) -> Result<()> {
        if self.dom.disabled(target) {
            return Ok(());
        }
        self.dispatch_event(target, "click")?;

        if is_checkbox_input(&self.dom, target) {
            let current = self.dom.checked(target);
            self.dom.set_checked(target, !current)?;
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
        } else if is_radio_input(&self.dom, target) {
            if !self.dom.checked(target) {
                self.uncheck_other_radios_in_group(target)?;
                self.dom.set_checked(target, true)?;
                self.dispatch_event(target, "input")?;
                self.dispatch_event(target, "change")?;
            }
        } else if let Some(control) = self.labelled_control(target) {
            if control != target {
                return self.click_node(control);
            }
        }
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event)
    }

    pub fn is_visible(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.is_displayed(target))
    }

    pub fn is_checked(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.checked(target))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.value(target).unwrap_or_default().to_string())
    }

    pub fn assert_visible(&self, selector: &str) -> Result<()> {
        self.assert_display(selector, true)
    }

    pub fn assert_hidden(&self, selector: &str) -> Result<()> {
        self.assert_display(selector, false)
    }

    fn assert_display(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.is_displayed(target);
        if actual != expected {
            let describe = |shown: bool| if shown { "visible" } else { "hidden" };
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: describe(expected).into(),
                actual: describe(actual).into(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target).unwrap_or_default();
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    fn form_owner(&self, node_id: NodeId) -> Option<NodeId> {
        if self
            .dom
            .tag_name(node_id)
            .is_some_and(|t| t.eq_ignore_ascii_case("form"))
        {
            Some(node_id)
        } else {
            self.dom.find_ancestor_by_tag(node_id, "form")
        }
    }

    fn is_labelable_control(&self, node: NodeId) -> bool {
        let Some(tag) = self.dom.tag_name(node) else {
            return false;
        };
        if tag.eq_ignore_ascii_case("input") {
            return input_type(&self.dom, node).as_deref() != Some("hidden");
        }
        tag.eq_ignore_ascii_case("button")
            || tag.eq_ignore_ascii_case("select")
            || tag.eq_ignore_ascii_case("textarea")
    }

    fn labelled_control(&self, label: NodeId) -> Option<NodeId> {
        if !self
            .dom
            .tag_name(label)
            .is_some_and(|t| t.eq_ignore_ascii_case("label"))
        {
            return None;
        }
        if let Some(target) = self.dom.attr(label, "for").and_then(|id| self.dom.by_id(id)) {
            if self.is_labelable_control(target) {
                return Some(target);
            }
        }
        self.dom
            .descendant_elements(label)
            .into_iter()
            .find(|node| self.is_labelable_control(*node))
    }

    fn uncheck_other_radios_in_group(&mut self, target: NodeId) -> Result<()> {
        let target_name = self.dom.attr(target, "name").unwrap_or_default().to_string();
        if target_name.is_empty() {
            return Ok(());
        }
        let target_form = self.form_owner(target);

        for node in self.dom.all_element_nodes() {
            if node == target || !is_radio_input(&self.dom, node) {
                continue;
            }
            if self.dom.attr(node, "name") != Some(target_name.as_str()) {
                continue;
            }
            if self.form_owner(node) != target_form {
                continue;
            }
            if self.dom.checked(node) {
                self.dom.set_checked(node, false)?;
            }
        }
        Ok(())
    }

    fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<()> {
        let mut event = EventState::new(event_type, target);

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }

        // Target first, then bubbling up to the document.
        for node in path {
            event.current_target = node;
            self.invoke_listeners(node, &event)?;
        }

        self.trace_event_done(&event);
        Ok(())
    }

    fn invoke_listeners(&mut self, node_id: NodeId, event: &EventState) -> Result<()> {
        let bindings = self.listeners.get(node_id, &event.event_type);
        for binding in bindings {
            if self.trace {
                let target_label = self.dom.node_label(event.target);
                let current_label = self.dom.node_label(event.current_target);
                self.trace_event_line(format!(
                    "[event] {} target={} current={}",
                    event.event_type, target_label, current_label
                ));
            }
            let outcome = self
                .controller
                .run_binding(&mut self.dom, event.current_target, &binding)?;
            self.trace_rule(&outcome);
        }
        Ok(())
    }

    fn trace_event_done(&mut self, event: &EventState) {
        if !self.trace {
            return;
        }
        let target_label = self.dom.node_label(event.target);
        self.trace_event_line(format!(
            "[event] done {} target={}",
            event.event_type, target_label
        ));
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.trace_line(line);
        }
    }

    fn trace_rule(&mut self, outcome: &RuleOutcome) {
        if self.trace && self.trace_rules {
            self.trace_line(format!("[rule] {outcome}"));
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace {
            if self.trace_to_stderr {
                eprintln!("{line}");
            }
            while self.trace_logs.len() >= self.trace_log_limit {
                self.trace_logs.pop_front();
            }
            self.trace_logs.push_back(line);
        }
    }
}
