use std::collections::HashMap;

use crate::selector::{AttrTest, Compound, Selector};
use crate::{Error, Result};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
}

/// Arena-backed document tree.
///
/// Nodes are never freed; a `NodeId` handed out by a `Dom` stays valid for
/// the lifetime of that `Dom`.
#[derive(Debug, Clone)]
pub struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    /// Parses an HTML fragment into a fresh document.
    pub fn parse(html: &str) -> Result<Self> {
        crate::html::parse_html(html)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let checked = attrs.contains_key("checked");
        let disabled = attrs.contains_key("disabled");
        let element = Element {
            tag_name,
            attrs,
            value,
            checked,
            disabled,
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            // First occurrence wins, as with getElementById.
            if !id_attr.is_empty() {
                self.id_index.entry(id_attr).or_insert(id);
            }
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0).and_then(|node| node.parent)
    }

    pub(crate) fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.nodes
            .get(node_id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn text_content(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.push_text_content(node_id, &mut out);
        out
    }

    fn push_text_content(&self, node_id: NodeId, out: &mut String) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            match &self.nodes[node_id.0].node_type {
                NodeType::Document | NodeType::Element(_) => {
                    for child in &self.nodes[node_id.0].children {
                        self.push_text_content(*child, out);
                    }
                }
                NodeType::Text(text) => out.push_str(text),
            }
        })
    }

    pub fn value(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|element| element.value.as_str())
    }

    pub fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| not_an_element(node_id, "value"))?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn initialize_form_control_values(&mut self) {
        for node in self.all_element_nodes() {
            let is_textarea = self
                .tag_name(node)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("textarea"));
            if is_textarea {
                let text = self.text_content(node);
                if let Some(element) = self.element_mut(node) {
                    element.value = text;
                }
            }
        }
    }

    pub fn checked(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.checked)
    }

    pub fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| not_an_element(node_id, "checked"))?;
        element.checked = checked;
        Ok(())
    }

    pub fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|e| e.disabled)
    }

    /// Attribute names are matched ASCII case-insensitively, as the parser
    /// stores them lowercased.
    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<&str> {
        let element = self.element(node_id)?;
        match element.attrs.get(name) {
            Some(value) => Some(value.as_str()),
            None if name.bytes().any(|b| b.is_ascii_uppercase()) => element
                .attrs
                .get(&name.to_ascii_lowercase())
                .map(String::as_str),
            None => None,
        }
    }

    pub fn has_attr(&self, node_id: NodeId, name: &str) -> bool {
        self.attr(node_id, name).is_some()
    }

    pub fn style_get(&self, node_id: NodeId, name: &str) -> Option<String> {
        let element = self.element(node_id)?;
        let name = name.to_ascii_lowercase();
        parse_style_declarations(element.attrs.get("style").map(String::as_str))
            .into_iter()
            .find(|(prop, _)| prop == &name)
            .map(|(_, value)| value)
    }

    /// Writes one inline style declaration; an empty value removes it.
    pub fn style_set(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| not_an_element(node_id, "style"))?;

        let mut decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == &name) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((name, value.to_string()));
        }

        if decls.is_empty() {
            element.attrs.remove("style");
        } else {
            element
                .attrs
                .insert("style".to_string(), serialize_style_declarations(&decls));
        }
        Ok(())
    }

    pub fn hide(&mut self, node_id: NodeId) -> Result<()> {
        self.style_set(node_id, "display", "none")
    }

    pub fn show(&mut self, node_id: NodeId) -> Result<()> {
        if self.has_attr(node_id, "hidden") {
            self.element_mut(node_id)
                .ok_or_else(|| not_an_element(node_id, "show"))?
                .attrs
                .remove("hidden");
        }
        let displayed_none = self
            .style_get(node_id, "display")
            .is_some_and(|display| display.eq_ignore_ascii_case("none"));
        if displayed_none {
            self.style_set(node_id, "display", "")?;
        }
        Ok(())
    }

    /// True when the element itself is hidden, ignoring its ancestors.
    pub fn is_hidden(&self, node_id: NodeId) -> bool {
        if self.element(node_id).is_none() {
            return false;
        }
        self.has_attr(node_id, "hidden")
            || self
                .style_get(node_id, "display")
                .is_some_and(|display| display.eq_ignore_ascii_case("none"))
    }

    /// True when neither the element nor any ancestor is hidden.
    pub fn is_displayed(&self, node_id: NodeId) -> bool {
        if self.element(node_id).is_none() {
            return false;
        }
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if self.is_hidden(current) {
                return false;
            }
            cursor = self.parent(current);
        }
        true
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        if let Some(id) = selector.id_only() {
            return Ok(self.by_id(id).into_iter().collect());
        }
        Ok(self
            .all_element_nodes()
            .into_iter()
            .filter(|node| self.matches(*node, &selector))
            .collect())
    }

    /// Each compound left of the last must match some ancestor, in order.
    /// Taking the nearest matching ancestor at every step is enough for
    /// descendant-only chains.
    fn matches(&self, node_id: NodeId, selector: &Selector) -> bool {
        let Some((last, outer)) = selector.compounds.split_last() else {
            return false;
        };
        if !self.matches_compound(node_id, last) {
            return false;
        }

        let mut cursor = self.parent(node_id);
        for compound in outer.iter().rev() {
            loop {
                let Some(current) = cursor else {
                    return false;
                };
                cursor = self.parent(current);
                if self.matches_compound(current, compound) {
                    break;
                }
            }
        }
        true
    }

    fn matches_compound(&self, node_id: NodeId, compound: &Compound) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };
        if compound
            .tag
            .as_deref()
            .is_some_and(|tag| !element.tag_name.eq_ignore_ascii_case(tag))
        {
            return false;
        }
        if compound
            .id
            .as_ref()
            .is_some_and(|id| element.attrs.get("id") != Some(id))
        {
            return false;
        }
        if compound.checked && !element.checked {
            return false;
        }
        compound.attrs.iter().all(|test| match test {
            AttrTest::Present(key) => element.attrs.contains_key(key),
            AttrTest::Equals(key, value) => element.attrs.get(key) == Some(value),
        })
    }

    pub(crate) fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
                out.push(node_id);
            }
            for child in &self.nodes[node_id.0].children {
                self.collect_elements_dfs(*child, out);
            }
        })
    }

    fn collect_elements_descendants_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node_id) {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    pub(crate) fn descendant_elements(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_descendants_dfs(node_id, &mut out);
        out
    }

    pub(crate) fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if self
                .tag_name(current)
                .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Serialises a subtree. Attributes are emitted in name order so output
    /// is stable across runs.
    pub fn dump_node(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.push_dump(node_id, &mut out);
        out
    }

    fn push_dump(&self, node_id: NodeId, out: &mut String) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            match &self.nodes[node_id.0].node_type {
                NodeType::Document => {
                    for child in &self.nodes[node_id.0].children {
                        self.push_dump(*child, out);
                    }
                }
                NodeType::Text(text) => out.push_str(text),
                NodeType::Element(element) => {
                    out.push('<');
                    out.push_str(&element.tag_name);
                    let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                    attrs.sort();
                    for (k, v) in attrs {
                        out.push(' ');
                        out.push_str(k);
                        out.push_str("=\"");
                        out.push_str(v);
                        out.push('"');
                    }
                    out.push('>');
                    for child in &self.nodes[node_id.0].children {
                        self.push_dump(*child, out);
                    }
                    out.push_str("</");
                    out.push_str(&element.tag_name);
                    out.push('>');
                }
            }
        })
    }

    pub(crate) fn node_label(&self, node_id: NodeId) -> String {
        let Some(element) = self.element(node_id) else {
            return format!("node#{}", node_id.0);
        };
        match element.attrs.get("id") {
            Some(id) if !id.is_empty() => format!("#{id}"),
            _ => element.tag_name.clone(),
        }
    }
}

fn not_an_element(node_id: NodeId, op: &str) -> Error {
    Error::TypeMismatch {
        selector: format!("node#{}", node_id.0),
        expected: format!("element for {op}"),
        actual: "non-element".into(),
    }
}

fn parse_style_declarations(style_attr: Option<&str>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let Some(style_attr) = style_attr else {
        return out;
    };

    for decl in style_attr.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = value.trim().to_string();
        if let Some(pos) = out.iter().position(|(existing, _)| existing == &name) {
            out[pos].1 = value;
        } else {
            out.push((name, value));
        }
    }

    out
}

fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    let mut out = String::new();
    for (idx, (name, value)) in decls.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push(';');
    }
    out
}

pub(crate) fn input_type(dom: &Dom, node_id: NodeId) -> Option<String> {
    let element = dom.element(node_id)?;
    if !element.tag_name.eq_ignore_ascii_case("input") {
        return None;
    }
    Some(
        element
            .attrs
            .get("type")
            .map(|kind| kind.to_ascii_lowercase())
            .unwrap_or_else(|| "text".into()),
    )
}

pub(crate) fn is_checkbox_input(dom: &Dom, node_id: NodeId) -> bool {
    input_type(dom, node_id).is_some_and(|kind| kind == "checkbox")
}

pub(crate) fn is_radio_input(dom: &Dom, node_id: NodeId) -> bool {
    input_type(dom, node_id).is_some_and(|kind| kind == "radio")
}

pub(crate) fn is_text_input(dom: &Dom, node_id: NodeId) -> bool {
    input_type(dom, node_id).is_some_and(|kind| kind == "text")
}

pub(crate) fn is_input(dom: &Dom, node_id: NodeId) -> bool {
    input_type(dom, node_id).is_some()
}
