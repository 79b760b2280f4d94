// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable element descriptions and their builder API.
//!
//! Elements are plain data: a kind (host tag, text, or component function),
//! an ordered property list, and an ordered child sequence. They are built
//! once per render description and never mutated afterwards; the engine
//! consumes them by cloning the pieces it needs into fibers.

use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::hooks::HookCx;

/// A host tag or property key.
pub type Tag = Cow<'static, str>;

/// A component function.
///
/// Components receive their props and a hook context valid only for the
/// duration of the call, and return exactly one root element. Using a plain
/// function pointer (rather than a closure trait object) makes component
/// identity comparable, which the reconciler relies on for type matching.
pub type Component = fn(&mut HookCx<'_>, &Props) -> Element;

/// An event listener attached to a host element.
///
/// Listeners are reference counted so they can be cloned from the element
/// description into fibers and handed to the render target. Two listeners
/// compare equal only if they are the same allocation.
pub type Listener = Rc<dyn Fn()>;

/// The reserved property-key prefix identifying event bindings.
pub const EVENT_PREFIX: &str = "on";

/// What an element describes: a host node, a text node, or a component.
#[derive(Clone)]
pub enum ElementKind {
    /// A render-target node with the given tag (e.g. `"div"`).
    Host(Tag),
    /// A text node carrying its text value.
    Text(String),
    /// A component function to be invoked during reconciliation.
    Component(Component),
}

impl ElementKind {
    /// Whether two kinds are the same *type* for reconciliation purposes.
    ///
    /// Host kinds match on tag equality, text kinds always match each other
    /// (the text value is content, not type), and components match on
    /// function identity.
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Host(a), Self::Host(b)) => a == b,
            (Self::Text(_), Self::Text(_)) => true,
            (Self::Component(a), Self::Component(b)) => core::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(tag) => f.debug_tuple("Host").field(tag).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Component(_) => f.write_str("Component(..)"),
        }
    }
}

/// A property value.
#[derive(Clone)]
pub enum PropValue {
    /// A string value.
    Str(Cow<'static, str>),
    /// A numeric value.
    Number(f64),
    /// A boolean value.
    Bool(bool),
    /// An event listener; only meaningful under an `on`-prefixed key.
    Listener(Listener),
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Listener(a), Self::Listener(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Listener(_) => f.write_str("Listener(..)"),
        }
    }
}

impl From<&'static str> for PropValue {
    fn from(value: &'static str) -> Self {
        Self::Str(Cow::Borrowed(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(Cow::Owned(value))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// An insertion-ordered property list.
///
/// Setting an existing key replaces its value in place, preserving the
/// original position. Lookup is linear; property lists are small.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: Vec<(Tag, PropValue)>,
}

impl Props {
    /// Create an empty property list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any existing entry with the same key.
    pub fn set(&mut self, key: impl Into<Tag>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up a property by key.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the event name for an `on`-prefixed property key, lower-cased.
///
/// `event_name("onClick")` is `Some("click")`; keys without the reserved
/// prefix yield `None` and are treated as regular properties.
pub fn event_name(key: &str) -> Option<String> {
    key.strip_prefix(EVENT_PREFIX)
        .filter(|suffix| !suffix.is_empty())
        .map(str::to_lowercase)
}

/// An immutable description of one node in the desired tree.
#[derive(Clone, Debug)]
pub struct Element {
    /// What this element describes.
    pub kind: ElementKind,
    /// Ordered properties (excluding children).
    pub props: Props,
    /// Ordered child elements. Reference counted so clones share the
    /// subtree description instead of copying it per tree level; builders
    /// mutate in place while the list is still uniquely owned.
    pub children: Rc<Vec<Element>>,
}

impl Element {
    /// Describe a host node with the given tag.
    pub fn host(tag: impl Into<Tag>) -> Self {
        Self {
            kind: ElementKind::Host(tag.into()),
            props: Props::new(),
            children: Rc::new(Vec::new()),
        }
    }

    /// Describe a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Text(value.into()),
            props: Props::new(),
            children: Rc::new(Vec::new()),
        }
    }

    /// Describe a component invocation.
    pub fn component(component: Component) -> Self {
        Self {
            kind: ElementKind::Component(component),
            props: Props::new(),
            children: Rc::new(Vec::new()),
        }
    }

    /// Add or replace a property.
    pub fn prop(mut self, key: impl Into<Tag>, value: impl Into<PropValue>) -> Self {
        self.props.set(key, value);
        self
    }

    /// Attach an event listener under an `on`-prefixed key (e.g. `"onClick"`).
    pub fn listener(mut self, key: impl Into<Tag>, f: impl Fn() + 'static) -> Self {
        self.props.set(key, PropValue::Listener(Rc::new(f)));
        self
    }

    /// Append a child element.
    pub fn child(mut self, child: Self) -> Self {
        Rc::make_mut(&mut self.children).push(child);
        self
    }

    /// Append a bare string, normalized into a text element.
    pub fn text_child(self, value: impl Into<String>) -> Self {
        self.child(Self::text(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn comp_a(_cx: &mut HookCx<'_>, _props: &Props) -> Element {
        Element::host("div")
    }

    fn comp_b(_cx: &mut HookCx<'_>, _props: &Props) -> Element {
        Element::host("span")
    }

    #[test]
    fn builder_normalizes_text_children() {
        let el = Element::host("p").text_child("hello");
        assert_eq!(el.children.len(), 1, "one normalized child expected");
        assert!(
            matches!(&el.children[0].kind, ElementKind::Text(t) if t == "hello"),
            "bare string should become a text element"
        );
    }

    #[test]
    fn clones_share_the_child_list() {
        let el = Element::host("div").child(Element::host("p").text_child("x"));
        let copy = el.clone();
        assert!(
            Rc::ptr_eq(&el.children, &copy.children),
            "cloning must not copy the subtree description"
        );
    }

    #[test]
    fn props_preserve_order_and_replace_in_place() {
        let el = Element::host("div")
            .prop("id", "a")
            .prop("title", "t")
            .prop("id", "b");
        let keys: alloc::vec::Vec<&str> = el.props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["id", "title"], "replacement must keep position");
        assert_eq!(el.props.get("id"), Some(&PropValue::from("b")));
    }

    #[test]
    fn same_type_semantics() {
        let div = ElementKind::Host("div".into());
        let div2 = ElementKind::Host("div".to_string().into());
        let span = ElementKind::Host("span".into());
        assert!(div.same_type(&div2));
        assert!(!div.same_type(&span));

        let t1 = ElementKind::Text("a".into());
        let t2 = ElementKind::Text("b".into());
        assert!(t1.same_type(&t2), "text content is not part of the type");
        assert!(!t1.same_type(&div));

        let a = ElementKind::Component(comp_a);
        let a2 = ElementKind::Component(comp_a);
        let b = ElementKind::Component(comp_b);
        assert!(a.same_type(&a2));
        assert!(!a.same_type(&b));
    }

    #[test]
    fn event_name_strips_prefix_and_lowercases() {
        assert_eq!(event_name("onClick").as_deref(), Some("click"));
        assert_eq!(event_name("onMouseDown").as_deref(), Some("mousedown"));
        assert_eq!(event_name("id"), None);
        assert_eq!(event_name("on"), None, "bare prefix is not an event key");
    }

    #[test]
    fn listener_equality_is_identity() {
        let l1: Listener = Rc::new(|| {});
        let l2: Listener = Rc::new(|| {});
        assert_eq!(
            PropValue::Listener(l1.clone()),
            PropValue::Listener(l1.clone()),
            "same allocation compares equal"
        );
        assert_ne!(PropValue::Listener(l1), PropValue::Listener(l2));
    }
}
