//! Tracked control abstraction
//!
//! The synchronizer never touches elements directly. It sees them through
//! [`Control`], and only reads or writes a value after the element has shown
//! the [`HasStringValue`] capability. The browser binding lives in
//! `crate::web`; [`MemoryControl`] is the in-memory binding used natively
//! and in tests.

use std::cell::RefCell;
use std::rc::Rc;

/// Capability for elements that carry a string value
pub trait HasStringValue {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
}

/// A node in the page as seen by the synchronizer
pub trait Control: Sized {
    /// Element id (empty when the element has none)
    fn id(&self) -> String;

    fn has_class(&self, class: &str) -> bool;

    /// Value access, or `None` for elements without a value
    fn value_capability(&self) -> Option<&dyn HasStringValue>;

    /// Immediately preceding element sibling, the companion candidate
    fn previous_sibling(&self) -> Option<Self>;
}

#[derive(Debug, Default)]
struct NodeData {
    id: String,
    classes: Vec<String>,
    value: Option<String>,
    previous: Option<MemoryControl>,
}

/// Shared-handle in-memory element
///
/// Clones refer to the same node, so a value written through one handle is
/// visible through all of them, as with DOM element references.
#[derive(Debug, Clone, Default)]
pub struct MemoryControl {
    node: Rc<RefCell<NodeData>>,
}

impl MemoryControl {
    /// Value-carrying element with an id (an `<input>` or `<select>`)
    pub fn input(id: &str, value: &str) -> Self {
        let control = Self::default();
        {
            let mut node = control.node.borrow_mut();
            node.id = id.to_string();
            node.value = Some(value.to_string());
        }
        control
    }

    /// Value-carrying element without an id (a slider readout)
    pub fn display(value: &str) -> Self {
        Self::input("", value)
    }

    /// Element with no value at all (a `<div>` or `<label>`)
    pub fn plain(id: &str) -> Self {
        let control = Self::default();
        control.node.borrow_mut().id = id.to_string();
        control
    }

    pub fn with_class(self, class: &str) -> Self {
        self.node.borrow_mut().classes.push(class.to_string());
        self
    }

    /// Place `sibling` immediately before this element
    pub fn after(self, sibling: &MemoryControl) -> Self {
        self.node.borrow_mut().previous = Some(sibling.clone());
        self
    }

    /// Current value, `None` for elements without one
    pub fn current_value(&self) -> Option<String> {
        self.node.borrow().value.clone()
    }
}

impl HasStringValue for MemoryControl {
    fn value(&self) -> String {
        self.current_value().unwrap_or_default()
    }

    fn set_value(&self, value: &str) {
        let mut node = self.node.borrow_mut();
        if node.value.is_some() {
            node.value = Some(value.to_string());
        }
    }
}

impl Control for MemoryControl {
    fn id(&self) -> String {
        self.node.borrow().id.clone()
    }

    fn has_class(&self, class: &str) -> bool {
        self.node.borrow().classes.iter().any(|c| c == class)
    }

    fn value_capability(&self) -> Option<&dyn HasStringValue> {
        if self.node.borrow().value.is_some() {
            Some(self as &dyn HasStringValue)
        } else {
            None
        }
    }

    fn previous_sibling(&self) -> Option<Self> {
        self.node.borrow().previous.clone()
    }
}
