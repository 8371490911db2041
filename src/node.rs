//! Structural representation of parsed XML.
//!
//! An XML element may appear once or be repeated, so a property of a
//! [`Node`] is held as a [`Value`] that is either a scalar, a nested node,
//! or an ordered list of either. Repeating a property promotes the single
//! occurrence to a list; nothing ever demotes a list back.

/// The value of a property in a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text-only element without attributes or children.
    Scalar(String),
    /// Element with attributes and/or child elements.
    Node(Node),
    /// Repeated element, in document order.
    List(Vec<Value>),
}

/// A parsed XML element: attributes, optional text and named children.
///
/// Children keep insertion order so that serialization reproduces the
/// original element order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<(String, Value)>,
}

impl Value {
    /// Shorthand for a scalar value.
    pub fn scalar(text: impl Into<String>) -> Self {
        Value::Scalar(text.into())
    }

    /// View this value as a sequence.
    ///
    /// A single occurrence is treated as a one-element sequence.
    pub fn items(&self) -> &[Value] {
        match self {
            Value::List(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    /// Get the text of a scalar value.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Get the node of an element value.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Text of the first occurrence, looking through lists and text-bearing nodes.
    pub fn first_text(&self) -> Option<&str> {
        match self.items().first()? {
            Value::Scalar(text) => Some(text),
            Value::Node(node) => node.text(),
            Value::List(_) => None,
        }
    }

    /// The `id` child of an element value, if it has one.
    pub fn id(&self) -> Option<&str> {
        self.as_node()?.get("id")?.first_text()
    }

    /// Whether this element carries an `id` child matching `id`.
    ///
    /// A repeated `id` child matches if any occurrence does.
    pub fn has_id(&self, id: &str) -> bool {
        self.as_node()
            .and_then(|node| node.get("id"))
            .is_some_and(|ids| ids.items().iter().any(|v| v.first_text() == Some(id)))
    }

    /// Turn this value into a node unless it already is one.
    pub fn ensure_node(&mut self) -> &mut Node {
        match self {
            Value::Node(node) => node,
            other => {
                *other = Value::Node(Node::new());
                other.ensure_node()
            }
        }
    }

    /// Add another occurrence, promoting a single value to a list.
    pub fn append(&mut self, value: Value) {
        match self {
            Value::List(items) => items.push(value),
            single => {
                let previous = std::mem::replace(single, Value::List(Vec::with_capacity(2)));
                *single = Value::List(vec![previous, value]);
            }
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Scalar(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Scalar(text)
    }
}

impl Node {
    /// Create an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style property insertion.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Text content of a mixed element.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Set the text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Get a property.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.children
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Get a property mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.children
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Check whether a property exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a property, replacing any previous value.
    pub fn insert(&mut self, name: &str, value: Value) {
        match self.get_mut(name) {
            Some(existing) => *existing = value,
            None => self.children.push((name.to_string(), value)),
        }
    }

    /// Get a property, inserting an empty node if it is missing.
    pub fn ensure_child(&mut self, name: &str) -> &mut Value {
        let pos = match self.children.iter().position(|(key, _)| key == name) {
            Some(pos) => pos,
            None => {
                self.children
                    .push((name.to_string(), Value::Node(Node::new())));
                self.children.len() - 1
            }
        };
        &mut self.children[pos].1
    }

    /// Add an occurrence of a property, promoting to a list when repeated.
    pub fn push_child(&mut self, name: &str, value: Value) {
        match self.get_mut(name) {
            Some(existing) => existing.append(value),
            None => self.children.push((name.to_string(), value)),
        }
    }

    /// Properties in document order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_single_is_one_element_sequence() {
        let value = Value::scalar("a");
        assert_eq!(value.items(), &[Value::scalar("a")]);
    }

    #[test]
    fn test_append_promotes_once() {
        let mut value = Value::scalar("a");
        value.append(Value::scalar("b"));
        assert_eq!(
            value,
            Value::List(vec![Value::scalar("a"), Value::scalar("b")])
        );

        value.append(Value::scalar("c"));
        assert_eq!(value.items().len(), 3);
    }

    #[test]
    fn test_push_child_repeated() {
        let mut node = Node::new();
        node.push_child("repository", Node::new().with("id", "one").into());
        node.push_child("repository", Node::new().with("id", "two").into());

        let repos = node.get("repository").unwrap();
        assert_eq!(repos.items().len(), 2);
        assert_eq!(repos.items()[1].id(), Some("two"));
    }

    #[test]
    fn test_has_id_checks_repeated_ids() {
        let mut node = Node::new().with("id", "first");
        node.push_child("id", Value::scalar("second"));
        let value = Value::Node(node);

        assert!(value.has_id("first"));
        assert!(value.has_id("second"));
        assert!(!value.has_id("third"));
    }

    #[test]
    fn test_ensure_child_keeps_existing() {
        let mut node = Node::new().with("servers", "");
        node.ensure_child("servers").ensure_node();
        node.ensure_child("mirrors");

        let names: Vec<_> = node.children().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["servers", "mirrors"]);
        assert_eq!(node.get("servers"), Some(&Value::Node(Node::new())));
    }

    #[test]
    fn test_ensure_node_replaces_scalar_and_list() {
        let mut scalar = Value::scalar("text");
        scalar.ensure_node().set_attribute("id", "a");
        assert_eq!(scalar.as_node().and_then(|n| n.attribute("id")), Some("a"));

        let mut list = Value::List(vec![Value::scalar("a"), Value::scalar("b")]);
        list.ensure_node();
        assert_eq!(list, Value::Node(Node::new()));
    }

    #[test]
    fn test_ensure_node_keeps_existing_node() {
        let mut value = Value::Node(Node::new().with("id", "feed"));
        value.ensure_node().push_child("url", Value::scalar("https://a"));

        assert_eq!(value.id(), Some("feed"));
        assert!(value.as_node().is_some_and(|n| n.contains("url")));
    }

    #[test]
    fn test_set_attribute_keeps_position() {
        let mut node = Node::new();
        node.set_attribute("xmlns", "old");
        node.set_attribute("version", "1");
        node.set_attribute("xmlns", "new");

        let attrs: Vec<_> = node.attributes().collect();
        assert_eq!(attrs, vec![("xmlns", "new"), ("version", "1")]);
    }

    #[test]
    fn test_first_text_reads_mixed_node() {
        let mut node = Node::new();
        node.set_attribute("combine.self", "override");
        node.set_text("https://repo.example.com/");
        assert_eq!(
            Value::Node(node).first_text(),
            Some("https://repo.example.com/")
        );
    }
}
