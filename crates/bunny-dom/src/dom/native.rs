//! In-memory document used on non-WASM targets.
//!
//! Nodes are reference counted; a parent owns its children and children
//! point back through a weak link. Markup passed to `set_inner_html` is kept
//! verbatim rather than parsed.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};

use bunny_core::{Error, Result, warn_log};

use super::ReadyState;
use super::selector::SelectorList;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

type Listener = Rc<RefCell<dyn FnMut(&Event)>>;

enum Content {
	Element {
		tag: String,
		attributes: Vec<(String, String)>,
		value: Option<String>,
	},
	Text(String),
	Markup(String),
}

struct NodeData {
	content: RefCell<Content>,
	parent: RefCell<Weak<NodeData>>,
	children: RefCell<Vec<Node>>,
	listeners: RefCell<Vec<(String, Listener)>>,
}

/// Handle to a node of the in-memory document.
///
/// Clones are handles to the same node.
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

/// A dispatched event.
#[derive(Clone)]
pub struct Event {
	event_type: String,
	target: Node,
	current_target: RefCell<Option<Node>>,
	propagation_stopped: Rc<Cell<bool>>,
}

impl Event {
	/// Event type, e.g. `"click"`.
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	/// The node the event was dispatched on.
	pub fn target(&self) -> &Node {
		&self.target
	}

	/// Stops bubbling after the current node's listeners have run.
	pub fn stop_propagation(&self) {
		self.propagation_stopped.set(true);
	}
}

impl fmt::Debug for Event {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Event")
			.field("type", &self.event_type)
			.field("target", &self.target)
			.finish()
	}
}

/// Returns the node whose listener is currently handling `event`.
pub fn current_target(event: &Event) -> Option<Node> {
	event.current_target.borrow().clone()
}

fn validate_name(kind: &str, name: &str) -> Result<()> {
	let valid = name
		.chars()
		.next()
		.is_some_and(|first| first.is_ascii_alphabetic() || (kind == "attribute" && first == '_'))
		&& name
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'));
	if valid {
		Ok(())
	} else {
		Err(Error::Dom(format!("invalid {kind} name: '{name}'")))
	}
}

fn escape_text(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
	value.replace('&', "&amp;").replace('"', "&quot;")
}

fn strip_tags(markup: &str) -> String {
	let mut text = String::with_capacity(markup.len());
	let mut in_tag = false;
	for c in markup.chars() {
		match c {
			'<' => in_tag = true,
			'>' if in_tag => in_tag = false,
			_ if !in_tag => text.push(c),
			_ => {}
		}
	}
	text
}

fn parse_style(style: &str) -> Vec<(String, String)> {
	style
		.split(';')
		.filter_map(|declaration| {
			let (name, value) = declaration.split_once(':')?;
			let name = name.trim();
			let value = value.trim();
			(!name.is_empty() && !value.is_empty()).then(|| (name.to_string(), value.to_string()))
		})
		.collect()
}

fn serialize_style(declarations: &[(String, String)]) -> String {
	declarations
		.iter()
		.map(|(name, value)| format!("{name}: {value};"))
		.collect::<Vec<_>>()
		.join(" ")
}

impl Node {
	fn with_content(content: Content) -> Self {
		Self(Rc::new(NodeData {
			content: RefCell::new(content),
			parent: RefCell::new(Weak::new()),
			children: RefCell::new(Vec::new()),
			listeners: RefCell::new(Vec::new()),
		}))
	}

	fn element(tag: &str) -> Result<Self> {
		validate_name("tag", tag)?;
		Ok(Self::with_content(Content::Element {
			tag: tag.to_ascii_lowercase(),
			attributes: Vec::new(),
			value: None,
		}))
	}

	fn is_element(&self) -> bool {
		matches!(*self.0.content.borrow(), Content::Element { .. })
	}

	fn with_attributes<R>(&self, f: impl FnOnce(&mut Vec<(String, String)>) -> R) -> Option<R> {
		match &mut *self.0.content.borrow_mut() {
			Content::Element { attributes, .. } => Some(f(attributes)),
			_ => None,
		}
	}

	/// Lower-case tag name.
	pub fn tag_name(&self) -> String {
		match &*self.0.content.borrow() {
			Content::Element { tag, .. } => tag.clone(),
			Content::Text(_) => "#text".to_string(),
			Content::Markup(_) => "#markup".to_string(),
		}
	}

	/// Sets an attribute, keeping the position of an existing one.
	pub fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
		validate_name("attribute", name)?;
		let name = name.to_ascii_lowercase();
		self.with_attributes(|attributes| {
			match attributes.iter_mut().find(|(existing, _)| *existing == name) {
				Some((_, current)) => *current = value.to_string(),
				None => attributes.push((name, value.to_string())),
			}
		});
		Ok(())
	}

	/// Reads an attribute.
	pub fn attribute(&self, name: &str) -> Option<String> {
		let name = name.to_ascii_lowercase();
		self.with_attributes(|attributes| {
			attributes
				.iter()
				.find(|(existing, _)| *existing == name)
				.map(|(_, value)| value.clone())
		})
		.flatten()
	}

	/// Removes an attribute if present.
	pub fn remove_attribute(&self, name: &str) {
		let name = name.to_ascii_lowercase();
		self.with_attributes(|attributes| attributes.retain(|(existing, _)| *existing != name));
	}

	/// Sets one inline style property. An empty value removes it.
	pub fn set_style_property(&self, property: &str, value: &str) -> Result<()> {
		let mut declarations = parse_style(&self.attribute("style").unwrap_or_default());
		let value = value.trim();
		match declarations.iter().position(|(name, _)| name == property) {
			Some(index) if value.is_empty() => {
				declarations.remove(index);
			}
			Some(index) => declarations[index].1 = value.to_string(),
			None if value.is_empty() => {}
			None => declarations.push((property.to_string(), value.to_string())),
		}
		if declarations.is_empty() {
			self.remove_attribute("style");
			Ok(())
		} else {
			self.set_attribute("style", &serialize_style(&declarations))
		}
	}

	/// Reads one inline style property, empty when unset.
	pub fn style_property(&self, property: &str) -> String {
		parse_style(&self.attribute("style").unwrap_or_default())
			.into_iter()
			.find(|(name, _)| name == property)
			.map(|(_, value)| value)
			.unwrap_or_default()
	}

	/// Adds one class token.
	pub fn add_class(&self, class: &str) {
		if self.has_class(class) {
			return;
		}
		let current = self.attribute("class").unwrap_or_default();
		let updated = if current.trim().is_empty() {
			class.to_string()
		} else {
			format!("{} {class}", current.trim())
		};
		self.store_class(&updated);
	}

	/// Removes one class token.
	pub fn remove_class(&self, class: &str) {
		let Some(current) = self.attribute("class") else {
			return;
		};
		let updated: Vec<&str> = current
			.split_whitespace()
			.filter(|token| *token != class)
			.collect();
		self.store_class(&updated.join(" "));
	}

	fn store_class(&self, value: &str) {
		if let Err(error) = self.set_attribute("class", value) {
			warn_log!("updating class of <{}> failed: {}", self.tag_name(), error);
		}
	}

	/// Returns `true` when the class list contains `class`.
	pub fn has_class(&self, class: &str) -> bool {
		self.attribute("class")
			.is_some_and(|current| current.split_whitespace().any(|token| token == class))
	}

	fn replace_children(&self, replacement: Option<Node>) {
		let previous = std::mem::take(&mut *self.0.children.borrow_mut());
		for child in previous {
			*child.0.parent.borrow_mut() = Weak::new();
		}
		if let Some(node) = replacement {
			*node.0.parent.borrow_mut() = Rc::downgrade(&self.0);
			self.0.children.borrow_mut().push(node);
		}
	}

	/// Replaces all children with a single text node.
	pub fn set_text_content(&self, text: &str) {
		let node = (!text.is_empty()).then(|| Self::with_content(Content::Text(text.to_string())));
		self.replace_children(node);
	}

	/// Concatenated text of all descendants.
	pub fn text_content(&self) -> String {
		match &*self.0.content.borrow() {
			Content::Text(text) => return text.clone(),
			Content::Markup(markup) => return strip_tags(markup),
			Content::Element { .. } => {}
		}
		self.0
			.children
			.borrow()
			.iter()
			.map(Node::text_content)
			.collect()
	}

	/// Replaces all children with raw markup.
	pub fn set_inner_html(&self, html: &str) {
		let node = (!html.is_empty()).then(|| Self::with_content(Content::Markup(html.to_string())));
		self.replace_children(node);
	}

	/// Serialized children.
	pub fn inner_html(&self) -> String {
		self.0
			.children
			.borrow()
			.iter()
			.map(Node::outer_html)
			.collect()
	}

	/// Serialized node including its own tag.
	pub fn outer_html(&self) -> String {
		let (tag, attributes) = match &*self.0.content.borrow() {
			Content::Text(text) => return escape_text(text),
			Content::Markup(markup) => return markup.clone(),
			Content::Element {
				tag, attributes, ..
			} => (tag.clone(), attributes.clone()),
		};
		let mut html = format!("<{tag}");
		for (name, value) in &attributes {
			html.push_str(&format!(" {name}=\"{}\"", escape_attribute(value)));
		}
		html.push('>');
		if VOID_ELEMENTS.contains(&tag.as_str()) {
			return html;
		}
		html.push_str(&self.inner_html());
		html.push_str(&format!("</{tag}>"));
		html
	}

	fn contains(&self, other: &Node) -> bool {
		let mut current = Some(other.clone());
		while let Some(node) = current {
			if node.is_same_node(self) {
				return true;
			}
			current = node.parent_node();
		}
		false
	}

	/// Appends `child`, moving it out of its current parent first.
	///
	/// # Errors
	///
	/// Fails when `child` is this node or one of its ancestors.
	pub fn append_child(&self, child: &Node) -> Result<()> {
		if child.contains(self) {
			return Err(Error::Dom(
				"the new child contains the parent".to_string(),
			));
		}
		child.remove();
		*child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
		self.0.children.borrow_mut().push(child.clone());
		Ok(())
	}

	fn parent_node(&self) -> Option<Node> {
		self.0.parent.borrow().upgrade().map(Node)
	}

	/// Parent element, if attached.
	pub fn parent_element(&self) -> Option<Node> {
		self.parent_node()
	}

	/// Element children in document order.
	pub fn children(&self) -> Vec<Node> {
		self.0
			.children
			.borrow()
			.iter()
			.filter(|child| child.is_element())
			.cloned()
			.collect()
	}

	/// Detaches the node from its parent.
	pub fn remove(&self) {
		let Some(parent) = self.parent_node() else {
			return;
		};
		parent
			.0
			.children
			.borrow_mut()
			.retain(|sibling| !sibling.is_same_node(self));
		*self.0.parent.borrow_mut() = Weak::new();
	}

	/// Registers `listener` for `event_type`. Listeners live as long as the
	/// node; one that captures a handle to the node forms a cycle and is never
	/// freed.
	pub fn add_event_listener(&self, event_type: &str, listener: impl FnMut(&Event) + 'static) {
		let listener: Listener = Rc::new(RefCell::new(listener));
		self.0
			.listeners
			.borrow_mut()
			.push((event_type.to_string(), listener));
	}

	/// Dispatches an event of `event_type` on this node and bubbles it to
	/// its ancestors.
	pub fn dispatch_event(&self, event_type: &str) -> Event {
		let event = Event {
			event_type: event_type.to_string(),
			target: self.clone(),
			current_target: RefCell::new(None),
			propagation_stopped: Rc::new(Cell::new(false)),
		};
		let mut current = Some(self.clone());
		while let Some(node) = current {
			let listeners: Vec<Listener> = node
				.0
				.listeners
				.borrow()
				.iter()
				.filter(|(kind, _)| kind == event_type)
				.map(|(_, listener)| listener.clone())
				.collect();
			*event.current_target.borrow_mut() = Some(node.clone());
			for listener in listeners {
				// A listener re-dispatching on its own node is skipped rather than re-entered
				if let Ok(mut listener) = listener.try_borrow_mut() {
					(*listener)(&event);
				}
			}
			if event.propagation_stopped.get() {
				break;
			}
			current = node.parent_node();
		}
		*event.current_target.borrow_mut() = None;
		event
	}

	/// Sets the live value of a form control.
	pub fn set_value(&self, new_value: &str) {
		if let Content::Element { value, .. } = &mut *self.0.content.borrow_mut() {
			*value = Some(new_value.to_string());
		}
	}

	/// Live value of a form control, falling back to its `value` attribute.
	pub fn value(&self) -> String {
		if let Content::Element { value: Some(value), .. } = &*self.0.content.borrow() {
			return value.clone();
		}
		self.attribute("value").unwrap_or_default()
	}

	/// Returns `true` when both handles refer to the same node.
	pub fn is_same_node(&self, other: &Node) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Returns `true` when this element matches `selector`.
	pub fn matches(&self, selector: &str) -> Result<bool> {
		Ok(SelectorList::parse(selector)?.matches(self))
	}

	fn collect_matches(&self, selectors: &SelectorList, include_self: bool, found: &mut Vec<Node>) {
		if include_self && self.is_element() && selectors.matches(self) {
			found.push(self.clone());
		}
		for child in self.0.children.borrow().iter() {
			child.collect_matches(selectors, true, found);
		}
	}

	/// First descendant matching `selector`.
	pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
		Ok(self.query_selector_all(selector)?.into_iter().next())
	}

	/// Every descendant matching `selector`, in document order.
	pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
		let selectors = SelectorList::parse(selector)?;
		let mut found = Vec::new();
		self.collect_matches(&selectors, false, &mut found);
		Ok(found)
	}
}

impl PartialEq for Node {
	fn eq(&self, other: &Self) -> bool {
		self.is_same_node(other)
	}
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Node(<{}>)", self.tag_name())
	}
}

struct DocumentData {
	root: Node,
	head: Node,
	body: Node,
	ready_state: Cell<ReadyState>,
	content_loaded: RefCell<Vec<Box<dyn FnOnce()>>>,
	timers: RefCell<Timers>,
}

struct Timer {
	due: u64,
	seq: u64,
	task: Box<dyn FnOnce()>,
}

/// Timer queue over a virtual clock that only advances when a task runs.
#[derive(Default)]
struct Timers {
	now: u64,
	next_seq: u64,
	queue: Vec<Timer>,
}

impl Timers {
	fn push(&mut self, delay_ms: u32, task: Box<dyn FnOnce()>) {
		let timer = Timer {
			due: self.now + u64::from(delay_ms),
			seq: self.next_seq,
			task,
		};
		self.next_seq += 1;
		self.queue.push(timer);
	}

	/// Removes the earliest due task; ties keep queueing order.
	fn pop(&mut self) -> Option<Box<dyn FnOnce()>> {
		let index = self
			.queue
			.iter()
			.enumerate()
			.min_by_key(|(_, timer)| (timer.due, timer.seq))
			.map(|(index, _)| index)?;
		let timer = self.queue.swap_remove(index);
		self.now = timer.due;
		Some(timer.task)
	}
}

/// The in-memory document of the current thread.
#[derive(Clone)]
pub struct Document(Rc<DocumentData>);

thread_local! {
	static DOCUMENT: Document = Document::blank();
}

impl Document {
	fn blank() -> Self {
		let (root, head, body) = (
			Node::with_content(Content::Element {
				tag: "html".to_string(),
				attributes: Vec::new(),
				value: None,
			}),
			Node::with_content(Content::Element {
				tag: "head".to_string(),
				attributes: Vec::new(),
				value: None,
			}),
			Node::with_content(Content::Element {
				tag: "body".to_string(),
				attributes: Vec::new(),
				value: None,
			}),
		);
		let _ = root.append_child(&head);
		let _ = root.append_child(&body);
		Self(Rc::new(DocumentData {
			root,
			head,
			body,
			ready_state: Cell::new(ReadyState::Complete),
			content_loaded: RefCell::new(Vec::new()),
			timers: RefCell::new(Timers::default()),
		}))
	}

	/// The document of the current thread.
	pub fn global() -> Self {
		DOCUMENT.with(Clone::clone)
	}

	/// Same as [`global`](Self::global); the in-memory document always exists.
	pub fn try_global() -> Result<Self> {
		Ok(Self::global())
	}

	/// Creates a detached element.
	pub fn create_element(&self, tag: &str) -> Result<Node> {
		Node::element(tag)
	}

	/// The `<html>` element.
	pub fn document_element(&self) -> Option<Node> {
		Some(self.0.root.clone())
	}

	/// The `<head>` element.
	pub fn head(&self) -> Result<Node> {
		Ok(self.0.head.clone())
	}

	/// The `<body>` element.
	pub fn body(&self) -> Result<Node> {
		Ok(self.0.body.clone())
	}

	/// First element of the document matching `selector`.
	pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
		Ok(self.query_selector_all(selector)?.into_iter().next())
	}

	/// Every element of the document matching `selector`.
	pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
		let selectors = SelectorList::parse(selector)?;
		let mut found = Vec::new();
		self.0.root.collect_matches(&selectors, true, &mut found);
		Ok(found)
	}

	/// Current loading phase.
	pub fn ready_state(&self) -> ReadyState {
		self.0.ready_state.get()
	}

	/// Forces the loading phase.
	pub fn set_ready_state(&self, state: ReadyState) {
		self.0.ready_state.set(state);
	}

	/// Runs `callback` once on `DOMContentLoaded`.
	pub fn on_content_loaded(&self, callback: impl FnOnce() + 'static) {
		self.0.content_loaded.borrow_mut().push(Box::new(callback));
	}

	/// Moves the document to `Interactive` and fires `DOMContentLoaded`.
	pub fn dispatch_dom_content_loaded(&self) {
		self.set_ready_state(ReadyState::Interactive);
		let callbacks = std::mem::take(&mut *self.0.content_loaded.borrow_mut());
		for callback in callbacks {
			callback();
		}
	}

	/// Queues `callback` as a timer task due `delay_ms` after the current
	/// virtual time. Tasks run on [`run_pending_tasks`](Self::run_pending_tasks)
	/// by due time, then in queueing order, as browser timers fire.
	pub fn defer(&self, delay_ms: u32, callback: impl FnOnce() + 'static) {
		self.0.timers.borrow_mut().push(delay_ms, Box::new(callback));
	}

	/// Runs queued tasks, including ones queued while running. Returns how
	/// many ran.
	pub fn run_pending_tasks(&self) -> usize {
		let mut ran = 0;
		loop {
			let next = self.0.timers.borrow_mut().pop();
			let Some(task) = next else {
				break;
			};
			task();
			ran += 1;
		}
		ran
	}
}

impl fmt::Debug for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("ready_state", &self.ready_state())
			.finish()
	}
}
