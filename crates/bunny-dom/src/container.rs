//! Container: a tree-building context
//!
//! A [`Container`] wraps an [`Element`] and records the children created
//! through it. Every factory (`div`, `p`, `table`, ...) creates a child,
//! appends it to the context element and returns a new container scoped to
//! that child, so trees can be built either deeply (chaining through the
//! returned containers) or shallowly (mutating the current one).
//!
//! Containers sharing a context share one *scope*: the element, the record of
//! children built through it and a link to the scope that created it. The
//! link is what lets [`parent`](Container::parent) hand back the creating
//! builder, children record included.
//!
//! ## Example
//!
//! ```ignore
//! use bunny_dom::{Container, kinds::TableRow};
//!
//! let page = Container::new("section")?;
//! let table = page.table();
//! table.row().th("Name").parent_as::<TableRow>().unwrap().th("Age");
//! table.row().td("bunny");
//!
//! table.map(|row| {
//! 	row.add_class("striped");
//! });
//! ```

use core::fmt;
use core::ops::Deref;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bunny_core::Result;

use crate::dom::{AsNode, Document, Event, Node};
use crate::element::{Element, InsertTarget};
use crate::keys::assign_key;
use crate::kinds::{
	Button, Div, ElementKind, Generic, Heading, Input, Kind, List, ListItem, Paragraph, Table,
	TableField, TableHead, TableRow,
};

struct Scope {
	node: Node,
	children: RefCell<Vec<Rc<Scope>>>,
	parent: Weak<Scope>,
}

impl Scope {
	fn new(node: Node, parent: Weak<Scope>) -> Rc<Self> {
		Rc::new(Self {
			node,
			children: RefCell::new(Vec::new()),
			parent,
		})
	}
}

/// Tree-building context over an element of kind `K`.
///
/// Clones share the same scope. Mutators take `&self` and return `&Self`;
/// factories return the container of the new child.
pub struct Container<K: ElementKind = Generic> {
	scope: Rc<Scope>,
	element: Element<K>,
}

impl<K: ElementKind> Clone for Container<K> {
	fn clone(&self) -> Self {
		Self {
			scope: self.scope.clone(),
			element: self.element.clone(),
		}
	}
}

impl<K: ElementKind> fmt::Debug for Container<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Container")
			.field("element", &self.element)
			.field("children", &self.scope.children.borrow().len())
			.finish()
	}
}

/// Unwraps a fixed-tag factory result, logging the failure before panicking.
fn built<T>(tag: &str, result: Result<T>) -> T {
	result.unwrap_or_else(|error| {
		bunny_core::error_log!("Could not create <{}>: {}", tag, error);
		panic!("failed to create <{tag}> element: {error}")
	})
}

/// Generates a fixed-tag factory together with its `try_` form.
macro_rules! define_factory {
	($(#[$meta:meta])* $name:ident, $try_name:ident => $kind:ty) => {
		$(#[$meta])*
		///
		/// # Panics
		///
		/// Panics when the element cannot be created; see the `try_` form.
		pub fn $name(&self) -> Container<$kind> {
			built(<$kind as ElementKind>::TAG, self.$try_name())
		}

		$(#[$meta])*
		///
		/// # Errors
		///
		/// Fails when the document cannot create the element.
		pub fn $try_name(&self) -> Result<Container<$kind>> {
			Ok(self.spawn(Element::<$kind>::new()?))
		}
	};
	($(#[$meta:meta])* $name:ident(text), $try_name:ident => $kind:ty) => {
		$(#[$meta])*
		///
		/// # Panics
		///
		/// Panics when the element cannot be created; see the `try_` form.
		pub fn $name(&self, text: &str) -> Container<$kind> {
			built(<$kind as ElementKind>::TAG, self.$try_name(text))
		}

		$(#[$meta])*
		///
		/// # Errors
		///
		/// Fails when the document cannot create the element.
		pub fn $try_name(&self, text: &str) -> Result<Container<$kind>> {
			Ok(self.spawn_with_text(Element::<$kind>::new()?, text))
		}
	};
}

impl Container<Generic> {
	/// Creates a detached container over a new `<tag>` element.
	pub fn new(tag: &str) -> Result<Self> {
		Ok(Self::wrap(Element::create(tag)?))
	}

	/// Wraps an existing handle.
	pub fn from_node(node: Node) -> Self {
		Self::wrap(Element::from_node(node))
	}

	/// Wraps the first element of the document matching `selector`.
	///
	/// The browser accepts any CSS selector. The in-memory document accepts
	/// type, `#id`, `.class` and attribute selectors, the `:first-child`,
	/// `:last-child`, `:only-child` and `:nth-child` pseudo-classes, and the
	/// descendant and `>` combinators; other syntax is
	/// [`Error::InvalidSelector`](bunny_core::Error::InvalidSelector).
	pub fn select(selector: &str) -> Result<Option<Self>> {
		Ok(Document::try_global()?
			.query_selector(selector)?
			.map(Self::from_node))
	}
}

impl<K: ElementKind> Container<K> {
	/// Makes `element` the context of a new scope.
	pub fn wrap(element: Element<K>) -> Self {
		Self {
			scope: Scope::new(element.node().clone(), Weak::new()),
			element,
		}
	}

	fn from_scope(scope: Rc<Scope>) -> Self {
		let element = Element::wrap(scope.node.clone());
		Self { scope, element }
	}

	/// The context element.
	pub fn context(&self) -> &Element<K> {
		&self.element
	}

	/// The context element's handle.
	pub fn node(&self) -> &Node {
		self.element.node()
	}

	fn spawn<C: ElementKind>(&self, child: Element<C>) -> Container<C> {
		assign_key(child.node());
		self.element.append(&child);
		let scope = Scope::new(child.node().clone(), Rc::downgrade(&self.scope));
		self.scope.children.borrow_mut().push(scope.clone());
		Container {
			scope,
			element: child,
		}
	}

	fn spawn_with_text<C: ElementKind>(&self, child: Element<C>, text: &str) -> Container<C> {
		if !text.is_empty() {
			child.text(text);
		}
		self.spawn(child)
	}

	define_factory!(
		/// Builds a `<div>` child.
		div, try_div => Div
	);
	define_factory!(
		/// Builds a `<p>` child. Empty `text` leaves it empty.
		p(text), try_p => Paragraph
	);
	define_factory!(
		/// Builds a `<button>` child.
		button(text), try_button => Button
	);
	define_factory!(
		/// Builds a `<table>` child.
		table, try_table => Table
	);
	define_factory!(
		/// Builds a `<tr>` child.
		row, try_row => TableRow
	);
	define_factory!(
		/// Builds a `<th>` child.
		th(text), try_th => TableHead
	);
	define_factory!(
		/// Builds a `<td>` child.
		td(text), try_td => TableField
	);
	define_factory!(
		/// Builds a `<li>` child.
		li(text), try_li => ListItem
	);

	/// Builds an `<input type="...">` child.
	pub fn input(&self, input_type: &str) -> Container<Input> {
		built(Input::TAG, self.try_input(input_type))
	}

	/// Fallible form of [`input`](Self::input).
	pub fn try_input(&self, input_type: &str) -> Result<Container<Input>> {
		Ok(self.spawn(Element::<Input>::with_type(input_type)?))
	}

	/// Builds a `<ul>` child.
	pub fn ul(&self) -> Container<List> {
		built("ul", self.try_ul())
	}

	/// Fallible form of [`ul`](Self::ul).
	pub fn try_ul(&self) -> Result<Container<List>> {
		Ok(self.spawn(Element::<List>::ul()?))
	}

	/// Builds an `<ol>` child.
	pub fn ol(&self) -> Container<List> {
		built("ol", self.try_ol())
	}

	/// Fallible form of [`ol`](Self::ol).
	pub fn try_ol(&self) -> Result<Container<List>> {
		Ok(self.spawn(Element::<List>::ol()?))
	}

	/// Builds an `<h{level}>` child; `level` is clamped into 1..=6.
	pub fn title(&self, text: &str, level: u8) -> Container<Heading> {
		built("h1..h6", self.try_title(text, level))
	}

	/// Fallible form of [`title`](Self::title).
	pub fn try_title(&self, text: &str, level: u8) -> Result<Container<Heading>> {
		Ok(self.spawn(Element::<Heading>::heading(text, level)?))
	}

	/// Builds a child with an arbitrary tag.
	///
	/// # Errors
	///
	/// Fails when `tag` is not a valid tag name.
	pub fn element(&self, tag: &str) -> Result<Container<Generic>> {
		Ok(self.spawn(Element::create(tag)?))
	}

	/// Calls `callback` with a container for every child built through this
	/// scope, in creation order.
	pub fn map(&self, mut callback: impl FnMut(Container<Generic>)) -> &Self {
		let children: Vec<Rc<Scope>> = self.scope.children.borrow().clone();
		for child in children {
			callback(Container::from_scope(child));
		}
		self
	}

	/// Children built through this scope, including ones since detached.
	pub fn children(&self) -> Vec<Container<Generic>> {
		self.scope
			.children
			.borrow()
			.iter()
			.cloned()
			.map(Container::from_scope)
			.collect()
	}

	/// Current element children of the context element.
	pub fn dom_children(&self) -> Vec<Container<Generic>> {
		self.node()
			.children()
			.into_iter()
			.map(|node| Container::from_scope(Scope::new(node, Rc::downgrade(&self.scope))))
			.collect()
	}

	/// Returns the container one level up.
	///
	/// When the context element still sits under the scope that built it,
	/// that scope is returned with its children record. Otherwise the live
	/// parent element is wrapped in a fresh scope. `None` when detached.
	pub fn parent(&self) -> Option<Container<Generic>> {
		let dom_parent = self.node().parent_element()?;
		if let Some(scope) = self.scope.parent.upgrade()
			&& scope.node.is_same_node(&dom_parent)
		{
			return Some(Container::from_scope(scope));
		}
		Some(Container::from_scope(Scope::new(dom_parent, Weak::new())))
	}

	/// [`parent`](Self::parent) viewed as kind `P`.
	pub fn parent_as<P: ElementKind>(&self) -> Option<Container<P>> {
		self.parent()?.downcast()
	}

	/// Kind recovered from the context element's tag.
	pub fn kind(&self) -> Kind {
		self.element.kind()
	}

	/// Views this container as kind `T` when the tag allows it.
	pub fn downcast<T: ElementKind>(&self) -> Option<Container<T>> {
		T::accepts(&self.node().tag_name()).then(|| Container {
			scope: self.scope.clone(),
			element: Element::wrap(self.node().clone()),
		})
	}

	/// Forgets the static kind.
	pub fn into_generic(self) -> Container<Generic> {
		Container {
			scope: self.scope,
			element: self.element.into_generic(),
		}
	}

	/// Sets the `id` attribute.
	pub fn id(&self, id: &str) -> &Self {
		self.element.id(id);
		self
	}

	/// Adds classes; same as [`add_class`](Self::add_class).
	pub fn class(&self, classes: &str) -> &Self {
		self.add_class(classes)
	}

	/// See [`Element::style`].
	pub fn style(&self, styles: &[(&str, &str)]) -> &Self {
		self.element.style(styles);
		self
	}

	/// See [`Element::attr`].
	pub fn attr(&self, attributes: &[(&str, &str)]) -> &Self {
		self.element.attr(attributes);
		self
	}

	/// See [`Element::text`].
	pub fn text(&self, text: &str) -> &Self {
		self.element.text(text);
		self
	}

	/// See [`Element::html`].
	pub fn html(&self, html: &str) -> &Self {
		self.element.html(html);
		self
	}

	/// See [`Element::when`].
	pub fn when(&self, event: &str, handler: impl FnMut(&Element<K>, &Event) + 'static) -> &Self {
		self.element.when(event, handler);
		self
	}

	/// See [`Element::add_class`].
	pub fn add_class(&self, classes: &str) -> &Self {
		self.element.add_class(classes);
		self
	}

	/// See [`Element::remove_class`].
	pub fn remove_class(&self, classes: &str) -> &Self {
		self.element.remove_class(classes);
		self
	}

	/// See [`Element::insert_in`].
	pub fn insert_in<'a>(&self, target: impl Into<InsertTarget<'a>>) -> &Self {
		self.element.insert_in(target);
		self
	}

	/// Detaches the context element. The record in the creating scope is kept.
	pub fn remove(&self) {
		self.element.remove();
	}
}

impl<K: ElementKind> Deref for Container<K> {
	type Target = Element<K>;

	fn deref(&self) -> &Self::Target {
		&self.element
	}
}

impl<K: ElementKind> AsNode for Container<K> {
	fn as_node(&self) -> &Node {
		self.element.node()
	}
}

impl<'a, K: ElementKind> From<&'a Container<K>> for InsertTarget<'a> {
	fn from(container: &'a Container<K>) -> Self {
		Self::Node(container.node())
	}
}

/// Returns `true` when both containers share one scope.
pub fn same_scope<A: ElementKind, B: ElementKind>(a: &Container<A>, b: &Container<B>) -> bool {
	Rc::ptr_eq(&a.scope, &b.scope)
}
