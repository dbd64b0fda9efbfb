//! Element kinds
//!
//! Each kind is a zero-sized marker naming the tag(s) an [`Element`] may wrap.
//! Kind-specific helpers live on `Element<Kind>`, so a table row offers
//! `add_cell` while a list offers `add_item`.
//!
//! ## Example
//!
//! ```ignore
//! use bunny_dom::{Element, kinds::{List, TableRow}};
//!
//! let list = Element::<List>::ul()?;
//! list.add_item("<b>first</b>");
//!
//! let row = Element::<TableRow>::create("tr")?;
//! row.add_header("Name").add_cell("bunny");
//! ```

use bunny_core::Result;

use crate::element::Element;

/// Marker trait implemented by every element kind.
pub trait ElementKind: 'static {
	/// Tag used when the kind is created without an explicit tag.
	const TAG: &'static str;

	/// Runtime tag of this kind.
	const KIND: Kind;

	/// Returns `true` when an element with `tag` may be viewed as this kind.
	fn accepts(tag: &str) -> bool {
		tag.eq_ignore_ascii_case(Self::TAG)
	}
}

/// Runtime counterpart of the kind markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
	/// Any element without a dedicated kind.
	Generic,
	/// `<div>`
	Div,
	/// `<p>`
	Paragraph,
	/// `<input>`
	Input,
	/// `<button>`
	Button,
	/// `<table>`
	Table,
	/// `<tr>`
	TableRow,
	/// `<th>`
	TableHead,
	/// `<td>`
	TableField,
	/// `<ul>` or `<ol>`
	List,
	/// `<li>`
	ListItem,
	/// `<h1>` to `<h6>`
	Heading,
}

impl Kind {
	/// Recovers the kind of an element from its tag name.
	pub fn of(tag: &str) -> Self {
		match tag.to_ascii_lowercase().as_str() {
			"div" => Self::Div,
			"p" => Self::Paragraph,
			"input" => Self::Input,
			"button" => Self::Button,
			"table" => Self::Table,
			"tr" => Self::TableRow,
			"th" => Self::TableHead,
			"td" => Self::TableField,
			"ul" | "ol" => Self::List,
			"li" => Self::ListItem,
			tag if Heading::accepts(tag) => Self::Heading,
			_ => Self::Generic,
		}
	}
}

/// Any element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Generic;

impl ElementKind for Generic {
	const TAG: &'static str = "div";
	const KIND: Kind = Kind::Generic;

	fn accepts(_tag: &str) -> bool {
		true
	}
}

macro_rules! define_kind {
	($(#[$meta:meta])* $name:ident, $tag:literal) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
		pub struct $name;

		impl ElementKind for $name {
			const TAG: &'static str = $tag;
			const KIND: Kind = Kind::$name;
		}
	};
}

define_kind!(
	/// `<div>` element
	Div, "div"
);
define_kind!(
	/// `<p>` element
	Paragraph, "p"
);
define_kind!(
	/// `<input>` element
	Input, "input"
);
define_kind!(
	/// `<button>` element
	Button, "button"
);
define_kind!(
	/// `<table>` element
	Table, "table"
);
define_kind!(
	/// `<tr>` element
	TableRow, "tr"
);
define_kind!(
	/// `<th>` element
	TableHead, "th"
);
define_kind!(
	/// `<td>` element
	TableField, "td"
);
define_kind!(
	/// `<li>` element
	ListItem, "li"
);

/// `<ul>` or `<ol>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct List;

impl ElementKind for List {
	const TAG: &'static str = "ul";
	const KIND: Kind = Kind::List;

	fn accepts(tag: &str) -> bool {
		tag.eq_ignore_ascii_case("ul") || tag.eq_ignore_ascii_case("ol")
	}
}

/// `<h1>` to `<h6>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Heading;

impl ElementKind for Heading {
	const TAG: &'static str = "h1";
	const KIND: Kind = Kind::Heading;

	fn accepts(tag: &str) -> bool {
		matches!(
			tag.to_ascii_lowercase().as_str(),
			"h1" | "h2" | "h3" | "h4" | "h5" | "h6"
		)
	}
}

impl Element<Input> {
	/// Creates an `<input>` with the given `type` attribute.
	pub fn with_type(input_type: &str) -> Result<Self> {
		let input = Self::new()?;
		input.node().set_attribute("type", input_type)?;
		Ok(input)
	}

	/// Sets the live value.
	pub fn value(&self, value: &str) -> &Self {
		self.node().set_value(value);
		self
	}

	/// Current live value.
	pub fn get_value(&self) -> String {
		self.node().value()
	}
}

impl Element<Table> {
	/// Appends a row.
	pub fn add_row(&self, row: &Element<TableRow>) -> &Self {
		self.append(row)
	}
}

impl Element<TableRow> {
	fn add_text_cell<C: ElementKind>(&self, text: &str) -> &Self {
		match Element::<C>::new() {
			Ok(cell) => {
				cell.text(text);
				self.append(&cell);
			}
			Err(error) => bunny_core::warn_log!("Could not create <{}>: {}", C::TAG, error),
		}
		self
	}

	/// Appends a `<th>` holding `text`.
	pub fn add_header(&self, text: &str) -> &Self {
		self.add_text_cell::<TableHead>(text)
	}

	/// Appends a `<td>` holding `text`.
	pub fn add_cell(&self, text: &str) -> &Self {
		self.add_text_cell::<TableField>(text)
	}
}

impl Element<List> {
	/// Creates an unordered list.
	pub fn ul() -> Result<Self> {
		Self::create("ul")
	}

	/// Creates an ordered list.
	pub fn ol() -> Result<Self> {
		Self::create("ol")
	}

	/// Appends a `<li>` whose markup is `html` and returns it.
	pub fn add_item(&self, html: &str) -> Result<Element<ListItem>> {
		let item = Element::<ListItem>::new()?;
		item.html(html);
		self.node().append_child(item.node())?;
		Ok(item)
	}
}

impl Element<Heading> {
	/// Creates `<h{level}>` holding `text`. Levels outside 1..=6 are clamped.
	pub fn heading(text: &str, level: u8) -> Result<Self> {
		let heading = Self::create(&format!("h{}", level.clamp(1, 6)))?;
		if !text.is_empty() {
			heading.text(text);
		}
		Ok(heading)
	}

	/// Heading level parsed from the tag.
	pub fn level(&self) -> u8 {
		self.tag_name()
			.strip_prefix('h')
			.and_then(|level| level.parse().ok())
			.unwrap_or(1)
	}
}
