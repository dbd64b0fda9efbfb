//! CSS selector subset for the in-memory document.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`
//! (bare, single or double quoted), the structural pseudo-classes
//! `:first-child`, `:last-child`, `:only-child` and `:nth-child(n | odd | even)`,
//! compound selectors, the descendant (whitespace) and child (`>`)
//! combinators, and `,` separated groups. Anything else is rejected with
//! [`Error::InvalidSelector`].

use bunny_core::{Error, Result};

use super::native::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSelector {
	name: String,
	value: Option<String>,
}

/// Position among the element children of the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pseudo {
	FirstChild,
	LastChild,
	OnlyChild,
	/// 1-based index.
	NthChild(usize),
	Odd,
	Even,
}

impl Pseudo {
	fn matches(self, node: &Node) -> bool {
		let Some(parent) = node.parent_element() else {
			return false;
		};
		let siblings = parent.children();
		let Some(index) = siblings.iter().position(|sibling| sibling.is_same_node(node)) else {
			return false;
		};
		let position = index + 1;
		match self {
			Self::FirstChild => position == 1,
			Self::LastChild => position == siblings.len(),
			Self::OnlyChild => siblings.len() == 1,
			Self::NthChild(n) => position == n,
			Self::Odd => position % 2 == 1,
			Self::Even => position % 2 == 0,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
	tag: Option<String>,
	id: Option<String>,
	classes: Vec<String>,
	attributes: Vec<AttributeSelector>,
	pseudos: Vec<Pseudo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
	Descendant,
	Child,
}

/// `compounds[i]` is joined to `compounds[i + 1]` by `combinators[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
	compounds: Vec<Compound>,
	combinators: Vec<Combinator>,
}

/// A parsed, comma separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList(Vec<Complex>);

impl SelectorList {
	/// Parses `input`, failing with [`Error::InvalidSelector`].
	pub(crate) fn parse(input: &str) -> Result<Self> {
		let groups = split_groups(input);
		let mut list = Vec::with_capacity(groups.len());
		for group in groups {
			list.push(Parser::new(input, group).complex()?);
		}
		Ok(Self(list))
	}

	/// Returns `true` when any selector of the list matches `node`.
	pub(crate) fn matches(&self, node: &Node) -> bool {
		self.0.iter().any(|complex| complex.matches(node))
	}
}

impl Complex {
	fn matches(&self, node: &Node) -> bool {
		self.matches_at(node, self.compounds.len() - 1)
	}

	fn matches_at(&self, node: &Node, index: usize) -> bool {
		if !self.compounds[index].matches(node) {
			return false;
		}
		if index == 0 {
			return true;
		}
		match self.combinators[index - 1] {
			Combinator::Child => node
				.parent_element()
				.is_some_and(|parent| self.matches_at(&parent, index - 1)),
			Combinator::Descendant => {
				let mut ancestor = node.parent_element();
				while let Some(current) = ancestor {
					if self.matches_at(&current, index - 1) {
						return true;
					}
					ancestor = current.parent_element();
				}
				false
			}
		}
	}
}

impl Compound {
	fn is_empty(&self) -> bool {
		self.tag.is_none()
			&& self.id.is_none()
			&& self.classes.is_empty()
			&& self.attributes.is_empty()
			&& self.pseudos.is_empty()
	}

	fn matches(&self, node: &Node) -> bool {
		if let Some(tag) = &self.tag
			&& tag != "*"
			&& !node.tag_name().eq_ignore_ascii_case(tag)
		{
			return false;
		}
		if let Some(id) = &self.id
			&& node.attribute("id").as_deref() != Some(id.as_str())
		{
			return false;
		}
		if !self.classes.iter().all(|class| node.has_class(class)) {
			return false;
		}
		let attributes = self.attributes.iter().all(|selector| {
			match (node.attribute(&selector.name), &selector.value) {
				(Some(actual), Some(expected)) => &actual == expected,
				(Some(_), None) => true,
				(None, _) => false,
			}
		});
		attributes && self.pseudos.iter().all(|pseudo| pseudo.matches(node))
	}
}

/// Splits on top-level commas, ignoring commas inside brackets, parentheses
/// or quotes.
fn split_groups(input: &str) -> Vec<&str> {
	let mut groups = Vec::new();
	let mut depth = 0_usize;
	let mut quote: Option<char> = None;
	let mut start = 0;
	for (index, c) in input.char_indices() {
		match (quote, c) {
			(Some(open), _) if c == open => quote = None,
			(Some(_), _) => {}
			(None, '"' | '\'') => quote = Some(c),
			(None, '[' | '(') => depth += 1,
			(None, ']' | ')') => depth = depth.saturating_sub(1),
			(None, ',') if depth == 0 => {
				groups.push(&input[start..index]);
				start = index + 1;
			}
			_ => {}
		}
	}
	groups.push(&input[start..]);
	groups
}

fn is_ident_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

struct Parser<'a> {
	source: &'a str,
	chars: Vec<char>,
	pos: usize,
}

impl<'a> Parser<'a> {
	fn new(source: &'a str, group: &str) -> Self {
		Self {
			source,
			chars: group.trim().chars().collect(),
			pos: 0,
		}
	}

	fn error(&self, reason: &str) -> Error {
		Error::InvalidSelector(format!("{reason} in '{}'", self.source))
	}

	fn peek(&self) -> Option<char> {
		self.chars.get(self.pos).copied()
	}

	fn skip_whitespace(&mut self) -> bool {
		let start = self.pos;
		while self.peek().is_some_and(char::is_whitespace) {
			self.pos += 1;
		}
		self.pos != start
	}

	fn complex(&mut self) -> Result<Complex> {
		if self.chars.is_empty() {
			return Err(self.error("empty selector"));
		}
		let mut compounds = vec![self.compound()?];
		let mut combinators = Vec::new();
		loop {
			let had_space = self.skip_whitespace();
			let combinator = match self.peek() {
				None => break,
				Some('>') => {
					self.pos += 1;
					self.skip_whitespace();
					Combinator::Child
				}
				Some(_) if had_space => Combinator::Descendant,
				Some(c) => return Err(self.error(&format!("unexpected '{c}'"))),
			};
			combinators.push(combinator);
			compounds.push(self.compound()?);
		}
		Ok(Complex {
			compounds,
			combinators,
		})
	}

	fn compound(&mut self) -> Result<Compound> {
		let mut compound = Compound::default();
		match self.peek() {
			Some('*') => {
				self.pos += 1;
				compound.tag = Some("*".to_string());
			}
			Some(c) if is_ident_char(c) => compound.tag = Some(self.ident()?.to_ascii_lowercase()),
			_ => {}
		}
		loop {
			match self.peek() {
				Some('#') => {
					self.pos += 1;
					compound.id = Some(self.ident()?);
				}
				Some('.') => {
					self.pos += 1;
					compound.classes.push(self.ident()?);
				}
				Some('[') => {
					self.pos += 1;
					compound.attributes.push(self.attribute()?);
				}
				Some(':') => {
					self.pos += 1;
					compound.pseudos.push(self.pseudo()?);
				}
				_ => break,
			}
		}
		if compound.is_empty() {
			return Err(self.error("expected a selector"));
		}
		Ok(compound)
	}

	fn ident(&mut self) -> Result<String> {
		let start = self.pos;
		while self.peek().is_some_and(is_ident_char) {
			self.pos += 1;
		}
		if start == self.pos {
			return Err(self.error("expected an identifier"));
		}
		Ok(self.chars[start..self.pos].iter().collect())
	}

	fn attribute(&mut self) -> Result<AttributeSelector> {
		self.skip_whitespace();
		let name = self.ident()?.to_ascii_lowercase();
		self.skip_whitespace();
		let value = match self.peek() {
			Some(']') => None,
			Some('=') => {
				self.pos += 1;
				self.skip_whitespace();
				Some(self.attribute_value()?)
			}
			_ => return Err(self.error("malformed attribute selector")),
		};
		self.skip_whitespace();
		if self.peek() != Some(']') {
			return Err(self.error("unterminated attribute selector"));
		}
		self.pos += 1;
		Ok(AttributeSelector { name, value })
	}

	fn pseudo(&mut self) -> Result<Pseudo> {
		let name = self.ident()?.to_ascii_lowercase();
		match name.as_str() {
			"first-child" => Ok(Pseudo::FirstChild),
			"last-child" => Ok(Pseudo::LastChild),
			"only-child" => Ok(Pseudo::OnlyChild),
			"nth-child" => self.nth_argument(),
			_ => Err(self.error(&format!("unsupported pseudo-class ':{name}'"))),
		}
	}

	fn nth_argument(&mut self) -> Result<Pseudo> {
		if self.peek() != Some('(') {
			return Err(self.error("expected '(' after ':nth-child'"));
		}
		self.pos += 1;
		self.skip_whitespace();
		let argument = self.ident()?.to_ascii_lowercase();
		self.skip_whitespace();
		if self.peek() != Some(')') {
			return Err(self.error("unterminated ':nth-child'"));
		}
		self.pos += 1;
		match argument.as_str() {
			"odd" => Ok(Pseudo::Odd),
			"even" => Ok(Pseudo::Even),
			index => match index.parse::<usize>() {
				Ok(n) if n > 0 => Ok(Pseudo::NthChild(n)),
				_ => Err(self.error(&format!("unsupported ':nth-child({index})'"))),
			},
		}
	}

	fn attribute_value(&mut self) -> Result<String> {
		match self.peek() {
			Some(quote @ ('"' | '\'')) => {
				self.pos += 1;
				let start = self.pos;
				while self.peek().is_some_and(|c| c != quote) {
					self.pos += 1;
				}
				if self.peek().is_none() {
					return Err(self.error("unterminated string"));
				}
				let value = self.chars[start..self.pos].iter().collect();
				self.pos += 1;
				Ok(value)
			}
			_ => self.ident(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::Document;
	use rstest::rstest;

	#[rstest]
	#[case("div")]
	#[case("*")]
	#[case("#main")]
	#[case("ul.menu > li.active")]
	#[case("table tr td")]
	#[case("input[type=text]")]
	#[case("a[href='/docs']")]
	#[case("[data-role=\"tab\"]")]
	#[case("h1, h2 , h3")]
	#[case("table th:last-child")]
	#[case("li:first-child, li:nth-child(2)")]
	#[case("tr:nth-child( even ) > td:only-child")]
	fn test_parse_valid(#[case] selector: &str) {
		assert!(SelectorList::parse(selector).is_ok(), "{selector}");
	}

	#[rstest]
	#[case("")]
	#[case("div,")]
	#[case("> p")]
	#[case("div >")]
	#[case("#")]
	#[case(".")]
	#[case("[type")]
	#[case("[type=]")]
	#[case("a[href='x]")]
	#[case("div!")]
	#[case("a:hover")]
	#[case("li:nth-child")]
	#[case("li:nth-child(0)")]
	#[case("li:nth-child(2n+1)")]
	#[case("li:nth-child(3")]
	#[case(":")]
	fn test_parse_invalid(#[case] selector: &str) {
		assert!(
			matches!(SelectorList::parse(selector), Err(Error::InvalidSelector(_))),
			"{selector}"
		);
	}

	#[rstest]
	fn test_comma_inside_attribute_value_is_not_a_group() {
		let list = SelectorList::parse("[title='a,b']").unwrap();
		assert_eq!(list.0.len(), 1);
	}

	#[rstest]
	fn test_child_and_descendant_combinators() {
		let document = Document::global();
		let list = document.create_element("ul").unwrap();
		let item = document.create_element("li").unwrap();
		let link = document.create_element("a").unwrap();
		list.add_class("menu");
		list.append_child(&item).unwrap();
		item.append_child(&link).unwrap();

		let child = SelectorList::parse("ul.menu > a").unwrap();
		let descendant = SelectorList::parse("ul.menu a").unwrap();
		let direct = SelectorList::parse("li > a").unwrap();

		assert!(!child.matches(&link));
		assert!(descendant.matches(&link));
		assert!(direct.matches(&link));
	}

	#[rstest]
	fn test_attribute_presence_and_value() {
		let document = Document::global();
		let input = document.create_element("input").unwrap();
		input.set_attribute("type", "checkbox").unwrap();

		assert!(SelectorList::parse("input[type]").unwrap().matches(&input));
		assert!(SelectorList::parse("[type=checkbox]").unwrap().matches(&input));
		assert!(!SelectorList::parse("[type=text]").unwrap().matches(&input));
		assert!(!SelectorList::parse("[name]").unwrap().matches(&input));
	}

	#[rstest]
	#[case("li:first-child", vec!["a"])]
	#[case("li:last-child", vec!["c"])]
	#[case("li:nth-child(2)", vec!["b"])]
	#[case("li:nth-child(odd)", vec!["a", "c"])]
	#[case("li:nth-child(even)", vec!["b"])]
	#[case("li:only-child", vec![])]
	#[case("ul > :first-child, li:last-child", vec!["a", "c"])]
	fn test_structural_pseudo_classes(#[case] selector: &str, #[case] expected: Vec<&str>) {
		let document = Document::global();
		let list = document.create_element("ul").unwrap();
		let items: Vec<Node> = ["a", "b", "c"]
			.into_iter()
			.map(|text| {
				let item = document.create_element("li").unwrap();
				item.set_text_content(text);
				list.append_child(&item).unwrap();
				item
			})
			.collect();

		let parsed = SelectorList::parse(selector).unwrap();
		let matched: Vec<String> = items
			.iter()
			.filter(|item| parsed.matches(item))
			.map(Node::text_content)
			.collect();

		assert_eq!(matched, expected, "{selector}");
	}

	#[rstest]
	fn test_child_pseudo_classes_need_a_parent() {
		let detached = Document::global().create_element("p").unwrap();

		assert!(!SelectorList::parse("p:first-child").unwrap().matches(&detached));
		assert!(SelectorList::parse("p").unwrap().matches(&detached));
	}
}
