//! Building, querying and wiring a small page against the in-memory document.

#![cfg(not(target_arch = "wasm32"))]

use std::cell::RefCell;
use std::rc::Rc;

use bunny_core::{Settings, configure};
use bunny_dom::kinds::{Input, List, ListItem, TableRow};
use bunny_dom::{Container, Document, Element, Generic, Kind, ReadyState, Root, same_scope};
use rstest::{fixture, rstest};

#[fixture]
fn root() -> Root {
	configure(Settings::default().without_element_keys());
	let root = Root::global();
	root.html("");
	root
}

#[rstest]
fn test_todo_list_page(root: Root) {
	let todos = root.create_state("todos", Vec::<String>::new()).unwrap();
	let input = root.input("text");
	input.id("new-todo");
	let list = root.ul();
	list.id("todo-list");

	let rendered = list.clone();
	let _binding = todos.bind(move |items| {
		rendered.html("");
		for item in items {
			rendered.li(item);
		}
	});

	let field = input.clone();
	let store = todos.clone();
	root.button("Add").when("click", move |_, _| {
		let text = field.get_value();
		store.modify(|items| items.push(text));
		field.value("");
	});

	input.value("Feed the bunny");
	root.select("button").unwrap().unwrap().node().dispatch_event("click");
	input.value("Clean the hutch");
	root.select("button").unwrap().unwrap().node().dispatch_event("click");

	assert_eq!(input.get_value(), "");
	assert_eq!(
		list.get_html(),
		"<li>Feed the bunny</li><li>Clean the hutch</li>"
	);
	let items = root.select_all("#todo-list li").unwrap();
	assert_eq!(items.len(), 2);
	assert!(items.iter().all(|item| item.kind() == Kind::ListItem));
}

#[rstest]
fn test_table_built_by_chaining_through_parents(root: Root) {
	let table = root.table();
	table
		.row()
		.th("Name")
		.parent_as::<TableRow>()
		.unwrap()
		.th("Age");
	table.row().td("bunny").parent_as::<TableRow>().unwrap().td("3");

	assert_eq!(
		table.get_html(),
		"<tr><th>Name</th><th>Age</th></tr><tr><td>bunny</td><td>3</td></tr>"
	);
	assert_eq!(table.children().len(), 2);

	let mut striped = 0;
	table.map(|row| {
		row.add_class("striped");
		striped += 1;
	});
	assert_eq!(striped, 2);
	assert_eq!(root.select_all("tr.striped").unwrap().len(), 2);
}

#[rstest]
fn test_parent_keeps_builder_identity(root: Root) {
	let section = root.element("section").unwrap();
	let paragraph = section.p("hello");

	let parent = paragraph.parent().unwrap();
	parent.p("world");

	assert!(same_scope(&parent, &section));
	assert_eq!(section.children().len(), 2);
	assert_eq!(section.get_html(), "<p>hello</p><p>world</p>");
}

#[rstest]
fn test_moved_element_parent_is_its_new_container(root: Root) {
	let first = root.div();
	first.id("first");
	let second = root.div();
	second.id("second");
	let item = first.p("moving");

	item.insert_in("#second");

	let parent = item.parent().unwrap();
	assert!(!same_scope(&parent, &first));
	assert!(parent.node().is_same_node(second.node()));
	assert_eq!(first.get_html(), "");
}

#[rstest]
fn test_detached_elements_join_the_tree(root: Root) {
	let list = Element::<List>::ol().unwrap();
	list.add_item("<b>first</b>").unwrap();
	let item = Element::<ListItem>::new().unwrap();
	item.text("second");
	list.append(&item);

	list.insert_in(&*root);

	assert_eq!(
		root.get_html(),
		"<ol><li><b>first</b></li><li>second</li></ol>"
	);
	let wrapped = Container::wrap(list);
	assert_eq!(wrapped.dom_children().len(), 2);
	assert!(wrapped.children().is_empty());
}

#[rstest]
fn test_downcast_by_tag(root: Root) {
	let input: Container<Generic> = root.element("input").unwrap();

	let typed = input.downcast::<Input>().unwrap();
	typed.value("42");

	assert_eq!(typed.get_value(), "42");
	assert!(input.downcast::<List>().is_none());
}

#[rstest]
fn test_element_keys_follow_settings() {
	configure(Settings::default());
	let page = Container::new("main").unwrap();
	let keyed = page.div();

	configure(Settings::default().without_element_keys());
	let plain = page.div();

	assert_eq!(keyed.get_attr("_key").map(|key| key.len()), Some(20));
	assert_eq!(plain.get_attr("_key"), None);
}

#[rstest]
fn test_ready_runs_callbacks_in_registration_order() {
	let document = Document::global();
	document.set_ready_state(ReadyState::Loading);
	let order = Rc::new(RefCell::new(Vec::new()));
	for step in 1..=3 {
		let order = order.clone();
		Root::global().ready(move || order.borrow_mut().push(step));
	}

	document.dispatch_dom_content_loaded();
	document.dispatch_dom_content_loaded();

	assert_eq!(*order.borrow(), vec![1, 2, 3]);
	assert_eq!(document.ready_state(), ReadyState::Interactive);
}

#[rstest]
fn test_structural_selectors_match_the_browser(root: Root) {
	let table = root.table();
	table
		.row()
		.th("Name")
		.parent_as::<TableRow>()
		.unwrap()
		.th("Age");

	let last = root.select("table th:last-child").unwrap().unwrap();
	let first = root.select("table th:first-child").unwrap().unwrap();

	assert_eq!(last.get_text(), "Age");
	assert_eq!(first.get_text(), "Name");
	assert_eq!(root.select_all("tr > th:nth-child(2)").unwrap().len(), 1);
	assert!(root.select("th:hover").is_err());
}
