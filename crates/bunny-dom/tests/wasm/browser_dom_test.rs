//! Browser tests for the web-sys backend.
//!
//! Run with `wasm-pack test --headless --chrome crates/bunny-dom`.

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use bunny_core::{Settings, configure};
use bunny_dom::kinds::{Button, Input, TableRow};
use bunny_dom::{Element, Root, same_scope};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn fresh_root() -> Root {
	configure(Settings::default().without_element_keys());
	let root = Root::global();
	root.html("");
	root
}

#[wasm_bindgen_test]
fn test_root_wraps_body() {
	let root = fresh_root();
	assert_eq!(root.tag_name(), "body");
}

#[wasm_bindgen_test]
fn test_builders_produce_markup() {
	let root = fresh_root();
	let table = root.table();
	table
		.row()
		.th("Name")
		.parent_as::<TableRow>()
		.unwrap()
		.th("Age");

	let found = root.select("table th:last-child").unwrap().unwrap();
	assert_eq!(found.get_text(), "Age");
	assert_eq!(root.select_all("th").unwrap().len(), 2);
}

#[wasm_bindgen_test]
fn test_style_and_classes() {
	let root = fresh_root();
	let box_ = root.div();
	box_.style(&[("backgroundColor", "red"), ("margin-top", "4px")])
		.add_class("a b a");

	assert_eq!(box_.get_style("background-color"), "red");
	assert_eq!(box_.get_style("marginTop"), "4px");
	assert!(box_.has_class("a") && box_.has_class("b"));
}

#[wasm_bindgen_test]
fn test_click_handler_receives_element() {
	let root = fresh_root();
	let clicks = Rc::new(Cell::new(0));
	let counter = clicks.clone();
	let button = root.button("Go");
	button.when("click", move |button: &Element<Button>, _| {
		counter.set(counter.get() + 1);
		button.text("Gone");
	});

	button
		.node()
		.as_element()
		.dyn_ref::<web_sys::HtmlElement>()
		.unwrap()
		.click();

	assert_eq!(clicks.get(), 1);
	assert_eq!(button.get_text(), "Gone");
}

#[wasm_bindgen_test]
fn test_input_value() {
	let root = fresh_root();
	let input = root.input("number");
	input.value("7");

	let typed = root
		.select("input")
		.unwrap()
		.unwrap()
		.downcast::<Input>()
		.unwrap();
	assert_eq!(typed.get_value(), "7");
}

#[wasm_bindgen_test]
fn test_parent_identity() {
	let root = fresh_root();
	let section = root.element("section").unwrap();
	let paragraph = section.p("hello");
	assert!(same_scope(&paragraph.parent().unwrap(), &section));
}

#[wasm_bindgen_test]
fn test_rejected_class_tokens_are_logged_not_thrown() {
	let root = fresh_root();
	let box_ = root.div();
	box_.add_class("kept");

	box_.node().remove_class("has space");
	box_.node().add_class("");
	box_.node().remove_attribute("never-set");

	assert!(box_.has_class("kept"));
	assert_eq!(box_.get_attr("class").as_deref(), Some("kept"));
}
