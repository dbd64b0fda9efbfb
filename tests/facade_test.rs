//! Top-level helpers: detached factories, `bunny()` and the persisted helpers.

#![cfg(not(target_arch = "wasm32"))]

use bunny::prelude::*;
use rstest::{fixture, rstest};

#[fixture]
fn no_keys() {
	configure(Settings::default().without_element_keys());
}

#[rstest]
fn test_detached_factories_build_expected_markup(#[from(no_keys)] _settings: ()) {
	let table = bunny::table();
	let header = bunny::row();
	header.add_header("Name").add_header("Age");
	let line = bunny::row();
	line.append(&bunny::td("bunny")).append(&bunny::td(""));
	table.add_row(&header).add_row(&line);

	assert_eq!(
		table.node().outer_html(),
		"<table><tr><th>Name</th><th>Age</th></tr><tr><td>bunny</td><td></td></tr></table>"
	);
}

#[rstest]
#[case(0, "h1")]
#[case(3, "h3")]
#[case(9, "h6")]
fn test_title_clamps_level(#[from(no_keys)] _settings: (), #[case] level: u8, #[case] tag: &str) {
	let heading = bunny::title("Hello", level);
	assert_eq!(heading.tag_name(), tag);
	assert_eq!(heading.get_text(), "Hello");
}

#[rstest]
fn test_input_factory_sets_type(#[from(no_keys)] _settings: ()) {
	let field = bunny::input("email");
	field.value("hop@example.com");

	assert_eq!(field.get_attr("type").as_deref(), Some("email"));
	assert_eq!(field.get_value(), "hop@example.com");
}

#[rstest]
fn test_factories_assign_keys_when_enabled() {
	configure(Settings::default());

	let keyed = bunny::div();
	let generic = bunny::element("section").unwrap();

	assert_eq!(keyed.get_attr("_key").map(|key| key.len()), Some(20));
	assert!(generic.get_attr("_key").is_some());
	assert_ne!(keyed.get_attr("_key"), generic.get_attr("_key"));
}

#[rstest]
fn test_try_factories_return_keyed_elements() {
	configure(Settings::default());

	let table = bunny::try_table().unwrap();
	let row = bunny::try_row().unwrap();
	row.append(&bunny::try_th("Name").unwrap());
	table.add_row(&row);
	let heading = bunny::try_title("Hi", 2).unwrap();
	let field = bunny::try_input("email").unwrap();

	assert_eq!(table.get_html().matches("_key").count(), 2);
	assert_eq!(heading.tag_name(), "h2");
	assert_eq!(heading.get_text(), "Hi");
	assert_eq!(field.get_attr("type").as_deref(), Some("email"));
	assert!(field.get_attr("_key").is_some());
	assert_eq!(bunny::try_ul().unwrap().kind(), Kind::List);
}

#[rstest]
fn test_invalid_tag_is_an_error(#[from(no_keys)] _settings: ()) {
	assert!(bunny::element("not a tag").is_err());
	assert!(bunny("").is_err());
}

#[rstest]
fn test_bunny_container_inserted_into_root(#[from(no_keys)] _settings: ()) {
	let card = bunny("article").unwrap();
	card.title("Carrots", 2);
	card.p("Crunchy.");
	let page = root();
	let slot = page.div();
	slot.id("cards");

	card.insert_in("#cards");

	assert_eq!(
		slot.get_html(),
		"<article><h2>Carrots</h2><p>Crunchy.</p></article>"
	);
	let found = page.select("#cards > article").unwrap().unwrap();
	assert_eq!(found.kind(), Kind::Generic);
	assert_eq!(found.dom_children().len(), 2);
}

#[rstest]
fn test_list_factories(#[from(no_keys)] _settings: ()) {
	let list = bunny::ul();
	list.append(&bunny::li("one"));
	list.add_item("<em>two</em>").unwrap();

	assert_eq!(list.get_html(), "<li>one</li><li><em>two</em></li>");
	assert_eq!(list.kind(), Kind::List);
}

#[rstest]
fn test_persisted_helpers_share_the_default_area() {
	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Prefs {
		theme: String,
	}

	bunny::set(
		"prefs",
		&Prefs {
			theme: "dark".to_string(),
		},
		None,
	);
	bunny::set("visits", &3, Some(TimeDelta::hours(1)));
	bunny::set("gone", &"soon", Some(TimeDelta::milliseconds(-1)));

	assert_eq!(
		bunny::get::<Prefs>("prefs"),
		Some(Prefs {
			theme: "dark".to_string()
		})
	);
	let all = bunny::all();
	assert_eq!(all.len(), 2);
	assert_eq!(all["visits"], json!(3));

	bunny::clear("prefs");
	assert_eq!(bunny::get::<Prefs>("prefs"), None);
	assert_eq!(bunny::get::<String>("gone"), None);
}

#[rstest]
fn test_root_state_through_prelude(#[from(no_keys)] _settings: ()) {
	let page = root();
	let count = page.create_state("facade-count", 0).unwrap();
	let label = page.p("");
	let _binding = count.bind({
		let label = label.clone();
		move |value| {
			label.text(&format!("Clicked {value} times"));
		}
	});

	let plus = page.button("+1");
	plus.when("click", move |_, _| count.update(|n| n + 1));
	plus.node().dispatch_event("click");
	plus.node().dispatch_event("click");

	assert_eq!(label.get_text(), "Clicked 2 times");
}
