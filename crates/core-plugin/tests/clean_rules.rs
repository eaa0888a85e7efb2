mod common;

use common::Harness;

use core_plugin::CleanPlugin;
use serde_json::json;

/// The change binding re-cleans after every content mutation.
#[test]
fn change_event_triggers_cleaning() {
    let h = Harness::new();
    let a = h.instance("a", None);

    a.update_content("<div>kept</div><p></p><h2>  </h2>");

    assert_eq!(a.region().content(), "<div>kept</div>");
    assert!(a.is_dirty(), "cleaning does not consume the change");
}

/// Configured attributes are stripped wherever they appear.
#[test]
fn configured_attributes_are_stripped() {
    let h = Harness::new();
    let a = h.instance("a", None);

    a.update_content(r#"<div _moz_dirty="">text</div>"#);

    assert_eq!(a.region().content(), "<div>text</div>");
}

/// Stripping an inner empty tag can empty its parent; cleaning repeats
/// until the content is stable.
#[test]
fn nested_empty_tags_collapse() {
    let h = Harness::new();
    let a = h.instance("a", None);

    a.update_content("<p><p></p></p><div>x</div>");

    assert_eq!(a.region().content(), "<div>x</div>");
}

/// The button path cleans on demand without a change event.
#[test]
fn trigger_cleans_without_change() {
    let h = Harness::new();
    let a = h.instance("a", None);

    // Mutate the region behind the instance's back, as a host embedding the
    // core might.
    a.region().set_content("<p></p><div>x</div>");
    assert!(!a.is_dirty());

    CleanPlugin::trigger(&a).unwrap();

    assert_eq!(a.region().content(), "<div>x</div>");
    assert!(!a.is_dirty());
}

/// Strip lists are configurable per instance; overrides replace the default
/// lists wholesale.
#[test]
fn strip_lists_are_configurable() {
    let h = Harness::new();
    let region = core_editor::EditableRegion::new("b");
    region.set_content("");
    let config = core_editor::InstanceConfig::new(core_editor::Preset::base()).with_override(
        "clean",
        json!({ "strip_empty_tags": ["span"], "strip_attrs": [] }),
    );
    let b = core_editor::EditorInstance::new(
        region,
        config,
        std::rc::Rc::clone(&h.registry),
        h.notifier.clone(),
    );
    h.editors.adopt(&b);
    b.enable().unwrap();

    b.update_content("<span></span><p></p>");

    // Only span is in the configured list now.
    assert_eq!(b.region().content(), "<p></p>");
}

/// Cleaned content is what a save contributes.
#[test]
fn save_collects_cleaned_content() {
    let h = Harness::new();
    let a = h.instance("a", Some(common::multiple_mode()));

    a.update_content("<h1>title</h1><p></p>");
    core_plugin::SavePlugin::trigger(&a).unwrap();

    let sent = h.transport.sent();
    let serialized = sent[0].payload["content"].as_str().unwrap();
    let mapping: serde_json::Value = serde_json::from_str(serialized).unwrap();
    assert_eq!(mapping["a"], "<h1>title</h1>");

    h.transport.succeed(0);
}
