mod common;

use common::Harness;

use core_editor::EditorEvent;
use core_plugin::CancelPlugin;
use std::cell::Cell;
use std::rc::Rc;

/// A clean instance bypasses confirmation: reset and disable immediately.
#[test]
fn cancel_on_clean_instance_is_immediate() {
    let h = Harness::new();
    let a = h.instance("a", None);

    CancelPlugin::trigger(&a).unwrap();

    assert!(h.notifier.confirms().is_empty(), "no confirmation requested");
    assert!(!a.is_enabled());
    assert!(a.is_toolbar_hidden());
    assert_eq!(a.region().content(), "<p>a</p>");
}

/// A dirty instance requires explicit confirmation; nothing is discarded
/// until the user acknowledges the notice.
#[test]
fn cancel_on_dirty_instance_waits_for_confirmation() {
    let h = Harness::new();
    h.notifier.set_auto_hide(false);
    let a = h.instance("a", None);
    a.update_content("<h1>edited</h1>");

    CancelPlugin::trigger(&a).unwrap();

    assert_eq!(
        h.notifier.confirms(),
        ["There are unsaved changes. Discard them?"]
    );
    // Pre-acknowledgement: everything still as the user left it.
    assert_eq!(a.region().content(), "<h1>edited</h1>");
    assert!(a.is_enabled());

    h.notifier.run_parked_hides();

    assert_eq!(a.region().content(), "<p>a</p>");
    assert!(!a.is_enabled());
    assert!(a.is_toolbar_hidden());
    // Discarding restores content but not changed-since-load semantics.
    assert!(a.is_dirty());
}

/// The confirmation message is configurable per instance.
#[test]
fn cancel_confirm_message_is_configurable() {
    let h = Harness::new();
    h.notifier.set_auto_hide(false);
    let a = h.instance("a", None);
    // Override layer for the cancel plugin rides the same merge as save.
    let b = {
        use core_editor::{EditableRegion, EditorInstance, InstanceConfig, Preset};
        let region = EditableRegion::new("b");
        region.set_content("<p>b</p>");
        let config = InstanceConfig::new(Preset::base())
            .with_override("cancel", serde_json::json!({ "confirm_message": "Throw it away?" }));
        let editor = EditorInstance::new(
            region,
            config,
            Rc::clone(&h.registry),
            h.notifier.clone(),
        );
        h.editors.adopt(&editor);
        editor.enable().unwrap();
        editor
    };
    drop(a);

    b.update_content("<h1>edited</h1>");
    CancelPlugin::trigger(&b).unwrap();
    assert_eq!(h.notifier.confirms(), ["Throw it away?"]);
}

/// Discarding fires `cancel` on every member and applies the reset across
/// the unified set.
#[test]
fn cancel_discards_across_the_unified_set() {
    let h = Harness::new();
    let a = h.instance("a", None);
    let b = h.instance("b", None);

    let cancel_events = Rc::new(Cell::new(0));
    for editor in [&a, &b] {
        let cancel_events = Rc::clone(&cancel_events);
        editor.bind(
            EditorEvent::Cancel,
            "probe",
            Rc::new(move || cancel_events.set(cancel_events.get() + 1)),
        );
    }

    a.update_content("<h1>edited a</h1>");
    CancelPlugin::trigger(&a).unwrap();
    // Dirty origin + auto-hide notifier: the discard runs straight away.

    assert_eq!(cancel_events.get(), 2);
    assert_eq!(a.region().content(), "<p>a</p>");
    assert_eq!(b.region().content(), "<p>b</p>");
    assert!(!a.is_enabled());
    assert!(!b.is_enabled());
}

/// Cancel never touches a save already in flight: the parked request can
/// still complete and be counted after the discard.
#[test]
fn cancel_does_not_abort_dispatched_requests() {
    let h = Harness::new();
    let a = h.instance("a", Some(common::multiple_mode()));
    a.update_content("<h1>edited</h1>");

    core_plugin::SavePlugin::trigger(&a).unwrap();
    assert_eq!(h.transport.pending_count(), 1);

    CancelPlugin::trigger(&a).unwrap();
    assert_eq!(h.transport.pending_count(), 1, "request still in flight");

    h.transport.succeed(0);
    assert_eq!(
        h.notifier.confirms().last().unwrap(),
        "Successfully saved 1 content block(s)."
    );
    assert!(!a.is_dirty());
}
