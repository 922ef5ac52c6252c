//! Tests using EffectStoreTestHarness
//!
//! These tests demonstrate the integrated testing pattern where
//! store, component, and render testing are combined.

use pokegallery::{
    action::Action,
    components::{handle_search_keys, Component, GalleryView, GalleryViewProps},
    effect::Effect,
    reducer::reducer,
    state::{AbilityDescription, AbilityRef, AppState, PokemonRecord, SortKey},
};
use tui_dispatch::testing::*;
use tui_dispatch::NumericComponentId;

/// Helper to build a hydrated record
fn record(id: u32, name: &str, types: &[&str]) -> PokemonRecord {
    PokemonRecord {
        id,
        name: name.to_string(),
        number: format!("{id:03}"),
        image_url: None,
        types: types.iter().map(|slug| slug.to_string()).collect(),
        height_m: 0.7,
        weight_kg: 6.9,
        base_experience: Some(64),
        abilities: vec![AbilityRef {
            name: "overgrow".to_string(),
            url: "https://pokeapi.co/api/v2/ability/65/".to_string(),
            is_hidden: false,
        }],
        stats: Vec::new(),
        cry_latest: None,
        cry_legacy: None,
        evolution: Vec::new(),
        description: String::new(),
    }
}

/// Helper to create state with one page already landed
fn state_with_page() -> AppState {
    let mut state = AppState {
        records: vec![
            Some(record(1, "bulbasaur", &["grass", "poison"])),
            Some(record(4, "charmander", &["fire"])),
            Some(record(25, "pikachu", &["electric"])),
            Some(record(35, "clefairy", &["fairy"])),
        ],
        offset: 4,
        has_more: true,
        ..AppState::default()
    };
    state.rebuild_visible();
    state
}

// ============================================================================
// EffectStoreTestHarness Tests
// ============================================================================

#[test]
fn test_page_load_flow_with_harness() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    // Trigger the first page - should set loading and emit effect
    harness.dispatch_collect(Action::Init);
    harness.assert_state(|s| s.list_loading);

    // Verify effect was emitted
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::LoadPage { offset: 0, .. }));

    // Simulate async completion with one failed slot
    harness.complete_action(Action::PageDidLoad {
        records: vec![
            Some(record(1, "bulbasaur", &["grass", "poison"])),
            None,
            Some(record(3, "venusaur", &["grass", "poison"])),
        ],
        has_more: true,
        failures: vec!["ivysaur: request timed out".to_string()],
    });
    let (changed, total) = harness.process_emitted();

    assert_eq!(total, 1, "Should have processed 1 action");
    assert_eq!(changed, 1, "Action should have changed state");

    harness.assert_state(|s| !s.list_loading);
    harness.assert_state(|s| s.loaded_count() == 2);
    harness.assert_state(|s| s.absent_count() == 1);
    harness.assert_state(|s| s.offset == 3);
    harness.assert_state(|s| s.has_more);
    harness.assert_state(|s| {
        s.message.as_deref() == Some("hydration failed for: ivysaur: request timed out")
    });
}

#[test]
fn test_page_error_flow() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    // Trigger the first page
    harness.dispatch_collect(Action::Init);
    harness.assert_state(|s| s.list_loading);

    // Simulate error
    harness.complete_action(Action::PageDidError("503 Service Unavailable".into()));
    harness.process_emitted();

    harness.assert_state(|s| !s.list_loading);
    harness.assert_state(|s| s.records.is_empty());
    harness.assert_state(|s| {
        s.message.as_deref() == Some("Page load error: 503 Service Unavailable")
    });
}

#[test]
fn test_inflight_load_is_dropped() {
    let mut harness = EffectStoreTestHarness::new(state_with_page(), reducer);

    // The second request lands while the first is still in flight
    let results = harness.dispatch_all([Action::PageLoadMore, Action::PageLoadMore]);
    assert_eq!(results, vec![true, false]);

    let effects = harness.drain_effects();
    effects.effects_count(1);
}

#[test]
fn test_load_more_resumes_from_the_offset() {
    let mut harness = EffectStoreTestHarness::new(state_with_page(), reducer);

    harness.dispatch_collect(Action::PageLoadMore);

    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::LoadPage { offset: 4, .. }));
}

#[test]
fn test_dispatch_all() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    // Dispatch multiple actions at once
    let results = harness.dispatch_all([
        Action::SortToggle,
        Action::SortToggle,
        Action::SortToggle,
    ]);

    // All should have changed state
    assert_eq!(results, vec![true, true, true]);

    // Net result: toggled 3 times = name order
    harness.assert_state(|s| s.sort_key == SortKey::Name);
}

// ============================================================================
// Component + Store Integration Tests
// ============================================================================

#[test]
fn test_keyboard_sort_reorders_the_view() {
    let mut harness = EffectStoreTestHarness::new(state_with_page(), reducer);
    let mut component = GalleryView::new();

    // Send 's' key through component, get actions
    let actions = harness.send_keys::<NumericComponentId, _, _>("s", |state, event| {
        let props = GalleryViewProps {
            state,
            is_focused: true,
        };
        component
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });

    actions.assert_count(1);
    actions.assert_first(Action::SortToggle);

    // Dispatch the returned action
    for action in actions {
        harness.dispatch_collect(action);
    }

    // Clefairy (#035) sorts before Pikachu (#025) by name
    harness.assert_state(|s| s.sort_key == SortKey::Name);
    harness.assert_state(|s| {
        let names: Vec<&str> = s.visible_records().map(|r| r.name.as_str()).collect();
        names == ["bulbasaur", "charmander", "clefairy", "pikachu"]
    });
}

#[test]
fn test_search_keys_narrow_the_view() {
    let mut harness = EffectStoreTestHarness::new(state_with_page(), reducer);

    harness.dispatch_collect(Action::SearchStart);

    // Route raw keys through the search prompt handler
    let actions = harness.send_keys::<NumericComponentId, _, _>("p i k", |_state, event| {
        handle_search_keys(&event.kind)
    });
    for action in actions {
        harness.dispatch_collect(action);
    }

    harness.assert_state(|s| s.search.query == "pik");
    harness.assert_state(|s| {
        let names: Vec<&str> = s.visible_records().map(|r| r.name.as_str()).collect();
        names == ["pikachu"]
    });
}

#[test]
fn test_detail_flow_with_harness() {
    let mut harness = EffectStoreTestHarness::new(state_with_page(), reducer);

    // Opening the detail requests the ability texts lazily
    harness.dispatch_collect(Action::DetailOpen);
    harness.assert_state(|s| s.detail_index == Some(0));
    harness.assert_state(|s| s.ability_texts.is_loading());

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(
        |e| matches!(e, Effect::LoadAbilityTexts { name, .. } if name == "bulbasaur"),
    );

    // Simulate async completion
    harness.complete_action(Action::AbilityTextsDidLoad {
        name: "bulbasaur".to_string(),
        texts: vec![AbilityDescription {
            name: "overgrow".to_string(),
            is_hidden: false,
            description: "Potencia las plantas.".to_string(),
        }],
    });
    harness.process_emitted();

    harness.assert_state(|s| s.ability_texts.is_loaded());
    harness.assert_state(|s| s.ability_texts.data().map(|t| t.len()) == Some(1));

    // Closing drops the texts again
    harness.dispatch_collect(Action::DetailClose);
    harness.assert_state(|s| s.detail_index.is_none());
    harness.assert_state(|s| s.ability_texts.is_empty());
}

// ============================================================================
// Render Tests with Harness
// ============================================================================

#[test]
fn test_render_loading_page() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    let mut component = GalleryView::new();

    // Trigger loading
    harness.dispatch_collect(Action::Init);

    let output = harness.render_plain(80, 24, |frame, area, state| {
        let props = GalleryViewProps {
            state,
            is_focused: true,
        };
        component.render(frame, area, props);
    });

    assert!(
        output.contains("Loading page"),
        "Loading notice should be visible in output:\n{}",
        output
    );
}

#[test]
fn test_render_loaded_rows() {
    let mut harness = EffectStoreTestHarness::new(state_with_page(), reducer);
    let mut component = GalleryView::new();

    let output = harness.render_plain(80, 24, |frame, area, state| {
        let props = GalleryViewProps {
            state,
            is_focused: true,
        };
        component.render(frame, area, props);
    });

    // Rows carry the padded number and the localized type labels
    assert!(
        output.contains("#001"),
        "Padded number should be visible in output:\n{}",
        output
    );
    assert!(output.contains("Bulbasaur"));
    assert!(output.contains("Planta"));
    assert!(output.contains("Fuego"));
    assert!(output.contains("Showing 4 of 4 loaded"));
}

// ============================================================================
// Effect Assertions Tests
// ============================================================================

#[test]
fn test_effect_assertions() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    // Initially no effects
    let effects = harness.drain_effects();
    effects.effects_empty();

    // After init, should have exactly one effect
    harness.dispatch_collect(Action::Init);
    let effects = harness.drain_effects();
    effects.effects_not_empty();
    effects.effects_count(1);
    effects.effects_all_match(|e| matches!(e, Effect::LoadPage { .. }));
    effects.effects_none_match(|e| matches!(e, Effect::LoadAbilityTexts { .. }));
}

// ============================================================================
// Async Simulation Tests
// ============================================================================

#[test]
fn test_multiple_async_completions() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    // Queue up multiple async completions
    harness.complete_action(Action::PageDidLoad {
        records: vec![Some(record(1, "bulbasaur", &["grass", "poison"]))],
        has_more: true,
        failures: Vec::new(),
    });
    harness.complete_action(Action::UiTerminalResize(100, 40));

    // Process all at once
    let (changed, total) = harness.process_emitted();

    assert_eq!(total, 2);
    assert_eq!(changed, 2);

    // State should reflect both actions
    harness.assert_state(|s| s.loaded_count() == 1);
    harness.assert_state(|s| s.terminal_size == (100, 40));
}
