//! Pure reducer: folds actions into [`AppState`] and emits effects.

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::locale::TYPE_FILTERS;
use crate::state::AppState;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => start_page_load(state),
        Action::PageLoadMore => {
            if !state.has_more {
                return DispatchResult::unchanged();
            }
            start_page_load(state)
        }
        Action::PageDidLoad {
            records,
            has_more,
            failures,
        } => {
            state.list_loading = false;
            state.offset += records.len();
            state.has_more = has_more;
            state.records.extend(records);
            state.rebuild_visible();
            state.message = if failures.is_empty() {
                None
            } else {
                Some(format!("hydration failed for: {}", failures.join("; ")))
            };
            DispatchResult::changed()
        }
        Action::PageDidError(error) => {
            state.list_loading = false;
            state.message = Some(format!("Page load error: {error}"));
            DispatchResult::changed()
        }

        Action::SelectionMove(delta) => move_selection(state, delta as isize),
        Action::SelectionPage(pages) => {
            // Rows available to the list once chrome is subtracted.
            let rows = state.terminal_size.1.saturating_sub(7).max(1) as isize;
            move_selection(state, rows * pages as isize)
        }
        Action::SelectionJumpTop => changed_if(state.set_selected_index(0)),
        Action::SelectionJumpBottom => {
            let last = state.visible_indices.len().saturating_sub(1);
            changed_if(state.set_selected_index(last))
        }
        Action::GallerySelect(index) => changed_if(state.set_selected_index(index)),

        Action::SearchStart => {
            state.search.active = true;
            state.search.query.clear();
            state.rebuild_visible();
            DispatchResult::changed()
        }
        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            state.rebuild_visible();
            DispatchResult::changed()
        }
        Action::SearchSubmit => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            DispatchResult::changed()
        }
        Action::SearchInput(ch) => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.query.push(ch);
            state.rebuild_visible();
            DispatchResult::changed()
        }
        Action::SearchBackspace => {
            if !state.search.active || state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            state.rebuild_visible();
            DispatchResult::changed()
        }

        Action::TypeFilterNext => cycle_type_filter(state, 1),
        Action::TypeFilterPrev => cycle_type_filter(state, -1),
        Action::TypeFilterClear => {
            if state.type_filter.is_none() {
                return DispatchResult::unchanged();
            }
            state.type_filter = None;
            state.rebuild_visible();
            DispatchResult::changed()
        }
        Action::SortToggle => {
            state.sort_key = state.sort_key.toggle();
            state.rebuild_visible();
            DispatchResult::changed()
        }

        Action::DetailOpen => {
            let slot = match state.visible_indices.get(state.selected_index) {
                Some(&slot) => slot,
                None => return DispatchResult::unchanged(),
            };
            let (name, abilities) = match state.records.get(slot).and_then(Option::as_ref) {
                Some(record) => (record.name.clone(), record.abilities.clone()),
                None => return DispatchResult::unchanged(),
            };
            state.detail_index = Some(slot);
            state.ability_texts = DataResource::Loading;
            DispatchResult::changed_with(Effect::LoadAbilityTexts {
                name,
                abilities,
                locale: state.locale.clone(),
            })
        }
        Action::DetailClose => {
            if state.detail_index.is_none() {
                return DispatchResult::unchanged();
            }
            state.detail_index = None;
            state.ability_texts = DataResource::Empty;
            DispatchResult::changed()
        }
        Action::AbilityTextsDidLoad { name, texts } => {
            // Texts may land after the overlay moved on to another
            // record; only the record still on screen may accept them.
            let current = state.detail_record().map(|record| record.name.clone());
            if current.as_deref() != Some(name.as_str()) {
                return DispatchResult::unchanged();
            }
            state.ability_texts = DataResource::Loaded(texts);
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }
        Action::Tick => {
            if state.list_loading || state.ability_texts.is_loading() {
                state.tick = state.tick.wrapping_add(1);
                return DispatchResult::changed();
            }
            DispatchResult::unchanged()
        }
        Action::Quit => DispatchResult::unchanged(),
    }
}

/// An in-flight page load swallows further requests instead of queueing
/// them.
fn start_page_load(state: &mut AppState) -> DispatchResult<Effect> {
    if state.list_loading {
        return DispatchResult::unchanged();
    }
    state.list_loading = true;
    state.message = None;
    DispatchResult::changed_with(Effect::LoadPage {
        offset: state.offset,
        limit: state.page_size,
        locale: state.locale.clone(),
    })
}

fn move_selection(state: &mut AppState, delta: isize) -> DispatchResult<Effect> {
    if state.visible_indices.is_empty() {
        return DispatchResult::unchanged();
    }
    let current = state.selected_index as isize;
    let last = (state.visible_indices.len() - 1) as isize;
    let next = (current + delta).clamp(0, last) as usize;
    changed_if(state.set_selected_index(next))
}

/// Steps the filter through every known type and the unfiltered state.
fn cycle_type_filter(state: &mut AppState, step: isize) -> DispatchResult<Effect> {
    let position = state
        .type_filter
        .as_deref()
        .and_then(|slug| TYPE_FILTERS.iter().position(|known| *known == slug));
    let next = match (position, step >= 0) {
        (None, true) => Some(0),
        (None, false) => Some(TYPE_FILTERS.len() - 1),
        (Some(at), true) if at + 1 == TYPE_FILTERS.len() => None,
        (Some(at), true) => Some(at + 1),
        (Some(0), false) => None,
        (Some(at), false) => Some(at - 1),
    };
    state.type_filter = next.map(|at| TYPE_FILTERS[at].to_string());
    state.rebuild_visible();
    DispatchResult::changed()
}

fn changed_if(changed: bool) -> DispatchResult<Effect> {
    if changed {
        DispatchResult::changed()
    } else {
        DispatchResult::unchanged()
    }
}
