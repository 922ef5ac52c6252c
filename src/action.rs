//! Every state transition in the app, dispatched through the store.

use serde::{Deserialize, Serialize};

use crate::state::{AbilityDescription, PokemonRecord};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    /// Kick off the first page load on startup.
    Init,
    /// Request the next page of the catalog.
    PageLoadMore,
    /// A page landed: one slot per list entry, `None` where hydration
    /// failed, plus the names that failed.
    PageDidLoad {
        records: Vec<Option<PokemonRecord>>,
        has_more: bool,
        failures: Vec<String>,
    },
    /// The page list request itself failed; the collection is untouched.
    PageDidError(String),

    /// Move the gallery cursor by a signed amount.
    SelectionMove(i16),
    /// Move the cursor by whole pages of the visible list.
    SelectionPage(i16),
    SelectionJumpTop,
    SelectionJumpBottom,
    /// Cursor set directly from the list widget.
    GallerySelect(usize),

    /// Enter search mode and clear the previous query.
    SearchStart,
    /// Leave search mode and drop the query.
    SearchCancel,
    /// Leave search mode keeping the query applied.
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    /// Cycle the type filter forward, through "no filter".
    TypeFilterNext,
    /// Cycle the type filter backward.
    TypeFilterPrev,
    TypeFilterClear,
    /// Flip between number and name ordering.
    SortToggle,

    /// Open the detail overlay for the selected record.
    DetailOpen,
    DetailClose,
    /// Localized ability texts for the named record arrived.
    AbilityTextsDidLoad {
        name: String,
        texts: Vec<AbilityDescription>,
    },

    UiTerminalResize(u16, u16),
    /// Drives the loading indicator animation.
    Tick,
    Quit,
}
