//! Application state: the hydrated record collection and the derived view.

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::locale::DEFAULT_LOCALE;

/// Loading indicator animation step.
pub const LOADING_ANIM_TICK_MS: u64 = 120;

/// Ability slot on a record, kept as a pointer so descriptions can be
/// fetched lazily when the detail view opens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityRef {
    pub name: String,
    pub url: String,
    pub is_hidden: bool,
}

/// One base stat, value capped by the API at 255.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatValue {
    pub name: String,
    pub value: u16,
}

/// One step of a flattened evolution chain, parent before children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionEntry {
    pub name: String,
    pub url: String,
}

/// Localized ability text resolved on demand for the detail view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityDescription {
    pub name: String,
    pub is_hidden: bool,
    pub description: String,
}

/// Fully hydrated catalog entry, merged from the detail, species and
/// evolution-chain endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonRecord {
    pub id: u32,
    pub name: String,
    /// Zero-padded display number, e.g. `025`.
    pub number: String,
    pub image_url: Option<String>,
    pub types: Vec<String>,
    pub height_m: f32,
    pub weight_kg: f32,
    pub base_experience: Option<u32>,
    pub abilities: Vec<AbilityRef>,
    pub stats: Vec<StatValue>,
    pub cry_latest: Option<String>,
    pub cry_legacy: Option<String>,
    pub evolution: Vec<EvolutionEntry>,
    pub description: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Number,
    Name,
}

impl SortKey {
    pub fn toggle(self) -> Self {
        match self {
            SortKey::Number => SortKey::Name,
            SortKey::Name => SortKey::Number,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Number => "Número",
            SortKey::Name => "Nombre",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub locale: String,
    pub page_size: usize,
    /// Append-only hydration slots. `None` marks an entry whose
    /// hydration failed; it keeps its position so later pages do not
    /// shift earlier ones.
    pub records: Vec<Option<PokemonRecord>>,
    /// Slots currently visible, already filtered and sorted.
    pub visible_indices: Vec<usize>,
    pub selected_index: usize,
    /// List offset for the next page request. Advances only after a
    /// page actually lands.
    pub offset: usize,
    pub has_more: bool,
    pub list_loading: bool,
    pub search: SearchState,
    pub type_filter: Option<String>,
    pub sort_key: SortKey,
    /// Slot of the record shown in the detail overlay.
    pub detail_index: Option<usize>,
    pub ability_texts: DataResource<Vec<AbilityDescription>>,
    pub message: Option<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE.to_string(), 20)
    }
}

impl AppState {
    pub fn new(locale: String, page_size: usize) -> Self {
        Self {
            terminal_size: (80, 24),
            locale,
            page_size,
            records: Vec::new(),
            visible_indices: Vec::new(),
            selected_index: 0,
            offset: 0,
            has_more: false,
            list_loading: false,
            search: SearchState::default(),
            type_filter: None,
            sort_key: SortKey::Number,
            detail_index: None,
            ability_texts: DataResource::Empty,
            message: None,
            tick: 0,
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.records.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn absent_count(&self) -> usize {
        self.records.len() - self.loaded_count()
    }

    pub fn visible_records(&self) -> impl Iterator<Item = &PokemonRecord> {
        self.visible_indices
            .iter()
            .filter_map(|&slot| self.records.get(slot).and_then(Option::as_ref))
    }

    pub fn selected_record(&self) -> Option<&PokemonRecord> {
        self.visible_indices
            .get(self.selected_index)
            .and_then(|&slot| self.records.get(slot))
            .and_then(Option::as_ref)
    }

    pub fn detail_record(&self) -> Option<&PokemonRecord> {
        self.detail_index
            .and_then(|slot| self.records.get(slot))
            .and_then(Option::as_ref)
    }

    /// Moves the gallery cursor, clamped to the visible range.
    /// Returns whether the cursor actually moved.
    pub fn set_selected_index(&mut self, index: usize) -> bool {
        let last = self.visible_indices.len().saturating_sub(1);
        let next = index.min(last);
        if next == self.selected_index {
            return false;
        }
        self.selected_index = next;
        true
    }

    /// Recomputes `visible_indices` from the current search query, type
    /// filter and sort key. Absent slots are dropped first, then text
    /// and type predicates apply, then a stable sort. Running it twice
    /// yields the same order.
    pub fn rebuild_visible(&mut self) {
        let query = self.search.query.to_lowercase();
        let mut matched: Vec<(usize, &PokemonRecord)> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(slot, record)| record.as_ref().map(|record| (slot, record)))
            .filter(|(_, record)| {
                let text_hit = query.is_empty()
                    || record.name.to_lowercase().contains(&query)
                    || record.number.contains(&query);
                let type_hit = self
                    .type_filter
                    .as_ref()
                    .map_or(true, |slug| record.types.iter().any(|owned| owned == slug));
                text_hit && type_hit
            })
            .collect();
        match self.sort_key {
            SortKey::Number => matched.sort_by_key(|(_, record)| record.id),
            SortKey::Name => {
                matched.sort_by(|(_, a), (_, b)| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            }
        }
        self.visible_indices = matched.into_iter().map(|(slot, _)| slot).collect();
        if self.selected_index >= self.visible_indices.len() {
            self.selected_index = self.visible_indices.len().saturating_sub(1);
        }
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Collection")
                .entry("slots", ron_string(&self.records.len()))
                .entry("loaded", ron_string(&self.loaded_count()))
                .entry("absent", ron_string(&self.absent_count()))
                .entry("visible", ron_string(&self.visible_indices.len()))
                .entry("offset", ron_string(&self.offset))
                .entry("has_more", ron_string(&self.has_more)),
            DebugSection::new("View")
                .entry("search", ron_string(&self.search.query))
                .entry("search_active", ron_string(&self.search.active))
                .entry("type_filter", ron_string(&self.type_filter))
                .entry("sort", ron_string(&self.sort_key))
                .entry("selected", ron_string(&self.selected_index))
                .entry("detail", ron_string(&self.detail_index)),
            DebugSection::new("Status")
                .entry("list_loading", ron_string(&self.list_loading))
                .entry("abilities_loading", ron_string(&self.ability_texts.is_loading()))
                .entry("message", ron_string(&self.message)),
        ]
    }
}
