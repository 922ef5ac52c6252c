//! Side effects emitted by the reducer and executed by the runtime.

use crate::state::AbilityRef;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Fetch one list page and hydrate every entry on it.
    LoadPage {
        offset: usize,
        limit: usize,
        locale: String,
    },
    /// Fetch localized descriptions for the abilities of one record.
    LoadAbilityTexts {
        name: String,
        abilities: Vec<AbilityRef>,
        locale: String,
    },
}
