//! PokeAPI client: list pages, per-entry hydration and localized texts.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::locale::ABILITY_PLACEHOLDER;
use crate::state::{AbilityDescription, AbilityRef, EvolutionEntry, PokemonRecord, StatValue};

const API_BASE: &str = "https://pokeapi.co/api/v2";
const PAGE_CONCURRENCY: usize = 12;
/// Hard cap on flattened chain nodes, guards against cyclic payloads.
const MAX_CHAIN_NODES: usize = 64;
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default()
    })
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    results: Vec<NamedResource>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Debug, Deserialize)]
struct AbilitySlot {
    ability: NamedResource,
    is_hidden: bool,
}

#[derive(Debug, Deserialize)]
struct StatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Debug, Deserialize)]
struct CriesResponse {
    latest: Option<String>,
    legacy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    /// Decimeters on the wire.
    height: u32,
    /// Hectograms on the wire.
    weight: u32,
    base_experience: Option<u32>,
    types: Vec<TypeSlot>,
    abilities: Vec<AbilitySlot>,
    stats: Vec<StatSlot>,
    sprites: serde_json::Value,
    cries: Option<CriesResponse>,
    species: NamedResource,
}

#[derive(Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Debug, Deserialize)]
struct SpeciesResponse {
    flavor_text_entries: Vec<FlavorTextEntry>,
    evolution_chain: Option<ApiResource>,
}

#[derive(Debug, Deserialize)]
struct ChainLink {
    species: NamedResource,
    evolves_to: Vec<ChainLink>,
}

#[derive(Debug, Deserialize)]
struct EvolutionChainResponse {
    chain: ChainLink,
}

#[derive(Debug, Deserialize)]
struct AbilityResponse {
    flavor_text_entries: Vec<FlavorTextEntry>,
}

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    let response = response.error_for_status().map_err(|err| err.to_string())?;
    response.json::<T>().await.map_err(|err| err.to_string())
}

/// Result of loading one list page: one slot per entry, in list order.
#[derive(Debug)]
pub struct HydratedPage {
    pub records: Vec<Option<PokemonRecord>>,
    pub has_more: bool,
    pub failures: Vec<String>,
}

/// Fetches a list page and hydrates every entry on it concurrently,
/// bounded by [`PAGE_CONCURRENCY`]. A failed entry keeps its slot as
/// `None` and lands in `failures`; only a failed list request errors.
pub async fn fetch_page(
    offset: usize,
    limit: usize,
    locale: &str,
) -> Result<HydratedPage, String> {
    let url = format!("{API_BASE}/pokemon?limit={limit}&offset={offset}");
    let page: PageResponse = fetch_json(&url).await?;
    let has_more = page.next.is_some();
    let total = page.results.len();

    let semaphore = Arc::new(Semaphore::new(PAGE_CONCURRENCY));
    let mut tasks = JoinSet::new();
    for (index, entry) in page.results.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let locale = locale.to_string();
        tasks.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => hydrate_entry(&entry.url, &locale).await,
                Err(err) => Err(err.to_string()),
            };
            (index, entry.name, outcome)
        });
    }

    let mut records: Vec<Option<PokemonRecord>> = vec![None; total];
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(record))) => records[index] = Some(record),
            Ok((_, name, Err(error))) => failures.push(format!("{name}: {error}")),
            Err(error) => failures.push(format!("task: {error}")),
        }
    }
    failures.sort();

    Ok(HydratedPage {
        records,
        has_more,
        failures,
    })
}

/// Hydrates a single entry: detail, then species, then the evolution
/// chain. A missing or failed chain yields an empty sequence rather
/// than failing the record.
pub async fn hydrate_entry(url: &str, locale: &str) -> Result<PokemonRecord, String> {
    let detail: PokemonResponse = fetch_json(url).await?;
    let species: SpeciesResponse = fetch_json(&detail.species.url).await?;
    let evolution = match species.evolution_chain.as_ref() {
        Some(resource) => resolve_evolution(&resource.url).await,
        None => Vec::new(),
    };
    Ok(record_from_parts(detail, &species, evolution, locale))
}

fn record_from_parts(
    detail: PokemonResponse,
    species: &SpeciesResponse,
    evolution: Vec<EvolutionEntry>,
    locale: &str,
) -> PokemonRecord {
    let PokemonResponse {
        id,
        name,
        height,
        weight,
        base_experience,
        types,
        abilities,
        stats,
        sprites,
        cries,
        species: _,
    } = detail;
    let image_url = pointer_string(&sprites, "/other/official-artwork/front_default")
        .or_else(|| pointer_string(&sprites, "/front_default"));
    let (cry_latest, cry_legacy) = match cries {
        Some(cries) => (cries.latest, cries.legacy),
        None => (None, None),
    };
    PokemonRecord {
        id,
        number: format!("{id:03}"),
        name,
        image_url,
        types: types.into_iter().map(|slot| slot.type_info.name).collect(),
        height_m: height as f32 / 10.0,
        weight_kg: weight as f32 / 10.0,
        base_experience,
        abilities: abilities
            .into_iter()
            .map(|slot| AbilityRef {
                name: slot.ability.name,
                url: slot.ability.url,
                is_hidden: slot.is_hidden,
            })
            .collect(),
        stats: stats
            .into_iter()
            .map(|slot| StatValue {
                name: slot.stat.name,
                value: slot.base_stat,
            })
            .collect(),
        cry_latest,
        cry_legacy,
        evolution,
        description: localized_flavor_text(&species.flavor_text_entries, locale)
            .unwrap_or_default(),
    }
}

/// First flavor text for the locale, with page-break control characters
/// flattened to spaces.
fn localized_flavor_text(entries: &[FlavorTextEntry], locale: &str) -> Option<String> {
    entries
        .iter()
        .find(|entry| entry.language.name == locale)
        .map(|entry| entry.flavor_text.replace('\u{000C}', " "))
}

async fn resolve_evolution(url: &str) -> Vec<EvolutionEntry> {
    match fetch_json::<EvolutionChainResponse>(url).await {
        Ok(response) => flatten_chain(response.chain),
        Err(_) => Vec::new(),
    }
}

/// Flattens the nested chain depth first, parent before children and
/// siblings in source order.
fn flatten_chain(root: ChainLink) -> Vec<EvolutionEntry> {
    let mut ordered = Vec::new();
    let mut pending = vec![root];
    while let Some(link) = pending.pop() {
        if ordered.len() >= MAX_CHAIN_NODES {
            break;
        }
        ordered.push(EvolutionEntry {
            name: link.species.name,
            url: link.species.url,
        });
        for child in link.evolves_to.into_iter().rev() {
            pending.push(child);
        }
    }
    ordered
}

/// Fetches ability descriptions one by one, in slot order. Never fails:
/// a missing locale entry or a failed request both fall back to the
/// placeholder text.
pub async fn fetch_ability_texts(
    abilities: &[AbilityRef],
    locale: &str,
) -> Vec<AbilityDescription> {
    let mut texts = Vec::with_capacity(abilities.len());
    for ability in abilities {
        let description = match fetch_json::<AbilityResponse>(&ability.url).await {
            Ok(response) => localized_flavor_text(&response.flavor_text_entries, locale)
                .unwrap_or_else(|| ABILITY_PLACEHOLDER.to_string()),
            Err(_) => ABILITY_PLACEHOLDER.to_string(),
        };
        texts.push(AbilityDescription {
            name: ability.name.clone(),
            is_hidden: ability.is_hidden,
            description,
        });
    }
    texts
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn named(name: &str, id: u32) -> NamedResource {
        NamedResource {
            name: name.to_string(),
            url: format!("{API_BASE}/pokemon-species/{id}/"),
        }
    }

    fn link(name: &str, id: u32, children: Vec<ChainLink>) -> ChainLink {
        ChainLink {
            species: named(name, id),
            evolves_to: children,
        }
    }

    fn chain_names(chain: Vec<EvolutionEntry>) -> Vec<String> {
        chain.into_iter().map(|entry| entry.name).collect()
    }

    #[test]
    fn flatten_keeps_parent_before_children() {
        let root = link(
            "bulbasaur",
            1,
            vec![link("ivysaur", 2, vec![link("venusaur", 3, Vec::new())])],
        );
        assert_eq!(
            chain_names(flatten_chain(root)),
            vec!["bulbasaur", "ivysaur", "venusaur"]
        );
    }

    #[test]
    fn flatten_preserves_sibling_order() {
        let root = link(
            "eevee",
            133,
            vec![
                link("vaporeon", 134, Vec::new()),
                link("jolteon", 135, Vec::new()),
                link("flareon", 136, Vec::new()),
            ],
        );
        assert_eq!(
            chain_names(flatten_chain(root)),
            vec!["eevee", "vaporeon", "jolteon", "flareon"]
        );
    }

    #[test]
    fn flatten_caps_pathological_chains() {
        let mut deep = link("tail", 200, Vec::new());
        for depth in (0..100).rev() {
            deep = link(&format!("node-{depth}"), depth, vec![deep]);
        }
        assert_eq!(flatten_chain(deep).len(), MAX_CHAIN_NODES);
    }

    fn entry(text: &str, lang: &str) -> FlavorTextEntry {
        FlavorTextEntry {
            flavor_text: text.to_string(),
            language: named(lang, 0),
        }
    }

    #[test]
    fn flavor_text_picks_locale_and_flattens_page_breaks() {
        let entries = vec![
            entry("A strange seed.", "en"),
            entry("Una rara\u{000C}semilla.", "es"),
        ];
        assert_eq!(
            localized_flavor_text(&entries, "es").as_deref(),
            Some("Una rara semilla.")
        );
        assert_eq!(localized_flavor_text(&entries, "fr"), None);
    }

    #[test]
    fn flavor_text_takes_the_first_locale_entry() {
        let entries = vec![entry("Primera.", "es"), entry("Segunda.", "es")];
        assert_eq!(
            localized_flavor_text(&entries, "es").as_deref(),
            Some("Primera.")
        );
    }

    fn detail_fixture(sprites: serde_json::Value) -> PokemonResponse {
        PokemonResponse {
            id: 1,
            name: "bulbasaur".to_string(),
            height: 7,
            weight: 69,
            base_experience: Some(64),
            types: vec![
                TypeSlot {
                    type_info: named("grass", 12),
                },
                TypeSlot {
                    type_info: named("poison", 4),
                },
            ],
            abilities: vec![AbilitySlot {
                ability: named("overgrow", 65),
                is_hidden: false,
            }],
            stats: vec![StatSlot {
                base_stat: 45,
                stat: named("hp", 1),
            }],
            sprites,
            cries: None,
            species: named("bulbasaur", 1),
        }
    }

    fn species_fixture() -> SpeciesResponse {
        SpeciesResponse {
            flavor_text_entries: vec![entry("Una rara\u{000C}semilla.", "es")],
            evolution_chain: None,
        }
    }

    #[test]
    fn record_scales_wire_units_to_metric() {
        let detail = detail_fixture(json!({}));
        let record = record_from_parts(detail, &species_fixture(), Vec::new(), "es");
        assert_eq!(record.height_m, 0.7);
        assert_eq!(record.weight_kg, 6.9);
        assert_eq!(record.description, "Una rara semilla.");
        assert_eq!(record.types, vec!["grass", "poison"]);
    }

    #[test]
    fn record_pads_the_display_number_to_three_digits() {
        let mut detail = detail_fixture(json!({}));
        detail.id = 25;
        let record = record_from_parts(detail, &species_fixture(), Vec::new(), "es");
        assert_eq!(record.number, "025");

        let mut detail = detail_fixture(json!({}));
        detail.id = 1000;
        let record = record_from_parts(detail, &species_fixture(), Vec::new(), "es");
        assert_eq!(record.number, "1000");
    }

    #[test]
    fn record_prefers_official_artwork_over_the_plain_sprite() {
        let sprites = json!({
            "front_default": "https://img/front/1.png",
            "other": { "official-artwork": { "front_default": "https://img/art/1.png" } }
        });
        let record =
            record_from_parts(detail_fixture(sprites), &species_fixture(), Vec::new(), "es");
        assert_eq!(record.image_url.as_deref(), Some("https://img/art/1.png"));
    }

    #[test]
    fn record_falls_back_to_the_plain_sprite_then_none() {
        let sprites = json!({
            "front_default": "https://img/front/1.png",
            "other": { "official-artwork": { "front_default": null } }
        });
        let record =
            record_from_parts(detail_fixture(sprites), &species_fixture(), Vec::new(), "es");
        assert_eq!(record.image_url.as_deref(), Some("https://img/front/1.png"));

        let record = record_from_parts(
            detail_fixture(json!({ "front_default": null })),
            &species_fixture(),
            Vec::new(),
            "es",
        );
        assert_eq!(record.image_url, None);
    }

    #[test]
    fn record_missing_locale_leaves_the_description_empty() {
        let species = SpeciesResponse {
            flavor_text_entries: vec![entry("A strange seed.", "en")],
            evolution_chain: None,
        };
        let record = record_from_parts(detail_fixture(json!({})), &species, Vec::new(), "es");
        assert_eq!(record.description, "");
    }
}
