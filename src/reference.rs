use chrono::Datelike;
use tracing::{info, warn};

use crate::media::{ApiError, Envelope, Term, TermList};
use crate::ophim::CatalogSource;

pub const EARLIEST_FALLBACK_YEAR: i32 = 2010;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub genres: Vec<Term>,
    pub countries: Vec<Term>,
    pub years: Vec<Term>,
}

impl ReferenceData {
    pub fn genre_name(&self, slug: &str) -> Option<&str> {
        find_name(&self.genres, slug)
    }

    pub fn country_name(&self, slug: &str) -> Option<&str> {
        find_name(&self.countries, slug)
    }
}

fn find_name<'a>(terms: &'a [Term], slug: &str) -> Option<&'a str> {
    terms
        .iter()
        .find(|t| t.slug == slug)
        .map(|t| t.name.as_str())
}

/// `current_year` down to 2010 inclusive.
pub fn fallback_years(current_year: i32) -> Vec<Term> {
    (EARLIEST_FALLBACK_YEAR..=current_year)
        .rev()
        .map(|y| Term::new(y.to_string(), y.to_string()))
        .collect()
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

fn terms_or_empty(what: &str, result: Result<Envelope<TermList>, ApiError>) -> Vec<Term> {
    match result {
        Ok(envelope) => envelope.data.items,
        Err(error) => {
            warn!(%error, "{} list unavailable", what);
            Vec::new()
        }
    }
}

pub async fn load_reference_data<S: CatalogSource + ?Sized>(source: &S, current_year: i32) -> ReferenceData {
    let (genres, countries, years) = tokio::join!(source.genres(), source.countries(), source.years());

    let years: Vec<Term> = match years {
        Ok(envelope) => envelope
            .data
            .items
            .into_iter()
            .filter_map(|entry| entry.year)
            .map(|y| Term::new(y.to_string(), y.to_string()))
            .collect(),
        Err(error) => {
            warn!(%error, "year list unavailable");
            Vec::new()
        }
    };
    let years = if years.is_empty() {
        fallback_years(current_year)
    } else {
        years
    };

    let data = ReferenceData {
        genres: terms_or_empty("genre", genres),
        countries: terms_or_empty("country", countries),
        years,
    };
    info!(
        genres = data.genres.len(),
        countries = data.countries.len(),
        years = data.years.len(),
        "reference data ready"
    );
    data
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReferenceState {
    #[default]
    Idle,
    Loading,
    Ready(ReferenceData),
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    state: ReferenceState,
}

impl ReferenceStore {
    pub fn start(&mut self) -> bool {
        if self.state != ReferenceState::Idle {
            return false;
        }
        self.state = ReferenceState::Loading;
        true
    }

    pub fn finish(&mut self, data: ReferenceData) {
        self.state = ReferenceState::Ready(data);
    }

    pub fn data(&self) -> Option<&ReferenceData> {
        match &self.state {
            ReferenceState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ReferenceState::Idle | ReferenceState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ophim::fake::FakeCatalog;

    fn terms(items: &[(&str, &str)]) -> serde_json::Value {
        json!({
            "status": true,
            "data": { "items": items.iter().map(|(s, n)| json!({ "slug": s, "name": n })).collect::<Vec<_>>() }
        })
    }

    #[test]
    fn fallback_years_run_down_to_2010() {
        let years = fallback_years(2026);
        assert_eq!(years.len(), 17);
        assert_eq!(years.first().map(|t| t.slug.as_str()), Some("2026"));
        assert_eq!(years.last().map(|t| t.slug.as_str()), Some("2010"));
    }

    #[tokio::test]
    async fn country_failure_leaves_other_slices_intact() {
        let catalog = FakeCatalog::default()
            .with("/the-loai", terms(&[("hanh-dong", "Hành Động")]))
            .with(
                "/nam-phat-hanh",
                json!({ "status": true, "data": { "items": [{ "year": 2025 }, { "year": "2024" }] } }),
            );

        let mut store = ReferenceStore::default();
        assert!(store.start());
        store.finish(load_reference_data(&catalog, 2026).await);

        let data = store.data().expect("store is ready");
        assert!(data.countries.is_empty());
        assert_eq!(data.genre_name("hanh-dong"), Some("Hành Động"));
        let years: Vec<_> = data.years.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(years, vec!["2025", "2024"]);
    }

    #[tokio::test]
    async fn empty_year_list_is_synthesized() {
        let catalog = FakeCatalog::default()
            .with("/the-loai", terms(&[]))
            .with("/quoc-gia", terms(&[("au-my", "Âu Mỹ")]))
            .with("/nam-phat-hanh", json!({ "status": true, "data": { "items": [] } }));

        let data = load_reference_data(&catalog, 2012).await;
        let years: Vec<_> = data.years.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(years, vec!["2012", "2011", "2010"]);
        assert_eq!(data.country_name("au-my"), Some("Âu Mỹ"));
    }

    #[test]
    fn store_starts_only_once() {
        let mut store = ReferenceStore::default();
        assert!(store.is_loading());
        assert!(store.start());
        assert!(!store.start());
        assert_eq!(store.state, ReferenceState::Loading);

        store.finish(ReferenceData::default());
        assert!(!store.start());
        assert!(!store.is_loading());
    }
}
