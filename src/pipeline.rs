use tracing::debug;

use crate::filters::{category_type, FilterState, LATEST_LIST};
use crate::media::{without_adult, ApiError, MovieSummary, Pagination};
use crate::ophim::CatalogSource;
use crate::route::ListingKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryCall {
    Genre(String),
    Country(String),
    Year(String),
    Category(String),
    Latest,
    Search(String),
}

impl PrimaryCall {
    fn consumes(&self, key: ListingKind) -> bool {
        matches!(
            (self, key),
            (PrimaryCall::Genre(_), ListingKind::Genre)
                | (PrimaryCall::Country(_), ListingKind::Country)
                | (PrimaryCall::Year(_), ListingKind::Year)
                | (PrimaryCall::Category(_), ListingKind::Category)
        )
    }
}

pub fn select_primary(filters: &FilterState, implied: Option<(ListingKind, &str)>) -> PrimaryCall {
    if let Some(genre) = &filters.genre {
        return PrimaryCall::Genre(genre.clone());
    }
    if let Some(country) = &filters.country {
        return PrimaryCall::Country(country.clone());
    }
    if let Some(year) = &filters.year {
        return PrimaryCall::Year(year.clone());
    }
    if let Some(category) = &filters.category {
        return PrimaryCall::Category(category.clone());
    }
    match implied {
        Some((ListingKind::Genre, slug)) => PrimaryCall::Genre(slug.to_string()),
        Some((ListingKind::Country, slug)) => PrimaryCall::Country(slug.to_string()),
        Some((ListingKind::Year, slug)) => PrimaryCall::Year(slug.to_string()),
        Some((ListingKind::Category, slug)) => PrimaryCall::Category(slug.to_string()),
        None => PrimaryCall::Latest,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingScope {
    Browse { implied: Option<(ListingKind, String)> },
    Search { keyword: String },
}

impl ListingScope {
    fn implied(&self) -> Option<(ListingKind, &str)> {
        match self {
            ListingScope::Browse {
                implied: Some((kind, slug)),
            } => Some((*kind, slug.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingOutcome {
    pub items: Vec<MovieSummary>,
    /// Metadata of the primary call, not of the narrowed `items`.
    pub pagination: Option<Pagination>,
    pub title_page: Option<String>,
    pub primary: PrimaryCall,
    pub fetched: usize,
    pub cdn_domain: Option<String>,
}

pub fn post_filter(
    items: Vec<MovieSummary>,
    filters: &FilterState,
    primary: &PrimaryCall,
    implied: Option<(ListingKind, &str)>,
) -> Vec<MovieSummary> {
    let mut result = without_adult(items);

    if let Some(genre) = filters.genre.as_deref().filter(|_| !primary.consumes(ListingKind::Genre)) {
        result.retain(|m| m.has_category(genre));
    }
    if let Some(country) = filters
        .country
        .as_deref()
        .filter(|_| !primary.consumes(ListingKind::Country))
    {
        result.retain(|m| m.has_country(country));
    }
    if let Some(year) = filters.year.as_deref().filter(|_| !primary.consumes(ListingKind::Year)) {
        result.retain(|m| m.released_in(year));
    }

    let category = filters.category.as_deref().or(match implied {
        Some((ListingKind::Category, slug)) => Some(slug),
        _ => None,
    });
    if let Some(kind) = category
        .filter(|_| !primary.consumes(ListingKind::Category))
        .and_then(category_type)
    {
        result.retain(|m| m.kind == kind);
    }

    result
}

pub async fn run_listing<S: CatalogSource + ?Sized>(
    source: &S,
    filters: &FilterState,
    scope: &ListingScope,
) -> Result<ListingOutcome, ApiError> {
    let page = filters.page;
    let primary = match scope {
        ListingScope::Search { keyword } => PrimaryCall::Search(keyword.clone()),
        ListingScope::Browse { .. } => select_primary(filters, scope.implied()),
    };

    let envelope = match &primary {
        PrimaryCall::Genre(slug) => source.by_genre(slug, page).await?,
        PrimaryCall::Country(slug) => source.by_country(slug, page).await?,
        PrimaryCall::Year(year) => source.by_year(year, page).await?,
        PrimaryCall::Category(slug) => source.list(slug, page).await?,
        PrimaryCall::Latest => source.list(LATEST_LIST, page).await?,
        PrimaryCall::Search(keyword) => source.search(keyword, page).await?,
    };

    let pagination = envelope.data.pagination();
    let fetched = envelope.data.items.len();
    let items = post_filter(envelope.data.items, filters, &primary, scope.implied());
    debug!(?primary, page, fetched, kept = items.len(), "listing narrowed");

    Ok(ListingOutcome {
        items,
        pagination,
        title_page: envelope.data.title_page,
        primary,
        fetched,
        cdn_domain: envelope.cdn_domain,
    })
}
