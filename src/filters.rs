use crate::media::MovieType;
use crate::route::{ListingKind, Page, QueryParams, Route};

/// Filter value meaning "no constraint"; equivalent to the parameter being absent.
pub const ALL: &str = "all";
pub const ADULT_CATEGORY: &str = "phim-18";
pub const LATEST_LIST: &str = "phim-moi-cap-nhat";

pub const CATEGORIES: [(&str, &str); 4] = [
    ("phim-bo", "Series"),
    ("phim-le", "Movies"),
    ("hoat-hinh", "Animation"),
    ("tv-shows", "TV Shows"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Category,
    Genre,
    Country,
    Year,
}

impl FilterKey {
    pub const ALL_KEYS: [FilterKey; 4] = [
        FilterKey::Category,
        FilterKey::Genre,
        FilterKey::Country,
        FilterKey::Year,
    ];

    fn listing_kind(self) -> ListingKind {
        match self {
            FilterKey::Category => ListingKind::Category,
            FilterKey::Genre => ListingKind::Genre,
            FilterKey::Country => ListingKind::Country,
            FilterKey::Year => ListingKind::Year,
        }
    }

    pub fn param(self) -> &'static str {
        match self {
            FilterKey::Category => "category",
            FilterKey::Genre => "genre",
            FilterKey::Country => "country",
            FilterKey::Year => "year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub country: Option<String>,
    pub year: Option<String>,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: None,
            genre: None,
            country: None,
            year: None,
            page: 1,
        }
    }
}

impl FilterState {
    pub fn from_query(query: &QueryParams) -> Self {
        let constraint = |key: FilterKey| {
            query
                .get(key.param())
                .filter(|v| !v.is_empty() && *v != ALL)
                .map(String::from)
        };
        Self {
            category: constraint(FilterKey::Category),
            genre: constraint(FilterKey::Genre),
            country: constraint(FilterKey::Country),
            year: constraint(FilterKey::Year),
            page: query
                .get("page")
                .and_then(|p| p.trim().parse::<u32>().ok())
                .filter(|p| *p > 0)
                .unwrap_or(1),
        }
    }

    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::default();
        for key in FilterKey::ALL_KEYS {
            if let Some(value) = self.get(key) {
                query.set(key.param(), value);
            }
        }
        query.set("page", self.page.to_string());
        query
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::Category => self.category.as_deref(),
            FilterKey::Genre => self.genre.as_deref(),
            FilterKey::Country => self.country.as_deref(),
            FilterKey::Year => self.year.as_deref(),
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.category.is_some() || self.genre.is_some() || self.country.is_some() || self.year.is_some()
    }
}

pub fn apply_filter(query: &QueryParams, key: FilterKey, value: &str) -> QueryParams {
    let mut next = query.clone();
    if value == ALL || value.is_empty() {
        next.remove(key.param());
    } else {
        next.set(key.param(), value);
    }
    next.set("page", "1");
    next
}

pub fn apply_page(query: &QueryParams, page: u32) -> QueryParams {
    let mut next = query.clone();
    next.set("page", page.max(1).to_string());
    next
}

pub fn filtered_route(route: &Route, key: FilterKey, value: &str) -> Route {
    match route.page {
        Page::Listing { .. } | Page::Search => {
            route.clone().with_query(apply_filter(&route.query, key, value))
        }
        _ => Route::listing(ListingKind::Category, LATEST_LIST)
            .with_query(apply_filter(&QueryParams::default(), key, value)),
    }
}

/// Drops every filter. A search keeps its keyword.
pub fn cleared_route(route: &Route) -> Route {
    let query = match (&route.page, route.query.get("keyword")) {
        (Page::Search, Some(keyword)) => QueryParams::from_pairs([("keyword", keyword)]),
        _ => QueryParams::default(),
    };
    route.clone().with_query(query)
}

pub fn displayed_value(route: &Route, key: FilterKey) -> String {
    if let Some(value) = route.query.get(key.param()).filter(|v| !v.is_empty()) {
        return value.to_string();
    }
    match route.implied_listing() {
        Some((kind, slug)) if kind == key.listing_kind() => slug.to_string(),
        _ => String::from(ALL),
    }
}

pub fn category_type(slug: &str) -> Option<MovieType> {
    match slug {
        "phim-bo" => Some(MovieType::Series),
        "phim-le" => Some(MovieType::Single),
        "hoat-hinh" => Some(MovieType::HoatHinh),
        "tv-shows" => Some(MovieType::TvShows),
        _ => None,
    }
}

pub fn category_label(slug: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_filter_round_trips_through_query() {
        let state = FilterState {
            genre: Some(String::from("hanh-dong")),
            page: 1,
            ..Default::default()
        };
        let query = state.to_query();
        assert_eq!(query.encode(), "genre=hanh-dong&page=1");
        assert_eq!(FilterState::from_query(&query), state);
    }

    #[test]
    fn sentinel_and_absent_are_unconstrained() {
        let query = QueryParams::parse("category=all&genre=&country=han-quoc");
        let state = FilterState::from_query(&query);
        assert_eq!(state.category, None);
        assert_eq!(state.genre, None);
        assert_eq!(state.country.as_deref(), Some("han-quoc"));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn invalid_page_falls_back_to_first() {
        for raw in ["page=0", "page=abc", "page=-2", ""] {
            assert_eq!(FilterState::from_query(&QueryParams::parse(raw)).page, 1);
        }
        assert_eq!(FilterState::from_query(&QueryParams::parse("page=7")).page, 7);
    }

    #[test]
    fn setting_sentinel_removes_parameter_and_resets_page() {
        let query = QueryParams::parse("keyword=ma&genre=kinh-di&page=4");
        let next = apply_filter(&query, FilterKey::Genre, ALL);
        assert_eq!(next.get("genre"), None);
        assert_eq!(next.get("page"), Some("1"));
        assert_eq!(next.get("keyword"), Some("ma"));
    }

    #[test]
    fn any_filter_change_resets_page() {
        let query = QueryParams::parse("genre=kinh-di&page=4");
        let next = apply_filter(&query, FilterKey::Year, "2023");
        assert_eq!(next.encode(), "genre=kinh-di&page=1&year=2023");
    }

    #[test]
    fn page_navigation_keeps_other_filters() {
        let query = QueryParams::parse("genre=kinh-di&country=au-my&page=1");
        let next = apply_page(&query, 3);
        let state = FilterState::from_query(&next);
        assert_eq!(state.page, 3);
        assert_eq!(state.genre.as_deref(), Some("kinh-di"));
        assert_eq!(state.country.as_deref(), Some("au-my"));
    }

    #[test]
    fn filtering_from_home_opens_latest_listing() {
        let next = filtered_route(&Route::home(), FilterKey::Country, "han-quoc");
        assert_eq!(next.to_string(), "/list/phim-moi-cap-nhat?country=han-quoc&page=1");

        let listing = Route::parse("/genre/hanh-dong?page=5").expect("parses");
        let next = filtered_route(&listing, FilterKey::Year, "2022");
        assert_eq!(next.to_string(), "/genre/hanh-dong?page=1&year=2022");
    }

    #[test]
    fn clearing_search_keeps_keyword_only() {
        let search = Route::parse("/search?keyword=ma&genre=kinh-di&page=3").expect("parses");
        assert_eq!(cleared_route(&search).to_string(), "/search?keyword=ma");

        let listing = Route::parse("/country/au-my?genre=kinh-di").expect("parses");
        assert_eq!(cleared_route(&listing).to_string(), "/country/au-my");
    }

    #[test]
    fn displayed_value_falls_back_to_route_then_all() {
        let route = Route::parse("/genre/hanh-dong?country=au-my").expect("parses");
        assert_eq!(displayed_value(&route, FilterKey::Genre), "hanh-dong");
        assert_eq!(displayed_value(&route, FilterKey::Country), "au-my");
        assert_eq!(displayed_value(&route, FilterKey::Year), ALL);
    }

    #[test]
    fn category_slugs_map_to_upstream_types() {
        assert_eq!(category_type("phim-bo"), Some(MovieType::Series));
        assert_eq!(category_type("phim-le"), Some(MovieType::Single));
        assert_eq!(category_type("hoat-hinh"), Some(MovieType::HoatHinh));
        assert_eq!(category_type("tv-shows"), Some(MovieType::TvShows));
        assert_eq!(category_type("phim-moi-cap-nhat"), None);
    }
}
