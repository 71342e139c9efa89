use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use iced::widget::image::Handle;
use iced::Color;
use serde::{Deserialize, Deserializer};

use crate::cdn::CdnBase;
use crate::filters::{FilterKey, ADULT_CATEGORY};
use crate::pipeline::ListingOutcome;
use crate::reference::ReferenceData;
use crate::route::Route;
use crate::suggest::Ticket;

fn simple_hash(s: &str) -> String {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    format!("{:016x}", hash)
}

fn get_cache_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".cache")
            .join("ophix")
            .join("images")
    })
}

pub const BACKGROUND_BLACK: Color = Color::from_rgb(0.035, 0.035, 0.043);
pub const SURFACE_DARK_GRAY: Color = Color::from_rgb(0.094, 0.094, 0.106);
pub const ACCENT_RED: Color = Color::from_rgb(0.898, 0.035, 0.078);
pub const TEXT_WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);
pub const TEXT_GRAY: Color = Color::from_rgb(0.631, 0.631, 0.667);

/// Upstream sends `null` for plenty of fields that are otherwise strings or lists.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|y| u32::try_from(y).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Term {
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl Term {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovieType {
    Single,
    Series,
    HoatHinh,
    TvShows,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieSummary {
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub poster_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub thumb_url: String,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episode_current: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: MovieType,
    #[serde(default, rename = "category", deserialize_with = "null_as_default")]
    pub categories: Vec<Term>,
    #[serde(default, rename = "country", deserialize_with = "null_as_default")]
    pub countries: Vec<Term>,
}

impl MovieSummary {
    pub fn is_adult(&self) -> bool {
        self.categories.iter().any(|c| c.slug == ADULT_CATEGORY)
    }

    pub fn has_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|c| c.slug == slug)
    }

    pub fn has_country(&self, slug: &str) -> bool {
        self.countries.iter().any(|c| c.slug == slug)
    }

    pub fn released_in(&self, year: &str) -> bool {
        self.year.map(|y| y.to_string()).as_deref() == Some(year)
    }

    pub fn card_path(&self) -> &str {
        if self.thumb_url.is_empty() {
            &self.poster_url
        } else {
            &self.thumb_url
        }
    }

    pub fn backdrop_path(&self) -> &str {
        if self.poster_url.is_empty() {
            &self.thumb_url
        } else {
            &self.poster_url
        }
    }
}

pub fn without_adult(items: Vec<MovieSummary>) -> Vec<MovieSummary> {
    items.into_iter().filter(|m| !m.is_adult()).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Episode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link_embed: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link_m3u8: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeServer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub server_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub server_data: Vec<Episode>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub vote_average: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub summary: MovieSummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub director: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episodes: Vec<EpisodeServer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quality: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lang: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(default)]
    pub tmdb: Option<Rating>,
}

impl MovieDetail {
    /// Episode on the first server matching `slug`, or that server's first episode.
    pub fn select_episode(&self, slug: Option<&str>) -> Option<&Episode> {
        let episodes = &self.episodes.first()?.server_data;
        match slug {
            Some(slug) => episodes.iter().find(|e| e.slug == slug),
            None => episodes.first(),
        }
    }

    pub fn rating(&self) -> Option<f64> {
        self.tmdb
            .and_then(|t| t.vote_average)
            .filter(|v| *v > 0.0)
    }

    pub fn credits(names: &[String]) -> Vec<&str> {
        names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(rename = "totalItems", default)]
    pub total_items: u64,
    #[serde(rename = "totalItemsPerPage", default)]
    pub total_items_per_page: u64,
}

impl Pagination {
    pub fn total_pages(&self) -> u64 {
        if self.total_items_per_page == 0 {
            return 0;
        }
        self.total_items.div_ceil(self.total_items_per_page)
    }

    pub fn has_previous(&self, page: u32) -> bool {
        page > 1
    }

    pub fn has_next(&self, page: u32) -> bool {
        self.total_items_per_page > 0 && u64::from(page) * self.total_items_per_page < self.total_items
    }

    pub fn spans_pages(&self) -> bool {
        self.total_items > self.total_items_per_page
    }

    /// Up to five page numbers around `page`, shifted to stay inside the range.
    pub fn window(&self, page: u32) -> Vec<u32> {
        let total = u32::try_from(self.total_pages()).unwrap_or(u32::MAX);
        if total == 0 {
            return Vec::new();
        }
        let page = page.clamp(1, total);
        let mut start = page.saturating_sub(2).max(1);
        let end = total.min(start.saturating_add(4));
        if end < start.saturating_add(4) {
            start = end.saturating_sub(4).max(1);
        }
        (start..=end).collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<MovieSummary>,
    #[serde(default)]
    pub params: Option<ListParams>,
    #[serde(rename = "titlePage", default)]
    pub title_page: Option<String>,
}

impl ListData {
    pub fn pagination(&self) -> Option<Pagination> {
        self.params.as_ref().and_then(|p| p.pagination)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Term>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YearEntry {
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<YearEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailData {
    pub item: Option<MovieDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageSet {
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub thumb_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieImages {
    #[serde(default)]
    pub item: Option<ImageSet>,
    #[serde(flatten)]
    pub top: ImageSet,
}

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub data: T,
    pub cdn_domain: Option<String>,
}

impl<T> Envelope<T> {
    pub fn cdn(&self) -> Option<&str> {
        self.cdn_domain.as_deref()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("upstream reported failure: {0}")]
    Upstream(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound(what) => format!("{} not found.", what),
            ApiError::Upstream(_) => String::from("The catalog could not load this page."),
            ApiError::Network(_) | ApiError::Http(_) | ApiError::Parse(_) => {
                String::from("Something went wrong. Please try again later.")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum LoadingState {
    Idle,
    Loading,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct HomeSection {
    pub title: String,
    pub list_slug: String,
    pub items: Vec<MovieSummary>,
}

#[derive(Debug, Clone)]
pub struct HomeFeed {
    pub hero: Vec<MovieSummary>,
    pub sections: Vec<HomeSection>,
    pub cdn_domain: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DetailBundle {
    pub movie: MovieDetail,
    pub cdn_domain: Option<String>,
    pub images: Option<Envelope<MovieImages>>,
    pub related: Vec<MovieSummary>,
}

fn first_present<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .find(|path| !path.is_empty())
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.is_empty())
}

fn from_images<'a>(
    images: Option<&'a Envelope<MovieImages>>,
    pick: impl Fn(&'a ImageSet) -> [Option<&'a str>; 2],
) -> Option<&'a str> {
    let images = images?;
    let nested = images.data.item.as_ref().map(&pick).unwrap_or([None, None]);
    let top = pick(&images.data.top);
    first_present(nested.into_iter().chain(top))
}

pub fn backdrop_url_for(
    summary: &MovieSummary,
    summary_cdn: Option<&str>,
    images: Option<&Envelope<MovieImages>>,
    cdn: &CdnBase,
) -> String {
    match from_images(images, |set| [set.poster_url.as_deref(), set.backdrop_url.as_deref()]) {
        Some(path) => cdn.resolve(path, images.and_then(|i| i.cdn())),
        None => cdn.resolve(summary.backdrop_path(), summary_cdn),
    }
}

impl DetailBundle {
    pub fn backdrop_url(&self, cdn: &CdnBase) -> String {
        backdrop_url_for(&self.movie.summary, self.cdn_domain.as_deref(), self.images.as_ref(), cdn)
    }

    pub fn poster_url(&self, cdn: &CdnBase) -> String {
        match from_images(self.images.as_ref(), |set| [set.thumb_url.as_deref(), set.poster_url.as_deref()]) {
            Some(path) => cdn.resolve(path, self.images.as_ref().and_then(|i| i.cdn())),
            None => {
                let summary = &self.movie.summary;
                let path = first_present([non_empty(&summary.thumb_url), non_empty(&summary.poster_url)])
                    .unwrap_or_default();
                cdn.resolve(path, self.cdn_domain.as_deref())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WatchData {
    pub movie: MovieDetail,
    pub episode: Episode,
    pub cdn_domain: Option<String>,
}

#[derive(Debug, Clone)]
pub enum PageContent {
    Empty,
    Home(HomeFeed),
    Listing(ListingOutcome),
    Detail(Box<DetailBundle>),
    Watch(Box<WatchData>),
}

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    cache: HashMap<String, Handle>,
    pending: HashSet<String>,
    cache_directory: Option<PathBuf>,
}

impl ImageCache {
    pub fn new() -> Self {
        let cache_directory = get_cache_dir();
        if let Some(ref dir) = cache_directory {
            let _ = std::fs::create_dir_all(dir);
        }
        Self {
            cache: HashMap::new(),
            pending: HashSet::new(),
            cache_directory,
        }
    }

    pub fn get(&self, url: &str) -> Option<&Handle> {
        self.cache.get(url)
    }

    pub fn insert(&mut self, url: String, handle: Handle) {
        self.pending.remove(&url);
        self.cache.insert(url, handle);
    }

    pub fn fail(&mut self, url: &str) {
        self.pending.remove(url);
    }

    pub fn needs_load(&self, url: &str) -> bool {
        !url.is_empty() && !self.cache.contains_key(url) && !self.pending.contains(url)
    }

    pub fn mark_pending(&mut self, url: String) {
        self.pending.insert(url);
    }

    pub fn get_cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_directory
            .as_ref()
            .map(|dir| dir.join(simple_hash(url)))
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Route),
    Back,
    RetryLoad,
    HomeLoaded(u64, Result<HomeFeed, ApiError>),
    ListingLoaded(u64, Result<ListingOutcome, ApiError>),
    DetailLoaded(u64, Box<Result<DetailBundle, ApiError>>),
    WatchLoaded(u64, Box<Result<WatchData, ApiError>>),
    ReferenceLoaded(ReferenceData),
    FilterChanged(FilterKey, String),
    PageChanged(u32),
    ResetFilters,
    ClearFilters,
    SuggestInput(String),
    SuggestDue(Ticket),
    SuggestLoaded(Ticket, Result<Vec<MovieSummary>, ApiError>),
    SearchSubmit,
    DismissSuggest,
    LoadImage(String),
    ImageLoaded(String, Result<Handle, String>),
    HeroTick,
    HeroNext,
    HeroPrevious,
    HeroArtLoaded(String, Option<Envelope<MovieImages>>),
    OpenPlayer(String),
}

pub fn plain_text(html: &str) -> String {
    let mut text = html.to_string();
    if let Ok(breaks) = regex::Regex::new(r"(?i)<br\s*/?>|</p\s*>") {
        text = breaks.replace_all(&text, "\n").into_owned();
    }
    if let Ok(tags) = regex::Regex::new(r"<[^>]*>") {
        text = tags.replace_all(&text, "").into_owned();
    }
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn truncate_description(description: &str, max_chars: usize) -> String {
    if description.chars().count() <= max_chars {
        return description.to_string();
    }
    let truncated: String = description.chars().take(max_chars).collect();
    format!(
        "{}...",
        truncated.rfind(' ').map_or(truncated.as_str(), |i| &truncated[..i])
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary(value: serde_json::Value) -> MovieSummary {
        serde_json::from_value(value).expect("summary decodes")
    }

    #[test]
    fn summary_tolerates_nulls_and_string_years() {
        let movie = summary(json!({
            "slug": "tham-tu-lung-danh",
            "name": "Thám Tử Lừng Danh",
            "origin_name": null,
            "year": "2019",
            "type": "hoat-hinh",
            "category": null,
            "country": [{ "slug": "nhat-ban", "name": "Nhật Bản" }]
        }));
        assert_eq!(movie.origin_name, "");
        assert_eq!(movie.year, Some(2019));
        assert_eq!(movie.kind, MovieType::HoatHinh);
        assert!(movie.categories.is_empty());
        assert!(movie.has_country("nhat-ban"));
        assert!(movie.released_in("2019"));
    }

    #[test]
    fn unknown_type_does_not_fail_decoding() {
        let movie = summary(json!({ "slug": "x", "type": "documentary", "year": 2020 }));
        assert_eq!(movie.kind, MovieType::Unknown);
        assert!(movie.released_in("2020"));
        assert!(!movie.released_in("2021"));
    }

    #[test]
    fn detail_picks_episode_by_slug_or_first() {
        let detail: MovieDetail = serde_json::from_value(json!({
            "slug": "one-piece",
            "name": "One Piece",
            "content": "<p>Pirates</p>",
            "actor": [""],
            "episodes": [{
                "server_name": "Vietsub #1",
                "server_data": [
                    { "name": "1", "slug": "tap-01", "link_embed": "https://player.test/1" },
                    { "name": "2", "slug": "tap-02", "link_embed": "https://player.test/2" }
                ]
            }]
        }))
        .expect("detail decodes");

        assert_eq!(detail.summary.slug, "one-piece");
        assert_eq!(detail.select_episode(None).map(|e| e.slug.as_str()), Some("tap-01"));
        assert_eq!(
            detail.select_episode(Some("tap-02")).map(|e| e.link_embed.as_str()),
            Some("https://player.test/2")
        );
        assert!(detail.select_episode(Some("tap-99")).is_none());
        assert!(MovieDetail::credits(&detail.actor).is_empty());
    }

    #[test]
    fn pagination_controls_at_the_edges() {
        let pagination = Pagination {
            total_items: 95,
            total_items_per_page: 24,
        };
        assert_eq!(pagination.total_pages(), 4);
        assert!(!pagination.has_previous(1));
        assert!(pagination.has_next(1));
        assert!(pagination.has_next(3));
        assert!(!pagination.has_next(4));

        let exact = Pagination {
            total_items: 48,
            total_items_per_page: 24,
        };
        assert!(!exact.has_next(2));

        let unsized_pages = Pagination {
            total_items: 30,
            total_items_per_page: 0,
        };
        assert!(!unsized_pages.has_next(1));
    }

    #[test]
    fn page_window_stays_inside_range() {
        let pagination = Pagination {
            total_items: 240,
            total_items_per_page: 24,
        };
        assert_eq!(pagination.window(1), vec![1, 2, 3, 4, 5]);
        assert_eq!(pagination.window(6), vec![4, 5, 6, 7, 8]);
        assert_eq!(pagination.window(10), vec![6, 7, 8, 9, 10]);
        assert_eq!(pagination.window(50), vec![6, 7, 8, 9, 10]);
        assert_eq!(pagination.window(0), vec![1, 2, 3, 4, 5]);

        let short = Pagination {
            total_items: 50,
            total_items_per_page: 24,
        };
        assert_eq!(short.window(3), vec![1, 2, 3]);
    }

    #[test]
    fn plain_text_strips_markup() {
        let text = plain_text("<p>Tom &amp; Jerry<br/>return</p><p>&nbsp;</p><p>Again</p>");
        assert_eq!(text, "Tom & Jerry\n\nreturn\n\nAgain");
    }

    #[test]
    fn backdrop_prefers_images_then_detail() {
        let movie: MovieDetail = serde_json::from_value(json!({
            "slug": "m",
            "poster_url": "m-poster.jpg",
            "thumb_url": "m-thumb.jpg"
        }))
        .expect("detail decodes");
        let cdn = CdnBase::new("https://global.test");

        let mut bundle = DetailBundle {
            movie,
            cdn_domain: Some(String::from("https://detail.test")),
            images: None,
            related: Vec::new(),
        };
        assert_eq!(bundle.backdrop_url(&cdn), "https://detail.test/uploads/movies/m-poster.jpg");
        assert_eq!(bundle.poster_url(&cdn), "https://detail.test/uploads/movies/m-thumb.jpg");

        bundle.images = Some(Envelope {
            data: MovieImages {
                item: Some(ImageSet {
                    poster_url: None,
                    backdrop_url: Some(String::from("/uploads/movies/wide.jpg")),
                    thumb_url: Some(String::new()),
                }),
                top: ImageSet {
                    thumb_url: Some(String::from("tall.jpg")),
                    ..Default::default()
                },
            },
            cdn_domain: None,
        });
        assert_eq!(bundle.backdrop_url(&cdn), "https://global.test/uploads/movies/wide.jpg");
        assert_eq!(bundle.poster_url(&cdn), "https://global.test/uploads/movies/tall.jpg");
    }
}
