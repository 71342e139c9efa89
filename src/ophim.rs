use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::cdn::{embedded_cdn, CdnBase};
use crate::filters::LATEST_LIST;
use crate::media::{
    without_adult, ApiError, DetailBundle, DetailData, Envelope, HomeFeed, HomeSection, ListData,
    MovieDetail, MovieImages, TermList, WatchData, YearList,
};
use crate::settings::AppSettings;

const HERO_SIZE: usize = 5;
const SECTION_SIZE: usize = 12;
const RELATED_SIZE: usize = 6;

pub async fn fetch_image_bytes(url: String) -> Result<Vec<u8>, String> {
    reqwest::get(&url)
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| e.to_string())
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn home(&self) -> Result<Envelope<ListData>, ApiError>;
    async fn list(&self, slug: &str, page: u32) -> Result<Envelope<ListData>, ApiError>;
    async fn genres(&self) -> Result<Envelope<TermList>, ApiError>;
    async fn countries(&self) -> Result<Envelope<TermList>, ApiError>;
    async fn years(&self) -> Result<Envelope<YearList>, ApiError>;
    async fn by_genre(&self, slug: &str, page: u32) -> Result<Envelope<ListData>, ApiError>;
    async fn by_country(&self, slug: &str, page: u32) -> Result<Envelope<ListData>, ApiError>;
    async fn by_year(&self, year: &str, page: u32) -> Result<Envelope<ListData>, ApiError>;
    async fn search(&self, keyword: &str, page: u32) -> Result<Envelope<ListData>, ApiError>;
    async fn detail(&self, slug: &str) -> Result<Envelope<DetailData>, ApiError>;
    async fn images(&self, slug: &str) -> Result<Envelope<MovieImages>, ApiError>;
}

#[derive(Clone)]
pub struct OphimClient {
    base_url: String,
    cdn: CdnBase,
    http_client: Arc<reqwest::Client>,
}

impl OphimClient {
    pub fn new(base_url: impl Into<String>, cdn: CdnBase) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cdn,
            http_client: Arc::new(reqwest::Client::new()),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(
            settings.api_base_url.clone(),
            CdnBase::new(settings.image_cdn.clone()),
        )
    }

    pub fn cdn(&self) -> &CdnBase {
        &self.cdn
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn fetch_response(&self, url: &str) -> Result<reqwest::Response, ApiError> {
        debug!(%url, "upstream request");
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        match response.status().as_u16() {
            404 => Err(ApiError::NotFound(String::from("Page"))),
            s if s >= 400 => Err(ApiError::Http(s)),
            _ => Ok(response),
        }
    }

    async fn fetch_envelope<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Envelope<T>, ApiError> {
        let url = self.build_url(endpoint);
        let result: Result<Envelope<T>, ApiError> = async {
            let json: serde_json::Value = self
                .fetch_response(&url)
                .await?
                .json()
                .await
                .map_err(|e| ApiError::Parse(e.to_string()))?;
            record_envelope(&self.cdn, json)
        }
        .await;

        if let Err(ref error) = result {
            warn!(%url, %error, "upstream request failed");
        }
        result
    }

    fn paged(endpoint: &str, page: u32) -> String {
        format!("{}?page={}", endpoint, page.max(1))
    }
}

pub fn record_envelope<T: DeserializeOwned>(cdn: &CdnBase, json: serde_json::Value) -> Result<Envelope<T>, ApiError> {
    let envelope = decode_envelope(json)?;
    if let Some(domain) = envelope.cdn() {
        cdn.set(domain);
    }
    Ok(envelope)
}

pub fn decode_envelope<T: DeserializeOwned>(json: serde_json::Value) -> Result<Envelope<T>, ApiError> {
    if json.get("status").and_then(|s| s.as_bool()) != Some(true) {
        let message = json
            .get("msg")
            .or_else(|| json.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("status false")
            .to_string();
        return Err(ApiError::Upstream(message));
    }

    let cdn_domain = embedded_cdn(&json);
    let data = match json.get("data") {
        Some(data) if !data.is_null() => data.clone(),
        _ => return Err(ApiError::NotFound(String::from("Data"))),
    };
    let data = serde_json::from_value(data).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(Envelope { data, cdn_domain })
}

#[async_trait]
impl CatalogSource for OphimClient {
    async fn home(&self) -> Result<Envelope<ListData>, ApiError> {
        self.fetch_envelope("/home").await
    }

    async fn list(&self, slug: &str, page: u32) -> Result<Envelope<ListData>, ApiError> {
        self.fetch_envelope(&Self::paged(&format!("/danh-sach/{}", slug), page))
            .await
    }

    async fn genres(&self) -> Result<Envelope<TermList>, ApiError> {
        self.fetch_envelope("/the-loai").await
    }

    async fn countries(&self) -> Result<Envelope<TermList>, ApiError> {
        self.fetch_envelope("/quoc-gia").await
    }

    async fn years(&self) -> Result<Envelope<YearList>, ApiError> {
        self.fetch_envelope("/nam-phat-hanh").await
    }

    async fn by_genre(&self, slug: &str, page: u32) -> Result<Envelope<ListData>, ApiError> {
        self.fetch_envelope(&Self::paged(&format!("/the-loai/{}", slug), page))
            .await
    }

    async fn by_country(&self, slug: &str, page: u32) -> Result<Envelope<ListData>, ApiError> {
        self.fetch_envelope(&Self::paged(&format!("/quoc-gia/{}", slug), page))
            .await
    }

    async fn by_year(&self, year: &str, page: u32) -> Result<Envelope<ListData>, ApiError> {
        self.fetch_envelope(&Self::paged(&format!("/nam-phat-hanh/{}", year), page))
            .await
    }

    async fn search(&self, keyword: &str, page: u32) -> Result<Envelope<ListData>, ApiError> {
        let keyword: String = form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
        self.fetch_envelope(&format!("/tim-kiem?keyword={}&page={}", keyword, page.max(1)))
            .await
    }

    async fn detail(&self, slug: &str) -> Result<Envelope<DetailData>, ApiError> {
        self.fetch_envelope(&format!("/phim/{}", slug)).await
    }

    async fn images(&self, slug: &str) -> Result<Envelope<MovieImages>, ApiError> {
        self.fetch_envelope(&format!("/phim/{}/images", slug)).await
    }
}

fn section(title: &str, list_slug: &str, data: ListData) -> HomeSection {
    HomeSection {
        title: String::from(title),
        list_slug: String::from(list_slug),
        items: without_adult(data.items)
            .into_iter()
            .take(SECTION_SIZE)
            .collect(),
    }
}

/// Five list requests in flight at once; any failure fails the whole feed.
pub async fn load_home<S: CatalogSource + ?Sized>(source: &S) -> Result<HomeFeed, ApiError> {
    let (featured, latest, series, single, cartoons) = tokio::try_join!(
        source.list(LATEST_LIST, 1),
        source.list(LATEST_LIST, 2),
        source.list("phim-bo", 1),
        source.list("phim-le", 1),
        source.list("hoat-hinh", 1),
    )?;

    Ok(HomeFeed {
        hero: without_adult(featured.data.items)
            .into_iter()
            .take(HERO_SIZE)
            .collect(),
        cdn_domain: featured.cdn_domain,
        sections: vec![
            section("New Releases", LATEST_LIST, latest.data),
            section("New Series", "phim-bo", series.data),
            section("New Movies", "phim-le", single.data),
            section("Animation", "hoat-hinh", cartoons.data),
        ],
    })
}

fn require_item(envelope: Envelope<DetailData>) -> Result<(MovieDetail, Option<String>), ApiError> {
    match envelope.data.item {
        Some(movie) => Ok((movie, envelope.cdn_domain)),
        None => Err(ApiError::NotFound(String::from("Movie"))),
    }
}

pub async fn load_detail<S: CatalogSource + ?Sized>(source: &S, slug: &str) -> Result<DetailBundle, ApiError> {
    let (detail, images) = tokio::join!(source.detail(slug), source.images(slug));
    let (movie, cdn_domain) = require_item(detail?)?;

    let images = images
        .inspect_err(|error| warn!(%slug, %error, "images unavailable, using detail art"))
        .ok();

    let related = match movie.summary.categories.first() {
        Some(genre) => match source.by_genre(&genre.slug, 1).await {
            Ok(list) => without_adult(list.data.items)
                .into_iter()
                .filter(|m| m.slug != slug)
                .take(RELATED_SIZE)
                .collect(),
            Err(error) => {
                warn!(%slug, genre = %genre.slug, %error, "related movies unavailable");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    Ok(DetailBundle {
        movie,
        cdn_domain,
        images,
        related,
    })
}

pub async fn load_hero_art<S: CatalogSource + ?Sized>(source: &S, slug: &str) -> Option<Envelope<MovieImages>> {
    source
        .images(slug)
        .await
        .inspect_err(|error| debug!(%slug, %error, "hero art unavailable, using summary art"))
        .ok()
}

pub async fn load_watch<S: CatalogSource + ?Sized>(
    source: &S,
    slug: &str,
    episode: Option<&str>,
) -> Result<WatchData, ApiError> {
    let (movie, cdn_domain) = require_item(source.detail(slug).await?)?;
    let episode = movie
        .select_episode(episode)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(String::from("Episode")))?;

    Ok(WatchData {
        movie,
        episode,
        cdn_domain,
    })
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::{decode_envelope, CatalogSource};
    use crate::media::{ApiError, DetailData, Envelope, ListData, MovieImages, TermList, YearList};

    #[derive(Default)]
    pub struct FakeCatalog {
        responses: HashMap<String, serde_json::Value>,
        pub calls: Mutex<Vec<String>>,
    }

    pub fn movie(slug: &str, categories: &[&str], countries: &[&str], year: u32, kind: &str) -> serde_json::Value {
        json!({
            "slug": slug,
            "name": slug,
            "origin_name": slug,
            "thumb_url": format!("{}-thumb.jpg", slug),
            "poster_url": format!("{}-poster.jpg", slug),
            "year": year,
            "type": kind,
            "category": categories.iter().map(|c| json!({ "slug": c, "name": c })).collect::<Vec<_>>(),
            "country": countries.iter().map(|c| json!({ "slug": c, "name": c })).collect::<Vec<_>>(),
        })
    }

    pub fn list_body(items: Vec<serde_json::Value>, total: u64) -> serde_json::Value {
        json!({
            "status": true,
            "data": {
                "items": items,
                "titlePage": "Listing",
                "params": { "pagination": { "totalItems": total, "totalItemsPerPage": 24 } }
            }
        })
    }

    impl FakeCatalog {
        pub fn with(mut self, path: &str, body: serde_json::Value) -> Self {
            self.responses.insert(path.to_string(), body);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn respond<T: serde::de::DeserializeOwned>(&self, path: String) -> Result<Envelope<T>, ApiError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(path.clone());
            }
            match self.responses.get(&path) {
                Some(body) => decode_envelope(body.clone()),
                None => Err(ApiError::Network(format!("no route for {}", path))),
            }
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn home(&self) -> Result<Envelope<ListData>, ApiError> {
            self.respond(String::from("/home"))
        }
        async fn list(&self, slug: &str, page: u32) -> Result<Envelope<ListData>, ApiError> {
            self.respond(format!("/danh-sach/{}?page={}", slug, page))
        }
        async fn genres(&self) -> Result<Envelope<TermList>, ApiError> {
            self.respond(String::from("/the-loai"))
        }
        async fn countries(&self) -> Result<Envelope<TermList>, ApiError> {
            self.respond(String::from("/quoc-gia"))
        }
        async fn years(&self) -> Result<Envelope<YearList>, ApiError> {
            self.respond(String::from("/nam-phat-hanh"))
        }
        async fn by_genre(&self, slug: &str, page: u32) -> Result<Envelope<ListData>, ApiError> {
            self.respond(format!("/the-loai/{}?page={}", slug, page))
        }
        async fn by_country(&self, slug: &str, page: u32) -> Result<Envelope<ListData>, ApiError> {
            self.respond(format!("/quoc-gia/{}?page={}", slug, page))
        }
        async fn by_year(&self, year: &str, page: u32) -> Result<Envelope<ListData>, ApiError> {
            self.respond(format!("/nam-phat-hanh/{}?page={}", year, page))
        }
        async fn search(&self, keyword: &str, page: u32) -> Result<Envelope<ListData>, ApiError> {
            self.respond(format!("/tim-kiem?keyword={}&page={}", keyword, page))
        }
        async fn detail(&self, slug: &str) -> Result<Envelope<DetailData>, ApiError> {
            self.respond(format!("/phim/{}", slug))
        }
        async fn images(&self, slug: &str) -> Result<Envelope<MovieImages>, ApiError> {
            self.respond(format!("/phim/{}/images", slug))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::fake::{list_body, movie, FakeCatalog};
    use super::*;
    use crate::media::{backdrop_url_for, ListData, MovieSummary};

    #[test]
    fn status_false_is_an_error_even_with_data() {
        let result: Result<Envelope<ListData>, ApiError> =
            decode_envelope(json!({ "status": false, "msg": "maintenance", "data": { "items": [] } }));
        assert!(matches!(result, Err(ApiError::Upstream(ref m)) if m == "maintenance"));

        let missing: Result<Envelope<ListData>, ApiError> = decode_envelope(json!({ "data": { "items": [] } }));
        assert!(matches!(missing, Err(ApiError::Upstream(_))));
    }

    #[test]
    fn envelope_carries_nested_cdn_override() {
        let envelope: Envelope<ListData> = decode_envelope(json!({
            "status": true,
            "data": { "items": [], "APP_DOMAIN_CDN_IMAGE": "https://img.test" }
        }))
        .expect("decodes");
        assert_eq!(envelope.cdn(), Some("https://img.test"));
    }

    #[test]
    fn last_cdn_override_wins() {
        let cdn = CdnBase::new("https://start.test");
        let body = |domain: &str| json!({ "status": true, "data": { "items": [], "APP_DOMAIN_CDN_IMAGE": domain } });

        let _: Envelope<ListData> = record_envelope(&cdn, body("https://first.test")).expect("decodes");
        assert_eq!(cdn.get(), "https://first.test");
        let _: Envelope<ListData> = record_envelope(&cdn, body("https://second.test")).expect("decodes");
        assert_eq!(cdn.get(), "https://second.test");

        let plain: Envelope<ListData> =
            record_envelope(&cdn, json!({ "status": true, "data": { "items": [] } })).expect("decodes");
        assert!(plain.cdn().is_none());
        assert_eq!(cdn.get(), "https://second.test");

        let failed: Result<Envelope<ListData>, ApiError> =
            record_envelope(&cdn, json!({ "status": false, "data": { "APP_DOMAIN_CDN_IMAGE": "https://bad.test" } }));
        assert!(failed.is_err());
        assert_eq!(cdn.get(), "https://second.test");
    }

    #[tokio::test]
    async fn hero_art_beats_summary_poster_and_falls_back() {
        let catalog = FakeCatalog::default().with(
            "/phim/dune/images",
            json!({
                "status": true,
                "data": {
                    "APP_DOMAIN_CDN_IMAGE": "https://art.test",
                    "item": { "poster_url": "", "backdrop_url": "dune-wide.jpg" },
                    "poster_url": "dune-top.jpg"
                }
            }),
        );
        let cdn = CdnBase::new("https://global.test");
        let dune: MovieSummary =
            serde_json::from_value(movie("dune", &[], &[], 2021, "single")).expect("decodes");
        let arrival: MovieSummary =
            serde_json::from_value(movie("arrival", &[], &[], 2016, "single")).expect("decodes");

        let art = load_hero_art(&catalog, "dune").await;
        assert_eq!(
            backdrop_url_for(&dune, Some("https://feed.test"), art.as_ref(), &cdn),
            "https://art.test/uploads/movies/dune-wide.jpg"
        );

        let missing = load_hero_art(&catalog, "arrival").await;
        assert!(missing.is_none());
        assert_eq!(
            backdrop_url_for(&arrival, Some("https://feed.test"), missing.as_ref(), &cdn),
            "https://feed.test/uploads/movies/arrival-poster.jpg"
        );
    }

    #[tokio::test]
    async fn home_trims_and_drops_adult_items() {
        let featured: Vec<_> = (0..8)
            .map(|i| {
                let tags: &[&str] = if i == 0 { &["phim-18"] } else { &["hanh-dong"] };
                movie(&format!("f{}", i), tags, &[], 2024, "single")
            })
            .collect();
        let many: Vec<_> = (0..20)
            .map(|i| movie(&format!("m{}", i), &["hai-huoc"], &[], 2024, "series"))
            .collect();

        let catalog = FakeCatalog::default()
            .with("/danh-sach/phim-moi-cap-nhat?page=1", list_body(featured, 8))
            .with("/danh-sach/phim-moi-cap-nhat?page=2", list_body(many.clone(), 20))
            .with("/danh-sach/phim-bo?page=1", list_body(many.clone(), 20))
            .with("/danh-sach/phim-le?page=1", list_body(many.clone(), 20))
            .with("/danh-sach/hoat-hinh?page=1", list_body(many, 20));

        let feed = load_home(&catalog).await.expect("home loads");
        assert_eq!(feed.hero.len(), 5);
        assert_eq!(feed.hero[0].slug, "f1");
        assert_eq!(feed.sections.len(), 4);
        assert!(feed.sections.iter().all(|s| s.items.len() == 12));
        assert_eq!(feed.sections[1].list_slug, "phim-bo");
    }

    #[tokio::test]
    async fn home_fails_when_any_list_fails() {
        let catalog = FakeCatalog::default()
            .with("/danh-sach/phim-moi-cap-nhat?page=1", list_body(vec![], 0))
            .with("/danh-sach/phim-moi-cap-nhat?page=2", list_body(vec![], 0))
            .with("/danh-sach/phim-bo?page=1", list_body(vec![], 0))
            .with("/danh-sach/phim-le?page=1", list_body(vec![], 0));

        assert!(load_home(&catalog).await.is_err());
    }

    #[tokio::test]
    async fn detail_survives_failed_images_and_related() {
        let catalog = FakeCatalog::default().with(
            "/phim/dune",
            json!({
                "status": true,
                "data": {
                    "APP_DOMAIN_CDN_IMAGE": "https://detail.test",
                    "item": movie("dune", &["vien-tuong"], &["au-my"], 2021, "single")
                }
            }),
        );

        let bundle = load_detail(&catalog, "dune").await.expect("detail loads");
        assert!(bundle.images.is_none());
        assert!(bundle.related.is_empty());
        assert_eq!(bundle.cdn_domain.as_deref(), Some("https://detail.test"));
        assert!(catalog.calls().contains(&String::from("/the-loai/vien-tuong?page=1")));
    }

    #[tokio::test]
    async fn detail_related_excludes_itself() {
        let catalog = FakeCatalog::default()
            .with(
                "/phim/dune",
                json!({ "status": true, "data": { "item": movie("dune", &["vien-tuong"], &[], 2021, "single") } }),
            )
            .with("/phim/dune/images", json!({ "status": true, "data": { "poster_url": "wide.jpg" } }))
            .with(
                "/the-loai/vien-tuong?page=1",
                list_body(
                    vec![
                        movie("dune", &["vien-tuong"], &[], 2021, "single"),
                        movie("arrival", &["vien-tuong"], &[], 2016, "single"),
                        movie("adult", &["vien-tuong", "phim-18"], &[], 2016, "single"),
                    ],
                    3,
                ),
            );

        let bundle = load_detail(&catalog, "dune").await.expect("detail loads");
        assert!(bundle.images.is_some());
        let related: Vec<_> = bundle.related.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(related, vec!["arrival"]);
    }

    #[tokio::test]
    async fn detail_without_item_is_not_found() {
        let catalog = FakeCatalog::default().with("/phim/ghost", json!({ "status": true, "data": {} }));
        assert!(matches!(
            load_detail(&catalog, "ghost").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn watch_requires_a_matching_episode() {
        let mut detail = movie("show", &[], &[], 2020, "series");
        detail["episodes"] = json!([{
            "server_name": "HD",
            "server_data": [{ "name": "1", "slug": "tap-1", "link_embed": "https://p.test/1" }]
        }]);
        let catalog = FakeCatalog::default().with("/phim/show", json!({ "status": true, "data": { "item": detail } }));

        let watch = load_watch(&catalog, "show", None).await.expect("first episode");
        assert_eq!(watch.episode.slug, "tap-1");
        assert!(matches!(
            load_watch(&catalog, "show", Some("tap-9")).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
