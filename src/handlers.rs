use iced::Task;
use tracing::{debug, info, warn};

use crate::detail_handlers;
use crate::filters::{apply_page, cleared_route, filtered_route, FilterKey, FilterState};
use crate::media::{
    backdrop_url_for, ApiError, HomeFeed, LoadingState, Message, MovieSummary, PageContent,
};
use crate::ophim::{fetch_image_bytes, load_hero_art, load_home, CatalogSource};
use crate::pipeline::{run_listing, ListingOutcome, ListingScope};
use crate::reference::{current_year, load_reference_data};
use crate::route::{Page, Route};
use crate::suggest::Ticket;
use crate::Ophix;

pub fn handle_message(app: &mut Ophix, message: Message) -> Task<Message> {
    let task = dispatch(app, message);
    if !cdn_moved(app) {
        return task;
    }
    let page = request_page_images(app);
    let suggestions = request_suggestion_images(app);
    Task::batch([task, page, suggestions])
}

fn dispatch(app: &mut Ophix, message: Message) -> Task<Message> {
    match message {
        Message::Navigate(route) => handle_navigate(app, route),
        Message::Back => handle_back(app),
        Message::RetryLoad => load_current_page(app),
        Message::HomeLoaded(generation, result) => handle_home_loaded(app, generation, result),
        Message::ListingLoaded(generation, result) => {
            handle_listing_loaded(app, generation, result)
        }
        Message::DetailLoaded(generation, result) => {
            detail_handlers::handle_detail_loaded(app, generation, *result)
        }
        Message::WatchLoaded(generation, result) => {
            detail_handlers::handle_watch_loaded(app, generation, *result)
        }
        Message::ReferenceLoaded(data) => {
            app.reference.finish(data);
            Task::none()
        }
        Message::FilterChanged(key, value) => handle_filter_changed(app, key, value),
        Message::PageChanged(page) => {
            let route = app.route.clone().with_query(apply_page(&app.route.query, page));
            handle_navigate(app, route)
        }
        Message::ResetFilters => handle_navigate(app, Route::home()),
        Message::ClearFilters => {
            let route = cleared_route(&app.route);
            handle_navigate(app, route)
        }
        Message::SuggestInput(value) => handle_suggest_input(app, value),
        Message::SuggestDue(ticket) => handle_suggest_due(app, ticket),
        Message::SuggestLoaded(ticket, result) => handle_suggest_loaded(app, ticket, result),
        Message::SearchSubmit => match app.suggest.submit() {
            Some(keyword) => handle_navigate(app, Route::search(&keyword)),
            None => Task::none(),
        },
        Message::DismissSuggest => {
            app.suggest.dismiss();
            Task::none()
        }
        Message::LoadImage(url) => handle_load_image(app, url),
        Message::ImageLoaded(url, result) => handle_image_loaded(app, url, result),
        Message::HeroTick | Message::HeroNext => {
            rotate_hero(app, 1);
            request_hero_art(app)
        }
        Message::HeroPrevious => {
            rotate_hero(app, -1);
            request_hero_art(app)
        }
        Message::HeroArtLoaded(slug, images) => {
            app.hero_art.insert(slug, images);
            request_page_images(app)
        }
        Message::OpenPlayer(url) => detail_handlers::handle_open_player(url),
    }
}

fn handle_navigate(app: &mut Ophix, route: Route) -> Task<Message> {
    if route == app.route {
        return Task::none();
    }
    debug!(from = %app.route, to = %route, "navigate");
    let previous = std::mem::replace(&mut app.route, route);
    app.history.push(previous);
    app.suggest.dismiss();
    load_current_page(app)
}

fn handle_back(app: &mut Ophix) -> Task<Message> {
    let Some(route) = app.history.pop() else {
        return Task::none();
    };
    app.route = route;
    load_current_page(app)
}

fn handle_filter_changed(app: &mut Ophix, key: FilterKey, value: String) -> Task<Message> {
    let route = filtered_route(&app.route, key, &value);
    handle_navigate(app, route)
}

pub fn load_reference(app: &mut Ophix) -> Task<Message> {
    if !app.reference.start() {
        return Task::none();
    }
    let client = app.client.clone();
    Task::perform(
        async move { load_reference_data(&client, current_year()).await },
        Message::ReferenceLoaded,
    )
}

pub fn load_current_page(app: &mut Ophix) -> Task<Message> {
    app.generation += 1;
    app.hero_index = 0;
    app.content = PageContent::Empty;
    app.loading_state = LoadingState::Loading;

    let generation = app.generation;
    let client = app.client.clone();
    let filters = FilterState::from_query(&app.route.query);

    match app.route.page.clone() {
        Page::Home => Task::perform(
            async move { load_home(&client).await },
            move |result| Message::HomeLoaded(generation, result),
        ),
        Page::Listing { kind, slug } => {
            let scope = ListingScope::Browse {
                implied: Some((kind, slug)),
            };
            listing_task(client, filters, scope, generation)
        }
        Page::Search => match app.route.query.get("keyword").map(str::trim) {
            Some(keyword) if !keyword.is_empty() => {
                let scope = ListingScope::Search {
                    keyword: keyword.to_string(),
                };
                listing_task(client, filters, scope, generation)
            }
            _ => {
                app.loading_state = LoadingState::Idle;
                Task::none()
            }
        },
        Page::Detail { slug } => detail_handlers::load_detail_page(client, slug, generation),
        Page::Watch { slug, episode } => {
            detail_handlers::load_watch_page(client, slug, episode, generation)
        }
    }
}

fn listing_task<S: CatalogSource + Clone + 'static>(
    source: S,
    filters: FilterState,
    scope: ListingScope,
    generation: u64,
) -> Task<Message> {
    Task::perform(
        async move { run_listing(&source, &filters, &scope).await },
        move |result| Message::ListingLoaded(generation, result),
    )
}

pub fn is_current(app: &Ophix, generation: u64, what: &str) -> bool {
    if generation != app.generation {
        debug!(what, generation, current = app.generation, "dropping stale page load");
        return false;
    }
    true
}

pub fn fail_page(app: &mut Ophix, error: ApiError) {
    warn!(route = %app.route, %error, "page load failed");
    app.content = PageContent::Empty;
    app.loading_state = LoadingState::Error(error.user_message());
}

fn handle_home_loaded(app: &mut Ophix, generation: u64, result: Result<HomeFeed, ApiError>) -> Task<Message> {
    if !is_current(app, generation, "home") {
        return Task::none();
    }
    match result {
        Ok(feed) => {
            app.loading_state = LoadingState::Idle;
            app.content = PageContent::Home(feed);
            let images = request_page_images(app);
            let art = request_hero_art(app);
            Task::batch([images, art])
        }
        Err(error) => {
            fail_page(app, error);
            Task::none()
        }
    }
}

fn handle_listing_loaded(
    app: &mut Ophix,
    generation: u64,
    result: Result<ListingOutcome, ApiError>,
) -> Task<Message> {
    if !is_current(app, generation, "listing") {
        return Task::none();
    }
    match result {
        Ok(outcome) => {
            info!(
                route = %app.route,
                primary = ?outcome.primary,
                fetched = outcome.fetched,
                shown = outcome.items.len(),
                "listing loaded"
            );
            app.loading_state = LoadingState::Idle;
            app.content = PageContent::Listing(outcome);
            request_page_images(app)
        }
        Err(error) => {
            fail_page(app, error);
            Task::none()
        }
    }
}

fn rotate_hero(app: &mut Ophix, step: isize) {
    let PageContent::Home(feed) = &app.content else {
        return;
    };
    let count = feed.hero.len();
    if count == 0 {
        return;
    }
    app.hero_index = (app.hero_index as isize + step).rem_euclid(count as isize) as usize;
}

fn request_hero_art(app: &mut Ophix) -> Task<Message> {
    let PageContent::Home(feed) = &app.content else {
        return Task::none();
    };
    let Some(slug) = feed.hero.get(app.hero_index).map(|m| m.slug.clone()) else {
        return Task::none();
    };
    if app.hero_art.contains_key(&slug) {
        return Task::none();
    }
    app.hero_art.insert(slug.clone(), None);

    let client = app.client.clone();
    Task::perform(
        async move {
            let images = load_hero_art(&client, &slug).await;
            (slug, images)
        },
        |(slug, images)| Message::HeroArtLoaded(slug, images),
    )
}

fn cdn_moved(app: &mut Ophix) -> bool {
    let origin = app.client.cdn().get();
    if origin == app.image_origin {
        return false;
    }
    debug!(from = %app.image_origin, to = %origin, "image CDN moved, re-requesting images");
    app.image_origin = origin;
    true
}

fn handle_suggest_input(app: &mut Ophix, value: String) -> Task<Message> {
    let Some(ticket) = app.suggest.input(value) else {
        return Task::none();
    };
    let delay = app.suggest.debounce();
    Task::perform(tokio::time::sleep(delay), move |_| Message::SuggestDue(ticket))
}

fn handle_suggest_due(app: &mut Ophix, ticket: Ticket) -> Task<Message> {
    let Some(keyword) = app.suggest.fire(ticket) else {
        return Task::none();
    };
    let client = app.client.clone();
    Task::perform(
        async move {
            client
                .search(&keyword, 1)
                .await
                .map(|envelope| envelope.data.items)
        },
        move |result| Message::SuggestLoaded(ticket, result),
    )
}

fn handle_suggest_loaded(
    app: &mut Ophix,
    ticket: Ticket,
    result: Result<Vec<MovieSummary>, ApiError>,
) -> Task<Message> {
    if !app.suggest.complete(ticket, result) {
        return Task::none();
    }
    request_suggestion_images(app)
}

fn request_suggestion_images(app: &mut Ophix) -> Task<Message> {
    let urls: Vec<String> = app
        .suggest
        .results
        .iter()
        .map(|m| app.card_url(m, None))
        .collect();
    request_images(app, urls)
}

pub fn request_page_images(app: &mut Ophix) -> Task<Message> {
    let urls = app.page_image_urls();
    request_images(app, urls)
}

fn request_images(app: &mut Ophix, urls: Vec<String>) -> Task<Message> {
    let tasks: Vec<Task<Message>> = urls
        .into_iter()
        .filter(|url| app.image_cache.needs_load(url))
        .map(|url| Task::done(Message::LoadImage(url)))
        .collect();
    Task::batch(tasks)
}

fn handle_load_image(app: &mut Ophix, url: String) -> Task<Message> {
    if !app.image_cache.needs_load(&url) {
        return Task::none();
    }
    app.image_cache.mark_pending(url.clone());
    let image_url = url.clone();
    let cache_path = app.image_cache.get_cache_path(&url);

    Task::perform(
        async move {
            if let Some(ref path) = cache_path {
                if let Ok(bytes) = tokio::fs::read(path).await {
                    return (image_url, Ok(bytes), cache_path, true);
                }
            }
            let bytes = fetch_image_bytes(image_url.clone()).await;
            (image_url, bytes, cache_path, false)
        },
        |(url, result, cache_path, from_cache)| match result {
            Ok(bytes) => {
                if !from_cache {
                    if let Some(path) = cache_path {
                        let bytes_clone = bytes.clone();
                        std::thread::spawn(move || {
                            let _ = std::fs::write(path, &bytes_clone);
                        });
                    }
                }
                Message::ImageLoaded(url, Ok(iced::widget::image::Handle::from_bytes(bytes)))
            }
            Err(error) => Message::ImageLoaded(url, Err(error)),
        },
    )
}

fn handle_image_loaded(
    app: &mut Ophix,
    url: String,
    result: Result<iced::widget::image::Handle, String>,
) -> Task<Message> {
    match result {
        Ok(handle) => app.image_cache.insert(url, handle),
        Err(error) => {
            debug!(%url, %error, "image failed");
            app.image_cache.fail(&url);
        }
    }
    Task::none()
}

impl Ophix {
    pub fn card_url(&self, movie: &MovieSummary, response_cdn: Option<&str>) -> String {
        self.client.cdn().resolve(movie.card_path(), response_cdn)
    }

    pub fn hero_backdrop_url(&self, movie: &MovieSummary, feed_cdn: Option<&str>) -> String {
        let art = self.hero_art.get(&movie.slug).and_then(Option::as_ref);
        backdrop_url_for(movie, feed_cdn, art, self.client.cdn())
    }

    fn page_image_urls(&self) -> Vec<String> {
        let cdn = self.client.cdn();
        match &self.content {
            PageContent::Empty => Vec::new(),
            PageContent::Home(feed) => {
                let hero = feed
                    .hero
                    .iter()
                    .map(|m| self.hero_backdrop_url(m, feed.cdn_domain.as_deref()));
                let cards = feed
                    .sections
                    .iter()
                    .flat_map(|s| &s.items)
                    .map(|m| self.card_url(m, None));
                hero.chain(cards).collect()
            }
            PageContent::Listing(outcome) => outcome
                .items
                .iter()
                .map(|m| self.card_url(m, outcome.cdn_domain.as_deref()))
                .collect(),
            PageContent::Detail(bundle) => [bundle.backdrop_url(cdn), bundle.poster_url(cdn)]
                .into_iter()
                .chain(bundle.related.iter().map(|m| self.card_url(m, None)))
                .collect(),
            PageContent::Watch(data) => {
                vec![self.card_url(&data.movie.summary, data.cdn_domain.as_deref())]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::media::{Envelope, MovieImages};
    use crate::pipeline::PrimaryCall;
    use crate::route::ListingKind;
    use crate::settings::AppSettings;

    fn app() -> Ophix {
        Ophix::with_settings(AppSettings::default(), Route::home())
    }

    fn summary(slug: &str) -> MovieSummary {
        serde_json::from_value(json!({ "slug": slug, "poster_url": format!("{}.jpg", slug) })).expect("decodes")
    }

    fn outcome(slug: &str) -> ListingOutcome {
        ListingOutcome {
            items: vec![summary(slug)],
            pagination: None,
            title_page: None,
            primary: PrimaryCall::Latest,
            fetched: 1,
            cdn_domain: None,
        }
    }

    fn home(app: &mut Ophix, slugs: &[&str]) {
        app.content = PageContent::Home(HomeFeed {
            hero: slugs.iter().map(|s| summary(s)).collect(),
            sections: Vec::new(),
            cdn_domain: None,
        });
    }

    #[test]
    fn stale_page_loads_are_dropped() {
        let mut app = app();
        let _ = handle_message(&mut app, Message::Navigate(Route::listing(ListingKind::Category, "phim-bo")));
        let stale = app.generation;
        let _ = handle_message(&mut app, Message::Navigate(Route::listing(ListingKind::Genre, "hanh-dong")));
        let current = app.generation;
        assert_ne!(stale, current);

        let _ = handle_message(&mut app, Message::ListingLoaded(stale, Ok(outcome("old"))));
        assert!(matches!(app.content, PageContent::Empty));
        assert!(matches!(app.loading_state, LoadingState::Loading));

        let _ = handle_message(&mut app, Message::ListingLoaded(stale, Err(ApiError::Http(500))));
        assert!(matches!(app.loading_state, LoadingState::Loading));

        let _ = handle_message(&mut app, Message::ListingLoaded(current, Ok(outcome("new"))));
        assert!(matches!(app.loading_state, LoadingState::Idle));
        assert!(matches!(&app.content, PageContent::Listing(o) if o.items[0].slug == "new"));
    }

    #[test]
    fn back_reloads_under_a_new_generation() {
        let mut app = app();
        let _ = handle_message(&mut app, Message::Navigate(Route::detail("dune")));
        let detail = app.generation;
        let _ = handle_message(&mut app, Message::Back);
        assert_eq!(app.route, Route::home());
        assert!(app.generation > detail);
        assert!(app.history.is_empty());
    }

    #[test]
    fn hero_art_is_requested_once_per_slide() {
        let mut app = app();
        home(&mut app, &["a", "b"]);

        let _ = request_hero_art(&mut app);
        assert!(app.hero_art.contains_key("a"));
        assert!(!app.hero_art.contains_key("b"));

        let _ = handle_message(&mut app, Message::HeroNext);
        assert_eq!(app.hero_index, 1);
        assert!(app.hero_art.contains_key("b"));

        let _ = handle_message(&mut app, Message::HeroPrevious);
        assert_eq!(app.hero_index, 0);
        assert_eq!(app.hero_art.len(), 2);
    }

    #[test]
    fn loaded_hero_art_replaces_summary_backdrop() {
        let mut app = app();
        app.client.cdn().set("https://img.test");
        home(&mut app, &["a"]);
        let movie = summary("a");
        assert_eq!(app.hero_backdrop_url(&movie, None), "https://img.test/uploads/movies/a.jpg");

        let art = Envelope {
            data: serde_json::from_value::<MovieImages>(json!({ "backdrop_url": "a-wide.jpg" })).expect("decodes"),
            cdn_domain: None,
        };
        let _ = handle_message(&mut app, Message::HeroArtLoaded(String::from("a"), Some(art)));
        assert_eq!(app.hero_backdrop_url(&movie, None), "https://img.test/uploads/movies/a-wide.jpg");
        assert!(app.page_image_urls().contains(&String::from("https://img.test/uploads/movies/a-wide.jpg")));
    }

    #[test]
    fn cdn_change_is_noticed_once() {
        let mut app = app();
        home(&mut app, &["a"]);
        assert!(!cdn_moved(&mut app));

        app.client.cdn().set("https://moved.test");
        assert!(cdn_moved(&mut app));
        assert!(!cdn_moved(&mut app));
        assert_eq!(app.page_image_urls(), vec![String::from("https://moved.test/uploads/movies/a.jpg")]);
    }
}
