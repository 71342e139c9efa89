use iced::Task;
use tracing::{info, warn};

use crate::handlers::{fail_page, is_current, request_page_images};
use crate::media::{ApiError, DetailBundle, LoadingState, Message, PageContent, WatchData};
use crate::ophim::{load_detail, load_watch, OphimClient};
use crate::Ophix;

pub fn load_detail_page(client: OphimClient, slug: String, generation: u64) -> Task<Message> {
    Task::perform(
        async move { load_detail(&client, &slug).await },
        move |result| Message::DetailLoaded(generation, Box::new(result)),
    )
}

pub fn load_watch_page(
    client: OphimClient,
    slug: String,
    episode: Option<String>,
    generation: u64,
) -> Task<Message> {
    Task::perform(
        async move { load_watch(&client, &slug, episode.as_deref()).await },
        move |result| Message::WatchLoaded(generation, Box::new(result)),
    )
}

pub fn handle_detail_loaded(
    app: &mut Ophix,
    generation: u64,
    result: Result<DetailBundle, ApiError>,
) -> Task<Message> {
    if !is_current(app, generation, "detail") {
        return Task::none();
    }
    match result {
        Ok(bundle) => {
            info!(
                slug = %bundle.movie.summary.slug,
                servers = bundle.movie.episodes.len(),
                related = bundle.related.len(),
                "detail loaded"
            );
            app.loading_state = LoadingState::Idle;
            app.content = PageContent::Detail(Box::new(bundle));
            request_page_images(app)
        }
        Err(error) => {
            fail_page(app, error);
            Task::none()
        }
    }
}

pub fn handle_watch_loaded(
    app: &mut Ophix,
    generation: u64,
    result: Result<WatchData, ApiError>,
) -> Task<Message> {
    if !is_current(app, generation, "watch") {
        return Task::none();
    }
    match result {
        Ok(data) => {
            app.loading_state = LoadingState::Idle;
            app.content = PageContent::Watch(Box::new(data));
            request_page_images(app)
        }
        Err(error) => {
            fail_page(app, error);
            Task::none()
        }
    }
}

pub fn handle_open_player(url: String) -> Task<Message> {
    if url.is_empty() {
        return Task::none();
    }
    match webbrowser::open(&url) {
        Ok(()) => info!(%url, "opened player"),
        Err(error) => warn!(%url, %error, "could not open player"),
    }
    Task::none()
}
