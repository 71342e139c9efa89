mod cards;
mod cdn;
mod components;
mod detail;
mod detail_handlers;
mod filters;
mod handlers;
mod hero;
mod listing;
mod media;
mod ophim;
mod pipeline;
mod reference;
mod route;
mod search;
mod settings;
mod suggest;
mod watch;

use std::collections::HashMap;
use std::time::Duration;

use iced::widget::container;
use iced::{Element, Font, Length, Size, Subscription, Task, Theme};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use media::{Envelope, ImageCache, LoadingState, Message, MovieImages, PageContent, BACKGROUND_BLACK};
use ophim::OphimClient;
use reference::ReferenceStore;
use route::Route;
use settings::AppSettings;
use suggest::SearchSuggest;

const HERO_ROTATION: Duration = Duration::from_secs(8);

pub struct Ophix {
    pub settings: AppSettings,
    pub client: OphimClient,
    pub route: Route,
    pub history: Vec<Route>,
    /// Bumped on every navigation; page loads stamped with an older value are dropped.
    pub generation: u64,
    pub loading_state: LoadingState,
    pub content: PageContent,
    pub reference: ReferenceStore,
    pub suggest: SearchSuggest,
    pub image_cache: ImageCache,
    pub hero_index: usize,
    /// Images responses per hero slug; `None` while pending or after a failure.
    pub hero_art: HashMap<String, Option<Envelope<MovieImages>>>,
    pub image_origin: String,
}

impl Ophix {
    fn with_settings(settings: AppSettings, route: Route) -> Self {
        Self {
            client: OphimClient::from_settings(&settings),
            image_origin: settings.image_cdn.clone(),
            suggest: SearchSuggest::new(settings.suggest_min_chars, settings.suggest_debounce()),
            settings,
            route,
            history: Vec::new(),
            generation: 0,
            loading_state: LoadingState::Idle,
            content: PageContent::Empty,
            reference: ReferenceStore::default(),
            image_cache: ImageCache::new(),
            hero_index: 0,
            hero_art: HashMap::new(),
        }
    }

    fn new() -> (Self, Task<Message>) {
        let settings = AppSettings::resolve();
        let route = match std::env::args().nth(1) {
            Some(arg) => Route::parse(&arg).unwrap_or_else(|| {
                warn!(route = %arg, "unrecognised start route, opening home");
                Route::home()
            }),
            None => Route::home(),
        };
        info!(api = %settings.api_base_url, %route, "starting");

        let mut app = Self::with_settings(settings, route);
        let reference = handlers::load_reference(&mut app);
        let page = handlers::load_current_page(&mut app);
        (app, Task::batch([reference, page]))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        handlers::handle_message(self, message)
    }

    fn view(&self) -> Element<'_, Message> {
        container(self.view_main_content())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            })
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        match &self.content {
            PageContent::Home(feed) if feed.hero.len() > 1 => {
                iced::time::every(HERO_ROTATION).map(|_| Message::HeroTick)
            }
            _ => Subscription::none(),
        }
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    iced::application(Ophix::new, Ophix::update, Ophix::view)
        .title("Ophix")
        .theme(Ophix::theme)
        .window_size(Size::new(1280.0, 800.0))
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .default_font(Font::DEFAULT)
        .subscription(Ophix::subscription)
        .run()
}
