use std::fmt;

use iced::widget::{
    button, column, container, pick_list, row, scrollable, text, text_input, Column, Row, Space,
};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::filters::{displayed_value, FilterKey, ALL, CATEGORIES};
use crate::media::{
    LoadingState, Message, MovieSummary, Pagination, PageContent, ACCENT_RED, SURFACE_DARK_GRAY,
    TEXT_GRAY, TEXT_WHITE,
};
use crate::route::{ListingKind, Page, Route};
use crate::Ophix;

const ICON_ARROW_LEFT: char = '\u{F12F}';
const ICON_SEARCH: char = '\u{F52A}';
const ICON_CHEVRON_LEFT: char = '\u{F284}';
const ICON_CHEVRON_RIGHT: char = '\u{F285}';
const ICON_FILM: char = '\u{F3A9}';

const HEADER_HEIGHT: f32 = 72.0;

pub fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn bold() -> iced::Font {
    iced::Font {
        weight: iced::font::Weight::Bold,
        ..Default::default()
    }
}

pub fn hidden_scrollbar_style(_theme: &iced::Theme, _status: scrollable::Status) -> scrollable::Style {
    let rail = || scrollable::Rail {
        background: None,
        border: Border::default(),
        scroller: scrollable::Scroller {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
        },
    };
    scrollable::Style {
        container: container::Style::default(),
        vertical_rail: rail(),
        horizontal_rail: rail(),
        gap: None,
        auto_scroll: scrollable::AutoScroll {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
            shadow: Shadow::default(),
            icon: Color::TRANSPARENT,
        },
    }
}

pub fn accent_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered => Color::from_rgb(0.7, 0.02, 0.06),
        button::Status::Disabled => Color::from_rgba(0.898, 0.035, 0.078, 0.4),
        _ => ACCENT_RED,
    };
    button::Style {
        background: Some(iced::Background::Color(background)),
        text_color: TEXT_WHITE,
        border: Border::default().rounded(6),
        shadow: Shadow::default(),
        snap: false,
    }
}

pub fn ghost_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let (alpha, text_color) = match status {
        button::Status::Hovered => (0.2, TEXT_WHITE),
        button::Status::Disabled => (0.04, TEXT_GRAY),
        _ => (0.1, TEXT_WHITE),
    };
    button::Style {
        background: Some(iced::Background::Color(Color::from_rgba(1.0, 1.0, 1.0, alpha))),
        text_color,
        border: Border {
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
            width: 1.0,
            radius: 6.0.into(),
        },
        shadow: Shadow::default(),
        snap: false,
    }
}

fn link_button_style(active: bool) -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    move |_theme, status| {
        let text_color = match status {
            button::Status::Hovered => TEXT_WHITE,
            _ if active => TEXT_WHITE,
            _ => TEXT_GRAY,
        };
        button::Style {
            background: Some(iced::Background::Color(if active {
                ACCENT_RED
            } else {
                Color::TRANSPARENT
            })),
            text_color,
            border: Border::default().rounded(6),
            shadow: Shadow::default(),
            snap: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub slug: String,
    pub name: String,
}

impl FilterOption {
    fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FilterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Ophix {
    pub fn view_main_content(&self) -> Element<'_, Message> {
        let body: Element<Message> = match &self.loading_state {
            LoadingState::Loading => self.view_loading(),
            LoadingState::Error(message) => self.view_error_state(message),
            LoadingState::Idle => scrollable(self.view_page())
                .direction(scrollable::Direction::Vertical(
                    scrollable::Scrollbar::new().width(0).scroller_width(0),
                ))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(hidden_scrollbar_style)
                .into(),
        };

        let page = column![self.view_header(), body]
            .width(Length::Fill)
            .height(Length::Fill);

        if !self.suggest.is_open() {
            return page.into();
        }

        let dropdown = container(self.view_suggest_dropdown())
            .width(Length::Fill)
            .align_x(iced::alignment::Horizontal::Right)
            .padding(Padding::new(0.0).top(HEADER_HEIGHT).right(32.0));

        iced::widget::stack![page, dropdown]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_page(&self) -> Element<'_, Message> {
        match (&self.route.page, &self.content) {
            (Page::Home, PageContent::Home(feed)) => self.view_home_page(feed),
            (Page::Listing { .. }, PageContent::Listing(outcome)) => self.view_listing_page(outcome),
            (Page::Search, _) => self.view_search_page(),
            (Page::Detail { .. }, PageContent::Detail(bundle)) => self.view_detail_page(bundle),
            (Page::Watch { .. }, PageContent::Watch(data)) => self.view_watch_page(data),
            _ => Space::new().width(Length::Fill).height(Length::Fill).into(),
        }
    }

    pub fn view_header(&self) -> Element<'_, Message> {
        let back: Element<Message> = if self.history.is_empty() {
            Space::new().width(0).into()
        } else {
            button(icon(ICON_ARROW_LEFT).size(16).color(TEXT_WHITE))
                .padding(8)
                .style(link_button_style(false))
                .on_press(Message::Back)
                .into()
        };

        let logo = button(text("OPHIX").size(26).color(ACCENT_RED).font(bold()))
            .padding(0)
            .style(|_theme, _status| button::Style {
                background: None,
                text_color: ACCENT_RED,
                border: Border::default(),
                shadow: Shadow::default(),
                snap: false,
            })
            .on_press(Message::Navigate(Route::home()));

        let nav_items = [
            ("Home", Route::home()),
            ("Series", Route::listing(ListingKind::Category, "phim-bo")),
            ("Movies", Route::listing(ListingKind::Category, "phim-le")),
            ("Animation", Route::listing(ListingKind::Category, "hoat-hinh")),
            ("TV Shows", Route::listing(ListingKind::Category, "tv-shows")),
        ];
        let nav_buttons: Vec<Element<Message>> = nav_items
            .into_iter()
            .map(|(label, route)| {
                let active = self.route.page == route.page;
                button(text(label).size(14))
                    .padding(Padding::new(6.0).left(12.0).right(12.0))
                    .style(link_button_style(active))
                    .on_press(Message::Navigate(route))
                    .into()
            })
            .collect();

        let header_content = row![
            back,
            logo,
            Row::with_children(nav_buttons)
                .spacing(8)
                .align_y(iced::Alignment::Center),
            Space::new().width(Length::Fill),
            self.view_search_box()
        ]
        .spacing(24)
        .padding(Padding::new(16.0).left(32.0).right(32.0))
        .align_y(iced::Alignment::Center);

        container(header_content)
            .width(Length::Fill)
            .height(Length::Fixed(HEADER_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.6))),
                ..Default::default()
            })
            .into()
    }

    fn view_search_box(&self) -> Element<'_, Message> {
        let search_input = text_input("Search movies...", &self.suggest.input)
            .on_input(Message::SuggestInput)
            .on_submit(Message::SearchSubmit)
            .padding(8)
            .size(14)
            .width(Length::Fixed(240.0))
            .style(|_theme, _status| text_input::Style {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
                icon: TEXT_GRAY,
                placeholder: TEXT_GRAY,
                value: TEXT_WHITE,
                selection: ACCENT_RED,
            });

        let submit = button(icon(ICON_SEARCH).size(14).color(TEXT_GRAY))
            .padding(6)
            .style(link_button_style(false))
            .on_press(Message::SearchSubmit);

        container(row![submit, search_input].spacing(4).align_y(iced::Alignment::Center))
            .padding(Padding::new(2.0).left(8.0).right(8.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.7))),
                border: Border {
                    color: TEXT_GRAY,
                    width: 1.0,
                    radius: 20.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    fn view_suggest_dropdown(&self) -> Element<'_, Message> {
        let content: Element<Message> = if self.suggest.loading {
            text("Searching...").size(13).color(TEXT_GRAY).into()
        } else {
            let rows: Vec<Element<Message>> = self
                .suggest
                .results
                .iter()
                .map(|movie| self.view_suggestion(movie))
                .collect();
            column![
                text("Search results").size(11).color(TEXT_GRAY).font(bold()),
                Column::with_children(rows).spacing(2)
            ]
            .spacing(6)
            .into()
        };

        let dismiss = button(text("Close").size(12).color(TEXT_GRAY))
            .padding(4)
            .style(link_button_style(false))
            .on_press(Message::DismissSuggest);

        container(column![content, dismiss].spacing(8))
            .width(Length::Fixed(380.0))
            .padding(12)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                    width: 1.0,
                    radius: 10.0.into(),
                },
                shadow: Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
                    offset: iced::Vector::new(0.0, 4.0),
                    blur_radius: 12.0,
                },
                ..Default::default()
            })
            .into()
    }

    fn view_suggestion(&self, movie: &MovieSummary) -> Element<'_, Message> {
        let url = self.card_url(movie, None);
        let thumb: Element<Message> = match self.image_cache.get(&url) {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fixed(40.0))
                .height(Length::Fixed(56.0))
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => container(icon(ICON_FILM).size(16).color(TEXT_GRAY))
                .width(Length::Fixed(40.0))
                .height(Length::Fixed(56.0))
                .center_x(Length::Fixed(40.0))
                .center_y(Length::Fixed(56.0))
                .into(),
        };

        let subtitle = match movie.year {
            Some(year) => format!("{} ({})", movie.origin_name, year),
            None => movie.origin_name.clone(),
        };

        button(
            row![
                thumb,
                column![
                    text(movie.name.clone())
                        .size(14)
                        .color(TEXT_WHITE)
                        .shaping(text::Shaping::Advanced),
                    text(subtitle)
                        .size(12)
                        .color(TEXT_GRAY)
                        .shaping(text::Shaping::Advanced),
                ]
                .spacing(2)
            ]
            .spacing(10)
            .align_y(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(6)
        .style(|_theme, status| button::Style {
            background: Some(iced::Background::Color(match status {
                button::Status::Hovered => Color::from_rgba(1.0, 1.0, 1.0, 0.08),
                _ => Color::TRANSPARENT,
            })),
            text_color: TEXT_WHITE,
            border: Border::default().rounded(6),
            shadow: Shadow::default(),
            snap: false,
        })
        .on_press(Message::Navigate(Route::detail(movie.slug.clone())))
        .into()
    }

    fn view_loading(&self) -> Element<'_, Message> {
        container(text("Loading...").size(16).color(TEXT_GRAY))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn view_error_state<'a>(&'a self, message: &'a str) -> Element<'a, Message> {
        let retry = button(text("Retry").size(15).color(TEXT_WHITE))
            .padding(Padding::new(10.0).left(24.0).right(24.0))
            .style(accent_button_style)
            .on_press(Message::RetryLoad);

        let mut actions = row![retry].spacing(12);
        if matches!(self.route.page, Page::Listing { .. } | Page::Search) {
            actions = actions.push(
                button(text("Clear filters").size(15))
                    .padding(Padding::new(10.0).left(24.0).right(24.0))
                    .style(ghost_button_style)
                    .on_press(Message::ClearFilters),
            );
        }

        container(
            column![text(message).size(18).color(ACCENT_RED), actions]
                .spacing(16)
                .align_x(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
    }

    pub fn view_empty_state<'a>(&'a self, message: &'a str) -> Element<'a, Message> {
        container(
            column![
                text(message).size(16).color(TEXT_GRAY),
                button(text("Clear filters").size(14))
                    .padding(Padding::new(8.0).left(20.0).right(20.0))
                    .style(ghost_button_style)
                    .on_press(Message::ClearFilters),
            ]
            .spacing(14)
            .align_x(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(64)
        .center_x(Length::Fill)
        .into()
    }

    fn filter_options(&self, key: FilterKey) -> Vec<FilterOption> {
        let all = match key {
            FilterKey::Category => "All categories",
            FilterKey::Genre => "All genres",
            FilterKey::Country => "All countries",
            FilterKey::Year => "All years",
        };
        let mut options = vec![FilterOption::new(ALL, all)];
        let terms = self.reference.data().map(|data| match key {
            FilterKey::Category => Vec::new(),
            FilterKey::Genre => data.genres.clone(),
            FilterKey::Country => data.countries.clone(),
            FilterKey::Year => data.years.clone(),
        });

        match key {
            FilterKey::Category => options.extend(
                CATEGORIES
                    .iter()
                    .map(|(slug, name)| FilterOption::new(*slug, *name)),
            ),
            _ => options.extend(
                terms
                    .unwrap_or_default()
                    .into_iter()
                    .map(|t| FilterOption::new(t.slug, t.name)),
            ),
        }
        options
    }

    fn view_filter_picker(&self, key: FilterKey, label: &'static str) -> Element<'_, Message> {
        let options = self.filter_options(key);
        let value = displayed_value(&self.route, key);
        let selected = options
            .iter()
            .find(|o| o.slug == value)
            .cloned()
            .or_else(|| (value != ALL).then(|| FilterOption::new(value.clone(), value.clone())));

        let placeholder = if self.reference.is_loading() && key != FilterKey::Category {
            "Loading..."
        } else {
            "All"
        };

        let picker = pick_list(options, selected, move |option: FilterOption| {
            Message::FilterChanged(key, option.slug)
        })
        .placeholder(placeholder)
        .text_size(13)
        .width(Length::Fill)
        .padding(Padding::new(8.0).left(12.0).right(12.0))
        .style(|_, _| pick_list::Style {
            text_color: TEXT_WHITE,
            placeholder_color: TEXT_GRAY,
            handle_color: TEXT_WHITE,
            background: iced::Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.1)),
            border: Border {
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                width: 1.0,
                radius: 6.0.into(),
            },
        });

        column![text(label).size(11).color(TEXT_GRAY).font(bold()), picker]
            .spacing(6)
            .width(Length::FillPortion(1))
            .into()
    }

    pub fn view_filter_bar(&self) -> Element<'_, Message> {
        let reset = button(text("Reset").size(13))
            .padding(Padding::new(8.0).left(16.0).right(16.0))
            .style(ghost_button_style)
            .on_press(Message::ResetFilters);

        container(
            row![
                self.view_filter_picker(FilterKey::Category, "CATEGORY"),
                self.view_filter_picker(FilterKey::Genre, "GENRE"),
                self.view_filter_picker(FilterKey::Country, "COUNTRY"),
                self.view_filter_picker(FilterKey::Year, "YEAR"),
                reset,
            ]
            .spacing(16)
            .align_y(iced::Alignment::End),
        )
        .padding(16)
        .width(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
            border: Border::default().rounded(10),
            ..Default::default()
        })
        .into()
    }

    pub fn view_pagination(&self, pagination: Pagination, page: u32) -> Element<'_, Message> {
        let step = |glyph: char, target: u32, enabled: bool| {
            let b = button(icon(glyph).size(13))
                .padding(Padding::new(8.0).left(12.0).right(12.0))
                .style(ghost_button_style);
            if enabled {
                b.on_press(Message::PageChanged(target))
            } else {
                b
            }
        };

        let numbers: Vec<Element<Message>> = pagination
            .window(page)
            .into_iter()
            .map(|n| {
                let b = button(text(n.to_string()).size(13))
                    .padding(Padding::new(8.0).left(14.0).right(14.0));
                if n == page {
                    b.style(accent_button_style).into()
                } else {
                    b.style(ghost_button_style)
                        .on_press(Message::PageChanged(n))
                        .into()
                }
            })
            .collect();

        let bar = row![
            step(
                ICON_CHEVRON_LEFT,
                page.saturating_sub(1),
                pagination.has_previous(page)
            ),
            Row::with_children(numbers).spacing(6),
            step(ICON_CHEVRON_RIGHT, page + 1, pagination.has_next(page)),
            text(format!("Page {} of {}", page, pagination.total_pages()))
                .size(12)
                .color(TEXT_GRAY),
        ]
        .spacing(10)
        .align_y(iced::Alignment::Center);

        container(bar).width(Length::Fill).center_x(Length::Fill).into()
    }
}
