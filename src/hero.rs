use iced::widget::{button, column, container, row, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{accent_button_style, bold, ghost_button_style, icon};
use crate::media::{HomeFeed, Message, MovieSummary, ACCENT_RED, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE};
use crate::route::Route;
use crate::Ophix;

const HERO_HEIGHT: f32 = 560.0;
const ICON_PLAY_FILL: char = '\u{F4F4}';
const ICON_INFO_CIRCLE: char = '\u{F431}';
const ICON_CHEVRON_LEFT: char = '\u{F284}';
const ICON_CHEVRON_RIGHT: char = '\u{F285}';

impl Ophix {
    pub fn view_home_page<'a>(&'a self, feed: &'a HomeFeed) -> Element<'a, Message> {
        let sections: Vec<Element<Message>> = feed
            .sections
            .iter()
            .map(|section| self.view_home_section(section))
            .collect();

        column![
            self.view_hero_section(feed),
            container(
                column![
                    self.view_filter_bar(),
                    Column::with_children(sections).spacing(40)
                ]
                .spacing(40)
            )
            .padding(Padding::new(32.0).top(0.0))
        ]
        .spacing(32)
        .width(Length::Fill)
        .into()
    }

    fn view_hero_section(&self, feed: &HomeFeed) -> Element<'_, Message> {
        match feed.hero.get(self.hero_index) {
            Some(movie) => self.view_hero_with_content(feed, movie),
            None => container(text("No featured movies right now").size(22).color(TEXT_GRAY))
                .width(Length::Fill)
                .height(Length::Fixed(HERO_HEIGHT))
                .center_x(Length::Fill)
                .center_y(Length::Fixed(HERO_HEIGHT))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                    ..Default::default()
                })
                .into(),
        }
    }

    fn view_hero_with_content(&self, feed: &HomeFeed, movie: &MovieSummary) -> Element<'_, Message> {
        let title = text(movie.name.clone())
            .size(44)
            .color(TEXT_WHITE)
            .font(bold())
            .shaping(text::Shaping::Advanced);

        let mut metadata = vec![movie.origin_name.clone()];
        if let Some(year) = movie.year {
            metadata.push(year.to_string());
        }
        if !movie.episode_current.is_empty() {
            metadata.push(movie.episode_current.clone());
        }
        let metadata = text(metadata.join("  •  "))
            .size(15)
            .color(TEXT_GRAY)
            .shaping(text::Shaping::Advanced);

        let genres = text(
            movie
                .categories
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
        .size(13)
        .color(TEXT_GRAY)
        .shaping(text::Shaping::Advanced);

        let watch_button = button(
            row![
                icon(ICON_PLAY_FILL).size(16).color(TEXT_WHITE),
                text("Watch").size(16).color(TEXT_WHITE)
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(12.0).left(24.0).right(24.0))
        .style(accent_button_style)
        .on_press(Message::Navigate(Route::watch(movie.slug.clone(), None)));

        let info_button = button(
            row![
                icon(ICON_INFO_CIRCLE).size(16),
                text("Details").size(16)
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(12.0).left(24.0).right(24.0))
        .style(ghost_button_style)
        .on_press(Message::Navigate(Route::detail(movie.slug.clone())));

        let hero_text_content = column![
            title,
            metadata,
            genres,
            row![watch_button, info_button].spacing(12),
            self.view_hero_controls(feed.hero.len())
        ]
        .spacing(18)
        .max_width(640.0)
        .padding(Padding::new(64.0));

        let hero_left_gradient = container(hero_text_content)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_y(iced::alignment::Vertical::Bottom)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(0.0)
                        .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.99))
                        .add_stop(0.3, Color::from_rgba(0.0, 0.0, 0.0, 0.85))
                        .add_stop(0.6, Color::from_rgba(0.0, 0.0, 0.0, 0.35))
                        .add_stop(0.9, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });

        iced::widget::stack![
            self.view_hero_backdrop(movie, feed.cdn_domain.as_deref()),
            hero_left_gradient
        ]
        .width(Length::Fill)
        .height(Length::Fixed(HERO_HEIGHT))
        .into()
    }

    fn view_hero_controls(&self, count: usize) -> Element<'_, Message> {
        if count < 2 {
            return Space::new().height(0).into();
        }

        let dots: Vec<Element<Message>> = (0..count)
            .map(|index| {
                let active = index == self.hero_index;
                container(Space::new().width(if active { 24.0 } else { 8.0 }).height(4.0))
                    .style(move |_theme| container::Style {
                        background: Some(iced::Background::Color(if active {
                            ACCENT_RED
                        } else {
                            Color::from_rgba(1.0, 1.0, 1.0, 0.4)
                        })),
                        border: Border::default().rounded(2),
                        ..Default::default()
                    })
                    .into()
            })
            .collect();

        let arrow = |glyph: char, message: Message| {
            button(icon(glyph).size(14).color(TEXT_WHITE))
                .padding(8)
                .style(|_theme, status| button::Style {
                    background: Some(iced::Background::Color(Color::from_rgba(
                        0.0,
                        0.0,
                        0.0,
                        if matches!(status, button::Status::Hovered) { 0.9 } else { 0.6 },
                    ))),
                    text_color: TEXT_WHITE,
                    border: Border::default().rounded(16),
                    shadow: Shadow::default(),
                    snap: false,
                })
                .on_press(message)
        };

        row![
            arrow(ICON_CHEVRON_LEFT, Message::HeroPrevious),
            Row::with_children(dots)
                .spacing(6)
                .align_y(iced::Alignment::Center),
            arrow(ICON_CHEVRON_RIGHT, Message::HeroNext),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center)
        .into()
    }

    fn view_hero_backdrop(&self, movie: &MovieSummary, response_cdn: Option<&str>) -> Element<'_, Message> {
        let url = self.hero_backdrop_url(movie, response_cdn);
        let Some(handle) = self.image_cache.get(&url) else {
            return container(Space::new().width(Length::Fill).height(Length::Fill))
                .width(Length::Fill)
                .height(Length::Fixed(HERO_HEIGHT))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                    ..Default::default()
                })
                .into();
        };
        iced::widget::image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(HERO_HEIGHT))
            .content_fit(iced::ContentFit::Cover)
            .into()
    }
}
