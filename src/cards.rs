use iced::widget::{button, column, container, row, scrollable, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{bold, hidden_scrollbar_style, icon};
use crate::media::{HomeSection, Message, MovieSummary, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE};
use crate::route::{ListingKind, Route};
use crate::Ophix;

const ICON_FILM: char = '\u{F3A9}';
const ICON_CHEVRON_RIGHT: char = '\u{F285}';

const CARD_WIDTH: f32 = 160.0;
const CARD_HEIGHT: f32 = 240.0;
const GRID_COLUMNS: usize = 6;

impl Ophix {
    pub fn view_home_section<'a>(&'a self, section: &'a HomeSection) -> Element<'a, Message> {
        let title = text(section.title.clone())
            .size(22)
            .color(TEXT_WHITE)
            .font(bold());

        let view_all = button(
            row![
                text("View all").size(13),
                icon(ICON_CHEVRON_RIGHT).size(11)
            ]
            .spacing(4)
            .align_y(iced::Alignment::Center),
        )
        .padding(4)
        .style(|_theme, status| button::Style {
            background: None,
            text_color: match status {
                button::Status::Hovered => TEXT_WHITE,
                _ => TEXT_GRAY,
            },
            border: Border::default(),
            shadow: Shadow::default(),
            snap: false,
        })
        .on_press(Message::Navigate(Route::listing(
            ListingKind::Category,
            section.list_slug.clone(),
        )));

        let cards: Vec<Element<Message>> = section
            .items
            .iter()
            .map(|movie| self.view_movie_card(movie, None))
            .collect();

        let scrollable_cards = scrollable(Row::with_children(cards).spacing(16))
            .direction(scrollable::Direction::Horizontal(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .width(Length::Fill)
            .style(hidden_scrollbar_style);

        column![
            row![title, Space::new().width(Length::Fill), view_all].align_y(iced::Alignment::Center),
            scrollable_cards
        ]
        .spacing(16)
        .width(Length::Fill)
        .into()
    }

    pub fn view_card_grid<'a>(&'a self, items: &'a [MovieSummary], response_cdn: Option<&str>) -> Element<'a, Message> {
        let rows: Vec<Element<Message>> = items
            .chunks(GRID_COLUMNS)
            .map(|chunk| {
                let cards: Vec<Element<Message>> = chunk
                    .iter()
                    .map(|movie| self.view_movie_card(movie, response_cdn))
                    .collect();
                Row::with_children(cards).spacing(16).into()
            })
            .collect();

        Column::with_children(rows)
            .spacing(24)
            .width(Length::Fill)
            .into()
    }

    pub fn view_movie_card<'a>(&'a self, movie: &'a MovieSummary, response_cdn: Option<&str>) -> Element<'a, Message> {
        let poster = self.view_card_poster(movie, response_cdn);

        let badge: Element<Message> = if movie.episode_current.is_empty() {
            Space::new().width(0).into()
        } else {
            container(text(movie.episode_current.clone()).size(11).color(TEXT_WHITE))
                .padding(Padding::new(2.0).left(6.0).right(6.0))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.75))),
                    border: Border::default().rounded(4),
                    ..Default::default()
                })
                .into()
        };

        let poster_with_badge = iced::widget::stack![
            poster,
            container(badge)
                .width(Length::Fill)
                .padding(6)
                .align_x(iced::alignment::Horizontal::Right)
        ];

        let subtitle = match movie.year {
            Some(year) => format!("{} · {}", year, movie.origin_name),
            None => movie.origin_name.clone(),
        };

        let content = column![
            poster_with_badge,
            text(movie.name.clone())
                .size(14)
                .color(TEXT_WHITE)
                .shaping(text::Shaping::Advanced),
            text(subtitle)
                .size(12)
                .color(TEXT_GRAY)
                .shaping(text::Shaping::Advanced),
        ]
        .spacing(6)
        .width(Length::Fixed(CARD_WIDTH));

        button(content)
            .padding(0)
            .style(|_theme, _status| button::Style {
                background: None,
                text_color: TEXT_WHITE,
                border: Border::default(),
                shadow: Shadow::default(),
                snap: false,
            })
            .on_press(Message::Navigate(Route::detail(movie.slug.clone())))
            .into()
    }

    fn view_card_poster(&self, movie: &MovieSummary, response_cdn: Option<&str>) -> Element<'_, Message> {
        let url = self.card_url(movie, response_cdn);
        let Some(handle) = self.image_cache.get(&url) else {
            return container(icon(ICON_FILM).size(32).color(TEXT_GRAY))
                .width(Length::Fixed(CARD_WIDTH))
                .height(Length::Fixed(CARD_HEIGHT))
                .center_x(Length::Fixed(CARD_WIDTH))
                .center_y(Length::Fixed(CARD_HEIGHT))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                    border: Border::default().rounded(8),
                    ..Default::default()
                })
                .into();
        };

        iced::widget::image(handle.clone())
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(CARD_HEIGHT))
            .content_fit(iced::ContentFit::Cover)
            .border_radius(8.0)
            .into()
    }
}
