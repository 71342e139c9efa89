use iced::widget::{button, column, container, row, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding};

use crate::components::{accent_button_style, bold, ghost_button_style, icon};
use crate::media::{
    plain_text, DetailBundle, EpisodeServer, Message, MovieDetail, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::route::{ListingKind, Route};
use crate::Ophix;

const BACKDROP_HEIGHT: f32 = 420.0;
const POSTER_WIDTH: f32 = 240.0;
const POSTER_HEIGHT: f32 = 360.0;
const EPISODES_PER_ROW: usize = 10;

const ICON_PLAY_FILL: char = '\u{F4F4}';
const ICON_STAR_FILL: char = '\u{F586}';
const ICON_FILM: char = '\u{F3A9}';

fn section_title(label: &str) -> iced::widget::Text<'_> {
    text(label).size(22).color(TEXT_WHITE).font(bold())
}

fn fact<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    row![
        text(label).size(14).color(TEXT_GRAY).width(Length::Fixed(96.0)),
        text(value)
            .size(14)
            .color(TEXT_WHITE)
            .shaping(text::Shaping::Advanced)
    ]
    .spacing(8)
    .into()
}

impl Ophix {
    pub fn view_detail_page<'a>(&'a self, bundle: &'a DetailBundle) -> Element<'a, Message> {
        let movie = &bundle.movie;
        let cdn = self.client.cdn();

        let backdrop: Element<Message> = match self.image_cache.get(&bundle.backdrop_url(cdn)) {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fixed(BACKDROP_HEIGHT))
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => Space::new().width(Length::Fill).height(BACKDROP_HEIGHT).into(),
        };
        let backdrop = iced::widget::stack![
            container(backdrop).style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            }),
            container(Space::new().width(Length::Fill).height(Length::Fill)).style(|_theme| {
                container::Style {
                    background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                        iced::gradient::Linear::new(std::f32::consts::PI)
                            .add_stop(0.0, Color::TRANSPARENT)
                            .add_stop(1.0, Color::from_rgba(0.035, 0.035, 0.043, 1.0)),
                    ))),
                    ..Default::default()
                }
            })
        ]
        .width(Length::Fill)
        .height(Length::Fixed(BACKDROP_HEIGHT));

        let poster: Element<Message> = match self.image_cache.get(&bundle.poster_url(cdn)) {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fixed(POSTER_WIDTH))
                .height(Length::Fixed(POSTER_HEIGHT))
                .content_fit(iced::ContentFit::Cover)
                .border_radius(12.0)
                .into(),
            None => container(icon(ICON_FILM).size(40).color(TEXT_GRAY))
                .width(Length::Fixed(POSTER_WIDTH))
                .height(Length::Fixed(POSTER_HEIGHT))
                .center_x(Length::Fixed(POSTER_WIDTH))
                .center_y(Length::Fixed(POSTER_HEIGHT))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                    border: Border::default().rounded(12),
                    ..Default::default()
                })
                .into(),
        };

        let watch_button = button(
            row![
                icon(ICON_PLAY_FILL).size(16),
                text("Watch now").size(16).font(bold())
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        )
        .width(Length::Fixed(POSTER_WIDTH))
        .padding(14)
        .style(accent_button_style)
        .on_press(Message::Navigate(Route::watch(movie.summary.slug.clone(), None)));

        let overview = row![
            column![poster, watch_button].spacing(16),
            self.view_detail_info(movie)
        ]
        .spacing(40);

        let mut page = column![
            overview,
            self.view_episode_servers(movie),
        ]
        .spacing(40)
        .padding(Padding::new(32.0).top(0.0));

        if !bundle.related.is_empty() {
            page = page.push(
                column![
                    section_title("Related movies"),
                    self.view_card_grid(&bundle.related, None)
                ]
                .spacing(20),
            );
        }

        column![backdrop, page].width(Length::Fill).into()
    }

    fn view_detail_info<'a>(&'a self, movie: &'a MovieDetail) -> Element<'a, Message> {
        let summary = &movie.summary;
        let title = text(summary.name.clone())
            .size(38)
            .color(TEXT_WHITE)
            .font(bold())
            .shaping(text::Shaping::Advanced);
        let origin = text(summary.origin_name.clone())
            .size(18)
            .color(TEXT_GRAY)
            .shaping(text::Shaping::Advanced);

        let mut badges: Vec<Element<Message>> = Vec::new();
        if let Some(rating) = movie.rating() {
            badges.push(
                row![
                    icon(ICON_STAR_FILL).size(13).color(Color::from_rgb(0.98, 0.75, 0.14)),
                    text(format!("{:.1}", rating)).size(14).color(TEXT_WHITE)
                ]
                .spacing(6)
                .align_y(iced::Alignment::Center)
                .into(),
            );
        }
        for value in [
            summary.year.map(|y| y.to_string()).unwrap_or_default(),
            summary.episode_current.clone(),
            movie.quality.clone(),
            movie.lang.clone(),
            movie.time.clone(),
        ] {
            if !value.is_empty() {
                badges.push(
                    container(text(value).size(13).color(TEXT_WHITE).shaping(text::Shaping::Advanced))
                        .padding(Padding::new(4.0).left(10.0).right(10.0))
                        .style(|_theme| container::Style {
                            background: Some(iced::Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.1))),
                            border: Border::default().rounded(6),
                            ..Default::default()
                        })
                        .into(),
                );
            }
        }

        let genres: Vec<Element<Message>> = summary
            .categories
            .iter()
            .map(|genre| {
                button(text(genre.name.clone()).size(13).shaping(text::Shaping::Advanced))
                    .padding(Padding::new(4.0).left(10.0).right(10.0))
                    .style(ghost_button_style)
                    .on_press(Message::Navigate(Route::listing(ListingKind::Genre, genre.slug.clone())))
                    .into()
            })
            .collect();

        let countries = summary
            .countries
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let directors = MovieDetail::credits(&movie.director).join(", ");
        let actors = MovieDetail::credits(&movie.actor).join(", ");
        let or_pending = |value: String| {
            if value.is_empty() {
                String::from("Updating")
            } else {
                value
            }
        };

        let synopsis = plain_text(&movie.content);
        let synopsis = if synopsis.is_empty() {
            String::from("No synopsis yet.")
        } else {
            synopsis
        };

        column![
            title,
            origin,
            Row::with_children(badges)
                .spacing(8)
                .align_y(iced::Alignment::Center),
            text(synopsis)
                .size(15)
                .color(TEXT_GRAY)
                .shaping(text::Shaping::Advanced),
            Row::with_children(genres).spacing(8),
            fact("Country", or_pending(countries)),
            fact("Director", or_pending(directors)),
            fact("Cast", or_pending(actors)),
        ]
        .spacing(16)
        .width(Length::Fill)
        .into()
    }

    fn view_episode_servers<'a>(&'a self, movie: &'a MovieDetail) -> Element<'a, Message> {
        let servers: Vec<Element<Message>> = movie
            .episodes
            .iter()
            .filter(|server| !server.server_data.is_empty())
            .map(|server| self.view_episode_server(&movie.summary.slug, server, None))
            .collect();

        if servers.is_empty() {
            return Space::new().height(0).into();
        }

        column![section_title("Episodes"), Column::with_children(servers).spacing(24)]
            .spacing(16)
            .into()
    }

    pub fn view_episode_server<'a>(
        &'a self,
        slug: &str,
        server: &'a EpisodeServer,
        current: Option<&str>,
    ) -> Element<'a, Message> {
        let rows: Vec<Element<Message>> = server
            .server_data
            .chunks(EPISODES_PER_ROW)
            .map(|chunk| {
                let buttons: Vec<Element<Message>> = chunk
                    .iter()
                    .map(|episode| {
                        let label = text(episode.name.clone())
                            .size(13)
                            .shaping(text::Shaping::Advanced);
                        let b = button(label)
                            .width(Length::Fixed(88.0))
                            .padding(8);
                        if current == Some(episode.slug.as_str()) {
                            b.style(accent_button_style).into()
                        } else {
                            b.style(ghost_button_style)
                                .on_press(Message::Navigate(Route::watch(
                                    slug.to_string(),
                                    Some(episode.slug.clone()),
                                )))
                                .into()
                        }
                    })
                    .collect();
                Row::with_children(buttons).spacing(8).into()
            })
            .collect();

        column![
            text(server.server_name.clone())
                .size(14)
                .color(TEXT_GRAY)
                .font(bold())
                .shaping(text::Shaping::Advanced),
            Column::with_children(rows).spacing(8)
        ]
        .spacing(10)
        .into()
    }
}
