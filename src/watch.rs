use iced::widget::{button, column, container, row, text, Space};
use iced::{Border, Color, Element, Length, Padding};

use crate::components::{accent_button_style, bold, ghost_button_style, icon};
use crate::media::{plain_text, truncate_description, Message, WatchData, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE};
use crate::route::Route;
use crate::Ophix;

const ICON_PLAY_FILL: char = '\u{F4F4}';
const ICON_CHEVRON_LEFT: char = '\u{F284}';
const ICON_FILM: char = '\u{F3A9}';
const SYNOPSIS_CHARS: usize = 600;

impl Ophix {
    pub fn view_watch_page<'a>(&'a self, data: &'a WatchData) -> Element<'a, Message> {
        let movie = &data.movie;
        let episode = &data.episode;

        let thumb: Element<Message> = match self
            .image_cache
            .get(&self.card_url(&movie.summary, data.cdn_domain.as_deref()))
        {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fixed(180.0))
                .height(Length::Fixed(270.0))
                .content_fit(iced::ContentFit::Cover)
                .border_radius(10.0)
                .into(),
            None => container(icon(ICON_FILM).size(32).color(TEXT_GRAY))
                .width(Length::Fixed(180.0))
                .height(Length::Fixed(270.0))
                .center_x(Length::Fixed(180.0))
                .center_y(Length::Fixed(270.0))
                .into(),
        };

        let open_player = button(
            row![
                icon(ICON_PLAY_FILL).size(18),
                text("Open player").size(16).font(bold())
            ]
            .spacing(10)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(14.0).left(28.0).right(28.0))
        .style(accent_button_style);
        let open_player = if episode.link_embed.is_empty() {
            open_player
        } else {
            open_player.on_press(Message::OpenPlayer(episode.link_embed.clone()))
        };

        let stream_link = if episode.link_m3u8.is_empty() {
            &episode.link_embed
        } else {
            &episode.link_m3u8
        };

        let player_panel = container(
            row![
                thumb,
                column![
                    text(format!("{} - Episode {}", movie.summary.name, episode.name))
                        .size(28)
                        .color(TEXT_WHITE)
                        .font(bold())
                        .shaping(text::Shaping::Advanced),
                    text(match movie.summary.year {
                        Some(year) => format!("{}  •  {}", movie.summary.origin_name, year),
                        None => movie.summary.origin_name.clone(),
                    })
                    .size(15)
                    .color(TEXT_GRAY)
                    .shaping(text::Shaping::Advanced),
                    open_player,
                    text(stream_link.clone()).size(12).color(TEXT_GRAY),
                ]
                .spacing(16)
            ]
            .spacing(32),
        )
        .padding(32)
        .width(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(Color::BLACK)),
            border: Border::default().rounded(12),
            ..Default::default()
        });

        let back_to_detail = button(
            row![icon(ICON_CHEVRON_LEFT).size(14), text("Back to details").size(14)]
                .spacing(6)
                .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(8.0).left(16.0).right(16.0))
        .style(ghost_button_style)
        .on_press(Message::Navigate(Route::detail(movie.summary.slug.clone())));

        let episodes: Element<Message> = match movie.episodes.first() {
            Some(server) if !server.server_data.is_empty() => {
                self.view_episode_server(&movie.summary.slug, server, Some(episode.slug.as_str()))
            }
            _ => Space::new().height(0).into(),
        };

        let synopsis = plain_text(&movie.content);
        let synopsis = if synopsis.is_empty() {
            String::from("No synopsis yet.")
        } else {
            truncate_description(&synopsis, SYNOPSIS_CHARS)
        };

        column![
            player_panel,
            row![
                text("Episodes").size(22).color(TEXT_WHITE).font(bold()),
                Space::new().width(Length::Fill),
                back_to_detail
            ]
            .align_y(iced::Alignment::Center),
            episodes,
            container(
                text(synopsis)
                    .size(14)
                    .color(TEXT_GRAY)
                    .shaping(text::Shaping::Advanced)
            )
            .padding(20)
            .width(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                border: Border::default().rounded(10),
                ..Default::default()
            }),
        ]
        .spacing(24)
        .padding(Padding::new(32.0))
        .width(Length::Fill)
        .into()
    }
}
