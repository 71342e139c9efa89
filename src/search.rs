use iced::widget::{column, container, row, text};
use iced::{Element, Length, Padding};

use crate::components::{bold, icon};
use crate::filters::FilterState;
use crate::media::{Message, PageContent, ACCENT_RED, TEXT_GRAY, TEXT_WHITE};
use crate::Ophix;

const ICON_SEARCH: char = '\u{F52A}';

impl Ophix {
    pub fn view_search_page(&self) -> Element<'_, Message> {
        let keyword = self
            .route
            .query
            .get("keyword")
            .map(str::trim)
            .filter(|k| !k.is_empty());

        let Some(keyword) = keyword else {
            return container(
                text("Type a keyword in the search box to find movies.")
                    .size(16)
                    .color(TEXT_GRAY),
            )
            .width(Length::Fill)
            .padding(96)
            .center_x(Length::Fill)
            .into();
        };

        let heading = row![
            icon(ICON_SEARCH).size(26).color(ACCENT_RED),
            text("Results for ").size(28).color(TEXT_WHITE).font(bold()),
            text(format!("\"{}\"", keyword))
                .size(28)
                .color(ACCENT_RED)
                .font(bold())
                .shaping(text::Shaping::Advanced),
        ]
        .spacing(10)
        .align_y(iced::Alignment::Center);

        let results: Element<Message> = match &self.content {
            PageContent::Listing(outcome) => {
                let page = FilterState::from_query(&self.route.query).page;
                column![
                    text(format!("{} matching results", outcome.items.len()))
                        .size(14)
                        .color(TEXT_GRAY),
                    self.view_filter_bar(),
                    self.view_listing_results(
                        outcome,
                        page,
                        "No movies match this keyword and the current filters."
                    ),
                ]
                .spacing(24)
                .into()
            }
            _ => self.view_filter_bar(),
        };

        column![heading, results]
            .spacing(16)
            .padding(Padding::new(32.0))
            .width(Length::Fill)
            .into()
    }
}
