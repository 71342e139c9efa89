use iced::widget::{column, row, text, Space};
use iced::{Element, Length, Padding};

use crate::components::bold;
use crate::filters::{category_label, FilterState};
use crate::media::{Message, TEXT_GRAY, TEXT_WHITE};
use crate::pipeline::ListingOutcome;
use crate::reference::ReferenceData;
use crate::Ophix;

pub const DEFAULT_TITLE: &str = "Movie list";

pub fn compose_title(filters: &FilterState, reference: Option<&ReferenceData>, title_page: Option<&str>) -> String {
    let fallback = || {
        title_page
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string()
    };
    if !filters.is_filtered() {
        return fallback();
    }

    let mut parts: Vec<String> = Vec::new();
    if let Some(name) = filters.category.as_deref().and_then(category_label) {
        parts.push(name.to_string());
    }
    if let Some(name) = filters
        .genre
        .as_deref()
        .and_then(|slug| reference.and_then(|r| r.genre_name(slug)))
    {
        parts.push(name.to_string());
    }
    if let Some(name) = filters
        .country
        .as_deref()
        .and_then(|slug| reference.and_then(|r| r.country_name(slug)))
    {
        parts.push(name.to_string());
    }
    if let Some(year) = &filters.year {
        parts.push(format!("Year {}", year));
    }

    if parts.is_empty() {
        fallback()
    } else {
        parts.join(" - ")
    }
}

impl Ophix {
    pub fn view_listing_page<'a>(&'a self, outcome: &'a ListingOutcome) -> Element<'a, Message> {
        let filters = FilterState::from_query(&self.route.query);
        let title = compose_title(&filters, self.reference.data(), outcome.title_page.as_deref());

        column![
            row![
                text(title)
                    .size(30)
                    .color(TEXT_WHITE)
                    .font(bold())
                    .shaping(text::Shaping::Advanced),
                Space::new().width(Length::Fill),
                text(format!("{} of {} on this page", outcome.items.len(), outcome.fetched))
                    .size(13)
                    .color(TEXT_GRAY),
            ]
            .align_y(iced::Alignment::Center),
            self.view_filter_bar(),
            self.view_listing_results(outcome, filters.page, "No movies match these filters."),
        ]
        .spacing(28)
        .padding(Padding::new(32.0))
        .width(Length::Fill)
        .into()
    }

    pub fn view_listing_results<'a>(
        &'a self,
        outcome: &'a ListingOutcome,
        page: u32,
        empty_message: &'a str,
    ) -> Element<'a, Message> {
        if outcome.items.is_empty() {
            return self.view_empty_state(empty_message);
        }

        let grid = self.view_card_grid(&outcome.items, outcome.cdn_domain.as_deref());
        match outcome.pagination.filter(|p| p.spans_pages()) {
            Some(pagination) => column![grid, self.view_pagination(pagination, page)]
                .spacing(32)
                .into(),
            None => grid,
        }
    }
}
