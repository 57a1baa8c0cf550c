//! Filter bar and card grid views
//!
//! Pure functions of the surface: nothing here mutates state.

use iced::widget::image::Handle;
use iced::widget::{
    button, center, column, container, image, mouse_area, row, stack, text, tooltip, Row, Space,
};
use iced::{mouse, Color, ContentFit, Element, Length, Theme};
use iced_aw::Wrap;

use crate::state::filter::FilterControl;
use crate::state::surface::{Card, CardGrid, DocumentPreview, Presentation};
use crate::Message;

const CARD_WIDTH: f32 = 280.0;
const MEDIA_HEIGHT: f32 = 200.0;

/// One button per filter control, active one highlighted
pub fn filter_bar<'a>(controls: Vec<FilterControl>) -> Element<'a, Message> {
    Row::with_children(controls.into_iter().map(filter_button))
        .spacing(8)
        .into()
}

fn filter_button<'a>(control: FilterControl) -> Element<'a, Message> {
    let style: fn(&Theme, button::Status) -> button::Style = if control.active {
        button::primary
    } else {
        button::secondary
    };

    let label = if control.icon.is_empty() {
        format!("{} ({})", control.label, control.count)
    } else {
        format!("{} {} ({})", control.icon, control.label, control.count)
    };

    button(text(label).size(14))
        .on_press(Message::FilterSelected(control.category))
        .padding([6, 14])
        .style(style)
        .into()
}

/// The card grid slot
pub fn grid(grid: &CardGrid) -> Element<'_, Message> {
    match grid {
        CardGrid::Blank => Space::new(Length::Fill, Length::Shrink).into(),
        CardGrid::Placeholder => container(text("No matching work").size(18))
            .padding(40)
            .center_x(Length::Fill)
            .into(),
        CardGrid::Cards(cards) => Wrap::with_elements(cards.iter().map(card).collect())
            .spacing(16.0)
            .line_spacing(16.0)
            .into(),
    }
}

fn card(card: &Card) -> Element<'_, Message> {
    let mut caption = row![text(&card.caption).size(14).width(Length::Fill)].spacing(6);
    if card.external_link {
        caption = caption.push(text("↗").size(14));
    }

    let mut body = column![].spacing(8).width(Length::Fixed(CARD_WIDTH));
    if let Some(badge) = card.badge {
        body = body.push(text(badge.label()).size(12));
    }
    let media = tooltip(media(card), text(&card.alt).size(12), tooltip::Position::Bottom)
        .gap(4)
        .style(container::rounded_box);
    let body = body.push(media).push(caption);

    mouse_area(container(body).padding(8).style(container::rounded_box))
        .on_press(Message::CardActivated(card.index))
        .on_enter(Message::CardHovered(card.index, true))
        .on_exit(Message::CardHovered(card.index, false))
        .interaction(mouse::Interaction::Pointer)
        .into()
}

fn media(card: &Card) -> Element<'_, Message> {
    match &card.presentation {
        Presentation::Still { source } => picture(Handle::from_path(source)),
        Presentation::Animated { source, animation } => match animation.frame() {
            Some(frame) => picture(frame.clone()),
            None => picture(Handle::from_path(source)),
        },
        Presentation::Video { playback, .. } => {
            let screen = match playback.frame() {
                Some(frame) => picture(frame.clone()),
                None => placeholder(String::new()),
            };
            if playback.is_playing() {
                screen
            } else {
                let play = center(text("▶").size(32))
                    .width(Length::Fill)
                    .height(Length::Fixed(MEDIA_HEIGHT));
                stack![screen, play].into()
            }
        }
        Presentation::Document(DocumentPreview::Thumbnail(source)) => picture(Handle::from_path(source)),
        Presentation::Document(DocumentPreview::Ready(handle)) => picture(handle.clone()),
        Presentation::Document(DocumentPreview::Loading) => placeholder("Loading preview…".to_string()),
        Presentation::Document(DocumentPreview::Unavailable) => {
            placeholder("Preview unavailable".to_string())
        }
    }
}

fn picture<'a>(handle: Handle) -> Element<'a, Message> {
    image(handle)
        .width(Length::Fill)
        .height(Length::Fixed(MEDIA_HEIGHT))
        .content_fit(ContentFit::Cover)
        .into()
}

fn placeholder<'a>(label: String) -> Element<'a, Message> {
    center(text(label).size(14))
        .width(Length::Fill)
        .height(Length::Fixed(MEDIA_HEIGHT))
        .style(|_theme: &Theme| container::Style {
            background: Some(Color::from_rgb(0.12, 0.12, 0.14).into()),
            text_color: Some(Color::from_rgb(0.7, 0.7, 0.75)),
            ..Default::default()
        })
        .into()
}
