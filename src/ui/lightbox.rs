use iced::widget::image::Handle;
use iced::widget::{
    button, center, column, container, image, mouse_area, opaque, row, text, tooltip, Space,
};
use iced::{Color, ContentFit, Element, Length, Theme};

use crate::state::lightbox::Dismissal;
use crate::state::playback::{format_position, Playback};
use crate::state::surface::{LightboxMedia, Overlay};
use crate::Message;

/// Full-size overlay, or `None` while hidden.
///
/// The outer layer swallows all input so the gallery underneath neither
/// scrolls nor receives clicks. Clicks outside the frame dismiss.
pub fn overlay(overlay: &Overlay) -> Option<Element<'_, Message>> {
    if !overlay.visible {
        return None;
    }

    let close = button(text("✕").size(18))
        .on_press(Message::LightboxDismissed(Dismissal::CloseButton))
        .style(button::text);

    let media: Element<'_, Message> = match &overlay.media {
        Some(LightboxMedia::Picture { source, alt }) => with_alt(full_size(Handle::from_path(source)), alt),
        Some(LightboxMedia::Animated {
            source,
            alt,
            animation,
        }) => {
            let frame = animation
                .frame()
                .cloned()
                .unwrap_or_else(|| Handle::from_path(source));
            with_alt(full_size(frame), alt)
        }
        Some(LightboxMedia::Video { playback, .. }) => video(playback),
        None => Space::new(Length::Fill, Length::Fill).into(),
    };

    let frame = column![
        row![Space::with_width(Length::Fill), close],
        media,
        text(&overlay.caption).size(16),
    ]
    .spacing(12);

    let frame = container(frame)
        .padding(16)
        .max_width(1400.0)
        .max_height(900.0)
        .style(container::rounded_box);

    let backdrop = center(opaque(frame)).padding(40).style(|_theme: &Theme| container::Style {
        background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.85).into()),
        ..Default::default()
    });

    Some(opaque(
        mouse_area(backdrop).on_press(Message::LightboxDismissed(Dismissal::Backdrop)),
    ))
}

fn full_size<'a>(handle: Handle) -> Element<'a, Message> {
    image(handle)
        .width(Length::Fill)
        .height(Length::Fill)
        .content_fit(ContentFit::Contain)
        .into()
}

fn with_alt<'a>(content: Element<'a, Message>, alt: &'a str) -> Element<'a, Message> {
    tooltip(content, text(alt).size(13), tooltip::Position::Bottom)
        .gap(6)
        .style(container::rounded_box)
        .into()
}

fn video(playback: &Playback) -> Element<'_, Message> {
    let play_label = if playback.is_playing() { "Pause" } else { "Play" };
    let mute_label = if playback.muted { "Unmute" } else { "Mute" };

    let picture = match playback.frame() {
        Some(frame) => full_size(frame.clone()),
        None => text("▶").size(48).into(),
    };
    let screen = center(picture)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme: &Theme| container::Style {
            background: Some(Color::BLACK.into()),
            text_color: Some(Color::WHITE),
            ..Default::default()
        });

    let mut bar = row![].spacing(12);
    if playback.controls {
        bar = bar
            .push(button(text(play_label)).on_press(Message::LightboxPlayToggled))
            .push(button(text(mute_label)).on_press(Message::LightboxMuteToggled))
            .push(text(format_position(playback.position())));
    }

    column![screen, bar].spacing(8).into()
}
