use env_logger::{Builder, Env};
use iced::keyboard::{self, key::Named, Key};
use iced::widget::{column, container, scrollable, stack, text, Space};
use iced::{time, Element, Length, Subscription, Task, Theme};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod error;
mod media;
mod state;
mod ui;

use config::{ConfigSource, DisplaySettings, GalleryConfig};
use media::assets::AssetResolver;
use media::preview::{DocumentPreviews, PdfPreview, PreviewRenderer, PreviewRequest, PreviewResult};
use media::{launch, thumbnail};
use state::filter;
use state::gallery::{self, Activation, GalleryRenderer};
use state::library::Library;
use state::lightbox::{Dismissal, Lightbox};
use state::surface::Surface;

const ENV_LOG: &str = "FOLIO_LOG";
const ENV_LOG_STYLE: &str = "FOLIO_LOG_STYLE";

/// Frame clock for playing videos and animated GIFs
const TICK: Duration = Duration::from_millis(40);

const USAGE: &str = "\
Usage: folio [--gallery <path>]

Options:
  -g, --gallery <path>  Gallery JSON file (default: <config dir>/folio/gallery.json,
                        then the bundled gallery)
  -h, --help            Print this help
";

/// Main application state
struct Folio {
    title: String,
    library: Library,
    assets: AssetResolver,
    /// Owns the filter state
    renderer: GalleryRenderer,
    lightbox: Lightbox,
    surface: Surface,
    previews: Arc<dyn PreviewRenderer>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked a filter control
    FilterSelected(String),
    /// User clicked a card
    CardActivated(usize),
    /// Pointer entered (`true`) or left a card
    CardHovered(usize, bool),
    /// Background document preview finished
    PreviewRendered(PreviewResult),
    /// Background thumbnail pass finished, with the number written
    ThumbnailsReady(usize),
    LightboxDismissed(Dismissal),
    LightboxPlayToggled,
    LightboxMuteToggled,
    /// Playback clock
    Tick,
}

impl Folio {
    /// Create a new instance of the application
    fn new(gallery: Option<PathBuf>) -> (Self, Task<Message>) {
        let (library, settings, title) = load_library(gallery.as_deref());
        if library.is_empty() {
            log::warn!("The gallery has no items");
        }
        if !PdfPreview::available() {
            log::warn!("pdfium library not found; PDFs without a thumbnail show a fallback");
        }
        let mut app = Self::with_library(library, &settings, title, Arc::new(DocumentPreviews::default()));

        let jobs = app.assets.pending_thumbnails(app.library.items());
        let requests = app.renderer.render(&app.library, &app.assets, &mut app.surface);
        let mut tasks = vec![app.preview_tasks(requests)];
        if !jobs.is_empty() {
            log::info!("Generating {} thumbnails in the background", jobs.len());
            tasks.push(Task::perform(thumbnail::generate_all(jobs), Message::ThumbnailsReady));
        }

        log::info!("🎨 Folio initialized with {} items", app.library.len());
        (app, Task::batch(tasks))
    }

    fn with_library(
        library: Library,
        settings: &DisplaySettings,
        title: String,
        previews: Arc<dyn PreviewRenderer>,
    ) -> Self {
        Self {
            title,
            assets: AssetResolver::for_library(&library, settings),
            library,
            renderer: GalleryRenderer::new(),
            lightbox: Lightbox::new(),
            surface: Surface::mounted(settings.lightbox),
            previews,
        }
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FilterSelected(category) => {
                let requests =
                    self.renderer
                        .set_filter(&category, &self.library, &self.assets, &mut self.surface);
                self.preview_tasks(requests)
            }
            Message::CardActivated(index) => {
                match self.activate(index) {
                    Some(Activation::External(url)) => {
                        if let Err(err) = launch::open_external(&url) {
                            log::error!("{err}");
                        }
                    }
                    Some(Activation::Document(path)) => {
                        if let Err(err) = launch::open_external(&path) {
                            log::error!("{err}");
                        }
                    }
                    Some(Activation::Lightbox(_)) | None => {}
                }
                Task::none()
            }
            Message::CardHovered(index, entered) => {
                self.renderer.hover(&mut self.surface, index, entered);
                Task::none()
            }
            Message::PreviewRendered(result) => {
                self.renderer.apply_preview(&mut self.surface, result);
                Task::none()
            }
            Message::ThumbnailsReady(written) => {
                if written == 0 {
                    return Task::none();
                }
                let requests = self.renderer.render(&self.library, &self.assets, &mut self.surface);
                self.preview_tasks(requests)
            }
            Message::LightboxDismissed(reason) => {
                self.lightbox.close(&mut self.surface, reason);
                Task::none()
            }
            Message::LightboxPlayToggled => {
                self.lightbox.toggle_play(&mut self.surface);
                Task::none()
            }
            Message::LightboxMuteToggled => {
                self.lightbox.toggle_mute(&mut self.surface);
                Task::none()
            }
            Message::Tick => {
                self.renderer.tick(&mut self.surface, TICK);
                self.lightbox.tick(&mut self.surface, TICK);
                Task::none()
            }
        }
    }

    /// Apply the activation policy to a card.
    ///
    /// Lightbox activations are handled here; external ones are returned
    /// for the caller to launch.
    fn activate(&mut self, index: usize) -> Option<Activation> {
        let Some(item) = self.library.item(index) else {
            log::warn!("Activation for unknown item {index}");
            return None;
        };

        let activation = gallery::activation(index, item, &self.assets);
        if let Activation::Lightbox(index) = activation {
            let source = self.assets.full_source(item);
            self.lightbox.open(&mut self.surface, index, item, source);
        }
        Some(activation)
    }

    fn preview_tasks(&self, requests: Vec<PreviewRequest>) -> Task<Message> {
        Task::batch(requests.into_iter().map(|request| {
            Task::perform(
                media::preview::render(Arc::clone(&self.previews), request),
                Message::PreviewRendered,
            )
        }))
    }

    fn subscription(&self) -> Subscription<Message> {
        let escape = if self.lightbox.listens_for_escape() {
            keyboard::on_key_press(|key, _modifiers| match key {
                Key::Named(Named::Escape) => Some(Message::LightboxDismissed(Dismissal::Escape)),
                _ => None,
            })
        } else {
            Subscription::none()
        };

        let animating =
            self.renderer.needs_tick(&self.surface) || self.lightbox.needs_tick(&self.surface);
        let tick = if animating {
            time::every(TICK).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };

        Subscription::batch([escape, tick])
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let controls = filter::filter_controls(&self.library, self.renderer.filter());

        let grid = match self.surface.grid() {
            Some(grid) => ui::gallery::grid(grid),
            None => Space::new(Length::Fill, Length::Shrink).into(),
        };

        let base = column![
            text(&self.title).size(36),
            ui::gallery::filter_bar(controls),
            scrollable(container(grid).width(Length::Fill)).height(Length::Fill),
        ]
        .spacing(20)
        .padding(32);

        // The overlay layer swallows scrolling while it is up
        if !self.surface.scroll_locked() {
            return base.into();
        }
        match self.surface.overlay().and_then(ui::lightbox::overlay) {
            Some(layer) => stack![base, layer].into(),
            None => base.into(),
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Load the gallery, falling back to the bundled one when the configured
/// gallery has invalid items, and to an empty one as a last resort.
fn load_library(explicit: Option<&std::path::Path>) -> (Library, DisplaySettings, String) {
    let (config, source) = GalleryConfig::load_or_fallback(explicit);
    log::info!("Gallery source: {source:?}");

    let settings = config.settings();
    let title = config.title.clone();
    match Library::from_config(config) {
        Ok(library) => return (library, settings, title),
        Err(err) => log::error!("{err}"),
    }

    if source != ConfigSource::Bundled {
        if let Ok(config) = GalleryConfig::bundled() {
            let settings = config.settings();
            let title = config.title.clone();
            match Library::from_config(config) {
                Ok(library) => return (library, settings, title),
                Err(err) => log::error!("bundled gallery is unusable: {err}"),
            }
        }
    }

    (Library::default(), DisplaySettings::default(), "Portfolio".to_string())
}

fn main() -> iced::Result {
    // Setup logging from the env variables, with defaults.
    Builder::from_env(
        Env::new()
            .filter_or(ENV_LOG, "info")
            .write_style(ENV_LOG_STYLE),
    )
    .init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{USAGE}");
        return Ok(());
    }
    let gallery: Option<PathBuf> = match args.opt_value_from_str(["-g", "--gallery"]) {
        Ok(path) => path,
        Err(err) => {
            log::error!("{err}");
            None
        }
    };

    iced::application(Folio::title, Folio::update, Folio::view)
        .theme(Folio::theme)
        .subscription(Folio::subscription)
        .centered()
        .run_with(move || Folio::new(gallery))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::lightbox::LightboxState;

    fn app(json: &str, settings: DisplaySettings) -> Folio {
        let library = Library::from_config(GalleryConfig::from_json(json).unwrap()).unwrap();
        let mut app = Folio::with_library(
            library,
            &settings,
            "Test".to_string(),
            Arc::new(media::preview::RasterPreview::default()),
        );
        app.renderer.render(&app.library, &app.assets, &mut app.surface);
        app
    }

    const ITEMS: &str = r#"{ "items": [
        { "path": "a.png", "caption": "A", "type": "image", "category": "video" },
        { "path": "b.png", "caption": "B", "type": "image", "category": "game", "link": "https://x" },
        { "path": "c.pdf", "caption": "C", "type": "doc", "category": "research" },
        { "path": "d.png", "caption": "D", "type": "image", "category": "game" }
    ] }"#;

    #[test]
    fn test_linked_item_never_touches_lightbox() {
        let mut app = app(ITEMS, DisplaySettings::default());

        let activation = app.activate(1);
        assert_eq!(activation, Some(Activation::External("https://x".to_string())));
        assert_eq!(app.lightbox.state(), &LightboxState::Closed);

        app.activate(0);
        let before = app.lightbox.state().clone();
        app.activate(1);
        assert_eq!(app.lightbox.state(), &before);
    }

    #[test]
    fn test_document_opens_raw_asset() {
        let mut app = app(ITEMS, DisplaySettings::default());
        assert!(matches!(app.activate(2), Some(Activation::Document(_))));
        assert!(!app.lightbox.is_open());
    }

    #[test]
    fn test_open_replace_then_dismiss() {
        let mut app = app(ITEMS, DisplaySettings::default());

        app.activate(0);
        app.activate(3);
        assert!(matches!(app.lightbox.state(), LightboxState::Open { index: 3, .. }));
        assert!(app.lightbox.listens_for_escape());

        let _ = app.update(Message::LightboxDismissed(Dismissal::Escape));
        assert_eq!(app.lightbox.state(), &LightboxState::Closed);
        assert!(!app.lightbox.listens_for_escape());
        assert!(!app.surface.scroll_locked());
    }

    #[test]
    fn test_lightbox_disabled_is_noop() {
        let settings = DisplaySettings {
            lightbox: false,
            ..DisplaySettings::default()
        };
        let mut app = app(ITEMS, settings);

        assert_eq!(app.activate(0), Some(Activation::Lightbox(0)));
        assert!(!app.lightbox.is_open());
    }

    #[test]
    fn test_filter_message_rerenders() {
        let mut app = app(ITEMS, DisplaySettings::default());
        let _ = app.update(Message::FilterSelected("game".to_string()));

        let indices: Vec<_> = app.surface.grid().unwrap().cards().iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 3]);
        let active: Vec<_> = filter::filter_controls(&app.library, app.renderer.filter())
            .into_iter()
            .filter(|c| c.active)
            .map(|c| c.category)
            .collect();
        assert_eq!(active, vec!["game".to_string()]);
    }

    #[test]
    fn test_unknown_item_activation() {
        let mut app = app(ITEMS, DisplaySettings::default());
        assert_eq!(app.activate(99), None);
    }
}
