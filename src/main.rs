use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, progress_bar, row, scrollable, text, Column, Space};
use iced::{Alignment, Color, Element, Length, Subscription, Task, Theme};
use rfd::AsyncFileDialog;
use std::path::PathBuf;
use std::time::Duration;

mod analysis;
mod config;
mod state;

use analysis::{AnalysisError, AnalysisResult, MealAnalyzer};
use state::ui::{DisplayImage, StatusTone, UiState};

/// Main application state
struct OraApp {
    /// Shared workflow runner (cloned into each background task)
    analyzer: MealAnalyzer,
    /// Everything the screen shows
    state: UiState,
    /// Last remote image fetched, keyed by its URL
    remote_image: Option<(String, Handle)>,
    /// Loading bar position while analysing
    progress: f32,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked one of the photo buttons
    PickImage,
    /// Picker closed, with or without a file
    ImagePicked(Option<PathBuf>),
    /// User clicked "analyse"
    Analyze,
    /// Background analysis completed
    AnalysisFinished(Result<AnalysisResult, AnalysisError>),
    /// A remote display image finished downloading
    DisplayImageLoaded(String, Result<Vec<u8>, AnalysisError>),
    /// Animation tick for the loading bar
    Tick,
}

impl OraApp {
    fn new(analyzer: MealAnalyzer) -> (Self, Task<Message>) {
        let placeholder = match analysis::generation::placeholder_url(&analyzer.config().image_url) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("⚠️  No placeholder image: {}", e);
                String::new()
            }
        };

        let app = OraApp {
            analyzer,
            state: UiState::new(placeholder),
            remote_image: None,
            progress: 0.0,
        };
        let task = app.load_display_image();

        log::info!("🥗 Ora AI ready");
        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => {
                if !self.state.can_pick() {
                    return Task::none();
                }

                Task::perform(
                    async {
                        AsyncFileDialog::new()
                            .set_title("Choose a meal photo")
                            .add_filter("Images", analysis::request::PICKABLE_EXTENSIONS)
                            .pick_file()
                            .await
                            .map(|handle| handle.path().to_path_buf())
                    },
                    Message::ImagePicked,
                )
            }
            Message::ImagePicked(Some(path)) => {
                let label = path.display().to_string();
                if self.state.file_selected(path) {
                    log::info!("📷 Picked {}", label);
                } else if let Some(current) = self.state.selected_image() {
                    log::warn!("⚠️  Ignoring {} while {} is being analysed", label, current.display());
                }
                Task::none()
            }
            Message::ImagePicked(None) => Task::none(),
            Message::Analyze => {
                let Some(path) = self.state.begin_analysis() else {
                    return Task::none();
                };
                self.progress = 0.0;

                let analyzer = self.analyzer.clone();
                Task::perform(
                    async move { analyzer.analyze(&path).await },
                    Message::AnalysisFinished,
                )
            }
            Message::AnalysisFinished(result) => {
                match &result {
                    Ok(analysis) => log::info!("🎨 Image prompt seed: {}", analysis.image_prompt_seed),
                    Err(e) => log::warn!("⚠️  Analysis failed ({:?}): {}", e.kind(), e),
                }
                self.state.finish_analysis(&result);
                self.load_display_image()
            }
            Message::DisplayImageLoaded(url, result) => {
                // Ignore fetches the display has already moved past
                if self.state.display_image() != &DisplayImage::Remote(url.clone()) {
                    return Task::none();
                }

                match result {
                    Ok(bytes) => {
                        log::debug!("🖼️  Loaded {:.1}KB from {}", bytes.len() as f64 / 1024.0, url);
                        self.remote_image = Some((url, Handle::from_bytes(bytes)));
                    }
                    Err(e) => log::warn!("⚠️  Could not load image {}: {}", url, e),
                }
                Task::none()
            }
            Message::Tick => {
                self.progress = (self.progress + 0.02) % 1.0;
                Task::none()
            }
        }
    }

    /// Start fetching the display image if it is remote and not loaded yet
    fn load_display_image(&self) -> Task<Message> {
        let DisplayImage::Remote(url) = self.state.display_image() else {
            return Task::none();
        };
        if url.is_empty() || self.remote_image.as_ref().is_some_and(|(loaded, _)| loaded == url) {
            return Task::none();
        }

        let analyzer = self.analyzer.clone();
        let url = url.clone();
        let tag = url.clone();
        Task::perform(
            async move { analyzer.fetch_image(&url).await },
            move |result| Message::DisplayImageLoaded(tag.clone(), result),
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let picture: Element<'_, Message> = match self.state.display_image() {
            DisplayImage::Local(path) => image(Handle::from_path(path))
                .width(Length::Fixed(300.0))
                .height(Length::Fixed(300.0))
                .into(),
            DisplayImage::Remote(url) => match &self.remote_image {
                Some((loaded, handle)) if loaded == url => image(handle.clone())
                    .width(Length::Fixed(300.0))
                    .height(Length::Fixed(300.0))
                    .into(),
                _ => container(text("…").size(32))
                    .width(Length::Fixed(300.0))
                    .height(Length::Fixed(300.0))
                    .center_x(Length::Fixed(300.0))
                    .center_y(Length::Fixed(300.0))
                    .into(),
            },
        };

        let pick_message = self.state.can_pick().then_some(Message::PickImage);
        let pickers = row![
            button("ألبوم الصور").on_press_maybe(pick_message.clone()).padding(10),
            button("تصوير").on_press_maybe(pick_message).padding(10),
        ]
        .spacing(20);

        let analyze = button(text("تحليل السعرات 🔍").size(18))
            .on_press_maybe(self.state.can_analyze().then_some(Message::Analyze))
            .padding(12);

        let loading: Element<'_, Message> = if self.state.is_analyzing() {
            progress_bar(0.0..=1.0, self.progress)
                .width(Length::Fixed(200.0))
                .into()
        } else {
            Space::with_height(Length::Fixed(10.0)).into()
        };

        let status_color = match self.state.status_tone() {
            StatusTone::Info | StatusTone::Success => Color::WHITE,
            StatusTone::Busy => Color::from_rgb(0.0, 0.9, 0.9),
            StatusTone::Error => Color::from_rgb(0.95, 0.3, 0.3),
        };

        let content: Column<Message> = column![
            text("Ora AI").size(35),
            text("Health Vision").size(12),
            container(picture).padding(5),
            text(self.state.file_label()).size(14),
            pickers,
            analyze,
            loading,
            container(text(self.state.status_text()).size(16).color(status_color))
                .padding(20)
                .width(Length::Fixed(350.0)),
            text("Powered by Ora Vision").size(10),
        ]
        .spacing(16)
        .padding(30)
        .align_x(Alignment::Center);

        container(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Drive the loading bar while a request is in flight
    fn subscription(&self) -> Subscription<Message> {
        if self.state.is_analyzing() {
            iced::time::every(Duration::from_millis(30)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    let analyzer = match MealAnalyzer::new(config::Config::load()) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            log::error!("❌ Cannot start: {}", e);
            std::process::exit(1);
        }
    };

    iced::application("Ora AI", OraApp::update, OraApp::view)
        .subscription(OraApp::subscription)
        .theme(OraApp::theme)
        .centered()
        .run_with(move || OraApp::new(analyzer))
}
