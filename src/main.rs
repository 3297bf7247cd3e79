// Image Compressor: drop images, get them back as 1920x1080-bounded JPEGs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod batch;
mod compression;
mod config;
mod error;
mod gallery;
mod state;

use batch::ItemOutcome;
use compression::ProcessedImage;
use config::{ACCEPTED_EXTENSIONS, BODY_FONT, DEFAULT_LOG_FILTER, DROP_SETTLE, HEADING_FONT};
use error::Error;
use iced::widget::{button, column, container, row, scrollable, text, Space};
use iced::{executor, window, Application, Color, Command, ContentFit, Element, Event, Length, Subscription, Theme};
use state::{BatchSummary, Phase, Session};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const CARDS_PER_ROW: usize = 3;

pub fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting image-compressor");

    ImageCompressor::run(config::window_settings())
}

#[derive(Default)]
struct ImageCompressor {
    session: Session,
    status_message: String,
}

#[derive(Debug, Clone)]
enum Message {
    SelectFiles,
    FilesSelected(Vec<PathBuf>),
    FileHovered,
    FilesHoveredLeft,
    FileDropped(PathBuf),
    FlushDrops,
    BatchSettled(Vec<ItemOutcome>),
    Download(usize),
    DownloadFinished(Result<Option<PathBuf>, Arc<Error>>),
    Remove(usize),
    ClearResults,
}

impl Application for ImageCompressor {
    type Message = Message;
    type Theme = Theme;
    type Executor = executor::Default;
    type Flags = ();

    fn new(_flags: ()) -> (Self, Command<Message>) {
        (Self::default(), Command::none())
    }

    fn title(&self) -> String {
        String::from("Compresseur d'images")
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::SelectFiles => {
                if !self.session.is_compressing() {
                    return Command::perform(select_files(), Message::FilesSelected);
                }
            }
            Message::FilesSelected(paths) => {
                return self.submit(paths);
            }
            Message::FileHovered => {
                self.session.set_drag_active(true);
            }
            Message::FilesHoveredLeft => {
                self.session.set_drag_active(false);
            }
            Message::FileDropped(path) => match self.session.queue_drop(path) {
                Ok(true) => {
                    return Command::perform(
                        async { tokio::time::sleep(DROP_SETTLE).await },
                        |_| Message::FlushDrops,
                    );
                }
                Ok(false) => {}
                Err(e) => {
                    self.status_message = e.to_string();
                }
            },
            Message::FlushDrops => {
                let paths = self.session.take_dropped();
                if self.session.is_compressing() {
                    // A picker batch started during the settle delay.
                    for path in &paths {
                        tracing::warn!(path = %path.display(), "drop discarded, a batch is in flight");
                    }
                    self.status_message = Error::Busy.to_string();
                    return Command::none();
                }
                return self.submit(paths);
            }
            Message::BatchSettled(outcomes) => {
                let summary = self.session.finish_batch(outcomes);
                self.status_message = summary_message(summary);
            }
            Message::Download(index) => {
                if let Some(image) = self.session.gallery().get(index) {
                    let file_name = gallery::download_name(&image.original.name);
                    let bytes = image.compressed.bytes.clone();
                    return Command::perform(gallery::save_download(file_name, bytes), |result| {
                        Message::DownloadFinished(result.map_err(Arc::new))
                    });
                }
            }
            Message::DownloadFinished(result) => match result {
                Ok(Some(path)) => {
                    self.status_message = format!("Enregistré : {}", path.display());
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("Error saving image: {}", e);
                    self.status_message = e.to_string();
                }
            },
            Message::Remove(index) => {
                self.session.remove(index);
            }
            Message::ClearResults => {
                self.session.clear();
                self.status_message.clear();
            }
        }
        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::subscription::events_with(|event, _status| match event {
            Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
            Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }

    fn view(&self) -> Element<Message> {
        let header = column![
            text("Compressez vos images en quelques clics")
                .size(22)
                .font(HEADING_FONT),
            text("Glissez-déposez vos images ou cliquez pour les sélectionner")
                .size(14)
                .font(BODY_FONT),
        ]
        .spacing(6)
        .align_items(iced::Alignment::Center)
        .width(Length::Fill);

        let content = column![
            header,
            Space::with_height(16),
            self.view_drop_zone(),
            Space::with_height(12),
            self.view_progress(),
            self.view_results(),
        ]
        .padding(16);

        container(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Light
    }
}

impl ImageCompressor {
    fn submit(&mut self, paths: Vec<PathBuf>) -> Command<Message> {
        let selection = batch::accept_paths(paths);

        if selection.accepted.is_empty() {
            if !selection.rejected.is_empty() {
                self.status_message = format!(
                    "Formats acceptés : {}",
                    ACCEPTED_EXTENSIONS.map(|ext| format!(".{}", ext)).join(" ")
                );
            }
            return Command::none();
        }

        if let Err(e) = self.session.begin_batch(selection.accepted.len()) {
            self.status_message = e.to_string();
            return Command::none();
        }

        self.status_message.clear();
        Command::perform(batch::compress_batch(selection.accepted), Message::BatchSettled)
    }

    fn view_drop_zone(&self) -> Element<Message> {
        let prompt = if self.session.drag_active() {
            column![text("Déposez vos images ici...").size(18).font(HEADING_FONT)]
        } else {
            column![
                text("Glissez-déposez vos images ici").size(18).font(HEADING_FONT),
                text("ou cliquez pour sélectionner").size(13).font(BODY_FONT),
            ]
        };

        let zone = button(
            container(prompt.spacing(6).align_items(iced::Alignment::Center))
                .width(Length::Fill)
                .center_x(),
        )
        .width(Length::Fill)
        .padding(48)
        .style(if self.session.drag_active() {
            iced::theme::Button::Primary
        } else {
            iced::theme::Button::Secondary
        });

        // No press handler while compressing disables the picker.
        if self.session.is_compressing() {
            zone.into()
        } else {
            zone.on_press(Message::SelectFiles).into()
        }
    }

    fn view_progress(&self) -> Element<Message> {
        let busy = match self.session.phase() {
            Phase::Compressing { files } => Some(format!("Compression de {} image(s) en cours...", files)),
            Phase::Idle => None,
        };

        let mut section = column![].spacing(4);
        if let Some(busy) = busy {
            section = section.push(text(busy).size(14).font(HEADING_FONT));
        }
        if !self.status_message.is_empty() {
            section = section.push(text(&self.status_message).size(12).font(BODY_FONT));
        }
        section.into()
    }

    fn view_results(&self) -> Element<Message> {
        let gallery = self.session.gallery();
        if gallery.is_empty() {
            return column![].into();
        }

        let mut rows: Vec<Element<Message>> = Vec::new();
        let mut current: Vec<Element<Message>> = Vec::new();
        for (index, image) in gallery.iter().enumerate() {
            current.push(view_card(index, image));
            if current.len() == CARDS_PER_ROW {
                rows.push(row(std::mem::take(&mut current)).spacing(16).into());
            }
        }
        if !current.is_empty() {
            while current.len() < CARDS_PER_ROW {
                current.push(Space::with_width(Length::Fill).into());
            }
            rows.push(row(current).spacing(16).into());
        }

        column![
            Space::with_height(12),
            row![
                text(format!("Images compressées ({})", gallery.len()))
                    .size(18)
                    .font(HEADING_FONT)
                    .width(Length::Fill),
                button("Tout effacer")
                    .on_press(Message::ClearResults)
                    .padding([6, 12]),
            ]
            .align_items(iced::Alignment::Center),
            column(rows).spacing(16),
        ]
        .spacing(12)
        .into()
    }
}

fn view_card(index: usize, image: &ProcessedImage) -> Element<'_, Message> {
    let original = image.original.size();
    let compressed = image.compressed.size();

    let card = column![
        iced::widget::image(image.preview.clone())
            .width(Length::Fill)
            .height(Length::Fixed(180.0))
            .content_fit(ContentFit::Cover),
        text(&image.original.name).size(13).font(HEADING_FONT),
        text(format!("{} × {} px", image.dimensions.0, image.dimensions.1))
            .size(11)
            .font(BODY_FONT),
        size_row("Original:", gallery::format_kb(original), Color::from_rgb8(31, 41, 55)),
        size_row("Compressed:", gallery::format_kb(compressed), Color::from_rgb8(22, 163, 74)),
        size_row(
            "Réduction:",
            gallery::format_reduction(original, compressed),
            Color::from_rgb8(37, 99, 235)
        ),
        row![
            button("Télécharger")
                .on_press(Message::Download(index))
                .style(iced::theme::Button::Primary)
                .padding([6, 12]),
            button("Retirer")
                .on_press(Message::Remove(index))
                .style(iced::theme::Button::Secondary)
                .padding([6, 12]),
        ]
        .spacing(8),
    ]
    .spacing(6);

    container(card)
        .style(iced::theme::Container::Box)
        .padding(12)
        .width(Length::Fill)
        .into()
}

fn size_row<'a>(label: &'a str, value: String, color: Color) -> Element<'a, Message> {
    row![
        text(label).size(12).font(BODY_FONT).width(Length::Fill),
        text(value).size(12).font(HEADING_FONT).style(color),
    ]
    .into()
}

fn summary_message(summary: BatchSummary) -> String {
    match summary.failed {
        0 => format!("{} image(s) compressée(s)", summary.added),
        failed => format!(
            "{} image(s) compressée(s), {} image(s) non compressée(s)",
            summary.added, failed
        ),
    }
}

// Helper functions
async fn select_files() -> Vec<PathBuf> {
    rfd::AsyncFileDialog::new()
        .add_filter("Images", &ACCEPTED_EXTENSIONS)
        .pick_files()
        .await
        .map(|handles| handles.iter().map(|handle| handle.path().to_path_buf()).collect())
        .unwrap_or_default()
}
