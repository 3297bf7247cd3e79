// Fixed compression parameters and window settings

use iced::font::{Family, Weight};
use iced::{Font, Settings};
use std::time::Duration;

/// Widest output a landscape (or square) image may have.
pub const MAX_WIDTH: u32 = 1920;
/// Tallest output a portrait image may have.
pub const MAX_HEIGHT: u32 = 1080;

/// JPEG quality on the encoder's 1-100 scale (0.7).
pub const JPEG_QUALITY: u8 = 70;

/// Lowercase extensions accepted from drops and the file picker.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "gif"];

pub const DOWNLOAD_PREFIX: &str = "compressed_";

/// Pause after the last file-drop event before the queued drops form a batch.
pub const DROP_SETTLE: Duration = Duration::from_millis(50);

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "image_compressor=info";

pub const HEADING_FONT: Font = Font {
    family: Family::SansSerif,
    weight: Weight::Bold,
    stretch: iced::font::Stretch::Normal,
    monospaced: false,
};

pub const BODY_FONT: Font = Font {
    family: Family::SansSerif,
    weight: Weight::Normal,
    stretch: iced::font::Stretch::Normal,
    monospaced: false,
};

pub fn window_settings() -> Settings<()> {
    Settings {
        window: iced::window::Settings {
            size: (980, 760),
            min_size: Some((560, 520)),
            resizable: true,
            decorations: true,
            ..Default::default()
        },
        default_font: BODY_FONT,
        default_text_size: 14.0,
        ..Default::default()
    }
}
