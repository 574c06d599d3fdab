/// State management module
///
/// Holds the presentation state for the single screen (ui.rs): the picked
/// photo, the analysing flag, the image slot and the status text.

pub mod ui;
