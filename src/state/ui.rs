use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisError, AnalysisResult};

/// Greeting shown on startup
pub const WELCOME_TEXT: &str = "مرحباً بك في Ora AI 👋\nصوّر وجبتك لتعرف سعراتها.";
/// Label before any photo is picked
pub const NO_MEAL_TEXT: &str = "لم يتم تحديد وجبة";
pub const ANALYZING_TEXT: &str = "Ora يقوم بتحليل مكونات الطبق...";
pub const REPORT_BANNER: &str = "✨ تقرير Ora:";
pub const ERROR_PREFIX: &str = "عذراً، حدث خطأ في الاتصال:";

/// What the main image slot shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayImage {
    /// Photo picked from disk
    Local(PathBuf),
    /// Placeholder or generated image, fetched lazily
    Remote(String),
}

/// Colour hint for the status text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Busy,
    Success,
    Error,
}

/// Presentation state for the single screen.
///
/// Only the handlers below mutate it, and they all run on the UI update
/// loop, so the one in-flight analysis never races with it.
#[derive(Debug, Clone)]
pub struct UiState {
    selected_image: Option<PathBuf>,
    file_label: String,
    analyzing: bool,
    display_image: DisplayImage,
    status_text: String,
    status_tone: StatusTone,
}

impl UiState {
    pub fn new(placeholder_url: String) -> Self {
        Self {
            selected_image: None,
            file_label: NO_MEAL_TEXT.to_string(),
            analyzing: false,
            display_image: DisplayImage::Remote(placeholder_url),
            status_text: WELCOME_TEXT.to_string(),
            status_tone: StatusTone::Info,
        }
    }

    /// A photo came back from the picker.
    ///
    /// Ignored while an analysis is running so the report and the image
    /// always belong to the same photo. Returns whether it was taken.
    pub fn file_selected(&mut self, path: PathBuf) -> bool {
        if self.analyzing {
            return false;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        self.file_label = format!("تم التقاط: {}", name);
        self.display_image = DisplayImage::Local(path.clone());
        self.selected_image = Some(path);
        true
    }

    /// Start an analysis if one is allowed.
    ///
    /// Returns the photo to analyse, or `None` when nothing is selected or
    /// an analysis is already running.
    pub fn begin_analysis(&mut self) -> Option<PathBuf> {
        if !self.can_analyze() {
            return None;
        }
        let path = self.selected_image.clone()?;

        self.analyzing = true;
        self.status_text = ANALYZING_TEXT.to_string();
        self.status_tone = StatusTone::Busy;
        Some(path)
    }

    /// Apply the outcome of the in-flight analysis.
    ///
    /// The display image only changes on success.
    pub fn finish_analysis(&mut self, result: &Result<AnalysisResult, AnalysisError>) {
        self.analyzing = false;

        match result {
            Ok(analysis) => {
                self.status_text = format!("{}\n\n{}", REPORT_BANNER, analysis.report_text);
                self.status_tone = StatusTone::Success;
                self.display_image = DisplayImage::Remote(analysis.generated_image_url.clone());
            }
            Err(err) => {
                self.status_text = format!("{} {}", ERROR_PREFIX, err);
                self.status_tone = StatusTone::Error;
            }
        }
    }

    pub fn can_pick(&self) -> bool {
        !self.analyzing
    }

    pub fn can_analyze(&self) -> bool {
        !self.analyzing && self.selected_image.is_some()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn selected_image(&self) -> Option<&Path> {
        self.selected_image.as_deref()
    }

    pub fn file_label(&self) -> &str {
        &self.file_label
    }

    pub fn display_image(&self) -> &DisplayImage {
        &self.display_image
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn status_tone(&self) -> StatusTone {
        self.status_tone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "https://image.test/prompt/placeholder?nologo=true";

    fn success() -> Result<AnalysisResult, AnalysisError> {
        Ok(AnalysisResult {
            report_text: "السعرات: 450".to_string(),
            image_prompt_seed: "السعرات: 450".to_string(),
            generated_image_url: "https://image.test/prompt/salad?n=1".to_string(),
        })
    }

    #[test]
    fn test_cannot_analyze_without_photo() {
        let mut state = UiState::new(PLACEHOLDER.to_string());
        assert!(!state.can_analyze());
        assert!(state.can_pick());
        assert_eq!(state.begin_analysis(), None);
        assert!(!state.is_analyzing());
        assert_eq!(state.status_text(), WELCOME_TEXT);
    }

    #[test]
    fn test_file_selected_enables_analysis() {
        let mut state = UiState::new(PLACEHOLDER.to_string());
        state.file_selected(PathBuf::from("/photos/lunch.jpg"));

        assert!(state.can_analyze());
        assert_eq!(state.file_label(), "تم التقاط: lunch.jpg");
        assert_eq!(
            state.display_image(),
            &DisplayImage::Local(PathBuf::from("/photos/lunch.jpg"))
        );
    }

    #[test]
    fn test_trigger_transitions_on_success() {
        let mut state = UiState::new(PLACEHOLDER.to_string());
        state.file_selected(PathBuf::from("/photos/lunch.jpg"));
        assert!(state.can_analyze());

        let path = state.begin_analysis();
        assert_eq!(path, Some(PathBuf::from("/photos/lunch.jpg")));
        assert!(!state.can_analyze());
        assert!(!state.can_pick());
        assert_eq!(state.status_tone(), StatusTone::Busy);

        // A second trigger while one is in flight is ignored
        assert_eq!(state.begin_analysis(), None);

        state.finish_analysis(&success());
        assert!(state.can_analyze());
        assert!(state.can_pick());
        assert_eq!(state.status_tone(), StatusTone::Success);
        assert!(state.status_text().starts_with(REPORT_BANNER));
        assert!(state.status_text().ends_with("السعرات: 450"));
        assert_eq!(
            state.display_image(),
            &DisplayImage::Remote("https://image.test/prompt/salad?n=1".to_string())
        );
    }

    #[test]
    fn test_failure_keeps_image_and_reenables_trigger() {
        let mut state = UiState::new(PLACEHOLDER.to_string());
        state.file_selected(PathBuf::from("/photos/lunch.jpg"));
        state.begin_analysis();
        state.finish_analysis(&success());
        let before = state.display_image().clone();

        state.begin_analysis();
        state.finish_analysis(&Err(AnalysisError::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        }));

        assert!(state.can_analyze());
        assert_eq!(state.status_tone(), StatusTone::Error);
        assert!(state.status_text().starts_with(ERROR_PREFIX));
        assert!(state.status_text().contains("500"));
        assert_eq!(state.display_image(), &before);
    }

    #[test]
    fn test_pick_returning_mid_analysis_is_ignored() {
        let mut state = UiState::new(PLACEHOLDER.to_string());
        assert!(state.file_selected(PathBuf::from("/photos/a.jpg")));
        state.begin_analysis();

        assert!(!state.file_selected(PathBuf::from("/photos/b.jpg")));
        assert!(state.is_analyzing());
        assert_eq!(state.selected_image(), Some(Path::new("/photos/a.jpg")));
        assert_eq!(state.file_label(), "تم التقاط: a.jpg");
        assert_eq!(
            state.display_image(),
            &DisplayImage::Local(PathBuf::from("/photos/a.jpg"))
        );

        state.finish_analysis(&success());
        assert!(state.file_selected(PathBuf::from("/photos/b.jpg")));
        assert_eq!(state.selected_image(), Some(Path::new("/photos/b.jpg")));
    }

    #[test]
    fn test_missing_file_leaves_selection_untouched() {
        let mut state = UiState::new(PLACEHOLDER.to_string());
        state.file_selected(PathBuf::from("/gone/meal.jpg"));
        state.begin_analysis();

        state.finish_analysis(&Err(AnalysisError::FileAccess {
            path: PathBuf::from("/gone/meal.jpg"),
            reason: "No such file or directory".to_string(),
        }));

        assert_eq!(state.selected_image(), Some(Path::new("/gone/meal.jpg")));
        assert_eq!(
            state.display_image(),
            &DisplayImage::Local(PathBuf::from("/gone/meal.jpg"))
        );
        assert!(state.status_text().contains("/gone/meal.jpg"));
        assert!(state.can_analyze());
    }
}
