use crate::chart::{ChartSelection, PlotKind};
use crate::data::loader::{IngestError, InputSource, ingest};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A one-line message about the last user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Notice {
            level,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The session: everything one window remembers between frames.
///
/// `dataset` is the only data the loaders mutate. It is `Some` exactly when
/// data is loaded, so a failed load that clears it can never leave a stale
/// "loaded" view behind.
#[derive(Default)]
pub struct AppState {
    /// Current dataset (None until a load succeeds, and after one fails).
    pub dataset: Option<Dataset>,

    /// Message from the last load attempt.
    pub notice: Option<Notice>,

    /// Contents of the manual-data text box.
    pub manual_text: String,

    /// Whether the raw-data preview is expanded.
    pub show_raw: bool,

    pub plot_kind: PlotKind,
    pub selection: ChartSelection,
}

impl AppState {
    /// Ingest an uploaded file.
    pub fn load_upload(&mut self, name: &str, bytes: Vec<u8>) {
        let source = InputSource::Upload {
            name: name.to_string(),
            bytes,
        };
        match ingest(&source) {
            Ok(dataset) => {
                let text = format!("Successfully loaded {name} with {} rows", dataset.len());
                self.set_dataset(dataset, text);
            }
            Err(IngestError::UnsupportedFormat { extension }) => {
                log::warn!("Rejected {name}: unsupported extension '.{extension}'");
                self.notice = Some(Notice::new(
                    NoticeLevel::Error,
                    "Unsupported file format. Please upload CSV, TSV, TXT, Excel, JSON, or Parquet.",
                ));
            }
            Err(e) => self.fail(format!("Could not read file: {e}")),
        }
    }

    /// Ingest the text in the manual-data box.
    pub fn load_manual(&mut self) {
        if self.manual_text.trim().is_empty() {
            log::warn!("Manual load requested with no text");
            self.notice = Some(Notice::new(
                NoticeLevel::Warning,
                "Please enter some data before clicking the button.",
            ));
            return;
        }

        match ingest(&InputSource::Pasted(self.manual_text.clone())) {
            Ok(dataset) => {
                let text = format!("Successfully loaded manual data with {} rows.", dataset.len());
                self.set_dataset(dataset, text);
            }
            Err(e) => self.fail(format!("Could not process manual data: {e}")),
        }
    }

    /// Load the bundled tips dataset.
    pub fn load_example(&mut self) {
        match ingest(&InputSource::Example) {
            Ok(dataset) => {
                let text = format!("Loaded example dataset with {} rows", dataset.len());
                self.set_dataset(dataset, text);
            }
            Err(e) => self.fail(format!("Could not load example data: {e}")),
        }
    }

    /// Record a failed load: the previous dataset is dropped.
    pub fn fail(&mut self, message: String) {
        log::error!("{message}");
        self.dataset = None;
        self.notice = Some(Notice::new(NoticeLevel::Error, message));
    }

    /// Replace the dataset wholesale and reset the plot pickers for it.
    fn set_dataset(&mut self, dataset: Dataset, message: String) {
        log::info!(
            "Loaded {} rows with columns {:?}",
            dataset.len(),
            dataset.column_names()
        );
        self.selection = ChartSelection::defaults(self.plot_kind, &dataset);
        self.dataset = Some(dataset);
        self.notice = Some(Notice::new(NoticeLevel::Success, message));
    }

    /// Switch plot kind, keeping the picks that remain valid.
    pub fn set_plot_kind(&mut self, kind: PlotKind) {
        self.plot_kind = kind;
        if let Some(ds) = &self.dataset {
            self.selection.reconcile(kind, ds);
            log::debug!("Plot kind {kind}, selection {:?}", self.selection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.load_upload("a.csv", b"a,b,c\n1,2,3\n4,5,6\n".to_vec());
        assert!(state.dataset.is_some());
        state
    }

    fn level(state: &AppState) -> Option<NoticeLevel> {
        state.notice.as_ref().map(|n| n.level)
    }

    #[test]
    fn successful_upload_reports_rows() {
        let state = loaded();
        assert_eq!(level(&state), Some(NoticeLevel::Success));
        assert_eq!(
            state.notice.as_ref().unwrap().text,
            "Successfully loaded a.csv with 2 rows"
        );
        assert_eq!(state.selection.x.as_deref(), Some("a"));
        assert_eq!(state.selection.y.as_deref(), Some("a"));
    }

    #[test]
    fn empty_manual_text_warns_without_loading() {
        let mut state = AppState::default();
        state.manual_text = "   \n ".into();
        state.load_manual();
        assert!(state.dataset.is_none());
        assert_eq!(level(&state), Some(NoticeLevel::Warning));
    }

    #[test]
    fn unsupported_upload_leaves_dataset_alone() {
        let mut state = loaded();
        state.load_upload("image.bmp", vec![0x42, 0x4d]);
        assert_eq!(level(&state), Some(NoticeLevel::Error));
        assert!(state.notice.as_ref().unwrap().text.starts_with("Unsupported file format"));
        assert!(state.dataset.is_some());
        assert_eq!(state.dataset.as_ref().unwrap().column_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn failed_load_clears_previous_dataset() {
        let mut state = loaded();
        state.load_upload("broken.json", b"{oops".to_vec());
        assert!(state.dataset.is_none());
        assert_eq!(level(&state), Some(NoticeLevel::Error));
        assert!(state.notice.as_ref().unwrap().text.starts_with("Could not read file:"));

        let mut state = loaded();
        state.manual_text = "a,b\n1,2\n1,2,3,4\n".into();
        state.load_manual();
        assert!(state.dataset.is_none());
        assert!(state
            .notice
            .as_ref()
            .unwrap()
            .text
            .starts_with("Could not process manual data:"));
    }

    #[test]
    fn manual_and_example_loads_replace_dataset() {
        let mut state = loaded();
        state.manual_text = "x\ty\n1\t2\n".into();
        state.load_manual();
        assert_eq!(state.dataset.as_ref().unwrap().column_names(), vec!["x", "y"]);

        state.load_example();
        let ds = state.dataset.as_ref().unwrap();
        assert!(ds.column("tip").is_some());
        assert_eq!(
            state.notice.as_ref().unwrap().text,
            format!("Loaded example dataset with {} rows", ds.len())
        );
    }

    #[test]
    fn switching_plot_kind_reconciles_selection() {
        let mut state = AppState::default();
        state.load_example();
        assert_eq!(state.selection.x.as_deref(), Some("total_bill"));

        state.set_plot_kind(PlotKind::Box);
        assert_eq!(state.selection.x.as_deref(), Some("sex"));
        assert_eq!(state.selection.y.as_deref(), Some("total_bill"));

        state.set_plot_kind(PlotKind::PairPlot);
        assert_eq!(state.selection.dimensions, vec!["total_bill", "tip", "size"]);
    }
}
