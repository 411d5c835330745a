use crate::data::{self, DataSource, LoadedData};
use crate::output::{export_result, StackedBarChart};
use crate::scoring::{compute, validate_lookup, Factor, MarketType, RawWeights, ScoreResult};
use crate::tui::theme::ThemeColors;
use std::path::PathBuf;
use std::time::Instant;

/// Seconds a flash message stays in the status bar
const FLASH_SECS: u64 = 3;

/// Weight step for a coarse adjustment (H / L)
pub const COARSE_STEP: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Table,
    Chart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    UploadPath,
    Help,
}

/// Dashboard session state.
///
/// Owns this session's weights, market type and data source. Every change
/// to one of them runs a full recompute; the score result is never patched.
pub struct App {
    pub raw_weights: RawWeights,
    pub initial_weights: RawWeights,
    pub market: MarketType,
    pub data: LoadedData,
    /// Last upload that passed validation, for switching back from built-in
    pub last_upload: Option<PathBuf>,
    pub precision: u32,
    pub result: Option<ScoreResult>,
    pub chart: Option<StackedBarChart>,
    pub score_error: Option<String>,
    pub selected_factor: Factor,
    pub current_view: View,
    pub input_mode: InputMode,
    pub path_input: String,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    pub export_path: PathBuf,
    pub theme: ThemeColors,
}

impl App {
    pub fn new(
        raw_weights: RawWeights,
        market: MarketType,
        data: LoadedData,
        precision: u32,
        export_path: PathBuf,
        theme: ThemeColors,
    ) -> Self {
        let last_upload = match &data.source {
            DataSource::Upload(path) => Some(path.clone()),
            DataSource::BuiltIn => None,
        };
        let rejected = data.rejected.clone();

        let mut app = Self {
            initial_weights: raw_weights.clone(),
            raw_weights,
            market,
            data,
            last_upload,
            precision,
            result: None,
            chart: None,
            score_error: None,
            selected_factor: Factor::MarketSize,
            current_view: View::Table,
            input_mode: InputMode::Normal,
            path_input: String::new(),
            flash_message: None,
            should_quit: false,
            export_path,
            theme,
        };
        app.recompute();

        if let Some(e) = rejected {
            app.show_flash(format!("Upload rejected ({}), using built-in data", e.reason()));
        }
        app
    }

    /// Run the full normalize + aggregate pass for the current inputs.
    ///
    /// On a scoring error the previous result stays on screen and the error
    /// is shown until the next successful pass.
    pub fn recompute(&mut self) {
        match compute(&self.raw_weights, self.market, &self.data.table, self.precision) {
            Ok(result) => {
                self.chart = Some(StackedBarChart::from_result(&result));
                self.result = Some(result);
                self.score_error = None;
            }
            Err(e) => {
                crate::log_warn!("Scoring failed: {}", e);
                self.score_error = Some(e.to_string());
                self.show_flash(format!("Error: {}", e));
            }
        }
    }

    /// Factors that take part in scoring for the current market
    pub fn active_factors(&self) -> Vec<Factor> {
        Factor::active_for(self.market)
    }

    pub fn next_factor(&mut self) {
        let active = self.active_factors();
        let idx = active.iter().position(|f| *f == self.selected_factor);
        self.selected_factor = match idx {
            Some(i) => active[(i + 1) % active.len()],
            None => active.first().copied().unwrap_or(Factor::MarketSize),
        };
    }

    pub fn previous_factor(&mut self) {
        let active = self.active_factors();
        let idx = active.iter().position(|f| *f == self.selected_factor);
        self.selected_factor = match idx {
            Some(0) | None => active.last().copied().unwrap_or(Factor::MarketSize),
            Some(i) => active[i - 1],
        };
    }

    pub fn adjust_selected(&mut self, delta: i32) {
        let before = self.raw_weights.get(self.selected_factor);
        self.raw_weights.adjust(self.selected_factor, delta);
        if self.raw_weights.get(self.selected_factor) != before {
            self.recompute();
        }
    }

    pub fn reset_weights(&mut self) {
        self.raw_weights = self.initial_weights.clone();
        self.recompute();
        self.show_flash("Weights reset".to_string());
    }

    /// Move to the next market type, keeping the slider selection valid
    pub fn cycle_market(&mut self) {
        self.market = self.market.next();
        if !self.selected_factor.is_active(self.market) {
            self.previous_factor();
        }
        self.recompute();
        self.show_flash(format!("Market: {}", self.market));
    }

    pub fn toggle_view(&mut self) {
        self.current_view = match self.current_view {
            View::Table => View::Chart,
            View::Chart => View::Table,
        };
    }

    /// Switch between the built-in table and the last accepted upload
    pub fn toggle_data_source(&mut self) {
        match (&self.data.source, self.last_upload.clone()) {
            (DataSource::BuiltIn, Some(path)) => self.load_source(DataSource::Upload(path)),
            (DataSource::BuiltIn, None) => {
                self.show_flash("No upload loaded yet (press u to upload)".to_string());
            }
            (DataSource::Upload(_), _) => self.load_source(DataSource::BuiltIn),
        }
    }

    /// Resolve and install a data source.
    ///
    /// A rejected upload leaves the built-in table in place and says why.
    pub fn load_source(&mut self, source: DataSource) {
        let loaded = data::load(&source);

        if let Some(ref e) = loaded.rejected {
            self.data = loaded.clone();
            self.recompute();
            self.show_flash(format!("Upload rejected ({}): {}", e.reason(), e));
            return;
        }

        if let Err(e) = validate_lookup(&loaded.table) {
            self.data = LoadedData::built_in();
            self.recompute();
            self.show_flash(format!("Error: {}", e));
            return;
        }

        if let DataSource::Upload(ref path) = loaded.source {
            self.last_upload = Some(path.clone());
        }
        let rows = loaded.table.len();
        self.data = loaded;
        self.recompute();
        self.show_flash(format!("Loaded {} data ({} countries)", self.data.source, rows));
    }

    pub fn start_upload_input(&mut self) {
        self.input_mode = InputMode::UploadPath;
        self.path_input = self
            .last_upload
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
    }

    pub fn confirm_upload_input(&mut self) {
        let input = self.path_input.trim().to_string();
        self.input_mode = InputMode::Normal;
        self.path_input.clear();

        if input.is_empty() {
            self.show_flash("Upload cancelled".to_string());
            return;
        }
        self.load_source(DataSource::Upload(PathBuf::from(input)));
    }

    pub fn cancel_upload_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.path_input.clear();
    }

    /// Write the current result to the export path
    pub fn export(&mut self) {
        let Some(result) = self.result.as_ref() else {
            self.show_flash("Nothing to export".to_string());
            return;
        };
        let source = self.data.source.to_string();
        match export_result(&self.export_path, result, &source) {
            Ok(_) => {
                let msg = format!("Exported to {}", self.export_path.display());
                self.show_flash(msg);
            }
            Err(e) => self.show_flash(format!("Failed to export: {:#}", e)),
        }
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }
}
