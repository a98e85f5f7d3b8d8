use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

use super::apply::{chart_series, placeholder_rows, table_rows, text_value};
use super::charts::{ChartManager, ChartOptions};
use super::dates::{self, DateRange, INVALID_RANGE_MESSAGE};
use super::export::{self, ExportFormat, ExportSink, NO_EXPORT_DATA};
use super::registry::{bindings_for, NO_RANGE_DATA};
use super::section::Section;
use super::widgets::{WidgetBoard, WidgetSnapshot};
use crate::api::bridge::{FetchBridge, FetchOutcome, FetchRequest, Payload};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const SUCCESS_MESSAGE: &str = "Data loaded successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionPhase {
    #[default]
    Idle,
    Loading,
    Rendered,
    Failed,
}

#[derive(Debug, Clone)]
pub struct CachedPayload {
    pub payload: Payload,
    pub range: DateRange,
    pub fetched_at: DateTime<Local>,
}

#[derive(Debug, Default)]
struct SectionState {
    phase: SectionPhase,
    /// Token of the most recently dispatched request.
    latest: u64,
    cache: Option<CachedPayload>,
    /// Widget contents from before the placeholders went up.
    restore: Option<WidgetSnapshot>,
}

/// Everything the orchestrator mutates, behind one lock.
#[derive(Debug, Default)]
pub struct BoardState {
    pub widgets: WidgetBoard,
    pub charts: ChartManager,
    sections: HashMap<Section, SectionState>,
}

impl BoardState {
    pub fn phase(&self, section: Section) -> SectionPhase {
        self.sections
            .get(&section)
            .map(|s| s.phase)
            .unwrap_or_default()
    }

    pub fn cached(&self, section: Section) -> Option<&CachedPayload> {
        self.sections.get(&section).and_then(|s| s.cache.as_ref())
    }

    /// Enters `Loading` and returns the token of the new request.
    fn begin(&mut self, section: Section) -> u64 {
        let bindings = bindings_for(section);
        let state = self.sections.entry(section).or_default();
        state.latest += 1;
        state.phase = SectionPhase::Loading;
        let token = state.latest;

        if state.restore.is_none() {
            let tables: Vec<&str> = bindings
                .tables
                .iter()
                .filter(|t| t.placeholder.is_some())
                .map(|t| t.id)
                .collect();
            let texts: Vec<&str> = bindings
                .text_slots
                .iter()
                .filter(|t| t.placeholder.is_some())
                .map(|t| t.id)
                .collect();
            state.restore = Some(self.widgets.capture(&tables, &texts));
        }

        self.widgets.set_status(bindings.status, LOADING_MESSAGE);
        self.widgets.set_loading(bindings.loading, true);
        for table in bindings.tables {
            if let Some(rows) = placeholder_rows(table) {
                self.widgets.set_rows(table.id, rows);
            }
        }
        for slot in bindings.text_slots {
            if let Some(text) = slot.placeholder {
                self.widgets.set_text(slot.id, text);
            }
        }
        token
    }

    /// Applies a finished request. Returns false when a newer request for
    /// the section has been dispatched since, in which case nothing changes.
    fn complete(&mut self, section: Section, token: u64, range: DateRange, outcome: FetchOutcome) -> bool {
        let bindings = bindings_for(section);
        let Some(state) = self.sections.get_mut(&section) else {
            return false;
        };
        if state.latest != token {
            debug!(
                "Discarding stale {} result (token {}, latest {})",
                section, token, state.latest
            );
            return false;
        }
        let restore = state.restore.take();

        match outcome {
            Err(info) => {
                error!("{} fetch failed: {}", section, info);
                if let Some(detail) = &info.detail {
                    debug!("{} error detail: {}", section, detail);
                }
                state.phase = SectionPhase::Failed;
                self.widgets.set_status(bindings.status, format!("Error: {}", info.error));
                self.widgets.set_loading(bindings.loading, false);
                if let Some(snapshot) = restore {
                    self.widgets.restore(snapshot);
                }
            }
            Ok(payload) => {
                info!("{} data loaded for {} .. {}", section, range.start, range.end);
                state.phase = SectionPhase::Rendered;
                state.cache = Some(CachedPayload {
                    payload: payload.clone(),
                    range,
                    fetched_at: Local::now(),
                });
                self.widgets.set_status(bindings.status, SUCCESS_MESSAGE);
                self.widgets.set_loading(bindings.loading, false);
                self.bind(section, &payload, &range);
            }
        }
        true
    }

    fn bind(&mut self, section: Section, payload: &Payload, range: &DateRange) {
        let bindings = bindings_for(section);

        for table in bindings.tables {
            self.widgets.set_rows(table.id, table_rows(table, payload));
        }

        for slot in bindings.text_slots {
            self.widgets.set_text(slot.id, text_value(slot, payload));
        }

        for chart in bindings.charts {
            match chart_series(&chart.source, payload, range) {
                Some(series) => {
                    self.charts.render_chart(
                        chart.id,
                        chart.kind,
                        series,
                        ChartOptions {
                            title: chart.title.to_string(),
                            x_range: Some(*range),
                            stack: bindings.charts.len(),
                        },
                    );
                    self.widgets.clear_text(chart.error_slot);
                }
                None => {
                    debug!("No series for {} in {} .. {}", chart.id, range.start, range.end);
                    self.charts.clear_chart(chart.id);
                    self.widgets.set_text(chart.error_slot, NO_RANGE_DATA);
                }
            }
        }
    }
}

/// Drives section loads against a fetch bridge and owns the resulting
/// widget state.
#[derive(Clone)]
pub struct SectionOrchestrator {
    bridge: Arc<dyn FetchBridge>,
    state: Arc<Mutex<BoardState>>,
}

impl SectionOrchestrator {
    pub fn new(bridge: Arc<dyn FetchBridge>) -> Self {
        Self {
            bridge,
            state: Arc::new(Mutex::new(BoardState::default())),
        }
    }

    /// Locks the board, ignoring poisoning.
    pub fn board(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Puts `section` into `Loading` under a fresh token right away. The
    /// returned future fetches `range` and applies the result, unless a newer
    /// load for the same section was started in the meantime.
    ///
    /// Tokens follow call order, so of two loads of one section the later
    /// call wins however their futures are scheduled.
    pub fn load_section(
        &self,
        section: Section,
        range: DateRange,
    ) -> impl Future<Output = ()> + Send + 'static {
        let token = self.board().begin(section);
        let orchestrator = self.clone();
        async move { orchestrator.finish(section, token, range).await }
    }

    async fn finish(&self, section: Section, token: u64, range: DateRange) {
        let request = FetchRequest::new(section, &range);
        debug!("Dispatching {} request #{}", section, token);

        let outcome = self.bridge.fetch(&request).await;

        self.board().complete(section, token, range, outcome);
    }

    /// Validates user-entered dates, then starts a load. `None` means the
    /// range was rejected and nothing was dispatched.
    pub fn refresh(
        &self,
        section: Section,
        start: &str,
        end: &str,
    ) -> Option<impl Future<Output = ()> + Send + 'static> {
        let Some(range) = DateRange::parse(start, end) else {
            warn!("Invalid date range for {}: {} .. {}", section, start, end);
            self.board()
                .widgets
                .set_status(bindings_for(section).status, INVALID_RANGE_MESSAGE);
            return None;
        };
        Some(self.load_section(section, range))
    }

    /// `refresh` with the fetch running as a background task.
    pub fn spawn_refresh(&self, section: Section, start: &str, end: &str) -> Option<JoinHandle<()>> {
        self.refresh(section, start, end).map(tokio::spawn)
    }

    pub fn phase(&self, section: Section) -> SectionPhase {
        self.board().phase(section)
    }

    pub fn last_payload(&self, section: Section) -> Option<CachedPayload> {
        self.board().cached(section).cloned()
    }

    pub fn on_resize_settled(&self, width: u16, height: u16) {
        self.board().charts.resize_all(width, height);
    }

    /// Exports the last rendered payload of `section`. Returns the written
    /// path, or `None` when there was nothing to export or the write failed;
    /// either way the outcome is on the section's status line.
    pub fn export_section(&self, section: Section, format: ExportFormat, sink: &dyn ExportSink) -> Option<PathBuf> {
        let status = bindings_for(section).status;
        let Some(cached) = self.last_payload(section) else {
            info!("Nothing to export for {}", section);
            self.board().widgets.set_status(status, NO_EXPORT_DATA);
            return None;
        };
        let document = export::build(section, &cached.payload, format, dates::today());

        match sink.write(&document) {
            Ok(path) => {
                self.board()
                    .widgets
                    .set_status(status, format!("Exported {}", path.display()));
                Some(path)
            }
            Err(e) => {
                error!("Export of {} failed: {}", section, e);
                self.board().widgets.set_status(status, format!("Error: {}", e));
                None
            }
        }
    }
}
