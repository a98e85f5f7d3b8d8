use chrono::{Datelike, NaiveDate};
use std::collections::{HashMap, VecDeque};

use super::dates::DateRange;
use super::registry::ChartKind;

const JOURNAL_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct CandleData {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareSlice {
    pub label: String,
    /// Percentage of the shared total, 0..=100.
    pub share: f64,
    /// Absolute metric the share was derived from.
    pub backing: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSeries {
    Candles(Vec<CandleData>),
    Lines(Vec<LineSeries>),
    Shares(Vec<ShareSlice>),
}

impl ChartSeries {
    pub fn point_count(&self) -> usize {
        match self {
            ChartSeries::Candles(candles) => candles.len(),
            ChartSeries::Lines(lines) => lines.iter().map(|l| l.points.len()).max().unwrap_or(0),
            ChartSeries::Shares(slices) => slices.len(),
        }
    }

    /// Lowest and highest value plotted, padded by 5% so lines do not sit
    /// on the frame.
    fn y_bounds(&self) -> [f64; 2] {
        let (min, max) = match self {
            ChartSeries::Candles(candles) => (
                candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min),
                candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max),
            ),
            ChartSeries::Lines(lines) => {
                let values = || lines.iter().flat_map(|l| l.points.iter().map(|(_, v)| *v));
                (
                    values().fold(f64::INFINITY, f64::min),
                    values().fold(f64::NEG_INFINITY, f64::max),
                )
            }
            ChartSeries::Shares(_) => (0.0, 100.0),
        };
        if !min.is_finite() || !max.is_finite() {
            return [0.0, 1.0];
        }
        let pad = ((max - min) * 0.05).max(max.abs() * 0.01).max(f64::EPSILON);
        [min - pad, max + pad]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub title: String,
    /// X axis extent of continuous charts.
    pub x_range: Option<DateRange>,
    /// Charts sharing the section's chart column, this one included.
    pub stack: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChartLayout {
    pub width: u16,
    pub height: u16,
    /// Number of x axis labels that fit the width.
    pub x_ticks: usize,
}

impl ChartLayout {
    fn fit(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            x_ticks: (width as usize / 14).clamp(2, 8),
        }
    }
}

/// A live chart bound to one container.
#[derive(Debug, Clone)]
pub struct ChartHandle {
    pub id: HandleId,
    pub container: String,
    pub kind: ChartKind,
    pub options: ChartOptions,
    pub series: ChartSeries,
    pub y_bounds: [f64; 2],
    pub layout: ChartLayout,
}

impl ChartHandle {
    /// Day ordinals spanned by the x axis. Proportional charts have none.
    pub fn x_bounds(&self) -> Option<[f64; 2]> {
        match self.kind {
            ChartKind::Continuous => self
                .options
                .x_range
                .map(|r| [day_ordinal(r.start), day_ordinal(r.end)]),
            ChartKind::Proportional => None,
        }
    }

    /// Fits the handle to its share of a `width` x `height` chart column.
    fn refit(&mut self, (width, height): (u16, u16)) {
        let slot_height = height / self.options.stack.max(1) as u16;
        self.layout = ChartLayout::fit(width, slot_height);
    }
}

pub fn day_ordinal(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartEvent {
    Created { container: String, handle: HandleId },
    Destroyed { container: String, handle: HandleId },
    Resized { container: String, handle: HandleId, width: u16, height: u16 },
}

/// Sole owner of chart state: at most one live handle per container.
#[derive(Debug, Default)]
pub struct ChartManager {
    handles: HashMap<String, ChartHandle>,
    next_id: u64,
    viewport: (u16, u16),
    journal: VecDeque<ChartEvent>,
}

impl ChartManager {
    pub fn render_chart(
        &mut self,
        container: &str,
        kind: ChartKind,
        series: ChartSeries,
        options: ChartOptions,
    ) -> HandleId {
        self.clear_chart(container);

        self.next_id += 1;
        let id = HandleId(self.next_id);
        let mut handle = ChartHandle {
            id,
            container: container.to_string(),
            kind,
            y_bounds: series.y_bounds(),
            options,
            series,
            layout: ChartLayout::default(),
        };
        handle.refit(self.viewport);
        log::debug!(
            "Created chart {:?} on {} with {} points",
            id,
            container,
            handle.series.point_count()
        );
        self.handles.insert(container.to_string(), handle);
        self.record(ChartEvent::Created {
            container: container.to_string(),
            handle: id,
        });
        id
    }

    /// Destroys the chart on `container`, if any.
    pub fn clear_chart(&mut self, container: &str) {
        if let Some(old) = self.handles.remove(container) {
            log::debug!("Destroyed chart {:?} on {}", old.id, container);
            self.record(ChartEvent::Destroyed {
                container: container.to_string(),
                handle: old.id,
            });
        }
    }

    /// Re-lays out every live chart for a new chart area. Series and handle
    /// ids are untouched.
    pub fn resize_all(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
        let mut resized = Vec::with_capacity(self.handles.len());
        for handle in self.handles.values_mut() {
            handle.refit(self.viewport);
            resized.push(ChartEvent::Resized {
                container: handle.container.clone(),
                handle: handle.id,
                width: handle.layout.width,
                height: handle.layout.height,
            });
        }
        log::debug!("Resized {} charts for a {}x{} column", self.live_count(), width, height);
        for event in resized {
            self.record(event);
        }
    }

    pub fn get(&self, container: &str) -> Option<&ChartHandle> {
        self.handles.get(container)
    }

    pub fn live_count(&self) -> usize {
        self.handles.len()
    }

    #[cfg(test)]
    pub fn journal(&self) -> impl Iterator<Item = &ChartEvent> {
        self.journal.iter()
    }

    fn record(&mut self, event: ChartEvent) {
        self.journal.push_back(event);
        if self.journal.len() > JOURNAL_LEN {
            self.journal.pop_front();
        }
    }
}
