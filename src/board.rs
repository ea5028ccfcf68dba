use chrono::NaiveDateTime;

use crate::catalog::{Catalog, EventRecord};
use crate::schedule::{EventPhase, EventStatus, TimeInterval, evaluate, phase};
use crate::selection::{SelectionController, SelectionState};
use crate::title::wrap_title;

/// One list entry with its status evaluated against a single `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow<'a> {
    pub index: usize,
    pub event: &'a EventRecord,
    pub interval: TimeInterval,
    pub status: EventStatus,
    pub phase: EventPhase,
}

impl<'a> EventRow<'a> {
    pub fn evaluate(index: usize, event: &'a EventRecord, now: NaiveDateTime) -> Self {
        let interval = event.interval(now);
        Self {
            index,
            event,
            interval,
            status: evaluate(&interval, now),
            phase: phase(&interval, now),
        }
    }
}

/// Everything the renderer needs for one draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Board<'a> {
    Missing {
        key: String,
    },
    List {
        key: String,
        title_lines: Vec<String>,
        rows: Vec<EventRow<'a>>,
    },
    Detail {
        key: String,
        title_lines: Vec<String>,
        row: EventRow<'a>,
    },
}

impl Board<'_> {
    pub fn key(&self) -> &str {
        match self {
            Board::Missing { key } | Board::List { key, .. } | Board::Detail { key, .. } => key,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Board::List { rows, .. } => rows.len(),
            Board::Missing { .. } | Board::Detail { .. } => 0,
        }
    }
}

pub fn build_board<'a>(
    catalog: &'a Catalog,
    controller: &SelectionController,
    now: NaiveDateTime,
) -> Board<'a> {
    let key = controller.active_category().to_string();
    let Some(category) = catalog.lookup(&key) else {
        return Board::Missing { key };
    };
    let title_lines = wrap_title(&category.title);

    if let SelectionState::Showing(index) = controller.state() {
        if let Some(event) = controller.selected_event(category) {
            return Board::Detail {
                key,
                title_lines,
                row: EventRow::evaluate(index, event, now),
            };
        }
    }

    let rows = category
        .events
        .iter()
        .enumerate()
        .map(|(index, event)| EventRow::evaluate(index, event, now))
        .collect();

    Board::List {
        key,
        title_lines,
        rows,
    }
}
