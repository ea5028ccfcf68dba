use crate::catalog::{Category, EventRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    None,
    Showing(usize),
}

/// Tracks which event of the active category is open in detail view.
///
/// Changing category always drops the open event, so a selection never
/// outlives the list it was made from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionController {
    active_category: String,
    state: SelectionState,
}

impl SelectionController {
    pub fn new(category_key: impl Into<String>) -> Self {
        Self {
            active_category: category_key.into(),
            state: SelectionState::None,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn select(&mut self, event_index: usize) {
        self.state = SelectionState::Showing(event_index);
    }

    pub fn deselect(&mut self) {
        self.state = SelectionState::None;
    }

    pub fn category_changed(&mut self, category_key: impl Into<String>) {
        self.active_category = category_key.into();
        self.state = SelectionState::None;
    }

    pub fn selected_event<'a>(&self, category: &'a Category) -> Option<&'a EventRecord> {
        match self.state {
            SelectionState::None => None,
            SelectionState::Showing(index) => category.events.get(index),
        }
    }
}
