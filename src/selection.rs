use crate::roster::Roster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    OneSelected(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Out-of-range seat, or selection is disabled.
    Ignored,
    /// First seat marked; waiting for the second.
    Selected(usize),
    /// Two clicks completed and the roster swap was applied.
    Swapped { first: usize, second: usize },
}

/// Two-click swap protocol over canonical roster indices.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn first(&self) -> Option<usize> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::OneSelected(first) => Some(first),
        }
    }

    pub fn clear(&mut self) {
        self.state = SelectionState::Idle;
    }

    /// Clicking the already selected seat again commits a self-swap, which
    /// leaves the roster as is and clears the selection.
    pub fn click(&mut self, index: usize, roster: &mut Roster) -> SelectionOutcome {
        if index >= roster.len() {
            return SelectionOutcome::Ignored;
        }
        match self.state {
            SelectionState::Idle => {
                self.state = SelectionState::OneSelected(index);
                SelectionOutcome::Selected(index)
            }
            SelectionState::OneSelected(first) => {
                self.state = SelectionState::Idle;
                if !roster.swap(first, index) {
                    return SelectionOutcome::Ignored;
                }
                SelectionOutcome::Swapped {
                    first,
                    second: index,
                }
            }
        }
    }
}
