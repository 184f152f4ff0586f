use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    Named,
    Sequential,
}

/// One roster entry bound to one layout slot for a single render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub entry_index: usize,
    pub entry: RosterEntry,
    pub slot_index: usize,
    pub binding: Binding,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlacementReport {
    /// Ordered by slot index.
    pub placements: Vec<Placement>,
    pub empty_slots: Vec<usize>,
    /// Canonical indices of entries that did not fit into the layout.
    pub unplaced: Vec<usize>,
}

impl PlacementReport {
    pub fn for_slot(&self, slot_index: usize) -> Option<&Placement> {
        self.placements
            .binary_search_by_key(&slot_index, |p| p.slot_index)
            .ok()
            .map(|idx| &self.placements[idx])
    }

    pub fn for_entry(&self, entry_index: usize) -> Option<&Placement> {
        self.placements.iter().find(|p| p.entry_index == entry_index)
    }
}

/// Binds entries to slots: slots whose id names an entry take that entry
/// first, then the remaining slots take the remaining entries in order.
pub fn place_entries(entries: &[RosterEntry], slots: &[Slot]) -> PlacementReport {
    let mut by_key: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        by_key
            .entry(entry.normalized_key.as_str())
            .or_default()
            .push_back(idx);
    }

    let mut slot_binding: Vec<Option<(usize, Binding)>> = vec![None; slots.len()];
    let mut placed = vec![false; entries.len()];

    for (slot_idx, slot) in slots.iter().enumerate() {
        let Some(key) = slot.match_key() else {
            continue;
        };
        let Some(queue) = by_key.get_mut(key.as_str()) else {
            continue;
        };
        if let Some(entry_idx) = queue.pop_front() {
            placed[entry_idx] = true;
            slot_binding[slot_idx] = Some((entry_idx, Binding::Named));
        }
    }

    let mut remaining = (0..entries.len()).filter(|idx| !placed[*idx]);
    for binding in slot_binding.iter_mut().filter(|b| b.is_none()) {
        let Some(entry_idx) = remaining.next() else {
            break;
        };
        *binding = Some((entry_idx, Binding::Sequential));
    }
    let unplaced: Vec<usize> = remaining.collect();

    let mut report = PlacementReport {
        unplaced,
        ..Default::default()
    };
    for (slot_idx, binding) in slot_binding.into_iter().enumerate() {
        match binding {
            Some((entry_idx, binding)) => report.placements.push(Placement {
                entry_index: entry_idx,
                entry: entries[entry_idx].clone(),
                slot_index: slot_idx,
                binding,
            }),
            None => report.empty_slots.push(slot_idx),
        }
    }

    if !report.unplaced.is_empty() {
        tracing::warn!(
            unplaced = report.unplaced.len(),
            slots = slots.len(),
            entries = entries.len(),
            "layout has fewer seats than roster entries"
        );
    }
    tracing::debug!(
        placed = report.placements.len(),
        empty = report.empty_slots.len(),
        "placement computed"
    );

    report
}
