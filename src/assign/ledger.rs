use std::collections::BTreeMap;

use crate::team::TeamMember;

#[derive(Debug, Clone, PartialEq)]
pub struct MemberLoad {
    pub capacity_hours: f64,
    pub available_hours: f64,
    pub open_assignments: usize,
    pub assigned_this_run: usize,
}

/// Per-run capacity counters, derived from the roster but never written
/// back to it. One writer: the engine's commit step.
#[derive(Debug, Clone, Default)]
pub struct CapacityLedger {
    loads: BTreeMap<String, MemberLoad>,
}

impl CapacityLedger {
    pub fn new(members: &[TeamMember]) -> Self {
        let loads = members
            .iter()
            .map(|m| {
                (
                    m.id.clone(),
                    MemberLoad {
                        capacity_hours: m.capacity_hours,
                        available_hours: m.available_hours(),
                        open_assignments: m.current_assignments.len(),
                        assigned_this_run: 0,
                    },
                )
            })
            .collect();
        Self { loads }
    }

    pub fn load(&self, member: &str) -> Option<&MemberLoad> {
        self.loads.get(member)
    }

    /// Mean open assignments across the team.
    pub fn average_open(&self) -> f64 {
        if self.loads.is_empty() {
            return 0.0;
        }
        let total: usize = self.loads.values().map(|l| l.open_assignments).sum();
        total as f64 / self.loads.len() as f64
    }

    /// Consume `hours` for `member`. Available hours floor at zero, so an
    /// over-capacity assignment leaves the member fully booked.
    pub fn commit(&mut self, member: &str, hours: f64) {
        if let Some(l) = self.loads.get_mut(member) {
            l.available_hours = (l.available_hours - hours.max(0.0)).max(0.0);
            l.open_assignments += 1;
            l.assigned_this_run += 1;
        }
    }

    /// Assignments made this run, per member, including members with none.
    pub fn assigned_counts(&self) -> BTreeMap<String, usize> {
        self.loads
            .iter()
            .map(|(id, l)| (id.clone(), l.assigned_this_run))
            .collect()
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
