//! Cost and metrics accounting.
//!
//! All arithmetic is integer. Averages are reported as fixed-point values
//! scaled by [`SCALE`] and rounded toward zero.

use crate::atom::AtomKind;
use crate::operator::OperatorKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fixed-point scale of reported averages.
pub const SCALE: u64 = 1_000_000;

/// Static cost per mech.
pub const MECH_COST: u64 = 150;

/// Static cost per program instruction.
pub const INSTRUCTION_COST: u64 = 0;

/// Dynamic cost of one successful engage or release.
pub const HANDLING_COST: u64 = 1;

// ---------------------------------------------------------------------------
// Static cost
// ---------------------------------------------------------------------------

/// Configuration-only cost: mechs, instructions, and the placement cost of
/// every operator.
pub fn static_cost(mech_count: usize, instruction_count: usize, kinds: &[OperatorKind]) -> u64 {
    let operators: u64 = kinds.iter().map(|k| k.recipe().static_cost).sum();
    MECH_COST * mech_count as u64 + INSTRUCTION_COST * instruction_count as u64 + operators
}

/// `total * SCALE / max(count, 1)`, rounded toward zero and saturating.
pub fn scaled_average(total: u64, count: u64) -> u64 {
    let scaled = total as u128 * SCALE as u128 / count.max(1) as u128;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Running metrics
// ---------------------------------------------------------------------------

/// Accumulators carried through a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Atoms accepted by a sink.
    pub delivered: u64,
    /// Atoms removed by a sink that did not accept their kind.
    pub discarded: u64,
    /// Atoms emitted by faucets, priming included.
    pub spawned: u64,
    /// Sum of handling and operator costs. Never decreases.
    pub dynamic_cost: u64,
    /// Sum of per-delivery latencies.
    pub latency: u64,
    /// Frame boundary (`frame + 1`) of the latest delivery, 0 before any.
    pub last_delivery: u64,
    /// [`AtomKind::mass`] totals of the three counters above.
    pub spawned_mass: u64,
    pub delivered_mass: u64,
    pub discarded_mass: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn charge(&mut self, amount: u64) {
        self.dynamic_cost = self.dynamic_cost.saturating_add(amount);
    }

    pub fn record_spawn(&mut self, kind: AtomKind) {
        self.spawned += 1;
        self.spawned_mass += kind.mass() as u64;
    }

    pub fn record_discard(&mut self, kind: AtomKind) {
        self.discarded += 1;
        self.discarded_mass += kind.mass() as u64;
    }

    /// Count a delivery made during `frame` and return its latency: the
    /// frames elapsed since the previous delivery, or since the start of the
    /// run, counting `frame` itself.
    pub fn record_delivery(&mut self, frame: u64, kind: AtomKind) -> u64 {
        let boundary = frame + 1;
        let latency = boundary - self.last_delivery;
        self.delivered += 1;
        self.delivered_mass += kind.mass() as u64;
        self.latency += latency;
        self.last_delivery = boundary;
        latency
    }

    /// Mean latency per delivery, scaled by [`SCALE`].
    pub fn average_latency(&self) -> u64 {
        scaled_average(self.latency, self.delivered)
    }

    /// Mean dynamic cost per delivery, scaled by [`SCALE`].
    pub fn average_dynamic_cost(&self) -> u64 {
        scaled_average(self.dynamic_cost, self.delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_cost_of_scenario_layouts() {
        use OperatorKind::*;
        let kinds = [Stir, Stir, Shake, Steam, Smash];
        assert_eq!(static_cost(8, 84, &kinds), 3950);
        assert_eq!(static_cost(7, 120, &kinds), 3800);
    }

    #[test]
    fn static_cost_ignores_instruction_count() {
        assert_eq!(static_cost(1, 1, &[]), static_cost(1, 500, &[]));
    }

    #[test]
    fn scaled_average_truncates() {
        assert_eq!(scaled_average(46, 1), 46_000_000);
        assert_eq!(scaled_average(64, 2), 32_000_000);
        assert_eq!(scaled_average(10, 3), 3_333_333);
    }

    #[test]
    fn scaled_average_with_no_deliveries_uses_one() {
        assert_eq!(scaled_average(7, 0), 7_000_000);
        assert_eq!(scaled_average(0, 0), 0);
    }

    #[test]
    fn scaled_average_saturates() {
        assert_eq!(scaled_average(u64::MAX, 1), u64::MAX);
    }

    #[test]
    fn delivery_latency_counts_since_previous_delivery() {
        let mut m = Metrics::new();
        assert_eq!(m.record_delivery(45, AtomKind::Saffron), 46);
        assert_eq!(m.record_delivery(63, AtomKind::Saffron), 18);
        assert_eq!(m.delivered, 2);
        assert_eq!(m.latency, 64);
        assert_eq!(m.average_latency(), 32_000_000);
        assert_eq!(m.delivered_mass, 10);
    }

    #[test]
    fn mass_follows_atom_kind() {
        let mut m = Metrics::new();
        m.record_spawn(AtomKind::Truffle);
        m.record_delivery(3, AtomKind::Vanilla);
        m.record_discard(AtomKind::Saffron);
        assert_eq!((m.spawned, m.delivered, m.discarded), (1, 1, 1));
        assert_eq!((m.spawned_mass, m.delivered_mass, m.discarded_mass), (9, 1, 5));
    }

    #[test]
    fn charge_accumulates() {
        let mut m = Metrics::new();
        m.charge(HANDLING_COST);
        m.charge(25);
        assert_eq!(m.dynamic_cost, 26);
        assert_eq!(m.average_dynamic_cost(), 26_000_000);
    }
}
