use crate::connector::{Connector, SupplierRegistry};
use crate::fixed::Fixed64;
use crate::id::{JointId, LineId, ResourceTypeId, StructureId};
use std::collections::HashMap;

/// Upper bound on fair-share rounds per request. Bounds worst-case cost at
/// `GATHER_ROUNDS * candidates` ask-callback invocations.
pub const GATHER_ROUNDS: usize = 5;

/// A request being gathered across a line's output connectors.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GatherRequest {
    pub resource: ResourceTypeId,
    pub amount: Fixed64,
    /// The input connector doing the asking; excluded from candidates.
    pub requester: JointId,
    /// The requester's owning structure; its own outputs are excluded.
    pub owner: StructureId,
}

/// A connected component of the joint graph.
///
/// Membership is a flat, directly-iterable collection so the fair-share
/// protocol enumerates every connector in O(members) with no indirection;
/// the trade-off is O(members) merge, acceptable at the cadence of discrete
/// placement actions.
#[derive(Debug, Clone)]
pub struct Line {
    id: LineId,
    joints: Vec<JointId>,
    connectors: Vec<JointId>,
}

impl Line {
    pub(crate) fn new(id: LineId) -> Self {
        Self {
            id,
            joints: Vec::new(),
            connectors: Vec::new(),
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    /// Plain-joint members (routing only, not resource endpoints).
    pub fn joints(&self) -> &[JointId] {
        &self.joints
    }

    /// Connector members.
    pub fn connectors(&self) -> &[JointId] {
        &self.connectors
    }

    pub fn member_count(&self) -> usize {
        self.joints.len() + self.connectors.len()
    }

    pub fn contains(&self, id: JointId) -> bool {
        self.joints.contains(&id) || self.connectors.contains(&id)
    }

    /// Register a plain joint. Re-adding an existing member is a no-op.
    pub(crate) fn add_joint(&mut self, id: JointId) {
        if !self.joints.contains(&id) {
            self.joints.push(id);
        }
    }

    /// Register a connector. Re-adding an existing member is a no-op.
    pub(crate) fn add_connector(&mut self, id: JointId) {
        if !self.connectors.contains(&id) {
            self.connectors.push(id);
        }
    }

    /// Strip this line of all members, for a merge into another line.
    pub(crate) fn into_members(self) -> (Vec<JointId>, Vec<JointId>) {
        (self.joints, self.connectors)
    }

    /// The fair-share protocol: split the request evenly among eligible
    /// output connectors, re-dividing the remaining deficit against the same
    /// candidate set for up to [`GATHER_ROUNDS`] rounds.
    ///
    /// Candidates that already surrendered everything they had simply return
    /// zero in later rounds; the producer's own throttling guarantees it
    /// never over-grants. Returns the gathered amount in
    /// `[0, request.amount]`; shortfall is a normal outcome, not an error.
    pub(crate) fn gather(
        &self,
        request: GatherRequest,
        connectors: &HashMap<JointId, Connector>,
        suppliers: &mut SupplierRegistry,
    ) -> Fixed64 {
        let candidates: Vec<(JointId, Fixed64)> = self
            .connectors
            .iter()
            .filter_map(|id| {
                let connector = connectors.get(id)?;
                let eligible = connector.role().supplies()
                    && connector.is_live()
                    && connector.accepts_resource(request.resource)
                    && *id != request.requester
                    && connector.owner() != request.owner
                    && suppliers.is_bound(*id);
                eligible.then(|| (*id, connector.flow_limit()))
            })
            .collect();
        if candidates.is_empty() {
            return Fixed64::ZERO;
        }

        let divisor = Fixed64::from_num(candidates.len() as u32);
        let mut gathered = Fixed64::ZERO;
        for _ in 0..GATHER_ROUNDS {
            let share = (request.amount - gathered) / divisor;
            for (id, flow_limit) in &candidates {
                let asked = share.min(*flow_limit);
                let granted = suppliers.ask(*id, asked);
                gathered += granted.clamp(Fixed64::ZERO, asked);
            }
            if gathered >= request.amount {
                break;
            }
        }
        gathered.min(request.amount)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectorRole;
    use crate::test_utils::{energy, fixed, owner, pooled_supplier, water};

    fn output(resource: ResourceTypeId, owner: StructureId, limit: f64) -> Connector {
        let mut c = Connector::new(resource, ConnectorRole::Output, fixed(limit), owner);
        c.activate();
        c
    }

    fn input(resource: ResourceTypeId, owner: StructureId, limit: f64) -> Connector {
        let mut c = Connector::new(resource, ConnectorRole::Input, fixed(limit), owner);
        c.activate();
        c
    }

    struct Bench {
        line: Line,
        connectors: HashMap<JointId, Connector>,
        suppliers: SupplierRegistry,
    }

    impl Bench {
        fn new() -> Self {
            Self {
                line: Line::new(LineId(0)),
                connectors: HashMap::new(),
                suppliers: SupplierRegistry::new(),
            }
        }

        fn add(&mut self, id: u64, connector: Connector) -> JointId {
            let id = JointId(id);
            self.line.add_connector(id);
            self.connectors.insert(id, connector);
            id
        }

        fn gather(&mut self, request: GatherRequest) -> Fixed64 {
            self.line
                .gather(request, &self.connectors, &mut self.suppliers)
        }
    }

    fn request_from(requester: JointId, who: StructureId, amount: f64) -> GatherRequest {
        GatherRequest {
            resource: energy(),
            amount: fixed(amount),
            requester,
            owner: who,
        }
    }

    // -----------------------------------------------------------------------
    // Fair-share: two outputs able to cover their shares deliver in round 1
    // -----------------------------------------------------------------------
    #[test]
    fn even_split_completes_in_first_round() {
        let mut bench = Bench::new();
        let asker = bench.add(1, input(energy(), owner(1), 1000.0));
        let a = bench.add(2, output(energy(), owner(2), 1000.0));
        let b = bench.add(3, output(energy(), owner(3), 1000.0));
        let (pool_a, cb_a) = pooled_supplier(60.0);
        let (pool_b, cb_b) = pooled_supplier(60.0);
        bench.suppliers.bind(a, cb_a);
        bench.suppliers.bind(b, cb_b);

        let got = bench.gather(request_from(asker, owner(1), 100.0));

        assert_eq!(got, fixed(100.0));
        // Each was asked for its 50-share exactly once.
        assert_eq!(*pool_a.borrow(), fixed(10.0));
        assert_eq!(*pool_b.borrow(), fixed(10.0));
    }

    // -----------------------------------------------------------------------
    // Shortfall: exhausted producers converge below the request within 5 rounds
    // -----------------------------------------------------------------------
    #[test]
    fn shortfall_converges_to_total_capacity() {
        let mut bench = Bench::new();
        let asker = bench.add(1, input(energy(), owner(1), 1000.0));
        let a = bench.add(2, output(energy(), owner(2), 1000.0));
        let b = bench.add(3, output(energy(), owner(3), 1000.0));
        let (pool_a, cb_a) = pooled_supplier(30.0);
        let (pool_b, cb_b) = pooled_supplier(30.0);
        bench.suppliers.bind(a, cb_a);
        bench.suppliers.bind(b, cb_b);

        let got = bench.gather(request_from(asker, owner(1), 100.0));

        assert_eq!(got, fixed(60.0));
        assert_eq!(*pool_a.borrow(), Fixed64::ZERO);
        assert_eq!(*pool_b.borrow(), Fixed64::ZERO);
    }

    // -----------------------------------------------------------------------
    // Uneven pools: later rounds let surplus producers cover the deficit
    // -----------------------------------------------------------------------
    #[test]
    fn surplus_producer_covers_deficit_in_later_rounds() {
        let mut bench = Bench::new();
        let asker = bench.add(1, input(energy(), owner(1), 1000.0));
        let a = bench.add(2, output(energy(), owner(2), 1000.0));
        let b = bench.add(3, output(energy(), owner(3), 1000.0));
        // One poor producer, one with plenty.
        let (_, cb_a) = pooled_supplier(10.0);
        let (_, cb_b) = pooled_supplier(1000.0);
        bench.suppliers.bind(a, cb_a);
        bench.suppliers.bind(b, cb_b);

        let got = bench.gather(request_from(asker, owner(1), 100.0));

        // Round 1: 50 + 10. Round 2: deficit 40, shares 20 + 20, only b pays.
        // Rounds 3..5 keep halving the deficit against the same set; the
        // result lands short of 100 but well past a single-pass 60.
        assert!(got > fixed(60.0));
        assert!(got <= fixed(100.0));
    }

    // -----------------------------------------------------------------------
    // Candidate filtering
    // -----------------------------------------------------------------------
    #[test]
    fn no_candidates_returns_zero() {
        let mut bench = Bench::new();
        let asker = bench.add(1, input(energy(), owner(1), 1000.0));
        let got = bench.gather(request_from(asker, owner(1), 100.0));
        assert_eq!(got, Fixed64::ZERO);
    }

    #[test]
    fn own_structure_outputs_are_never_asked() {
        let mut bench = Bench::new();
        let asker = bench.add(1, input(energy(), owner(1), 1000.0));
        let own = bench.add(2, output(energy(), owner(1), 1000.0));
        let (pool, cb) = pooled_supplier(500.0);
        bench.suppliers.bind(own, cb);

        let got = bench.gather(request_from(asker, owner(1), 100.0));

        assert_eq!(got, Fixed64::ZERO);
        assert_eq!(*pool.borrow(), fixed(500.0));
    }

    #[test]
    fn requester_is_excluded_even_with_both_role() {
        let mut bench = Bench::new();
        let mut both = Connector::new(energy(), ConnectorRole::Both, fixed(1000.0), owner(1));
        both.activate();
        let asker = bench.add(1, both);
        let (_, cb) = pooled_supplier(500.0);
        bench.suppliers.bind(asker, cb);

        let got = bench.gather(request_from(asker, owner(9), 100.0));

        assert_eq!(got, Fixed64::ZERO);
    }

    #[test]
    fn wrong_resource_type_is_filtered_out() {
        let mut bench = Bench::new();
        let asker = bench.add(1, input(energy(), owner(1), 1000.0));
        let out = bench.add(2, output(water(), owner(2), 1000.0));
        let (_, cb) = pooled_supplier(500.0);
        bench.suppliers.bind(out, cb);

        let got = bench.gather(request_from(asker, owner(1), 100.0));

        assert_eq!(got, Fixed64::ZERO);
    }

    #[test]
    fn latent_and_input_connectors_are_not_candidates() {
        let mut bench = Bench::new();
        let asker = bench.add(1, input(energy(), owner(1), 1000.0));
        // Latent output: never activated.
        let latent = bench.add(2, Connector::new(energy(), ConnectorRole::Output, fixed(100.0), owner(2)));
        // A live input is not a supplier.
        let other_input = bench.add(3, input(energy(), owner(3), 1000.0));
        let (_, cb_a) = pooled_supplier(500.0);
        let (_, cb_b) = pooled_supplier(500.0);
        bench.suppliers.bind(latent, cb_a);
        bench.suppliers.bind(other_input, cb_b);

        let got = bench.gather(request_from(asker, owner(1), 100.0));

        assert_eq!(got, Fixed64::ZERO);
    }

    // -----------------------------------------------------------------------
    // Flow limit
    // -----------------------------------------------------------------------
    #[test]
    fn flow_limit_caps_each_ask() {
        let mut bench = Bench::new();
        let asker = bench.add(1, input(energy(), owner(1), 1000.0));
        // Plenty in the pool, but only 5 may move per ask.
        let out = bench.add(2, output(energy(), owner(2), 5.0));
        let (_, cb) = pooled_supplier(1000.0);
        bench.suppliers.bind(out, cb);

        let got = bench.gather(request_from(asker, owner(1), 100.0));

        // 5 per round, 5 rounds.
        assert_eq!(got, fixed(25.0));
    }

    #[test]
    fn zero_flow_limit_moves_nothing() {
        let mut bench = Bench::new();
        let asker = bench.add(1, input(energy(), owner(1), 1000.0));
        let out = bench.add(2, output(energy(), owner(2), 0.0));
        let (_, cb) = pooled_supplier(1000.0);
        bench.suppliers.bind(out, cb);

        let got = bench.gather(request_from(asker, owner(1), 100.0));

        assert_eq!(got, Fixed64::ZERO);
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------
    #[test]
    fn membership_adds_are_idempotent() {
        let mut line = Line::new(LineId(7));
        line.add_joint(JointId(1));
        line.add_joint(JointId(1));
        line.add_connector(JointId(2));
        line.add_connector(JointId(2));
        assert_eq!(line.member_count(), 2);
        assert!(line.contains(JointId(1)));
        assert!(line.contains(JointId(2)));
        assert!(!line.contains(JointId(3)));
    }

    #[test]
    fn into_members_strips_everything() {
        let mut line = Line::new(LineId(7));
        line.add_joint(JointId(1));
        line.add_connector(JointId(2));
        let (joints, connectors) = line.into_members();
        assert_eq!(joints, vec![JointId(1)]);
        assert_eq!(connectors, vec![JointId(2)]);
    }
}
