//! The points-to lattice: per-value points-to sets plus the alias map
//! they induce through pointer-to-pointer stores.

use std::collections::BTreeMap;

use crate::analysis::fixed_point::JoinSemiLattice;
use crate::ir::{Cell, ValueId};

/// A set of cells a pointer-valued [`ValueId`] may refer to.
///
/// The lattice is the powerset of cells ordered by subset; `join` is
/// union. Finite height follows from the module having finitely many
/// cells, which bounds the worklist's iteration count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsToSet(std::collections::BTreeSet<Cell>);

impl PointsToSet {
    /// The empty points-to set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A points-to set containing exactly one cell.
    #[must_use]
    pub fn singleton(cell: Cell) -> Self {
        Self(std::iter::once(cell).collect())
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of cells in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the set's cells in a stable (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.0.iter().copied()
    }

    /// Whether this set is exactly one non-function-symbol cell — the
    /// condition under which a store performs a strong update rather
    /// than a weak one.
    #[must_use]
    pub fn is_strong_update_target(&self, is_function_cell: impl Fn(Cell) -> bool) -> bool {
        match self.0.len() {
            1 => {
                let only = *self.0.iter().next().expect("checked len == 1");
                !is_function_cell(only)
            }
            _ => false,
        }
    }

    /// The single cell in this set, if it has exactly one member.
    #[must_use]
    pub fn as_singleton(&self) -> Option<Cell> {
        let mut it = self.0.iter();
        let only = *it.next()?;
        it.next().is_none().then_some(only)
    }
}

impl FromIterator<Cell> for PointsToSet {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl PartialOrd for PointsToSet {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering::{Equal, Greater, Less};
        if self.0 == other.0 {
            Some(Equal)
        } else if self.0.is_subset(&other.0) {
            Some(Less)
        } else if other.0.is_subset(&self.0) {
            Some(Greater)
        } else {
            None
        }
    }
}

impl JoinSemiLattice for PointsToSet {
    fn join(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }
}

/// A map from entities (pointer values, or cells for aliasing) to the
/// points-to set they carry, with the "absent key means empty set"
/// convention held as an invariant: empty sets are never inserted, so
/// two maps compare equal regardless of which keys were ever touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsToMap<K: Ord>(BTreeMap<K, PointsToSet>);

impl<K: Ord + Clone> PointsToMap<K> {
    /// An empty map.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// The points-to set recorded for `key`, or the empty set if none.
    #[must_use]
    pub fn get(&self, key: &K) -> PointsToSet {
        self.0.get(key).cloned().unwrap_or_default()
    }

    /// Replaces the points-to set for `key` (a strong update).
    pub fn set(&mut self, key: K, value: PointsToSet) {
        if value.is_empty() {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    /// Unions `value` into the points-to set already recorded for
    /// `key` (a weak update).
    pub fn union_into(&mut self, key: K, value: PointsToSet) {
        if value.is_empty() {
            return;
        }
        let existing = self.0.remove(&key).unwrap_or_default();
        self.0.insert(key, existing.join(value));
    }

    /// Iterates the map's non-empty entries.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &PointsToSet)> {
        self.0.iter()
    }
}

impl<K: Ord + Clone> PartialOrd for PointsToMap<K> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        pointwise_cmp(&self.0, &other.0)
    }
}

impl<K: Ord + Clone> JoinSemiLattice for PointsToMap<K> {
    fn join(mut self, other: Self) -> Self {
        for (key, value) in other.0 {
            self.union_into(key, value);
        }
        self
    }
}

/// Compares two maps pointwise, where an absent key stands for the
/// bottom value (the empty [`PointsToSet`]). Shared by both
/// [`PointsToMap`] instantiations below.
fn pointwise_cmp<K: Ord + Clone>(
    lhs: &BTreeMap<K, PointsToSet>,
    rhs: &BTreeMap<K, PointsToSet>,
) -> Option<std::cmp::Ordering> {
    use std::cmp::Ordering::{Equal, Greater, Less};

    let mut seen_less = false;
    let mut seen_greater = false;

    let keys = lhs.keys().chain(rhs.keys()).cloned().collect::<std::collections::BTreeSet<_>>();
    for key in keys {
        let l = lhs.get(&key).cloned().unwrap_or_default();
        let r = rhs.get(&key).cloned().unwrap_or_default();
        match l.partial_cmp(&r) {
            Some(Less) => seen_less = true,
            Some(Greater) => seen_greater = true,
            Some(Equal) => {}
            None => return None,
        }
        if seen_less && seen_greater {
            return None;
        }
    }

    match (seen_less, seen_greater) {
        (false, false) => Some(Equal),
        (true, false) => Some(Less),
        (false, true) => Some(Greater),
        (true, true) => None,
    }
}

/// The dataflow fact carried between basic blocks: the points-to map
/// for every SSA value live at this program point, plus the alias map
/// those pointers induce.
///
/// Deliberately excludes the callee's return summary — per the
/// call-by-call-site re-architecture, a [`super::ReturnSummary`] is
/// consumed once, immediately after the callee's own fixed point is
/// solved, and never becomes part of the propagated per-block fact
/// (it would otherwise have to be joined across every call site to the
/// same function, conflating unrelated calls).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatticeValue {
    points_to: PointsToMap<ValueId>,
    alias: PointsToMap<Cell>,
}

impl LatticeValue {
    /// The empty fact: no value points anywhere, no cell aliases
    /// anywhere.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the entry fact for a callee's own fixed point: its formal
    /// parameters bound to the points-to sets of the arguments at the
    /// call site, and the caller's alias map carried over so the callee
    /// sees memory already aliased by the time it is entered.
    #[must_use]
    pub fn seed_for_call(
        params: impl IntoIterator<Item = (ValueId, PointsToSet)>,
        inherited_alias: PointsToMap<Cell>,
    ) -> Self {
        let mut points_to = PointsToMap::empty();
        for (param, targets) in params {
            points_to.set(param, targets);
        }
        Self {
            points_to,
            alias: inherited_alias,
        }
    }

    /// This fact's alias map, to carry into a callee or fold into a
    /// [`ReturnSummary`].
    #[must_use]
    pub fn alias_map(&self) -> &PointsToMap<Cell> {
        &self.alias
    }

    /// The points-to set of `value`.
    #[must_use]
    pub fn points_to(&self, value: ValueId) -> PointsToSet {
        self.points_to.get(&value)
    }

    /// Replaces the points-to set of `value` (strong update).
    pub fn set_points_to(&mut self, value: ValueId, targets: PointsToSet) {
        self.points_to.set(value, targets);
    }

    /// Unions `targets` into the points-to set of `value` (weak
    /// update).
    pub fn union_points_to(&mut self, value: ValueId, targets: PointsToSet) {
        self.points_to.union_into(value, targets);
    }

    /// The set of cells `cell` may alias (what a load through `cell`
    /// may yield, when `cell` itself holds a pointer value).
    #[must_use]
    pub fn alias_of(&self, cell: Cell) -> PointsToSet {
        self.alias.get(&cell)
    }

    /// Replaces the alias set of `cell` (strong update).
    pub fn set_alias(&mut self, cell: Cell, targets: PointsToSet) {
        self.alias.set(cell, targets);
    }

    /// Unions `targets` into the alias set of `cell` (weak update).
    pub fn union_alias(&mut self, cell: Cell, targets: PointsToSet) {
        self.alias.union_into(cell, targets);
    }

    /// Iterates every value with a non-empty points-to set.
    pub fn points_to_entries(&self) -> impl Iterator<Item = (&ValueId, &PointsToSet)> {
        self.points_to.iter()
    }

    /// Iterates every cell with a non-empty alias set.
    pub fn alias_entries(&self) -> impl Iterator<Item = (&Cell, &PointsToSet)> {
        self.alias.iter()
    }

    /// Replaces this fact's entire alias map with `new`, the accumulated
    /// alias map of every callee invoked at a call site. Per the call
    /// transfer's context-propagation semantics, the caller does not see
    /// its pre-call aliasing blended with the callee's: the callee was
    /// seeded with the caller's alias map as its own starting point, so
    /// whatever it returns already is the caller's view plus the
    /// callee's writes, strong updates included.
    pub fn replace_alias_map(&mut self, new: PointsToMap<Cell>) {
        self.alias = new;
    }
}

impl PartialOrd for LatticeValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering::Equal;
        match (
            self.points_to.partial_cmp(&other.points_to),
            self.alias.partial_cmp(&other.alias),
        ) {
            (Some(a), Some(b)) => {
                if a == Equal {
                    Some(b)
                } else if b == Equal || a == b {
                    Some(a)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl JoinSemiLattice for LatticeValue {
    fn join(self, other: Self) -> Self {
        Self {
            points_to: self.points_to.join(other.points_to),
            alias: self.alias.join(other.alias),
        }
    }
}

/// What a function's fixed point leaves behind for its caller to
/// absorb at the call site, once solved: the union of cells reachable
/// through its `return` instructions, and the alias map it accumulated
/// internally.
///
/// Not a lattice fact propagated through the worklist — a plain
/// out-parameter the points-to transfer threads through a recursive
/// [`crate::analysis::fixed_point::solve`] call and reads exactly once.
#[derive(Debug, Clone, Default)]
pub struct ReturnSummary {
    returned: PointsToSet,
    alias: PointsToMap<Cell>,
}

impl ReturnSummary {
    /// An empty summary (a function with no `return value` statement).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Folds in the points-to set returned along one control-flow path.
    pub fn record_return(&mut self, targets: PointsToSet) {
        self.returned = std::mem::take(&mut self.returned).join(targets);
    }

    /// Folds in the alias map accumulated at one control-flow exit.
    pub fn record_alias(&mut self, alias: &PointsToMap<Cell>) {
        for (cell, set) in alias.iter() {
            self.alias.union_into(*cell, set.clone());
        }
    }

    /// The union of cells reachable through any `return` in the
    /// function.
    #[must_use]
    pub fn returned_cells(&self) -> &PointsToSet {
        &self.returned
    }

    /// The alias map accumulated by the callee.
    #[must_use]
    pub fn alias_map(&self) -> &PointsToMap<Cell> {
        &self.alias
    }
}
