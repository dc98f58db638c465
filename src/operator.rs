/**
 * Parsify, a simple recursive descent parser generator.
 * Copyright (C) 2024  Eduardo Ibarra
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::collections::HashSet;
use std::rc::Rc;

use crate::error::BursError;
use crate::hyperplane::HyperPlaneArena;
use crate::lang::{LErr, Lang};
use crate::production::PatternMatcher;
use crate::representer_state::RepresenterState;
use crate::state::State;

// arity is the declared dimension count from the patterns, not necessarily
// the number of children an actual tree node has: a variadic operator's
// HyperPlane self-loops its final dimension to absorb extra operands.
pub struct Operator<L: Lang> {
    pub node_type: L::NodeType,
    pub arity: usize,
    pub is_var_args: bool,
    pub(crate) patterns: Vec<Rc<PatternMatcher<L>>>,
    pub(crate) reps: Vec<HashSet<Rc<RepresenterState<L>>>>,
    pub(crate) transitions: HyperPlaneArena<L>,
    pub leaf_state: Option<Rc<State<L>>>,
}

impl<L: Lang> Operator<L> {
    pub fn new(node_type: L::NodeType, arity: usize, is_var_args: bool) -> Self {
        Operator {
            node_type,
            arity,
            is_var_args,
            patterns: Vec::new(),
            reps: (0..arity).map(|_| HashSet::new()).collect(),
            transitions: HyperPlaneArena::new(),
            leaf_state: None,
        }
    }

    pub fn add_transition(&mut self, child_states: &[Rc<RepresenterState<L>>], result: Rc<State<L>>) {
        debug_assert_eq!(child_states.len(), self.arity);
        self.transitions.add(child_states, result);
    }

    // Beyond the declared arity, variadic operators keep reusing the final dimension.
    fn dim_for(&self, i: usize) -> usize {
        if self.arity == 0 {
            0
        } else {
            i.min(self.arity - 1)
        }
    }

    // Each state belongs to at most one representer per dimension by construction.
    pub fn representer_state(&self, child_state_number: i64, i: usize) -> Result<Rc<RepresenterState<L>>, LErr<L>> {
        let dim = self.dim_for(i);
        self.reps[dim]
            .iter()
            .find(|rs| rs.contains_state_number(child_state_number))
            .cloned()
            .ok_or_else(|| BursError::MissingTransition {
                node_type: self.node_type.clone(),
                dim,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct TestLang;
    impl Lang for TestLang {
        type Nonterminal = String;
        type NodeType = String;
        type Node = crate::sample_tree::SampleTree;
        type Visitor = ();
        type Output = i64;
    }

    fn rep_containing(op: &mut Operator<TestLang>, dim: usize, state_number: i64) {
        let mut s = State::<TestLang>::new(None);
        s.number = state_number;
        let rs = Rc::new(RepresenterState::<TestLang>::new("Num".to_string(), BTreeMap::new()));
        rs.record(Rc::new(s));
        op.reps[dim].insert(rs);
    }

    #[test]
    fn representer_state_finds_the_dimension_containing_the_child() {
        let mut op = Operator::<TestLang>::new("Add".to_string(), 2, false);
        rep_containing(&mut op, 0, 10);
        rep_containing(&mut op, 1, 20);

        assert!(op.representer_state(10, 0).is_ok());
        assert!(op.representer_state(20, 1).is_ok());
        assert!(op.representer_state(10, 1).is_err());
    }

    #[test]
    fn var_args_operand_positions_clamp_to_the_final_dimension() {
        let mut op = Operator::<TestLang>::new("List".to_string(), 1, true);
        rep_containing(&mut op, 0, 5);

        assert!(op.representer_state(5, 0).is_ok());
        assert!(op.representer_state(5, 1).is_ok());
        assert!(op.representer_state(5, 7).is_ok());
    }
}
