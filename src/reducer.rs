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

use std::rc::Rc;

use log::{debug, error, trace};

use crate::error::BursError;
use crate::lang::{LErr, Lang};
use crate::operator::Operator;
use crate::production::Closure;
use crate::state::Production;
use crate::table::ProductionTable;

// No state assigned yet. Valid state numbers start at 1.
pub const UNLABELED: i64 = 0;

// set_state_number takes &self: the state slot is expected to be
// interior-mutable (e.g. a Cell), so label can walk a shared &L::Node.
pub trait InputNode {
    type NodeType: Clone + Eq + std::hash::Hash + Ord + std::fmt::Debug;

    fn node_type(&self) -> Self::NodeType;
    fn subtree_count(&self) -> usize;
    fn subtree(&self, i: usize) -> &Self;
    fn state_number(&self) -> i64;
    fn set_state_number(&self, n: i64);
}

// Stateless: any number of Reducers may share one frozen ProductionTable.
pub struct Reducer<'t, L: Lang> {
    table: &'t ProductionTable<L>,
}

impl<'t, L: Lang> Reducer<'t, L> {
    pub fn new(table: &'t ProductionTable<L>) -> Self {
        Reducer { table }
    }

    pub fn label(&self, node: &L::Node) {
        let child_count = node.subtree_count();
        for i in 0..child_count {
            self.label(node.subtree(i));
        }

        let node_type = node.node_type();
        let op = match self.resolve_operator(&node_type, child_count) {
            Some(op) => op,
            None => {
                trace!("no operator for {node_type:?}/{child_count}; leaving unlabeled");
                node.set_state_number(UNLABELED);
                return;
            }
        };

        if child_count == 0 {
            let number = op.leaf_state.as_ref().map(|s| s.number).unwrap_or(UNLABELED);
            trace!("labeled leaf {node_type:?} -> state {number}");
            node.set_state_number(number);
            return;
        }

        match self.walk_hyperplane(op, node) {
            Ok(number) => {
                trace!("labeled {node_type:?} -> state {number}");
                node.set_state_number(number);
            }
            Err(_) => {
                trace!("no transition for {node_type:?}/{child_count}; leaving unlabeled");
                node.set_state_number(UNLABELED);
            }
        }
    }

    fn resolve_operator(&self, node_type: &L::NodeType, child_count: usize) -> Option<&'t Operator<L>> {
        if let Some(op) = self.table.get_operator(node_type, child_count) {
            return Some(op);
        }
        self.table.find_var_args_operator(node_type, child_count)
    }

    fn walk_hyperplane(&self, op: &Operator<L>, node: &L::Node) -> Result<i64, LErr<L>> {
        let child_count = node.subtree_count();
        let mut plane = crate::hyperplane::HyperPlaneArena::<L>::ROOT;
        for dim in 0..child_count {
            let child = node.subtree(dim);
            let rs = op.representer_state(child.state_number(), dim)?;
            if dim == child_count - 1 {
                return Ok(op.transitions.node(plane).get_result_state(&rs, dim)?.number);
            }
            plane = op.transitions.node(plane).get_next_dimension(&rs, dim)?;
        }
        unreachable!("child_count == 0 handled by the caller")
    }

    pub fn reduce(&self, visitor: &mut L::Visitor, node: &L::Node, goal: &L::Nonterminal) -> Result<L::Output, LErr<L>> {
        debug!("reduce goal={goal:?} node_type={:?}", node.node_type());
        self.reduce_inner(visitor, node, goal).map_err(|e| {
            error!("reduce failed at node_type={:?} goal={goal:?}: {e}", node.node_type());
            e
        })
    }

    fn reduce_inner(&self, visitor: &mut L::Visitor, node: &L::Node, goal: &L::Nonterminal) -> Result<L::Output, LErr<L>> {
        let number = node.state_number();
        if number <= UNLABELED {
            return Err(BursError::UnlabeledNode);
        }
        let state = self
            .table
            .state_by_number(number)
            .ok_or(BursError::UnlabeledNode)?
            .clone();

        let mut production = state
            .get_production(goal)
            .ok_or_else(|| BursError::NoProduction { state: number, goal: goal.clone() })?;
        let mut pending: Vec<Rc<Closure<L>>> = Vec::new();

        loop {
            match production {
                Production::Closure(c) => {
                    if let Some(pre) = &c.pre_callback {
                        pre(visitor, node, &c.target)?;
                    }
                    let source = c.source.clone();
                    pending.push(c);
                    production = state
                        .get_production(&source)
                        .ok_or_else(|| BursError::NoProduction { state: number, goal: source })?;
                }
                Production::Pattern(p) => {
                    if let Some(pred) = &p.predicate {
                        if !pred(visitor, node) {
                            return Err(BursError::NoProduction { state: number, goal: p.target.clone() });
                        }
                    }
                    if let Some(pre) = &p.pre_callback {
                        pre(visitor, node, &p.target)?;
                    }

                    let actual = node.subtree_count();
                    let arity_ok = if p.is_var_args {
                        actual + 1 >= p.arity()
                    } else {
                        actual == p.arity()
                    };
                    if !arity_ok {
                        return Err(BursError::ArityMismatch { expected: p.arity(), actual });
                    }

                    let mut child_results = Vec::with_capacity(actual);
                    for i in 0..actual {
                        let child_goal = p.nonterminal_at(i).clone();
                        child_results.push(self.reduce_inner(visitor, node.subtree(i), &child_goal)?);
                    }

                    let mut current = match &p.post_callback {
                        Some(cb) => cb(visitor, node, child_results)?,
                        None => {
                            if child_results.len() != 1 {
                                return Err(BursError::ArityMismatch { expected: 1, actual: child_results.len() });
                            }
                            child_results.into_iter().next().unwrap()
                        }
                    };

                    for c in pending.into_iter().rev() {
                        current = (c.post_callback)(visitor, node, vec![current])?;
                    }
                    return Ok(current);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_tree::SampleTree;
    use crate::table::ProductionTable;

    struct UnitLang;
    impl Lang for UnitLang {
        type Nonterminal = String;
        type NodeType = String;
        type Node = SampleTree;
        type Visitor = ();
        type Output = i64;
    }

    #[test]
    fn label_leaves_a_node_of_unknown_type_unlabeled() {
        let table = ProductionTable::<UnitLang>::new();
        let tree = SampleTree::leaf("Mystery");
        Reducer::new(&table).label(&tree);
        assert_eq!(tree.state_number(), UNLABELED);
    }

    #[test]
    fn label_assigns_the_leaf_states_number() {
        let mut table = ProductionTable::<UnitLang>::new();
        table.add_pattern_match(
            "Const".into(),
            "Num".into(),
            0,
            vec![],
            None,
            None,
            Some(Box::new(|_v, _n, _c: Vec<i64>| Ok(1))),
        );
        table.generate_states().unwrap();

        let tree = SampleTree::leaf("Num");
        Reducer::new(&table).label(&tree);
        assert!(tree.state_number() > UNLABELED);
    }

    #[test]
    fn false_predicate_turns_an_otherwise_matching_pattern_into_no_production() {
        let mut table = ProductionTable::<UnitLang>::new();
        table.add_pattern_match(
            "Const".into(),
            "Num".into(),
            0,
            vec![],
            Some(Box::new(|_v: &(), _n: &SampleTree| false)),
            None,
            Some(Box::new(|_v, _n, _c: Vec<i64>| Ok(1))),
        );
        table.generate_states().unwrap();

        let tree = SampleTree::leaf("Num");
        let reducer = Reducer::new(&table);
        reducer.label(&tree);
        let err = reducer.reduce(&mut (), &tree, &"Const".to_string()).unwrap_err();
        assert!(matches!(err, BursError::NoProduction { .. }));
    }
}
