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

use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;

use log::{debug, trace, warn};

use crate::error::BursError;
use crate::lang::{LErr, Lang};
use crate::operator::Operator;
use crate::production::{add_cost, Closure, Cost, PatternMatcher, PostCallback, PreCallback, Predicate, INFINITY};
use crate::representer_state::RepresenterState;
use crate::state::{Production, State};

pub struct ProductionTable<L: Lang> {
    next_id: usize,
    operators: HashMap<(L::NodeType, usize), Operator<L>>,
    all_closures: Vec<Rc<Closure<L>>>,
    canonical_states: HashMap<Rc<State<L>>, ()>,
    states_by_number: Vec<Rc<State<L>>>,
    next_state_number: i64,
    worklist: Vec<Rc<State<L>>>,
    tie_breaks: Vec<L::Nonterminal>,
    generated: bool,
}

impl<L: Lang> ProductionTable<L> {
    pub fn new() -> Self {
        ProductionTable {
            next_id: 0,
            operators: HashMap::new(),
            all_closures: Vec::new(),
            canonical_states: HashMap::new(),
            states_by_number: Vec::new(),
            next_state_number: 1,
            worklist: Vec::new(),
            tie_breaks: Vec::new(),
            generated: false,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn operator_mut(&mut self, node_type: L::NodeType, arity: usize, is_var_args: bool) -> &mut Operator<L> {
        self.operators
            .entry((node_type.clone(), arity))
            .or_insert_with(|| Operator::new(node_type, arity, is_var_args))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_pattern_match(
        &mut self,
        target: L::Nonterminal,
        node_type: L::NodeType,
        cost: Cost,
        child_types: Vec<L::Nonterminal>,
        predicate: Option<Box<Predicate<L>>>,
        pre_callback: Option<Box<PreCallback<L>>>,
        post_callback: Option<Box<PostCallback<L>>>,
    ) -> usize {
        self.add_matcher(target, node_type, cost, child_types, false, predicate, pre_callback, post_callback)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_var_args_pattern_match(
        &mut self,
        target: L::Nonterminal,
        node_type: L::NodeType,
        cost: Cost,
        child_types: Vec<L::Nonterminal>,
        predicate: Option<Box<Predicate<L>>>,
        pre_callback: Option<Box<PreCallback<L>>>,
        post_callback: Option<Box<PostCallback<L>>>,
    ) -> usize {
        assert!(!child_types.is_empty(), "a variadic matcher needs at least one child type to repeat");
        self.add_matcher(target, node_type, cost, child_types, true, predicate, pre_callback, post_callback)
    }

    #[allow(clippy::too_many_arguments)]
    fn add_matcher(
        &mut self,
        target: L::Nonterminal,
        node_type: L::NodeType,
        cost: Cost,
        child_types: Vec<L::Nonterminal>,
        is_var_args: bool,
        predicate: Option<Box<Predicate<L>>>,
        pre_callback: Option<Box<PreCallback<L>>>,
        post_callback: Option<Box<PostCallback<L>>>,
    ) -> usize {
        let arity = child_types.len();
        let id = self.next_id();
        let mut matcher = PatternMatcher::new(id, target, node_type.clone(), child_types, cost, is_var_args);
        matcher.predicate = predicate;
        matcher.pre_callback = pre_callback;
        matcher.post_callback = post_callback;
        let matcher = Rc::new(matcher);
        let op = self.operator_mut(node_type, arity, is_var_args);
        op.patterns.push(matcher);
        id
    }

    pub fn add_closure(
        &mut self,
        target: L::Nonterminal,
        source: L::Nonterminal,
        cost: Cost,
        post_callback: Box<PostCallback<L>>,
    ) -> usize {
        assert!(target != source, "a closure's target must differ from its source");
        let id = self.next_id();
        let closure = Rc::new(Closure::new(id, target, source, cost, post_callback));
        self.all_closures.push(closure);
        id
    }

    pub fn set_closure_pre_callback(&mut self, closure_id: usize, pre_callback: Box<PreCallback<L>>) {
        for c in &mut self.all_closures {
            if c.id == closure_id {
                Rc::get_mut(c).expect("closure mutated before generate_states").pre_callback = Some(pre_callback);
                return;
            }
        }
    }

    // edge target -> source, since resolving a target's cost needs the source's.
    fn validate_closures(&self) -> Result<(), LErr<L>> {
        let mut edges: HashMap<&L::Nonterminal, Vec<&L::Nonterminal>> = HashMap::new();
        for c in &self.all_closures {
            edges.entry(&c.target).or_default().push(&c.source);
        }

        let mut marks: HashMap<&L::Nonterminal, ClosureMark> = HashMap::new();
        let mut path: Vec<&L::Nonterminal> = Vec::new();

        for start in edges.keys().copied() {
            if marks.contains_key(start) {
                continue;
            }
            if let Some(cycle) = Self::dfs_find_cycle(start, &edges, &mut marks, &mut path) {
                return Err(BursError::ClosureCycle { cycle });
            }
        }
        Ok(())
    }

    fn dfs_find_cycle<'a>(
        node: &'a L::Nonterminal,
        edges: &HashMap<&'a L::Nonterminal, Vec<&'a L::Nonterminal>>,
        marks: &mut HashMap<&'a L::Nonterminal, ClosureMark>,
        path: &mut Vec<&'a L::Nonterminal>,
    ) -> Option<Vec<L::Nonterminal>> {
        marks.insert(node, ClosureMark::InProgress);
        path.push(node);

        if let Some(neighbors) = edges.get(node) {
            for &next in neighbors {
                match marks.get(next) {
                    Some(ClosureMark::InProgress) => {
                        let start = path.iter().position(|&n| n == next).unwrap();
                        let mut cycle: Vec<L::Nonterminal> = path[start..].iter().map(|&n| n.clone()).collect();
                        cycle.push(next.clone());
                        return Some(cycle);
                    }
                    Some(ClosureMark::Done) => continue,
                    None => {
                        if let Some(cycle) = Self::dfs_find_cycle(next, edges, marks, path) {
                            return Some(cycle);
                        }
                    }
                }
            }
        }

        path.pop();
        marks.insert(node, ClosureMark::Done);
        None
    }

    fn apply_closure(&self, state: &mut State<L>) {
        loop {
            let mut changed = false;
            for c in &self.all_closures {
                if state.get_cost(&c.target) >= INFINITY && state.add_closure(c.clone()) {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        state.finish();
    }

    fn dedup(&mut self, candidate: State<L>) -> Rc<State<L>> {
        let candidate = Rc::new(candidate);
        if let Some((existing, _)) = self.canonical_states.get_key_value(&candidate) {
            return existing.clone();
        }
        let mut candidate = candidate;
        let number = self.next_state_number;
        self.next_state_number += 1;
        Rc::get_mut(&mut candidate).expect("sole owner before first clone").number = number;
        debug!("discovered state {number} (node_type={:?})", candidate.node_type);
        self.canonical_states.insert(candidate.clone(), ());
        self.states_by_number.push(candidate.clone());
        self.worklist.push(candidate.clone());
        candidate
    }

    pub fn generate_states(&mut self) -> Result<(), LErr<L>> {
        if self.generated {
            return Ok(());
        }
        self.validate_closures()?;
        self.generate_leaf_states();

        while let Some(s) = self.worklist.pop() {
            let keys: Vec<(L::NodeType, usize)> =
                self.operators.iter().filter(|(k, _)| k.1 >= 1).map(|(k, _)| k.clone()).collect();
            for key in keys {
                let arity = key.1;
                for i in 0..arity {
                    self.project_and_permute(&key, i, &s);
                }
            }
        }

        self.generated = true;
        Ok(())
    }

    fn generate_leaf_states(&mut self) {
        let leaf_keys: Vec<(L::NodeType, usize)> =
            self.operators.iter().filter(|(k, _)| k.1 == 0).map(|(k, _)| k.clone()).collect();

        for (node_type, _) in leaf_keys {
            let op = self.operators.get(&(node_type.clone(), 0)).unwrap();
            let mut candidate = State::new(Some(node_type.clone()));
            for p in op.patterns.iter().rev() {
                let cost = p.own_cost;
                let current = candidate.get_cost(&p.target);
                if cost < current {
                    candidate.set_pattern_production(p.clone(), cost);
                } else if cost == current && current < INFINITY {
                    self.tie_breaks.push(p.target.clone());
                }
            }
            if candidate.is_empty() {
                continue;
            }
            self.apply_closure(&mut candidate);
            let state = self.dedup(candidate);
            let op = self.operators.get_mut(&(node_type, 0)).unwrap();
            op.leaf_state = Some(state.clone());
            op.transitions.add(&[], state);
        }
    }

    fn project_and_permute(&mut self, key: &(L::NodeType, usize), i: usize, s: &Rc<State<L>>) {
        let op_patterns = self.operators.get(key).unwrap().patterns.clone();

        let mut costs = std::collections::BTreeMap::new();
        for p in &op_patterns {
            let n = p.nonterminal_at(i).clone();
            let c = s.get_cost(&n);
            if c < INFINITY {
                costs
                    .entry(n)
                    .and_modify(|existing: &mut Cost| {
                        if c < *existing {
                            *existing = c;
                        }
                    })
                    .or_insert(c);
            }
        }
        if costs.is_empty() {
            return;
        }
        let candidate_rs = Rc::new(RepresenterState::new(key.0.clone(), costs));

        let op = self.operators.get_mut(key).unwrap();
        let (pivot, is_new) = match op.reps[i].get(&candidate_rs) {
            Some(existing) => (existing.clone(), false),
            None => {
                op.reps[i].insert(candidate_rs.clone());
                (candidate_rs, true)
            }
        };
        pivot.record(s.clone());
        if !is_new {
            trace!("projection at dim {i} of {:?} produced no new information", key.0);
            return;
        }

        let arity = key.1;
        let mut dims: Vec<Vec<Rc<RepresenterState<L>>>> = Vec::with_capacity(arity);
        {
            let op = self.operators.get(key).unwrap();
            for j in 0..arity {
                if j == i {
                    dims.push(vec![pivot.clone()]);
                } else {
                    dims.push(op.reps[j].iter().cloned().collect());
                }
            }
        }

        for tuple in cartesian(&dims) {
            let mut candidate = State::new(Some(key.0.clone()));
            'pattern: for p in op_patterns.iter().rev() {
                let mut cost = p.own_cost;
                for j in 0..p.arity() {
                    let n = p.nonterminal_at(j);
                    cost = add_cost(cost, tuple[j].cost(n));
                    if cost >= INFINITY {
                        continue 'pattern;
                    }
                }
                let current = candidate.get_cost(&p.target);
                if cost < current {
                    candidate.set_pattern_production(p.clone(), cost);
                } else if cost == current && current < INFINITY {
                    self.tie_breaks.push(p.target.clone());
                }
            }
            if candidate.is_empty() {
                continue;
            }
            self.apply_closure(&mut candidate);
            let result = self.dedup(candidate);
            let op = self.operators.get_mut(key).unwrap();
            op.add_transition(&tuple, result);
        }
    }

    pub fn report_tie_breaks(&self) {
        for nt in &self.tie_breaks {
            warn!("tie on cost for nonterminal {nt:?}; last-registered pattern won");
        }
    }

    pub(crate) fn get_operator(&self, node_type: &L::NodeType, arity: usize) -> Option<&Operator<L>> {
        self.operators.get(&(node_type.clone(), arity))
    }

    pub(crate) fn find_var_args_operator(&self, node_type: &L::NodeType, actual_arity: usize) -> Option<&Operator<L>> {
        self.operators
            .iter()
            .filter(|((t, a), op)| t == node_type && op.is_var_args && *a <= actual_arity)
            .max_by_key(|((_, a), _)| *a)
            .map(|(_, op)| op)
    }

    pub(crate) fn state_by_number(&self, number: i64) -> Option<&Rc<State<L>>> {
        if number <= 0 {
            return None;
        }
        self.states_by_number.get((number - 1) as usize)
    }

    pub fn state_count(&self) -> usize {
        self.states_by_number.len()
    }

    pub fn get_production(&self, number: i64, goal: &L::Nonterminal) -> Option<Production<L>> {
        self.state_by_number(number).and_then(|s| s.get_production(goal))
    }

    pub fn can_produce(&self, node: &L::Node, goal: &L::Nonterminal) -> bool
    where
        L::Node: crate::reducer::InputNode<NodeType = L::NodeType>,
    {
        use crate::reducer::InputNode;
        let n = node.state_number();
        match self.state_by_number(n) {
            Some(s) => s.get_production(goal).is_some(),
            None => false,
        }
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut keys: Vec<&(L::NodeType, usize)> = self.operators.keys().collect();
        keys.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| format!("{:?}", a.0).cmp(&format!("{:?}", b.0))));

        for key in &keys {
            let op = &self.operators[key];
            let _ = writeln!(out, "operator {:?} / arity {} / var_args={}", key.0, key.1, op.is_var_args);
        }

        let _ = writeln!(out, "states:");
        for state in &self.states_by_number {
            let _ = writeln!(out, "  #{} node_type={:?}", state.number, state.node_type);
            for (n, p) in &state.patterns {
                let _ = writeln!(out, "    pattern {n:?} <- #{} (cost {})", p.id, state.pattern_costs[n]);
            }
            for (n, c) in &state.closures {
                let _ = writeln!(out, "    closure {n:?} <- {:?} (cost {})", n, c.source);
            }
        }

        for key in &keys {
            if key.1 == 0 {
                continue;
            }
            let op = &self.operators[key];
            let _ = writeln!(out, "hyperplane {:?}/{}:", key.0, key.1);
            if op.transitions.is_var_args() {
                let _ = writeln!(out, "  [varargs]");
            }
        }

        out
    }
}

impl<L: Lang> Default for ProductionTable<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ClosureMark {
    InProgress,
    Done,
}

fn cartesian<T: Clone>(dims: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut result: Vec<Vec<T>> = vec![vec![]];
    for dim in dims {
        let mut next = Vec::with_capacity(result.len() * dim.len().max(1));
        for prefix in &result {
            for item in dim {
                let mut v = prefix.clone();
                v.push(item.clone());
                next.push(v);
            }
        }
        result = next;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_of_empty_dims_is_a_single_empty_tuple() {
        let dims: Vec<Vec<i32>> = vec![];
        assert_eq!(cartesian(&dims), vec![Vec::<i32>::new()]);
    }

    #[test]
    fn cartesian_multiplies_out_every_combination() {
        let dims = vec![vec![1, 2], vec![10, 20, 30]];
        let product = cartesian(&dims);
        assert_eq!(product.len(), 6);
        // Every pairing of the two dimensions appears exactly once.
        for &n in &[1, 2] {
            for &c in &[10, 20, 30] {
                assert_eq!(product.iter().filter(|t| t[0] == n && t[1] == c).count(), 1);
            }
        }
    }

    #[test]
    fn cartesian_with_an_empty_dimension_is_empty() {
        let dims: Vec<Vec<i32>> = vec![vec![1, 2], vec![]];
        assert!(cartesian(&dims).is_empty());
    }

    struct TestLang;
    impl Lang for TestLang {
        type Nonterminal = String;
        type NodeType = String;
        type Node = crate::sample_tree::SampleTree;
        type Visitor = ();
        type Output = i64;
    }

    #[test]
    fn find_var_args_operator_picks_the_largest_arity_not_exceeding_actual() {
        let mut table = ProductionTable::<TestLang>::new();
        table.add_var_args_pattern_match(
            "Sum".into(),
            "List".into(),
            0,
            vec!["Item".into()],
            None,
            None,
            Some(Box::new(|_v, _n, c: Vec<i64>| Ok(c.iter().sum()))),
        );
        table.add_var_args_pattern_match(
            "Sum".into(),
            "List".into(),
            0,
            vec!["Item".into(), "Item".into(), "Item".into()],
            None,
            None,
            Some(Box::new(|_v, _n, c: Vec<i64>| Ok(c.iter().sum()))),
        );

        let found = table.find_var_args_operator(&"List".to_string(), 2).unwrap();
        assert_eq!(found.arity, 1);
        let found = table.find_var_args_operator(&"List".to_string(), 5).unwrap();
        assert_eq!(found.arity, 3);
        assert!(table.find_var_args_operator(&"Other".to_string(), 5).is_none());
    }

    #[test]
    fn state_by_number_is_one_indexed_and_rejects_sentinels() {
        let mut table = ProductionTable::<TestLang>::new();
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

        assert!(table.state_by_number(0).is_none());
        assert!(table.state_by_number(-1).is_none());
        assert!(table.state_by_number(1).is_some());
    }

    #[test]
    fn dump_lists_every_discovered_state() {
        let mut table = ProductionTable::<TestLang>::new();
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
        let text = table.dump();
        assert!(text.contains("states:"));
        assert!(text.contains("#1"));
    }
}
