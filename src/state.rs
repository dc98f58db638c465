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

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::lang::Lang;
use crate::production::{add_cost, Closure, Cost, PatternMatcher, INFINITY};

pub enum Production<L: Lang> {
    Pattern(Rc<PatternMatcher<L>>),
    Closure(Rc<Closure<L>>),
}

// Identity is (node_type, patterns) only, never cost or closures.
pub struct State<L: Lang> {
    pub node_type: Option<L::NodeType>,
    pub(crate) patterns: BTreeMap<L::Nonterminal, Rc<PatternMatcher<L>>>,
    pub(crate) pattern_costs: BTreeMap<L::Nonterminal, Cost>,
    pub(crate) closures: BTreeMap<L::Nonterminal, Rc<Closure<L>>>,
    pub number: i64,
    finished: bool,
}

impl<L: Lang> State<L> {
    pub fn new(node_type: Option<L::NodeType>) -> Self {
        State {
            node_type,
            patterns: BTreeMap::new(),
            pattern_costs: BTreeMap::new(),
            closures: BTreeMap::new(),
            number: -1,
            finished: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    // Precondition: cost < self.get_cost(&p.target).
    pub fn set_pattern_production(&mut self, p: Rc<PatternMatcher<L>>, cost: Cost) {
        debug_assert!(!self.finished, "pattern set on a finished state");
        debug_assert!(cost < self.get_cost(&p.target));
        let target = p.target.clone();
        self.patterns.insert(target.clone(), p);
        self.pattern_costs.insert(target, cost);
    }

    pub fn get_cost(&self, n: &L::Nonterminal) -> Cost {
        if let Some(c) = self.pattern_costs.get(n) {
            return *c;
        }
        if let Some(c) = self.closures.get(n) {
            return add_cost(c.own_cost, self.get_cost(&c.source));
        }
        INFINITY
    }

    pub fn get_production(&self, n: &L::Nonterminal) -> Option<Production<L>> {
        if let Some(p) = self.patterns.get(n) {
            return Some(Production::Pattern(p.clone()));
        }
        if let Some(c) = self.closures.get(n) {
            return Some(Production::Closure(c.clone()));
        }
        None
    }

    // Closures never occlude patterns.
    pub fn add_closure(&mut self, c: Rc<Closure<L>>) -> bool {
        debug_assert!(!self.finished, "closure added to a finished state");
        if self.patterns.contains_key(&c.target) {
            return false;
        }
        let candidate_cost = add_cost(c.own_cost, self.get_cost(&c.source));
        if candidate_cost >= self.get_cost(&c.target) {
            return false;
        }
        self.closures.insert(c.target.clone(), c);
        true
    }

    pub fn is_var_args(&self) -> bool {
        !self.patterns.is_empty() && self.patterns.values().all(|p| p.is_var_args)
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<L: Lang> PartialEq for State<L> {
    fn eq(&self, other: &Self) -> bool {
        self.node_type == other.node_type
            && self.patterns.len() == other.patterns.len()
            && self
                .patterns
                .iter()
                .zip(other.patterns.iter())
                .all(|((k1, p1), (k2, p2))| k1 == k2 && p1.id == p2.id)
    }
}
impl<L: Lang> Eq for State<L> {}

impl<L: Lang> Hash for State<L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_type.hash(state);
        for (k, p) in &self.patterns {
            k.hash(state);
            p.id.hash(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestLang;
    impl Lang for TestLang {
        type Nonterminal = String;
        type NodeType = String;
        type Node = crate::sample_tree::SampleTree;
        type Visitor = ();
        type Output = i64;
    }

    fn pattern(target: &str) -> Rc<PatternMatcher<TestLang>> {
        Rc::new(PatternMatcher::new(0, target.to_string(), "Num".to_string(), vec![], 1, false))
    }

    fn closure(id: usize, target: &str, source: &str, cost: Cost) -> Rc<Closure<TestLang>> {
        Rc::new(Closure::new(
            id,
            target.to_string(),
            source.to_string(),
            cost,
            Box::new(|_v, _n, c| Ok(c[0])),
        ))
    }

    #[test]
    fn fresh_state_has_infinite_cost_everywhere() {
        let state = State::<TestLang>::new(None);
        assert_eq!(state.get_cost(&"Expr".to_string()), INFINITY);
        assert!(state.get_production(&"Expr".to_string()).is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn set_pattern_production_is_visible_through_get_cost_and_get_production() {
        let mut state = State::<TestLang>::new(None);
        state.set_pattern_production(pattern("Expr"), 3);
        assert_eq!(state.get_cost(&"Expr".to_string()), 3);
        assert!(matches!(state.get_production(&"Expr".to_string()), Some(Production::Pattern(_))));
    }

    #[test]
    fn closure_cost_chains_through_its_source() {
        let mut state = State::<TestLang>::new(None);
        state.set_pattern_production(pattern("Const"), 2);
        assert!(state.add_closure(closure(0, "Expr", "Const", 5)));
        assert_eq!(state.get_cost(&"Expr".to_string()), 7);
        assert!(matches!(state.get_production(&"Expr".to_string()), Some(Production::Closure(_))));
    }

    #[test]
    fn closure_never_occludes_an_existing_pattern() {
        let mut state = State::<TestLang>::new(None);
        state.set_pattern_production(pattern("Expr"), 1);
        assert!(!state.add_closure(closure(0, "Expr", "Const", 0)));
        assert!(matches!(state.get_production(&"Expr".to_string()), Some(Production::Pattern(_))));
    }

    #[test]
    fn closure_rejected_unless_strictly_cheaper() {
        let mut state = State::<TestLang>::new(None);
        state.set_pattern_production(pattern("Const"), 5);
        assert!(state.add_closure(closure(0, "Expr", "Const", 0)));
        assert_eq!(state.get_cost(&"Expr".to_string()), 5);
        // A second, equally expensive closure to the same target must not win.
        assert!(!state.add_closure(closure(1, "Expr", "Const", 0)));
    }

    #[test]
    fn equality_and_hash_ignore_cost_and_closures() {
        let mut a = State::<TestLang>::new(Some("Num".to_string()));
        a.set_pattern_production(pattern("Expr"), 1);
        let mut b = State::<TestLang>::new(Some("Num".to_string()));
        b.set_pattern_production(pattern("Expr"), 99);
        b.add_closure(closure(0, "Stmt", "Expr", 0));
        assert_eq!(a, b);
    }
}
