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

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::lang::Lang;
use crate::production::Cost;
use crate::state::State;

// Identity depends only on (node_type, costs); many states collapse onto one
// representer, keeping the transition table finite. represented_states is
// interior-mutable so a representer already sitting in a HashSet can still
// record newly-discovered states that project onto it.
pub struct RepresenterState<L: Lang> {
    pub node_type: L::NodeType,
    pub(crate) costs: BTreeMap<L::Nonterminal, Cost>,
    represented_states: RefCell<Vec<Rc<State<L>>>>,
}

impl<L: Lang> RepresenterState<L> {
    pub fn new(node_type: L::NodeType, costs: BTreeMap<L::Nonterminal, Cost>) -> Self {
        RepresenterState {
            node_type,
            costs,
            represented_states: RefCell::new(Vec::new()),
        }
    }

    pub fn cost(&self, n: &L::Nonterminal) -> Cost {
        self.costs.get(n).copied().unwrap_or(crate::production::INFINITY)
    }

    pub(crate) fn record(&self, state: Rc<State<L>>) {
        let mut states = self.represented_states.borrow_mut();
        if !states.iter().any(|s| s.number == state.number) {
            states.push(state);
        }
    }

    pub fn represented_states(&self) -> Vec<Rc<State<L>>> {
        self.represented_states.borrow().clone()
    }

    pub(crate) fn contains_state_number(&self, number: i64) -> bool {
        self.represented_states.borrow().iter().any(|s| s.number == number)
    }
}

impl<L: Lang> PartialEq for RepresenterState<L> {
    fn eq(&self, other: &Self) -> bool {
        self.node_type == other.node_type && self.costs == other.costs
    }
}
impl<L: Lang> Eq for RepresenterState<L> {}

impl<L: Lang> Hash for RepresenterState<L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_type.hash(state);
        for (k, v) in &self.costs {
            k.hash(state);
            v.hash(state);
        }
    }
}
