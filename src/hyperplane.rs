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
use std::rc::Rc;

use crate::error::BursError;
use crate::lang::{LErr, Lang};
use crate::representer_state::RepresenterState;
use crate::state::State;

pub type HyperPlaneRef = usize;

// A node may carry both a next_dimension and a final_dimension entry for the
// same key: that is the variadic self-loop, where the dimension that
// completes a match is also the dimension consumed again for extra operands.
pub struct HyperPlane<L: Lang> {
    next_dimension: HashMap<Rc<RepresenterState<L>>, HyperPlaneRef>,
    final_dimension: HashMap<Rc<RepresenterState<L>>, Rc<State<L>>>,
}

impl<L: Lang> HyperPlane<L> {
    fn new() -> Self {
        HyperPlane {
            next_dimension: HashMap::new(),
            final_dimension: HashMap::new(),
        }
    }

    pub fn get_next_dimension(&self, rs: &Rc<RepresenterState<L>>, dim: usize) -> Result<HyperPlaneRef, LErr<L>> {
        self.next_dimension.get(rs).copied().ok_or_else(|| BursError::MissingTransition {
            node_type: rs.node_type.clone(),
            dim,
        })
    }

    pub fn get_result_state(&self, rs: &Rc<RepresenterState<L>>, dim: usize) -> Result<Rc<State<L>>, LErr<L>> {
        self.final_dimension.get(rs).cloned().ok_or_else(|| BursError::MissingTransition {
            node_type: rs.node_type.clone(),
            dim,
        })
    }

    fn is_var_args(&self, arena: &[HyperPlane<L>], self_idx: HyperPlaneRef) -> bool {
        self.final_dimension.values().all(|s| s.is_var_args())
            && self
                .next_dimension
                .values()
                .all(|&idx| idx == self_idx || arena[idx].is_var_args(arena, idx))
    }
}

// Node 0 is always the root.
pub struct HyperPlaneArena<L: Lang> {
    nodes: Vec<HyperPlane<L>>,
}

impl<L: Lang> HyperPlaneArena<L> {
    pub fn new() -> Self {
        HyperPlaneArena {
            nodes: vec![HyperPlane::new()],
        }
    }

    pub const ROOT: HyperPlaneRef = 0;

    pub fn node(&self, idx: HyperPlaneRef) -> &HyperPlane<L> {
        &self.nodes[idx]
    }

    pub fn is_var_args(&self) -> bool {
        self.nodes[Self::ROOT].is_var_args(&self.nodes, Self::ROOT)
    }

    pub fn add(&mut self, child_states: &[Rc<RepresenterState<L>>], result: Rc<State<L>>) {
        let is_var_args = result.is_var_args();
        self.add_at(Self::ROOT, child_states, 0, result, is_var_args);
    }

    fn add_at(
        &mut self,
        node_idx: HyperPlaneRef,
        child_states: &[Rc<RepresenterState<L>>],
        dim: usize,
        result: Rc<State<L>>,
        is_var_args: bool,
    ) {
        let key = child_states[dim].clone();
        if dim == child_states.len() - 1 {
            self.nodes[node_idx].final_dimension.insert(key.clone(), result);
            if is_var_args {
                self.nodes[node_idx].next_dimension.insert(key, node_idx);
            }
            return;
        }

        let next_idx = match self.nodes[node_idx].next_dimension.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.nodes.len();
                self.nodes.push(HyperPlane::new());
                self.nodes[node_idx].next_dimension.insert(key, idx);
                idx
            }
        };
        self.add_at(next_idx, child_states, dim + 1, result, is_var_args);
    }
}

impl<L: Lang> Default for HyperPlaneArena<L> {
    fn default() -> Self {
        Self::new()
    }
}
