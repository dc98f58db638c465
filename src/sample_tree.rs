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

use std::cell::Cell;

use crate::reducer::{InputNode, UNLABELED};

// A minimal owned tree over string-named node types, for tests and the CLI demo.
#[derive(Debug, Clone)]
pub struct SampleTree {
    node_type: String,
    children: Vec<SampleTree>,
    state_number: Cell<i64>,
}

impl SampleTree {
    pub fn leaf(node_type: impl Into<String>) -> Self {
        SampleTree {
            node_type: node_type.into(),
            children: Vec::new(),
            state_number: Cell::new(UNLABELED),
        }
    }

    pub fn node(node_type: impl Into<String>, children: Vec<SampleTree>) -> Self {
        SampleTree {
            node_type: node_type.into(),
            children,
            state_number: Cell::new(UNLABELED),
        }
    }
}

impl InputNode for SampleTree {
    type NodeType = String;

    fn node_type(&self) -> String {
        self.node_type.clone()
    }

    fn subtree_count(&self) -> usize {
        self.children.len()
    }

    fn subtree(&self, i: usize) -> &Self {
        &self.children[i]
    }

    fn state_number(&self) -> i64 {
        self.state_number.get()
    }

    fn set_state_number(&self, n: i64) {
        self.state_number.set(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_starts_unlabeled() {
        let t = SampleTree::leaf("Num");
        assert_eq!(t.state_number(), UNLABELED);
        assert_eq!(t.subtree_count(), 0);
    }

    #[test]
    fn node_exposes_children_by_index() {
        let t = SampleTree::node("Add", vec![SampleTree::leaf("Num"), SampleTree::leaf("Num")]);
        assert_eq!(t.subtree_count(), 2);
        assert_eq!(t.subtree(0).node_type(), "Num");
    }

    #[test]
    fn set_state_number_does_not_need_mut() {
        let t = SampleTree::leaf("Num");
        let shared: &SampleTree = &t;
        shared.set_state_number(3);
        assert_eq!(t.state_number(), 3);
    }
}
