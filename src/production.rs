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

use crate::lang::{LErr, Lang};

pub type Cost = i64;

// No production reaches this nonterminal. Kept well below i64::MAX so a
// handful of additions can never wrap past it.
pub const INFINITY: Cost = i64::MAX / 4;

pub fn add_cost(a: Cost, b: Cost) -> Cost {
    if a >= INFINITY || b >= INFINITY {
        INFINITY
    } else {
        let sum = a + b;
        if sum >= INFINITY {
            INFINITY
        } else {
            sum
        }
    }
}

pub type Predicate<L> = dyn Fn(&<L as Lang>::Visitor, &<L as Lang>::Node) -> bool;
pub type PreCallback<L> =
    dyn Fn(&mut <L as Lang>::Visitor, &<L as Lang>::Node, &<L as Lang>::Nonterminal) -> Result<(), LErr<L>>;
pub type PostCallback<L> = dyn Fn(
    &mut <L as Lang>::Visitor,
    &<L as Lang>::Node,
    Vec<<L as Lang>::Output>,
) -> Result<<L as Lang>::Output, LErr<L>>;

pub struct PatternMatcher<L: Lang> {
    pub(crate) id: usize,
    pub target: L::Nonterminal,
    pub node_type: L::NodeType,
    pub child_types: Vec<L::Nonterminal>,
    pub own_cost: Cost,
    pub is_var_args: bool,
    pub predicate: Option<Box<Predicate<L>>>,
    pub pre_callback: Option<Box<PreCallback<L>>>,
    pub post_callback: Option<Box<PostCallback<L>>>,
}

impl<L: Lang> PatternMatcher<L> {
    pub(crate) fn new(
        id: usize,
        target: L::Nonterminal,
        node_type: L::NodeType,
        child_types: Vec<L::Nonterminal>,
        own_cost: Cost,
        is_var_args: bool,
    ) -> Self {
        PatternMatcher {
            id,
            target,
            node_type,
            child_types,
            own_cost,
            is_var_args,
            predicate: None,
            pre_callback: None,
            post_callback: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.child_types.len()
    }

    // Repeats the last child type past arity - 1 for variadic matchers.
    pub fn nonterminal_at(&self, i: usize) -> &L::Nonterminal {
        if self.is_var_args && i >= self.child_types.len() - 1 {
            self.child_types.last().expect("variadic matcher has at least one child type")
        } else {
            &self.child_types[i]
        }
    }

    pub fn uses_nonterminal_at(&self, n: &L::Nonterminal, i: usize) -> bool
    where
        L::Nonterminal: PartialEq,
    {
        self.nonterminal_at(i) == n
    }

    pub fn accepts_dimension(&self, d: usize) -> bool {
        if self.is_var_args {
            self.child_types.len() <= d
        } else {
            self.child_types.len() == d
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.child_types.is_empty()
    }
}

pub struct Closure<L: Lang> {
    pub(crate) id: usize,
    pub target: L::Nonterminal,
    pub source: L::Nonterminal,
    pub own_cost: Cost,
    pub pre_callback: Option<Box<PreCallback<L>>>,
    pub post_callback: Box<PostCallback<L>>,
}

impl<L: Lang> Closure<L> {
    pub(crate) fn new(
        id: usize,
        target: L::Nonterminal,
        source: L::Nonterminal,
        own_cost: Cost,
        post_callback: Box<PostCallback<L>>,
    ) -> Self {
        Closure {
            id,
            target,
            source,
            own_cost,
            pre_callback: None,
            post_callback,
        }
    }
}
