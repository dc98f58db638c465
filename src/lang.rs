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

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::BursError;
use crate::reducer::InputNode;

pub trait Lang: Sized {
    type Nonterminal: Clone + Eq + Hash + Ord + Debug;
    type NodeType: Clone + Eq + Hash + Ord + Debug;
    type Node: InputNode<NodeType = Self::NodeType>;
    type Visitor;
    type Output: Clone;
}

pub type LErr<L> = BursError<<L as Lang>::Nonterminal, <L as Lang>::NodeType>;
