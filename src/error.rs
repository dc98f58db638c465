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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BursError<N: Debug, T: Debug> {
    #[error("state {state} has no production for goal {goal:?}")]
    NoProduction { state: i64, goal: N },

    #[error("reduce called on a node with no assigned state")]
    UnlabeledNode,

    #[error("no transition for node type {node_type:?} at dimension {dim}")]
    MissingTransition { node_type: T, dim: usize },

    #[error("callback expected {expected} arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("closure cycle detected: {}", cycle.iter().map(|n| format!("{n:?}")).collect::<Vec<_>>().join(" -> "))]
    ClosureCycle { cycle: Vec<N> },
}
