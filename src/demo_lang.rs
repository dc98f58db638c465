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

use burs_core::lang::Lang;
use burs_core::sample_tree::SampleTree;

// String-named nonterminals and node types over SampleTree, no visitor
// state, a textual derivation as the reduced value.
pub struct DemoLang;

impl Lang for DemoLang {
    type Nonterminal = String;
    type NodeType = String;
    type Node = SampleTree;
    type Visitor = ();
    type Output = String;
}
