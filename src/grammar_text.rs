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

// A tiny s-expression reader for the CLI's demo grammar files, just enough to
// write pattern/var-args-pattern/closure/tree forms by hand for small demos.

use std::fmt;

use burs_core::sample_tree::SampleTree;
use burs_core::table::ProductionTable;

use crate::demo_lang::DemoLang;

#[derive(Debug)]
pub struct GrammarTextError(String);

impl fmt::Display for GrammarTextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grammar text error: {}", self.0)
    }
}

impl std::error::Error for GrammarTextError {}

#[derive(Debug, Clone)]
enum SExpr {
    Atom(String),
    List(Vec<SExpr>),
}

fn tokenize(src: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in src.chars() {
        match c {
            '(' | ')' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(c.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            ';' => break, // line comments are not modeled; good enough for a demo reader
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_one(tokens: &[String], pos: &mut usize) -> Result<SExpr, GrammarTextError> {
    let tok = tokens.get(*pos).ok_or_else(|| GrammarTextError("unexpected end of input".into()))?;
    if tok == "(" {
        *pos += 1;
        let mut items = Vec::new();
        loop {
            match tokens.get(*pos) {
                None => return Err(GrammarTextError("unterminated list".into())),
                Some(t) if t == ")" => {
                    *pos += 1;
                    break;
                }
                _ => items.push(parse_one(tokens, pos)?),
            }
        }
        Ok(SExpr::List(items))
    } else if tok == ")" {
        Err(GrammarTextError("unexpected ')'".into()))
    } else {
        *pos += 1;
        Ok(SExpr::Atom(tok.clone()))
    }
}

fn parse_all(src: &str) -> Result<Vec<SExpr>, GrammarTextError> {
    let tokens = tokenize(src);
    let mut pos = 0;
    let mut forms = Vec::new();
    while pos < tokens.len() {
        forms.push(parse_one(&tokens, &mut pos)?);
    }
    Ok(forms)
}

impl SExpr {
    fn atom(&self) -> Result<&str, GrammarTextError> {
        match self {
            SExpr::Atom(s) => Ok(s),
            SExpr::List(_) => Err(GrammarTextError("expected an atom, found a list".into())),
        }
    }

    fn list(&self) -> Result<&[SExpr], GrammarTextError> {
        match self {
            SExpr::List(items) => Ok(items),
            SExpr::Atom(_) => Err(GrammarTextError("expected a list, found an atom".into())),
        }
    }
}

fn parse_cost(s: &str) -> Result<i64, GrammarTextError> {
    s.parse().map_err(|_| GrammarTextError(format!("not an integer cost: {s}")))
}

fn parse_nonterminals(expr: &SExpr) -> Result<Vec<String>, GrammarTextError> {
    expr.list()?.iter().map(|e| e.atom().map(|s| s.to_string())).collect()
}

fn parse_tree(expr: &SExpr) -> Result<SampleTree, GrammarTextError> {
    let items = expr.list()?;
    let node_type = items.first().ok_or_else(|| GrammarTextError("empty tree node".into()))?.atom()?;
    let children = items[1..].iter().map(parse_tree).collect::<Result<Vec<_>, _>>()?;
    Ok(SampleTree::node(node_type, children))
}

pub struct ParsedGrammar {
    pub table: ProductionTable<DemoLang>,
    pub tree: Option<SampleTree>,
}

// Every registered pattern/closure gets a default callback building a
// derivation string, since a text grammar file cannot carry Rust closures.
pub fn interpret(src: &str) -> Result<ParsedGrammar, GrammarTextError> {
    let forms = parse_all(src)?;
    let mut table = ProductionTable::<DemoLang>::new();
    let mut tree = None;

    for form in &forms {
        let items = form.list()?;
        let head = items.first().ok_or_else(|| GrammarTextError("empty form".into()))?.atom()?;
        match head {
            "pattern" | "var-args-pattern" => {
                let target = items[1].atom()?.to_string();
                let node_type = items[2].atom()?.to_string();
                let cost = parse_cost(items[3].atom()?)?;
                let child_types = parse_nonterminals(&items[4])?;
                let post_callback_target = target.clone();
                let post_callback_node_type = node_type.clone();
                let post_callback: Box<burs_core::production::PostCallback<DemoLang>> =
                    Box::new(move |_visitor, _node, child_results: Vec<String>| {
                        Ok(format!("{post_callback_target}<-{post_callback_node_type}({})", child_results.join(",")))
                    });
                if head == "pattern" {
                    table.add_pattern_match(target, node_type, cost, child_types, None, None, Some(post_callback));
                } else {
                    table.add_var_args_pattern_match(target, node_type, cost, child_types, None, None, Some(post_callback));
                }
            }
            "closure" => {
                let target = items[1].atom()?.to_string();
                let source = items[2].atom()?.to_string();
                let cost = parse_cost(items[3].atom()?)?;
                let post_target = target.clone();
                let post_callback: Box<burs_core::production::PostCallback<DemoLang>> =
                    Box::new(move |_visitor, _node, child_results: Vec<String>| {
                        Ok(format!("{post_target}<-{}", child_results.into_iter().next().unwrap_or_default()))
                    });
                table.add_closure(target, source, cost, post_callback);
            }
            "tree" => {
                tree = Some(parse_tree(&items[1])?);
            }
            other => return Err(GrammarTextError(format!("unknown form: {other}"))),
        }
    }

    Ok(ParsedGrammar { table, tree })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interprets_patterns_and_closure() {
        let src = r#"
            (pattern Const Num 0 ())
            (pattern Expr Add 1 (Expr Expr))
            (closure Expr Const 0)
            (tree (Add (Num) (Num)))
        "#;
        let parsed = interpret(src).unwrap();
        assert!(parsed.tree.is_some());
        let mut table = parsed.table;
        table.generate_states().unwrap();
        assert!(table.state_count() >= 2);
    }

    #[test]
    fn rejects_unknown_form() {
        let err = interpret("(frobnicate a b c)").unwrap_err();
        assert!(err.to_string().contains("unknown form"));
    }
}
