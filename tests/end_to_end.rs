//! Integration tests exercising the public API as a caller would: define a
//! small grammar over [`SampleTree`], generate states, label and reduce.

use burs_core::error::BursError;
use burs_core::lang::Lang;
use burs_core::reducer::Reducer;
use burs_core::sample_tree::SampleTree;
use burs_core::table::ProductionTable;

struct ArithLang;

impl Lang for ArithLang {
    type Nonterminal = String;
    type NodeType = String;
    type Node = SampleTree;
    type Visitor = ();
    type Output = i64;
}

fn arith_table() -> ProductionTable<ArithLang> {
    let mut table = ProductionTable::<ArithLang>::new();

    table.add_pattern_match(
        "Const".into(),
        "Num".into(),
        0,
        vec![],
        None,
        None,
        Some(Box::new(|_v, _n, _c: Vec<i64>| Ok(1))),
    );
    table.add_pattern_match(
        "Expr".into(),
        "Add".into(),
        1,
        vec!["Expr".into(), "Expr".into()],
        None,
        None,
        Some(Box::new(|_v, _n, c: Vec<i64>| Ok(c[0] + c[1]))),
    );
    table.add_closure(
        "Expr".into(),
        "Const".into(),
        0,
        Box::new(|_v, _n, c: Vec<i64>| Ok(c[0])),
    );

    table
}

#[test]
fn labels_and_reduces_a_small_tree() {
    let mut table = arith_table();
    table.generate_states().unwrap();

    let tree = SampleTree::node("Add", vec![SampleTree::leaf("Num"), SampleTree::leaf("Num")]);
    let reducer = Reducer::new(&table);
    reducer.label(&tree);

    let result = reducer.reduce(&mut (), &tree, &"Expr".to_string()).unwrap();
    assert_eq!(result, 2);
}

#[test]
fn leaf_reduces_through_closure() {
    let mut table = arith_table();
    table.generate_states().unwrap();

    let tree = SampleTree::leaf("Num");
    let reducer = Reducer::new(&table);
    reducer.label(&tree);

    let result = reducer.reduce(&mut (), &tree, &"Expr".to_string()).unwrap();
    assert_eq!(result, 1);
}

#[test]
fn generate_states_is_idempotent() {
    let mut table = arith_table();
    table.generate_states().unwrap();
    let count = table.state_count();
    table.generate_states().unwrap();
    assert_eq!(table.state_count(), count);
}

#[test]
fn var_args_pattern_absorbs_extra_operands() {
    let mut table = ProductionTable::<ArithLang>::new();
    table.add_pattern_match(
        "Const".into(),
        "Num".into(),
        0,
        vec![],
        None,
        None,
        Some(Box::new(|_v, _n, _c: Vec<i64>| Ok(1))),
    );
    table.add_closure(
        "Item".into(),
        "Const".into(),
        0,
        Box::new(|_v, _n, c: Vec<i64>| Ok(c[0])),
    );
    table.add_var_args_pattern_match(
        "Sum".into(),
        "List".into(),
        1,
        vec!["Item".into()],
        None,
        None,
        Some(Box::new(|_v, _n, c: Vec<i64>| Ok(c.iter().sum()))),
    );
    table.generate_states().unwrap();

    let tree = SampleTree::node(
        "List",
        vec![SampleTree::leaf("Num"), SampleTree::leaf("Num"), SampleTree::leaf("Num")],
    );
    let reducer = Reducer::new(&table);
    reducer.label(&tree);
    let result = reducer.reduce(&mut (), &tree, &"Sum".to_string()).unwrap();
    assert_eq!(result, 3);
}

#[test]
fn cheaper_pattern_wins_over_more_expensive_one() {
    let mut table = ProductionTable::<ArithLang>::new();
    table.add_pattern_match(
        "Expr".into(),
        "Num".into(),
        5,
        vec![],
        None,
        None,
        Some(Box::new(|_v, _n, _c: Vec<i64>| Ok(100))),
    );
    table.add_pattern_match(
        "Expr".into(),
        "Num".into(),
        1,
        vec![],
        None,
        None,
        Some(Box::new(|_v, _n, _c: Vec<i64>| Ok(1))),
    );
    table.generate_states().unwrap();

    let tree = SampleTree::leaf("Num");
    let reducer = Reducer::new(&table);
    reducer.label(&tree);
    let result = reducer.reduce(&mut (), &tree, &"Expr".to_string()).unwrap();
    assert_eq!(result, 1);
}

#[test]
fn closure_cycle_is_rejected_before_generation() {
    let mut table = ProductionTable::<ArithLang>::new();
    table.add_closure("A".into(), "B".into(), 0, Box::new(|_v, _n, c: Vec<i64>| Ok(c[0])));
    table.add_closure("B".into(), "A".into(), 0, Box::new(|_v, _n, c: Vec<i64>| Ok(c[0])));

    let err = table.generate_states().unwrap_err();
    assert!(matches!(err, BursError::ClosureCycle { .. }));
}

#[test]
fn unlabeled_node_fails_to_reduce() {
    let table = ProductionTable::<ArithLang>::new();
    let tree = SampleTree::leaf("Mystery");
    let reducer = Reducer::new(&table);
    reducer.label(&tree);

    let err = reducer.reduce(&mut (), &tree, &"Expr".to_string()).unwrap_err();
    assert!(matches!(err, BursError::UnlabeledNode));
}

#[test]
fn no_production_for_unreachable_goal() {
    let mut table = arith_table();
    table.generate_states().unwrap();

    let tree = SampleTree::leaf("Num");
    let reducer = Reducer::new(&table);
    reducer.label(&tree);

    let err = reducer.reduce(&mut (), &tree, &"Statement".to_string()).unwrap_err();
    assert!(matches!(err, BursError::NoProduction { .. }));
}
