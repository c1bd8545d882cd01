//! End-to-end reduction tests: arithmetic, functions, collections,
//! objects, and dispatch precedence.

use pretty_assertions::assert_eq;
use triad::{NoPrint, Object, ReplSession};

fn eval(source: &str) -> Object {
    ReplSession::new()
        .execute(source, &mut NoPrint)
        .unwrap_or_else(|err| panic!("{source:?} failed: {err}"))
}

fn render(source: &str) -> String {
    ReplSession::new()
        .execute_rendered(source, &mut NoPrint)
        .unwrap_or_else(|err| panic!("{source:?} failed: {err}"))
}

// =============================================================================
// Arithmetic and shape
// =============================================================================

/// Heads apply left to right; there is no operator precedence.
#[test]
fn arithmetic_is_left_associative() {
    assert_eq!(eval("1 + 2 * 3"), Object::int(9));
    assert_eq!(eval("2 * 3 + 4"), Object::int(10));
}

/// Integers are arbitrary precision: this product does not fit in u64.
#[test]
fn arithmetic_is_arbitrary_precision() {
    assert_eq!(
        eval("1000000000000 * 1000000000000").to_string(),
        "1000000000000000000000000"
    );
}

/// Division is floor division.
#[test]
fn division_floors() {
    assert_eq!(eval("7 / 2"), Object::int(3));
    assert_eq!(eval("0 - 7 / 2"), Object::int(-4));
}

/// The infinity literals absorb arithmetic.
#[test]
fn infinity_literals() {
    assert_eq!(eval("_ + 1"), Object::Inf);
    assert_eq!(eval("__ + 1"), Object::NegInf);
    assert_eq!(eval("5 / _"), Object::int(0));
}

/// A tree with a cons head is a value: reducing it returns it unchanged.
#[test]
fn cons_trees_are_values() {
    assert_eq!(render("1 : 2"), "(1 : 2)");
    assert_eq!(render("1 . 2"), "(1 . 2)");
}

/// Empty parens of all kinds are the empty value.
#[test]
fn unit_forms() {
    assert_eq!(eval("()"), Object::Unit);
    assert_eq!(eval("[]"), Object::Unit);
    assert_eq!(eval("{}"), Object::Unit);
}

// =============================================================================
// Environment and sequencing
// =============================================================================

/// Assignments persist across a separator chain and reads go through `$`.
#[test]
fn assignment_under_sequencing() {
    assert_eq!(eval("(a := 1) | (a := .$a + 2) | .$a"), Object::int(3));
}

/// `as` binds locally, `to` assigns through the chain.
#[test]
fn bind_and_assign_forms() {
    assert_eq!(eval("(5 as b) | .$b"), Object::int(5));
    assert_eq!(eval("(5 as b) | (6 to b) | .$b"), Object::int(6));
}

/// The separator evaluates the left side, discards it, and tail-continues.
#[test]
fn separator_discards_left() {
    assert_eq!(eval("1 + 1 | 42"), Object::int(42));
}

/// `$` falls back to its left operand when the name is unbound.
#[test]
fn lookup_falls_back_to_left_operand() {
    assert_eq!(eval("7 $ missing"), Object::int(7));
}

// =============================================================================
// Functions
// =============================================================================

/// The canonical application form: a funthunk in head position.
#[test]
fn funthunk_application() {
    assert_eq!(eval("41 {x | x + 1} ()"), Object::int(42));
}

/// Two-parameter functions name both operands in a cons header.
#[test]
fn two_parameter_functions() {
    assert_eq!(eval("10 {(a:b) | a - b} 4"), Object::int(6));
}

/// A headerless funthunk gets the default parameter names `x` and `y`.
#[test]
fn default_parameter_names() {
    assert_eq!(eval("20 {x + y} 22"), Object::int(42));
}

/// Promotion with `func` on a thunk, then application.
#[test]
fn explicit_func_promotion() {
    assert_eq!(eval("(f := ([x + 1] func ())) | 41 (.$f) ()"), Object::int(42));
}

/// Closures see their defining environment.
#[test]
fn closures_capture_lexically() {
    assert_eq!(eval("(a := 5) | (f := {x | x + .$a}) | 10 (.$f) ()"), Object::int(15));
}

/// `!` applies its right operand to its left.
#[test]
fn invoke_operator() {
    assert_eq!(eval("41 ! {x | x + 1}"), Object::int(42));
}

/// `bake` unwraps thunks inside a function body: the unbaked function
/// returns its body thunk as a value, the baked one evaluates it.
#[test]
fn bake_strips_thunks_from_function_bodies() {
    let prefix = "(f := ({x | [x + 1]} func ()))";
    let unbaked = eval(&format!("{prefix} | (41 (.$f) ()) t ()"));
    assert_eq!(unbaked, Object::Symbol("THUNK".to_owned()));
    let baked = eval(&format!("{prefix} | (g := ((.$f) bake ())) | 41 (.$g) ()"));
    assert_eq!(baked, Object::int(42));
}

/// `bake` rejects operands that are not functions.
#[test]
fn bake_requires_a_function() {
    assert!(matches!(eval("5 bake ()"), Object::Error { .. }));
}

/// A deep self-recursive countdown runs in bounded stack because the
/// reducer reuses the topmost function frame for same-function calls.
#[test]
fn tail_recursion_is_flattened() {
    let source = "(count := {n | n = 0 ? ([0] : [(n - 1) F ()])}) | 100000 (.$count) ()";
    assert_eq!(eval(source), Object::int(0));
}

/// The self-binding `F` names the currently applied function.
#[test]
fn self_reference_is_bound() {
    let source = "(fact := {n | n = 0 ? ([1] : [n * ((n - 1) F ())])}) | 10 (.$fact) ()";
    assert_eq!(eval(source), Object::int(3_628_800));
}

// =============================================================================
// Conditionals
// =============================================================================

/// `(then : else) if cond` and the flipped `cond ? (then : else)`.
#[test]
fn conditional_forms() {
    assert_eq!(eval("(10 : 20) if 1"), Object::int(10));
    assert_eq!(eval("(10 : 20) if 0"), Object::int(20));
    assert_eq!(eval("1 ? (10 : 20)"), Object::int(10));
    assert_eq!(eval("0 then (10 : 20)"), Object::int(20));
}

/// Thunk branches only evaluate when selected.
#[test]
fn unselected_branch_stays_cold() {
    // The else branch divides by zero; selecting then must not touch it.
    assert_eq!(eval("1 ? ([42] : [1 / 0])"), Object::int(42));
}

// =============================================================================
// Strings and symbols
// =============================================================================

#[test]
fn string_operations() {
    assert_eq!(eval("\"foo\" ++ \"bar\""), Object::String("foobar".to_owned()));
    assert_eq!(eval("\"hello\" len ()"), Object::int(5));
    assert_eq!(eval("\"hello\" at 1"), Object::String("e".to_owned()));
    assert_eq!(eval("\"hello\" take 2"), Object::String("he".to_owned()));
    assert_eq!(eval("\"hello\" drop 3"), Object::String("lo".to_owned()));
    assert_eq!(eval("\"42\" tonum ()"), Object::int(42));
}

#[test]
fn type_inspection() {
    assert_eq!(eval("5 t ()"), Object::Symbol("NUM".to_owned()));
    assert_eq!(eval("\"s\" t ()"), Object::Symbol("STRING".to_owned()));
    assert_eq!(eval("5 sametype 9"), Object::int(1));
    assert_eq!(eval("5 sametype \"s\""), Object::int(0));
}

// =============================================================================
// Vectors, sets, ranges, matrices
// =============================================================================

/// `,` chains into a single flat vec.
#[test]
fn comma_builds_vecs() {
    assert_eq!(
        eval("1 , 2 , 3"),
        Object::Vec(vec![Object::int(1), Object::int(2), Object::int(3)])
    );
}

/// The fold/scan pair from the vec module.
#[test]
fn fold_and_scan() {
    assert_eq!(eval("(1 , 2 , 3) fold \"+\""), Object::int(6));
    assert_eq!(
        eval("(1 , 2 , 3) scan \"+\""),
        Object::Vec(vec![Object::int(1), Object::int(3), Object::int(6)])
    );
}

/// `each` maps a function, `choose` filters by a predicate.
#[test]
fn each_and_choose() {
    assert_eq!(
        eval("(1 , 2 , 3) each {x | x * 10}"),
        Object::Vec(vec![Object::int(10), Object::int(20), Object::int(30)])
    );
    assert_eq!(
        eval("(1 , 2 , 3 , 4) choose {x | x > 2}"),
        Object::Vec(vec![Object::int(3), Object::int(4)])
    );
}

#[test]
fn zip_and_order() {
    assert_eq!(eval("((1 , 2) zip (3 , 4)) len ()"), Object::int(2));
    assert_eq!(
        eval("(3 , 1 , 2) order ()"),
        Object::Vec(vec![Object::int(1), Object::int(2), Object::int(3)])
    );
}

#[test]
fn vec_access_and_concat() {
    assert_eq!(eval("(1 , 2 , 3) at 1"), Object::int(2));
    assert_eq!(eval("((1 , 2) ++ (3 , 4)) len ()"), Object::int(4));
    assert_eq!(
        eval("(1 , 2 , 3 , 4) drop 1 take 2"),
        Object::Vec(vec![Object::int(2), Object::int(3)])
    );
}

#[test]
fn num_set_membership() {
    assert_eq!(eval("((1 , 2 , 2 , 3) toset ()) len ()"), Object::int(3));
    assert_eq!(eval("((1 , 2) toset ()) has 2"), Object::int(1));
    assert_eq!(eval("((1 , 2) toset ()) has 9"), Object::int(0));
    assert_eq!(eval("(((1 , 2) toset ()) put 5) len ()"), Object::int(3));
}

#[test]
fn ranges_are_lazy_progressions() {
    assert_eq!(
        eval("(3 range 4) tovec ()"),
        Object::Vec(vec![Object::int(3), Object::int(4), Object::int(5), Object::int(6)])
    );
    assert_eq!(
        eval("((0 range 3) by 2) tovec ()"),
        Object::Vec(vec![Object::int(0), Object::int(2), Object::int(4)])
    );
    assert_eq!(eval("((3 range 4) + 10) at 0"), Object::int(13));
    assert_eq!(eval("(1 range 4) fold \"+\""), Object::int(10));
    assert_eq!(eval("(0 range _) len ()"), Object::Inf);
}

#[test]
fn num_vec_elementwise_arithmetic() {
    assert_eq!(
        eval("((1 , 2 , 3) tonumvec ()) * 10"),
        Object::Vec(vec![Object::int(10), Object::int(20), Object::int(30)])
    );
    assert_eq!(eval("((1 , 2 , 3) tonumvec ()) sum ()"), Object::int(6));
    assert_eq!(eval("((1 , 2 , 3) tonumvec ()) fold \"*\""), Object::int(6));
}

#[test]
fn matrices_reshape_and_compute_elementwise() {
    let prefix = "(m := ((1 , 2 , 3 , 4) tonumvec ()) tomatrix ())";
    assert_eq!(eval(&format!("{prefix} | (.$m) rank ()")), Object::int(1));
    assert_eq!(
        eval(&format!("{prefix} | ((.$m) reshape ((2 , 2) tonumvec ())) rank ()")),
        Object::int(2)
    );
    assert_eq!(
        render(&format!("{prefix} | ((.$m) reshape ((2 , 2) tonumvec ())) + 10")),
        "11 13 \n12 14 "
    );
}

// =============================================================================
// Objects, module paths, functors, pointers
// =============================================================================

/// `@` writes through a `name : value` cons and reads by symbol.
#[test]
fn object_slots() {
    assert_eq!(eval("(o := () obj ()) | ((.$o) @ (size : 7)) | (.$o) @ size"), Object::int(7));
    assert_eq!(eval("(o := () obj ()) | ((.$o) @ (size : 7)) | (.$o) has size"), Object::int(1));
}

/// A cons-headed head tree resolves as a module path.
#[test]
fn module_path_heads() {
    let source = "(m := () obj ()) | ((.$m) @ (double : {x | x * 2})) | 21 (m . double) ()";
    assert_eq!(eval(source), Object::int(42));
}

/// `load`-style member access also works through an already-evaluated
/// object in the path.
#[test]
fn module_path_through_value() {
    let source = "(m := () obj ()) | ((.$m) @ (double : {x | x * 2})) | 21 ((.$m) . double) ()";
    assert_eq!(eval(source), Object::int(42));
}

#[test]
fn some_functor_binds() {
    assert_eq!(eval("(5 Some ()) >>= {x | x + 1}"), Object::int(6));
    assert_eq!(eval("() >>= {x | x + 1}"), Object::Unit);
    assert_eq!(eval("(5 Some ()) open ()"), Object::int(5));
}

#[test]
fn truth_functors_construct() {
    assert_eq!(eval("(() true ()) t ()"), Object::Symbol("true".to_owned()));
    assert_eq!(eval("(() true ()) not ()"), Object::int(0));
    assert_eq!(eval("(() false ()) not ()"), Object::int(1));
}

#[test]
fn pointers_share_mutable_state() {
    assert_eq!(eval("(p := 3 pointer ()) | ((.$p) set 10) | (.$p) get ()"), Object::int(10));
}

// =============================================================================
// Dispatch precedence
// =============================================================================

/// The operand-specialized module entry wins over the plain one.
#[test]
fn dispatch_prefers_operand_specialized_entry() {
    let source = "((.$NUM) @ (\"+:NUM\" : {(x:y) | 222})) | ((.$NUM) @ (\"+\" : {(x:y) | 111})) | 1 + 2";
    assert_eq!(eval(source), Object::int(222));
}

/// The plain module entry wins over the ambient environment.
#[test]
fn dispatch_prefers_module_over_ambient() {
    let source = "((.$NUM) @ (\"plusop\" : {(x:y) | 444})) | ({(x:y) | 555} as plusop) | 1 plusop 2";
    assert_eq!(eval(source), Object::int(444));
}

/// With no module entry, the ambient environment resolves the operator.
#[test]
fn dispatch_falls_back_to_ambient() {
    assert_eq!(eval("({(x:y) | 333} as plusop) | 1 plusop 2"), Object::int(333));
}

/// `dispatch` registers an operation for the witness value's type.
#[test]
fn dispatch_builtin_registers_operations() {
    let source = "({(x:y) | x * 100} dispatch (0 : \"hundredfold\")) | 4 hundredfold ()";
    assert_eq!(eval(source), Object::int(400));
}
