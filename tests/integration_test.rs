// ABOUTME: End-to-end tests driving the whole pipeline through a Session

use lambdora::error::LambError;
use lambdora::session::Session;
use lambdora::value::Value;
use num_bigint::BigInt;

fn int(n: i64) -> Value {
    Value::Int(BigInt::from(n))
}

fn run(session: &Session, source: &str) -> Result<Value, LambError> {
    session.run_expr(source, "<test>")
}

#[test]
fn test_simple_addition() {
    let session = Session::bare();
    assert_eq!(run(&session, "(+ 1 2)").unwrap(), int(3));
}

#[test]
fn test_if_expressions() {
    let session = Session::bare();
    assert_eq!(run(&session, "(if true 1 2)").unwrap(), int(1));
    assert_eq!(run(&session, "(if false 1 2)").unwrap(), int(2));
    assert!(matches!(
        run(&session, "(if 42 1 2)"),
        Err(LambError::Eval(_))
    ));
}

#[test]
fn test_define_then_call() {
    let session = Session::bare();
    run(&session, "(define sq (lambda x . (* x x)))").unwrap();
    assert_eq!(run(&session, "(sq 7)").unwrap(), int(49));
}

#[test]
fn test_recursion_via_define() {
    let session = Session::bare();
    run(
        &session,
        "(define f (lambda n . (if (= n 0) 1 (* n (f (- n 1))))))",
    )
    .unwrap();
    assert_eq!(run(&session, "(f 10)").unwrap(), int(3628800));
}

#[test]
fn test_when_macro() {
    let session = Session::bare();
    run(&session, "(defmacro when (c b) (if c b nil))").unwrap();
    assert_eq!(run(&session, "(when true 42)").unwrap(), int(42));
    assert_eq!(run(&session, "(when false 42)").unwrap(), Value::Nil);
}

#[test]
fn test_swap_macro_prints_reversed_pair() {
    let session = Session::bare();
    run(&session, "(defmacro swap (a b) (cons b (cons a nil)))").unwrap();
    let result = run(&session, "(swap 1 2)").unwrap();
    assert_eq!(format!("{result}"), "(2 1)");
}

#[test]
fn test_macro_fails_gracefully() {
    let session = Session::bare();
    run(&session, "(defmacro noop () nil)").unwrap();
    assert_eq!(run(&session, "(noop)").unwrap(), Value::Nil);
}

#[test]
fn test_closure_capture() {
    let session = Session::bare();
    assert_eq!(
        run(&session, "((lambda x . (lambda y . x)) 3 4)").unwrap(),
        int(3)
    );
}

#[test]
fn test_nil_is_not_false() {
    let session = Session::bare();
    assert_eq!(run(&session, "(isNil nil)").unwrap(), Value::Bool(true));
    assert_eq!(run(&session, "(isNil false)").unwrap(), Value::Bool(false));
    assert!(run(&session, "(if nil 1 2)").is_err());
}

#[test]
fn test_quote_eval_round_trip() {
    let session = Session::bare();
    for source in [
        "(+ 1 2)",
        "(lambda x . (+ x 1))",
        "(if (= n 0) 1 (* n 2))",
        "'(a b)",
    ] {
        let value = run(&session, &format!("(quote {source})")).unwrap();
        match value {
            Value::Expr(_) => assert_eq!(format!("{value}"), source),
            other => panic!("Expected Expr value for {source:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_deep_tail_recursion_via_trampoline() {
    let session = Session::bare();
    run(
        &session,
        "(define loop (lambda n . (lambda acc . (if (= n 0) acc (loop (- n 1) (* acc 1))))))",
    )
    .unwrap();
    // Deep enough that host recursion would blow the stack
    assert_eq!(run(&session, "(loop 150000 1)").unwrap(), int(1));
}

#[test]
#[ignore = "expensive; exercises the million-call tail bound"]
fn test_million_call_tail_recursion() {
    let session = Session::bare();
    run(
        &session,
        "(define sumto (lambda n . (lambda acc . (if (= n 0) acc (sumto (- n 1) (+ acc n))))))",
    )
    .unwrap();
    assert_eq!(
        run(&session, "(sumto 1000001 0)").unwrap(),
        Value::Int(BigInt::from(1_000_001i64) * BigInt::from(1_000_002i64) / BigInt::from(2))
    );
}

#[test]
fn test_letrec_mutual_recursion_deep() {
    let session = Session::bare();
    let source = "(letrec ((even? (lambda n . (if (= n 0) true (odd? (- n 1)))))
                          (odd? (lambda n . (if (= n 0) false (even? (- n 1))))))
                    (odd? 10001))";
    assert_eq!(run(&session, source).unwrap(), Value::Bool(true));
}

#[test]
fn test_letrec_uninitialised_read() {
    let session = Session::bare();
    assert!(matches!(
        run(&session, "(letrec ((x x)) x)"),
        Err(LambError::RecursionInit(_))
    ));
}

#[test]
fn test_head_of_integer_is_builtin_error() {
    let session = Session::bare();
    assert!(matches!(
        run(&session, "(head 42)"),
        Err(LambError::Builtin { .. })
    ));
}

#[test]
fn test_factorial_of_100_is_exact() {
    let session = Session::bare();
    run(
        &session,
        "(define fact (lambda n . (if (= n 0) 1 (* n (fact (- n 1))))))",
    )
    .unwrap();
    let value = run(&session, "(fact 100)").unwrap();
    match value {
        Value::Int(n) => {
            let mut expected = BigInt::from(1);
            for k in 1..=100 {
                expected *= k;
            }
            assert_eq!(n, expected);
        }
        other => panic!("Expected Int, got {other:?}"),
    }
}

#[test]
fn test_gensym_macro_hygiene() {
    let session = Session::bare();
    // A user binding with the same printed name a macro might pick must not
    // be clobbered by expansion; the macro argument trees substitute intact
    run(&session, "(define tmp 99)").unwrap();
    run(&session, "(defmacro keep (c b) (if c b nil))").unwrap();
    assert_eq!(run(&session, "(keep true tmp)").unwrap(), int(99));

    // Fresh names from gensym never collide with each other
    let a = run(&session, "(gensym)").unwrap();
    let b = run(&session, "(gensym)").unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_pretty_print_parse_round_trip() {
    use lambdora::parser::parse;
    use lambdora::printer::print_expr;
    use lambdora::tokenizer::tokenize;

    for source in [
        "x",
        "42",
        "(f)",
        "(+ 1 (* 2 3))",
        "(lambda x . (lambda y . (+ x y)))",
        "(define twice (lambda f . (lambda x . (f (f x)))))",
        "(letrec ((a 1)) a)",
        "(defmacro when (c b) (if c b nil))",
        "'(1 2 3)",
        "`(+ 1 ,x)",
    ] {
        let expr = parse(&tokenize(source, "<test>").unwrap()).unwrap();
        let printed = print_expr(&expr);
        let reparsed = parse(&tokenize(&printed, "<test>").unwrap()).unwrap();
        assert_eq!(expr, reparsed, "round trip changed {source:?}");
    }
}

#[test]
fn test_quasiquote_template_computation() {
    let session = Session::bare();
    run(&session, "(define n 5)").unwrap();
    // Nested evaluation position: the rewritten template itself evaluates
    assert_eq!(run(&session, "((lambda x . `(+ ,x ,n)) 1)").unwrap(), int(6));
}

#[test]
fn test_curried_builtin_partial_application() {
    let session = Session::bare();
    run(&session, "(define inc (+ 1))").unwrap();
    assert_eq!(run(&session, "(inc 41)").unwrap(), int(42));
}
