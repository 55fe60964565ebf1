// Language-level behavior checked through whole programs

mod common;

use common::{load, load_err, output, run, run_err};
use csubset::memory::value::Value;
use csubset::{InterpreterConfig, RuntimeError};
use pretty_assertions::assert_eq;

#[test]
fn test_pure_functions_are_deterministic() {
    let source = r#"
        int mix(int a, int b) { return a * 31 + b % 7; }
        int main() { return 0; }
    "#;
    let mut interpreter = load(source, "", InterpreterConfig::default());
    let first = interpreter
        .call_function("mix", vec![Value::Int(3), Value::Int(12)])
        .unwrap();
    for _ in 0..5 {
        let again = interpreter
            .call_function("mix", vec![Value::Int(3), Value::Int(12)])
            .unwrap();
        assert_eq!(again, first);
    }
    assert_eq!(first, Value::Int(98));
}

#[test]
fn test_union_reads_convert_last_write() {
    let (_, out) = run(
        r#"
        union Data { int i; float f; };
        int main() {
            union Data d;
            d.i = 100;
            printf("%d\n", d.i);
            d.f = 3.14;
            printf("%f\n", d.f);
            printf("%d\n", d.i);
            return 0;
        }
        "#,
        "",
    );
    assert_eq!(out, "100\n3.140000\n3\n");
}

#[test]
fn test_struct_copy_is_independent() {
    let (_, out) = run(
        r#"
        struct Person { int age; char initial; };
        void printPerson(struct Person p) { printf("%d %c\n", p.age, p.initial); }
        int main() {
            struct Person p;
            p.age = 25;
            p.initial = 'J';
            struct Person q = p;
            printPerson(p);
            p.age = 30;
            printPerson(q);
            printPerson(p);
            return 0;
        }
        "#,
        "",
    );
    assert_eq!(out, "25 J\n25 J\n30 J\n");
}

#[test]
fn test_array_round_trip_and_bounds() {
    let (_, out) = run(
        r#"
        int main() {
            int a[5];
            int i;
            for (i = 0; i < 5; i++) a[i] = i * i;
            for (i = 0; i < 5; i++) printf("%d ", a[i]);
            return 0;
        }
        "#,
        "",
    );
    assert_eq!(out, "0 1 4 9 16 ");

    let err = run_err("int main() { int a[5]; a[5] = 1; return 0; }");
    assert!(matches!(err, RuntimeError::IndexOutOfRange { index: 5, len: 5, .. }));
}

#[test]
fn test_exit_status_from_main() {
    assert_eq!(run("int main() { return 3; }", "").0, 3);
    assert_eq!(run("int main() { }", "").0, 0);
}

#[test]
fn test_globals_persist_across_calls() {
    let source = r#"
        int counter = 0;
        void tick() { counter += 1; }
        int main() { tick(); tick(); return counter; }
    "#;
    let mut interpreter = load(source, "", InterpreterConfig::default());
    assert_eq!(interpreter.run().unwrap(), 2);
    assert_eq!(interpreter.global("counter"), Some(&Value::Int(2)));
    assert_eq!(output(&interpreter), "");
}

#[test]
fn test_deep_recursion_within_limit() {
    let (status, _) = run(
        r#"
        int depth(int n) { if (n == 0) return 0; return 1 + depth(n - 1); }
        int main() { return depth(5000) == 5000; }
        "#,
        "",
    );
    assert_eq!(status, 1);
}

#[test]
fn test_runaway_recursion_is_fatal() {
    let source = "int f(int n) { return f(n + 1); } int main() { return f(0); }";
    let mut interpreter = load(source, "", InterpreterConfig::default().with_max_call_depth(200));
    let err = interpreter.run().unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, RuntimeError::StackExhausted { limit: 200, .. }));
}

#[test]
fn test_missing_main() {
    let mut interpreter = load("int helper() { return 1; }", "", InterpreterConfig::default());
    assert_eq!(interpreter.run().unwrap_err(), RuntimeError::NoMainFunction);
}

#[test]
fn test_error_carries_location() {
    let err = run_err("int main() {\n  int z = 0;\n  return 1 / z;\n}");
    let location = err.location().copied().unwrap();
    assert_eq!(location.line, 3);
}

#[test]
fn test_struct_containing_itself_is_rejected_at_load() {
    let err = load_err(
        r#"
        struct A { int v; struct A next; };
        int main() { struct A a; a.v = 1; return 0; }
        "#,
    );
    assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    assert_eq!(err.location().map(|l| l.line), Some(2));
}

#[test]
fn test_mutually_nested_structs_are_rejected() {
    let err = load_err(
        r#"
        struct Outer { struct Inner in; };
        struct Inner { int x; struct Outer back; };
        int main() { return 0; }
        "#,
    );
    assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
}

#[test]
fn test_self_pointer_field_is_accepted() {
    let (status, out) = run(
        r#"
        struct Node { int value; struct Node *next; };
        int main() {
            struct Node n;
            n.value = 4;
            printf("%d", n.value);
            return 0;
        }
        "#,
        "",
    );
    assert_eq!((status, out.as_str()), (0, "4"));
}
