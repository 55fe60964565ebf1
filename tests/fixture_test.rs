// Runs the feature tour in demos/fixture.c end to end

mod common;

use common::{load, output};
use csubset::memory::value::Value;
use csubset::InterpreterConfig;
use pretty_assertions::assert_eq;

const FIXTURE: &str = include_str!("../demos/fixture.c");

#[test]
fn test_fixture_output() {
    let mut interpreter = load(FIXTURE, "42\nhello world\n", InterpreterConfig::default());
    let status = interpreter.run().expect("Execution failed");
    assert_eq!(status, 0);

    let output = output(&interpreter);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Sum of 10 and 20 = 30",
            "Fixed value: 42",
            "Hello from greet!",
            "Person: age = 25, initial = J",
            "Union d: i = 100",
            "Union d: f = 3.140000",
            "Factorial of 5 = 120",
            "x is even",
            "Result from testConditions(2) = 20",
            "While loop: 0 1 2 ",
            "Do-while loop: 0 1 2 ",
            "For loop: 0 1 2 ",
            "Enter an integer: You entered: 42",
            "Enter a string: hello world",
        ]
    );
}

#[test]
fn test_fixture_functions_callable_directly() {
    let mut interpreter = load(FIXTURE, "", InterpreterConfig::default());

    let sum = interpreter
        .call_function("sum", vec![Value::Int(10), Value::Int(20)])
        .unwrap();
    assert_eq!(sum, Value::Int(30));
    assert_eq!(interpreter.call_function("fixedValue", vec![]).unwrap(), Value::Int(42));

    for (n, expected) in [(0, 1), (1, 1), (5, 120)] {
        let result = interpreter.call_function("factorial", vec![Value::Int(n)]).unwrap();
        assert_eq!(result, Value::Int(expected));
    }

    assert_eq!(
        interpreter.call_function("testConditions", vec![Value::Int(2)]).unwrap(),
        Value::Int(20)
    );
    assert_eq!(
        interpreter.call_function("testConditions", vec![Value::Int(7)]).unwrap(),
        Value::Int(30)
    );
    assert_eq!(output(&interpreter), "x is even\nx is odd\n");
    assert_eq!(interpreter.call_depth(), 0);
}

#[test]
fn test_fixture_without_input_fails_cleanly() {
    let mut interpreter = load(FIXTURE, "", InterpreterConfig::default());
    let err = interpreter.run().unwrap_err();
    assert!(matches!(err, csubset::RuntimeError::InputExhausted { .. }));
    assert!(!err.is_fatal());
    assert_eq!(interpreter.call_depth(), 0);
    assert!(output(&interpreter).ends_with("Enter an integer: "));
}
