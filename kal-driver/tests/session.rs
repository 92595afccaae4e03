//! Whole-session behaviour over a byte stream, as when reading stdin

use kal_common::SourceLocation;
use kal_driver::{Outcome, Session, SessionOptions};
use kal_frontend::{Parser, ReaderSource};
use kal_vm::ExecutionEngine;
use pretty_assertions::assert_eq;

type ByteSession<'a> = Session<ReaderSource<&'a [u8]>, Vec<u8>>;

fn session(source: &str, options: SessionOptions) -> ByteSession<'_> {
    let parser = Parser::with_filename(ReaderSource::new(source.as_bytes()), "script.kal");
    Session::new(parser, ExecutionEngine::new(), Vec::new(), options)
}

fn transcript(session: &ByteSession<'_>) -> String {
    String::from_utf8_lossy(session.diagnostics()).into_owned()
}

#[test]
fn test_script_with_operators_and_loops() {
    let source = "
# Logical operators built from conditionals
def unary!(v) if v then 0 else 1;
def binary& 6 (l r) if !l then 0 else !!r;

extern putchard(c);
def line(n) for i = 0, i < n in putchard(42);

line(3) : putchard(10);
1 & 0;
1 & 2;
";
    let mut s = session(source, SessionOptions::default());
    s.run().unwrap();

    assert_eq!(s.engine_mut().take_output(), "***\n");
    assert_eq!(
        transcript(&s),
        "Evaluated to 0\nEvaluated to 0\nEvaluated to 1\n"
    );
    assert!(!s.has_errors());
}

#[test]
fn test_errors_are_counted_and_located() {
    let source = "def f(x) x;\ndef f(y) y;\n1 +;\nf(2);\n";
    let mut s = session(source, SessionOptions::default());
    s.run().unwrap();

    let text = transcript(&s);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Error: Code generation error: Function 'f' cannot be redefined",
            "Error: Parse error at script.kal:3:4: expected expression, found ';'",
            "Evaluated to 2",
            "2 errors",
        ]
    );
    assert_eq!(s.reporter().error_count(), 2);

    let diagnostics = s.reporter().diagnostics();
    assert_eq!(diagnostics[0].location, None);
    assert_eq!(diagnostics[1].location, Some(SourceLocation::new("script.kal", 3, 4)));
}

#[test]
fn test_lexical_error_reported() {
    let mut s = session("1.2.3 + 1;\n4;", SessionOptions::default());
    assert_eq!(s.step().unwrap(), Outcome::Error);
    assert_eq!(s.step().unwrap(), Outcome::Success);

    let text = transcript(&s);
    assert!(
        text.starts_with("Error: Lexical error at script.kal:1:1: invalid number literal '1.2.3'"),
        "{text}"
    );
    assert!(text.ends_with("Evaluated to 4\n"));
}

#[test]
fn test_missing_terminator_between_units() {
    let mut s = session("1 2; 3;", SessionOptions::default());
    s.run().unwrap();
    let text = transcript(&s);
    assert!(text.contains("expected ';' after top-level construct, found number 2"));
    assert!(text.contains("Evaluated to 3"));
}
