use std::io::Write;

use clipgen::clipboard::MemoryClipboard;
use clipgen::repl::{Outcome, Session, READY};

fn run(session: &mut Session<MemoryClipboard>, line: &str) -> (Outcome, String) {
    let mut out = Vec::new();
    let outcome = session.handle_line(line, &mut out);
    (outcome, String::from_utf8(out).unwrap())
}

#[test]
fn result_goes_to_clipboard() {
    let mut s = Session::new(MemoryClipboard::default());
    let (outcome, out) = run(&mut s, "'ab' * 3");
    assert_eq!(outcome, Outcome::Copied("ababab".into()));
    assert_eq!(out.trim_end(), READY);
    assert_eq!(s.clipboard().contents, "ababab");
    assert_eq!(s.history().get(-1).unwrap(), "'ab' * 3");
}

#[test]
fn evaluation_error_leaves_clipboard_alone() {
    let mut s = Session::new(MemoryClipboard::with_contents("keep"));
    let (outcome, out) = run(&mut s, "1 / 0");
    assert_eq!(outcome, Outcome::EvalFailed);
    assert!(out.starts_with("Evaluation error: division by zero"));
    assert_eq!(s.clipboard().contents, "keep");
    assert_eq!(s.clipboard().writes, 0);

    let (outcome, out) = run(&mut s, "nosuchthing");
    assert_eq!(outcome, Outcome::EvalFailed);
    assert!(out.contains("'nosuchthing' is not defined"));
    // failed input is still recorded
    assert_eq!(s.history().get(-1).unwrap(), "nosuchthing");
}

#[test]
fn history_recall_is_not_recorded_again() {
    let mut s = Session::new(MemoryClipboard::default());
    run(&mut s, "cs(5)");
    run(&mut s, "'x' * 2");

    let (outcome, _) = run(&mut s, "!!");
    assert_eq!(outcome, Outcome::Copied("xx".into()));
    let (outcome, _) = run(&mut s, "!-2");
    assert_eq!(outcome, Outcome::Copied("2*4*6".into()));
    let (outcome, _) = run(&mut s, "!8");
    assert_eq!(outcome, Outcome::Copied("2*4*6".into()));

    let entries: Vec<&str> = s.history().iter().collect();
    assert_eq!(&entries[8..], ["cs(5)", "'x' * 2"]);
    assert!(entries[..8].iter().all(|e| e.is_empty()));
}

#[test]
fn bare_bang_lists_without_copying() {
    let mut s = Session::new(MemoryClipboard::default());
    run(&mut s, "1 + 1");
    let (outcome, out) = run(&mut s, "!");
    assert_eq!(outcome, Outcome::Idle);
    assert!(out.starts_with("Last ten items:\n(0) \n"));
    assert!(out.contains("(9) 1 + 1\n"));
    assert_eq!(s.clipboard().writes, 1);
}

#[test]
fn bad_history_references_are_reported() {
    let mut s = Session::new(MemoryClipboard::default());
    let (outcome, out) = run(&mut s, "!abc");
    assert_eq!(outcome, Outcome::Idle);
    assert!(out.starts_with("History error: invalid history reference"));

    let (outcome, out) = run(&mut s, "!12");
    assert_eq!(outcome, Outcome::Idle);
    assert!(out.starts_with("History error: history index out of range: 12"));
    assert_eq!(s.clipboard().writes, 0);
}

#[test]
fn recalling_an_empty_slot_does_nothing() {
    let mut s = Session::new(MemoryClipboard::default());
    let (outcome, out) = run(&mut s, "!0");
    assert_eq!(outcome, Outcome::Idle);
    assert!(out.is_empty());
}

#[test]
fn blank_input_is_recorded_but_not_evaluated() {
    let mut s = Session::new(MemoryClipboard::default());
    run(&mut s, "'a'");
    let (outcome, _) = run(&mut s, "");
    assert_eq!(outcome, Outcome::Idle);
    assert_eq!(s.history().get(-1).unwrap(), "");
    assert_eq!(s.history().get(-2).unwrap(), "'a'");
}

#[test]
fn bare_function_names_are_called() {
    let mut s = Session::new(MemoryClipboard::default());
    let (outcome, _) = run(&mut s, "now");
    let Outcome::Copied(now) = outcome else {
        panic!("expected copy, got {:?}", outcome);
    };
    assert!(now.parse::<u64>().is_ok());
    assert_eq!(s.history().get(-1).unwrap(), "now()");

    let (outcome, _) = run(&mut s, "asn");
    let Outcome::Copied(asn) = outcome else {
        panic!("expected copy, got {:?}", outcome);
    };
    assert_eq!(asn.len(), 20);
}

#[test]
fn help_prints_and_copies() {
    let mut s = Session::new(MemoryClipboard::default());
    let (outcome, out) = run(&mut s, "help");
    assert!(matches!(outcome, Outcome::Copied(_)));
    assert!(out.contains("A history of the last 10 expressions"));
    assert!(out.ends_with(&format!("{}\n", READY)));
}

#[test]
fn textfile_reads_and_reports_missing_files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "line one\nline two").unwrap();
    let path = file.path().to_str().unwrap().replace('\\', "\\\\");

    let mut s = Session::new(MemoryClipboard::default());
    let (outcome, _) = run(&mut s, &format!("textfile('{}')", path));
    assert_eq!(outcome, Outcome::Copied("line one\nline two".into()));

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let missing = missing.to_str().unwrap().replace('\\', "\\\\");
    let (outcome, out) = run(&mut s, &format!("textfile('{}')", missing));
    assert_eq!(outcome, Outcome::EvalFailed);
    assert!(out.starts_with("Evaluation error:"));
    assert!(out.contains("missing.txt"));
}

#[test]
fn oversized_input_is_an_evaluation_error() {
    let mut s = Session::new(MemoryClipboard::with_contents("keep"));
    let (outcome, out) = run(&mut s, &"(".repeat(100_000));
    assert_eq!(outcome, Outcome::EvalFailed);
    assert!(out.contains("nested too deeply"));

    let (outcome, out) = run(&mut s, "[CHR256] * 100000000");
    assert_eq!(outcome, Outcome::EvalFailed);
    assert!(out.contains("result too large"));
    assert_eq!(s.clipboard().contents, "keep");
}

#[test]
fn large_floats_use_exponent_form() {
    let mut s = Session::new(MemoryClipboard::default());
    let (outcome, _) = run(&mut s, "10.0 ** 16");
    assert_eq!(outcome, Outcome::Copied("1e+16".into()));
    let (outcome, _) = run(&mut s, "1 / 100000");
    assert_eq!(outcome, Outcome::Copied("1e-05".into()));
}
