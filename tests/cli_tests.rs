// ABOUTME: Black-box tests running the compiled binary on script files

use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lambdora"))
}

fn script(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("lambdora-test-{}-{name}", std::process::id()));
    fs::write(&path, contents).expect("failed to write test script");
    path
}

#[test]
fn test_runs_simple_script() {
    let path = script("simple.lamb", "(+ 1 2)");
    let output = binary().arg(&path).output().expect("failed to run binary");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3");
}

#[test]
fn test_define_results_are_suppressed() {
    let path = script("define.lamb", "(define x 10)\n(* x 5)");
    let output = binary().arg(&path).output().expect("failed to run binary");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "50");
}

#[test]
fn test_multiple_results_in_order() {
    let path = script("many.lamb", "(+ 1 1)\n(+ 2 2)\n(+ 3 3)");
    let output = binary().arg(&path).output().expect("failed to run binary");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["2", "4", "6"]);
}

#[test]
fn test_prelude_available_in_scripts() {
    let path = script("prelude.lamb", "(fact 5)");
    let output = binary().arg(&path).output().expect("failed to run binary");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "120");
}

#[test]
fn test_no_prelude_flag() {
    let path = script("noprelude.lamb", "(fact 5)");
    let output = binary()
        .arg("--no-prelude")
        .arg(&path)
        .output()
        .expect("failed to run binary");
    let _ = fs::remove_file(&path);

    // fact is gone without the prelude
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unbound variable"));
}

#[test]
fn test_print_interleaves_with_results() {
    let path = script("interleave.lamb", "(print 1)\n(+ 2 2)\n(print 3)");
    let output = binary().arg(&path).output().expect("failed to run binary");
    let _ = fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["1", "4", "3"]);
}

#[test]
fn test_error_exits_nonzero_with_report() {
    let path = script("broken.lamb", "(head 42)");
    let output = binary().arg(&path).output().expect("failed to run binary");
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("head"));
}

#[test]
fn test_tokenize_error_report_names_file() {
    let path = script("lexbad.lamb", "(+ 1 @)");
    let output = binary().arg(&path).output().expect("failed to run binary");
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unexpected character"));
    assert!(stderr.contains("lexbad.lamb"));
}

#[test]
fn test_missing_file_is_an_error() {
    let output = binary()
        .arg("/nonexistent/definitely-not-here.lamb")
        .output()
        .expect("failed to run binary");
    assert!(!output.status.success());
}

#[test]
fn test_repl_banner_and_exit() {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = binary()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start repl");

    child
        .stdin
        .as_mut()
        .expect("stdin")
        .write_all(b"(+ 40 2)\nexit\n")
        .expect("failed to write to repl");

    let output = child.wait_with_output().expect("failed to wait for repl");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lambdora"));
    assert!(stdout.contains("=> 42"));
    assert!(stdout.contains("Goodbye."));
}
