//! Data-driven postfix expression cases.
//!
//! Each `.rpn` file holds an expression line followed by the expected
//! outcome: `=> value` for a result, `!! code` for a diagnostic code.
//! Lines starting with `#` are comments.

use datatest_stable::Utf8Path;
use miette::Diagnostic;

fn outcome(src: &str) -> String {
    match visubind::rpn::evaluate_str(src) {
        Ok(Some(value)) => format!("=> {}", value),
        Ok(None) => "=> (empty)".to_string(),
        Err(e) => format!(
            "!! {}",
            e.code().map(|c| c.to_string()).unwrap_or_default()
        ),
    }
}

fn run_case(path: &Utf8Path) -> datatest_stable::Result<()> {
    let text = std::fs::read_to_string(path)?;
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));

    let src = lines.next().ok_or("missing expression line")?;
    let expected = lines.next().ok_or("missing expected outcome")?;

    let actual = outcome(src);
    if actual != expected {
        return Err(format!("{}: `{}`\n  expected: {}\n  actual:   {}", path, src, expected, actual).into());
    }
    Ok(())
}

datatest_stable::harness! {
    { test = run_case, root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/rpn"), pattern = r"\.rpn$" },
}
