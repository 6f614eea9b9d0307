// Drives the real binary inside a pseudo terminal: type a custom prompt to
// the end, wait for the results screen with its xp breakdown, then quit.
//
// Needs a pty, so it only builds on unix and is skipped by default:
// `cargo test --test integration_min_session -- --ignored`

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn finished_prompt_reaches_results_screen() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("keyrank");
    let mut p = spawn(format!("{} -p hi", bin.display()))?;
    p.set_expect_timeout(Some(Duration::from_secs(5)));

    p.expect("Novice")?;
    p.send("hi")?;

    // drawn only once the session has been folded into the progress
    p.expect("daily challenges")?;
    p.expect("(r)etry")?;

    p.send("q")?;
    p.expect(Eof)?;
    Ok(())
}
