use std::process::{exit, Command};

/// Precision features are exclusive, so every set names exactly one of them.
const FEATURE_SETS: &[&str] = &[
    "f64",
    "f64,parallel",
    "f64,stl-io",
    "f64,truetype-text",
    "f64,parallel,stl-io,truetype-text",
    "f32",
    "f32,parallel",
    "f32,stl-io",
    "f32,truetype-text",
];

type XtaskResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    let cmd = std::env::args().nth(1);
    let result = match cmd.as_deref() {
        Some("test-all") => test_all(),
        Some("demo") => cargo(&["run", "--release", "--bin", "meshkit3d"]),
        Some("features") => {
            FEATURE_SETS.iter().for_each(|set| println!("{set}"));
            Ok(())
        }
        _ => {
            eprintln!("usage: cargo xtask <test-all | demo | features>");
            exit(2);
        }
    };
    if let Err(e) = result {
        eprintln!("xtask: {e}");
        exit(1);
    }
}

fn test_all() -> XtaskResult {
    cargo(&["test", "--release"])?;
    for set in FEATURE_SETS {
        println!("\n=== meshkit3d with features [{set}]\n");
        cargo(&["test", "--release", "--no-default-features", "--features", set])?;
    }
    Ok(())
}

fn cargo(args: &[&str]) -> XtaskResult {
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        return Err(format!("`cargo {}` exited with {status}", args.join(" ")).into());
    }
    Ok(())
}
