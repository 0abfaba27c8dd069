use bcc::*;

use std::fs;

fn read_dir(path: &str) -> Vec<String> {
    let dir = fs::read_dir(path).unwrap();
    let mut v: Vec<String> = dir.into_iter().map(|x|
        x.unwrap().path().into_os_string().into_string().unwrap()
    ).collect();
    v.sort();
    v
}

fn dummy_arg(path: &str) -> Args {
    Args {
        verbose: false,
        debug: false,
        dot_cfg: None,
        dot_interference: None,
        source: path.to_string()
    }
}

#[test]
fn test_all() {
    let srcs = read_dir("../tests/listings/");
    assert!(!srcs.is_empty());

    for src in srcs {
        println!("testing {}", src);
        let alloc = compile(&dummy_arg(&src)).unwrap();
        assert!(alloc.registers >= 1);
    }
}

#[test]
fn test_invalid() {
    for src in read_dir("../tests/invalid/") {
        println!("testing {}", src);
        assert!(compile(&dummy_arg(&src)).is_err());
    }
}

#[test]
fn expected_register_counts() {
    let expect = [
        ("dead_stores.j", 1),
        ("sum.j", 2),
        ("count.j", 2),
        ("branches.j", 2),
        ("inline_label.j", 2),
    ];
    for (file, registers) in expect {
        let alloc = compile(&dummy_arg(&format!("../tests/listings/{file}"))).unwrap();
        assert_eq!(alloc.registers, registers, "{file}");
    }
}

#[test]
fn missing_file_is_an_error() {
    assert!(compile(&dummy_arg("../tests/listings/no-such-file.j")).is_err());
}

#[test]
fn dot_dumps_are_best_effort() {
    let dir = std::env::temp_dir();
    let cfg_path = dir.join(format!("bcc-cfg-{}.dot", std::process::id()));
    let mut args = dummy_arg("../tests/listings/count.j");
    args.dot_cfg = Some(cfg_path.clone());
    // an unwritable path must not fail the compilation
    args.dot_interference = Some("/nonexistent-dir/deeper/ig.dot".into());

    assert!(compile(&args).is_ok());
    let text = fs::read_to_string(&cfg_path).unwrap();
    assert!(text.starts_with("digraph \"Count\" {"));
    assert!(text.contains("[label=\"jump\"]"));
    let _ = fs::remove_file(&cfg_path);
}
