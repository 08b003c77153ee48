use std::env;
use std::fs;

fn main() {
    // VERSION 文件优先，缺失时回退到 Cargo 版本号
    let version = fs::read_to_string("VERSION")
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap_or_default());

    println!("cargo:rustc-env=REVIEW_GATE_VERSION={}", version);
    println!("cargo:rerun-if-changed=VERSION");
}
