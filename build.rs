use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=IM920_LIB_DIR");
    println!("cargo:rerun-if-env-changed=IM920_LIB_NAME");

    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    if let Ok(dir) = env::var("IM920_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir);
    }
    let name = env::var("IM920_LIB_NAME").unwrap_or_else(|_| "im920".to_string());
    println!("cargo:rustc-link-lib={}", name);
}
