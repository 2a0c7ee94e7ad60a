use std::env;

fn main() {
    // The display core builds and tests on the host, only the firmware needs ESP-IDF
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    println!("cargo:rerun-if-env-changed=PAPERFRAME_SSID");
}
