fn main() {
    // embuild wiring only applies when cross-compiling for ESP-IDF; host
    // builds (unit tests, CI) must not require the ESP toolchain.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
