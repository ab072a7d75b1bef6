fn main() {
    // ESP-IDF link-time environment. Host builds (tests, tooling) skip it.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
