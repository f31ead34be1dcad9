//! Build metadata shown by the informational flags.

/// Program name used in usage text when `args[0]` is missing.
pub const PROGRAM_NAME: &str = "codeai-backend";

/// Version reported by `-v`.
///
/// Release builds stamp it through the `CODEAI_BACKEND_VERSION` environment
/// variable at compile time; local builds fall back to the crate version.
pub const VERSION: &str = match option_env!("CODEAI_BACKEND_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Components bundled into the binary, as `(name, license)` pairs.
pub const THIRD_PARTY_LICENSES: &[(&str, &str)] = &[
    ("anyhow", "MIT OR Apache-2.0"),
    ("clap", "MIT OR Apache-2.0"),
    ("thiserror", "MIT OR Apache-2.0"),
    ("tokio", "MIT"),
    ("tracing", "MIT"),
    ("tracing-appender", "MIT"),
    ("tracing-subscriber", "MIT"),
];

/// Text printed by `-licenses`.
pub fn license_text() -> String {
    let mut text = format!(
        "License information\n\n{PROGRAM_NAME} {VERSION} is made available under the {} license.\n\n\
         Third-party components:\n",
        env!("CARGO_PKG_LICENSE")
    );
    for (name, license) in THIRD_PARTY_LICENSES {
        text.push_str(&format!("  {name}: {license}\n"));
    }
    text
}
