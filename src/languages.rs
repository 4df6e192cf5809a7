use std::fmt;

/// Runtime identifier understood by the execution sandbox service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeId(pub u32);

/// Runtime used when a candidate-facing language identifier is not in the
/// table: JavaScript (Node.js).
pub const DEFAULT_RUNTIME: RuntimeId = RuntimeId(63);

const LANGUAGES: &[(&str, RuntimeId)] = &[
    ("javascript", RuntimeId(63)), // JavaScript (Node.js 12.14.0)
    ("python", RuntimeId(71)),     // Python (3.8.1)
    ("java", RuntimeId(62)),       // Java (OpenJDK 13.0.1)
    ("csharp", RuntimeId(51)),     // C# (Mono 6.6.0.161)
    ("cpp", RuntimeId(54)),        // C++ (GCC 9.2.0)
    ("ruby", RuntimeId(72)),       // Ruby (2.7.0)
    ("go", RuntimeId(60)),         // Go (1.13.5)
    ("rust", RuntimeId(73)),       // Rust (1.40.0)
    ("php", RuntimeId(68)),        // PHP (7.4.1)
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language identifier: {}", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

/// Look up the sandbox runtime for a candidate-facing language identifier.
///
/// Unknown identifiers are an explicit error so the caller decides whether
/// to reject the submission or fall back to [`DEFAULT_RUNTIME`].
pub fn resolve(language: &str) -> Result<RuntimeId, UnknownLanguage> {
    LANGUAGES
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, id)| *id)
        .ok_or_else(|| UnknownLanguage(language.to_string()))
}
