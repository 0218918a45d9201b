use regex::Regex;
use std::sync::LazyLock;

/// Client versions are written into replays in two textual forms,
/// depending on the client generation:
/// dotted (`WoT v.0.8.1.234 ...`) or comma separated (`0, 8, 1, 234`)
static DOTTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"v\.(\d+)\.(\d+)\.(\d+)").expect("The version pattern is a valid regex")
});
static SEPARATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)[.,] *(\d+)[.,] *(\d+)[.,]? *(\d+)")
        .expect("The version pattern is a valid regex")
});

/// The client version a replay was recorded with.
///
/// An unrecognized version string yields the all-zero version, which makes
/// the framer fall back to the oldest supported packet tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Version {
    pub build: u32,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// The version string as stored in the replay
    pub text: String,
}

impl Version {
    pub fn parse(text: &str) -> Self {
        let (build, major, minor, patch) = if let Some(captures) = DOTTED.captures(text) {
            (
                capture_number(&captures, 1),
                capture_number(&captures, 2),
                capture_number(&captures, 3),
                0,
            )
        } else if let Some(captures) = SEPARATED.captures(text) {
            (
                capture_number(&captures, 1),
                capture_number(&captures, 2),
                capture_number(&captures, 3),
                capture_number(&captures, 4),
            )
        } else {
            (0, 0, 0, 0)
        };

        Self {
            build,
            major,
            minor,
            patch,
            text: text.to_owned(),
        }
    }

    /// `true` if this version predates `major.minor`
    pub fn before(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) < (major, minor)
    }
}

fn capture_number(captures: &regex::Captures<'_>, group: usize) -> u32 {
    captures
        .get(group)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
