//! Best-effort field extraction from free-text tool output
//!
//! Each parser returns optional structured fields; a pattern that does not
//! match simply leaves its field absent.
//!
//! Grammar recognised in deployment output:
//!
//! ```text
//! ... Files uploaded (<decimal>) ...
//! ```
//!
//! Grammar recognised in website verification reports (each value line must
//! end with a newline):
//!
//! ```text
//! Title: <text>\n
//! Status: <decimal>\n
//! Resource count: <decimal>\n
//! Successes:\n<block>(\n\n | end of text)
//! ```
//!
//! and, in the error text, `<decimal> issues found`.
//!
//! Decimals are kept as-is (no range check on status codes); one too large
//! for a 64-bit integer leaves its field absent.

use std::sync::LazyLock;

use regex::Regex;

static FILES_UPLOADED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Files uploaded \((\d+)\)").expect("FILES_UPLOADED_RE regex should compile"));

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Title: (.*)\n").expect("TITLE_RE regex should compile"));

static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Status: (\d+)\n").expect("STATUS_RE regex should compile"));

static RESOURCE_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Resource count: (\d+)\n").expect("RESOURCE_COUNT_RE regex should compile"));

static SUCCESSES_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Successes:\n(.*?)(?:\n\n|$)").expect("SUCCESSES_BLOCK_RE regex should compile")
});

static ISSUES_FOUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) issues found").expect("ISSUES_FOUND_RE regex should compile"));

/// Marker that turns a verification with errors into a success
const MOSTLY_SUCCESSFUL: &str = "mostly successful";

/// First decimal capture of `re` in `text`, if it parses
fn capture_number<T: std::str::FromStr>(re: &Regex, text: &str) -> Option<T> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Number of files reported by a deployment, from `Files uploaded (N)`
pub fn uploaded_file_count(output: &str) -> Option<u64> {
    capture_number(&FILES_UPLOADED_RE, output)
}

/// Fields derived from a website verification report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub title: Option<String>,
    pub status_code: Option<i64>,
    pub resource_count: Option<i64>,
    /// Number of `Successes:` blocks (not list entries)
    pub success_count: u64,
    pub issue_count: u64,
    pub success: bool,
}

impl VerifyReport {
    /// Parse the verification output and error text
    pub fn parse(output: &str, error: Option<&str>) -> Self {
        let title = TITLE_RE
            .captures(output)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        // Counts matched blocks under the header, so a single list of N successes yields 1.
        let success_count = if output.contains("Successes:") {
            SUCCESSES_BLOCK_RE.find_iter(output).count() as u64
        } else {
            0
        };

        let issue_count = error
            .and_then(|e| capture_number(&ISSUES_FOUND_RE, e))
            .unwrap_or(0);

        Self {
            title,
            status_code: capture_number(&STATUS_RE, output),
            resource_count: capture_number(&RESOURCE_COUNT_RE, output),
            success_count,
            issue_count,
            success: error.is_none() || output.contains(MOSTLY_SUCCESSFUL),
        }
    }
}
