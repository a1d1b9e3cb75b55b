//! Glob filtering of unit ids

use bluechi_rs::BluechiError;
use glob::{MatchOptions, Pattern};

/// fnmatch(3) without flags: `*` also matches `/` and case is significant
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compile an fnmatch(3) pattern
fn compile(pattern: &str) -> Result<Pattern, glob::PatternError> {
    Pattern::new(&fnmatch_to_glob(pattern))
}

/// Rewrite an fnmatch(3) pattern into `glob` syntax
///
/// fnmatch folds runs of `*`, reads `[^...]` as a negated set, honours
/// backslash escapes and takes an unterminated `[` literally. `glob` either
/// rejects these or reads them differently.
///
/// # Examples
///
/// ```
/// use bluechictl_core::filter::fnmatch_to_glob;
///
/// assert_eq!(fnmatch_to_glob("foo**"), "foo*");
/// assert_eq!(fnmatch_to_glob("[^b]*"), "[!b]*");
/// assert_eq!(fnmatch_to_glob("[x"), "[[]x");
/// ```
pub fn fnmatch_to_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '\\' => match chars.get(i + 1) {
                Some(&escaped) => {
                    push_literal(&mut out, escaped);
                    i += 1;
                }
                None => out.push('\\'),
            },
            '[' => match bracket_end(&chars, i) {
                Some(end) => {
                    out.push('[');
                    let mut start = i + 1;
                    if matches!(chars[start], '!' | '^') {
                        out.push('!');
                        start += 1;
                    }
                    out.extend(&chars[start..=end]);
                    i = end;
                }
                None => push_literal(&mut out, '['),
            },
            c => out.push(c),
        }
        i += 1;
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if matches!(c, '*' | '?' | '[') {
        out.push('[');
        out.push(c);
        out.push(']');
    } else {
        out.push(c);
    }
}

/// Index of the `]` closing the set opened at `open`
fn bracket_end(chars: &[char], open: usize) -> Option<usize> {
    let mut first = open + 1;
    if matches!(chars.get(first), Some('!' | '^')) {
        first += 1;
    }
    // A `]` in first position belongs to the set
    chars
        .get(first + 1..)?
        .iter()
        .position(|&c| c == ']')
        .map(|offset| first + 1 + offset)
}

/// Reject patterns that can never be compiled
pub fn validate_glob(pattern: &str) -> Result<(), BluechiError> {
    compile(pattern).map(|_| ()).map_err(|e| {
        BluechiError::InvalidArgument(format!("invalid filter '{}': {}", pattern, e))
    })
}

/// Compiled optional filter; `None` matches every id
#[derive(Debug, Clone, Default)]
pub struct UnitFilter {
    pattern: Option<Pattern>,
    /// Set when a pattern was given but could not be compiled
    invalid: bool,
}

impl UnitFilter {
    /// Compile a filter; an invalid pattern yields a filter that matches nothing
    pub fn new(glob_filter: Option<&str>) -> Self {
        match glob_filter.map(compile) {
            None => Self::default(),
            Some(Ok(pattern)) => Self {
                pattern: Some(pattern),
                invalid: false,
            },
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid filter {:?}: {}", glob_filter, e);
                Self {
                    pattern: None,
                    invalid: true,
                }
            }
        }
    }

    pub fn matches(&self, id: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.matches_with(id, MATCH_OPTIONS),
            None => !self.invalid,
        }
    }
}

/// Match one id against a glob pattern
///
/// # Examples
///
/// ```
/// use bluechictl_core::filter::match_glob;
///
/// assert!(match_glob("foo.service", "foo*"));
/// assert!(match_glob("foobar.timer", "foo*"));
/// assert!(!match_glob("bar.service", "foo*"));
/// assert!(match_glob("a.service", "?.serv[ei]ce"));
/// ```
pub fn match_glob(id: &str, pattern: &str) -> bool {
    UnitFilter::new(Some(pattern)).matches(id)
}
