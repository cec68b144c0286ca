//! Criteria recognition for grid rows.
//!
//! A grid cell holds raw filter text. This module turns that text into a WHERE
//! fragment with a single-token check:
//!
//! - text starting with `>`, `<`, `=`, or (case-insensitively) `LIKE` / `IS`
//!   is an explicit operator and is appended verbatim: `col > 100`
//! - anything else is an implied equality: `col = 42`
//!
//! This is not an expression parser. The right-hand side is never quoted or
//! validated; a string literal must carry its own quotes (`'alice'`).
//!
//! # Example
//! ```
//! use qbe::Criterion;
//!
//! let c = Criterion::parse("  > 100 ").unwrap();
//! assert_eq!(c, Criterion::RawOperator("> 100".into()));
//! assert_eq!(c.render("`t`.`n`"), "`t`.`n` > 100");
//!
//! let c = Criterion::parse("42").unwrap();
//! assert_eq!(c.render("`t`.`n`"), "`t`.`n` = 42");
//! ```

/// Leading symbols that mark an explicit operator.
const OPERATOR_SYMBOLS: [char; 3] = ['>', '<', '='];

/// Leading keywords (matched case-insensitively) that mark an explicit operator.
const OPERATOR_KEYWORDS: [&str; 2] = ["LIKE", "IS"];

/// One recognized criteria cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// The text starts with an operator and is emitted as-is after the column.
    RawOperator(String),
    /// No operator was recognized; `= <text>` is emitted.
    ImpliedEquals(String),
}

impl Criterion {
    /// Recognize one raw criteria cell. Returns `None` only for the empty string.
    ///
    /// Whitespace-only text is a set cell: it trims to nothing and renders as
    /// `col = `, which the database then rejects.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let trimmed = raw.trim();
        if starts_with_operator(trimmed) {
            Some(Criterion::RawOperator(trimmed.to_string()))
        } else {
            Some(Criterion::ImpliedEquals(trimmed.to_string()))
        }
    }

    /// The trimmed criteria text.
    pub fn text(&self) -> &str {
        match self {
            Criterion::RawOperator(s) | Criterion::ImpliedEquals(s) => s,
        }
    }

    /// Render against an already-quoted column reference.
    pub fn render(&self, col_ref: &str) -> String {
        let mut out = String::with_capacity(col_ref.len() + self.text().len() + 3);
        self.write_sql(&mut out, col_ref);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String, col_ref: &str) {
        out.push_str(col_ref);
        match self {
            Criterion::RawOperator(text) => {
                out.push(' ');
                out.push_str(text);
            }
            Criterion::ImpliedEquals(text) => {
                out.push_str(" = ");
                out.push_str(text);
            }
        }
    }
}

fn starts_with_operator(text: &str) -> bool {
    if text.starts_with(OPERATOR_SYMBOLS) {
        return true;
    }
    OPERATOR_KEYWORDS.iter().any(|kw| {
        text.get(..kw.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(kw))
    })
}

/// Build the condition for one criteria cell: `<col_ref> <op> <rhs>`.
///
/// An empty cell yields an empty string.
pub fn build_condition(col_ref: &str, criteria: &str) -> String {
    Criterion::parse(criteria)
        .map(|c| c.render(col_ref))
        .unwrap_or_default()
}

/// The full WHERE contribution of one grid row.
///
/// - both cells set: `(<criteria> OR <or_criteria>)`
/// - one cell set: that condition, unparenthesized
/// - neither set: `None`
pub fn row_predicate(col_ref: &str, criteria: &str, or_criteria: &str) -> Option<String> {
    match (Criterion::parse(criteria), Criterion::parse(or_criteria)) {
        (Some(first), Some(second)) => {
            let mut out = String::with_capacity(2 * col_ref.len() + 16);
            out.push('(');
            first.write_sql(&mut out, col_ref);
            out.push_str(" OR ");
            second.write_sql(&mut out, col_ref);
            out.push(')');
            Some(out)
        }
        (Some(only), None) | (None, Some(only)) => Some(only.render(col_ref)),
        (None, None) => None,
    }
}
