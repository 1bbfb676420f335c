//! Email format rules evaluated as independent boolean facts.
//!
//! The registration UI renders a checklist with one line per rule, so the
//! rules are kept separate rather than fused into a single regex: each one
//! must stay independently queryable. [`EmailRules`] is the seam; swapping in
//! a stricter rule set does not touch any call site.

use serde::Serialize;

/// Characters accepted by the character-set rule, besides ASCII alphanumerics.
const ALLOWED_SYMBOLS: [char; 6] = ['@', '.', '_', '%', '+', '-'];

/// Minimum number of characters in the top-level domain.
const MIN_TLD_LEN: usize = 2;

/// Answers four boolean questions about a candidate email address.
///
/// Every operation is total: any `&str`, including the empty string and
/// strings with control characters, produces a defined `bool`. No rule
/// allocates or touches shared state, so implementations are safe to call
/// concurrently.
///
/// # Implementations
///
/// - [`EmailValidator`] - the shipping rule set
/// - Test stubs in `application::services` unit tests
pub trait EmailRules: Send + Sync {
    /// True iff the input contains exactly one `@` and at least one `.`.
    ///
    /// No positional constraint: a dot before the `@` satisfies this rule.
    fn contains_one_at_and_dot(&self, input: &str) -> bool;

    /// True iff every character is an ASCII letter, an ASCII digit, or one
    /// of `@ . _ % + -`.
    ///
    /// Vacuously true for the empty string. Whitespace and non-ASCII
    /// characters fail.
    fn uses_only_allowed_characters(&self, input: &str) -> bool;

    /// True iff the input splits on `@` into exactly a non-empty local part
    /// and a non-empty domain part, and the domain has at least two
    /// dot-separated components, none empty, with an all-letter top-level
    /// domain of at least two characters.
    fn has_valid_domain(&self, input: &str) -> bool;

    /// Conjunction of the three rules above.
    fn is_fully_valid(&self, input: &str) -> bool {
        self.contains_one_at_and_dot(input)
            && self.uses_only_allowed_characters(input)
            && self.has_valid_domain(input)
    }

    /// Evaluates every rule and returns the aggregate report.
    fn check(&self, input: &str) -> EmailChecklist {
        let contains_one_at_and_dot = self.contains_one_at_and_dot(input);
        let uses_only_allowed_characters = self.uses_only_allowed_characters(input);
        let has_valid_domain = self.has_valid_domain(input);

        EmailChecklist {
            contains_one_at_and_dot,
            uses_only_allowed_characters,
            has_valid_domain,
            is_fully_valid: contains_one_at_and_dot
                && uses_only_allowed_characters
                && has_valid_domain,
        }
    }
}

/// Per-rule evaluation report for a candidate email.
///
/// Serialized as-is to API consumers so each rule can be rendered as a
/// separate checklist row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmailChecklist {
    pub contains_one_at_and_dot: bool,
    pub uses_only_allowed_characters: bool,
    pub has_valid_domain: bool,
    pub is_fully_valid: bool,
}

/// The shipping email rule set.
///
/// Stateless; a single instance can be shared across threads for the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl EmailValidator {
    pub fn new() -> Self {
        Self
    }
}

impl EmailRules for EmailValidator {
    fn contains_one_at_and_dot(&self, input: &str) -> bool {
        let at_count = input.chars().filter(|c| *c == '@').count();
        let dot_count = input.chars().filter(|c| *c == '.').count();

        at_count == 1 && dot_count >= 1
    }

    fn uses_only_allowed_characters(&self, input: &str) -> bool {
        input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ALLOWED_SYMBOLS.contains(&c))
    }

    fn has_valid_domain(&self, input: &str) -> bool {
        let parts: Vec<&str> = input.split('@').collect();

        // Two or more `@` yield three or more segments; a missing or empty
        // local/domain part yields an empty segment.
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return false;
        }

        let components: Vec<&str> = parts[1].split('.').collect();

        if components.len() < 2 {
            return false;
        }

        if components.iter().any(|c| c.is_empty()) {
            return false;
        }

        let Some(tld) = components.last() else {
            return false;
        };

        tld.chars().count() >= MIN_TLD_LEN && tld.chars().all(char::is_alphabetic)
    }
}
