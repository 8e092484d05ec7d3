//! The one substitution this tool exists to perform.
//!
//! `takeControl` in the conversation controller verifies ownership with a
//! plain multi-tenancy query. The patch rewrites that block so the query
//! also honors the per-user channel permissions: it pulls the access filter
//! from `buildConversationAccessFilter`, splices it into the WHERE clause,
//! and expands the parameter list accordingly. The edit is pure text
//! surgery via a fixed regex; no JavaScript parsing is involved.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// The pre-patch ownership-check block.
    ///
    /// Captures, in order: indentation of the comment line, of the
    /// `const checkQuery` line, the query body up to and including the
    /// WHERE clause, indentation of the closing backtick, and
    /// indentation of the invocation line.
    static ref OWNERSHIP_CHECK: Regex = Regex::new(
        r"(?m)^([ \t]*)// Verificar ownership - MULTI-TENANCY \+ SECTOR\n([ \t]*)const checkQuery = `\n([\s\S]*?WHERE conv\.id = \$1 AND conv\.account_id = \$2)\n([ \t]*)`;\n\n([ \t]*)const checkResult = await db\.query\(checkQuery, \[id, accountId, userId\]\);"
    )
    .unwrap();
}

/// Replacement for a matched ownership-check block. Positional groups
/// carry the original indentation through to every injected line; `$$`
/// keeps the `${accessFilter}` interpolation literal in the emitted
/// JavaScript.
const ACCESS_FILTER_REPLACEMENT: &str = r"${1}// Get access filter (handles user_id + sector based on channel permissions)
${1}const { filter: accessFilter, params: accessParams } = await buildConversationAccessFilter(userId, accountId);

${1}// Verificar ownership - MULTI-TENANCY + SECTOR
${2}const checkQuery = `
${3} $${accessFilter}
${4}`;

${5}const queryParams = [id, accountId, ...accessParams];
${5}const checkResult = await db.query(checkQuery, queryParams);";

/// Line that only exists in already-patched content. Used to tell a
/// clean no-match apart from a repeated run.
const ALREADY_PATCHED_MARKER: &str = "const queryParams = [id, accountId, ...accessParams];";

/// What a run of the substitution concluded about its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The block was found and rewritten this many times
    Patched(usize),
    /// The block was absent but the rewritten form is present
    AlreadyPatched,
    /// Neither the block nor the rewritten form was found
    NoMatch,
}

/// Result of applying the patch to a text buffer
#[derive(Debug, Clone)]
pub struct PatchResult {
    /// Output text (equal to the input when nothing matched)
    pub content: String,
    /// Number of substitutions performed
    pub replacements: usize,
    /// Classification of what happened
    pub outcome: PatchOutcome,
}

impl PatchResult {
    /// Whether the substitution changed anything
    pub fn changes_made(&self) -> bool {
        self.replacements > 0
    }
}

/// Applies the access-filter substitution to `content`, globally across
/// all non-overlapping matches. In the expected input the pattern is
/// specific enough to match at most once.
///
/// A non-matching input is not an error: the text comes back unchanged
/// and the outcome reports either [`PatchOutcome::AlreadyPatched`] or
/// [`PatchOutcome::NoMatch`] so the caller can decide how loud to be.
pub fn apply(content: &str) -> PatchResult {
    let mut replacements = 0usize;

    let patched = OWNERSHIP_CHECK.replace_all(content, |caps: &Captures| {
        replacements += 1;
        let mut expanded = String::new();
        caps.expand(ACCESS_FILTER_REPLACEMENT, &mut expanded);
        expanded
    });

    let outcome = if replacements > 0 {
        PatchOutcome::Patched(replacements)
    } else if content.contains(ALREADY_PATCHED_MARKER) {
        PatchOutcome::AlreadyPatched
    } else {
        PatchOutcome::NoMatch
    };

    PatchResult {
        content: patched.into_owned(),
        replacements,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNPATCHED_BLOCK: &str = r"    // Verificar ownership - MULTI-TENANCY + SECTOR
    const checkQuery = `
      SELECT conv.id
      FROM conversations conv
      WHERE conv.id = $1 AND conv.account_id = $2
    `;

    const checkResult = await db.query(checkQuery, [id, accountId, userId]);";

    const PATCHED_BLOCK: &str = r"    // Get access filter (handles user_id + sector based on channel permissions)
    const { filter: accessFilter, params: accessParams } = await buildConversationAccessFilter(userId, accountId);

    // Verificar ownership - MULTI-TENANCY + SECTOR
    const checkQuery = `
      SELECT conv.id
      FROM conversations conv
      WHERE conv.id = $1 AND conv.account_id = $2 ${accessFilter}
    `;

    const queryParams = [id, accountId, ...accessParams];
    const checkResult = await db.query(checkQuery, queryParams);";

    fn controller_around(block: &str) -> String {
        format!(
            r"const takeControl = async (req, res) => {{
  try {{
    const {{ id }} = req.params;
    const userId = req.user.id;
    const accountId = req.user.account_id;

{}

    if (checkResult.rows.length === 0) {{
      throw new NotFoundError('Conversation not found');
    }}
  }} catch (error) {{
    sendError(res, error, error.statusCode || 500);
  }}
}};
",
            block
        )
    }

    #[test]
    fn test_apply_patches_ownership_check() {
        let input = controller_around(UNPATCHED_BLOCK);
        let result = apply(&input);

        assert_eq!(result.outcome, PatchOutcome::Patched(1));
        assert_eq!(result.replacements, 1);
        assert!(result.changes_made());
        assert_eq!(result.content, controller_around(PATCHED_BLOCK));
    }

    #[test]
    fn test_apply_preserves_surrounding_text() {
        let input = format!(
            "const db = require('../config/database');\n\n{}\n// trailing comment\n",
            controller_around(UNPATCHED_BLOCK)
        );
        let result = apply(&input);

        assert_eq!(result.replacements, 1);
        assert!(result
            .content
            .starts_with("const db = require('../config/database');\n\n"));
        assert!(result.content.ends_with("\n// trailing comment\n"));
    }

    #[test]
    fn test_apply_preserves_indentation() {
        // Same block re-indented with six spaces, as if nested one level deeper
        let input = format!("\n{}", UNPATCHED_BLOCK).replace("\n    ", "\n      ");
        let result = apply(&input);

        assert_eq!(result.replacements, 1);
        assert!(result
            .content
            .contains("\n      const queryParams = [id, accountId, ...accessParams];"));
        assert!(result.content.contains(
            "\n      // Get access filter (handles user_id + sector based on channel permissions)\n      const { filter: accessFilter, params: accessParams }"
        ));
    }

    #[test]
    fn test_no_match_returns_input_unchanged() {
        let input = "const unrelated = 42;\n";
        let result = apply(input);

        assert_eq!(result.outcome, PatchOutcome::NoMatch);
        assert_eq!(result.replacements, 0);
        assert!(!result.changes_made());
        assert_eq!(result.content, input);
    }

    #[test]
    fn test_already_patched_is_detected_and_unchanged() {
        let input = controller_around(PATCHED_BLOCK);
        let result = apply(&input);

        assert_eq!(result.outcome, PatchOutcome::AlreadyPatched);
        assert_eq!(result.replacements, 0);
        assert_eq!(result.content, input);
    }

    #[test]
    fn test_where_clause_gains_filter_interpolation() {
        let result = apply(&controller_around(UNPATCHED_BLOCK));
        assert!(result
            .content
            .contains("WHERE conv.id = $1 AND conv.account_id = $2 ${accessFilter}\n"));
        // The invocation no longer passes the raw parameter list
        assert!(!result
            .content
            .contains("db.query(checkQuery, [id, accountId, userId])"));
    }
}
