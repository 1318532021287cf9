//! Query-text rewrites and statement classification.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static DROP_INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*DROP\s+INDEX\s+(.+)$").expect("drop-index pattern"));

static IF_EXISTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^IF\s+EXISTS\b").expect("if-exists pattern"));

/// Rewrite `DROP INDEX <name>` to `DROP INDEX IF EXISTS <name>` so index
/// drops are idempotent. Already-normalized statements come back unchanged,
/// borrowed.
#[must_use]
pub fn normalize_query(sql: &str) -> Cow<'_, str> {
    if let Some(caps) = DROP_INDEX_RE.captures(sql) {
        let rest = caps.get(1).map_or("", |m| m.as_str()).trim();
        if !IF_EXISTS_RE.is_match(rest) {
            return Cow::Owned(format!("DROP INDEX IF EXISTS {rest}"));
        }
    }
    Cow::Borrowed(sql)
}

/// Statement classification by leading keyword, used only to pick the remote
/// call (`all` vs `run`) and the result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// `SELECT`, `WITH`, or `PRAGMA`: rows come back.
    Select,
    /// `INSERT`: the inserted row id matters.
    Insert,
    /// Everything else is a generic mutation.
    Other,
}

impl QueryKind {
    #[must_use]
    pub fn of(sql: &str) -> QueryKind {
        let lead = sql.trim_start();
        if has_prefix(lead, "SELECT") || has_prefix(lead, "WITH") || has_prefix(lead, "PRAGMA") {
            QueryKind::Select
        } else if has_prefix(lead, "INSERT") {
            QueryKind::Insert
        } else {
            QueryKind::Other
        }
    }

    #[must_use]
    pub fn is_select(self) -> bool {
        self == QueryKind::Select
    }
}

fn has_prefix(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_if_exists_to_drop_index() {
        assert_eq!(
            normalize_query("DROP INDEX idx_users_email"),
            "DROP INDEX IF EXISTS idx_users_email"
        );
        assert_eq!(
            normalize_query("drop index \"IDX_t_a\""),
            "DROP INDEX IF EXISTS \"IDX_t_a\""
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_query("DROP INDEX x").into_owned();
        let twice = normalize_query(&once);
        assert!(matches!(twice, Cow::Borrowed(_)));
        assert_eq!(twice, once);
    }

    #[test]
    fn other_statements_pass_through_borrowed() {
        let sql = "SELECT * FROM t";
        assert!(matches!(normalize_query(sql), Cow::Borrowed(_)));
    }

    #[test]
    fn classifies_by_prefix() {
        assert_eq!(QueryKind::of("SELECT 1"), QueryKind::Select);
        assert_eq!(QueryKind::of("  with x as (select 1) select * from x"), QueryKind::Select);
        assert_eq!(QueryKind::of("PRAGMA foreign_keys = ON"), QueryKind::Select);
        assert_eq!(QueryKind::of("insert into t values (1)"), QueryKind::Insert);
        assert_eq!(QueryKind::of("UPDATE t SET a = 1"), QueryKind::Other);
        assert_eq!(QueryKind::of("DELETE FROM t"), QueryKind::Other);
    }
}
