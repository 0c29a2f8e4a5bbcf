use std::borrow::Cow;
use std::fmt::Write as _;

/// Target placeholder style for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQL Server-style placeholders like `@p1`.
    Mssql,
}

impl PlaceholderStyle {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            PlaceholderStyle::Postgres => "$",
            PlaceholderStyle::Mssql => "@p",
        }
    }
}

/// Rewrite generator-style `?` markers into the dialect's numbered positional
/// form, left to right, starting at 1.
///
/// Every non-marker character passes through unchanged. The upstream statement
/// renderer is trusted never to emit an unescaped `?` inside a string literal,
/// so no quote tracking is needed here. Returns a borrowed `Cow` when the
/// input contains no markers, which also makes re-translating already
/// translated text a no-op.
#[must_use]
pub fn translate_placeholders(sql: &str, style: PlaceholderStyle) -> Cow<'_, str> {
    if !sql.as_bytes().contains(&b'?') {
        return Cow::Borrowed(sql);
    }

    // twice the input length is a capacity hint, not a bound
    let mut out = String::with_capacity(sql.len() * 2);
    let mut ordinal = 0u32;
    for c in sql.chars() {
        if c == '?' {
            ordinal += 1;
            let _ = write!(out, "{}{}", style.prefix(), ordinal);
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_markers_to_postgres() {
        let sql = "insert into t (a, b) values (?, ?)";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "insert into t (a, b) values ($1, $2)");
    }

    #[test]
    fn translates_markers_to_mssql() {
        let sql = "select * from t where a = ? and b = ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Mssql);
        assert_eq!(res, "select * from t where a = @p1 and b = @p2");
    }

    #[test]
    fn ordinals_are_strictly_increasing_left_to_right() {
        let sql = "? ? ? ? ?";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert_eq!(res, "$1 $2 $3 $4 $5");
        assert!(!res.contains('?'));
    }

    #[test]
    fn marker_free_input_is_borrowed() {
        let sql = "select * from t where a = $1";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres);
        assert!(matches!(res, Cow::Borrowed(_)));
        assert_eq!(res, sql);
    }

    #[test]
    fn retranslation_is_a_no_op() {
        let once = translate_placeholders("select ?, ?", PlaceholderStyle::Postgres).into_owned();
        let twice = translate_placeholders(&once, PlaceholderStyle::Postgres);
        assert_eq!(twice, once);
    }

    #[test]
    fn deterministic_output() {
        let sql = "update t set a = ? where b = ?";
        let a = translate_placeholders(sql, PlaceholderStyle::Mssql);
        let b = translate_placeholders(sql, PlaceholderStyle::Mssql);
        assert_eq!(a, b);
    }

    #[test]
    fn output_may_exceed_capacity_hint() {
        // 1-byte markers expanding to 4+ bytes each blow past len * 2
        let sql = "?".repeat(20);
        let res = translate_placeholders(&sql, PlaceholderStyle::Mssql);
        assert!(res.len() > sql.len() * 2);
        assert!(res.ends_with("@p20"));
    }
}
