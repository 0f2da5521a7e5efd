use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};

/// Case-insensitive "starts with" predicate: `LOWER(col) LIKE 'prefix%' ESCAPE '\'`.
///
/// `%`, `_` and `\` in the prefix match literally. The prefix is folded with
/// Unicode rules here; the column is folded by the database, and SQLite's
/// `LOWER()` only folds ASCII, so non-ASCII names match case-insensitively on
/// PostgreSQL only.
pub fn starts_with_ci<C>(col: C, prefix: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
