//! State-pattern matching (`matchesPattern`), evaluated in priority order
//! per spec.md §4.4, plus a small pluggable expression evaluator behind
//! the `jexl:` prefix (spec.md §9: "best isolated behind a small
//! pluggable evaluator interface with one built-in").

/// Something that can evaluate a `jexl:`-style boolean expression against
/// the current automaton state. Swappable so a full expression-language
/// crate could be substituted without touching the matcher.
pub trait ExpressionEvaluator: Send + Sync {
    /// Returns `None` on evaluation failure (treated as non-match, not
    /// fatal, per spec.md §4.4).
    fn eval(&self, expr: &str, state: &str) -> Option<bool>;
}

/// The one built-in evaluator: supports `n`/`s`/`state` variables,
/// `==`/`!=`/`>=`/`<=`/`>`/`<` comparisons, and `&&`/`||` combinators.
/// This is not a general jexl implementation — it covers the arithmetic
/// and boolean forms the matcher's test matrix exercises.
pub struct BuiltinEvaluator;

impl ExpressionEvaluator for BuiltinEvaluator {
    fn eval(&self, expr: &str, state: &str) -> Option<bool> {
        let n: Option<f64> = state.parse().ok();
        eval_or_expr(expr.trim(), state, n)
    }
}

fn eval_or_expr(expr: &str, state: &str, n: Option<f64>) -> Option<bool> {
    let mut result: Option<bool> = None;
    for part in split_top_level(expr, "||") {
        let v = eval_and_expr(part.trim(), state, n)?;
        result = Some(result.map_or(v, |r| r || v));
    }
    result
}

fn eval_and_expr(expr: &str, state: &str, n: Option<f64>) -> Option<bool> {
    let mut result: Option<bool> = None;
    for part in split_top_level(expr, "&&") {
        let v = eval_term(part.trim(), state, n)?;
        result = Some(result.map_or(v, |r| r && v));
    }
    result
}

fn split_top_level<'a>(expr: &'a str, sep: &str) -> Vec<&'a str> {
    // No parenthesis nesting is supported; a flat split is sufficient for
    // the comparison/boolean forms this evaluator targets.
    if expr.contains(sep) {
        expr.split(sep).collect()
    } else {
        vec![expr]
    }
}

fn eval_term(term: &str, state: &str, n: Option<f64>) -> Option<bool> {
    let term = term.trim();
    if term.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if term.eq_ignore_ascii_case("false") {
        return Some(false);
    }

    for op in ["==", "!=", ">=", "<=", ">", "<"] {
        if let Some((lhs, rhs)) = term.split_once(op) {
            return eval_comparison(lhs.trim(), op, rhs.trim(), state, n);
        }
    }

    None
}

fn eval_comparison(lhs: &str, op: &str, rhs: &str, state: &str, n: Option<f64>) -> Option<bool> {
    match (resolve_var(lhs, state, n), resolve_var(rhs, state, n)) {
        (Var::Num(l), Var::Num(r)) => numeric_cmp(l, op, r),
        (Var::None, _) | (_, Var::None) => None,
        (l, r) => string_cmp(&l.as_str(state)?, op, &r.as_str(state)?),
    }
}

enum Var {
    Num(f64),
    Str(String),
    None,
}

impl Var {
    fn as_str(&self, _state: &str) -> Option<String> {
        match self {
            Var::Str(s) => Some(s.clone()),
            Var::Num(n) => Some(n.to_string()),
            Var::None => None,
        }
    }
}

fn resolve_var(token: &str, state: &str, n: Option<f64>) -> Var {
    let token = token.trim();
    if token == "n" {
        return n.map(Var::Num).unwrap_or(Var::None);
    }
    if token == "s" || token == "state" {
        return Var::Str(state.to_string());
    }
    if let Ok(v) = token.parse::<f64>() {
        return Var::Num(v);
    }
    let unquoted = token.trim_matches('"').trim_matches('\'');
    Var::Str(unquoted.to_string())
}

fn numeric_cmp(l: f64, op: &str, r: f64) -> Option<bool> {
    Some(match op {
        "==" => l == r,
        "!=" => l != r,
        ">=" => l >= r,
        "<=" => l <= r,
        ">" => l > r,
        "<" => l < r,
        _ => return None,
    })
}

fn string_cmp(l: &str, op: &str, r: &str) -> Option<bool> {
    Some(match op {
        "==" => l == r,
        "!=" => l != r,
        _ => return None,
    })
}

/// Evaluates `pattern` against `state`, per the priority-ordered rule
/// table of spec.md §4.4.
pub fn matches_pattern(pattern: Option<&str>, state: Option<&str>, evaluator: &dyn ExpressionEvaluator) -> bool {
    let (pattern, state) = match (pattern, state) {
        (Some(p), Some(s)) => (p, s),
        _ => return false,
    };

    if let Some(expr) = pattern.strip_prefix("jexl:") {
        return evaluator.eval(expr, state).unwrap_or(false);
    }

    if pattern == "*" {
        return true;
    }

    if let Some(negated) = pattern.strip_prefix('!') {
        return state != negated;
    }

    if pattern.contains('|') {
        return pattern.split('|').map(str::trim).any(|p| p == state);
    }

    for op in [">=", "<=", ">", "<"] {
        if let Some(remainder) = pattern.strip_prefix(op) {
            return match (remainder.parse::<f64>(), state.parse::<f64>()) {
                (Ok(p), Ok(s)) => numeric_cmp(s, op, p).unwrap_or(false),
                _ => false,
            };
        }
    }

    pattern == state
}

/// Convenience entry point using the built-in evaluator.
pub fn matches_pattern_default(pattern: Option<&str>, state: Option<&str>) -> bool {
    matches_pattern(pattern, state, &BuiltinEvaluator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str, state: &str) -> bool {
        matches_pattern_default(Some(pattern), Some(state))
    }

    #[test]
    fn null_pattern_is_false() {
        assert!(!matches_pattern_default(None, Some("0")));
    }

    #[test]
    fn null_state_is_false() {
        assert!(!matches_pattern_default(Some("*"), None));
    }

    #[test]
    fn star_matches_anything() {
        assert!(m("*", "anything"));
    }

    #[test]
    fn negation_matches_when_different() {
        assert!(m("!end", "0"));
    }

    #[test]
    fn negation_false_when_equal() {
        assert!(!m("!end", "end"));
    }

    #[test]
    fn or_pattern_matches_any_member() {
        assert!(m("1|2|3", "2"));
        assert!(!m("1|2|3", "4"));
    }

    #[test]
    fn or_pattern_trims_whitespace() {
        assert!(m("1 | 2 | 3", "2"));
    }

    #[test]
    fn numeric_gte_true() {
        assert!(m(">=5", "7"));
    }

    #[test]
    fn numeric_gte_false() {
        assert!(!m(">=5", "4"));
    }

    #[test]
    fn numeric_comparison_non_numeric_state_is_false() {
        assert!(!m(">=5", "abc"));
    }

    #[test]
    fn numeric_lte_and_lt_gt() {
        assert!(m("<=5", "5"));
        assert!(m("<10", "5"));
        assert!(m(">1", "5"));
        assert!(!m(">10", "5"));
    }

    #[test]
    fn exact_match_fallback() {
        assert!(m("checkout", "checkout"));
        assert!(!m("checkout", "build"));
    }

    #[test]
    fn jexl_expression_true() {
        assert!(m("jexl:n>=5 && n<10", "7"));
    }

    #[test]
    fn jexl_expression_false() {
        assert!(!m("jexl:n>=5 && n<10", "12"));
    }

    #[test]
    fn jexl_or_expression() {
        assert!(m("jexl:n<0 || n>100", "200"));
    }

    #[test]
    fn jexl_failure_is_false_not_fatal() {
        assert!(!m("jexl:not a valid expr !!!", "7"));
    }

    #[test]
    fn jexl_string_equality() {
        assert!(m("jexl:s==\"done\"", "done"));
        assert!(!m("jexl:s==\"done\"", "pending"));
    }

    struct AlwaysTrue;
    impl ExpressionEvaluator for AlwaysTrue {
        fn eval(&self, _expr: &str, _state: &str) -> Option<bool> {
            Some(true)
        }
    }

    #[test]
    fn evaluator_is_pluggable() {
        assert!(matches_pattern(Some("jexl:whatever"), Some("x"), &AlwaysTrue));
    }
}
