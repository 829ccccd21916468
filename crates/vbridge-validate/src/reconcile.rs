//! # Path Reconciler
//!
//! Pure string operations that connect backend error text to configuration
//! attributes.
//!
//! - **Completion** turns `spec.types[?].locations[?]` plus the request's
//!   dynamic steps `[2, 0]` into `spec.types[2].locations[0]`.
//! - **Attribution** decides whether an error such as
//!   `field spec.types[2].locations[0] must be a region` belongs to the
//!   attribute, and strips the `field <path> ` prefix if it does.
//! - **Related-path rewrite** replaces mentions of other known backend
//!   paths inside an attributed message with their configuration paths.
//!
//! ## Heuristic
//!
//! Matching is substring search over formatted strings, not structural path
//! comparison. A match must sit on a field boundary and start in the first
//! half of the message. Backend errors are written `field <path> <message>`,
//! so a genuine match is near the start, while accidental collisions with a
//! short path tend to appear later in the prose. The cutoff is kept as is:
//! diagnostic text is user-visible and its stability matters more than
//! precision.
//!
//! Nothing here returns an error. Input that does not line up degrades to
//! "no substitution performed".

use vbridge_core::{PathExpr, PathStep, WILDCARD};
use vbridge_schema::ExpressionTable;

/// Replace each `?` in `expr`, left to right, with the literal value of the
/// corresponding dynamic step.
///
/// Returns the expression unchanged when it has no wildcards or when fewer
/// dynamic steps than wildcards are available.
pub fn complete(expr: &PathExpr, dynamic: &[&PathStep]) -> String {
    let wildcards = expr.wildcard_count();
    if wildcards == 0 || dynamic.len() < wildcards {
        return expr.as_str().to_string();
    }

    let mut literals = dynamic.iter().filter_map(|step| step.literal());
    let mut completed = String::with_capacity(expr.as_str().len() + wildcards * 4);
    for ch in expr.as_str().chars() {
        if ch == WILDCARD {
            if let Some(literal) = literals.next() {
                completed.push_str(&literal);
                continue;
            }
        }
        completed.push(ch);
    }
    completed
}

fn opens_field(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | '"' | '\'' | '`')
}

fn closes_field(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, ':' | ',' | ';' | ')' | '"' | '\'' | '`')
}

/// Returns true if `message[start..start + len]` is a whole field path
/// rather than part of a longer token.
fn on_field_boundary(message: &str, start: usize, len: usize) -> bool {
    let before = message[..start].chars().next_back().map_or(true, opens_field);
    let after = message[start + len..].chars().next().map_or(true, closes_field);
    before && after
}

/// Decide whether `message` belongs to the attribute whose completed path
/// expression is `completed`.
///
/// On success returns the text after the path and one separating
/// character, i.e. the backend message with `field <path> ` stripped.
pub fn attribute<'m>(message: &'m str, completed: &str) -> Option<&'m str> {
    if completed.is_empty() {
        return None;
    }

    let (start, _) = message
        .match_indices(completed)
        .find(|(start, _)| on_field_boundary(message, *start, completed.len()))?;

    if start >= message.len() / 2 {
        return None;
    }

    let mut rest = message[start + completed.len()..].chars();
    rest.next();
    Some(rest.as_str())
}

/// Whether `candidate` may be mentioned in errors attributed to `target`.
///
/// With a wildcard in `target`, the candidate must start with the target's
/// text up to its last wildcard. A wildcard-free target has no structural
/// prefix to compare, so every wildcard-free candidate is tested.
///
/// Wildcard-free candidates are never related to a wildcard target, so
/// top-level siblings such as `spec.c` stay verbatim in element errors.
pub fn is_related(target: &PathExpr, candidate: &PathExpr) -> bool {
    match target.wildcard_prefix() {
        Some(prefix) => candidate.as_str().starts_with(prefix),
        None => !candidate.has_wildcard(),
    }
}

/// Rewrite mentions of related backend paths in an attributed message.
///
/// Each related expression is completed with the request's dynamic steps;
/// where that text occurs in `message` it is replaced by the expression's
/// declaration path with slots filled from the same steps. Longer completed
/// paths are replaced first so `spec.ab` is never clobbered by `spec.a`.
pub fn rewrite_related(
    message: &str,
    target: &PathExpr,
    table: &ExpressionTable,
    dynamic: &[&PathStep],
) -> String {
    let mut replacements: Vec<(String, String)> = table
        .iter()
        .filter(|(expr, _)| *expr != target && is_related(target, expr))
        .map(|(expr, declared)| {
            (
                complete(expr, dynamic),
                declared.fill_slots(dynamic).to_string(),
            )
        })
        .filter(|(completed, _)| !completed.is_empty() && message.contains(completed.as_str()))
        .collect();

    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

    let mut rewritten = message.to_string();
    for (from, to) in replacements {
        if rewritten.contains(from.as_str()) {
            rewritten = rewritten.replace(&from, &to);
        }
    }
    rewritten
}

/// Attribution followed by related-path rewrite.
pub fn reconcile(
    message: &str,
    target: &PathExpr,
    completed: &str,
    table: &ExpressionTable,
    dynamic: &[&PathStep],
) -> Option<String> {
    attribute(message, completed).map(|detail| rewrite_related(detail, target, table, dynamic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbridge_core::ConcretePath;

    fn table(entries: &[(&str, ConcretePath)]) -> ExpressionTable {
        let mut table = ExpressionTable::new();
        for (expr, path) in entries {
            table.insert_first(PathExpr::new(*expr), path.clone());
        }
        table
    }

    #[test]
    fn test_complete_single_wildcard() {
        let zero = PathStep::Index(0);
        assert_eq!(complete(&PathExpr::new("spec.b[?]"), &[&zero]), "spec.b[0]");
    }

    #[test]
    fn test_complete_mixed_index_and_key() {
        let key = PathStep::Key("eu-west".into());
        let idx = PathStep::Index(12);
        assert_eq!(
            complete(&PathExpr::new("spec.regions[?].zones[?]"), &[&key, &idx]),
            "spec.regions[eu-west].zones[12]"
        );
    }

    #[test]
    fn test_complete_too_few_steps_is_unchanged() {
        let idx = PathStep::Index(1);
        let expr = PathExpr::new("spec.types[?].locations[?]");
        assert_eq!(complete(&expr, &[&idx]), "spec.types[?].locations[?]");
    }

    #[test]
    fn test_complete_no_wildcards_is_unchanged() {
        let idx = PathStep::Index(4);
        assert_eq!(complete(&PathExpr::new("spec.c"), &[&idx]), "spec.c");
    }

    #[test]
    fn test_complete_extra_steps_use_leading_ones() {
        let a = PathStep::Index(7);
        let b = PathStep::Index(8);
        assert_eq!(complete(&PathExpr::new("spec.b[?]"), &[&a, &b]), "spec.b[7]");
    }

    #[test]
    fn test_attribute_strips_prefix() {
        let msg = "field spec.b[0] should be better than spec.c";
        assert_eq!(attribute(msg, "spec.b[0]"), Some("should be better than spec.c"));
    }

    #[test]
    fn test_attribute_rejects_trailing_suffix() {
        assert_eq!(attribute("field spec.b[0]-not should be ignored", "spec.b[0]"), None);
    }

    #[test]
    fn test_attribute_rejects_leading_prefix() {
        assert_eq!(attribute("field not-spec.b[0] should be ignored", "spec.b[0]"), None);
    }

    #[test]
    fn test_attribute_rejects_child_path() {
        assert_eq!(attribute("field spec.b[0].name is required", "spec.b[0]"), None);
    }

    #[test]
    fn test_attribute_rejects_match_in_second_half() {
        let msg = "field spec.name must not be the same as spec.c";
        assert_eq!(attribute(msg, "spec.c"), None);
    }

    #[test]
    fn test_attribute_skips_non_boundary_occurrence() {
        let msg = "field spec.cc or spec.c must be set for this resource";
        assert_eq!(attribute(msg, "spec.c"), Some("must be set for this resource"));
    }

    #[test]
    fn test_attribute_path_at_end_of_short_message() {
        // Too short for the path to start in the first half.
        assert_eq!(attribute("field spec.c", "spec.c"), None);
    }

    #[test]
    fn test_attribute_empty_completed_never_matches() {
        assert_eq!(attribute("field spec.c is bad", ""), None);
    }

    #[test]
    fn test_related_by_wildcard_prefix() {
        let target = PathExpr::new("spec.types[?].locations[?]");
        assert!(is_related(&target, &PathExpr::new("spec.types[?].locations[?].zone")));
        assert!(!is_related(&target, &PathExpr::new("spec.types[?].name")));
        assert!(!is_related(&target, &PathExpr::new("spec.c")));
    }

    #[test]
    fn test_top_level_sibling_stays_verbatim_in_element_error() {
        let target = PathExpr::new("spec.b[?]");
        assert!(!is_related(&target, &PathExpr::new("spec.c")));
        assert!(!is_related(&target, &PathExpr::new("spec.a")));
    }

    #[test]
    fn test_related_without_target_wildcard() {
        let target = PathExpr::new("spec.a");
        assert!(is_related(&target, &PathExpr::new("spec.c")));
        assert!(!is_related(&target, &PathExpr::new("spec.b[?]")));
    }

    #[test]
    fn test_rewrite_sibling_fields_for_scalar_target() {
        let table = table(&[
            ("spec.a", ConcretePath::attribute("a")),
            ("spec.display_name", ConcretePath::attribute("display_name")),
        ]);
        let out = rewrite_related(
            "must differ from spec.display_name",
            &PathExpr::new("spec.a"),
            &table,
            &[],
        );
        assert_eq!(out, "must differ from display_name");
    }

    #[test]
    fn test_rewrite_fills_declaration_slots() {
        let target = PathExpr::new("spec.types[?].primary");
        let table = table(&[
            (
                "spec.types[?].primary",
                ConcretePath::attribute("types").at_index(0).at_attribute("primary"),
            ),
            (
                "spec.types[?].secondary",
                ConcretePath::attribute("types").at_index(0).at_attribute("secondary"),
            ),
        ]);
        let two = PathStep::Index(2);
        let out = rewrite_related(
            "must differ from spec.types[2].secondary",
            &target,
            &table,
            &[&two],
        );
        assert_eq!(out, "must differ from types[2].secondary");
    }

    #[test]
    fn test_rewrite_longest_first() {
        let table = table(&[
            ("spec.a", ConcretePath::attribute("a")),
            ("spec.ab", ConcretePath::attribute("ab_attr")),
            ("spec.x", ConcretePath::attribute("x")),
        ]);
        let out = rewrite_related("conflicts with spec.ab", &PathExpr::new("spec.x"), &table, &[]);
        assert_eq!(out, "conflicts with ab_attr");
    }

    #[test]
    fn test_rewrite_leaves_unrelated_mentions() {
        let table = table(&[
            ("spec.a", ConcretePath::attribute("a")),
            ("spec.b[?]", ConcretePath::attribute("b").at_index(0)),
            ("spec.c", ConcretePath::attribute("c")),
        ]);
        let zero = PathStep::Index(0);
        let msg = "should be better than spec.c";
        assert_eq!(rewrite_related(msg, &PathExpr::new("spec.b[?]"), &table, &[&zero]), msg);
    }

    #[test]
    fn test_reconcile_combines_both_steps() {
        let table = table(&[
            ("spec.a", ConcretePath::attribute("a")),
            ("spec.c", ConcretePath::attribute("c")),
        ]);
        let out = reconcile(
            "field spec.a must be shorter than spec.c",
            &PathExpr::new("spec.a"),
            "spec.a",
            &table,
            &[],
        );
        assert_eq!(out.as_deref(), Some("must be shorter than c"));
    }
}
