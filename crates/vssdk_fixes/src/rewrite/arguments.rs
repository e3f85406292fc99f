//! Attribute argument edits.

use vssdk_syntax::make;
use vssdk_syntax::{GreenElement, GreenNode, NodeRef, SyntaxKind, SyntaxTree};

use super::{trailing_trivia, with_trivia_of};
use crate::error::FixError;

/// The name of a `Name = value` argument.
fn argument_name(argument: NodeRef<'_>) -> Option<String> {
    let name_equals = argument.child_node(SyntaxKind::NameEquals)?;
    Some(name_equals.name()?.text())
}

fn named_argument<'a>(attribute: NodeRef<'a>, name: &str) -> Option<NodeRef<'a>> {
    attribute
        .arguments()
        .find(|a| argument_name(*a).as_deref() == Some(name))
}

fn comma() -> GreenElement {
    make::token(SyntaxKind::Comma).with_trailing(" ").into()
}

/// Positions of the argument nodes among the children of a list.
fn argument_slots(list: &GreenNode) -> Vec<usize> {
    list.children
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind() == SyntaxKind::AttributeArgument)
        .map(|(i, _)| i)
        .collect()
}

/// Inserts `argument` so that it becomes argument number `position`.
fn insert_into_list(list: &GreenNode, position: usize, argument: GreenNode) -> GreenNode {
    let slots = argument_slots(list);
    let mut list = list.clone();
    match position.checked_sub(1).and_then(|p| slots.get(p)) {
        Some(&previous) => {
            list.children.insert(previous + 1, argument.into());
            list.children.insert(previous + 1, comma());
        }
        None => {
            let open = list
                .children
                .iter()
                .position(|c| c.kind() == SyntaxKind::OpenParen)
                .map_or(0, |i| i + 1);
            if slots.is_empty() {
                list.children.insert(open, argument.into());
            } else {
                list.children.insert(open, comma());
                list.children.insert(open, argument.into());
            }
        }
    }
    list
}

/// Adds `argument` at `position` of the attribute's argument list, creating
/// the list when the attribute has none.
fn insert_argument(
    attribute: NodeRef<'_>,
    position: usize,
    argument: GreenNode,
) -> SyntaxTree {
    let mut editor = attribute.tree().edit();
    match attribute.child_node(SyntaxKind::AttributeArgumentList) {
        Some(list) => {
            editor.replace(list.id(), insert_into_list(&list.green(), position, argument));
        }
        None => {
            let mut green = attribute.green();
            let trailing = green.trailing_trivia().to_string();
            green.set_trailing_trivia("");
            let list = GreenNode::new(
                SyntaxKind::AttributeArgumentList,
                vec![
                    make::token(SyntaxKind::OpenParen).into(),
                    argument.into(),
                    make::token(SyntaxKind::CloseParen)
                        .with_trailing(trailing)
                        .into(),
                ],
            );
            green.children.push(list.into());
            editor.replace(attribute.id(), green);
        }
    }
    editor.finish()
}

/// Sets `name = value`, replacing the value of an existing argument or
/// appending a new one.
pub(super) fn set_named_argument(
    attribute: NodeRef<'_>,
    name: &str,
    value: &str,
) -> Result<SyntaxTree, FixError> {
    if let Some(existing) = named_argument(attribute, name) {
        let Some(expression) = existing.expression() else {
            return Ok(attribute.tree().edit().finish());
        };
        let replacement = with_trivia_of(make::parse_expression(value)?, expression);
        let mut editor = attribute.tree().edit();
        editor.replace(expression.id(), replacement);
        return Ok(editor.finish());
    }
    let argument = make::parse_attribute_argument(&format!("{name} = {value}"))?;
    let count = attribute.arguments().count();
    Ok(insert_argument(attribute, count, argument))
}

/// Removes `name = ...` together with one adjacent comma. An argument list
/// left empty is removed as well.
pub(super) fn remove_named_argument(attribute: NodeRef<'_>, name: &str) -> SyntaxTree {
    let tree = attribute.tree();
    let (Some(list), Some(target)) = (
        attribute.child_node(SyntaxKind::AttributeArgumentList),
        named_argument(attribute, name),
    ) else {
        return tree.edit().finish();
    };
    let mut editor = tree.edit();
    let index = attribute
        .arguments()
        .position(|a| a == target)
        .unwrap_or_default();
    if attribute.arguments().count() == 1 {
        let mut green = attribute.green();
        green
            .children
            .retain(|c| c.kind() != SyntaxKind::AttributeArgumentList);
        green.set_trailing_trivia(trailing_trivia(list));
        editor.replace(attribute.id(), green);
        return editor.finish();
    }

    let mut green = list.green();
    let slots = argument_slots(&green);
    let slot = slots[index];
    let is_comma = |i: usize| {
        green
            .children
            .get(i)
            .is_some_and(|c| c.kind() == SyntaxKind::Comma)
    };
    let comma_after = is_comma(slot + 1);
    let comma_before = slot > 0 && is_comma(slot - 1);
    if comma_after {
        let leading = target.leading_trivia().to_string();
        green.children.drain(slot..slot + 2);
        if let Some(GreenElement::Node(next)) = green.children.get_mut(slot) {
            next.set_leading_trivia(leading);
        }
    } else if comma_before {
        green.children.drain(slot - 1..=slot);
    } else {
        green.children.remove(slot);
    }
    editor.replace(list.id(), green);
    editor.finish()
}

/// Ors `flag` into the second positional argument, or adds it as the
/// second positional argument.
pub(super) fn add_flag(attribute: NodeRef<'_>, flag: &str) -> Result<SyntaxTree, FixError> {
    let positional: Vec<_> = attribute
        .arguments()
        .filter(|a| a.child_node(SyntaxKind::NameEquals).is_none())
        .collect();
    if let Some(flags) = positional.get(1).and_then(|a| a.expression()) {
        let combined = make::parse_expression(&format!("{} | {flag}", flags.text()))?;
        let mut editor = attribute.tree().edit();
        editor.replace(flags.id(), with_trivia_of(combined, flags));
        return Ok(editor.finish());
    }
    let argument = make::parse_attribute_argument(flag)?;
    Ok(insert_argument(attribute, positional.len(), argument))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{node_with_text, parse};

    fn attribute<'a>(tree: &'a SyntaxTree, text: &str) -> NodeRef<'a> {
        node_with_text(tree, SyntaxKind::Attribute, text).unwrap()
    }

    #[test]
    fn set_replaces_an_existing_value() {
        let tree = parse("[PackageRegistration(UseManagedResourcesOnly = true, AllowsBackgroundLoading = /* no */ false)] class P { }");
        let a = attribute(&tree, "PackageRegistration(UseManagedResourcesOnly = true, AllowsBackgroundLoading = /* no */ false)");
        let out = set_named_argument(a, "AllowsBackgroundLoading", "true").unwrap();
        assert_eq!(
            out.text(),
            "[PackageRegistration(UseManagedResourcesOnly = true, AllowsBackgroundLoading = /* no */ true)] class P { }"
        );
    }

    #[test]
    fn set_appends_to_an_existing_list() {
        let tree = parse("[PackageRegistration(UseManagedResourcesOnly = true)] class P { }");
        let a = attribute(&tree, "PackageRegistration(UseManagedResourcesOnly = true)");
        let out = set_named_argument(a, "AllowsBackgroundLoading", "true").unwrap();
        assert_eq!(
            out.text(),
            "[PackageRegistration(UseManagedResourcesOnly = true, AllowsBackgroundLoading = true)] class P { }"
        );
    }

    #[test]
    fn set_creates_the_list() {
        let tree = parse("[PackageRegistration] class P { }");
        let a = attribute(&tree, "PackageRegistration");
        let out = set_named_argument(a, "AllowsBackgroundLoading", "true").unwrap();
        assert_eq!(
            out.text(),
            "[PackageRegistration(AllowsBackgroundLoading = true)] class P { }"
        );
    }

    #[test]
    fn remove_takes_one_comma() {
        let tree = parse("[R(A = 1, AllowsBackgroundLoading = true, B = 2)] class P { }");
        let a = attribute(&tree, "R(A = 1, AllowsBackgroundLoading = true, B = 2)");
        let out = remove_named_argument(a, "AllowsBackgroundLoading");
        assert_eq!(out.text(), "[R(A = 1, B = 2)] class P { }");

        let tree = parse("[R(A = 1, AllowsBackgroundLoading = true)] class P { }");
        let a = attribute(&tree, "R(A = 1, AllowsBackgroundLoading = true)");
        let out = remove_named_argument(a, "AllowsBackgroundLoading");
        assert_eq!(out.text(), "[R(A = 1)] class P { }");
    }

    #[test]
    fn removing_the_only_argument_drops_the_list() {
        let tree = parse("[R(AllowsBackgroundLoading = true)] class P { }");
        let a = attribute(&tree, "R(AllowsBackgroundLoading = true)");
        let out = remove_named_argument(a, "AllowsBackgroundLoading");
        assert_eq!(out.text(), "[R] class P { }");
    }

    #[test]
    fn flag_is_ored_into_existing_flags() {
        let tree = parse("[ProvideAutoLoad(Guids.NoSolution, PackageAutoLoadFlags.SkipWhenUIContextRulesActive)] class P { }");
        let a = attribute(&tree, "ProvideAutoLoad(Guids.NoSolution, PackageAutoLoadFlags.SkipWhenUIContextRulesActive)");
        let out = add_flag(a, "PackageAutoLoadFlags.BackgroundLoad").unwrap();
        assert_eq!(
            out.text(),
            "[ProvideAutoLoad(Guids.NoSolution, PackageAutoLoadFlags.SkipWhenUIContextRulesActive | PackageAutoLoadFlags.BackgroundLoad)] class P { }"
        );
    }

    #[test]
    fn flag_goes_before_named_arguments() {
        let tree = parse("[ProvideAutoLoad(Guids.NoSolution, Name = \"x\")] class P { }");
        let a = attribute(&tree, "ProvideAutoLoad(Guids.NoSolution, Name = \"x\")");
        let out = add_flag(a, "PackageAutoLoadFlags.BackgroundLoad").unwrap();
        assert_eq!(
            out.text(),
            "[ProvideAutoLoad(Guids.NoSolution, PackageAutoLoadFlags.BackgroundLoad, Name = \"x\")] class P { }"
        );
    }
}
