//! Converting `Package.Initialize` into `AsyncPackage.InitializeAsync`.

use std::collections::HashSet;

use vssdk_syntax::make;
use vssdk_syntax::{Annotation, GreenElement, GreenNode, NodeRef, SyntaxKind, SyntaxTree};

use super::{indentation, line_ending, trailing_trivia, with_trivia_of};
use crate::error::FixError;

const SWITCH_COMMENT: [&str; 2] = [
    "// The package may now be initialized on a background thread. Switch to the UI thread",
    "// before using UI-bound services, or remove the switch if nothing below needs it.",
];

/// Rewrites an `override void Initialize()` into
/// `override async Task InitializeAsync(CancellationToken, IProgress<ServiceProgressData>)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitializeConversion {
    /// The method declaration.
    pub method: Annotation,
    /// The `base.Initialize();` statement, if the body has one.
    pub base_call: Option<Annotation>,
    /// `GetService` invocations in the body to turn into awaited
    /// `GetServiceAsync` calls.
    pub lookups: Vec<Annotation>,
    /// Name of the new cancellation token parameter.
    pub cancellation_token: String,
    /// Name of the new progress parameter.
    pub progress: String,
}

/// `wanted`, or `wanted` followed by the smallest number that makes it
/// distinct from every identifier inside `scope`.
pub fn unique_name(scope: NodeRef<'_>, wanted: &str) -> String {
    let taken: HashSet<&str> = scope
        .tokens()
        .filter(|t| t.kind() == SyntaxKind::Identifier)
        .map(|t| t.text())
        .collect();
    if !taken.contains(wanted) {
        return wanted.to_string();
    }
    (1..)
        .map(|n| format!("{wanted}{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| wanted.to_string())
}

impl InitializeConversion {
    pub(super) fn apply(&self, tree: &SyntaxTree) -> Result<Option<SyntaxTree>, FixError> {
        let Some(body_rewritten) = self.rewrite_body(tree)? else {
            return Ok(None);
        };
        self.rewrite_signature(&body_rewritten)
    }

    fn switch_statement(&self, indent: &str, newline: &str) -> Result<GreenNode, FixError> {
        let statement = make::parse_statement(&format!(
            "await this.JoinableTaskFactory.SwitchToMainThreadAsync({});",
            self.cancellation_token
        ))?;
        let mut leading = String::new();
        for line in SWITCH_COMMENT {
            leading.push_str(indent);
            leading.push_str(line);
            leading.push_str(newline);
        }
        leading.push_str(indent);
        Ok(statement
            .with_leading_trivia(leading)
            .with_trailing_trivia(newline))
    }

    /// First pass: statements of the body. Every node touched here lies
    /// strictly inside the block, so none of the edits overlap.
    fn rewrite_body(&self, tree: &SyntaxTree) -> Result<Option<SyntaxTree>, FixError> {
        let Some(method) = tree.find_annotated(self.method) else {
            return Ok(None);
        };
        let Some(body) = method.body() else {
            return Ok(None);
        };
        let newline = line_ending(method);
        let mut editor = tree.edit();

        let base_call = self
            .base_call
            .and_then(|a| tree.find_annotated(a))
            .filter(|b| body.is_ancestor_of(*b));
        match (base_call, body.statements().next()) {
            (Some(base_call), _) => {
                let call = make::parse_statement(&format!(
                    "await base.InitializeAsync({}, {});",
                    self.cancellation_token, self.progress
                ))?;
                editor.replace(base_call.id(), with_trivia_of(call, base_call));
                let switch = self.switch_statement(indentation(base_call), newline)?;
                let lead = format!("{newline}{}", switch.leading_trivia());
                let switch = switch.with_leading_trivia(lead);
                editor.insert_after(base_call.id(), vec![switch]);
            }
            (None, Some(first)) => {
                let switch = self.switch_statement(indentation(first), newline)?;
                editor.insert_before(first.id(), vec![switch]);
            }
            (None, None) => {
                editor.replace(body.id(), self.block_with_switch(method, body, newline)?);
                return Ok(Some(editor.finish()));
            }
        }

        for lookup in self.lookups.iter().filter_map(|a| tree.find_annotated(*a)) {
            if let Some(replacement) = awaited_lookup(lookup)? {
                editor.replace(lookup.id(), replacement);
            }
        }
        Ok(Some(editor.finish()))
    }

    /// Rebuilds an empty body so it holds only the switch statement.
    fn block_with_switch(
        &self,
        method: NodeRef<'_>,
        body: NodeRef<'_>,
        newline: &str,
    ) -> Result<GreenNode, FixError> {
        let outer = indentation(method);
        let inner = format!("{outer}    ");
        let open = body.first_token().map(|t| t.green());
        let close = body.last_token().map(|t| t.green());
        let open = open
            .unwrap_or_else(|| make::token(SyntaxKind::OpenBrace))
            .with_trailing(newline);
        let close = close
            .unwrap_or_else(|| make::token(SyntaxKind::CloseBrace))
            .with_leading(outer);
        Ok(GreenNode::new(
            SyntaxKind::Block,
            vec![
                open.into(),
                self.switch_statement(&inner, newline)?.into(),
                close.into(),
            ],
        ))
    }

    /// Second pass: the declaration itself, rebuilt from its children.
    fn rewrite_signature(&self, tree: &SyntaxTree) -> Result<Option<SyntaxTree>, FixError> {
        let Some(method) = tree.find_annotated(self.method) else {
            return Ok(None);
        };
        let mut green = method.green();

        if let Some(index) = green
            .children
            .iter()
            .position(|c| c.kind() == SyntaxKind::ParameterList)
        {
            let parameters = make::parse_parameter_list(&format!(
                "(CancellationToken {}, IProgress<ServiceProgressData> {})",
                self.cancellation_token, self.progress
            ))?;
            replace_node_keeping_trivia(&mut green.children[index], parameters);
        }

        if let Some(index) = green
            .children
            .iter()
            .rposition(|c| c.kind() == SyntaxKind::Identifier)
        {
            if let GreenElement::Token(name) = &mut green.children[index] {
                name.text = "InitializeAsync".to_string();
            }
        }

        let is_async = green
            .children
            .iter()
            .any(|c| c.kind() == SyntaxKind::AsyncKeyword);
        if let Some(index) = green.children.iter().position(|c| {
            matches!(c, GreenElement::Node(n) if n.kind != SyntaxKind::AttributeList)
        }) {
            replace_node_keeping_trivia(&mut green.children[index], make::parse_type("Task")?);
            if !is_async {
                let leading = match &mut green.children[index] {
                    GreenElement::Node(n) => {
                        let leading = n.leading_trivia().to_string();
                        n.set_leading_trivia("");
                        leading
                    }
                    GreenElement::Token(_) => String::new(),
                };
                let keyword = make::token(SyntaxKind::AsyncKeyword)
                    .with_leading(leading)
                    .with_trailing(" ");
                green.children.insert(index, keyword.into());
            }
        }

        let mut editor = tree.edit();
        editor.replace(method.id(), green);
        Ok(Some(editor.finish()))
    }
}

fn replace_node_keeping_trivia(slot: &mut GreenElement, replacement: GreenNode) {
    if let GreenElement::Node(old) = slot {
        let replacement = replacement
            .with_leading_trivia(old.leading_trivia())
            .with_trailing_trivia(old.trailing_trivia());
        *slot = replacement.into();
    }
}

/// `await GetServiceAsync(...)` for a `GetService(...)` invocation, in
/// parentheses when the result is dereferenced directly.
fn awaited_lookup(invocation: NodeRef<'_>) -> Result<Option<GreenNode>, FixError> {
    let (Some(callee), Some(arguments)) = (
        invocation.expression(),
        invocation.child_node(SyntaxKind::ArgumentList),
    ) else {
        return Ok(None);
    };
    let name = match callee.kind() {
        SyntaxKind::IdentifierName => callee,
        _ => match callee.name() {
            Some(name) => name,
            None => return Ok(None),
        },
    };
    let callee_text = callee.text();
    let receiver = callee_text
        .strip_suffix(name.text().as_str())
        .unwrap_or_default();
    let mut text = format!("await {receiver}GetServiceAsync{}", arguments.text());
    let dereferenced = invocation.parent().is_some_and(|p| {
        matches!(
            p.kind(),
            SyntaxKind::MemberAccessExpression
                | SyntaxKind::ConditionalAccessExpression
                | SyntaxKind::ElementAccessExpression
                | SyntaxKind::InvocationExpression
        ) && p.expression() == Some(invocation)
    });
    if dereferenced {
        text = format!("({text})");
    }
    let green = make::parse_expression(&text)?;
    Ok(Some(
        green
            .with_leading_trivia(invocation.leading_trivia())
            .with_trailing_trivia(trailing_trivia(invocation)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parse;

    fn convert(source: &str) -> String {
        let tree = parse(source);
        let method = tree
            .nodes()
            .find(|n| n.kind() == SyntaxKind::MethodDeclaration)
            .unwrap();
        let class = method.enclosing_type().unwrap();
        let mut tracked = vec![(method.id(), Annotation::fresh())];
        let base_call = tree
            .nodes()
            .find(|n| n.kind() == SyntaxKind::ExpressionStatement && n.text() == "base.Initialize();")
            .map(|n| {
                let a = Annotation::fresh();
                tracked.push((n.id(), a));
                a
            });
        let lookups: Vec<_> = tree
            .nodes()
            .filter(|n| {
                n.kind() == SyntaxKind::InvocationExpression
                    && n.expression().is_some_and(|e| e.text().ends_with("GetService"))
            })
            .map(|n| {
                let a = Annotation::fresh();
                tracked.push((n.id(), a));
                a
            })
            .collect();
        let conversion = InitializeConversion {
            method: tracked[0].1,
            base_call,
            lookups,
            cancellation_token: unique_name(class, "cancellationToken"),
            progress: unique_name(class, "progress"),
        };
        let annotated = tree.with_annotations(&tracked);
        conversion.apply(&annotated).unwrap().unwrap().text()
    }

    #[test]
    fn converts_signature_base_call_and_lookups() {
        let out = convert(
            "class P : AsyncPackage\n\
             {\n    protected override void Initialize()\n    {\n        base.Initialize();\n        var s = GetService(typeof(S)) as IS;\n        this.GetService(typeof(T)).ToString();\n    }\n}\n",
        );
        assert_eq!(
            out,
            "class P : AsyncPackage\n\
             {\n    protected override async Task InitializeAsync(CancellationToken cancellationToken, IProgress<ServiceProgressData> progress)\n    {\n        await base.InitializeAsync(cancellationToken, progress);\n\n        \
             // The package may now be initialized on a background thread. Switch to the UI thread\n        \
             // before using UI-bound services, or remove the switch if nothing below needs it.\n        \
             await this.JoinableTaskFactory.SwitchToMainThreadAsync(cancellationToken);\n        \
             var s = await GetServiceAsync(typeof(S)) as IS;\n        \
             (await this.GetServiceAsync(typeof(T))).ToString();\n    }\n}\n"
        );
    }

    #[test]
    fn switch_goes_first_without_a_base_call() {
        let out = convert("class P\n{\n    protected override void Initialize()\n    {\n        Setup();\n    }\n}\n");
        assert!(out.contains(
            "needs it.\n        await this.JoinableTaskFactory.SwitchToMainThreadAsync(cancellationToken);\n        Setup();\n"
        ));
    }

    #[test]
    fn empty_body_is_rebuilt() {
        let out = convert("class P\n{\n    protected override void Initialize() { }\n}\n");
        assert!(out.contains(
            "InitializeAsync(CancellationToken cancellationToken, IProgress<ServiceProgressData> progress) {\n        // The package"
        ));
        assert!(out.ends_with("SwitchToMainThreadAsync(cancellationToken);\n    }\n}\n"));
    }

    #[test]
    fn parameter_names_avoid_collisions() {
        let out = convert(
            "class P\n{\n    int progress;\n    object cancellationToken;\n    protected override void Initialize() { progress = 1; }\n}\n",
        );
        assert!(out.contains("(CancellationToken cancellationToken1, IProgress<ServiceProgressData> progress1)"));
        assert!(out.contains("SwitchToMainThreadAsync(cancellationToken1);"));
    }

    #[test]
    fn existing_async_modifier_is_kept_once() {
        let out = convert("class P\n{\n    protected override async void Initialize() { Setup(); }\n}\n");
        assert!(out.contains("protected override async Task InitializeAsync("));
        assert_eq!(out.matches("async ").count(), 1);
    }
}
