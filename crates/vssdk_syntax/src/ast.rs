//! Role accessors on [`NodeRef`].
//!
//! These helpers encode the child layouts documented in [`crate::kind`] so
//! that analyzers can ask for "the condition of this `if`" instead of
//! counting children. Accessors return `None` when the node has a different
//! kind or the part is absent.

use crate::kind::SyntaxKind;
use crate::tree::{NodeRef, TokenRef};

impl<'a> NodeRef<'a> {
    /// The declared or referenced identifier token of a declaration, name,
    /// parameter, declarator or designation.
    pub fn identifier(&self) -> Option<TokenRef<'a>> {
        match self.kind() {
            SyntaxKind::MethodDeclaration
            | SyntaxKind::PropertyDeclaration
            | SyntaxKind::EventDeclaration => self
                .child_tokens()
                .filter(|t| t.kind() == SyntaxKind::Identifier)
                .last(),
            SyntaxKind::ExplicitInterfaceSpecifier => None,
            _ => self.token(SyntaxKind::Identifier),
        }
    }

    /// Text of [`NodeRef::identifier`], or the empty string.
    pub fn identifier_text(&self) -> &'a str {
        self.identifier().map_or("", |t| t.text())
    }

    /// Modifier tokens such as `public`, `static` and `async`.
    pub fn modifiers(&self) -> impl Iterator<Item = TokenRef<'a>> + 'a {
        self.child_tokens().filter(|t| t.kind().is_modifier_keyword())
    }

    /// Returns `true` if the declaration carries the given modifier.
    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        self.modifiers().any(|t| t.kind() == kind)
    }

    /// All attributes across the node's attribute lists.
    pub fn attributes(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.child_nodes()
            .filter(|n| n.kind() == SyntaxKind::AttributeList)
            .flat_map(|list| {
                list.child_nodes()
                    .filter(|n| n.kind() == SyntaxKind::Attribute)
            })
    }

    /// The type node of a declaration, parameter, cast, creation, `as`
    /// expression or type-based pattern.
    pub fn declared_type(&self) -> Option<NodeRef<'a>> {
        let first_non_attribute = || {
            self.child_nodes()
                .find(|n| n.kind() != SyntaxKind::AttributeList)
        };
        match self.kind() {
            SyntaxKind::MethodDeclaration
            | SyntaxKind::PropertyDeclaration
            | SyntaxKind::IndexerDeclaration
            | SyntaxKind::DelegateDeclaration
            | SyntaxKind::OperatorDeclaration
            | SyntaxKind::EventDeclaration
            | SyntaxKind::LocalFunctionStatement => first_non_attribute(),
            SyntaxKind::Parameter => first_non_attribute()
                .filter(|n| n.kind() != SyntaxKind::EqualsValueClause),
            SyntaxKind::FieldDeclaration
            | SyntaxKind::EventFieldDeclaration
            | SyntaxKind::LocalDeclarationStatement => self
                .child_node(SyntaxKind::VariableDeclaration)
                .and_then(|d| d.nth_child_node(0)),
            SyntaxKind::RecursivePattern => self
                .nth_child_node(0)
                .filter(|n| n.kind() != SyntaxKind::PropertyPatternClause),
            SyntaxKind::BinaryExpression if self.token(SyntaxKind::AsKeyword).is_some() => {
                self.nth_child_node(1)
            }
            SyntaxKind::VariableDeclaration
            | SyntaxKind::CatchDeclaration
            | SyntaxKind::ForEachStatement
            | SyntaxKind::DeclarationExpression
            | SyntaxKind::DeclarationPattern
            | SyntaxKind::TypePattern
            | SyntaxKind::CastExpression
            | SyntaxKind::ObjectCreationExpression
            | SyntaxKind::ArrayCreationExpression
            | SyntaxKind::TypeOfExpression
            | SyntaxKind::SizeOfExpression
            | SyntaxKind::DefaultExpression
            | SyntaxKind::ConversionOperatorDeclaration
            | SyntaxKind::SimpleBaseType
            | SyntaxKind::TypeConstraint
            | SyntaxKind::TupleElement
            | SyntaxKind::NullableType
            | SyntaxKind::ArrayType => self.nth_child_node(0),
            _ => None,
        }
    }

    /// Member declarations of a compilation unit, namespace or type.
    pub fn members(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.child_nodes().filter(|n| is_member_kind(n.kind()))
    }

    /// `using` directives of a compilation unit or namespace.
    pub fn usings(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.child_nodes()
            .filter(|n| n.kind() == SyntaxKind::UsingDirective)
    }

    /// The types listed after `:` on a type declaration.
    pub fn base_types(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.child_node(SyntaxKind::BaseList)
            .into_iter()
            .flat_map(|list| list.child_nodes())
            .filter_map(|base| base.nth_child_node(0))
    }

    /// The name of a namespace declaration, using directive or attribute.
    pub fn name(&self) -> Option<NodeRef<'a>> {
        match self.kind() {
            SyntaxKind::NamespaceDeclaration
            | SyntaxKind::FileScopedNamespaceDeclaration
            | SyntaxKind::Attribute => self.nth_child_node(0),
            SyntaxKind::UsingDirective => self
                .child_nodes()
                .find(|n| n.kind() != SyntaxKind::NameEquals),
            SyntaxKind::MemberAccessExpression
            | SyntaxKind::MemberBindingExpression
            | SyntaxKind::QualifiedName
            | SyntaxKind::AliasQualifiedName => self.child_nodes().last(),
            SyntaxKind::NameEquals | SyntaxKind::NameColon => self.nth_child_node(0),
            _ => None,
        }
    }

    /// Block body of a function-like node, accessor or statement owner.
    pub fn body(&self) -> Option<NodeRef<'a>> {
        match self.kind() {
            SyntaxKind::SimpleLambdaExpression
            | SyntaxKind::ParenthesizedLambdaExpression
            | SyntaxKind::AnonymousMethodExpression => self
                .child_nodes()
                .last()
                .filter(|n| n.kind() == SyntaxKind::Block),
            _ => self.child_node(SyntaxKind::Block),
        }
    }

    /// Expression body: `=> expr` of a member or the expression of a lambda.
    pub fn expression_body(&self) -> Option<NodeRef<'a>> {
        match self.kind() {
            SyntaxKind::SimpleLambdaExpression | SyntaxKind::ParenthesizedLambdaExpression => self
                .child_nodes()
                .last()
                .filter(|n| n.kind() != SyntaxKind::Block),
            _ => self
                .child_node(SyntaxKind::ArrowExpressionClause)
                .and_then(|arrow| arrow.nth_child_node(0)),
        }
    }

    /// Parameters of a method-like declaration, lambda or indexer.
    pub fn parameters(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let list = if self.kind() == SyntaxKind::SimpleLambdaExpression {
            Some(*self)
        } else {
            self.child_nodes().find(|n| {
                matches!(
                    n.kind(),
                    SyntaxKind::ParameterList | SyntaxKind::BracketedParameterList
                )
            })
        };
        list.into_iter()
            .flat_map(|l| l.child_nodes())
            .filter(|n| n.kind() == SyntaxKind::Parameter)
    }

    /// Argument nodes of an invocation, creation, element access, attribute
    /// or constructor initializer.
    pub fn arguments(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.child_nodes()
            .find(|n| {
                matches!(
                    n.kind(),
                    SyntaxKind::ArgumentList
                        | SyntaxKind::BracketedArgumentList
                        | SyntaxKind::AttributeArgumentList
                )
            })
            .into_iter()
            .flat_map(|l| l.child_nodes())
            .filter(|n| {
                matches!(
                    n.kind(),
                    SyntaxKind::Argument | SyntaxKind::AttributeArgument
                )
            })
    }

    /// The leading expression: receiver of a member access, invocation,
    /// element access or conditional access; operand of a postfix operator;
    /// the expression of an argument, statement or clause.
    pub fn expression(&self) -> Option<NodeRef<'a>> {
        match self.kind() {
            SyntaxKind::Argument
            | SyntaxKind::AttributeArgument
            | SyntaxKind::EqualsValueClause
            | SyntaxKind::AnonymousObjectMemberDeclarator
            | SyntaxKind::ParenthesizedExpression
            | SyntaxKind::AwaitExpression
            | SyntaxKind::PrefixUnaryExpression
            | SyntaxKind::CastExpression
            | SyntaxKind::ThrowExpression
            | SyntaxKind::ReturnStatement
            | SyntaxKind::ThrowStatement
            | SyntaxKind::ArrowExpressionClause
            | SyntaxKind::ConstantPattern
            | SyntaxKind::WhenClause => self.child_nodes().last(),
            SyntaxKind::ForEachStatement => self.child_nodes().nth(1),
            _ => self.nth_child_node(0),
        }
    }

    /// Left operand of a binary or assignment expression.
    pub fn left(&self) -> Option<NodeRef<'a>> {
        self.nth_child_node(0)
    }

    /// Right operand of a binary or assignment expression.
    pub fn right(&self) -> Option<NodeRef<'a>> {
        let mut nodes = self.child_nodes();
        nodes.next()?;
        nodes.last()
    }

    /// The operator text of a binary, assignment or unary expression, with
    /// split tokens such as `>` `>` joined.
    pub fn operator_text(&self) -> String {
        self.child_tokens().map(|t| t.text()).collect()
    }

    /// The first operator token of a binary, assignment or unary expression.
    pub fn operator_kind(&self) -> Option<SyntaxKind> {
        self.child_tokens().next().map(|t| t.kind())
    }

    /// The `when_not_null` part of a conditional access.
    pub fn when_not_null(&self) -> Option<NodeRef<'a>> {
        (self.kind() == SyntaxKind::ConditionalAccessExpression)
            .then(|| self.nth_child_node(1))
            .flatten()
    }

    /// The pattern of an `is` expression, switch label or arm.
    pub fn pattern(&self) -> Option<NodeRef<'a>> {
        self.child_nodes().find(|n| n.kind().is_pattern())
    }

    /// The condition of an `if`, `while`, `do` or conditional expression.
    pub fn condition(&self) -> Option<NodeRef<'a>> {
        match self.kind() {
            SyntaxKind::IfStatement
            | SyntaxKind::WhileStatement
            | SyntaxKind::ConditionalExpression
            | SyntaxKind::LockStatement => self.nth_child_node(0),
            SyntaxKind::DoStatement => self.nth_child_node(1),
            _ => None,
        }
    }

    /// The statement governed by an `if`, loop, `using`, `lock` or `else`.
    pub fn embedded_statement(&self) -> Option<NodeRef<'a>> {
        match self.kind() {
            SyntaxKind::IfStatement => self.nth_child_node(1),
            SyntaxKind::DoStatement => self.nth_child_node(0),
            SyntaxKind::ElseClause
            | SyntaxKind::WhileStatement
            | SyntaxKind::ForStatement
            | SyntaxKind::ForEachStatement
            | SyntaxKind::UsingStatement
            | SyntaxKind::LockStatement => self.child_nodes().last(),
            _ => None,
        }
    }

    /// The `else` clause of an `if`.
    pub fn else_clause(&self) -> Option<NodeRef<'a>> {
        self.child_node(SyntaxKind::ElseClause)
    }

    /// Statements of a block or switch section.
    pub fn statements(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.child_nodes().filter(|n| n.kind().is_statement())
    }

    /// Declarators of a field, event field, local declaration or variable declaration.
    pub fn declarators(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let declaration = if self.kind() == SyntaxKind::VariableDeclaration {
            Some(*self)
        } else {
            self.child_node(SyntaxKind::VariableDeclaration)
        };
        declaration
            .into_iter()
            .flat_map(|d| d.child_nodes())
            .filter(|n| n.kind() == SyntaxKind::VariableDeclarator)
    }

    /// The initial value of a declarator, property, parameter or enum member.
    pub fn initializer_value(&self) -> Option<NodeRef<'a>> {
        self.child_node(SyntaxKind::EqualsValueClause)
            .and_then(|clause| clause.nth_child_node(0))
    }

    /// The designated variable of a pattern or declaration expression.
    pub fn designation(&self) -> Option<NodeRef<'a>> {
        self.child_node(SyntaxKind::SingleVariableDesignation)
    }

    /// Returns the innermost enclosing function-like node, stopping at type
    /// declarations.
    pub fn enclosing_function(&self) -> Option<NodeRef<'a>> {
        self.ancestors()
            .take_while(|n| !n.kind().is_type_declaration())
            .find(|n| {
                n.kind().is_function_like()
                    || matches!(
                        n.kind(),
                        SyntaxKind::PropertyDeclaration | SyntaxKind::IndexerDeclaration
                    )
            })
    }

    /// Returns the innermost enclosing type declaration.
    pub fn enclosing_type(&self) -> Option<NodeRef<'a>> {
        self.ancestors().find(|n| n.kind().is_type_declaration())
    }
}

fn is_member_kind(kind: SyntaxKind) -> bool {
    kind.is_type_declaration()
        || matches!(
            kind,
            SyntaxKind::NamespaceDeclaration
                | SyntaxKind::FileScopedNamespaceDeclaration
                | SyntaxKind::FieldDeclaration
                | SyntaxKind::EventFieldDeclaration
                | SyntaxKind::EventDeclaration
                | SyntaxKind::PropertyDeclaration
                | SyntaxKind::IndexerDeclaration
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::ConstructorDeclaration
                | SyntaxKind::DestructorDeclaration
                | SyntaxKind::OperatorDeclaration
                | SyntaxKind::ConversionOperatorDeclaration
        )
}

#[cfg(test)]
mod tests {
    use crate::kind::SyntaxKind;
    use crate::parse_text;
    use vssdk_diagnostics::DiagnosticSink;
    use vssdk_source::FileId;

    const SOURCE: &str = "using Shell = Microsoft.VisualStudio.Shell;\n\
        namespace N {\n\
        [Guid(\"a\"), ProvideMenuResource(\"Menus.ctmenu\", 1)]\n\
        public sealed class P : AsyncPackage {\n\
          private IVsShell shell = null;\n\
          protected override async Task InitializeAsync(CancellationToken ct, IProgress<int> p) {\n\
            if (shell != null) { shell.Run(1, x: 2); }\n\
          }\n\
        }\n}\n";

    #[test]
    fn declaration_accessors() {
        let sink = DiagnosticSink::new();
        let tree = parse_text(FileId::from_raw(0), SOURCE, &sink);
        assert!(!sink.has_errors(), "{:?}", sink.take_all());
        let root = tree.root();

        let using = root.usings().next().unwrap();
        assert_eq!(using.name().unwrap().text(), "Microsoft.VisualStudio.Shell");

        let ns = root.members().next().unwrap();
        assert_eq!(ns.name().unwrap().text(), "N");
        let class = ns.members().next().unwrap();
        assert_eq!(class.identifier_text(), "P");
        assert!(class.has_modifier(SyntaxKind::SealedKeyword));
        assert_eq!(class.attributes().count(), 2);
        assert_eq!(
            class.base_types().map(|b| b.text()).collect::<Vec<_>>(),
            vec!["AsyncPackage"]
        );

        let members: Vec<_> = class.members().collect();
        assert_eq!(members.len(), 2);
        let field = members[0];
        assert_eq!(field.declared_type().unwrap().text(), "IVsShell");
        let declarator = field.declarators().next().unwrap();
        assert_eq!(declarator.identifier_text(), "shell");
        assert_eq!(declarator.initializer_value().unwrap().text(), "null");

        let method = members[1];
        assert_eq!(method.identifier_text(), "InitializeAsync");
        assert!(method.has_modifier(SyntaxKind::AsyncKeyword));
        assert_eq!(method.declared_type().unwrap().text(), "Task");
        assert_eq!(method.parameters().count(), 2);
    }

    #[test]
    fn expression_accessors() {
        let sink = DiagnosticSink::new();
        let tree = parse_text(FileId::from_raw(0), SOURCE, &sink);
        let if_stmt = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::IfStatement)
            .unwrap();
        let condition = if_stmt.condition().unwrap();
        assert_eq!(condition.left().unwrap().text(), "shell");
        assert_eq!(condition.right().unwrap().text(), "null");
        assert_eq!(condition.operator_text(), "!=");

        let invocation = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::InvocationExpression)
            .unwrap();
        let callee = invocation.expression().unwrap();
        assert_eq!(callee.name().unwrap().text(), "Run");
        let args: Vec<_> = invocation.arguments().collect();
        assert_eq!(args.len(), 2);
        assert_eq!(args[1].expression().unwrap().text(), "2");
        assert_eq!(
            invocation.enclosing_function().unwrap().identifier_text(),
            "InitializeAsync"
        );
    }
}
