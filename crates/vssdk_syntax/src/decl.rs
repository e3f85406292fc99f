//! Namespace, type and member declarations.

use crate::green::{GreenElement, GreenNode};
use crate::kind::SyntaxKind;
use crate::parser::{identifier_name, CSharpParser, TypeMode};

impl CSharpParser<'_> {
    // ========================================================================
    // Namespaces and type declarations
    // ========================================================================

    /// Parses a namespace or type declaration. Returns `None` without
    /// consuming anything when no declaration starts here.
    pub(crate) fn parse_namespace_member(&mut self) -> Option<GreenNode> {
        if self.at(SyntaxKind::NamespaceKeyword) {
            return Some(self.parse_namespace());
        }
        let mut children = Vec::new();
        self.parse_attribute_lists(&mut children);
        self.parse_modifiers(&mut children);
        if let Some(decl) = self.parse_type_declaration_after_modifiers(&mut children) {
            return Some(decl);
        }
        if children.is_empty() {
            return None;
        }
        self.expected("type declaration");
        Some(GreenNode::new(SyntaxKind::SkippedTokens, children))
    }

    fn parse_namespace(&mut self) -> GreenNode {
        let mut children = vec![self.bump()];
        children.push(self.parse_name().into());
        if self.at(SyntaxKind::Semicolon) {
            children.push(self.bump());
            self.parse_using_directives(&mut children);
            while !self.at_eof() {
                let before = self.pos;
                if let Some(member) = self.parse_namespace_member() {
                    children.push(member.into());
                }
                if self.pos == before {
                    self.expected("type declaration");
                    children.push(self.skip_token().into());
                }
            }
            return GreenNode::new(SyntaxKind::FileScopedNamespaceDeclaration, children);
        }
        children.push(self.expect(SyntaxKind::OpenBrace));
        self.parse_using_directives(&mut children);
        while !self.at(SyntaxKind::CloseBrace) && !self.at_eof() {
            let before = self.pos;
            if let Some(member) = self.parse_namespace_member() {
                children.push(member.into());
            }
            if self.pos == before {
                self.expected("type declaration");
                children.push(self.skip_token().into());
            }
        }
        children.push(self.expect(SyntaxKind::CloseBrace));
        self.eat_into(SyntaxKind::Semicolon, &mut children);
        GreenNode::new(SyntaxKind::NamespaceDeclaration, children)
    }

    /// Parses declaration modifiers, re-tagging `async` and `partial` when
    /// they are used as modifiers.
    pub(crate) fn parse_modifiers(&mut self, out: &mut Vec<GreenElement>) {
        loop {
            let kind = self.current();
            if kind.is_modifier_keyword() {
                out.push(self.bump());
            } else if self.at_contextual("async") && self.modifier_follows(1) {
                out.push(self.bump_remap(SyntaxKind::AsyncKeyword));
            } else if self.at_contextual("partial") && self.modifier_follows(1) {
                out.push(self.bump_remap(SyntaxKind::PartialKeyword));
            } else {
                break;
            }
        }
    }

    /// Returns `true` if the token `n` ahead can follow a contextual modifier.
    fn modifier_follows(&self, n: usize) -> bool {
        let next = self.nth(n);
        next == SyntaxKind::Identifier
            || next.is_predefined_type()
            || next.is_modifier_keyword()
            || matches!(
                next,
                SyntaxKind::ClassKeyword
                    | SyntaxKind::StructKeyword
                    | SyntaxKind::InterfaceKeyword
                    | SyntaxKind::OpenParen
            )
    }

    fn parse_type_declaration_after_modifiers(
        &mut self,
        children: &mut Vec<GreenElement>,
    ) -> Option<GreenNode> {
        let kind = match self.current() {
            SyntaxKind::ClassKeyword => SyntaxKind::ClassDeclaration,
            SyntaxKind::StructKeyword => SyntaxKind::StructDeclaration,
            SyntaxKind::InterfaceKeyword => SyntaxKind::InterfaceDeclaration,
            SyntaxKind::EnumKeyword => return Some(self.parse_enum(std::mem::take(children))),
            SyntaxKind::DelegateKeyword => {
                return Some(self.parse_delegate(std::mem::take(children)))
            }
            _ => return None,
        };
        let mut children = std::mem::take(children);
        children.push(self.bump());
        children.push(self.expect_ident());
        if self.at(SyntaxKind::LessThan) {
            children.push(self.parse_type_parameter_list().into());
        }
        if self.at(SyntaxKind::Colon) {
            children.push(self.parse_base_list().into());
        }
        self.parse_constraint_clauses(&mut children);
        children.push(self.expect(SyntaxKind::OpenBrace));
        self.parse_member_list(&mut children);
        children.push(self.expect(SyntaxKind::CloseBrace));
        self.eat_into(SyntaxKind::Semicolon, &mut children);
        Some(GreenNode::new(kind, children))
    }

    fn parse_member_list(&mut self, out: &mut Vec<GreenElement>) {
        while !self.at(SyntaxKind::CloseBrace) && !self.at_eof() {
            let before = self.pos;
            if let Some(member) = self.parse_member() {
                out.push(member.into());
            }
            if self.pos == before {
                self.expected("member declaration");
                out.push(self.skip_token().into());
            }
        }
    }

    fn parse_enum(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.bump());
        children.push(self.expect_ident());
        if self.at(SyntaxKind::Colon) {
            children.push(self.parse_base_list().into());
        }
        children.push(self.expect(SyntaxKind::OpenBrace));
        while !self.at(SyntaxKind::CloseBrace) && !self.at_eof() {
            let mut member = Vec::new();
            self.parse_attribute_lists(&mut member);
            member.push(self.expect_ident());
            if self.at(SyntaxKind::Equals) {
                member.push(self.parse_equals_value_clause().into());
            }
            children.push(GreenNode::new(SyntaxKind::EnumMemberDeclaration, member).into());
            if !self.eat_into(SyntaxKind::Comma, &mut children) {
                break;
            }
        }
        children.push(self.expect(SyntaxKind::CloseBrace));
        self.eat_into(SyntaxKind::Semicolon, &mut children);
        GreenNode::new(SyntaxKind::EnumDeclaration, children)
    }

    fn parse_delegate(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.bump());
        children.push(self.parse_type(TypeMode::Normal).into());
        children.push(self.expect_ident());
        if self.at(SyntaxKind::LessThan) {
            children.push(self.parse_type_parameter_list().into());
        }
        children.push(self.parse_parameter_list().into());
        self.parse_constraint_clauses(&mut children);
        children.push(self.expect(SyntaxKind::Semicolon));
        GreenNode::new(SyntaxKind::DelegateDeclaration, children)
    }

    /// Parses `<in T, out U>` on a declaration.
    pub(crate) fn parse_type_parameter_list(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::LessThan)];
        loop {
            let mut param = Vec::new();
            self.parse_attribute_lists(&mut param);
            if self.at(SyntaxKind::InKeyword) || self.at(SyntaxKind::OutKeyword) {
                param.push(self.bump());
            }
            param.push(self.expect_ident());
            children.push(GreenNode::new(SyntaxKind::TypeParameter, param).into());
            if !self.eat_into(SyntaxKind::Comma, &mut children) {
                break;
            }
        }
        children.push(self.expect(SyntaxKind::GreaterThan));
        GreenNode::new(SyntaxKind::TypeParameterList, children)
    }

    fn parse_base_list(&mut self) -> GreenNode {
        let mut children = vec![self.bump()];
        loop {
            let ty = self.parse_type(TypeMode::Normal);
            children.push(GreenNode::new(SyntaxKind::SimpleBaseType, vec![ty.into()]).into());
            if !self.eat_into(SyntaxKind::Comma, &mut children) {
                break;
            }
        }
        GreenNode::new(SyntaxKind::BaseList, children)
    }

    /// Parses any `where T : ...` clauses onto `out`.
    pub(crate) fn parse_constraint_clauses(&mut self, out: &mut Vec<GreenElement>) {
        while self.at_contextual("where") {
            let mut children = vec![self.bump_remap(SyntaxKind::WhereKeyword)];
            children.push(identifier_name(self.expect_ident()).into());
            children.push(self.expect(SyntaxKind::Colon));
            loop {
                children.push(self.parse_constraint().into());
                if !self.eat_into(SyntaxKind::Comma, &mut children) {
                    break;
                }
            }
            out.push(GreenNode::new(SyntaxKind::TypeParameterConstraintClause, children).into());
        }
    }

    fn parse_constraint(&mut self) -> GreenNode {
        match self.current() {
            SyntaxKind::ClassKeyword | SyntaxKind::StructKeyword => {
                let mut children = vec![self.bump()];
                self.eat_into(SyntaxKind::Question, &mut children);
                GreenNode::new(SyntaxKind::ClassOrStructConstraint, children)
            }
            SyntaxKind::NewKeyword => {
                let children = vec![
                    self.bump(),
                    self.expect(SyntaxKind::OpenParen),
                    self.expect(SyntaxKind::CloseParen),
                ];
                GreenNode::new(SyntaxKind::ConstructorConstraint, children)
            }
            _ => {
                let ty = self.parse_type(TypeMode::Normal);
                GreenNode::new(SyntaxKind::TypeConstraint, vec![ty.into()])
            }
        }
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Parses a member of a class, struct or interface. Returns `None`
    /// without consuming anything when no member starts here.
    pub(crate) fn parse_member(&mut self) -> Option<GreenNode> {
        if !self.enter() {
            self.leave();
            return None;
        }
        let member = self.parse_member_inner();
        self.leave();
        member
    }

    fn parse_member_inner(&mut self) -> Option<GreenNode> {
        let mut children = Vec::new();
        self.parse_attribute_lists(&mut children);
        self.parse_modifiers(&mut children);

        if let Some(decl) = self.parse_type_declaration_after_modifiers(&mut children) {
            return Some(decl);
        }
        match self.current() {
            SyntaxKind::Tilde => return Some(self.parse_destructor(children)),
            SyntaxKind::EventKeyword => return Some(self.parse_event(children)),
            SyntaxKind::ImplicitKeyword | SyntaxKind::ExplicitKeyword => {
                return Some(self.parse_conversion_operator(children))
            }
            SyntaxKind::Identifier if self.nth(1) == SyntaxKind::OpenParen => {
                return Some(self.parse_constructor(children))
            }
            SyntaxKind::Identifier | SyntaxKind::OpenParen => {}
            kind if kind.is_predefined_type() => {}
            _ => {
                if children.is_empty() {
                    return None;
                }
                self.expected("member declaration");
                return Some(GreenNode::new(SyntaxKind::SkippedTokens, children));
            }
        }

        children.push(self.parse_type(TypeMode::Normal).into());
        if self.at(SyntaxKind::OperatorKeyword) {
            return Some(self.parse_operator(children));
        }
        if self.at(SyntaxKind::ThisKeyword) {
            return Some(self.parse_indexer(children));
        }
        if let Some(explicit) = self.parse_explicit_interface_specifier() {
            children.push(explicit.into());
        }
        children.push(self.expect_ident());

        match self.current() {
            SyntaxKind::LessThan | SyntaxKind::OpenParen => Some(self.parse_method(children)),
            SyntaxKind::OpenBrace | SyntaxKind::EqualsGreaterThan => {
                Some(self.parse_property(children))
            }
            _ => Some(self.parse_field(children)),
        }
    }

    /// Parses `IFoo<T>.` before an explicitly implemented member name, when present.
    fn parse_explicit_interface_specifier(&mut self) -> Option<GreenNode> {
        let mut p = self.pos;
        let mut last_dot = None;
        while self.kind_at(p) == SyntaxKind::Identifier {
            p += 1;
            if self.kind_at(p) == SyntaxKind::LessThan {
                p = self.scan_type_argument_list(p)?;
            }
            if self.kind_at(p) == SyntaxKind::Dot && self.kind_at(p + 1) == SyntaxKind::Identifier {
                last_dot = Some(p);
                p += 1;
            } else {
                break;
            }
        }
        let last_dot = last_dot?;
        let mut name = self.parse_simple_name_in_type();
        while self.pos < last_dot {
            let dot = self.bump();
            let right = self.parse_simple_name_in_type();
            name = GreenNode::new(SyntaxKind::QualifiedName, vec![name.into(), dot, right.into()]);
        }
        let dot = self.expect(SyntaxKind::Dot);
        Some(GreenNode::new(
            SyntaxKind::ExplicitInterfaceSpecifier,
            vec![name.into(), dot],
        ))
    }

    fn parse_method(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        if self.at(SyntaxKind::LessThan) {
            children.push(self.parse_type_parameter_list().into());
        }
        children.push(self.parse_parameter_list().into());
        self.parse_constraint_clauses(&mut children);
        self.parse_function_body(&mut children);
        GreenNode::new(SyntaxKind::MethodDeclaration, children)
    }

    /// Parses a block body, an expression body with its `;`, or a bare `;`.
    pub(crate) fn parse_function_body(&mut self, out: &mut Vec<GreenElement>) {
        match self.current() {
            SyntaxKind::OpenBrace => out.push(self.parse_block().into()),
            SyntaxKind::EqualsGreaterThan => {
                out.push(self.parse_arrow_expression_clause().into());
                out.push(self.expect(SyntaxKind::Semicolon));
            }
            _ => out.push(self.expect(SyntaxKind::Semicolon)),
        }
    }

    /// Parses `=> expr`.
    pub(crate) fn parse_arrow_expression_clause(&mut self) -> GreenNode {
        let arrow = self.expect(SyntaxKind::EqualsGreaterThan);
        let expr = self.parse_expression();
        GreenNode::new(SyntaxKind::ArrowExpressionClause, vec![arrow, expr.into()])
    }

    fn parse_property(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        if self.at(SyntaxKind::EqualsGreaterThan) {
            children.push(self.parse_arrow_expression_clause().into());
            children.push(self.expect(SyntaxKind::Semicolon));
            return GreenNode::new(SyntaxKind::PropertyDeclaration, children);
        }
        children.push(self.parse_accessor_list().into());
        if self.at(SyntaxKind::Equals) {
            children.push(self.parse_equals_value_clause().into());
            children.push(self.expect(SyntaxKind::Semicolon));
        }
        GreenNode::new(SyntaxKind::PropertyDeclaration, children)
    }

    fn parse_indexer(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.bump());
        let mut params = vec![self.expect(SyntaxKind::OpenBracket)];
        self.parse_parameters(&mut params, SyntaxKind::CloseBracket, false);
        params.push(self.expect(SyntaxKind::CloseBracket));
        children.push(GreenNode::new(SyntaxKind::BracketedParameterList, params).into());
        if self.at(SyntaxKind::EqualsGreaterThan) {
            children.push(self.parse_arrow_expression_clause().into());
            children.push(self.expect(SyntaxKind::Semicolon));
        } else {
            children.push(self.parse_accessor_list().into());
        }
        GreenNode::new(SyntaxKind::IndexerDeclaration, children)
    }

    fn parse_accessor_list(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::OpenBrace)];
        while !self.at(SyntaxKind::CloseBrace) && !self.at_eof() {
            let before = self.pos;
            let mut accessor = Vec::new();
            self.parse_attribute_lists(&mut accessor);
            self.parse_modifiers(&mut accessor);
            let keyword = match self.text_at(self.pos) {
                "get" => Some(SyntaxKind::GetKeyword),
                "set" => Some(SyntaxKind::SetKeyword),
                "init" => Some(SyntaxKind::InitKeyword),
                "add" => Some(SyntaxKind::AddKeyword),
                "remove" => Some(SyntaxKind::RemoveKeyword),
                _ => None,
            };
            match keyword {
                Some(kind) if self.at(SyntaxKind::Identifier) => {
                    accessor.push(self.bump_remap(kind));
                    self.parse_function_body(&mut accessor);
                    children.push(GreenNode::new(SyntaxKind::AccessorDeclaration, accessor).into());
                }
                _ => {
                    self.expected("'get', 'set', 'init', 'add' or 'remove'");
                    if !accessor.is_empty() {
                        children.push(GreenNode::new(SyntaxKind::SkippedTokens, accessor).into());
                    }
                    if self.pos == before {
                        children.push(self.skip_token().into());
                    }
                }
            }
        }
        children.push(self.expect(SyntaxKind::CloseBrace));
        GreenNode::new(SyntaxKind::AccessorList, children)
    }

    fn parse_field(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        // children = attrs, modifiers, type, ident; the type and first
        // declarator name move into a VariableDeclaration.
        let ident = children.pop();
        let ty = children.pop();
        let mut declaration: Vec<GreenElement> = ty.into_iter().collect();
        let mut first = ident.into_iter().collect::<Vec<_>>();
        if self.at(SyntaxKind::Equals) {
            first.push(self.parse_equals_value_clause().into());
        }
        declaration.push(GreenNode::new(SyntaxKind::VariableDeclarator, first).into());
        while self.eat_into(SyntaxKind::Comma, &mut declaration) {
            declaration.push(self.parse_variable_declarator().into());
        }
        children.push(GreenNode::new(SyntaxKind::VariableDeclaration, declaration).into());
        children.push(self.expect(SyntaxKind::Semicolon));
        GreenNode::new(SyntaxKind::FieldDeclaration, children)
    }

    /// Parses `name` or `name = value`.
    pub(crate) fn parse_variable_declarator(&mut self) -> GreenNode {
        let mut children = vec![self.expect_ident()];
        if self.at(SyntaxKind::Equals) {
            children.push(self.parse_equals_value_clause().into());
        }
        GreenNode::new(SyntaxKind::VariableDeclarator, children)
    }

    /// Parses `type a = 1, b` without the terminating `;`.
    pub(crate) fn parse_variable_declaration(&mut self) -> GreenNode {
        let mut children = vec![self.parse_type(TypeMode::Normal).into()];
        loop {
            children.push(self.parse_variable_declarator().into());
            if !self.eat_into(SyntaxKind::Comma, &mut children) {
                break;
            }
        }
        GreenNode::new(SyntaxKind::VariableDeclaration, children)
    }

    /// Parses `= value`.
    pub(crate) fn parse_equals_value_clause(&mut self) -> GreenNode {
        let equals = self.expect(SyntaxKind::Equals);
        let value = if self.at(SyntaxKind::OpenBrace) {
            self.parse_initializer()
        } else {
            self.parse_expression()
        };
        GreenNode::new(SyntaxKind::EqualsValueClause, vec![equals, value.into()])
    }

    fn parse_event(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.bump());
        let ty = self.parse_type(TypeMode::Normal);
        let is_property_like = {
            let mut p = self.pos;
            while matches!(self.kind_at(p), SyntaxKind::Identifier | SyntaxKind::Dot) {
                p += 1;
            }
            self.kind_at(p) == SyntaxKind::OpenBrace
        };
        if is_property_like {
            children.push(ty.into());
            if let Some(explicit) = self.parse_explicit_interface_specifier() {
                children.push(explicit.into());
            }
            children.push(self.expect_ident());
            children.push(self.parse_accessor_list().into());
            return GreenNode::new(SyntaxKind::EventDeclaration, children);
        }
        let mut declaration = vec![ty.into()];
        loop {
            declaration.push(self.parse_variable_declarator().into());
            if !self.eat_into(SyntaxKind::Comma, &mut declaration) {
                break;
            }
        }
        children.push(GreenNode::new(SyntaxKind::VariableDeclaration, declaration).into());
        children.push(self.expect(SyntaxKind::Semicolon));
        GreenNode::new(SyntaxKind::EventFieldDeclaration, children)
    }

    fn parse_constructor(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.bump());
        children.push(self.parse_parameter_list().into());
        if self.at(SyntaxKind::Colon) {
            let mut init = vec![self.bump()];
            if self.at(SyntaxKind::BaseKeyword) || self.at(SyntaxKind::ThisKeyword) {
                init.push(self.bump());
            } else {
                self.expected("'base' or 'this'");
            }
            init.push(self.parse_argument_list().into());
            children.push(GreenNode::new(SyntaxKind::ConstructorInitializer, init).into());
        }
        self.parse_function_body(&mut children);
        GreenNode::new(SyntaxKind::ConstructorDeclaration, children)
    }

    fn parse_destructor(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.bump());
        children.push(self.expect_ident());
        children.push(self.parse_parameter_list().into());
        self.parse_function_body(&mut children);
        GreenNode::new(SyntaxKind::DestructorDeclaration, children)
    }

    fn parse_operator(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.bump());
        let op = self.current();
        if op == SyntaxKind::GreaterThan && self.nth(1) == SyntaxKind::GreaterThan && self.adjacent(self.pos) {
            children.push(self.bump());
            children.push(self.bump());
        } else if op.is_token()
            && !matches!(
                op,
                SyntaxKind::OpenParen | SyntaxKind::Identifier | SyntaxKind::EndOfFile
            )
        {
            children.push(self.bump());
        } else {
            self.expected("overloadable operator");
        }
        children.push(self.parse_parameter_list().into());
        self.parse_function_body(&mut children);
        GreenNode::new(SyntaxKind::OperatorDeclaration, children)
    }

    fn parse_conversion_operator(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.bump());
        children.push(self.expect(SyntaxKind::OperatorKeyword));
        children.push(self.parse_type(TypeMode::Normal).into());
        children.push(self.parse_parameter_list().into());
        self.parse_function_body(&mut children);
        GreenNode::new(SyntaxKind::ConversionOperatorDeclaration, children)
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Parses `(T a, ref U b = default)`.
    pub(crate) fn parse_parameter_list(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::OpenParen)];
        self.parse_parameters(&mut children, SyntaxKind::CloseParen, false);
        children.push(self.expect(SyntaxKind::CloseParen));
        GreenNode::new(SyntaxKind::ParameterList, children)
    }

    /// Parses a lambda parameter list, where types may be omitted.
    pub(crate) fn parse_lambda_parameter_list(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::OpenParen)];
        self.parse_parameters(&mut children, SyntaxKind::CloseParen, true);
        children.push(self.expect(SyntaxKind::CloseParen));
        GreenNode::new(SyntaxKind::ParameterList, children)
    }

    fn parse_parameters(
        &mut self,
        out: &mut Vec<GreenElement>,
        close: SyntaxKind,
        allow_untyped: bool,
    ) {
        if self.at(close) {
            return;
        }
        loop {
            let before = self.pos;
            out.push(self.parse_parameter(allow_untyped).into());
            if self.pos == before {
                out.push(self.skip_token().into());
            }
            if !self.eat_into(SyntaxKind::Comma, out) {
                break;
            }
        }
    }

    fn parse_parameter(&mut self, allow_untyped: bool) -> GreenNode {
        let mut children = Vec::new();
        self.parse_attribute_lists(&mut children);
        while matches!(
            self.current(),
            SyntaxKind::RefKeyword
                | SyntaxKind::OutKeyword
                | SyntaxKind::InKeyword
                | SyntaxKind::ParamsKeyword
                | SyntaxKind::ThisKeyword
                | SyntaxKind::ReadOnlyKeyword
        ) {
            children.push(self.bump());
        }
        let untyped = allow_untyped
            && self.at(SyntaxKind::Identifier)
            && matches!(self.nth(1), SyntaxKind::Comma | SyntaxKind::CloseParen);
        if !untyped {
            children.push(self.parse_type(TypeMode::Normal).into());
        }
        children.push(self.expect_ident());
        if self.at(SyntaxKind::Equals) {
            children.push(self.parse_equals_value_clause().into());
        }
        GreenNode::new(SyntaxKind::Parameter, children)
    }
}

#[cfg(test)]
mod tests {
    use crate::kind::SyntaxKind;
    use crate::parse_text;
    use crate::tree::NodeRef;
    use vssdk_diagnostics::DiagnosticSink;
    use vssdk_source::FileId;

    fn kinds_of(source: &str) -> Vec<SyntaxKind> {
        let sink = DiagnosticSink::new();
        let tree = parse_text(FileId::from_raw(0), source, &sink);
        assert!(!sink.has_errors(), "{:?}", sink.take_all());
        assert_eq!(tree.text(), source);
        tree.root().descendants().map(|n: NodeRef<'_>| n.kind()).collect()
    }

    #[test]
    fn class_with_members() {
        let kinds = kinds_of(
            "namespace N {\n\
             [Guid(\"x\")]\n\
             public sealed partial class Pkg : AsyncPackage, IDisposable {\n\
               private readonly IVsShell shell, other = null;\n\
               public int Count { get; private set; } = 3;\n\
               public string Name => \"n\";\n\
               protected override async Task InitializeAsync(CancellationToken ct, IProgress<int> p) { }\n\
               public Pkg() : base() { }\n\
               void IDisposable.Dispose() { }\n\
               public event EventHandler Changed;\n\
             }\n}\n",
        );
        for expected in [
            SyntaxKind::NamespaceDeclaration,
            SyntaxKind::AttributeList,
            SyntaxKind::ClassDeclaration,
            SyntaxKind::BaseList,
            SyntaxKind::FieldDeclaration,
            SyntaxKind::PropertyDeclaration,
            SyntaxKind::AccessorList,
            SyntaxKind::MethodDeclaration,
            SyntaxKind::ConstructorDeclaration,
            SyntaxKind::ConstructorInitializer,
            SyntaxKind::ExplicitInterfaceSpecifier,
            SyntaxKind::EventFieldDeclaration,
        ] {
            assert!(kinds.contains(&expected), "missing {expected:?}");
        }
        let fields = kinds
            .iter()
            .filter(|k| **k == SyntaxKind::VariableDeclarator)
            .count();
        assert_eq!(fields, 3);
    }

    #[test]
    fn async_modifier_is_retagged() {
        let sink = DiagnosticSink::new();
        let tree = parse_text(
            FileId::from_raw(0),
            "class C { async void M() { } int async; }",
            &sink,
        );
        assert!(!sink.has_errors());
        let method = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MethodDeclaration)
            .unwrap();
        assert!(method.token(SyntaxKind::AsyncKeyword).is_some());
        let field = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::VariableDeclarator)
            .unwrap();
        assert_eq!(field.text(), "async");
    }

    #[test]
    fn file_scoped_namespace_and_enum() {
        let kinds = kinds_of("namespace A.B;\nenum E { X = 1, Y, }\ndelegate void D(int a);\n");
        assert!(kinds.contains(&SyntaxKind::FileScopedNamespaceDeclaration));
        assert!(kinds.contains(&SyntaxKind::EnumDeclaration));
        assert!(kinds.contains(&SyntaxKind::DelegateDeclaration));
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == SyntaxKind::EnumMemberDeclaration)
                .count(),
            2
        );
    }

    #[test]
    fn generic_method_with_constraints() {
        let kinds = kinds_of(
            "interface I { T Get<T>(params object[] args) where T : class, new(); }",
        );
        assert!(kinds.contains(&SyntaxKind::TypeParameterList));
        assert!(kinds.contains(&SyntaxKind::TypeParameterConstraintClause));
        assert!(kinds.contains(&SyntaxKind::ConstructorConstraint));
        assert!(kinds.contains(&SyntaxKind::ArrayType));
    }

    #[test]
    fn recovers_from_garbage_member() {
        let sink = DiagnosticSink::new();
        let source = "class C { ) int x; }";
        let tree = parse_text(FileId::from_raw(0), source, &sink);
        assert!(sink.has_errors());
        assert_eq!(tree.text(), source);
        assert!(tree
            .root()
            .descendants()
            .any(|n| n.kind() == SyntaxKind::FieldDeclaration));
    }
}
