//! Statements and blocks.

use crate::green::{GreenElement, GreenNode};
use crate::kind::SyntaxKind;
use crate::parser::{CSharpParser, TypeMode};

impl CSharpParser<'_> {
    /// Parses `{ statements }`.
    pub(crate) fn parse_block(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::OpenBrace)];
        while !self.at(SyntaxKind::CloseBrace) && !self.at_eof() {
            let before = self.pos;
            let stmt = self.parse_statement();
            if self.pos == before {
                self.expected("statement");
                children.push(self.skip_token().into());
            } else {
                children.push(stmt.into());
            }
        }
        children.push(self.expect(SyntaxKind::CloseBrace));
        GreenNode::new(SyntaxKind::Block, children)
    }

    /// Parses a single statement.
    pub(crate) fn parse_statement(&mut self) -> GreenNode {
        if !self.enter() {
            self.leave();
            return self.skip_token();
        }
        let stmt = self.parse_statement_inner();
        self.leave();
        stmt
    }

    fn parse_statement_inner(&mut self) -> GreenNode {
        match self.current() {
            SyntaxKind::OpenBrace => self.parse_block(),
            SyntaxKind::Semicolon => GreenNode::new(SyntaxKind::EmptyStatement, vec![self.bump()]),
            SyntaxKind::IfKeyword => self.parse_if(),
            SyntaxKind::WhileKeyword => {
                let mut children = vec![self.bump()];
                self.parse_parenthesized_condition(&mut children);
                children.push(self.parse_embedded_statement().into());
                GreenNode::new(SyntaxKind::WhileStatement, children)
            }
            SyntaxKind::DoKeyword => {
                let mut children = vec![self.bump()];
                children.push(self.parse_embedded_statement().into());
                children.push(self.expect(SyntaxKind::WhileKeyword));
                self.parse_parenthesized_condition(&mut children);
                children.push(self.expect(SyntaxKind::Semicolon));
                GreenNode::new(SyntaxKind::DoStatement, children)
            }
            SyntaxKind::LockKeyword => {
                let mut children = vec![self.bump()];
                self.parse_parenthesized_condition(&mut children);
                children.push(self.parse_embedded_statement().into());
                GreenNode::new(SyntaxKind::LockStatement, children)
            }
            SyntaxKind::ForKeyword => self.parse_for(),
            SyntaxKind::ForEachKeyword => self.parse_foreach(Vec::new()),
            SyntaxKind::ReturnKeyword => self.parse_keyword_with_optional_expression(SyntaxKind::ReturnStatement),
            SyntaxKind::ThrowKeyword => self.parse_keyword_with_optional_expression(SyntaxKind::ThrowStatement),
            SyntaxKind::BreakKeyword => {
                let children = vec![self.bump(), self.expect(SyntaxKind::Semicolon)];
                GreenNode::new(SyntaxKind::BreakStatement, children)
            }
            SyntaxKind::ContinueKeyword => {
                let children = vec![self.bump(), self.expect(SyntaxKind::Semicolon)];
                GreenNode::new(SyntaxKind::ContinueStatement, children)
            }
            SyntaxKind::TryKeyword => self.parse_try(),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::CheckedKeyword | SyntaxKind::UncheckedKeyword
                if self.nth(1) == SyntaxKind::OpenBrace =>
            {
                let children = vec![self.bump(), self.parse_block().into()];
                GreenNode::new(SyntaxKind::CheckedStatement, children)
            }
            SyntaxKind::UsingKeyword => self.parse_using(Vec::new()),
            SyntaxKind::ConstKeyword => {
                let mut children = vec![self.bump()];
                children.push(self.parse_variable_declaration().into());
                children.push(self.expect(SyntaxKind::Semicolon));
                GreenNode::new(SyntaxKind::LocalDeclarationStatement, children)
            }
            SyntaxKind::Identifier if self.at_contextual("yield") && self.is_yield_statement() => {
                self.parse_yield()
            }
            SyntaxKind::Identifier
                if self.at_contextual("await")
                    && matches!(
                        self.nth(1),
                        SyntaxKind::UsingKeyword | SyntaxKind::ForEachKeyword
                    ) =>
            {
                let prefix = vec![self.bump_remap(SyntaxKind::AwaitKeyword)];
                if self.at(SyntaxKind::UsingKeyword) {
                    self.parse_using(prefix)
                } else {
                    self.parse_foreach(prefix)
                }
            }
            _ => {
                if self.is_local_function_start() {
                    self.parse_local_function()
                } else if self.is_local_declaration_start(self.pos) {
                    let mut children = vec![self.parse_variable_declaration().into()];
                    children.push(self.expect(SyntaxKind::Semicolon));
                    GreenNode::new(SyntaxKind::LocalDeclarationStatement, children)
                } else {
                    self.parse_expression_statement()
                }
            }
        }
    }

    fn parse_expression_statement(&mut self) -> GreenNode {
        let expr = self.parse_expression();
        let semi = self.expect(SyntaxKind::Semicolon);
        GreenNode::new(SyntaxKind::ExpressionStatement, vec![expr.into(), semi])
    }

    /// Parses the statement under `if`, `while` and friends.
    fn parse_embedded_statement(&mut self) -> GreenNode {
        if self.at(SyntaxKind::CloseBrace) || self.at_eof() {
            self.expected("statement");
            return GreenNode::new(
                SyntaxKind::EmptyStatement,
                vec![crate::green::GreenToken::missing(SyntaxKind::Semicolon).into()],
            );
        }
        self.parse_statement()
    }

    fn parse_parenthesized_condition(&mut self, out: &mut Vec<GreenElement>) {
        out.push(self.expect(SyntaxKind::OpenParen));
        out.push(self.parse_expression().into());
        out.push(self.expect(SyntaxKind::CloseParen));
    }

    fn parse_if(&mut self) -> GreenNode {
        let mut children = vec![self.bump()];
        self.parse_parenthesized_condition(&mut children);
        children.push(self.parse_embedded_statement().into());
        if self.at(SyntaxKind::ElseKeyword) {
            let else_kw = self.bump();
            let stmt = self.parse_embedded_statement();
            children.push(GreenNode::new(SyntaxKind::ElseClause, vec![else_kw, stmt.into()]).into());
        }
        GreenNode::new(SyntaxKind::IfStatement, children)
    }

    fn parse_keyword_with_optional_expression(&mut self, kind: SyntaxKind) -> GreenNode {
        let mut children = vec![self.bump()];
        if !self.at(SyntaxKind::Semicolon) {
            children.push(self.parse_expression().into());
        }
        children.push(self.expect(SyntaxKind::Semicolon));
        GreenNode::new(kind, children)
    }

    fn is_yield_statement(&self) -> bool {
        matches!(
            self.nth(1),
            SyntaxKind::ReturnKeyword | SyntaxKind::BreakKeyword
        )
    }

    fn parse_yield(&mut self) -> GreenNode {
        let mut children = vec![self.bump_remap(SyntaxKind::YieldKeyword)];
        if self.at(SyntaxKind::BreakKeyword) {
            children.push(self.bump());
            children.push(self.expect(SyntaxKind::Semicolon));
            return GreenNode::new(SyntaxKind::YieldBreakStatement, children);
        }
        children.push(self.bump());
        children.push(self.parse_expression().into());
        children.push(self.expect(SyntaxKind::Semicolon));
        GreenNode::new(SyntaxKind::YieldReturnStatement, children)
    }

    fn parse_for(&mut self) -> GreenNode {
        let mut children = vec![self.bump(), self.expect(SyntaxKind::OpenParen)];
        if self.is_local_declaration_start(self.pos) {
            children.push(self.parse_variable_declaration().into());
        } else if !self.at(SyntaxKind::Semicolon) {
            self.parse_expression_list(&mut children);
        }
        children.push(self.expect(SyntaxKind::Semicolon));
        if !self.at(SyntaxKind::Semicolon) {
            children.push(self.parse_expression().into());
        }
        children.push(self.expect(SyntaxKind::Semicolon));
        if !self.at(SyntaxKind::CloseParen) {
            self.parse_expression_list(&mut children);
        }
        children.push(self.expect(SyntaxKind::CloseParen));
        children.push(self.parse_embedded_statement().into());
        GreenNode::new(SyntaxKind::ForStatement, children)
    }

    fn parse_expression_list(&mut self, out: &mut Vec<GreenElement>) {
        loop {
            out.push(self.parse_expression().into());
            if !self.eat_into(SyntaxKind::Comma, out) {
                break;
            }
        }
    }

    fn parse_foreach(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.expect(SyntaxKind::ForEachKeyword));
        children.push(self.expect(SyntaxKind::OpenParen));
        children.push(self.parse_type(TypeMode::Normal).into());
        children.push(self.expect_ident());
        children.push(self.expect(SyntaxKind::InKeyword));
        children.push(self.parse_expression().into());
        children.push(self.expect(SyntaxKind::CloseParen));
        children.push(self.parse_embedded_statement().into());
        GreenNode::new(SyntaxKind::ForEachStatement, children)
    }

    /// Parses `using (...) stmt` or a `using` local declaration, after an
    /// optional `await` already in `children`.
    fn parse_using(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.expect(SyntaxKind::UsingKeyword));
        if self.at(SyntaxKind::OpenParen) {
            children.push(self.bump());
            if self.is_local_declaration_start(self.pos) {
                children.push(self.parse_variable_declaration().into());
            } else {
                children.push(self.parse_expression().into());
            }
            children.push(self.expect(SyntaxKind::CloseParen));
            children.push(self.parse_embedded_statement().into());
            return GreenNode::new(SyntaxKind::UsingStatement, children);
        }
        children.push(self.parse_variable_declaration().into());
        children.push(self.expect(SyntaxKind::Semicolon));
        GreenNode::new(SyntaxKind::LocalDeclarationStatement, children)
    }

    fn parse_try(&mut self) -> GreenNode {
        let mut children = vec![self.bump(), self.parse_block().into()];
        while self.at(SyntaxKind::CatchKeyword) {
            let mut clause = vec![self.bump()];
            if self.at(SyntaxKind::OpenParen) {
                let mut decl = vec![self.bump(), self.parse_type(TypeMode::Normal).into()];
                self.eat_into(SyntaxKind::Identifier, &mut decl);
                decl.push(self.expect(SyntaxKind::CloseParen));
                clause.push(GreenNode::new(SyntaxKind::CatchDeclaration, decl).into());
            }
            if self.at_contextual("when") {
                let mut filter = vec![self.bump_remap(SyntaxKind::WhenKeyword)];
                self.parse_parenthesized_condition(&mut filter);
                clause.push(GreenNode::new(SyntaxKind::CatchFilterClause, filter).into());
            }
            clause.push(self.parse_block().into());
            children.push(GreenNode::new(SyntaxKind::CatchClause, clause).into());
        }
        if self.at(SyntaxKind::FinallyKeyword) {
            let finally = vec![self.bump(), self.parse_block().into()];
            children.push(GreenNode::new(SyntaxKind::FinallyClause, finally).into());
        }
        GreenNode::new(SyntaxKind::TryStatement, children)
    }

    fn parse_switch_statement(&mut self) -> GreenNode {
        let mut children = vec![self.bump()];
        self.parse_parenthesized_condition(&mut children);
        children.push(self.expect(SyntaxKind::OpenBrace));
        while !self.at(SyntaxKind::CloseBrace) && !self.at_eof() {
            let before = self.pos;
            let mut section = Vec::new();
            while self.is_switch_label_start() {
                section.push(self.parse_switch_label().into());
            }
            while !self.is_switch_label_start()
                && !self.at(SyntaxKind::CloseBrace)
                && !self.at_eof()
            {
                let stmt_start = self.pos;
                let stmt = self.parse_statement();
                if self.pos == stmt_start {
                    self.expected("statement");
                    section.push(self.skip_token().into());
                } else {
                    section.push(stmt.into());
                }
            }
            if self.pos == before {
                children.push(self.skip_token().into());
            } else {
                children.push(GreenNode::new(SyntaxKind::SwitchSection, section).into());
            }
        }
        children.push(self.expect(SyntaxKind::CloseBrace));
        GreenNode::new(SyntaxKind::SwitchStatement, children)
    }

    fn is_switch_label_start(&self) -> bool {
        self.at(SyntaxKind::CaseKeyword)
            || (self.at(SyntaxKind::DefaultKeyword) && self.nth(1) == SyntaxKind::Colon)
    }

    fn parse_switch_label(&mut self) -> GreenNode {
        if self.at(SyntaxKind::DefaultKeyword) {
            let children = vec![self.bump(), self.bump()];
            return GreenNode::new(SyntaxKind::DefaultSwitchLabel, children);
        }
        let case = self.bump();
        let pattern = self.parse_pattern();
        let when = self.at_contextual("when").then(|| self.parse_when_clause());
        let colon = self.expect(SyntaxKind::Colon);
        match when {
            None if pattern.kind == SyntaxKind::ConstantPattern => {
                let mut children = vec![case];
                children.extend(pattern.children);
                children.push(colon);
                GreenNode::new(SyntaxKind::CaseSwitchLabel, children)
            }
            _ => {
                let mut children = vec![case, pattern.into()];
                children.extend(when.map(GreenElement::from));
                children.push(colon);
                GreenNode::new(SyntaxKind::CasePatternSwitchLabel, children)
            }
        }
    }

    /// Parses `when expr`.
    pub(crate) fn parse_when_clause(&mut self) -> GreenNode {
        let when = self.bump_remap(SyntaxKind::WhenKeyword);
        let expr = self.parse_expression();
        GreenNode::new(SyntaxKind::WhenClause, vec![when, expr.into()])
    }

    // ========================================================================
    // Local declarations and functions
    // ========================================================================

    /// Returns `true` if a local variable declaration starts at `pos`.
    pub(crate) fn is_local_declaration_start(&self, pos: usize) -> bool {
        if self.is_contextual_at(pos, "await") {
            return false;
        }
        let Some(p) = self.scan_type(pos, TypeMode::Normal) else {
            return false;
        };
        self.kind_at(p) == SyntaxKind::Identifier
            && matches!(
                self.kind_at(p + 1),
                SyntaxKind::Equals
                    | SyntaxKind::Semicolon
                    | SyntaxKind::Comma
                    | SyntaxKind::CloseParen
                    | SyntaxKind::InKeyword
            )
    }

    fn local_function_modifier_count(&self) -> usize {
        let mut n = 0;
        loop {
            let kind = self.nth(n);
            let is_modifier = matches!(
                kind,
                SyntaxKind::StaticKeyword | SyntaxKind::UnsafeKeyword | SyntaxKind::ExternKeyword
            ) || self.is_contextual_at(self.pos + n, "async");
            if !is_modifier {
                return n;
            }
            n += 1;
        }
    }

    fn is_local_function_start(&self) -> bool {
        let start = self.pos + self.local_function_modifier_count();
        if self.is_contextual_at(start, "await") {
            return false;
        }
        let Some(p) = self.scan_type(start, TypeMode::Normal) else {
            return false;
        };
        self.kind_at(p) == SyntaxKind::Identifier
            && matches!(
                self.kind_at(p + 1),
                SyntaxKind::OpenParen | SyntaxKind::LessThan
            )
    }

    fn parse_local_function(&mut self) -> GreenNode {
        let mut children = Vec::new();
        for _ in 0..self.local_function_modifier_count() {
            if self.at(SyntaxKind::Identifier) {
                children.push(self.bump_remap(SyntaxKind::AsyncKeyword));
            } else {
                children.push(self.bump());
            }
        }
        children.push(self.parse_type(TypeMode::Normal).into());
        children.push(self.expect_ident());
        if self.at(SyntaxKind::LessThan) {
            children.push(self.parse_type_parameter_list().into());
        }
        children.push(self.parse_parameter_list().into());
        self.parse_constraint_clauses(&mut children);
        self.parse_function_body(&mut children);
        GreenNode::new(SyntaxKind::LocalFunctionStatement, children)
    }
}

#[cfg(test)]
mod tests {
    use crate::kind::SyntaxKind;
    use crate::make;

    fn statement_kind(source: &str) -> SyntaxKind {
        make::parse_statement(source)
            .unwrap_or_else(|e| panic!("{source}: {e}"))
            .kind
    }

    #[test]
    fn distinguishes_declarations_from_expressions() {
        assert_eq!(statement_kind("var x = 1;"), SyntaxKind::LocalDeclarationStatement);
        assert_eq!(
            statement_kind("List<int> xs = new List<int>();"),
            SyntaxKind::LocalDeclarationStatement
        );
        assert_eq!(statement_kind("IVsShell? s = null;"), SyntaxKind::LocalDeclarationStatement);
        assert_eq!(statement_kind("a = b;"), SyntaxKind::ExpressionStatement);
        assert_eq!(statement_kind("Foo(x);"), SyntaxKind::ExpressionStatement);
        assert_eq!(statement_kind("await Task.Yield();"), SyntaxKind::ExpressionStatement);
        assert_eq!(statement_kind("x.y.z = 3;"), SyntaxKind::ExpressionStatement);
    }

    #[test]
    fn local_functions() {
        assert_eq!(
            statement_kind("async Task RunAsync() { await Task.Delay(1); }"),
            SyntaxKind::LocalFunctionStatement
        );
        assert_eq!(
            statement_kind("static int Twice(int v) => v * 2;"),
            SyntaxKind::LocalFunctionStatement
        );
    }

    #[test]
    fn control_flow_statements() {
        assert_eq!(statement_kind("if (a) b(); else { c(); }"), SyntaxKind::IfStatement);
        assert_eq!(
            statement_kind("for (int i = 0; i < n; i++) { }"),
            SyntaxKind::ForStatement
        );
        assert_eq!(
            statement_kind("foreach (var item in items) Use(item);"),
            SyntaxKind::ForEachStatement
        );
        assert_eq!(
            statement_kind("using (var s = Open()) { }"),
            SyntaxKind::UsingStatement
        );
        assert_eq!(
            statement_kind("try { } catch (Exception ex) when (ex != null) { } finally { }"),
            SyntaxKind::TryStatement
        );
        assert_eq!(statement_kind("yield return 1;"), SyntaxKind::YieldReturnStatement);
        assert_eq!(statement_kind("lock (gate) { }"), SyntaxKind::LockStatement);
        assert_eq!(statement_kind("do x++; while (x < 3);"), SyntaxKind::DoStatement);
    }

    #[test]
    fn switch_labels() {
        let stmt = make::parse_statement(
            "switch (x) { case 1: case Foo f when f.Ok: break; default: return; }",
        )
        .unwrap();
        let text = stmt.text();
        assert!(text.starts_with("switch"));
        let section = stmt
            .child_nodes()
            .find(|n| n.kind == SyntaxKind::SwitchSection)
            .unwrap();
        let labels: Vec<SyntaxKind> = section.child_nodes().map(|n| n.kind).take(2).collect();
        assert_eq!(
            labels,
            vec![SyntaxKind::CaseSwitchLabel, SyntaxKind::CasePatternSwitchLabel]
        );
    }
}
