//! Expression parsing.
//!
//! Binary operators use precedence climbing. Each binary operator has a left
//! and right binding power: left-associative operators have `right = left +
//! 1`, `??` is right-associative with `right = left`. Assignment,
//! conditional, lambda and `throw` expressions are handled above the binary
//! loop because they bind loosest.
//!
//! | Power | Operators |
//! |-------|-----------|
//! | 2 | `??` |
//! | 4 | `\|\|` |
//! | 6 | `&&` |
//! | 8 | `\|` |
//! | 10 | `^` |
//! | 12 | `&` |
//! | 14 | `==` `!=` |
//! | 16 | `<` `>` `<=` `>=` `is` `as` |
//! | 18 | `<<` `>>` |
//! | 20 | `+` `-` |
//! | 22 | `*` `/` `%` |

use crate::green::{GreenElement, GreenNode, GreenToken};
use crate::kind::SyntaxKind;
use crate::parser::{identifier_name, CSharpParser, TypeMode};

/// Binding power of relational operators and `is` / `as`.
pub(crate) const BP_RELATIONAL: u8 = 16;
/// Binding power of shift operators. Constant patterns parse at this level.
pub(crate) const BP_SHIFT: u8 = 18;

impl CSharpParser<'_> {
    /// Parses a full expression, including assignments and lambdas.
    pub(crate) fn parse_expression(&mut self) -> GreenNode {
        if !self.enter() {
            self.leave();
            return missing_expression();
        }
        let expr = self.parse_expression_inner();
        self.leave();
        expr
    }

    fn parse_expression_inner(&mut self) -> GreenNode {
        if self.is_lambda_start() {
            return self.parse_lambda();
        }
        if self.at(SyntaxKind::ThrowKeyword) {
            let throw = self.bump();
            let expr = self.parse_expression();
            return GreenNode::new(SyntaxKind::ThrowExpression, vec![throw, expr.into()]);
        }
        let lhs = self.parse_conditional();
        let op_tokens = if self.current().is_assignment_operator() {
            1
        } else if self.at(SyntaxKind::GreaterThan)
            && self.nth(1) == SyntaxKind::GreaterThanEquals
            && self.adjacent(self.pos)
        {
            2
        } else {
            return lhs;
        };
        let mut children = vec![lhs.into()];
        for _ in 0..op_tokens {
            children.push(self.bump());
        }
        let rhs = if self.at(SyntaxKind::OpenBrace) {
            self.parse_initializer()
        } else {
            self.parse_expression()
        };
        children.push(rhs.into());
        GreenNode::new(SyntaxKind::AssignmentExpression, children)
    }

    fn parse_conditional(&mut self) -> GreenNode {
        let condition = self.parse_binary(0);
        if !self.at(SyntaxKind::Question) {
            return condition;
        }
        let question = self.bump();
        let when_true = self.parse_expression();
        let colon = self.expect(SyntaxKind::Colon);
        let when_false = self.parse_expression();
        GreenNode::new(
            SyntaxKind::ConditionalExpression,
            vec![
                condition.into(),
                question,
                when_true.into(),
                colon,
                when_false.into(),
            ],
        )
    }

    /// Returns `(left_bp, right_bp, token_count)` for the binary operator at
    /// the current position.
    fn binary_operator(&self) -> Option<(u8, u8, usize)> {
        let op = match self.current() {
            SyntaxKind::QuestionQuestion => (2, 2, 1),
            SyntaxKind::BarBar => (4, 5, 1),
            SyntaxKind::AmpersandAmpersand => (6, 7, 1),
            SyntaxKind::Bar => (8, 9, 1),
            SyntaxKind::Caret => (10, 11, 1),
            SyntaxKind::Ampersand => (12, 13, 1),
            SyntaxKind::EqualsEquals | SyntaxKind::ExclamationEquals => (14, 15, 1),
            SyntaxKind::GreaterThan
                if self.nth(1) == SyntaxKind::GreaterThan && self.adjacent(self.pos) =>
            {
                (BP_SHIFT, BP_SHIFT + 1, 2)
            }
            SyntaxKind::GreaterThan
                if self.nth(1) == SyntaxKind::GreaterThanEquals && self.adjacent(self.pos) =>
            {
                return None
            }
            SyntaxKind::LessThan
            | SyntaxKind::GreaterThan
            | SyntaxKind::LessThanEquals
            | SyntaxKind::GreaterThanEquals => (BP_RELATIONAL, BP_RELATIONAL + 1, 1),
            SyntaxKind::LessThanLessThan => (BP_SHIFT, BP_SHIFT + 1, 1),
            SyntaxKind::Plus | SyntaxKind::Minus => (20, 21, 1),
            SyntaxKind::Asterisk | SyntaxKind::Slash | SyntaxKind::Percent => (22, 23, 1),
            _ => return None,
        };
        Some(op)
    }

    /// Parses a binary expression whose operators bind at least as tightly
    /// as `min_bp`.
    pub(crate) fn parse_binary(&mut self, min_bp: u8) -> GreenNode {
        let mut lhs = self.parse_unary();
        loop {
            if self.at(SyntaxKind::SwitchKeyword) && self.nth(1) == SyntaxKind::OpenBrace {
                lhs = self.parse_switch_expression(lhs);
                continue;
            }
            if self.at(SyntaxKind::IsKeyword) {
                if BP_RELATIONAL < min_bp {
                    break;
                }
                let is = self.bump();
                let pattern = self.parse_pattern();
                lhs = GreenNode::new(
                    SyntaxKind::IsPatternExpression,
                    vec![lhs.into(), is, pattern.into()],
                );
                continue;
            }
            if self.at(SyntaxKind::AsKeyword) {
                if BP_RELATIONAL < min_bp {
                    break;
                }
                let as_kw = self.bump();
                let ty = self.parse_type(TypeMode::Expression);
                lhs = GreenNode::new(
                    SyntaxKind::BinaryExpression,
                    vec![lhs.into(), as_kw, ty.into()],
                );
                continue;
            }
            let Some((left_bp, right_bp, count)) = self.binary_operator() else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            let mut children = vec![lhs.into()];
            for _ in 0..count {
                children.push(self.bump());
            }
            let rhs = self.parse_binary(right_bp);
            children.push(rhs.into());
            lhs = GreenNode::new(SyntaxKind::BinaryExpression, children);
        }
        lhs
    }

    fn parse_unary(&mut self) -> GreenNode {
        if !self.enter() {
            self.leave();
            return missing_expression();
        }
        let expr = self.parse_unary_inner();
        self.leave();
        expr
    }

    fn parse_unary_inner(&mut self) -> GreenNode {
        match self.current() {
            SyntaxKind::Plus
            | SyntaxKind::Minus
            | SyntaxKind::Exclamation
            | SyntaxKind::Tilde
            | SyntaxKind::PlusPlus
            | SyntaxKind::MinusMinus
            | SyntaxKind::Ampersand
            | SyntaxKind::Asterisk
            | SyntaxKind::Caret => {
                let op = self.bump();
                let operand = self.parse_unary();
                GreenNode::new(SyntaxKind::PrefixUnaryExpression, vec![op, operand.into()])
            }
            SyntaxKind::Identifier if self.at_contextual("await") && self.is_await_expression() => {
                let await_kw = self.bump_remap(SyntaxKind::AwaitKeyword);
                let operand = self.parse_unary();
                GreenNode::new(SyntaxKind::AwaitExpression, vec![await_kw, operand.into()])
            }
            SyntaxKind::OpenParen if self.is_cast() => {
                let open = self.bump();
                let ty = self.parse_type(TypeMode::Expression);
                let close = self.expect(SyntaxKind::CloseParen);
                let operand = self.parse_unary();
                GreenNode::new(
                    SyntaxKind::CastExpression,
                    vec![open, ty.into(), close, operand.into()],
                )
            }
            _ => {
                let primary = self.parse_primary();
                self.parse_postfix(primary)
            }
        }
    }

    fn is_await_expression(&self) -> bool {
        let next = self.nth(1);
        next.is_predefined_type()
            || matches!(
                next,
                SyntaxKind::Identifier
                    | SyntaxKind::ThisKeyword
                    | SyntaxKind::BaseKeyword
                    | SyntaxKind::NewKeyword
                    | SyntaxKind::OpenParen
                    | SyntaxKind::NumericLiteral
                    | SyntaxKind::StringLiteral
                    | SyntaxKind::CharacterLiteral
                    | SyntaxKind::TypeOfKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::NullKeyword
                    | SyntaxKind::TrueKeyword
                    | SyntaxKind::FalseKeyword
            )
    }

    /// Decides whether `(` at the current position starts a cast.
    fn is_cast(&self) -> bool {
        let start = self.pos + 1;
        let Some(close) = self.scan_type(start, TypeMode::Expression) else {
            return false;
        };
        if self.kind_at(close) != SyntaxKind::CloseParen {
            return false;
        }
        let follower = self.kind_at(close + 1);
        let starts_operand = follower.is_predefined_type()
            || matches!(
                follower,
                SyntaxKind::Identifier
                    | SyntaxKind::NumericLiteral
                    | SyntaxKind::StringLiteral
                    | SyntaxKind::CharacterLiteral
                    | SyntaxKind::OpenParen
                    | SyntaxKind::ThisKeyword
                    | SyntaxKind::BaseKeyword
                    | SyntaxKind::NewKeyword
                    | SyntaxKind::TypeOfKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::NullKeyword
                    | SyntaxKind::TrueKeyword
                    | SyntaxKind::FalseKeyword
                    | SyntaxKind::CheckedKeyword
                    | SyntaxKind::UncheckedKeyword
                    | SyntaxKind::DelegateKeyword
                    | SyntaxKind::SizeOfKeyword
                    | SyntaxKind::Exclamation
                    | SyntaxKind::Tilde
            );
        if self.kind_at(start).is_predefined_type() {
            return starts_operand
                || matches!(
                    follower,
                    SyntaxKind::Minus
                        | SyntaxKind::Plus
                        | SyntaxKind::PlusPlus
                        | SyntaxKind::MinusMinus
                );
        }
        starts_operand
    }

    fn parse_primary(&mut self) -> GreenNode {
        let kind = self.current();
        match kind {
            SyntaxKind::NumericLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::CharacterLiteral
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword => {
                GreenNode::new(SyntaxKind::LiteralExpression, vec![self.bump()])
            }
            SyntaxKind::DefaultKeyword => {
                if self.nth(1) == SyntaxKind::OpenParen {
                    self.parse_keyword_type_operand(SyntaxKind::DefaultExpression)
                } else {
                    GreenNode::new(SyntaxKind::LiteralExpression, vec![self.bump()])
                }
            }
            SyntaxKind::TypeOfKeyword => self.parse_keyword_type_operand(SyntaxKind::TypeOfExpression),
            SyntaxKind::SizeOfKeyword => self.parse_keyword_type_operand(SyntaxKind::SizeOfExpression),
            SyntaxKind::ThisKeyword => GreenNode::new(SyntaxKind::ThisExpression, vec![self.bump()]),
            SyntaxKind::BaseKeyword => GreenNode::new(SyntaxKind::BaseExpression, vec![self.bump()]),
            SyntaxKind::CheckedKeyword | SyntaxKind::UncheckedKeyword => {
                let children = vec![
                    self.bump(),
                    self.expect(SyntaxKind::OpenParen),
                    self.parse_expression().into(),
                    self.expect(SyntaxKind::CloseParen),
                ];
                GreenNode::new(SyntaxKind::CheckedExpression, children)
            }
            SyntaxKind::OpenParen => self.parse_parenthesized_or_tuple(),
            SyntaxKind::NewKeyword => self.parse_creation(),
            SyntaxKind::DelegateKeyword => self.parse_anonymous_method(Vec::new()),
            SyntaxKind::ThrowKeyword => {
                let throw = self.bump();
                let expr = self.parse_expression();
                GreenNode::new(SyntaxKind::ThrowExpression, vec![throw, expr.into()])
            }
            SyntaxKind::Identifier
                if self.at_contextual("async") && self.nth(1) == SyntaxKind::DelegateKeyword =>
            {
                let prefix = vec![self.bump_remap(SyntaxKind::AsyncKeyword)];
                self.parse_anonymous_method(prefix)
            }
            SyntaxKind::Identifier if self.nth(1) == SyntaxKind::ColonColon => self.parse_name(),
            SyntaxKind::Identifier => self.parse_simple_name_in_expression(),
            _ if kind.is_predefined_type() => {
                GreenNode::new(SyntaxKind::PredefinedType, vec![self.bump()])
            }
            _ => {
                self.expected("expression");
                missing_expression()
            }
        }
    }

    /// Parses `keyword(Type)` for `typeof`, `sizeof` and `default`.
    fn parse_keyword_type_operand(&mut self, kind: SyntaxKind) -> GreenNode {
        let children = vec![
            self.bump(),
            self.expect(SyntaxKind::OpenParen),
            self.parse_type(TypeMode::Normal).into(),
            self.expect(SyntaxKind::CloseParen),
        ];
        GreenNode::new(kind, children)
    }

    /// Parses an identifier, treating a following `<` as type arguments
    /// only when the scan succeeds and the token after `>` can follow a
    /// generic name.
    pub(crate) fn parse_simple_name_in_expression(&mut self) -> GreenNode {
        if self.nth(1) == SyntaxKind::LessThan {
            if let Some(after) = self.scan_type_argument_list(self.pos + 1) {
                if self.can_follow_type_arguments(after) {
                    let ident = self.bump();
                    let args = self.parse_type_argument_list();
                    return GreenNode::new(SyntaxKind::GenericName, vec![ident, args.into()]);
                }
            }
        }
        identifier_name(self.expect_ident())
    }

    fn can_follow_type_arguments(&self, pos: usize) -> bool {
        matches!(
            self.kind_at(pos),
            SyntaxKind::OpenParen
                | SyntaxKind::CloseParen
                | SyntaxKind::CloseBracket
                | SyntaxKind::CloseBrace
                | SyntaxKind::Colon
                | SyntaxKind::Semicolon
                | SyntaxKind::Comma
                | SyntaxKind::Dot
                | SyntaxKind::Question
                | SyntaxKind::EqualsEquals
                | SyntaxKind::ExclamationEquals
                | SyntaxKind::Bar
                | SyntaxKind::Caret
                | SyntaxKind::AmpersandAmpersand
                | SyntaxKind::BarBar
                | SyntaxKind::Ampersand
                | SyntaxKind::OpenBracket
                | SyntaxKind::EndOfFile
        )
    }

    fn parse_parenthesized_or_tuple(&mut self) -> GreenNode {
        let open = self.bump();
        let first = self.parse_tuple_element_or_expression();
        if !self.at(SyntaxKind::Comma) {
            let close = self.expect(SyntaxKind::CloseParen);
            let expr: Vec<GreenElement> = if first.kind == SyntaxKind::Argument {
                first.children
            } else {
                vec![first.into()]
            };
            let mut children = vec![open];
            children.extend(expr);
            children.push(close);
            return GreenNode::new(SyntaxKind::ParenthesizedExpression, children);
        }
        let mut children = vec![open, as_argument(first).into()];
        while self.eat_into(SyntaxKind::Comma, &mut children) {
            let element = self.parse_tuple_element_or_expression();
            children.push(as_argument(element).into());
        }
        children.push(self.expect(SyntaxKind::CloseParen));
        GreenNode::new(SyntaxKind::TupleExpression, children)
    }

    /// Parses `name: expr` (as an `Argument`) or a plain expression.
    fn parse_tuple_element_or_expression(&mut self) -> GreenNode {
        if self.at(SyntaxKind::Identifier) && self.nth(1) == SyntaxKind::Colon {
            let name = identifier_name(self.bump());
            let colon = self.bump();
            let name_colon = GreenNode::new(SyntaxKind::NameColon, vec![name.into(), colon]);
            let expr = self.parse_expression();
            return GreenNode::new(SyntaxKind::Argument, vec![name_colon.into(), expr.into()]);
        }
        self.parse_expression()
    }

    fn parse_postfix(&mut self, mut expr: GreenNode) -> GreenNode {
        loop {
            match self.current() {
                SyntaxKind::Dot => {
                    let dot = self.bump();
                    let name = self.parse_member_name();
                    expr = GreenNode::new(
                        SyntaxKind::MemberAccessExpression,
                        vec![expr.into(), dot, name.into()],
                    );
                }
                SyntaxKind::Question
                    if self.adjacent(self.pos)
                        && matches!(self.nth(1), SyntaxKind::Dot | SyntaxKind::OpenBracket) =>
                {
                    let question = self.bump();
                    let binding = if self.at(SyntaxKind::Dot) {
                        let dot = self.bump();
                        let name = self.parse_member_name();
                        GreenNode::new(SyntaxKind::MemberBindingExpression, vec![dot, name.into()])
                    } else {
                        let args = self.parse_bracketed_argument_list();
                        GreenNode::new(SyntaxKind::ElementBindingExpression, vec![args.into()])
                    };
                    let when_not_null = self.parse_postfix(binding);
                    expr = GreenNode::new(
                        SyntaxKind::ConditionalAccessExpression,
                        vec![expr.into(), question, when_not_null.into()],
                    );
                }
                SyntaxKind::OpenParen => {
                    let args = self.parse_argument_list();
                    expr = GreenNode::new(
                        SyntaxKind::InvocationExpression,
                        vec![expr.into(), args.into()],
                    );
                }
                SyntaxKind::OpenBracket => {
                    let args = self.parse_bracketed_argument_list();
                    expr = GreenNode::new(
                        SyntaxKind::ElementAccessExpression,
                        vec![expr.into(), args.into()],
                    );
                }
                SyntaxKind::PlusPlus | SyntaxKind::MinusMinus => {
                    let op = self.bump();
                    expr = GreenNode::new(
                        SyntaxKind::PostfixUnaryExpression,
                        vec![expr.into(), op],
                    );
                }
                SyntaxKind::Exclamation if self.is_null_forgiving() => {
                    let op = self.bump();
                    expr = GreenNode::new(
                        SyntaxKind::PostfixUnaryExpression,
                        vec![expr.into(), op],
                    );
                }
                _ => return expr,
            }
        }
    }

    fn is_null_forgiving(&self) -> bool {
        matches!(
            self.nth(1),
            SyntaxKind::Dot
                | SyntaxKind::Semicolon
                | SyntaxKind::CloseParen
                | SyntaxKind::Comma
                | SyntaxKind::CloseBracket
                | SyntaxKind::CloseBrace
                | SyntaxKind::Question
                | SyntaxKind::OpenBracket
        )
    }

    /// Parses the simple name after `.` in a member access.
    fn parse_member_name(&mut self) -> GreenNode {
        if self.at(SyntaxKind::Identifier) {
            self.parse_simple_name_in_expression()
        } else {
            identifier_name(self.expect_ident())
        }
    }

    // ========================================================================
    // Arguments
    // ========================================================================

    /// Parses `(args)`.
    pub(crate) fn parse_argument_list(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::OpenParen)];
        self.parse_arguments(&mut children, SyntaxKind::CloseParen);
        children.push(self.expect(SyntaxKind::CloseParen));
        GreenNode::new(SyntaxKind::ArgumentList, children)
    }

    fn parse_bracketed_argument_list(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::OpenBracket)];
        self.parse_arguments(&mut children, SyntaxKind::CloseBracket);
        children.push(self.expect(SyntaxKind::CloseBracket));
        GreenNode::new(SyntaxKind::BracketedArgumentList, children)
    }

    fn parse_arguments(&mut self, out: &mut Vec<GreenElement>, close: SyntaxKind) {
        if self.at(close) {
            return;
        }
        loop {
            let before = self.pos;
            out.push(self.parse_argument().into());
            if self.pos == before {
                out.push(self.skip_token().into());
            }
            if !self.eat_into(SyntaxKind::Comma, out) {
                break;
            }
        }
    }

    fn parse_argument(&mut self) -> GreenNode {
        let mut children = Vec::new();
        if self.at(SyntaxKind::Identifier) && self.nth(1) == SyntaxKind::Colon {
            let name = identifier_name(self.bump());
            let colon = self.bump();
            children.push(GreenNode::new(SyntaxKind::NameColon, vec![name.into(), colon]).into());
        }
        let by_ref = matches!(
            self.current(),
            SyntaxKind::RefKeyword | SyntaxKind::OutKeyword | SyntaxKind::InKeyword
        );
        if by_ref {
            children.push(self.bump());
            if self.is_declaration_expression_start() {
                let ty = self.parse_type(TypeMode::Normal);
                let designation = GreenNode::new(
                    SyntaxKind::SingleVariableDesignation,
                    vec![self.bump()],
                );
                children.push(
                    GreenNode::new(
                        SyntaxKind::DeclarationExpression,
                        vec![ty.into(), designation.into()],
                    )
                    .into(),
                );
                return GreenNode::new(SyntaxKind::Argument, children);
            }
        }
        children.push(self.parse_expression().into());
        GreenNode::new(SyntaxKind::Argument, children)
    }

    fn is_declaration_expression_start(&self) -> bool {
        let Some(p) = self.scan_type(self.pos, TypeMode::Normal) else {
            return false;
        };
        self.kind_at(p) == SyntaxKind::Identifier
            && matches!(
                self.kind_at(p + 1),
                SyntaxKind::Comma | SyntaxKind::CloseParen
            )
    }

    // ========================================================================
    // Object and array creation
    // ========================================================================

    fn parse_creation(&mut self) -> GreenNode {
        let new = self.bump();
        match self.current() {
            SyntaxKind::OpenParen => {
                let mut children = vec![new, self.parse_argument_list().into()];
                if self.at(SyntaxKind::OpenBrace) {
                    children.push(self.parse_initializer().into());
                }
                GreenNode::new(SyntaxKind::ImplicitObjectCreationExpression, children)
            }
            SyntaxKind::OpenBracket => {
                let mut children = vec![new, self.bump()];
                while self.eat_into(SyntaxKind::Comma, &mut children) {}
                children.push(self.expect(SyntaxKind::CloseBracket));
                children.push(self.parse_initializer().into());
                GreenNode::new(SyntaxKind::ImplicitArrayCreationExpression, children)
            }
            SyntaxKind::OpenBrace => {
                let mut children = vec![new, self.bump()];
                while !self.at(SyntaxKind::CloseBrace) && !self.at_eof() {
                    let mut member = Vec::new();
                    if self.at(SyntaxKind::Identifier) && self.nth(1) == SyntaxKind::Equals {
                        let name = identifier_name(self.bump());
                        let equals = self.bump();
                        member.push(
                            GreenNode::new(SyntaxKind::NameEquals, vec![name.into(), equals])
                                .into(),
                        );
                    }
                    member.push(self.parse_expression().into());
                    children.push(
                        GreenNode::new(SyntaxKind::AnonymousObjectMemberDeclarator, member).into(),
                    );
                    if !self.eat_into(SyntaxKind::Comma, &mut children) {
                        break;
                    }
                }
                children.push(self.expect(SyntaxKind::CloseBrace));
                GreenNode::new(SyntaxKind::AnonymousObjectCreationExpression, children)
            }
            _ => {
                let core = self.parse_non_array_type();
                let ty = if self.at(SyntaxKind::Question) {
                    let q = self.bump();
                    GreenNode::new(SyntaxKind::NullableType, vec![core.into(), q])
                } else {
                    core
                };
                if self.at(SyntaxKind::OpenBracket) {
                    let array_type = self.parse_array_creation_type(ty);
                    let mut children = vec![new, array_type.into()];
                    if self.at(SyntaxKind::OpenBrace) {
                        children.push(self.parse_initializer().into());
                    }
                    return GreenNode::new(SyntaxKind::ArrayCreationExpression, children);
                }
                let mut children = vec![new, ty.into()];
                if self.at(SyntaxKind::OpenParen) {
                    children.push(self.parse_argument_list().into());
                }
                if self.at(SyntaxKind::OpenBrace) {
                    children.push(self.parse_initializer().into());
                }
                if children.len() == 2 {
                    self.expected("'(' or '{'");
                }
                GreenNode::new(SyntaxKind::ObjectCreationExpression, children)
            }
        }
    }

    /// Parses rank specifiers that may carry sizes, as in `new int[n][]`.
    fn parse_array_creation_type(&mut self, element: GreenNode) -> GreenNode {
        let mut children = vec![element.into()];
        while self.at(SyntaxKind::OpenBracket) {
            let mut rank = vec![self.bump()];
            while !self.at(SyntaxKind::CloseBracket) && !self.at_eof() {
                if !self.at(SyntaxKind::Comma) {
                    rank.push(self.parse_expression().into());
                }
                if !self.eat_into(SyntaxKind::Comma, &mut rank) {
                    break;
                }
            }
            rank.push(self.expect(SyntaxKind::CloseBracket));
            children.push(GreenNode::new(SyntaxKind::ArrayRankSpecifier, rank).into());
        }
        GreenNode::new(SyntaxKind::ArrayType, children)
    }

    /// Parses `{ a, b = c, { d, e } }`.
    pub(crate) fn parse_initializer(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::OpenBrace)];
        while !self.at(SyntaxKind::CloseBrace) && !self.at_eof() {
            let before = self.pos;
            let element = if self.at(SyntaxKind::OpenBrace) {
                self.parse_initializer()
            } else {
                self.parse_expression()
            };
            children.push(element.into());
            if self.pos == before {
                children.push(self.skip_token().into());
            }
            if !self.eat_into(SyntaxKind::Comma, &mut children) {
                break;
            }
        }
        children.push(self.expect(SyntaxKind::CloseBrace));
        GreenNode::new(SyntaxKind::InitializerExpression, children)
    }

    // ========================================================================
    // Lambdas and anonymous methods
    // ========================================================================

    fn is_lambda_start(&self) -> bool {
        let mut p = self.pos;
        if self.is_contextual_at(p, "async")
            && matches!(
                self.kind_at(p + 1),
                SyntaxKind::Identifier | SyntaxKind::OpenParen | SyntaxKind::StaticKeyword
            )
        {
            p += 1;
        }
        if self.kind_at(p) == SyntaxKind::StaticKeyword {
            p += 1;
        }
        match self.kind_at(p) {
            SyntaxKind::Identifier => self.kind_at(p + 1) == SyntaxKind::EqualsGreaterThan,
            SyntaxKind::OpenParen => self
                .matching_paren(p)
                .is_some_and(|close| self.kind_at(close + 1) == SyntaxKind::EqualsGreaterThan),
            _ => false,
        }
    }

    fn parse_lambda(&mut self) -> GreenNode {
        let mut children = Vec::new();
        if self.at_contextual("async") && self.nth(1) != SyntaxKind::EqualsGreaterThan {
            children.push(self.bump_remap(SyntaxKind::AsyncKeyword));
        }
        self.eat_into(SyntaxKind::StaticKeyword, &mut children);
        let kind = if self.at(SyntaxKind::Identifier) {
            let param = GreenNode::new(SyntaxKind::Parameter, vec![self.bump()]);
            children.push(param.into());
            SyntaxKind::SimpleLambdaExpression
        } else {
            children.push(self.parse_lambda_parameter_list().into());
            SyntaxKind::ParenthesizedLambdaExpression
        };
        children.push(self.expect(SyntaxKind::EqualsGreaterThan));
        let body = if self.at(SyntaxKind::OpenBrace) {
            self.parse_block()
        } else {
            self.parse_expression()
        };
        children.push(body.into());
        GreenNode::new(kind, children)
    }

    fn parse_anonymous_method(&mut self, mut children: Vec<GreenElement>) -> GreenNode {
        children.push(self.bump());
        if self.at(SyntaxKind::OpenParen) {
            children.push(self.parse_parameter_list().into());
        }
        children.push(self.parse_block().into());
        GreenNode::new(SyntaxKind::AnonymousMethodExpression, children)
    }

    // ========================================================================
    // Switch expressions
    // ========================================================================

    fn parse_switch_expression(&mut self, governing: GreenNode) -> GreenNode {
        let mut children = vec![governing.into(), self.bump(), self.bump()];
        while !self.at(SyntaxKind::CloseBrace) && !self.at_eof() {
            let before = self.pos;
            let mut arm = vec![self.parse_pattern().into()];
            if self.at_contextual("when") {
                arm.push(self.parse_when_clause().into());
            }
            arm.push(self.expect(SyntaxKind::EqualsGreaterThan));
            arm.push(self.parse_expression().into());
            children.push(GreenNode::new(SyntaxKind::SwitchExpressionArm, arm).into());
            if self.pos == before {
                children.push(self.skip_token().into());
            }
            if !self.eat_into(SyntaxKind::Comma, &mut children) {
                break;
            }
        }
        children.push(self.expect(SyntaxKind::CloseBrace));
        GreenNode::new(SyntaxKind::SwitchExpression, children)
    }
}

/// An `IdentifierName` holding a missing identifier, used where an
/// expression was required but absent.
pub(crate) fn missing_expression() -> GreenNode {
    identifier_name(GreenToken::missing(SyntaxKind::Identifier).into())
}

fn as_argument(node: GreenNode) -> GreenNode {
    if node.kind == SyntaxKind::Argument {
        node
    } else {
        GreenNode::new(SyntaxKind::Argument, vec![node.into()])
    }
}

#[cfg(test)]
mod tests {
    use crate::green::GreenNode;
    use crate::kind::SyntaxKind;
    use crate::make;

    fn expr(source: &str) -> GreenNode {
        make::parse_expression(source).unwrap_or_else(|e| panic!("{source}: {e}"))
    }

    fn child_kinds(node: &GreenNode) -> Vec<SyntaxKind> {
        node.children.iter().map(|c| c.kind()).collect()
    }

    #[test]
    fn precedence_and_associativity() {
        let e = expr("a + b * c");
        assert_eq!(e.kind, SyntaxKind::BinaryExpression);
        assert_eq!(
            child_kinds(&e),
            vec![
                SyntaxKind::IdentifierName,
                SyntaxKind::Plus,
                SyntaxKind::BinaryExpression
            ]
        );

        let e = expr("a ?? b ?? c");
        assert_eq!(
            child_kinds(&e),
            vec![
                SyntaxKind::IdentifierName,
                SyntaxKind::QuestionQuestion,
                SyntaxKind::BinaryExpression
            ]
        );

        let e = expr("x >> 2");
        assert_eq!(
            child_kinds(&e),
            vec![
                SyntaxKind::IdentifierName,
                SyntaxKind::GreaterThan,
                SyntaxKind::GreaterThan,
                SyntaxKind::LiteralExpression
            ]
        );
    }

    #[test]
    fn conditional_access_chain() {
        let e = expr("shell?.GetProperty(1).ToString()");
        assert_eq!(e.kind, SyntaxKind::ConditionalAccessExpression);
        let when_not_null = e.children[2].as_node().unwrap();
        assert_eq!(when_not_null.kind, SyntaxKind::InvocationExpression);
    }

    #[test]
    fn generic_invocation_versus_comparison() {
        let e = expr("GetService<IVsShell>()");
        assert_eq!(e.kind, SyntaxKind::InvocationExpression);
        assert_eq!(
            e.children[0].as_node().unwrap().kind,
            SyntaxKind::GenericName
        );
        let e = expr("a < b && c > d");
        assert_eq!(e.kind, SyntaxKind::BinaryExpression);
        assert_eq!(e.children[1].kind(), SyntaxKind::AmpersandAmpersand);
    }

    #[test]
    fn casts_and_parentheses() {
        assert_eq!(expr("(IVsShell)obj").kind, SyntaxKind::CastExpression);
        assert_eq!(expr("(int)-1").kind, SyntaxKind::CastExpression);
        assert_eq!(expr("(a) + b").kind, SyntaxKind::BinaryExpression);
        assert_eq!(
            expr("(IVsShell)await GetServiceAsync(typeof(SVsShell))").kind,
            SyntaxKind::CastExpression
        );
        assert_eq!(expr("(a, b)").kind, SyntaxKind::TupleExpression);
    }

    #[test]
    fn lambdas_and_await() {
        assert_eq!(expr("x => x + 1").kind, SyntaxKind::SimpleLambdaExpression);
        assert_eq!(
            expr("async () => await Task.Yield()").kind,
            SyntaxKind::ParenthesizedLambdaExpression
        );
        assert_eq!(
            expr("delegate { Run(); }").kind,
            SyntaxKind::AnonymousMethodExpression
        );
        let e = expr("await x.ConfigureAwait(false)");
        assert_eq!(e.kind, SyntaxKind::AwaitExpression);
        assert_eq!(e.children[0].kind(), SyntaxKind::AwaitKeyword);
    }

    #[test]
    fn is_and_as() {
        let e = expr("x is null && y");
        assert_eq!(e.kind, SyntaxKind::BinaryExpression);
        assert_eq!(
            e.children[0].as_node().unwrap().kind,
            SyntaxKind::IsPatternExpression
        );
        let e = expr("o as IVsShell");
        assert_eq!(
            child_kinds(&e),
            vec![
                SyntaxKind::IdentifierName,
                SyntaxKind::AsKeyword,
                SyntaxKind::IdentifierName
            ]
        );
    }

    #[test]
    fn creation_forms() {
        assert_eq!(
            expr("new List<int> { 1, 2 }").kind,
            SyntaxKind::ObjectCreationExpression
        );
        assert_eq!(expr("new int[3]").kind, SyntaxKind::ArrayCreationExpression);
        assert_eq!(
            expr("new[] { a }").kind,
            SyntaxKind::ImplicitArrayCreationExpression
        );
        assert_eq!(
            expr("new { A = 1 }").kind,
            SyntaxKind::AnonymousObjectCreationExpression
        );
        assert_eq!(expr("new()").kind, SyntaxKind::ImplicitObjectCreationExpression);
    }

    #[test]
    fn assignment_and_switch_expression() {
        let e = expr("x ??= y");
        assert_eq!(e.kind, SyntaxKind::AssignmentExpression);
        let e = expr("v switch { 1 => a, _ => b }");
        assert_eq!(e.kind, SyntaxKind::SwitchExpression);
    }

    #[test]
    fn out_var_argument() {
        let e = expr("TryGet(out var value)");
        let args = e.children[1].as_node().unwrap();
        let arg = args.children[1].as_node().unwrap();
        assert_eq!(
            child_kinds(arg),
            vec![SyntaxKind::OutKeyword, SyntaxKind::DeclarationExpression]
        );
    }
}
