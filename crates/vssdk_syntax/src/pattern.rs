//! Pattern parsing for `is`, `case` labels and switch expression arms.
//!
//! A bare name such as `x is Foo` parses as a [`SyntaxKind::ConstantPattern`]
//! wrapping an `IdentifierName`; whether it denotes a constant or a type is
//! decided during binding.

use crate::expr::BP_SHIFT;
use crate::green::{GreenElement, GreenNode};
use crate::kind::SyntaxKind;
use crate::parser::{CSharpParser, TypeMode};

impl CSharpParser<'_> {
    /// Parses a pattern, including `and`, `or` and `not` combinators.
    pub(crate) fn parse_pattern(&mut self) -> GreenNode {
        if !self.enter() {
            self.leave();
            return self.skip_token();
        }
        let pattern = self.parse_disjunctive_pattern();
        self.leave();
        pattern
    }

    fn parse_disjunctive_pattern(&mut self) -> GreenNode {
        let mut left = self.parse_conjunctive_pattern();
        while self.at_contextual("or") {
            let or = self.bump_remap(SyntaxKind::OrKeyword);
            let right = self.parse_conjunctive_pattern();
            left = GreenNode::new(SyntaxKind::BinaryPattern, vec![left.into(), or, right.into()]);
        }
        left
    }

    fn parse_conjunctive_pattern(&mut self) -> GreenNode {
        let mut left = self.parse_negated_pattern();
        while self.at_contextual("and") {
            let and = self.bump_remap(SyntaxKind::AndKeyword);
            let right = self.parse_negated_pattern();
            left = GreenNode::new(SyntaxKind::BinaryPattern, vec![left.into(), and, right.into()]);
        }
        left
    }

    fn parse_negated_pattern(&mut self) -> GreenNode {
        if self.at_contextual("not") && self.starts_pattern(self.pos + 1) {
            let not = self.bump_remap(SyntaxKind::NotKeyword);
            let operand = self.parse_negated_pattern();
            return GreenNode::new(SyntaxKind::UnaryPattern, vec![not, operand.into()]);
        }
        self.parse_primary_pattern()
    }

    fn starts_pattern(&self, pos: usize) -> bool {
        let kind = self.kind_at(pos);
        !matches!(
            kind,
            SyntaxKind::EndOfFile
                | SyntaxKind::CloseParen
                | SyntaxKind::CloseBrace
                | SyntaxKind::CloseBracket
                | SyntaxKind::Semicolon
                | SyntaxKind::Comma
                | SyntaxKind::Colon
                | SyntaxKind::EqualsGreaterThan
                | SyntaxKind::Equals
                | SyntaxKind::Dot
        )
    }

    fn is_designation_at(&self, pos: usize) -> bool {
        self.kind_at(pos) == SyntaxKind::Identifier
            && !matches!(self.text_at(pos), "and" | "or" | "when")
    }

    fn parse_primary_pattern(&mut self) -> GreenNode {
        match self.current() {
            SyntaxKind::OpenParen => {
                let open = self.bump();
                let inner = self.parse_pattern();
                let close = self.expect(SyntaxKind::CloseParen);
                GreenNode::new(
                    SyntaxKind::ParenthesizedPattern,
                    vec![open, inner.into(), close],
                )
            }
            SyntaxKind::OpenBrace => {
                let mut children = vec![self.parse_property_pattern_clause().into()];
                self.parse_optional_designation(&mut children);
                GreenNode::new(SyntaxKind::RecursivePattern, children)
            }
            SyntaxKind::LessThan
            | SyntaxKind::GreaterThan
            | SyntaxKind::LessThanEquals
            | SyntaxKind::GreaterThanEquals => {
                let op = self.bump();
                let value = self.parse_binary(BP_SHIFT);
                GreenNode::new(SyntaxKind::RelationalPattern, vec![op, value.into()])
            }
            SyntaxKind::Identifier if self.at_contextual("var") && self.is_designation_at(self.pos + 1) => {
                let var = self.bump_remap(SyntaxKind::VarKeyword);
                let designation =
                    GreenNode::new(SyntaxKind::SingleVariableDesignation, vec![self.bump()]);
                GreenNode::new(SyntaxKind::VarPattern, vec![var, designation.into()])
            }
            SyntaxKind::Identifier
                if self.at_contextual("_")
                    && !matches!(
                        self.nth(1),
                        SyntaxKind::Dot | SyntaxKind::OpenParen | SyntaxKind::OpenBracket
                    ) =>
            {
                GreenNode::new(SyntaxKind::DiscardPattern, vec![self.bump()])
            }
            kind if kind.is_predefined_type() && self.nth(1) != SyntaxKind::Dot => {
                self.parse_type_based_pattern()
            }
            SyntaxKind::Identifier => match self.scan_type(self.pos, TypeMode::Pattern) {
                Some(p) if self.is_designation_at(p) || self.kind_at(p) == SyntaxKind::OpenBrace => {
                    self.parse_type_based_pattern()
                }
                _ => self.parse_constant_pattern(),
            },
            _ => self.parse_constant_pattern(),
        }
    }

    fn parse_constant_pattern(&mut self) -> GreenNode {
        let value = self.parse_binary(BP_SHIFT);
        GreenNode::new(SyntaxKind::ConstantPattern, vec![value.into()])
    }

    /// Parses `T`, `T x` or `T { ... } x`.
    fn parse_type_based_pattern(&mut self) -> GreenNode {
        let ty = self.parse_type(TypeMode::Pattern);
        if self.at(SyntaxKind::OpenBrace) {
            let mut children = vec![ty.into(), self.parse_property_pattern_clause().into()];
            self.parse_optional_designation(&mut children);
            return GreenNode::new(SyntaxKind::RecursivePattern, children);
        }
        if self.is_designation_at(self.pos) {
            let designation =
                GreenNode::new(SyntaxKind::SingleVariableDesignation, vec![self.bump()]);
            return GreenNode::new(
                SyntaxKind::DeclarationPattern,
                vec![ty.into(), designation.into()],
            );
        }
        GreenNode::new(SyntaxKind::TypePattern, vec![ty.into()])
    }

    fn parse_optional_designation(&mut self, out: &mut Vec<GreenElement>) {
        if self.is_designation_at(self.pos) {
            out.push(GreenNode::new(SyntaxKind::SingleVariableDesignation, vec![self.bump()]).into());
        }
    }

    fn parse_property_pattern_clause(&mut self) -> GreenNode {
        let mut children = vec![self.expect(SyntaxKind::OpenBrace)];
        while !self.at(SyntaxKind::CloseBrace) && !self.at_eof() {
            let before = self.pos;
            let mut sub = Vec::new();
            if self.at(SyntaxKind::Identifier) && self.nth(1) == SyntaxKind::Colon {
                let name = crate::parser::identifier_name(self.bump());
                let colon = self.bump();
                sub.push(GreenNode::new(SyntaxKind::NameColon, vec![name.into(), colon]).into());
            }
            sub.push(self.parse_pattern().into());
            children.push(GreenNode::new(SyntaxKind::Subpattern, sub).into());
            if self.pos == before {
                children.push(self.skip_token().into());
            }
            if !self.eat_into(SyntaxKind::Comma, &mut children) {
                break;
            }
        }
        children.push(self.expect(SyntaxKind::CloseBrace));
        GreenNode::new(SyntaxKind::PropertyPatternClause, children)
    }
}

#[cfg(test)]
mod tests {
    use crate::green::GreenNode;
    use crate::kind::SyntaxKind;
    use crate::make;

    fn pattern_of(source: &str) -> GreenNode {
        let e = make::parse_expression(source).unwrap_or_else(|e| panic!("{source}: {e}"));
        assert_eq!(e.kind, SyntaxKind::IsPatternExpression);
        e.children[2].as_node().unwrap().clone()
    }

    #[test]
    fn null_patterns() {
        assert_eq!(pattern_of("x is null").kind, SyntaxKind::ConstantPattern);
        let not_null = pattern_of("x is not null");
        assert_eq!(not_null.kind, SyntaxKind::UnaryPattern);
        assert_eq!(not_null.children[0].kind(), SyntaxKind::NotKeyword);
    }

    #[test]
    fn type_patterns() {
        assert_eq!(pattern_of("o is IVsShell s").kind, SyntaxKind::DeclarationPattern);
        assert_eq!(pattern_of("o is IVsShell").kind, SyntaxKind::ConstantPattern);
        assert_eq!(pattern_of("o is string").kind, SyntaxKind::TypePattern);
        assert_eq!(pattern_of("o is var v").kind, SyntaxKind::VarPattern);
        assert_eq!(pattern_of("o is { Length: > 0 } s").kind, SyntaxKind::RecursivePattern);
        assert_eq!(pattern_of("o is Foo { }").kind, SyntaxKind::RecursivePattern);
    }

    #[test]
    fn combinators() {
        let p = pattern_of("c is >= 'a' and <= 'z' or '_'");
        assert_eq!(p.kind, SyntaxKind::BinaryPattern);
        assert_eq!(p.children[1].kind(), SyntaxKind::OrKeyword);
        let left = p.children[0].as_node().unwrap();
        assert_eq!(left.children[1].kind(), SyntaxKind::AndKeyword);
    }
}
