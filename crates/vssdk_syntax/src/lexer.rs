//! Lexical analyzer for C# source text.
//!
//! Converts source text into [`LexedToken`]s that carry their trivia, so
//! that concatenating every token's leading trivia, text and trailing trivia
//! reproduces the input exactly. Trailing trivia runs up to and including
//! the first line break after a token; everything else (further blank lines,
//! comments on their own lines, `#` directives) is leading trivia of the
//! next token.
//!
//! Errors (unterminated literals and comments, stray characters) are
//! reported to the [`DiagnosticSink`] and never stop lexing.

use crate::green::GreenToken;
use crate::kind::{lookup_keyword, SyntaxKind};
use vssdk_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use vssdk_source::{FileId, Span};

/// Code for lexical errors.
pub const LEX_ERROR: DiagnosticCode = DiagnosticCode::new(Category::Syntax, 1);

/// A token together with the byte offset of its text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexedToken {
    /// The token and its trivia.
    pub token: GreenToken,
    /// Byte offset where the token text starts.
    pub offset: u32,
}

impl LexedToken {
    /// The token kind.
    pub fn kind(&self) -> SyntaxKind {
        self.token.kind
    }
}

/// Lexes `source` into tokens. The result always ends with an
/// [`SyntaxKind::EndOfFile`] token.
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Vec<LexedToken> {
    let mut lexer = Lexer {
        src: source,
        bytes: source.as_bytes(),
        pos: 0,
        file,
        sink,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<LexedToken> {
        let mut tokens = Vec::new();
        loop {
            let leading_start = self.pos;
            self.scan_leading_trivia();
            let leading = self.src[leading_start..self.pos].to_string();
            let start = self.pos;
            if self.at_end() {
                tokens.push(LexedToken {
                    token: GreenToken::new(SyntaxKind::EndOfFile, "").with_leading(leading),
                    offset: start as u32,
                });
                break;
            }
            let kind = self.scan_token();
            let text = &self.src[start..self.pos];
            let kind = if kind == SyntaxKind::Identifier {
                lookup_keyword(text).unwrap_or(kind)
            } else {
                kind
            };
            let trailing_start = self.pos;
            self.scan_trailing_trivia();
            tokens.push(LexedToken {
                token: GreenToken {
                    kind,
                    text: text.to_string(),
                    leading,
                    trailing: self.src[trailing_start..self.pos].to_string(),
                },
                offset: start as u32,
            });
        }
        tokens
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump_char(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, msg: &str, start: usize) {
        let end = self.pos.max(start + 1).min(self.bytes.len());
        self.sink.emit(Diagnostic::error(
            LEX_ERROR,
            msg,
            Span::new(self.file, start as u32, end as u32),
        ));
    }

    fn skip_to_line_end(&mut self) {
        while !self.at_end() && self.peek() != b'\n' && self.peek() != b'\r' {
            self.bump_char();
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        loop {
            if self.at_end() {
                self.error("unterminated block comment", start);
                return;
            }
            if self.peek() == b'*' && self.peek_at(1) == b'/' {
                self.pos += 2;
                return;
            }
            self.bump_char();
        }
    }

    fn scan_leading_trivia(&mut self) {
        let mut line_start = self.pos == 0 || matches!(self.bytes[self.pos - 1], b'\n' | b'\r');
        loop {
            match self.peek() {
                _ if self.at_end() => return,
                b' ' | b'\t' | 0x0b | 0x0c => self.pos += 1,
                b'\r' | b'\n' => {
                    self.pos += 1;
                    line_start = true;
                }
                b'/' if self.peek_at(1) == b'/' => {
                    self.skip_to_line_end();
                    line_start = false;
                }
                b'/' if self.peek_at(1) == b'*' => {
                    self.skip_block_comment();
                    line_start = false;
                }
                b'#' if line_start => self.skip_to_line_end(),
                _ if self.src[self.pos..].starts_with('\u{feff}') => self.pos += 3,
                _ => return,
            }
        }
    }

    fn scan_trailing_trivia(&mut self) {
        loop {
            match self.peek() {
                _ if self.at_end() => return,
                b' ' | b'\t' | 0x0b | 0x0c => self.pos += 1,
                b'\r' => {
                    self.pos += 1;
                    if self.peek() == b'\n' {
                        self.pos += 1;
                    }
                    return;
                }
                b'\n' => {
                    self.pos += 1;
                    return;
                }
                b'/' if self.peek_at(1) == b'/' => self.skip_to_line_end(),
                b'/' if self.peek_at(1) == b'*' => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn scan_token(&mut self) -> SyntaxKind {
        use SyntaxKind::*;
        let start = self.pos;
        let c = self.peek();
        match c {
            b'@' if self.peek_at(1) == b'"' => {
                self.pos += 1;
                self.scan_verbatim_string(start)
            }
            b'@' if self.peek_at(1) == b'$' => self.scan_interpolated_string(start),
            b'@' => {
                self.pos += 1;
                if self.peek_char().is_some_and(is_ident_start) {
                    self.scan_identifier_rest();
                    return Identifier;
                }
                self.error("unexpected character '@'", start);
                BadToken
            }
            b'$' => self.scan_interpolated_string(start),
            b'"' => {
                if self.peek_at(1) == b'"' && self.peek_at(2) == b'"' {
                    self.scan_raw_string(start)
                } else {
                    self.scan_regular_string(start)
                }
            }
            b'\'' => self.scan_char_literal(start),
            b'0'..=b'9' => self.scan_number(),
            b'.' if self.peek_at(1).is_ascii_digit() => self.scan_number(),
            _ if self.peek_char().is_some_and(is_ident_start) => {
                self.bump_char();
                self.scan_identifier_rest();
                Identifier
            }
            _ => self.scan_punctuation(start),
        }
    }

    fn scan_identifier_rest(&mut self) {
        while self.peek_char().is_some_and(is_ident_part) {
            self.bump_char();
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        if self.peek() == b'0' && matches!(self.peek_at(1), b'x' | b'X') {
            self.pos += 2;
            while self.peek().is_ascii_hexdigit() || self.peek() == b'_' {
                self.pos += 1;
            }
        } else if self.peek() == b'0' && matches!(self.peek_at(1), b'b' | b'B') {
            self.pos += 2;
            while matches!(self.peek(), b'0' | b'1' | b'_') {
                self.pos += 1;
            }
        } else {
            self.scan_digits();
            if self.peek() == b'.' && self.peek_at(1).is_ascii_digit() {
                self.pos += 1;
                self.scan_digits();
            }
            if matches!(self.peek(), b'e' | b'E') {
                let sign = usize::from(matches!(self.peek_at(1), b'+' | b'-'));
                if self.peek_at(1 + sign).is_ascii_digit() {
                    self.pos += 1 + sign;
                    self.scan_digits();
                }
            }
        }
        while matches!(
            self.peek(),
            b'u' | b'U' | b'l' | b'L' | b'f' | b'F' | b'd' | b'D' | b'm' | b'M'
        ) {
            self.pos += 1;
        }
        SyntaxKind::NumericLiteral
    }

    fn scan_digits(&mut self) {
        while self.peek().is_ascii_digit() || self.peek() == b'_' {
            self.pos += 1;
        }
    }

    /// Scans `"..."` starting at the opening quote.
    fn scan_regular_string(&mut self, start: usize) -> SyntaxKind {
        self.pos += 1;
        loop {
            match self.peek() {
                _ if self.at_end() => {
                    self.error("unterminated string literal", start);
                    break;
                }
                b'\n' | b'\r' => {
                    self.error("newline in string literal", start);
                    break;
                }
                b'\\' => {
                    self.pos += 1;
                    self.bump_char();
                }
                b'"' => {
                    self.pos += 1;
                    break;
                }
                _ => self.bump_char(),
            }
        }
        SyntaxKind::StringLiteral
    }

    /// Scans `@"..."` starting at the opening quote.
    fn scan_verbatim_string(&mut self, start: usize) -> SyntaxKind {
        self.pos += 1;
        loop {
            if self.at_end() {
                self.error("unterminated verbatim string literal", start);
                break;
            }
            if self.peek() == b'"' {
                if self.peek_at(1) == b'"' {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                break;
            }
            self.bump_char();
        }
        SyntaxKind::StringLiteral
    }

    /// Scans `"""..."""` with any number (three or more) of delimiting quotes.
    fn scan_raw_string(&mut self, start: usize) -> SyntaxKind {
        let mut quotes = 0;
        while self.peek() == b'"' {
            quotes += 1;
            self.pos += 1;
        }
        loop {
            if self.at_end() {
                self.error("unterminated raw string literal", start);
                break;
            }
            if self.peek() == b'"' {
                let mut run = 0;
                while self.peek() == b'"' {
                    run += 1;
                    self.pos += 1;
                }
                if run >= quotes {
                    break;
                }
                continue;
            }
            self.bump_char();
        }
        SyntaxKind::StringLiteral
    }

    /// Scans `$"..."`, `$@"..."`, `@$"..."` and `$"""..."""`.
    fn scan_interpolated_string(&mut self, start: usize) -> SyntaxKind {
        let mut verbatim = false;
        while matches!(self.peek(), b'$' | b'@') {
            verbatim |= self.peek() == b'@';
            self.pos += 1;
        }
        if self.peek() != b'"' {
            self.error("expected string after '$'", start);
            return SyntaxKind::BadToken;
        }
        if self.peek_at(1) == b'"' && self.peek_at(2) == b'"' {
            return self.scan_raw_string(start);
        }
        self.pos += 1;
        loop {
            match self.peek() {
                _ if self.at_end() => {
                    self.error("unterminated interpolated string", start);
                    break;
                }
                b'\n' | b'\r' if !verbatim => {
                    self.error("newline in interpolated string", start);
                    break;
                }
                b'\\' if !verbatim => {
                    self.pos += 1;
                    self.bump_char();
                }
                b'"' if verbatim && self.peek_at(1) == b'"' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    break;
                }
                b'{' if self.peek_at(1) == b'{' => self.pos += 2,
                b'}' if self.peek_at(1) == b'}' => self.pos += 2,
                b'{' => self.scan_interpolation_hole(start),
                _ => self.bump_char(),
            }
        }
        SyntaxKind::StringLiteral
    }

    /// Skips an interpolation hole `{ ... }`, including nested strings.
    fn scan_interpolation_hole(&mut self, string_start: usize) {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                _ if self.at_end() => {
                    self.error("unterminated interpolation", string_start);
                    return;
                }
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    self.pos += 1;
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                b'"' => {
                    let inner = self.pos;
                    self.scan_regular_string(inner);
                }
                b'@' if self.peek_at(1) == b'"' => {
                    let inner = self.pos;
                    self.pos += 1;
                    self.scan_verbatim_string(inner);
                }
                b'$' => {
                    let inner = self.pos;
                    self.scan_interpolated_string(inner);
                }
                b'\'' => {
                    let inner = self.pos;
                    self.scan_char_literal(inner);
                }
                _ => self.bump_char(),
            }
        }
    }

    fn scan_char_literal(&mut self, start: usize) -> SyntaxKind {
        self.pos += 1;
        loop {
            match self.peek() {
                _ if self.at_end() => {
                    self.error("unterminated character literal", start);
                    break;
                }
                b'\n' | b'\r' => {
                    self.error("newline in character literal", start);
                    break;
                }
                b'\\' => {
                    self.pos += 1;
                    self.bump_char();
                }
                b'\'' => {
                    self.pos += 1;
                    break;
                }
                _ => self.bump_char(),
            }
        }
        SyntaxKind::CharacterLiteral
    }

    fn scan_punctuation(&mut self, start: usize) -> SyntaxKind {
        use SyntaxKind::*;
        let c = self.peek();
        let n1 = self.peek_at(1);
        let n2 = self.peek_at(2);
        let (kind, len) = match (c, n1, n2) {
            (b'{', _, _) => (OpenBrace, 1),
            (b'}', _, _) => (CloseBrace, 1),
            (b'(', _, _) => (OpenParen, 1),
            (b')', _, _) => (CloseParen, 1),
            (b'[', _, _) => (OpenBracket, 1),
            (b']', _, _) => (CloseBracket, 1),
            (b';', _, _) => (Semicolon, 1),
            (b',', _, _) => (Comma, 1),
            (b'.', _, _) => (Dot, 1),
            (b':', b':', _) => (ColonColon, 2),
            (b':', _, _) => (Colon, 1),
            (b'?', b'?', b'=') => (QuestionQuestionEquals, 3),
            (b'?', b'?', _) => (QuestionQuestion, 2),
            (b'?', _, _) => (Question, 1),
            (b'+', b'+', _) => (PlusPlus, 2),
            (b'+', b'=', _) => (PlusEquals, 2),
            (b'+', _, _) => (Plus, 1),
            (b'-', b'-', _) => (MinusMinus, 2),
            (b'-', b'=', _) => (MinusEquals, 2),
            (b'-', b'>', _) => (MinusGreaterThan, 2),
            (b'-', _, _) => (Minus, 1),
            (b'*', b'=', _) => (AsteriskEquals, 2),
            (b'*', _, _) => (Asterisk, 1),
            (b'/', b'=', _) => (SlashEquals, 2),
            (b'/', _, _) => (Slash, 1),
            (b'%', b'=', _) => (PercentEquals, 2),
            (b'%', _, _) => (Percent, 1),
            (b'&', b'&', _) => (AmpersandAmpersand, 2),
            (b'&', b'=', _) => (AmpersandEquals, 2),
            (b'&', _, _) => (Ampersand, 1),
            (b'|', b'|', _) => (BarBar, 2),
            (b'|', b'=', _) => (BarEquals, 2),
            (b'|', _, _) => (Bar, 1),
            (b'^', b'=', _) => (CaretEquals, 2),
            (b'^', _, _) => (Caret, 1),
            (b'!', b'=', _) => (ExclamationEquals, 2),
            (b'!', _, _) => (Exclamation, 1),
            (b'~', _, _) => (Tilde, 1),
            (b'=', b'=', _) => (EqualsEquals, 2),
            (b'=', b'>', _) => (EqualsGreaterThan, 2),
            (b'=', _, _) => (Equals, 1),
            (b'<', b'<', b'=') => (LessThanLessThanEquals, 3),
            (b'<', b'<', _) => (LessThanLessThan, 2),
            (b'<', b'=', _) => (LessThanEquals, 2),
            (b'<', _, _) => (LessThan, 1),
            (b'>', b'=', _) => (GreaterThanEquals, 2),
            (b'>', _, _) => (GreaterThan, 1),
            _ => {
                self.bump_char();
                self.error("unexpected character", start);
                return BadToken;
            }
        };
        self.pos += len;
        kind
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_part(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_str(source: &str) -> (Vec<LexedToken>, Vec<Diagnostic>) {
        let sink = DiagnosticSink::new();
        let tokens = lex(source, FileId::from_raw(0), &sink);
        (tokens, sink.take_all())
    }

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        let (tokens, diags) = lex_str(source);
        assert!(diags.is_empty(), "unexpected lex errors: {diags:?}");
        tokens.iter().map(|t| t.kind()).collect()
    }

    fn reprint(tokens: &[LexedToken]) -> String {
        tokens
            .iter()
            .map(|t| format!("{}{}{}", t.token.leading, t.token.text, t.token.trailing))
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("public class async Foo"),
            vec![PublicKeyword, ClassKeyword, Identifier, Identifier, EndOfFile]
        );
        assert_eq!(kinds("@class"), vec![Identifier, EndOfFile]);
    }

    #[test]
    fn trivia_partition() {
        let source = "a; // one\n\n  // two\n  b;\n";
        let (tokens, _) = lex_str(source);
        assert_eq!(tokens[1].token.text, ";");
        assert_eq!(tokens[1].token.trailing, " // one\n");
        assert_eq!(tokens[2].token.text, "b");
        assert_eq!(tokens[2].token.leading, "\n  // two\n  ");
        assert_eq!(tokens[2].offset, 22);
        assert_eq!(reprint(&tokens), source);
    }

    #[test]
    fn directives_are_trivia() {
        let source = "#region Setup\nusing System;\n#endregion\n";
        let (tokens, diags) = lex_str(source);
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind(), SyntaxKind::UsingKeyword);
        assert_eq!(tokens[0].token.leading, "#region Setup\n");
        assert_eq!(tokens.last().unwrap().token.leading, "#endregion\n");
        assert_eq!(reprint(&tokens), source);
    }

    #[test]
    fn greater_than_is_never_combined() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("List<List<int>> x >>= 1"),
            vec![
                Identifier,
                LessThan,
                Identifier,
                LessThan,
                IntKeyword,
                GreaterThan,
                GreaterThan,
                Identifier,
                GreaterThan,
                GreaterThanEquals,
                NumericLiteral,
                EndOfFile
            ]
        );
    }

    #[test]
    fn question_dot_is_two_tokens() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("a?.b ?? c ??= d"),
            vec![
                Identifier,
                Question,
                Dot,
                Identifier,
                QuestionQuestion,
                Identifier,
                QuestionQuestionEquals,
                Identifier,
                EndOfFile
            ]
        );
    }

    #[test]
    fn string_forms() {
        use SyntaxKind::*;
        let source = r#""a\"b" @"c""d" $"x{y}z{{" $"{f("}")}" """raw "q" """ 'c' '\''"#;
        assert_eq!(
            kinds(source),
            vec![
                StringLiteral,
                StringLiteral,
                StringLiteral,
                StringLiteral,
                StringLiteral,
                CharacterLiteral,
                CharacterLiteral,
                EndOfFile
            ]
        );
    }

    #[test]
    fn numbers() {
        let (tokens, diags) = lex_str("0x2 1_000 3.5e-2f 10UL .5 1.ToString");
        assert!(diags.is_empty());
        let texts: Vec<&str> = tokens.iter().map(|t| t.token.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["0x2", "1_000", "3.5e-2f", "10UL", ".5", "1", ".", "ToString", ""]
        );
    }

    #[test]
    fn unterminated_string_reports_error() {
        let (tokens, diags) = lex_str("\"abc\nx");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, LEX_ERROR);
        assert_eq!(reprint(&tokens), "\"abc\nx");
    }

    #[test]
    fn unexpected_character_is_bad_token() {
        let (tokens, diags) = lex_str("a ` b");
        assert_eq!(tokens[1].kind(), SyntaxKind::BadToken);
        assert_eq!(diags.len(), 1);
    }
}
