//! Token and node kinds of the C# syntax tree.
//!
//! A single [`SyntaxKind`] enum covers both tokens and nodes. Contextual
//! keywords (`async`, `await`, `partial`, `get`, ...) are lexed as
//! [`SyntaxKind::Identifier`] and re-tagged by the parser when they are used
//! in keyword position, so that `var async = 1;` stays an identifier.
//!
//! # Child layout
//!
//! Nodes keep every token they were parsed from, including missing ones
//! inserted by error recovery. The layouts below are relied on by the
//! accessors in [`crate::ast`]:
//!
//! | Node | Children |
//! |------|----------|
//! | `UsingDirective` | `using` `static`? `NameEquals`? name `;` |
//! | `NamespaceDeclaration` | `namespace` name `{` usings* members* `}` `;`? |
//! | `ClassDeclaration` | attribute lists* modifiers* `class` ident type-params? `BaseList`? constraints* `{` members* `}` `;`? |
//! | `MethodDeclaration` | attribute lists* modifiers* type explicit-iface? ident type-params? `ParameterList` constraints* body? `;`? |
//! | `MemberAccessExpression` | expr `.` simple-name |
//! | `ConditionalAccessExpression` | expr `?` when-not-null |
//! | `InvocationExpression` | expr `ArgumentList` |
//! | `CastExpression` | `(` type `)` expr |
//! | `BinaryExpression` | left operator-token+ right |
//! | `AssignmentExpression` | left operator-token+ right |
//! | `VariableDeclarator` | ident `EqualsValueClause`? |

use serde::{Deserialize, Serialize};

/// The kind of a token or node in a C# syntax tree.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum SyntaxKind {
    // === Special tokens ===
    /// End of input. Carries the trailing trivia of the file.
    EndOfFile,
    /// A character sequence the lexer could not classify.
    BadToken,

    // === Literals and names ===
    /// An identifier or contextual keyword in identifier position.
    Identifier,
    /// An integer or real literal.
    NumericLiteral,
    /// A regular, verbatim, interpolated or raw string literal.
    StringLiteral,
    /// A character literal.
    CharacterLiteral,

    // === Punctuation ===
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `::`
    ColonColon,
    /// `?`
    Question,
    /// `??`
    QuestionQuestion,
    /// `??=`
    QuestionQuestionEquals,

    // === Operators ===
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `&`
    Ampersand,
    /// `|`
    Bar,
    /// `^`
    Caret,
    /// `!`
    Exclamation,
    /// `~`
    Tilde,
    /// `=`
    Equals,
    /// `<`
    LessThan,
    /// `>`. Always a single character; `>>` is two adjacent tokens.
    GreaterThan,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `&&`
    AmpersandAmpersand,
    /// `||`
    BarBar,
    /// `==`
    EqualsEquals,
    /// `!=`
    ExclamationEquals,
    /// `<=`
    LessThanEquals,
    /// `>=`
    GreaterThanEquals,
    /// `<<`
    LessThanLessThan,
    /// `+=`
    PlusEquals,
    /// `-=`
    MinusEquals,
    /// `*=`
    AsteriskEquals,
    /// `/=`
    SlashEquals,
    /// `%=`
    PercentEquals,
    /// `&=`
    AmpersandEquals,
    /// `|=`
    BarEquals,
    /// `^=`
    CaretEquals,
    /// `<<=`
    LessThanLessThanEquals,
    /// `=>`
    EqualsGreaterThan,
    /// `->`
    MinusGreaterThan,

    // === Reserved keywords ===
    /// `abstract`
    AbstractKeyword,
    /// `as`
    AsKeyword,
    /// `base`
    BaseKeyword,
    /// `bool`
    BoolKeyword,
    /// `break`
    BreakKeyword,
    /// `byte`
    ByteKeyword,
    /// `case`
    CaseKeyword,
    /// `catch`
    CatchKeyword,
    /// `char`
    CharKeyword,
    /// `checked`
    CheckedKeyword,
    /// `class`
    ClassKeyword,
    /// `const`
    ConstKeyword,
    /// `continue`
    ContinueKeyword,
    /// `decimal`
    DecimalKeyword,
    /// `default`
    DefaultKeyword,
    /// `delegate`
    DelegateKeyword,
    /// `do`
    DoKeyword,
    /// `double`
    DoubleKeyword,
    /// `else`
    ElseKeyword,
    /// `enum`
    EnumKeyword,
    /// `event`
    EventKeyword,
    /// `explicit`
    ExplicitKeyword,
    /// `extern`
    ExternKeyword,
    /// `false`
    FalseKeyword,
    /// `finally`
    FinallyKeyword,
    /// `fixed`
    FixedKeyword,
    /// `float`
    FloatKeyword,
    /// `for`
    ForKeyword,
    /// `foreach`
    ForEachKeyword,
    /// `goto`
    GotoKeyword,
    /// `if`
    IfKeyword,
    /// `implicit`
    ImplicitKeyword,
    /// `in`
    InKeyword,
    /// `int`
    IntKeyword,
    /// `interface`
    InterfaceKeyword,
    /// `internal`
    InternalKeyword,
    /// `is`
    IsKeyword,
    /// `lock`
    LockKeyword,
    /// `long`
    LongKeyword,
    /// `namespace`
    NamespaceKeyword,
    /// `new`
    NewKeyword,
    /// `null`
    NullKeyword,
    /// `object`
    ObjectKeyword,
    /// `operator`
    OperatorKeyword,
    /// `out`
    OutKeyword,
    /// `override`
    OverrideKeyword,
    /// `params`
    ParamsKeyword,
    /// `private`
    PrivateKeyword,
    /// `protected`
    ProtectedKeyword,
    /// `public`
    PublicKeyword,
    /// `readonly`
    ReadOnlyKeyword,
    /// `ref`
    RefKeyword,
    /// `return`
    ReturnKeyword,
    /// `sbyte`
    SByteKeyword,
    /// `sealed`
    SealedKeyword,
    /// `short`
    ShortKeyword,
    /// `sizeof`
    SizeOfKeyword,
    /// `stackalloc`
    StackAllocKeyword,
    /// `static`
    StaticKeyword,
    /// `string`
    StringKeyword,
    /// `struct`
    StructKeyword,
    /// `switch`
    SwitchKeyword,
    /// `this`
    ThisKeyword,
    /// `throw`
    ThrowKeyword,
    /// `true`
    TrueKeyword,
    /// `try`
    TryKeyword,
    /// `typeof`
    TypeOfKeyword,
    /// `uint`
    UIntKeyword,
    /// `ulong`
    ULongKeyword,
    /// `unchecked`
    UncheckedKeyword,
    /// `unsafe`
    UnsafeKeyword,
    /// `ushort`
    UShortKeyword,
    /// `using`
    UsingKeyword,
    /// `virtual`
    VirtualKeyword,
    /// `void`
    VoidKeyword,
    /// `volatile`
    VolatileKeyword,
    /// `while`
    WhileKeyword,

    // === Contextual keywords (assigned by the parser) ===
    /// `async`
    AsyncKeyword,
    /// `await`
    AwaitKeyword,
    /// `partial`
    PartialKeyword,
    /// `get`
    GetKeyword,
    /// `set`
    SetKeyword,
    /// `init`
    InitKeyword,
    /// `add`
    AddKeyword,
    /// `remove`
    RemoveKeyword,
    /// `where`
    WhereKeyword,
    /// `yield`
    YieldKeyword,
    /// `when`
    WhenKeyword,
    /// `not`
    NotKeyword,
    /// `and`
    AndKeyword,
    /// `or`
    OrKeyword,
    /// `global`
    GlobalKeyword,
    /// `var` in a `var` pattern.
    VarKeyword,

    // === Compilation unit and directives ===
    /// The root of every tree.
    CompilationUnit,
    /// `using X;`, `using A = X;` or `using static X;`
    UsingDirective,
    /// `Name =` inside a using alias, named attribute argument or anonymous object member.
    NameEquals,
    /// `name:` inside a named argument or subpattern.
    NameColon,
    /// A block-bodied namespace.
    NamespaceDeclaration,
    /// `namespace X;`
    FileScopedNamespaceDeclaration,
    /// Tokens the parser could not place, kept for lossless printing.
    SkippedTokens,

    // === Type declarations ===
    /// `class`
    ClassDeclaration,
    /// `struct`
    StructDeclaration,
    /// `interface`
    InterfaceDeclaration,
    /// `enum`
    EnumDeclaration,
    /// `delegate R Name(...);`
    DelegateDeclaration,
    /// An enum member with optional value.
    EnumMemberDeclaration,
    /// `: A, B`
    BaseList,
    /// One entry of a base list.
    SimpleBaseType,
    /// `<T, U>` on a declaration.
    TypeParameterList,
    /// One type parameter, with optional variance.
    TypeParameter,
    /// `where T : ...`
    TypeParameterConstraintClause,
    /// `class` or `struct` constraint.
    ClassOrStructConstraint,
    /// `new()` constraint.
    ConstructorConstraint,
    /// Type constraint.
    TypeConstraint,

    // === Attributes ===
    /// `[...]`
    AttributeList,
    /// `assembly:` and similar.
    AttributeTargetSpecifier,
    /// One attribute.
    Attribute,
    /// `(...)` after an attribute name.
    AttributeArgumentList,
    /// One attribute argument.
    AttributeArgument,

    // === Members ===
    /// A field.
    FieldDeclaration,
    /// `event T Name;`
    EventFieldDeclaration,
    /// `event T Name { add; remove; }`
    EventDeclaration,
    /// Type plus declarators.
    VariableDeclaration,
    /// One declared variable.
    VariableDeclarator,
    /// `= value`
    EqualsValueClause,
    /// A property.
    PropertyDeclaration,
    /// An indexer.
    IndexerDeclaration,
    /// `{ get; set; }`
    AccessorList,
    /// One accessor.
    AccessorDeclaration,
    /// A method.
    MethodDeclaration,
    /// A constructor.
    ConstructorDeclaration,
    /// `: base(...)` or `: this(...)`
    ConstructorInitializer,
    /// A finalizer.
    DestructorDeclaration,
    /// A user-defined operator.
    OperatorDeclaration,
    /// A user-defined conversion.
    ConversionOperatorDeclaration,
    /// `IFoo.` before an explicitly implemented member name.
    ExplicitInterfaceSpecifier,
    /// `(...)` on a method-like declaration.
    ParameterList,
    /// `[...]` on an indexer.
    BracketedParameterList,
    /// One parameter.
    Parameter,
    /// `=> expr` body.
    ArrowExpressionClause,

    // === Types and names ===
    /// `int`, `string`, `void`, ...
    PredefinedType,
    /// A plain identifier.
    IdentifierName,
    /// `Name<T>`
    GenericName,
    /// `<T, U>` in a name.
    TypeArgumentList,
    /// `A.B`
    QualifiedName,
    /// `global::A`
    AliasQualifiedName,
    /// `T?`
    NullableType,
    /// `T[]`
    ArrayType,
    /// `[]`, `[,]` or `[n]`
    ArrayRankSpecifier,
    /// `T*`
    PointerType,
    /// `(int, string)`
    TupleType,
    /// One tuple type element.
    TupleElement,
    /// `<,>` placeholder in `typeof(Foo<,>)`.
    OmittedTypeArgument,

    // === Statements ===
    /// `{ ... }`
    Block,
    /// A local variable declaration.
    LocalDeclarationStatement,
    /// An expression followed by `;`.
    ExpressionStatement,
    /// `if`
    IfStatement,
    /// `else`
    ElseClause,
    /// `return`
    ReturnStatement,
    /// `throw`
    ThrowStatement,
    /// `while`
    WhileStatement,
    /// `do ... while`
    DoStatement,
    /// `for`
    ForStatement,
    /// `foreach`
    ForEachStatement,
    /// `using (...)`
    UsingStatement,
    /// `lock`
    LockStatement,
    /// `try`
    TryStatement,
    /// `catch`
    CatchClause,
    /// `(Type name)` in a catch clause.
    CatchDeclaration,
    /// `when (...)` in a catch clause.
    CatchFilterClause,
    /// `finally`
    FinallyClause,
    /// `break;`
    BreakStatement,
    /// `continue;`
    ContinueStatement,
    /// `;`
    EmptyStatement,
    /// `switch` statement.
    SwitchStatement,
    /// Labels plus statements of a switch.
    SwitchSection,
    /// `case expr:`
    CaseSwitchLabel,
    /// `case pattern when ...:`
    CasePatternSwitchLabel,
    /// `default:`
    DefaultSwitchLabel,
    /// `when expr` in a switch label or arm.
    WhenClause,
    /// A local function.
    LocalFunctionStatement,
    /// `yield return expr;`
    YieldReturnStatement,
    /// `yield break;`
    YieldBreakStatement,
    /// `checked { }` / `unchecked { }`
    CheckedStatement,

    // === Expressions ===
    /// Literal token wrapper.
    LiteralExpression,
    /// `this`
    ThisExpression,
    /// `base`
    BaseExpression,
    /// `(expr)`
    ParenthesizedExpression,
    /// `(a, b)`
    TupleExpression,
    /// `(T)expr`
    CastExpression,
    /// `expr.Name`
    MemberAccessExpression,
    /// `expr?.tail`
    ConditionalAccessExpression,
    /// `.Name` inside a conditional access.
    MemberBindingExpression,
    /// `[...]` inside a conditional access.
    ElementBindingExpression,
    /// `expr(args)`
    InvocationExpression,
    /// `(args)`
    ArgumentList,
    /// `[args]`
    BracketedArgumentList,
    /// One argument.
    Argument,
    /// `expr[args]`
    ElementAccessExpression,
    /// `new T(args) { ... }`
    ObjectCreationExpression,
    /// `new(args)`
    ImplicitObjectCreationExpression,
    /// `new T[n] { ... }`
    ArrayCreationExpression,
    /// `new[] { ... }`
    ImplicitArrayCreationExpression,
    /// `{ a, b }` after a creation.
    InitializerExpression,
    /// `new { A = 1 }`
    AnonymousObjectCreationExpression,
    /// One member of an anonymous object.
    AnonymousObjectMemberDeclarator,
    /// `a = b`, `a += b`, ...
    AssignmentExpression,
    /// `a + b`, `a as T`, ...
    BinaryExpression,
    /// `expr is pattern`
    IsPatternExpression,
    /// `a ? b : c`
    ConditionalExpression,
    /// `-a`, `!a`, `++a`, ...
    PrefixUnaryExpression,
    /// `a++`, `a--`, `a!`
    PostfixUnaryExpression,
    /// `await expr`
    AwaitExpression,
    /// `typeof(T)`
    TypeOfExpression,
    /// `sizeof(T)`
    SizeOfExpression,
    /// `default(T)`
    DefaultExpression,
    /// `checked(expr)` / `unchecked(expr)`
    CheckedExpression,
    /// `x => ...`
    SimpleLambdaExpression,
    /// `(x, y) => ...`
    ParenthesizedLambdaExpression,
    /// `delegate (...) { ... }`
    AnonymousMethodExpression,
    /// `throw expr` in expression position.
    ThrowExpression,
    /// `var x` in `out var x`.
    DeclarationExpression,
    /// `expr switch { ... }`
    SwitchExpression,
    /// One arm of a switch expression.
    SwitchExpressionArm,

    // === Patterns ===
    /// Constant pattern.
    ConstantPattern,
    /// `T x`
    DeclarationPattern,
    /// `T`
    TypePattern,
    /// `var x`
    VarPattern,
    /// `_`
    DiscardPattern,
    /// `T { ... } x`
    RecursivePattern,
    /// `{ A: p }`
    PropertyPatternClause,
    /// `A: p`
    Subpattern,
    /// `not p`
    UnaryPattern,
    /// `p and q`, `p or q`
    BinaryPattern,
    /// `(p)`
    ParenthesizedPattern,
    /// `> 3`
    RelationalPattern,
    /// Designated variable name of a pattern or declaration expression.
    SingleVariableDesignation,
}

impl SyntaxKind {
    /// Returns `true` for token kinds, `false` for node kinds.
    pub fn is_token(self) -> bool {
        self < SyntaxKind::CompilationUnit
    }

    /// Returns `true` for reserved keywords.
    pub fn is_reserved_keyword(self) -> bool {
        (SyntaxKind::AbstractKeyword..=SyntaxKind::WhileKeyword).contains(&self)
    }

    /// Returns `true` for contextual keywords assigned by the parser.
    pub fn is_contextual_keyword(self) -> bool {
        (SyntaxKind::AsyncKeyword..=SyntaxKind::VarKeyword).contains(&self)
    }

    /// Returns `true` for keywords naming a predefined type.
    pub fn is_predefined_type(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            BoolKeyword
                | ByteKeyword
                | SByteKeyword
                | CharKeyword
                | DecimalKeyword
                | DoubleKeyword
                | FloatKeyword
                | IntKeyword
                | UIntKeyword
                | LongKeyword
                | ULongKeyword
                | ShortKeyword
                | UShortKeyword
                | ObjectKeyword
                | StringKeyword
                | VoidKeyword
        )
    }

    /// Returns `true` for reserved keywords that are declaration modifiers.
    pub fn is_modifier_keyword(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            PublicKeyword
                | PrivateKeyword
                | ProtectedKeyword
                | InternalKeyword
                | StaticKeyword
                | AbstractKeyword
                | SealedKeyword
                | VirtualKeyword
                | OverrideKeyword
                | ReadOnlyKeyword
                | ConstKeyword
                | ExternKeyword
                | NewKeyword
                | UnsafeKeyword
                | VolatileKeyword
                | FixedKeyword
                | AsyncKeyword
                | PartialKeyword
        )
    }

    /// Returns `true` for simple and compound assignment operators.
    ///
    /// `>>=` is represented as `>` followed by `>=` and is recognized by the
    /// parser separately.
    pub fn is_assignment_operator(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            Equals
                | PlusEquals
                | MinusEquals
                | AsteriskEquals
                | SlashEquals
                | PercentEquals
                | AmpersandEquals
                | BarEquals
                | CaretEquals
                | LessThanLessThanEquals
                | QuestionQuestionEquals
        )
    }

    /// Returns `true` for node kinds that are statements.
    pub fn is_statement(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            Block
                | LocalDeclarationStatement
                | ExpressionStatement
                | IfStatement
                | ReturnStatement
                | ThrowStatement
                | WhileStatement
                | DoStatement
                | ForStatement
                | ForEachStatement
                | UsingStatement
                | LockStatement
                | TryStatement
                | BreakStatement
                | ContinueStatement
                | EmptyStatement
                | SwitchStatement
                | LocalFunctionStatement
                | YieldReturnStatement
                | YieldBreakStatement
                | CheckedStatement
        )
    }

    /// Returns `true` for class, struct, interface, enum and delegate declarations.
    pub fn is_type_declaration(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            ClassDeclaration
                | StructDeclaration
                | InterfaceDeclaration
                | EnumDeclaration
                | DelegateDeclaration
        )
    }

    /// Returns `true` for nodes that own a body of executable code and a
    /// parameter scope.
    pub fn is_function_like(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            MethodDeclaration
                | ConstructorDeclaration
                | DestructorDeclaration
                | OperatorDeclaration
                | ConversionOperatorDeclaration
                | AccessorDeclaration
                | LocalFunctionStatement
                | SimpleLambdaExpression
                | ParenthesizedLambdaExpression
                | AnonymousMethodExpression
        )
    }

    /// Returns `true` for lambda and anonymous-method expressions.
    pub fn is_anonymous_function(self) -> bool {
        matches!(
            self,
            SyntaxKind::SimpleLambdaExpression
                | SyntaxKind::ParenthesizedLambdaExpression
                | SyntaxKind::AnonymousMethodExpression
        )
    }

    /// Returns `true` for pattern node kinds.
    pub fn is_pattern(self) -> bool {
        (SyntaxKind::ConstantPattern..=SyntaxKind::RelationalPattern).contains(&self)
            && !matches!(
                self,
                SyntaxKind::PropertyPatternClause | SyntaxKind::Subpattern
            )
    }

    /// Returns the fixed source text of a punctuation or keyword token.
    pub fn token_text(self) -> Option<&'static str> {
        use SyntaxKind::*;
        let text = match self {
            OpenBrace => "{",
            CloseBrace => "}",
            OpenParen => "(",
            CloseParen => ")",
            OpenBracket => "[",
            CloseBracket => "]",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            Colon => ":",
            ColonColon => "::",
            Question => "?",
            QuestionQuestion => "??",
            QuestionQuestionEquals => "??=",
            Plus => "+",
            Minus => "-",
            Asterisk => "*",
            Slash => "/",
            Percent => "%",
            Ampersand => "&",
            Bar => "|",
            Caret => "^",
            Exclamation => "!",
            Tilde => "~",
            Equals => "=",
            LessThan => "<",
            GreaterThan => ">",
            PlusPlus => "++",
            MinusMinus => "--",
            AmpersandAmpersand => "&&",
            BarBar => "||",
            EqualsEquals => "==",
            ExclamationEquals => "!=",
            LessThanEquals => "<=",
            GreaterThanEquals => ">=",
            LessThanLessThan => "<<",
            PlusEquals => "+=",
            MinusEquals => "-=",
            AsteriskEquals => "*=",
            SlashEquals => "/=",
            PercentEquals => "%=",
            AmpersandEquals => "&=",
            BarEquals => "|=",
            CaretEquals => "^=",
            LessThanLessThanEquals => "<<=",
            EqualsGreaterThan => "=>",
            MinusGreaterThan => "->",
            _ => return KEYWORDS
                .iter()
                .chain(CONTEXTUAL_KEYWORDS.iter())
                .find(|(_, kind)| *kind == self)
                .map(|(text, _)| *text),
        };
        Some(text)
    }
}

/// Reserved keywords and their kinds.
const KEYWORDS: &[(&str, SyntaxKind)] = &[
    ("abstract", SyntaxKind::AbstractKeyword),
    ("as", SyntaxKind::AsKeyword),
    ("base", SyntaxKind::BaseKeyword),
    ("bool", SyntaxKind::BoolKeyword),
    ("break", SyntaxKind::BreakKeyword),
    ("byte", SyntaxKind::ByteKeyword),
    ("case", SyntaxKind::CaseKeyword),
    ("catch", SyntaxKind::CatchKeyword),
    ("char", SyntaxKind::CharKeyword),
    ("checked", SyntaxKind::CheckedKeyword),
    ("class", SyntaxKind::ClassKeyword),
    ("const", SyntaxKind::ConstKeyword),
    ("continue", SyntaxKind::ContinueKeyword),
    ("decimal", SyntaxKind::DecimalKeyword),
    ("default", SyntaxKind::DefaultKeyword),
    ("delegate", SyntaxKind::DelegateKeyword),
    ("do", SyntaxKind::DoKeyword),
    ("double", SyntaxKind::DoubleKeyword),
    ("else", SyntaxKind::ElseKeyword),
    ("enum", SyntaxKind::EnumKeyword),
    ("event", SyntaxKind::EventKeyword),
    ("explicit", SyntaxKind::ExplicitKeyword),
    ("extern", SyntaxKind::ExternKeyword),
    ("false", SyntaxKind::FalseKeyword),
    ("finally", SyntaxKind::FinallyKeyword),
    ("fixed", SyntaxKind::FixedKeyword),
    ("float", SyntaxKind::FloatKeyword),
    ("for", SyntaxKind::ForKeyword),
    ("foreach", SyntaxKind::ForEachKeyword),
    ("goto", SyntaxKind::GotoKeyword),
    ("if", SyntaxKind::IfKeyword),
    ("implicit", SyntaxKind::ImplicitKeyword),
    ("in", SyntaxKind::InKeyword),
    ("int", SyntaxKind::IntKeyword),
    ("interface", SyntaxKind::InterfaceKeyword),
    ("internal", SyntaxKind::InternalKeyword),
    ("is", SyntaxKind::IsKeyword),
    ("lock", SyntaxKind::LockKeyword),
    ("long", SyntaxKind::LongKeyword),
    ("namespace", SyntaxKind::NamespaceKeyword),
    ("new", SyntaxKind::NewKeyword),
    ("null", SyntaxKind::NullKeyword),
    ("object", SyntaxKind::ObjectKeyword),
    ("operator", SyntaxKind::OperatorKeyword),
    ("out", SyntaxKind::OutKeyword),
    ("override", SyntaxKind::OverrideKeyword),
    ("params", SyntaxKind::ParamsKeyword),
    ("private", SyntaxKind::PrivateKeyword),
    ("protected", SyntaxKind::ProtectedKeyword),
    ("public", SyntaxKind::PublicKeyword),
    ("readonly", SyntaxKind::ReadOnlyKeyword),
    ("ref", SyntaxKind::RefKeyword),
    ("return", SyntaxKind::ReturnKeyword),
    ("sbyte", SyntaxKind::SByteKeyword),
    ("sealed", SyntaxKind::SealedKeyword),
    ("short", SyntaxKind::ShortKeyword),
    ("sizeof", SyntaxKind::SizeOfKeyword),
    ("stackalloc", SyntaxKind::StackAllocKeyword),
    ("static", SyntaxKind::StaticKeyword),
    ("string", SyntaxKind::StringKeyword),
    ("struct", SyntaxKind::StructKeyword),
    ("switch", SyntaxKind::SwitchKeyword),
    ("this", SyntaxKind::ThisKeyword),
    ("throw", SyntaxKind::ThrowKeyword),
    ("true", SyntaxKind::TrueKeyword),
    ("try", SyntaxKind::TryKeyword),
    ("typeof", SyntaxKind::TypeOfKeyword),
    ("uint", SyntaxKind::UIntKeyword),
    ("ulong", SyntaxKind::ULongKeyword),
    ("unchecked", SyntaxKind::UncheckedKeyword),
    ("unsafe", SyntaxKind::UnsafeKeyword),
    ("ushort", SyntaxKind::UShortKeyword),
    ("using", SyntaxKind::UsingKeyword),
    ("virtual", SyntaxKind::VirtualKeyword),
    ("void", SyntaxKind::VoidKeyword),
    ("volatile", SyntaxKind::VolatileKeyword),
    ("while", SyntaxKind::WhileKeyword),
];

/// Contextual keywords and the kinds the parser re-tags them with.
const CONTEXTUAL_KEYWORDS: &[(&str, SyntaxKind)] = &[
    ("async", SyntaxKind::AsyncKeyword),
    ("await", SyntaxKind::AwaitKeyword),
    ("partial", SyntaxKind::PartialKeyword),
    ("get", SyntaxKind::GetKeyword),
    ("set", SyntaxKind::SetKeyword),
    ("init", SyntaxKind::InitKeyword),
    ("add", SyntaxKind::AddKeyword),
    ("remove", SyntaxKind::RemoveKeyword),
    ("where", SyntaxKind::WhereKeyword),
    ("yield", SyntaxKind::YieldKeyword),
    ("when", SyntaxKind::WhenKeyword),
    ("not", SyntaxKind::NotKeyword),
    ("and", SyntaxKind::AndKeyword),
    ("or", SyntaxKind::OrKeyword),
    ("global", SyntaxKind::GlobalKeyword),
    ("var", SyntaxKind::VarKeyword),
];

/// Looks up a reserved keyword by its text.
pub fn lookup_keyword(text: &str) -> Option<SyntaxKind> {
    KEYWORDS
        .iter()
        .find(|(kw, _)| *kw == text)
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(lookup_keyword("class"), Some(SyntaxKind::ClassKeyword));
        assert_eq!(lookup_keyword("foreach"), Some(SyntaxKind::ForEachKeyword));
        assert_eq!(lookup_keyword("async"), None);
        assert_eq!(lookup_keyword("Class"), None);
    }

    #[test]
    fn token_and_node_partition() {
        assert!(SyntaxKind::Semicolon.is_token());
        assert!(SyntaxKind::VarKeyword.is_token());
        assert!(!SyntaxKind::CompilationUnit.is_token());
        assert!(!SyntaxKind::Block.is_token());
    }

    #[test]
    fn token_text_of_keywords_and_punctuation() {
        assert_eq!(SyntaxKind::AsyncKeyword.token_text(), Some("async"));
        assert_eq!(SyntaxKind::WhileKeyword.token_text(), Some("while"));
        assert_eq!(SyntaxKind::EqualsGreaterThan.token_text(), Some("=>"));
        assert_eq!(SyntaxKind::Identifier.token_text(), None);
    }

    #[test]
    fn classification_helpers() {
        assert!(SyntaxKind::VoidKeyword.is_predefined_type());
        assert!(SyntaxKind::PartialKeyword.is_modifier_keyword());
        assert!(SyntaxKind::QuestionQuestionEquals.is_assignment_operator());
        assert!(SyntaxKind::LocalFunctionStatement.is_statement());
        assert!(SyntaxKind::AccessorDeclaration.is_function_like());
        assert!(SyntaxKind::RecursivePattern.is_pattern());
        assert!(!SyntaxKind::SingleVariableDesignation.is_pattern());
        assert!(SyntaxKind::ThisKeyword.is_reserved_keyword());
        assert!(SyntaxKind::WhenKeyword.is_contextual_keyword());
    }
}
