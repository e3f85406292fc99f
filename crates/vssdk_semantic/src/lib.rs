//! Declarations, name lookup and expression binding over C# syntax trees.
//!
//! A [`Compilation`] is built once from a set of [`vssdk_syntax::SyntaxTree`]s.
//! Construction runs two passes:
//!
//! 1. **Declare**: every namespace, type, member, parameter, type parameter
//!    and local gets a [`Symbol`] in an arena. Partial types merge.
//! 2. **Resolve**: base lists and member signatures are resolved to
//!    [`TypeRef`]s through the enclosing scopes and `using` directives.
//!
//! Expressions are bound lazily through a [`SemanticModel`], which answers
//! symbol and type queries for individual nodes without mutating the
//! compilation. Anything that cannot be resolved yields `None`, so rules
//! see partially broken programs as "no match" rather than as errors.

#![warn(missing_docs)]

/// Typed index arenas.
pub mod arena;
/// The compilation and its symbol queries.
pub mod compilation;
mod declare;
/// Namespace and type name lookup.
pub mod lookup;
/// Per-file binding.
pub mod model;
mod resolve;
/// Symbols and their kinds.
pub mod symbol;
/// Type references.
pub mod types;

pub use compilation::Compilation;
pub use lookup::NamespaceOrType;
pub use model::{Binding, SemanticModel};
pub use symbol::{DeclRef, MethodKind, Modifiers, Symbol, SymbolId, SymbolKind, TypeKind};
pub use types::{SpecialType, TypeRef};

#[cfg(test)]
mod tests {
    use super::*;
    use vssdk_diagnostics::DiagnosticSink;
    use vssdk_source::{FileId, SourceDb};
    use vssdk_syntax::{NodeRef, SyntaxKind, SyntaxTree};

    const SDK: &str = r#"
namespace System
{
    public class Object { }
    public class String { }
    public struct Boolean { }
    public struct Int32 { }
    public class Type { }
    public class Attribute { }
    public interface IServiceProvider { object GetService(Type serviceType); }
}
namespace System.Threading.Tasks
{
    public class Task { }
    public class Task<TResult> : Task { }
}
namespace Microsoft.VisualStudio.Shell
{
    using System;

    public abstract class Package : IServiceProvider
    {
        protected virtual void Initialize() { }
        public object GetService(Type serviceType) => null;
    }

    public abstract class AsyncPackage : Package { }

    public sealed class PackageRegistrationAttribute : Attribute
    {
        public bool AllowsBackgroundLoading { get; set; }
    }
}
"#;

    fn compile(source: &str) -> (Compilation, FileId) {
        let mut db = SourceDb::new();
        db.add_source("Sdk.cs", SDK.to_string());
        let file = db.add_source("Test.cs", source.to_string());
        let sink = DiagnosticSink::new();
        let compilation = Compilation::from_source_db(&db, &sink);
        assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
        (compilation, file)
    }

    fn find<'t>(tree: &'t SyntaxTree, kind: SyntaxKind, text: &str) -> NodeRef<'t> {
        tree.nodes()
            .find(|n| n.kind() == kind && n.text() == text)
            .unwrap_or_else(|| panic!("no {kind:?} `{text}`"))
    }

    fn type_named(c: &Compilation, name: &str) -> SymbolId {
        c.type_by_qualified_name(name)
            .unwrap_or_else(|| panic!("missing type {name}"))
    }

    #[test]
    fn base_chain_through_intermediate_class() {
        let (c, _) = compile(
            "using Microsoft.VisualStudio.Shell;\n\
             class Mid : AsyncPackage { }\n\
             class Test : Mid { }",
        );
        let test = type_named(&c, "Test");
        let mid = type_named(&c, "Mid");
        let package = type_named(&c, "Microsoft.VisualStudio.Shell.Package");
        assert_eq!(c.symbol(test).base.as_ref().and_then(TypeRef::definition), Some(mid));
        assert!(c.base_instance(&TypeRef::named(test), package).is_some());
        let provider = type_named(&c, "System.IServiceProvider");
        assert!(c.base_instance(&TypeRef::named(test), provider).is_some());
    }

    #[test]
    fn qualified_names_and_arity() {
        let (c, _) = compile("class Empty { }");
        let task = type_named(&c, "System.Threading.Tasks.Task");
        let generic = type_named(&c, "System.Threading.Tasks.Task`1");
        assert_ne!(task, generic);
        assert_eq!(c.qualified_name(generic), "System.Threading.Tasks.Task");
        assert_eq!(c.symbol(generic).arity(), 1);
        assert!(c.type_by_qualified_name("System.Threading.Tasks.Missing").is_none());
    }

    #[test]
    fn alias_directive_resolves_namespace() {
        let (c, _) = compile(
            "using Shell = Microsoft.VisualStudio.Shell;\n\
             class Test : Shell.AsyncPackage { }",
        );
        let test = type_named(&c, "Test");
        let async_package = type_named(&c, "Microsoft.VisualStudio.Shell.AsyncPackage");
        assert_eq!(
            c.symbol(test).base.as_ref().and_then(TypeRef::definition),
            Some(async_package)
        );
    }

    #[test]
    fn inherited_generic_member_is_substituted() {
        let (c, file) = compile(
            "class Base<T> { public T Value; }\n\
             class Derived : Base<string> { void M() { var v = Value; } }",
        );
        let model = c.semantic_model(file).unwrap();
        let value = find(model.tree(), SyntaxKind::IdentifierName, "Value");
        assert_eq!(
            model.type_of(value),
            Some(c.special_type(SpecialType::String))
        );
        let base = type_named(&c, "Base`1");
        let derived = type_named(&c, "Derived");
        let instance = c.base_instance(&TypeRef::named(derived), base).unwrap();
        assert_eq!(c.original_definition(&instance), Some(base));
    }

    #[test]
    fn service_lookup_binds_to_package_method() {
        let (c, file) = compile(
            "using System;\n\
             using Microsoft.VisualStudio.Shell;\n\
             interface IFoo { void Bar(); }\n\
             class Test : Package\n\
             {\n\
                 protected override void Initialize()\n\
                 {\n\
                     var svc = GetService(typeof(IFoo)) as IFoo;\n\
                     svc.Bar();\n\
                     svc?.Bar();\n\
                 }\n\
             }",
        );
        let model = c.semantic_model(file).unwrap();
        let tree = model.tree();
        let call = find(tree, SyntaxKind::InvocationExpression, "GetService(typeof(IFoo))");
        let method = model.symbol_info(call).unwrap();
        assert_eq!(
            c.qualified_name(method),
            "Microsoft.VisualStudio.Shell.Package.GetService"
        );

        let foo = type_named(&c, "IFoo");
        let svc = find(tree, SyntaxKind::IdentifierName, "svc");
        assert_eq!(model.type_of(svc), Some(TypeRef::named(foo)));
        assert_eq!(c.symbol(model.symbol_info(svc).unwrap()).kind, SymbolKind::Local);

        let access = find(tree, SyntaxKind::MemberAccessExpression, "svc.Bar");
        let bar = model.symbol_info(access).unwrap();
        assert_eq!(c.qualified_name(bar), "IFoo.Bar");
        let binding = find(tree, SyntaxKind::MemberBindingExpression, ".Bar");
        assert_eq!(model.symbol_info(binding), Some(bar));
    }

    #[test]
    fn await_unwraps_task_result() {
        let (c, file) = compile(
            "using System.Threading.Tasks;\n\
             class Worker\n\
             {\n\
                 async Task<int> ComputeAsync() => 1;\n\
                 async Task RunAsync() { var x = await ComputeAsync(); var y = x; }\n\
             }",
        );
        let model = c.semantic_model(file).unwrap();
        let x = find(model.tree(), SyntaxKind::IdentifierName, "x");
        assert_eq!(model.type_of(x), Some(c.special_type(SpecialType::Int)));
    }

    #[test]
    fn attribute_binds_with_suffix() {
        let (c, file) = compile(
            "using Microsoft.VisualStudio.Shell;\n\
             [PackageRegistration(AllowsBackgroundLoading = true)]\n\
             class Test : AsyncPackage { }",
        );
        let model = c.semantic_model(file).unwrap();
        let attribute = model
            .tree()
            .nodes()
            .find(|n| n.kind() == SyntaxKind::Attribute)
            .unwrap();
        let class = model.attribute_class(attribute).unwrap();
        assert_eq!(
            c.qualified_name(class),
            "Microsoft.VisualStudio.Shell.PackageRegistrationAttribute"
        );
    }

    #[test]
    fn lambda_parameters_shadow_members() {
        let (c, file) = compile(
            "class Test\n\
             {\n\
                 string name;\n\
                 void M() { System.Action<int> f = name => Use(name); }\n\
                 void Use(int value) { }\n\
             }",
        );
        let model = c.semantic_model(file).unwrap();
        let tree = model.tree();
        let usage = tree
            .nodes()
            .filter(|n| n.kind() == SyntaxKind::IdentifierName && n.text() == "name")
            .last()
            .unwrap();
        let symbol = model.symbol_info(usage).unwrap();
        assert_eq!(c.symbol(symbol).kind, SymbolKind::Parameter);
        let call = find(tree, SyntaxKind::InvocationExpression, "Use(name)");
        assert_eq!(c.name(model.symbol_info(call).unwrap()), "Use");
    }
}
