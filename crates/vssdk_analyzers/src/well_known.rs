//! Framework types and members the rules recognize.

use vssdk_semantic::{Compilation, SymbolId};

use crate::matcher::{matches_member, QualifiedMemberSpec, QualifiedTypeSpec};

/// Namespace paths, outermost segment first.
pub mod namespaces {
    /// `System`
    pub const SYSTEM: &[&str] = &["System"];
    /// `System.Threading`
    pub const SYSTEM_THREADING: &[&str] = &["System", "Threading"];
    /// `System.Threading.Tasks`
    pub const SYSTEM_THREADING_TASKS: &[&str] = &["System", "Threading", "Tasks"];
    /// `System.ComponentModel.Composition`
    pub const MEF: &[&str] = &["System", "ComponentModel", "Composition"];
    /// `Microsoft`
    pub const MICROSOFT: &[&str] = &["Microsoft"];
    /// `Microsoft.VisualStudio.Shell`
    pub const SHELL: &[&str] = &["Microsoft", "VisualStudio", "Shell"];
    /// `Microsoft.VisualStudio.Threading`
    pub const THREADING: &[&str] = &["Microsoft", "VisualStudio", "Threading"];
}

/// A framework type referenced by at least one rule or code fix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum WellKnownType {
    /// `System.IServiceProvider`
    IServiceProvider,
    /// `System.IProgress<T>`
    IProgress,
    /// `System.Threading.CancellationToken`
    CancellationToken,
    /// `System.Threading.Tasks.Task`
    Task,
    /// `System.ComponentModel.Composition.ExportAttribute`
    ExportAttribute,
    /// `Microsoft.Assumes`
    Assumes,
    /// `Microsoft.Requires`
    Requires,
    /// `Microsoft.VisualStudio.Shell.Package`
    Package,
    /// `Microsoft.VisualStudio.Shell.AsyncPackage`
    AsyncPackage,
    /// `Microsoft.VisualStudio.Shell.IAsyncServiceProvider`
    IAsyncServiceProvider,
    /// `Microsoft.VisualStudio.Shell.ServiceProvider`
    ServiceProvider,
    /// `Microsoft.VisualStudio.Shell.ServiceProgressData`
    ServiceProgressData,
    /// `Microsoft.VisualStudio.Shell.ThreadHelper`
    ThreadHelper,
    /// `Microsoft.VisualStudio.Shell.PackageRegistrationAttribute`
    PackageRegistrationAttribute,
    /// `Microsoft.VisualStudio.Shell.ProvideAutoLoadAttribute`
    ProvideAutoLoadAttribute,
    /// `Microsoft.VisualStudio.Shell.ProvideToolWindowAttribute`
    ProvideToolWindowAttribute,
    /// `Microsoft.VisualStudio.Shell.PackageAutoLoadFlags`
    PackageAutoLoadFlags,
    /// `Microsoft.VisualStudio.Threading.JoinableTask`
    JoinableTask,
    /// `Microsoft.VisualStudio.Threading.JoinableTaskContext`
    JoinableTaskContext,
    /// `Microsoft.VisualStudio.Threading.JoinableTaskFactory`
    JoinableTaskFactory,
}

impl WellKnownType {
    /// The containing namespace.
    pub const fn namespace(self) -> &'static [&'static str] {
        use WellKnownType::*;
        match self {
            IServiceProvider | IProgress => namespaces::SYSTEM,
            CancellationToken => namespaces::SYSTEM_THREADING,
            Task => namespaces::SYSTEM_THREADING_TASKS,
            ExportAttribute => namespaces::MEF,
            Assumes | Requires => namespaces::MICROSOFT,
            Package
            | AsyncPackage
            | IAsyncServiceProvider
            | ServiceProvider
            | ServiceProgressData
            | ThreadHelper
            | PackageRegistrationAttribute
            | ProvideAutoLoadAttribute
            | ProvideToolWindowAttribute
            | PackageAutoLoadFlags => namespaces::SHELL,
            JoinableTask | JoinableTaskContext | JoinableTaskFactory => namespaces::THREADING,
        }
    }

    /// The simple name, without arity.
    pub const fn name(self) -> &'static str {
        use WellKnownType::*;
        match self {
            IServiceProvider => "IServiceProvider",
            IProgress => "IProgress",
            CancellationToken => "CancellationToken",
            Task => "Task",
            ExportAttribute => "ExportAttribute",
            Assumes => "Assumes",
            Requires => "Requires",
            Package => "Package",
            AsyncPackage => "AsyncPackage",
            IAsyncServiceProvider => "IAsyncServiceProvider",
            ServiceProvider => "ServiceProvider",
            ServiceProgressData => "ServiceProgressData",
            ThreadHelper => "ThreadHelper",
            PackageRegistrationAttribute => "PackageRegistrationAttribute",
            ProvideAutoLoadAttribute => "ProvideAutoLoadAttribute",
            ProvideToolWindowAttribute => "ProvideToolWindowAttribute",
            PackageAutoLoadFlags => "PackageAutoLoadFlags",
            JoinableTask => "JoinableTask",
            JoinableTaskContext => "JoinableTaskContext",
            JoinableTaskFactory => "JoinableTaskFactory",
        }
    }

    /// Number of generic type parameters.
    pub const fn arity(self) -> usize {
        match self {
            WellKnownType::IProgress => 1,
            _ => 0,
        }
    }

    /// The dotted namespace, as written in a `using` directive.
    pub fn namespace_name(self) -> String {
        self.namespace().join(".")
    }

    /// The metadata name accepted by [`Compilation::type_by_qualified_name`].
    pub fn metadata_name(self) -> String {
        let mut name = format!("{}.{}", self.namespace_name(), self.name());
        if self.arity() > 0 {
            name.push_str(&format!("`{}", self.arity()));
        }
        name
    }

    /// Looks the type up in `compilation`.
    pub fn resolve(self, compilation: &Compilation) -> Option<SymbolId> {
        compilation.type_by_qualified_name(&self.metadata_name())
    }

    /// The type as a matcher spec.
    pub fn spec(self) -> QualifiedTypeSpec {
        QualifiedTypeSpec::new(self.namespace(), self.name())
    }

    /// A member of the type as a matcher spec.
    pub fn member(self, member: &str) -> QualifiedMemberSpec {
        QualifiedMemberSpec::new(self.namespace(), self.name(), member)
    }
}

/// Methods returning a possibly-null service instance.
pub const SERVICE_LOOKUP_METHODS: &[(WellKnownType, &str)] = &[
    (WellKnownType::IServiceProvider, "GetService"),
    (WellKnownType::Package, "GetService"),
    (WellKnownType::Package, "GetGlobalService"),
    (WellKnownType::AsyncPackage, "GetServiceAsync"),
    (WellKnownType::IAsyncServiceProvider, "GetServiceAsync"),
    (WellKnownType::ServiceProvider, "GetService"),
    (WellKnownType::ServiceProvider, "GetGlobalServiceAsync"),
];

/// Methods that throw when their first argument is null.
pub const NULL_ASSERTION_METHODS: &[(WellKnownType, &str)] = &[
    (WellKnownType::Assumes, "Present"),
    (WellKnownType::Assumes, "NotNull"),
    (WellKnownType::Requires, "NotNull"),
];

/// Returns `true` if `symbol` is one of the listed members.
pub fn is_any_member(
    compilation: &Compilation,
    symbol: Option<SymbolId>,
    members: &[(WellKnownType, &str)],
) -> bool {
    members
        .iter()
        .any(|(ty, name)| matches_member(compilation, symbol, &ty.member(name)))
}
