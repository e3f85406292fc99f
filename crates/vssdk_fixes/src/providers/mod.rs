//! The built-in code fix providers.

mod vssdk001;
mod vssdk002;
mod vssdk004;
mod vssdk005;
mod vssdk006;

pub use vssdk001::AsyncPackageFix;
pub use vssdk002::RegistrationFix;
pub use vssdk004::BackgroundLoadFlagFix;
pub use vssdk005::JoinableTaskContextFix;
pub use vssdk006::AssumePresentFix;

use vssdk_syntax::NodeRef;

use crate::rewrite::{FixEdit, UsingSpec};
use crate::{CodeFixProvider, PreparedFix};

const SHELL_NAMESPACE: &str = "Microsoft.VisualStudio.Shell";

/// One provider per fixable rule, in id order.
pub fn builtin_providers() -> Vec<Box<dyn CodeFixProvider>> {
    vec![
        Box::new(AsyncPackageFix),
        Box::new(RegistrationFix),
        Box::new(BackgroundLoadFlagFix),
        Box::new(JoinableTaskContextFix),
        Box::new(AssumePresentFix),
    ]
}

/// Queues `using` directives visible from `node`'s type, or from `node`
/// itself outside of any type.
fn ensure_usings(fix: &mut PreparedFix, node: NodeRef<'_>, usings: &[UsingSpec]) {
    let scope = node.enclosing_type().unwrap_or(node);
    let scope = fix.track(scope);
    for using in usings {
        fix.push(FixEdit::EnsureUsing {
            scope,
            using: using.clone(),
        });
    }
}
