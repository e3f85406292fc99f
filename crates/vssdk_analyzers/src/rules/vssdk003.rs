//! VSSDK003: Async package provides a tool window without an async factory.

use vssdk_common::VssdkResult;
use vssdk_diagnostics::{DiagnosticCode, Label, Severity};
use vssdk_semantic::{Compilation, Modifiers, SymbolId};
use vssdk_syntax::SyntaxKind;

use super::attributes_of;
use crate::hierarchy::{base_chain, is_equal_to_or_derived_from};
use crate::well_known::WellKnownType;
use crate::{AnalyzerRule, TreeAnalyzer, TreeContext};

const FACTORY_METHOD: &str = "GetAsyncToolWindowFactory";

/// Detects `[ProvideToolWindow]` on an `AsyncPackage` that never overrides
/// `GetAsyncToolWindowFactory`, so its tool windows are created on the UI
/// thread.
pub struct AsyncToolWindow;

struct Analyzer {
    async_package: SymbolId,
    provide_tool_window: SymbolId,
}

impl AnalyzerRule for AsyncToolWindow {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::vssdk(3)
    }

    fn name(&self) -> &str {
        "support-async-tool-window"
    }

    fn description(&self) -> &str {
        "async packages providing tool windows should override GetAsyncToolWindowFactory"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn on_compilation_start(&self, compilation: &Compilation) -> Option<Box<dyn TreeAnalyzer>> {
        Some(Box::new(Analyzer {
            async_package: WellKnownType::AsyncPackage.resolve(compilation)?,
            provide_tool_window: WellKnownType::ProvideToolWindowAttribute.resolve(compilation)?,
        }))
    }
}

impl Analyzer {
    fn overrides_factory(&self, c: &Compilation, class: SymbolId) -> bool {
        base_chain(c, Some(class))
            .take_while(|&t| t != self.async_package)
            .flat_map(|t| c.symbol(t).members.iter().copied())
            .any(|m| {
                c.name(m) == FACTORY_METHOD
                    && c.symbol(m).modifiers.contains(Modifiers::OVERRIDE)
            })
    }
}

impl TreeAnalyzer for Analyzer {
    fn analyze_tree(&self, ctx: &TreeContext<'_>) -> VssdkResult<()> {
        let c = ctx.compilation();
        let model = ctx.model();
        for class in ctx.nodes_of(&[SyntaxKind::ClassDeclaration]) {
            let Some(symbol) = model.declared_symbol(class) else {
                continue;
            };
            if !is_equal_to_or_derived_from(c, Some(symbol), self.async_package)
                || self.overrides_factory(c, symbol)
            {
                continue;
            }
            for attribute in attributes_of(model, class, self.provide_tool_window) {
                let span = attribute.span();
                ctx.report(
                    ctx.diagnostic(
                        format!(
                            "`{}` provides a tool window but does not override {FACTORY_METHOD}",
                            class.identifier_text()
                        ),
                        span,
                    )
                    .with_label(Label::primary(span, "tool window created synchronously"))
                    .with_help("override GetAsyncToolWindowFactory and initialize the window asynchronously"),
                );
            }
        }
        Ok(())
    }
}
