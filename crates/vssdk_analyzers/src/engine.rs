//! Analyzer engine that manages rule registration, configuration, and execution.
//!
//! The `AnalyzerEngine` accepts a `VssdkConfig` to control which rules are
//! denied, allowed, or warned. A run loads the thread-affinity tables,
//! activates each rule against the compilation, then analyzes every
//! (tree, rule) pair on the rayon pool. Pairs only read shared state and
//! collect diagnostics privately; the results are merged in a fixed order.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, error, trace};
use vssdk_common::CancellationToken;
use vssdk_config::{AdditionalFile, VssdkConfig};
use vssdk_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use vssdk_semantic::Compilation;
use vssdk_syntax::SyntaxTree;

use crate::context::TreeContext;
use crate::error::{AnalysisError, FailureLocation};
use crate::rules::register_builtin_rules;
use crate::thread_affinity::ThreadAffinityTables;
use crate::{AnalyzerRule, TreeAnalyzer};

/// Called with every rule failure before it is returned from
/// [`AnalyzerEngine::run`].
pub type FailureHook = Arc<dyn Fn(&AnalysisError) + Send + Sync>;

/// Longest node text quoted in a rule failure.
const MAX_NODE_TEXT: usize = 120;

/// The analyzer engine that orchestrates running rules on a compilation.
///
/// Rules are registered at construction time. The engine respects the
/// configuration to suppress rules (allow), promote rules to errors (deny),
/// or pin them to warnings (warn).
pub struct AnalyzerEngine {
    /// All registered rules.
    rules: Vec<Box<dyn AnalyzerRule>>,
    /// Rule ids that should be promoted to error severity.
    denied: HashSet<String>,
    /// Rule ids that should be suppressed (not run).
    allowed: HashSet<String>,
    /// Rule ids reported as warnings regardless of their default.
    warned: HashSet<String>,
    /// Observer for rule failures.
    failure_hook: FailureHook,
}

impl AnalyzerEngine {
    /// Creates an engine configured by `config` with every built-in rule
    /// registered.
    pub fn new(config: &VssdkConfig) -> Self {
        let mut engine = Self::configured(config);
        register_builtin_rules(&mut engine);
        engine
    }

    /// Creates an engine with default configuration (no overrides).
    pub fn with_defaults() -> Self {
        Self::new(&VssdkConfig::default())
    }

    /// Creates an engine with default configuration and no rules.
    pub fn empty() -> Self {
        Self::configured(&VssdkConfig::default())
    }

    fn configured(config: &VssdkConfig) -> Self {
        let failure_hook: FailureHook = if config.diagnostics.trace_rule_failures {
            Arc::new(|err: &AnalysisError| error!(%err, "analyzer rule failed"))
        } else {
            Arc::new(|_: &AnalysisError| {})
        };
        Self {
            rules: Vec::new(),
            denied: config.analyzers.deny.iter().cloned().collect(),
            allowed: config.analyzers.allow.iter().cloned().collect(),
            warned: config.analyzers.warn.iter().cloned().collect(),
            failure_hook,
        }
    }

    /// Registers a rule with the engine.
    pub fn register(&mut self, rule: Box<dyn AnalyzerRule>) {
        self.rules.push(rule);
    }

    /// Returns the number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the ids of all registered rules.
    pub fn rule_ids(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.code().to_string()).collect()
    }

    /// Returns the names of all registered rules.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Replaces the observer called with each rule failure.
    pub fn set_failure_hook(&mut self, hook: FailureHook) {
        self.failure_hook = hook;
    }

    /// The severity `rule` reports with, or `None` if it is suppressed.
    pub fn effective_severity(&self, rule: &dyn AnalyzerRule) -> Option<Severity> {
        let id = rule.code().to_string();
        if self.allowed.contains(&id) {
            None
        } else if self.denied.contains(&id) {
            Some(Severity::Error)
        } else if self.warned.contains(&id) {
            Some(Severity::Warning)
        } else {
            Some(rule.default_severity())
        }
    }

    /// Runs every enabled rule over every tree of `compilation`.
    ///
    /// Diagnostics go to `sink` in tree order, then rule registration order.
    /// A malformed classification list, a rule failure or a cancellation
    /// aborts the run; nothing is emitted in that case.
    pub fn run(
        &self,
        compilation: &Compilation,
        additional_files: &[AdditionalFile],
        cancel: &CancellationToken,
        sink: &DiagnosticSink,
    ) -> Result<(), AnalysisError> {
        let tables = Arc::new(ThreadAffinityTables::load(additional_files)?);

        let active: Vec<(&dyn AnalyzerRule, Severity, Box<dyn TreeAnalyzer>)> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let severity = self.effective_severity(rule.as_ref())?;
                match rule.on_compilation_start(compilation) {
                    Some(analyzer) => Some((rule.as_ref(), severity, analyzer)),
                    None => {
                        debug!(rule = %rule.code(), "rule not applicable to this compilation");
                        None
                    }
                }
            })
            .collect();

        let pairs: Vec<(&SyntaxTree, usize)> = compilation
            .trees()
            .iter()
            .flat_map(|tree| (0..active.len()).map(move |index| (tree, index)))
            .collect();
        debug!(
            trees = compilation.trees().len(),
            rules = active.len(),
            "running analyzers"
        );

        let results: Vec<Result<Vec<Diagnostic>, AnalysisError>> = pairs
            .par_iter()
            .map(|&(tree, index)| {
                let (rule, severity, analyzer) = &active[index];
                run_pair(
                    compilation,
                    tree,
                    *rule,
                    *severity,
                    analyzer.as_ref(),
                    &tables,
                    cancel,
                )
            })
            .collect();

        let mut diagnostics = Vec::new();
        for result in results {
            match result {
                Ok(found) => diagnostics.extend(found),
                Err(AnalysisError::Cancelled) => return Err(AnalysisError::Cancelled),
                Err(err) => {
                    (self.failure_hook)(&err);
                    return Err(err);
                }
            }
        }
        cancel.check()?;
        sink.extend(diagnostics);
        Ok(())
    }
}

fn run_pair(
    compilation: &Compilation,
    tree: &SyntaxTree,
    rule: &dyn AnalyzerRule,
    severity: Severity,
    analyzer: &dyn TreeAnalyzer,
    tables: &ThreadAffinityTables,
    cancel: &CancellationToken,
) -> Result<Vec<Diagnostic>, AnalysisError> {
    cancel.check()?;
    let Some(model) = compilation.semantic_model(tree.file()) else {
        return Ok(Vec::new());
    };
    let ctx = TreeContext::new(model, tables, cancel, rule.code(), severity);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze_tree(&ctx)));
    let failure = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.message),
        Err(payload) => Some(panic_message(payload.as_ref())),
    };
    if let Some(message) = failure {
        return Err(rule_failure(rule, tree, &ctx, message));
    }
    cancel.check()?;
    trace!(
        rule = %rule.code(),
        file = tree.file().as_raw(),
        reported = ctx.report_count(),
        "rule finished"
    );
    Ok(ctx.into_reports())
}

fn rule_failure(
    rule: &dyn AnalyzerRule,
    tree: &SyntaxTree,
    ctx: &TreeContext<'_>,
    message: String,
) -> AnalysisError {
    let node = ctx
        .current_node()
        .and_then(|id| tree.try_node(id))
        .unwrap_or_else(|| tree.root());
    let text = tree.text();
    let mut node_text = node.text();
    if node_text.len() > MAX_NODE_TEXT {
        let mut cut = MAX_NODE_TEXT;
        while !node_text.is_char_boundary(cut) {
            cut -= 1;
        }
        node_text.truncate(cut);
        node_text.push_str("...");
    }
    AnalysisError::RuleFailed {
        rule: rule.code().to_string(),
        location: FailureLocation::at_offset(tree.file(), &text, node.span().start),
        node_text,
        message,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::compile;
    use std::sync::Mutex;
    use vssdk_common::{InternalError, VssdkResult};
    use vssdk_config::load_config_from_str;
    use vssdk_diagnostics::DiagnosticCode;
    use vssdk_syntax::SyntaxKind;

    struct DummyRule {
        fail: Option<&'static str>,
        panic: bool,
    }

    struct DummyAnalyzer {
        fail: Option<&'static str>,
        panic: bool,
    }

    impl AnalyzerRule for DummyRule {
        fn code(&self) -> DiagnosticCode {
            DiagnosticCode::vssdk(7)
        }
        fn name(&self) -> &str {
            "dummy-rule"
        }
        fn description(&self) -> &str {
            "a test rule"
        }
        fn default_severity(&self) -> Severity {
            Severity::Info
        }
        fn on_compilation_start(&self, _: &Compilation) -> Option<Box<dyn TreeAnalyzer>> {
            Some(Box::new(DummyAnalyzer {
                fail: self.fail,
                panic: self.panic,
            }))
        }
    }

    impl TreeAnalyzer for DummyAnalyzer {
        fn analyze_tree(&self, ctx: &TreeContext<'_>) -> VssdkResult<()> {
            for node in ctx.nodes_of(&[SyntaxKind::ClassDeclaration]) {
                if node.identifier_text() != "Flagged" {
                    continue;
                }
                if self.panic {
                    panic!("unexpected shape");
                }
                if let Some(message) = self.fail {
                    return Err(InternalError::new(message));
                }
                ctx.report(ctx.diagnostic("dummy", node.span()));
            }
            Ok(())
        }
    }

    struct InapplicableRule;

    impl AnalyzerRule for InapplicableRule {
        fn code(&self) -> DiagnosticCode {
            DiagnosticCode::vssdk(8)
        }
        fn name(&self) -> &str {
            "inapplicable"
        }
        fn description(&self) -> &str {
            "never activates"
        }
        fn default_severity(&self) -> Severity {
            Severity::Warning
        }
        fn on_compilation_start(&self, _: &Compilation) -> Option<Box<dyn TreeAnalyzer>> {
            None
        }
    }

    fn engine(config: &str, rule: DummyRule) -> AnalyzerEngine {
        let config = load_config_from_str(config).unwrap();
        let mut engine = AnalyzerEngine::configured(&config);
        engine.register(Box::new(rule));
        engine.register(Box::new(InapplicableRule));
        engine
    }

    fn ok_rule() -> DummyRule {
        DummyRule {
            fail: None,
            panic: false,
        }
    }

    const SOURCE: &str = "class Plain { }\nclass Flagged { }\n";

    #[test]
    fn builtin_rules_registered() {
        let engine = AnalyzerEngine::with_defaults();
        assert_eq!(engine.rule_count(), 8);
        let ids = engine.rule_ids();
        assert_eq!(ids.first().map(String::as_str), Some("VSSDK001"));
        assert_eq!(ids.last().map(String::as_str), Some("VSSDK008"));
        assert!(engine.rule_names().contains(&"check-services-exist"));
    }

    #[test]
    fn reports_with_default_severity_and_help_link() {
        let (c, _) = compile(SOURCE);
        let sink = DiagnosticSink::new();
        engine("", ok_rule())
            .run(&c, &[], &CancellationToken::new(), &sink)
            .unwrap();
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Info);
        assert_eq!(
            diags[0].help_uri.as_deref(),
            Some("https://github.com/Microsoft/VSSDK-Analyzers/blob/main/doc/VSSDK007.md")
        );
    }

    #[test]
    fn deny_warn_and_allow() {
        let (c, _) = compile(SOURCE);
        for (config, expected) in [
            ("[analyzers]\ndeny = [\"VSSDK007\"]\n", Some(Severity::Error)),
            ("[analyzers]\nwarn = [\"VSSDK007\"]\n", Some(Severity::Warning)),
            ("[analyzers]\nallow = [\"VSSDK007\"]\n", None),
        ] {
            let sink = DiagnosticSink::new();
            engine(config, ok_rule())
                .run(&c, &[], &CancellationToken::new(), &sink)
                .unwrap();
            let diags = sink.take_all();
            assert_eq!(diags.first().map(|d| d.severity), expected, "{config}");
        }
    }

    #[test]
    fn internal_error_is_wrapped_with_location() {
        let (c, _) = compile(SOURCE);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut engine = engine(
            "",
            DummyRule {
                fail: Some("no base list"),
                panic: false,
            },
        );
        let observed = Arc::clone(&seen);
        engine.set_failure_hook(Arc::new(move |err| {
            observed.lock().unwrap().push(err.to_string());
        }));
        let sink = DiagnosticSink::new();
        let err = engine
            .run(&c, &[], &CancellationToken::new(), &sink)
            .unwrap_err();
        match &err {
            AnalysisError::RuleFailed {
                rule,
                location,
                node_text,
                message,
            } => {
                assert_eq!(rule, "VSSDK007");
                assert_eq!(location.line, 2);
                assert_eq!(node_text, "class Flagged { }");
                assert_eq!(message, "no base list");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn panics_are_caught() {
        let (c, _) = compile(SOURCE);
        let sink = DiagnosticSink::new();
        let err = engine(
            "",
            DummyRule {
                fail: None,
                panic: true,
            },
        )
        .run(&c, &[], &CancellationToken::new(), &sink)
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::RuleFailed { ref message, .. } if message == "unexpected shape"
        ));
    }

    #[test]
    fn cancelled_run_emits_nothing() {
        let (c, _) = compile(SOURCE);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let sink = DiagnosticSink::new();
        let err = engine("", ok_rule()).run(&c, &[], &cancel, &sink).unwrap_err();
        assert_eq!(err, AnalysisError::Cancelled);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn malformed_list_stops_the_session() {
        let (c, _) = compile(SOURCE);
        let files = [AdditionalFile::new(
            crate::thread_affinity::MEMBERS_REQUIRING_MAIN_THREAD,
            "Contoso.Foo\n",
        )];
        let sink = DiagnosticSink::new();
        let err = engine("", ok_rule())
            .run(&c, &files, &CancellationToken::new(), &sink)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Classification(_)));
        assert!(sink.take_all().is_empty());
    }
}
