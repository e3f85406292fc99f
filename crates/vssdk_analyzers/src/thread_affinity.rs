//! Tables of types and members bound to the UI thread.
//!
//! Two tables are consulted: members that *require* the main thread (COM
//! interop surfaces, global service lookups) and methods that *assert* the
//! caller is on it. Each starts from a built-in catalog and is extended by
//! additional files with fixed names, one entry per line:
//!
//! ```text
//! # comment
//! [Microsoft.VisualStudio.Shell.Interop.*]
//! ![Microsoft.VisualStudio.Shell.Interop.IVsTaskSchedulerService]
//! [Microsoft.VisualStudio.Shell.Package]::GetGlobalService
//! ```
//!
//! A leading `!` marks an exemption. A malformed line fails the whole load:
//! a half-read table would silently change what gets reported.

use thiserror::Error;
use tracing::debug;
use vssdk_config::AdditionalFile;
use vssdk_semantic::{Compilation, SymbolId};

use crate::matcher::{QualifiedTypeSpec, TypeMatchEntry};

/// Additional file extending the members that require the main thread.
pub const MEMBERS_REQUIRING_MAIN_THREAD: &str = "vs-threading.MembersRequiringMainThread.txt";

/// Additional file extending the methods that assert the main thread.
pub const MAIN_THREAD_ASSERTING_METHODS: &str = "vs-threading.MainThreadAssertingMethods.txt";

const DEFAULT_MEMBERS_REQUIRING_MAIN_THREAD: &str = "\
# COM interop surfaces live in the UI thread's apartment.
[Microsoft.VisualStudio.Shell.Interop.*]
![Microsoft.VisualStudio.Shell.Interop.IVsTaskSchedulerService]
[Microsoft.VisualStudio.OLE.Interop.*]
[Microsoft.Internal.VisualStudio.Shell.Interop.*]
[EnvDTE.*]
[EnvDTE80.*]

# Global service lookups.
[Microsoft.VisualStudio.Shell.Package]::GetGlobalService
[Microsoft.VisualStudio.Shell.ServiceProvider]::GlobalProvider
";

const DEFAULT_MAIN_THREAD_ASSERTING_METHODS: &str = "\
[Microsoft.VisualStudio.Shell.ThreadHelper]::ThrowIfNotOnUIThread
[Microsoft.VisualStudio.Threading.JoinableTaskFactory]::SwitchToMainThreadAsync
";

/// A line of a classification list that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}: invalid entry `{text}`: {reason}")]
pub struct ClassificationError {
    /// The list the line came from.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// The offending line, trimmed.
    pub text: String,
    /// What is wrong with it.
    pub reason: String,
}

/// A list of [`TypeMatchEntry`] rows consulted by linear scan.
#[derive(Debug, Clone, Default)]
pub struct ClassificationTable {
    entries: Vec<TypeMatchEntry>,
}

impl ClassificationTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a list. `file` is only used in error messages.
    pub fn parse(file: &str, text: &str) -> Result<Self, ClassificationError> {
        let mut table = Self::new();
        table.extend_from(file, text)?;
        Ok(table)
    }

    /// Appends the entries of another list.
    pub fn extend_from(&mut self, file: &str, text: &str) -> Result<(), ClassificationError> {
        for (index, raw) in text.lines().enumerate() {
            let parsed = parse_line(raw).map_err(|reason| ClassificationError {
                file: file.to_string(),
                line: index + 1,
                text: raw.trim().to_string(),
                reason,
            })?;
            self.entries.extend(parsed);
        }
        Ok(())
    }

    /// Appends a single entry.
    pub fn push(&mut self, entry: TypeMatchEntry) {
        self.entries.push(entry);
    }

    /// All entries in load order.
    pub fn entries(&self) -> &[TypeMatchEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `member` of `ty` (or `ty` itself, with no member)
    /// is listed. An entry naming a specific type wins as soon as it
    /// matches; otherwise the first matching wildcard decides. Inverted
    /// entries turn a match into `false`.
    pub fn contains(
        &self,
        compilation: &Compilation,
        ty: Option<SymbolId>,
        member: Option<&str>,
    ) -> bool {
        let mut wildcard = None;
        for entry in &self.entries {
            if !entry.matches(compilation, ty, member) {
                continue;
            }
            if entry.is_exact() {
                return !entry.is_inverted();
            }
            wildcard.get_or_insert(entry);
        }
        wildcard.is_some_and(|entry| !entry.is_inverted())
    }

    /// [`contains`](Self::contains) for a member symbol, or for a type
    /// symbol as a whole.
    pub fn contains_symbol(&self, compilation: &Compilation, symbol: SymbolId) -> bool {
        if compilation.symbol(symbol).is_type() {
            return self.contains(compilation, Some(symbol), None);
        }
        self.contains(
            compilation,
            compilation.containing_type(symbol),
            Some(compilation.name(symbol)),
        )
    }
}

/// Parses one line. Blank lines and comments yield `Ok(None)`.
fn parse_line(raw: &str) -> Result<Option<TypeMatchEntry>, String> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (inverted, rest) = match line.strip_prefix('!') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, line),
    };
    let inner = rest
        .strip_prefix('[')
        .ok_or_else(|| "expected `[`".to_string())?;
    let (type_text, after) = inner
        .split_once(']')
        .ok_or_else(|| "expected `]`".to_string())?;
    let type_spec = QualifiedTypeSpec::parse(type_text)
        .ok_or_else(|| format!("`{type_text}` is not a dotted type name"))?;
    let after = after.trim();
    let member = if after.is_empty() {
        None
    } else {
        let name = after
            .strip_prefix("::")
            .map(str::trim)
            .ok_or_else(|| format!("unexpected `{after}` after the type name"))?;
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(format!("`{name}` is not a member name"));
        }
        Some(name.to_string())
    };
    TypeMatchEntry::new(type_spec, member, inverted)
        .map(Some)
        .map_err(|e| e.to_string())
}

/// Both thread-affinity tables for one analysis session.
#[derive(Debug, Clone, Default)]
pub struct ThreadAffinityTables {
    /// Types and members that may only be used on the main thread.
    pub requiring_main_thread: ClassificationTable,
    /// Methods that throw unless called on the main thread.
    pub asserting_main_thread: ClassificationTable,
}

impl ThreadAffinityTables {
    /// Builds the tables from the built-in catalogs plus every additional
    /// file with one of the two well-known names. Other files are ignored.
    pub fn load(additional_files: &[AdditionalFile]) -> Result<Self, ClassificationError> {
        let mut requiring = ClassificationTable::parse(
            "<built-in members requiring main thread>",
            DEFAULT_MEMBERS_REQUIRING_MAIN_THREAD,
        )?;
        let mut asserting = ClassificationTable::parse(
            "<built-in main thread asserting methods>",
            DEFAULT_MAIN_THREAD_ASSERTING_METHODS,
        )?;
        for file in additional_files {
            let table = match file.file_name() {
                MEMBERS_REQUIRING_MAIN_THREAD => &mut requiring,
                MAIN_THREAD_ASSERTING_METHODS => &mut asserting,
                _ => continue,
            };
            let before = table.len();
            table.extend_from(&file.path.display().to_string(), &file.text)?;
            debug!(
                path = %file.path.display(),
                entries = table.len() - before,
                "loaded classification list"
            );
        }
        Ok(Self {
            requiring_main_thread: requiring,
            asserting_main_thread: asserting,
        })
    }
}
