//! The operation pipeline: queued Insert/Replace/Set operations executed
//! against a package, threading each step's output bytes into the next.

mod insert;
mod replace;
mod settings;

pub use insert::InsertTable;
pub use replace::ReplaceValues;
pub use settings::SetSettings;

use std::collections::HashMap;

use crate::package::{XlsxError, XlsxPackage};

/// Operation kind; a render pass executes all queued operations of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Insert,
    Replace,
    Set,
}

/// Per-render mutable state threaded through the operation chain.
///
/// This replaces any notion of process-wide "current row/column" state: each
/// render pass owns its context, so concurrent renders cannot interfere.
#[derive(Debug, Default)]
pub struct RenderContext {
    /// Next free 1-based row per sheet, updated by insert operations so
    /// consecutive inserts on one sheet stack below each other.
    next_rows: HashMap<String, u32>,
    /// Name of the field currently being written, for error context.
    pub current_field: Option<String>,
}

impl RenderContext {
    pub fn next_row(&self, sheet: &str) -> Option<u32> {
        self.next_rows.get(sheet).copied()
    }

    pub fn advance(&mut self, sheet: &str, next_row: u32) {
        self.next_rows.insert(sheet.to_owned(), next_row);
    }
}

/// A stateless unit of work against a package.
///
/// Implementations must keep all mutable state in the [`RenderContext`] or
/// the package itself so a queued operation can be executed against any input
/// document.
pub trait Operation {
    fn kind(&self) -> OpKind;

    /// The worksheet this operation targets, if any.
    fn sheet_name(&self) -> Option<&str>;

    /// Whether a missing target worksheet fails the render before `execute`
    /// is invoked. Set operations tolerate a missing sheet (they no-op);
    /// Insert and Replace fail fast.
    fn requires_sheet(&self) -> bool {
        !matches!(self.kind(), OpKind::Set)
    }

    fn execute(&self, ctx: &mut RenderContext, pkg: &mut XlsxPackage) -> Result<(), XlsxError>;
}

/// Outcome of a render pass. Operation failures are surfaced as data, never
/// as an `Err` escaping the render loop.
#[derive(Debug)]
pub struct RenderResult {
    pub success: bool,
    /// Final output bytes; present only when every operation succeeded.
    pub output: Option<Vec<u8>>,
    pub errors: Vec<String>,
}

/// Ordered pending operations for one input document.
#[derive(Default)]
pub struct RenderQueue {
    pending: Vec<Box<dyn Operation>>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, op: impl Operation + 'static) {
        self.pending.push(Box::new(op));
    }

    pub fn pending_count(&self, kind: OpKind) -> usize {
        self.pending.iter().filter(|op| op.kind() == kind).count()
    }

    /// Execute all queued operations of `kind` against `input`, in enqueue
    /// order, threading each operation's output into the next one's input.
    ///
    /// Stops at the first failure; the input buffer is never modified in
    /// place. Executed (and, on failure, skipped) operations of this kind are
    /// removed from the queue; other kinds stay queued.
    pub fn render(&mut self, kind: OpKind, input: &[u8]) -> RenderResult {
        let mut run = Vec::new();
        let mut rest = Vec::new();
        for op in self.pending.drain(..) {
            if op.kind() == kind {
                run.push(op);
            } else {
                rest.push(op);
            }
        }
        self.pending = rest;

        let mut ctx = RenderContext::default();
        let mut current = input.to_vec();
        let mut errors = Vec::new();

        for (step, op) in run.iter().enumerate() {
            match render_step(op.as_ref(), &mut ctx, &current) {
                Ok(output) => {
                    log::debug!(
                        "render step {step} ({kind:?}) ok: {} -> {} bytes",
                        current.len(),
                        output.len()
                    );
                    current = output;
                }
                Err(err) => {
                    log::warn!("render step {step} ({kind:?}) failed: {err}");
                    errors.push(err.to_string());
                    break;
                }
            }
        }

        if errors.is_empty() {
            RenderResult {
                success: true,
                output: Some(current),
                errors,
            }
        } else {
            RenderResult {
                success: false,
                output: None,
                errors,
            }
        }
    }
}

fn render_step(
    op: &dyn Operation,
    ctx: &mut RenderContext,
    input: &[u8],
) -> Result<Vec<u8>, XlsxError> {
    let mut pkg = XlsxPackage::from_bytes(input)?;
    if let Some(sheet) = op.sheet_name() {
        if op.requires_sheet() && !pkg.has_sheet(sheet)? {
            return Err(XlsxError::MissingSheet(sheet.to_owned()));
        }
    }
    op.execute(ctx, &mut pkg)?;
    pkg.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        kind: OpKind,
        sheet: Option<String>,
    }

    impl Operation for Probe {
        fn kind(&self) -> OpKind {
            self.kind
        }

        fn sheet_name(&self) -> Option<&str> {
            self.sheet.as_deref()
        }

        fn execute(&self, _ctx: &mut RenderContext, _pkg: &mut XlsxPackage) -> Result<(), XlsxError> {
            Ok(())
        }
    }

    #[test]
    fn render_only_consumes_the_requested_kind() {
        let mut queue = RenderQueue::new();
        queue.enqueue(Probe {
            kind: OpKind::Insert,
            sheet: None,
        });
        queue.enqueue(Probe {
            kind: OpKind::Set,
            sheet: None,
        });
        let input = crate::fixture::fixture_xlsx(&[crate::fixture::FixtureSheet::named("S")])
            .unwrap();
        let result = queue.render(OpKind::Insert, &input);
        assert!(result.success);
        assert_eq!(queue.pending_count(OpKind::Insert), 0);
        assert_eq!(queue.pending_count(OpKind::Set), 1);
    }

    #[test]
    fn missing_sheet_fails_fast_for_insert_kinds() {
        let mut queue = RenderQueue::new();
        queue.enqueue(Probe {
            kind: OpKind::Insert,
            sheet: Some("Nope".into()),
        });
        let input = crate::fixture::fixture_xlsx(&[crate::fixture::FixtureSheet::named("S")])
            .unwrap();
        let result = queue.render(OpKind::Insert, &input);
        assert!(!result.success);
        assert!(result.output.is_none());
        assert!(result.errors[0].contains("worksheet not found"));
    }
}
