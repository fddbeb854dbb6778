//! ruledesk - edit spreadsheet decision tables and publish them for review
//!
//! ruledesk reads Drools-style decision tables from a worksheet, applies
//! structural edits (adding and removing CONDITION/ACTION columns,
//! replacing rule rows) and publishes the edited file as a freshly named
//! branch on the repository's remote.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates)
//! - [`table`] - Decision-table model over a worksheet capability
//! - [`publish`] - Sync, branch naming, publish and remote branch ranking
//! - [`git`] - Single interface for all git access
//! - [`core`] - Strong types, configuration, repository locator, locking
//! - [`ui`] - User-facing output
//! - [`logging`] - Diagnostic logging setup
//!
//! # Correctness Invariants
//!
//! 1. Structural edits are validated before anything is written
//! 2. A sync never discards uncommitted work
//! 3. Operations on one working copy are serialized by a lock
//! 4. Failed git steps are reported with their output, never swallowed

pub mod cli;
pub mod core;
pub mod git;
pub mod logging;
pub mod publish;
pub mod table;
pub mod ui;
