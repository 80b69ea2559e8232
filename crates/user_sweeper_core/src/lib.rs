//! Core of the inactive-user sweep.
//!
//! This crate holds the parts of the fetch → review → delete workflow that do not
//! depend on a terminal:
//!
//! - [`filter`]: picks the non-active accounts out of a directory listing
//! - [`review_store`]: the on-disk snapshot handed from the fetch phase to the delete phase
//! - [`deletion`]: the confirmation-gated, continue-on-error deletion run
//! - [`operator`]: the capability through which the run asks the operator for decisions
//!
//! The remote service is reached only through [`jira_client::UserDirectory`].

pub mod deletion;
pub mod errors;
pub mod filter;
pub mod operator;
pub mod review_store;

pub use deletion::{
    AbortReason, DeletionOrchestrator, DeletionOutcome, LedgerSummary, OutcomeLedger,
    OutcomeStatus, RunReport, RunState, SkipReason, CONFIRMATION_PHRASE,
};
pub use errors::StoreError;
pub use filter::{exclude_former, filter_inactive};
pub use operator::{Operator, Selection};
pub use review_store::{ReviewStore, StagedSnapshot, DEFAULT_SNAPSHOT_FILENAME};
