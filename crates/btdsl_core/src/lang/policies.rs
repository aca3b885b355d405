//! Precondition and behavior-attribute vocabulary.
//!
//! Preconditions (`@guard(cond)`, `@success_if(cond)`, ...) and the `#[behavior(...)]` attribute
//! on extern declarations accept a small closed set of names. Keeping them here means the parser,
//! the resolver and any code generator agree on spellings.
//!
//! ## Examples
//! ```rust
//! use btdsl_core::lang::policies::{self, DataPolicy, PreconditionKind};
//!
//! assert_eq!(policies::precondition_from_str("skip_if"), Some(PreconditionKind::SkipIf));
//! assert_eq!(policies::data_policy_from_str("Any"), Some(DataPolicy::Any));
//! ```

/// Kind of a precondition clause attached to a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreconditionKind {
    Guard,
    SuccessIf,
    FailureIf,
    SkipIf,
    RunWhile,
}

/// All precondition kinds with their canonical spelling.
pub const PRECONDITIONS: &[(PreconditionKind, &str)] = &[
    (PreconditionKind::Guard, "guard"),
    (PreconditionKind::SuccessIf, "success_if"),
    (PreconditionKind::FailureIf, "failure_if"),
    (PreconditionKind::SkipIf, "skip_if"),
    (PreconditionKind::RunWhile, "run_while"),
];

/// How a guarded subtree treats data written by its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataPolicy {
    All,
    Any,
    None,
}

/// How a guarded subtree sequences control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowPolicy {
    Chained,
    Isolated,
}

pub const DATA_POLICIES: &[(DataPolicy, &str)] = &[
    (DataPolicy::All, "All"),
    (DataPolicy::Any, "Any"),
    (DataPolicy::None, "None"),
];

pub const FLOW_POLICIES: &[(FlowPolicy, &str)] = &[(FlowPolicy::Chained, "Chained"), (FlowPolicy::Isolated, "Isolated")];

/// Name of the only attribute accepted on declarations.
pub const BEHAVIOR_ATTRIBUTE: &str = "behavior";

/// Default flow policy when `#[behavior(...)]` names only a data policy.
pub const DEFAULT_FLOW_POLICY: FlowPolicy = FlowPolicy::Chained;

pub fn precondition_from_str(s: &str) -> Option<PreconditionKind> {
    PRECONDITIONS.iter().find(|(_, name)| *name == s).map(|(kind, _)| *kind)
}

pub fn precondition_as_str(kind: PreconditionKind) -> &'static str {
    PRECONDITIONS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, name)| *name)
        .expect("precondition spelling missing")
}

pub fn data_policy_from_str(s: &str) -> Option<DataPolicy> {
    DATA_POLICIES.iter().find(|(_, name)| *name == s).map(|(p, _)| *p)
}

pub fn flow_policy_from_str(s: &str) -> Option<FlowPolicy> {
    FLOW_POLICIES.iter().find(|(_, name)| *name == s).map(|(p, _)| *p)
}

/// Comma-separated list of precondition spellings, for "expected one of" help texts.
pub fn precondition_names() -> String {
    PRECONDITIONS
        .iter()
        .map(|(_, name)| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
