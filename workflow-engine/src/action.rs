//! `ActionResult`, the `ActionDispatch` contract, and the scheduling policy
//! attached to an `Action` declared inside a transition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The universal return type of every action invocation, actor dispatch,
/// and public interpreter entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub payload: String,
}

impl ActionResult {
    pub fn success(payload: impl Into<String>) -> Self {
        Self {
            success: true,
            payload: payload.into(),
        }
    }

    pub fn failure(payload: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: payload.into(),
        }
    }

    pub fn ok_empty() -> Self {
        Self::success(String::new())
    }
}

impl std::fmt::Display for ActionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            if self.success { "ok" } else { "fail" },
            self.payload
        )
    }
}

/// A capability satisfied by every entry in the actor tree: given an action
/// name and a serialized argument string, return an `ActionResult`.
#[async_trait]
pub trait ActionDispatch: Send + Sync {
    async fn dispatch(&self, action_name: &str, args: &str) -> ActionResult;
}

/// Per-action scheduling policy. Default is `Pool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    #[default]
    Pool,
    Direct,
}

impl Execution {
    /// Case-insensitive parse; unrecognized or empty input falls back to
    /// `Pool`, per spec.md §4.2 ("null, empty, unrecognized -> POOL").
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("direct") => Execution::Direct,
            Some(s) if s.eq_ignore_ascii_case("pool") => Execution::Pool,
            _ => Execution::Pool,
        }
    }
}
