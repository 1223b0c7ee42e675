//! Sub-workflow child-actor naming/cleanup and the `InterpreterActor`
//! adapter that lets a workflow invoke `call`/`apply` on an interpreter
//! the way it would any other actor.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;

use crate::action::{ActionDispatch, ActionResult};
use crate::actor::ActorSystem;
use crate::arguments::Arguments;

use super::Interpreter;

/// `subwf-<basename>-<unix_millis>-<random_5_digits>`, per spec.md §4.5.
pub fn generate_child_name(file: &str) -> String {
    let basename = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("workflow");
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let suffix: u32 = rand::thread_rng().gen_range(0..100_000);
    format!("subwf-{basename}-{millis}-{suffix:05}")
}

/// Removes its named actor on drop, so the child actor is torn down
/// whether the sub-workflow run returns normally, errors, or unwinds.
pub struct ChildActorGuard {
    system: Arc<ActorSystem>,
    name: String,
}

impl ChildActorGuard {
    pub fn new(system: Arc<ActorSystem>, name: String) -> Self {
        Self { system, name }
    }
}

impl Drop for ChildActorGuard {
    fn drop(&mut self) {
        self.system.remove_actor(&self.name);
    }
}

/// Wraps an `Interpreter` so it can be registered as an actor and invoked
/// with `call`/`apply` like any other dispatch target.
pub struct InterpreterActor {
    inner: Interpreter,
}

impl InterpreterActor {
    pub fn new(inner: Interpreter) -> Self {
        Self { inner }
    }
}

#[derive(Deserialize)]
struct ApplyArgs {
    actor: String,
    method: String,
    #[serde(default)]
    arguments: Arguments,
}

fn parse_call_args(args: &str) -> Result<String, String> {
    let value: serde_json::Value =
        serde_json::from_str(args).map_err(|e| format!("bad call arguments: {e}"))?;
    match value {
        serde_json::Value::Array(items) if items.len() == 1 => items[0]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| "call expects a single string argument".to_string()),
        _ => Err("call expects a single string argument".to_string()),
    }
}

#[async_trait]
impl ActionDispatch for InterpreterActor {
    async fn dispatch(&self, action_name: &str, args: &str) -> ActionResult {
        match action_name {
            "call" => match parse_call_args(args) {
                Ok(file) => self
                    .inner
                    .call(&file)
                    .await
                    .unwrap_or_else(|e| ActionResult::failure(e.to_string())),
                Err(e) => ActionResult::failure(e),
            },
            "apply" => match serde_json::from_str::<ApplyArgs>(args) {
                Ok(a) => self
                    .inner
                    .apply(&a.actor, &a.method, &a.arguments)
                    .await
                    .unwrap_or_else(|e| ActionResult::failure(e.to_string())),
                Err(e) => ActionResult::failure(format!("bad apply arguments: {e}")),
            },
            other => ActionResult::failure(format!("interpreter actor has no method '{other}'")),
        }
    }
}
