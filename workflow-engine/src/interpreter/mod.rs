//! The automaton engine: `Interpreter` steps through a loaded
//! `WorkflowModel` one transition at a time, dispatching each transition's
//! actions to the attached `ActorSystem` (spec.md §4.4), and exposes
//! sub-workflow `call` (§4.5) and wildcard `apply` (§4.6).

mod subworkflow;

pub use subworkflow::InterpreterActor;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::action::{Action, ActionResult, Execution};
use crate::actor::{ActorNode, ActorSystem, ROOT};
use crate::arguments::Arguments;
use crate::error::{WorkflowError, WorkflowResult};
use crate::parser::{json, parse_auto, xml, yaml};
use crate::pattern::{matches_pattern, BuiltinEvaluator, ExpressionEvaluator};
use crate::workflow::WorkflowModel;

/// The initial and only well-known accepting state name, per spec.md §4.4.
pub const END_STATE: &str = "end";

/// One loaded workflow's run state: current state label, the index the
/// next search starts from, and the loaded program itself.
pub struct Interpreter {
    actor_system: Arc<ActorSystem>,
    code: Option<WorkflowModel>,
    current_state: String,
    current_index: usize,
    self_actor_name: Option<String>,
    resource_root: Option<PathBuf>,
    workflow_base_dir: Option<PathBuf>,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl Interpreter {
    pub fn new(actor_system: Arc<ActorSystem>) -> Self {
        Self {
            actor_system,
            code: None,
            current_state: "0".to_string(),
            current_index: 0,
            self_actor_name: None,
            resource_root: None,
            workflow_base_dir: None,
            evaluator: Arc::new(BuiltinEvaluator),
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn set_self_actor(&mut self, name: impl Into<String>) {
        self.self_actor_name = Some(name.into());
    }

    pub fn set_resource_root(&mut self, root: impl Into<PathBuf>) {
        self.resource_root = Some(root.into());
    }

    pub fn set_workflow_base_dir(&mut self, dir: impl Into<PathBuf>) {
        self.workflow_base_dir = Some(dir.into());
    }

    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    pub fn is_loaded(&self) -> bool {
        self.code.is_some()
    }

    /// Rewinds to the start state without discarding the loaded program.
    pub fn reset(&mut self) {
        self.current_state = "0".to_string();
        self.current_index = 0;
    }

    pub fn load_yaml(&mut self, contents: &str) -> WorkflowResult<()> {
        self.code = Some(yaml::parse(contents)?);
        self.reset();
        Ok(())
    }

    pub fn load_json(&mut self, contents: &str) -> WorkflowResult<()> {
        self.code = Some(json::parse(contents)?);
        self.reset();
        Ok(())
    }

    pub fn load_xml(&mut self, contents: &str) -> WorkflowResult<()> {
        self.code = Some(xml::parse(contents)?);
        self.reset();
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path) -> WorkflowResult<()> {
        let contents = fs::read_to_string(path)?;
        self.code = Some(parse_auto(&contents, Some(path))?);
        self.reset();
        Ok(())
    }

    /// Loads a workflow composed from an overlay directory (spec.md §4.3),
    /// resolving `file` against the composed output's file names via the
    /// lookup priority rules.
    pub fn load_with_overlay(&mut self, file: &str, overlay_dir: &Path) -> WorkflowResult<()> {
        let composed = crate::overlay::compose(overlay_dir)?;
        let names: Vec<String> = composed.keys().cloned().collect();
        let resolved = crate::overlay::lookup::resolve(file, &names)
            .ok_or_else(|| WorkflowError::other(format!("overlay has no workflow matching '{file}'")))?;
        let model = composed
            .get(resolved)
            .expect("resolved name came from the composed map's own keys")
            .clone();
        self.code = Some(model);
        self.reset();
        Ok(())
    }

    /// Resolves `file` in search-path order: resource root, then
    /// workflow base directory, then the path as given.
    fn resolve_workflow_path(&self, file: &str) -> WorkflowResult<PathBuf> {
        if let Some(root) = &self.resource_root {
            let candidate = root.join(file);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        if let Some(base) = &self.workflow_base_dir {
            let candidate = base.join(file);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        let verbatim = PathBuf::from(file);
        if verbatim.is_file() {
            return Ok(verbatim);
        }
        Err(WorkflowError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("workflow file not found: {file}"),
        )))
    }

    pub fn load_workflow(&mut self, file: &str) -> WorkflowResult<()> {
        let path = self.resolve_workflow_path(file)?;
        self.load_file(&path)
    }

    /// Loads and runs `file` to completion (or failure), per spec.md §5.
    pub async fn run_workflow(&mut self, file: &str, max_iterations: usize) -> WorkflowResult<ActionResult> {
        self.load_workflow(file)?;
        self.run_until_end(max_iterations).await
    }

    /// Executes a single automaton step: search the transition list
    /// starting at `current_index`, wrapping around once, for the first
    /// transition whose `from_pattern` matches `current_state`. Runs its
    /// actions in declared order; on full success, advances
    /// `current_state`/`current_index`. On any action failure, or if no
    /// transition matches, the engine's own state is left untouched so a
    /// caller can retry or inspect it.
    #[instrument(skip(self), fields(state = %self.current_state))]
    pub async fn exec_code(&mut self) -> WorkflowResult<ActionResult> {
        let code = self.code.as_ref().ok_or(WorkflowError::NoCodeLoaded)?;
        let n = code.transitions.len();
        if n == 0 {
            return Ok(ActionResult::failure("no matching state transition"));
        }

        for offset in 0..n {
            let idx = (self.current_index + offset) % n;
            let transition = &code.transitions[idx];
            if !matches_pattern(
                Some(transition.from_pattern()),
                Some(&self.current_state),
                self.evaluator.as_ref(),
            ) {
                continue;
            }

            let actions = transition.actions.clone();
            let to_state = transition.to_state().to_string();
            debug!(from = transition.from_pattern(), to = %to_state, "transition matched");

            let result = self.execute_actions(&actions).await?;
            if result.success {
                self.current_state = to_state;
                self.current_index = (idx + 1) % n;
            } else {
                warn!(payload = %result.payload, "transition actions failed");
            }
            return Ok(result);
        }

        Ok(ActionResult::failure("no matching state transition"))
    }

    async fn execute_actions(&self, actions: &[Action]) -> WorkflowResult<ActionResult> {
        let mut last = ActionResult::ok_empty();

        for action in actions {
            let targets = self.resolve_action_targets(&action.actor)?;
            if targets.is_empty() {
                return Ok(ActionResult::failure(format!("unknown actor: {}", action.actor)));
            }

            let args = action.arguments.serialize();
            for actor in &targets {
                let result = self.dispatch_one(actor.clone(), &action.method, args.clone(), action.execution).await?;
                if !result.success {
                    return Ok(result);
                }
                last = result;
            }
        }

        Ok(last)
    }

    /// Resolves an action's actor target(s), per spec.md §4.4 step 1: with a
    /// self-actor set, resolve relative to it; else a wildcard pattern is
    /// searched against every registered actor system-wide; else it's an
    /// absolute name looked up directly.
    fn resolve_action_targets(&self, actor_pattern: &str) -> WorkflowResult<Vec<Arc<ActorNode>>> {
        if let Some(from) = self.self_actor_name.as_deref() {
            return self.actor_system.resolve_actor_path(from, actor_pattern);
        }

        if actor_pattern.contains('*') {
            let regex = crate::actor::wildcard_to_regex(actor_pattern);
            let mut matched: Vec<Arc<ActorNode>> = self
                .actor_system
                .list_actor_names()
                .into_iter()
                .filter(|name| regex.is_match(name))
                .filter_map(|name| self.actor_system.get_actor(&name))
                .collect();
            matched.sort_by(|a, b| a.name().cmp(b.name()));
            return Ok(matched);
        }

        Ok(self.actor_system.get_actor(actor_pattern).into_iter().collect())
    }

    async fn dispatch_one(
        &self,
        actor: Arc<ActorNode>,
        method: &str,
        args: String,
        execution: Execution,
    ) -> WorkflowResult<ActionResult> {
        let method = method.to_string();
        match execution {
            Execution::Direct => Ok(actor.dispatch(&method, &args).await),
            Execution::Pool => {
                self.actor_system
                    .scheduler()
                    .submit(async move { actor.dispatch(&method, &args).await })
                    .await
            }
        }
    }

    /// Repeatedly steps the automaton until it reaches the accepting
    /// `"end"` state, a step fails, or `max_iterations` steps have run
    /// without reaching either (spec.md §4.4/§9).
    pub async fn run_until_end(&mut self, max_iterations: usize) -> WorkflowResult<ActionResult> {
        let mut last = ActionResult::ok_empty();
        for _ in 0..max_iterations {
            last = self.exec_code().await?;
            if !last.success || self.current_state == END_STATE {
                return Ok(last);
            }
        }
        Err(WorkflowError::MaxIterationsExceeded(max_iterations))
    }

    /// Runs `file` as a sub-workflow: creates a short-lived child actor,
    /// loads and runs the sub-workflow to completion, then unconditionally
    /// removes the child actor, per spec.md §4.5.
    pub async fn call(&self, file: &str) -> WorkflowResult<ActionResult> {
        let child_name = subworkflow::generate_child_name(file);
        let parent = self.self_actor_name.clone().unwrap_or_else(|| ROOT.to_string());
        self.actor_system
            .add_actor(ActorNode::new(child_name.clone(), crate::actor::ActorPayload::None).with_parent(parent));
        let _guard = subworkflow::ChildActorGuard::new(self.actor_system.clone(), child_name.clone());

        let mut child = Interpreter {
            actor_system: self.actor_system.clone(),
            code: None,
            current_state: "0".to_string(),
            current_index: 0,
            self_actor_name: Some(child_name),
            resource_root: self.resource_root.clone(),
            workflow_base_dir: self.workflow_base_dir.clone(),
            evaluator: self.evaluator.clone(),
        };

        child.run_workflow(file, 1000).await
    }

    /// Dispatches `method`/`arguments` to every actor matched by resolving
    /// `actor_pattern` from this interpreter's own actor, in declared
    /// order, stopping at the first failure (spec.md §4.6).
    pub async fn apply(&self, actor_pattern: &str, method: &str, arguments: &Arguments) -> WorkflowResult<ActionResult> {
        let from = self.self_actor_name.as_deref().unwrap_or(ROOT);
        let targets = self.actor_system.resolve_actor_path(from, actor_pattern)?;
        if targets.is_empty() {
            return Ok(ActionResult::failure(format!(
                "apply matched no actors for pattern '{actor_pattern}'"
            )));
        }

        let args = arguments.serialize();
        let mut applied = Vec::with_capacity(targets.len());
        for actor in &targets {
            let result = actor.dispatch(method, &args).await;
            if !result.success {
                return Ok(result);
            }
            applied.push(actor.name().to_string());
        }

        Ok(ActionResult::success(format!(
            "Applied to {} actors: [{}]",
            applied.len(),
            applied.join(", ")
        )))
    }
}
