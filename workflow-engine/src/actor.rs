//! The named, hierarchical actor registry: `ActorNode`, `ActorPayload` and
//! `ActorSystem`, including Unix-style relative path resolution.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use regex::Regex;

use crate::action::{ActionDispatch, ActionResult};
use crate::error::{WorkflowError, WorkflowResult};
use crate::scheduler::Scheduler;

/// The distinguished top-level actor, parentless by construction.
pub const ROOT: &str = "ROOT";

/// A closed tagged variant covering the actor kinds this crate ships,
/// plus a `Foreign` arm for externally-constructed payloads (the dynamic
/// actor loader of spec.md §6 is out of scope here, but the seam it would
/// plug into is this variant).
#[derive(Clone)]
pub enum ActorPayload {
    /// A stateless, function-backed actor (the common case).
    Plain(Arc<dyn ActionDispatch>),
    /// A payload constructed outside this crate (e.g. by a plugin loader)
    /// that still satisfies `ActionDispatch`.
    Foreign(Arc<dyn ActionDispatch>),
    /// No payload: the node exists purely as a tree vertex (used for ROOT
    /// and for grouping parents that never receive a dispatch).
    None,
}

#[async_trait]
impl ActionDispatch for ActorPayload {
    async fn dispatch(&self, action_name: &str, args: &str) -> ActionResult {
        match self {
            ActorPayload::Plain(d) | ActorPayload::Foreign(d) => d.dispatch(action_name, args).await,
            ActorPayload::None => {
                ActionResult::failure(format!("actor has no payload for action '{action_name}'"))
            }
        }
    }
}

/// A named vertex in the actor tree.
pub struct ActorNode {
    name: String,
    parent_name: RwLock<Option<String>>,
    children: RwLock<Vec<String>>,
    payload: ActorPayload,
}

impl ActorNode {
    pub fn new(name: impl Into<String>, payload: ActorPayload) -> Self {
        Self {
            name: name.into(),
            parent_name: RwLock::new(None),
            children: RwLock::new(Vec::new()),
            payload,
        }
    }

    pub fn with_parent(self, parent_name: impl Into<String>) -> Self {
        *self.parent_name.write() = Some(parent_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_name(&self) -> Option<String> {
        self.parent_name.read().clone()
    }

    pub fn children(&self) -> Vec<String> {
        self.children.read().clone()
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.read().iter().any(|c| c == name)
    }

    fn add_child(&self, name: &str) {
        let mut children = self.children.write();
        if !children.iter().any(|c| c == name) {
            children.push(name.to_string());
        }
    }

    fn remove_child(&self, name: &str) {
        self.children.write().retain(|c| c != name);
    }

    pub async fn dispatch(&self, action_name: &str, args: &str) -> ActionResult {
        self.payload.dispatch(action_name, args).await
    }
}

/// Process-wide registry mapping actor name -> `ActorNode`, plus the
/// scheduler pool shared by every interpreter attached to this system.
pub struct ActorSystem {
    actors: DashMap<String, Arc<ActorNode>>,
    scheduler: Scheduler,
}

impl ActorSystem {
    pub fn new() -> Self {
        Self::with_scheduler(Scheduler::new(num_cpus()))
    }

    pub fn with_scheduler(scheduler: Scheduler) -> Self {
        let actors = DashMap::new();
        actors.insert(ROOT.to_string(), Arc::new(ActorNode::new(ROOT, ActorPayload::None)));
        Self { actors, scheduler }
    }

    pub fn builder() -> ActorSystemBuilder {
        ActorSystemBuilder { scheduler_threads: num_cpus() }
    }

    /// Registers `node`. If it has no declared parent and isn't `ROOT`
    /// itself, it becomes a child of `ROOT`. Collision on the registry key
    /// is last-write-wins, per spec.md §4.1.
    pub fn add_actor(&self, node: ActorNode) -> Arc<ActorNode> {
        let node = if node.parent_name().is_none() && node.name() != ROOT {
            node.with_parent(ROOT)
        } else {
            node
        };

        if let Some(parent_name) = node.parent_name() {
            if let Some(parent) = self.get_actor(&parent_name) {
                parent.add_child(node.name());
            }
        }

        let arc = Arc::new(node);
        self.actors.insert(arc.name().to_string(), arc.clone());
        arc
    }

    pub fn get_actor(&self, name: &str) -> Option<Arc<ActorNode>> {
        self.actors.get(name).map(|r| r.clone())
    }

    pub fn has_actor(&self, name: &str) -> bool {
        self.actors.contains_key(name)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Deregisters `name`. Descendants remain reachable only by direct
    /// lookup; there is no cascading removal (spec.md §4.1).
    pub fn remove_actor(&self, name: &str) -> Option<Arc<ActorNode>> {
        let (_, removed) = self.actors.remove(name)?;
        if let Some(parent_name) = removed.parent_name() {
            if let Some(parent) = self.get_actor(&parent_name) {
                parent.remove_child(name);
            }
        }
        Some(removed)
    }

    pub fn list_actor_names(&self) -> Vec<String> {
        self.actors.iter().map(|e| e.key().clone()).collect()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Unix-style relative path resolution, per spec.md §4.1.
    pub fn resolve_actor_path(&self, from_name: &str, path: &str) -> WorkflowResult<Vec<Arc<ActorNode>>> {
        let from = self
            .get_actor(from_name)
            .ok_or_else(|| WorkflowError::UnknownActor(from_name.to_string()))?;

        if path == "." || path == "this" {
            return Ok(vec![from]);
        }

        if path == ".." {
            return Ok(self.parent_of(&from).into_iter().collect());
        }

        if let Some(rest) = path.strip_prefix("./") {
            return Ok(self.search_children(&from, rest));
        }

        if let Some(rest) = path.strip_prefix("../") {
            return Ok(match self.parent_of(&from) {
                Some(parent) => self.search_children(&parent, rest),
                None => vec![],
            });
        }

        Ok(self.get_actor(path).into_iter().collect())
    }

    fn parent_of(&self, node: &Arc<ActorNode>) -> Option<Arc<ActorNode>> {
        node.parent_name().and_then(|p| self.get_actor(&p))
    }

    fn search_children(&self, scope: &Arc<ActorNode>, pattern: &str) -> Vec<Arc<ActorNode>> {
        if pattern == "*" {
            return scope
                .children()
                .iter()
                .filter_map(|n| self.get_actor(n))
                .collect();
        }

        if pattern.contains('*') {
            let re = wildcard_to_regex(pattern);
            return scope
                .children()
                .iter()
                .filter(|n| re.is_match(n))
                .filter_map(|n| self.get_actor(n))
                .collect();
        }

        if scope.has_child(pattern) {
            self.get_actor(pattern).into_iter().collect()
        } else {
            vec![]
        }
    }
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ActorSystemBuilder {
    scheduler_threads: usize,
}

impl ActorSystemBuilder {
    pub fn scheduler_threads(mut self, n: usize) -> Self {
        self.scheduler_threads = n;
        self
    }

    pub fn build(self) -> ActorSystem {
        ActorSystem::with_scheduler(Scheduler::new(self.scheduler_threads))
    }
}

/// Translates a `*`-wildcard pattern into an anchored regex: `*` is the
/// greedy match, every other regex metacharacter in the pattern is escaped.
pub fn wildcard_to_regex(pattern: &str) -> Regex {
    let escaped: Vec<String> = pattern.split('*').map(regex::escape).collect();
    let body = escaped.join(".*");
    Regex::new(&format!("^{body}$")).unwrap_or_else(|_| Regex::new("$^").expect("empty regex is valid"))
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
