//! Deferred compilation of fallback components.
//!
//! The render pass never compiles. It queues a [`CompileJob`] and shows a
//! loading placeholder; jobs are drained later, either synchronously in idle
//! time ([`IdleScheduler::run_idle`]) or on tokio's blocking pool
//! (`BackgroundCompiler`, behind the `async` feature).
//!
//! Results are always cached because the cache is keyed by content. A result
//! whose node has since been removed or edited is discarded on arrival.

use crate::cache::{cache_key, ComponentCache};
use crate::compiler::{compile, CompileResult, RenderPlan};
use crate::environment::Environment;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use trellis_tree::{ElementNode, ElementTree};

#[derive(Debug, Clone)]
pub struct CompileJob {
    pub node_id: String,
    pub key: String,
    pub node: ElementNode,
}

impl CompileJob {
    pub fn new(node: &ElementNode) -> Self {
        let mut node = node.clone();
        node.clear_origin();
        Self {
            node_id: node.id.clone(),
            key: cache_key(&node),
            node,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Plan cached; the node should re-render
    Ready { node_id: String },
    /// Compile failed; the error is cached and renders inline
    Failed { node_id: String, message: String },
    /// The node is gone or changed since the job was queued
    Discarded { node_id: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdleReport {
    pub outcomes: Vec<JobOutcome>,
    pub remaining: usize,
}

impl IdleReport {
    pub fn ready(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                JobOutcome::Ready { node_id } | JobOutcome::Failed { node_id, .. } => {
                    Some(node_id.as_str())
                }
                JobOutcome::Discarded { .. } => None,
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct IdleScheduler {
    queue: VecDeque<CompileJob>,
    pending: HashSet<String>,
}

impl IdleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a job unless one with the same key is already waiting
    pub fn enqueue(&mut self, job: CompileJob) -> bool {
        if !self.pending.insert(job.key.clone()) {
            return false;
        }
        debug!(node_id = %job.node_id, "Queued component compile");
        self.queue.push_back(job);
        true
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains(key)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Hand every queued job to another executor
    pub fn drain(&mut self) -> Vec<CompileJob> {
        self.pending.clear();
        self.queue.drain(..).collect()
    }

    /// Compile queued jobs until `budget` is used up. At least one job runs per call.
    pub fn run_idle(
        &mut self,
        budget: Duration,
        env: &Environment,
        cache: &ComponentCache,
        tree: &ElementTree,
    ) -> IdleReport {
        let started = Instant::now();
        let mut report = IdleReport::default();

        while let Some(job) = self.queue.pop_front() {
            self.pending.remove(&job.key);
            let result = compile(&job.node, env);
            report.outcomes.push(complete_job(&job, result, cache, tree));

            if started.elapsed() >= budget {
                break;
            }
        }

        report.remaining = self.queue.len();
        report
    }

    pub fn run_all(&mut self, env: &Environment, cache: &ComponentCache, tree: &ElementTree) -> IdleReport {
        self.run_idle(Duration::MAX, env, cache, tree)
    }
}

/// Cache a finished compile and decide whether it still applies to `tree`
pub fn complete_job(
    job: &CompileJob,
    result: CompileResult<RenderPlan>,
    cache: &ComponentCache,
    tree: &ElementTree,
) -> JobOutcome {
    let message = result.as_ref().err().map(ToString::to_string);
    cache.insert(job.key.clone(), result.map(Arc::new));

    let current = tree.find(&job.node_id);
    let stale = match current {
        None => {
            debug!(node_id = %job.node_id, "Discarding compile result, node was removed");
            true
        }
        Some(node) if cache_key(node) != job.key => {
            debug!(node_id = %job.node_id, "Discarding compile result, node changed");
            true
        }
        Some(_) => false,
    };

    if stale {
        return JobOutcome::Discarded {
            node_id: job.node_id.clone(),
        };
    }

    match message {
        Some(message) => {
            warn!(node_id = %job.node_id, error = %message, "Component compile failed");
            JobOutcome::Failed {
                node_id: job.node_id.clone(),
                message,
            }
        }
        None => JobOutcome::Ready {
            node_id: job.node_id.clone(),
        },
    }
}

#[cfg(feature = "async")]
pub use background::BackgroundCompiler;

#[cfg(feature = "async")]
mod background {
    use super::*;
    use tokio::task::spawn_blocking;

    /// Runs compile jobs on tokio's blocking pool
    pub struct BackgroundCompiler {
        env: Arc<Environment>,
        cache: Arc<ComponentCache>,
    }

    impl BackgroundCompiler {
        pub fn new(env: Arc<Environment>, cache: Arc<ComponentCache>) -> Self {
            Self { env, cache }
        }

        /// Compile every job concurrently; results come back in job order
        pub async fn compile_all(&self, jobs: Vec<CompileJob>) -> Vec<(CompileJob, CompileResult<RenderPlan>)> {
            let handles: Vec<_> = jobs
                .into_iter()
                .map(|job| {
                    let env = self.env.clone();
                    spawn_blocking(move || {
                        let result = compile(&job.node, &env);
                        (job, result)
                    })
                })
                .collect();

            let mut finished = Vec::with_capacity(handles.len());
            for handle in handles {
                match handle.await {
                    Ok(done) => finished.push(done),
                    Err(e) => warn!(error = %e, "Compile task did not finish"),
                }
            }
            finished
        }

        /// Apply finished compiles against the tree as it is now
        pub fn apply(
            &self,
            finished: Vec<(CompileJob, CompileResult<RenderPlan>)>,
            tree: &ElementTree,
        ) -> Vec<JobOutcome> {
            finished
                .into_iter()
                .map(|(job, result)| complete_job(&job, result, &self.cache, tree))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_tree::{ComponentInfo, ImportType};

    fn icon(id: &str) -> ElementNode {
        ElementNode::new(id, "Icons.Home").with_component(ComponentInfo {
            is_component: true,
            package_name: "lucide-react".to_string(),
            import_name: "Home".to_string(),
            import_type: ImportType::Namespace,
        })
    }

    fn tree_with(node: ElementNode) -> ElementTree {
        ElementTree::from_root(ElementNode::root().with_child(node)).unwrap()
    }

    #[test]
    fn test_enqueue_deduplicates() {
        let mut scheduler = IdleScheduler::new();
        assert!(scheduler.enqueue(CompileJob::new(&icon("a"))));
        assert!(!scheduler.enqueue(CompileJob::new(&icon("a"))));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_run_idle_compiles_and_caches() {
        let node = icon("sched-a");
        let tree = tree_with(node.clone());
        let cache = ComponentCache::new();
        let mut scheduler = IdleScheduler::new();
        scheduler.enqueue(CompileJob::new(&node));

        let report = scheduler.run_all(&Environment::standard(), &cache, &tree);
        assert_eq!(report.ready(), vec!["sched-a"]);
        assert_eq!(report.remaining, 0);
        assert!(matches!(cache.get(&cache_key(&node)), Some(Ok(_))));
    }

    #[test]
    fn test_stale_result_is_discarded_but_cached() {
        let node = icon("sched-b");
        let cache = ComponentCache::new();
        let mut scheduler = IdleScheduler::new();
        scheduler.enqueue(CompileJob::new(&node));

        // Node edited before the job ran
        let tree = tree_with(node.clone().with_class("text-red-500"));
        let report = scheduler.run_all(&Environment::standard(), &cache, &tree);

        assert_eq!(
            report.outcomes,
            vec![JobOutcome::Discarded {
                node_id: "sched-b".to_string()
            }]
        );
        assert!(cache.contains(&cache_key(&node)));
    }

    #[test]
    fn test_zero_budget_runs_one_job() {
        let cache = ComponentCache::new();
        let tree = tree_with(icon("x"));
        let mut scheduler = IdleScheduler::new();
        scheduler.enqueue(CompileJob::new(&icon("x")));
        scheduler.enqueue(CompileJob::new(&icon("y")));

        let report = scheduler.run_idle(Duration::ZERO, &Environment::standard(), &cache, &tree);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.remaining, 1);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_background_compiler() {
        let node = icon("bg-a");
        let tree = tree_with(node.clone());
        let cache = Arc::new(ComponentCache::new());
        let compiler = BackgroundCompiler::new(Arc::new(Environment::standard()), cache.clone());

        let finished = compiler.compile_all(vec![CompileJob::new(&node)]).await;
        let outcomes = compiler.apply(finished, &tree);

        assert_eq!(
            outcomes,
            vec![JobOutcome::Ready {
                node_id: "bg-a".to_string()
            }]
        );
        assert!(cache.contains(&cache_key(&node)));
    }
}
