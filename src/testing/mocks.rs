//! Mock implementations of the collaborator traits.
//!
//! Builder-style configuration, call recording for assertions.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use walkdir::WalkDir;

use crate::agent::Agent;
use crate::error::Result;
use crate::tester::TestRunner;
use crate::vcs::Vcs;

// ============================================================================
// MockVcs
// ============================================================================

/// Mock version-control wrapper.
///
/// When created with [`MockVcs::tracking`], it snapshots every file under
/// the directory (ignoring `.git`) and makes `hard_reset` restore those
/// bytes, `clean_untracked` delete files outside the snapshot, and
/// `commit` fold the current tree into a new baseline - the same
/// optimistic-transaction semantics the real wrapper provides.
pub struct MockVcs {
    dirty: bool,
    commit_succeeds: bool,
    tracked_dir: Option<PathBuf>,
    baseline: Mutex<HashMap<PathBuf, Vec<u8>>>,
    rollbacks: AtomicU32,
    commits: Mutex<Vec<String>>,
    checkouts: Mutex<Vec<String>>,
}

impl Default for MockVcs {
    fn default() -> Self {
        Self {
            dirty: false,
            commit_succeeds: true,
            tracked_dir: None,
            baseline: Mutex::new(HashMap::new()),
            rollbacks: AtomicU32::new(0),
            commits: Mutex::new(Vec::new()),
            checkouts: Mutex::new(Vec::new()),
        }
    }
}

impl MockVcs {
    /// Create a mock with default behavior (clean tree, commits succeed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that tracks `dir` as its working tree.
    ///
    /// The current file contents become the first checkpoint.
    #[must_use]
    pub fn tracking(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let baseline = Self::capture(&dir);
        Self {
            tracked_dir: Some(dir),
            baseline: Mutex::new(baseline),
            ..Self::default()
        }
    }

    /// Report the working tree as dirty at preflight.
    #[must_use]
    pub fn with_dirty(mut self) -> Self {
        self.dirty = true;
        self
    }

    /// Make every commit attempt report failure.
    #[must_use]
    pub fn with_commit_failure(mut self) -> Self {
        self.commit_succeeds = false;
        self
    }

    /// Number of rollbacks performed.
    pub fn rollback_count(&self) -> u32 {
        self.rollbacks.load(Ordering::SeqCst)
    }

    /// Commit messages recorded, in order.
    pub fn commit_messages(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }

    /// Branches checked out, in order.
    pub fn checked_out(&self) -> Vec<String> {
        self.checkouts.lock().unwrap().clone()
    }

    fn capture(dir: &Path) -> HashMap<PathBuf, Vec<u8>> {
        let mut files = HashMap::new();
        for entry in WalkDir::new(dir)
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
            .filter_map(std::result::Result::ok)
        {
            if entry.file_type().is_file() {
                if let Ok(bytes) = std::fs::read(entry.path()) {
                    files.insert(entry.path().to_path_buf(), bytes);
                }
            }
        }
        files
    }
}

impl Vcs for MockVcs {
    fn is_dirty(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        Ok(self.checkouts.lock().unwrap().iter().any(|b| b == branch))
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.checkouts.lock().unwrap().push(branch.to_string());
        Ok(())
    }

    fn stage_all(&self) -> Result<()> {
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<bool> {
        if !self.commit_succeeds {
            return Ok(false);
        }
        self.commits.lock().unwrap().push(message.to_string());
        if let Some(dir) = &self.tracked_dir {
            // The speculative changes become the new checkpoint.
            *self.baseline.lock().unwrap() = Self::capture(dir);
        }
        Ok(true)
    }

    fn hard_reset(&self) -> Result<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        if self.tracked_dir.is_some() {
            for (path, bytes) in self.baseline.lock().unwrap().iter() {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, bytes)?;
            }
        }
        Ok(())
    }

    fn clean_untracked(&self) -> Result<()> {
        if let Some(dir) = &self.tracked_dir {
            let baseline = self.baseline.lock().unwrap();
            for (path, _) in Self::capture(dir) {
                if !baseline.contains_key(&path) {
                    let _ = std::fs::remove_file(&path);
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// MockAgent
// ============================================================================

type Effect = Box<dyn Fn() + Send + Sync>;

struct AgentStep {
    output: String,
    effect: Option<Effect>,
}

/// Scripted agent: each invocation pops the next step, applies its file
/// side effect (if any), and returns its canned output. Once the script
/// is exhausted, the fallback output is returned with no side effects.
pub struct MockAgent {
    steps: Mutex<VecDeque<AgentStep>>,
    fallback: String,
    calls: AtomicU32,
}

impl Default for MockAgent {
    fn default() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            fallback: String::new(),
            calls: AtomicU32::new(0),
        }
    }
}

impl MockAgent {
    /// Create an agent with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step that only returns `output`.
    #[must_use]
    pub fn then(self, output: &str) -> Self {
        self.steps.lock().unwrap().push_back(AgentStep {
            output: output.to_string(),
            effect: None,
        });
        self
    }

    /// Append a step that runs `effect` (simulated file edits) before
    /// returning `output`.
    #[must_use]
    pub fn then_with(self, output: &str, effect: impl Fn() + Send + Sync + 'static) -> Self {
        self.steps.lock().unwrap().push_back(AgentStep {
            output: output.to_string(),
            effect: Some(Box::new(effect)),
        });
        self
    }

    /// Output returned once the script is exhausted.
    #[must_use]
    pub fn with_fallback(mut self, output: &str) -> Self {
        self.fallback = output.to_string();
        self
    }

    /// Number of invocations so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for MockAgent {
    async fn run(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                if let Some(effect) = &step.effect {
                    effect();
                }
                Ok(step.output)
            }
            None => Ok(self.fallback.clone()),
        }
    }
}

// ============================================================================
// MockTestRunner
// ============================================================================

/// Scripted test runner: pops queued verdicts, then repeats the fallback.
pub struct MockTestRunner {
    verdicts: Mutex<VecDeque<bool>>,
    fallback: bool,
    calls: AtomicU32,
}

impl MockTestRunner {
    /// Runner that always passes.
    #[must_use]
    pub fn passing() -> Self {
        Self {
            verdicts: Mutex::new(VecDeque::new()),
            fallback: true,
            calls: AtomicU32::new(0),
        }
    }

    /// Runner that always fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            verdicts: Mutex::new(VecDeque::new()),
            fallback: false,
            calls: AtomicU32::new(0),
        }
    }

    /// Queue an explicit verdict ahead of the fallback.
    #[must_use]
    pub fn then(self, passes: bool) -> Self {
        self.verdicts.lock().unwrap().push_back(passes);
        self
    }

    /// Number of test runs so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TestRunner for MockTestRunner {
    fn run(&self) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.verdicts.lock().unwrap().pop_front();
        Ok(queued.unwrap_or(self.fallback))
    }
}
