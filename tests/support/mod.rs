//! In-memory mock collaborators for engine behavior tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dockyard::{
    Balancer, ContainerDetail, DockyardError, EnvMap, ExportContext, Instance, InstanceKind,
    Manifest, MountSpec, ResolvedMount, Result, Scalable, ScaleOptions, System, Tracker,
    TrackerEvent,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A system backed by an in-memory instance list.
pub struct MockSystem {
    name: String,
    namespace: String,
    manifest_dir: PathBuf,
    scalable: Scalable,
    depends: Mutex<Vec<Arc<dyn System>>>,
    mounts: Mutex<BTreeMap<String, MountSpec>>,
    remote_mounts: Mutex<BTreeMap<String, ResolvedMount>>,
    pull_remote: AtomicBool,
    export_envs: EnvMap,
    instances: Mutex<Vec<Instance>>,
    next_id: AtomicUsize,
    /// Simulate the fetch command landing its output file on run_once.
    touch_output_on_run_once: bool,
    /// Make every run_once call fail, for error-path tests.
    fail_run_once: bool,

    // Recorded interactions
    pub launches: Mutex<Vec<ScaleOptions>>,
    pub stops: Mutex<Vec<(Vec<String>, bool)>>,
    pub run_once_calls: Mutex<Vec<Vec<String>>>,
    pub seen_contexts: Mutex<Vec<ExportContext>>,
    pub journal: Mutex<Option<Arc<Mutex<Vec<String>>>>>,
}

impl MockSystem {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: "test.dockyard.io".to_string(),
            manifest_dir: PathBuf::from("/projects/app"),
            scalable: Scalable::default(),
            depends: Mutex::new(Vec::new()),
            mounts: Mutex::new(BTreeMap::new()),
            remote_mounts: Mutex::new(BTreeMap::new()),
            pull_remote: AtomicBool::new(false),
            export_envs: EnvMap::new(),
            instances: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(0),
            touch_output_on_run_once: false,
            fail_run_once: false,
            launches: Mutex::new(Vec::new()),
            stops: Mutex::new(Vec::new()),
            run_once_calls: Mutex::new(Vec::new()),
            seen_contexts: Mutex::new(Vec::new()),
            journal: Mutex::new(None),
        }
    }

    pub fn with_scalable(mut self, default: u32, limit: i64) -> Self {
        self.scalable = Scalable { default, limit };
        self
    }

    pub fn with_manifest_dir(mut self, dir: &Path) -> Self {
        self.manifest_dir = dir.to_path_buf();
        self
    }

    pub fn with_export_envs(mut self, envs: EnvMap) -> Self {
        self.export_envs = envs;
        self
    }

    pub fn with_mounts(self, mounts: BTreeMap<String, MountSpec>) -> Self {
        *self.mounts.lock().unwrap() = mounts;
        self
    }

    pub fn with_remote_mounts(self, mounts: BTreeMap<String, ResolvedMount>) -> Self {
        *self.remote_mounts.lock().unwrap() = mounts;
        self
    }

    pub fn with_pull_remote(self, value: bool) -> Self {
        self.pull_remote.store(value, Ordering::SeqCst);
        self
    }

    pub fn touching_run_once_output(mut self) -> Self {
        self.touch_output_on_run_once = true;
        self
    }

    pub fn failing_run_once(mut self) -> Self {
        self.fail_run_once = true;
        self
    }

    pub fn add_depend(&self, depend: Arc<dyn System>) {
        self.depends.lock().unwrap().push(depend);
    }

    pub fn set_journal(&self, journal: Arc<Mutex<Vec<String>>>) {
        *self.journal.lock().unwrap() = Some(journal);
    }

    /// Pre-populate running instances, as if launched earlier.
    pub fn seed_instances(&self, count: usize) {
        for _ in 0..count {
            self.spawn_instance();
        }
    }

    pub fn instance_ids(&self) -> Vec<String> {
        self.instances.lock().unwrap().iter().map(|i| i.id.clone()).collect()
    }

    fn spawn_instance(&self) -> Instance {
        let seq = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("{}-{}", self.name, seq);
        let instance = Instance::new(&id, &format!("{}.{}", self.name, seq));
        self.instances.lock().unwrap().push(instance.clone());
        instance
    }
}

#[async_trait]
impl System for MockSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    fn scalable(&self) -> Scalable {
        self.scalable
    }

    fn depends_instances(&self) -> Vec<Arc<dyn System>> {
        self.depends.lock().unwrap().clone()
    }

    fn mounts(&self) -> BTreeMap<String, MountSpec> {
        self.mounts.lock().unwrap().clone()
    }

    fn remote_mounts(&self) -> BTreeMap<String, ResolvedMount> {
        self.remote_mounts.lock().unwrap().clone()
    }

    fn pull_remote(&self) -> bool {
        self.pull_remote.load(Ordering::SeqCst)
    }

    fn set_pull_remote(&self, value: bool) {
        self.pull_remote.store(value, Ordering::SeqCst);
    }

    fn expand_export_envs(&self, context: &ExportContext) -> EnvMap {
        self.seen_contexts.lock().unwrap().push(context.clone());
        self.export_envs.clone()
    }

    async fn instances(&self, _kind: InstanceKind) -> Result<Vec<Instance>> {
        Ok(self.instances.lock().unwrap().clone())
    }

    async fn run_daemon(&self, options: &ScaleOptions) -> Result<Instance> {
        self.launches.lock().unwrap().push(options.clone());
        Ok(self.spawn_instance())
    }

    async fn stop(&self, instances: &[Instance], kill: bool) -> Result<()> {
        if let Some(journal) = self.journal.lock().unwrap().as_ref() {
            journal.lock().unwrap().push("stop".to_string());
        }
        let ids: Vec<String> = instances.iter().map(|i| i.id.clone()).collect();
        self.instances.lock().unwrap().retain(|i| !ids.contains(&i.id));
        self.stops.lock().unwrap().push((ids, kill));
        Ok(())
    }

    async fn run_once(
        &self,
        command: &[String],
        _extra_mounts: &BTreeMap<PathBuf, PathBuf>,
    ) -> Result<()> {
        self.run_once_calls.lock().unwrap().push(command.to_vec());
        if self.fail_run_once {
            return Err(DockyardError::Internal("exit status 6".to_string()));
        }
        if self.touch_output_on_run_once {
            // command shape: curl -sS -o <output> <url>
            if let Some(output) = command.get(3) {
                let path = PathBuf::from(output);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| DockyardError::IoError { path: parent.into(), source: e })?;
                }
                std::fs::write(&path, b"fetched")
                    .map_err(|e| DockyardError::IoError { path, source: e })?;
            }
        }
        Ok(())
    }
}

/// Inspector returning canned details per container ID.
#[derive(Default)]
pub struct MockInspector {
    details: Mutex<BTreeMap<String, ContainerDetail>>,
}

impl MockInspector {
    pub fn insert(&self, container_id: &str, detail: ContainerDetail) {
        self.details.lock().unwrap().insert(container_id.to_string(), detail);
    }
}

#[async_trait]
impl dockyard::DockerInspector for MockInspector {
    async fn inspect(&self, container_id: &str) -> Result<ContainerDetail> {
        Ok(self.details.lock().unwrap().get(container_id).cloned().unwrap_or_default())
    }
}

/// Balancer recording cleared systems.
#[derive(Default)]
pub struct MockBalancer {
    pub cleared: Mutex<Vec<String>>,
    pub journal: Mutex<Option<Arc<Mutex<Vec<String>>>>>,
}

impl MockBalancer {
    pub fn set_journal(&self, journal: Arc<Mutex<Vec<String>>>) {
        *self.journal.lock().unwrap() = Some(journal);
    }
}

#[async_trait]
impl Balancer for MockBalancer {
    async fn clear(&self, system: &dyn System) -> Result<()> {
        if let Some(journal) = self.journal.lock().unwrap().as_ref() {
            journal.lock().unwrap().push("clear".to_string());
        }
        self.cleared.lock().unwrap().push(system.name().to_string());
        Ok(())
    }
}

/// Tracker recording every event.
#[derive(Default)]
pub struct MockTracker {
    pub events: Mutex<Vec<(String, TrackerEvent)>>,
}

#[async_trait]
impl Tracker for MockTracker {
    async fn send_event(&self, category: &str, event: TrackerEvent) -> Result<()> {
        self.events.lock().unwrap().push((category.to_string(), event));
        Ok(())
    }
}

/// Tracker that always fails, for suppression tests.
pub struct FailingTracker;

#[async_trait]
impl Tracker for FailingTracker {
    async fn send_event(&self, _category: &str, _event: TrackerEvent) -> Result<()> {
        Err(DockyardError::Internal("analytics backend unreachable".to_string()))
    }
}

/// Manifest handing out one preset helper system.
pub struct MockManifest {
    pub helper: Arc<MockSystem>,
}

impl Manifest for MockManifest {
    fn system(&self, _name: &str, _throwaway: bool) -> Result<Arc<dyn System>> {
        Ok(self.helper.clone())
    }
}
