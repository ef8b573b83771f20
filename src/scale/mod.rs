//! Scaling engine.
//!
//! Computes desired-vs-actual daemon instance deltas for a system, enforces
//! scaling limits, resolves dependency chains (auto-starting them and
//! harvesting their exposed ports and environment), and launches or stops
//! containers to converge on the requested count.
//!
//! The engine keeps no counters of its own: every call re-measures live
//! container state, so retries after a partial failure are safe and
//! idempotent. Callers that need mutual exclusion per system must provide it
//! themselves.

use crate::balancer::Balancer;
use crate::docker::DockerInspector;
use crate::error::{DockyardError, Result};
use crate::events::{Event, EventBus};
use crate::system::System;
use crate::tracker::{self, Tracker, TrackerEvent};
use crate::types::system::{EnvMap, ExportContext, Instance, InstanceKind, NetInfo, ScaleOptions};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

/// Scaling engine for daemon instances of declared systems.
///
/// All collaborators are injected; the engine itself is stateless and cheap
/// to clone behind an `Arc`.
pub struct ScaleEngine {
    docker: Arc<dyn DockerInspector>,
    balancer: Arc<dyn Balancer>,
    events: EventBus,
    tracker: Arc<dyn Tracker>,
}

impl ScaleEngine {
    /// Create a new scaling engine.
    pub fn new(
        docker: Arc<dyn DockerInspector>,
        balancer: Arc<dyn Balancer>,
        events: EventBus,
        tracker: Arc<dyn Tracker>,
    ) -> Self {
        Self { docker, balancer, events, tracker }
    }

    /// Scale a system to its default instance count.
    pub async fn start(&self, system: &Arc<dyn System>, options: ScaleOptions) -> Result<i64> {
        let instances = system.scalable().default;
        self.scale(system, instances, options).await
    }

    /// Scale a system to exactly `instances` daemon containers.
    ///
    /// Returns the signed delta actually applied. A positive delta resolves
    /// dependencies first and launches sequentially; a negative delta stops
    /// the most-recently-listed instances in one batched call.
    ///
    /// The future is boxed because dependency resolution recurses back into
    /// `scale`.
    pub fn scale<'a>(
        &'a self,
        system: &'a Arc<dyn System>,
        instances: u32,
        mut options: ScaleOptions,
    ) -> BoxFuture<'a, Result<i64>> {
        let span = info_span!("scale", system = %system.name(), to = instances);
        async move {
            let containers = self.instances(system.as_ref()).await?;
            let from = containers.len();
            let delta = i64::from(instances) - from as i64;
            let to = (from as i64 + delta) as usize;

            // Protect not scalable systems. Checked before any mutation so
            // this path never leaves a partial launch behind.
            let limit = system.scalable().limit;
            if limit > 0 && delta > 0 && from as i64 + delta > limit {
                return Err(DockyardError::SystemNotScalable {
                    system: system.name().to_string(),
                    limit,
                });
            }

            if delta != 0 {
                self.events.publish(Event::scale(system.name(), from, to));
            }

            if delta > 0 {
                info!(from, to, "Scaling up");

                let deps_envs = self.check_depends_and_return_envs(system, &options, true).await?;
                // Explicit caller envs win on key conflict.
                let mut envs = deps_envs;
                envs.extend(options.envs.clone());
                options.envs = envs;

                for _ in 0..delta {
                    system.run_daemon(&options).await?;
                    // One-shot rebuild/pull applies only to the first new
                    // instance of the batch.
                    options.provision_force = false;
                    options.pull_remote = false;
                }
            } else if delta < 0 {
                info!(from, to, "Scaling down");

                let excess: Vec<Instance> =
                    containers.into_iter().rev().take(delta.unsigned_abs() as usize).collect();
                system.stop(&excess, options.kill).await?;
            } else {
                debug!(from, "Already at requested scale");
            }

            // Best-effort analytics; never escalated.
            if let Err(err) = self.track("scale", system.as_ref(), from, to).await {
                warn!(system = %system.name(), error = %err, "Analytics event failed");
            }

            Ok(delta)
        }
        .instrument(span)
        .boxed()
    }

    /// Clear balancer routing for a system, then stop all of its daemons.
    ///
    /// Routing must be withdrawn before teardown so traffic is never
    /// directed at dying containers. `kill` defaults to true.
    #[instrument(skip(self, system, kill), fields(system = %system.name()))]
    pub async fn kill_all(&self, system: &Arc<dyn System>, kill: Option<bool>) -> Result<()> {
        let kill = kill.unwrap_or(true);

        self.balancer.clear(system.as_ref()).await?;

        let instances = self.instances(system.as_ref()).await?;
        info!(count = instances.len(), kill, "Stopping all instances");
        system.stop(&instances, kill).await
    }

    /// Ensure every declared dependency has at least one running instance
    /// and return their merged exported environment.
    ///
    /// Dependencies are resolved strictly in declaration order: later ones
    /// may assume earlier ones are already up, and sequencing bounds the
    /// number of concurrent container starts. On key collision the later
    /// dependency wins.
    pub async fn check_depends_and_return_envs(
        &self,
        system: &Arc<dyn System>,
        options: &ScaleOptions,
        required: bool,
    ) -> Result<EnvMap> {
        let mut envs = EnvMap::new();

        for depend in system.depends_instances() {
            let mut instances = self.instances(depend.as_ref()).await?;

            if instances.is_empty() && required {
                if options.dependencies {
                    let scale_to = depend.scalable().default.max(1);
                    debug!(dependency = %depend.name(), scale_to, "Auto-starting dependency");
                    self.scale(&depend, scale_to, options.dependencies_options()).await?;
                    instances = self.instances(depend.as_ref()).await?;
                } else {
                    return Err(DockyardError::SystemDependError {
                        system: system.name().to_string(),
                        dependency: depend.name().to_string(),
                    });
                }
            }

            if !instances.is_empty() {
                envs.extend(self.get_envs(depend.as_ref(), &instances).await?);
            }
        }

        Ok(envs)
    }

    /// Harvest the exported environment of a system from its first instance.
    ///
    /// Reads the published port list and container environment via the
    /// Docker inspector, then passes both through the system's export-env
    /// expansion.
    pub async fn get_envs(&self, system: &dyn System, instances: &[Instance]) -> Result<EnvMap> {
        let Some(first) = instances.first() else {
            return Ok(EnvMap::new());
        };

        let detail = self.docker.inspect(&first.id).await?;
        let context =
            ExportContext { envs: detail.env_map(), net: NetInfo { port: detail.port_map() } };

        Ok(system.expand_export_envs(&context))
    }

    /// Current daemon instances of a system. Always a fresh query.
    pub async fn instances(&self, system: &dyn System) -> Result<Vec<Instance>> {
        system.instances(InstanceKind::Daemon).await
    }

    async fn track(&self, event_type: &str, system: &dyn System, from: usize, to: usize) -> Result<()> {
        let manifest_id = system.namespace();

        let mut event = TrackerEvent::new();
        event
            .add_data("event_type", event_type)
            .add_data("manifest_id", manifest_id)
            .add_data("from_num_containers", from as i64)
            .add_data("to_num_containers", to as i64)
            .add_data("hash_system", tracker::system_hash(manifest_id, system.name()));

        self.tracker.send_event("image", event).await
    }
}
