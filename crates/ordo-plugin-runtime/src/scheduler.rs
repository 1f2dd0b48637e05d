//! Dependency-ordered plugin setup
//!
//! The scheduler drains a working set of descriptors in passes. Each pass
//! visits every descriptor that was pending when the pass started: ready ones
//! are set up, waiting ones are requeued. A pass that sets up nothing means
//! the remaining plugins can never become ready, which is reported as a
//! dependency cycle.

use crate::closer::CloseEntry;
use crate::descriptor::PluginDescriptor;
use crate::error::{PluginRuntimeError, Result};
use crate::options::{SetupOptions, TimeoutPolicy};
use crate::resolver::{should_wait, StatusMap};
use ordo_plugin_api::{PluginError, ValueDecoder};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of a successful scheduling run
#[derive(Debug, Default)]
pub struct Schedule {
    /// Descriptors in the order their setup completed
    pub completed: Vec<PluginDescriptor>,

    /// Close entries of closeable plugins, in completion order
    pub closers: Vec<CloseEntry>,
}

/// Set up every descriptor, honoring dependencies
///
/// Stops at the first error; nothing set up so far is closed.
pub async fn run(descriptors: Vec<PluginDescriptor>, options: &SetupOptions) -> Result<Schedule> {
    let mut status: StatusMap = descriptors
        .iter()
        .map(|d| (d.key().to_string(), false))
        .collect();
    let mut pending: VecDeque<PluginDescriptor> = descriptors.into();
    let mut schedule = Schedule::default();
    let mut pass = 0usize;

    while !pending.is_empty() {
        pass += 1;
        let start_len = pending.len();
        debug!(pass, pending = start_len, "Starting setup pass");

        for _ in 0..start_len {
            let Some(descriptor) = pending.pop_front() else {
                break;
            };

            if should_wait(&descriptor, &status)? {
                debug!(plugin = %descriptor.key(), "Plugin waiting for dependencies");
                pending.push_back(descriptor);
                continue;
            }

            setup_with_timeout(&descriptor, options).await?;

            status.insert(descriptor.key().to_string(), true);
            if let Some(entry) = CloseEntry::from_descriptor(&descriptor) {
                schedule.closers.push(entry);
            }
            schedule.completed.push(descriptor);
        }

        if pending.len() == start_len {
            let stuck: Vec<&str> = pending.iter().map(PluginDescriptor::key).collect();
            error!(pass, plugins = ?stuck, "No plugin became ready");
            return Err(PluginRuntimeError::dependency_cycle(format!(
                "no progress after pass {pass}, waiting plugins: {}",
                stuck.join(", ")
            )));
        }
    }

    info!(
        plugins = schedule.completed.len(),
        passes = pass,
        "All plugins set up"
    );

    Ok(schedule)
}

/// Run one plugin's setup, bounded by the configured timeout
///
/// Setup runs on its own task. When the timer wins, the task is detached
/// (its result is dropped) or aborted, depending on the timeout policy.
pub async fn setup_with_timeout(descriptor: &PluginDescriptor, options: &SetupOptions) -> Result<()> {
    let key = descriptor.key().to_string();
    let factory = Arc::clone(&descriptor.factory);
    let name = descriptor.name.clone();
    let decoder = ValueDecoder::new(descriptor.config.clone());
    let started = Instant::now();

    let mut handle = tokio::spawn(async move { factory.setup(&name, &decoder).await });

    match tokio::time::timeout(options.setup_timeout, &mut handle).await {
        Ok(Ok(Ok(()))) => {
            info!(
                plugin = %key,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Plugin set up"
            );
            Ok(())
        }
        Ok(Ok(Err(source))) => {
            error!(plugin = %key, error = %source, "Plugin setup failed");
            Err(PluginRuntimeError::SetupFailed { key, source })
        }
        Ok(Err(join_error)) => {
            error!(plugin = %key, error = %join_error, "Plugin setup task failed");
            Err(PluginRuntimeError::SetupFailed {
                key,
                source: PluginError::runtime(format!("setup task failed: {join_error}")),
            })
        }
        Err(_) => {
            if options.timeout_policy == TimeoutPolicy::Abort {
                handle.abort();
            }
            warn!(
                plugin = %key,
                timeout_ms = options.setup_timeout.as_millis() as u64,
                policy = ?options.timeout_policy,
                "Plugin setup timed out"
            );
            Err(PluginRuntimeError::SetupTimeout {
                key,
                timeout: options.setup_timeout,
            })
        }
    }
}
