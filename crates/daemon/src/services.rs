// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires configuration and backends into the three services.

use crate::config::Config;
use sluice_admission::{AdmissionController, CounterStore, MemoryCounterStore};
use sluice_core::{RunId, SystemClock};
use sluice_engine::{
    CacheInvalidator, ConfigResolver, ControlBus, DispatchDeps, Dispatcher, JobQueue,
    MemoryCacheInvalidator, MemoryControlBus, MemoryJobQueue, MemoryRunStore, RunStore,
    StaticConfigResolver,
};
use sluice_stream::{ChannelStore, ChannelWriter, MemoryChannelStore, StreamGateway};
use std::sync::Arc;

/// Model used when a job names none and no resolver overrides it.
pub const DEFAULT_MODEL: &str = "default";

/// External stores the services run against.
#[derive(Clone)]
pub struct Backends {
    /// Shared admission counter; `None` forces local admission
    pub counter: Option<Arc<dyn CounterStore>>,
    pub channels: Arc<dyn ChannelStore>,
    pub runs: Arc<dyn RunStore>,
    pub cache: Arc<dyn CacheInvalidator>,
    pub queue: Arc<dyn JobQueue>,
    pub resolver: Arc<dyn ConfigResolver>,
    pub control: Arc<dyn ControlBus>,
}

impl Backends {
    /// In-memory backends, plus typed handles for inspecting them.
    pub fn memory() -> (Self, MemoryBackends) {
        let memory = MemoryBackends::default();
        (memory.backends(), memory)
    }
}

/// Concrete in-memory stores behind [`Backends::memory`].
#[derive(Clone)]
pub struct MemoryBackends {
    pub counter: MemoryCounterStore,
    pub channels: MemoryChannelStore,
    pub runs: MemoryRunStore,
    pub cache: MemoryCacheInvalidator,
    pub queue: MemoryJobQueue,
    pub resolver: StaticConfigResolver,
    pub control: MemoryControlBus,
}

impl Default for MemoryBackends {
    fn default() -> Self {
        Self {
            counter: MemoryCounterStore::new(),
            channels: MemoryChannelStore::new(),
            runs: MemoryRunStore::new(),
            cache: MemoryCacheInvalidator::new(),
            queue: MemoryJobQueue::new(),
            resolver: StaticConfigResolver::new(DEFAULT_MODEL),
            control: MemoryControlBus::new(),
        }
    }
}

impl MemoryBackends {
    pub fn backends(&self) -> Backends {
        Backends {
            counter: Some(Arc::new(self.counter.clone())),
            channels: Arc::new(self.channels.clone()),
            runs: Arc::new(self.runs.clone()),
            cache: Arc::new(self.cache.clone()),
            queue: Arc::new(self.queue.clone()),
            resolver: Arc::new(self.resolver.clone()),
            control: Arc::new(self.control.clone()),
        }
    }
}

/// Admission, dispatch, and streaming for one process.
#[derive(Clone)]
pub struct Services {
    config: Config,
    admission: AdmissionController,
    dispatcher: Dispatcher<SystemClock>,
    gateway: StreamGateway,
}

impl Services {
    pub fn new(config: Config, backends: Backends) -> Self {
        let admission = AdmissionController::from_config(&config.admission, backends.counter);
        let dispatcher = Dispatcher::new(
            DispatchDeps {
                runs: backends.runs,
                cache: backends.cache,
                channels: Arc::clone(&backends.channels),
                queue: backends.queue,
                resolver: backends.resolver,
                control: backends.control,
            },
            SystemClock,
            config.gateway.channel_ttl(),
        );
        let gateway = StreamGateway::new(backends.channels, config.gateway.gateway_config());
        tracing::info!(
            admission = %admission.mode(),
            limit = admission.limit(),
            poll_wait_ms = config.gateway.poll_wait_ms,
            "services ready"
        );
        Self { config, admission, dispatcher, gateway }
    }

    pub fn in_memory(config: Config) -> Self {
        Self::new(config, Backends::memory().0)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn dispatcher(&self) -> &Dispatcher<SystemClock> {
        &self.dispatcher
    }

    pub fn gateway(&self) -> &StreamGateway {
        &self.gateway
    }

    /// Worker-side writer for a run's channel.
    pub fn writer(&self, run_id: RunId) -> ChannelWriter {
        self.dispatcher.writer(run_id)
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
