//! In-memory doubles for the lifecycle collaborators.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use che_core::CommandOutput;

use crate::chectl::LifecycleCli;
use crate::cluster::{ClusterQuery, PodSelector};
use crate::error::{LifecycleError, Result};
use crate::sink::OutputSink;

/// A call recorded by [`ScriptedCli`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCall {
    CreateAndStart(String),
    List,
    Stop(String),
}

/// Replays canned stdout for each command. `None` makes the command fail.
#[derive(Debug)]
pub struct ScriptedCli {
    pub create_stdout: Option<String>,
    pub list_stdout: Option<String>,
    pub stop_succeeds: bool,
    calls: Mutex<Vec<CliCall>>,
}

impl ScriptedCli {
    pub fn new(create_stdout: &str, list_stdout: &str) -> Self {
        Self {
            create_stdout: Some(create_stdout.to_string()),
            list_stdout: Some(list_stdout.to_string()),
            stop_succeeds: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<CliCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: CliCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn reply(command: &str, stdout: Option<&String>) -> Result<CommandOutput> {
        match stdout {
            Some(stdout) => Ok(CommandOutput::success(stdout.clone())),
            None => Err(LifecycleError::CommandFailed {
                command: format!("chectl {command}"),
                code: Some(1),
                output: format!("{command} failed"),
            }),
        }
    }
}

#[async_trait]
impl LifecycleCli for ScriptedCli {
    async fn create_and_start(&self, devfile: &str) -> Result<CommandOutput> {
        self.record(CliCall::CreateAndStart(devfile.to_string()));
        Self::reply("workspace:create", self.create_stdout.as_ref())
    }

    async fn list(&self) -> Result<CommandOutput> {
        self.record(CliCall::List);
        Self::reply("workspace:list", self.list_stdout.as_ref())
    }

    async fn stop(&self, workspace_id: &str) -> Result<CommandOutput> {
        self.record(CliCall::Stop(workspace_id.to_string()));
        let stdout = self.stop_succeeds.then(|| format!("Workspace {workspace_id} stopped\n"));
        Self::reply("workspace:stop", stdout.as_ref())
    }
}

/// Answers pod counts from a queue, then repeats `fallback`.
#[derive(Debug)]
pub struct SequenceCluster {
    counts: Mutex<VecDeque<usize>>,
    fallback: usize,
    queries: Mutex<Vec<PodSelector>>,
}

impl SequenceCluster {
    pub fn new(counts: impl IntoIterator<Item = usize>, fallback: usize) -> Self {
        Self {
            counts: Mutex::new(counts.into_iter().collect()),
            fallback,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Always reports `count` pods.
    pub fn constant(count: usize) -> Self {
        Self::new([], count)
    }

    pub fn queries(&self) -> Vec<PodSelector> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ClusterQuery for SequenceCluster {
    async fn count_pods(&self, selector: &PodSelector) -> Result<usize> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(selector.clone());
        }
        let next = self
            .counts
            .lock()
            .ok()
            .and_then(|mut counts| counts.pop_front());
        Ok(next.unwrap_or(self.fallback))
    }
}

/// Keeps every line and output it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    infos: Mutex<Vec<String>>,
    outputs: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().map(|i| i.clone()).unwrap_or_default()
    }

    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl OutputSink for RecordingSink {
    fn info(&self, message: &str) {
        if let Ok(mut infos) = self.infos.lock() {
            infos.push(message.to_string());
        }
    }

    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        if let Ok(mut outputs) = self.outputs.lock() {
            outputs.push((name.to_string(), value.to_string()));
        }
        Ok(())
    }
}
