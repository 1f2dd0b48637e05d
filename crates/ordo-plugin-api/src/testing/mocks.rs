//! Mock implementations for testing

use crate::decoder::Decoder;
use crate::error::{PluginError, Result};
use crate::factory::{Closer, Depender, Factory, FinishNotifier, FlexDepender};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Lifecycle events recorded by mock factories, shared between mocks
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty call log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    /// All recorded events, oldest first
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Recorded events starting with `prefix`, with the prefix stripped
    pub fn events_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix(prefix).map(String::from))
            .collect()
    }
}

/// How a mock factory's setup behaves
#[derive(Debug, Clone)]
enum SetupBehavior {
    Succeed,
    Fail(String),
    Delay(Duration),
}

/// Mock plugin factory for testing
///
/// Events are recorded as `setup:<type>-<name>`, `finish:<type>-<name>` and
/// `close:<type>`.
#[derive(Debug, Clone)]
pub struct MockFactory {
    plugin_type: String,
    depends_on: Option<Vec<String>>,
    flex_depends_on: Option<Vec<String>>,
    closeable: bool,
    finish_notified: bool,
    setup_behavior: SetupBehavior,
    close_error: Option<String>,
    finish_error: Option<String>,
    decode_config: bool,
    configs: Arc<Mutex<Vec<serde_json::Value>>>,
    log: CallLog,
}

impl MockFactory {
    /// Create a new mock factory of the given type
    pub fn new(plugin_type: impl Into<String>) -> Self {
        Self {
            plugin_type: plugin_type.into(),
            depends_on: None,
            flex_depends_on: None,
            closeable: false,
            finish_notified: false,
            setup_behavior: SetupBehavior::Succeed,
            close_error: None,
            finish_error: None,
            decode_config: false,
            configs: Arc::new(Mutex::new(Vec::new())),
            log: CallLog::new(),
        }
    }

    /// Share a call log with other mocks
    pub fn with_log(mut self, log: &CallLog) -> Self {
        self.log = log.clone();
        self
    }

    /// Declare strong dependencies
    pub fn depends_on<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Declare weak dependencies
    pub fn flex_depends_on<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flex_depends_on = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Implement [`Closer`]
    pub fn closeable(mut self) -> Self {
        self.closeable = true;
        self
    }

    /// Implement [`Closer`], failing with `message`
    pub fn failing_close(mut self, message: impl Into<String>) -> Self {
        self.closeable = true;
        self.close_error = Some(message.into());
        self
    }

    /// Implement [`FinishNotifier`]
    pub fn finish_notified(mut self) -> Self {
        self.finish_notified = true;
        self
    }

    /// Implement [`FinishNotifier`], failing with `message`
    pub fn failing_finish(mut self, message: impl Into<String>) -> Self {
        self.finish_notified = true;
        self.finish_error = Some(message.into());
        self
    }

    /// Make setup return an error
    pub fn failing_setup(mut self, message: impl Into<String>) -> Self {
        self.setup_behavior = SetupBehavior::Fail(message.into());
        self
    }

    /// Make setup sleep before succeeding
    pub fn slow_setup(mut self, delay: Duration) -> Self {
        self.setup_behavior = SetupBehavior::Delay(delay);
        self
    }

    /// Decode the configuration during setup and keep it
    pub fn decoding(mut self) -> Self {
        self.decode_config = true;
        self
    }

    /// The call log this mock writes to
    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Configurations decoded by setup
    pub fn decoded_configs(&self) -> Vec<serde_json::Value> {
        self.configs.lock().unwrap().clone()
    }

    /// Number of setup calls
    pub fn setup_call_count(&self) -> usize {
        self.log
            .events_with_prefix("setup:")
            .iter()
            .filter(|key| key.starts_with(&format!("{}-", self.plugin_type)))
            .count()
    }

    /// Number of close calls
    pub fn close_call_count(&self) -> usize {
        self.log
            .events_with_prefix("close:")
            .iter()
            .filter(|t| **t == self.plugin_type)
            .count()
    }
}

#[async_trait]
impl Factory for MockFactory {
    fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    async fn setup(&self, name: &str, decoder: &dyn Decoder) -> Result<()> {
        if self.decode_config {
            let config: serde_json::Value = decoder.decode()?;
            self.configs.lock().unwrap().push(config);
        }

        match &self.setup_behavior {
            SetupBehavior::Succeed => {}
            SetupBehavior::Fail(message) => return Err(PluginError::setup(message)),
            SetupBehavior::Delay(delay) => tokio::time::sleep(*delay).await,
        }

        self.log.record(format!("setup:{}-{}", self.plugin_type, name));
        Ok(())
    }

    fn as_depender(&self) -> Option<&dyn Depender> {
        self.depends_on.as_ref().map(|_| self as &dyn Depender)
    }

    fn as_flex_depender(&self) -> Option<&dyn FlexDepender> {
        self.flex_depends_on
            .as_ref()
            .map(|_| self as &dyn FlexDepender)
    }

    fn as_closer(&self) -> Option<&dyn Closer> {
        self.closeable.then_some(self as &dyn Closer)
    }

    fn as_finish_notifier(&self) -> Option<&dyn FinishNotifier> {
        self.finish_notified.then_some(self as &dyn FinishNotifier)
    }
}

impl Depender for MockFactory {
    fn depends_on(&self) -> Vec<String> {
        self.depends_on.clone().unwrap_or_default()
    }
}

impl FlexDepender for MockFactory {
    fn flex_depends_on(&self) -> Vec<String> {
        self.flex_depends_on.clone().unwrap_or_default()
    }
}

#[async_trait]
impl Closer for MockFactory {
    async fn close(&self) -> Result<()> {
        self.log.record(format!("close:{}", self.plugin_type));
        match &self.close_error {
            Some(message) => Err(PluginError::close(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FinishNotifier for MockFactory {
    async fn on_finish(&self, name: &str) -> Result<()> {
        self.log
            .record(format!("finish:{}-{}", self.plugin_type, name));
        match &self.finish_error {
            Some(message) => Err(PluginError::finish(message)),
            None => Ok(()),
        }
    }
}
