//! In-memory command runner, notifier and log capture for pipeline tests

use crate::core::error::ReleaseError;
use crate::core::traits::{
    CommandOutput, CommandRunner, ReleaseNotifier, ReleaseRequest, StepCommand,
};
use crate::security::CommandError;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Records every command; fails the ones whose rendering starts with a
/// configured prefix.
#[derive(Debug, Default)]
pub struct FakeRunner {
    commands: Mutex<Vec<String>>,
    fail_prefix: Option<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(prefix: &str) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            fail_prefix: Some(prefix.to_string()),
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &StepCommand) -> Result<CommandOutput, CommandError> {
        let rendered = command.to_string();
        self.commands.lock().unwrap().push(rendered.clone());

        let fails = self
            .fail_prefix
            .as_deref()
            .is_some_and(|p| rendered.starts_with(p));

        Ok(if fails {
            CommandOutput {
                code: Some(1),
                output: "error: simulated failure\n".to_string(),
            }
        } else {
            CommandOutput {
                code: Some(0),
                output: "ok\n".to_string(),
            }
        })
    }
}

/// Records release requests as `(repo, tag_name, name, username, password)`
#[derive(Debug, Default)]
pub struct FakeNotifier {
    requests: Mutex<Vec<(String, String, String, String, String)>>,
    reject_with: Option<(u16, String)>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(status: u16, body: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reject_with: Some((status, body.to_string())),
        }
    }

    pub fn requests(&self) -> Vec<(String, String, String, String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReleaseNotifier for FakeNotifier {
    async fn create_release(&self, request: &ReleaseRequest) -> Result<(), ReleaseError> {
        self.requests.lock().unwrap().push((
            request.repo.clone(),
            request.payload.tag_name.clone(),
            request.payload.name.clone(),
            request.username.clone(),
            request.password.expose_secret().to_string(),
        ));

        match &self.reject_with {
            Some((status, body)) => Err(ReleaseError::NotifierRejected {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Shared buffer for capturing formatted log output
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Install a subscriber writing into this buffer for the current thread
    pub fn capture(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
