// Fakes for the platform seams

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing_subscriber::fmt::MakeWriter;

use beeper_platform::service::{
    ControlSink, ServiceHost, ServiceIdentity, ServiceManager, ServiceRecord, ServiceState,
    ServiceStatus, StartPolicy, StatusReporter,
};

use crate::controller::LifecycleController;
use crate::signal::StopSignal;
use crate::worker::Workload;

/// Records every published status.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    published: Arc<Mutex<Vec<ServiceStatus>>>,
}

impl RecordingReporter {
    pub fn states(&self) -> Vec<ServiceState> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.current_state)
            .collect()
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, status: &ServiceStatus) -> Result<()> {
        self.published.lock().unwrap().push(status.clone());
        Ok(())
    }
}

pub fn attached_controller() -> (Arc<LifecycleController>, RecordingReporter) {
    let controller = Arc::new(LifecycleController::new(ServiceIdentity::new("Beeper")));
    let reporter = RecordingReporter::default();
    controller.attach(Box::new(reporter.clone()));
    (controller, reporter)
}

/// A controller that has gone through StartPending into Running.
pub fn running_controller() -> (Arc<LifecycleController>, RecordingReporter, Arc<StopSignal>) {
    let (controller, reporter) = attached_controller();
    let signal = controller.begin_start();
    controller.mark_running();
    (controller, reporter, signal)
}

pub struct FakeHost {
    fail: bool,
    reporter: RecordingReporter,
    sink: Arc<OnceLock<Arc<dyn ControlSink>>>,
    registered_as: Mutex<Option<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            fail: false,
            reporter: RecordingReporter::default(),
            sink: Arc::new(OnceLock::new()),
            registered_as: Mutex::new(None),
        }
    }

    /// A host that behaves like a process not launched by the service manager.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn reporter(&self) -> RecordingReporter {
        self.reporter.clone()
    }

    /// Filled in once the service registers.
    pub fn sink_slot(&self) -> Arc<OnceLock<Arc<dyn ControlSink>>> {
        self.sink.clone()
    }

    pub fn registered_as(&self) -> Option<String> {
        self.registered_as.lock().unwrap().clone()
    }
}

impl ServiceHost for FakeHost {
    fn register(
        &self,
        identity: &ServiceIdentity,
        sink: Arc<dyn ControlSink>,
    ) -> Result<Box<dyn StatusReporter>> {
        if self.fail {
            bail!("not running under a service manager");
        }
        *self.registered_as.lock().unwrap() = Some(identity.name().to_string());
        let _ = self.sink.set(sink);
        Ok(Box::new(self.reporter.clone()))
    }
}

#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicU64>);

impl Counter {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct CountingWorkload {
    attempts: Counter,
    fail: bool,
}

impl CountingWorkload {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of times `perform` was called
    pub fn counter(&self) -> Counter {
        self.attempts.clone()
    }
}

#[async_trait]
impl Workload for CountingWorkload {
    async fn perform(&mut self) -> Result<()> {
        self.attempts.0.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("beep failed");
        }
        Ok(())
    }
}

/// A unit of work that takes `duration` to finish.
pub struct SlowWorkload {
    duration: Duration,
    finished: Counter,
}

impl SlowWorkload {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            finished: Counter::default(),
        }
    }

    pub fn counter(&self) -> Counter {
        self.finished.clone()
    }
}

#[async_trait]
impl Workload for SlowWorkload {
    async fn perform(&mut self) -> Result<()> {
        tokio::time::sleep(self.duration).await;
        self.finished.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub executable: PathBuf,
    pub start: StartPolicy,
    pub state: ServiceState,
}

type Records = Arc<Mutex<HashMap<ServiceIdentity, Registration>>>;

#[derive(Default)]
pub struct InMemoryManager {
    records: Records,
    opened: Counter,
}

impl InMemoryManager {
    pub fn record(&self, identity: &ServiceIdentity) -> Option<Registration> {
        self.records.lock().unwrap().get(identity).cloned()
    }

    pub fn set_state(&self, identity: &ServiceIdentity, state: ServiceState) {
        if let Some(record) = self.records.lock().unwrap().get_mut(identity) {
            record.state = state;
        }
    }

    /// Number of handles opened through `open_service`
    pub fn opened(&self) -> u64 {
        self.opened.get()
    }
}

impl ServiceManager for InMemoryManager {
    fn create_service(
        &self,
        identity: &ServiceIdentity,
        executable: &Path,
        start: StartPolicy,
    ) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(identity) {
            bail!("service {} already exists", identity);
        }
        records.insert(
            identity.clone(),
            Registration {
                executable: executable.to_path_buf(),
                start,
                state: ServiceState::Stopped,
            },
        );
        Ok(())
    }

    fn open_service(&self, identity: &ServiceIdentity) -> Result<Box<dyn ServiceRecord>> {
        if !self.records.lock().unwrap().contains_key(identity) {
            bail!("service {} does not exist", identity);
        }
        self.opened.0.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryRecord {
            records: self.records.clone(),
            identity: identity.clone(),
        }))
    }
}

struct InMemoryRecord {
    records: Records,
    identity: ServiceIdentity,
}

impl ServiceRecord for InMemoryRecord {
    fn query_state(&self) -> Result<ServiceState> {
        match self.records.lock().unwrap().get(&self.identity) {
            Some(record) => Ok(record.state),
            None => bail!("service {} was deleted", self.identity),
        }
    }

    fn delete(&self) -> Result<()> {
        match self.records.lock().unwrap().remove(&self.identity) {
            Some(_) => Ok(()),
            None => bail!("service {} was deleted", self.identity),
        }
    }
}

/// In-memory sink for a `tracing-subscriber` fmt layer.
#[derive(Clone, Default)]
pub struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLog {
    type Writer = CapturedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
