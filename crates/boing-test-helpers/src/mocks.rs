//! Mock beans for testing

use boing_core::{BeanRef, Disposable, Initializable, TypeDescriptor, TypeRegistry};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Shared, ordered record of lifecycle events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Events starting with `prefix`, e.g. every `"destroy "` entry
    pub fn filtered(&self, prefix: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

/// A bean that records construction, property injection and lifecycle hooks
pub struct RecordingBean {
    pub name: String,
    pub peer: Option<BeanRef>,
    pub dependency: Option<BeanRef>,
    pub fail_on_init: bool,
    pub fail_on_destroy: bool,
    log: EventLog,
}

impl RecordingBean {
    fn new(name: String, dependency: Option<BeanRef>, log: EventLog) -> Self {
        log.record(format!("construct {}", name));
        RecordingBean {
            name,
            peer: None,
            dependency,
            fail_on_init: false,
            fail_on_destroy: false,
            log,
        }
    }
}

impl fmt::Display for RecordingBean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recording:{}", self.name)
    }
}

impl Initializable for RecordingBean {
    fn init(&mut self) -> anyhow::Result<()> {
        self.log.record(format!("init {}", self.name));
        if self.fail_on_init {
            anyhow::bail!("{} refused to start", self.name);
        }
        Ok(())
    }
}

impl Disposable for RecordingBean {
    fn destroy(&mut self) -> anyhow::Result<()> {
        self.log.record(format!("destroy {}", self.name));
        if self.fail_on_destroy {
            anyhow::bail!("{} refused to stop", self.name);
        }
        Ok(())
    }
}

/// Descriptor for `Recording` beans writing to `log`.
///
/// Constructors: `(String)` and `(String, Recording)`. Properties: `peer`,
/// `failOnInit`, `failOnDestroy`.
pub fn recording_descriptor(log: &EventLog) -> TypeDescriptor {
    let (plain, dependent, peer) = (log.clone(), log.clone(), log.clone());

    TypeDescriptor::builder::<RecordingBean>("Recording")
        .assignable_to(["Lifecycle"])
        .constructor(&["String".into()], move |a| {
            let name = a.string(0)?.unwrap_or_default();
            Ok(RecordingBean::new(name, None, plain.clone()))
        })
        .constructor(&["String".into(), "Recording".into()], move |a| {
            let name = a.string(0)?.unwrap_or_default();
            Ok(RecordingBean::new(name, a.bean(1)?, dependent.clone()))
        })
        .setter("peer", "Recording", move |bean, a| {
            bean.peer = a.bean(0)?;
            peer.record(format!("set {}.peer", bean.name));
            Ok(())
        })
        .setter("failOnInit", boing_core::PrimitiveKind::Boolean, |bean, a| {
            bean.fail_on_init = a.boolean(0)?;
            Ok(())
        })
        .setter("failOnDestroy", boing_core::PrimitiveKind::Boolean, |bean, a| {
            bean.fail_on_destroy = a.boolean(0)?;
            Ok(())
        })
        .initializable()
        .disposable()
        .build()
}

/// Registry holding only the `Recording` type
pub fn recording_registry(log: &EventLog) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.declare_reference_type("Lifecycle", Vec::<String>::new());
    registry.register(recording_descriptor(log));
    registry
}
