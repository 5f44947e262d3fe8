use super::instance::AssembledInstance;
use crate::error::{HookFailure, HookKind, TeardownError};
use crate::resolver::Invoker;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Drives `init` after wiring and `destroy` on teardown.
///
/// Types without the capability are skipped at that step.
#[derive(Debug, Default)]
pub struct LifecycleManager {
    torn_down: AtomicBool,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `init` once per instance in the given (construction) order.
    ///
    /// On the first failure the instances initialized before it are destroyed
    /// in reverse order and the failure is returned.
    pub fn initialize_all(&self, instances: &[AssembledInstance]) -> Result<(), HookFailure> {
        for (index, instance) in instances.iter().enumerate() {
            let Some(hook) = instance.descriptor().init_hook() else {
                continue;
            };
            debug!("init {} (#{})", instance.definition_id(), instance.sequence());

            if let Err(error) = Invoker::run_hook(hook, instance.object()) {
                let rolled_back = destroy_in_reverse(&instances[..index]);
                for failure in &rolled_back {
                    warn!("Rollback: {}", failure);
                }
                return Err(HookFailure {
                    definition: instance.definition_id().to_string(),
                    hook: HookKind::Init,
                    error,
                });
            }
        }
        Ok(())
    }

    /// Call `destroy` once per instance in strict reverse construction order.
    ///
    /// A failing hook does not stop the remaining ones; all failures are
    /// reported together. Only the first call does any work.
    pub fn teardown_all(&self, instances: &[AssembledInstance]) -> Result<(), TeardownError> {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return Err(TeardownError::AlreadyTornDown);
        }

        let failures = destroy_in_reverse(instances);
        info!(
            "Teardown finished: {} instances, {} failures",
            instances.len(),
            failures.len()
        );

        if failures.is_empty() {
            Ok(())
        } else {
            for failure in &failures {
                warn!("{}", failure);
            }
            Err(TeardownError::HookFailures { failures })
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }
}

fn destroy_in_reverse(instances: &[AssembledInstance]) -> Vec<HookFailure> {
    let mut ordered: Vec<&AssembledInstance> = instances.iter().collect();
    ordered.sort_by_key(|instance| Reverse(instance.sequence()));

    let mut failures = Vec::new();
    for instance in ordered {
        let Some(hook) = instance.descriptor().destroy_hook() else {
            continue;
        };
        debug!("destroy {} (#{})", instance.definition_id(), instance.sequence());

        if let Err(error) = Invoker::run_hook(hook, instance.object()) {
            failures.push(HookFailure {
                definition: instance.definition_id().to_string(),
                hook: HookKind::Destroy,
                error,
            });
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{Disposable, Initializable};
    use crate::registry::TypeDescriptor;
    use std::fmt;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Tracked {
        name: String,
        log: Log,
        fail_init: bool,
        fail_destroy: bool,
    }

    impl fmt::Display for Tracked {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.name)
        }
    }

    impl Initializable for Tracked {
        fn init(&mut self) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(format!("init {}", self.name));
            if self.fail_init {
                anyhow::bail!("init of {} failed", self.name);
            }
            Ok(())
        }
    }

    impl Disposable for Tracked {
        fn destroy(&mut self) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(format!("destroy {}", self.name));
            if self.fail_destroy {
                anyhow::bail!("destroy of {} failed", self.name);
            }
            Ok(())
        }
    }

    fn instances(log: &Log, beans: &[(&str, bool, bool)]) -> Vec<AssembledInstance> {
        let descriptor = Arc::new(
            TypeDescriptor::builder::<Tracked>("Tracked")
                .initializable()
                .disposable()
                .build(),
        );

        beans
            .iter()
            .enumerate()
            .map(|(sequence, (name, fail_init, fail_destroy))| {
                let object = crate::bean::BeanRef::new(
                    "Tracked",
                    Tracked {
                        name: name.to_string(),
                        log: log.clone(),
                        fail_init: *fail_init,
                        fail_destroy: *fail_destroy,
                    },
                );
                AssembledInstance::new(
                    Arc::from(*name),
                    object,
                    sequence as u64,
                    descriptor.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn test_init_runs_in_construction_order() {
        let log = Log::default();
        let all = instances(&log, &[("a", false, false), ("b", false, false)]);

        LifecycleManager::new().initialize_all(&all).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["init a", "init b"]);
    }

    #[test]
    fn test_init_failure_rolls_back() {
        let log = Log::default();
        let all = instances(
            &log,
            &[("a", false, false), ("b", false, false), ("c", true, false), ("d", false, false)],
        );

        let failure = LifecycleManager::new().initialize_all(&all).unwrap_err();
        assert_eq!(failure.definition, "c");
        assert_eq!(failure.hook, HookKind::Init);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["init a", "init b", "init c", "destroy b", "destroy a"]
        );
    }

    #[test]
    fn test_teardown_reverse_order_continues_past_failures() {
        let log = Log::default();
        let all = instances(
            &log,
            &[("a", false, false), ("b", false, true), ("c", false, false)],
        );
        let manager = LifecycleManager::new();

        let err = manager.teardown_all(&all).unwrap_err();
        let TeardownError::HookFailures { failures } = err else {
            panic!("expected hook failures");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].definition, "b");
        assert_eq!(failures[0].to_string(), "bean `b`: destroy hook failed: destroy of b failed");
        assert_eq!(*log.lock().unwrap(), vec!["destroy c", "destroy b", "destroy a"]);
    }

    #[test]
    fn test_teardown_runs_once() {
        let log = Log::default();
        let all = instances(&log, &[("a", false, false)]);
        let manager = LifecycleManager::new();

        manager.teardown_all(&all).unwrap();
        assert!(manager.is_torn_down());
        assert!(matches!(
            manager.teardown_all(&all),
            Err(TeardownError::AlreadyTornDown)
        ));
        assert_eq!(*log.lock().unwrap(), vec!["destroy a"]);
    }
}
