use super::definition::{ArgumentValue, Definition, Scope};
use super::instance::AssembledInstance;
use super::lifecycle::LifecycleManager;
use crate::config::ResolutionPolicy;
use crate::error::{AssemblyError, InvocationError, Result, TeardownError};
use crate::kind::RuntimeType;
use crate::registry::{TypeDescriptor, TypeRegistry};
use crate::resolver::{Invoker, OverloadResolver};
use crate::value::{TypedValue, Value};
use id_arena::{Arena, Id};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::{debug, info};

type NodeId = Id<PlannedNode>;

enum PlannedArg {
    Literal(TypedValue),
    Null,
    Node(NodeId),
}

/// One instance a request will produce or reuse
struct PlannedNode {
    definition: Arc<Definition>,
    descriptor: Arc<TypeDescriptor>,
    constructor_args: Vec<PlannedArg>,
    properties: Vec<(String, PlannedArg)>,
    /// Cached singleton from an earlier request
    existing: Option<AssembledInstance>,
    built: Option<AssembledInstance>,
    /// Node whose reference caused this one to be planned
    origin: Option<NodeId>,
    /// Transient planned for a non-shared reference
    fresh: bool,
}

impl PlannedNode {
    fn instance(&self) -> Option<&AssembledInstance> {
        self.existing.as_ref().or(self.built.as_ref())
    }

    /// Nodes that must be constructed first; with `include_properties`, also
    /// the nodes that are merely preferred first
    fn dependencies(&self, include_properties: bool) -> Vec<NodeId> {
        let constructor = self.constructor_args.iter();
        let properties = self
            .properties
            .iter()
            .map(|(_, arg)| arg)
            .filter(|_| include_properties);

        constructor
            .chain(properties)
            .filter_map(|arg| match arg {
                PlannedArg::Node(node) => Some(*node),
                _ => None,
            })
            .collect()
    }
}

struct Plan {
    nodes: Arena<PlannedNode>,
    singletons: FxHashMap<String, NodeId>,
    shared: FxHashMap<String, NodeId>,
    pending: Vec<NodeId>,
}

impl Plan {
    fn new() -> Self {
        Plan {
            nodes: Arena::new(),
            singletons: FxHashMap::default(),
            shared: FxHashMap::default(),
            pending: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    Open,
    Closed,
}

/// Builds and wires object graphs from registered definitions.
///
/// Each request plans every instance it needs up front, constructs them in
/// dependency order (pass 1), injects properties (pass 2) and then runs `init`
/// hooks. Nothing is cached or recorded unless the whole request succeeds.
pub struct GraphAssembler {
    registry: Arc<TypeRegistry>,
    policy: ResolutionPolicy,
    definitions: IndexMap<String, Arc<Definition>>,
    singletons: FxHashMap<String, AssembledInstance>,
    constructed: Vec<AssembledInstance>,
    next_sequence: u64,
    lifecycle: LifecycleManager,
}

impl GraphAssembler {
    pub fn new(registry: Arc<TypeRegistry>, policy: ResolutionPolicy) -> Self {
        GraphAssembler {
            registry,
            policy,
            definitions: IndexMap::new(),
            singletons: FxHashMap::default(),
            constructed: Vec::new(),
            next_sequence: 0,
            lifecycle: LifecycleManager::new(),
        }
    }

    pub fn register(&mut self, definition: Definition) -> Result<()> {
        self.register_all([definition]).map(|_| ())
    }

    /// Register a batch of definitions. Fails without registering any of them
    /// if an id is already taken.
    pub fn register_all<I>(&mut self, definitions: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = Definition>,
    {
        self.ensure_open()?;

        let definitions: Vec<Definition> = definitions.into_iter().collect();
        let mut seen = FxHashSet::default();
        for definition in &definitions {
            if self.definitions.contains_key(&definition.id) || !seen.insert(definition.id.as_str())
            {
                return Err(AssemblyError::DuplicateDefinition(definition.id.clone()));
            }
        }

        let ids = definitions.iter().map(|d| d.id.clone()).collect();
        for definition in definitions {
            self.definitions
                .insert(definition.id.clone(), Arc::new(definition));
        }
        Ok(ids)
    }

    /// Register `definitions` and assemble every one of them
    pub fn assemble<I>(&mut self, definitions: I) -> Result<IndexMap<String, AssembledInstance>>
    where
        I: IntoIterator<Item = Definition>,
    {
        let ids = self.register_all(definitions)?;
        self.request(ids.as_slice())
    }

    /// Assemble already registered definitions by id.
    ///
    /// Singletons come from the cache when an earlier request built them;
    /// transients are always built fresh.
    pub fn request<S: AsRef<str>>(
        &mut self,
        ids: &[S],
    ) -> Result<IndexMap<String, AssembledInstance>> {
        self.ensure_open()?;
        info!("Assembling {} definition(s)", ids.len());

        let (mut plan, roots) = self.plan(ids)?;

        // cycles are reported as seen from the requested definitions
        let starts: Vec<NodeId> = roots.values().copied().collect();
        depth_first(&plan, &starts, true)?;

        // dependencies first where property references allow it, then fix
        // up so every constructor dependency precedes its dependent
        let preferred = depth_first(&plan, &starts, false)?;
        let order = depth_first(&plan, &preferred, true)?;

        for &node in &order {
            self.construct(&mut plan, node)?;
        }
        for &node in &order {
            self.inject(&plan, node)?;
        }

        let records: Vec<AssembledInstance> = order
            .iter()
            .filter_map(|&node| plan.nodes[node].built.clone())
            .collect();
        self.lifecycle
            .initialize_all(&records)
            .map_err(|failure| AssemblyError::Invocation {
                definition: failure.definition,
                member: "init".to_string(),
                source: InvocationError::raised(failure.error),
            })?;

        for &node in &order {
            let planned = &plan.nodes[node];
            if let (Scope::Singleton, Some(record)) = (planned.definition.scope, &planned.built) {
                self.singletons
                    .insert(planned.definition.id.clone(), record.clone());
            }
        }
        self.constructed.extend(records.iter().cloned());
        info!("Assembled {} new instance(s)", records.len());

        Ok(roots
            .into_iter()
            .filter_map(|(id, node)| plan.nodes[node].instance().cloned().map(|i| (id, i)))
            .collect())
    }

    /// Every instance built so far, in construction order
    pub fn instances(&self) -> &[AssembledInstance] {
        &self.constructed
    }

    pub fn definition_ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn definition(&self, id: &str) -> Option<&Definition> {
        self.definitions.get(id).map(Arc::as_ref)
    }

    /// Cached singleton, if it has been assembled
    pub fn singleton(&self, id: &str) -> Option<&AssembledInstance> {
        self.singletons.get(id)
    }

    /// Destroy every instance in reverse construction order. Later requests
    /// fail with [`AssemblyError::ContainerClosed`].
    pub fn teardown(&mut self) -> std::result::Result<(), TeardownError> {
        self.lifecycle.teardown_all(&self.constructed)
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle.is_torn_down()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(AssemblyError::ContainerClosed)
        } else {
            Ok(())
        }
    }

    fn plan<S: AsRef<str>>(&self, ids: &[S]) -> Result<(Plan, IndexMap<String, NodeId>)> {
        let mut plan = Plan::new();
        let mut roots = IndexMap::new();

        for id in ids {
            let id = id.as_ref();
            if roots.contains_key(id) {
                continue;
            }
            let node = self.plan_node(&mut plan, id, None, false)?;
            if plan.nodes[node].definition.scope == Scope::Transient {
                plan.shared.entry(id.to_string()).or_insert(node);
            }
            roots.insert(id.to_string(), node);
        }

        while let Some(node) = plan.pending.pop() {
            self.expand(&mut plan, node)?;
        }

        debug!("Planned {} instance(s)", plan.nodes.len());
        Ok((plan, roots))
    }

    fn plan_node(
        &self,
        plan: &mut Plan,
        id: &str,
        origin: Option<NodeId>,
        shared: bool,
    ) -> Result<NodeId> {
        let definition = self
            .definitions
            .get(id)
            .cloned()
            .ok_or_else(|| AssemblyError::UnknownDefinition(id.to_string()))?;

        match definition.scope {
            Scope::Singleton => {
                if let Some(&node) = plan.singletons.get(id) {
                    return Ok(node);
                }
                let existing = self.singletons.get(id).cloned();
                let node = self.alloc(plan, definition, origin, existing, false)?;
                plan.singletons.insert(id.to_string(), node);
                Ok(node)
            }
            Scope::Transient if shared => {
                if let Some(&node) = plan.shared.get(id) {
                    return Ok(node);
                }
                let node = self.alloc(plan, definition, origin, None, false)?;
                plan.shared.insert(id.to_string(), node);
                Ok(node)
            }
            Scope::Transient => {
                check_transient_expansion(plan, id, origin)?;
                self.alloc(plan, definition, origin, None, true)
            }
        }
    }

    fn alloc(
        &self,
        plan: &mut Plan,
        definition: Arc<Definition>,
        origin: Option<NodeId>,
        existing: Option<AssembledInstance>,
        fresh: bool,
    ) -> Result<NodeId> {
        let descriptor = self
            .registry
            .get(&definition.type_name)
            .cloned()
            .ok_or_else(|| AssemblyError::UnknownType {
                definition: definition.id.clone(),
                type_name: definition.type_name.clone(),
            })?;

        if let Some(property) = definition
            .properties
            .keys()
            .find(|name| descriptor.setters(name).is_none())
        {
            return Err(AssemblyError::UnknownProperty {
                definition: definition.id.clone(),
                type_name: definition.type_name.clone(),
                property: property.clone(),
            });
        }

        let needs_build = existing.is_none();
        let node = plan.nodes.alloc(PlannedNode {
            definition,
            descriptor,
            constructor_args: Vec::new(),
            properties: Vec::new(),
            existing,
            built: None,
            origin,
            fresh,
        });
        if needs_build {
            plan.pending.push(node);
        }
        Ok(node)
    }

    fn expand(&self, plan: &mut Plan, node: NodeId) -> Result<()> {
        let definition = plan.nodes[node].definition.clone();

        let mut constructor_args = Vec::with_capacity(definition.constructor_args.len());
        for arg in &definition.constructor_args {
            constructor_args.push(self.plan_arg(plan, arg, node)?);
        }

        let mut properties = Vec::with_capacity(definition.properties.len());
        for (name, arg) in &definition.properties {
            properties.push((name.clone(), self.plan_arg(plan, arg, node)?));
        }

        let planned = &mut plan.nodes[node];
        planned.constructor_args = constructor_args;
        planned.properties = properties;
        Ok(())
    }

    fn plan_arg(&self, plan: &mut Plan, arg: &ArgumentValue, owner: NodeId) -> Result<PlannedArg> {
        Ok(match arg {
            ArgumentValue::Literal(value) => PlannedArg::Literal(value.clone()),
            ArgumentValue::Null => PlannedArg::Null,
            ArgumentValue::Ref { id, shared } => {
                PlannedArg::Node(self.plan_node(plan, id, Some(owner), *shared)?)
            }
        })
    }

    /// Pass 1: run the resolved constructor
    fn construct(&mut self, plan: &mut Plan, node: NodeId) -> Result<()> {
        let planned = &plan.nodes[node];
        let definition = planned.definition.clone();
        let descriptor = planned.descriptor.clone();
        let (types, values): (Vec<RuntimeType>, Vec<Value>) = planned
            .constructor_args
            .iter()
            .map(|arg| argument(plan, arg))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();

        let resolver = OverloadResolver::new(&self.registry, &self.policy);
        let resolution = resolver
            .resolve(descriptor.constructors(), &types)
            .map_err(|e| {
                AssemblyError::resolution(e, &definition.id, &definition.type_name, "constructor")
            })?;
        debug!(
            "Constructing {} via {} (score {})",
            definition.id,
            resolution.candidate.label(),
            resolution.score
        );

        let object =
            Invoker::construct(&resolution, values).map_err(|source| AssemblyError::Invocation {
                definition: definition.id.clone(),
                member: "constructor".to_string(),
                source,
            })?;

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        plan.nodes[node].built = Some(AssembledInstance::new(
            Arc::from(definition.id.as_str()),
            object,
            sequence,
            descriptor.clone(),
        ));
        Ok(())
    }

    /// Pass 2: apply every declared property through its resolved setter
    fn inject(&self, plan: &Plan, node: NodeId) -> Result<()> {
        let planned = &plan.nodes[node];
        let definition = &planned.definition;
        let Some(target) = planned.built.as_ref() else {
            return Ok(());
        };
        let resolver = OverloadResolver::new(&self.registry, &self.policy);

        for (name, arg) in &planned.properties {
            let member = format!("setter `{}`", name);
            let setters =
                planned
                    .descriptor
                    .setters(name)
                    .ok_or_else(|| AssemblyError::UnknownProperty {
                        definition: definition.id.clone(),
                        type_name: definition.type_name.clone(),
                        property: name.clone(),
                    })?;

            let (runtime, value) = argument(plan, arg)?;
            let resolution = resolver
                .resolve(setters, std::slice::from_ref(&runtime))
                .map_err(|e| {
                    AssemblyError::resolution(e, &definition.id, &definition.type_name, &member)
                })?;

            Invoker::apply_setter(&resolution, target.object(), value).map_err(|source| {
                AssemblyError::Invocation {
                    definition: definition.id.clone(),
                    member,
                    source,
                }
            })?;
        }
        Ok(())
    }
}

fn argument(plan: &Plan, arg: &PlannedArg) -> Result<(RuntimeType, Value)> {
    Ok(match arg {
        PlannedArg::Literal(value) => (value.runtime.clone(), value.value.clone()),
        PlannedArg::Null => (RuntimeType::Null, Value::Null),
        PlannedArg::Node(node) => {
            let planned = &plan.nodes[*node];
            let object = planned
                .instance()
                .map(|instance| instance.object().clone())
                .ok_or_else(|| AssemblyError::NotConstructed(planned.definition.id.clone()))?;
            (RuntimeType::reference(object.type_name()), Value::Bean(object))
        }
    })
}

/// A non-shared transient that reaches itself through non-shared transient
/// references would expand forever.
fn check_transient_expansion(plan: &Plan, id: &str, origin: Option<NodeId>) -> Result<()> {
    let mut path = vec![id.to_string()];
    let mut current = origin;

    while let Some(node) = current {
        let planned = &plan.nodes[node];
        if !planned.fresh {
            break;
        }
        path.push(planned.definition.id.clone());
        if planned.definition.id == id {
            path.reverse();
            return Err(AssemblyError::Cycle { path });
        }
        current = planned.origin;
    }
    Ok(())
}

/// Iterative depth-first post-order over the planned graph, skipping
/// instances that already exist. With `strict` only constructor edges are
/// followed and a back edge is a cycle; otherwise property edges are
/// followed too and back edges are ignored.
fn depth_first(plan: &Plan, starts: &[NodeId], strict: bool) -> Result<Vec<NodeId>> {
    let edges: Vec<Vec<NodeId>> = plan
        .nodes
        .iter()
        .map(|(_, node)| node.dependencies(!strict))
        .collect();
    let mut marks: Vec<Mark> = plan
        .nodes
        .iter()
        .map(|(_, node)| {
            if node.existing.is_some() {
                Mark::Closed
            } else {
                Mark::New
            }
        })
        .collect();
    let mut order = Vec::new();

    for &start in starts {
        if marks[start.index()] != Mark::New {
            continue;
        }
        marks[start.index()] = Mark::Open;
        let mut stack: Vec<(NodeId, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let Some(&dep) = edges[node.index()].get(next) else {
                marks[node.index()] = Mark::Closed;
                order.push(node);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match marks[dep.index()] {
                Mark::New => {
                    marks[dep.index()] = Mark::Open;
                    stack.push((dep, 0));
                }
                Mark::Open if strict => {
                    let from = stack.iter().position(|(n, _)| *n == dep).unwrap_or(0);
                    let path = stack[from..]
                        .iter()
                        .map(|(n, _)| plan.nodes[*n].definition.id.clone())
                        .chain(std::iter::once(plan.nodes[dep].definition.id.clone()))
                        .collect();
                    return Err(AssemblyError::Cycle { path });
                }
                Mark::Open | Mark::Closed => {}
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::BeanRef;
    use crate::registry::TypeSlot;
    use std::fmt;

    #[derive(Default)]
    struct Link {
        next: Option<BeanRef>,
    }

    impl fmt::Display for Link {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(if self.next.is_some() { "link->" } else { "link" })
        }
    }

    fn assembler() -> GraphAssembler {
        let mut registry = TypeRegistry::new();
        registry.register(
            TypeDescriptor::builder::<Link>("Link")
                .constructor(&[], |_| Ok(Link::default()))
                .constructor(&[TypeSlot::reference("Link")], |a| {
                    Ok(Link { next: a.bean(0)? })
                })
                .setter("next", "Link", |link, a| {
                    link.next = a.bean(0)?;
                    Ok(())
                })
                .build(),
        );
        GraphAssembler::new(Arc::new(registry), ResolutionPolicy::default())
    }

    #[test]
    fn test_constructor_cycle_reports_path() {
        let mut assembler = assembler();
        let err = assembler
            .assemble([
                Definition::singleton("a", "Link").arg(ArgumentValue::reference("b")),
                Definition::singleton("b", "Link").arg(ArgumentValue::reference("c")),
                Definition::singleton("c", "Link").arg(ArgumentValue::reference("a")),
            ])
            .unwrap_err();

        let AssemblyError::Cycle { path } = err else {
            panic!("expected a cycle, got {err}");
        };
        assert_eq!(path, vec!["a", "b", "c", "a"]);
        assert!(assembler.instances().is_empty());
    }

    #[test]
    fn test_unbuilt_reference_is_an_error() {
        let mut assembler = assembler();
        assembler.register(Definition::singleton("a", "Link")).unwrap();

        let (plan, roots) = assembler.plan(&["a"]).unwrap();
        let err = argument(&plan, &PlannedArg::Node(roots["a"])).unwrap_err();
        assert!(matches!(err, AssemblyError::NotConstructed(ref id) if id == "a"));
        assert_eq!(err.to_string(), "bean `a` was referenced before it was constructed");
    }

    #[test]
    fn test_property_cycle_assembles() {
        let mut assembler = assembler();
        let built = assembler
            .assemble([
                Definition::singleton("a", "Link").property("next", ArgumentValue::reference("b")),
                Definition::singleton("b", "Link").property("next", ArgumentValue::reference("a")),
            ])
            .unwrap();

        assert_eq!(built["a"].to_string(), "link->");
        assert_eq!(built["b"].to_string(), "link->");
        let a_next = built["a"].with(|l: &Link| l.next.clone()).flatten().unwrap();
        assert!(a_next.ptr_eq(built["b"].object()));
    }

    #[test]
    fn test_self_referencing_transient_is_a_cycle() {
        let mut assembler = assembler();
        let err = assembler
            .assemble([
                Definition::transient("t", "Link").property("next", ArgumentValue::reference("t")),
            ])
            .unwrap_err();
        assert_eq!(err.to_string(), "reference cycle: t -> t");

        // sharing the transient within the request terminates
        let built = assembler
            .assemble([
                Definition::transient("s", "Link")
                    .property("next", ArgumentValue::shared_reference("s")),
            ])
            .unwrap();
        let next = built["s"].with(|l: &Link| l.next.clone()).flatten().unwrap();
        assert!(next.ptr_eq(built["s"].object()));
    }

    #[test]
    fn test_unknown_references_fail_before_construction() {
        let mut assembler = assembler();
        let err = assembler
            .assemble([Definition::singleton("a", "Link").arg(ArgumentValue::reference("missing"))])
            .unwrap_err();
        assert!(matches!(err, AssemblyError::UnknownDefinition(ref id) if id == "missing"));

        let err = assembler
            .assemble([Definition::singleton("b", "Link").property("prev", ArgumentValue::null())])
            .unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::UnknownProperty { ref property, .. } if property == "prev"
        ));

        let err = assembler
            .assemble([Definition::singleton("c", "Chain")])
            .unwrap_err();
        assert!(matches!(err, AssemblyError::UnknownType { .. }));
        assert!(assembler.instances().is_empty());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut assembler = assembler();
        assembler.register(Definition::singleton("a", "Link")).unwrap();

        let err = assembler
            .register_all([Definition::singleton("b", "Link"), Definition::singleton("a", "Link")])
            .unwrap_err();
        assert!(matches!(err, AssemblyError::DuplicateDefinition(ref id) if id == "a"));
        assert!(assembler.definition("b").is_none());
    }

    #[test]
    fn test_closed_after_teardown() {
        let mut assembler = assembler();
        assembler.assemble([Definition::singleton("a", "Link")]).unwrap();
        assembler.teardown().unwrap();

        assert!(assembler.is_closed());
        assert!(matches!(assembler.request(&["a"]), Err(AssemblyError::ContainerClosed)));
    }
}
