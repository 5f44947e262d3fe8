use crate::config::{AmbiguityPolicy, ResolutionPolicy};
use crate::error::ResolveError;
use crate::kind::{normalize, CanonicalKind, PrimitiveKind, RuntimeType};
use crate::registry::{Candidate, SlotKind, TypeRegistry, TypeSlot};
use std::cmp::Ordering;
use std::fmt;
use tracing::trace;

/// How a supplied argument reaches its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same canonical kind, boxed or not
    Identity,
    /// Passed as a reference the slot type is assignable from
    Reference,
    /// Primitive widening to the slot kind
    Widen(PrimitiveKind),
    /// Null into a nullable slot
    Null,
    /// Null into a primitive slot; fails at invocation
    NullToPrimitive(PrimitiveKind),
}

/// The winning candidate with the conversion for each argument
pub struct Resolution<'c, H> {
    pub candidate: &'c Candidate<H>,
    pub conversions: Vec<Conversion>,
    pub score: u32,
}

impl<H> fmt::Debug for Resolution<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("candidate", &self.candidate.label())
            .field("conversions", &self.conversions)
            .field("score", &self.score)
            .finish()
    }
}

/// Picks the most specific candidate for a list of argument runtime types
pub struct OverloadResolver<'a> {
    registry: &'a TypeRegistry,
    policy: &'a ResolutionPolicy,
}

impl<'a> OverloadResolver<'a> {
    pub fn new(registry: &'a TypeRegistry, policy: &'a ResolutionPolicy) -> Self {
        Self { registry, policy }
    }

    /// Select the single best candidate.
    ///
    /// Candidates are scanned in declaration order, so equal inputs always
    /// produce the same result.
    pub fn resolve<'c, H>(
        &self,
        candidates: &'c [Candidate<H>],
        args: &[RuntimeType],
    ) -> Result<Resolution<'c, H>, ResolveError> {
        let mut best: Vec<Resolution<'c, H>> = Vec::new();
        let mut best_score = u32::MAX;

        for candidate in candidates.iter().filter(|c| c.arity() == args.len()) {
            let Some((score, conversions)) = self.score_candidate(candidate.slots(), args) else {
                trace!("Rejected {}", candidate.label());
                continue;
            };
            trace!("Scored {} at {}", candidate.label(), score);

            let resolution = Resolution {
                candidate,
                conversions,
                score,
            };
            match score.cmp(&best_score) {
                Ordering::Less => {
                    best_score = score;
                    best.clear();
                    best.push(resolution);
                }
                Ordering::Equal => best.push(resolution),
                Ordering::Greater => {}
            }
        }

        if best.is_empty() {
            return Err(ResolveError::NoMatch {
                arg_types: args.iter().map(ToString::to_string).collect(),
            });
        }

        if best.len() > 1 && self.policy.ambiguity == AmbiguityPolicy::Reject {
            return Err(ResolveError::Ambiguous {
                candidates: best.iter().map(|r| r.candidate.label().to_string()).collect(),
                score: best_score,
            });
        }

        // remaining ties go to the first declared
        Ok(best.swap_remove(0))
    }

    fn score_candidate(
        &self,
        slots: &[TypeSlot],
        args: &[RuntimeType],
    ) -> Option<(u32, Vec<Conversion>)> {
        let mut total = 0u32;
        let mut conversions = Vec::with_capacity(slots.len());

        for (slot, arg) in slots.iter().zip(args) {
            let (score, conversion) = self.score_position(slot, arg)?;
            total = total.saturating_add(score);
            conversions.push(conversion);
        }

        Some((total, conversions))
    }

    /// Score one argument against one slot; `None` rejects the candidate
    pub fn score_position(&self, slot: &TypeSlot, arg: &RuntimeType) -> Option<(u32, Conversion)> {
        let policy = self.policy;

        match (normalize(arg), slot.kind()) {
            (CanonicalKind::Null, SlotKind::Primitive(kind)) if !slot.nullable() => policy
                .null_primitive_score
                .map(|score| (score, Conversion::NullToPrimitive(*kind))),
            (CanonicalKind::Null, _) => Some((policy.null_reference_score, Conversion::Null)),

            (CanonicalKind::Primitive(source), SlotKind::Primitive(target)) => {
                let may_widen = policy.boxed_widening || !slot.nullable();
                if source == *target {
                    Some((policy.exact_score, Conversion::Identity))
                } else if may_widen && source.widens_to(*target) {
                    Some((policy.widening_score, Conversion::Widen(*target)))
                } else {
                    None
                }
            }
            (CanonicalKind::Primitive(source), SlotKind::Reference(target)) => self
                .registry
                .is_assignable(source.boxed_name(), target)
                .then_some((policy.reference_score, Conversion::Reference)),

            (CanonicalKind::Reference(source), SlotKind::Reference(target)) => {
                if source == *target {
                    Some((policy.exact_score, Conversion::Identity))
                } else if self.registry.is_assignable(&source, target) {
                    Some((policy.reference_score, Conversion::Reference))
                } else {
                    None
                }
            }
            (CanonicalKind::Reference(_), SlotKind::Primitive(_)) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::PrimitiveKind::*;

    fn candidates(signatures: &[&[TypeSlot]]) -> Vec<Candidate<()>> {
        signatures
            .iter()
            .map(|slots| {
                let label = format!(
                    "C({})",
                    slots.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
                );
                Candidate::new(label, slots.to_vec(), ())
            })
            .collect()
    }

    fn prim(kind: PrimitiveKind) -> RuntimeType {
        RuntimeType::Primitive(kind)
    }

    #[test]
    fn test_arity_selects_unique_candidate() {
        let registry = TypeRegistry::new();
        let policy = ResolutionPolicy::default();
        let resolver = OverloadResolver::new(&registry, &policy);
        let table = candidates(&[
            &[],
            &[Byte.into()],
            &[Byte.into(), Short.into()],
            &[Byte.into(), Short.into(), Int.into(), Long.into()],
        ]);

        let resolution = resolver
            .resolve(&table, &[prim(Byte), prim(Short), prim(Int), prim(Long)])
            .unwrap();
        assert_eq!(resolution.candidate.label(), "C(byte, short, int, long)");
        assert_eq!(resolution.score, 0);
        assert!(resolution.conversions.iter().all(|c| *c == Conversion::Identity));

        let empty = resolver.resolve(&table, &[]).unwrap();
        assert_eq!(empty.candidate.label(), "C()");
    }

    #[test]
    fn test_boxed_arguments_match_primitive_slots_exactly() {
        let registry = TypeRegistry::new();
        let policy = ResolutionPolicy::default();
        let resolver = OverloadResolver::new(&registry, &policy);
        let table = candidates(&[&[Int.into()], &["Object".into()]]);

        let resolution = resolver.resolve(&table, &[RuntimeType::Boxed(Int)]).unwrap();
        assert_eq!(resolution.candidate.label(), "C(int)");
        assert_eq!(resolution.score, 0);

        let by_name = resolver
            .resolve(&table, &[RuntimeType::reference("Integer")])
            .unwrap();
        assert_eq!(by_name.candidate.label(), "C(int)");
    }

    #[test]
    fn test_exact_beats_reference_beats_widening() {
        let registry = TypeRegistry::new();
        let policy = ResolutionPolicy::default();
        let resolver = OverloadResolver::new(&registry, &policy);
        let table = candidates(&[&[Long.into()], &["Number".into()]]);

        let resolution = resolver.resolve(&table, &[prim(Int)]).unwrap();
        assert_eq!(resolution.candidate.label(), "C(Number)");
        assert_eq!(resolution.conversions, vec![Conversion::Reference]);

        let exact = resolver.resolve(&table, &[prim(Long)]).unwrap();
        assert_eq!(exact.candidate.label(), "C(long)");
    }

    #[test]
    fn test_widening_only_candidate() {
        let registry = TypeRegistry::new();
        let policy = ResolutionPolicy::default();
        let resolver = OverloadResolver::new(&registry, &policy);
        let table = candidates(&[&[Double.into()], &[Boolean.into()]]);

        let resolution = resolver.resolve(&table, &[prim(Char)]).unwrap();
        assert_eq!(resolution.candidate.label(), "C(double)");
        assert_eq!(resolution.conversions, vec![Conversion::Widen(Double)]);
        assert_eq!(resolution.score, 2);
    }

    #[test]
    fn test_equal_scores_are_ambiguous() {
        let registry = TypeRegistry::new();
        let policy = ResolutionPolicy::default();
        let resolver = OverloadResolver::new(&registry, &policy);
        let table = candidates(&[&[Long.into()], &[Float.into()], &[Boolean.into()]]);

        let err = resolver.resolve(&table, &[prim(Int)]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Ambiguous {
                candidates: vec!["C(long)".to_string(), "C(float)".to_string()],
                score: 2,
            }
        );
    }

    #[test]
    fn test_prefer_first_declared_breaks_ties() {
        let registry = TypeRegistry::new();
        let policy = ResolutionPolicy {
            ambiguity: AmbiguityPolicy::PreferFirstDeclared,
            ..ResolutionPolicy::default()
        };
        let resolver = OverloadResolver::new(&registry, &policy);
        let table = candidates(&[&[Long.into()], &[Float.into()]]);

        let resolution = resolver.resolve(&table, &[prim(Int)]).unwrap();
        assert_eq!(resolution.candidate.label(), "C(long)");
    }

    #[test]
    fn test_no_match() {
        let registry = TypeRegistry::new();
        let policy = ResolutionPolicy::default();
        let resolver = OverloadResolver::new(&registry, &policy);
        let table = candidates(&[&[Int.into()], &[Int.into(), Int.into()]]);

        let err = resolver
            .resolve(&table, &[RuntimeType::reference("String")])
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoMatch {
                arg_types: vec!["String".to_string()]
            }
        );

        let narrowing = resolver.resolve(&table, &[prim(Long)]).unwrap_err();
        assert!(matches!(narrowing, ResolveError::NoMatch { .. }));

        let arity = resolver.resolve(&table, &[prim(Int), prim(Int), prim(Int)]).unwrap_err();
        assert!(matches!(arity, ResolveError::NoMatch { .. }));
    }

    #[test]
    fn test_null_prefers_reference_slots() {
        let registry = TypeRegistry::new();
        let policy = ResolutionPolicy::default();
        let resolver = OverloadResolver::new(&registry, &policy);

        let table = candidates(&[&[Byte.into()], &["Object".into()]]);
        let resolution = resolver.resolve(&table, &[RuntimeType::Null]).unwrap();
        assert_eq!(resolution.candidate.label(), "C(Object)");
        assert_eq!(resolution.conversions, vec![Conversion::Null]);

        let only_primitive = candidates(&[&[Byte.into()]]);
        let resolution = resolver.resolve(&only_primitive, &[RuntimeType::Null]).unwrap();
        assert_eq!(resolution.conversions, vec![Conversion::NullToPrimitive(Byte)]);

        let refs = candidates(&[&["Properties".into()], &["Vector".into()]]);
        let err = resolver.resolve(&refs, &[RuntimeType::Null]).unwrap_err();
        assert!(matches!(err, ResolveError::Ambiguous { .. }));
    }

    #[test]
    fn test_null_to_primitive_can_be_rejected() {
        let registry = TypeRegistry::new();
        let policy = ResolutionPolicy {
            null_primitive_score: None,
            ..ResolutionPolicy::default()
        };
        let resolver = OverloadResolver::new(&registry, &policy);
        let table = candidates(&[&[Byte.into()]]);

        let err = resolver.resolve(&table, &[RuntimeType::Null]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoMatch {
                arg_types: vec!["null".to_string()]
            }
        );
    }

    #[test]
    fn test_boxed_widening_is_configurable() {
        let registry = TypeRegistry::new();
        let table = candidates(&[&[TypeSlot::boxed(Long)]]);

        let lenient = ResolutionPolicy::default();
        let resolution = OverloadResolver::new(&registry, &lenient)
            .resolve(&table, &[prim(Int)])
            .unwrap();
        assert_eq!(resolution.conversions, vec![Conversion::Widen(Long)]);

        let strict = ResolutionPolicy {
            boxed_widening: false,
            ..ResolutionPolicy::default()
        };
        let resolver = OverloadResolver::new(&registry, &strict);
        assert!(matches!(
            resolver.resolve(&table, &[prim(Int)]),
            Err(ResolveError::NoMatch { .. })
        ));
        // own kind and null still reach the boxed slot
        assert!(resolver.resolve(&table, &[RuntimeType::Boxed(Long)]).is_ok());
        assert!(resolver.resolve(&table, &[RuntimeType::Null]).is_ok());

        // unboxed slots keep widening
        let unboxed = candidates(&[&[Long.into()]]);
        assert!(resolver.resolve(&unboxed, &[prim(Int)]).is_ok());
    }

    #[test]
    fn test_reference_subtypes() {
        let registry = TypeRegistry::new();
        let policy = ResolutionPolicy::default();
        let resolver = OverloadResolver::new(&registry, &policy);
        let table = candidates(&[&["Properties".into()], &["Vector".into()], &["Object".into()]]);

        let props = resolver
            .resolve(&table, &[RuntimeType::reference("Properties")])
            .unwrap();
        assert_eq!(props.candidate.label(), "C(Properties)");

        let list = resolver.resolve(&table, &[RuntimeType::reference("List")]).unwrap();
        assert_eq!(list.candidate.label(), "C(Object)");
        assert_eq!(list.conversions, vec![Conversion::Reference]);
    }
}
