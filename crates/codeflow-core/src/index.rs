//! The symbol index capability.
//!
//! The graph engine is written against this trait only. An IDE-backed
//! index, a language-server adapter and [`MemoryIndex`](crate::MemoryIndex)
//! all look the same to it.

use crate::entity::{AnnotationUse, Entity, EntityId, EntityKind, ReferenceSite};

/// Read-only queries over a point-in-time snapshot of a codebase.
///
/// Every query is infallible. An unknown id, a type the index has never
/// seen, or a library that is not on the classpath all produce `None` or
/// an empty list. Results must be deterministic for a given snapshot.
pub trait SymbolIndex {
    /// Returns the metadata for an entity.
    fn entity(&self, id: EntityId) -> Option<&Entity>;

    /// Resolves a fully qualified type name.
    fn resolve_type(&self, qualified_name: &str) -> Option<EntityId>;

    /// Returns every type and method annotated with `annotation`.
    fn find_annotated_entities(&self, annotation: EntityId) -> Vec<EntityId>;

    /// Returns the annotations written on an entity.
    fn annotations(&self, entity: EntityId) -> Vec<AnnotationUse>;

    /// Resolves an annotation use to its annotation type.
    fn resolve_annotation_type(&self, usage: &AnnotationUse) -> Option<EntityId>;

    /// Returns the subtypes of `ty`, direct only or the full closure.
    fn find_subtypes(&self, ty: EntityId, transitive: bool) -> Vec<EntityId>;

    /// Returns the resolvable direct supertypes (superclass and
    /// implemented interfaces) of `ty`, in declaration order.
    fn direct_supertypes(&self, ty: EntityId) -> Vec<EntityId>;

    /// Returns the methods declared on `ty`.
    fn methods(&self, ty: EntityId) -> Vec<EntityId>;

    /// Returns the methods that override or implement `method`.
    fn find_overriding_methods(&self, method: EntityId) -> Vec<EntityId>;

    /// Resolves a method's declared return type.
    fn resolve_method_return_type(&self, method: EntityId) -> Option<EntityId>;

    /// Returns every site that references `entity`.
    fn find_referencing_sites(&self, entity: EntityId) -> Vec<ReferenceSite>;

    /// Shorthand for the entity's kind.
    fn kind(&self, id: EntityId) -> Option<EntityKind> {
        self.entity(id).map(|e| e.kind)
    }

    /// Walks the container chain up to the outermost declaring type.
    ///
    /// Methods resolve to the top-level type that declares them; a
    /// top-level type resolves to itself.
    fn top_level_type(&self, id: EntityId) -> Option<EntityId> {
        let mut current = self.entity(id)?;
        while let Some(parent) = current.container {
            current = self.entity(parent)?;
        }
        current.kind.is_type().then_some(current.id)
    }
}
