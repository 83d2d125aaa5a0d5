//! System trait and implementations
//!
//! A system declares the components it needs as a [`Signature`]. The
//! scene keeps each system's entity set in step with entity signatures and
//! calls back into the system when entities join or leave it.

use std::any::Any;

use super::{EcsError, Entity, Scene, Signature, SignatureRegistry};

slotmap::new_key_type! {
    /// Generation-counted handle to a registered system
    pub struct SystemHandle;
}

/// System trait for processing entities and components
pub trait System: Any {
    /// Get the name of this system for debugging
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Components an entity must carry to be processed by this system
    fn required_signature(&self, registry: &SignatureRegistry) -> Result<Signature, EcsError>;

    /// Called once when the system is added to `scene`, before any membership callbacks
    fn on_registered(&mut self, _scene: &Scene) {}

    /// Called once when `entity` starts matching the required signature
    fn on_entity_inserted(&mut self, _scene: &Scene, _entity: Entity) {}

    /// Called once when `entity` stops matching the required signature
    fn on_entity_removed(&mut self, _scene: &Scene, _entity: Entity) {}

    /// Per-frame update over the entities currently matching this system
    fn on_update(
        &mut self,
        scene: &mut Scene,
        entities: &[Entity],
        delta_time: f32,
    ) -> Result<(), EcsError>;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
