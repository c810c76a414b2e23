use super::entity::PhysicsEntity;
use super::events::SimEvent;
use super::geometry::{Rect, Vec2};
use crate::level::Tilemap;

/// Behaviour layered on top of the shared physics update.
pub trait Controller {
    /// Runs after the body has moved, collided and advanced its animation this tick.
    fn after_physics(&mut self, body: &mut PhysicsEntity, movement: Vec2, events: &mut Vec<SimEvent>);
}

/// Plain physics body with no behaviour of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericController;

impl Controller for GenericController {
    fn after_physics(&mut self, _body: &mut PhysicsEntity, _movement: Vec2, _events: &mut Vec<SimEvent>) {}
}

#[derive(Debug, Clone)]
pub struct Actor<C> {
    pub body: PhysicsEntity,
    pub controller: C,
}

impl<C: Controller> Actor<C> {
    pub fn new(body: PhysicsEntity, controller: C) -> Self {
        Self { body, controller }
    }

    pub fn update(&mut self, tilemap: &Tilemap, movement: Vec2, events: &mut Vec<SimEvent>) {
        self.body.update(tilemap, movement);
        self.controller.after_physics(&mut self.body, movement, events);
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }
}
