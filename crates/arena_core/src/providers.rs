use crate::types::{ActorId, Position};

/// Spawn-point database collaborator.
pub trait SpawnProvider: Send {
    /// Load every coordinate of a named spawn file, or `None` when the file
    /// is unknown.
    fn load_spawns(&self, file: &str) -> Option<Vec<Position>>;
}

/// Kit/equipment database collaborator.
pub trait KitProvider: Send {
    fn is_kit(&self, kit: &str) -> bool;
    /// Belt items of a kit, for modes that inspect kit contents.
    fn kit_items(&self, kit: &str) -> Vec<String>;
}

/// Zone database collaborator.
pub trait ZoneProvider: Send {
    fn zone_exists(&self, zone: &str) -> bool;
    fn in_zone(&self, zone: &str, actor: ActorId) -> bool;
}

/// Actor directory and permission collaborator.
pub trait ActorProvider: Send {
    fn display_name(&self, actor: ActorId) -> String;
    fn has_permission(&self, actor: ActorId, permission: &str) -> bool;
    fn is_connected(&self, actor: ActorId) -> bool;
}

/// The collaborator bundle handed to the director at startup.
pub struct Providers {
    pub spawns: Box<dyn SpawnProvider>,
    pub kits: Box<dyn KitProvider>,
    pub zones: Box<dyn ZoneProvider>,
    pub actors: Box<dyn ActorProvider>,
}
