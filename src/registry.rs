use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::context::{ConnectionContext, GroupContext};

/// All live connections, in order of acceptance, and every group that
/// currently has at least one member.
#[derive(Default)]
pub struct Registry {
    connections: HashMap<Uuid, ConnectionContext>,
    order: Vec<Uuid>,
    groups: BTreeMap<String, GroupContext>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn insert(&mut self, ctx: ConnectionContext) {
        let connection_id = ctx.connection_id;
        if self.connections.insert(connection_id, ctx).is_none() {
            self.order.push(connection_id);
        }
    }

    pub fn remove(&mut self, connection_id: &Uuid) -> Option<ConnectionContext> {
        let removed = self.connections.remove(connection_id)?;
        self.order.retain(|id| id != connection_id);
        Some(removed)
    }

    pub fn get(&self, connection_id: &Uuid) -> Option<&ConnectionContext> {
        self.connections.get(connection_id)
    }

    pub fn get_mut(&mut self, connection_id: &Uuid) -> Option<&mut ConnectionContext> {
        self.connections.get_mut(connection_id)
    }

    pub fn contains(&self, connection_id: &Uuid) -> bool {
        self.connections.contains_key(connection_id)
    }

    /// Connections in order of acceptance.
    pub fn iter(&self) -> impl Iterator<Item = &ConnectionContext> {
        self.order.iter().filter_map(|id| self.connections.get(id))
    }

    pub fn active(&self) -> impl Iterator<Item = &ConnectionContext> {
        self.iter().filter(|c| c.is_active())
    }

    pub fn find_by_nick(&self, nick: &str) -> Option<&ConnectionContext> {
        self.active().find(|c| c.nick.as_deref() == Some(nick))
    }

    pub fn nick_in_use(&self, nick: &str) -> bool {
        self.find_by_nick(nick).is_some()
    }

    pub fn members(&self, group: &str) -> Vec<Uuid> {
        self.active()
            .filter(|c| c.group.as_deref() == Some(group))
            .map(|c| c.connection_id)
            .collect()
    }

    pub fn member_count(&self, group: &str) -> usize {
        self.active()
            .filter(|c| c.group.as_deref() == Some(group))
            .count()
    }

    pub fn user_count(&self) -> usize {
        self.active().count()
    }

    pub fn group(&self, name: &str) -> Option<&GroupContext> {
        self.groups.get(name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut GroupContext> {
        self.groups.get_mut(name)
    }

    pub fn create_group(&mut self, name: &str, moderator: Uuid) {
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| GroupContext::new(Some(moderator)));
    }

    pub fn remove_group(&mut self, name: &str) -> Option<GroupContext> {
        self.groups.remove(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&String, &GroupContext)> {
        self.groups.iter()
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn is_moderator(&self, connection_id: &Uuid, group: &str) -> bool {
        self.group(group)
            .map(|g| g.moderator.as_ref() == Some(connection_id))
            .unwrap_or(false)
    }

    /// Resolves a moderator reference, treating a stale id as vacant.
    pub fn moderator_of(&self, group: &str) -> Option<&ConnectionContext> {
        self.group(group)
            .and_then(|g| g.moderator.as_ref())
            .and_then(|id| self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(registry: &mut Registry, nick: &str, group: &str) -> Uuid {
        let mut ctx = ConnectionContext::new(Uuid::new_v4(), None);
        ctx.nick = Some(nick.to_string());
        ctx.group = Some(group.to_string());
        let id = ctx.connection_id;
        registry.insert(ctx);
        id
    }

    #[test]
    fn iter_keeps_acceptance_order() {
        let mut registry = Registry::new();
        let a = active(&mut registry, "a", "x");
        let b = active(&mut registry, "b", "x");
        let c = active(&mut registry, "c", "y");

        registry.remove(&b);
        let d = active(&mut registry, "d", "x");

        let ids: Vec<Uuid> = registry.iter().map(|c| c.connection_id).collect();
        assert_eq!(vec![a, c, d], ids);
        assert_eq!(vec![a, d], registry.members("x"));
    }

    #[test]
    fn find_by_nick_ignores_connections_not_logged_in() {
        let mut registry = Registry::new();
        registry.insert(ConnectionContext::new(Uuid::new_v4(), None));
        let a = active(&mut registry, "alice", "x");

        assert_eq!(Some(a), registry.find_by_nick("alice").map(|c| c.connection_id));
        assert!(!registry.nick_in_use("bob"));
        assert_eq!(1, registry.user_count());
    }

    #[test]
    fn create_group_keeps_existing_moderator() {
        let mut registry = Registry::new();
        let a = active(&mut registry, "a", "x");
        let b = active(&mut registry, "b", "x");

        registry.create_group("x", a);
        registry.create_group("x", b);

        assert!(registry.is_moderator(&a, "x"));
        assert!(!registry.is_moderator(&b, "x"));
    }

    #[test]
    fn moderator_of_treats_stale_reference_as_vacant() {
        let mut registry = Registry::new();
        let a = active(&mut registry, "a", "x");
        registry.create_group("x", a);
        registry.remove(&a);

        assert!(registry.moderator_of("x").is_none());
    }
}
