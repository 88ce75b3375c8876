//! The set of monitored entities derived from configuration.

use crate::agent::MonitorOptions;
use crate::model::{interface_id, mountpoint_id, service_id};

/// The kind of a monitored entity, selecting how it is announced and collected.
#[derive(Copy, Clone, Eq, PartialEq, Debug, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ComponentKind {
    /// CPU, memory, uptime and temperature of the machine
    Baseline,
    Disk,
    Network,
    Service,
}

/// A monitored target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub kind: ComponentKind,
    /// The configured name: mountpoint, interface or service
    pub target: String,
    /// The sanitized identifier of the target
    pub id: String,
}

impl Entity {
    pub fn new(kind: ComponentKind, target: impl Into<String>) -> Self {
        let target = target.into();
        let id = match kind {
            ComponentKind::Baseline => String::new(),
            ComponentKind::Disk => mountpoint_id(&target),
            ComponentKind::Network => interface_id(&target),
            ComponentKind::Service => service_id(&target),
        };
        Self { kind, target, id }
    }

    /// The component id and value key of one of this entity's metrics.
    pub fn metric_id(&self, metric: &str) -> String {
        if self.id.is_empty() {
            metric.to_string()
        } else {
            format!("{metric}_{id}", id = self.id)
        }
    }
}

/// Monitored entities in configuration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    entities: Vec<Entity>,
}

impl Inventory {
    pub fn build(options: &MonitorOptions) -> Self {
        let mut entities = Vec::new();

        if !options.disable_defaults {
            entities.push(Entity::new(ComponentKind::Baseline, "system"));
        }

        let targets = options
            .disk_mountpoints
            .iter()
            .map(|target| (ComponentKind::Disk, target))
            .chain(
                options
                    .net_interfaces
                    .iter()
                    .map(|target| (ComponentKind::Network, target)),
            )
            .chain(
                options
                    .services
                    .iter()
                    .map(|target| (ComponentKind::Service, target)),
            );

        for (kind, target) in targets {
            let entity = Entity::new(kind, target.as_str());
            if entity.id.is_empty() {
                log::warn!("Skipping {kind} target without identifier: {target:?}");
                continue;
            }
            entities.push(entity);
        }

        Self { entities }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |entity| entity.kind == kind)
    }

    pub fn has_baseline(&self) -> bool {
        self.of_kind(ComponentKind::Baseline).next().is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_build_in_order() {
        let options = MonitorOptions {
            disk_mountpoints: vec!["/".into(), "/data".into()],
            net_interfaces: vec!["eth0".into(), "".into()],
            services: vec!["nginx.service".into()],
            ..Default::default()
        };

        let inventory = Inventory::build(&options);
        let entities = inventory
            .iter()
            .map(|entity| (entity.kind, entity.id.as_str()))
            .collect::<Vec<_>>();

        assert_eq!(
            entities,
            vec![
                (ComponentKind::Baseline, ""),
                (ComponentKind::Disk, "root"),
                (ComponentKind::Disk, "data"),
                (ComponentKind::Network, "eth0"),
                (ComponentKind::Service, "nginx_service"),
            ]
        );
    }

    #[test]
    fn test_without_defaults() {
        let options = MonitorOptions {
            disable_defaults: true,
            ..Default::default()
        };

        let inventory = Inventory::build(&options);
        assert!(!inventory.has_baseline());
        assert_eq!(inventory.iter().count(), 0);
    }

    #[test]
    fn test_metric_id() {
        assert_eq!(
            Entity::new(ComponentKind::Baseline, "system").metric_id("cpu_usage"),
            "cpu_usage"
        );
        assert_eq!(
            Entity::new(ComponentKind::Network, "br-lan").metric_id("net_upload"),
            "net_upload_br_lan"
        );
    }
}
