//! Components used by the scene tests

use std::cell::RefCell;
use std::rc::Rc;

use super::{Component, ComponentContext, EntityId};

#[derive(Debug, Default)]
struct Events {
    starts: Vec<(String, EntityId)>,
    updates: Vec<String>,
    last_dt: Option<f32>,
}

/// Shared record of hook calls
#[derive(Debug, Clone, Default)]
pub struct ProbeLog(Rc<RefCell<Events>>);

impl ProbeLog {
    pub fn starts(&self, label: &str) -> usize {
        self.0.borrow().starts.iter().filter(|(l, _)| l == label).count()
    }

    pub fn start_owners(&self) -> Vec<EntityId> {
        self.0.borrow().starts.iter().map(|(_, e)| *e).collect()
    }

    pub fn updates(&self) -> Vec<String> {
        self.0.borrow().updates.clone()
    }

    pub fn last_dt(&self) -> Option<f32> {
        self.0.borrow().last_dt
    }
}

/// Records every hook call under a label
pub struct Probe {
    label: String,
    log: ProbeLog,
}

impl Probe {
    pub fn new(label: &str, log: &ProbeLog) -> Self {
        Self {
            label: label.to_string(),
            log: log.clone(),
        }
    }
}

impl Component for Probe {
    fn start(&mut self, ctx: &mut ComponentContext<'_>) {
        self.log.0.borrow_mut().starts.push((self.label.clone(), ctx.entity()));
    }

    fn update(&mut self, _ctx: &mut ComponentContext<'_>, dt: f32) {
        let mut events = self.log.0.borrow_mut();
        events.updates.push(self.label.clone());
        events.last_dt = Some(dt);
    }
}

/// Plain data component
#[derive(Debug, Clone, PartialEq)]
pub struct Tag(pub i32);

impl Component for Tag {}

/// Parents `child` and attaches a probe to it on its first update
pub struct Spawner {
    child: EntityId,
    probe: Option<Probe>,
}

impl Spawner {
    pub fn new(child: EntityId, probe: Probe) -> Self {
        Self {
            child,
            probe: Some(probe),
        }
    }
}

impl Component for Spawner {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) {
        let Some(probe) = self.probe.take() else {
            return;
        };
        let parent = ctx.entity();
        ctx.commands().add_child(parent, self.child);
        ctx.commands().spawn_component(self.child, probe);
    }
}
