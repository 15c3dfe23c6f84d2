//! Explicitly ticked transition scheduler.
//!
//! Nothing here reads a clock: the caller passes the current time to
//! [`TransitionScheduler::tick`], which interpolates every running
//! transition and writes the values into the scene graph.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use log::{debug, trace};
use quiver_scenegraph::node::{AttrValue, NodeId};
use quiver_scenegraph::scene_graph::SceneGraph;

use crate::easing::Easing;
use crate::error::TransitionError;
use crate::interpolate::interpolate_attr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

/// Shared timing: every transition in a group starts on the same tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimingGroup(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOptions {
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
    /// Transitions sharing a timing group start at the same instant
    pub group: Option<TimingGroup>,
    /// Only transitions on the same node and channel interrupt each other
    pub channel: String,
    /// Remove the node from the scene when the transition ends
    pub remove_on_end: bool,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(250),
            delay: Duration::ZERO,
            easing: Easing::default(),
            group: None,
            channel: String::new(),
            remove_on_end: false,
        }
    }
}

impl TransitionOptions {
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_group(mut self, group: TimingGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn removing(mut self) -> Self {
        self.remove_on_end = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    /// Waiting for its start time or its predecessor
    Scheduled,
    Running,
    Finished,
    /// Interrupted, or its node left the scene
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Start {
    /// Starts on the next tick, or with its timing group
    NextTick,
    At(Duration),
    After(TransitionId),
}

#[derive(Debug, Clone)]
struct Transition {
    id: TransitionId,
    node: NodeId,
    targets: Vec<(String, AttrValue)>,
    /// Captured when the transition becomes active
    from: Option<Vec<Option<AttrValue>>>,
    start: Start,
    options: TransitionOptions,
}

impl Transition {
    fn begins_at(&self) -> Option<Duration> {
        match self.start {
            Start::At(t) => Some(t + self.options.delay),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Ended {
    node: NodeId,
    at: Duration,
}

/// Finished transitions are remembered so successors can chain onto them,
/// but only the latest one per node that is still in the scene. Statuses of
/// transitions forgotten this way read as `None` from the next tick on.
#[derive(Debug, Default)]
pub struct TransitionScheduler {
    next_id: u64,
    transitions: Vec<Transition>,
    status: HashMap<TransitionId, TransitionStatus>,
    ended: HashMap<TransitionId, Ended>,
    last_tick: Option<Duration>,
    next_group: u64,
    groups: HashMap<TimingGroup, Duration>,
}

impl TransitionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh timing group. Its start time is fixed by the first tick that
    /// sees one of its transitions.
    pub fn timing_group(&mut self) -> TimingGroup {
        let group = TimingGroup(self.next_group);
        self.next_group += 1;
        group
    }

    /// Number of scheduled or running transitions
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn status(&self, id: TransitionId) -> Option<TransitionStatus> {
        self.status.get(&id).copied()
    }

    /// Whether any transition targets `node`
    pub fn is_animating(&self, node: NodeId) -> bool {
        self.transitions.iter().any(|t| t.node == node)
    }

    fn push(
        &mut self,
        node: NodeId,
        targets: Vec<(String, AttrValue)>,
        start: Start,
        options: TransitionOptions,
    ) -> TransitionId {
        let id = TransitionId(self.next_id);
        self.next_id += 1;
        self.status.insert(id, TransitionStatus::Scheduled);
        self.transitions.push(Transition {
            id,
            node,
            targets,
            from: None,
            start,
            options,
        });
        id
    }

    /// Animates attributes of `node` towards `targets`.
    ///
    /// Any transition already scheduled or running on the same node and
    /// channel is interrupted; the new one starts from whatever values the
    /// node holds when it begins.
    pub fn animate(
        &mut self,
        scene: &SceneGraph,
        node: NodeId,
        targets: impl IntoIterator<Item = (impl Into<String>, AttrValue)>,
        options: TransitionOptions,
    ) -> Result<TransitionId, TransitionError> {
        if !scene.contains(node) {
            return Err(TransitionError::NodeNotFound(node));
        }
        self.interrupt_channel(node, &options.channel);
        let targets = targets.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let id = self.push(node, targets, Start::NextTick, options);
        debug!("scheduled transition {id:?} on {node:?}");
        Ok(id)
    }

    /// Schedules a transition on the same node that starts when `previous`
    /// ends, after its own delay. If `previous` already finished before the
    /// last tick, the new transition starts on the next tick.
    pub fn then(
        &mut self,
        previous: TransitionId,
        targets: impl IntoIterator<Item = (impl Into<String>, AttrValue)>,
        options: TransitionOptions,
    ) -> Result<TransitionId, TransitionError> {
        let (node, start) = match self.transitions.iter().find(|t| t.id == previous) {
            Some(t) => (t.node, Start::After(previous)),
            None => {
                let ended = self
                    .ended
                    .get(&previous)
                    .ok_or(TransitionError::UnknownTransition(previous))?;
                let start = match self.last_tick {
                    Some(now) if ended.at <= now => Start::NextTick,
                    _ => Start::At(ended.at),
                };
                (ended.node, start)
            }
        };
        let targets = targets.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Ok(self.push(node, targets, start, options))
    }

    /// Cancels every transition on `node`, leaving attributes where they are
    pub fn interrupt(&mut self, node: NodeId) {
        self.cancel_where(|t| t.node == node);
    }

    fn interrupt_channel(&mut self, node: NodeId, channel: &str) {
        self.cancel_where(|t| t.node == node && t.options.channel == channel);
    }

    fn cancel_where(&mut self, predicate: impl Fn(&Transition) -> bool) {
        let mut cancelled: HashSet<TransitionId> = HashSet::new();
        self.transitions.retain(|t| {
            let cancel = predicate(t)
                || matches!(t.start, Start::After(prev) if cancelled.contains(&prev));
            if cancel {
                cancelled.insert(t.id);
            }
            !cancel
        });
        for id in &cancelled {
            self.status.insert(*id, TransitionStatus::Cancelled);
        }
        if !cancelled.is_empty() {
            debug!("interrupted {} transitions", cancelled.len());
        }
    }

    /// Drops finished records for removed nodes and all but the latest
    /// finished transition per node, unless a pending successor waits on it.
    /// Statuses are kept only for transitions still known.
    fn prune(&mut self, scene: &SceneGraph) {
        let waited_on: HashSet<TransitionId> = self
            .transitions
            .iter()
            .filter_map(|t| match t.start {
                Start::After(prev) => Some(prev),
                _ => None,
            })
            .collect();
        let mut latest: HashMap<NodeId, TransitionId> = HashMap::new();
        for (id, ended) in &self.ended {
            let entry = latest.entry(ended.node).or_insert(*id);
            if *id > *entry {
                *entry = *id;
            }
        }
        self.ended.retain(|id, ended| {
            waited_on.contains(id)
                || (scene.contains(ended.node) && latest.get(&ended.node) == Some(id))
        });

        let pending: HashSet<TransitionId> = self.transitions.iter().map(|t| t.id).collect();
        let before = self.status.len();
        self.status
            .retain(|id, _| pending.contains(id) || self.ended.contains_key(id));
        if self.status.len() < before {
            trace!("forgot {} settled transitions", before - self.status.len());
        }
    }

    /// Advances all transitions to `now`. Returns the number still pending.
    pub fn tick(&mut self, scene: &mut SceneGraph, now: Duration) -> usize {
        self.prune(scene);
        self.last_tick = Some(now);
        let mut transitions = std::mem::take(&mut self.transitions);
        let mut dropped: HashSet<TransitionId> = HashSet::new();

        for transition in transitions.iter_mut() {
            // Resolve start times; successors of finished transitions start
            // at their predecessor's end
            match transition.start {
                Start::NextTick => {
                    let at = match transition.options.group {
                        Some(group) => *self.groups.entry(group).or_insert(now),
                        None => now,
                    };
                    transition.start = Start::At(at);
                }
                Start::After(prev) => {
                    if let Some(ended) = self.ended.get(&prev) {
                        transition.start = Start::At(ended.at);
                    } else if dropped.contains(&prev)
                        || self.status.get(&prev) == Some(&TransitionStatus::Cancelled)
                    {
                        dropped.insert(transition.id);
                        continue;
                    }
                }
                Start::At(_) => {}
            }

            if !scene.contains(transition.node) {
                trace!("node {:?} left the scene; dropping {:?}", transition.node, transition.id);
                dropped.insert(transition.id);
                continue;
            }

            let Some(begins) = transition.begins_at() else {
                continue;
            };
            if now < begins {
                continue;
            }

            if transition.from.is_none() {
                let captured = transition
                    .targets
                    .iter()
                    .map(|(name, _)| scene.attr(transition.node, name).cloned())
                    .collect();
                transition.from = Some(captured);
            }
            let from = transition.from.as_deref().unwrap_or_default();
            self.status.insert(transition.id, TransitionStatus::Running);

            let duration = transition.options.duration;
            let elapsed = now - begins;
            let t = if duration.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
            };
            let eased = if t >= 1.0 {
                1.0
            } else {
                transition.options.easing.apply(t)
            };
            trace!("transition {:?} at t={t:.3}", transition.id);

            for ((name, target), start) in transition.targets.iter().zip(from.iter()) {
                let value = if eased >= 1.0 {
                    target.clone()
                } else {
                    interpolate_attr(start.as_ref(), target, eased)
                };
                // The node was checked above
                let _ = scene.set_attr(transition.node, name, value);
            }

            if t >= 1.0 {
                let end = begins + duration;
                self.ended.insert(
                    transition.id,
                    Ended {
                        node: transition.node,
                        at: end,
                    },
                );
                self.status.insert(transition.id, TransitionStatus::Finished);
                if transition.options.remove_on_end {
                    let _ = scene.remove(transition.node);
                }
                debug!("transition {:?} finished", transition.id);
            }
        }

        for id in &dropped {
            self.status.insert(*id, TransitionStatus::Cancelled);
        }
        transitions.retain(|t| {
            !dropped.contains(&t.id) && self.status.get(&t.id) != Some(&TransitionStatus::Finished)
        });
        self.transitions = transitions;

        if self.transitions.is_empty() {
            self.groups.clear();
        }
        self.transitions.len()
    }

    /// Ticks from `start` in steps of `step` until every transition is done
    /// or `limit` is reached. Returns the time of the last tick.
    pub fn run_until_idle(
        &mut self,
        scene: &mut SceneGraph,
        start: Duration,
        step: Duration,
        limit: Duration,
    ) -> Duration {
        let mut now = start;
        while self.tick(scene, now) > 0 && now < limit {
            now += step;
        }
        now
    }
}
