//! Event bus: synchronous publish/subscribe between plugins.
//!
//! Subscribers are one-shot systems taking `In<BusEvent>`, registered in the
//! `World` and indexed per [`Topic`] in the [`EventBus`] resource. Because the bus
//! lives in the world, every test world gets its own isolated bus.
//!
//! ```text
//! publish(world, ev)
//!   ├─ snapshot handlers for ev.topic()   (registration order)
//!   └─ for each: world.run_system_with(handler, ev.clone())
//!                 └─ handler's Commands apply right after it returns,
//!                    so a handler may publish again (re-entrant delivery)
//! ```
//!
//! Delivery contract: every subscriber registered at the time of the `publish`
//! call runs exactly once. A handler that was unsubscribed after the snapshot, or
//! that is itself mid-dispatch further up the stack, is skipped without error.
//! Nothing is queued across ticks.
//!
//! A running system is out of the world until its call returns, so a handler that
//! unsubscribes itself cannot be unregistered on the spot. It leaves the topic
//! at once and its system is unregistered by `publish` after the call returns.
//!
//! From ordinary systems, publish through [`PublishExt::publish`] on `Commands`;
//! the event is delivered at the next command sync point of the same tick.

use bevy::ecs::system::SystemId;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::common::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SpeedChange,
    TrailToggle,
    GameStarted,
    GameOver,
    SoundToggle,
    GameStateChange,
    Bounce,
    ScoreChange,
}

/// Which kind of moving body an event refers to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRole {
    Player,
    Adversary,
    Hazard,
    Projectile,
}

/// Immutable once published; subscribers receive their own clone.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    /// New player speed, pixels per tick.
    SpeedChange(f32),
    TrailToggle { enabled: bool, color: Option<Color> },
    GameStarted,
    GameOver,
    SoundToggle(bool),
    GameStateChange { prev: GameState, next: GameState },
    Bounce { role: BodyRole, position: Vec2 },
    ScoreChanged { score: i64, delta: i64 },
}

impl BusEvent {
    pub fn topic(&self) -> Topic {
        match self {
            BusEvent::SpeedChange(_) => Topic::SpeedChange,
            BusEvent::TrailToggle { .. } => Topic::TrailToggle,
            BusEvent::GameStarted => Topic::GameStarted,
            BusEvent::GameOver => Topic::GameOver,
            BusEvent::SoundToggle(_) => Topic::SoundToggle,
            BusEvent::GameStateChange { .. } => Topic::GameStateChange,
            BusEvent::Bounce { .. } => Topic::Bounce,
            BusEvent::ScoreChanged { .. } => Topic::ScoreChange,
        }
    }
}

pub type Handler = SystemId<In<BusEvent>>;

/// Handle returned by [`subscribe`]; pass it to [`unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    topic: Topic,
    handler: Handler,
}

impl Subscription {
    #[inline]
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

#[derive(Resource, Debug, Default)]
pub struct EventBus {
    topics: HashMap<Topic, Vec<Handler>>,
    /// Unsubscribed while running; unregistered once their call returns.
    orphans: Vec<Handler>,
}

impl EventBus {
    fn insert(&mut self, topic: Topic, handler: Handler) {
        self.topics.entry(topic).or_default().push(handler);
    }

    fn remove(&mut self, sub: Subscription) -> bool {
        let Some(handlers) = self.topics.get_mut(&sub.topic) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|h| *h != sub.handler);
        handlers.len() != before
    }

    fn snapshot(&self, topic: Topic) -> Vec<Handler> {
        self.topics.get(&topic).cloned().unwrap_or_default()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topics.get(&topic).map_or(0, Vec::len)
    }
}

/// Subscriptions that belong to the current play session (and to the entities
/// spawned for it). Released in bulk on teardown.
#[derive(Resource, Debug, Default)]
pub struct ScopedSubscriptions(Vec<Subscription>);

impl ScopedSubscriptions {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<EventBus>();
    app.init_resource::<ScopedSubscriptions>();
}

pub fn subscribe<M>(
    world: &mut World,
    topic: Topic,
    handler: impl IntoSystem<In<BusEvent>, (), M> + 'static,
) -> Subscription {
    let handler = world.register_system(handler);
    world.get_resource_or_init::<EventBus>().insert(topic, handler);
    Subscription { topic, handler }
}

/// Returns `false` for handles that were already released.
pub fn unsubscribe(world: &mut World, sub: Subscription) -> bool {
    let removed = world
        .get_resource_mut::<EventBus>()
        .is_some_and(|mut bus| bus.remove(sub));
    if removed && world.unregister_system(sub.handler).is_err() {
        if let Some(mut bus) = world.get_resource_mut::<EventBus>() {
            bus.orphans.push(sub.handler);
        }
    }
    removed
}

/// Unregister orphaned handlers whose calls have returned. Handlers still
/// running further up the stack stay queued for the outer `publish`.
fn reap_orphans(world: &mut World) {
    let orphans = match world.get_resource_mut::<EventBus>() {
        Some(mut bus) if !bus.orphans.is_empty() => std::mem::take(&mut bus.orphans),
        _ => return,
    };
    let mut running = Vec::new();
    for handler in orphans {
        if world.unregister_system(handler).is_err() && world.get_entity(handler.entity()).is_ok() {
            running.push(handler);
        }
    }
    if let Some(mut bus) = world.get_resource_mut::<EventBus>() {
        bus.orphans.extend(running);
    }
}

/// Deliver `event` to every current subscriber of its topic. Returns how many ran.
pub fn publish(world: &mut World, event: BusEvent) -> usize {
    let topic = event.topic();
    let Some(handlers) = world.get_resource::<EventBus>().map(|bus| bus.snapshot(topic)) else {
        return 0;
    };

    let mut delivered = 0;
    for handler in handlers {
        match world.run_system_with(handler, event.clone()) {
            Ok(()) => delivered += 1,
            Err(_) => trace!("skipped stale {topic:?} handler"),
        }
        reap_orphans(world);
    }
    delivered
}

/// Subscribe for the lifetime of the current session.
pub fn subscribe_scoped<M>(
    world: &mut World,
    topic: Topic,
    handler: impl IntoSystem<In<BusEvent>, (), M> + 'static,
) -> Subscription {
    let sub = subscribe(world, topic, handler);
    world.get_resource_or_init::<ScopedSubscriptions>().0.push(sub);
    sub
}

/// Unsubscribe everything registered with [`subscribe_scoped`].
pub fn release_scoped(world: &mut World) -> usize {
    let subs = world
        .get_resource_mut::<ScopedSubscriptions>()
        .map(|mut scoped| std::mem::take(&mut scoped.0))
        .unwrap_or_default();
    subs.into_iter().filter(|sub| unsubscribe(world, *sub)).count()
}

pub trait PublishExt {
    fn publish(&mut self, event: BusEvent);
}

impl PublishExt for Commands<'_, '_> {
    fn publish(&mut self, event: BusEvent) {
        self.queue(move |world: &mut World| {
            publish(world, event);
        });
    }
}
