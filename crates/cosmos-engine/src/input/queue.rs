use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::api::error::{CosmosError, CosmosResult};

/// One device-orientation sample, angles in degrees.
/// Either angle may be missing on devices without the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationSample {
    /// Front-to-back tilt.
    pub beta: Option<f32>,
    /// Left-to-right tilt.
    pub gamma: Option<f32>,
}

impl OrientationSample {
    pub fn new(beta: Option<f32>, gamma: Option<f32>) -> Self {
        Self { beta, gamma }
    }

    /// Both angles, or `MalformedOrientationSample` if either is missing.
    pub fn angles(&self) -> CosmosResult<(f32, f32)> {
        match (self.beta, self.gamma) {
            (Some(beta), Some(gamma)) => Ok((beta, gamma)),
            _ => Err(CosmosError::MalformedOrientationSample),
        }
    }
}

/// Raw input events from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A touch/click began at client coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// The pointer moved to client coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// The touch/click ended.
    PointerUp,
    /// Scroll wheel, positive away from the user.
    Wheel { delta_y: f32 },
    Orientation(OrientationSample),
    /// Output surface resized (CSS pixels).
    Resize { width: u32, height: u32 },
}

impl InputEvent {
    /// The channel this event is delivered on.
    pub fn channel(&self) -> InputChannel {
        match self {
            InputEvent::PointerDown { .. }
            | InputEvent::PointerMove { .. }
            | InputEvent::PointerUp => InputChannel::Pointer,
            InputEvent::Wheel { .. } => InputChannel::Wheel,
            InputEvent::Orientation(_) => InputChannel::Orientation,
            InputEvent::Resize { .. } => InputChannel::Resize,
        }
    }
}

/// Event families a consumer can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputChannel {
    Pointer,
    Wheel,
    Orientation,
    Resize,
}

/// A queue of input events.
/// The host writes events in as they arrive; consumers drain them once per frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Anything that can hand out scoped event subscriptions.
/// Consumers receive one of these at construction instead of reaching for
/// global listeners; dropping the returned `Subscription` unregisters it.
pub trait InputSource {
    fn subscribe(&self, channel: InputChannel) -> CosmosResult<Subscription>;
}

struct Subscriber {
    id: u64,
    channel: InputChannel,
    queue: Weak<RefCell<InputQueue>>,
}

struct HubState {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    orientation_permitted: bool,
}

/// In-process event source: the host pushes raw events, the hub copies each
/// one into the queue of every live subscription on the matching channel.
#[derive(Clone)]
pub struct InputHub {
    state: Rc<RefCell<HubState>>,
}

impl InputHub {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(HubState {
                subscribers: Vec::new(),
                next_id: 1,
                orientation_permitted: true,
            })),
        }
    }

    /// Grant or refuse access to the orientation channel.
    /// Refusing revokes every live orientation subscription and discards
    /// samples they have not drained yet; holders see `is_active() == false`
    /// and must subscribe again once access is granted.
    pub fn set_orientation_permitted(&self, permitted: bool) {
        let mut state = self.state.borrow_mut();
        state.orientation_permitted = permitted;
        if permitted {
            return;
        }
        state.subscribers.retain(|s| {
            if s.channel != InputChannel::Orientation {
                return true;
            }
            if let Some(queue) = s.queue.upgrade() {
                queue.borrow_mut().drain();
            }
            false
        });
    }

    pub fn is_orientation_permitted(&self) -> bool {
        self.state.borrow().orientation_permitted
    }

    /// Deliver an event to every subscriber of its channel.
    pub fn push(&self, event: InputEvent) {
        let channel = event.channel();
        let mut state = self.state.borrow_mut();
        state.subscribers.retain(|s| s.queue.strong_count() > 0);
        for sub in state.subscribers.iter().filter(|s| s.channel == channel) {
            if let Some(queue) = sub.queue.upgrade() {
                queue.borrow_mut().push(event);
            }
        }
    }

    /// Number of live subscriptions across all channels.
    pub fn subscriber_count(&self) -> usize {
        self.state
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.queue.strong_count() > 0)
            .count()
    }

    pub fn subscriber_count_for(&self, channel: InputChannel) -> usize {
        self.state
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.channel == channel && s.queue.strong_count() > 0)
            .count()
    }
}

impl Default for InputHub {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for InputHub {
    fn subscribe(&self, channel: InputChannel) -> CosmosResult<Subscription> {
        let mut state = self.state.borrow_mut();
        if channel == InputChannel::Orientation && !state.orientation_permitted {
            return Err(CosmosError::PermissionDenied(channel));
        }
        let id = state.next_id;
        state.next_id += 1;
        let queue = Rc::new(RefCell::new(InputQueue::new()));
        state.subscribers.push(Subscriber {
            id,
            channel,
            queue: Rc::downgrade(&queue),
        });
        Ok(Subscription {
            id,
            channel,
            queue,
            hub: Rc::downgrade(&self.state),
        })
    }
}

/// A registered interest in one channel.
/// Unregisters itself from the hub when dropped.
pub struct Subscription {
    id: u64,
    channel: InputChannel,
    queue: Rc<RefCell<InputQueue>>,
    hub: Weak<RefCell<HubState>>,
}

impl Subscription {
    pub fn channel(&self) -> InputChannel {
        self.channel
    }

    /// Take every event delivered since the last drain.
    pub fn drain(&self) -> Vec<InputEvent> {
        self.queue.borrow_mut().drain()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Whether the hub still delivers to this subscription. False once the
    /// hub is gone or has revoked the channel.
    pub fn is_active(&self) -> bool {
        let Some(hub) = self.hub.upgrade() else {
            return false;
        };
        let active = match hub.try_borrow() {
            Ok(state) => state.subscribers.iter().any(|s| s.id == self.id),
            Err(_) => true,
        };
        active
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            // The hub may be mid-push if a consumer drops inside a callback.
            if let Ok(mut state) = hub.try_borrow_mut() {
                state.subscribers.retain(|s| s.id != self.id);
            }
        }
    }
}
