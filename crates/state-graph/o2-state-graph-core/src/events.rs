//! Notifications fired by the state graph component.
//!
//! Each component owns one `EventHub` behind an `Rc`. State players keep only a
//! `Weak` handle to it, so a player outliving its component dispatches nothing.
//! Events are both buffered (for hosts that poll) and pushed to subscribers.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::state::TransitionId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StateGraphEvent {
    StateStarted {
        state: String,
    },
    StateFinished {
        state: String,
    },
    TransitionStarted {
        transition: TransitionId,
        from: String,
        to: String,
    },
    TransitionFinished {
        transition: TransitionId,
        from: String,
        to: String,
    },
    /// Fired once per cancelled transition, in-flight or still queued.
    TransitionCancelled {
        transition: TransitionId,
        from: String,
        to: String,
    },
    TransitionsPlanned {
        target: String,
        path: Vec<TransitionId>,
    },
}

impl StateGraphEvent {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, StateGraphEvent::TransitionCancelled { .. })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SubscriptionId(pub u64);

type Subscriber = Box<dyn FnMut(&StateGraphEvent)>;

pub struct EventHub {
    max_buffered: usize,
    buffered: RefCell<VecDeque<StateGraphEvent>>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    live: RefCell<HashSet<SubscriptionId>>,
    next_id: Cell<u64>,
    dispatching: Cell<bool>,
    // Emitted from inside a callback; delivered after the current event.
    deferred: RefCell<VecDeque<StateGraphEvent>>,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("max_buffered", &self.max_buffered)
            .field("buffered", &self.buffered.borrow().len())
            .field("subscribers", &self.live.borrow().len())
            .finish()
    }
}

impl EventHub {
    pub fn new(max_buffered: usize) -> Self {
        Self {
            max_buffered,
            buffered: RefCell::new(VecDeque::new()),
            subscribers: RefCell::new(Vec::new()),
            live: RefCell::new(HashSet::new()),
            next_id: Cell::new(0),
            dispatching: Cell::new(false),
            deferred: RefCell::new(VecDeque::new()),
        }
    }

    /// Register an observer. Observers added while an event is being dispatched
    /// first see the following event.
    pub fn subscribe(&self, f: impl FnMut(&StateGraphEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0.wrapping_add(1));
        self.live.borrow_mut().insert(id);
        self.subscribers.borrow_mut().push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        if !self.live.borrow_mut().remove(&id) {
            return false;
        }
        // During dispatch the list is detached; it is pruned against `live` on reattach.
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
        true
    }

    /// Deliver `event` to every subscriber, then buffer it. Events emitted by a
    /// subscriber while this runs are queued and delivered in order afterwards.
    pub fn emit(&self, event: StateGraphEvent) {
        if self.dispatching.get() {
            self.deferred.borrow_mut().push_back(event);
            return;
        }
        self.dispatching.set(true);
        let mut next = Some(event);
        while let Some(event) = next {
            self.dispatch(event);
            next = self.deferred.borrow_mut().pop_front();
        }
        self.dispatching.set(false);
    }

    fn dispatch(&self, event: StateGraphEvent) {
        log::trace!("state graph event: {event:?}");

        let mut subs = std::mem::take(&mut *self.subscribers.borrow_mut());
        for (_, f) in subs.iter_mut() {
            f(&event);
        }
        {
            let mut slot = self.subscribers.borrow_mut();
            let added = std::mem::take(&mut *slot);
            subs.extend(added);
            let live = self.live.borrow();
            subs.retain(|(id, _)| live.contains(id));
            *slot = subs;
        }

        if self.max_buffered == 0 {
            return;
        }
        let mut buf = self.buffered.borrow_mut();
        buf.push_back(event);
        if buf.len() > self.max_buffered {
            buf.pop_front();
            log::warn!(
                "state graph event buffer full ({}); dropping oldest event",
                self.max_buffered
            );
        }
    }

    /// Take every buffered event, oldest first.
    pub fn drain(&self) -> Vec<StateGraphEvent> {
        self.buffered.borrow_mut().drain(..).collect()
    }

    /// Copy of the buffered events, oldest first.
    pub fn snapshot(&self) -> Vec<StateGraphEvent> {
        self.buffered.borrow().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffered.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffered.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.buffered.borrow_mut().clear();
    }
}
