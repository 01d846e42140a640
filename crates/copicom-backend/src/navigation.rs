//! Navigation dispatcher that tolerates a navigation container which is not
//! mounted yet.

use std::collections::VecDeque;

use copicom_bridge::{MessageFromBackend, route::Route};
use tokio::sync::mpsc::{Sender, error::TrySendError};

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("navigation target is gone")]
    Closed,
    #[error("navigation target is not accepting routes right now")]
    Busy,
}

/// Something that can show a route.
pub trait NavigationHandle {
    fn navigate(&self, route: Route) -> Result<(), NavigationError>;
}

impl NavigationHandle for Sender<MessageFromBackend> {
    /// Hands the route to the frontend without waiting.
    fn navigate(&self, route: Route) -> Result<(), NavigationError> {
        self.try_send(MessageFromBackend::Navigate(route))
            .map_err(|e| match e {
                TrySendError::Full(_) => NavigationError::Busy,
                TrySendError::Closed(_) => NavigationError::Closed,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavigatorState {
    Uninitialized,
    Ready,
}

/// What happened to a requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Forwarded,
    Queued,
    Dropped,
}

/// Forwards routes to a [`NavigationHandle`] once it is ready.
///
/// Up to `capacity` routes are held while the handle is not mounted, or while
/// it is mounted but busy. Held routes go out in request order on
/// [`Navigator::mark_ready`] and on every [`Navigator::flush`].
pub struct Navigator<H> {
    handle: H,
    state: NavigatorState,
    pending: VecDeque<Route>,
    capacity: usize,
}

impl<H: NavigationHandle> Navigator<H> {
    pub fn new(handle: H, capacity: usize) -> Self {
        Self {
            handle,
            state: NavigatorState::Uninitialized,
            pending: VecDeque::new(),
            capacity,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == NavigatorState::Ready
    }

    /// Forwards `route` now if the handle is ready and nothing older is still
    /// waiting, otherwise holds it. When the queue is full the oldest request
    /// makes room.
    pub fn request_navigation(&mut self, route: Route) -> Dispatch {
        if self.is_ready() {
            self.flush();
            if self.pending.is_empty() {
                return match self.forward(route) {
                    Ok(dispatch) => dispatch,
                    Err(route) => self.hold(route),
                };
            }
        }
        self.hold(route)
    }

    /// The handle became ready: forward everything that was held, in order.
    pub fn mark_ready(&mut self) {
        self.state = NavigatorState::Ready;
        if !self.pending.is_empty() {
            log::info!("Navigation ready, flushing {} held routes", self.pending.len());
        }
        self.flush();
    }

    /// The handle went away; hold routes again until the next
    /// [`Navigator::mark_ready`].
    pub fn mark_unavailable(&mut self) {
        if self.is_ready() {
            log::info!("Navigation unavailable");
            self.state = NavigatorState::Uninitialized;
        }
    }

    /// Retries held routes while the handle is ready and accepts them.
    pub fn flush(&mut self) {
        while self.is_ready() {
            let Some(route) = self.pending.pop_front() else {
                break;
            };
            if let Err(route) = self.forward(route) {
                self.pending.push_front(route);
                break;
            }
        }
    }

    fn hold(&mut self, route: Route) -> Dispatch {
        if self.capacity == 0 {
            log::warn!("Navigation not available, dropping route {route}");
            return Dispatch::Dropped;
        }
        if self.pending.len() >= self.capacity {
            if let Some(oldest) = self.pending.pop_front() {
                log::warn!("Too many routes waiting for navigation, dropping {oldest}");
            }
        }
        log::info!("Navigation not available, holding route {route}");
        self.pending.push_back(route);
        Dispatch::Queued
    }

    /// Hands `route` to the handle. A busy handle gives the route back.
    fn forward(&self, route: Route) -> Result<Dispatch, Route> {
        match self.handle.navigate(route.clone()) {
            Ok(()) => {
                log::info!("Navigating to {route}");
                Ok(Dispatch::Forwarded)
            }
            Err(NavigationError::Busy) => Err(route),
            Err(e) => {
                log::warn!("Dropping route {route}: {e}");
                Ok(Dispatch::Dropped)
            }
        }
    }
}
