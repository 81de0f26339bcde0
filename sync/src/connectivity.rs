use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn is_online(self) -> bool {
        self == Connectivity::Online
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Reconnected,
    Disconnected,
}

/// Two-state machine over platform reachability signals. Only a change of
/// state produces a transition, so repeated signals are harmless.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    online: AtomicBool,
}

impl ConnectivityMonitor {
    pub fn new(initial: Connectivity) -> Self {
        Self {
            online: AtomicBool::new(initial.is_online()),
        }
    }

    pub fn current(&self) -> Connectivity {
        Connectivity::from_reachable(self.is_online())
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn observe(&self, signal: Connectivity) -> Option<Transition> {
        let was_online = self.online.swap(signal.is_online(), Ordering::SeqCst);
        match (was_online, signal) {
            (false, Connectivity::Online) => Some(Transition::Reconnected),
            (true, Connectivity::Offline) => Some(Transition::Disconnected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_edge_triggered() {
        let monitor = ConnectivityMonitor::new(Connectivity::Offline);
        assert!(!monitor.is_online());

        assert_eq!(monitor.observe(Connectivity::Offline), None);
        assert_eq!(
            monitor.observe(Connectivity::Online),
            Some(Transition::Reconnected)
        );
        assert_eq!(monitor.observe(Connectivity::Online), None);
        assert_eq!(
            monitor.observe(Connectivity::Offline),
            Some(Transition::Disconnected)
        );
        assert_eq!(monitor.current(), Connectivity::Offline);
    }

    #[test]
    fn test_initial_state_online() {
        let monitor = ConnectivityMonitor::new(Connectivity::from_reachable(true));
        assert_eq!(monitor.current(), Connectivity::Online);
        assert_eq!(monitor.observe(Connectivity::Online), None);
    }
}
