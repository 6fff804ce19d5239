/// What the owner of a [`ListenerGate`] has to do with the native subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateAction {
    None,
    Attach,
    Detach,
}

/// Keeps a native subscription alive exactly while listeners exist and the node is loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenerGate {
    count: usize,
    attached: bool,
}

impl ListenerGate {
    pub const fn count(&self) -> usize {
        self.count
    }

    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// A listener was registered.
    pub fn add(&mut self, loaded: bool) -> GateAction {
        self.count = self.count.saturating_add(1);
        if loaded { self.attach() } else { GateAction::None }
    }

    /// A listener was removed. The count never goes below zero.
    pub fn remove(&mut self) -> GateAction {
        self.count = self.count.saturating_sub(1);
        if self.count == 0 { self.detach() } else { GateAction::None }
    }

    pub fn loaded(&mut self) -> GateAction {
        if self.count > 0 { self.attach() } else { GateAction::None }
    }

    pub fn unloaded(&mut self) -> GateAction {
        self.detach()
    }

    fn attach(&mut self) -> GateAction {
        if self.attached {
            return GateAction::None;
        }
        self.attached = true;
        GateAction::Attach
    }

    fn detach(&mut self) -> GateAction {
        if !self.attached {
            return GateAction::None;
        }
        self.attached = false;
        GateAction::Detach
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_detach_sequence() {
        let mut gate = ListenerGate::default();
        assert_eq!(gate.add(false), GateAction::None);
        assert_eq!(gate.loaded(), GateAction::Attach);
        assert_eq!(gate.add(true), GateAction::None);
        assert_eq!(gate.unloaded(), GateAction::Detach);
        assert_eq!(gate.loaded(), GateAction::Attach);
        assert_eq!(gate.remove(), GateAction::None);
        assert_eq!(gate.remove(), GateAction::Detach);
        assert_eq!(gate.remove(), GateAction::None);
        assert_eq!(gate.count(), 0);
    }

    #[test]
    fn removing_last_listener_while_unloaded_detaches_nothing() {
        let mut gate = ListenerGate::default();
        gate.add(true);
        assert_eq!(gate.unloaded(), GateAction::Detach);
        assert_eq!(gate.remove(), GateAction::None);
        assert_eq!(gate.loaded(), GateAction::None);
        assert!(!gate.is_attached());
    }
}
