//! Edge interrupt dispatch.
//!
//! The vector table can't carry per-pin closures, so interrupt handlers look the line up here
//! and call whatever was registered for it. Registration happens once, during startup, before
//! the edge interrupt is enabled on the controller.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::gpio::{Edge, Line, Trigger};

/// Edge handler. Runs in interrupt context: keep it short and don't block.
pub type EdgeHandler = fn(Edge);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Every slot is taken.
    Full,
    /// The line already has a handler.
    AlreadyRegistered,
}

#[derive(Clone, Copy)]
struct Slot {
    line: Line,
    trigger: Trigger,
    priority: u8,
    handler: EdgeHandler,
}

/// Fixed-capacity map from line to edge handler. Meant to live in a `static`.
pub struct InterruptTable<const N: usize> {
    slots: Mutex<RefCell<[Option<Slot>; N]>>,
}

impl<const N: usize> InterruptTable<N> {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([None; N])),
        }
    }

    /// Attach `handler` to edges on `line` selected by `trigger`.
    pub fn register(
        &self,
        line: Line,
        trigger: Trigger,
        priority: u8,
        handler: EdgeHandler,
    ) -> Result<(), DispatchError> {
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow(cs).borrow_mut();

            if slots.iter().flatten().any(|s| s.line == line) {
                return Err(DispatchError::AlreadyRegistered);
            }

            let free = slots
                .iter_mut()
                .find(|s| s.is_none())
                .ok_or(DispatchError::Full)?;

            *free = Some(Slot {
                line,
                trigger,
                priority,
                handler,
            });
            Ok(())
        })
    }

    /// Run the handler for an edge on `line`. Returns `false` if there's no handler, or its
    /// trigger doesn't select this edge.
    ///
    /// The handler is called outside the critical section, so it may take its own.
    pub fn dispatch(&self, line: Line, edge: Edge) -> bool {
        let handler = critical_section::with(|cs| {
            self.slots
                .borrow(cs)
                .borrow()
                .iter()
                .flatten()
                .find(|s| s.line == line && s.trigger.accepts(edge))
                .map(|s| s.handler)
        });

        match handler {
            Some(h) => {
                h(edge);
                true
            }
            None => {
                log_warn!("Unhandled edge on {}", line.name());
                false
            }
        }
    }

    /// Number of registered handlers.
    pub fn registered(&self) -> usize {
        critical_section::with(|cs| self.slots.borrow(cs).borrow().iter().flatten().count())
    }

    /// Priority the handler for `line` was registered at.
    pub fn priority(&self, line: Line) -> Option<u8> {
        critical_section::with(|cs| {
            self.slots
                .borrow(cs)
                .borrow()
                .iter()
                .flatten()
                .find(|s| s.line == line)
                .map(|s| s.priority)
        })
    }
}

impl<const N: usize> Default for InterruptTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
