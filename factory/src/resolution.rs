//! Per-thread bookkeeping of interfaces under construction.

use crate::error::{FactoryError, Result};
use std::cell::RefCell;

thread_local! {
  // Interfaces currently being resolved on this thread, in entry order,
  // tagged with the id of the factory resolving them. A thread is one call
  // chain, so concurrent resolutions on other threads never see this stack.
  static RESOLVING_STACK: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// Fails with `CircularDependency` if `interface` is already being resolved
/// by `factory_id` on this thread.
pub(crate) fn ensure_not_resolving(factory_id: usize, interface: &str) -> Result<()> {
  RESOLVING_STACK.with(|stack| {
    let stack = stack.borrow();
    if !stack.iter().any(|(id, name)| *id == factory_id && name == interface) {
      return Ok(());
    }
    let mut chain: Vec<String> = stack
      .iter()
      .filter(|(id, _)| *id == factory_id)
      .map(|(_, name)| name.clone())
      .collect();
    chain.push(interface.to_owned());
    Err(FactoryError::CircularDependency {
      interface: interface.to_owned(),
      chain,
    })
  })
}

/// An RAII guard marking an interface as under construction.
///
/// Entering fails if the interface is already on the stack. Dropping the guard
/// pops the entry, on success, on error and while unwinding alike.
pub(crate) struct ResolutionGuard {
  factory_id: usize,
  interface: String,
}

impl ResolutionGuard {
  pub(crate) fn enter(factory_id: usize, interface: &str) -> Result<Self> {
    ensure_not_resolving(factory_id, interface)?;
    RESOLVING_STACK.with(|stack| {
      stack
        .borrow_mut()
        .push((factory_id, interface.to_owned()));
    });
    Ok(Self {
      factory_id,
      interface: interface.to_owned(),
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(position) = stack
        .iter()
        .rposition(|(id, name)| *id == self.factory_id && *name == self.interface)
      {
        stack.remove(position);
      }
    });
  }
}

#[cfg(test)]
pub(crate) fn depth() -> usize {
  RESOLVING_STACK.with(|stack| stack.borrow().len())
}
