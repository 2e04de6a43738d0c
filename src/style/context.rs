//! Scoped presentation defaults (figure size, dpi, fonts, palette)
//!
//! A render pushes a [`PresentationContext`] onto a per-thread stack and the
//! returned guard pops it on drop, so the previous defaults are restored on every
//! exit path, including early returns with `?` and unwinding. Renders on other
//! threads never observe it.

use super::units::to_inches;
use crate::config::{FigureSpec, FontSpec};
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static STACK: RefCell<Vec<PresentationContext>> = const { RefCell::new(Vec::new()) };
}

/// Defaults that drawing code reads instead of threading the whole spec around
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationContext {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub font: FontSpec,
    pub palette: Option<String>,
}

impl Default for PresentationContext {
    fn default() -> Self {
        Self {
            width_in: 6.4,
            height_in: 4.8,
            dpi: 100,
            font: FontSpec::default(),
            palette: None,
        }
    }
}

impl PresentationContext {
    pub fn from_spec(spec: &FigureSpec) -> Self {
        Self {
            width_in: to_inches(spec.size.width, spec.size.unit),
            height_in: to_inches(spec.size.height, spec.size.unit),
            dpi: spec.export.dpi,
            font: spec.font.clone(),
            palette: spec.palette.clone(),
        }
    }

    /// Make this the active context until the guard is dropped
    #[must_use = "the context is popped as soon as the guard is dropped"]
    pub fn enter(self) -> ContextGuard {
        STACK.with(|stack| stack.borrow_mut().push(self));
        ContextGuard {
            _not_send: PhantomData,
        }
    }
}

/// Pops the context it was created for when dropped
pub struct ContextGuard {
    // Must be dropped on the thread whose stack it pushed onto.
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// The innermost active context, or the built-in defaults
pub fn current() -> PresentationContext {
    STACK.with(|stack| stack.borrow().last().cloned().unwrap_or_default())
}

/// Number of contexts active on this thread
pub fn depth() -> usize {
    STACK.with(|stack| stack.borrow().len())
}
