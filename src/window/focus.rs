//! Fixed-capacity window with an edit cursor
//!
//! A window starts out `Filling`. The push that brings it to capacity turns it
//! into a `Filled` window, and only a filled window can be focused and edited.
//! That lets the despike stage rewrite an interior element while the two ends
//! stay untouched as interpolation anchors.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum FocusWindow<T> {
    Filling(FillingWindow<T>),
    Filled(FilledWindow<T>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilledWindow<T> {
    items: VecDeque<T>,
    cursor: usize,
}

impl<T> FocusWindow<T> {
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "focus window capacity must be at least 1");
        FocusWindow::Filling(FillingWindow {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Push `item`, returning the evicted element (only once filled) and the next window
    pub fn push(self, item: T) -> (Option<T>, FocusWindow<T>) {
        match self {
            FocusWindow::Filling(mut window) => {
                window.items.push_back(item);
                if window.items.len() == window.capacity {
                    (
                        None,
                        FocusWindow::Filled(FilledWindow {
                            items: window.items,
                            cursor: 0,
                        }),
                    )
                } else {
                    (None, FocusWindow::Filling(window))
                }
            }
            FocusWindow::Filled(mut window) => {
                let evicted = window.items.pop_front();
                window.items.push_back(item);
                (evicted, FocusWindow::Filled(window))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn capacity(&self) -> usize {
        match self {
            FocusWindow::Filling(window) => window.capacity,
            FocusWindow::Filled(window) => window.capacity(),
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, FocusWindow::Filled(_))
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items().front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.items().back()
    }

    pub fn as_filled_mut(&mut self) -> Option<&mut FilledWindow<T>> {
        match self {
            FocusWindow::Filling(_) => None,
            FocusWindow::Filled(window) => Some(window),
        }
    }

    /// Remaining elements, oldest first
    pub fn into_items(self) -> VecDeque<T> {
        match self {
            FocusWindow::Filling(window) => window.items,
            FocusWindow::Filled(window) => window.items,
        }
    }

    fn items(&self) -> &VecDeque<T> {
        match self {
            FocusWindow::Filling(window) => &window.items,
            FocusWindow::Filled(window) => &window.items,
        }
    }
}

impl<T> FilledWindow<T> {
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Move the cursor; 0 is the oldest slot, out-of-range positions are clamped
    pub fn focus_at(&mut self, position: isize) {
        let last = self.items.len() as isize - 1;
        self.cursor = position.clamp(0, last) as usize;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn focus(&self) -> &T {
        &self.items[self.cursor]
    }

    /// Replace the focused element with `f(current)`
    pub fn modify_focus<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let updated = f(&self.items[self.cursor]);
        self.items[self.cursor] = updated;
    }

    pub fn oldest(&self) -> &T {
        &self.items[0]
    }

    pub fn newest(&self) -> &T {
        &self.items[self.items.len() - 1]
    }

    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }
}
