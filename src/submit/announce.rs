use std::{cell::RefCell, collections::VecDeque, fmt, rc::Rc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Polite,
    Assertive,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Polite => write!(f, "polite"),
            Priority::Assertive => write!(f, "assertive"),
        }
    }
}

/// Sink for messages meant for assistive technology.
pub trait Announcer {
    fn announce(&mut self, message: &str, priority: Priority);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub message: String,
    pub priority: Priority,
}

/// Shared queue the front-end drains into its status line.
///
/// Clones share the same queue, so one handle can be given to the pipeline
/// while another stays with the view.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementQueue {
    inner: Rc<RefCell<VecDeque<Announcement>>>,
}

impl AnnouncementQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Announcement> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn last(&self) -> Option<Announcement> {
        self.inner.borrow().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl Announcer for AnnouncementQueue {
    fn announce(&mut self, message: &str, priority: Priority) {
        self.inner.borrow_mut().push_back(Announcement {
            message: message.to_string(),
            priority,
        });
    }
}
