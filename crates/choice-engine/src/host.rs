//! The selection capability a host platform provides.
//!
//! Capture reads the live selection and focus; restore focuses the root and
//! writes boundaries back. Hosts with a native "extend" primitive get
//! [`RestoreStrategy::ExtendBased`]; others receive the whole range in one
//! call and a `backwards` flag.

use serde::{Deserialize, Serialize};

use crate::position::Boundary;

/// The host's current selection: where it was anchored and where the focus
/// (the moving end) is now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSelection<N> {
    pub anchor: Boundary<N>,
    pub focus: Boundary<N>,
}

impl<N: PartialEq> LiveSelection<N> {
    pub fn new(anchor: Boundary<N>, focus: Boundary<N>) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// How a selection is written back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestoreStrategy {
    /// Collapse at the start, then extend to the end. Preserves direction
    /// natively.
    ExtendBased,
    /// Set the whole range at once and pass the direction along.
    RangeBased,
}

impl RestoreStrategy {
    /// Picks the strategy the host can support.
    pub fn detect<H: SelectionHost + ?Sized>(host: &H) -> Self {
        if host.supports_extend() {
            Self::ExtendBased
        } else {
            Self::RangeBased
        }
    }
}

/// Live selection access for one host.
pub trait SelectionHost {
    /// The host's node handle; matches the [`crate::dom::Dom`] it is used with.
    type Node;

    /// `None` when there is no selection at all.
    fn current_selection(&self) -> Option<LiveSelection<Self::Node>>;

    fn is_focused(&self, element: Self::Node) -> bool;

    fn focus(&mut self, element: Self::Node);

    /// Whether [`SelectionHost::extend_selection_to`] is available.
    fn supports_extend(&self) -> bool;

    /// Replaces the selection with a collapsed one at `at`.
    fn set_selection(&mut self, at: Boundary<Self::Node>);

    /// Moves the focus to `to`, keeping the anchor.
    fn extend_selection_to(&mut self, to: Boundary<Self::Node>);

    /// Replaces the selection with the range `start..end` (document order).
    /// `backwards` asks for the anchor to be placed at `end`.
    fn set_selection_range(
        &mut self,
        start: Boundary<Self::Node>,
        end: Boundary<Self::Node>,
        backwards: bool,
    );
}

/// Every write a [`MemoryHost`] received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall<N> {
    Focus(N),
    Set(Boundary<N>),
    Extend(Boundary<N>),
    SetRange {
        start: Boundary<N>,
        end: Boundary<N>,
        backwards: bool,
    },
}

/// Headless host keeping its selection and focus in memory.
#[derive(Debug, Clone)]
pub struct MemoryHost<N> {
    pub selection: Option<LiveSelection<N>>,
    pub focused: Option<N>,
    pub extend_supported: bool,
    pub calls: Vec<HostCall<N>>,
}

impl<N> Default for MemoryHost<N> {
    fn default() -> Self {
        Self {
            selection: None,
            focused: None,
            extend_supported: true,
            calls: Vec::new(),
        }
    }
}

impl<N> MemoryHost<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host without the extend primitive.
    pub fn without_extend() -> Self {
        Self {
            extend_supported: false,
            ..Self::default()
        }
    }
}

impl<N: Copy + PartialEq> SelectionHost for MemoryHost<N> {
    type Node = N;

    fn current_selection(&self) -> Option<LiveSelection<N>> {
        self.selection
    }

    fn is_focused(&self, element: N) -> bool {
        self.focused == Some(element)
    }

    fn focus(&mut self, element: N) {
        self.focused = Some(element);
        self.calls.push(HostCall::Focus(element));
    }

    fn supports_extend(&self) -> bool {
        self.extend_supported
    }

    fn set_selection(&mut self, at: Boundary<N>) {
        self.selection = Some(LiveSelection::new(at, at));
        self.calls.push(HostCall::Set(at));
    }

    fn extend_selection_to(&mut self, to: Boundary<N>) {
        let anchor = self.selection.map_or(to, |sel| sel.anchor);
        self.selection = Some(LiveSelection::new(anchor, to));
        self.calls.push(HostCall::Extend(to));
    }

    fn set_selection_range(&mut self, start: Boundary<N>, end: Boundary<N>, backwards: bool) {
        self.selection = Some(if backwards {
            LiveSelection::new(end, start)
        } else {
            LiveSelection::new(start, end)
        });
        self.calls.push(HostCall::SetRange {
            start,
            end,
            backwards,
        });
    }
}
