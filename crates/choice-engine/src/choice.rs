use log::debug;

use crate::blocks::child_blocks;
use crate::dom::{BlockTags, Dom, NodeKind};
use crate::error::ChoiceError;
use crate::host::{RestoreStrategy, SelectionHost};
use crate::position::{Boundary, Point, decode, encode};
use crate::selection::Selection;

type BlocksFn<'a, D> = dyn Fn(&D, <D as Dom>::Node) -> Vec<<D as Dom>::Node> + 'a;

/// Saves and restores the selection inside one editable root.
///
/// The tree is passed to every call rather than held, so a selection can be
/// captured, the content re-rendered, and the selection restored against the
/// new tree as long as it has the same block layout. `'a` bounds the block
/// list function, so it may borrow from the caller.
///
/// ```
/// use choice_engine::{Choice, dom::markup};
///
/// let fixture = markup::parse("<p>Mil|k</p>").unwrap();
/// let mut host = fixture.host(false);
/// let choice = Choice::new(&fixture.tree, fixture.root, &host).unwrap();
///
/// let saved = choice.capture(&fixture.tree, &host).unwrap();
///
/// // ...re-render from the same content...
/// let rebuilt = markup::parse("<p>Milk</p>").unwrap();
/// host.focused = None;
/// let choice = Choice::new(&rebuilt.tree, rebuilt.root, &host).unwrap();
/// choice.restore(&rebuilt.tree, &mut host, &saved).unwrap();
/// assert!(host.focused == Some(rebuilt.root));
/// ```
pub struct Choice<'a, D: Dom> {
    root: D::Node,
    tags: BlockTags,
    blocks: Box<BlocksFn<'a, D>>,
    strategy: RestoreStrategy,
}

impl<D: Dom> std::fmt::Debug for Choice<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Choice")
            .field("root", &self.root)
            .field("tags", &self.tags)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl<'a, D: Dom + 'a> Choice<'a, D> {
    /// Creates a `Choice` for `root`, using its direct children as blocks and
    /// the restore strategy `host` supports.
    ///
    /// # Errors
    ///
    /// [`ChoiceError::NotEditable`] when `root` is not an editable element.
    pub fn new<H>(dom: &D, root: D::Node, host: &H) -> Result<Self, ChoiceError>
    where
        H: SelectionHost<Node = D::Node> + ?Sized,
    {
        if !matches!(dom.kind(root), NodeKind::Element { editable: true, .. }) {
            return Err(ChoiceError::NotEditable);
        }

        Ok(Self {
            root,
            tags: BlockTags::default(),
            blocks: Box::new(|dom: &D, root| child_blocks(dom, root)),
            strategy: Self::support(host),
        })
    }
}

impl<'a, D: Dom> Choice<'a, D> {
    /// Which restore strategy `host` can handle.
    pub fn support<H>(host: &H) -> RestoreStrategy
    where
        H: SelectionHost + ?Sized,
    {
        RestoreStrategy::detect(host)
    }

    /// Replaces the block list function, e.g. with
    /// [`crate::blocks::flatten_lists`].
    #[must_use]
    pub fn with_blocks<F>(mut self, blocks: F) -> Self
    where
        F: Fn(&D, D::Node) -> Vec<D::Node> + 'a,
    {
        self.blocks = Box::new(blocks);
        self
    }

    #[must_use]
    pub fn with_block_tags(mut self, tags: BlockTags) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: RestoreStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn root(&self) -> D::Node {
        self.root
    }

    pub fn strategy(&self) -> RestoreStrategy {
        self.strategy
    }

    /// The current block list for `dom`.
    pub fn blocks(&self, dom: &D) -> Vec<D::Node> {
        (self.blocks)(dom, self.root)
    }

    /// Encodes the host's selection, or `None` when there is no selection,
    /// the root is not focused, or either end lies outside the blocks.
    pub fn capture<H>(&self, dom: &D, host: &H) -> Option<Selection>
    where
        H: SelectionHost<Node = D::Node> + ?Sized,
    {
        let live = host.current_selection()?;
        if !host.is_focused(self.root) {
            debug!("root {:?} is not focused, nothing to capture", self.root);
            return None;
        }

        let blocks = self.blocks(dom);
        let encode_at = |b: Boundary<D::Node>| {
            let point = encode(dom, &self.tags, &blocks, b.node, b.offset);
            if point.is_none() {
                debug!("selection boundary {b:?} is outside root {:?}", self.root);
            }
            point
        };

        let start = encode_at(live.anchor)?;
        let end = if live.is_collapsed() {
            start
        } else {
            encode_at(live.focus)?
        };

        Some(Selection::range(start, end))
    }

    /// Focuses the root and places the host's selection at `selection`.
    ///
    /// # Errors
    ///
    /// [`ChoiceError::BlockOutOfRange`] or [`ChoiceError::OffsetOutOfRange`]
    /// when `selection` does not fit the current tree. Nothing is written to
    /// the host in that case.
    pub fn restore<H>(&self, dom: &D, host: &mut H, selection: &Selection) -> Result<(), ChoiceError>
    where
        H: SelectionHost<Node = D::Node> + ?Sized,
    {
        let blocks = self.blocks(dom);
        let resolve = |point: Point| -> Result<Boundary<D::Node>, ChoiceError> {
            let block = blocks
                .get(point.block)
                .copied()
                .ok_or(ChoiceError::BlockOutOfRange {
                    index: point.block,
                    len: blocks.len(),
                })?;
            decode(dom, block, point.offset)
        };

        let result = self.apply(host, selection, resolve);
        if let Err(err) = &result {
            debug!("cannot restore {selection:?}: {err}");
        }
        result
    }

    fn apply<H, R>(&self, host: &mut H, selection: &Selection, resolve: R) -> Result<(), ChoiceError>
    where
        H: SelectionHost<Node = D::Node> + ?Sized,
        R: Fn(Point) -> Result<Boundary<D::Node>, ChoiceError>,
    {
        if selection.is_collapsed() {
            let at = resolve(selection.end)?;
            host.focus(self.root);
            match self.strategy {
                RestoreStrategy::ExtendBased => host.set_selection(at),
                RestoreStrategy::RangeBased => host.set_selection_range(at, at, false),
            }
            return Ok(());
        }

        match self.strategy {
            RestoreStrategy::ExtendBased => {
                let start = resolve(selection.start)?;
                let end = resolve(selection.end)?;
                host.focus(self.root);
                host.set_selection(start);
                host.extend_selection_to(end);
            }
            RestoreStrategy::RangeBased => {
                let start = resolve(selection.absolute_start())?;
                let end = resolve(selection.absolute_end())?;
                host.focus(self.root);
                host.set_selection_range(start, end, selection.is_backwards());
            }
        }
        Ok(())
    }
}
