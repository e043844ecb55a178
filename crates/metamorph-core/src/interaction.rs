use smallvec::{smallvec, SmallVec};

use crate::viewport::Viewport;
use crate::{NodeId, Point};

/// Input events, already resolved to a node where one is involved. Pointers are screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    SearchChanged(String),
    HoverEnter(NodeId),
    HoverExit,
    Select(NodeId),
    Deselect,
    DragStart { id: NodeId, pointer: Point },
    DragMove { pointer: Point },
    DragEnd,
}

/// What a transition asks of the owner of the simulation. Points are simulation space.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Refilter,
    Reheat,
    Cool,
    Pin { id: NodeId, at: Point },
    Unpin(NodeId),
}

pub type Effects = SmallVec<[Effect; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub id: NodeId,
    pub at: Point,
}

/// Search text plus selection, hover and drag pointers. Never touches the graph itself.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    search: String,
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
    drag: Option<Drag>,
}

impl Interaction {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn hovered(&self) -> Option<&NodeId> {
        self.hovered.as_ref()
    }

    pub fn drag(&self) -> Option<&Drag> {
        self.drag.as_ref()
    }

    pub fn is_hovered(&self, id: &NodeId) -> bool {
        self.hovered.as_ref() == Some(id)
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn update(&mut self, msg: Msg, viewport: &Viewport) -> Effects {
        match msg {
            Msg::SearchChanged(text) => {
                if text == self.search {
                    return Effects::new();
                }
                self.search = text;
                smallvec![Effect::Refilter]
            }
            Msg::HoverEnter(id) => {
                self.hovered = Some(id);
                Effects::new()
            }
            Msg::HoverExit => {
                self.hovered = None;
                Effects::new()
            }
            Msg::Select(id) => {
                self.selected = Some(id);
                Effects::new()
            }
            Msg::Deselect => {
                self.selected = None;
                Effects::new()
            }
            Msg::DragStart { id, pointer } => {
                let at = viewport.invert(pointer);
                let mut out = Effects::new();
                if let Some(prev) = self.drag.take() {
                    if prev.id != id {
                        out.push(Effect::Unpin(prev.id));
                    }
                }
                self.drag = Some(Drag { id: id.clone(), at });
                out.push(Effect::Reheat);
                out.push(Effect::Pin { id, at });
                out
            }
            Msg::DragMove { pointer } => match self.drag.as_mut() {
                Some(drag) => {
                    drag.at = viewport.invert(pointer);
                    smallvec![Effect::Pin {
                        id: drag.id.clone(),
                        at: drag.at,
                    }]
                }
                None => Effects::new(),
            },
            Msg::DragEnd => match self.drag.take() {
                Some(drag) => smallvec![Effect::Cool, Effect::Unpin(drag.id)],
                None => Effects::new(),
            },
        }
    }

    /// Drops pointers to nodes that left the display after a rebuild. Any drag ends with it.
    pub fn retain_displayed(&mut self, displayed: impl Fn(&NodeId) -> bool) {
        if self.selected.as_ref().is_some_and(|id| !displayed(id)) {
            self.selected = None;
        }
        if self.hovered.as_ref().is_some_and(|id| !displayed(id)) {
            self.hovered = None;
        }
        self.drag = None;
    }
}
