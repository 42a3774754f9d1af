use crate::access::{get_collection, get_value, set_values};
use crate::error::BoardError;
use crate::kind::Kind;
use crate::sexpr::{self, Node};
use std::fmt;

const SEED_BOARD: &str = include_str!("../fixtures/initial.kicad_pcb");

/// A `kicad_pcb` document.
///
/// Boards are values: every method that changes something returns a new
/// `Board` and leaves `self` untouched. Unchanged subtrees are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    root: Node,
}

impl Board {
    pub fn from_node(root: Node) -> Result<Self, BoardError> {
        if !root.is_kind(&Kind::KicadPcb) {
            return Err(BoardError::MalformedTree(format!(
                "expected a kicad_pcb root, found {}",
                root.tag().unwrap_or("(untagged)")
            )));
        }
        Ok(Self { root })
    }

    pub fn parse(text: &str) -> Result<Self, BoardError> {
        Self::from_node(sexpr::parse(text)?)
    }

    /// The empty board every project starts from: default stackup and the
    /// unconnected net `(net 0 "")`.
    pub fn seed() -> Result<Self, BoardError> {
        Self::parse(SEED_BOARD)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_node(self) -> Node {
        self.root
    }

    /// Top-level nodes after the `kicad_pcb` head.
    pub fn children(&self) -> &[Node] {
        self.root.args()
    }

    pub fn get_value(&self, tag: &str) -> Option<&[Node]> {
        get_value(self.root.items(), tag)
    }

    pub fn get_collection(&self, tag: &str) -> Vec<&Node> {
        get_collection(self.root.items(), tag)
    }

    pub fn set_values(&self, tag: &str, args: &[Node]) -> Board {
        Board {
            root: Node::list(set_values(self.root.items(), tag, args)),
        }
    }

    /// Append one top-level node.
    pub fn push(&self, node: Node) -> Board {
        self.extend([node])
    }

    pub fn extend(&self, nodes: impl IntoIterator<Item = Node>) -> Board {
        let mut items = self.root.items().to_vec();
        items.extend(nodes);
        Board {
            root: Node::list(items),
        }
    }

    pub fn thickness(&self) -> Option<f64> {
        let general = self.get_value(Kind::General.as_str())?;
        get_value(general, "thickness")?.first()?.as_f64()
    }

    /// Rewrite `general.thickness`, adding a `general` block when the
    /// board has none.
    pub fn set_thickness(&self, thickness: f64) -> Board {
        let value = [Node::number(thickness)];
        match self.get_value(Kind::General.as_str()) {
            Some(general) => {
                let general = if get_value(general, "thickness").is_some() {
                    set_values(general, "thickness", &value)
                } else {
                    let mut general = general.to_vec();
                    general.push(Node::tagged("thickness", value));
                    general
                };
                self.set_values(Kind::General.as_str(), &general)
            }
            None => self.push(Node::tagged(
                Kind::General.as_str(),
                [Node::tagged("thickness", value)],
            )),
        }
    }

    pub fn footprints(&self) -> Vec<&Node> {
        self.get_collection(Kind::Footprint.as_str())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.root)
    }
}
