//! Connectivity groups.
//!
//! The board never checks net ids. `NetAllocator` owns the next id so
//! callers do not have to re-derive it from the board.
use crate::board::Board;
use crate::kind::Kind;
use crate::sexpr::Node;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Net {
    pub id: u32,
    pub name: String,
}

impl Net {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Read `(net <id> "<name>")`. Returns `None` for other shapes.
    pub fn from_node(node: &Node) -> Option<Self> {
        if !node.is_kind(&Kind::Net) {
            return None;
        }
        let id = node.args().first()?.as_i64()?;
        let name = node.atom_at(1).unwrap_or("");
        Some(Self {
            id: u32::try_from(id).ok()?,
            name: name.to_string(),
        })
    }

    pub fn to_node(&self) -> Node {
        create_net(self.id, &self.name)
    }
}

/// `(net <id> "<name>")`
pub fn create_net(id: u32, name: &str) -> Node {
    Node::tagged(
        Kind::Net.as_str(),
        [Node::int(i64::from(id)), Node::string(name)],
    )
}

/// Append a net node. Existing nets are not inspected.
pub fn add_net(board: &Board, net: Node) -> Board {
    board.push(net)
}

/// All well-formed top-level nets, in board order.
pub fn nets(board: &Board) -> Vec<Net> {
    board
        .get_collection(Kind::Net.as_str())
        .into_iter()
        .filter_map(Net::from_node)
        .collect()
}

#[derive(Debug, Clone)]
pub struct NetAllocator {
    next_id: u32,
}

impl NetAllocator {
    pub fn starting_at(next_id: u32) -> Self {
        Self { next_id }
    }

    /// Start after the nets already on `board`: the next id is the count
    /// of existing net nodes.
    pub fn for_board(board: &Board) -> Self {
        let count = board.get_collection(Kind::Net.as_str()).len();
        Self {
            next_id: u32::try_from(count).unwrap_or(u32::MAX),
        }
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Append a net named `name` under the next id.
    pub fn allocate(&mut self, board: &Board, name: &str) -> (Board, Net) {
        let net = Net::new(self.next_id, name);
        self.next_id = self.next_id.saturating_add(1);
        log::debug!("allocated net {} {:?}", net.id, net.name);
        (add_net(board, net.to_node()), net)
    }
}
