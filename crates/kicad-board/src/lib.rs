pub mod access;
pub mod board;
pub mod edge;
pub mod error;
pub mod footprint;
pub mod kind;
pub mod net;
pub mod plan;
pub mod project;
pub mod sexpr;
pub mod stamp;

pub use board::Board;
pub use error::BoardError;
pub use footprint::{FootprintLibrary, FootprintOptions};
pub use sexpr::{Atom, Node};
pub use stamp::{SequentialStamps, StampGenerator, UuidStamps};

use edge::Point;
use net::Net;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FootprintSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<Vec<f64>>,
}

/// What `kicad-board info` prints.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    pub nets: Vec<Net>,
    pub footprints: Vec<FootprintSummary>,
    pub outline: Vec<Point>,
}

/// Summarize a board for display.
pub fn summarize(board: &Board) -> BoardSummary {
    let footprints = board
        .footprints()
        .into_iter()
        .map(|fp| FootprintSummary {
            name: fp.atom_at(0).unwrap_or("").to_string(),
            reference: footprint::footprint_reference(fp).map(str::to_string),
            at: fp
                .find("at")
                .map(|at| at.args().iter().filter_map(Node::as_f64).collect()),
        })
        .collect();

    BoardSummary {
        thickness: board.thickness(),
        nets: net::nets(board),
        footprints,
        outline: edge::get_edge_cut_points(board),
    }
}
