use crate::board::Board;
use crate::kind::Kind;
use crate::sexpr::Node;
use crate::stamp::StampGenerator;
use serde::Serialize;

pub const EDGE_CUTS_LAYER: &str = "Edge.Cuts";
pub const DEFAULT_EDGE_WIDTH: f64 = 0.1;

pub type Point = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Close a polygon: segment `i` runs from point `i` to point `i + 1`,
/// and the last one wraps back to the first. A single point yields one
/// zero-length segment; no points yield none.
pub fn polyline_to_lines(points: &[Point]) -> Vec<Segment> {
    points
        .iter()
        .enumerate()
        .map(|(i, &start)| Segment {
            start,
            end: points[(i + 1) % points.len()],
        })
        .collect()
}

fn xy(tag: &str, p: Point) -> Node {
    Node::tagged(tag, [Node::number(p[0]), Node::number(p[1])])
}

/// `(gr_line (start x y) (end x y) (layer "Edge.Cuts") (width w) (tstamp ...))`
pub fn edge_line(segment: &Segment, width: f64, stamps: &mut dyn StampGenerator) -> Node {
    Node::tagged(
        Kind::GrLine.as_str(),
        [
            xy(Kind::Start.as_str(), segment.start),
            xy(Kind::End.as_str(), segment.end),
            Node::tagged(Kind::Layer.as_str(), [Node::string(EDGE_CUTS_LAYER)]),
            Node::tagged(Kind::Width.as_str(), [Node::number(width)]),
            stamps.next_stamp().to_tstamp(),
        ],
    )
}

/// Append one outline segment per entry, each with its own stamp.
pub fn set_edge_cut_points(
    board: &Board,
    segments: &[Segment],
    width: f64,
    stamps: &mut dyn StampGenerator,
) -> Board {
    log::debug!("adding {} edge cut segments", segments.len());
    board.extend(segments.iter().map(|s| edge_line(s, width, stamps)))
}

fn is_edge_cut(node: &Node) -> bool {
    node.is_kind(&Kind::GrLine)
        && node.value(Kind::Layer.as_str()).and_then(Node::as_str) == Some(EDGE_CUTS_LAYER)
}

fn point_of(node: &Node, tag: &str) -> Option<Point> {
    let p = node.find(tag)?;
    Some([p.f64_at(0)?, p.f64_at(1)?])
}

/// Start points of the outline segments, in board order. Assumes each
/// segment ends where the next one starts; that is not checked.
pub fn get_edge_cut_points(board: &Board) -> Vec<Point> {
    board
        .children()
        .iter()
        .filter(|node| is_edge_cut(node))
        .filter_map(|node| {
            let start = point_of(node, Kind::Start.as_str());
            if start.is_none() {
                log::debug!("skipping edge cut without a start point");
            }
            start
        })
        .collect()
}

/// Outline segments as stored, in board order.
pub fn get_edge_cut_segments(board: &Board) -> Vec<Segment> {
    board
        .children()
        .iter()
        .filter(|node| is_edge_cut(node))
        .filter_map(|node| {
            Some(Segment {
                start: point_of(node, Kind::Start.as_str())?,
                end: point_of(node, Kind::End.as_str())?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::parse;
    use crate::stamp::SequentialStamps;

    #[test]
    fn test_polyline_closes() {
        let lines = polyline_to_lines(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]);
        assert_eq!(
            lines,
            vec![
                Segment { start: [0.0, 0.0], end: [10.0, 0.0] },
                Segment { start: [10.0, 0.0], end: [10.0, 10.0] },
                Segment { start: [10.0, 10.0], end: [0.0, 0.0] },
            ]
        );
    }

    #[test]
    fn test_single_point_self_loop() {
        let lines = polyline_to_lines(&[[3.0, 4.0]]);
        assert_eq!(lines, vec![Segment { start: [3.0, 4.0], end: [3.0, 4.0] }]);
        assert!(polyline_to_lines(&[]).is_empty());
    }

    #[test]
    fn test_edge_round_trip() {
        let points = vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]];
        let board = Board::seed().unwrap();
        let mut stamps = SequentialStamps::new();
        let board = set_edge_cut_points(
            &board,
            &polyline_to_lines(&points),
            DEFAULT_EDGE_WIDTH,
            &mut stamps,
        );
        assert_eq!(get_edge_cut_points(&board), points);
        assert_eq!(get_edge_cut_segments(&board).len(), 3);
    }

    #[test]
    fn test_segment_node_shape() {
        let mut stamps = SequentialStamps::new();
        let node = edge_line(
            &Segment { start: [0.0, 0.0], end: [1.5, 2.0] },
            0.1,
            &mut stamps,
        );
        let expected = parse(
            "(gr_line (start 0 0) (end 1.5 2) (layer \"Edge.Cuts\") (width 0.1) \
             (tstamp 00000000-0000-0000-0000-000000000001))",
        )
        .unwrap();
        assert_eq!(node, expected);
    }

    #[test]
    fn test_each_segment_gets_fresh_stamp() {
        let mut stamps = SequentialStamps::new();
        let board = set_edge_cut_points(
            &Board::seed().unwrap(),
            &polyline_to_lines(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
            0.2,
            &mut stamps,
        );
        let tstamps: Vec<_> = board
            .get_collection("gr_line")
            .iter()
            .filter_map(|n| n.value("tstamp").and_then(Node::as_str))
            .collect();
        assert_eq!(tstamps.len(), 4);
        assert_eq!(stamps.issued(), 4);
        assert_ne!(tstamps[0], tstamps[1]);
    }

    #[test]
    fn test_ignores_other_layers() {
        let board = Board::parse(
            "(kicad_pcb \
               (gr_line (start 5 5) (end 6 6) (layer \"F.SilkS\") (width 0.12)) \
               (gr_line (start 1 2) (end 3 4) (layer \"Edge.Cuts\") (width 0.1)))",
        )
        .unwrap();
        assert_eq!(get_edge_cut_points(&board), vec![[1.0, 2.0]]);
    }
}
