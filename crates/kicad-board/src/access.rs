//! Single-level queries and replacements over a sequence of nodes.
//!
//! None of these recurse. Callers that need to reach a nested node apply
//! them once per level, e.g. on the board and then on `general`.
use crate::sexpr::Node;

/// Arguments of the first direct child tagged `tag`, or `None`.
pub fn get_value<'a>(seq: &'a [Node], tag: &str) -> Option<&'a [Node]> {
    seq.iter()
        .find(|item| item.tag() == Some(tag))
        .map(Node::args)
}

/// Every direct child tagged `tag`, in original order.
pub fn get_collection<'a>(seq: &'a [Node], tag: &str) -> Vec<&'a Node> {
    seq.iter().filter(|item| item.tag() == Some(tag)).collect()
}

/// New sequence where every direct child tagged `tag` has its arguments
/// replaced by `args`. Other children are shared with the input.
pub fn set_values(seq: &[Node], tag: &str, args: &[Node]) -> Vec<Node> {
    seq.iter()
        .map(|item| {
            if item.tag() == Some(tag) {
                item.with_args(args.to_vec())
            } else {
                item.clone()
            }
        })
        .collect()
}

/// `set_values` applied to the children of a list node, keeping its head.
pub fn set_child_values(node: &Node, tag: &str, args: &[Node]) -> Node {
    Node::list(set_values(node.items(), tag, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::parse;

    fn seq(text: &str) -> Vec<Node> {
        parse(text).unwrap().items().to_vec()
    }

    #[test]
    fn test_get_value_first_match_only() {
        let items = seq("(root (net 0 \"\") (net 1 \"GND\"))");
        let args = get_value(&items, "net").unwrap();
        assert_eq!(args, &[Node::int(0), Node::string("")]);
    }

    #[test]
    fn test_get_value_miss() {
        let items = seq("(root (general (thickness 1.6)))");
        assert!(get_value(&items, "thickness").is_none());
        assert!(get_value(&items, "layers").is_none());
    }

    #[test]
    fn test_get_collection_keeps_order() {
        let items = seq("(root (net 2 \"B\") (gr_line) (net 1 \"A\"))");
        let nets = get_collection(&items, "net");
        assert_eq!(nets.len(), 2);
        assert_eq!(nets[0].atom_at(1), Some("B"));
        assert_eq!(nets[1].atom_at(1), Some("A"));
    }

    #[test]
    fn test_set_values_replaces_every_match() {
        let items = seq("(root (tstamp a) (layer \"F.Cu\") (tstamp b))");
        let out = set_values(&items, "tstamp", &[Node::symbol("c")]);
        assert_eq!(
            Node::list(out),
            parse("(root (tstamp c) (layer \"F.Cu\") (tstamp c))").unwrap()
        );
        // input untouched
        assert_eq!(items[1].tag(), Some("tstamp"));
        assert_eq!(items[1].atom_at(0), Some("a"));
    }

    #[test]
    fn test_set_then_get_is_identity() {
        let items = seq("(kicad_pcb (version 1) (general (thickness 1.6)))");
        let v = vec![parse("(thickness 1.7)").unwrap()];
        let out = set_values(&items, "general", &v);
        assert_eq!(get_value(&out, "general").unwrap(), v.as_slice());
    }

    #[test]
    fn test_set_values_does_not_recurse() {
        let node = parse("(footprint (pad 1 (tstamp a)) (tstamp b))").unwrap();
        let out = set_child_values(&node, "tstamp", &[Node::symbol("z")]);
        assert_eq!(out, parse("(footprint (pad 1 (tstamp a)) (tstamp z))").unwrap());
    }
}
