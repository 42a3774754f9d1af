//! Placing footprint templates on a board.
//!
//! A template is a `.kicad_mod` tree. Synthesis copies its items under a
//! new `footprint` header and runs each item through three steps, in
//! order: stamping, reference substitution, rotation composition.
use crate::access::set_child_values;
use crate::board::Board;
use crate::edge::Point;
use crate::error::BoardError;
use crate::kind::Kind;
use crate::sexpr::{self, Atom, Node};
use crate::stamp::StampGenerator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reference text a template carries until it is placed.
pub const REFERENCE_PLACEHOLDER: &str = "REF**";

/// Where and what to place. Required fields are optional here so that
/// plans read from JSON can be checked with a precise error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FootprintOptions {
    pub position: Option<Point>,
    pub rotation: Option<f64>,
    pub reference: Option<String>,
    pub library_name: Option<String>,
    pub footprint_name: Option<String>,
}

impl FootprintOptions {
    pub fn new(library_name: &str, footprint_name: &str, position: Point) -> Self {
        Self {
            position: Some(position),
            rotation: None,
            reference: None,
            library_name: Some(library_name.to_string()),
            footprint_name: Some(footprint_name.to_string()),
        }
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    fn validate(&self) -> Result<Placement<'_>, BoardError> {
        let position = self
            .position
            .ok_or_else(|| BoardError::InvalidOptions("position".to_string()))?;
        let library_name = non_empty(self.library_name.as_deref())
            .ok_or_else(|| BoardError::InvalidOptions("library_name".to_string()))?;
        let footprint_name = non_empty(self.footprint_name.as_deref())
            .ok_or_else(|| BoardError::InvalidOptions("footprint_name".to_string()))?;
        Ok(Placement {
            position,
            rotation: self.rotation.unwrap_or(0.0),
            reference: self.reference.as_deref(),
            library_name,
            footprint_name,
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy)]
struct Placement<'a> {
    position: Point,
    rotation: f64,
    reference: Option<&'a str>,
    library_name: &'a str,
    footprint_name: &'a str,
}

impl Placement<'_> {
    fn qualified_name(&self) -> String {
        format!("{}:{}", self.library_name, self.footprint_name)
    }

    fn at(&self) -> Node {
        let [x, y] = self.position;
        let mut args = vec![Node::number(x), Node::number(y)];
        if self.rotation != 0.0 {
            args.push(Node::number(self.rotation));
        }
        Node::tagged(Kind::At.as_str(), args)
    }
}

/// A directory of `<library>.pretty/<footprint>.kicad_mod` templates.
#[derive(Debug, Clone)]
pub struct FootprintLibrary {
    root: PathBuf,
}

impl FootprintLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn library_dir(&self, library_name: &str) -> PathBuf {
        self.root.join(format!("{library_name}.pretty"))
    }

    pub fn template_path(&self, library_name: &str, footprint_name: &str) -> PathBuf {
        self.library_dir(library_name)
            .join(format!("{footprint_name}.kicad_mod"))
    }

    pub fn load_template(
        &self,
        library_name: &str,
        footprint_name: &str,
    ) -> Result<Node, BoardError> {
        let path = self.template_path(library_name, footprint_name);
        if !path.is_file() {
            return Err(BoardError::AssetNotFound { path });
        }
        log::debug!("loading footprint template {}", path.display());
        let text = std::fs::read_to_string(&path)?;
        let template = sexpr::parse(&text)?;
        if !template.is_kind(&Kind::Footprint) {
            return Err(BoardError::MalformedTree(format!(
                "{} is not a footprint",
                path.display()
            )));
        }
        Ok(template)
    }
}

/// Template items without the header: the name atom and any top-level
/// stamp or placement, which the new footprint supplies itself.
fn template_body(template: &Node) -> impl Iterator<Item = &Node> {
    let args = template.args();
    let skip_name = usize::from(args.first().is_some_and(|n| !n.is_list()));
    args[skip_name..].iter().filter(|item| {
        !item
            .kind()
            .is_some_and(|k| k.is_stamp() || k == Kind::At)
    })
}

fn stamp_item(item: &Node, stamps: &mut dyn StampGenerator) -> Node {
    if !item.kind().is_some_and(|k| k.is_stampable()) {
        return item.clone();
    }
    let stamp = stamps.next_stamp();
    let has_stamp = item
        .args()
        .iter()
        .any(|child| child.kind().is_some_and(|k| k.is_stamp()));
    let mut items = item.items().to_vec();
    if has_stamp {
        for child in items.iter_mut() {
            if child.kind().is_some_and(|k| k.is_stamp()) {
                *child = child.with_args(vec![stamp.to_node()]);
            }
        }
    } else {
        items.push(stamp.to_tstamp());
    }
    Node::list(items)
}

/// Replace an exact `REF**` in `(<tag> reference "REF**" ...)`.
fn substitute_reference(item: &Node, reference: Option<&str>) -> Node {
    let Some(reference) = reference else {
        return item.clone();
    };
    let items = item.items();
    let is_reference = items.get(1) == Some(&Node::symbol("reference"));
    let is_placeholder = items.get(2).and_then(Node::as_str) == Some(REFERENCE_PLACEHOLDER);
    if !(is_reference && is_placeholder) {
        return item.clone();
    }
    let mut items = items.to_vec();
    items[2] = Node::string(reference);
    Node::list(items)
}

/// Add the footprint rotation to a text or pad placement. Only an integer
/// third component counts as the local rotation.
fn compose_rotation(item: &Node, rotation: f64) -> Node {
    if !item.kind().is_some_and(|k| k.is_rotatable()) {
        return item.clone();
    }
    let Some(at) = item.find(Kind::At.as_str()) else {
        return item.clone();
    };
    let args = at.args();
    let numeric = args.iter().take_while(|a| a.is_number()).count();
    if !(2..=3).contains(&numeric) {
        log::debug!(
            "leaving {} placement with {numeric} numeric components as is",
            item.tag().unwrap_or_default()
        );
        return item.clone();
    }
    let local = match args.get(2) {
        Some(Node::Atom(Atom::Int(r))) if numeric == 3 => *r as f64,
        _ => 0.0,
    };
    let mut placed = vec![args[0].clone(), args[1].clone(), Node::number(local + rotation)];
    placed.extend(args[numeric..].iter().cloned());
    set_child_values(item, Kind::At.as_str(), &placed)
}

/// Build a placed footprint from `template`.
pub fn synthesize_footprint(
    template: &Node,
    options: &FootprintOptions,
    stamps: &mut dyn StampGenerator,
) -> Result<Node, BoardError> {
    let placement = options.validate()?;

    let mut items = vec![
        Node::symbol(Kind::Footprint.as_str()),
        Node::string(placement.qualified_name()),
        stamps.next_stamp().to_tstamp(),
        placement.at(),
    ];
    for item in template_body(template) {
        let item = stamp_item(item, stamps);
        let item = substitute_reference(&item, placement.reference);
        items.push(compose_rotation(&item, placement.rotation));
    }
    Ok(Node::list(items))
}

/// Load the template named by `options` and append the placed footprint.
pub fn add_footprint(
    board: &Board,
    library: &FootprintLibrary,
    options: &FootprintOptions,
    stamps: &mut dyn StampGenerator,
) -> Result<Board, BoardError> {
    let placement = options.validate()?;
    let template = library.load_template(placement.library_name, placement.footprint_name)?;
    let footprint = synthesize_footprint(&template, options, stamps)?;
    log::info!(
        "placed {} at ({}, {})",
        placement.qualified_name(),
        placement.position[0],
        placement.position[1]
    );
    Ok(board.push(footprint))
}

/// `<library>` part of a `"<library>:<footprint>"` name.
pub fn library_prefix(footprint: &Node) -> Option<&str> {
    let name = footprint.atom_at(0)?;
    name.split_once(':').map(|(library, _)| library)
}

/// Text of the `reference` field, if any.
pub fn footprint_reference(footprint: &Node) -> Option<&str> {
    footprint
        .args()
        .iter()
        .find(|item| item.items().get(1) == Some(&Node::symbol("reference")))
        .and_then(|item| item.items().get(2))
        .and_then(Node::as_str)
}
