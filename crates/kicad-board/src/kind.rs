use crate::sexpr::Node;

/// Tags the board model understands. Anything else is kept as `Other`
/// with its raw children untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    KicadPcb,
    General,
    Net,
    Footprint,
    GrLine,
    FpLine,
    FpText,
    Pad,
    At,
    Tstamp,
    Uuid,
    Layer,
    Width,
    Start,
    End,
    Other(String),
}

impl Kind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "kicad_pcb" => Kind::KicadPcb,
            "general" => Kind::General,
            "net" => Kind::Net,
            "footprint" => Kind::Footprint,
            "gr_line" => Kind::GrLine,
            "fp_line" => Kind::FpLine,
            "fp_text" => Kind::FpText,
            "pad" => Kind::Pad,
            "at" => Kind::At,
            "tstamp" => Kind::Tstamp,
            "uuid" => Kind::Uuid,
            "layer" => Kind::Layer,
            "width" => Kind::Width,
            "start" => Kind::Start,
            "end" => Kind::End,
            other => Kind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Kind::KicadPcb => "kicad_pcb",
            Kind::General => "general",
            Kind::Net => "net",
            Kind::Footprint => "footprint",
            Kind::GrLine => "gr_line",
            Kind::FpLine => "fp_line",
            Kind::FpText => "fp_text",
            Kind::Pad => "pad",
            Kind::At => "at",
            Kind::Tstamp => "tstamp",
            Kind::Uuid => "uuid",
            Kind::Layer => "layer",
            Kind::Width => "width",
            Kind::Start => "start",
            Kind::End => "end",
            Kind::Other(tag) => tag,
        }
    }

    /// Footprint items that carry their own identity stamp.
    pub fn is_stampable(&self) -> bool {
        matches!(self, Kind::FpText | Kind::Pad | Kind::GrLine | Kind::FpLine)
    }

    /// Identity stamp children: `tstamp` (KiCad 6) or `uuid` (KiCad 7+).
    pub fn is_stamp(&self) -> bool {
        matches!(self, Kind::Tstamp | Kind::Uuid)
    }

    /// Footprint items whose placement follows the footprint rotation.
    pub fn is_rotatable(&self) -> bool {
        matches!(self, Kind::FpText | Kind::Pad)
    }
}

impl Node {
    /// Classify a list node by its head tag. Atoms and untagged lists
    /// have no kind.
    pub fn kind(&self) -> Option<Kind> {
        self.tag().map(Kind::from_tag)
    }

    pub fn is_kind(&self, kind: &Kind) -> bool {
        self.tag() == Some(kind.as_str())
    }
}
