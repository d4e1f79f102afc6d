pub mod builder;
pub mod edge;
pub mod label;
pub mod lpds;
pub mod vertex;
pub mod walker;

pub use builder::{build, Icfg, MAIN_ENTRY};
pub use edge::{Edge, MetaLabel};
pub use label::{LabelId, LabelTable};
pub use lpds::{ingest, Lpds, LpdsEdge, NodeRef};
pub use vertex::{VertexId, VertexTable};
pub use walker::{random_walk, Sentence, SentenceWriter, VecSentenceWriter, WalkConfig};
