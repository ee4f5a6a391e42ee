//! JSON save/restore format.
//!
//! ```json
//! {
//!   "version": 1,
//!   "objects": [ { "id": 0, "type": "route", "args": "foo bar", "name": "sel" } ],
//!   "links": [ { "from": 0, "outlet": 2, "to": 1, "inlet": 0 } ]
//! }
//! ```
//!
//! Objects are listed in creation order and links in insertion order, so a
//! dump of a freshly loaded document is byte-identical to its source dump.

use serde::{Deserialize, Serialize};

use crate::dispatch::LiveTopology;
use crate::error::PatchError;
use crate::graph::{Link, Topology};
use crate::node::{NodeId, ObjectInfo};
use crate::registry::Registry;

/// Current document version.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchDocument {
    pub version: u32,
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
    #[serde(default)]
    pub links: Vec<LinkEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub args: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub from: u32,
    pub outlet: usize,
    pub to: u32,
    pub inlet: usize,
}

impl From<Link> for LinkEntry {
    fn from(link: Link) -> Self {
        Self {
            from: link.from.index(),
            outlet: link.outlet,
            to: link.to.index(),
            inlet: link.inlet,
        }
    }
}

impl From<LinkEntry> for Link {
    fn from(entry: LinkEntry) -> Self {
        Link::new(NodeId(entry.from), entry.outlet, NodeId(entry.to), entry.inlet)
    }
}

impl PatchDocument {
    /// Snapshot of a topology's structure.
    pub fn capture<T>(topology: &Topology<T>) -> Self {
        let objects = topology
            .ids()
            .filter_map(|id| topology.info(id))
            .map(|info| ObjectEntry {
                id: info.id().index(),
                kind: info.kind().to_string(),
                args: info.args(),
                name: info.name().map(str::to_string),
            })
            .collect();

        Self {
            version: DOCUMENT_VERSION,
            objects,
            links: topology.links().into_iter().map(LinkEntry::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, PatchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, PatchError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Instantiates every object and link into a new, detached topology.
    ///
    /// Nothing outside the returned value is touched, so a failure at any
    /// entry leaves callers with whatever they had before.
    pub(crate) fn build(&self, registry: &Registry) -> Result<LiveTopology, PatchError> {
        if self.version != DOCUMENT_VERSION {
            return Err(PatchError::MalformedDocument(format!(
                "unsupported version {}",
                self.version
            )));
        }

        let mut graph = LiveTopology::new();
        for entry in &self.objects {
            if entry.id >= NodeId::MAX.0 {
                return Err(PatchError::MalformedDocument(format!("node id {} is out of range", entry.id)));
            }
            let instance = registry.instantiate(&entry.kind, &entry.args)?;
            let info = ObjectInfo {
                id: NodeId(entry.id),
                kind: entry.kind.clone(),
                params: instance.params,
                name: entry.name.clone(),
                shape: instance.shape,
            };
            graph.insert(info, instance.object).map_err(|err| match err {
                PatchError::NameInUse(name) => PatchError::MalformedDocument(format!("duplicate name `{}`", name)),
                other => other,
            })?;
        }

        for entry in &self.links {
            graph.connect(Link::from(*entry)).map_err(|err| match err {
                PatchError::InvalidEndpoint { from, outlet, to, inlet } => PatchError::MalformedDocument(format!(
                    "link {}:{} -> {}:{} does not fit the objects",
                    from, outlet, to, inlet
                )),
                other => other,
            })?;
        }

        Ok(graph)
    }
}
