use std::collections::{HashMap, HashSet, VecDeque};

use crate::entities::{ReaderProfile, TopologyDocument};
use crate::ports::Topology;
use crate::value_objects::ReaderClass;

#[derive(Debug, Clone)]
struct Link {
    to: String,
    expected_hours: Option<f64>,
}

/// In-memory reader placement and directed node links.
#[derive(Debug, Clone, Default)]
pub struct NetworkTopology {
    readers: HashMap<String, ReaderProfile>,
    links: HashMap<String, Vec<Link>>,
}

impl NetworkTopology {
    pub fn from_document(document: TopologyDocument) -> Self {
        let readers = document
            .readers
            .into_iter()
            .map(|reader| (reader.reader_id.clone(), reader))
            .collect();
        let mut links: HashMap<String, Vec<Link>> = HashMap::new();
        for link in document.links {
            links.entry(link.from).or_default().push(Link {
                to: link.to,
                expected_hours: link.expected_hours,
            });
        }
        Self { readers, links }
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.values().map(Vec::len).sum()
    }
}

impl Topology for NetworkTopology {
    fn reader_class(&self, reader_id: &str) -> ReaderClass {
        self.readers
            .get(reader_id)
            .map(|reader| reader.class)
            .unwrap_or(ReaderClass::Unknown)
    }

    fn node_of(&self, reader_id: &str) -> Option<&str> {
        self.readers.get(reader_id).map(|reader| reader.node_id.as_str())
    }

    fn expected_path(&self, from_node: &str, to_node: &str) -> Option<Vec<String>> {
        if from_node == to_node {
            return Some(vec![from_node.to_string()]);
        }

        // Breadth-first: the fewest hops is the expected path. Links are
        // explored in file order so ties resolve deterministically.
        let mut parents: HashMap<&str, &str> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::from([from_node]);
        let mut queue: VecDeque<&str> = VecDeque::from([from_node]);

        while let Some(node) = queue.pop_front() {
            let Some(next) = self.links.get(node) else {
                continue;
            };
            for link in next {
                let to = link.to.as_str();
                if !seen.insert(to) {
                    continue;
                }
                parents.insert(to, node);
                if to == to_node {
                    let mut path = vec![to.to_string()];
                    let mut cursor = to;
                    while let Some(&parent) = parents.get(cursor) {
                        path.push(parent.to_string());
                        cursor = parent;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(to);
            }
        }
        None
    }

    fn expected_leg_hours(&self, from_node: &str, to_node: &str) -> Option<f64> {
        self.links
            .get(from_node)?
            .iter()
            .find(|link| link.to == to_node)
            .and_then(|link| link.expected_hours)
    }
}
