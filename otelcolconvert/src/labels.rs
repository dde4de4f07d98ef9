use std::collections::{HashMap, HashSet};

use alloy_syntax::sanitize_identifier;

use crate::config::{InstanceId, Kind};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LabelKey {
    /// Only set for processors, which are converted once per group.
    group: Option<usize>,
    id: InstanceId,
}

impl LabelKey {
    fn new(group: Option<usize>, id: &InstanceId) -> Self {
        let group = match id.kind() {
            Kind::Processor => group,
            _ => None,
        };
        Self {
            group,
            id: id.clone(),
        }
    }
}

/// Assigns Alloy labels to component instances.
///
/// Labels are unique per component kind and type, so two instances that
/// would be converted into the same Alloy component never share a label.
#[derive(Debug, Default)]
pub struct LabelTable {
    labels: HashMap<LabelKey, String>,
    taken: HashSet<(Kind, String, String)>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the label for `id` as converted in the group with index
    /// `group` and name `group_name`. Allocating the same instance again
    /// returns the existing label.
    pub fn allocate(
        &mut self,
        prefix: &str,
        group: Option<usize>,
        group_name: &str,
        id: &InstanceId,
    ) -> &str {
        let key = LabelKey::new(group, id);
        if !self.labels.contains_key(&key) {
            let label = self.unique_label(id, &candidate_label(prefix, group_name, id));
            self.labels.insert(key.clone(), label);
        }
        &self.labels[&key]
    }

    pub fn get(&self, group: Option<usize>, id: &InstanceId) -> Option<&str> {
        self.labels
            .get(&LabelKey::new(group, id))
            .map(String::as_str)
    }

    fn unique_label(&mut self, id: &InstanceId, candidate: &str) -> String {
        let kind = id.kind();
        let typ = id.component_id().typ().to_string();

        let mut label = candidate.to_string();
        let mut n = 2;
        while self.taken.contains(&(kind, typ.clone(), label.clone())) {
            label = format!("{}_{}", candidate, n);
            n += 1;
        }
        self.taken.insert((kind, typ, label.clone()));
        label
    }
}

/// The label an instance gets unless it collides with another one.
fn candidate_label(prefix: &str, group_name: &str, id: &InstanceId) -> String {
    let parts: Vec<&str> = [prefix, group_name, id.component_id().name()]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        "default".to_string()
    } else {
        sanitize_identifier(&parts.join("_"))
    }
}
