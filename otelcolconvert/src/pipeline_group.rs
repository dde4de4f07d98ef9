use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::{ComponentId, InstanceId, Kind, PipelineConfig, PipelineId, Signal};

/// Pipelines of different signals that share a name, e.g. `traces/agent`
/// and `metrics/agent`. Pipelines without a name form the group `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineGroup {
    pub name: String,
    pub metrics: PipelineConfig,
    pub logs: PipelineConfig,
    pub traces: PipelineConfig,
}

impl PipelineGroup {
    /// Groups pipelines by name. Groups are ordered by name.
    pub fn create_all(pipelines: &IndexMap<PipelineId, PipelineConfig>) -> Vec<PipelineGroup> {
        let mut groups: Vec<PipelineGroup> = Vec::new();
        for (id, pipeline) in pipelines {
            let idx = match groups.iter().position(|g| g.name == id.name()) {
                Some(idx) => idx,
                None => {
                    groups.push(PipelineGroup {
                        name: id.name().to_string(),
                        ..Default::default()
                    });
                    groups.len() - 1
                }
            };
            *groups[idx].pipeline_mut(id.signal()) = pipeline.clone();
        }

        groups.sort_by(|a, b| a.name.cmp(&b.name));
        log::debug!("created {} pipeline groups", groups.len());
        groups
    }

    pub fn pipeline(&self, signal: Signal) -> &PipelineConfig {
        match signal {
            Signal::Metrics => &self.metrics,
            Signal::Logs => &self.logs,
            Signal::Traces => &self.traces,
        }
    }

    fn pipeline_mut(&mut self, signal: Signal) -> &mut PipelineConfig {
        match signal {
            Signal::Metrics => &mut self.metrics,
            Signal::Logs => &mut self.logs,
            Signal::Traces => &mut self.traces,
        }
    }

    /// Receiver ids referenced by any pipeline of the group. Includes
    /// connectors used as receivers.
    pub fn receivers(&self) -> Vec<&ComponentId> {
        self.union(|p| &p.receivers)
    }

    pub fn processors(&self) -> Vec<&ComponentId> {
        self.union(|p| &p.processors)
    }

    /// Exporter ids referenced by any pipeline of the group. Includes
    /// connectors used as exporters.
    pub fn exporters(&self) -> Vec<&ComponentId> {
        self.union(|p| &p.exporters)
    }

    fn union<'a, F>(&'a self, f: F) -> Vec<&'a ComponentId>
    where
        F: Fn(&'a PipelineConfig) -> &'a Vec<ComponentId>,
    {
        let mut ids: Vec<&ComponentId> = Vec::new();
        for signal in Signal::ALL {
            for id in f(self.pipeline(signal)) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    /// Computes the components that directly consume the output of `from`
    /// in this group's `signal` pipeline.
    ///
    /// `is_connector` tells connector ids apart from exporters in exporter
    /// lists; connectors are returned as [`Kind::Connector`].
    pub fn next_in_pipeline<F>(
        &self,
        from: &InstanceId,
        signal: Signal,
        is_connector: F,
    ) -> Vec<InstanceId>
    where
        F: Fn(&ComponentId) -> bool,
    {
        let pipeline = self.pipeline(signal);
        let exporters = |skip: Option<&ComponentId>| -> Vec<InstanceId> {
            pipeline
                .exporters
                .iter()
                .filter(|id| Some(*id) != skip)
                .map(|id| {
                    let kind = if is_connector(id) {
                        Kind::Connector
                    } else {
                        Kind::Exporter
                    };
                    InstanceId::new(kind, id.clone())
                })
                .collect()
        };
        let id = from.component_id();

        match from.kind() {
            Kind::Receiver | Kind::Connector => {
                if !pipeline.receivers.contains(id) {
                    return vec![];
                }
                match pipeline.processors.first() {
                    Some(first) => vec![InstanceId::new(Kind::Processor, first.clone())],
                    None => exporters(None),
                }
            }
            Kind::Processor => {
                let Some(idx) = pipeline.processors.iter().position(|p| p == id) else {
                    return vec![];
                };
                match pipeline.processors.get(idx + 1) {
                    Some(next) => vec![InstanceId::new(Kind::Processor, next.clone())],
                    None => exporters(None),
                }
            }
            Kind::Exporter => {
                if !pipeline.exporters.contains(id) {
                    return vec![];
                }
                exporters(Some(id))
            }
            Kind::Extension => vec![],
        }
    }
}

/// Returns a copy of `groups` where every receiver appears only in the
/// first group that references it. Connectors are never removed.
pub fn filter_duplicate_receivers<F>(
    groups: &[PipelineGroup],
    is_connector: F,
) -> Vec<PipelineGroup>
where
    F: Fn(&ComponentId) -> bool,
{
    let mut seen: HashSet<ComponentId> = HashSet::new();
    groups
        .iter()
        .map(|group| {
            let mut filtered = group.clone();
            for signal in Signal::ALL {
                let receivers = &mut filtered.pipeline_mut(signal).receivers;
                receivers.retain(|id| is_connector(id) || !seen.contains(id));
            }
            // Mark after filtering so a group keeps receivers shared by its
            // own pipelines.
            seen.extend(group.receivers().into_iter().cloned());
            filtered
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ComponentId {
        s.parse().unwrap()
    }

    fn ids(s: &[&str]) -> Vec<ComponentId> {
        s.iter().map(|s| id(s)).collect()
    }

    fn pipeline(receivers: &[&str], processors: &[&str], exporters: &[&str]) -> PipelineConfig {
        PipelineConfig {
            receivers: ids(receivers),
            processors: ids(processors),
            exporters: ids(exporters),
        }
    }

    fn pipelines(entries: Vec<(&str, PipelineConfig)>) -> IndexMap<PipelineId, PipelineConfig> {
        entries
            .into_iter()
            .map(|(pid, p)| (pid.parse().unwrap(), p))
            .collect()
    }

    fn no_connectors(_: &ComponentId) -> bool {
        false
    }

    #[test]
    fn test_create_all() {
        let groups = PipelineGroup::create_all(&pipelines(vec![
            ("traces/b", pipeline(&["otlp"], &[], &["debug"])),
            ("metrics", pipeline(&["otlp"], &[], &["debug"])),
            ("traces/a", pipeline(&["otlp/a"], &[], &["debug"])),
            ("logs/b", pipeline(&["otlp"], &[], &["otlp"])),
        ]));

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["", "a", "b"]);
        assert_eq!(groups[2].logs.exporters, ids(&["otlp"]));
        assert_eq!(groups[2].traces.receivers, ids(&["otlp"]));
        assert!(groups[0].traces.receivers.is_empty());
    }

    #[test]
    fn test_union_order() {
        let group = PipelineGroup {
            name: "".into(),
            metrics: pipeline(&["prom", "otlp"], &["batch"], &["otlp"]),
            logs: pipeline(&["otlp"], &["batch", "memory_limiter"], &["debug"]),
            traces: pipeline(&["jaeger"], &[], &["otlp", "debug"]),
        };
        assert_eq!(group.receivers(), vec![&id("prom"), &id("otlp"), &id("jaeger")]);
        assert_eq!(group.processors(), vec![&id("batch"), &id("memory_limiter")]);
        assert_eq!(group.exporters(), vec![&id("otlp"), &id("debug")]);
    }

    #[test]
    fn test_next_in_pipeline() {
        let group = PipelineGroup {
            name: "".into(),
            traces: pipeline(&["otlp"], &["memory_limiter", "batch"], &["otlp", "spanmetrics"]),
            metrics: pipeline(&["otlp"], &[], &["debug", "otlp"]),
            ..Default::default()
        };
        let is_connector = |id: &ComponentId| id.typ() == "spanmetrics";
        let inst = |kind, s: &str| InstanceId::new(kind, id(s));

        let tests = vec![
            (
                inst(Kind::Receiver, "otlp"),
                Signal::Traces,
                vec![inst(Kind::Processor, "memory_limiter")],
            ),
            (
                inst(Kind::Processor, "memory_limiter"),
                Signal::Traces,
                vec![inst(Kind::Processor, "batch")],
            ),
            (
                inst(Kind::Processor, "batch"),
                Signal::Traces,
                vec![inst(Kind::Exporter, "otlp"), inst(Kind::Connector, "spanmetrics")],
            ),
            (
                inst(Kind::Receiver, "otlp"),
                Signal::Metrics,
                vec![inst(Kind::Exporter, "debug"), inst(Kind::Exporter, "otlp")],
            ),
            (
                inst(Kind::Exporter, "debug"),
                Signal::Metrics,
                vec![inst(Kind::Exporter, "otlp")],
            ),
            (inst(Kind::Receiver, "otlp"), Signal::Logs, vec![]),
            (inst(Kind::Processor, "batch"), Signal::Metrics, vec![]),
            (inst(Kind::Receiver, "jaeger"), Signal::Traces, vec![]),
        ];

        for (from, signal, want) in tests {
            let got = group.next_in_pipeline(&from, signal, is_connector);
            assert_eq!(got, want, "next({}, {})", from, signal);
        }
    }

    #[test]
    fn test_filter_duplicate_receivers() {
        let groups = PipelineGroup::create_all(&pipelines(vec![
            ("traces", pipeline(&["otlp", "count"], &[], &["debug"])),
            ("metrics", pipeline(&["otlp"], &[], &["debug"])),
            ("traces/2", pipeline(&["otlp", "count", "jaeger"], &[], &["debug"])),
            ("logs/3", pipeline(&["jaeger"], &[], &["debug"])),
        ]));
        let is_connector = |id: &ComponentId| id.typ() == "count";
        let filtered = filter_duplicate_receivers(&groups, is_connector);

        assert_eq!(filtered[0].traces.receivers, ids(&["otlp", "count"]));
        assert_eq!(filtered[0].metrics.receivers, ids(&["otlp"]));
        assert_eq!(filtered[1].traces.receivers, ids(&["count", "jaeger"]));
        assert!(filtered[2].logs.receivers.is_empty());

        // The unfiltered groups are untouched.
        assert_eq!(groups[1].traces.receivers, ids(&["otlp", "count", "jaeger"]));
        assert_eq!(filter_duplicate_receivers(&groups[..1], no_connectors), groups[..1]);
    }
}
