use std::fmt::{Display, Formatter};

use alloy_syntax::{Block, Body, Expr};

use crate::config::{ComponentId, InstanceId, Kind, OtelConfig, Signal};
use crate::labels::LabelTable;
use crate::pipeline_group::PipelineGroup;
use crate::registry::ConverterRegistry;

/// A reference to an attribute exported by an extension, e.g. the
/// `handler` of an authenticator. Resolved once every extension has a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRef {
    pub extension: ComponentId,
    pub attr: &'static str,
    /// The instance the reference appears in.
    pub referenced_by: InstanceId,
}

pub type AlloyBlock = Block<ExtensionRef>;
pub type AlloyExpr = Expr<ExtensionRef>;

/// A textual reference to the input of a component, such as
/// `otelcol.processor.batch.default.input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumer(String);

impl Consumer {
    pub fn to_expr(&self) -> AlloyExpr {
        Expr::raw(&self.0)
    }
}

impl Display for Consumer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data shared by every conversion within one `append_config` call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConvertContext<'a> {
    pub cfg: &'a OtelConfig,
    /// Unfiltered pipeline groups.
    pub groups: &'a [PipelineGroup],
    pub registry: &'a ConverterRegistry<'a>,
    pub labels: &'a LabelTable,
}

/// The context a converter runs in: the instance being converted, where
/// it sits in the pipelines and the output it appends to.
#[derive(Debug)]
pub struct State<'a> {
    ctx: ConvertContext<'a>,
    body: &'a mut Body<ExtensionRef>,
    group: Option<usize>,
    component_id: InstanceId,
    label: String,
}

impl<'a> State<'a> {
    pub(crate) fn new(
        ctx: ConvertContext<'a>,
        body: &'a mut Body<ExtensionRef>,
        group: Option<usize>,
        component_id: InstanceId,
        label: String,
    ) -> Self {
        Self {
            ctx,
            body,
            group,
            component_id,
            label,
        }
    }

    pub fn component_id(&self) -> &InstanceId {
        &self.component_id
    }

    /// The label the converted component must use.
    pub fn alloy_component_label(&self) -> &str {
        &self.label
    }

    pub fn append_block(&mut self, block: AlloyBlock) {
        self.body.append_block(block);
    }

    /// Computes the consumers of `id`'s `signal` output.
    ///
    /// Receivers and connectors feed every pipeline that lists them, across
    /// all groups. Processors and exporters only feed the current group.
    pub fn next(&self, id: &InstanceId, signal: Signal) -> Vec<Consumer> {
        let groups: Vec<usize> = match id.kind() {
            Kind::Receiver | Kind::Connector => (0..self.ctx.groups.len()).collect(),
            _ => self.group.into_iter().collect(),
        };

        let mut consumers: Vec<Consumer> = Vec::new();
        for idx in groups {
            let group = &self.ctx.groups[idx];
            for succ in group.next_in_pipeline(id, signal, |c| self.ctx.cfg.is_connector(c)) {
                let consumer = self.consumer(idx, &succ);
                if !consumers.contains(&consumer) {
                    consumers.push(consumer);
                }
            }
        }
        consumers
    }

    fn consumer(&self, group: usize, id: &InstanceId) -> Consumer {
        let typ = id.component_id().typ();
        let converter = self.ctx.registry.get(id.kind(), typ);
        let label = match self.ctx.labels.get(Some(group), id) {
            Some(label) => label,
            None => panic!("no label allocated for {}", id),
        };
        Consumer(format!("{}.{}.input", converter.input_component_name, label))
    }

    /// Returns a placeholder for the `attr` export of extension `id`.
    pub fn extension_ref(&self, id: &ComponentId, attr: &'static str) -> AlloyExpr {
        Expr::Placeholder(ExtensionRef {
            extension: id.clone(),
            attr,
            referenced_by: self.component_id.clone(),
        })
    }
}
