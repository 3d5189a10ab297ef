//! Grammar-driven tree assembly.
//!
//! Matching a segment stream against a grammar is naturally a recursive
//! descent (a group's children may themselves be groups), but the walk
//! is written here as an explicit `Vec<Frame>` stack instead of native
//! call recursion, so the builder's state at any point is a plain value
//! the caller could in principle snapshot or resume rather than a frozen
//! call stack. Lookahead is one segment: a group is entered only when
//! the next unconsumed segment's tag matches one of the group's leading
//! candidate tags, and nothing is ever un-consumed once matched.

use edi_grammar::{FieldSchemaEntry, Grammar, NodeIndex};
use edi_types::RawSegment;
use edi_validate::diagnostic::Severity;
use edi_validate::{codes, Diagnostic, DiagnosticCollector, FieldValue, Location};

use crate::config::{BuilderConfig, EmptySegmentHandling, UnknownSegmentPolicy};
use crate::error::BuildError;
use crate::tree::{AssembledGroup, AssembledSegment, GroupInstance, TreeNode};

/// One group currently being matched: which child it's working through,
/// the nodes matched so far for the instance in progress, and the
/// instances already completed for this group's own repetition.
struct Frame<'a> {
    node: NodeIndex,
    child_index: usize,
    current_nodes: Vec<TreeNode<'a>>,
    instances: Vec<GroupInstance<'a>>,
}

impl<'a> Frame<'a> {
    fn new(node: NodeIndex) -> Self {
        Self {
            node,
            child_index: 0,
            current_nodes: Vec::new(),
            instances: Vec::new(),
        }
    }
}

/// Walks a grammar against a flat segment slice (the ST..SE or UNH..UNT
/// body, with the envelope already stripped by the caller) and produces
/// an [`AssembledGroup`] rooted at the grammar's root node.
pub struct TreeBuilder<'a> {
    grammar: &'a Grammar,
    config: BuilderConfig,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(grammar: &'a Grammar, config: BuilderConfig) -> Self {
        Self { grammar, config }
    }

    pub fn build(
        &self,
        segments: &[RawSegment<'a>],
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<AssembledGroup<'a>, BuildError> {
        if segments.is_empty() {
            return Err(BuildError::NoSegments);
        }
        let root = self.grammar.root();
        if self.grammar.node(root).children().is_empty() {
            return Err(BuildError::EmptyGrammar(self.grammar.id.clone()));
        }

        let mut stack: Vec<Frame<'a>> = vec![Frame::new(root)];
        let mut cursor = 0usize;

        let root_group = loop {
            let top = stack.len() - 1;
            let node = self.grammar.node(stack[top].node);
            let children = node.children();

            if stack[top].child_index >= children.len() {
                let finished_nodes = std::mem::take(&mut stack[top].current_nodes);
                stack[top].instances.push(GroupInstance { nodes: finished_nodes });
                stack[top].child_index = 0;

                let instance_count = stack[top].instances.len() as u32;
                let can_repeat = node.cardinality.allows_more(instance_count)
                    && cursor < segments.len()
                    && self.group_can_start(stack[top].node, &segments[cursor]);
                if can_repeat {
                    self.trace_transition(
                        diagnostics,
                        &stack,
                        cursor,
                        segments,
                        &format!("group '{}' repeats (instance {})", node.name(), instance_count + 1),
                    );
                    continue;
                }

                if instance_count == 0 && node.cardinality.is_mandatory() {
                    diagnostics.emit(
                        codes::E301_STRUCT_MISSING
                            .diagnostic()
                            .with_location(self.current_location(segments, cursor, &stack))
                            .with_expected(format!("{} to occur {}", node.name(), node.cardinality))
                            .with_actual(instance_count.to_string()),
                    );
                } else if instance_count > 0 && !node.cardinality.accepts(instance_count) {
                    diagnostics.emit(
                        codes::E304_STRUCT_UNDERCOUNT
                            .diagnostic()
                            .with_location(self.current_location(segments, cursor, &stack))
                            .with_expected(format!("{} to occur {}", node.name(), node.cardinality))
                            .with_actual(instance_count.to_string()),
                    );
                }

                let group_name = node.name().to_string();
                let finished = stack.pop().unwrap();
                let group = AssembledGroup {
                    name: group_name.clone(),
                    node_index: finished.node,
                    instances: finished.instances,
                };
                self.trace_transition(
                    diagnostics,
                    &stack,
                    cursor,
                    segments,
                    &format!("group '{group_name}' closed with {} instance(s)", group.instances.len()),
                );
                match stack.last_mut() {
                    Some(parent) => {
                        parent.current_nodes.push(TreeNode::Group(group));
                        parent.child_index += 1;
                    }
                    None => break group,
                }
                continue;
            }

            let child_index = children[stack[top].child_index];
            let child = self.grammar.node(child_index);

            if child.is_segment() {
                let tag = child.tag().unwrap();
                let mut occurrences = 0u32;
                while cursor < segments.len()
                    && segments[cursor].is(tag)
                    && child.cardinality.allows_more(occurrences)
                {
                    let segment = &segments[cursor];
                    let path = self.current_path(&stack);
                    if self.is_empty_segment(segment) {
                        self.record_empty_segment(segment, &path, diagnostics);
                    } else {
                        let (values, field_diags) = self.validate_segment(segment, child.fields(), &path);
                        for diag in field_diags {
                            diagnostics.emit(diag);
                        }
                        stack[top].current_nodes.push(TreeNode::Segment(AssembledSegment {
                            raw: segment.clone(),
                            values,
                        }));
                    }
                    cursor += 1;
                    occurrences += 1;
                }
                if occurrences > 0 {
                    self.trace_transition(
                        diagnostics,
                        &stack,
                        cursor,
                        segments,
                        &format!("segment '{tag}' matched ({occurrences} occurrence(s))"),
                    );
                }

                if occurrences == 0 && child.cardinality.is_mandatory() {
                    diagnostics.emit(
                        codes::E301_STRUCT_MISSING
                            .diagnostic()
                            .with_location(self.current_location(segments, cursor, &stack))
                            .with_expected(format!("segment {tag}")),
                    );
                    if !self.config.continue_on_error {
                        // §4.5 step 5 / §7: strict mode abandons the rest of
                        // this subtree instead of continuing to match this
                        // group's remaining children.
                        stack[top].child_index = children.len();
                        continue;
                    }
                } else if occurrences > 0 && !child.cardinality.accepts(occurrences) {
                    diagnostics.emit(
                        codes::E304_STRUCT_UNDERCOUNT
                            .diagnostic()
                            .with_location(self.current_location(segments, cursor, &stack))
                            .with_expected(format!("{tag} to occur {}", child.cardinality))
                            .with_actual(occurrences.to_string()),
                    );
                }

                stack[top].child_index += 1;
                continue;
            }

            // Group child: enter it only on a matching lookahead.
            if cursor < segments.len() && self.group_can_start(child_index, &segments[cursor]) {
                let entered_name = child.name().to_string();
                stack.push(Frame::new(child_index));
                self.trace_transition(
                    diagnostics,
                    &stack,
                    cursor,
                    segments,
                    &format!("group '{entered_name}' entered"),
                );
                continue;
            }

            if child.cardinality.is_mandatory() {
                diagnostics.emit(
                    codes::E301_STRUCT_MISSING
                        .diagnostic()
                        .with_location(self.current_location(segments, cursor, &stack))
                        .with_expected(format!("{} to occur", child.name())),
                );
                if !self.config.continue_on_error {
                    // §4.5 step 5 / §7: strict mode abandons the rest of
                    // this subtree instead of continuing to match this
                    // group's remaining children.
                    stack[top].child_index = children.len();
                    continue;
                }
            }
            stack[top].child_index += 1;
        };

        self.report_trailing(segments, cursor, diagnostics);
        Ok(root_group)
    }

    /// Tags that can plausibly start an occurrence of the group at
    /// `node_index`: its leading children's tags, stopping at (and
    /// including) the first mandatory one, recursing into leading
    /// nested groups the same way.
    fn leading_tags(&self, node_index: NodeIndex) -> Vec<String> {
        let node = self.grammar.node(node_index);
        let mut tags = Vec::new();
        for &child_index in node.children() {
            let child = self.grammar.node(child_index);
            if child.is_segment() {
                tags.push(child.tag().unwrap().to_string());
            } else {
                tags.extend(self.leading_tags(child_index));
            }
            if child.cardinality.is_mandatory() {
                break;
            }
        }
        tags
    }

    fn group_can_start(&self, node_index: NodeIndex, segment: &RawSegment<'_>) -> bool {
        if !self.leading_tags(node_index).iter().any(|tag| segment.is(tag)) {
            return false;
        }
        match self.grammar.node(node_index).hl_level_codes() {
            Some(levels) => segment.is("HL") && levels.iter().any(|level| segment.get_element(2) == level),
            None => true,
        }
    }

    /// Records one step of the §4.5 decision procedure: always as a
    /// `tracing::trace!` event, and additionally as an `I130-DEBUG-
    /// TRANSITION` info diagnostic when the caller opted into
    /// `BuilderConfig::debug` — so a caller inspecting only the
    /// diagnostic stream (not a trace subscriber) can still see the
    /// state machine's path through the grammar.
    fn trace_transition(
        &self,
        diagnostics: &mut DiagnosticCollector,
        stack: &[Frame<'a>],
        cursor: usize,
        segments: &[RawSegment<'_>],
        message: &str,
    ) {
        tracing::trace!(cursor, transition = message, "tree builder transition");
        if !self.config.debug {
            return;
        }
        let location = self.current_location(segments, cursor, stack);
        diagnostics.emit(
            codes::I130_DEBUG_TRANSITION
                .diagnostic()
                .with_location(location)
                .with_actual(message.to_string()),
        );
    }

    fn is_empty_segment(&self, segment: &RawSegment<'_>) -> bool {
        segment
            .elements
            .iter()
            .all(|reps| reps.iter().all(|comps| comps.iter().all(|c| c.is_empty())))
    }

    fn record_empty_segment(&self, segment: &RawSegment<'_>, path: &str, diagnostics: &mut DiagnosticCollector) {
        let location = self.segment_location(segment, path);
        let diagnostic = match self.config.empty_segment_handling {
            EmptySegmentHandling::Skip => codes::I120_EMPTY_SKIPPED.diagnostic(),
            EmptySegmentHandling::Error => Diagnostic::new(
                codes::I120_EMPTY_SKIPPED.code,
                Severity::Error,
                codes::I120_EMPTY_SKIPPED.category,
                codes::I120_EMPTY_SKIPPED.description,
            ),
        };
        diagnostics.emit(diagnostic.with_location(location));
    }

    fn validate_segment(
        &self,
        segment: &RawSegment<'a>,
        fields: &[FieldSchemaEntry],
        path: &str,
    ) -> (Vec<Option<FieldValue>>, Vec<Diagnostic>) {
        let mut values = Vec::with_capacity(fields.len());
        let mut diagnostics = Vec::new();
        for schema in fields {
            let field_index = schema.position.saturating_sub(1) as usize;
            let rep_count = segment.repetition_count(field_index).max(1);
            let mut first_value = None;
            for rep in 0..rep_count {
                let raw_components = segment.get_repetition(field_index, rep);
                let trimmed;
                let components: &[&str] = if self.config.trim_trailing_spaces {
                    trimmed = raw_components
                        .iter()
                        .map(|c| c.trim_end_matches(' '))
                        .collect::<Vec<_>>();
                    &trimmed
                } else {
                    raw_components
                };
                let location = self.segment_location(segment, path).with_field(schema.position);
                let (value, diags) = edi_validate::validate_components(
                    components,
                    schema,
                    self.grammar.code_sets(),
                    &location,
                    self.config.decimal_mark,
                    self.config.field_validation_mode,
                );
                diagnostics.extend(diags);
                if rep == 0 {
                    first_value = value;
                }
            }
            values.push(first_value);
        }
        (values, diagnostics)
    }

    fn segment_location(&self, segment: &RawSegment<'_>, path: &str) -> Location {
        let location = Location::at_byte(segment.position.byte_offset, segment.position.line)
            .with_segment(segment.id, segment.position.segment_number);
        if path.is_empty() {
            location
        } else {
            location.with_path(path.to_string())
        }
    }

    fn current_location(&self, segments: &[RawSegment<'_>], cursor: usize, stack: &[Frame<'a>]) -> Location {
        let path = self.current_path(stack);
        match segments.get(cursor) {
            Some(segment) => self.segment_location(segment, &path),
            None => segments
                .last()
                .map(|segment| self.segment_location(segment, &path))
                .unwrap_or_default(),
        }
    }

    fn current_path(&self, stack: &[Frame<'a>]) -> String {
        stack
            .iter()
            .skip(1)
            .map(|frame| {
                let node = self.grammar.node(frame.node);
                format!("{}[{}]", node.name(), frame.instances.len() + 1)
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Segments left unconsumed once the root group can no longer
    /// accept more input: each is either a tag the grammar never
    /// declares anywhere (unknown segment) or one it declares but not
    /// at a position the walk could reach (cardinality violation).
    fn report_trailing(&self, segments: &[RawSegment<'_>], cursor: usize, diagnostics: &mut DiagnosticCollector) {
        let root = self.grammar.root();
        for segment in &segments[cursor.min(segments.len())..] {
            let location = self.segment_location(segment, "");
            if self.grammar.find_segment(root, segment.id).is_none() {
                let code = match self.config.unknown_segment_policy {
                    UnknownSegmentPolicy::Strict => codes::E303_SEG_UNKNOWN,
                    UnknownSegmentPolicy::Lenient => codes::W303_SEG_UNKNOWN,
                };
                diagnostics.emit(code.diagnostic().with_location(location).with_actual(segment.id));
            } else {
                diagnostics.emit(
                    codes::E302_STRUCT_TRAILING
                        .diagnostic()
                        .with_location(location)
                        .with_actual(segment.id)
                        .with_suggestion("segment occurred where the grammar did not expect it"),
                );
            }
        }
    }
}
