//! Field resolution engine
//!
//! Turns a field's base value (and its optional reference) into the derived
//! numbers the athlete view shows. One resolver serves all four channels;
//! channel differences live in `grammar::CHANNEL_CONFIGS`.
//!
//! Key rules:
//! - Literal cases never look at the reference
//! - Relative cases build on the reference's exact value when there is one,
//!   otherwise on its estimate, and then only produce an estimate
//! - Nothing here fails: unusable input leaves the derived fields empty
//! - Reference chains are followed up to `max_reference_depth` hops

use crate::config::EngineConfig;
use crate::grammar::{channel_config, classify, round_to, FieldSyntax};
use crate::models::{
    Channel, DerivedFieldSet, LineReference, MaxLift, Program, ProgramLine, ResolvedLine,
};

// ---------------------------------------------------------------------------
/// Reference lookup contract
// ---------------------------------------------------------------------------

/// Resolves reference handles into the caller-owned lines and records
pub trait ReferenceLookup {
    fn line(&self, uid: &str) -> Option<&ProgramLine>;
    fn max_lift(&self, uid: &str) -> Option<&MaxLift>;
}

impl ReferenceLookup for Program {
    fn line(&self, uid: &str) -> Option<&ProgramLine> {
        self.find_line(uid)
    }

    fn max_lift(&self, uid: &str) -> Option<&MaxLift> {
        self.find_max_lift(uid)
    }
}

/// What a reference contributes to the channel being resolved
#[derive(Debug, Clone, Copy, PartialEq)]
enum ReferenceNumber {
    /// Referenced line resolved to a value, or a personal-best record
    Exact(f64),
    /// Referenced line only has a supposed value (range, bracketed, ...)
    Estimate(f64),
    Unusable,
}

impl ReferenceNumber {
    fn number(&self) -> Option<f64> {
        match self {
            ReferenceNumber::Exact(n) | ReferenceNumber::Estimate(n) => Some(*n),
            ReferenceNumber::Unusable => None,
        }
    }
}

// ---------------------------------------------------------------------------
/// Resolver
// ---------------------------------------------------------------------------

pub struct FieldResolver<'a, L: ReferenceLookup + ?Sized> {
    lookup: &'a L,
    max_depth: usize,
}

impl<'a, L: ReferenceLookup + ?Sized> FieldResolver<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self::with_config(lookup, &EngineConfig::default())
    }

    pub fn with_config(lookup: &'a L, config: &EngineConfig) -> Self {
        Self {
            lookup,
            max_depth: config.max_reference_depth,
        }
    }

    /// Resolve one channel's base value against its optional reference
    pub fn resolve_field(
        &self,
        channel: Channel,
        base_value: &str,
        reference: Option<&LineReference>,
    ) -> DerivedFieldSet {
        self.resolve_at_depth(channel, base_value, reference, 0)
    }

    /// Resolve all four channels of a line
    pub fn resolve_line(&self, line: &ProgramLine) -> ResolvedLine {
        let mut resolved = ResolvedLine {
            uid: line.uid.clone(),
            ..Default::default()
        };
        for channel in Channel::ALL {
            let field = line.field(channel);
            *resolved.channel_mut(channel) =
                self.resolve_field(channel, &field.base_value, field.reference.as_ref());
        }
        resolved
    }

    fn resolve_at_depth(
        &self,
        channel: Channel,
        base_value: &str,
        reference: Option<&LineReference>,
        depth: usize,
    ) -> DerivedFieldSet {
        let mut derived = DerivedFieldSet::default();
        let Some(syntax) = classify(channel, base_value) else {
            return derived;
        };
        let config = channel_config(channel);
        let round = |value: f64| round_to(value, config.precision);

        match syntax {
            FieldSyntax::Unknown => {
                derived.require = true;
            }
            FieldSyntax::Literal { value } => {
                derived.value = Some(value);
            }
            // Suggestions and ranges are read from the literal, whatever the notation
            FieldSyntax::Bracketed { value, .. } => {
                derived.require = true;
                derived.supposed_value = Some(value);
            }
            FieldSyntax::Range { min, max, .. } => {
                derived.require = true;
                derived.range_min = Some(min);
                derived.range_max = Some(max);
                derived.supposed_value = Some((min + max) / 2.0);
            }
            FieldSyntax::Relative { .. }
            | FieldSyntax::PercentOfReference { .. }
            | FieldSyntax::MaxRelative { .. } => {
                let Some(op) = syntax.operation(config) else {
                    return derived;
                };
                derived.operation = Some(op.to_string());

                // An estimate-only reference yields an estimate, and the
                // requirement flag is not inherited from it.
                match self.reference_number(channel, reference, depth) {
                    ReferenceNumber::Exact(n) => {
                        let value = round(op.apply(n));
                        derived.value = Some(value);
                        derived.computed_value = Some(value);
                    }
                    ReferenceNumber::Estimate(n) => {
                        derived.supposed_value = Some(round(op.apply(n)));
                    }
                    ReferenceNumber::Unusable => {}
                }
            }
        }

        derived
    }

    fn reference_number(
        &self,
        channel: Channel,
        reference: Option<&LineReference>,
        depth: usize,
    ) -> ReferenceNumber {
        match reference {
            None => ReferenceNumber::Unusable,
            Some(LineReference::MaxLift(uid)) => match self.lookup.max_lift(uid) {
                Some(record) => record
                    .numeric_value()
                    .map(ReferenceNumber::Exact)
                    .unwrap_or(ReferenceNumber::Unusable),
                None => {
                    tracing::warn!(%channel, uid = uid.as_str(), "max lift reference not found");
                    ReferenceNumber::Unusable
                }
            },
            Some(LineReference::Line(uid)) => {
                if depth >= self.max_depth {
                    tracing::warn!(
                        %channel,
                        uid = uid.as_str(),
                        max_depth = self.max_depth,
                        "reference chain too deep, leaving field unresolved"
                    );
                    return ReferenceNumber::Unusable;
                }
                let Some(line) = self.lookup.line(uid) else {
                    tracing::warn!(%channel, uid = uid.as_str(), "line reference not found");
                    return ReferenceNumber::Unusable;
                };

                let field = line.field(channel);
                let referenced = self.resolve_at_depth(
                    channel,
                    &field.base_value,
                    field.reference.as_ref(),
                    depth + 1,
                );
                tracing::debug!(%channel, uid = uid.as_str(), depth, ?referenced, "resolved reference line");

                match (referenced.value, referenced.supposed_value) {
                    (Some(value), _) => ReferenceNumber::Exact(value),
                    (None, Some(estimate)) => ReferenceNumber::Estimate(estimate),
                    (None, None) => ReferenceNumber::Unusable,
                }
            }
        }
    }
}

/// Resolve one field with the default configuration
pub fn resolve_field<L: ReferenceLookup + ?Sized>(
    lookup: &L,
    channel: Channel,
    base_value: &str,
    reference: Option<&LineReference>,
) -> DerivedFieldSet {
    FieldResolver::new(lookup).resolve_field(channel, base_value, reference)
}

/// Resolve every line of a program, in schedule storage order
pub fn resolve_program(program: &Program, config: &EngineConfig) -> Vec<ResolvedLine> {
    let resolver = FieldResolver::with_config(program, config);
    program.lines().map(|line| resolver.resolve_line(line)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use crate::models::{LineField, MaxLiftType};
    use crate::test_utils::{line_with, mock_max_lift, program_with_lines};

    fn line_ref(uid: &str) -> Option<LineReference> {
        Some(LineReference::Line(uid.to_string()))
    }

    #[test]
    fn test_plain_literal_needs_no_reference() {
        let program = Program::default();
        let derived = resolve_field(&program, Channel::Load, "100kg", None);
        assert_eq!(
            derived,
            DerivedFieldSet {
                value: Some(100.0),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_unknown_marker_requires_input() {
        let program = Program::default();
        let derived = resolve_field(&program, Channel::Reps, "?", None);
        assert_eq!(
            derived,
            DerivedFieldSet {
                require: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_range_supposed_value_is_mean() {
        let program = Program::default();
        let derived = resolve_field(&program, Channel::Load, "100kg/103kg", None);
        assert!(derived.require);
        assert_eq!(derived.range_min, Some(100.0));
        assert_eq!(derived.range_max, Some(103.0));
        assert_eq!(derived.supposed_value, Some(101.5));
        assert_eq!(derived.value, None);
    }

    #[test]
    fn test_bracketed_literal_is_a_suggestion() {
        let program = Program::default();
        let derived = resolve_field(&program, Channel::Load, "(100kg)", None);
        assert!(derived.require);
        assert_eq!(derived.supposed_value, Some(100.0));
        assert_eq!(derived.value, None);
        assert_eq!(derived.operation, None);
    }

    #[test]
    fn test_percentage_of_exact_line_reference() {
        let program = program_with_lines(vec![line_with("base", Channel::Load, "100kg", None)]);
        let derived = resolve_field(&program, Channel::Load, "70%", line_ref("base").as_ref());
        assert_eq!(
            derived,
            DerivedFieldSet {
                value: Some(70.0),
                computed_value: Some(70.0),
                operation: Some("*0.7".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_signed_additive_against_range_reference() {
        let program = program_with_lines(vec![line_with("base", Channel::Load, "50kg/150kg", None)]);
        let derived = resolve_field(&program, Channel::Load, "-10kg", line_ref("base").as_ref());
        assert_eq!(
            derived,
            DerivedFieldSet {
                require: false,
                supposed_value: Some(90.0),
                operation: Some("-10".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_percentage_of_max_lift_record() {
        let mut program = Program::default();
        program.max_lifts.push(mock_max_lift("ml5", MaxLiftType::FiveRm, "120"));
        let reference = LineReference::MaxLift("ml5".into());

        let derived = resolve_field(&program, Channel::Load, "75%", Some(&reference));
        assert_eq!(derived.value, Some(90.0));
        assert_eq!(derived.computed_value, Some(90.0));
        assert_eq!(derived.operation.as_deref(), Some("*0.75"));

        let signed = resolve_field(&program, Channel::Load, "-10%", Some(&reference));
        assert_eq!(signed.value, Some(108.0));
        assert_eq!(signed.operation.as_deref(), Some("*0.9"));
    }

    #[test]
    fn test_max_relative_reps_against_max_reps_record() {
        let mut program = Program::default();
        program.max_lifts.push(mock_max_lift("mr", MaxLiftType::MaxReps, "15"));
        let reference = LineReference::MaxLift("mr".into());

        let derived = resolve_field(&program, Channel::Reps, "MAX-3", Some(&reference));
        assert_eq!(derived.value, Some(12.0));
        assert_eq!(derived.operation.as_deref(), Some("-3"));
    }

    #[test]
    fn test_missing_reference_keeps_operation_only() {
        let program = Program::default();
        let derived = resolve_field(&program, Channel::Load, "-7.5kg", None);
        assert_eq!(
            derived,
            DerivedFieldSet {
                operation: Some("-7.5".to_string()),
                ..Default::default()
            }
        );

        let dangling = LineReference::Line("gone".into());
        let derived = resolve_field(&program, Channel::Load, "80%", Some(&dangling));
        assert_eq!(derived.operation.as_deref(), Some("*0.8"));
        assert_eq!(derived.value, None);
    }

    #[test]
    fn test_free_text_is_no_prescription() {
        let program = Program::default();
        let derived = resolve_field(&program, Channel::Rpe, "easy, feel it out", None);
        assert_eq!(derived, DerivedFieldSet::default());
    }

    #[test]
    fn test_reference_chain_resolves_through_lines() {
        let program = program_with_lines(vec![
            line_with("a", Channel::Load, "100kg", None),
            line_with("b", Channel::Load, "-10%", line_ref("a")),
            line_with("c", Channel::Load, "+2,5kg", line_ref("b")),
        ]);
        let derived = resolve_field(&program, Channel::Load, "50%", line_ref("c").as_ref());
        assert_approx_eq!(derived.value.unwrap(), 46.25, 1e-9);
        assert_eq!(derived.computed_value, derived.value);
    }

    #[test]
    fn test_reps_results_round_to_whole_reps() {
        let program = program_with_lines(vec![line_with("a", Channel::Reps, "8", None)]);
        let derived = resolve_field(&program, Channel::Reps, "-10%", line_ref("a").as_ref());
        assert_eq!(derived.value, Some(7.0));
        assert_eq!(derived.operation.as_deref(), Some("*0.9"));
    }

    #[test]
    fn test_percentage_range_is_read_from_literal() {
        let program = Program::default();
        let derived = resolve_field(&program, Channel::Load, "70%/80%", None);
        assert_eq!(
            derived,
            DerivedFieldSet {
                require: true,
                range_min: Some(70.0),
                range_max: Some(80.0),
                supposed_value: Some(75.0),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_percentage_range_ignores_reference() {
        let mut program = Program::default();
        program.max_lifts.push(mock_max_lift("one", MaxLiftType::OneRm, "200"));
        let reference = LineReference::MaxLift("one".into());

        let anchored = resolve_field(&program, Channel::Load, "70%/80%", Some(&reference));
        let unanchored = resolve_field(&program, Channel::Load, "70%/80%", None);
        assert_eq!(anchored, unanchored);
        assert_eq!(anchored.operation, None);
    }

    #[test]
    fn test_bracketed_percentage_is_a_literal_suggestion() {
        let program = program_with_lines(vec![line_with("a", Channel::Load, "140kg", None)]);
        let expected = DerivedFieldSet {
            require: true,
            supposed_value: Some(70.0),
            ..Default::default()
        };

        assert_eq!(resolve_field(&program, Channel::Load, "(70%)", None), expected);
        assert_eq!(
            resolve_field(&program, Channel::Load, "(70%)", line_ref("a").as_ref()),
            expected
        );
    }

    #[test]
    fn test_self_reference_degrades_to_unresolved() {
        let program = program_with_lines(vec![line_with("loop", Channel::Load, "-5kg", line_ref("loop"))]);
        let derived = resolve_field(&program, Channel::Load, "90%", line_ref("loop").as_ref());
        assert_eq!(derived.value, None);
        assert_eq!(derived.supposed_value, None);
        assert_eq!(derived.operation.as_deref(), Some("*0.9"));
    }

    #[test]
    fn test_mutual_reference_cycle_degrades_to_unresolved() {
        let program = program_with_lines(vec![
            line_with("a", Channel::Load, "+5kg", line_ref("b")),
            line_with("b", Channel::Load, "-5kg", line_ref("a")),
        ]);
        let derived = resolve_field(&program, Channel::Load, "80%", line_ref("a").as_ref());
        assert_eq!(
            derived,
            DerivedFieldSet {
                operation: Some("*0.8".to_string()),
                ..Default::default()
            }
        );

        let resolved = resolve_program(&program, &EngineConfig::default());
        assert_eq!(resolved[0].load.value, None);
        assert_eq!(resolved[1].load.operation.as_deref(), Some("-5"));
    }

    #[test]
    fn test_depth_ceiling_from_config() {
        let program = program_with_lines(vec![
            line_with("a", Channel::Sets, "4", None),
            line_with("b", Channel::Sets, "+1", line_ref("a")),
        ]);
        let shallow = EngineConfig {
            max_reference_depth: 1,
            ..Default::default()
        };
        let resolver = FieldResolver::with_config(&program, &shallow);

        assert_eq!(
            resolver.resolve_field(Channel::Sets, "+1", line_ref("a").as_ref()).value,
            Some(5.0)
        );
        assert_eq!(
            resolver.resolve_field(Channel::Sets, "+1", line_ref("b").as_ref()).value,
            None
        );
        assert_eq!(
            FieldResolver::new(&program)
                .resolve_field(Channel::Sets, "+1", line_ref("b").as_ref())
                .value,
            Some(6.0)
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let program = program_with_lines(vec![line_with("a", Channel::Load, "60kg/80kg", None)]);
        let resolver = FieldResolver::new(&program);
        let first = resolver.resolve_field(Channel::Load, "+5%", line_ref("a").as_ref());
        let second = resolver.resolve_field(Channel::Load, "+5%", line_ref("a").as_ref());
        assert_eq!(first, second);
        assert_eq!(first.supposed_value, Some(73.5));
    }

    #[test]
    fn test_resolve_line_covers_every_channel() {
        let line = ProgramLine::new("l1")
            .with_field(Channel::Load, LineField::new("100kg"))
            .with_field(Channel::Reps, LineField::new("5/8"))
            .with_field(Channel::Sets, LineField::new("3"))
            .with_field(Channel::Rpe, LineField::new("?"));
        let program = program_with_lines(vec![line.clone()]);

        let resolved = FieldResolver::new(&program).resolve_line(&line);
        assert_eq!(resolved.uid, "l1");
        assert_eq!(resolved.load.value, Some(100.0));
        assert_eq!(resolved.reps.supposed_value, Some(6.5));
        assert_eq!(resolved.sets.value, Some(3.0));
        assert!(resolved.rpe.require);
        assert_eq!(resolved.estimated_volume(), Some(1950.0));
    }

    #[test]
    fn test_resolve_program_returns_every_line() {
        let program = program_with_lines(vec![
            line_with("a", Channel::Load, "100kg", None),
            line_with("b", Channel::Load, "80%", line_ref("a")),
        ]);
        let resolved = resolve_program(&program, &EngineConfig::default());
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1].uid, "b");
        assert_eq!(resolved[1].load.value, Some(80.0));
    }

    #[test]
    fn test_reference_does_not_mutate_input_line() {
        let program = program_with_lines(vec![line_with("a", Channel::Load, "100kg", None)]);
        let before = program.clone();
        let _ = resolve_program(&program, &EngineConfig::default());
        assert_eq!(program, before);
    }
}
