//! Overload cost comparator.
//!
//! When several declared members accept the same arguments, the one whose parameter types are
//! closest to the actual argument types wins. Closeness is measured as a transfer cost summed
//! over all parameters:
//!
//! - **Primitive parameters**: [`UNBOXING_COST`] if the argument must be unboxed first, then
//!   [`PROMOTION_STEP_COST`] per step along [`PROMOTION_ORDER`] until the parameter type is
//!   reached.
//! - **Reference parameters**: [`SUPERCLASS_STEP_COST`] per step up the argument's superclass
//!   chain until the parameter type is reached. If the parameter is an interface the argument
//!   implements, [`INTERFACE_COST`] is added and the walk stops. Falling off the top of the
//!   hierarchy adds [`ROOT_COST`]; a null argument costs [`ROOT_COST`] as well.
//!
//! Lower totals are better; equal totals compare as equal and the caller keeps the candidate it
//! found first.

use std::cmp::Ordering;

use crate::{
    metadata::{
        reflection::Reflection,
        typesystem::{PrimitiveKind, RuntimeTypeRc, TypeSignature, PROMOTION_ORDER},
    },
    resolve::assignability::is_assignable,
};

/// Cost of unboxing a wrapper argument for a primitive parameter
pub const UNBOXING_COST: f32 = 0.1;
/// Cost of one step along the primitive promotion order
pub const PROMOTION_STEP_COST: f32 = 0.1;
/// Cost of one step up the superclass chain
pub const SUPERCLASS_STEP_COST: f32 = 1.0;
/// Cost of matching a reference parameter through an implemented interface
pub const INTERFACE_COST: f32 = 0.25;
/// Cost of reaching the root of the hierarchy, or of a null argument
pub const ROOT_COST: f32 = 1.5;

/// Compare two candidate parameter lists for the given actual argument types.
///
/// Returns [`Ordering::Less`] if `left` is the cheaper (better) match, [`Ordering::Greater`] if
/// `right` is, and [`Ordering::Equal`] on a tie.
pub fn compare_signatures(
    reflection: &dyn Reflection,
    left: &TypeSignature,
    right: &TypeSignature,
    actual: &TypeSignature,
) -> Ordering {
    let left_cost = signature_cost(reflection, actual, left);
    let right_cost = signature_cost(reflection, actual, right);
    left_cost.total_cmp(&right_cost)
}

/// Total cost of passing `actual` to a member declaring `candidate`.
///
/// Positions without a declared candidate type are ignored.
pub fn signature_cost(
    reflection: &dyn Reflection,
    actual: &TypeSignature,
    candidate: &TypeSignature,
) -> f32 {
    actual
        .iter()
        .zip(candidate)
        .filter_map(|(actual, candidate)| {
            candidate
                .as_ref()
                .map(|candidate| parameter_cost(reflection, actual.as_ref(), candidate))
        })
        .sum()
}

/// Cost of passing one argument of type `actual` as `candidate`
pub fn parameter_cost(
    reflection: &dyn Reflection,
    actual: Option<&RuntimeTypeRc>,
    candidate: &RuntimeTypeRc,
) -> f32 {
    match candidate.primitive() {
        Some(kind) => actual.map_or(0.0, |actual| promotion_cost(actual, kind)),
        None => object_cost(reflection, actual, candidate),
    }
}

fn promotion_cost(actual: &RuntimeTypeRc, target: PrimitiveKind) -> f32 {
    let mut cost = 0.0;
    let mut current = match actual.primitive() {
        Some(kind) => Some(kind),
        None => {
            cost += UNBOXING_COST;
            PrimitiveKind::from_wrapper_name(&actual.name)
        }
    };

    for (index, kind) in PROMOTION_ORDER.iter().enumerate() {
        if current == Some(target) {
            break;
        }
        if current == Some(*kind) {
            cost += PROMOTION_STEP_COST;
            if let Some(next) = PROMOTION_ORDER.get(index + 1) {
                current = Some(*next);
            }
        }
    }

    cost
}

fn object_cost(
    reflection: &dyn Reflection,
    actual: Option<&RuntimeTypeRc>,
    candidate: &RuntimeTypeRc,
) -> f32 {
    let Some(actual) = actual else {
        return ROOT_COST;
    };

    let mut cost = 0.0;
    let mut current = Some(actual.clone());
    while let Some(ty) = current {
        if ty.token == candidate.token {
            return cost;
        }
        if candidate.is_interface() && is_assignable(reflection, Some(&ty), candidate, true) {
            return cost + INTERFACE_COST;
        }

        cost += SUPERCLASS_STEP_COST;
        current = reflection.superclass_of(&ty);
    }

    cost + ROOT_COST
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestWorld;

    fn approx(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    #[test]
    fn test_promotion_costs() {
        let world = TestWorld::new();
        let r = world.registry.as_ref();

        assert!(approx(parameter_cost(r, Some(&world.int), &world.int), 0.0));
        assert!(approx(parameter_cost(r, Some(&world.int), &world.long), 0.1));
        assert!(approx(parameter_cost(r, Some(&world.int), &world.double), 0.3));
        assert!(approx(parameter_cost(r, Some(&world.byte), &world.int), 0.3));
        assert!(approx(parameter_cost(r, Some(&world.integer), &world.int), 0.1));
        assert!(approx(parameter_cost(r, Some(&world.integer), &world.long), 0.2));
    }

    #[test]
    fn test_object_costs() {
        let world = TestWorld::new();
        let r = world.registry.as_ref();

        // Integer -> Number -> Object
        assert!(approx(parameter_cost(r, Some(&world.integer), &world.integer), 0.0));
        assert!(approx(parameter_cost(r, Some(&world.integer), &world.number), 1.0));
        assert!(approx(parameter_cost(r, Some(&world.integer), &world.object), 2.0));
        assert!(approx(parameter_cost(r, Some(&world.integer), &world.comparable), 0.25));
        assert!(approx(parameter_cost(r, None, &world.object), ROOT_COST));
        assert!(approx(parameter_cost(r, Some(&world.object), &world.string), 2.5));
    }

    #[test]
    fn test_closer_overload_wins() {
        let world = TestWorld::new();
        let r = world.registry.as_ref();

        let actual = TypeSignature::from_types([&world.integer]);
        let exact = TypeSignature::from_types([&world.integer]);
        let parent = TypeSignature::from_types([&world.number]);
        let root = TypeSignature::from_types([&world.object]);
        let iface = TypeSignature::from_types([&world.comparable]);

        assert_eq!(compare_signatures(r, &exact, &root, &actual), Ordering::Less);
        assert_eq!(compare_signatures(r, &root, &exact, &actual), Ordering::Greater);
        assert_eq!(compare_signatures(r, &parent, &root, &actual), Ordering::Less);
        assert_eq!(compare_signatures(r, &exact, &iface, &actual), Ordering::Less);
        assert_eq!(compare_signatures(r, &iface, &root, &actual), Ordering::Less);
        assert_eq!(compare_signatures(r, &root, &root, &actual), Ordering::Equal);
    }

    #[test]
    fn test_total_over_parameters() {
        let world = TestWorld::new();
        let r = world.registry.as_ref();

        let actual = TypeSignature::from_types([&world.int, &world.integer]);
        let narrow = TypeSignature::from_types([&world.int, &world.number]);
        let wide = TypeSignature::from_types([&world.long, &world.object]);

        assert!(approx(signature_cost(r, &actual, &narrow), 1.0));
        assert!(approx(signature_cost(r, &actual, &wide), 2.1));
        assert_eq!(compare_signatures(r, &narrow, &wide, &actual), Ordering::Less);
    }
}
