//! Property tests for `Module::validate`.
//!
//! Random type graphs with in-range, out-of-range, and non-scalar element references; validation must report
//! the first bad instruction in arena order and never panic.

use proptest::prelude::*;
use shadec_ir::{BaseType, Inst, InstId, InstKind, IrError, Module};

fn scalar() -> impl Strategy<Value = BaseType> {
    prop::sample::select(vec![BaseType::Bool, BaseType::Int32, BaseType::UInt32, BaseType::Half, BaseType::Float])
}

#[derive(Debug, PartialEq)]
enum Expected {
    Valid,
    Dangling,
    NonScalar,
}

proptest! {
    #[test]
    fn validate_reports_the_first_bad_element(
        scalars in prop::collection::vec(scalar(), 1..4),
        elements in prop::collection::vec(0u32..12, 0..6),
    ) {
        let mut module = Module::new();
        for base in &scalars {
            let id = module.push(Inst::new(InstKind::BasicType { base: *base }));
            module.globals.push(id);
        }
        for &element in &elements {
            let id = module.push(
                Inst::new(InstKind::VectorType { count: 3 }).with_operands(vec![InstId::from_raw(element)]),
            );
            module.globals.push(id);
        }

        let total = (scalars.len() + elements.len()) as u32;
        let expected = elements
            .iter()
            .find_map(|&element| {
                if element >= total {
                    Some(Expected::Dangling)
                } else if element as usize >= scalars.len() {
                    Some(Expected::NonScalar)
                } else {
                    None
                }
            })
            .unwrap_or(Expected::Valid);

        let found = match module.validate() {
            Ok(()) => Expected::Valid,
            Err(IrError::DanglingReference { .. }) => Expected::Dangling,
            Err(IrError::NonScalarElement { .. }) => Expected::NonScalar,
            Err(other) => panic!("unexpected error: {other}"),
        };
        prop_assert_eq!(found, expected);
    }
}
