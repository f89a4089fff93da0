use orderenc::{
    clause,
    encodings::{
        order::{EncoderConfig, OrderEncoder, Translation},
        CollectClauses, EncodeStats, Error,
    },
    instances::VarTable,
    types::{
        domain::{
            ContiguousRange, EnumeratedSet, MonotonicFn, MonotonicFunctionRange,
            SemiContiguousRange,
        },
        Assignment, Clause, Domain, ExtInt, IntVar, LinearConstraint, OrderLit, Reification,
        Term,
    },
};

fn satisfied(clauses: &[Clause], assign: &Assignment) -> bool {
    clauses.iter().all(|cl| cl.evaluate(assign) == Some(true))
}

/// Calls `check` with every assignment of the variables to their domain
/// values
fn for_all_assignments<F>(vars: &VarTable, mut check: F)
where
    F: FnMut(&Assignment),
{
    let doms: Vec<(IntVar, Vec<i64>)> = vars
        .iter_ints()
        .map(|(var, dom)| (var, dom.values_asc(0).unwrap().collect()))
        .collect();
    let mut idxs = vec![0; doms.len()];
    loop {
        let assign: Assignment = doms
            .iter()
            .zip(&idxs)
            .map(|((var, vals), &idx)| (*var, vals[idx]))
            .collect();
        check(&assign);
        let mut pos = 0;
        loop {
            if pos == idxs.len() {
                return;
            }
            idxs[pos] += 1;
            if idxs[pos] < doms[pos].1.len() {
                break;
            }
            idxs[pos] = 0;
            pos += 1;
        }
    }
}

/// Checks that the encoding of a constraint holds exactly when the
/// constraint holds
fn check_equivalent(enc: &OrderEncoder, vars: &VarTable, constr: &LinearConstraint) {
    match enc.encode(constr).unwrap() {
        Translation::Clauses(clauses) => for_all_assignments(vars, |assign| {
            assert_eq!(
                satisfied(&clauses, assign),
                constr.evaluate(assign).unwrap(),
                "{constr} under {assign:?}"
            );
        }),
        Translation::Infeasible => for_all_assignments(vars, |assign| {
            assert_eq!(constr.evaluate(assign), Some(false), "{constr}");
        }),
    }
}

#[test]
fn sum_of_two() {
    let mut vars = VarTable::new();
    let x = vars.new_int(ContiguousRange::new(0, 3).into(), false);
    let y = vars.new_int(ContiguousRange::new(0, 3).into(), false);
    let enc = OrderEncoder::new(&vars);
    let constr = LinearConstraint::new(vec![Term::new(x, 1), Term::new(y, 1)], 4);
    check_equivalent(&enc, &vars, &constr);
    let trans = enc.encode(&constr).unwrap();
    assert_eq!(trans.n_clauses(), 4);
    assert_eq!(trans.n_lits(), 8);
}

#[test]
fn mixed_signs_over_all_domain_kinds() {
    let mut vars = VarTable::new();
    let x = vars.new_int(EnumeratedSet::new([-3, 0, 2, 5]).into(), false);
    let y = vars.new_int(SemiContiguousRange::new(2, 4).into(), false);
    let z = vars.new_int(
        MonotonicFunctionRange::new(
            0,
            ExtInt::Fin(3),
            MonotonicFn::Affine {
                slope: 3,
                offset: -1,
            },
        )
        .unwrap()
        .into(),
        false,
    );
    let configs = [
        EncoderConfig::default(),
        EncoderConfig::default().with_prune(false),
        EncoderConfig::default().with_infeasible_detection(false),
    ];
    for config in configs {
        let enc = OrderEncoder::with_config(&vars, config);
        for bound in -30..=30 {
            let constr = LinearConstraint::new(
                vec![Term::new(x, 2), Term::new(y, -3), Term::new(z, 1)],
                bound,
            );
            check_equivalent(&enc, &vars, &constr);
        }
    }
}

#[test]
fn scaled_domains() {
    let mut vars = VarTable::new();
    let x = vars.new_int(Domain::from(ContiguousRange::new(0, 4)).copy(-2).unwrap(), false);
    let y = vars.new_int(EnumeratedSet::new([1, 10, 100]).into(), false);
    let enc = OrderEncoder::new(&vars);
    for bound in -120..=120 {
        let constr = LinearConstraint::new(vec![Term::new(x, 3), Term::new(y, -1)], bound);
        check_equivalent(&enc, &vars, &constr);
    }
}

#[test]
fn reified_constraint() {
    let mut vars = VarTable::new();
    let x = vars.new_int(ContiguousRange::new(-2, 2).into(), false);
    let y = vars.new_int(ContiguousRange::new(0, 3).into(), false);
    let b = vars.new_bool(false);
    let enc = OrderEncoder::new(&vars);
    for polarity in [true, false] {
        let constr = LinearConstraint::new(vec![Term::new(x, 1), Term::new(y, -2)], 0)
            .with_reification(Some(Reification::new(b, polarity)));
        let clauses = enc.encode(&constr).unwrap().into_clauses().unwrap();
        for_all_assignments(&vars, |assign| {
            for val in [true, false] {
                let mut assign = assign.clone();
                assign.assign_bool(b, val);
                assert_eq!(
                    satisfied(&clauses, &assign),
                    constr.evaluate(&assign).unwrap()
                );
            }
        });
    }
}

#[test]
fn infeasible_and_collected() {
    let mut vars = VarTable::new();
    let x = vars.new_int(ContiguousRange::new(0, 3).into(), false);
    let y = vars.new_int(ContiguousRange::new(0, 3).into(), false);
    let enc = OrderEncoder::new(&vars);
    let constrs = [
        LinearConstraint::new(vec![Term::new(x, 1), Term::new(y, 1)], 7),
        LinearConstraint::new(vec![Term::new(x, 1), Term::new(y, 1)], 6),
        LinearConstraint::new(vec![Term::new(x, -1)], -1),
    ];
    let mut collected: Vec<Clause> = vec![];
    let feasible = constrs
        .iter()
        .map(|constr| enc.encode_into(constr, &mut collected).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(feasible, vec![false, true, true]);
    assert_eq!(collected.n_clauses(), 3);
    assert_eq!(
        collected.last(),
        Some(&clause![OrderLit::Ge {
            var: x,
            value: 2,
            negated: true,
            approx: false
        }])
    );
    let encs = enc.encode_all(&constrs).unwrap();
    assert!(encs[0].is_infeasible());
    assert_eq!(encs[1].n_clauses() + encs[2].n_clauses(), 3);
}

#[test]
fn raw_mode_keeps_thresholds() {
    let mut vars = VarTable::new();
    let x = vars.new_int(EnumeratedSet::new([0, 5, 10]).into(), false);
    let y = vars.new_int(EnumeratedSet::new([0, 5, 10]).into(), false);
    let constr = LinearConstraint::new(vec![Term::new(x, 1), Term::new(y, 1)], 12);
    let raw = OrderEncoder::with_config(&vars, EncoderConfig::default().with_translate(false));
    let clauses = raw.encode(&constr).unwrap().into_clauses().unwrap();
    assert!(clauses.iter().flatten().all(|lit| matches!(
        lit,
        OrderLit::Raw { rounded: None, .. }
    )));
    // raw thresholds still have the semantics of the constraint
    for_all_assignments(&vars, |assign| {
        assert_eq!(
            satisfied(&clauses, assign),
            constr.evaluate(assign).unwrap()
        );
    });
}

#[test]
fn unknown_and_unbounded() {
    let mut vars = VarTable::new();
    let x = vars.new_int(ContiguousRange::unbounded().into(), false);
    let y = vars.new_int(ContiguousRange::unbounded().into(), false);
    let enc = OrderEncoder::new(&vars);
    let constr = LinearConstraint::new(vec![Term::new(x, 1), Term::new(y, -1)], 0);
    assert_eq!(enc.encode(&constr), Err(Error::Unbounded(x)));
    let ghost = IntVar::new(7);
    let constr = LinearConstraint::new(vec![Term::new(ghost, 1)], 0);
    assert_eq!(enc.encode(&constr), Err(Error::UnknownVariable(ghost)));
    // a single unbounded term is a single literal
    let constr = LinearConstraint::new(vec![Term::new(x, -4)], 9);
    assert_eq!(
        enc.encode(&constr).unwrap().into_clauses().unwrap(),
        vec![clause![OrderLit::Ge {
            var: x,
            value: -2,
            negated: true,
            approx: false
        }]]
    );
}
